// tests/matricula_tests.rs

mod common;

use std::sync::atomic::{AtomicU32, Ordering};

use common::app_helper::{setup_app, TestTenant};
use common::test_data::{generate_cpf, unique_email};
use gym_backend::domain::payment_method::PaymentMethod;
use gym_backend::domain::permission::PermissionSet;
use gym_backend::domain::plan::PlanTier;
use gym_backend::domain::student_model::{self, NewStudent, StudentSituation, ValidatedStudent};
use gym_backend::service::matricula_allocator::MatriculaAllocator;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

fn new_student(tenant: &TestTenant, nome: &str) -> NewStudent {
    NewStudent {
        id_empresa: tenant.id_empresa,
        id_filial: tenant.id_filial,
        student: ValidatedStudent {
            nome: nome.to_string(),
            email: unique_email("matricula"),
            telefone: "11987654321".to_string(),
            cpf: generate_cpf(),
            plano: PlanTier::Mensal,
            forma_pagamento: PaymentMethod::Boleto,
        },
        situacao: StudentSituation::Regular,
        id_pagamento: None,
        id_cliente: None,
    }
}

// 抽選は常に 12345、時計の下 5 桁は 54321
fn always_12345() -> String {
    "12345".to_string()
}

fn clock_54321() -> i64 {
    1_718_000_054_321
}

#[tokio::test]
async fn test_taken_draw_falls_back_to_timestamp_candidate() {
    let app = setup_app().await;
    let tenant = app
        .seed_tenant("Academia Centro", PermissionSet::administrator())
        .await;
    let allocator = MatriculaAllocator::with_sources(1, always_12345, clock_54321);

    let first = allocator
        .insert_student(app.conn(), &new_student(&tenant, "Ana Souza"))
        .await
        .unwrap();
    assert_eq!(first.matricula_aluno, "12345");

    let second = allocator
        .insert_student(app.conn(), &new_student(&tenant, "Bruno Lima"))
        .await
        .unwrap();
    assert_eq!(second.matricula_aluno, "54321");
}

#[tokio::test]
async fn test_fallback_collision_fails_without_inserting() {
    let app = setup_app().await;
    let tenant = app
        .seed_tenant("Academia Centro", PermissionSet::administrator())
        .await;
    let allocator = MatriculaAllocator::with_sources(1, always_12345, clock_54321);

    for nome in ["Ana Souza", "Bruno Lima"] {
        allocator
            .insert_student(app.conn(), &new_student(&tenant, nome))
            .await
            .unwrap();
    }

    // 抽選も代替番号も埋まっている
    let err = allocator
        .insert_student(app.conn(), &new_student(&tenant, "Carla Dias"))
        .await
        .unwrap_err();
    assert_eq!(err.kind().as_str(), "database_erro");

    let count = student_model::Entity::find()
        .filter(student_model::Column::IdFilial.eq(tenant.id_filial))
        .count(app.conn())
        .await
        .unwrap();
    assert_eq!(count, 2);
}

static DRAWS: AtomicU32 = AtomicU32::new(0);

// 1 回目だけ埋まっている番号を引く
fn taken_then_free() -> String {
    if DRAWS.fetch_add(1, Ordering::SeqCst) == 0 {
        "12345".to_string()
    } else {
        "23456".to_string()
    }
}

#[tokio::test]
async fn test_taken_draw_is_retried_before_fallback() {
    let app = setup_app().await;
    let tenant = app
        .seed_tenant("Academia Centro", PermissionSet::administrator())
        .await;
    MatriculaAllocator::with_sources(1, always_12345, clock_54321)
        .insert_student(app.conn(), &new_student(&tenant, "Ana Souza"))
        .await
        .unwrap();

    let student = MatriculaAllocator::with_sources(2, taken_then_free, clock_54321)
        .insert_student(app.conn(), &new_student(&tenant, "Bruno Lima"))
        .await
        .unwrap();
    assert_eq!(student.matricula_aluno, "23456");
    assert_eq!(DRAWS.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_same_matricula_is_allowed_in_another_branch() {
    let app = setup_app().await;
    let centro = app
        .seed_tenant("Academia Centro", PermissionSet::administrator())
        .await;
    let norte = app
        .seed_tenant("Academia Norte", PermissionSet::administrator())
        .await;
    let allocator = MatriculaAllocator::with_sources(1, always_12345, clock_54321);

    for tenant in [&centro, &norte] {
        let student = allocator
            .insert_student(app.conn(), &new_student(tenant, "Ana Souza"))
            .await
            .unwrap();
        assert_eq!(student.matricula_aluno, "12345");
    }
}
