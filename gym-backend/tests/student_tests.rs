// tests/student_tests.rs

mod common;

use axum::http::StatusCode;
use common::app_helper::{setup_app, TestApp, TestTenant};
use common::request::{create_get_request, create_request, send};
use common::test_data::{generate_cpf, student_payload, unique_email};
use gym_backend::domain::audit_log_model;
use gym_backend::domain::permission::{ModulePermissions, PermissionSet};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};

async fn setup_with_tenant() -> (TestApp, TestTenant) {
    let app = setup_app().await;
    let tenant = app
        .seed_tenant(
            "Academia Centro",
            PermissionSet {
                alunos: Some(ModulePermissions::full()),
                ..PermissionSet::default()
            },
        )
        .await;
    (app, tenant)
}

/// ボレートで生徒を 1 人登録してレスポンスの aluno を返す
async fn enroll_student(app: &TestApp, tenant: &TestTenant, nome: &str) -> Value {
    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            "/alunos/aluno-cadastrar",
            &tenant.token,
            &student_payload(nome, &generate_cpf(), "boleto"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["aluno"].clone()
}

async fn audit_actions(app: &TestApp, tenant: &TestTenant) -> Vec<String> {
    audit_log_model::Entity::find()
        .filter(audit_log_model::Column::IdEmpresa.eq(tenant.id_empresa))
        .all(app.conn())
        .await
        .unwrap()
        .into_iter()
        .map(|log| log.acao)
        .collect()
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, create_get_request("/alunos", "")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["tipo"], "nao_autorizado");

    let (status, _) = send(&app.router, create_get_request("/alunos", "nao-e-um-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_is_scoped_to_branch_and_filterable() {
    let (app, tenant) = setup_with_tenant().await;
    let other = app
        .seed_tenant(
            "Academia Norte",
            PermissionSet {
                alunos: Some(ModulePermissions::full()),
                ..PermissionSet::default()
            },
        )
        .await;

    let maria = enroll_student(&app, &tenant, "Maria Souza").await;
    enroll_student(&app, &tenant, "João Lima").await;
    enroll_student(&app, &other, "Pessoa De Fora").await;

    let (status, body) = send(&app.router, create_get_request("/alunos", &tenant.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = send(
        &app.router,
        create_get_request("/alunos?busca=souza", &tenant.token),
    )
    .await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], maria["id"]);

    let (_, body) = send(
        &app.router,
        create_get_request("/alunos?status=false", &tenant.token),
    )
    .await;
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
async fn test_edit_reports_changes_and_audits() {
    let (app, tenant) = setup_with_tenant().await;
    let aluno = enroll_student(&app, &tenant, "Maria Souza").await;

    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            "/alunos/editar-alunos",
            &tenant.token,
            &json!({
                "id_aluno": aluno["id"],
                "telefone_aluno": "(21) 3333-4444",
                "plano_aluno": "anual",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["aluno"]["telefone_aluno"], "2133334444");
    assert_eq!(body["data"]["aluno"]["plano_aluno"], "anual");
    let alteracoes = body["data"]["alteracoes"].as_array().unwrap();
    assert_eq!(alteracoes.len(), 2);
    assert!(alteracoes[0].as_str().unwrap().starts_with("telefone_aluno:"));

    // 同じ値での編集は何も変えない
    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            "/alunos/editar-alunos",
            &tenant.token,
            &json!({ "id_aluno": aluno["id"], "plano_aluno": "anual" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["alteracoes"], json!([]));

    let edits = audit_actions(&app, &tenant)
        .await
        .into_iter()
        .filter(|acao| acao == "ALUNO_EDITADO")
        .count();
    assert_eq!(edits, 1);
}

#[tokio::test]
async fn test_edit_rejects_cpf_of_another_student() {
    let (app, tenant) = setup_with_tenant().await;
    let maria = enroll_student(&app, &tenant, "Maria Souza").await;
    let joao = enroll_student(&app, &tenant, "João Lima").await;

    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            "/alunos/editar-alunos",
            &tenant.token,
            &json!({ "id_aluno": joao["id"], "cpf_aluno": maria["cpf_aluno"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["tipo"], "validacao_erro");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains(maria["matricula_aluno"].as_str().unwrap()));
}

#[tokio::test]
async fn test_students_of_other_company_are_not_found() {
    let (app, tenant) = setup_with_tenant().await;
    let other = app
        .seed_tenant(
            "Academia Norte",
            PermissionSet {
                alunos: Some(ModulePermissions::full()),
                ..PermissionSet::default()
            },
        )
        .await;
    let aluno = enroll_student(&app, &tenant, "Maria Souza").await;

    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            "/alunos/alterar-status",
            &other.token,
            &json!({ "id_aluno": aluno["id"], "status_aluno": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["tipo"], "nao_encontrado");
}

#[tokio::test]
async fn test_status_toggle() {
    let (app, tenant) = setup_with_tenant().await;
    let aluno = enroll_student(&app, &tenant, "Maria Souza").await;

    let (status, body) = send(
        &app.router,
        create_request(
            "PUT",
            "/alunos/alterar-status",
            &tenant.token,
            &json!({ "id_aluno": aluno["id"], "status_aluno": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status_aluno"], false);
    assert_eq!(body["message"], "Aluno desativado com sucesso");

    let (_, body) = send(
        &app.router,
        create_get_request("/alunos?status=false", &tenant.token),
    )
    .await;
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn test_import_collects_row_failures() {
    let (app, tenant) = setup_with_tenant().await;

    let request = json!({
        "alunos": [
            {
                "nome_aluno": "Maria Souza",
                "email_aluno": unique_email("maria"),
                "telefone_aluno": 11987654321u64,
                "cpf_aluno": generate_cpf(),
                "plano_aluno": "Mensal",
                "forma_pagamento": "Cartão de Crédito",
            },
            {
                "nome_aluno": "Linha Ruim",
                "email_aluno": unique_email("ruim"),
                "telefone_aluno": "11987654321",
                "cpf_aluno": "123.456.789-00",
                "plano_aluno": "mensal",
                "forma_pagamento": "boleto",
            },
            {
                "nome_aluno": "João Lima",
                "email_aluno": unique_email("joao"),
                "telefone_aluno": "(11) 91234-5678",
                "cpf_aluno": generate_cpf(),
                "plano_aluno": "anual",
                "forma_pagamento": "pix",
            },
        ]
    });

    let (status, body) = send(
        &app.router,
        create_request("POST", "/alunos/importar-alunos", &tenant.token, &request),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["total_processados"], 3);
    assert_eq!(body["data"]["sucesso"], 2);
    assert_eq!(body["data"]["erros"], 1);
    let detalhe = body["data"]["detalhes"][0].as_str().unwrap();
    assert!(detalhe.starts_with("Linha 3:"), "{}", detalhe);
    assert!(detalhe.contains("cpf_aluno"));

    // 取り込んだ生徒は支払い済み扱い
    assert_eq!(body["data"]["alunos_importados"][0]["situacao"], "regular");
    assert_eq!(body["data"]["alunos_importados"][0]["forma_pagamento"], "credito");

    assert!(audit_actions(&app, &tenant)
        .await
        .contains(&"ALUNOS_IMPORTADOS".to_string()));
}

#[tokio::test]
async fn test_import_with_only_invalid_rows_writes_no_summary_log() {
    let (app, tenant) = setup_with_tenant().await;

    let request = json!({
        "alunos": [
            {
                "nome_aluno": "Linha Ruim",
                "email_aluno": "sem-arroba",
                "telefone_aluno": "11987654321",
                "cpf_aluno": generate_cpf(),
                "plano_aluno": "mensal",
                "forma_pagamento": "boleto",
            },
            {
                "nome_aluno": "Outra Ruim",
                "email_aluno": unique_email("ruim"),
                "telefone_aluno": "11987654321",
                "cpf_aluno": "123.456.789-00",
                "plano_aluno": "mensal",
                "forma_pagamento": "boleto",
            },
        ]
    });

    let (status, body) = send(
        &app.router,
        create_request("POST", "/alunos/importar-alunos", &tenant.token, &request),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["sucesso"], 0);
    assert_eq!(body["data"]["erros"], 2);
    assert!(!audit_actions(&app, &tenant)
        .await
        .contains(&"ALUNOS_IMPORTADOS".to_string()));
}

#[tokio::test]
async fn test_import_reports_cpf_repeated_within_batch() {
    let (app, tenant) = setup_with_tenant().await;
    let cpf = generate_cpf();

    let request = json!({
        "alunos": [
            {
                "nome_aluno": "Maria Souza",
                "email_aluno": unique_email("maria"),
                "telefone_aluno": "11987654321",
                "cpf_aluno": cpf,
                "plano_aluno": "mensal",
                "forma_pagamento": "pix",
            },
            {
                "nome_aluno": "Maria S. Souza",
                "email_aluno": unique_email("maria"),
                "telefone_aluno": "11987654321",
                "cpf_aluno": cpf,
                "plano_aluno": "mensal",
                "forma_pagamento": "pix",
            },
        ]
    });

    let (status, body) = send(
        &app.router,
        create_request("POST", "/alunos/importar-alunos", &tenant.token, &request),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["sucesso"], 1);
    assert_eq!(body["data"]["erros"], 1);
    let detalhe = body["data"]["detalhes"][0].as_str().unwrap();
    assert!(detalhe.starts_with("Linha 3:"), "{}", detalhe);
    assert!(detalhe.contains("CPF"), "{}", detalhe);
}

#[tokio::test]
async fn test_import_rejects_empty_batch() {
    let (app, tenant) = setup_with_tenant().await;

    let (status, body) = send(
        &app.router,
        create_request(
            "POST",
            "/alunos/importar-alunos",
            &tenant.token,
            &json!({ "alunos": [] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["tipo"], "validacao_erro");
}
