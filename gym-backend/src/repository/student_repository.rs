// src/repository/student_repository.rs

use crate::domain::student_model::{
    self, ActiveModel as StudentActiveModel, Entity as StudentEntity, Model as StudentModel,
};
use sea_orm::entity::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{Condition, ConnectionTrait, DbConn, DbErr, QueryFilter, QueryOrder, SqlErr};
use uuid::Uuid;

/// マトリキュラ番号の一意制約（支店単位）
pub const MATRICULA_CONSTRAINT: &str = "idx_alunos_filial_matricula";
/// CPF の一意制約（会社単位）
pub const CPF_CONSTRAINT: &str = "idx_alunos_empresa_cpf";
/// メールアドレスの一意制約（会社単位・大文字小文字無視）
pub const EMAIL_CONSTRAINT: &str = "idx_alunos_empresa_email";

/// 生徒テーブルで発生しうる一意制約違反
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentConstraint {
    Matricula,
    Cpf,
    Email,
}

/// DbErr がどの一意制約違反かを判定する
pub fn classify_unique_violation(err: &DbErr) -> Option<StudentConstraint> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => classify_constraint_message(&message),
        _ => None,
    }
}

fn classify_constraint_message(message: &str) -> Option<StudentConstraint> {
    if message.contains(MATRICULA_CONSTRAINT) {
        Some(StudentConstraint::Matricula)
    } else if message.contains(CPF_CONSTRAINT) {
        Some(StudentConstraint::Cpf)
    } else if message.contains(EMAIL_CONSTRAINT) {
        Some(StudentConstraint::Email)
    } else {
        None
    }
}

/// 一覧取得の条件
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub status: Option<bool>,
    pub busca: Option<String>,
}

pub struct StudentRepository {
    db: DbConn,
}

impl StudentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StudentModel>, DbErr> {
        StudentEntity::find_by_id(id).one(&self.db).await
    }

    /// 会社スコープで生徒を取得（他社の生徒は見えない）
    pub async fn find_for_company(
        &self,
        id: Uuid,
        id_empresa: Uuid,
    ) -> Result<Option<StudentModel>, DbErr> {
        StudentEntity::find_by_id(id)
            .filter(student_model::Column::IdEmpresa.eq(id_empresa))
            .one(&self.db)
            .await
    }

    /// 会社内で CPF が一致する生徒を検索
    pub async fn find_by_cpf(
        &self,
        id_empresa: Uuid,
        cpf: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<StudentModel>, DbErr> {
        let mut query = StudentEntity::find()
            .filter(student_model::Column::IdEmpresa.eq(id_empresa))
            .filter(student_model::Column::CpfAluno.eq(cpf));
        if let Some(id) = exclude_id {
            query = query.filter(student_model::Column::Id.ne(id));
        }
        query.one(&self.db).await
    }

    /// 会社内でメールアドレスが一致する生徒を検索（大文字小文字無視）
    pub async fn find_by_email(
        &self,
        id_empresa: Uuid,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<StudentModel>, DbErr> {
        let mut query = StudentEntity::find()
            .filter(student_model::Column::IdEmpresa.eq(id_empresa))
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    StudentEntity,
                    student_model::Column::EmailAluno,
                ))))
                .eq(email.to_lowercase()),
            );
        if let Some(id) = exclude_id {
            query = query.filter(student_model::Column::Id.ne(id));
        }
        query.one(&self.db).await
    }

    /// 支店の生徒一覧（名前順）
    pub async fn list_for_branch(
        &self,
        id_filial: Uuid,
        filter: &StudentFilter,
    ) -> Result<Vec<StudentModel>, DbErr> {
        let mut query =
            StudentEntity::find().filter(student_model::Column::IdFilial.eq(id_filial));

        if let Some(status) = filter.status {
            query = query.filter(student_model::Column::StatusAluno.eq(status));
        }

        if let Some(busca) = filter.busca.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            let pattern = format!("%{}%", busca.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            StudentEntity,
                            student_model::Column::NomeAluno,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(student_model::Column::CpfAluno.like(pattern.clone()))
                    .add(student_model::Column::MatriculaAluno.like(pattern)),
            );
        }

        query
            .order_by_asc(student_model::Column::NomeAluno)
            .all(&self.db)
            .await
    }

    /// 支店内でマトリキュラ番号が使用済みか
    pub async fn matricula_exists<C: ConnectionTrait>(
        conn: &C,
        id_filial: Uuid,
        matricula: &str,
    ) -> Result<bool, DbErr> {
        let found = StudentEntity::find()
            .filter(student_model::Column::IdFilial.eq(id_filial))
            .filter(student_model::Column::MatriculaAluno.eq(matricula))
            .one(conn)
            .await?;
        Ok(found.is_some())
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        student: StudentActiveModel,
    ) -> Result<StudentModel, DbErr> {
        student.insert(conn).await
    }

    pub async fn update(&self, student: StudentActiveModel) -> Result<StudentModel, DbErr> {
        student.update(&self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_constraint_message() {
        assert_eq!(
            classify_constraint_message(
                "duplicate key value violates unique constraint \"idx_alunos_filial_matricula\""
            ),
            Some(StudentConstraint::Matricula)
        );
        assert_eq!(
            classify_constraint_message(
                "duplicate key value violates unique constraint \"idx_alunos_empresa_cpf\""
            ),
            Some(StudentConstraint::Cpf)
        );
        assert_eq!(
            classify_constraint_message(
                "duplicate key value violates unique constraint \"idx_alunos_empresa_email\""
            ),
            Some(StudentConstraint::Email)
        );
        assert_eq!(
            classify_constraint_message("duplicate key value violates unique constraint \"x\""),
            None
        );
    }

    #[test]
    fn test_non_sql_error_is_not_a_violation() {
        assert_eq!(
            classify_unique_violation(&DbErr::Custom("boom".to_string())),
            None
        );
    }
}
