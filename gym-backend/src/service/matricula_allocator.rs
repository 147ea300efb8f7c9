// gym-backend/src/service/matricula_allocator.rs

//! マトリキュラ番号（支店内で一意な 5 桁）の割り当て
//!
//! 一意性の最終判断はデータベースの一意制約 `(id_filial, matricula_aluno)` が行う。
//! 挿入はセーブポイント内で試み、番号の衝突ならセーブポイントを巻き戻して再抽選する。

use crate::domain::student_model::{Model as StudentModel, NewStudent};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::student_repository::{
    classify_unique_violation, StudentConstraint, StudentRepository,
};
use rand::Rng;
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

pub const MATRICULA_MIN: u32 = 10_000;
pub const MATRICULA_MAX: u32 = 99_999;

/// 5 桁の候補番号を抽選
pub fn draw_matricula() -> String {
    rand::thread_rng()
        .gen_range(MATRICULA_MIN..=MATRICULA_MAX)
        .to_string()
}

/// 抽選が尽きたときの候補（Unix ミリ秒の下 5 桁を範囲内に持ち上げる）
pub fn fallback_matricula(unix_millis: i64) -> String {
    let low = unix_millis.rem_euclid(100_000) as u32;
    let lifted = if low < MATRICULA_MIN {
        low + MATRICULA_MIN
    } else {
        low
    };
    lifted.to_string()
}

/// 一意制約違反を利用者向けのエラーに変換
pub fn duplicate_error(constraint: StudentConstraint) -> AppError {
    match constraint {
        StudentConstraint::Cpf => {
            AppError::ValidationError("CPF já cadastrado para outro aluno".to_string())
        }
        StudentConstraint::Email => {
            AppError::ValidationError("Email já cadastrado para outro aluno".to_string())
        }
        StudentConstraint::Matricula => {
            AppError::DbErr(DbErr::Custom("Matrícula duplicada".to_string()))
        }
    }
}

enum Attempt {
    Inserted(StudentModel),
    Collision,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy)]
pub struct MatriculaAllocator {
    max_attempts: u32,
    draw: fn() -> String,
    clock: fn() -> i64,
}

impl MatriculaAllocator {
    pub fn new(max_attempts: u32) -> Self {
        Self::with_sources(max_attempts, draw_matricula, now_millis)
    }

    /// 抽選と時計を差し替えた割り当て器（衝突経路の再現用）
    pub fn with_sources(max_attempts: u32, draw: fn() -> String, clock: fn() -> i64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            draw,
            clock,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 番号を割り当てて生徒を挿入する
    ///
    /// `conn` がトランザクションならセーブポイント、接続なら単独のトランザクションになる。
    pub async fn insert_student<C>(&self, conn: &C, student: &NewStudent) -> AppResult<StudentModel>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = (self.draw)();

            // 明らかな衝突は挿入前に避ける
            if StudentRepository::matricula_exists(conn, student.id_filial, &candidate).await? {
                continue;
            }

            match self.try_insert(conn, student, &candidate).await? {
                Attempt::Inserted(model) => return Ok(model),
                Attempt::Collision => {
                    log_with_context!(
                        tracing::Level::DEBUG,
                        "Matricula collision, drawing again",
                        "id_filial" => student.id_filial,
                        "attempt" => attempt,
                    );
                }
            }
        }

        let candidate = fallback_matricula((self.clock)());
        log_with_context!(
            tracing::Level::WARN,
            "Matricula draws exhausted, trying timestamp fallback",
            "id_filial" => student.id_filial,
            "attempts" => self.max_attempts,
            "candidate" => &candidate,
        );

        match self.try_insert(conn, student, &candidate).await? {
            Attempt::Inserted(model) => Ok(model),
            Attempt::Collision => {
                tracing::error!(
                    id_filial = %student.id_filial,
                    "Could not allocate a unique matricula"
                );
                Err(AppError::DbErr(DbErr::Custom(
                    "Não foi possível gerar uma matrícula única".to_string(),
                )))
            }
        }
    }

    async fn try_insert<C>(
        &self,
        conn: &C,
        student: &NewStudent,
        candidate: &str,
    ) -> AppResult<Attempt>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let savepoint = conn.begin().await?;

        match StudentRepository::insert(&savepoint, student.to_active_model(candidate)).await {
            Ok(model) => {
                savepoint.commit().await?;
                Ok(Attempt::Inserted(model))
            }
            Err(err) => {
                savepoint.rollback().await?;
                match classify_unique_violation(&err) {
                    Some(StudentConstraint::Matricula) => Ok(Attempt::Collision),
                    Some(other) => Err(duplicate_error(other)),
                    None => Err(AppError::DbErr(err)),
                }
            }
        }
    }
}
