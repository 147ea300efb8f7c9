// gym-backend/src/api/dto/import_dto.rs

use super::student_dto::{lenient, StudentPayload, StudentResponse};
use serde::{Deserialize, Serialize};

/// インポートの 1 行
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRow {
    #[serde(flatten)]
    pub aluno: StudentPayload,
    /// 元ファイル上の行番号（ヘッダー込み）
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub linha: Option<u64>,
}

/// POST /alunos/importar-alunos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub alunos: Vec<ImportRow>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub total_processados: usize,
    pub sucesso: usize,
    pub erros: usize,
    pub detalhes: Vec<String>,
    pub alunos_importados: Vec<StudentResponse>,
}

impl ImportSummary {
    pub fn message(&self) -> String {
        format!(
            "Importação concluída: {} aluno(s) importado(s), {} erro(s)",
            self.sucesso, self.erros
        )
    }
}
