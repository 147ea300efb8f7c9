// gym-backend/src/api/dto/student_dto.rs

use crate::domain::student_model::{Model as StudentModel, ValidatedStudent};
use crate::gateway::centavos_to_reais;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// フロントエンドや CSV 由来の値は数値で届くことがあるため文字列に寄せる
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(other) => Some(other.to_string()),
        })
    }

    pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

/// 生徒の入力（未検証）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPayload {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub nome_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub email_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub telefone_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub cpf_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub plano_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub forma_pagamento: Option<String>,
}

impl From<&ValidatedStudent> for StudentPayload {
    fn from(student: &ValidatedStudent) -> Self {
        Self {
            nome_aluno: Some(student.nome.clone()),
            email_aluno: Some(student.email.clone()),
            telefone_aluno: Some(student.telefone.clone()),
            cpf_aluno: Some(student.cpf.clone()),
            plano_aluno: Some(student.plano.as_str().to_string()),
            forma_pagamento: Some(student.forma_pagamento.as_str().to_string()),
        }
    }
}

/// カード情報の入力
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardPayload {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub nome_titular: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub numero: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub mes_validade: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ano_validade: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub cvv: Option<String>,
}

/// POST /alunos/aluno-cadastrar
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    #[serde(flatten)]
    pub aluno: StudentPayload,
    #[serde(default)]
    pub dados_cartao: Option<CardPayload>,
}

/// POST /alunos/confirmar-pagamento-pix
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPixRequest {
    pub id_pagamento: String,
    #[serde(default)]
    pub id_cliente: Option<String>,
    pub aluno: StudentPayload,
}

/// POST /alunos/confirmar-pagamento-link
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmLinkRequest {
    #[serde(alias = "paymentLinkId")]
    pub id_link_pagamento: String,
    pub aluno: StudentPayload,
}

/// PUT /alunos/editar-alunos
#[derive(Debug, Clone, Deserialize)]
pub struct EditStudentRequest {
    pub id_aluno: Uuid,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub nome_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub telefone_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub cpf_aluno: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub plano_aluno: Option<String>,
}

/// PUT /alunos/alterar-status
#[derive(Debug, Clone, Deserialize)]
pub struct StudentStatusRequest {
    pub id_aluno: Uuid,
    pub status_aluno: bool,
}

/// GET /alunos のクエリ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentListQuery {
    #[serde(default, deserialize_with = "deserialize_opt_bool")]
    pub status: Option<bool>,
    pub busca: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub nome_aluno: String,
    pub email_aluno: String,
    pub telefone_aluno: String,
    pub cpf_aluno: String,
    pub plano_aluno: String,
    pub forma_pagamento: String,
    pub situacao: String,
    pub status_aluno: bool,
    pub matricula_aluno: String,
    pub id_pagamento: Option<String>,
    pub id_cliente: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentModel> for StudentResponse {
    fn from(model: StudentModel) -> Self {
        Self {
            id: model.id,
            id_empresa: model.id_empresa,
            id_filial: model.id_filial,
            nome_aluno: model.nome_aluno,
            email_aluno: model.email_aluno,
            telefone_aluno: model.telefone_aluno,
            cpf_aluno: model.cpf_aluno,
            plano_aluno: model.plano_aluno,
            forma_pagamento: model.forma_pagamento,
            situacao: model.situacao,
            status_aluno: model.status_aluno,
            matricula_aluno: model.matricula_aluno,
            id_pagamento: model.id_pagamento,
            id_cliente: model.id_cliente,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// 入学レスポンスの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentKind {
    Boleto,
    Pix,
    Cartao,
}

/// 登録済みの生徒、または PIX 確認待ちで再送される入力
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EnrollmentStudent {
    Persisted(StudentResponse),
    Pending(StudentPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct BoletoInfo {
    pub id: String,
    pub link: String,
    pub codigo_barras: String,
    pub vencimento: NaiveDate,
    pub valor: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PixInfo {
    pub id: String,
    pub id_cliente: String,
    pub qr_code: String,
    pub qr_code_imagem: String,
    pub expira_em: Option<DateTime<Utc>>,
    pub valor: f64,
}

/// カード・確認済み支払いの情報
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInfo {
    pub id: String,
    pub status: String,
    pub aprovado: bool,
    pub valor: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse {
    pub success: bool,
    pub message: String,
    pub tipo: EnrollmentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aluno: Option<EnrollmentStudent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto: Option<BoletoInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix: Option<PixInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagamento: Option<PaymentInfo>,
}

impl EnrollmentResponse {
    pub fn new(message: impl Into<String>, tipo: EnrollmentKind) -> Self {
        Self {
            success: true,
            message: message.into(),
            tipo,
            aluno: None,
            boleto: None,
            pix: None,
            pagamento: None,
        }
    }

    pub fn with_student(mut self, student: StudentModel) -> Self {
        self.aluno = Some(EnrollmentStudent::Persisted(student.into()));
        self
    }

    pub fn with_pending(mut self, payload: StudentPayload) -> Self {
        self.aluno = Some(EnrollmentStudent::Pending(payload));
        self
    }

    pub fn with_boleto(mut self, boleto: BoletoInfo) -> Self {
        self.boleto = Some(boleto);
        self
    }

    pub fn with_pix(mut self, pix: PixInfo) -> Self {
        self.pix = Some(pix);
        self
    }

    pub fn with_payment(mut self, pagamento: PaymentInfo) -> Self {
        self.pagamento = Some(pagamento);
        self
    }
}

/// 確認処理の結果（既存の登録を返した場合は created = false）
#[derive(Debug, Clone)]
pub struct ConfirmationOutcome {
    pub response: EnrollmentResponse,
    pub created: bool,
}

/// POST /alunos/iniciar-cadastro-aluno のレスポンス
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkResponse {
    pub success: bool,
    pub payment_link_id: String,
    pub payment_link_url: String,
    pub valor: f64,
    pub descricao: String,
    pub aluno: StudentPayload,
}

impl PaymentLinkResponse {
    pub fn new(
        payment_link_id: String,
        payment_link_url: String,
        valor_centavos: i64,
        descricao: String,
        aluno: StudentPayload,
    ) -> Self {
        Self {
            success: true,
            payment_link_id,
            payment_link_url,
            valor: centavos_to_reais(valor_centavos),
            descricao,
            aluno,
        }
    }
}

/// 編集結果
#[derive(Debug, Clone, Serialize)]
pub struct EditStudentResponse {
    pub aluno: StudentResponse,
    pub alteracoes: Vec<String>,
}

/// `"true"` / `"false"` の文字列クエリも受け付ける
pub fn deserialize_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim().to_lowercase().as_str() {
        "true" | "1" | "ativo" => Some(true),
        "false" | "0" | "inativo" => Some(false),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_accepts_numeric_values() {
        let payload: StudentPayload = serde_json::from_value(json!({
            "nome_aluno": "Maria",
            "cpf_aluno": 52998224725u64,
            "telefone_aluno": 11987654321u64,
            "plano_aluno": null
        }))
        .unwrap();

        assert_eq!(payload.cpf_aluno.as_deref(), Some("52998224725"));
        assert_eq!(payload.telefone_aluno.as_deref(), Some("11987654321"));
        assert_eq!(payload.plano_aluno, None);
        assert_eq!(payload.email_aluno, None);
    }

    #[test]
    fn test_enroll_request_flattens_student() {
        let request: EnrollRequest = serde_json::from_value(json!({
            "nome_aluno": "Maria",
            "forma_pagamento": "credito",
            "dados_cartao": { "numero": "4111111111111111", "mes_validade": 12, "ano_validade": "2030" }
        }))
        .unwrap();

        assert_eq!(request.aluno.forma_pagamento.as_deref(), Some("credito"));
        let card = request.dados_cartao.unwrap();
        assert_eq!(card.mes_validade.as_deref(), Some("12"));
    }

    #[test]
    fn test_link_response_uses_camel_case() {
        let response = PaymentLinkResponse::new(
            "lnk_1".to_string(),
            "https://pay.example/lnk_1".to_string(),
            9_990,
            "Plano Mensal".to_string(),
            StudentPayload::default(),
        );
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["paymentLinkId"], "lnk_1");
        assert_eq!(value["paymentLinkUrl"], "https://pay.example/lnk_1");
        assert_eq!(value["valor"], 99.9);
    }
}
