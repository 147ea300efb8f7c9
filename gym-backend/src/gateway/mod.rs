// gym-backend/src/gateway/mod.rs

//! 外部決済ゲートウェイとの契約
//!
//! 金額は内部ではセンタボ（i64）で扱い、ワイヤ上でのみレアル（小数）に変換する。

pub mod development;
pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use thiserror::Error;

pub use development::DevelopmentPaymentGateway;
pub use http::HttpPaymentGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// 利用者向けのメッセージ
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Transport(_) => {
                "Não foi possível conectar ao serviço de pagamento".to_string()
            }
            GatewayError::Api { message, .. } => {
                format!("Erro no serviço de pagamento: {}", message)
            }
            GatewayError::InvalidResponse(_) => {
                "Resposta inesperada do serviço de pagamento".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::InvalidResponse(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// ゲートウェイ上の顧客
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCustomer {
    pub nome: String,
    pub email: String,
    pub cpf: String,
    pub telefone: String,
}

/// カード情報（ログに番号を出さない）
#[derive(Clone, PartialEq, Eq)]
pub struct CardData {
    pub holder_name: String,
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
}

impl CardData {
    pub fn last_four(&self) -> &str {
        let len = self.number.len();
        &self.number[len.saturating_sub(4)..]
    }
}

impl fmt::Debug for CardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardData")
            .field("holder_name", &self.holder_name)
            .field("number", &format_args!("**** {}", self.last_four()))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeMethod {
    Boleto { due_date: NaiveDate },
    Pix,
    CreditCard(CardData),
    DebitCard(CardData),
}

impl ChargeMethod {
    pub fn billing_type(&self) -> &'static str {
        match self {
            ChargeMethod::Boleto { .. } => "BOLETO",
            ChargeMethod::Pix => "PIX",
            ChargeMethod::CreditCard(_) => "CREDIT_CARD",
            ChargeMethod::DebitCard(_) => "DEBIT_CARD",
        }
    }

    pub fn card(&self) -> Option<&CardData> {
        match self {
            ChargeMethod::CreditCard(card) | ChargeMethod::DebitCard(card) => Some(card),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub customer_id: String,
    pub customer: GatewayCustomer,
    pub valor_centavos: i64,
    pub descricao: String,
    pub method: ChargeMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeStatus {
    Pending,
    Received,
    Confirmed,
    Overdue,
    Refunded,
    Declined,
    Unknown(String),
}

impl ChargeStatus {
    pub fn from_gateway(status: &str) -> Self {
        match status {
            "PENDING" | "AWAITING_RISK_ANALYSIS" => ChargeStatus::Pending,
            "RECEIVED" | "RECEIVED_IN_CASH" => ChargeStatus::Received,
            "CONFIRMED" => ChargeStatus::Confirmed,
            "OVERDUE" => ChargeStatus::Overdue,
            "REFUNDED" | "REFUND_REQUESTED" | "CHARGEBACK_REQUESTED" => ChargeStatus::Refunded,
            "DECLINED" | "REPROVED_BY_RISK_ANALYSIS" => ChargeStatus::Declined,
            other => ChargeStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, ChargeStatus::Received | ChargeStatus::Confirmed)
    }
}

/// 支払い方法ごとの成果物
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeArtifacts {
    Boleto {
        url: String,
        barcode: String,
        due_date: NaiveDate,
    },
    Pix {
        payload: String,
        image_base64: String,
        expires_at: Option<DateTime<Utc>>,
    },
    Card {
        approved: bool,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub id: String,
    pub customer_id: String,
    pub status: ChargeStatus,
    pub valor_centavos: i64,
    pub artifacts: ChargeArtifacts,
}

/// 既存の請求の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeSnapshot {
    pub id: String,
    pub status: ChargeStatus,
    pub valor_centavos: i64,
    /// 請求先の顧客 ID（ゲートウェイが返さない場合は None）
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLinkRequest {
    pub nome: String,
    pub descricao: String,
    pub valor_centavos: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLinkStatus {
    pub paid: bool,
    pub payment_id: Option<String>,
    pub valor_centavos: Option<i64>,
}

/// 決済ゲートウェイ（再試行・バックオフはしない）
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// CPF で登録済みの顧客IDを探す
    async fn find_customer(&self, cpf: &str) -> Result<Option<String>, GatewayError>;

    /// CPF で既存顧客を探し、なければ作成して顧客IDを返す
    async fn ensure_customer(&self, customer: &GatewayCustomer) -> Result<String, GatewayError>;

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError>;

    async fn get_charge_status(&self, charge_id: &str) -> Result<ChargeSnapshot, GatewayError>;

    async fn cancel_charge(&self, charge_id: &str) -> Result<(), GatewayError>;

    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError>;

    async fn get_payment_link_status(
        &self,
        link_id: &str,
    ) -> Result<PaymentLinkStatus, GatewayError>;
}

/// センタボ → レアル
pub fn centavos_to_reais(valor_centavos: i64) -> f64 {
    valor_centavos as f64 / 100.0
}

/// レアル → センタボ
pub fn reais_to_centavos(valor: f64) -> i64 {
    (valor * 100.0).round() as i64
}
