// gym-backend/src/service/payment_service.rs

use crate::config::PaymentConfig;
use crate::domain::payment_method::PaymentMethod;
use crate::domain::plan::PlanTier;
use crate::domain::student_model::ValidatedStudent;
use crate::error::{AppError, AppResult};
use crate::gateway::{
    CardData, Charge, ChargeArtifacts, ChargeMethod, ChargeRequest, ChargeSnapshot, ChargeStatus,
    GatewayCustomer, GatewayError, PaymentGateway, PaymentLink, PaymentLinkRequest,
    PaymentLinkStatus,
};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// ゲートウェイ呼び出しを支払い方法ごとに振り分ける
///
/// 永続化は行わない。呼び出し元は成功した結果だけを保存する。
#[derive(Clone)]
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    config: PaymentConfig,
}

impl PaymentService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: PaymentConfig) -> Self {
        Self { gateway, config }
    }

    pub fn price_for(&self, plan: PlanTier) -> i64 {
        self.config.plan_prices.price_for(plan)
    }

    pub fn boleto_due_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.config.boleto_due_days)
    }

    pub fn description_for(student: &ValidatedStudent) -> String {
        format!("{} - {}", student.plano.display_name(), student.nome)
    }

    fn customer_for(student: &ValidatedStudent) -> GatewayCustomer {
        GatewayCustomer {
            nome: student.nome.clone(),
            email: student.email.clone(),
            cpf: student.cpf.clone(),
            telefone: student.telefone.clone(),
        }
    }

    /// 生徒のプラン料金で請求を作成する
    ///
    /// カードが拒否された場合は `PaymentRejected` を返す。
    pub async fn charge(
        &self,
        student: &ValidatedStudent,
        card: Option<CardData>,
    ) -> AppResult<Charge> {
        // ゲートウェイを呼ぶ前に方法ごとの必須項目を確認
        let method = match student.forma_pagamento {
            PaymentMethod::Boleto => ChargeMethod::Boleto {
                due_date: self.boleto_due_date(Utc::now().date_naive()),
            },
            PaymentMethod::Pix => ChargeMethod::Pix,
            PaymentMethod::Credito => ChargeMethod::CreditCard(card.ok_or_else(missing_card)?),
            PaymentMethod::Debito => ChargeMethod::DebitCard(card.ok_or_else(missing_card)?),
            PaymentMethod::Link => {
                return Err(AppError::ValidationError(
                    "forma_pagamento: Pagamento por link deve usar iniciar-cadastro-aluno"
                        .to_string(),
                ))
            }
        };

        let customer = Self::customer_for(student);
        let customer_id = self
            .gateway
            .ensure_customer(&customer)
            .await
            .map_err(|e| gateway_failure("ensure_customer", e))?;

        let request = ChargeRequest {
            customer_id,
            customer,
            valor_centavos: self.price_for(student.plano),
            descricao: Self::description_for(student),
            method,
        };

        let charge = self
            .gateway
            .create_charge(&request)
            .await
            .map_err(|e| gateway_failure("create_charge", e))?;

        if let Some(reason) = rejection_reason(&charge) {
            info!(
                method = %student.forma_pagamento,
                reason = %reason,
                "Card payment rejected by gateway"
            );
            return Err(AppError::PaymentRejected(reason));
        }

        info!(
            charge_id = %charge.id,
            method = %student.forma_pagamento,
            valor_centavos = charge.valor_centavos,
            "Gateway charge created"
        );

        Ok(charge)
    }

    pub async fn charge_status(&self, charge_id: &str) -> AppResult<ChargeSnapshot> {
        self.gateway
            .get_charge_status(charge_id)
            .await
            .map_err(|e| gateway_failure("get_charge_status", e))
    }

    /// 請求先の顧客が CPF の顧客と同じか確認する
    ///
    /// ゲートウェイが請求先を返さない場合は照合しない。
    pub async fn ensure_charge_owner(&self, snapshot: &ChargeSnapshot, cpf: &str) -> AppResult<()> {
        let charge_customer = match snapshot.customer_id.as_deref() {
            Some(customer_id) => customer_id,
            None => return Ok(()),
        };

        let customer_id = self
            .gateway
            .find_customer(cpf)
            .await
            .map_err(|e| gateway_failure("find_customer", e))?;

        if customer_id.as_deref() == Some(charge_customer) {
            return Ok(());
        }

        warn!(
            charge_id = %snapshot.id,
            charge_customer = %charge_customer,
            "Charge belongs to another customer"
        );
        Err(AppError::ValidationError(
            "Pagamento não pertence ao aluno informado".to_string(),
        ))
    }

    /// 補償処理（失敗してもログのみ）
    pub async fn cancel_charge_best_effort(&self, charge_id: &str) {
        match self.gateway.cancel_charge(charge_id).await {
            Ok(()) => info!(charge_id = %charge_id, "Gateway charge cancelled"),
            Err(e) => warn!(
                charge_id = %charge_id,
                error = %e,
                "Failed to cancel gateway charge after persistence failure"
            ),
        }
    }

    pub async fn create_payment_link(&self, student: &ValidatedStudent) -> AppResult<PaymentLink> {
        let request = PaymentLinkRequest {
            nome: student.nome.clone(),
            descricao: Self::description_for(student),
            valor_centavos: self.price_for(student.plano),
        };

        self.gateway
            .create_payment_link(&request)
            .await
            .map_err(|e| gateway_failure("create_payment_link", e))
    }

    pub async fn payment_link_status(&self, link_id: &str) -> AppResult<PaymentLinkStatus> {
        self.gateway
            .get_payment_link_status(link_id)
            .await
            .map_err(|e| gateway_failure("get_payment_link_status", e))
    }
}

fn missing_card() -> AppError {
    AppError::ValidationError(
        "dados_cartao: Dados do cartão são obrigatórios para pagamento com cartão".to_string(),
    )
}

fn gateway_failure(operation: &str, err: GatewayError) -> AppError {
    tracing::error!(operation = %operation, error = %err, "Payment gateway call failed");
    AppError::PaymentError(err.user_message())
}

/// カード決済の拒否理由（承認時は None）
fn rejection_reason(charge: &Charge) -> Option<String> {
    match &charge.artifacts {
        ChargeArtifacts::Card { approved: false, reason } => Some(
            reason
                .clone()
                .unwrap_or_else(|| "Pagamento recusado pela operadora".to_string()),
        ),
        ChargeArtifacts::Card { .. } if charge.status == ChargeStatus::Declined => {
            Some("Pagamento recusado pela operadora".to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::development::DECLINED_CARD_SUFFIX;
    use crate::gateway::DevelopmentPaymentGateway;

    fn service() -> PaymentService {
        PaymentService::new(
            Arc::new(DevelopmentPaymentGateway::new()),
            PaymentConfig::for_testing(),
        )
    }

    fn student(forma_pagamento: PaymentMethod) -> ValidatedStudent {
        ValidatedStudent {
            nome: "Maria Souza".to_string(),
            email: "maria@example.com".to_string(),
            telefone: "11987654321".to_string(),
            cpf: "52998224725".to_string(),
            plano: PlanTier::Trimestral,
            forma_pagamento,
        }
    }

    fn card(number: &str) -> CardData {
        CardData {
            holder_name: "MARIA SOUZA".to_string(),
            number: number.to_string(),
            expiry_month: 12,
            expiry_year: 2030,
            cvv: "123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_boleto_charge_uses_plan_price() {
        let charge = service()
            .charge(&student(PaymentMethod::Boleto), None)
            .await
            .unwrap();

        assert_eq!(charge.valor_centavos, 26_990);
        assert!(matches!(charge.artifacts, ChargeArtifacts::Boleto { .. }));
    }

    #[tokio::test]
    async fn test_card_without_data_is_validation_error() {
        let err = service()
            .charge(&student(PaymentMethod::Credito), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_declined_card_is_rejected() {
        let number = format!("400000000000{}", DECLINED_CARD_SUFFIX);
        let err = service()
            .charge(&student(PaymentMethod::Debito), Some(card(&number)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PaymentRejected(_)));
        assert_eq!(err.kind().as_str(), "pagamento_rejeitado");
    }

    #[tokio::test]
    async fn test_link_method_cannot_be_charged_directly() {
        let err = service()
            .charge(&student(PaymentMethod::Link), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_charge_owner_must_match_cpf() {
        let service = service();
        let charge = service
            .charge(&student(PaymentMethod::Pix), None)
            .await
            .unwrap();
        let snapshot = service.charge_status(&charge.id).await.unwrap();

        assert!(service.ensure_charge_owner(&snapshot, "52998224725").await.is_ok());

        let err = service
            .ensure_charge_owner(&snapshot, "11144477735")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref message) if message.contains("não pertence")));
    }

    #[tokio::test]
    async fn test_charge_without_customer_is_not_checked() {
        let snapshot = ChargeSnapshot {
            id: "pay_sem_cliente".to_string(),
            status: ChargeStatus::Received,
            valor_centavos: 9_990,
            customer_id: None,
        };
        assert!(service()
            .ensure_charge_owner(&snapshot, "11144477735")
            .await
            .is_ok());
    }

    #[test]
    fn test_boleto_due_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(
            service().boleto_due_date(today),
            NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()
        );
    }
}
