// gym-backend/src/gateway/development.rs

//! 開発モード用ゲートウェイ（外部通信なし）
//!
//! 生成した請求は即時に支払い済みとして扱う。末尾 `0002` のカード番号は拒否される。

use super::{
    Charge, ChargeArtifacts, ChargeMethod, ChargeRequest, ChargeSnapshot, ChargeStatus,
    GatewayCustomer, GatewayError, PaymentGateway, PaymentLink, PaymentLinkRequest,
    PaymentLinkStatus,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

pub const DECLINED_CARD_SUFFIX: &str = "0002";

#[derive(Default)]
pub struct DevelopmentPaymentGateway {
    charges: Mutex<HashMap<String, ChargeSnapshot>>,
    links: Mutex<HashMap<String, i64>>,
}

impl DevelopmentPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(&self, snapshot: ChargeSnapshot) {
        if let Ok(mut charges) = self.charges.lock() {
            charges.insert(snapshot.id.clone(), snapshot);
        }
    }
}

fn mock_barcode(charge_id: &str) -> String {
    // 47 桁の数字列（デジタブルライン相当）
    let digits: String = charge_id
        .bytes()
        .map(|b| char::from(b'0' + b % 10))
        .collect();
    format!("{:0<47}", format!("23793381286{}", digits))
        .chars()
        .take(47)
        .collect()
}

#[async_trait]
impl PaymentGateway for DevelopmentPaymentGateway {
    async fn find_customer(&self, cpf: &str) -> Result<Option<String>, GatewayError> {
        Ok(Some(format!("cus_dev_{}", cpf)))
    }

    async fn ensure_customer(&self, customer: &GatewayCustomer) -> Result<String, GatewayError> {
        Ok(format!("cus_dev_{}", customer.cpf))
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
        let id = format!("pay_dev_{}", Uuid::new_v4().simple());

        if let Some(card) = request.method.card() {
            if card.number.ends_with(DECLINED_CARD_SUFFIX) {
                info!(last_four = %card.last_four(), "Development gateway declining card");
                return Ok(Charge {
                    id: String::new(),
                    customer_id: request.customer_id.clone(),
                    status: ChargeStatus::Declined,
                    valor_centavos: request.valor_centavos,
                    artifacts: ChargeArtifacts::Card {
                        approved: false,
                        reason: Some("Transação não autorizada pelo emissor".to_string()),
                    },
                });
            }
        }

        let (status, artifacts) = match &request.method {
            ChargeMethod::Boleto { due_date } => (
                ChargeStatus::Pending,
                ChargeArtifacts::Boleto {
                    url: format!("https://sandbox.pagamentos.local/boleto/{}", id),
                    barcode: mock_barcode(&id),
                    due_date: *due_date,
                },
            ),
            ChargeMethod::Pix => (
                ChargeStatus::Pending,
                ChargeArtifacts::Pix {
                    payload: format!("00020126580014br.gov.bcb.pix0136{}5204000053039865802BR", id),
                    image_base64: "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==".to_string(),
                    expires_at: Some(Utc::now() + Duration::hours(24)),
                },
            ),
            ChargeMethod::CreditCard(_) | ChargeMethod::DebitCard(_) => (
                ChargeStatus::Confirmed,
                ChargeArtifacts::Card {
                    approved: true,
                    reason: None,
                },
            ),
        };

        // 開発モードでは後続の状態確認で支払い済みとして返す
        self.remember(ChargeSnapshot {
            id: id.clone(),
            status: ChargeStatus::Received,
            valor_centavos: request.valor_centavos,
            customer_id: Some(request.customer_id.clone()),
        });

        Ok(Charge {
            id,
            customer_id: request.customer_id.clone(),
            status,
            valor_centavos: request.valor_centavos,
            artifacts,
        })
    }

    async fn get_charge_status(&self, charge_id: &str) -> Result<ChargeSnapshot, GatewayError> {
        self.charges
            .lock()
            .ok()
            .and_then(|charges| charges.get(charge_id).cloned())
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                message: format!("Cobrança {} não encontrada", charge_id),
            })
    }

    async fn cancel_charge(&self, charge_id: &str) -> Result<(), GatewayError> {
        if let Ok(mut charges) = self.charges.lock() {
            charges.remove(charge_id);
        }
        Ok(())
    }

    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError> {
        let id = format!("lnk_dev_{}", Uuid::new_v4().simple());
        if let Ok(mut links) = self.links.lock() {
            links.insert(id.clone(), request.valor_centavos);
        }
        Ok(PaymentLink {
            url: format!("https://sandbox.pagamentos.local/c/{}", id),
            id,
        })
    }

    async fn get_payment_link_status(
        &self,
        link_id: &str,
    ) -> Result<PaymentLinkStatus, GatewayError> {
        let valor = self
            .links
            .lock()
            .ok()
            .and_then(|links| links.get(link_id).copied())
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                message: format!("Link {} não encontrado", link_id),
            })?;

        Ok(PaymentLinkStatus {
            paid: true,
            payment_id: Some(format!("pay_dev_{}", link_id.trim_start_matches("lnk_dev_"))),
            valor_centavos: Some(valor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CardData;
    use chrono::NaiveDate;

    fn request(method: ChargeMethod) -> ChargeRequest {
        ChargeRequest {
            customer_id: "cus_dev_52998224725".to_string(),
            customer: GatewayCustomer {
                nome: "Maria Souza".to_string(),
                email: "maria@example.com".to_string(),
                cpf: "52998224725".to_string(),
                telefone: "11987654321".to_string(),
            },
            valor_centavos: 9_990,
            descricao: "Plano Mensal".to_string(),
            method,
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
    async fn test_card_ending_0002_is_declined() {
        let gateway = DevelopmentPaymentGateway::new();
        let charge = gateway
            .create_charge(&request(ChargeMethod::CreditCard(card("4000000000000002"))))
            .await
            .unwrap();

        assert_eq!(charge.status, ChargeStatus::Declined);
        assert!(matches!(
            charge.artifacts,
            ChargeArtifacts::Card { approved: false, .. }
        ));
    }

    #[tokio::test]
    async fn test_boleto_artifacts() {
        let gateway = DevelopmentPaymentGateway::new();
        let due = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        let charge = gateway
            .create_charge(&request(ChargeMethod::Boleto { due_date: due }))
            .await
            .unwrap();

        match charge.artifacts {
            ChargeArtifacts::Boleto {
                barcode, due_date, ..
            } => {
                assert_eq!(barcode.len(), 47);
                assert!(barcode.chars().all(|c| c.is_ascii_digit()));
                assert_eq!(due_date, due);
            }
            other => panic!("unexpected artifacts: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pix_charge_reads_back_as_paid() {
        let gateway = DevelopmentPaymentGateway::new();
        let charge = gateway
            .create_charge(&request(ChargeMethod::Pix))
            .await
            .unwrap();

        let snapshot = gateway.get_charge_status(&charge.id).await.unwrap();
        assert!(snapshot.status.is_paid());
        assert_eq!(snapshot.valor_centavos, 9_990);
        assert_eq!(snapshot.customer_id.as_deref(), Some("cus_dev_52998224725"));

        assert!(gateway.get_charge_status("pay_unknown").await.is_err());
    }
}
