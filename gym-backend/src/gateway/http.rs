// gym-backend/src/gateway/http.rs

//! REST/JSON 決済ゲートウェイクライアント（`access_token` ヘッダー認証）

use super::{
    centavos_to_reais, reais_to_centavos, Charge, ChargeArtifacts, ChargeMethod, ChargeRequest,
    ChargeSnapshot, ChargeStatus, GatewayCustomer, GatewayError, PaymentGateway, PaymentLink,
    PaymentLinkRequest, PaymentLinkStatus,
};
use crate::config::PaymentConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

// --- ワイヤ形式 ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerBody<'a> {
    name: &'a str,
    email: &'a str,
    cpf_cnpj: &'a str,
    mobile_phone: &'a str,
}

#[derive(Debug, Deserialize)]
struct IdBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListBody<T> {
    data: Vec<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreditCardBody<'a> {
    holder_name: &'a str,
    number: &'a str,
    expiry_month: String,
    expiry_year: String,
    ccv: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardHolderInfoBody<'a> {
    name: &'a str,
    email: &'a str,
    cpf_cnpj: &'a str,
    mobile_phone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentBody<'a> {
    customer: &'a str,
    billing_type: &'static str,
    value: f64,
    due_date: String,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    credit_card: Option<CreditCardBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credit_card_holder_info: Option<CardHolderInfoBody<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    id: String,
    #[serde(default)]
    customer: Option<String>,
    status: String,
    value: f64,
    #[serde(default)]
    bank_slip_url: Option<String>,
    #[serde(default)]
    invoice_url: Option<String>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentificationFieldResponse {
    identification_field: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixQrCodeResponse {
    encoded_image: String,
    payload: String,
    #[serde(default)]
    expiration_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentLinkBody<'a> {
    name: &'a str,
    description: &'a str,
    value: f64,
    billing_type: &'static str,
    charge_type: &'static str,
    due_date_limit_days: u32,
}

#[derive(Debug, Deserialize)]
struct PaymentLinkResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorsBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    description: String,
}

fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// エラーレスポンスから説明文を取り出す
fn error_description(body: &str) -> String {
    serde_json::from_str::<ErrorsBody>(body)
        .ok()
        .map(|parsed| {
            parsed
                .errors
                .into_iter()
                .map(|e| e.description)
                .filter(|d| !d.is_empty())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| "erro desconhecido".to_string())
}

pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gym-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("access_token", &self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_description(&body),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn boleto_artifacts(
        &self,
        payment: &PaymentResponse,
        due_date: NaiveDate,
    ) -> Result<ChargeArtifacts, GatewayError> {
        let field: IdentificationFieldResponse = self
            .send(
                self.client
                    .get(self.url(&format!("/payments/{}/identificationField", payment.id))),
            )
            .await?;

        let url = payment
            .bank_slip_url
            .clone()
            .or_else(|| payment.invoice_url.clone())
            .ok_or_else(|| GatewayError::InvalidResponse("missing bankSlipUrl".to_string()))?;

        Ok(ChargeArtifacts::Boleto {
            url,
            barcode: field.identification_field,
            due_date: payment.due_date.unwrap_or(due_date),
        })
    }

    async fn charge_artifacts(
        &self,
        method: &ChargeMethod,
        payment: &PaymentResponse,
        status: &ChargeStatus,
    ) -> Result<ChargeArtifacts, GatewayError> {
        match method {
            ChargeMethod::Boleto { due_date } => self.boleto_artifacts(payment, *due_date).await,
            ChargeMethod::Pix => self.pix_artifacts(&payment.id).await,
            ChargeMethod::CreditCard(_) | ChargeMethod::DebitCard(_) => Ok(ChargeArtifacts::Card {
                approved: status.is_paid(),
                reason: (!status.is_paid()).then(|| format!("Status {}", payment.status)),
            }),
        }
    }

    async fn pix_artifacts(&self, payment_id: &str) -> Result<ChargeArtifacts, GatewayError> {
        let qr: PixQrCodeResponse = self
            .send(
                self.client
                    .get(self.url(&format!("/payments/{}/pixQrCode", payment_id))),
            )
            .await?;

        Ok(ChargeArtifacts::Pix {
            payload: qr.payload,
            image_base64: qr.encoded_image,
            expires_at: qr.expiration_date.as_deref().and_then(parse_expiration),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn find_customer(&self, cpf: &str) -> Result<Option<String>, GatewayError> {
        let list: ListBody<IdBody> = self
            .send(
                self.client
                    .get(self.url("/customers"))
                    .query(&[("cpfCnpj", cpf)]),
            )
            .await?;
        Ok(list.data.into_iter().next().map(|c| c.id))
    }

    async fn ensure_customer(&self, customer: &GatewayCustomer) -> Result<String, GatewayError> {
        if let Some(existing) = self.find_customer(&customer.cpf).await? {
            debug!(customer_id = %existing, "Reusing gateway customer");
            return Ok(existing);
        }

        let created: IdBody = self
            .send(self.client.post(self.url("/customers")).json(&CustomerBody {
                name: &customer.nome,
                email: &customer.email,
                cpf_cnpj: &customer.cpf,
                mobile_phone: &customer.telefone,
            }))
            .await?;
        Ok(created.id)
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
        let today = Utc::now().date_naive();
        let due_date = match &request.method {
            ChargeMethod::Boleto { due_date } => *due_date,
            _ => today,
        };

        let card = request.method.card();
        let body = PaymentBody {
            customer: &request.customer_id,
            billing_type: request.method.billing_type(),
            value: centavos_to_reais(request.valor_centavos),
            due_date: due_date.format("%Y-%m-%d").to_string(),
            description: &request.descricao,
            credit_card: card.map(|card| CreditCardBody {
                holder_name: &card.holder_name,
                number: &card.number,
                expiry_month: format!("{:02}", card.expiry_month),
                expiry_year: card.expiry_year.to_string(),
                ccv: &card.cvv,
            }),
            credit_card_holder_info: card.map(|_| CardHolderInfoBody {
                name: &request.customer.nome,
                email: &request.customer.email,
                cpf_cnpj: &request.customer.cpf,
                mobile_phone: &request.customer.telefone,
            }),
        };

        let result: Result<PaymentResponse, GatewayError> = self
            .send(self.client.post(self.url("/payments")).json(&body))
            .await;

        // カードの拒否は 400 で返るため、エラーではなく否認として扱う
        let payment = match (result, card) {
            (Ok(payment), _) => payment,
            (Err(GatewayError::Api { status, message }), Some(_))
                if status == StatusCode::BAD_REQUEST.as_u16() =>
            {
                warn!(reason = %message, "Card charge declined by gateway");
                return Ok(Charge {
                    id: String::new(),
                    customer_id: request.customer_id.clone(),
                    status: ChargeStatus::Declined,
                    valor_centavos: request.valor_centavos,
                    artifacts: ChargeArtifacts::Card {
                        approved: false,
                        reason: Some(message),
                    },
                });
            }
            (Err(e), _) => return Err(e),
        };

        let status = ChargeStatus::from_gateway(&payment.status);
        let artifacts = match self.charge_artifacts(&request.method, &payment, &status).await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                // 請求は作成済みなので取り消してから失敗を返す
                warn!(charge_id = %payment.id, error = %e, "Fetching charge artifacts failed, cancelling charge");
                if let Err(cancel_err) = self.cancel_charge(&payment.id).await {
                    warn!(charge_id = %payment.id, error = %cancel_err, "Failed to cancel orphaned charge");
                }
                return Err(e);
            }
        };

        Ok(Charge {
            customer_id: payment
                .customer
                .clone()
                .unwrap_or_else(|| request.customer_id.clone()),
            valor_centavos: reais_to_centavos(payment.value),
            id: payment.id,
            status,
            artifacts,
        })
    }

    async fn get_charge_status(&self, charge_id: &str) -> Result<ChargeSnapshot, GatewayError> {
        let payment: PaymentResponse = self
            .send(self.client.get(self.url(&format!("/payments/{}", charge_id))))
            .await?;

        Ok(ChargeSnapshot {
            status: ChargeStatus::from_gateway(&payment.status),
            valor_centavos: reais_to_centavos(payment.value),
            customer_id: payment.customer,
            id: payment.id,
        })
    }

    async fn cancel_charge(&self, charge_id: &str) -> Result<(), GatewayError> {
        let _: serde_json::Value = self
            .send(self.client.delete(self.url(&format!("/payments/{}", charge_id))))
            .await?;
        Ok(())
    }

    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError> {
        let link: PaymentLinkResponse = self
            .send(self.client.post(self.url("/paymentLinks")).json(&PaymentLinkBody {
                name: &request.nome,
                description: &request.descricao,
                value: centavos_to_reais(request.valor_centavos),
                billing_type: "UNDEFINED",
                charge_type: "DETACHED",
                due_date_limit_days: 3,
            }))
            .await?;

        Ok(PaymentLink {
            id: link.id,
            url: link.url,
        })
    }

    async fn get_payment_link_status(
        &self,
        link_id: &str,
    ) -> Result<PaymentLinkStatus, GatewayError> {
        let payments: ListBody<PaymentResponse> = self
            .send(
                self.client
                    .get(self.url("/payments"))
                    .query(&[("paymentLink", link_id)]),
            )
            .await?;

        let paid = payments
            .data
            .into_iter()
            .find(|p| ChargeStatus::from_gateway(&p.status).is_paid());

        Ok(match paid {
            Some(payment) => PaymentLinkStatus {
                paid: true,
                valor_centavos: Some(reais_to_centavos(payment.value)),
                payment_id: Some(payment.id),
            },
            None => PaymentLinkStatus {
                paid: false,
                payment_id: None,
                valor_centavos: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanPricing;
    use axum::extract::{Path, State};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    type Deleted = Arc<Mutex<Vec<String>>>;

    // 請求の作成は成功し、QR コードの取得だけが 500 を返すゲートウェイ
    async fn spawn_gateway_without_qr_code(deleted: Deleted) -> String {
        let app = Router::new()
            .route(
                "/payments",
                post(|| async {
                    Json(serde_json::json!({
                        "id": "pay_sem_qrcode",
                        "customer": "cus_000005219613",
                        "status": "PENDING",
                        "value": 99.9,
                    }))
                }),
            )
            .route(
                "/payments/{id}/pixQrCode",
                get(|| async {
                    (
                        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({ "errors": [{ "description": "QR Code indisponível" }] })),
                    )
                }),
            )
            .route(
                "/payments/{id}",
                delete(
                    |State(deleted): State<Deleted>, Path(id): Path<String>| async move {
                        deleted.lock().unwrap().push(id.clone());
                        Json(serde_json::json!({ "deleted": true, "id": id }))
                    },
                ),
            )
            .with_state(deleted);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn gateway_at(api_url: String) -> HttpPaymentGateway {
        HttpPaymentGateway::new(&PaymentConfig {
            development_mode: false,
            api_url,
            api_key: "chave_teste".to_string(),
            timeout_secs: 5,
            boleto_due_days: 3,
            plan_prices: PlanPricing::default(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_charge_is_cancelled_when_pix_qr_code_fails() {
        let deleted = Deleted::default();
        let gateway = gateway_at(spawn_gateway_without_qr_code(deleted.clone()).await);

        let request = ChargeRequest {
            customer_id: "cus_000005219613".to_string(),
            customer: GatewayCustomer {
                nome: "Maria Souza".to_string(),
                email: "maria@example.com".to_string(),
                cpf: "52998224725".to_string(),
                telefone: "11987654321".to_string(),
            },
            valor_centavos: 9_990,
            descricao: "Plano Mensal".to_string(),
            method: ChargeMethod::Pix,
        };

        let err = gateway.create_charge(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::Api { status: 500, .. }), "{:?}", err);
        assert_eq!(*deleted.lock().unwrap(), vec!["pay_sem_qrcode".to_string()]);
    }

    #[test]
    fn test_payment_body_wire_format() {
        let body = PaymentBody {
            customer: "cus_000005219613",
            billing_type: "BOLETO",
            value: centavos_to_reais(9_990),
            due_date: "2025-06-18".to_string(),
            description: "Plano Mensal",
            credit_card: None,
            credit_card_holder_info: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["billingType"], "BOLETO");
        assert_eq!(json["value"], 99.9);
        assert_eq!(json["dueDate"], "2025-06-18");
        assert!(json.get("creditCard").is_none());
    }

    #[test]
    fn test_payment_response_parsing() {
        let payment: PaymentResponse = serde_json::from_str(
            r#"{
                "object": "payment",
                "id": "pay_080225913252",
                "customer": "cus_G7Dvo4iphUNk",
                "status": "PENDING",
                "value": 269.9,
                "bankSlipUrl": "https://sandbox.example/b/pdf/080225913252",
                "dueDate": "2025-06-18"
            }"#,
        )
        .unwrap();

        assert_eq!(payment.id, "pay_080225913252");
        assert_eq!(reais_to_centavos(payment.value), 26_990);
        assert_eq!(
            payment.due_date,
            NaiveDate::from_ymd_opt(2025, 6, 18)
        );
    }

    #[test]
    fn test_error_description() {
        let body = r#"{"errors":[{"code":"invalid_creditCard","description":"Transação não autorizada"}]}"#;
        assert_eq!(error_description(body), "Transação não autorizada");
        assert_eq!(error_description("<html>"), "erro desconhecido");
    }

    #[test]
    fn test_parse_expiration() {
        let parsed = parse_expiration("2025-06-16 23:59:59").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-06-16T23:59:59+00:00");
        assert!(parse_expiration("amanhã").is_none());
    }
}
