// tests/common/mock_gateway.rs

//! 台本付きの決済ゲートウェイ
//!
//! 既定の振る舞いは開発用ゲートウェイに委ね、失敗や支払い状態だけを差し替える。

use async_trait::async_trait;
use gym_backend::gateway::{
    Charge, ChargeRequest, ChargeSnapshot, ChargeStatus, DevelopmentPaymentGateway,
    GatewayCustomer, GatewayError, PaymentGateway, PaymentLink, PaymentLinkRequest,
    PaymentLinkStatus,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockPaymentGateway {
    inner: DevelopmentPaymentGateway,
    charge_failure: Mutex<Option<String>>,
    repeated_charge_id: Mutex<Option<String>>,
    charge_statuses: Mutex<HashMap<String, ChargeSnapshot>>,
    created: Mutex<Vec<String>>,
    cancelled: Mutex<Vec<String>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の請求作成を API エラーにする
    pub fn fail_next_charge(&self, message: &str) {
        *self.charge_failure.lock().unwrap() = Some(message.to_string());
    }

    /// 次の請求に既存の請求 ID を返させる（保存時の一意制約違反を起こす）
    pub fn repeat_charge_id_once(&self, charge_id: &str) {
        *self.repeated_charge_id.lock().unwrap() = Some(charge_id.to_string());
    }

    /// 請求の状態を固定する
    pub fn script_charge(&self, charge_id: &str, status: ChargeStatus, valor_centavos: i64) {
        self.charge_statuses.lock().unwrap().insert(
            charge_id.to_string(),
            ChargeSnapshot {
                id: charge_id.to_string(),
                status,
                valor_centavos,
                customer_id: None,
            },
        );
    }

    pub fn created_charges(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn cancelled_charges(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn find_customer(&self, cpf: &str) -> Result<Option<String>, GatewayError> {
        self.inner.find_customer(cpf).await
    }

    async fn ensure_customer(&self, customer: &GatewayCustomer) -> Result<String, GatewayError> {
        self.inner.ensure_customer(customer).await
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
        if let Some(message) = self.charge_failure.lock().unwrap().take() {
            return Err(GatewayError::Api {
                status: 400,
                message,
            });
        }

        let mut charge = self.inner.create_charge(request).await?;
        if let Some(repeated) = self.repeated_charge_id.lock().unwrap().take() {
            charge.id = repeated;
        }
        if !charge.id.is_empty() {
            self.created.lock().unwrap().push(charge.id.clone());
        }
        Ok(charge)
    }

    async fn get_charge_status(&self, charge_id: &str) -> Result<ChargeSnapshot, GatewayError> {
        let scripted = self.charge_statuses.lock().unwrap().get(charge_id).cloned();
        match scripted {
            Some(snapshot) => Ok(snapshot),
            None => self.inner.get_charge_status(charge_id).await,
        }
    }

    async fn cancel_charge(&self, charge_id: &str) -> Result<(), GatewayError> {
        self.cancelled.lock().unwrap().push(charge_id.to_string());
        self.inner.cancel_charge(charge_id).await
    }

    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError> {
        self.inner.create_payment_link(request).await
    }

    async fn get_payment_link_status(
        &self,
        link_id: &str,
    ) -> Result<PaymentLinkStatus, GatewayError> {
        self.inner.get_payment_link_status(link_id).await
    }
}
