use crate::domain::plan::PlanTier;
use std::env;

/// プラン別の料金（センタボ単位）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanPricing {
    pub mensal: i64,
    pub trimestral: i64,
    pub semestral: i64,
    pub anual: i64,
}

impl Default for PlanPricing {
    fn default() -> Self {
        Self {
            mensal: 9_990,
            trimestral: 26_990,
            semestral: 49_990,
            anual: 89_990,
        }
    }
}

impl PlanPricing {
    pub fn price_for(&self, plan: PlanTier) -> i64 {
        match plan {
            PlanTier::Mensal => self.mensal,
            PlanTier::Trimestral => self.trimestral,
            PlanTier::Semestral => self.semestral,
            PlanTier::Anual => self.anual,
        }
    }

    fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            mensal: read_price("PLAN_PRICE_MENSAL", defaults.mensal)?,
            trimestral: read_price("PLAN_PRICE_TRIMESTRAL", defaults.trimestral)?,
            semestral: read_price("PLAN_PRICE_SEMESTRAL", defaults.semestral)?,
            anual: read_price("PLAN_PRICE_ANUAL", defaults.anual)?,
        })
    }
}

fn read_price(key: &str, default: i64) -> Result<i64, String> {
    match env::var(key) {
        Ok(raw) => {
            let value: i64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("Invalid {} value", key))?;
            if value <= 0 {
                return Err(format!("{} must be positive", key));
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub development_mode: bool,
    pub api_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub boleto_due_days: i64,
    pub plan_prices: PlanPricing,
}

impl PaymentConfig {
    pub fn from_env() -> Result<Self, String> {
        let development_mode = env::var("PAYMENT_DEVELOPMENT_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let timeout_secs = env::var("PAYMENT_GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| "Invalid PAYMENT_GATEWAY_TIMEOUT_SECS value")?;

        let boleto_due_days = env::var("BOLETO_DUE_DAYS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| "Invalid BOLETO_DUE_DAYS value")?;

        let plan_prices = PlanPricing::from_env()?;

        if development_mode {
            tracing::info!("Payment development mode enabled - using mock gateway responses");
            return Ok(Self {
                development_mode: true,
                api_url: String::new(),
                api_key: String::new(),
                timeout_secs,
                boleto_due_days,
                plan_prices,
            });
        }

        // 本番/サンドボックスモードの設定
        let api_url = env::var("PAYMENT_GATEWAY_URL")
            .map_err(|_| "PAYMENT_GATEWAY_URL must be set when not in development mode")?;
        let api_key = env::var("PAYMENT_GATEWAY_API_KEY")
            .map_err(|_| "PAYMENT_GATEWAY_API_KEY must be set when not in development mode")?;

        Ok(Self {
            development_mode: false,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs,
            boleto_due_days,
            plan_prices,
        })
    }

    /// テスト用の設定（開発モード）
    pub fn for_testing() -> Self {
        Self {
            development_mode: true,
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: 5,
            boleto_due_days: 3,
            plan_prices: PlanPricing::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_for_each_plan() {
        let pricing = PlanPricing::default();
        assert_eq!(pricing.price_for(PlanTier::Mensal), 9_990);
        assert_eq!(pricing.price_for(PlanTier::Anual), 89_990);
        assert!(pricing.price_for(PlanTier::Trimestral) < pricing.price_for(PlanTier::Semestral));
    }
}
