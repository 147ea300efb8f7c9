// src/utils/jwt.rs

use crate::domain::actor::ActorContext;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use uuid::Uuid;

/// JWT関連のエラー
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to decode JWT: {0}")]
    DecodingError(String),

    #[error("JWT token has expired")]
    TokenExpired,

    #[error("Missing JWT secret key")]
    MissingSecretKey,

    #[error("Invalid JWT configuration: {0}")]
    ConfigurationError(String),
}

/// アクセストークンのClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Not before
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID
    pub jti: String,
    /// 操作者とテナントスコープ
    #[serde(flatten)]
    pub actor: ActorContext,
}

/// JWT設定
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT秘密鍵
    pub secret_key: String,
    /// アクセストークンの有効期限（分）
    pub access_token_expiry_minutes: i64,
    /// 発行者
    pub issuer: String,
}

impl JwtConfig {
    /// 環境変数から設定を読み込み
    pub fn from_env() -> Result<Self, JwtError> {
        let secret_key = env::var("JWT_SECRET").map_err(|_| JwtError::MissingSecretKey)?;

        let access_token_expiry_minutes = env::var("JWT_EXPIRY_MINUTES")
            .unwrap_or_else(|_| "480".to_string())
            .parse()
            .map_err(|_| JwtError::ConfigurationError("Invalid token expiry".to_string()))?;

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "gym-backend".to_string());

        Ok(Self {
            secret_key,
            access_token_expiry_minutes,
            issuer,
        })
    }

    /// 秘密鍵の検証
    pub fn validate(&self) -> Result<(), JwtError> {
        if self.secret_key.len() < 32 {
            return Err(JwtError::ConfigurationError(
                "JWT secret key must be at least 32 characters".to_string(),
            ));
        }

        if self.access_token_expiry_minutes <= 0 {
            return Err(JwtError::ConfigurationError(
                "Access token expiry must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// JWTトークン管理
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Result<Self, JwtError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// アクセストークンを生成
    pub fn generate_access_token(&self, actor: &ActorContext) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.access_token_expiry_minutes);

        let claims = AccessTokenClaims {
            sub: actor.id_usuario.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
            actor: actor.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(JwtError::EncodingError)
    }

    /// アクセストークンを検証・デコード
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// トークンの有効期限（秒）
    pub fn expires_in_seconds(&self) -> i64 {
        self.config.access_token_expiry_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permission::{ModulePermissions, PermissionSet};

    fn create_test_config() -> JwtConfig {
        JwtConfig {
            secret_key: "test-secret-key-must-be-at-least-32-characters-long".to_string(),
            access_token_expiry_minutes: 15,
            issuer: "test-issuer".to_string(),
        }
    }

    fn create_test_actor() -> ActorContext {
        ActorContext {
            id_usuario: Uuid::new_v4(),
            id_empresa: Uuid::new_v4(),
            id_filial: Uuid::new_v4(),
            id_perfil: Uuid::new_v4(),
            nome_usuario: "Recepção Centro".to_string(),
            permissoes: PermissionSet {
                alunos: Some(ModulePermissions::full()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_jwt_generation_and_verification() {
        let jwt_manager = JwtManager::new(create_test_config()).unwrap();
        let actor = create_test_actor();

        let token = jwt_manager.generate_access_token(&actor).unwrap();
        assert!(!token.is_empty());

        let claims = jwt_manager.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, actor.id_usuario.to_string());
        assert_eq!(claims.actor, actor);
    }

    #[test]
    fn test_invalid_secret_key() {
        let mut config = create_test_config();
        config.secret_key = "short".to_string(); // 短すぎる秘密鍵

        assert!(JwtManager::new(config).is_err());
    }

    #[test]
    fn test_token_from_other_issuer_is_rejected() {
        let issuer_a = JwtManager::new(create_test_config()).unwrap();
        let mut other = create_test_config();
        other.issuer = "other-issuer".to_string();
        let issuer_b = JwtManager::new(other).unwrap();

        let token = issuer_a
            .generate_access_token(&create_test_actor())
            .unwrap();
        assert!(matches!(
            issuer_b.verify_access_token(&token),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let jwt_manager = JwtManager::new(create_test_config()).unwrap();
        let token = jwt_manager
            .generate_access_token(&create_test_actor())
            .unwrap();
        let tampered = format!("{}x", token);
        assert!(jwt_manager.verify_access_token(&tampered).is_err());
    }
}
