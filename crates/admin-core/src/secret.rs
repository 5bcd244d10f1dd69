//! 로그인 요청 서명용 공유 시크릿.
//!
//! 시크릿은 보안 설정에서만 로드합니다. 설정이 없으면 서명을 거부하며,
//! 개발 환경에서 명시적으로 허용한 경우에만 플레이스홀더를 사용합니다.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use crate::config::{AppConfig, Environment, SigningConfig};
use crate::error::{AdminError, AdminResult};

/// 개발 전용 플레이스홀더 시크릿. 운영 환경에서는 절대 사용되지 않습니다.
pub const DEVELOPMENT_PLACEHOLDER_SECRET: &str = "development-signing-secret-change-me";

/// 공유 시크릿.
///
/// 전송되지 않으며 서명 재료로만 사용됩니다. `Debug`는 값을 마스킹합니다.
pub struct SharedSecret {
    inner: SecretString,
    placeholder: bool,
}

impl SharedSecret {
    /// 값에서 시크릿 생성. 빈 문자열은 거부합니다.
    pub fn new(value: impl Into<String>) -> AdminResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AdminError::SecretNotConfigured);
        }

        Ok(Self {
            inner: SecretString::from(value),
            placeholder: false,
        })
    }

    /// 서명 설정에서 시크릿을 결정합니다.
    ///
    /// 1. 설정된 값이 있으면 그대로 사용
    /// 2. 개발 환경 + `allow_placeholder = true`면 플레이스홀더 사용
    /// 3. 그 외에는 `SecretNotConfigured`
    pub fn resolve(signing: &SigningConfig, environment: Environment) -> AdminResult<Self> {
        match signing.secret.as_deref() {
            Some(secret) if !secret.is_empty() => Self::new(secret),
            _ if environment.is_development() && signing.allow_placeholder => {
                tracing::warn!("Signing secret not configured, using development placeholder");
                Ok(Self {
                    inner: SecretString::from(DEVELOPMENT_PLACEHOLDER_SECRET),
                    placeholder: true,
                })
            }
            _ => {
                tracing::error!(
                    environment = ?environment,
                    "Signing secret not configured, refusing to sign"
                );
                Err(AdminError::SecretNotConfigured)
            }
        }
    }

    /// 애플리케이션 설정에서 시크릿을 결정합니다.
    pub fn from_config(config: &AppConfig) -> AdminResult<Self> {
        Self::resolve(&config.signing, config.environment)
    }

    /// 서명 계산용으로 시크릿 값을 노출합니다.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// 개발 플레이스홀더 여부.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("value", &"***REDACTED***")
            .field("placeholder", &self.placeholder)
            .finish()
    }
}
