//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수(`ADMIN__` 접두사) 순으로 설정을 병합합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 환경 변수 접두사 (예: `ADMIN__SIGNING__SECRET`).
pub const ENV_PREFIX: &str = "ADMIN";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 실행 환경
    pub environment: Environment,
    /// 관리자 API 설정
    pub api: ApiConfig,
    /// 요청 서명 설정
    pub signing: SigningConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 역할별 기본 랜딩 경로
    pub routes: RoutesConfig,
}

/// 실행 환경.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// 로컬 개발
    Development,
    /// 운영
    #[default]
    Production,
}

impl Environment {
    /// 개발 환경 여부.
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// 관리자 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 로그인 엔드포인트 경로
    pub login_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 30,
            login_path: "/admin-login".to_string(),
        }
    }
}

/// 요청 서명 설정.
///
/// # 보안
/// - `Debug` 구현은 `secret`을 마스킹합니다.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// 공유 시크릿 (미설정 시 서명 거부)
    pub secret: Option<String>,
    /// 개발 환경에서 플레이스홀더 시크릿 허용 여부
    pub allow_placeholder: bool,
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = self.secret.as_ref().map(|_| "***REDACTED***");
        f.debug_struct("SigningConfig")
            .field("secret", &secret)
            .field("allow_placeholder", &self.allow_placeholder)
            .finish()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 역할별 기본 랜딩 경로.
///
/// 접근이 거부되었을 때 리다이렉트할 경로입니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// 미인증 사용자
    pub unauthenticated: String,
    /// 관리자
    pub admin: String,
    /// 운영자
    pub operator: String,
    /// 뷰어
    pub viewer: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            unauthenticated: "/login".to_string(),
            admin: "/dashboard".to_string(),
            operator: "/bank-requests".to_string(),
            viewer: "/prices".to_string(),
        }
    }
}

/// `ADMIN__SECTION__KEY` 환경 변수 소스.
///
/// 값은 문자열 그대로 둡니다. 숫자 모양의 시크릿(`007123`)이 정수로 바뀌지 않도록
/// 타입 변환은 역직렬화 시점에 필드 타입에 맞춰 이루어집니다.
fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).separator("__")
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, env_source())
    }

    fn load_with_env<P: AsRef<Path>>(
        path: P,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("api.base_url", ApiConfig::default().base_url)?
            .set_default("api.login_path", ApiConfig::default().login_path)?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(env);

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.api.login_path, "/admin-login");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.signing.secret.is_none());
        assert!(!config.signing.allow_placeholder);
        assert_eq!(config.routes.unauthenticated, "/login");
        assert_eq!(config.routes.admin, "/dashboard");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let toml = r#"
            environment = "development"

            [signing]
            secret = "from-file"

            [routes]
            viewer = "/market/prices"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.environment.is_development());
        assert_eq!(config.signing.secret.as_deref(), Some("from-file"));
        assert_eq!(config.routes.viewer, "/market/prices");
        assert_eq!(config.routes.admin, "/dashboard");
        assert_eq!(config.api.login_path, "/admin-login");
    }

    fn load_with_vars(vars: &[(&str, &str)]) -> AppConfig {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();

        AppConfig::load_with_env("does/not/exist.toml", env_source().source(Some(source))).unwrap()
    }

    #[test]
    fn test_numeric_looking_secret_kept_verbatim() {
        let config = load_with_vars(&[("ADMIN__SIGNING__SECRET", "007123")]);
        assert_eq!(config.signing.secret.as_deref(), Some("007123"));
        assert_eq!(
            crate::SharedSecret::from_config(&config).unwrap().expose(),
            "007123"
        );

        let config = load_with_vars(&[("ADMIN__SIGNING__SECRET", "12345678901234567890123")]);
        assert_eq!(
            config.signing.secret.as_deref(),
            Some("12345678901234567890123")
        );
    }

    #[test]
    fn test_env_values_still_typed_by_field() {
        let config = load_with_vars(&[
            ("ADMIN__API__TIMEOUT_SECS", "15"),
            ("ADMIN__SIGNING__ALLOW_PLACEHOLDER", "true"),
            ("ADMIN__ENVIRONMENT", "development"),
        ]);

        assert_eq!(config.api.timeout_secs, 15);
        assert!(config.signing.allow_placeholder);
        assert!(config.environment.is_development());
    }

    #[test]
    fn test_signing_debug_is_redacted() {
        let signing = SigningConfig {
            secret: Some("super-secret".to_string()),
            allow_placeholder: false,
        };

        let debug = format!("{:?}", signing);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
