//! 로그인 점검 기능.

use admin_auth::{AccessGate, LoginService, Principal, Role, SessionStore, SignRequest};
use admin_core::AppConfig;
use anyhow::{anyhow, Result};
use tracing::info;

/// 로그인 결과 요약.
#[derive(Debug)]
pub struct LoginSummary {
    pub role: Role,
    /// 역할의 랜딩 경로
    pub landing: String,
}

/// `key=value` 형식의 필드를 파싱합니다.
pub fn parse_field(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid field: {}. Expected key=value", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Invalid field: {}. Key must not be empty", raw));
    }

    Ok((key.to_string(), value.to_string()))
}

/// 필드 목록으로 로그인 요청 본문을 만듭니다.
pub fn build_request(fields: &[String]) -> Result<SignRequest> {
    let pairs = fields
        .iter()
        .map(|raw| parse_field(raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(SignRequest::from_pairs(pairs))
}

/// 설정된 API 서버에 로그인합니다.
pub async fn run_login(config: &AppConfig, fields: &[String]) -> Result<LoginSummary> {
    let request = build_request(fields)?;
    let service = LoginService::from_config(config, SessionStore::new())?;

    let session = service.login(&request).await?;
    let gate = AccessGate::from_config(&config.routes);
    let landing = gate
        .landing()
        .path_for(Principal::Authenticated(session.role))
        .to_string();

    info!(role = %session.role, landing = %landing, "Login check completed");

    Ok(LoginSummary {
        role: session.role,
        landing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("username=ops").unwrap(),
            ("username".to_string(), "ops".to_string())
        );
        // 값에 포함된 '='는 유지
        assert_eq!(
            parse_field("password=a=b").unwrap(),
            ("password".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_field("captcha=").unwrap(),
            ("captcha".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_field_invalid() {
        assert!(parse_field("username").is_err());
        assert!(parse_field("=ops").is_err());
    }

    #[test]
    fn test_build_request() {
        let fields = vec!["username=ops".to_string(), "otp=123456".to_string()];
        let request = build_request(&fields).unwrap();

        assert_eq!(request.fields().len(), 2);
        assert_eq!(request.fields()["otp"], "123456");
    }

    #[tokio::test]
    async fn test_login_without_secret_fails() {
        let config = AppConfig::default();
        let result = run_login(&config, &["username=ops".to_string()]).await;

        assert!(result.is_err());
    }
}
