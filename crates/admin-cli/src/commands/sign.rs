//! 요청 본문 서명 기능.

use admin_auth::{canonical_string, sign, SignRequest, Signature};
use admin_core::SharedSecret;
use anyhow::{bail, Context, Result};
use std::fs;

/// 정규 문자열 출력 시 시크릿 자리에 표시할 값.
const MASKED_SECRET: &str = "********";

/// 서명 설정.
#[derive(Debug)]
pub struct SignConfig {
    /// JSON 본문 문자열
    pub body: Option<String>,
    /// JSON 본문 파일 경로
    pub file: Option<String>,
    /// 정규 문자열도 출력
    pub show_canonical: bool,
}

/// 서명 결과.
#[derive(Debug)]
pub struct SignOutput {
    pub signature: Signature,
    /// 시크릿이 가려진 정규 문자열
    pub canonical: Option<String>,
}

/// `--body` 또는 `--file`에서 본문을 읽습니다.
pub fn read_request(config: &SignConfig) -> Result<SignRequest> {
    let raw = match (&config.body, &config.file) {
        (Some(body), None) => body.clone(),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        (Some(_), Some(_)) => bail!("Use either --body or --file, not both"),
        (None, None) => bail!("Request body required: --body <json> or --file <path>"),
    };

    Ok(SignRequest::from_json_str(&raw)?)
}

/// 본문에 서명합니다.
pub fn sign_body(config: &SignConfig, secret: &SharedSecret) -> Result<SignOutput> {
    let request = read_request(config)?;
    let signature = sign(&request, secret)?;
    let canonical = config
        .show_canonical
        .then(|| canonical_string(&request, MASKED_SECRET));

    Ok(SignOutput {
        signature,
        canonical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn body_config(body: &str, show_canonical: bool) -> SignConfig {
        SignConfig {
            body: Some(body.to_string()),
            file: None,
            show_canonical,
        }
    }

    #[test]
    fn test_sign_inline_body() {
        let secret = SharedSecret::new("K").unwrap();
        let output = sign_body(&body_config(r#"{"b": 2, "a": 1}"#, false), &secret).unwrap();

        assert_eq!(
            output.signature.as_str(),
            "b1746d1e2c41116a5f9f1c397f9f04b54a9dbfb7fbf213bcac80a5c277feea99"
        );
        assert!(output.canonical.is_none());
    }

    #[test]
    fn test_canonical_hides_secret() {
        let secret = SharedSecret::new("top-secret").unwrap();
        let output = sign_body(&body_config(r#"{"a": 1}"#, true), &secret).unwrap();

        let canonical = output.canonical.unwrap();
        assert_eq!(canonical, "a=1&********");
        assert!(!canonical.contains("top-secret"));
    }

    #[test]
    fn test_sign_from_file() {
        let path = std::env::temp_dir().join(format!("admin-cli-sign-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"a": 1, "b": 2}}"#).unwrap();

        let config = SignConfig {
            body: None,
            file: Some(path.to_string_lossy().into_owned()),
            show_canonical: false,
        };
        let secret = SharedSecret::new("K").unwrap();
        let output = sign_body(&config, &secret).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(
            output.signature.as_str(),
            "b1746d1e2c41116a5f9f1c397f9f04b54a9dbfb7fbf213bcac80a5c277feea99"
        );
    }

    #[test]
    fn test_body_source_is_required() {
        let config = SignConfig {
            body: None,
            file: None,
            show_canonical: false,
        };
        assert!(read_request(&config).is_err());
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(read_request(&body_config("[1, 2]", false)).is_err());
    }
}
