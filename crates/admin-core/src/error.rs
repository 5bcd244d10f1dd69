//! 관리자 대시보드의 에러 타입.
//!
//! 서명, 로그인, 요청 파이프라인, 접근 제어에서 공통으로 사용하는 분류 체계입니다.

use thiserror::Error;

/// 인증/인가 코어 에러.
#[derive(Debug, Error)]
pub enum AdminError {
    /// 서명 입력이 JSON 객체가 아님
    #[error("잘못된 서명 입력: {0}")]
    MalformedInput(String),

    /// 해시 계산 실패
    #[error("서명 실패: {0}")]
    SigningFailure(String),

    /// 세션이 필요하지만 존재하지 않음
    #[error("인증이 필요합니다")]
    Unauthenticated,

    /// 세션은 있으나 역할이 허용 목록에 없음
    #[error("권한이 부족합니다: {role}")]
    Forbidden { role: String },

    /// 로그인 거부 (서버 응답 상세는 노출하지 않음)
    #[error("인증에 실패했습니다")]
    AuthenticationFailed,

    /// 네트워크/서버 에러
    #[error("요청 실패: {message}")]
    TransportFailure {
        /// HTTP 상태 코드 (응답을 받은 경우)
        status: Option<u16>,
        message: String,
    },

    /// 공유 시크릿 미설정
    #[error("서명 시크릿이 설정되지 않았습니다")]
    SecretNotConfigured,

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 코어 작업을 위한 Result 타입.
pub type AdminResult<T> = Result<T, AdminError>;

impl AdminError {
    /// 응답 없이 실패한 전송 에러 생성.
    pub fn transport(message: impl Into<String>) -> Self {
        AdminError::TransportFailure {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP 상태 코드를 포함한 전송 에러 생성.
    pub fn transport_status(status: u16, message: impl Into<String>) -> Self {
        AdminError::TransportFailure {
            status: Some(status),
            message: message.into(),
        }
    }

    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 서명 에러는 입력이 바뀌지 않는 한 같은 결과를 내므로 재시도 대상이 아닙니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdminError::TransportFailure { .. })
    }

    /// 현재 작업(로그인 등)을 중단해야 하는 치명적 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AdminError::MalformedInput(_)
                | AdminError::SigningFailure(_)
                | AdminError::AuthenticationFailed
                | AdminError::SecretNotConfigured
        )
    }

    /// 접근 제어 에러인지 확인합니다. 게이트에서 리다이렉트로 처리됩니다.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            AdminError::Unauthenticated | AdminError::Forbidden { .. }
        )
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for AdminError {
    fn from(err: config::ConfigError) -> Self {
        AdminError::Config(err.to_string())
    }
}
