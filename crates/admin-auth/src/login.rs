//! 로그인/로그아웃 흐름.
//!
//! 1. 요청 본문 서명 (실패 시 요청을 보내지 않음)
//! 2. `POST {login_path}?is_admin=<서명>` (공개 호출)
//! 3. 응답의 토큰과 역할로 세션 생성 후 저장
//!
//! 서버 거부 사유는 노출하지 않고 `AuthenticationFailed`로 통일합니다.

use admin_core::{AdminError, AdminResult, AppConfig, SharedSecret};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::client::{ApiClient, Visibility};
use crate::roles::Role;
use crate::session::{AccessToken, Session, SessionStore};
use crate::signer::{self, SignRequest};
use crate::transport::ApiRequest;

/// 서명을 담는 쿼리 파라미터 이름.
pub const SIGNATURE_QUERY_PARAM: &str = "is_admin";

/// 로그인 응답 본문.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Value,
    #[serde(default)]
    role: Option<String>,
}

impl LoginResponse {
    /// 역할은 `user.role`, 없으면 최상위 `role`에서 읽습니다.
    fn role(&self) -> Option<Role> {
        self.user
            .get("role")
            .and_then(Value::as_str)
            .or(self.role.as_deref())
            .and_then(Role::parse)
    }
}

/// 로그인 서비스.
pub struct LoginService {
    client: ApiClient,
    secret: SharedSecret,
    login_path: String,
}

impl LoginService {
    /// 새 로그인 서비스 생성.
    pub fn new(client: ApiClient, secret: SharedSecret, login_path: impl Into<String>) -> Self {
        Self {
            client,
            secret,
            login_path: login_path.into(),
        }
    }

    /// 설정에서 생성. 시크릿이 없으면 `SecretNotConfigured`로 실패합니다.
    pub fn from_config(config: &AppConfig, session: SessionStore) -> AdminResult<Self> {
        let secret = SharedSecret::from_config(config)?;
        let client = ApiClient::from_config(&config.api, session)?;
        Ok(Self::new(client, secret, config.api.login_path.clone()))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// 로그인하고 세션을 저장합니다.
    ///
    /// # Errors
    /// - 서명 실패: `MalformedInput` / `SigningFailure` (요청 미전송)
    /// - 네트워크 실패: `TransportFailure`
    /// - 서버 거부, 토큰 누락, 알 수 없는 역할: `AuthenticationFailed`
    #[instrument(skip_all, fields(path = %self.login_path))]
    pub async fn login(&self, body: &SignRequest) -> AdminResult<Session> {
        let signature = signer::sign(body, &self.secret)?;

        let request = ApiRequest::post(self.login_path.clone())
            .with_query(SIGNATURE_QUERY_PARAM, signature.as_str())
            .with_json(body)?;

        let response = self.client.send(request, Visibility::Public).await?;

        if !response.is_success() {
            debug!(status = response.status, body = %response.body, "Login rejected by server");
            warn!(status = response.status, "Login failed");
            return Err(AdminError::AuthenticationFailed);
        }

        let parsed: LoginResponse = serde_json::from_str(&response.body).map_err(|e| {
            debug!("Unreadable login response: {}", e);
            warn!("Login failed: unreadable response");
            AdminError::AuthenticationFailed
        })?;

        let role = parsed.role().ok_or_else(|| {
            warn!("Login failed: missing or unknown role");
            AdminError::AuthenticationFailed
        })?;

        let token = match parsed.token {
            Some(token) if !token.is_empty() => token,
            _ => {
                warn!("Login failed: missing token");
                return Err(AdminError::AuthenticationFailed);
            }
        };

        let session = Session::new(AccessToken::new(token), role, parsed.user);
        self.session().set(session.clone());

        info!(role = %role, "Login succeeded");
        Ok(session)
    }

    /// JSON 본문으로 로그인합니다. 객체가 아니면 요청 없이 `MalformedInput`.
    pub async fn login_value(&self, body: &Value) -> AdminResult<Session> {
        let request = SignRequest::from_value(body.clone())?;
        self.login(&request).await
    }

    /// 현재 세션을 제거합니다.
    pub fn logout(&self) {
        let role = self.session().role();
        self.session().clear();
        info!(role = ?role, "Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ApiResponse, Transport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTransport {
        calls: AtomicUsize,
        status: u16,
        body: String,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn execute(&self, _request: ApiRequest) -> AdminResult<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ApiResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn service(status: u16, body: Value) -> (LoginService, Arc<CountingTransport>) {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
            status,
            body: body.to_string(),
        });
        let client = ApiClient::new(transport.clone(), SessionStore::new());
        let service = LoginService::new(client, SharedSecret::new("K").unwrap(), "/admin-login");
        (service, transport)
    }

    #[test]
    fn test_response_role_lookup() {
        let nested: LoginResponse =
            serde_json::from_value(json!({"token": "t", "user": {"role": "Operator"}})).unwrap();
        assert_eq!(nested.role(), Some(Role::Operator));

        let flat: LoginResponse =
            serde_json::from_value(json!({"token": "t", "role": "viewer"})).unwrap();
        assert_eq!(flat.role(), Some(Role::Viewer));

        let unknown: LoginResponse =
            serde_json::from_value(json!({"token": "t", "user": {"role": "root"}})).unwrap();
        assert_eq!(unknown.role(), None);
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let (service, transport) = service(
            200,
            json!({"token": "tok", "user": {"id": 1, "role": "admin"}}),
        );
        let body = SignRequest::from_pairs([("username", "ops"), ("password", "pw")]);

        let session = service.login(&body).await.unwrap();

        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.profile["id"], 1);
        assert_eq!(service.session().role(), Some(Role::Admin));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_is_generic() {
        let (service, _) = service(401, json!({"message": "user ops locked: 5 failed attempts"}));
        let body = SignRequest::from_pairs([("username", "ops")]);

        let err = service.login(&body).await.unwrap_err();

        assert!(matches!(err, AdminError::AuthenticationFailed));
        assert!(!err.to_string().contains("locked"));
        assert!(!service.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_missing_token_fails() {
        let (service, _) = service(200, json!({"user": {"role": "admin"}}));
        let body = SignRequest::from_pairs([("username", "ops")]);

        assert!(matches!(
            service.login(&body).await,
            Err(AdminError::AuthenticationFailed)
        ));
        assert!(!service.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_unknown_role_fails() {
        let (service, _) = service(200, json!({"token": "t", "user": {"role": "root"}}));
        let body = SignRequest::from_pairs([("username", "ops")]);

        assert!(matches!(
            service.login(&body).await,
            Err(AdminError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let (service, _) = service(200, json!({"token": "t", "user": {"role": "viewer"}}));
        let body = SignRequest::from_pairs([("username", "ops")]);

        service.login(&body).await.unwrap();
        assert!(service.session().is_authenticated());

        service.logout();
        assert!(!service.session().is_authenticated());
    }

    #[test]
    fn test_from_config_fails_closed_without_secret() {
        let config = AppConfig::default();
        let result = LoginService::from_config(&config, SessionStore::new());

        assert!(matches!(result, Err(AdminError::SecretNotConfigured)));
    }
}
