//! 인증 요청 파이프라인.
//!
//! 모든 API 호출은 [`ApiClient`]를 거칩니다. 호출마다 [`Visibility`]를 명시하며,
//! `Private` 호출에만 현재 세션의 Bearer 토큰을 붙입니다.
//! 재시도, 토큰 갱신, 토큰 교체는 하지 않습니다.

use admin_core::{AdminError, AdminResult, ApiConfig};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::session::{AccessToken, SessionStore};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport, AUTHORIZATION};

/// 호출의 공개 여부.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// 자격증명을 절대 붙이지 않음 (로그인 등)
    Public,
    /// 세션이 있으면 Bearer 토큰 부착
    #[default]
    Private,
}

/// 세션 인식 API 클라이언트.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl ApiClient {
    /// 전송 계층과 세션 저장소로 생성.
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self { transport, session }
    }

    /// 설정의 기본 URL/타임아웃으로 reqwest 전송 계층을 만들어 생성.
    pub fn from_config(config: &ApiConfig, session: SessionStore) -> AdminResult<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), session))
    }

    /// 주입된 세션 저장소.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// 공개 여부에 따라 자격증명을 붙이거나 제거합니다.
    ///
    /// 호출자가 직접 넣은 `Authorization` 헤더는 항상 제거되며,
    /// 토큰은 세션 저장소에서만 가져옵니다.
    pub fn authorize(&self, request: ApiRequest, visibility: Visibility) -> ApiRequest {
        self.attach_credentials(request, visibility).0
    }

    /// 자격증명을 붙이고, 붙인 토큰을 함께 반환합니다.
    fn attach_credentials(
        &self,
        mut request: ApiRequest,
        visibility: Visibility,
    ) -> (ApiRequest, Option<AccessToken>) {
        request.remove_header(AUTHORIZATION);

        if visibility == Visibility::Public {
            return (request, None);
        }

        let token = self.session.token();
        if let Some(token) = &token {
            request
                .headers
                .push((AUTHORIZATION.to_string(), format!("Bearer {}", token.bearer_value())));
        }

        (request, token)
    }

    /// 요청을 전송하고 원본 응답을 반환합니다.
    ///
    /// 자격증명을 붙인 요청이 401을 받으면 그 토큰의 세션을 제거합니다.
    /// 응답을 기다리는 동안 다시 로그인해 세션이 바뀌었다면 새 세션은 유지됩니다.
    pub async fn send(&self, request: ApiRequest, visibility: Visibility) -> AdminResult<ApiResponse> {
        let (request, sent_token) = self.attach_credentials(request, visibility);
        let method = request.method.clone();
        let path = request.path.clone();

        debug!(
            method = %method,
            path = %path,
            visibility = ?visibility,
            authorized = sent_token.is_some(),
            "Sending API request"
        );

        let response = self.transport.execute(request).await?;

        if response.status == 401 {
            if let Some(token) = &sent_token {
                if self.session.clear_if_token(token) {
                    info!(path = %path, "Token rejected by server, clearing session");
                } else {
                    debug!(path = %path, "Stale token rejected, session already replaced");
                }
            }
        }

        Ok(response)
    }

    /// 요청을 전송하고 2xx 응답 본문을 디코딩합니다.
    ///
    /// # Errors
    /// - 비 2xx 응답: `TransportFailure` (상태 코드 포함)
    /// - 디코딩 실패: `Serialization`
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        visibility: Visibility,
    ) -> AdminResult<T> {
        let path = request.path.clone();
        let response = self.send(request, visibility).await?;

        if !response.is_success() {
            warn!(path = %path, status = response.status, "API request failed");
            return Err(AdminError::transport_status(
                response.status,
                format!("{} returned HTTP {}", path, response.status),
            ));
        }

        response.json()
    }

    /// 읽기 전용 목록 조회. 어떤 실패든 기본값으로 대체합니다.
    ///
    /// 하나의 데이터 소스 실패가 화면 전체를 깨뜨리지 않도록 할 때 사용합니다.
    pub async fn fetch_or_default<T: DeserializeOwned + Default>(&self, request: ApiRequest) -> T {
        let path = request.path.clone();
        match self.send_json(request, Visibility::Private).await {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path, error = %e, "Read request failed, using empty result");
                T::default()
            }
        }
    }
}
