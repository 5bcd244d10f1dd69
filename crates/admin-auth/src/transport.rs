//! HTTP 전송 계층.
//!
//! 실제 네트워크 호출은 [`Transport`] 구현체에 위임합니다. 타임아웃과 취소는
//! 전송 계층의 책임이며, 실패는 `TransportFailure`로 그대로 전파됩니다.

use admin_core::{AdminError, AdminResult, ApiConfig};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

/// `Authorization` 헤더 이름.
pub const AUTHORIZATION: &str = "Authorization";

/// 전송 전 요청.
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// 기본 URL 기준 경로 (예: `/admin-login`)
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// 새 요청 생성.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// 쿼리 파라미터 추가.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// 헤더 추가.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// JSON 본문 설정.
    pub fn with_json<B: Serialize>(mut self, body: &B) -> AdminResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// 헤더 값 조회 (대소문자 무시).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 헤더 제거 (대소문자 무시).
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// 자격증명 헤더 포함 여부.
    pub fn has_credentials(&self) -> bool {
        self.header(AUTHORIZATION).is_some()
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(AUTHORIZATION) {
                    (k.as_str(), "***REDACTED***")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// 전송 결과.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// 2xx 여부.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 본문을 JSON으로 디코딩.
    pub fn json<T: DeserializeOwned>(&self) -> AdminResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            error!(status = self.status, "Failed to parse response body: {}", e);
            AdminError::Serialization(e.to_string())
        })
    }
}

/// 네트워크 전송 추상화.
#[async_trait]
pub trait Transport: Send + Sync {
    /// 요청을 그대로 전송합니다. 자격증명 부착 여부는 호출자가 결정합니다.
    async fn execute(&self, request: ApiRequest) -> AdminResult<ApiResponse>;
}

/// reqwest 기반 전송 구현.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// 새 전송 계층 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `TransportFailure`를 반환합니다.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> AdminResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AdminError::transport(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// API 설정에서 생성.
    pub fn from_config(config: &ApiConfig) -> AdminResult<Self> {
        Self::new(&config.base_url, config.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> AdminError {
    if err.is_timeout() {
        AdminError::transport(format!("request timed out: {}", err))
    } else if err.is_connect() {
        AdminError::transport(format!("connection failed: {}", err))
    } else {
        AdminError::transport(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> AdminResult<ApiResponse> {
        let url = self.url(&request.path);
        debug!(method = %request.method, path = %request.path, "HTTP request");

        let mut builder = self.client.request(request.method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(ApiResponse { status, body })
    }
}
