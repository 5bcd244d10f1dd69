//! 관리자 대시보드 인증 및 권한 부여.
//!
//! # 구성 요소
//!
//! - [`signer`]: 로그인 요청 본문 서명
//! - [`SessionStore`]: 현재 세션 보관
//! - [`ApiClient`]: 공개 여부에 따라 Bearer 토큰을 붙이는 요청 파이프라인
//! - [`AccessGate`]: 역할 기반 라우트 접근 판단
//! - [`LoginService`]: 서명 → 로그인 → 세션 저장 흐름
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let session = SessionStore::new();
//! let login = LoginService::from_config(&config, session.clone())?;
//! login.login(&SignRequest::from_pairs([("username", "ops"), ("password", pw)])).await?;
//!
//! let gate = AccessGate::from_config(&config.routes);
//! match gate.check_path(session.role(), "/bank-requests") {
//!     GateDecision::Permit => render(),
//!     GateDecision::Redirect { to, .. } => navigate(&to),
//! }
//! ```

pub mod client;
pub mod gate;
pub mod login;
pub mod roles;
pub mod session;
pub mod signer;
pub mod transport;

pub use client::{ApiClient, Visibility};
pub use gate::{
    AccessGate, AccessRequest, AuthStatus, DashboardArea, DenyReason, GateDecision, GateOutcome,
    LandingPaths, RoutePolicy, RouteRule,
};
pub use login::{LoginService, SIGNATURE_QUERY_PARAM};
pub use roles::{AllowedRoles, Principal, Role};
pub use session::{AccessToken, Session, SessionStore};
pub use signer::{canonical_string, sign, sign_value, SignRequest, Signature};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
