//! 접근 게이트.
//!
//! 탐색 시도마다 현재 역할과 라우트의 허용 역할을 비교해
//! 진입을 허용하거나 해당 역할의 기본 랜딩 경로로 리다이렉트합니다.
//! 게이트는 에러를 던지지 않으며 거부는 항상 리다이렉트로 해석됩니다.

use admin_core::{AdminError, RoutesConfig};
use std::fmt;
use tracing::{debug, info};

use crate::roles::{AllowedRoles, Principal, Role};
use crate::session::SessionStore;

/// 주체별 기본 랜딩 경로 표.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingPaths {
    unauthenticated: String,
    admin: String,
    operator: String,
    viewer: String,
}

impl LandingPaths {
    /// 설정에서 생성.
    pub fn from_config(routes: &RoutesConfig) -> Self {
        Self {
            unauthenticated: routes.unauthenticated.clone(),
            admin: routes.admin.clone(),
            operator: routes.operator.clone(),
            viewer: routes.viewer.clone(),
        }
    }

    /// 주체의 랜딩 경로.
    pub fn path_for(&self, principal: Principal) -> &str {
        match principal {
            Principal::Unauthenticated => &self.unauthenticated,
            Principal::Authenticated(Role::Admin) => &self.admin,
            Principal::Authenticated(Role::Operator) => &self.operator,
            Principal::Authenticated(Role::Viewer) => &self.viewer,
        }
    }
}

impl Default for LandingPaths {
    fn default() -> Self {
        Self::from_config(&RoutesConfig::default())
    }
}

/// 인증 상태 확인 진행 상황.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// 아직 확인 중 (렌더링 보류)
    Pending,
    /// 확인 완료 (`None` = 미인증)
    Resolved(Option<Role>),
}

impl AuthStatus {
    /// 세션 저장소의 현재 상태. 저장소는 동기적으로 읽히므로 항상 확인 완료입니다.
    pub fn from_store(store: &SessionStore) -> Self {
        AuthStatus::Resolved(store.role())
    }
}

/// 거부 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// 세션 없음
    Unauthenticated,
    /// 역할이 허용 목록에 없음
    Forbidden,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::Unauthenticated => f.write_str("unauthenticated"),
            DenyReason::Forbidden => f.write_str("forbidden"),
        }
    }
}

/// 게이트 판단 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// 진입 허용
    Permit,
    /// 리다이렉트
    Redirect {
        /// 이동할 랜딩 경로
        to: String,
        /// 원래 요청한 위치 (복귀용 보조 정보)
        from: String,
        reason: DenyReason,
    },
}

impl GateDecision {
    /// 허용 여부.
    pub fn is_permit(&self) -> bool {
        matches!(self, GateDecision::Permit)
    }

    /// 리다이렉트 경로.
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            GateDecision::Permit => None,
            GateDecision::Redirect { to, .. } => Some(to),
        }
    }

    /// 원격 측정/로깅용 에러 분류.
    pub fn denial(&self, principal: Principal) -> Option<AdminError> {
        match self {
            GateDecision::Permit => None,
            GateDecision::Redirect {
                reason: DenyReason::Unauthenticated,
                ..
            } => Some(AdminError::Unauthenticated),
            GateDecision::Redirect {
                reason: DenyReason::Forbidden,
                ..
            } => Some(AdminError::Forbidden {
                role: principal.to_string(),
            }),
        }
    }
}

/// 렌더링 흐름에서의 게이트 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// 인증 상태 확인 전: 아무것도 렌더링하지 않음
    Suspend,
    /// 판단 완료
    Decided(GateDecision),
}

/// 대시보드 영역.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardArea {
    Dashboard,
    BankRequests,
    BuyRequests,
    Promotions,
    Prices,
    Users,
}

impl DashboardArea {
    pub const ALL: [DashboardArea; 6] = [
        DashboardArea::Dashboard,
        DashboardArea::BankRequests,
        DashboardArea::BuyRequests,
        DashboardArea::Promotions,
        DashboardArea::Prices,
        DashboardArea::Users,
    ];

    /// 영역 경로 접두사.
    pub fn path(&self) -> &'static str {
        match self {
            DashboardArea::Dashboard => "/dashboard",
            DashboardArea::BankRequests => "/bank-requests",
            DashboardArea::BuyRequests => "/buy-requests",
            DashboardArea::Promotions => "/promotions",
            DashboardArea::Prices => "/prices",
            DashboardArea::Users => "/users",
        }
    }

    /// 기본 허용 역할.
    pub fn default_allowed(&self) -> AllowedRoles {
        match self {
            DashboardArea::Dashboard | DashboardArea::Prices => AllowedRoles::new(Role::ALL),
            DashboardArea::BankRequests | DashboardArea::BuyRequests => {
                AllowedRoles::at_least(Role::Operator)
            }
            DashboardArea::Promotions | DashboardArea::Users => AllowedRoles::only(Role::Admin),
        }
    }
}

/// 경로 접두사와 허용 역할.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub prefix: String,
    pub allowed: AllowedRoles,
}

impl RouteRule {
    fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// 경로별 허용 역할 표.
///
/// 가장 긴 접두사 규칙이 적용되며, 어느 규칙에도 맞지 않는 경로는
/// 기본 허용 집합(최고 권한만)을 요구합니다.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// 빈 정책.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// 규칙 추가 (같은 접두사는 교체).
    pub fn with_rule(mut self, prefix: impl Into<String>, allowed: AllowedRoles) -> Self {
        let prefix = prefix.into();
        self.rules.retain(|rule| rule.prefix != prefix);
        self.rules.push(RouteRule { prefix, allowed });
        self
    }

    /// 경로에 적용되는 허용 역할.
    pub fn allowed_for(&self, path: &str) -> AllowedRoles {
        let path = strip_location_suffix(path);
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| rule.prefix.len())
            .map(|rule| rule.allowed.clone())
            .unwrap_or_default()
    }

    /// 규칙 목록.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        DashboardArea::ALL
            .into_iter()
            .fold(Self::empty(), |policy, area| {
                policy.with_rule(area.path(), area.default_allowed())
            })
    }
}

/// 쿼리 문자열과 프래그먼트 제거.
fn strip_location_suffix(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

/// 탐색 시도 한 번에 대한 접근 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    /// 라우트가 허용하는 역할
    pub allowed: AllowedRoles,
    /// 현재 역할 (`None` = 미인증)
    pub current: Option<Role>,
    /// 요청한 위치
    pub location: String,
}

impl AccessRequest {
    pub fn new(allowed: AllowedRoles, current: Option<Role>, location: impl Into<String>) -> Self {
        Self {
            allowed,
            current,
            location: location.into(),
        }
    }
}

/// 접근 게이트.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    landing: LandingPaths,
    policy: RoutePolicy,
}

impl AccessGate {
    /// 랜딩 경로 표와 라우트 정책으로 생성.
    pub fn new(landing: LandingPaths, policy: RoutePolicy) -> Self {
        Self { landing, policy }
    }

    /// 설정의 랜딩 경로와 기본 라우트 정책으로 생성.
    pub fn from_config(routes: &RoutesConfig) -> Self {
        Self::new(LandingPaths::from_config(routes), RoutePolicy::default())
    }

    pub fn landing(&self) -> &LandingPaths {
        &self.landing
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// 역할과 허용 집합으로 진입 여부를 판단합니다.
    ///
    /// `requested`는 리다이렉트 시 복귀용으로만 전달됩니다.
    pub fn decide(
        &self,
        role: Option<Role>,
        allowed: &AllowedRoles,
        requested: &str,
    ) -> GateDecision {
        let principal = Principal::from_role(role);

        if allowed.permits(principal) {
            debug!(principal = %principal, path = requested, "Access permitted");
            return GateDecision::Permit;
        }

        let reason = match principal {
            Principal::Unauthenticated => DenyReason::Unauthenticated,
            Principal::Authenticated(_) => DenyReason::Forbidden,
        };
        let to = self.landing.path_for(principal).to_string();

        info!(
            principal = %principal,
            reason = %reason,
            from = requested,
            to = %to,
            "Access denied, redirecting"
        );

        GateDecision::Redirect {
            to,
            from: requested.to_string(),
            reason,
        }
    }

    /// 접근 요청을 판단합니다.
    pub fn check(&self, request: &AccessRequest) -> GateDecision {
        self.decide(request.current, &request.allowed, &request.location)
    }

    /// 인증 상태 확인이 끝나지 않았으면 `Suspend`를 반환합니다.
    pub fn evaluate(
        &self,
        status: &AuthStatus,
        allowed: &AllowedRoles,
        requested: &str,
    ) -> GateOutcome {
        match status {
            AuthStatus::Pending => GateOutcome::Suspend,
            AuthStatus::Resolved(role) => {
                GateOutcome::Decided(self.decide(*role, allowed, requested))
            }
        }
    }

    /// 세션 저장소의 현재 역할로 판단합니다.
    pub fn check_session(
        &self,
        store: &SessionStore,
        allowed: &AllowedRoles,
        requested: &str,
    ) -> GateDecision {
        self.decide(store.role(), allowed, requested)
    }

    /// 라우트 정책에서 허용 역할을 찾아 판단합니다.
    pub fn check_path(&self, role: Option<Role>, requested: &str) -> GateDecision {
        let allowed = self.policy.allowed_for(requested);
        self.decide(role, &allowed, requested)
    }
}
