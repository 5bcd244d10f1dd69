//! 역할 기반 접근 제어 (RBAC).
//!
//! 역할, 인증 주체, 허용 역할 집합 정의.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::session::Session;

/// 관리자 계정 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자 - 모든 화면 접근
    Admin,
    /// 운영자 - 은행 인증/매수 요청 처리
    Operator,
    /// 뷰어 - 시세 등 읽기 전용
    Viewer,
}

impl Role {
    /// 전체 역할 목록 (권한 높은 순).
    pub const ALL: [Role; 3] = [Role::Admin, Role::Operator, Role::Viewer];

    /// 역할의 우선순위 레벨 반환 (높을수록 더 많은 권한).
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::Operator => 50,
            Role::Viewer => 10,
        }
    }

    /// 최고 권한 역할.
    pub fn highest() -> Self {
        Role::Admin
    }

    /// 특정 역할 이상인지 확인.
    pub fn at_least(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "operator" => Some(Role::Operator),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// 소문자 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 접근 판단의 주체.
///
/// 세션이 없으면 `Unauthenticated`이며, 어떤 실제 역할과도 구별됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    /// 세션 없음
    Unauthenticated,
    /// 인증된 역할
    Authenticated(Role),
}

impl Principal {
    /// 선택적 역할에서 주체 도출.
    pub fn from_role(role: Option<Role>) -> Self {
        match role {
            Some(role) => Principal::Authenticated(role),
            None => Principal::Unauthenticated,
        }
    }

    /// 현재 세션에서 주체 도출.
    pub fn from_session(session: Option<&Session>) -> Self {
        Self::from_role(session.map(|s| s.role))
    }

    /// 인증된 역할 (있는 경우).
    pub fn role(&self) -> Option<Role> {
        match self {
            Principal::Authenticated(role) => Some(*role),
            Principal::Unauthenticated => None,
        }
    }

    /// 인증 여부.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Unauthenticated => f.write_str("unauthenticated"),
            Principal::Authenticated(role) => role.fmt(f),
        }
    }
}

/// 라우트에 접근 가능한 역할 집합.
///
/// 항상 하나 이상의 역할을 포함합니다. 빈 집합을 지정하면 최고 권한 역할만
/// 허용하는 기본값으로 대체됩니다. 미인증 주체는 타입상 포함될 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRoles(BTreeSet<Role>);

impl AllowedRoles {
    /// 역할 목록에서 생성.
    pub fn new<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            tracing::warn!("Empty allowed-role set, falling back to highest privilege only");
            return Self::default();
        }
        Self(roles)
    }

    /// 단일 역할.
    pub fn only(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }

    /// 지정 역할 이상 모두 허용.
    pub fn at_least(required: Role) -> Self {
        Self::new(Role::ALL.into_iter().filter(|r| r.at_least(required)))
    }

    /// 역할 포함 여부.
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// 주체 허용 여부. 미인증 주체는 항상 거부됩니다.
    pub fn permits(&self, principal: Principal) -> bool {
        match principal {
            Principal::Authenticated(role) => self.contains(role),
            Principal::Unauthenticated => false,
        }
    }

    /// 역할 순회.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl Default for AllowedRoles {
    fn default() -> Self {
        Self::only(Role::highest())
    }
}

impl fmt::Display for AllowedRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|r| r.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_level() {
        assert!(Role::Admin.level() > Role::Operator.level());
        assert!(Role::Operator.level() > Role::Viewer.level());
        assert!(Role::Admin.at_least(Role::Viewer));
        assert!(!Role::Viewer.at_least(Role::Operator));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("OPERATOR"), Some(Role::Operator));
        assert_eq!(Role::parse(" Viewer "), Some(Role::Viewer));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Operator).unwrap();
        assert_eq!(json, "\"operator\"");

        let parsed: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(parsed, Role::Viewer);
    }

    #[test]
    fn test_principal_from_role() {
        assert_eq!(Principal::from_role(None), Principal::Unauthenticated);
        assert_eq!(
            Principal::from_role(Some(Role::Viewer)),
            Principal::Authenticated(Role::Viewer)
        );
        assert_eq!(Principal::Unauthenticated.role(), None);
        assert_eq!(Principal::Unauthenticated.to_string(), "unauthenticated");
    }

    #[test]
    fn test_allowed_roles_default_is_highest() {
        let allowed = AllowedRoles::default();

        assert!(allowed.contains(Role::Admin));
        assert!(!allowed.contains(Role::Operator));
        assert!(!allowed.contains(Role::Viewer));
    }

    #[test]
    fn test_empty_allowed_roles_falls_back() {
        let allowed = AllowedRoles::new(Vec::new());
        assert_eq!(allowed, AllowedRoles::default());
    }

    #[test]
    fn test_unauthenticated_never_permitted() {
        let everyone = AllowedRoles::new(Role::ALL);
        assert!(!everyone.permits(Principal::Unauthenticated));
        assert!(!AllowedRoles::new(Vec::new()).permits(Principal::Unauthenticated));
    }

    #[test]
    fn test_at_least() {
        let allowed = AllowedRoles::at_least(Role::Operator);

        assert!(allowed.contains(Role::Admin));
        assert!(allowed.contains(Role::Operator));
        assert!(!allowed.contains(Role::Viewer));
        assert_eq!(allowed.to_string(), "admin,operator");
    }
}
