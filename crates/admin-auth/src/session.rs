//! 세션 저장소.
//!
//! 현재 로그인 세션을 하나만 보관하는 공유 슬롯입니다. 전역 상태 대신
//! 명시적으로 생성한 핸들을 파이프라인, 로그인 서비스, 게이트에 주입합니다.
//! 쓰기는 로그인/로그아웃 흐름에서만 일어나며 마지막 쓰기가 우선합니다.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::roles::Role;

/// 불투명 Bearer 토큰.
///
/// 클라이언트는 토큰을 해석하거나 변경하지 않고 전달하거나 폐기만 합니다.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// 서버가 발급한 토큰 문자열로 생성.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// `Authorization: Bearer` 헤더에 넣을 값.
    pub fn bearer_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***REDACTED***)")
    }
}

/// 인증된 세션.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Bearer 토큰
    pub token: AccessToken,
    /// 사용자 역할
    pub role: Role,
    /// 서버가 반환한 사용자 프로필 (원본 그대로)
    pub profile: Value,
    /// 세션 생성 시각
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    /// 새 세션 생성.
    pub fn new(token: AccessToken, role: Role, profile: Value) -> Self {
        Self {
            token,
            role,
            profile,
            authenticated_at: Utc::now(),
        }
    }
}

/// 현재 세션 저장소 핸들.
///
/// 복제하면 같은 슬롯을 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    slot: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 세션 복사본.
    pub fn get(&self) -> Option<Session> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 세션 교체. 이전 세션과 병합하지 않습니다.
    pub fn set(&self, session: Session) {
        let role = session.role;
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        tracing::debug!(role = %role, "Session stored");
    }

    /// 세션 제거.
    pub fn clear(&self) {
        let previous = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            tracing::debug!("Session cleared");
        }
    }

    /// 현재 세션의 토큰이 `token`과 같을 때만 제거합니다.
    ///
    /// 그 사이 다른 세션으로 교체되었다면 유지하고 `false`를 반환합니다.
    pub fn clear_if_token(&self, token: &AccessToken) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(current) if current.token == *token => {
                *slot = None;
                tracing::debug!("Session cleared");
                true
            }
            _ => false,
        }
    }

    /// 현재 역할.
    pub fn role(&self) -> Option<Role> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.role)
    }

    /// 현재 토큰.
    pub fn token(&self) -> Option<AccessToken> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// 세션 존재 여부.
    pub fn is_authenticated(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(token: &str, role: Role, profile: Value) -> Session {
        Session::new(AccessToken::new(token), role, profile)
    }

    #[test]
    fn test_empty_store() {
        let store = SessionStore::new();

        assert!(store.get().is_none());
        assert!(store.role().is_none());
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_overwrites_without_merge() {
        let store = SessionStore::new();
        store.set(session("t1", Role::Admin, json!({"name": "a", "email": "a@x"})));
        store.set(session("t2", Role::Viewer, json!({"name": "b"})));

        let current = store.get().unwrap();
        assert_eq!(current.token.bearer_value(), "t2");
        assert_eq!(current.role, Role::Viewer);
        assert_eq!(current.profile, json!({"name": "b"}));
        assert!(current.profile.get("email").is_none());
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::new();
        store.set(session("t1", Role::Operator, Value::Null));
        assert!(store.is_authenticated());

        store.clear();
        assert!(store.get().is_none());

        // 빈 저장소에서 clear는 무해
        store.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_if_token_matches_only_current() {
        let store = SessionStore::new();
        store.set(session("old", Role::Viewer, Value::Null));
        store.set(session("new", Role::Admin, Value::Null));

        assert!(!store.clear_if_token(&AccessToken::new("old")));
        assert_eq!(store.token(), Some(AccessToken::new("new")));

        assert!(store.clear_if_token(&AccessToken::new("new")));
        assert!(!store.is_authenticated());
        assert!(!store.clear_if_token(&AccessToken::new("new")));
    }

    #[test]
    fn test_clones_share_slot() {
        let store = SessionStore::new();
        let reader = store.clone();

        store.set(session("shared", Role::Admin, Value::Null));
        assert_eq!(reader.role(), Some(Role::Admin));

        reader.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_token_debug_redacted() {
        let token = AccessToken::new("eyJhbGciOi.secret.payload");
        let debug = format!("{:?}", session("eyJhbGciOi.secret.payload", Role::Admin, Value::Null));

        assert!(!format!("{:?}", token).contains("secret"));
        assert!(!debug.contains("eyJhbGciOi"));
    }
}
