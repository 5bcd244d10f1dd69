//! 관리자 인증 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 요청 본문 서명 확인
//! - 로그인 점검
//! - 라우트 접근 판단 시뮬레이션

pub mod commands;
