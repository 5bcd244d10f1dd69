//! # Admin Core
//!
//! 관리자 대시보드 전반에서 공유되는 기반 구성요소를 제공합니다.
//!
//! - 설정 관리 (파일 + 환경 변수)
//! - 에러 분류 체계
//! - 로깅 인프라
//! - 서명용 공유 시크릿

pub mod config;
pub mod error;
pub mod logging;
pub mod secret;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use secret::{SharedSecret, DEVELOPMENT_PLACEHOLDER_SECRET};
