//! CLI 명령어 구현 모듈.

pub mod gate;
pub mod login;
pub mod sign;
