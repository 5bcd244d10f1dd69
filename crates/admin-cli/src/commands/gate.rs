//! 라우트 접근 판단 시뮬레이션.

use admin_auth::{AccessGate, GateDecision, Role};
use anyhow::{anyhow, Result};

/// 역할 인자 파싱. `none`은 미인증 주체입니다.
pub fn parse_role(raw: &str) -> Result<Option<Role>> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    Role::parse(raw)
        .map(Some)
        .ok_or_else(|| anyhow!("Invalid role: {}. Use: admin, operator, viewer, none", raw))
}

/// 판단 결과를 한 줄로 표시합니다.
pub fn format_decision(decision: &GateDecision) -> String {
    match decision {
        GateDecision::Permit => "permit".to_string(),
        GateDecision::Redirect { to, reason, .. } => format!("redirect -> {} ({})", to, reason),
    }
}

/// 라우트 정책 표를 만듭니다.
pub fn route_table(gate: &AccessGate) -> Vec<String> {
    let mut rows: Vec<(String, String)> = gate
        .policy()
        .rules()
        .iter()
        .map(|rule| (rule.prefix.clone(), rule.allowed.to_string()))
        .collect();
    rows.sort();

    let width = rows.iter().map(|(p, _)| p.len()).max().unwrap_or(0);
    rows.into_iter()
        .map(|(prefix, allowed)| format!("{:<width$}  {}", prefix, allowed, width = width))
        .collect()
}
