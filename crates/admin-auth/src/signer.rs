//! 로그인 요청 서명.
//!
//! 요청 본문의 필드를 정렬·정규화한 문자열 끝에 공유 시크릿을 붙여
//! SHA-256으로 해시합니다. 서버 측 검증기와 바이트 단위로 일치해야 합니다.
//!
//! # 정규화 규칙
//!
//! 1. 키를 대소문자/악센트 무시 순서로 정렬 (구두점 < 숫자 < 문자, 같으면 코드포인트 순)
//! 2. `sign` 키, `null`/빈 문자열 값은 제외
//! 3. `key=value`를 `&`로 연결
//! 4. 쌍이 하나라도 있으면 `&{secret}`, 없으면 시크릿만
//! 5. SHA-256 → 소문자 hex

use admin_core::{AdminError, AdminResult, SharedSecret};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// 서명 대상에서 항상 제외되는 예약 키.
pub const RESERVED_SIGN_KEY: &str = "sign";

/// SHA-256 hex 서명 길이.
pub const SIGNATURE_LEN: usize = 64;

/// 서명 대상 요청 본문.
///
/// JSON 객체만 허용합니다. `Debug`는 값 없이 키만 출력합니다.
#[derive(Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignRequest {
    fields: Map<String, Value>,
}

impl SignRequest {
    /// JSON 값에서 생성. 객체가 아니면 `MalformedInput`.
    pub fn from_value(value: Value) -> AdminResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(AdminError::MalformedInput(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// JSON 문자열에서 생성.
    pub fn from_json_str(body: &str) -> AdminResult<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AdminError::MalformedInput(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// 문자열 필드 목록에서 생성.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self { fields }
    }

    /// 필드 맵 참조.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// 필드 추가/교체.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// 필드가 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Value> for SignRequest {
    type Error = AdminError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl fmt::Debug for SignRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignRequest")
            .field("keys", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 서명 결과 (64자리 소문자 hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    /// hex 문자열을 검증하여 서명으로 변환.
    pub fn from_hex(hex: impl Into<String>) -> AdminResult<Self> {
        let hex = hex.into();
        let well_formed = hex.len() == SIGNATURE_LEN
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

        if well_formed {
            Ok(Self(hex))
        } else {
            Err(AdminError::SigningFailure(format!(
                "digest is not {} lowercase hex characters",
                SIGNATURE_LEN
            )))
        }
    }

    /// 문자열 참조.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ASCII 구두점/기호의 기본 수준 순서 (루트 로케일 정렬 기준).
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// 문자 하나의 기본 수준 가중치: 공백 < 구두점 < 기타 기호 < 숫자 < 문자.
fn primary_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, c as u32)
    } else if let Some(index) = PUNCTUATION_ORDER.find(c) {
        (1, index as u32)
    } else if c.is_numeric() {
        (3, c as u32)
    } else if !c.is_alphanumeric() {
        (2, c as u32)
    } else {
        (4, c as u32)
    }
}

/// 정렬용 키: NFD 분해 후 결합 문자 제거, 소문자화, 가중치 변환.
fn collation_key(key: &str) -> Vec<(u8, u32)> {
    key.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(primary_weight)
        .collect()
}

/// 기본 수준 비교. 기본 수준에서 같으면 코드포인트 순으로 결정.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn format_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }

    match number.as_f64() {
        Some(f) if f.is_finite() => format_float(f),
        _ => number.to_string(),
    }
}

/// 부동소수점의 자연 표기.
///
/// 최단 왕복 자릿수를 쓰며, 10^-7 이상 10^21 미만은 고정소수점,
/// 그 밖은 `1e-7`, `1.5e+21` 형태의 지수 표기입니다.
fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }

    // `{:e}`는 최단 왕복 자릿수를 "d.ddde±x" 형태로 출력
    let scientific = format!("{:e}", f.abs());
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    // 값 = 0.digits × 10^n
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (n - 1).abs())
        }
    };

    if f < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// 서명에 포함될 값의 텍스트 표현. 제외 대상이면 `None`.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(format_number(n)),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 정렬된 `key=value` 쌍 목록.
fn signed_pairs(request: &SignRequest) -> Vec<String> {
    let mut keys: Vec<&String> = request.fields.keys().collect();
    keys.sort_by(|a, b| compare_keys(a, b));

    keys.into_iter()
        .filter(|key| key.as_str() != RESERVED_SIGN_KEY)
        .filter_map(|key| {
            let value = request.fields.get(key.as_str())?;
            value_text(value).map(|text| format!("{}={}", key, text))
        })
        .collect()
}

/// 해시 직전의 정규화 문자열을 생성합니다.
pub fn canonical_string(request: &SignRequest, secret: &str) -> String {
    let pairs = signed_pairs(request);

    if pairs.is_empty() {
        secret.to_string()
    } else {
        format!("{}&{}", pairs.join("&"), secret)
    }
}

/// 요청 본문을 서명합니다.
///
/// # Errors
/// 해시 결과가 올바른 hex 서명이 아니면 `SigningFailure`를 반환합니다.
/// 호출자는 실패 시 요청을 보내지 않아야 합니다.
pub fn sign(request: &SignRequest, secret: &SharedSecret) -> AdminResult<Signature> {
    let canonical = canonical_string(request, secret.expose());
    let digest = Sha256::digest(canonical.as_bytes());
    let signature = Signature::from_hex(hex::encode(digest))?;

    debug!(
        fields = request.fields.len(),
        signed = signed_pairs(request).len(),
        "Request body signed"
    );

    Ok(signature)
}

/// JSON 값을 바로 서명합니다. 객체가 아니면 `MalformedInput`.
pub fn sign_value(body: &Value, secret: &SharedSecret) -> AdminResult<Signature> {
    let request = SignRequest::from_value(body.clone())?;
    sign(&request, secret)
}
