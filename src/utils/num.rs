//! Numeric utilities: lenient option parsing and centralized integer conversions.
//!
//! Guidelines
//! - Option values (`limit`, `page`, `offset`) are parsed leniently: a leading base-10 integer is
//!   taken from strings, doubles truncate toward zero, everything else is unparsable (`None`).
//! - Counts coming back from a store may be any BSON number; they are clamped into `u64`.
//! - Values written into pipeline stages or envelopes are saturated into `i64`.

use bson::Bson;

/// Parse the leading base-10 integer of `s`.
///
/// Leading whitespace and a single `+`/`-` sign are accepted; parsing stops at the first
/// non-digit. Returns `None` when no digit follows, and saturates on overflow.
#[must_use]
pub fn parse_radix10(s: &str) -> Option<i64> {
    let t = s.trim_start();
    let (negative, digits) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let mut acc: i64 = 0;
    for b in digits[..end].bytes() {
        let d = i64::from(b - b'0');
        acc = acc.saturating_mul(10).saturating_add(d);
    }
    Some(if negative { acc.saturating_neg() } else { acc })
}

/// Lenient integer view of a BSON option value.
#[must_use]
pub fn bson_to_i64_lenient(v: &Bson) -> Option<i64> {
    match v {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        Bson::Double(f) => f64_to_i64_trunc(*f),
        Bson::String(s) => parse_radix10(s),
        Bson::Decimal128(d) => parse_radix10(&d.to_string()),
        _ => None,
    }
}

#[inline]
#[must_use]
pub fn f64_to_i64_trunc(v: f64) -> Option<i64> {
    if !v.is_finite() {
        return None;
    }
    let t = v.trunc();
    if t >= i64::MAX as f64 {
        Some(i64::MAX)
    } else if t <= i64::MIN as f64 {
        Some(i64::MIN)
    } else {
        Some(t as i64)
    }
}

/// Count value of a store row field; negatives and non-numbers are `None`.
#[must_use]
pub fn bson_to_count(v: &Bson) -> Option<u64> {
    match v {
        Bson::Int32(i) => u64::try_from(*i).ok(),
        Bson::Int64(i) => u64::try_from(*i).ok(),
        Bson::Double(f) if f.is_finite() && *f >= 0.0 => {
            Some(if *f >= u64::MAX as f64 { u64::MAX } else { *f as u64 })
        }
        _ => None,
    }
}

#[inline]
#[must_use]
pub fn u64_to_i64_saturating(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[inline]
#[must_use]
pub fn u64_to_bson(v: u64) -> Bson {
    Bson::Int64(u64_to_i64_saturating(v))
}

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

#[inline]
#[must_use]
pub fn u64_to_usize_saturating(v: u64) -> usize {
    usize::try_from(v).unwrap_or(usize::MAX)
}

/// `ceil(a / b)` for `b > 0`; `None` when `b == 0`.
#[inline]
#[must_use]
pub fn ceil_div(a: u64, b: u64) -> Option<u64> {
    if b == 0 {
        return None;
    }
    Some(a / b + u64::from(a % b != 0))
}
