// src/runcard/value.rs

//! Textual representation of run-card values.
//!
//! `pwhg_main` tokenizes each line on whitespace and reads the second token
//! as a number, so the formatting has to match what the job-option layer has
//! always produced: integers plainly, floats as the shortest round-trip digit
//! string with a trailing `.0` when integral, and exponent form outside
//! `[1e-4, 1e16)` with a signed, two-digit exponent (`1e-05`, `1.5e+16`).

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardValue::Int(v) => write!(f, "{v}"),
            CardValue::Float(v) => f.write_str(&format_float(*v)),
            CardValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CardValue {
    fn from(v: i64) -> Self {
        CardValue::Int(v)
    }
}

impl From<f64> for CardValue {
    fn from(v: f64) -> Self {
        CardValue::Float(v)
    }
}

impl From<bool> for CardValue {
    fn from(v: bool) -> Self {
        CardValue::Int(i64::from(v))
    }
}

impl From<&str> for CardValue {
    fn from(v: &str) -> Self {
        CardValue::Str(v.to_string())
    }
}

/// Format a float the way the run-card consumers expect.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. "1.5e16", "-1e-5".
    let sci = format!("{x:e}");
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= 16 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    let fixed = format!("{x}");
    if fixed.contains('.') {
        fixed
    } else {
        format!("{fixed}.0")
    }
}
