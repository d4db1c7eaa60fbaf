use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Incoming beam particle, written as the `ih1` / `ih2` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hadron {
    Proton,
    Antiproton,
}

impl Hadron {
    pub fn code(self) -> i64 {
        match self {
            Hadron::Proton => 1,
            Hadron::Antiproton => -1,
        }
    }
}

impl Default for Hadron {
    fn default() -> Self {
        Hadron::Proton
    }
}

impl FromStr for Hadron {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proton" | "p" | "1" => Ok(Hadron::Proton),
            "antiproton" | "pbar" | "-1" => Ok(Hadron::Antiproton),
            other => Err(format!(
                "invalid hadron: {other} (expected \"proton\" or \"antiproton\")"
            )),
        }
    }
}

/// Tag of a POWHEG-BOX process family, as named on the CLI and in job files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    Bb,
    Dijet,
    Ggh,
    Vbfh,
    W,
    Z,
    Ww,
    Wz,
    Zz,
    Tt,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 10] = [
        ProcessKind::Bb,
        ProcessKind::Dijet,
        ProcessKind::Ggh,
        ProcessKind::Vbfh,
        ProcessKind::W,
        ProcessKind::Z,
        ProcessKind::Ww,
        ProcessKind::Wz,
        ProcessKind::Zz,
        ProcessKind::Tt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessKind::Bb => "bb",
            ProcessKind::Dijet => "dijet",
            ProcessKind::Ggh => "ggh",
            ProcessKind::Vbfh => "vbfh",
            ProcessKind::W => "w",
            ProcessKind::Z => "z",
            ProcessKind::Ww => "ww",
            ProcessKind::Wz => "wz",
            ProcessKind::Zz => "zz",
            ProcessKind::Tt => "tt",
        }
    }
}

impl Default for ProcessKind {
    fn default() -> Self {
        ProcessKind::W
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ProcessKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = ProcessKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown process: {wanted} (expected one of {})", known.join(", "))
            })
    }
}

/// Parse a simple duration string like `"600s"`, `"250ms"`, `"10m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ))
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_kind_parses_case_insensitively() {
        assert_eq!("WZ".parse::<ProcessKind>().unwrap(), ProcessKind::Wz);
        assert_eq!(" tt ".parse::<ProcessKind>().unwrap(), ProcessKind::Tt);
        let err = "higgsino".parse::<ProcessKind>().unwrap_err();
        assert!(err.contains("unknown process"));
    }

    #[test]
    fn hadron_codes() {
        assert_eq!(Hadron::Proton.code(), 1);
        assert_eq!("pbar".parse::<Hadron>().unwrap().code(), -1);
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("600s").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn oversized_durations_are_errors() {
        let err = parse_duration("9999999999999999h").unwrap_err();
        assert!(err.contains("too large"));
        assert_eq!(
            parse_duration("18446744073709551615s").unwrap(),
            Duration::from_secs(u64::MAX)
        );
    }
}
