use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PredictError;

const MAX_SIDE_DIGITS: usize = 2;

/// An exact match score, home goals first.
///
/// A side written with a leading zero (`"01-2"`) keeps it, so a parsed score
/// renders back to the text it was read from. Equality follows that text:
/// `"01-2"` and `"1-2"` are different quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Score {
    pub home: u8,
    pub away: u8,
    home_padded: bool,
    away_padded: bool,
}

impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self {
            home,
            away,
            home_padded: false,
            away_padded: false,
        }
    }

    /// Same goals, written without leading zeros.
    pub fn canonical(self) -> Self {
        Self::new(self.home, self.away)
    }

    pub fn total(self) -> u32 {
        self.home as u32 + self.away as u32
    }

    pub fn goal_difference(self) -> u32 {
        self.home.abs_diff(self.away) as u32
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_side(f, self.home, self.home_padded)?;
        f.write_str("-")?;
        write_side(f, self.away, self.away_padded)
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, goals: u8, padded: bool) -> fmt::Result {
    if padded {
        write!(f, "{goals:02}")
    } else {
        write!(f, "{goals}")
    }
}

impl FromStr for Score {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_score("score", s)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_score("score", &raw).map_err(serde::de::Error::custom)
    }
}

/// Parses `"A-B"` where each side is one or two ASCII digits. Surrounding
/// whitespace is ignored; anything else is `InvalidFormat` for `field`.
pub fn parse_score(field: &str, raw: &str) -> Result<Score, PredictError> {
    let s = raw.trim();
    let invalid = || PredictError::invalid_format(field, raw);

    let (home, away) = s.split_once('-').ok_or_else(invalid)?;
    let (home, home_padded) = parse_side(home).ok_or_else(invalid)?;
    let (away, away_padded) = parse_side(away).ok_or_else(invalid)?;
    Ok(Score {
        home,
        away,
        home_padded,
        away_padded,
    })
}

/// Goals and whether the side was written with a leading zero.
fn parse_side(part: &str) -> Option<(u8, bool)> {
    if part.is_empty() || part.len() > MAX_SIDE_DIGITS {
        return None;
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let goals = part.parse::<u8>().ok()?;
    Some((goals, part.len() == MAX_SIDE_DIGITS && part.starts_with('0')))
}

/// Parses a decimal betting coefficient; it must be a finite number above 1.0.
pub fn parse_coefficient(field: &str, raw: &str) -> Result<f64, PredictError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| PredictError::invalid_coefficient(field, raw))?;
    check_coefficient(field, value)
}

pub fn check_coefficient(field: &str, value: f64) -> Result<f64, PredictError> {
    if value.is_finite() && value > 1.0 {
        Ok(value)
    } else {
        Err(PredictError::invalid_coefficient(field, value.to_string()))
    }
}

pub(crate) fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_scores() {
        assert_eq!(parse_score("s", "2-1").unwrap(), Score::new(2, 1));
        assert_eq!(parse_score("s", "10-0").unwrap(), Score::new(10, 0));
        assert_eq!(parse_score("s", " 3-3 ").unwrap(), Score::new(3, 3));
        assert_eq!(parse_score("s", "99-99").unwrap(), Score::new(99, 99));
    }

    #[test]
    fn rejects_malformed_scores() {
        for raw in ["", "2", "2-", "-1", "12-3-4", "100-1", "a-b", "2:1", "+1-2", "1 - 2"] {
            let err = parse_score("h2h[0].full_time", raw).unwrap_err();
            assert!(
                matches!(err, PredictError::InvalidFormat { .. }),
                "expected InvalidFormat for {raw:?}"
            );
        }
    }

    #[test]
    fn error_carries_field_and_value() {
        let err = parse_score("odds[3].score", "x").unwrap_err();
        assert_eq!(err.field(), Some("odds[3].score"));
        assert!(err.to_string().contains("\"x\""));
    }

    #[test]
    fn leading_zero_survives_display() {
        let s = parse_score("s", "01-2").unwrap();
        assert_eq!((s.home, s.away), (1, 2));
        assert_eq!(s.to_string(), "01-2");
        assert_ne!(s, Score::new(1, 2));
        assert_eq!(s.canonical(), Score::new(1, 2));

        for raw in ["00-00", "7-09", "10-05", " 03-3 "] {
            assert_eq!(parse_score("s", raw).unwrap().to_string(), raw.trim());
        }
    }

    #[test]
    fn coefficient_must_exceed_one() {
        assert_eq!(parse_coefficient("c", "1.85").unwrap(), 1.85);
        assert_eq!(parse_coefficient("c", " 12 ").unwrap(), 12.0);
        for raw in ["1", "1.0", "0.5", "-3", "abc", "", "NaN", "inf"] {
            assert!(
                matches!(
                    parse_coefficient("c", raw),
                    Err(PredictError::InvalidCoefficient { .. })
                ),
                "expected InvalidCoefficient for {raw:?}"
            );
        }
    }

    #[test]
    fn score_serde_uses_string_form() {
        let json = serde_json::to_string(&Score::new(4, 2)).unwrap();
        assert_eq!(json, "\"4-2\"");
        let back: Score = serde_json::from_str("\"0-3\"").unwrap();
        assert_eq!(back, Score::new(0, 3));
        assert!(serde_json::from_str::<Score>("\"0-3-1\"").is_err());
        let padded: Score = serde_json::from_str("\"02-0\"").unwrap();
        assert_eq!(serde_json::to_string(&padded).unwrap(), "\"02-0\"");
    }

    #[test]
    fn totals_and_differences() {
        let s = Score::new(1, 4);
        assert_eq!(s.total(), 5);
        assert_eq!(s.goal_difference(), 3);
    }
}
