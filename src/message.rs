//! Inbound message codec.
//!
//! Messages arrive as text in one of two shapes:
//!
//! - a tone object: `{"frequency": 523.25, "sineTerms": [0, 0, 1, 0, 1]}`,
//!   where both the frequency and every term may also be numeric strings
//! - a bare frequency: `440`, `"440"` or any text that parses as a decimal
//!
//! A bare frequency, or an object without `sineTerms`, plays with the
//! fallback harmonics.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::DEFAULT_HARMONICS;
use crate::error::ParseError;

/// Pitch of C5 in Hz
pub const C5_FREQUENCY: f64 = 523.251130601197269;

/// A validated request to play one tone.
#[derive(Clone, Debug, PartialEq)]
pub struct ToneRequest {
    /// Oscillator pitch in Hz; positive and representable as `f32`
    pub frequency: f64,
    /// Sine amplitude per harmonic index; index 0 is the DC slot
    pub harmonics: Vec<f64>,
}

impl ToneRequest {
    pub fn new(frequency: f64, harmonics: Vec<f64>) -> Self {
        Self { frequency, harmonics }
    }
}

#[derive(Deserialize)]
struct ToneMessage {
    frequency: Option<Value>,
    #[serde(rename = "sineTerms")]
    sine_terms: Option<Value>,
}

/// Parse a message, defaulting harmonics to [`DEFAULT_HARMONICS`].
///
/// Every rejection is logged before it is returned.
///
/// ```
/// # use toneport::{parse, ParseError};
/// let request = parse(r#"{"frequency": 440, "sineTerms": [0, 1, "0.5"]}"#).unwrap();
/// assert_eq!(request.frequency, 440.0);
/// assert_eq!(request.harmonics, vec![0.0, 1.0, 0.5]);
///
/// assert_eq!(parse("not json"), Err(ParseError::MalformedMessage));
/// ```
pub fn parse(raw: &str) -> Result<ToneRequest, ParseError> {
    parse_with_fallback(raw, &DEFAULT_HARMONICS)
}

/// Parse a message, using `fallback` when it carries no harmonics.
pub fn parse_with_fallback(raw: &str, fallback: &[f64]) -> Result<ToneRequest, ParseError> {
    let result = decode(raw, fallback);
    if let Err(err) = &result {
        match err {
            ParseError::MalformedMessage => warn!(message = raw, "could not decode tone message"),
            ParseError::InvalidFrequency => warn!(message = raw, "tone message has no usable frequency"),
            ParseError::InvalidHarmonics => warn!(message = raw, "tone message has invalid sine terms"),
        }
    }
    result
}

fn decode(raw: &str, fallback: &[f64]) -> Result<ToneRequest, ParseError> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return bare_text(raw, fallback),
    };

    match value {
        Value::Object(_) => {
            let message = ToneMessage::deserialize(value).map_err(|_| ParseError::MalformedMessage)?;
            let frequency = message
                .frequency
                .as_ref()
                .and_then(number_like)
                .filter(|&f| playable(f))
                .ok_or(ParseError::InvalidFrequency)?;
            let harmonics = match message.sine_terms {
                Some(terms) => harmonics(&terms)?,
                None => fallback.to_vec(),
            };
            Ok(ToneRequest::new(frequency, harmonics))
        }
        Value::Number(_) | Value::String(_) => {
            let frequency = number_like(&value)
                .filter(|&f| playable(f))
                .ok_or(ParseError::InvalidFrequency)?;
            Ok(ToneRequest::new(frequency, fallback.to_vec()))
        }
        _ => Err(ParseError::MalformedMessage),
    }
}

/// Text that is not JSON but still reads as a decimal, e.g. `440.`
fn bare_text(raw: &str, fallback: &[f64]) -> Result<ToneRequest, ParseError> {
    match raw.trim().parse::<f64>() {
        Ok(f) if playable(f) => Ok(ToneRequest::new(f, fallback.to_vec())),
        Ok(_) => Err(ParseError::InvalidFrequency),
        Err(_) => Err(ParseError::MalformedMessage),
    }
}

fn harmonics(terms: &Value) -> Result<Vec<f64>, ParseError> {
    let Value::Array(terms) = terms else {
        return Err(ParseError::InvalidHarmonics);
    };
    terms
        .iter()
        .map(|term| {
            number_like(term)
                .filter(|&t| (t as f32).is_finite())
                .ok_or(ParseError::InvalidHarmonics)
        })
        .collect()
}

/// Positive and still finite once narrowed to the oscillator's `f32`
fn playable(frequency: f64) -> bool {
    frequency > 0.0 && (frequency as f32).is_finite()
}

/// A finite number, or a string holding one.
///
/// JSON numbers beyond `f64` range arrive here intact and are rejected.
fn number_like(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tone_object() {
        let request = parse(r#"{"frequency": 523.25, "sineTerms": [0, 0, 1, 0, 1]}"#).unwrap();
        assert_eq!(request.frequency, 523.25);
        assert_eq!(request.harmonics, vec![0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn accepts_numeric_strings() {
        let request = parse(r#"{"frequency": " 261.63", "sineTerms": ["0", "1e-1", 2]}"#).unwrap();
        assert_eq!(request.frequency, 261.63);
        assert_eq!(request.harmonics, vec![0.0, 0.1, 2.0]);
    }

    #[test]
    fn keeps_empty_harmonics() {
        let request = parse(r#"{"frequency": 440, "sineTerms": []}"#).unwrap();
        assert!(request.harmonics.is_empty());
    }

    #[test]
    fn missing_or_null_terms_use_fallback() {
        let missing = parse(r#"{"frequency": 440}"#).unwrap();
        assert_eq!(missing.harmonics, DEFAULT_HARMONICS.to_vec());

        let null = parse_with_fallback(r#"{"frequency": 440, "sineTerms": null}"#, &[0.0, 1.0]).unwrap();
        assert_eq!(null.harmonics, vec![0.0, 1.0]);
    }

    #[test]
    fn bare_frequency_forms() {
        for raw in ["440", "\"440\"", " 440. ", "440.0"] {
            let request = parse(raw).unwrap();
            assert_eq!(request.frequency, 440.0, "{raw}");
            assert_eq!(request.harmonics, DEFAULT_HARMONICS.to_vec(), "{raw}");
        }
    }

    #[test]
    fn malformed_messages() {
        for raw in ["not json", "", "[440]", "true", "null", "{\"frequency\": 440", "{"] {
            assert_eq!(parse(raw), Err(ParseError::MalformedMessage), "{raw}");
        }
    }

    #[test]
    fn invalid_frequencies() {
        for raw in [
            r#"{"frequency": "abc", "sineTerms": []}"#,
            r#"{"sineTerms": [0, 1]}"#,
            r#"{"frequency": null}"#,
            r#"{"frequency": [440]}"#,
            r#"{"frequency": "NaN"}"#,
            r#"{"frequency": "inf"}"#,
            r#"{"frequency": 0}"#,
            r#"{"frequency": -440}"#,
            "\"abc\"",
            "-5",
            "NaN",
        ] {
            assert_eq!(parse(raw), Err(ParseError::InvalidFrequency), "{raw}");
        }
    }

    #[test]
    fn invalid_harmonics() {
        for raw in [
            r#"{"frequency": 440, "sineTerms": "nope"}"#,
            r#"{"frequency": 440, "sineTerms": 1}"#,
            r#"{"frequency": 440, "sineTerms": {"0": 1}}"#,
            r#"{"frequency": 440, "sineTerms": [0, 0, 1, "x"]}"#,
            r#"{"frequency": 440, "sineTerms": [0, null]}"#,
            r#"{"frequency": 440, "sineTerms": [[1]]}"#,
        ] {
            assert_eq!(parse(raw), Err(ParseError::InvalidHarmonics), "{raw}");
        }
    }

    #[test]
    fn numbers_the_oscillator_cannot_hold() {
        for raw in [
            r#"{"frequency": 1e39}"#,
            r#"{"frequency": "1e39"}"#,
            r#"{"frequency": 1e400}"#,
            "1e39",
            "1e400",
        ] {
            assert_eq!(parse(raw), Err(ParseError::InvalidFrequency), "{raw}");
        }
        for raw in [
            r#"{"frequency": 440, "sineTerms": [0, 1e39]}"#,
            r#"{"frequency": 440, "sineTerms": [1e400]}"#,
        ] {
            assert_eq!(parse(raw), Err(ParseError::InvalidHarmonics), "{raw}");
        }

        assert_eq!(parse("1e38").unwrap().frequency, 1e38);
    }

    #[test]
    fn frequency_is_checked_before_harmonics() {
        assert_eq!(
            parse(r#"{"frequency": "abc", "sineTerms": "nope"}"#),
            Err(ParseError::InvalidFrequency)
        );
    }
}
