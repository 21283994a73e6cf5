//! Form input parsing and validation.
//!
//! Raw fields follow browser number coercion: whitespace is trimmed, an empty
//! field reads as `0`, `0x`/`0o`/`0b` prefixes read as unsigned integers,
//! `Infinity` is the only spelling of infinity, and anything else that is not
//! a decimal literal reads as NaN. Validation then
//! applies one rule to every kind: all fields finite, distance, duration and
//! cadence strictly positive. Elevation gain may be zero or negative.

use crate::error::{Result, TrackerError};
use crate::types::WorkoutKind;

/// Values typed into the workout form, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutForm {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    /// Cadence for running, elevation gain for cycling.
    pub extra: String,
}

impl WorkoutForm {
    pub fn new(
        kind: WorkoutKind,
        distance: impl Into<String>,
        duration: impl Into<String>,
        extra: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            distance: distance.into(),
            duration: duration.into(),
            extra: extra.into(),
        }
    }
}

/// Numbers that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidEntry {
    pub kind: WorkoutKind,
    pub distance: f64,
    pub duration: f64,
    pub extra: f64,
}

pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return match (unsigned, s.starts_with('-')) {
            ("Infinity", false) => f64::INFINITY,
            ("Infinity", true) => f64::NEG_INFINITY,
            _ => f64::NAN,
        };
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|d| acc.mul_add(f64::from(radix), f64::from(d)))
        })
        .unwrap_or(f64::NAN)
}

pub const fn extra_field_name(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => "cadence",
        WorkoutKind::Cycling => "elevation gain",
    }
}

pub fn validate(
    kind: WorkoutKind,
    distance: &str,
    duration: &str,
    extra: &str,
) -> Result<ValidEntry> {
    let extra_positive = matches!(kind, WorkoutKind::Running);
    Ok(ValidEntry {
        kind,
        distance: checked("distance", parse_number(distance), distance, true)?,
        duration: checked("duration", parse_number(duration), duration, true)?,
        extra: checked(extra_field_name(kind), parse_number(extra), extra, extra_positive)?,
    })
}

pub fn validate_form(form: &WorkoutForm) -> Result<ValidEntry> {
    validate(form.kind, &form.distance, &form.duration, &form.extra)
}

/// Same rule as [`validate`] for numbers that are already parsed, e.g. loaded
/// from storage.
pub fn validate_values(
    kind: WorkoutKind,
    distance: f64,
    duration: f64,
    extra: f64,
) -> Result<ValidEntry> {
    let extra_positive = matches!(kind, WorkoutKind::Running);
    Ok(ValidEntry {
        kind,
        distance: checked("distance", distance, &distance.to_string(), true)?,
        duration: checked("duration", duration, &duration.to_string(), true)?,
        extra: checked(
            extra_field_name(kind),
            extra,
            &extra.to_string(),
            extra_positive,
        )?,
    })
}

fn checked(field: &'static str, value: f64, raw: &str, positive: bool) -> Result<f64> {
    if !value.is_finite() {
        return Err(TrackerError::NotFinite {
            field,
            raw: raw.to_string(),
        });
    }
    if positive && value <= 0.0 {
        return Err(TrackerError::NotPositive { field, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_follows_form_coercion() {
        assert_eq!(parse_number(" 5.2 "), 5.2);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn parse_accepts_prefixed_integers() {
        assert_eq!(parse_number("0x1A"), 26.0);
        assert_eq!(parse_number(" 0b101 "), 5.0);
        assert_eq!(parse_number("0o7"), 7.0);
        assert!(parse_number("0x").is_nan());
        assert!(parse_number("0b102").is_nan());
        assert!(parse_number("-0x1A").is_nan());
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number(".5"), 0.5);
    }

    #[test]
    fn prefixed_cadence_is_admissible() {
        let v = validate(WorkoutKind::Running, "5", "25", "0xAA").unwrap();
        assert_eq!(v.extra, 170.0);
    }

    #[test]
    fn running_requires_positive_cadence() {
        let ok = validate(WorkoutKind::Running, "5.2", "24", "178").unwrap();
        assert_eq!(ok.extra, 178.0);

        let err = validate(WorkoutKind::Running, "5.2", "24", "0").unwrap_err();
        assert!(matches!(
            err,
            TrackerError::NotPositive {
                field: "cadence",
                ..
            }
        ));
    }

    #[test]
    fn cycling_accepts_flat_and_downhill_elevation() {
        assert!(validate(WorkoutKind::Cycling, "27", "95", "0").is_ok());
        let v = validate(WorkoutKind::Cycling, "27", "95", "-40").unwrap();
        assert_eq!(v.extra, -40.0);
    }

    #[test]
    fn cycling_rejects_non_numeric_elevation() {
        let err = validate(WorkoutKind::Cycling, "27", "95", "lots").unwrap_err();
        assert!(matches!(
            err,
            TrackerError::NotFinite {
                field: "elevation gain",
                ..
            }
        ));
    }

    #[test]
    fn parsed_values_use_the_same_rule() {
        assert!(validate_values(WorkoutKind::Running, 5.0, 25.0, 170.0).is_ok());
        assert!(validate_values(WorkoutKind::Cycling, 5.0, 25.0, -3.0).is_ok());
        assert!(validate_values(WorkoutKind::Running, 5.0, 25.0, -3.0).is_err());
        let err = validate_values(WorkoutKind::Cycling, f64::NAN, 25.0, 0.0).unwrap_err();
        assert!(matches!(err, TrackerError::NotFinite { field: "distance", .. }));
    }

    #[test]
    fn distance_and_duration_checked_first() {
        for (d, t) in [("0", "10"), ("-1", "10"), ("x", "10"), ("3", ""), ("3", "NaN")] {
            let err = validate(WorkoutKind::Cycling, d, t, "10").unwrap_err();
            assert!(err.is_validation(), "{d:?}/{t:?} should be rejected");
        }
    }
}
