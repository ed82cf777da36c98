mod aggregate;
mod grading;
mod normalize;
mod ranking;
mod report;
mod stats;

use crate::model::{CohortKey, ScoreInput};
use serde_json::json;
use std::collections::HashSet;
use std::fmt;

pub use aggregate::compute_result;
pub use grading::{classify, GradeScale};
pub use normalize::{normalize, parse_academic_year, parse_id, parse_term};
pub use ranking::{ordinal, rank_cohort};
pub use report::{assemble_report_card, rank_report_cards};
pub use stats::cohort_statistics;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationReason {
    OutOfRange { value: f64, min: f64, max: f64 },
    NotNumeric,
    Required,
    Malformed(String),
    /// Same student, subject, year and term as an earlier row.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    Validation {
        field: String,
        reason: ValidationReason,
        /// Position within a batch, when the failing record came from one.
        index: Option<usize>,
    },
    InconsistentCohort {
        expected: CohortKey,
        found: CohortKey,
    },
    BatchTooLarge {
        size: usize,
        limit: usize,
    },
}

impl CalcError {
    pub fn validation(field: &str, reason: ValidationReason) -> Self {
        CalcError::Validation {
            field: field.to_string(),
            reason,
            index: None,
        }
    }

    pub fn at_index(self, i: usize) -> Self {
        match self {
            CalcError::Validation { field, reason, .. } => CalcError::Validation {
                field,
                reason,
                index: Some(i),
            },
            other => other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CalcError::Validation { .. } => "validation_failed",
            CalcError::InconsistentCohort { .. } => "inconsistent_cohort",
            CalcError::BatchTooLarge { .. } => "batch_too_large",
        }
    }

    pub fn details(&self) -> serde_json::Value {
        match self {
            CalcError::Validation {
                field,
                reason,
                index,
            } => {
                let mut d = json!({ "field": field });
                match reason {
                    ValidationReason::OutOfRange { value, min, max } => {
                        d["value"] = json!(value);
                        d["min"] = json!(min);
                        d["max"] = json!(max);
                        d["bound"] = json!(if value < min { "min" } else { "max" });
                    }
                    ValidationReason::NotNumeric => d["reason"] = json!("not_numeric"),
                    ValidationReason::Required => d["reason"] = json!("required"),
                    ValidationReason::Malformed(_) => d["reason"] = json!("malformed"),
                    ValidationReason::Duplicate => d["reason"] = json!("duplicate"),
                }
                if let Some(i) = index {
                    d["index"] = json!(i);
                }
                d
            }
            CalcError::InconsistentCohort { expected, found } => json!({
                "expected": expected,
                "found": found,
            }),
            CalcError::BatchTooLarge { size, limit } => json!({
                "size": size,
                "limit": limit,
            }),
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::Validation {
                field,
                reason,
                index,
            } => {
                if let Some(i) = index {
                    write!(f, "records[{}]: ", i)?;
                }
                match reason {
                    ValidationReason::OutOfRange { value, min, .. } if value < min => {
                        write!(f, "{} must be at least {} (got {})", field, min, value)
                    }
                    ValidationReason::OutOfRange { value, max, .. } => {
                        write!(f, "{} must be at most {} (got {})", field, max, value)
                    }
                    ValidationReason::NotNumeric => write!(f, "{} must be numeric", field),
                    ValidationReason::Required => write!(f, "{} is required", field),
                    ValidationReason::Malformed(msg) => write!(f, "{}: {}", field, msg),
                    ValidationReason::Duplicate => write!(
                        f,
                        "{} already has an entry for this subject and term",
                        field
                    ),
                }
            }
            CalcError::InconsistentCohort { expected, found } => write!(
                f,
                "cohort mixes results from different groups: expected {}, found {}",
                expected, found
            ),
            CalcError::BatchTooLarge { size, limit } => {
                write!(f, "batch of {} records exceeds the limit of {}", size, limit)
            }
        }
    }
}

impl std::error::Error for CalcError {}

/// Round half up to two decimals. Sums of decimal marks drift below band
/// edges otherwise (12.2 + 19.9 + 7.9 is not 40.0 in f64).
pub(crate) fn round_off_2_decimals(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// At most one row per student, subject, year and term. The error carries
/// the position of the repeated row.
pub(crate) fn reject_duplicate_keys<'a, I>(rows: I) -> Result<(), CalcError>
where
    I: IntoIterator<Item = (usize, &'a ScoreInput)>,
{
    let mut seen = HashSet::new();
    for (i, input) in rows {
        if !seen.insert(input.key()) {
            let e = CalcError::validation("studentId", ValidationReason::Duplicate);
            return Err(e.at_index(i));
        }
    }
    Ok(())
}
