use super::grading::{classify, GradeScale};
use super::round_off_2_decimals;
use crate::model::{ScoreInput, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub ca_total: Option<f64>,
    pub total_score: Option<f64>,
    pub overall_score: Option<f64>,
}

/// Sum where a missing side counts as zero, but two missing sides stay
/// missing. Keeps "nothing entered" apart from "scored 0".
fn sum_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        _ => Some(round_off_2_decimals(a.unwrap_or(0.0) + b.unwrap_or(0.0))),
    }
}

pub fn aggregate(input: &ScoreInput) -> Aggregate {
    let ca_total = sum_present(input.ca1, input.ca2);
    let total_score = sum_present(ca_total, input.exam_score);
    let overall_score = match (total_score, input.ltc) {
        (Some(total), Some(ltc)) => Some(round_off_2_decimals((total + ltc) / 2.0)),
        (Some(total), None) => Some(total),
        (None, Some(ltc)) => Some(ltc),
        (None, None) => None,
    };
    Aggregate {
        ca_total,
        total_score,
        overall_score,
    }
}

/// Aggregate and grade one entry. Position and class average need the rest
/// of the cohort and are left empty here.
pub fn compute_result(input: ScoreInput, scale: GradeScale) -> ScoreResult {
    let agg = aggregate(&input);
    ScoreResult {
        input,
        ca_total: agg.ca_total,
        total_score: agg.total_score,
        overall_score: agg.overall_score,
        grade: classify(scale, agg.overall_score).map(str::to_string),
        class_average: None,
        subject_position: None,
    }
}
