use super::ranking::mean;
use crate::model::ScoreResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall score at or above which a subject counts as passed.
pub const PASS_MARK: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortStatistics {
    pub graded_count: usize,
    pub ungraded_count: usize,
    pub mean: Option<f64>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub pass_count: usize,
    /// Percentage of graded entries at or above the pass mark.
    pub pass_rate: Option<f64>,
    pub grade_distribution: BTreeMap<String, usize>,
}

pub fn cohort_statistics(results: &[ScoreResult]) -> CohortStatistics {
    let scores: Vec<f64> = results.iter().filter_map(|r| r.overall_score).collect();
    let graded_count = scores.len();
    let avg = mean(scores.iter().copied());

    // Population deviation: the cohort is the whole class, not a sample.
    let standard_deviation =
        avg.map(|m| (scores.iter().map(|v| (v - m).powi(2)).sum::<f64>() / graded_count as f64).sqrt());

    let highest = scores.iter().copied().reduce(f64::max);
    let lowest = scores.iter().copied().reduce(f64::min);
    let pass_count = scores.iter().filter(|v| **v >= PASS_MARK).count();
    let pass_rate = (graded_count > 0).then(|| 100.0 * pass_count as f64 / graded_count as f64);

    let mut grade_distribution = BTreeMap::new();
    for grade in results.iter().filter_map(|r| r.grade.as_ref()) {
        *grade_distribution.entry(grade.clone()).or_insert(0) += 1;
    }

    CohortStatistics {
        graded_count,
        ungraded_count: results.len() - graded_count,
        mean: avg,
        highest,
        lowest,
        standard_deviation,
        pass_count,
        pass_rate,
        grade_distribution,
    }
}
