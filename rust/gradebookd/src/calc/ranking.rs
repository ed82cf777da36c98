use super::{reject_duplicate_keys, round_off_2_decimals, CalcError};
use crate::model::ScoreResult;
use std::cmp::Ordering;

/// Standard competition positions ("1224") for a list of scores, descending.
/// Missing scores get no position. Output lines up with the input order.
pub(crate) fn competition_positions<I>(scores: I) -> Vec<Option<u32>>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let scores: Vec<Option<f64>> = scores.into_iter().collect();
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|v| (i, v)))
        .collect();
    // Stable: equal scores keep insertion order.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut out = vec![None; scores.len()];
    let mut prev: Option<(f64, u32)> = None;
    for (n, (i, v)) in ranked.into_iter().enumerate() {
        let pos = match prev {
            Some((pv, pp)) if pv == v => pp,
            _ => (n + 1) as u32,
        };
        out[i] = Some(pos);
        prev = Some((v, pos));
    }
    out
}

pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Fill `subject_position` and `class_average` for one cohort.
///
/// Every entry must belong to the same subject, class, year and term, and
/// each student may appear once. Ungraded entries stay in place without a
/// position and do not count toward the average.
pub fn rank_cohort(mut cohort: Vec<ScoreResult>) -> Result<Vec<ScoreResult>, CalcError> {
    let Some(expected) = cohort.first().map(|r| r.input.cohort_key()) else {
        return Ok(cohort);
    };
    if let Some(found) = cohort
        .iter()
        .map(|r| r.input.cohort_key())
        .find(|k| *k != expected)
    {
        return Err(CalcError::InconsistentCohort { expected, found });
    }
    reject_duplicate_keys(cohort.iter().map(|r| &r.input).enumerate())?;

    let positions = competition_positions(cohort.iter().map(|r| r.overall_score));
    let class_average =
        mean(cohort.iter().filter_map(|r| r.overall_score)).map(round_off_2_decimals);
    for (r, pos) in cohort.iter_mut().zip(positions) {
        r.subject_position = pos;
        r.class_average = class_average;
    }
    Ok(cohort)
}

pub fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (1, h) if h != 11 => "st",
        (2, h) if h != 12 => "nd",
        (3, h) if h != 13 => "rd",
        _ => "th",
    }
}

pub fn ordinal(n: u32) -> String {
    format!("{}{}", n, ordinal_suffix(n))
}
