use super::ranking::competition_positions;
use super::{reject_duplicate_keys, round_off_2_decimals, CalcError};
use crate::model::{AcademicYear, ReportCardSummary, ScoreResult, Term};

pub const MARKS_PER_SUBJECT: u32 = 100;

/// Build one student's term summary from whatever results are handed in.
/// Rows for other students or other terms are ignored. An empty selection
/// yields a zero-filled summary with `has_results = false`. A subject listed
/// twice is an error; its index refers to the slice handed in.
pub fn assemble_report_card(
    student_id: i64,
    academic_year: AcademicYear,
    term: Term,
    results: &[ScoreResult],
) -> Result<ReportCardSummary, CalcError> {
    let selected: Vec<(usize, &ScoreResult)> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            r.input.student_id == student_id
                && r.input.academic_year == academic_year
                && r.input.term == term
        })
        .collect();
    reject_duplicate_keys(selected.iter().map(|(i, r)| (*i, &r.input)))?;
    let results: Vec<ScoreResult> = selected.into_iter().map(|(_, r)| r.clone()).collect();

    let number_of_subjects = results.len();
    let total_marks_obtained =
        round_off_2_decimals(results.iter().filter_map(|r| r.overall_score).sum());
    let average = if number_of_subjects > 0 {
        round_off_2_decimals(total_marks_obtained / number_of_subjects as f64)
    } else {
        0.0
    };

    Ok(ReportCardSummary {
        student_id,
        academic_year,
        term,
        number_of_subjects,
        marks_obtainable: number_of_subjects as u32 * MARKS_PER_SUBJECT,
        total_marks_obtained,
        average,
        has_results: number_of_subjects > 0,
        class_position: None,
        results,
    })
}

/// Class position by term average, competition style. Summaries without
/// results get no position.
pub fn rank_report_cards(summaries: &mut [ReportCardSummary]) {
    let positions =
        competition_positions(summaries.iter().map(|s| s.has_results.then_some(s.average)));
    for (s, pos) in summaries.iter_mut().zip(positions) {
        s.class_position = pos;
    }
}
