use crate::calc::{self, CalcError, GradeScale};
use crate::legacy;
use crate::model::{AcademicYear, CohortKey, ReportCardSummary, ScoreInput, ScoreKey, ScoreResult, Term};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertReport {
    pub outcome: UpsertOutcome,
    pub cohort: CohortKey,
    /// Set when the update moved the entry out of another class's cohort.
    pub moved_from: Option<CohortKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub created: usize,
    pub updated: usize,
    pub affected_cohorts: Vec<CohortKey>,
}

/// In-memory score entries plus class rosters, owned by whoever drives the
/// sidecar. Rankings are never stored; every read recomputes its cohort.
#[derive(Debug, Default)]
pub struct ScoreBook {
    entries: Vec<ScoreInput>,
    index: HashMap<ScoreKey, usize>,
    rosters: HashMap<i64, Vec<i64>>,
}

impl ScoreBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert or replace the entry for the input's key. A replaced entry keeps
    /// its original slot so tie order stays stable.
    pub fn upsert(&mut self, input: ScoreInput) -> UpsertReport {
        let key = input.key();
        let cohort = input.cohort_key();
        match self.index.get(&key) {
            Some(&slot) => {
                let previous = self.entries[slot].cohort_key();
                self.entries[slot] = input;
                UpsertReport {
                    outcome: UpsertOutcome::Updated,
                    cohort,
                    moved_from: (previous != cohort).then_some(previous),
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(input);
                UpsertReport {
                    outcome: UpsertOutcome::Created,
                    cohort,
                    moved_from: None,
                }
            }
        }
    }

    /// All-or-nothing batch: every record is normalized before any is applied.
    pub fn upsert_batch(
        &mut self,
        records: &[serde_json::Value],
        limit: usize,
    ) -> Result<BatchOutcome, CalcError> {
        if records.len() > limit {
            return Err(CalcError::BatchTooLarge {
                size: records.len(),
                limit,
            });
        }
        let inputs = records
            .iter()
            .enumerate()
            .map(|(i, raw)| legacy::normalize_record(raw).map_err(|e| e.at_index(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = 0;
        let mut updated = 0;
        let mut affected = BTreeSet::new();
        for input in inputs {
            let report = self.upsert(input);
            match report.outcome {
                UpsertOutcome::Created => created += 1,
                UpsertOutcome::Updated => updated += 1,
            }
            affected.insert(report.cohort);
            if let Some(prev) = report.moved_from {
                affected.insert(prev);
            }
        }
        Ok(BatchOutcome {
            created,
            updated,
            affected_cohorts: affected.into_iter().collect(),
        })
    }

    /// Replace a class roster. Duplicate ids are dropped, first one wins.
    pub fn set_roster(&mut self, class_id: i64, student_ids: Vec<i64>) -> usize {
        let mut seen = HashSet::new();
        let roster: Vec<i64> = student_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        let n = roster.len();
        self.rosters.insert(class_id, roster);
        n
    }

    pub fn roster(&self, class_id: i64) -> &[i64] {
        self.rosters.get(&class_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn cohort_inputs(&self, key: &CohortKey) -> Vec<ScoreInput> {
        self.entries
            .iter()
            .filter(|e| e.cohort_key() == *key)
            .cloned()
            .collect()
    }

    /// True when this exact row (same key, same class) was entered, as opposed
    /// to synthesized for a roster student.
    fn is_entered(&self, input: &ScoreInput) -> bool {
        self.index
            .get(&input.key())
            .map(|&slot| self.entries[slot].class_id == input.class_id)
            .unwrap_or(false)
    }

    /// Ranked results for a cohort. Roster students with no entry appear as
    /// ungraded rows after the entered ones.
    pub fn cohort_results(
        &self,
        key: &CohortKey,
        scale: GradeScale,
    ) -> Result<Vec<ScoreResult>, CalcError> {
        let mut inputs = self.cohort_inputs(key);
        let present: HashSet<i64> = inputs.iter().map(|i| i.student_id).collect();
        for &student_id in self.roster(key.class_id) {
            if !present.contains(&student_id) {
                inputs.push(ScoreInput::placeholder(student_id, key));
            }
        }
        calc::rank_cohort(
            inputs
                .into_iter()
                .map(|i| calc::compute_result(i, scale))
                .collect(),
        )
    }

    fn cohorts_where<F>(&self, pred: F) -> Vec<CohortKey>
    where
        F: Fn(&ScoreInput) -> bool,
    {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| pred(e))
            .map(|e| e.cohort_key())
            .filter(|k| seen.insert(*k))
            .collect()
    }

    pub fn report_card(
        &self,
        student_id: i64,
        academic_year: AcademicYear,
        term: Term,
        scale: GradeScale,
    ) -> Result<ReportCardSummary, CalcError> {
        let cohorts = self.cohorts_where(|e| {
            e.student_id == student_id && e.academic_year == academic_year && e.term == term
        });
        let mut results = Vec::new();
        for key in &cohorts {
            results.extend(
                self.cohort_results(key, scale)?
                    .into_iter()
                    .filter(|r| r.input.student_id == student_id),
            );
        }
        calc::assemble_report_card(student_id, academic_year, term, &results)
    }

    /// Report cards for every student of a class, each cohort ranked once.
    pub fn class_report_cards(
        &self,
        class_id: i64,
        academic_year: AcademicYear,
        term: Term,
        scale: GradeScale,
    ) -> Result<Vec<ReportCardSummary>, CalcError> {
        let in_class = |e: &ScoreInput| {
            e.class_id == class_id && e.academic_year == academic_year && e.term == term
        };

        let mut seen = HashSet::new();
        let students: Vec<i64> = self
            .roster(class_id)
            .iter()
            .copied()
            .chain(self.entries.iter().filter(|e| in_class(e)).map(|e| e.student_id))
            .filter(|id| seen.insert(*id))
            .collect();

        let mut entered: Vec<ScoreResult> = Vec::new();
        for key in self.cohorts_where(in_class) {
            entered.extend(
                self.cohort_results(&key, scale)?
                    .into_iter()
                    .filter(|r| self.is_entered(&r.input)),
            );
        }

        let mut cards: Vec<ReportCardSummary> = students
            .into_iter()
            .map(|sid| calc::assemble_report_card(sid, academic_year, term, &entered))
            .collect::<Result<_, CalcError>>()?;
        calc::rank_report_cards(&mut cards);
        Ok(cards)
    }
}
