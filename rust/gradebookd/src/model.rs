use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accepted in any letter case, emitted upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Term {
    First,
    Second,
    Third,
}

impl Term {
    pub fn as_str(self) -> &'static str {
        match self {
            Term::First => "FIRST",
            Term::Second => "SECOND",
            Term::Third => "THIRD",
        }
    }
}

impl FromStr for Term {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIRST" => Ok(Term::First),
            "SECOND" => Ok(Term::Second),
            "THIRD" => Ok(Term::Third),
            _ => Err("term must be one of: FIRST, SECOND, THIRD".to_string()),
        }
    }
}

impl TryFrom<String> for Term {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Term> for String {
    fn from(value: Term) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// School year token. Accepts `2023/2024` and `2023-2024`; always renders
/// with a slash so both spellings land in the same cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcademicYear {
    start: u16,
    end: u16,
}

impl AcademicYear {
    pub fn new(start: u16, end: u16) -> Result<Self, String> {
        if end < start {
            return Err(format!(
                "academic year ends before it starts ({}/{})",
                start, end
            ));
        }
        Ok(Self { start, end })
    }
}

impl FromStr for AcademicYear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let malformed = || format!("academic year must look like YYYY/YYYY or YYYY-YYYY (got {:?})", s);
        if t.len() != 9 || !t.is_ascii() {
            return Err(malformed());
        }
        let (start, rest) = t.split_at(4);
        let (sep, end) = rest.split_at(1);
        if sep != "/" && sep != "-" {
            return Err(malformed());
        }
        let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !digits(start) || !digits(end) {
            return Err(malformed());
        }
        let start: u16 = start.parse().map_err(|_| malformed())?;
        let end: u16 = end.parse().map_err(|_| malformed())?;
        AcademicYear::new(start, end)
    }
}

impl TryFrom<String> for AcademicYear {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AcademicYear> for String {
    fn from(value: AcademicYear) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:04}", self.start, self.end)
    }
}

/// Upsert key: one entry per student, subject and term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreKey {
    pub student_id: i64,
    pub subject_id: i64,
    pub academic_year: AcademicYear,
    pub term: Term,
}

/// Ranking scope: everyone taking one subject in one class in one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortKey {
    pub subject_id: i64,
    pub class_id: i64,
    pub academic_year: AcademicYear,
    pub term: Term,
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subject {} / class {} / {} {}",
            self.subject_id, self.class_id, self.academic_year, self.term
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub student_id: i64,
    pub subject_id: i64,
    pub class_id: i64,
    pub academic_year: AcademicYear,
    pub term: Term,
    pub ca1: Option<f64>,
    pub ca2: Option<f64>,
    pub exam_score: Option<f64>,
    pub ltc: Option<f64>,
    pub remark: Option<String>,
}

impl ScoreInput {
    /// Ungraded row for a roster student who has nothing entered yet.
    pub fn placeholder(student_id: i64, cohort: &CohortKey) -> Self {
        Self {
            student_id,
            subject_id: cohort.subject_id,
            class_id: cohort.class_id,
            academic_year: cohort.academic_year,
            term: cohort.term,
            ca1: None,
            ca2: None,
            exam_score: None,
            ltc: None,
            remark: None,
        }
    }

    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            student_id: self.student_id,
            subject_id: self.subject_id,
            academic_year: self.academic_year,
            term: self.term,
        }
    }

    pub fn cohort_key(&self) -> CohortKey {
        CohortKey {
            subject_id: self.subject_id,
            class_id: self.class_id,
            academic_year: self.academic_year,
            term: self.term,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    #[serde(flatten)]
    pub input: ScoreInput,
    pub ca_total: Option<f64>,
    pub total_score: Option<f64>,
    pub overall_score: Option<f64>,
    pub grade: Option<String>,
    #[serde(default)]
    pub class_average: Option<f64>,
    #[serde(default)]
    pub subject_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCardSummary {
    pub student_id: i64,
    pub academic_year: AcademicYear,
    pub term: Term,
    pub results: Vec<ScoreResult>,
    pub number_of_subjects: usize,
    pub marks_obtainable: u32,
    pub total_marks_obtained: f64,
    pub average: f64,
    pub has_results: bool,
    pub class_position: Option<u32>,
}
