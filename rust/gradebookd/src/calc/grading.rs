use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeBand {
    pub min: f64,
    pub letter: &'static str,
}

const fn band(min: f64, letter: &'static str) -> GradeBand {
    GradeBand { min, letter }
}

// Highest band first; lower bounds are inclusive.
const REPORT_CARD_BANDS: [GradeBand; 5] = [
    band(80.0, "A"),
    band(65.0, "B"),
    band(50.0, "C"),
    band(40.0, "D"),
    band(0.0, "F"),
];

const QUICK_GRADE_BANDS: [GradeBand; 8] = [
    band(90.0, "A+"),
    band(80.0, "A"),
    band(70.0, "B+"),
    band(60.0, "B"),
    band(50.0, "C+"),
    band(40.0, "C"),
    band(30.0, "D"),
    band(0.0, "F"),
];

/// Named letter scales. The report card scale grades terminal results; the
/// quick grade scale backs the quick entry view. They are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradeScale {
    #[default]
    #[serde(rename = "REPORT_CARD_SCALE", alias = "report_card")]
    ReportCard,
    #[serde(rename = "QUICK_GRADE_SCALE", alias = "quick_grade")]
    QuickGrade,
}

impl GradeScale {
    pub const ALL: [GradeScale; 2] = [GradeScale::ReportCard, GradeScale::QuickGrade];

    pub fn as_str(self) -> &'static str {
        match self {
            GradeScale::ReportCard => "REPORT_CARD_SCALE",
            GradeScale::QuickGrade => "QUICK_GRADE_SCALE",
        }
    }

    pub fn bands(self) -> &'static [GradeBand] {
        match self {
            GradeScale::ReportCard => &REPORT_CARD_BANDS,
            GradeScale::QuickGrade => &QUICK_GRADE_BANDS,
        }
    }
}

impl FromStr for GradeScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REPORT_CARD_SCALE" | "REPORT_CARD" => Ok(GradeScale::ReportCard),
            "QUICK_GRADE_SCALE" | "QUICK_GRADE" => Ok(GradeScale::QuickGrade),
            _ => Err("scale must be one of: REPORT_CARD_SCALE, QUICK_GRADE_SCALE".to_string()),
        }
    }
}

/// Letter for an overall score; `None` means ungraded.
pub fn classify(scale: GradeScale, overall_score: Option<f64>) -> Option<&'static str> {
    let score = overall_score?;
    let bands = scale.bands();
    let letter = bands
        .iter()
        .find(|b| score >= b.min)
        .or(bands.last())
        .map(|b| b.letter)?;
    Some(letter)
}
