//! Period reconciliation shared by every consumer of a résumé.
//!
//! The recommendation engine, the Markdown exporter and the template view model
//! all call these two functions. A period string must read the same in every
//! output format, so no caller may rebuild it on its own.

use crate::models::resume::{EducationEntry, ExperienceEntry};

/// Shown after the start date of an ongoing position.
pub const PRESENT_LABEL: &str = "Present";

/// `years` → `year` → `start-end` → `start` → empty.
pub fn resolve_education_period(entry: &EducationEntry) -> String {
    if !entry.years.is_empty() {
        return entry.years.clone();
    }
    if !entry.year.is_empty() {
        return entry.year.clone();
    }
    match (entry.start_year.as_str(), entry.end_year.as_str()) {
        ("", _) => String::new(),
        (start, "") => start.to_string(),
        (start, end) => format!("{start}-{end}"),
    }
}

/// `period` → `start - end` → `start - Present` → `start` → `end` → empty.
pub fn resolve_work_period(entry: &ExperienceEntry) -> String {
    if !entry.period.is_empty() {
        return entry.period.clone();
    }
    let start = entry.start.as_str();
    let end = entry.end.as_str();
    match (start, end) {
        ("", "") => String::new(),
        ("", end) => end.to_string(),
        (start, "") if entry.current => format!("{start} - {PRESENT_LABEL}"),
        (start, "") => start.to_string(),
        (start, end) => format!("{start} - {end}"),
    }
}
