//! Ingestion-boundary checks for inbound reports.
//!
//! Reports pass through these stages before the controller touches any
//! state:
//! 1. Declared limits -- the `validator` rules on the report type.
//! 2. Blank fields -- names that are empty once trimmed.
//! 3. Canonicalization -- whitespace trimmed, known symptom names mapped to
//!    their canonical spelling regardless of case.
//!
//! The risk engine never validates; anything that reaches it has been
//! through here.

use std::collections::BTreeMap;

use arogya_types::{CaseReport, WaterReport};
use validator::Validate;

/// Longest accepted symptom name, in bytes.
const MAX_SYMPTOM_LEN: usize = 64;

/// Why an inbound report was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A declared field limit was violated.
    #[error("report failed field checks: {0}")]
    Fields(#[from] validator::ValidationErrors),

    /// A required text field is empty or whitespace only.
    #[error("{field} must not be blank")]
    Blank {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A symptom entry is empty or whitespace only.
    #[error("symptom #{index} must not be blank")]
    BlankSymptom {
        /// Position of the symptom in the submitted list.
        index: usize,
    },

    /// A symptom entry is longer than allowed.
    #[error("symptom #{index} exceeds {MAX_SYMPTOM_LEN} bytes")]
    SymptomTooLong {
        /// Position of the symptom in the submitted list.
        index: usize,
    },
}

/// Check a case report and return its canonical form.
///
/// `known_symptoms` is the symptom weight table; names matching a key
/// case-insensitively are rewritten to that key. Unknown names are kept as
/// submitted (trimmed).
///
/// # Errors
///
/// Returns [`ValidationError`] for the first problem found.
pub fn validate_case_report<V>(
    report: &CaseReport,
    known_symptoms: &BTreeMap<String, V>,
) -> Result<CaseReport, ValidationError> {
    report.validate()?;

    let village = non_blank(&report.village, "village")?;

    let mut symptoms = Vec::with_capacity(report.symptoms.len());
    for (index, raw) in report.symptoms.iter().enumerate() {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankSymptom { index });
        }
        if name.len() > MAX_SYMPTOM_LEN {
            return Err(ValidationError::SymptomTooLong { index });
        }
        symptoms.push(canonical_symptom(name, known_symptoms));
    }

    let diagnosis = report
        .diagnosis
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned);

    Ok(CaseReport {
        village,
        symptoms,
        diagnosis,
    })
}

/// Check a water report and return its canonical form.
///
/// # Errors
///
/// Returns [`ValidationError`] for the first problem found.
pub fn validate_water_report(report: &WaterReport) -> Result<WaterReport, ValidationError> {
    report.validate()?;
    Ok(WaterReport {
        source_id: non_blank(&report.source_id, "source_id")?,
        status: report.status,
        village: non_blank(&report.village, "village")?,
    })
}

fn non_blank(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(trimmed.to_owned())
}

fn canonical_symptom<V>(name: &str, known: &BTreeMap<String, V>) -> String {
    known
        .keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .map_or_else(|| name.to_owned(), Clone::clone)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use arogya_types::WaterStatus;

    use super::*;
    use crate::config::RiskConfig;

    fn known() -> BTreeMap<String, u32> {
        RiskConfig::default().symptom_weights
    }

    #[test]
    fn well_formed_case_passes() {
        let report = CaseReport::new("Majuli", &["Fever"]);
        let clean = validate_case_report(&report, &known()).unwrap();
        assert_eq!(clean, report);
    }

    #[test]
    fn symptom_names_are_canonicalized() {
        let report = CaseReport::new(" Majuli ", &["diarrhea", "STOMACH PAIN", " Cough "]);
        let clean = validate_case_report(&report, &known()).unwrap();
        assert_eq!(clean.village, "Majuli");
        assert_eq!(clean.symptoms, vec!["Diarrhea", "Stomach Pain", "Cough"]);
    }

    #[test]
    fn blank_village_is_rejected() {
        let report = CaseReport::new("   ", &["Fever"]);
        let err = validate_case_report(&report, &known()).unwrap_err();
        assert!(matches!(err, ValidationError::Blank { field: "village" }));
    }

    #[test]
    fn empty_village_fails_declared_limits() {
        let report = CaseReport::new("", &["Fever"]);
        let err = validate_case_report(&report, &known()).unwrap_err();
        assert!(matches!(err, ValidationError::Fields(_)));
    }

    #[test]
    fn missing_symptoms_are_rejected() {
        let report = CaseReport::new("Majuli", &[]);
        let err = validate_case_report(&report, &known()).unwrap_err();
        assert!(matches!(err, ValidationError::Fields(_)));
    }

    #[test]
    fn blank_symptom_is_rejected() {
        let report = CaseReport::new("Majuli", &["Fever", "  "]);
        let err = validate_case_report(&report, &known()).unwrap_err();
        assert!(matches!(err, ValidationError::BlankSymptom { index: 1 }));
    }

    #[test]
    fn overlong_symptom_is_rejected() {
        let long = "x".repeat(65);
        let report = CaseReport::new("Majuli", &[long.as_str()]);
        let err = validate_case_report(&report, &known()).unwrap_err();
        assert!(matches!(err, ValidationError::SymptomTooLong { index: 0 }));
    }

    #[test]
    fn blank_diagnosis_becomes_none() {
        let mut report = CaseReport::new("Majuli", &["Fever"]);
        report.diagnosis = Some(String::from("  "));
        let clean = validate_case_report(&report, &known()).unwrap();
        assert!(clean.diagnosis.is_none());
    }

    #[test]
    fn water_report_checks_both_names() {
        let ok = validate_water_report(&WaterReport::new(" well-3 ", WaterStatus::Safe, "Majuli")).unwrap();
        assert_eq!(ok.source_id, "well-3");

        let err = validate_water_report(&WaterReport::new(" ", WaterStatus::Safe, "Majuli")).unwrap_err();
        assert!(matches!(err, ValidationError::Blank { field: "source_id" }));

        let err = validate_water_report(&WaterReport::new("well-3", WaterStatus::Safe, "")).unwrap_err();
        assert!(matches!(err, ValidationError::Fields(_)));
    }
}
