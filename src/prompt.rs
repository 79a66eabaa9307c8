//! Prompt composition for the Gemini gateway.
//!
//! Pure functions: same input, same prompt, no I/O. Composition and the
//! network call are separate steps so the composer can be tested without a
//! server.

use thiserror::Error;

use crate::clinic::HealthContext;

/// A structured symptom report collected by the intake form.
///
/// Optional fields left empty by the patient are `None` and are omitted from
/// the composed prompt rather than rendered blank.
#[derive(Debug, Clone, Default)]
pub struct SymptomReport {
    pub main_symptom: String,
    pub duration: String,
    pub temperature: Option<String>,
    pub additional_symptoms: Option<String>,
    pub medications: Option<String>,
}

/// Form-level rejections, raised before any prompt is composed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    #[error("Please describe your main symptom")]
    MainSymptomTooShort,
    #[error("Please enter the duration")]
    DurationMissing,
}

impl SymptomReport {
    /// Required fields: main symptom of at least two characters, non-empty
    /// duration. The rest is optional.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.main_symptom.trim().chars().count() < 2 {
            return Err(ReportError::MainSymptomTooShort);
        }
        if self.duration.trim().is_empty() {
            return Err(ReportError::DurationMissing);
        }
        Ok(())
    }
}

/// Build the prompt for a free-text assistant question.
///
/// With no context the query passes through untouched. With context, the
/// record is serialized into a labeled block after the query; plain newline
/// separation, no escaping or truncation.
pub fn compose_query(query: &str, context: Option<&HealthContext>) -> String {
    match context {
        None => query.to_string(),
        Some(ctx) => format!("{query}\n\nHealth records context:\n{}", render_health_context(ctx)),
    }
}

fn render_health_context(ctx: &HealthContext) -> String {
    let mut block = String::new();
    if !ctx.allergies.is_empty() {
        block.push_str(&format!("Allergies: {}\n", ctx.allergies.join(", ")));
    }
    if !ctx.conditions.is_empty() {
        block.push_str(&format!("Conditions: {}\n", ctx.conditions.join(", ")));
    }
    if !ctx.medications.is_empty() {
        block.push_str(&format!("Medications: {}\n", ctx.medications.join(", ")));
    }
    if let Some(vitals) = &ctx.vitals {
        block.push_str(&format!(
            "Vital signs: blood pressure {}, heart rate {} bpm, blood sugar {} mg/dL\n",
            vitals.blood_pressure, vitals.heart_rate, vitals.blood_sugar
        ));
    }
    if let Some(last) = &ctx.last_checkup {
        block.push_str(&format!("Last checkup: {last}\n"));
    }
    block
}

/// Build the fixed analysis prompt for a validated symptom report.
pub fn compose_symptom_report(report: &SymptomReport) -> String {
    let mut prompt = String::new();

    prompt.push_str("A patient reports the following symptoms.\n");
    prompt.push_str(&format!("Main symptom: {}\n", report.main_symptom));
    prompt.push_str(&format!("Duration: {}\n", report.duration));
    if let Some(temperature) = &report.temperature {
        prompt.push_str(&format!("Temperature: {temperature}\n"));
    }
    if let Some(additional) = &report.additional_symptoms {
        prompt.push_str(&format!("Additional symptoms: {additional}\n"));
    }
    if let Some(medications) = &report.medications {
        prompt.push_str(&format!("Current medications: {medications}\n"));
    }

    prompt.push_str("\nBased on these symptoms, provide:\n");
    prompt.push_str("1. A possible explanation of what might be causing them\n");
    prompt.push_str("2. Recommendations for managing the symptoms\n");
    prompt.push_str("3. Signs that would require urgent medical attention\n");
    prompt.push_str(
        "\nState explicitly that this is a preliminary analysis and not a medical diagnosis.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::VitalSigns;

    fn sample_context() -> HealthContext {
        HealthContext {
            allergies: vec!["Penicillin".to_string()],
            conditions: vec![],
            medications: vec!["Loratadine 10mg".to_string()],
            vitals: Some(VitalSigns {
                blood_pressure: "119/79".to_string(),
                heart_rate: "70".to_string(),
                blood_sugar: "91".to_string(),
            }),
            last_checkup: Some("March 15, 2024".to_string()),
        }
    }

    #[test]
    fn query_without_context_passes_through() {
        assert_eq!(compose_query("What causes headaches?", None), "What causes headaches?");
    }

    #[test]
    fn query_with_context_contains_both_literals() {
        let ctx = sample_context();
        let prompt = compose_query("I have a headache", Some(&ctx));

        assert!(prompt.contains("I have a headache"));
        assert!(prompt.contains("Health records context:"));
        assert!(prompt.contains("Penicillin"));
        assert!(prompt.starts_with("I have a headache\n\n"));
    }

    #[test]
    fn composition_is_deterministic() {
        let ctx = sample_context();
        let a = compose_query("I have a headache", Some(&ctx));
        let b = compose_query("I have a headache", Some(&ctx));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_context_sections_are_omitted() {
        let ctx = sample_context();
        let prompt = compose_query("q", Some(&ctx));
        assert!(!prompt.contains("Conditions:"));
        assert!(prompt.contains("Medications: Loratadine 10mg"));
        assert!(prompt.contains("Vital signs: blood pressure 119/79"));
        assert!(prompt.contains("Last checkup: March 15, 2024"));
    }

    #[test]
    fn symptom_template_requests_the_three_sections() {
        let report = SymptomReport {
            main_symptom: "persistent cough".to_string(),
            duration: "3 days".to_string(),
            ..Default::default()
        };
        let prompt = compose_symptom_report(&report);

        assert!(prompt.contains("Main symptom: persistent cough"));
        assert!(prompt.contains("Duration: 3 days"));
        assert!(prompt.contains("1. A possible explanation"));
        assert!(prompt.contains("2. Recommendations for managing"));
        assert!(prompt.contains("3. Signs that would require urgent medical attention"));
        assert!(prompt.contains("not a medical diagnosis"));
    }

    #[test]
    fn symptom_template_omits_missing_optionals() {
        let report = SymptomReport {
            main_symptom: "sore throat".to_string(),
            duration: "2 days".to_string(),
            ..Default::default()
        };
        let prompt = compose_symptom_report(&report);

        assert!(!prompt.contains("Temperature:"));
        assert!(!prompt.contains("Additional symptoms:"));
        assert!(!prompt.contains("Current medications:"));
    }

    #[test]
    fn symptom_template_keeps_provided_optionals() {
        let report = SymptomReport {
            main_symptom: "fever".to_string(),
            duration: "1 day".to_string(),
            temperature: Some("38.5C".to_string()),
            additional_symptoms: Some("chills".to_string()),
            medications: Some("ibuprofen".to_string()),
        };
        let prompt = compose_symptom_report(&report);

        assert!(prompt.contains("Temperature: 38.5C"));
        assert!(prompt.contains("Additional symptoms: chills"));
        assert!(prompt.contains("Current medications: ibuprofen"));
    }

    #[test]
    fn report_validation_matches_the_form_rules() {
        let mut report = SymptomReport {
            main_symptom: "x".to_string(),
            duration: "2 days".to_string(),
            ..Default::default()
        };
        assert_eq!(report.validate(), Err(ReportError::MainSymptomTooShort));

        report.main_symptom = "migraine".to_string();
        report.duration = "  ".to_string();
        assert_eq!(report.validate(), Err(ReportError::DurationMissing));

        report.duration = "a week".to_string();
        assert!(report.validate().is_ok());
    }
}
