//! Derives what to show from the two result slots.
//!
//! Nothing here touches state; the front end calls [`View::derive`] (usually
//! through `App::view`) after every mutation and renders the result.

use crate::api::{AnalysisReport, ValidateOutcome};
use crate::app::{InFlightFlags, OperationResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationBlock {
    Error(String),
    Confirmation(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisBlock {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub rating: String,
    pub probability_label: String,
    /// Width of the probability indicator in percent, 0..=100.
    pub probability_width: f64,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct View {
    pub validation: Option<ValidationBlock>,
    pub analysis: Option<AnalysisBlock>,
    pub validating: bool,
    pub analyzing: bool,
}

impl View {
    pub fn derive(
        validate_result: &OperationResult<ValidateOutcome>,
        analyze_result: &OperationResult<AnalysisReport>,
        in_flight: InFlightFlags,
    ) -> Self {
        Self {
            validation: validation_block(validate_result),
            analysis: analyze_result.success().map(analysis_block),
            validating: in_flight.validating,
            analyzing: in_flight.analyzing,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.validation.is_none() && self.analysis.is_none() && !self.validating && !self.analyzing
    }
}

pub fn validation_block(result: &OperationResult<ValidateOutcome>) -> Option<ValidationBlock> {
    match result {
        OperationResult::Idle => None,
        OperationResult::Failure(message) => Some(ValidationBlock::Error(message.clone())),
        OperationResult::Success(outcome) => Some(ValidationBlock::Confirmation(outcome_text(outcome))),
    }
}

pub fn outcome_text(outcome: &ValidateOutcome) -> String {
    match outcome {
        ValidateOutcome::Verdict { verdict, rating } => {
            format!("{} (Rating: {})", verdict, format_rating(*rating))
        }
        ValidateOutcome::Rejected { error_message } => format!("Error: {}", error_message),
        ValidateOutcome::Info { message } => format!("Info: {}", message),
    }
}

/// Whole ratings print without a fractional part.
fn format_rating(rating: f64) -> String {
    if rating.is_finite() && rating.fract() == 0.0 {
        format!("{}", rating as i64)
    } else {
        format!("{}", rating)
    }
}

fn analysis_block(report: &AnalysisReport) -> AnalysisBlock {
    AnalysisBlock {
        strengths: report.strengths.clone(),
        weaknesses: report.weaknesses.clone(),
        rating: report.rating.clone(),
        probability_label: report.success_probability.clone(),
        probability_width: probability_width(&report.success_probability),
        advice: report.advice.clone(),
    }
}

/// Pulls the first number out of a percentage string such as "72%" or
/// "about 40.5 %". Returns 0 when there is none; clamps to 0..=100.
pub fn probability_width(text: &str) -> f64 {
    let start = match text.find(|c: char| c.is_ascii_digit()) {
        Some(idx) => idx,
        None => return 0.0,
    };
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    number
        .trim_end_matches('.')
        .parse::<f64>()
        .map(|value| value.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report() -> AnalysisReport {
        AnalysisReport {
            strengths: vec!["low cost".into()],
            weaknesses: vec!["seasonal demand".into()],
            rating: "B+".into(),
            success_probability: "65%".into(),
            advice: "Target year-round services".into(),
        }
    }

    #[test]
    fn test_verdict_text() {
        let outcome = ValidateOutcome::Verdict {
            verdict: "Promising".into(),
            rating: 8.0,
        };
        assert_eq!(outcome_text(&outcome), "Promising (Rating: 8)");

        let outcome = ValidateOutcome::Verdict {
            verdict: "Risky".into(),
            rating: 4.5,
        };
        assert_eq!(outcome_text(&outcome), "Risky (Rating: 4.5)");
    }

    #[test]
    fn test_message_shapes_are_prefixed() {
        let rejected = ValidateOutcome::Rejected {
            error_message: "bad".into(),
        };
        let info = ValidateOutcome::Info {
            message: "sounds promising!".into(),
        };
        assert_eq!(outcome_text(&rejected), "Error: bad");
        assert_eq!(outcome_text(&info), "Info: sounds promising!");
    }

    #[test]
    fn test_failure_renders_error_block() {
        let result = OperationResult::Failure("Could not connect to the server.".into());
        assert_eq!(
            validation_block(&result),
            Some(ValidationBlock::Error("Could not connect to the server.".into()))
        );
        assert_eq!(validation_block(&OperationResult::Idle), None);
    }

    #[test]
    fn test_analysis_block_scenario() {
        let view = View::derive(
            &OperationResult::Idle,
            &OperationResult::Success(report()),
            InFlightFlags::default(),
        );

        let analysis = view.analysis.unwrap();
        assert_eq!(analysis.probability_width, 65.0);
        assert_eq!(analysis.advice, "Target year-round services");
        assert_eq!(analysis.strengths, vec!["low cost".to_string()]);
        assert!(view.validation.is_none());
    }

    #[test]
    fn test_blocks_render_side_by_side() {
        let view = View::derive(
            &OperationResult::Failure("x".into()),
            &OperationResult::Success(report()),
            InFlightFlags {
                validating: false,
                analyzing: true,
            },
        );
        assert_eq!(view.validation, Some(ValidationBlock::Error("x".into())));
        assert!(view.analysis.is_some());
        assert!(view.analyzing);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_probability_width_parsing() {
        assert_eq!(probability_width("72%"), 72.0);
        assert_eq!(probability_width("about 40.5 %"), 40.5);
        assert_eq!(probability_width("150%"), 100.0);
        assert_eq!(probability_width("unknown"), 0.0);
        assert_eq!(probability_width(""), 0.0);
    }

    #[test]
    fn test_idle_everything_is_empty() {
        let view = View::derive(&OperationResult::Idle, &OperationResult::Idle, InFlightFlags::default());
        assert!(view.is_empty());
    }
}
