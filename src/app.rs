use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{AnalysisReport, ApiClient, IdeaService, ValidateOutcome};
use crate::config::Config;
use crate::error::ApiError;
use crate::form::{FieldPolicy, FormInput};
use crate::presenter::View;

pub const INCOMPLETE_FORM_MESSAGE: &str = "Please fill in all fields.";

/// Latest known outcome of one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<T> {
    Idle,
    Success(T),
    Failure(String),
}

impl<T> Default for OperationResult<T> {
    fn default() -> Self {
        OperationResult::Idle
    }
}

impl<T> OperationResult<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationResult::Idle)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            OperationResult::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            OperationResult::Failure(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlightFlags {
    pub validating: bool,
    pub analyzing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Validate,
    Analyze,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Validate => write!(f, "validate"),
            Operation::Analyze => write!(f, "analyze"),
        }
    }
}

/// Outcome of one request, posted back to the owning [`App`] with the
/// sequence number it was issued under.
#[derive(Debug)]
pub enum Settlement {
    Validate {
        seq: u64,
        result: Result<ValidateOutcome, ApiError>,
    },
    Analyze {
        seq: u64,
        result: Result<AnalysisReport, ApiError>,
    },
}

impl Settlement {
    pub fn operation(&self) -> Operation {
        match self {
            Settlement::Validate { .. } => Operation::Validate,
            Settlement::Analyze { .. } => Operation::Analyze,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Online(String),
    Offline,
}

/// Owns the form, both result slots and the in-flight bookkeeping.
///
/// Requests run on spawned tasks; their settlements come back over a channel
/// and are only applied here, so a settlement from a superseded request is
/// dropped instead of overwriting a newer result.
pub struct App {
    pub input: FormInput,
    policy: FieldPolicy,
    service: Arc<dyn IdeaService>,
    validate_result: OperationResult<ValidateOutcome>,
    analyze_result: OperationResult<AnalysisReport>,
    in_flight: InFlightFlags,
    validate_seq: u64,
    analyze_seq: u64,
    backend_status: BackendStatus,
    settlement_tx: mpsc::UnboundedSender<Settlement>,
    settlement_rx: mpsc::UnboundedReceiver<Settlement>,
}

impl App {
    pub fn new(service: Arc<dyn IdeaService>, policy: FieldPolicy) -> Self {
        let (settlement_tx, settlement_rx) = mpsc::unbounded_channel();

        Self {
            input: FormInput::default(),
            policy,
            service,
            validate_result: OperationResult::Idle,
            analyze_result: OperationResult::Idle,
            in_flight: InFlightFlags::default(),
            validate_seq: 0,
            analyze_seq: 0,
            backend_status: BackendStatus::Unknown,
            settlement_tx,
            settlement_rx,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiClient::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )?;
        Ok(Self::new(Arc::new(client), config.form.field_policy))
    }

    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FieldPolicy) {
        self.policy = policy;
    }

    pub fn validate_result(&self) -> &OperationResult<ValidateOutcome> {
        &self.validate_result
    }

    pub fn analyze_result(&self) -> &OperationResult<AnalysisReport> {
        &self.analyze_result
    }

    pub fn in_flight(&self) -> InFlightFlags {
        self.in_flight
    }

    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend_status
    }

    pub fn view(&self) -> View {
        View::derive(&self.validate_result, &self.analyze_result, self.in_flight)
    }

    /// Submits the form for validation.
    ///
    /// Returns false when the form is incomplete and nothing was sent. Any
    /// request still outstanding is superseded either way.
    pub fn validate(&mut self) -> bool {
        self.validate_seq += 1;
        let seq = self.validate_seq;

        if self.policy.enforces_required() && !self.input.is_complete() {
            debug!(missing = ?self.input.missing_fields(), "Validate rejected locally");
            self.in_flight.validating = false;
            self.validate_result = OperationResult::Failure(INCOMPLETE_FORM_MESSAGE.to_string());
            return false;
        }

        self.in_flight.validating = true;
        self.validate_result = OperationResult::Idle;

        let service = Arc::clone(&self.service);
        let input = self.input.clone();
        let tx = self.settlement_tx.clone();
        info!(seq, "Submitting idea for validation");

        tokio::spawn(async move {
            let result = service.validate_idea(&input).await;
            let _ = tx.send(Settlement::Validate { seq, result });
        });

        true
    }

    /// Requests a full analysis of the current idea text.
    pub fn analyze(&mut self) {
        self.analyze_seq += 1;
        let seq = self.analyze_seq;

        self.in_flight.analyzing = true;
        self.analyze_result = OperationResult::Idle;

        let service = Arc::clone(&self.service);
        let idea = self.input.idea.clone();
        let tx = self.settlement_tx.clone();
        info!(seq, "Requesting idea analysis");

        tokio::spawn(async move {
            let result = service.analyze_idea(&idea).await;
            let _ = tx.send(Settlement::Analyze { seq, result });
        });
    }

    /// Applies a settlement. Returns false when it was stale and discarded.
    pub fn apply(&mut self, settlement: Settlement) -> bool {
        match settlement {
            Settlement::Validate { seq, result } => {
                if seq != self.validate_seq {
                    warn!(seq, latest = self.validate_seq, "Discarding stale validate result");
                    return false;
                }

                self.validate_result = match result {
                    Ok(ValidateOutcome::Rejected { error_message }) => {
                        OperationResult::Failure(error_message)
                    }
                    Ok(outcome) => OperationResult::Success(outcome),
                    Err(err) => {
                        warn!(error = %err, "Validate request failed");
                        OperationResult::Failure(err.user_message())
                    }
                };
                debug!(seq, "Validate settled");
                self.in_flight.validating = false;
                true
            }
            Settlement::Analyze { seq, result } => {
                if seq != self.analyze_seq {
                    warn!(seq, latest = self.analyze_seq, "Discarding stale analyze result");
                    return false;
                }

                match result {
                    Ok(report) => self.analyze_result = OperationResult::Success(report),
                    // Analysis errors share the validation error display.
                    Err(err) => {
                        warn!(error = %err, "Analyze request failed");
                        self.validate_result = OperationResult::Failure(err.user_message());
                    }
                }
                debug!(seq, "Analyze settled");
                self.in_flight.analyzing = false;
                true
            }
        }
    }

    /// Applies every settlement that has already arrived, without waiting.
    /// Returns how many were accepted.
    pub fn poll_settlements(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(settlement) = self.settlement_rx.try_recv() {
            if self.apply(settlement) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Waits for the next settlement and applies it.
    pub async fn next_settlement(&mut self) -> (Operation, bool) {
        // The App keeps a sender alive, so the channel never closes.
        let settlement = match self.settlement_rx.recv().await {
            Some(settlement) => settlement,
            None => return std::future::pending().await,
        };
        let operation = settlement.operation();
        (operation, self.apply(settlement))
    }

    /// Waits until the latest request of `operation` has settled.
    pub async fn settle(&mut self, operation: Operation) {
        while self.is_pending(operation) {
            self.next_settlement().await;
        }
    }

    pub fn is_pending(&self, operation: Operation) -> bool {
        match operation {
            Operation::Validate => self.in_flight.validating,
            Operation::Analyze => self.in_flight.analyzing,
        }
    }

    /// Probes the service's test endpoint. Leaves both result slots alone.
    pub async fn check_backend(&mut self) -> &BackendStatus {
        self.backend_status = match self.service.ping().await {
            Ok(message) => {
                info!(message = %message, "Backend reachable");
                BackendStatus::Online(message)
            }
            Err(err) => {
                warn!(error = %err, "Backend unreachable");
                BackendStatus::Offline
            }
        };
        &self.backend_status
    }
}
