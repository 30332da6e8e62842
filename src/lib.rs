// Library exports for the Scalynx CLI

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod form;
pub mod output;
pub mod presenter;

pub use api::{AnalysisReport, ApiClient, IdeaService, ValidateOutcome};
pub use app::{App, BackendStatus, InFlightFlags, Operation, OperationResult, Settlement};
pub use config::Config;
pub use error::ApiError;
pub use form::{Field, FieldPolicy, FormInput};
pub use output::OutputHandler;
pub use presenter::{AnalysisBlock, ValidationBlock, View};
