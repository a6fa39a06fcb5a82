pub mod compare;
pub mod config;
pub mod connection;
pub mod error;
pub mod introspect;
pub mod run;

pub use compare::{DiffSummary, DifferenceRecord, ObjectKind};
pub use error::{CompareError, Result};
pub use run::{ComparisonTask, Notifier, ResultSink, RunOutcome, RunStatus};
