//! Operation spans, failure events, and outcome counters.
//!
//! With `tracing`, each operation runs in an `authed_rest.operation` span (`verb`, `stage`) and
//! token or transport failures emit `debug` events that never include credentials. With
//! `metrics`, `authed_rest_operation_total` counts attempts, successes, and failures per `verb`.
//! Without either feature every helper compiles to nothing.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Lifecycle point an operation is counted at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// The verb was called.
	Attempt,
	/// The operation resolved with a payload.
	Success,
	/// The operation resolved with an error.
	Failure,
}
impl OperationOutcome {
	/// Metric label for this outcome.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
