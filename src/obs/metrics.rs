// self
use crate::{executor::Verb, obs::OperationOutcome};

/// Bumps `authed_rest_operation_total` for `verb` and `outcome`; no-op without `metrics`.
pub fn record_operation_outcome(verb: Verb, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"authed_rest_operation_total",
			"verb" => verb.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (verb, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcomes_are_safe_without_a_recorder() {
		record_operation_outcome(Verb::GetAll, OperationOutcome::Failure);
	}
}
