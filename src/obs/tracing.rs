// self
use crate::{_prelude::*, executor::Verb};

/// Span wrapping one client operation; inert without the `tracing` feature.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Opens an `authed_rest.operation` span for `verb` at `stage`.
	pub fn new(verb: Verb, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("authed_rest.operation", verb = verb.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (verb, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span, re-entering it on every poll.
	pub fn instrument<Fut>(&self, fut: Fut) -> impl Future<Output = Fut::Output> + use<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Notes a token provider failure. The provider message is not logged.
pub fn record_token_failure(verb: Verb) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(verb = verb.as_str(), "token resolution failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = verb;
	}
}

/// Notes an executor failure by status only; captured headers are never logged.
pub fn record_transport_failure(verb: Verb, status: Option<u16>) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(verb = verb.as_str(), status, "request execution failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verb, status);
	}
}
