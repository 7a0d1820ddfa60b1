//! Credential redaction applied to executor failures before they reach caller code.

// self
use crate::{_prelude::*, error::TransportError};

/// Literal written over any captured credential.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Returns `error` with the captured `authorization` header replaced by [`REDACTION_MARKER`].
///
/// Takes the error by value, so only the caller's copy of the captured header map changes.
/// Errors without a captured request, or whose request carried no credential, pass through
/// untouched.
pub fn redact(mut error: TransportError) -> TransportError {
	if let Some(request) = error.captured_request_mut() {
		for (name, value) in request.headers.iter_mut() {
			if name.eq_ignore_ascii_case("authorization") {
				*value = REDACTION_MARKER.to_owned();
			}
		}
	}

	error
}

/// Redacts transport failures and passes every other error through unchanged.
pub fn sanitize(error: Error) -> Error {
	match error {
		Error::Transport(inner) => Error::Transport(redact(inner)),
		other => other,
	}
}
