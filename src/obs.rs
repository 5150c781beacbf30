//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps each operation in a span named `beer_client.op` with the `op` and
//!   `stage` fields.
//! - `metrics` increments the `beer_client_op_total` counter for every attempt/success/failure,
//!   labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Token acquisition through the client-credentials grant.
	Authorize,
	/// Outbound request passing through the authorizing pipeline.
	Dispatch,
	/// `GET /api/v1/beer`.
	ListBeers,
	/// `GET /api/v1/beer/{id}`.
	GetBeer,
	/// `POST /api/v1/beer` plus the follow-up read.
	CreateBeer,
	/// `PUT /api/v1/beer/{id}` plus the follow-up read.
	UpdateBeer,
	/// `DELETE /api/v1/beer/{id}`.
	DeleteBeer,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Authorize => "authorize",
			OperationKind::Dispatch => "dispatch",
			OperationKind::ListBeers => "list_beers",
			OperationKind::GetBeer => "get_beer",
			OperationKind::CreateBeer => "create_beer",
			OperationKind::UpdateBeer => "update_beer",
			OperationKind::DeleteBeer => "delete_beer",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt + outcome counters.
pub(crate) async fn observe<T, E, Fut>(kind: OperationKind, stage: &'static str, fut: Fut) -> Result<T, E>
where
	Fut: Future<Output = Result<T, E>>,
{
	let span = OperationSpan::new(kind, stage);

	record_outcome(kind, Outcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_outcome(kind, Outcome::Success),
		Err(_) => record_outcome(kind, Outcome::Failure),
	}

	result
}
