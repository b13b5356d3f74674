//! Optional observability helpers for discovery fetches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oidc_discovery.fetch` with the `stage`
//!   and `url` fields, plus a `warn` event for every failed stage.
//! - Enable `metrics` to increment the `oidc_discovery_fetch_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Network stages of a discovery call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchStage {
	/// Discovery document request.
	Discovery,
	/// Key set request issued for `jwks_uri`.
	KeySet,
}
impl FetchStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchStage::Discovery => "discovery",
			FetchStage::KeySet => "key_set",
		}
	}
}
impl Display for FetchStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Entry to a fetch stage.
	Attempt,
	/// Payload decoded and validated.
	Success,
	/// Error envelope produced.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
