// self
use crate::obs::{FetchOutcome, FetchStage};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_fetch_outcome(stage: FetchStage, outcome: FetchOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oidc_discovery_fetch_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_fetch_outcome_noop_without_metrics() {
		record_fetch_outcome(FetchStage::KeySet, FetchOutcome::Failure);
	}
}
