// self
use crate::{_prelude::*, obs::FetchStage, response::ResponseError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// A span wrapper used by the fetch stages.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the provided stage + URL.
	pub fn new(stage: FetchStage, url: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oidc_discovery.fetch", stage = stage.as_str(), url);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, url);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
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

	/// Logs a failed stage inside the span.
	pub fn record_failure(&self, error: &ResponseError) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| {
				tracing::warn!(
					kind = error.kind.as_str(),
					status = error.http.as_ref().map(|http| http.status),
					"{}",
					error.message
				);
			});
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = error;
		}
	}

	/// Logs a successful stage inside the span.
	pub fn record_success(&self, status: u16) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| tracing::debug!(status, "fetch succeeded"));
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = status;
		}
	}
}
