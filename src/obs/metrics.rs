// self
use crate::obs::{FlowKind, FlowOutcome};

/// Bumps `idp_auth_flow_total{flow, outcome}` on the global recorder; a no-op without `metrics`.
pub(crate) fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!("idp_auth_flow_total", "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
