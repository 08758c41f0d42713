use thiserror::Error;

/// Failures surfaced by the layout engine and its workers.
#[derive(Debug, Error)]
pub enum LayoutError {
	/// The request or configuration was rejected before any tick ran.
	#[error("invalid layout input: {0}")]
	InvalidInput(String),

	/// A tick produced a non-finite position or velocity and the divergence
	/// policy is `abort`.
	#[error("simulation diverged at tick {tick}: node `{node}` has a non-finite position or velocity")]
	SimulationDiverged {
		/// Id of the first offending node.
		node: String,
		/// Tick the non-finite value appeared on.
		tick: usize,
	},

	/// The background worker thread has stopped or was dropped.
	#[error("layout worker is no longer running")]
	WorkerUnavailable,

	/// Reading a request or writing a response failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl LayoutError {
	pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
		Self::InvalidInput(message.into())
	}

	/// Stable machine-readable name of the error condition.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::InvalidInput(_) => "invalid_input",
			Self::SimulationDiverged { .. } => "simulation_diverged",
			Self::WorkerUnavailable => "worker_unavailable",
			Self::Io(_) => "io",
		}
	}
}

impl From<serde_json::Error> for LayoutError {
	fn from(err: serde_json::Error) -> Self {
		Self::InvalidInput(err.to_string())
	}
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;
