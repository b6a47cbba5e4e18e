use serde::{Deserialize, Serialize};

/// Machine-readable summary of one reclaim run, returned to synchronous
/// callers (the job endpoint, the worker loop).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReclaimOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_count: Option<u64>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ReleaseFailure>,
}

/// One candidate the releaser could not process. The booking stays
/// pending and is picked up again on the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseFailure {
    pub booking_id: i64,
    pub reference_code: String,
    pub error: String,
}

impl ReclaimOutcome {
    /// Successful run with no candidates found.
    pub fn no_candidates() -> Self {
        Self {
            success: true,
            released_count: Some(0),
            message: "No expired reservations found".to_string(),
            failures: Vec::new(),
        }
    }

    /// Successful run over a non-empty candidate set.
    pub fn released(count: u64, failures: Vec<ReleaseFailure>) -> Self {
        Self {
            success: true,
            released_count: Some(count),
            message: format!("Released {} expired reservation(s)", count),
            failures,
        }
    }

    /// Run-level failure (scan error or other fatal fault). No count is
    /// reported since no complete candidate set was acted upon.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            released_count: None,
            message: message.into(),
            failures: Vec::new(),
        }
    }
}
