use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// One entry in the durable run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    ScanStarted {
        run_id: Uuid,
        ttl_minutes: i64,
    },
    CandidateReleased {
        booking_id: i64,
        reference_code: String,
        customer_name: String,
    },
    /// The conditional update matched zero rows: another process moved
    /// the booking out of `pending` first. Not an error.
    ReleaseSkipped {
        booking_id: i64,
        reference_code: String,
    },
    ReleaseFailed {
        booking_id: i64,
        reference_code: String,
        error: String,
    },
    RunCompleted {
        run_id: Uuid,
        candidates: u64,
        released: u64,
        failed: u64,
    },
    RunFailed {
        run_id: Uuid,
        error: String,
    },
}

impl RunEvent {
    /// Human-readable line, without the timestamp prefix.
    pub fn render(&self) -> String {
        match self {
            RunEvent::ScanStarted { run_id, ttl_minutes } => format!(
                "Run {} started: scanning for pending reservations older than {} minute(s)",
                run_id, ttl_minutes
            ),
            RunEvent::CandidateReleased { booking_id, reference_code, customer_name } => format!(
                "Released booking #{} ({}) for {}",
                booking_id, reference_code, customer_name
            ),
            RunEvent::ReleaseSkipped { booking_id, reference_code } => format!(
                "Skipped booking #{} ({}): no longer pending",
                booking_id, reference_code
            ),
            RunEvent::ReleaseFailed { booking_id, reference_code, error } => format!(
                "Failed to release booking #{} ({}): {}",
                booking_id, reference_code, error
            ),
            RunEvent::RunCompleted { run_id, candidates, released, failed } => format!(
                "Run {} completed: {} candidate(s), {} released, {} failed",
                run_id, candidates, released, failed
            ),
            RunEvent::RunFailed { run_id, error } => {
                format!("Run {} failed: {}", run_id, error)
            }
        }
    }
}

/// Injected sink for the durable run log. The reclaimer never touches
/// the filesystem directly, so runs are fully observable in tests.
pub trait RunLog: Send + Sync {
    fn emit(&self, event: &RunEvent);
}

/// Append-only file sink, one `[YYYY-MM-DD HH:MM:SS] message` line per
/// event. Write errors are reported to tracing and swallowed; a broken
/// log destination must not fail the run.
pub struct FileRunLog {
    file: Mutex<File>,
}

impl FileRunLog {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl RunLog for FileRunLog {
    fn emit(&self, event: &RunEvent) {
        let line = format!(
            "[{}] {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            event.render()
        );
        match self.file.lock() {
            Ok(mut file) => {
                if let Err(e) = file.write_all(line.as_bytes()) {
                    warn!("Failed to append to reclaim run log: {}", e);
                }
            }
            Err(_) => warn!("Reclaim run log mutex poisoned, dropping entry"),
        }
    }
}

/// Sink that forwards run events to the ambient tracing subscriber.
pub struct TracingRunLog;

impl RunLog for TracingRunLog {
    fn emit(&self, event: &RunEvent) {
        match event {
            RunEvent::ReleaseSkipped { .. } => debug!("{}", event.render()),
            RunEvent::ReleaseFailed { .. } => warn!("{}", event.render()),
            RunEvent::RunFailed { .. } => error!("{}", event.render()),
            _ => info!("{}", event.render()),
        }
    }
}

/// In-memory sink for asserting on emitted events in tests.
#[derive(Default)]
pub struct MemoryRunLog {
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl RunLog for MemoryRunLog {
    fn emit(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
