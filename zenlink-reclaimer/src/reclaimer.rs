use crate::log::{RunEvent, RunLog};
use crate::report::{ReclaimOutcome, ReleaseFailure};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zenlink_core::{expiry_reason, ReservationCandidate, ReservationStore, StoreError};

/// Expires pending bookings that have held finite addon inventory past
/// their TTL. Invoked on a schedule by the worker and on demand through
/// the job endpoint; each invocation is one complete run.
pub struct ReservationReclaimer {
    store: Arc<dyn ReservationStore>,
    log: Arc<dyn RunLog>,
    ttl_minutes: i64,
}

impl ReservationReclaimer {
    pub fn new(store: Arc<dyn ReservationStore>, log: Arc<dyn RunLog>, ttl_minutes: i64) -> Self {
        Self { store, log, ttl_minutes }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    /// Execute one reclaim run. Never returns an error: any fatal fault
    /// becomes a `success = false` outcome, so a scheduled invocation
    /// cannot crash past the run boundary.
    pub async fn run(&self) -> ReclaimOutcome {
        let run_id = Uuid::new_v4();
        match self.try_run(run_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("Reservation reclaim run failed: {}", e);
                warn!(%run_id, "{}", message);
                self.log.emit(&RunEvent::RunFailed { run_id, error: e.to_string() });
                ReclaimOutcome::failed(message)
            }
        }
    }

    async fn try_run(&self, run_id: Uuid) -> Result<ReclaimOutcome, StoreError> {
        self.log
            .emit(&RunEvent::ScanStarted { run_id, ttl_minutes: self.ttl_minutes });

        // Scan failure is fatal: never act on a partial candidate set.
        let candidates = self.store.expired_pending_candidates(self.ttl_minutes).await?;

        if candidates.is_empty() {
            debug!(%run_id, "No expired reservations found");
            self.log.emit(&RunEvent::RunCompleted {
                run_id,
                candidates: 0,
                released: 0,
                failed: 0,
            });
            return Ok(ReclaimOutcome::no_candidates());
        }

        info!(%run_id, count = candidates.len(), "Found expired reservation candidates");

        let reason = expiry_reason(self.ttl_minutes);
        let mut released: u64 = 0;
        let mut failures: Vec<ReleaseFailure> = Vec::new();

        for candidate in &candidates {
            match self.release(candidate, &reason).await {
                Ok(true) => released += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        booking_id = candidate.booking_id,
                        "Failed to release reservation: {}", e
                    );
                    self.log.emit(&RunEvent::ReleaseFailed {
                        booking_id: candidate.booking_id,
                        reference_code: candidate.reference_code.clone(),
                        error: e.to_string(),
                    });
                    failures.push(ReleaseFailure {
                        booking_id: candidate.booking_id,
                        reference_code: candidate.reference_code.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.log.emit(&RunEvent::RunCompleted {
            run_id,
            candidates: candidates.len() as u64,
            released,
            failed: failures.len() as u64,
        });
        info!(%run_id, released, failed = failures.len(), "Reclaim run completed");

        Ok(ReclaimOutcome::released(released, failures))
    }

    /// Release one candidate. The status is re-checked by the store at
    /// update time, so a booking confirmed or cancelled since the scan
    /// is left untouched and counted as a skip.
    async fn release(
        &self,
        candidate: &ReservationCandidate,
        reason: &str,
    ) -> Result<bool, StoreError> {
        let updated = self
            .store
            .expire_if_pending(candidate.booking_id, reason)
            .await?;

        if updated {
            info!(
                booking_id = candidate.booking_id,
                reference = %candidate.reference_code,
                customer = %candidate.customer_name,
                "Expired reservation"
            );
            self.log.emit(&RunEvent::CandidateReleased {
                booking_id: candidate.booking_id,
                reference_code: candidate.reference_code.clone(),
                customer_name: candidate.customer_name.clone(),
            });
        } else {
            debug!(
                booking_id = candidate.booking_id,
                "Booking no longer pending, skipping"
            );
            self.log.emit(&RunEvent::ReleaseSkipped {
                booking_id: candidate.booking_id,
                reference_code: candidate.reference_code.clone(),
            });
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryRunLog;
    use crate::memory::InMemoryReservationStore;
    use crate::DEFAULT_TTL_MINUTES;
    use chrono::{Duration, Utc};
    use zenlink_core::{Addon, AddonType, Booking, BookingStatus};

    fn stock_addon(id: i64, quantity: i32) -> Addon {
        Addon { id, addon_type: AddonType::Item, stock_quantity: Some(quantity) }
    }

    fn service_addon(id: i64) -> Addon {
        Addon { id, addon_type: AddonType::Service, stock_quantity: None }
    }

    fn pending_booking(id: i64, age_minutes: i64) -> Booking {
        let mut booking = Booking::new(
            id,
            format!("ZL-{:04}", id),
            format!("Customer {}", id),
            25_000,
        );
        booking.created_at = Utc::now() - Duration::minutes(age_minutes);
        booking
    }

    fn reclaimer(
        store: &Arc<InMemoryReservationStore>,
        log: &Arc<MemoryRunLog>,
    ) -> ReservationReclaimer {
        ReservationReclaimer::new(store.clone(), log.clone(), DEFAULT_TTL_MINUTES)
    }

    #[tokio::test]
    async fn test_releases_overdue_stock_holding_booking() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 3));
        store.insert_booking(pending_booking(501, 20));
        store.link(501, 1);

        let outcome = reclaimer(&store, &log).run().await;

        assert!(outcome.success);
        assert_eq!(outcome.released_count, Some(1));
        assert_eq!(outcome.message, "Released 1 expired reservation(s)");
        assert!(outcome.failures.is_empty());

        let booking = store.booking(501).unwrap();
        assert_eq!(booking.status, BookingStatus::Expired);
        assert_eq!(
            booking.cancellation_reason.as_deref(),
            Some("Payment not received within 15 minutes. Reservation expired.")
        );
    }

    #[tokio::test]
    async fn test_service_only_booking_is_never_expired() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(service_addon(1));
        store.insert_booking(pending_booking(502, 120));
        store.link(502, 1);

        let outcome = reclaimer(&store, &log).run().await;

        assert!(outcome.success);
        assert_eq!(outcome.released_count, Some(0));
        assert_eq!(outcome.message, "No expired reservations found");
        assert_eq!(store.booking(502).unwrap().status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_young_booking_is_left_alone() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 1));
        store.insert_booking(pending_booking(503, 5));
        store.link(503, 1);

        let outcome = reclaimer(&store, &log).run().await;

        assert_eq!(outcome.released_count, Some(0));
        assert_eq!(store.booking(503).unwrap().status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_ttl_boundary_is_inclusive() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 5));
        // Exactly at the TTL: eligible this run.
        store.insert_booking(pending_booking(504, 15));
        store.link(504, 1);
        // One minute short: not eligible.
        store.insert_booking(pending_booking(505, 14));
        store.link(505, 1);

        let outcome = reclaimer(&store, &log).run().await;

        assert_eq!(outcome.released_count, Some(1));
        assert_eq!(store.booking(504).unwrap().status, BookingStatus::Expired);
        assert_eq!(store.booking(505).unwrap().status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_booking_with_multiple_stock_addons_is_one_candidate() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 3));
        store.insert_addon(stock_addon(2, 7));
        store.insert_booking(pending_booking(506, 30));
        store.link(506, 1);
        store.link(506, 2);

        let outcome = reclaimer(&store, &log).run().await;

        assert_eq!(outcome.released_count, Some(1));
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 3));
        store.insert_booking(pending_booking(507, 40));
        store.link(507, 1);

        let job = reclaimer(&store, &log);
        let first = job.run().await;
        let second = job.run().await;

        assert_eq!(first.released_count, Some(1));
        assert_eq!(second.released_count, Some(0));
        assert_eq!(second.message, "No expired reservations found");
        assert_eq!(store.booking(507).unwrap().status, BookingStatus::Expired);
    }

    #[tokio::test]
    async fn test_concurrent_confirmation_wins_the_race() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 3));
        store.insert_booking(pending_booking(508, 25));
        store.link(508, 1);
        // Payment lands after the scan picks the booking up but before
        // the releaser's update reaches the row.
        store.confirm_before_expire(508);

        let outcome = reclaimer(&store, &log).run().await;

        assert!(outcome.success);
        assert_eq!(outcome.released_count, Some(0));
        assert!(outcome.failures.is_empty());

        let booking = store.booking(508).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.cancellation_reason.is_none());

        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e, RunEvent::ReleaseSkipped { booking_id: 508, .. })));
    }

    #[tokio::test]
    async fn test_one_failing_candidate_does_not_abort_the_batch() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 3));
        for id in [509, 510, 511] {
            store.insert_booking(pending_booking(id, 30));
            store.link(id, 1);
        }
        store.fail_expire_for(510);

        let outcome = reclaimer(&store, &log).run().await;

        assert!(outcome.success);
        assert_eq!(outcome.released_count, Some(2));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].booking_id, 510);
        assert_eq!(outcome.failures[0].error, "injected update failure");

        // The failed booking stays pending and ages into the next run.
        assert_eq!(store.booking(510).unwrap().status, BookingStatus::Pending);
        assert_eq!(store.booking(509).unwrap().status, BookingStatus::Expired);
        assert_eq!(store.booking(511).unwrap().status, BookingStatus::Expired);
    }

    #[tokio::test]
    async fn test_scan_failure_is_fatal_and_contained() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 3));
        store.insert_booking(pending_booking(512, 60));
        store.link(512, 1);
        store.fail_scans();

        let outcome = reclaimer(&store, &log).run().await;

        assert!(!outcome.success);
        assert!(outcome.released_count.is_none());
        assert!(outcome.message.contains("injected scan failure"));
        // No update was attempted.
        assert_eq!(store.booking(512).unwrap().status, BookingStatus::Pending);

        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e, RunEvent::RunFailed { .. })));
    }

    #[tokio::test]
    async fn test_run_log_records_scan_and_tally() {
        let store = Arc::new(InMemoryReservationStore::new());
        let log = Arc::new(MemoryRunLog::new());

        store.insert_addon(stock_addon(1, 3));
        store.insert_booking(pending_booking(513, 45));
        store.link(513, 1);

        reclaimer(&store, &log).run().await;

        let events = log.events();
        assert!(matches!(events.first(), Some(RunEvent::ScanStarted { ttl_minutes: 15, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, RunEvent::CandidateReleased { booking_id: 513, .. })));
        assert!(matches!(
            events.last(),
            Some(RunEvent::RunCompleted { candidates: 1, released: 1, failed: 0, .. })
        ));
    }
}
