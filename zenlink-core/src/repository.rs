use async_trait::async_trait;
use crate::models::ReservationCandidate;

/// Errors crossing the datastore seam.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Datastore contract the reservation reclaimer runs against. The
/// production implementation is backed by Postgres; tests use an
/// in-memory fake honoring the same conditional-update semantics.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Candidate scan: distinct pending bookings linked to at least one
    /// item-type addon with finite stock, whose age in whole minutes is
    /// at least `ttl_minutes` (inclusive bound).
    async fn expired_pending_candidates(
        &self,
        ttl_minutes: i64,
    ) -> Result<Vec<ReservationCandidate>, StoreError>;

    /// Status-guarded release: move the booking to `expired` and record
    /// `reason`, only if its status is still `pending` at update time.
    /// Returns `false` when zero rows matched (the booking was
    /// confirmed, cancelled, or already expired by someone else).
    async fn expire_if_pending(&self, booking_id: i64, reason: &str) -> Result<bool, StoreError>;
}
