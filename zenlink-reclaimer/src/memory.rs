use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use zenlink_core::{
    Addon, Booking, BookingAddon, BookingStatus, ReservationCandidate, ReservationStore, StoreError,
};

/// In-memory `ReservationStore` honoring the same scan and
/// conditional-update semantics as the Postgres implementation. Used by
/// the reclaimer's tests; failure hooks let tests inject a scan fault, a
/// per-booking update fault, or a concurrent payment confirmation that
/// lands between scan and update.
#[derive(Default)]
pub struct InMemoryReservationStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    bookings: HashMap<i64, Booking>,
    addons: HashMap<i64, Addon>,
    booking_addons: Vec<BookingAddon>,
    fail_scan: bool,
    fail_expire: HashSet<i64>,
    confirm_before_expire: HashSet<i64>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_booking(&self, booking: Booking) {
        let mut inner = self.inner.lock().unwrap();
        inner.bookings.insert(booking.id, booking);
    }

    pub fn insert_addon(&self, addon: Addon) {
        let mut inner = self.inner.lock().unwrap();
        inner.addons.insert(addon.id, addon);
    }

    pub fn link(&self, booking_id: i64, addon_id: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.booking_addons.push(BookingAddon { booking_id, addon_id });
    }

    pub fn booking(&self, id: i64) -> Option<Booking> {
        self.inner.lock().unwrap().bookings.get(&id).cloned()
    }

    pub fn set_status(&self, id: i64, status: BookingStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(booking) = inner.bookings.get_mut(&id) {
            booking.status = status;
        }
    }

    /// Make every candidate scan fail, as if the datastore were down.
    pub fn fail_scans(&self) {
        self.inner.lock().unwrap().fail_scan = true;
    }

    /// Make `expire_if_pending` return an error for this booking.
    pub fn fail_expire_for(&self, booking_id: i64) {
        self.inner.lock().unwrap().fail_expire.insert(booking_id);
    }

    /// Simulate the payment flow confirming this booking after the scan
    /// but before the releaser's update reaches it.
    pub fn confirm_before_expire(&self, booking_id: i64) {
        self.inner
            .lock()
            .unwrap()
            .confirm_before_expire
            .insert(booking_id);
    }

    fn holds_stock(inner: &Inner, booking_id: i64) -> bool {
        inner.booking_addons.iter().any(|link| {
            link.booking_id == booking_id
                && inner
                    .addons
                    .get(&link.addon_id)
                    .map(|addon| addon.holds_stock())
                    .unwrap_or(false)
        })
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn expired_pending_candidates(
        &self,
        ttl_minutes: i64,
    ) -> Result<Vec<ReservationCandidate>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_scan {
            return Err("injected scan failure".into());
        }

        let now = Utc::now();
        let mut candidates: Vec<ReservationCandidate> = inner
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Pending)
            .filter(|b| b.age_minutes(now) >= ttl_minutes)
            .filter(|b| Self::holds_stock(&inner, b.id))
            .map(|b| ReservationCandidate {
                booking_id: b.id,
                reference_code: b.reference_code.clone(),
                customer_name: b.customer_name.clone(),
                created_at: b.created_at,
            })
            .collect();

        candidates.sort_by_key(|c| c.created_at);
        Ok(candidates)
    }

    async fn expire_if_pending(&self, booking_id: i64, reason: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.fail_expire.contains(&booking_id) {
            return Err("injected update failure".into());
        }

        if inner.confirm_before_expire.remove(&booking_id) {
            if let Some(booking) = inner.bookings.get_mut(&booking_id) {
                booking.status = BookingStatus::Confirmed;
            }
        }

        match inner.bookings.get_mut(&booking_id) {
            Some(booking) if booking.status == BookingStatus::Pending => {
                booking.status = BookingStatus::Expired;
                booking.cancellation_reason = Some(reason.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
