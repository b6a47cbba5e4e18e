pub mod models;
pub mod repository;

pub use models::{
    expiry_reason, Addon, AddonType, Booking, BookingAddon, BookingStatus, ReservationCandidate,
};
pub use repository::{ReservationStore, StoreError};
