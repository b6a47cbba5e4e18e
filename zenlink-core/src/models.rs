use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Expired,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Expired => "expired",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown booking status: {0}")]
pub struct UnknownStatus(String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "expired" => Ok(BookingStatus::Expired),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Addon catalog entry type. Only `Item` addons carry finite stock;
/// `Service` addons are unlimited and never hold inventory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AddonType {
    Item,
    Service,
}

impl AddonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonType::Item => "item",
            AddonType::Service => "service",
        }
    }
}

/// A customer booking of a service package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub reference_code: String,
    pub customer_name: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub cancellation_reason: Option<String>,
    pub total_cents: i64,
}

impl Booking {
    pub fn new(id: i64, reference_code: String, customer_name: String, total_cents: i64) -> Self {
        Self {
            id,
            reference_code,
            customer_name,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
            cancellation_reason: None,
            total_cents,
        }
    }

    /// Whole minutes elapsed since the booking was created.
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_minutes()
    }
}

/// Provider catalog addon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    pub id: i64,
    pub addon_type: AddonType,
    pub stock_quantity: Option<i32>,
}

impl Addon {
    /// Whether a pending booking of this addon holds a unit of finite
    /// inventory until paid or expired.
    pub fn holds_stock(&self) -> bool {
        self.addon_type == AddonType::Item && self.stock_quantity.is_some()
    }
}

/// Association between a booking and one of its addons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingAddon {
    pub booking_id: i64,
    pub addon_id: i64,
}

/// A booking eligible for expiry in the current reclaim run. Carries
/// everything the releaser and the run log need, so full booking rows
/// are never re-fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCandidate {
    pub booking_id: i64,
    pub reference_code: String,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
}

/// Cancellation reason recorded on every booking this job expires.
pub fn expiry_reason(ttl_minutes: i64) -> String {
    format!(
        "Payment not received within {} minutes. Reservation expired.",
        ttl_minutes
    )
}
