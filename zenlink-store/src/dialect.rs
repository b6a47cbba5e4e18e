use serde::Deserialize;

/// SQL dialect for the elapsed-time arithmetic in the candidate scan.
/// Postgres and MySQL spell "minutes since creation" differently, so
/// the two statements are kept as named variants instead of inline
/// string surgery. The shipped store is Postgres-backed and uses the
/// Postgres variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    Postgres,
    Mysql,
}

impl SqlDialect {
    /// Candidate scan: distinct pending bookings holding at least one
    /// finite-stock item addon, aged at least the bound parameter
    /// (minutes, inclusive).
    pub fn candidate_query(&self) -> &'static str {
        match self {
            SqlDialect::Postgres => {
                r#"
                SELECT DISTINCT b.id, b.reference_code, b.customer_name, b.created_at
                FROM bookings b
                JOIN booking_addons ba ON ba.booking_id = b.id
                JOIN addons a ON a.id = ba.addon_id
                WHERE b.status = 'pending'
                  AND a.type = 'item'
                  AND a.stock_quantity IS NOT NULL
                  AND EXTRACT(EPOCH FROM (NOW() - b.created_at)) / 60 >= $1
                ORDER BY b.created_at
                "#
            }
            SqlDialect::Mysql => {
                r#"
                SELECT DISTINCT b.id, b.reference_code, b.customer_name, b.created_at
                FROM bookings b
                JOIN booking_addons ba ON ba.booking_id = b.id
                JOIN addons a ON a.id = ba.addon_id
                WHERE b.status = 'pending'
                  AND a.type = 'item'
                  AND a.stock_quantity IS NOT NULL
                  AND TIMESTAMPDIFF(MINUTE, b.created_at, NOW()) >= ?
                ORDER BY b.created_at
                "#
            }
        }
    }

    /// Status-guarded release. The `status = 'pending'` predicate is
    /// re-evaluated at update time, which is the entire race protection
    /// against a concurrent payment confirmation.
    pub fn expire_query(&self) -> &'static str {
        match self {
            SqlDialect::Postgres => {
                r#"
                UPDATE bookings
                SET status = 'expired', cancellation_reason = $2
                WHERE id = $1 AND status = 'pending'
                "#
            }
            SqlDialect::Mysql => {
                r#"
                UPDATE bookings
                SET status = 'expired', cancellation_reason = ?
                WHERE id = ? AND status = 'pending'
                "#
            }
        }
    }
}
