pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod dialect;

pub use booking_repo::PgReservationStore;
pub use database::DbClient;
pub use dialect::SqlDialect;
