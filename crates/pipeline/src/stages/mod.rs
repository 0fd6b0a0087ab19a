//! The stages of the per-partition chain, in execution order.

mod aggregate;
mod date;
mod destination;
mod enrich;
mod status;
mod validate;

pub use aggregate::Aggregate;
pub use date::DateNormalize;
pub use destination::DestinationCount;
pub use enrich::FlightEnrich;
pub use status::StatusFilter;
pub use validate::Validate;

/// Input columns the chain reads.
pub mod columns {
    pub const FLIGHT_ID: &str = "flight_id";
    pub const SEAT: &str = "seat";
    pub const USER_ID: &str = "user_id";
    pub const STATUS: &str = "status";
    pub const PAYMENT_METHOD: &str = "payment_method";
    pub const RESERVATION_TIME: &str = "reservation_time";

    /// Columns added by flight enrichment.
    pub const FLIGHT_NUMBER: &str = "flight_number";
    pub const ORIGIN: &str = "origin";
    pub const DESTINATION: &str = "destination";
}
