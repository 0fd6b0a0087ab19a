//! The fixed set of aggregates a batch produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_core::DataType;
use tally_sink::SchemaSpec;

/// Column holding reservation revenue.
pub const PRICE: &str = "price";
/// Column holding reservation counts.
pub const RESERVATION_COUNT: &str = "reservation_count";

/// One merged aggregate, and the sink table it lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    RevenueByDay,
    RevenueByPaymentMethod,
    RevenueByDestination,
    RevenueByCountry,
    RevenueBySeatClass,
    FlightPopularity,
    DestinationPopularity,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 7] = [
        AggregateKind::RevenueByDay,
        AggregateKind::RevenueByPaymentMethod,
        AggregateKind::RevenueByDestination,
        AggregateKind::RevenueByCountry,
        AggregateKind::RevenueBySeatClass,
        AggregateKind::FlightPopularity,
        AggregateKind::DestinationPopularity,
    ];

    /// Revenue aggregates, in stage order.
    pub const REVENUE: [AggregateKind; 5] = [
        AggregateKind::RevenueByDay,
        AggregateKind::RevenueByPaymentMethod,
        AggregateKind::RevenueByDestination,
        AggregateKind::RevenueByCountry,
        AggregateKind::RevenueBySeatClass,
    ];

    /// Base sink table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            AggregateKind::RevenueByDay => "revenue_by_day",
            AggregateKind::RevenueByPaymentMethod => "revenue_by_payment_method",
            AggregateKind::RevenueByDestination => "revenue_by_destination",
            AggregateKind::RevenueByCountry => "revenue_by_country",
            AggregateKind::RevenueBySeatClass => "revenue_by_seat_class",
            AggregateKind::FlightPopularity => "flight_popularity",
            AggregateKind::DestinationPopularity => "destination_popularity",
        }
    }

    /// Group key column.
    pub fn key_column(&self) -> &'static str {
        match self {
            AggregateKind::RevenueByDay => "reservation_time",
            AggregateKind::RevenueByPaymentMethod => "payment_method",
            AggregateKind::RevenueByDestination | AggregateKind::DestinationPopularity => {
                "destination"
            }
            AggregateKind::RevenueByCountry => "user_country",
            AggregateKind::RevenueBySeatClass => "seat_type",
            AggregateKind::FlightPopularity => "flight_number",
        }
    }

    /// Summed column.
    pub fn value_column(&self) -> &'static str {
        if self.is_revenue() {
            PRICE
        } else {
            RESERVATION_COUNT
        }
    }

    /// Returns true for price sums, false for reservation counts.
    pub fn is_revenue(&self) -> bool {
        !matches!(
            self,
            AggregateKind::FlightPopularity | AggregateKind::DestinationPopularity
        )
    }

    /// Persisted layout of this aggregate.
    pub fn schema(&self) -> SchemaSpec {
        let value_type = if self.is_revenue() {
            DataType::Float64
        } else {
            DataType::Int64
        };
        SchemaSpec::new()
            .key(self.key_column(), DataType::String)
            .value(self.value_column(), value_type)
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns() {
        assert_eq!(AggregateKind::RevenueByDay.key_column(), "reservation_time");
        assert_eq!(AggregateKind::RevenueByDay.value_column(), "price");
        assert_eq!(AggregateKind::FlightPopularity.value_column(), "reservation_count");
        assert_eq!(AggregateKind::REVENUE.iter().filter(|k| k.is_revenue()).count(), 5);
        assert_eq!(AggregateKind::ALL.iter().filter(|k| !k.is_revenue()).count(), 2);
    }

    #[test]
    fn test_schema() {
        assert_eq!(
            AggregateKind::DestinationPopularity.schema().to_sql(),
            "(destination TEXT, reservation_count INTEGER, PRIMARY KEY (destination))"
        );
    }
}
