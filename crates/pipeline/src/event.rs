//! Reservation events as delivered by the transport.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tally_core::{Table, Value};

/// One reservation as it arrives over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub flight_id: String,
    pub seat: String,
    pub user_id: String,
    #[serde(default)]
    pub customer_name: String,
    pub status: String,
    pub payment_method: String,
    pub reservation_time: String,
    pub price: f64,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl ReservationEvent {
    /// Column order of [`into_table`](Self::into_table).
    pub const COLUMNS: [&'static str; 9] = [
        "flight_id",
        "seat",
        "user_id",
        "customer_name",
        "status",
        "payment_method",
        "reservation_time",
        "price",
        "timestamp",
    ];

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Cells in [`COLUMNS`](Self::COLUMNS) order, all as text.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            self.flight_id.as_str().into(),
            self.seat.as_str().into(),
            self.user_id.as_str().into(),
            self.customer_name.as_str().into(),
            self.status.as_str().into(),
            self.payment_method.as_str().into(),
            self.reservation_time.as_str().into(),
            self.price.to_string().into(),
            self.timestamp.to_string().into(),
        ]
    }

    /// One-row table.
    pub fn into_table(self) -> Result<Table> {
        records_to_table(std::slice::from_ref(&self))
    }
}

/// Stacks events into one table, one row per event.
pub fn records_to_table(events: &[ReservationEvent]) -> Result<Table> {
    let rows = events.iter().map(ReservationEvent::to_row).collect();
    Ok(Table::from_rows(&ReservationEvent::COLUMNS, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "flight_id": "AAA-123",
        "seat": "12C",
        "user_id": "u1",
        "customer_name": "Ana",
        "status": "confirmed",
        "payment_method": "pix",
        "reservation_time": "2024-01-01T10:00:00",
        "price": 150.0,
        "timestamp": 1704103200000
    }"#;

    #[test]
    fn test_from_json() {
        let event = ReservationEvent::from_json(JSON).unwrap();
        assert_eq!(event.flight_id, "AAA-123");
        assert_eq!(event.timestamp, 1_704_103_200_000);

        let table = event.into_table().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 9);
        assert_eq!(table.get_value("price", 0).unwrap(), &Value::from("150"));
    }

    #[test]
    fn test_optional_fields_default() {
        let event = ReservationEvent::from_json(
            r#"{"flight_id":"A-1","seat":"1A","user_id":"u","status":"pending",
                "payment_method":"card","reservation_time":"2024-01-01","price":9.5}"#,
        )
        .unwrap();
        assert_eq!(event.customer_name, "");
        assert_eq!(event.timestamp, 0);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ReservationEvent::from_json(r#"{"flight_id": 1}"#),
            Err(crate::PipelineError::Event(_))
        ));
    }

    #[test]
    fn test_records_to_table() {
        let event = ReservationEvent::from_json(JSON).unwrap();
        let table = records_to_table(&[event.clone(), event]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(records_to_table(&[]).unwrap().is_empty());
    }
}
