#![allow(dead_code)]

use tally_core::{Table, Value};
use tally_pipeline::ReferenceData;

pub const COLUMNS: [&str; 8] = [
    "flight_id",
    "seat",
    "user_id",
    "customer_name",
    "status",
    "payment_method",
    "reservation_time",
    "price",
];

pub fn row(
    flight_id: &str,
    seat: &str,
    user_id: &str,
    status: &str,
    method: &str,
    time: &str,
    price: &str,
) -> Vec<Value> {
    vec![
        flight_id.into(),
        seat.into(),
        user_id.into(),
        "Ana".into(),
        status.into(),
        method.into(),
        time.into(),
        price.into(),
    ]
}

pub fn cells(texts: &[&str]) -> Vec<Value> {
    texts.iter().map(|text| Value::from(*text)).collect()
}

pub fn table(rows: Vec<Vec<Value>>) -> Table {
    Table::from_rows(&COLUMNS, rows).unwrap()
}

/// Flights 1-3, two users, first and economy seats on flight 1.
pub fn reference() -> ReferenceData {
    let flights = Table::from_rows(
        &["flight_id", "from", "to", "airline", "remaining_seats", "date"],
        vec![
            cells(&["1", "GRU", "GIG", "Azul", "10", "2024-01-01"]),
            cells(&["2", "GIG", "BSB", "Gol", "4", "2024-01-01"]),
            cells(&["3", "BSB", "GRU", "Gol", "0", "2024-01-02"]),
        ],
    )
    .unwrap();
    let users = Table::from_rows(
        &["user_id", "country"],
        vec![vec!["u1".into(), "Brasil".into()], vec!["u2".into(), "Chile".into()]],
    )
    .unwrap();
    let seats = Table::from_rows(
        &["flight_id", "seat", "seat_class", "price", "taken"],
        vec![
            vec!["1".into(), "1A".into(), "Primeira".into(), "900".into(), "1".into()],
            vec!["1".into(), "2B".into(), "Econômica".into(), "300".into(), "0".into()],
            vec!["2".into(), "1A".into(), "Primeira".into(), "600".into(), "0".into()],
        ],
    )
    .unwrap();
    ReferenceData::from_tables(&flights, &users, &seats).unwrap()
}
