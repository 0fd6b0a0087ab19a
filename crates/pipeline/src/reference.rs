//! Read-only reference lookups.
//!
//! Built once from the users, flights and flight-seats tables before a batch
//! is partitioned, then shared by every partition task through an `Arc`.

use crate::error::Result;
use hashbrown::HashMap;
use tally_core::{Accumulator, Column, Error, Number, NumericPolicy, Table, Value};

/// Column of the mean-price tables.
pub const MEAN_AVG_PRICE: &str = "mean_avg_price";

/// Extracts the numeric flight key from a flight id.
///
/// The key is the number after the last `-` (`"AAA-123"` → `123`); an id
/// without a `-` is parsed whole.
pub fn flight_number(flight_id: &str) -> Option<i64> {
    let suffix = match flight_id.rfind('-') {
        Some(pos) => &flight_id[pos + 1..],
        None => flight_id,
    };
    suffix.trim().parse().ok()
}

/// Route and carrier of one flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightInfo {
    pub origin: String,
    pub destination: String,
    pub airline: String,
}

/// Mean seat price per destination and per airline.
#[derive(Clone, Debug, PartialEq)]
pub struct MeanPrices {
    /// Columns `destination`, `mean_avg_price`.
    pub by_destination: Table,
    /// Columns `airline`, `mean_avg_price`.
    pub by_airline: Table,
}

#[derive(Clone, Debug, Default)]
pub struct ReferenceData {
    flights: HashMap<i64, FlightInfo>,
    countries: HashMap<String, String>,
    seat_classes: HashMap<String, String>,
    seat_prices: Vec<(i64, Value)>,
}

fn text(value: &Value) -> String {
    value.to_string().trim().to_string()
}

fn seat_key(flight: &str, seat: &str) -> String {
    format!("{}_{}", flight, seat)
}

impl ReferenceData {
    /// Creates empty lookups. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds all lookups from the three reference tables.
    pub fn from_tables(flights: &Table, users: &Table, seats: &Table) -> Result<Self> {
        Self::new()
            .with_flights(flights)?
            .with_users(users)?
            .with_seats(seats)
    }

    /// Loads `flight_id, from, to, airline`. Rows with an unparsable id are skipped.
    pub fn with_flights(mut self, flights: &Table) -> Result<Self> {
        flights.require_columns(&["flight_id", "from", "to", "airline"])?;
        let ids = flights.column("flight_id")?;
        let from = flights.column("from")?;
        let to = flights.column("to")?;
        let airline = flights.column("airline")?;
        for row in 0..flights.row_count() {
            let Some(number) = flight_number(&text(&ids.values()[row])) else {
                log::warn!("skipping reference flight with id {:?}", ids.values()[row].to_string());
                continue;
            };
            self.flights.insert(
                number,
                FlightInfo {
                    origin: text(&from.values()[row]),
                    destination: text(&to.values()[row]),
                    airline: text(&airline.values()[row]),
                },
            );
        }
        Ok(self)
    }

    /// Loads `user_id, country`.
    pub fn with_users(mut self, users: &Table) -> Result<Self> {
        users.require_columns(&["user_id", "country"])?;
        let ids = users.column("user_id")?;
        let countries = users.column("country")?;
        for (id, country) in ids.iter().zip(countries.iter()) {
            self.countries.insert(text(id), text(country));
        }
        Ok(self)
    }

    /// Loads `flight_id, seat, seat_class` and, when present, `price`.
    pub fn with_seats(mut self, seats: &Table) -> Result<Self> {
        seats.require_columns(&["flight_id", "seat", "seat_class"])?;
        let ids = seats.column("flight_id")?;
        let seat = seats.column("seat")?;
        let class = seats.column("seat_class")?;
        let price = seats.column("price").ok();
        for row in 0..seats.row_count() {
            let id = text(&ids.values()[row]);
            let key = match flight_number(&id) {
                Some(n) => n.to_string(),
                None => id,
            };
            self.seat_classes
                .insert(seat_key(&key, &text(&seat.values()[row])), text(&class.values()[row]));
            if let (Ok(n), Some(price)) = (key.parse::<i64>(), price) {
                self.seat_prices.push((n, price.values()[row].clone()));
            }
        }
        Ok(self)
    }

    pub fn flight(&self, number: i64) -> Option<&FlightInfo> {
        self.flights.get(&number)
    }

    pub fn country(&self, user_id: &str) -> Option<&str> {
        self.countries.get(user_id.trim()).map(String::as_str)
    }

    /// Seat class keyed by normalized flight number and seat label.
    pub fn seat_class(&self, flight_number: &str, seat: &str) -> Option<&str> {
        self.seat_classes
            .get(&seat_key(flight_number.trim(), seat.trim()))
            .map(String::as_str)
    }

    pub fn flight_count(&self) -> usize {
        self.flights.len()
    }

    /// Mean seat price per destination and per airline.
    ///
    /// Seats on flights missing from the flight index are ignored.
    pub fn mean_prices(&self, policy: NumericPolicy) -> Result<MeanPrices> {
        let mut dest_sum = Accumulator::new();
        let mut dest_seats = Accumulator::new();
        let mut airline_sum = Accumulator::new();
        let mut airline_seats = Accumulator::new();

        for (row, (number, price)) in self.seat_prices.iter().enumerate() {
            let Some(info) = self.flights.get(number) else {
                continue;
            };
            let amount = match (price.to_number(), policy) {
                (Some(n), _) => n,
                (None, NumericPolicy::ZeroOnMalformed) => Number::ZERO,
                (None, NumericPolicy::Strict) => {
                    return Err(Error::parse("price", row, price.to_string()).into());
                }
            };
            dest_sum.add(info.destination.as_str().into(), amount);
            dest_seats.add(info.destination.as_str().into(), Number::Int(1));
            airline_sum.add(info.airline.as_str().into(), amount);
            airline_seats.add(info.airline.as_str().into(), Number::Int(1));
        }

        Ok(MeanPrices {
            by_destination: means(dest_sum, &dest_seats, "destination")?,
            by_airline: means(airline_sum, &airline_seats, "airline")?,
        })
    }
}

fn means(sums: Accumulator, counts: &Accumulator, key: &str) -> Result<Table> {
    let totals = sums.into_table(key, MEAN_AVG_PRICE);
    let keys = totals.column(key)?;
    let mut mean = Column::with_capacity(keys.len());
    for (k, total) in keys.iter().zip(totals.column(MEAN_AVG_PRICE)?.iter()) {
        let seats = counts.get(k).map_or(1.0, |n| n.as_f64());
        let total = total.to_number().unwrap_or(Number::ZERO).as_f64();
        mean.push(total / seats);
    }
    let mut out = Table::new();
    out.add_column(key, keys.clone())?;
    out.add_column(MEAN_AVG_PRICE, mean)?;
    Ok(out)
}
