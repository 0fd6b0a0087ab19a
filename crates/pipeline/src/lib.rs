//! Tally Pipeline - partition-merge aggregation of reservation batches.
//!
//! A batch table is split into contiguous partitions, each partition runs the
//! same [`StageChain`] on a worker thread, and the partial results are merged
//! back: row output is concatenated in partition order, aggregates are folded
//! by key. Merged aggregates are upserted into a [`Sink`](tally_sink::Sink).
//!
//! ```
//! use std::sync::Arc;
//! use tally_core::Table;
//! use tally_pipeline::{AggregateKind, BatchRunner, Orchestrator, PipelineConfig, ReferenceData};
//! use tally_sink::MemorySink;
//!
//! let flights = Table::from_rows(
//!     &["flight_id", "from", "to", "airline"],
//!     vec![vec!["7".into(), "GRU".into(), "GIG".into(), "Azul".into()]],
//! )
//! .unwrap();
//! let reference = ReferenceData::new().with_flights(&flights).unwrap();
//! let sink = Arc::new(MemorySink::new());
//! let config = PipelineConfig::default();
//! let orchestrator = Orchestrator::new(config, reference, sink.clone()).unwrap();
//! let runner = BatchRunner::new(orchestrator);
//!
//! let event = r#"{"flight_id":"AZ-7","seat":"1A","user_id":"u1","status":"confirmed",
//!     "payment_method":"pix","reservation_time":"2024-01-01T09:00:00","price":80.5}"#;
//! let report = runner.handle_json(event).unwrap();
//! let by_destination = report.aggregate(AggregateKind::RevenueByDestination).unwrap();
//! assert_eq!(by_destination.get_value("price", 0).unwrap().to_string(), "80.5");
//! ```

mod chain;
mod config;
mod error;
mod event;
mod kind;
mod loader;
mod observer;
mod orchestrator;
mod reference;
mod runner;
mod source;
mod stage;
pub mod stages;

pub use chain::{ChainOutput, StageChain};
pub use config::{
    FailurePolicy, PipelineConfig, TotalsPolicy, DEFAULT_MISSING_MARKER, DEFAULT_UNKNOWN_SENTINEL,
};
pub use error::{PartitionFailure, PipelineError, Result, StageError, StageResult};
pub use event::{records_to_table, ReservationEvent};
pub use kind::{AggregateKind, PRICE, RESERVATION_COUNT};
pub use loader::{Loader, MEAN_PRICE_BY_AIRLINE, MEAN_PRICE_BY_DESTINATION};
pub use observer::{LogObserver, NoopObserver, PipelineObserver};
pub use orchestrator::{BatchReport, Orchestrator};
pub use reference::{flight_number, FlightInfo, MeanPrices, ReferenceData, MEAN_AVG_PRICE};
pub use runner::BatchRunner;
pub use source::Source;
pub use stage::{Stage, StageKind};
