//! End-to-end batch runs against an in-memory sink.

mod common;

use common::{reference, row, table};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tally_core::{Number, Table, Value};
use tally_pipeline::{
    AggregateKind, BatchReport, BatchRunner, FailurePolicy, NoopObserver, Orchestrator,
    PartitionFailure, PipelineConfig, PipelineError, PipelineObserver, ReferenceData,
    ReservationEvent, StageChain, StageKind, TotalsPolicy, MEAN_PRICE_BY_DESTINATION,
};
use tally_sink::{MemorySink, Sink};

fn orchestrator(config: PipelineConfig, sink: &Arc<MemorySink>) -> Orchestrator {
    Orchestrator::new(config, reference(), sink.clone())
        .unwrap()
        .with_observer(Arc::new(NoopObserver))
}

fn three_rows() -> Table {
    table(vec![
        row("AAA-1", "1A", "u1", "confirmed", "pix", "2024-01-01", "100"),
        row("AAA-1", "2B", "u2", "confirmed", "card", "2024-01-01", "50"),
        row("AAA-2", "1A", "u1", "cancelled", "pix", "2024-01-02", "999"),
    ])
}

fn cells(table: &Table, column: &str) -> Vec<String> {
    table.column(column).unwrap().iter().map(|v| v.to_string()).collect()
}

#[test]
fn two_partitions_produce_the_single_day_row() {
    let sink = Arc::new(MemorySink::new());
    let config = PipelineConfig::default().with_workers(2).with_partitions(2);
    let orchestrator = orchestrator(config, &sink);

    let report = orchestrator.run_batch(three_rows(), true).unwrap();
    assert_eq!(report.partitions, 2);
    assert_eq!(report.input_rows, 3);
    assert_eq!(report.processed_rows, 2);

    let by_day = report.aggregate(AggregateKind::RevenueByDay).unwrap();
    assert_eq!(cells(by_day, "reservation_time"), vec!["2024-01-01"]);
    assert_eq!(cells(by_day, "price"), vec!["150"]);
    assert_eq!(report.revenue, Number::Int(150));

    let stored = sink.snapshot("revenue_by_day").unwrap();
    assert_eq!(stored.row_count(), 1);
    assert_eq!(stored.get_value("price", 0).unwrap(), &Value::Float64(150.0));
}

#[test]
fn cent_prices_sum_the_same_across_partitions() {
    let batch = table(vec![
        row("AAA-1", "1A", "u1", "confirmed", "pix", "2024-01-01", "0.1"),
        row("AAA-1", "2B", "u2", "confirmed", "pix", "2024-01-01", "0.2"),
        row("AAA-2", "1A", "u1", "confirmed", "card", "2024-01-01", "0.3"),
    ]);
    let config = PipelineConfig::default().with_workers(2).with_partitions(2);
    let single = StageChain::new(&config, Arc::new(reference()))
        .run(batch.clone())
        .unwrap();

    let sink = Arc::new(MemorySink::new());
    let report = orchestrator(config, &sink).run_batch(batch, true).unwrap();
    for kind in AggregateKind::ALL {
        assert_eq!(report.aggregate(kind), single.aggregates.get(&kind), "{kind}");
    }

    let by_day = report.aggregate(AggregateKind::RevenueByDay).unwrap();
    assert_eq!(cells(by_day, "price"), vec!["0.6"]);
    assert_eq!(report.revenue, Number::parse("0.6").unwrap());
    let stored = sink.snapshot("revenue_by_day").unwrap();
    assert_eq!(stored.get_value("price", 0).unwrap(), &Value::Float64(0.6));
}

#[test]
fn every_aggregate_is_persisted() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = orchestrator(PipelineConfig::default().with_partitions(3), &sink);
    let report = orchestrator.run_batch(three_rows(), true).unwrap();
    assert!(report.is_complete());

    let country = sink.snapshot("revenue_by_country").unwrap();
    assert_eq!(cells(&country, "user_country"), vec!["Brasil", "Chile"]);

    let seat = sink.snapshot("revenue_by_seat_class").unwrap();
    assert_eq!(cells(&seat, "seat_type"), vec!["Econômica", "Primeira"]);

    let flights = sink.snapshot("flight_popularity").unwrap();
    assert_eq!(cells(&flights, "flight_number"), vec!["1"]);
    assert_eq!(flights.get_value("reservation_count", 0).unwrap(), &Value::Int64(2));

    let destinations = sink.snapshot("destination_popularity").unwrap();
    assert_eq!(cells(&destinations, "destination"), vec!["GIG"]);

    let methods = sink.snapshot("revenue_by_payment_method").unwrap();
    assert_eq!(cells(&methods, "payment_method"), vec!["card", "pix"]);
}

#[test]
fn merged_rows_keep_input_order() {
    let sink = Arc::new(MemorySink::new());
    let config = PipelineConfig::default().with_workers(4).with_partitions(4);
    let orchestrator = orchestrator(config, &sink);
    let rows = (0..20)
        .map(|i| {
            let seat = format!("{}A", i);
            row("AAA-1", &seat, "u1", "confirmed", "pix", "2024-01-01T08:00:00", "1")
        })
        .collect();
    let report = orchestrator.run_batch(table(rows), true).unwrap();

    let seats = cells(&report.rows, "seat");
    let expected: Vec<String> = (0..20).map(|i| format!("{}A", i)).collect();
    assert_eq!(seats, expected);
    assert_eq!(cells(&report.rows, "reservation_time")[0], "2024-01-01");
    assert_eq!(cells(&report.rows, "destination")[0], "GIG");
}

#[test]
fn repeated_runs_accumulate_in_the_sink() {
    let sink = Arc::new(MemorySink::new());
    let config = PipelineConfig::default().with_partitions(2);
    let runner = BatchRunner::new(orchestrator(config, &sink));

    assert!(runner.is_first_run());
    let first = runner.run(three_rows()).unwrap();
    assert!(first.first_run);
    assert!(!runner.is_first_run());

    let second = runner.run(three_rows()).unwrap();
    assert!(!second.first_run);
    assert!(second.mean_prices.is_none());

    let stored = sink.snapshot("revenue_by_day").unwrap();
    assert_eq!(stored.get_value("price", 0).unwrap(), &Value::Float64(300.0));
    let flights = sink.snapshot("flight_popularity").unwrap();
    assert_eq!(flights.get_value("reservation_count", 0).unwrap(), &Value::Int64(4));
}

#[test]
fn first_run_writes_mean_prices() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = orchestrator(PipelineConfig::default(), &sink);
    let report = orchestrator.run_batch(three_rows(), true).unwrap();
    assert!(report.mean_prices.is_some());

    // GIG: (900 + 300) / 2, BSB: 600
    let means = sink.snapshot(MEAN_PRICE_BY_DESTINATION).unwrap();
    assert_eq!(cells(&means, "destination"), vec!["BSB", "GIG"]);
    assert_eq!(means.get_value("mean_avg_price", 1).unwrap(), &Value::Float64(600.0));

    // means are replaced, not added
    orchestrator.run_batch(three_rows(), true).unwrap();
    let means = sink.snapshot(MEAN_PRICE_BY_DESTINATION).unwrap();
    assert_eq!(means.get_value("mean_avg_price", 1).unwrap(), &Value::Float64(600.0));
}

fn eight_rows_with_bad_price() -> Table {
    let mut rows: Vec<_> = (0..8)
        .map(|i| {
            let day = format!("2024-01-0{}", i + 1);
            row("AAA-1", "1A", "u1", "confirmed", "pix", &day, "10")
        })
        .collect();
    rows[2] = row("AAA-1", "1A", "u1", "confirmed", "pix", "2024-01-03", "oops");
    table(rows)
}

#[test]
fn failed_partition_aborts_without_sink_writes() {
    let sink = Arc::new(MemorySink::new());
    let config = PipelineConfig::default().with_workers(4).with_partitions(4);
    let orchestrator = orchestrator(config, &sink);

    let err = orchestrator.run_batch(eight_rows_with_bad_price(), true).unwrap_err();
    match err {
        PipelineError::PartitionsFailed { partitions, failures } => {
            assert_eq!(partitions, 4);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
            assert_eq!(
                failures[0].stage,
                Some(StageKind::Aggregate(AggregateKind::RevenueByDay))
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    for kind in AggregateKind::ALL {
        assert_eq!(sink.row_count(kind.table_name()).unwrap(), 0);
    }
    assert_eq!(orchestrator.total_revenue(), Number::ZERO);
}

#[test]
fn commit_survivors_persists_healthy_partitions() {
    let sink = Arc::new(MemorySink::new());
    let config = PipelineConfig::default()
        .with_workers(4)
        .with_partitions(4)
        .with_failure_policy(FailurePolicy::CommitSurvivors);
    let orchestrator = orchestrator(config, &sink);

    let report = orchestrator.run_batch(eight_rows_with_bad_price(), true).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_complete());
    assert_eq!(report.processed_rows, 6);
    assert_eq!(sink.row_count("revenue_by_day").unwrap(), 6);
    assert_eq!(report.revenue, Number::Int(60));
}

#[test]
fn failed_first_run_is_retried() {
    let sink = Arc::new(MemorySink::new());
    let runner = BatchRunner::new(orchestrator(PipelineConfig::default(), &sink));

    let missing = Table::from_rows(&["flight_id"], vec![vec!["AAA-1".into()]]).unwrap();
    assert!(runner.run(missing).is_err());
    assert!(runner.is_first_run());

    assert!(runner.run(three_rows()).unwrap().first_run);
}

#[test]
fn concurrent_batches_wait_for_first_run_setup() {
    let sink = Arc::new(MemorySink::new());
    let config = PipelineConfig::default().with_workers(2).with_partitions(2);
    let runner = Arc::new(BatchRunner::new(orchestrator(config, &sink)));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let runner = Arc::clone(&runner);
            thread::spawn(move || runner.run(three_rows()))
        })
        .collect();
    let reports: Vec<BatchReport> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(reports.iter().filter(|r| r.first_run).count(), 1);
    let stored = sink.snapshot("revenue_by_day").unwrap();
    assert_eq!(stored.get_value("price", 0).unwrap(), &Value::Float64(900.0));
}

#[test]
fn resumed_runner_skips_setup() {
    let sink = Arc::new(MemorySink::new());
    orchestrator(PipelineConfig::default(), &sink)
        .run_batch(three_rows(), true)
        .unwrap();
    let tables = sink.table_names();

    let runner = BatchRunner::resume(orchestrator(PipelineConfig::default(), &sink));
    assert!(!runner.is_first_run());
    let report = runner.run(three_rows()).unwrap();
    assert!(!report.first_run);
    assert!(report.mean_prices.is_none());
    assert_eq!(sink.table_names(), tables);

    // nothing was created for a fresh sink either
    let empty = Arc::new(MemorySink::new());
    let runner = BatchRunner::resume(orchestrator(PipelineConfig::default(), &empty));
    assert!(matches!(
        runner.run(three_rows()),
        Err(PipelineError::Sink(tally_sink::SinkError::UnknownTable { .. }))
    ));
    assert!(empty.table_names().is_empty());
}

#[test]
fn event_source_feeds_the_runner() {
    let sink = Arc::new(MemorySink::new());
    let runner = BatchRunner::new(orchestrator(PipelineConfig::default(), &sink));
    let event = |seat: &str, price: f64| ReservationEvent {
        flight_id: "AAA-1".into(),
        seat: seat.into(),
        user_id: "u1".into(),
        customer_name: "Ana".into(),
        status: "confirmed".into(),
        payment_method: "pix".into(),
        reservation_time: "2024-04-01T09:30:00".into(),
        price,
        timestamp: 0,
    };
    let events = vec![event("1A", 1234.56), event("2B", 0.44)];

    let report = runner.run_source(&events).unwrap();
    assert!(report.first_run);
    assert_eq!(report.input_rows, 2);
    let by_day = report.aggregate(AggregateKind::RevenueByDay).unwrap();
    assert_eq!(cells(by_day, "price"), vec!["1235"]);
    let stored = sink.snapshot("revenue_by_seat_class").unwrap();
    assert_eq!(cells(&stored, "seat_type"), vec!["Econômica", "Primeira"]);
}

#[test]
fn totals_policy_controls_running_revenue() {
    let sink = Arc::new(MemorySink::new());
    let per_batch = orchestrator(PipelineConfig::default(), &sink);
    per_batch.run_batch(three_rows(), true).unwrap();
    per_batch.run_batch(three_rows(), false).unwrap();
    assert_eq!(per_batch.total_revenue(), Number::Int(150));

    let cumulative = orchestrator(
        PipelineConfig::default().with_totals_policy(TotalsPolicy::Cumulative),
        &sink,
    );
    cumulative.run_batch(three_rows(), false).unwrap();
    cumulative.run_batch(three_rows(), false).unwrap();
    assert_eq!(cumulative.total_revenue(), Number::Int(300));
}

#[test]
fn table_suffix_is_applied() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = orchestrator(PipelineConfig::default().with_table_suffix("_run1"), &sink);
    orchestrator.run_batch(three_rows(), true).unwrap();
    assert!(sink.table_names().iter().all(|name| name.ends_with("_run1")));
}

#[test]
fn events_run_as_one_row_batches() {
    let sink = Arc::new(MemorySink::new());
    let runner = BatchRunner::new(orchestrator(PipelineConfig::default(), &sink));
    for price in ["120", "80"] {
        let json = format!(
            r#"{{"flight_id":"AAA-2","seat":"1A","user_id":"u2","customer_name":"Bo",
                "status":"confirmed","payment_method":"pix",
                "reservation_time":"2024-03-05T22:10:00","price":{},"timestamp":0}}"#,
            price
        );
        runner.handle_json(&json).unwrap();
    }
    let stored = sink.snapshot("revenue_by_destination").unwrap();
    assert_eq!(cells(&stored, "destination"), vec!["BSB"]);
    assert_eq!(stored.get_value("price", 0).unwrap(), &Value::Float64(200.0));

    assert!(matches!(runner.handle_json("not json"), Err(PipelineError::Event(_))));
}

#[derive(Default)]
struct Counting {
    started: AtomicUsize,
    finished: AtomicUsize,
    failed: AtomicUsize,
    sink_reports: AtomicUsize,
    batches: AtomicUsize,
}

impl PipelineObserver for Counting {
    fn batch_started(&self, _rows: usize, _partitions: usize) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn partition_finished(&self, _index: usize, _rows: usize, _elapsed: std::time::Duration) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    fn partition_failed(&self, _failure: &PartitionFailure) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn batch_finished(&self, _report: &BatchReport) {
        self.batches.fetch_add(1, Ordering::SeqCst);
    }

    fn sink_report(&self, _report: &tally_sink::UpsertReport) {
        self.sink_reports.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn observer_sees_every_event() {
    let sink = Arc::new(MemorySink::new());
    let observer = Arc::new(Counting::default());
    let config = PipelineConfig::default()
        .with_workers(2)
        .with_partitions(4)
        .with_failure_policy(FailurePolicy::CommitSurvivors);
    let orchestrator = Orchestrator::new(config, ReferenceData::new(), sink.clone())
        .unwrap()
        .with_observer(observer.clone());

    orchestrator.run_batch(eight_rows_with_bad_price(), true).unwrap();
    assert_eq!(observer.started.load(Ordering::SeqCst), 1);
    assert_eq!(observer.finished.load(Ordering::SeqCst), 3);
    assert_eq!(observer.failed.load(Ordering::SeqCst), 1);
    assert_eq!(observer.batches.load(Ordering::SeqCst), 1);
    // seven aggregates plus two mean-price tables
    assert_eq!(observer.sink_reports.load(Ordering::SeqCst), 9);
}
