use std::io::{stderr, stdout, BufWriter};
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use antifraud_engine::config::TransactionPolicy;
use antifraud_engine::engine::{AsyncEngine, FraudEngine};
use antifraud_engine::storage::{CardStorage, StolenCardStorage, SuspiciousIpStorage, TransactionStorage};

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: If I was making a much more sophisticated CLI application, I would have used the clap crate
    //      to handle the CLI parsing and execution.
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: antifraud-engine [input].csv [log_level:optional] > [output].csv");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let path = &args[1];
    let log_level = args.get(2)
        .map(|s| parse_log_level(s)).unwrap_or_else(|| LevelFilter::ERROR);

    setup_logging(log_level);

    let stolen_cards = Arc::new(StolenCardStorage::new());
    let suspicious_ips = Arc::new(SuspiciousIpStorage::new());

    let engine = Arc::new(FraudEngine::new(
        TransactionPolicy::default(),
        Arc::new(TransactionStorage::new()),
        Arc::new(CardStorage::new()),
        stolen_cards.clone(),
        suspicious_ips.clone()
    ));
    let pipeline = AsyncEngine::new(engine.clone(), stolen_cards, suspicious_ips);

    let timer = Instant::now();
    pipeline.run(path).await?;
    let duration = timer.elapsed();

    info!("Processed admission batch in: {duration:?}");

    write_results_to_stdout(&engine)?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Because we are doing stdout redirection, we will need to utilize stderr to display logging
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_results_to_stdout(engine: &FraudEngine) -> Result<()> {
    let mut writer = csv::Writer::from_writer(BufWriter::new(stdout().lock()));

    writer.write_record(["tx", "number", "amount", "result", "info", "feedback"])?;

    for transaction in engine.history()? {
        writer.write_record([
            transaction.id.unwrap_or_default().to_string(),
            transaction.card_number.to_string(),
            transaction.amount.to_string(),
            transaction.verdict.to_string(),
            transaction.explanation.clone(),
            transaction.feedback.map(|verdict| verdict.to_string()).unwrap_or_default()
        ])?;
    }

    writer.flush()?;

    Ok(())
}
