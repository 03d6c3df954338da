//! Loads subscriber test data straight through the ingest engine and reports how long it took, so
//! the one-by-one and bulk paths can be compared on the same data.
//!
//! # Usage
//!
//! ```bash
//! # One insert per record
//! load_subscribers -i data/fake_users.csv --mode one-by-one
//!
//! # Everything in a single bulk insert
//! load_subscribers -i data/fake_users.csv --mode bulk
//! ```
//!
//! CSV input has a header row and the columns `first_name, last_name, email, gender, city,
//! state`. A `.json` file is read as an array of records shaped like the `POST /subscribers`
//! body. Database settings are read the same way the server reads them. Logs go to stderr, the
//! timing line to stdout.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use subscriber_api::configuration::get_configuration;
use subscriber_api::ingest::IngestTiming;
use subscriber_api::loader::{add_in_bulk, add_one_by_one, read_csv, read_json};
use subscriber_api::startup::get_connection_pool;
use subscriber_api::store::PgStore;
use subscriber_api::telemetry::{get_subscriber, init_subscriber};

/// Load subscriber records into the database and time it.
#[derive(Parser, Debug)]
#[command(name = "load_subscribers")]
#[command(about = "Add subscriber test data one record at a time or in bulk, and time it")]
struct Args {
    /// Test data file
    #[arg(short, long, default_value = "data/fake_users.csv")]
    input: PathBuf,

    /// Input format, guessed from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Which ingest path to exercise
    #[arg(long, value_enum, default_value_t = Mode::Bulk)]
    mode: Mode,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    OneByOne,
    Bulk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl Args {
    fn format(&self) -> Format {
        self.format.unwrap_or_else(|| {
            match self.input.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
                _ => Format::Csv,
            }
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = get_subscriber("load_subscribers".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration")?;
    let store = PgStore::new(get_connection_pool(&configuration.database));

    let file = File::open(&args.input)
        .with_context(|| format!("No test data found at {}", args.input.display()))?;
    let records = match args.format() {
        Format::Csv => read_csv(file),
        Format::Json => read_json(file),
    }
    .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let timing = match args.mode {
        Mode::OneByOne => IngestTiming::measure(add_one_by_one(&store, &records)).await,
        Mode::Bulk => IngestTiming::measure(add_in_bulk(&store, &records)).await,
    }
    .context("Failed to add the test data")?;
    println!("{timing}");

    Ok(())
}
