//! Statement Validator CLI
//!
//! Validates one statement file synchronously and prints the resulting
//! report as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- records.csv > report.json
//! cargo run -- records.dat text/csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use statement_validator::{
    InMemoryReportStore, InMemoryViolationStore, Result, ValidationConfig, ValidationError,
    ValidationService,
};
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(ValidationError::MissingArgument);
    }

    let input_path = &args[1];
    // The content type defaults to the file path, which the parsers match
    // on extension
    let content_type = args.get(2).unwrap_or(input_path);

    let file = File::open(input_path)?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let config = ValidationConfig::default();
    let service = ValidationService::new(
        &config,
        Arc::new(InMemoryReportStore::new()),
        Arc::new(InMemoryViolationStore::new()),
    );

    let (report, fingerprint) =
        service.validate_and_store(&mut reader, content_type, input_path, file_size)?;

    log::info!("Validated {} as {}", input_path, fingerprint);

    let stdout = std::io::stdout();
    let handle = stdout.lock();
    serde_json::to_writer_pretty(handle, &report)
        .map_err(|e| ValidationError::Unexpected(e.to_string()))?;
    println!();

    Ok(())
}
