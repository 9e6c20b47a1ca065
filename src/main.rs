//! # Servis CLI
//!
//! Front-desk terminal for the repair shop.
//!
//! ## Usage
//!
//! ```bash
//! # Take in a device and print the intake receipt
//! servis submit --name "Ana K" --device Mob --problem "cracked screen" \
//!               --phone 070123456 --price 25.00
//!
//! # List records, newest first, optionally filtered
//! servis list
//! servis list --search ana
//!
//! # Show what the receipt would look like, without store or printer
//! servis preview --name "Ana K" --device Mob --problem "cracked screen" \
//!                --phone 070123456 --price 25.00
//! ```
//!
//! `--config FILE` points at a JSON config (printer target, layout text);
//! `--dry-run` swaps the printer for a capturing mock.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use servis::config::PrintConfig;
use servis::controller::{PrintJobController, SharedTransport};
use servis::protocol;
use servis::record::{self, DeviceType, ServiceRecord};
use servis::store::JsonFileStore;
use servis::transport::{self, MockTransport};

/// Servis - service desk records and receipt printing
#[derive(Parser, Debug)]
#[command(name = "servis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct RecordArgs {
    /// Customer full name
    #[arg(long)]
    name: String,

    /// Device type: Mob, Tablet, Laptop or PC
    #[arg(long)]
    device: DeviceType,

    /// Reported problem
    #[arg(long)]
    problem: String,

    /// Customer phone number
    #[arg(long)]
    phone: String,

    /// Quoted price, e.g. 25.00
    #[arg(long)]
    price: Decimal,
}

impl RecordArgs {
    fn into_draft(self) -> ServiceRecord {
        ServiceRecord::draft(self.name, self.device, self.problem, self.phone, self.price)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Persist a service record and print its receipt
    Submit {
        #[command(flatten)]
        record: RecordArgs,

        /// Capture the print job instead of sending it to a printer
        #[arg(long)]
        dry_run: bool,
    },
    /// List persisted records, newest first
    List {
        /// Filter by name, device, phone or problem
        #[arg(long)]
        search: Option<String>,
    },
    /// Compose and encode a receipt, printing the bytes as a hex dump
    Preview {
        #[command(flatten)]
        record: RecordArgs,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = PrintConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Submit { record, dry_run } => submit(record, dry_run, &config).await,
        Commands::List { search } => list(search.as_deref(), &config).await,
        Commands::Preview { record } => {
            preview(record, &config);
            Ok(())
        }
    }
}

async fn submit(
    args: RecordArgs,
    dry_run: bool,
    config: &PrintConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // Transport construction is the capability check: an unsupported
    // target fails here, before the store is touched.
    let transport: SharedTransport = if dry_run {
        Arc::new(Mutex::new(Box::new(MockTransport::new())))
    } else {
        Arc::new(Mutex::new(transport::for_target(&config.target)?))
    };

    let store = Arc::new(JsonFileStore::new(&config.store_path));
    let controller = PrintJobController::new(store, transport, config);

    let outcome = controller.submit(args.into_draft()).await;

    match &outcome.persisted {
        Ok(stored) => println!("Saved record #{}.", stored.id),
        Err(e) => {
            eprintln!("Not saved: {}", e);
            std::process::exit(1);
        }
    }
    match &outcome.printed {
        Some(Ok(())) if dry_run => println!("Receipt captured (dry run)."),
        Some(Ok(())) => println!("Receipt printed."),
        Some(Err(e)) => {
            // The record is stored; the operator can re-submit the print.
            eprintln!("Receipt NOT printed: {}", e);
            eprintln!("The record is saved; fix the printer and print again.");
        }
        None => {}
    }
    if outcome.clear_draft() {
        println!("Done.");
    }

    Ok(())
}

async fn list(
    search: Option<&str>,
    config: &PrintConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    use servis::store::RecordStore;

    let store = JsonFileStore::new(&config.store_path);
    let all = store.list_all().await?;
    let hits = record::search(&all, search.unwrap_or(""));

    if hits.is_empty() {
        println!("No records.");
        return Ok(());
    }

    println!(
        "{:<5} {:<12} {:<20} {:<8} {:<24} {:<12} {:>10}",
        "ID", "Date", "Name", "Device", "Problem", "Phone", "Price"
    );
    for r in &hits {
        println!(
            "{:<5} {:<12} {:<20} {:<8} {:<24} {:<12} {:>10}",
            r.id,
            r.record.created_at.format("%b %d, %Y"),
            r.record.full_name,
            r.record.device_type,
            r.record.problem,
            r.record.phone_number,
            r.record.price,
        );
    }
    println!("{} record(s).", hits.len());

    Ok(())
}

fn preview(args: RecordArgs, config: &PrintConfig) {
    let draft = args.into_draft();
    let document = servis::compose::compose(&draft, &config.layout);
    let bytes = config.dialect.encode(&document);

    for line in document.text_lines() {
        println!("| {}", line);
    }
    println!();
    println!("{} bytes:", bytes.len());
    for chunk in bytes.chunks(16) {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("  {}", hex.join(" "));
    }

    // Sanity: the encoder's output parses back to the same directives.
    match protocol::decode(&bytes) {
        Ok(directives) => println!("decodes to {} directives", directives.len()),
        Err(e) => println!("decode check failed: {}", e),
    }
}
