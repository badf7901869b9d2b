//! Management CLI for the FTS orchestration layer.
//!
//! Drives the same typed clients the website uses, which makes it a handy
//! smoke test against staging endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use fts_client::api::{FtsApi, OtpClient};
use fts_client::config::{load_config, ClientConfig};
use fts_client::observability::logging;
use fts_client::NetworkClient;

#[derive(Parser)]
#[command(name = "fts-cli")]
#[command(about = "Booking, tracking and OTP operations against the FTS APIs", long_about = None)]
struct Cli {
    /// Path to a TOML config; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a booking from a JSON payload file
    Book {
        /// Path to a BookingRequest JSON file
        payload: PathBuf,
    },
    /// Track a booking by order id
    Track { order_id: String },
    /// Check whether a pincode is serviceable
    Pincode { pincode: String },
    /// Send a verification code to a phone number
    SendOtp { phone: String },
    /// Verify a received code
    VerifyOtp { phone: String, code: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    logging::init(&config.observability.log_level);

    let net = Arc::new(NetworkClient::new());
    let api = FtsApi::new(net.clone(), &config);
    let otp = OtpClient::new(net, &config);

    match cli.command {
        Commands::Book { payload } => {
            let raw = std::fs::read_to_string(&payload)?;
            let request = serde_json::from_str(&raw)?;
            let response = api.create_booking(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Track { order_id } => {
            let response = api.track_booking(&order_id).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Pincode { pincode } => {
            let serviceable = api.validate_pin_code(&pincode).await;
            println!("{}", if serviceable { "serviceable" } else { "not serviceable" });
        }
        Commands::SendOtp { phone } => {
            otp.send_otp(&phone).await?;
            println!("Verification code sent");
        }
        Commands::VerifyOtp { phone, code } => {
            if otp.verify_otp(&phone, &code).await? {
                println!("Phone verified");
            } else {
                eprintln!("Verification failed");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
