//! End-to-end extraction example.
//!
//! Connects to a host without verifying its certificate chain and
//! prints the same JSON document the CLI would print.
//!
//! Run with: cargo run --example extract

use tlsmeta::Metadata;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = tlsmeta::normalize("example.com")?;
    let metadata = Metadata::from_addr(&addr)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
