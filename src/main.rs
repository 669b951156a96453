use std::process::exit;

use clap::{CommandFactory, Parser};

use tlsmeta::Metadata;

/// Extracts TLS session and certificate chain metadata from a live host.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Target host, host:port, or URL
    targets: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let [target] = &cli.targets[..] else {
        let _ = Cli::command().print_help();
        println!();
        println!("version: {}", tlsmeta::VERSION);
        exit(0);
    };

    match run(target) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            println!("ERROR: {err}");
            exit(1);
        }
    }
}

fn run(target: &str) -> Result<String, Box<dyn std::error::Error>> {
    let addr = tlsmeta::normalize(target)?;
    let metadata = Metadata::from_addr(&addr)?;
    Ok(serde_json::to_string_pretty(&metadata)?)
}
