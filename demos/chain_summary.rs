//! Chain walkthrough example.
//!
//! Prints the negotiated cipher suite and one line per certificate of
//! the peer chain: position, subject common name, and key material.
//!
//! Run with: cargo run --example chain_summary

use tlsmeta::Metadata;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = tlsmeta::normalize("github.com")?;
    let metadata = Metadata::from_addr(&addr)?;

    println!("cipher suite: 0x{:04x}", metadata.cipher_suite);
    for (position, cert) in metadata.chain.iter().enumerate() {
        println!(
            "{}: {} ({} key, {} signature)",
            position,
            cert.subject.common_name,
            cert.public_key.algorithm,
            cert.signature.algorithm
        );
        if !cert.dns_names.is_empty() {
            println!("   dns: {}", cert.dns_names.join(", "));
        }
    }
    Ok(())
}
