//! Extracts TLS session and certificate chain metadata from live hosts.
//!
//! A connection is established without certificate verification, so
//! expired, self-signed, and otherwise untrusted endpoints can still be
//! inspected. The negotiated session is flattened into a [`Metadata`]
//! record: cipher suite identifier, per-certificate signature and
//! public key material, issuer and subject distinguished names,
//! OCSP/CA-issuer URLs, and DNS subject alternative names, all
//! serializable to a stable JSON schema.
//!
//! ```no_run
//! use tlsmeta::Metadata;
//!
//! let addr = tlsmeta::normalize("example.com")?;
//! let metadata = Metadata::from_addr(&addr)?;
//! println!("{}", serde_json::to_string_pretty(&metadata)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod addr;
mod error;
mod metadata;
mod session;

pub use addr::normalize;
pub use error::ExtractError;
pub use metadata::{AlgorithmValue, Certificate, Metadata, Name};
pub use rustls::pki_types::CertificateDer;
pub use session::Session;

/// Crate version, fixed at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
