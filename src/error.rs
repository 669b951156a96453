//! Error types for TLS metadata extraction.
//!
//! This module defines the failures that can occur while normalizing a
//! target address, establishing a TLS session, or decoding the peer's
//! certificate material.

use std::fmt;
use std::io;

use openssl::error::ErrorStack;

/// Error type for metadata extraction failures.
///
/// Each variant carries the context needed to report the failure on a
/// single line; none of them is retried or recovered from.
#[derive(Debug)]
pub enum ExtractError {
    /// The target string could not be turned into a `host:port` address
    Address {
        /// The target string as given by the caller
        target: String,
        /// Why it was rejected
        reason: String,
    },

    /// DNS resolution, TCP connect, or the TLS handshake failed
    Connection {
        /// The normalized address (host:port) that was dialed
        address: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// Certificate or key material could not be decoded or re-encoded
    Encoding {
        /// Which piece of the chain failed
        reason: String,
        /// The underlying OpenSSL error
        source: ErrorStack,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address { target, reason } => {
                write!(f, "Invalid address '{}': {}", target, reason)
            }
            Self::Connection { address, source } => {
                write!(f, "Connection failed to {}: {}", address, source)
            }
            Self::Encoding { reason, source } => {
                write!(f, "Certificate encoding failed for {}: {}", reason, source)
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Encoding { source, .. } => Some(source),
            Self::Address { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_address_display() {
        let err = ExtractError::Address {
            target: "".to_string(),
            reason: "empty target".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid address '': empty target");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_connection_display_keeps_cause() {
        let err = ExtractError::Connection {
            address: "example.com:443".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        };
        let text = err.to_string();
        assert!(text.starts_with("Connection failed to example.com:443:"));
        assert!(text.contains("connection refused"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_encoding_source_is_openssl() {
        let stack = openssl::x509::X509::from_der(b"not a certificate").unwrap_err();
        let err = ExtractError::Encoding {
            reason: "certificate 0 in chain".to_string(),
            source: stack,
        };
        assert!(err.to_string().starts_with("Certificate encoding failed"));
        assert!(err.source().is_some());
    }
}
