//! TLS session establishment without certificate verification.

use std::io;
use std::net::{IpAddr, TcpStream};
use std::sync::{Arc, OnceLock};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, InvalidDnsNameError, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme};

use crate::error::ExtractError;

static CRYPTO_PROVIDER: OnceLock<()> = OnceLock::new();

fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.get_or_init(|| {
        // An Err here means a process-wide provider is already installed,
        // which serves us just as well.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Snapshot of one negotiated TLS session: the cipher suite identifier
/// and the peer chain as presented, leaf first.
///
/// A `Session` owns its certificate bytes, so it stays usable after the
/// connection that produced it is gone and extraction from it can be
/// repeated at will.
pub struct Session {
    cipher_suite: u16,
    chain: Vec<CertificateDer<'static>>,
}

impl Session {
    /// Builds a snapshot from an already-negotiated session's state.
    pub fn new(cipher_suite: u16, chain: Vec<CertificateDer<'static>>) -> Self {
        Session {
            cipher_suite,
            chain,
        }
    }

    /// Dials `addr` (a normalized `host:port`), performs a TLS handshake
    /// accepting whatever certificate the peer presents, and returns the
    /// session snapshot. The connection is closed before returning, on
    /// success and on error alike.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Connection`] when name resolution, the TCP
    /// connect, or the handshake fails.
    pub fn connect(addr: &str) -> Result<Session, ExtractError> {
        ensure_crypto_provider();

        let server_name = server_name_from_host(host_of(addr))
            .map_err(|e| conn_err(addr, io::Error::other(e)))?;

        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth();

        let mut conn = ClientConnection::new(Arc::new(config), server_name)
            .map_err(|e| conn_err(addr, io::Error::other(e)))?;

        let mut sock = TcpStream::connect(addr).map_err(|e| conn_err(addr, e))?;

        while conn.is_handshaking() {
            conn.complete_io(&mut sock).map_err(|e| conn_err(addr, e))?;
        }

        let cipher_suite = conn
            .negotiated_cipher_suite()
            .map(|suite| u16::from(suite.suite()))
            .ok_or_else(|| conn_err(addr, io::Error::other("no cipher suite negotiated")))?;

        let chain = conn
            .peer_certificates()
            .map(|certs| certs.to_vec())
            .ok_or_else(|| conn_err(addr, io::Error::other("no peer certificates presented")))?;

        conn.send_close_notify();
        let _ = conn.complete_io(&mut sock);

        Ok(Session {
            cipher_suite,
            chain,
        })
    }

    /// The negotiated cipher suite's IANA identifier.
    pub fn cipher_suite(&self) -> u16 {
        self.cipher_suite
    }

    /// The peer certificate chain in presented order, leaf first.
    pub fn peer_chain(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }
}

fn conn_err(address: &str, source: io::Error) -> ExtractError {
    ExtractError::Connection {
        address: address.to_string(),
        source,
    }
}

/// Host part of a `host:port` address, with IPv6 brackets removed.
fn host_of(addr: &str) -> &str {
    let host = match addr.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => addr,
    };
    host.trim_start_matches('[').trim_end_matches(']')
}

fn server_name_from_host(host: &str) -> Result<ServerName<'static>, InvalidDnsNameError> {
    match host.parse::<IpAddr>() {
        Ok(ip) => Ok(ServerName::from(ip)),
        Err(_) => ServerName::try_from(host.to_string()),
    }
}

/// Accepts every certificate and handshake signature. Extraction has to
/// work against expired, self-signed, wrong-hostname, and untrusted
/// chains, so the verifier cannot reject anything.
#[derive(Debug)]
struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_provider_init_is_idempotent() {
        ensure_crypto_provider();
        ensure_crypto_provider();
    }

    #[test]
    fn test_host_of_strips_port() {
        assert_eq!(host_of("example.com:443"), "example.com");
        assert_eq!(host_of("127.0.0.1:8443"), "127.0.0.1");
    }

    #[test]
    fn test_host_of_unwraps_ipv6_brackets() {
        assert_eq!(host_of("[::1]:443"), "::1");
        assert_eq!(host_of("[2001:db8::1]:8443"), "2001:db8::1");
    }

    #[test]
    fn test_server_name_accepts_hostname_and_ip() {
        assert!(server_name_from_host("example.com").is_ok());
        assert!(server_name_from_host("127.0.0.1").is_ok());
        assert!(server_name_from_host("::1").is_ok());
    }

    #[test]
    fn test_server_name_rejects_garbage() {
        assert!(server_name_from_host("").is_err());
        assert!(server_name_from_host("not a host name").is_err());
    }

    #[test]
    fn test_no_verifier_advertises_schemes() {
        let schemes = NoVerifier.supported_verify_schemes();
        assert!(!schemes.is_empty());
        assert!(schemes.contains(&SignatureScheme::RSA_PKCS1_SHA256));
        assert!(schemes.contains(&SignatureScheme::ED25519));
    }

    #[test]
    fn test_snapshot_accessors() {
        let chain = vec![CertificateDer::from(vec![0x30, 0x03, 0x01, 0x01, 0x00])];
        let session = Session::new(0x1301, chain.clone());
        assert_eq!(session.cipher_suite(), 0x1301);
        assert_eq!(session.peer_chain(), &chain[..]);
    }
}
