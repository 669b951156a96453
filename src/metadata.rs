//! The metadata record and the extraction walk that fills it.
//!
//! `Metadata` is a pure snapshot of one TLS session: the negotiated
//! cipher suite and the peer chain flattened into a JSON-friendly
//! schema. Nothing here touches the network; the chain bytes come in
//! through a [`Session`].

use openssl::error::ErrorStack;
use openssl::nid::Nid;
use openssl::pkey::Id;
use openssl::x509::{X509, X509NameRef, X509Ref};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::session::Session;

/// Standard padded base64 for binary fields, over the openssl codec.
mod base64 {
    use openssl::base64::{decode_block, encode_block};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_block(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_block(&text).map_err(serde::de::Error::custom)
    }
}

/// TLS session metadata: the negotiated cipher suite's IANA identifier
/// and the peer certificate chain, leaf first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub cipher_suite: u16,
    pub chain: Vec<Certificate>,
}

/// One certificate of the peer chain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub signature: AlgorithmValue,
    pub public_key: AlgorithmValue,
    pub issuer: Name,
    pub subject: Name,
    /// OCSP responder URLs, space-joined. Always serialized, even when
    /// empty.
    pub ocsp_server: String,
    /// CA issuer certificate URLs, space-joined.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issuing_cert_url: String,
    /// DNS subject alternative names in presented order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,
}

/// An algorithm name paired with the raw bytes it covers; used for both
/// the signature and the public key. The bytes serialize as standard
/// padded base64 text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmValue {
    pub algorithm: String,
    #[serde(with = "base64")]
    pub value: Vec<u8>,
}

/// An X.509 distinguished name flattened to strings. Multi-valued
/// attributes are space-joined; serial number and common name keep
/// their first value only. Empty fields are omitted from serialized
/// output.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locality: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub province: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization_unit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub common_name: String,
}

impl Metadata {
    /// Connects to `addr` (a normalized `host:port`) and extracts the
    /// session metadata. The connection lives only for the duration of
    /// this call.
    ///
    /// # Errors
    ///
    /// [`ExtractError::Connection`] when the session cannot be
    /// established, [`ExtractError::Encoding`] when the peer's
    /// certificate material cannot be decoded.
    pub fn from_addr(addr: &str) -> Result<Metadata, ExtractError> {
        let session = Session::connect(addr)?;
        Metadata::from_session(&session)
    }

    /// Extracts metadata from an established session snapshot. Pure;
    /// repeated calls on the same session yield identical records.
    ///
    /// # Errors
    ///
    /// [`ExtractError::Encoding`] when any certificate or public key in
    /// the chain cannot be decoded or re-encoded. No partial chain is
    /// returned.
    pub fn from_session(session: &Session) -> Result<Metadata, ExtractError> {
        let mut chain = Vec::with_capacity(session.peer_chain().len());
        for (index, der) in session.peer_chain().iter().enumerate() {
            chain.push(certificate_from_der(der.as_ref(), index)?);
        }
        Ok(Metadata {
            cipher_suite: session.cipher_suite(),
            chain,
        })
    }
}

fn certificate_from_der(der: &[u8], index: usize) -> Result<Certificate, ExtractError> {
    let cert = X509::from_der(der).map_err(|e| enc_err(format!("certificate {index}"), e))?;

    let signature = AlgorithmValue {
        algorithm: cert.signature_algorithm().object().to_string(),
        value: cert.signature().as_slice().to_vec(),
    };

    let key = cert
        .public_key()
        .map_err(|e| enc_err(format!("public key of certificate {index}"), e))?;
    let public_key = AlgorithmValue {
        algorithm: key_algorithm_name(key.id()),
        value: key
            .public_key_to_der()
            .map_err(|e| enc_err(format!("public key of certificate {index}"), e))?,
    };

    Ok(Certificate {
        signature,
        public_key,
        issuer: name_from_entries(cert.issuer_name()),
        subject: name_from_entries(cert.subject_name()),
        ocsp_server: access_locations(&cert, Nid::AD_OCSP),
        issuing_cert_url: access_locations(&cert, Nid::AD_CA_ISSUERS),
        dns_names: dns_names(&cert),
    })
}

fn enc_err(reason: String, source: ErrorStack) -> ExtractError {
    ExtractError::Encoding { reason, source }
}

fn key_algorithm_name(id: Id) -> String {
    let known = if id == Id::RSA {
        "RSA"
    } else if id == Id::RSA_PSS {
        "RSA-PSS"
    } else if id == Id::DSA {
        "DSA"
    } else if id == Id::EC {
        "ECDSA"
    } else if id == Id::ED25519 {
        "Ed25519"
    } else if id == Id::ED448 {
        "Ed448"
    } else {
        return Nid::from_raw(id.as_raw())
            .long_name()
            .map(str::to_string)
            .unwrap_or_else(|_| format!("unknown key type {}", id.as_raw()));
    };
    known.to_string()
}

fn name_from_entries(name: &X509NameRef) -> Name {
    Name {
        country: joined_entries(name, Nid::COUNTRYNAME),
        locality: joined_entries(name, Nid::LOCALITYNAME),
        province: joined_entries(name, Nid::STATEORPROVINCENAME),
        street_address: joined_entries(name, Nid::STREETADDRESS),
        postal_code: joined_entries(name, Nid::POSTALCODE),
        organization: joined_entries(name, Nid::ORGANIZATIONNAME),
        organization_unit: joined_entries(name, Nid::ORGANIZATIONALUNITNAME),
        serial_number: first_entry(name, Nid::SERIALNUMBER),
        common_name: first_entry(name, Nid::COMMONNAME),
    }
}

/// All values of one attribute, space-joined in certificate order.
/// Entries that are not valid UTF-8 are skipped.
fn joined_entries(name: &X509NameRef, nid: Nid) -> String {
    name.entries_by_nid(nid)
        .filter_map(|entry| entry.data().as_utf8().ok())
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_entry(name: &X509NameRef, nid: Nid) -> String {
    name.entries_by_nid(nid)
        .filter_map(|entry| entry.data().as_utf8().ok())
        .map(|value| value.to_string())
        .next()
        .unwrap_or_default()
}

/// Authority Information Access locations for one access method,
/// space-joined in presented order.
fn access_locations(cert: &X509Ref, method: Nid) -> String {
    cert.authority_info()
        .map(|descriptions| {
            descriptions
                .iter()
                .filter(|description| description.method().nid() == method)
                .filter_map(|description| description.location().uri())
                .map(str::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn dns_names(cert: &X509Ref) -> Vec<String> {
    cert.subject_alt_names()
        .map(|names| {
            names
                .iter()
                .filter_map(|name| name.dnsname())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
