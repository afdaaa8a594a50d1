//! Error types for registry-wide checks.
//!
//! Every check is fail-fast: the first violation found is returned and the
//! caller decides whether that ends the process.

use crate::endpoint::EndpointError;
use crate::subnet::Subnet;
use std::path::PathBuf;

/// Violations of the overlay-network invariants.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("organization `{organization}`: nebula address `{address}` is not an IP address")]
    InvalidAddress {
        organization: String,
        address: String,
    },

    #[error("organization `{organization}`: nebula address `{address}` is outside {subnet}")]
    AddressOutOfRange {
        organization: String,
        address: String,
        subnet: Subnet,
    },

    #[error(
        "organization `{organization}`: nebula address `{address}` is already used by organization `{first_organization}`"
    )]
    DuplicateAddress {
        organization: String,
        address: String,
        first_organization: String,
    },

    #[error(
        "organization `{organization}`: certificate `{fingerprint}` not found at {}",
        path.display()
    )]
    MissingCertificate {
        organization: String,
        fingerprint: String,
        path: PathBuf,
    },

    #[error("organization `{organization}`: certificate probe failed: {message}")]
    CertificateProbe {
        organization: String,
        message: String,
    },

    #[error("organization `{organization}`: lighthouse endpoint `{endpoint}` is invalid: {source}")]
    InvalidEndpoint {
        organization: String,
        endpoint: String,
        #[source]
        source: EndpointError,
    },
}

impl NetworkError {
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => "invalid_address",
            Self::AddressOutOfRange { .. } => "address_out_of_range",
            Self::DuplicateAddress { .. } => "duplicate_address",
            Self::MissingCertificate { .. } => "missing_certificate",
            Self::CertificateProbe { .. } => "certificate_probe_failed",
            Self::InvalidEndpoint { .. } => "invalid_endpoint",
        }
    }
}

/// Violations of the telephony invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelephonyError {
    #[error("organization `{organization}`: telephony exchange `{exchange}` is declared twice")]
    DuplicateExchange {
        organization: String,
        exchange: String,
    },

    #[error(
        "organization `{organization}`: telephony exchange `{exchange}` has invalid address `{address}`: {source}"
    )]
    InvalidExchangeAddress {
        organization: String,
        exchange: String,
        address: String,
        #[source]
        source: EndpointError,
    },

    #[error(
        "organization `{organization}`: telephony prefix `{prefix}` is already claimed by organization `{first_organization}`"
    )]
    DuplicateGlobalPrefix {
        organization: String,
        prefix: String,
        first_organization: String,
    },

    #[error("organization `{organization}`: telephony prefix `{prefix}` is declared twice")]
    DuplicateLocalPrefix {
        organization: String,
        prefix: String,
    },

    #[error(
        "organization `{organization}`: telephony prefix `{prefix}` routes to unknown exchange `{exchange}`"
    )]
    UnknownExchangeReference {
        organization: String,
        prefix: String,
        exchange: String,
    },
}

impl TelephonyError {
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::DuplicateExchange { .. } => "duplicate_exchange",
            Self::InvalidExchangeAddress { .. } => "invalid_exchange_address",
            Self::DuplicateGlobalPrefix { .. } => "duplicate_global_prefix",
            Self::DuplicateLocalPrefix { .. } => "duplicate_local_prefix",
            Self::UnknownExchangeReference { .. } => "unknown_exchange_reference",
        }
    }
}

/// The first violation found by [`crate::check_registry`].
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Telephony(#[from] TelephonyError),
}

impl CheckError {
    /// Stable machine-readable class for reports.
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::Network(e) => e.failure_class(),
            Self::Telephony(e) => e.failure_class(),
        }
    }
}
