//! # orgreg-kernel
//!
//! Registry-wide consistency checks: invariants that no single record can
//! establish on its own.
//!
//! ## Architecture
//!
//! ```text
//! Registry (orgreg-model)
//!     │
//!     ├── check_network     ← subnet membership, address uniqueness,
//!     │                       certificate files, lighthouse endpoints
//!     ├── check_telephony   ← exchange ids, prefix uniqueness,
//!     │                       prefix → exchange references
//!     │        (both fail fast; check_registry runs them in turn)
//!     │
//!     └── build_directory   ← telephony directory projection (no checks)
//! ```
//!
//! Running state (seen addresses, seen prefixes) lives in explicit ledgers
//! owned by the caller, so each run and each test starts from a clean slate.

pub mod certificates;
pub mod check;
pub mod directory;
pub mod endpoint;
pub mod error;
pub mod network;
pub mod subnet;
pub mod telephony;

pub use check::{CheckConfig, CheckSummary, DEFAULT_PROBE_CONCURRENCY, check_registry};
pub use directory::{
    DirectoryError, DirectoryFormat, TelephonyDirectory, TelephonyDirectoryExchange,
    TelephonyDirectoryOrg, build_directory, write_directory,
};
pub use endpoint::{Endpoint, EndpointError};
pub use error::{CheckError, NetworkError, TelephonyError};
pub use network::{AddressLedger, NetworkSummary, check_network};
pub use subnet::{OVERLAY_SUBNET, Subnet, SubnetParseError};
pub use telephony::{
    PrefixLedger, TelephonySummary, check_organization_telephony, check_telephony,
};
