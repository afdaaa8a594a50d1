//! # orgreg-model
//!
//! Typed model for the organization registry.
//!
//! This crate provides:
//! - `Organization` and its service declarations (the records)
//! - YAML record loading with version and identity rules
//! - `Registry` (the keyed, ordered collection of every record)
//!
//! It intentionally does not check anything that spans more than one
//! record. Cross-record invariants live in `orgreg-kernel`.
//!
//! ## Data model
//!
//! ```text
//! <root>/organizations/<id>.yaml   (on disk, one record per organization)
//!     ↓  load_organization
//! Organization                     (one validated record)
//!     ↓  Registry::load
//! Registry                         (id → Organization, registry order)
//! ```

pub mod organization;
pub mod record;
pub mod registry;

pub use organization::{
    API_VERSION, Lighthouse, NetworkNode, Organization, OrganizationDocument, OrganizationSpec,
    PhonebookEntry,
    RecordKind, RecordMetadata, Services, TelephonyExchange, TelephonyPrefix, TelephonyService,
};
pub use record::{IdentityMismatch, RecordError, load_organization, parse_organization};
pub use registry::{
    CERTIFICATE_EXTENSION, CERTIFICATES_DIR, ORGANIZATIONS_DIR, RECORD_EXTENSIONS, Registry,
    RegistryError, record_paths,
};
