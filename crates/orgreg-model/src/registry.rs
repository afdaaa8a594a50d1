//! Registry Assembler: every record under `<root>/organizations` keyed by id.
//!
//! Record files are enumerated non-recursively and sorted by file name.
//! Registry order is the order records were inserted, so it follows the
//! sorted file names rather than the ids (`a-b.yaml` sorts before `a.yaml`).
//! It decides which violation a fail-fast check reports first.

use crate::organization::Organization;
use crate::record::{RecordError, load_organization};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Organization records, relative to the registry root.
pub const ORGANIZATIONS_DIR: &str = "organizations";
/// Certificate files, relative to the registry root.
pub const CERTIFICATES_DIR: &str = "nebula/certificates";
pub const CERTIFICATE_EXTENSION: &str = "crt";
pub const RECORD_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Errors raised while assembling the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("failed to list {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no organization records found under {}", path.display())]
    Empty { path: PathBuf },

    #[error("organization `{id}` is declared by both {} and {}", first.display(), second.display())]
    DuplicateOrganization {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl RegistryError {
    /// Stable machine-readable class for reports.
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::Record(e) => e.failure_class(),
            Self::ListDir { .. } => "registry_unreadable",
            Self::Empty { .. } => "empty_registry",
            Self::DuplicateOrganization { .. } => "duplicate_organization",
        }
    }

    /// Whether this is the non-fatal "nothing to check" outcome.
    pub fn is_empty_registry(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Every validated organization of one registry root.
///
/// Immutable once assembled; iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    organizations: IndexMap<String, Registered>,
}

#[derive(Debug, Clone)]
struct Registered {
    organization: Organization,
    source: PathBuf,
}

impl Registry {
    /// An empty registry rooted at `root`, for incremental assembly.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            organizations: IndexMap::new(),
        }
    }

    /// Load every record file under `<root>/organizations`.
    ///
    /// Fails on the first unreadable or invalid record, on two files that
    /// yield the same id, and with [`RegistryError::Empty`] when no record
    /// files exist at all.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let root = root.as_ref();
        let dir = root.join(ORGANIZATIONS_DIR);
        let paths = record_paths(&dir)?;
        if paths.is_empty() {
            tracing::debug!(path = %dir.display(), "registry has no organization records");
            return Err(RegistryError::Empty { path: dir });
        }

        let mut registry = Self::new(root);
        for path in paths {
            let organization = load_organization(&path)?;
            registry.insert(organization, path)?;
        }
        tracing::info!(
            root = %root.display(),
            organizations = registry.len(),
            "assembled registry"
        );
        Ok(registry)
    }

    /// Add one organization loaded from `source`.
    pub fn insert(
        &mut self,
        organization: Organization,
        source: PathBuf,
    ) -> Result<(), RegistryError> {
        match self.organizations.entry(organization.id.clone()) {
            Entry::Occupied(existing) => Err(RegistryError::DuplicateOrganization {
                id: organization.id,
                first: existing.get().source.clone(),
                second: source,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Registered {
                    organization,
                    source,
                });
                Ok(())
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }

    /// Organizations in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Organization> {
        self.organizations
            .values()
            .map(|registered| &registered.organization)
    }

    pub fn certificates_dir(&self) -> PathBuf {
        self.root.join(CERTIFICATES_DIR)
    }

    /// Where the certificate for `fingerprint` is expected to live.
    pub fn certificate_path(&self, fingerprint: &str) -> PathBuf {
        self.certificates_dir()
            .join(format!("{fingerprint}.{CERTIFICATE_EXTENSION}"))
    }
}

/// Record files directly inside `dir`, sorted by path.
///
/// A missing directory yields no paths rather than an error.
pub fn record_paths(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let list_error = |source: io::Error| RegistryError::ListDir {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(list_error(e)),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(list_error)?;
        let file_type = entry.file_type().map_err(list_error)?;
        if file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        let is_record = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| RECORD_EXTENSIONS.contains(&ext));
        if is_record {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
