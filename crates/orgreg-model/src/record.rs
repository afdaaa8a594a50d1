//! Record Loader: one YAML file in, one validated [`Organization`] out.
//!
//! Checks run in a fixed order and the first failure wins:
//! schema → apiVersion → file stem vs `metadata.id` → `metadata.id` vs `spec.id`.

use crate::organization::{API_VERSION, Organization, OrganizationDocument};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading a single organization record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema violation in {}: {message}", path.display())]
    Schema { path: PathBuf, message: String },

    #[error("unsupported apiVersion `{found}` in {} (expected `{}`)", path.display(), API_VERSION)]
    UnsupportedVersion { path: PathBuf, found: String },

    #[error("identity mismatch in {}: {mismatch}", path.display())]
    IdentityMismatch {
        path: PathBuf,
        mismatch: IdentityMismatch,
    },
}

impl RecordError {
    /// Stable machine-readable class for reports.
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::Io { .. } => "record_unreadable",
            Self::Schema { .. } => "schema_violation",
            Self::UnsupportedVersion { .. } => "unsupported_version",
            Self::IdentityMismatch { .. } => "identity_mismatch",
        }
    }
}

/// Which pair of identifiers disagreed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityMismatch {
    #[error("file name does not yield an organization id")]
    UnusableFileName,

    #[error("file stem `{file_stem}` does not match metadata.id `{metadata_id}`")]
    FileStem {
        file_stem: String,
        metadata_id: String,
    },

    #[error("metadata.id `{metadata_id}` does not match spec.id `{spec_id}`")]
    SpecId {
        metadata_id: String,
        spec_id: String,
    },
}

/// Read and validate one organization record from disk.
pub fn load_organization(path: impl AsRef<Path>) -> Result<Organization, RecordError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_organization(path, &bytes)
}

/// Validate record bytes as if they had been read from `path`.
///
/// `path` only supplies the file stem for the identity check and the
/// location for error messages; nothing is read from it.
pub fn parse_organization(path: &Path, bytes: &[u8]) -> Result<Organization, RecordError> {
    let document: OrganizationDocument =
        serde_yaml::from_slice(bytes).map_err(|e| RecordError::Schema {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if document.api_version != API_VERSION {
        return Err(RecordError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: document.api_version,
        });
    }

    let identity_error = |mismatch: IdentityMismatch| RecordError::IdentityMismatch {
        path: path.to_path_buf(),
        mismatch,
    };
    let file_stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| identity_error(IdentityMismatch::UnusableFileName))?;
    if document.metadata.id != file_stem {
        return Err(identity_error(IdentityMismatch::FileStem {
            file_stem: file_stem.to_string(),
            metadata_id: document.metadata.id,
        }));
    }
    if document.metadata.id != document.spec.id {
        return Err(identity_error(IdentityMismatch::SpecId {
            metadata_id: document.metadata.id,
            spec_id: document.spec.id,
        }));
    }

    tracing::debug!(path = %path.display(), id = %document.spec.id, "loaded organization record");
    Ok(document.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(api_version: &str, metadata_id: &str, spec_id: &str) -> String {
        format!(
            r#"
apiVersion: {api_version}
kind: Organization
metadata:
  id: {metadata_id}
spec:
  id: {spec_id}
  name: ACME Corporation
  services:
    nebula:
      - address: "fd79:7636:1f08:883d::1"
        certificates: [abc123]
    telephony:
      exchanges:
        - id: ex1
          address: "10.0.0.1:5060"
          codecs: [opus]
          protocol: sip
      prefixes:
        - prefix: "1"
          exchange: ex1
      phonebook:
        - name: Front desk
          number: "100"
"#
        )
    }

    #[test]
    fn valid_record_is_loaded() {
        let text = record(API_VERSION, "acme", "acme");
        let org = parse_organization(Path::new("organizations/acme.yaml"), text.as_bytes())
            .expect("record should load");
        assert_eq!(org.id, "acme");
        assert_eq!(org.name, "ACME Corporation");
        assert_eq!(org.network_nodes().len(), 1);
        assert_eq!(org.network_nodes()[0].certificates, vec!["abc123"]);
        let telephony = org.telephony().expect("telephony declared");
        assert_eq!(telephony.exchanges[0].id, "ex1");
        assert_eq!(telephony.prefixes[0].exchange, "ex1");
        assert_eq!(telephony.phonebook[0]["number"], "100");
    }

    #[test]
    fn services_are_optional() {
        let text = format!(
            "apiVersion: {API_VERSION}\nkind: Organization\nmetadata:\n  id: bare\nspec:\n  id: bare\n  name: Bare\n"
        );
        let org = parse_organization(Path::new("bare.yml"), text.as_bytes())
            .expect("record without services should load");
        assert!(org.network_nodes().is_empty());
        assert!(org.telephony().is_none());
    }

    #[test]
    fn unknown_fields_are_schema_errors() {
        let text = format!(
            "apiVersion: {API_VERSION}\nkind: Organization\nmetadata:\n  id: acme\nspec:\n  id: acme\n  name: ACME\n  colour: red\n"
        );
        let err = parse_organization(Path::new("acme.yaml"), text.as_bytes()).unwrap_err();
        assert!(matches!(err, RecordError::Schema { .. }), "got {err:?}");
        assert_eq!(err.failure_class(), "schema_violation");
    }

    #[test]
    fn wrong_kind_is_schema_error() {
        let text = record(API_VERSION, "acme", "acme").replace("kind: Organization", "kind: Person");
        let err = parse_organization(Path::new("acme.yaml"), text.as_bytes()).unwrap_err();
        assert!(matches!(err, RecordError::Schema { .. }), "got {err:?}");
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let text = record("orgreg.dev/v0", "acme", "acme");
        let err = parse_organization(Path::new("acme.yaml"), text.as_bytes()).unwrap_err();
        match err {
            RecordError::UnsupportedVersion { found, .. } => assert_eq!(found, "orgreg.dev/v0"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn version_is_checked_before_identity() {
        let text = record("orgreg.dev/v0", "other", "third");
        let err = parse_organization(Path::new("acme.yaml"), text.as_bytes()).unwrap_err();
        assert_eq!(err.failure_class(), "unsupported_version");
    }

    #[test]
    fn file_stem_must_match_metadata_id() {
        let text = record(API_VERSION, "acme", "acme");
        let err = parse_organization(Path::new("organizations/acme-corp.yaml"), text.as_bytes())
            .unwrap_err();
        match err {
            RecordError::IdentityMismatch { mismatch, .. } => assert_eq!(
                mismatch,
                IdentityMismatch::FileStem {
                    file_stem: "acme-corp".to_string(),
                    metadata_id: "acme".to_string(),
                }
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn metadata_id_must_match_spec_id() {
        let text = record(API_VERSION, "acme", "acme2");
        let err = parse_organization(Path::new("acme.yaml"), text.as_bytes()).unwrap_err();
        match err {
            RecordError::IdentityMismatch { mismatch, .. } => assert_eq!(
                mismatch,
                IdentityMismatch::SpecId {
                    metadata_id: "acme".to_string(),
                    spec_id: "acme2".to_string(),
                }
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_organization(dir.path().join("ghost.yaml")).unwrap_err();
        assert_eq!(err.failure_class(), "record_unreadable");
        assert!(err.to_string().contains("ghost.yaml"));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("acme.yaml");
        fs::write(&path, record(API_VERSION, "acme", "acme")).expect("write record");
        let org = load_organization(&path).expect("record should load");
        assert_eq!(org.api_version, API_VERSION);
    }
}
