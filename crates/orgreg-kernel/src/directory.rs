//! Telephony Directory Builder.
//!
//! A pure projection of the registry: every organization that declares a
//! telephony service, with its exchanges and the prefixes routing to each.
//! Nothing here validates; prefixes naming an undeclared exchange are simply
//! not attached to anything.

use orgreg_model::{Organization, PhonebookEntry, Registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelephonyDirectory {
    pub organizations: Vec<TelephonyDirectoryOrg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelephonyDirectoryOrg {
    pub id: String,
    pub name: String,
    pub phonebook: Vec<PhonebookEntry>,
    pub exchanges: Vec<TelephonyDirectoryExchange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelephonyDirectoryExchange {
    pub id: String,
    pub address: String,
    pub protocol: String,
    pub codecs: Vec<String>,
    /// Prefixes routed to this exchange, in first-declared order.
    pub prefixes: Vec<String>,
}

/// Build the directory for the whole registry, in registry order.
pub fn build_directory(registry: &Registry) -> TelephonyDirectory {
    let organizations: Vec<TelephonyDirectoryOrg> =
        registry.iter().filter_map(directory_entry).collect();
    tracing::info!(
        organizations = organizations.len(),
        "built telephony directory"
    );
    TelephonyDirectory { organizations }
}

fn directory_entry(organization: &Organization) -> Option<TelephonyDirectoryOrg> {
    let service = organization.telephony()?;

    let mut routed: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for binding in &service.prefixes {
        let prefixes = routed.entry(binding.exchange.as_str()).or_default();
        if !prefixes.contains(&binding.prefix) {
            prefixes.push(binding.prefix.clone());
        }
    }

    let exchanges = service
        .exchanges
        .iter()
        .map(|exchange| TelephonyDirectoryExchange {
            id: exchange.id.clone(),
            address: exchange.address.clone(),
            protocol: exchange.protocol.clone(),
            codecs: exchange.codecs.clone(),
            prefixes: routed
                .get(exchange.id.as_str())
                .cloned()
                .unwrap_or_default(),
        })
        .collect();

    Some(TelephonyDirectoryOrg {
        id: organization.id.clone(),
        name: organization.name.clone(),
        phonebook: service.phonebook.clone(),
        exchanges,
    })
}

/// Serialization chosen for a directory document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryFormat {
    Json,
    Yaml,
}

impl DirectoryFormat {
    /// YAML for `.yaml`/`.yml` outputs, JSON otherwise.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to serialize telephony directory: {0}")]
    Serialize(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TelephonyDirectory {
    /// Render the document; output always ends with a newline.
    pub fn render(&self, format: DirectoryFormat) -> Result<String, DirectoryError> {
        match format {
            DirectoryFormat::Json => serde_json::to_string_pretty(self)
                .map(|mut text| {
                    text.push('\n');
                    text
                })
                .map_err(|e| DirectoryError::Serialize(e.to_string())),
            DirectoryFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| DirectoryError::Serialize(e.to_string()))
            }
        }
    }
}

/// Write `directory` to `path`, replacing any existing file.
///
/// The document is written to a sibling temp file and renamed into place,
/// so readers never observe a partial directory.
pub fn write_directory(
    directory: &TelephonyDirectory,
    path: &Path,
) -> Result<DirectoryFormat, DirectoryError> {
    let format = DirectoryFormat::for_path(path);
    let text = directory.render(format)?;
    let write_error = |source: io::Error| DirectoryError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let tmp_path = tmp_write_path(path);
    if let Err(e) = fs::write(&tmp_path, text).and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(e));
    }
    tracing::info!(path = %path.display(), ?format, "wrote telephony directory");
    Ok(format)
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".tmp-{}", std::process::id()));
    path.with_file_name(name)
}
