//! Organization records and their service declarations.

use serde::{Deserialize, Serialize};

/// The only `apiVersion` this model accepts.
pub const API_VERSION: &str = "orgreg.dev/v1";

/// Opaque phonebook data carried through to the telephony directory.
pub type PhonebookEntry = serde_json::Value;

/// One record file exactly as written on disk.
///
/// Field presence and types are enforced by deserialization; version and
/// identity rules are applied by [`crate::parse_organization`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrganizationDocument {
    pub api_version: String,
    pub kind: RecordKind,
    pub metadata: RecordMetadata,
    pub spec: OrganizationSpec,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecordKind {
    Organization,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RecordMetadata {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OrganizationSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub services: Services,
}

/// A validated registry entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub api_version: String,
    pub name: String,
    pub services: Services,
}

impl Organization {
    /// Overlay-network nodes, empty when the service is not declared.
    pub fn network_nodes(&self) -> &[NetworkNode] {
        &self.services.nebula
    }

    pub fn telephony(&self) -> Option<&TelephonyService> {
        self.services.telephony.as_ref()
    }
}

impl From<OrganizationDocument> for Organization {
    fn from(document: OrganizationDocument) -> Self {
        Self {
            id: document.spec.id,
            api_version: document.api_version,
            name: document.spec.name,
            services: document.spec.services,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Services {
    #[serde(default)]
    pub nebula: Vec<NetworkNode>,
    #[serde(default)]
    pub telephony: Option<TelephonyService>,
}

/// One overlay-network endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NetworkNode {
    pub address: String,
    #[serde(default)]
    pub certificates: Vec<String>,
    #[serde(default)]
    pub lighthouse: Option<Lighthouse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Lighthouse {
    #[serde(default)]
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelephonyService {
    #[serde(default)]
    pub exchanges: Vec<TelephonyExchange>,
    #[serde(default)]
    pub prefixes: Vec<TelephonyPrefix>,
    #[serde(default)]
    pub phonebook: Vec<PhonebookEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelephonyExchange {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub codecs: Vec<String>,
    pub protocol: String,
}

/// Binds a dialing prefix to an exchange of the same organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelephonyPrefix {
    pub prefix: String,
    pub exchange: String,
}
