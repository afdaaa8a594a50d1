//! Network Consistency Checker: overlay-network (`services.nebula`) nodes.
//!
//! Per node, in order: address parses, address is inside the overlay subnet,
//! address is unclaimed by any earlier node, every certificate file exists,
//! every lighthouse endpoint is `host:port`.

use crate::certificates::{is_plain_fingerprint, probe_files};
use crate::check::CheckConfig;
use crate::endpoint::Endpoint;
use crate::error::NetworkError;
use orgreg_model::{NetworkNode, Organization, Registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;

/// Every overlay address claimed so far in one run, with its first owner.
#[derive(Debug, Clone, Default)]
pub struct AddressLedger {
    owners: BTreeMap<IpAddr, String>,
}

impl AddressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `address` for `organization`, failing if anyone holds it.
    ///
    /// Addresses compare as parsed values, so differently spelled forms of
    /// the same IPv6 address collide.
    pub fn claim(
        &mut self,
        address: IpAddr,
        written: &str,
        organization: &str,
    ) -> Result<(), NetworkError> {
        if let Some(first) = self.owners.get(&address) {
            return Err(NetworkError::DuplicateAddress {
                organization: organization.to_string(),
                address: written.to_string(),
                first_organization: first.clone(),
            });
        }
        self.owners.insert(address, organization.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }
}

/// Counts from a passing network check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub nodes: usize,
    pub certificates: usize,
    pub lighthouse_endpoints: usize,
}

/// Check every overlay node of every organization, in registry order.
pub async fn check_network(
    registry: &Registry,
    config: &CheckConfig,
    ledger: &mut AddressLedger,
) -> Result<NetworkSummary, NetworkError> {
    let mut summary = NetworkSummary::default();
    for organization in registry.iter() {
        for node in organization.network_nodes() {
            check_node(registry, organization, node, config, ledger).await?;
            summary.nodes += 1;
            summary.certificates += node.certificates.len();
            summary.lighthouse_endpoints += node
                .lighthouse
                .as_ref()
                .map_or(0, |lighthouse| lighthouse.endpoints.len());
        }
    }
    tracing::info!(
        nodes = summary.nodes,
        certificates = summary.certificates,
        "network check passed"
    );
    Ok(summary)
}

async fn check_node(
    registry: &Registry,
    organization: &Organization,
    node: &NetworkNode,
    config: &CheckConfig,
    ledger: &mut AddressLedger,
) -> Result<(), NetworkError> {
    let address: IpAddr = node
        .address
        .parse()
        .map_err(|_| NetworkError::InvalidAddress {
            organization: organization.id.clone(),
            address: node.address.clone(),
        })?;
    if !config.subnet.contains(address) {
        return Err(NetworkError::AddressOutOfRange {
            organization: organization.id.clone(),
            address: node.address.clone(),
            subnet: config.subnet,
        });
    }
    ledger.claim(address, &node.address, &organization.id)?;
    tracing::debug!(organization = %organization.id, %address, "nebula address claimed");

    check_certificates(registry, organization, node, config.probe_concurrency).await?;

    if let Some(lighthouse) = &node.lighthouse {
        for endpoint in &lighthouse.endpoints {
            endpoint
                .parse::<Endpoint>()
                .map_err(|source| NetworkError::InvalidEndpoint {
                    organization: organization.id.clone(),
                    endpoint: endpoint.clone(),
                    source,
                })?;
        }
    }
    Ok(())
}

async fn check_certificates(
    registry: &Registry,
    organization: &Organization,
    node: &NetworkNode,
    limit: usize,
) -> Result<(), NetworkError> {
    let missing = |fingerprint: &str, path: PathBuf| NetworkError::MissingCertificate {
        organization: organization.id.clone(),
        fingerprint: fingerprint.to_string(),
        path,
    };

    let mut paths = Vec::with_capacity(node.certificates.len());
    for fingerprint in &node.certificates {
        let path = registry.certificate_path(fingerprint);
        if !is_plain_fingerprint(fingerprint) {
            return Err(missing(fingerprint.as_str(), path));
        }
        paths.push(path);
    }

    let present = probe_files(&paths, limit)
        .await
        .map_err(|e| NetworkError::CertificateProbe {
            organization: organization.id.clone(),
            message: e.to_string(),
        })?;
    let first_missing = node
        .certificates
        .iter()
        .zip(paths)
        .zip(present)
        .find(|(_, found)| !found);
    if let Some(((fingerprint, path), _)) = first_missing {
        return Err(missing(fingerprint.as_str(), path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgreg_model::{API_VERSION, Lighthouse, Services};
    use std::fs;

    fn node(address: &str, certificates: &[&str]) -> NetworkNode {
        NetworkNode {
            address: address.to_string(),
            certificates: certificates.iter().map(|c| c.to_string()).collect(),
            lighthouse: None,
        }
    }

    fn organization(id: &str, nodes: Vec<NetworkNode>) -> Organization {
        Organization {
            id: id.to_string(),
            api_version: API_VERSION.to_string(),
            name: format!("Org {id}"),
            services: Services {
                nebula: nodes,
                telephony: None,
            },
        }
    }

    fn registry(root: &std::path::Path, organizations: Vec<Organization>) -> Registry {
        let mut registry = Registry::new(root);
        for org in organizations {
            let source = root.join(format!("organizations/{}.yaml", org.id));
            registry.insert(org, source).expect("unique ids");
        }
        registry
    }

    fn write_certificate(root: &std::path::Path, fingerprint: &str) {
        let dir = root.join(orgreg_model::CERTIFICATES_DIR);
        fs::create_dir_all(&dir).expect("certificates dir");
        fs::write(dir.join(format!("{fingerprint}.crt")), "cert").expect("write cert");
    }

    async fn run(registry: &Registry) -> Result<NetworkSummary, NetworkError> {
        check_network(registry, &CheckConfig::default(), &mut AddressLedger::new()).await
    }

    #[tokio::test]
    async fn accepts_valid_nodes() {
        let root = tempfile::tempdir().expect("temp dir");
        write_certificate(root.path(), "aaa");
        write_certificate(root.path(), "bbb");
        let mut lighthouse = node("fd79:7636:1f08:883d::2", &["bbb"]);
        lighthouse.lighthouse = Some(Lighthouse {
            endpoints: vec!["lh.example:4242".to_string()],
        });
        let registry = registry(
            root.path(),
            vec![
                organization("acme", vec![node("fd79:7636:1f08:883d::1", &["aaa"])]),
                organization("beta", vec![lighthouse]),
            ],
        );

        let summary = run(&registry).await.expect("network should pass");
        assert_eq!(
            summary,
            NetworkSummary {
                nodes: 2,
                certificates: 2,
                lighthouse_endpoints: 1,
            }
        );
    }

    #[tokio::test]
    async fn rejects_unparseable_address() {
        let root = tempfile::tempdir().expect("temp dir");
        let registry = registry(root.path(), vec![organization("acme", vec![node("nope", &[])])]);
        let err = run(&registry).await.unwrap_err();
        assert_eq!(err.failure_class(), "invalid_address");
    }

    #[tokio::test]
    async fn rejects_address_outside_subnet() {
        let root = tempfile::tempdir().expect("temp dir");
        let registry = registry(
            root.path(),
            vec![organization("acme", vec![node("fd79:7636:ffff::1", &[])])],
        );
        let err = run(&registry).await.unwrap_err();
        assert!(matches!(err, NetworkError::AddressOutOfRange { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn duplicate_address_names_both_organizations() {
        let root = tempfile::tempdir().expect("temp dir");
        let registry = registry(
            root.path(),
            vec![
                organization("acme", vec![node("fd79:7636:1f08:883d::1", &[])]),
                organization("beta", vec![node("fd79:7636:1f08:883d:0:0:0:1", &[])]),
            ],
        );
        match run(&registry).await.unwrap_err() {
            NetworkError::DuplicateAddress {
                organization,
                first_organization,
                ..
            } => {
                assert_eq!(organization, "beta");
                assert_eq!(first_organization, "acme");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_address_within_one_organization() {
        let root = tempfile::tempdir().expect("temp dir");
        let registry = registry(
            root.path(),
            vec![organization(
                "acme",
                vec![
                    node("fd79:7636:1f08:883d::1", &[]),
                    node("fd79:7636:1f08:883d::1", &[]),
                ],
            )],
        );
        let err = run(&registry).await.unwrap_err();
        assert_eq!(err.failure_class(), "duplicate_address");
    }

    #[tokio::test]
    async fn reports_first_missing_certificate_in_declared_order() {
        let root = tempfile::tempdir().expect("temp dir");
        write_certificate(root.path(), "present");
        let registry = registry(
            root.path(),
            vec![organization(
                "acme",
                vec![node(
                    "fd79:7636:1f08:883d::1",
                    &["present", "gone-1", "gone-2"],
                )],
            )],
        );
        match run(&registry).await.unwrap_err() {
            NetworkError::MissingCertificate {
                fingerprint, path, ..
            } => {
                assert_eq!(fingerprint, "gone-1");
                assert!(path.ends_with("nebula/certificates/gone-1.crt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn path_like_fingerprints_are_missing() {
        let root = tempfile::tempdir().expect("temp dir");
        let registry = registry(
            root.path(),
            vec![organization(
                "acme",
                vec![node("fd79:7636:1f08:883d::1", &["../../etc/passwd"])],
            )],
        );
        let err = run(&registry).await.unwrap_err();
        assert_eq!(err.failure_class(), "missing_certificate");
    }

    #[tokio::test]
    async fn rejects_lighthouse_endpoint_without_port() {
        let root = tempfile::tempdir().expect("temp dir");
        let mut bad = node("fd79:7636:1f08:883d::1", &[]);
        bad.lighthouse = Some(Lighthouse {
            endpoints: vec!["lh.example".to_string()],
        });
        let registry = registry(root.path(), vec![organization("acme", vec![bad])]);
        let err = run(&registry).await.unwrap_err();
        assert_eq!(err.failure_class(), "invalid_endpoint");
    }

    #[tokio::test]
    async fn ledger_persists_across_calls() {
        let root = tempfile::tempdir().expect("temp dir");
        let first = registry(
            root.path(),
            vec![organization("acme", vec![node("fd79:7636:1f08:883d::1", &[])])],
        );
        let second = registry(
            root.path(),
            vec![organization("beta", vec![node("fd79:7636:1f08:883d::1", &[])])],
        );
        let config = CheckConfig::default();
        let mut ledger = AddressLedger::new();
        check_network(&first, &config, &mut ledger)
            .await
            .expect("first registry passes");
        assert_eq!(ledger.len(), 1);
        let err = check_network(&second, &config, &mut ledger)
            .await
            .unwrap_err();
        assert_eq!(err.failure_class(), "duplicate_address");
    }
}
