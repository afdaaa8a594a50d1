//! Telephony Consistency Checker: `services.telephony` exchanges and prefixes.
//!
//! Within one organization every exchange is checked before any prefix, so a
//! prefix may only reference exchanges declared by its own organization.

use crate::endpoint::Endpoint;
use crate::error::TelephonyError;
use orgreg_model::{Organization, Registry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Every dialing prefix claimed so far in one run, with its owner.
#[derive(Debug, Clone, Default)]
pub struct PrefixLedger {
    owners: BTreeMap<String, String>,
}

impl PrefixLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, prefix: &str) -> Option<&str> {
        self.owners.get(prefix).map(String::as_str)
    }

    fn record(&mut self, prefix: &str, organization: &str) {
        self.owners
            .insert(prefix.to_string(), organization.to_string());
    }
}

/// Counts from a passing telephony check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelephonySummary {
    pub organizations: usize,
    pub exchanges: usize,
    pub prefixes: usize,
}

/// Check the telephony service of every organization, in registry order.
pub fn check_telephony(
    registry: &Registry,
    ledger: &mut PrefixLedger,
) -> Result<TelephonySummary, TelephonyError> {
    let mut summary = TelephonySummary::default();
    for organization in registry.iter() {
        let local = check_organization_telephony(organization, ledger)?;
        summary.organizations += local.organizations;
        summary.exchanges += local.exchanges;
        summary.prefixes += local.prefixes;
    }
    tracing::info!(
        exchanges = summary.exchanges,
        prefixes = summary.prefixes,
        "telephony check passed"
    );
    Ok(summary)
}

/// Check one organization's telephony service against the global ledger.
///
/// Prefixes are added to `ledger` only once they pass every check.
pub fn check_organization_telephony(
    organization: &Organization,
    ledger: &mut PrefixLedger,
) -> Result<TelephonySummary, TelephonyError> {
    let Some(service) = organization.telephony() else {
        return Ok(TelephonySummary::default());
    };
    let org_id = organization.id.as_str();

    let mut exchanges = BTreeSet::new();
    for exchange in &service.exchanges {
        if !exchanges.insert(exchange.id.as_str()) {
            return Err(TelephonyError::DuplicateExchange {
                organization: org_id.to_string(),
                exchange: exchange.id.clone(),
            });
        }
        exchange
            .address
            .parse::<Endpoint>()
            .map_err(|source| TelephonyError::InvalidExchangeAddress {
                organization: org_id.to_string(),
                exchange: exchange.id.clone(),
                address: exchange.address.clone(),
                source,
            })?;
    }

    let mut prefixes = BTreeSet::new();
    for binding in &service.prefixes {
        if prefixes.contains(binding.prefix.as_str()) {
            return Err(TelephonyError::DuplicateLocalPrefix {
                organization: org_id.to_string(),
                prefix: binding.prefix.clone(),
            });
        }
        if let Some(first) = ledger.owner(&binding.prefix) {
            return Err(TelephonyError::DuplicateGlobalPrefix {
                organization: org_id.to_string(),
                prefix: binding.prefix.clone(),
                first_organization: first.to_string(),
            });
        }
        if !exchanges.contains(binding.exchange.as_str()) {
            return Err(TelephonyError::UnknownExchangeReference {
                organization: org_id.to_string(),
                prefix: binding.prefix.clone(),
                exchange: binding.exchange.clone(),
            });
        }
        prefixes.insert(binding.prefix.as_str());
        ledger.record(&binding.prefix, org_id);
    }

    tracing::debug!(
        organization = org_id,
        exchanges = exchanges.len(),
        prefixes = prefixes.len(),
        "telephony service consistent"
    );
    Ok(TelephonySummary {
        organizations: 1,
        exchanges: exchanges.len(),
        prefixes: prefixes.len(),
    })
}
