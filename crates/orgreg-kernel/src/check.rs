//! The check operation: every registry-wide invariant, fail-fast.

use crate::error::CheckError;
use crate::network::{AddressLedger, NetworkSummary, check_network};
use crate::subnet::Subnet;
use crate::telephony::{PrefixLedger, TelephonySummary, check_telephony};
use orgreg_model::Registry;
use serde::{Deserialize, Serialize};

/// Certificate probes allowed in flight at once, per node.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckConfig {
    /// Address space every overlay node must live in.
    pub subnet: Subnet,
    pub probe_concurrency: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            subnet: Subnet::overlay(),
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub organizations: usize,
    pub network: NetworkSummary,
    pub telephony: TelephonySummary,
}

/// Run the network checker, then the telephony checker, each with fresh
/// ledgers. The first violation found is returned.
pub async fn check_registry(
    registry: &Registry,
    config: &CheckConfig,
) -> Result<CheckSummary, CheckError> {
    let network = check_network(registry, config, &mut AddressLedger::new()).await?;
    let telephony = check_telephony(registry, &mut PrefixLedger::new())?;
    Ok(CheckSummary {
        organizations: registry.len(),
        network,
        telephony,
    })
}
