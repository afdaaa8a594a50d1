use clap::{Parser, Subcommand};
use orgreg_kernel::{DEFAULT_PROBE_CONCURRENCY, OVERLAY_SUBNET, Subnet};

#[derive(Parser)]
#[command(
    name = "orgreg",
    about = "orgreg: consistency checks and telephony directory generation for an organization registry",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every record and every registry-wide invariant (fail-fast)
    Check {
        /// Registry root (contains organizations/ and nebula/certificates/)
        #[arg(long, env = "ORGREG_REGISTRY", default_value = ".")]
        registry: String,

        /// Address space every overlay node must live in (CIDR)
        #[arg(long, default_value = OVERLAY_SUBNET)]
        subnet: Subnet,

        /// Certificate probes allowed in flight at once
        #[arg(long, default_value_t = DEFAULT_PROBE_CONCURRENCY)]
        probe_concurrency: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the telephony directory derived from the registry
    Generate {
        /// Registry root (contains organizations/)
        #[arg(long, env = "ORGREG_REGISTRY", default_value = ".")]
        registry: String,

        /// Output file; `.yaml`/`.yml` selects YAML, anything else JSON
        #[arg(long, short)]
        output: String,

        /// Print the summary report as JSON
        #[arg(long)]
        json: bool,
    },
}
