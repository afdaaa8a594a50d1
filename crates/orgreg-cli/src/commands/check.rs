use crate::support::{build_runtime_or_exit, print_json};
use orgreg_kernel::{CheckConfig, CheckSummary, Subnet, check_registry};
use orgreg_model::Registry;
use serde_json::json;
use std::process;

const CHECK_REPORT_KIND: &str = "orgreg.check_report.v1";

pub struct Args {
    pub registry: String,
    pub subnet: Subnet,
    pub probe_concurrency: usize,
    pub json: bool,
}

pub fn run(args: Args) {
    tracing::debug!(registry = %args.registry, "checking registry");
    let registry = match Registry::load(&args.registry) {
        Ok(registry) => registry,
        Err(e) if e.is_empty_registry() => {
            if args.json {
                print_json(&json!({
                    "kind": CHECK_REPORT_KIND,
                    "registry": args.registry,
                    "result": "empty",
                    "message": e.to_string(),
                }));
            } else {
                eprintln!("warning: {e}");
            }
            return;
        }
        Err(e) => reject(&args, e.failure_class(), &e.to_string()),
    };

    let config = CheckConfig {
        subnet: args.subnet,
        probe_concurrency: args.probe_concurrency,
    };
    let runtime = build_runtime_or_exit();
    match runtime.block_on(check_registry(&registry, &config)) {
        Ok(summary) => accept(&args, &summary),
        Err(e) => reject(&args, e.failure_class(), &e.to_string()),
    }
}

fn accept(args: &Args, summary: &CheckSummary) {
    if args.json {
        print_json(&json!({
            "kind": CHECK_REPORT_KIND,
            "registry": args.registry,
            "result": "accepted",
            "summary": summary,
        }));
        return;
    }
    println!(
        "orgreg check: {} organizations valid",
        summary.organizations
    );
    println!("  Registry: {}", args.registry);
    println!(
        "  Nebula nodes: {} ({} certificates)",
        summary.network.nodes, summary.network.certificates
    );
    println!(
        "  Telephony: {} exchanges, {} prefixes",
        summary.telephony.exchanges, summary.telephony.prefixes
    );
}

fn reject(args: &Args, failure_class: &str, message: &str) -> ! {
    if args.json {
        print_json(&json!({
            "kind": CHECK_REPORT_KIND,
            "registry": args.registry,
            "result": "rejected",
            "failureClass": failure_class,
            "message": message,
        }));
    } else {
        eprintln!("error: {message}");
    }
    process::exit(1);
}
