use crate::support::print_json;
use orgreg_kernel::{build_directory, write_directory};
use orgreg_model::Registry;
use serde_json::json;
use std::path::Path;
use std::process;

const GENERATE_REPORT_KIND: &str = "orgreg.generate_report.v1";

pub fn run(registry: String, output: String, json_output: bool) {
    tracing::debug!(%registry, %output, "generating telephony directory");
    let loaded = match Registry::load(&registry) {
        Ok(loaded) => loaded,
        Err(e) if e.is_empty_registry() => {
            eprintln!("warning: {e}");
            Registry::new(&registry)
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let directory = build_directory(&loaded);
    let output_path = Path::new(&output);
    let format = write_directory(&directory, output_path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    let exchange_count: usize = directory
        .organizations
        .iter()
        .map(|org| org.exchanges.len())
        .sum();
    if json_output {
        print_json(&json!({
            "kind": GENERATE_REPORT_KIND,
            "registry": registry,
            "output": output,
            "format": format.as_str(),
            "organizationCount": directory.organizations.len(),
            "exchangeCount": exchange_count,
        }));
    } else {
        println!("orgreg generate: wrote {output}");
        println!(
            "  Organizations: {} ({} exchanges)",
            directory.organizations.len(),
            exchange_count
        );
    }
}
