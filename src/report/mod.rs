pub mod json;
pub mod plain;
pub mod table;

use crate::config::Config;
use crate::scan::ScanResult;
use crate::store::VerifyResults;
use crate::util::{format_bytes, format_duration_ms};

pub fn print(result: &ScanResult, results: &VerifyResults, config: &Config) {
    if config.json_output {
        println!("{}", json::render(result, results));
    } else if config.plain_output {
        print!("{}", plain::render(results));
    } else {
        print!("{}", table::render(results));
        print_scan_info(result, config.verbose);
        print_diagnostics(result, config.verbose);
    }
}

fn print_scan_info(result: &ScanResult, verbose: bool) {
    if result.cancelled {
        println!("\nscan cancelled, results are incomplete");
    }

    if let Some(duration_ms) = result.duration_ms {
        println!(
            "\nchecked {} people and {} families in {} ({} errors, {} warnings)",
            result.people_checked,
            result.families_checked,
            format_duration_ms(duration_ms),
            result.errors(),
            result.warnings()
        );

        if verbose {
            if let Some(peak_bytes) = result.peak_memory_bytes {
                println!("peak memory: {}", format_bytes(peak_bytes as u64));
            }
            println!(
                "snapshot cache: {} hits, {} misses",
                result.cache_hits, result.cache_misses
            );
        }
    }
}

fn print_diagnostics(result: &ScanResult, verbose: bool) {
    if result.diagnostics.is_empty() {
        return;
    }

    println!();
    if verbose {
        println!("Skipped records:");
        println!("{}", "-".repeat(40));
        for diagnostic in &result.diagnostics {
            println!("  {diagnostic}");
        }
    } else {
        println!(
            "[diagnostic] {} records skipped, rerun with -v for details",
            result.diagnostics.len()
        );
    }
}
