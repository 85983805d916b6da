use clap::Parser;
use parallel_m2::cli::{Args, RunConfig, normalize_legacy_args, run_files};
use parallel_m2::json::RunReport;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so `--json` output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parallel_m2=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_from(normalize_legacy_args(std::env::args()));
    let json_mode = args.json;
    let config = RunConfig::from(args);

    match run_files(&config) {
        Ok(report) => output_report(&report, json_mode),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format and output the run report
fn output_report(report: &RunReport, json_mode: bool) {
    let output = if json_mode {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|_| r#"{"error": "Failed to serialize report"}"#.to_string())
    } else {
        report.summary()
    };
    println!("{}", output);
}
