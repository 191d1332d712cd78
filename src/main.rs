use sas_search::config::{Cli, Config};
use sas_search::runner::solve;
use sas_search::sas::SasProblem;
use sas_search::search::ResultStatus;

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let problem = SasProblem::load_from_file(&config.problem_path)?;
    let report = solve(&problem, &config)?;

    match report.status {
        ResultStatus::SolutionFound => {
            info!("plan of cost {:?}:", report.cost.unwrap_or(f64::NAN));
            for step in report.plan.iter().chain(report.nodes.iter()).flatten() {
                info!("  {step}");
            }
        }
        status => error!("no plan: {status:?}"),
    }

    if let Some(output_path) = &config.output_path {
        let file = File::create(output_path)
            .with_context(|| format!("failed to create output file: {output_path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("failed to write result to {output_path}"))?;
        info!("result written to {output_path}");
    }

    Ok(())
}
