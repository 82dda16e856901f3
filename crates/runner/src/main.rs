//! End-to-end runner for the managed-database collections.
//!
//! Run with: `dbaas-e2e <scenario> [--seed <n>] [--log-format pretty|json]`
//!
//! Each scenario orders a real cluster, exercises it and deletes it. A
//! failing step stops the scenario and leaves the cluster in place.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use dbaas_core::{run_collection, ScenarioReport, SeededRandom, SuiteContext};
use dbaas_domain::Topology;
use dbaas_infra::{config, init_tracing, ControlPlaneTransport, LogFormat};
use tracing::info;

/// Parsed command line
struct Invocation {
    targets: Vec<Topology>,
    seed: Option<u64>,
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("help") | Some("--help") | None => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Some("list") => {
            for topology in Topology::ALL {
                println!("{topology}");
            }
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let result = match parse_args(&args) {
        Ok(invocation) => run(invocation).await,
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            print_help();
            Err(e)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Scenario failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Managed database end-to-end collections");
    println!();
    println!("USAGE:");
    println!("    dbaas-e2e <SCENARIO> [--seed <N>] [--log-format pretty|json]");
    println!("    dbaas-e2e all");
    println!("    dbaas-e2e list");
    println!();
    println!("SCENARIOS:");
    for topology in Topology::ALL {
        println!("    {topology}");
    }
    println!();
    println!("Configuration is read from the environment (.env supported) or dbaas.toml.");
    println!("Set RUST_LOG to adjust log verbosity.");
}

fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let mut args = args.iter();
    let scenario = args.next().ok_or_else(|| anyhow!("missing scenario"))?;
    let targets = if scenario == "all" {
        Topology::ALL.to_vec()
    } else {
        vec![scenario.parse::<Topology>()?]
    };

    let mut seed = None;
    let mut log_format = env::var("DBAAS_LOG_FORMAT")
        .ok()
        .map(|value| value.parse::<LogFormat>())
        .transpose()?
        .unwrap_or_default();

    while let Some(flag) = args.next() {
        let value = args.next().ok_or_else(|| anyhow!("{flag} needs a value"))?;
        match flag.as_str() {
            "--seed" => seed = Some(value.parse().with_context(|| format!("invalid seed '{value}'"))?),
            "--log-format" => log_format = value.parse()?,
            other => bail!("unknown option {other}"),
        }
    }

    Ok(Invocation { targets, seed, log_format })
}

async fn run(invocation: Invocation) -> anyhow::Result<()> {
    init_tracing(invocation.log_format);

    let config = config::load().context("loading configuration")?;
    let transport =
        Arc::new(ControlPlaneTransport::from_config(&config).context("building control-plane transport")?);
    info!(
        project_id = %config.project_id,
        region = %config.region,
        base_url = %config.base_url,
        "suite_configured"
    );

    let mut ctx = SuiteContext::new(config, transport);
    if let Some(seed) = invocation.seed {
        info!(seed, "random_seed_fixed");
        ctx = ctx.with_random(Arc::new(SeededRandom::new(seed)));
    }

    for topology in invocation.targets {
        let report = run_collection(&ctx, topology)
            .await
            .with_context(|| format!("scenario {topology}"))?;
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ScenarioReport) {
    println!();
    println!("==> {} passed", report.topology);
    if let Some(cluster) = &report.cluster {
        println!("    cluster {} (order {})", cluster.cluster_name, cluster.order_id);
    }
    for step in &report.steps {
        println!("    {:<18} {:>8.1}s  {}", step.name, step.elapsed.as_secs_f64(), step.outcome);
    }
    println!("    total {:.1}s", report.total_elapsed().as_secs_f64());
}
