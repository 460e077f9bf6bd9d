mod cli;
mod data_loader;
mod report;

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::BufWriter;

use anyhow::Context;
use serde_json::Value;
use tracing::info;
use vol_core::{DiurnalAnalyzer, PriceSeries, VolConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vol_cli=info,vol_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = build_config(&args)?;
    info!(?config, "configuration");

    let mut excluded = BTreeSet::new();
    for path in &args.exclude {
        excluded.extend(data_loader::read_exclusions(path)?);
    }

    let days = data_loader::load_days(&args.input, &args.asset, &excluded)?;
    let series: Vec<PriceSeries> = days.into_iter().map(|d| d.series).collect();
    let analyzer = DiurnalAnalyzer::new(config)?;

    let report = match args.threads {
        Some(n) => configure_thread_pool(n)?.install(|| analyzer.run(&series))?,
        None => analyzer.run(&series)?,
    };

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
            report::write_patterns(&report, BufWriter::new(file))?;
            info!(?path, "pattern written");
        }
        None => report::write_patterns(&report, std::io::stdout().lock())?,
    }
    eprintln!("{}", report::summary(&report));
    Ok(())
}

/// Config file first, command-line flags on top
fn build_config(args: &cli::Args) -> anyhow::Result<VolConfig> {
    let mut conf: HashMap<String, Value> = match &args.config {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))?
        }
        None => HashMap::new(),
    };
    if let Some(window) = args.window {
        conf.insert("window".to_string(), Value::from(window));
    }
    if let Some(method) = &args.truncation_method {
        conf.insert("truncation_method".to_string(), Value::from(method.as_str()));
    }
    if let Some(window_pattern) = args.window_pattern {
        conf.insert("window_pattern".to_string(), Value::from(window_pattern));
    }
    if let Some(subsampling) = args.subsampling {
        conf.insert("subsampling".to_string(), Value::from(subsampling));
    }
    Ok(VolConfig::new(Some(conf))?)
}

fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}
