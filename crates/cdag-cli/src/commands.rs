use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use cdag_chunk::{ChunkDescriptor, ChunkManager, Completeness, Report, StoreStats};
use cdag_store::DualStore;
use cdag_types::ChunkId;
use colored::Colorize;
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let manager = open_manager(&config)?;
    let format = cli.format;

    match cli.command {
        Command::Put(args) => cmd_put(&manager, &args.source, format).await,
        Command::Get(args) => cmd_get(&manager, &args, format).await,
        Command::Stat => cmd_stat(&manager, format).await,
        Command::Watch(_) => cmd_watch(&manager, format).await,
    }
}

/// Load the configuration file and apply command-line overrides on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Command::Watch(WatchArgs { interval: Some(secs) }) = &cli.command {
        config.manager.report_interval_ms = secs.saturating_mul(1000);
    }
    config.validate()?;
    Ok(config)
}

fn open_manager(config: &CliConfig) -> anyhow::Result<ChunkManager> {
    let store = DualStore::open(&config.data_dir, config.log.clone())
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    Ok(ChunkManager::new(store, config.manager.clone()))
}

fn read_source(source: &Path) -> anyhow::Result<Vec<u8>> {
    if source == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read(source).with_context(|| format!("reading {}", source.display()))
    }
}

async fn cmd_put(manager: &ChunkManager, source: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let payload = read_source(source)?;
    let descriptor = manager.store(payload).await?;
    println!("{}", render_descriptor(&descriptor, format, false));
    Ok(())
}

async fn cmd_get(manager: &ChunkManager, args: &GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id: ChunkId = args.id.parse().with_context(|| format!("invalid chunk id {:?}", args.id))?;
    let descriptor = manager.retrieve(&id).await?;
    if args.raw {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&descriptor.payload)?;
        stdout.flush()?;
    } else {
        println!("{}", render_descriptor(&descriptor, format, true));
    }
    Ok(())
}

async fn cmd_stat(manager: &ChunkManager, format: OutputFormat) -> anyhow::Result<()> {
    let stats = manager.stats().await?;
    println!("{}", render_stats(&stats, format));
    Ok(())
}

async fn cmd_watch(manager: &ChunkManager, format: OutputFormat) -> anyhow::Result<()> {
    let interval = manager.config().report_interval();
    if format == OutputFormat::Text {
        println!("Reporting every {:?}; press Ctrl-C to stop.", interval);
    }

    let mut handle = manager.spawn_reporter();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            report = handle.next_report() => match report {
                Some(report) => println!("{}", render_report(&report, format)),
                None => break,
            },
        }
    }
    handle.shutdown().await;
    Ok(())
}

pub fn render_descriptor(d: &ChunkDescriptor, format: OutputFormat, with_payload: bool) -> String {
    match format {
        OutputFormat::Json => {
            let mut value = json!({
                "id": d.id.to_hex(),
                "completeness": d.completeness,
                "payload_len": d.payload.len(),
            });
            if with_payload {
                value["payload_hex"] = json!(hex::encode(&d.payload));
            }
            value.to_string()
        }
        OutputFormat::Text => {
            let state = match d.completeness {
                Completeness::Complete { depth, size } => {
                    format!("{} depth={depth} size={size}", "complete".green())
                }
                Completeness::Incomplete => "incomplete".yellow().to_string(),
            };
            let mut out = format!(
                "{} {}  {}  ({} bytes)",
                "✓".green().bold(),
                d.id.to_hex().cyan(),
                state,
                d.payload.len()
            );
            if with_payload {
                out.push('\n');
                out.push_str(&String::from_utf8_lossy(&d.payload));
            }
            out
        }
    }
}

pub fn render_stats(stats: &StoreStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json!(stats).to_string(),
        OutputFormat::Text => format!(
            "Complete chunks: {}\nIncomplete chunks: {}",
            stats.complete.to_string().bold(),
            stats.incomplete.to_string().bold()
        ),
    }
}

pub fn render_report(report: &Report, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json!({
            "count": report.count,
            "delta": report.delta,
            "elapsed_ms": report.elapsed.as_secs_f64() * 1000.0,
        })
        .to_string(),
        OutputFormat::Text => report.to_string(),
    }
}
