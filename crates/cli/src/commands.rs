//! Subcommand implementations.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use cellscope_compute::DiagnosticEngine;
use cellscope_core::Config;
use cellscope_ingest::{
    is_known_vehicle, MockBatteryGenerator, PackLayout, QuickScan, StreamOptions, TelemetryStream,
    VEHICLES,
};
use cellscope_llm::FixAdvisor;
use cellscope_storage::{HistoryStore, ScanHistoryItem};

use crate::cli::{HistoryCommand, ScanArgs, SuggestArgs};
use crate::terminal::Terminal;

fn history_store(config: &Config) -> HistoryStore {
    HistoryStore::new(&config.storage.data_dir, config.storage.history_limit)
}

pub async fn scan(config: &Config, args: ScanArgs, terminal: &Terminal) -> Result<()> {
    if !is_known_vehicle(&args.vehicle) {
        bail!(
            "unknown vehicle '{}', expected one of: {}",
            args.vehicle,
            VEHICLES.join(", ")
        );
    }

    let seed = args.seed.or(config.telemetry.seed);
    let layout = PackLayout::with_cells(config.telemetry.cell_count);
    let generator = MockBatteryGenerator::from_seed(layout, seed);
    let mut engine = DiagnosticEngine::from_seed(seed.map(|s| s.wrapping_add(1)));
    let mut quick = args
        .quick
        .then(|| QuickScan::from_seed(seed.map(|s| s.wrapping_add(2))));

    let options = StreamOptions {
        interval: args
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.telemetry.interval()),
        cycle: args.count != 1,
        ..StreamOptions::default()
    };
    let mut stream = TelemetryStream::spawn(generator, options);

    let mut taken = 0u32;
    let mut last = None;
    while args.count == 0 || taken < args.count {
        let mut snapshot = tokio::select! {
            next = stream.next() => match next {
                Some(snapshot) => snapshot,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted after {} snapshots", taken);
                break;
            }
        };
        taken += 1;

        if let Some(quick) = quick.as_mut() {
            let refined = quick.refine(snapshot.state_of_health);
            info!(
                "quick scan refined SoH {:.1}% -> {:.2}%",
                snapshot.state_of_health, refined
            );
            snapshot.state_of_health = refined;
        }

        let report = engine.analyze(&snapshot)?;
        if args.json {
            let line = json!({ "vehicle": args.vehicle, "snapshot": snapshot, "report": report });
            println!("{}", serde_json::to_string(&line)?);
        } else {
            terminal.print_scan(taken, &args.vehicle, &snapshot, &report)?;
        }
        last = Some((snapshot, report));
    }
    stream.stop();

    if args.save {
        let Some((snapshot, report)) = last else {
            bail!("no snapshot was taken, nothing to save");
        };
        let item = ScanHistoryItem::new(
            args.vehicle.clone(),
            snapshot,
            report.verdict,
            report.anomaly_count(),
            Utc::now(),
        );
        let id = item.id.clone();
        let items = history_store(config).save(item)?;
        if !args.json {
            terminal.print_notice(&format!("Saved scan {} ({} in history)", id, items.len()))?;
        }
    }

    Ok(())
}

pub fn history(config: &Config, command: HistoryCommand, terminal: &Terminal) -> Result<()> {
    let store = history_store(config);
    match command {
        HistoryCommand::List { json } => {
            let items = store.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                terminal.print_history(&items)?;
            }
        }
        HistoryCommand::Clear => {
            store.clear()?;
            terminal.print_notice("Scan history cleared.")?;
        }
    }
    Ok(())
}

/// Re-diagnose a stored scan and ask the advisor about one of its cells.
pub async fn suggest(config: &Config, args: SuggestArgs, terminal: &Terminal) -> Result<()> {
    let item = history_store(config)
        .get(args.index)
        .with_context(|| format!("no saved scan at index {}", args.index))?;

    let report = DiagnosticEngine::from_seed(config.telemetry.seed).analyze(&item.data)?;
    let cell = report
        .cell(args.cell)
        .with_context(|| format!("scan {} has no cell {}", item.id, args.cell))?;

    let advisor = FixAdvisor::from_config(&config.llm).context("failed to create advisor")?;
    let text = advisor.suggest(cell, &item.vehicle).await?;
    terminal.print_suggestion(cell, &item.vehicle, &text)?;
    Ok(())
}
