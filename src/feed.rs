use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use chrono::{Local, Utc};

use crate::export;
use crate::pipeline::{self, Batch};
use crate::provider::EstimateSource;
use crate::state::{Delta, ExportFormat, ProviderCommand};

/// Worker thread owning the estimate source. Commands come in, deltas go out; the
/// loop ends when the UI drops its command sender.
pub fn spawn_provider(
    source: Box<dyn EstimateSource>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Fetch => run_fetch(source.as_ref(), &tx),
                ProviderCommand::Export {
                    path,
                    format,
                    batch,
                } => run_export(&path, format, &batch, &tx),
            }
        }
    })
}

pub fn run_fetch(source: &dyn EstimateSource, tx: &Sender<Delta>) {
    let name = source.name().to_string();
    let _ = tx.send(Delta::FetchStarted {
        source: name.clone(),
    });
    let _ = tx.send(Delta::Log(format!("[INFO] Requesting batch from {name}")));

    match source.fetch_batch() {
        Ok(records) => {
            let received = records.len();
            let (fixtures, estimates) =
                pipeline::assign_fixture_ids(records, Utc::now().timestamp_millis());
            let dropped = pipeline::unmatched_fixture_ids(&fixtures, &estimates);
            let results = pipeline::evaluate_batch(&fixtures, &estimates);
            let batch = Batch { fixtures, results };

            let _ = tx.send(Delta::Log(format!(
                "[INFO] {name}: {received} records, {} predictions, {} value bets",
                batch.results.len(),
                batch.value_bets()
            )));
            if !dropped.is_empty() {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] Dropped {} estimates without a fixture",
                    dropped.len()
                )));
            }
            let malformed = batch
                .fixtures
                .iter()
                .filter(|f| !f.odds.is_well_formed())
                .count();
            if malformed > 0 {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] {malformed} fixtures carry odds <= 1.0"
                )));
            }
            let _ = tx.send(Delta::SetBatch {
                source: name,
                fetched_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
                batch,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::FetchFailed(format!("{err:#}")));
        }
    }
}

fn run_export(path: &std::path::Path, format: ExportFormat, batch: &Batch, tx: &Sender<Delta>) {
    let result = match format {
        ExportFormat::Csv => export::write_csv(path, batch),
        ExportFormat::Xlsx => export::write_xlsx(path, batch),
    };
    match result {
        Ok(report) => {
            if report.skipped > 0 {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] Export skipped {} rows without a fixture",
                    report.skipped
                )));
            }
            let _ = tx.send(Delta::ExportFinished {
                path: report.path.display().to_string(),
                rows: report.rows,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::ExportFailed(format!("{err:#}")));
        }
    }
}
