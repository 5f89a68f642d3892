// src/replay.rs
//
// Offline driver: feeds recorded tick streams (one JSON object per line)
// through the controller and records every published status report.

use crate::config::Config;
use crate::maneuver::OvertakeController;
use crate::pipeline::{ControllerEvent, EventBus, MetricsSummary, RawTick};
use crate::signals::TagReader;
use anyhow::{Context, Result};
use serde_json::json;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const RECORDING_EXTENSION: &str = "jsonl";

#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub status_reports: usize,
    pub speed_pulses: usize,
    pub final_phase: String,
    pub output_path: Option<PathBuf>,
    pub metrics: Option<MetricsSummary>,
}

pub struct Replayer {
    config: Config,
}

impl Replayer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn find_recordings(&self) -> Result<Vec<PathBuf>> {
        let mut recordings = Vec::new();

        for entry in WalkDir::new(&self.config.replay.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(RECORDING_EXTENSION)
            {
                recordings.push(path.to_path_buf());
            }
        }

        recordings.sort();
        info!("Found {} recording(s)", recordings.len());
        Ok(recordings)
    }

    fn output_path(&self, input: &Path) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid recording name: {}", input.display()))?;
        Ok(PathBuf::from(&self.config.replay.output_dir).join(format!("{}_status.jsonl", stem)))
    }

    pub fn replay_file(&self, path: &Path) -> Result<ReplayStats> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open recording {}", path.display()))?;

        std::fs::create_dir_all(&self.config.replay.output_dir)?;
        let output_path = self.output_path(path)?;
        let mut writer = BufWriter::new(
            File::create(&output_path)
                .with_context(|| format!("Failed to create {}", output_path.display()))?,
        );
        info!("Status output: {}", output_path.display());

        let mut reader = TagReader::new();
        let mut controller = OvertakeController::new(EventBus::default(), 0.0);
        let takeover = controller.takeover_handle();
        let mut stats = ReplayStats::default();

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Skipping line {} of {}: {}", idx + 1, path.display(), e);
                    stats.lines_read += 1;
                    stats.lines_skipped += 1;
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to read {}", path.display()))
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            stats.lines_read += 1;

            let raw: RawTick = match serde_json::from_str(&line) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping line {} of {}: {}", idx + 1, path.display(), e);
                    stats.lines_skipped += 1;
                    continue;
                }
            };

            if raw.takeover {
                takeover.notify();
            }

            let input = raw.decode(&mut reader);
            controller.tick(&self.config.overtake, &input);

            for event in controller.bus_mut().drain() {
                match event {
                    ControllerEvent::Status { active, report } => {
                        let record = json!({ "now": raw.now, "active": active, "report": report });
                        serde_json::to_writer(&mut writer, &record)?;
                        writer.write_all(b"\n")?;
                        stats.status_reports += 1;
                    }
                    ControllerEvent::SpeedPulse { active: true, .. } => stats.speed_pulses += 1,
                    other => debug!("t={:.2} {:?}", raw.now, other),
                }
            }
        }

        writer.flush()?;

        stats.final_phase = controller.phase().as_str().to_string();
        stats.output_path = Some(output_path);
        stats.metrics = Some(controller.metrics().summary());
        Ok(stats)
    }
}
