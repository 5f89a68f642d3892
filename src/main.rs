// src/main.rs

use anyhow::Result;
use auto_overtake::config::Config;
use auto_overtake::replay::Replayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::load("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("auto_overtake={}", config.logging.level))),
        )
        .init();

    info!("🚗 Auto Overtake Replay Starting");
    info!("✓ Configuration loaded");
    info!(
        "Overtake settings: side={:?}, min_speed={:.0} km/h, max_lead={:.0} m, hold={:.1} s, boost={:.0} km/h",
        config.overtake.preferred_side,
        config.overtake.min_speed_kph,
        config.overtake.max_lead_distance_m,
        config.overtake.hold_duration_s,
        config.overtake.overtake_speed_boost_kph
    );

    let replayer = Replayer::new(config.clone());
    let recordings = replayer.find_recordings()?;

    if recordings.is_empty() {
        error!("No recordings found in {}", config.replay.input_dir);
        return Ok(());
    }

    for (idx, path) in recordings.iter().enumerate() {
        info!("========================================");
        info!(
            "Replaying recording {}/{}: {}",
            idx + 1,
            recordings.len(),
            path.display()
        );
        info!("========================================");

        match replayer.replay_file(path) {
            Ok(stats) => {
                info!("✓ Recording replayed");
                info!(
                    "  Ticks: {} ({} malformed line(s) skipped)",
                    stats.lines_read - stats.lines_skipped,
                    stats.lines_skipped
                );
                if let Some(m) = &stats.metrics {
                    info!("  🚀 Maneuvers started: {}", m.maneuvers_started);
                    info!("  ✅ Completed: {}", m.maneuvers_completed);
                    info!("  ⚠️  Aborted: {}", m.maneuvers_aborted);
                    info!("  🛑 Takeovers: {}", m.takeovers);
                    info!("  💡 Indicator pulses: {}", m.indicator_pulses);
                }
                info!("  ⏩ Speed pulses: {}", stats.speed_pulses);
                info!("  Final phase: {}", stats.final_phase);
                if let Some(out) = &stats.output_path {
                    info!("  Status reports: {} → {}", stats.status_reports, out.display());
                }
            }
            Err(e) => error!("Failed to replay {}: {:#}", path.display(), e),
        }
    }

    Ok(())
}
