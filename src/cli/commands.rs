//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::cli::TriggerAt;
use crate::config::FaderConfig;
use crate::dispatch::TriggerOutcome;
use crate::engine::{OutputResolver, VirtualResolver, WavResolver};
use crate::error::{LayerFadeError, Result};
use crate::scene::{LayeredMusic, SceneSnapshot};

/// Track length used for virtual layers when no assets are given
const VIRTUAL_TRACK_SECS: f64 = 16.0;

/// Upper bound on simulated ticks; every frame is kept in memory
pub const MAX_SIMULATION_TICKS: usize = 100_000;

/// Load the configuration at `path`, or the default scene
pub fn load_config(path: Option<&Path>) -> Result<FaderConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            FaderConfig::load(path)
        }
        None => Ok(FaderConfig::default()),
    }
}

/// Write a default configuration.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(LayerFadeError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists (use --force to overwrite)", path.display()),
        )));
    }

    FaderConfig::default().save(path)?;
    println!("Configuration written: {}", path.display());
    Ok(())
}

/// Resolve and start every layer, then report what was found.
pub fn check(config_path: Option<&Path>, assets: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let mut resolver = WavResolver::new(assets);

    // Report every layer before starting, so one run lists all missing assets
    let mut missing = 0;
    for (index, layer) in config.layers.iter().enumerate() {
        match resolver.find_asset(&layer.name) {
            Some(path) => println!("  layer {}: {} -> {}", index + 1, layer.name, path.display()),
            None => {
                missing += 1;
                println!("  layer {}: {} -> MISSING", index + 1, layer.name);
            }
        }
    }
    if missing > 0 {
        warn!(missing, "some layers could not be resolved");
    }

    let scene = LayeredMusic::start(config, &mut resolver)?;
    println!("{:-<60}", "");
    for layer in scene.bus().layers() {
        println!("  layer {} ready: {}", layer.id(), layer.name());
    }
    println!("All {} layers resolved.", scene.bus().len());
    scene.shutdown();
    Ok(())
}

// ============================================================================
// Simulation
// ============================================================================

/// A trigger fired during simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredTrigger {
    pub layer: usize,
    pub outcome: TriggerOutcome,
}

/// State after one simulated tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationFrame {
    /// Triggers fired just before this tick
    pub triggers: Vec<FiredTrigger>,
    #[serde(flatten)]
    pub scene: SceneSnapshot,
}

/// Run a scripted scene and collect one frame per tick
///
/// Triggers fire before the first tick whose start time has reached
/// their `at_secs`, in the order given.
pub fn run_simulation(
    config: FaderConfig,
    resolver: &mut dyn OutputResolver,
    triggers: &[TriggerAt],
    dt: f32,
    seconds: f32,
) -> Result<Vec<SimulationFrame>> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(LayerFadeError::InvalidConfig {
            reason: format!("tick length must be positive, got {}", dt),
        });
    }
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(LayerFadeError::InvalidConfig {
            reason: format!("simulation length must not be negative, got {}", seconds),
        });
    }

    let ticks = (seconds / dt).ceil();
    if ticks > MAX_SIMULATION_TICKS as f32 {
        return Err(LayerFadeError::InvalidConfig {
            reason: format!(
                "{}s at {}s per tick needs more than {} ticks",
                seconds, dt, MAX_SIMULATION_TICKS
            ),
        });
    }
    let ticks = ticks as usize;

    let mut scene = LayeredMusic::start(config, resolver)?;
    let mut pending: Vec<TriggerAt> = triggers.to_vec();
    // Stable sort keeps the given order for equal times
    pending.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
    let mut pending = pending.into_iter().peekable();

    let mut frames = Vec::with_capacity(ticks);

    for _ in 0..ticks {
        let now = scene.time_secs();
        let mut fired = Vec::new();
        while let Some(trigger) = pending.next_if(|t| f64::from(t.at_secs) <= now + 1e-6) {
            let outcome = scene.trigger(trigger.layer);
            fired.push(FiredTrigger {
                layer: trigger.layer,
                outcome,
            });
        }

        scene.tick(dt);
        frames.push(SimulationFrame {
            triggers: fired,
            scene: scene.snapshot(),
        });
    }

    scene.shutdown();
    Ok(frames)
}

/// Simulate a scene and print the gain table.
pub fn simulate(
    config_path: Option<&Path>,
    assets: Option<&Path>,
    triggers: &[TriggerAt],
    dt: f32,
    seconds: f32,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    let frames = match assets {
        Some(dir) => run_simulation(config, &mut WavResolver::new(dir), triggers, dt, seconds)?,
        None => run_simulation(
            config,
            &mut VirtualResolver::any(VIRTUAL_TRACK_SECS),
            triggers,
            dt,
            seconds,
        )?,
    };

    if json {
        for frame in &frames {
            println!("{}", serde_json::to_string(frame)?);
        }
        return Ok(());
    }

    for frame in &frames {
        for fired in &frame.triggers {
            println!("  >> trigger layer {}: {}", fired.layer, fired.outcome);
        }
        let layers: Vec<String> = frame
            .scene
            .layers
            .iter()
            .map(|l| format!("L{} {:.4} {:<9}", l.id, l.gain, l.state.to_string()))
            .collect();
        println!("t={:>7.3}s  {}", frame.scene.time_secs, layers.join(" | "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardScope;
    use crate::layers::TransitionState;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn trigger(layer: usize, at_secs: f32) -> TriggerAt {
        TriggerAt { layer, at_secs }
    }

    #[test]
    fn test_simulation_frames_per_tick() {
        let config = FaderConfig::default().with_durations(2.0, 2.0);
        let frames = run_simulation(
            config,
            &mut VirtualResolver::any(8.0),
            &[trigger(1, 0.0)],
            0.5,
            3.0,
        )
        .unwrap();

        assert_eq!(frames.len(), 6);
        assert_eq!(
            frames[0].triggers,
            vec![FiredTrigger {
                layer: 1,
                outcome: TriggerOutcome::FadeIn
            }]
        );
        assert_eq!(frames[0].scene.layers[0].gain, 0.0);
        assert_relative_eq!(frames[1].scene.layers[0].gain, 0.25);
        assert_relative_eq!(frames[2].scene.layers[0].gain, 0.625);
        assert_relative_eq!(frames[3].scene.layers[0].gain, 0.90625);
        assert_eq!(frames[3].scene.layers[0].state, TransitionState::Idle);
        assert_relative_eq!(frames[5].scene.time_secs, 3.0);
    }

    #[test]
    fn test_simulation_reports_busy_triggers() {
        let config = FaderConfig::default()
            .with_durations(2.0, 2.0)
            .with_guard_scope(GuardScope::Global);
        let frames = run_simulation(
            config,
            &mut VirtualResolver::any(8.0),
            &[trigger(2, 0.5), trigger(1, 0.0)],
            0.5,
            2.0,
        )
        .unwrap();

        assert_eq!(frames[0].triggers[0].outcome, TriggerOutcome::FadeIn);
        assert_eq!(frames[1].triggers[0].layer, 2);
        assert_eq!(frames[1].triggers[0].outcome, TriggerOutcome::Busy);
    }

    #[test]
    fn test_simulation_rejects_bad_tick() {
        let result = run_simulation(
            FaderConfig::default(),
            &mut VirtualResolver::any(8.0),
            &[],
            0.0,
            1.0,
        );
        assert!(matches!(result, Err(LayerFadeError::InvalidConfig { .. })));
    }

    #[test]
    fn test_simulation_rejects_unbounded_tick_count() {
        let result = run_simulation(
            FaderConfig::default(),
            &mut VirtualResolver::any(8.0),
            &[],
            1e-30,
            1e30,
        );
        assert!(matches!(result, Err(LayerFadeError::InvalidConfig { .. })));

        let at_limit = run_simulation(
            FaderConfig::default(),
            &mut VirtualResolver::any(8.0),
            &[],
            0.5,
            MAX_SIMULATION_TICKS as f32 / 2.0 + 1.0,
        );
        assert!(at_limit.is_err());

        let within = run_simulation(
            FaderConfig::default(),
            &mut VirtualResolver::any(8.0),
            &[],
            0.5,
            50.0,
        )
        .unwrap();
        assert_eq!(within.len(), 100);
    }

    #[test]
    fn test_simulation_frame_json_is_flat() {
        let frames = run_simulation(
            FaderConfig::default(),
            &mut VirtualResolver::any(8.0),
            &[],
            1.0,
            1.0,
        )
        .unwrap();
        let value = serde_json::to_value(&frames[0]).unwrap();
        assert!(value.get("time_secs").is_some());
        assert_eq!(value["layers"].as_array().unwrap().len(), 3);
        assert_eq!(value["layers"][0]["state"], "idle");
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.json");

        init_config(&path, false).unwrap();
        let err = init_config(&path, false).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(!err.is_fatal());
        init_config(&path, true).unwrap();

        let loaded = load_config(Some(path.as_path())).unwrap();
        assert_eq!(loaded, FaderConfig::default());
    }

    #[test]
    fn test_check_missing_assets_is_fatal() {
        let dir = tempdir().unwrap();
        let err = check(None, dir.path()).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), "MISSING_OUTPUT");
    }
}
