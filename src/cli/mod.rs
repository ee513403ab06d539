//! CLI Module
//!
//! Command-line interface for checking and simulating layered music scenes.

pub mod commands;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::error::LayerFadeError;

/// Layerfade - synchronized music layers with crossfades
#[derive(Parser, Debug)]
#[command(name = "layerfade")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default scene configuration
    #[command(name = "init-config")]
    InitConfig {
        /// Where to write the configuration
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Resolve every layer against the asset directory
    #[command(name = "check")]
    Check {
        /// Scene configuration (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory searched for <layer name>.wav files
        #[arg(short, long)]
        assets: PathBuf,
    },

    /// Drive a scene with scripted triggers and print layer gains
    #[command(name = "simulate")]
    Simulate {
        /// Scene configuration (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory searched for <layer name>.wav files; virtual
        /// tracks are used when omitted
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Seconds per tick
        #[arg(long, default_value_t = 0.5)]
        dt: f32,

        /// Seconds to simulate
        #[arg(short, long, default_value_t = 10.0)]
        seconds: f32,

        /// Trigger a layer at a time, as <layer>@<seconds> (repeatable)
        #[arg(short, long = "trigger")]
        triggers: Vec<TriggerAt>,

        /// Print one JSON object per tick
        #[arg(long)]
        json: bool,
    },
}

/// A scripted trigger: layer id and the scene time it fires at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerAt {
    pub layer: usize,
    pub at_secs: f32,
}

impl FromStr for TriggerAt {
    type Err = LayerFadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LayerFadeError::InvalidTrigger {
            input: s.to_string(),
        };

        let (layer, at) = s.split_once('@').ok_or_else(invalid)?;
        let layer = layer.trim().parse::<usize>().map_err(|_| invalid())?;
        let at_secs = at.trim().parse::<f32>().map_err(|_| invalid())?;
        if !at_secs.is_finite() || at_secs < 0.0 {
            return Err(invalid());
        }

        Ok(Self { layer, at_secs })
    }
}
