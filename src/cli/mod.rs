//! CLI interface for midimap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turn MIDI knobs and notes into application events
#[derive(Parser)]
#[command(name = "midimap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Listen to a MIDI input port and print mapped events until Ctrl-C
    Listen {
        /// Configuration file path
        #[arg(short, long, default_value = "midimap.yaml")]
        config: PathBuf,

        /// Input port name (overrides the configuration)
        #[arg(short, long)]
        port: Option<String>,
    },

    /// Run a replay script and print mapped events as JSON lines
    Replay {
        /// Configuration file path
        #[arg(short, long, default_value = "midimap.yaml")]
        config: PathBuf,

        /// Replay script path
        #[arg(short, long)]
        script: PathBuf,
    },

    /// List available MIDI input ports
    Ports,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "midimap.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
