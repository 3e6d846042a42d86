//! midimap - MIDI control surfaces as application events

use anyhow::Result;
use clap::Parser;
use midimap::config;
use midimap::engine::{list_input_ports, Emission, Engine, EventLog, InputPort, OutputEvent, Script};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Listen {
            config: config_path,
            port,
        } => {
            println!("Loading configuration from {:?}...", config_path);
            let cfg = config::load_config(&config_path)?;

            let mut engine = Engine::from_config(&cfg)?;
            let log = EventLog::new();
            engine.attach_log(&log);

            let port_name = port.or_else(|| cfg.host.port.clone());
            let input = InputPort::open(port_name.as_deref())?;
            println!("Listening on {} at {} fps (Ctrl-C to stop)", input.name(), cfg.host.frame_rate);

            let running = Arc::new(AtomicBool::new(true));
            let flag = Arc::clone(&running);
            ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

            let frame_time = Duration::from_secs_f32(cfg.host.frame_time());
            let mut last_values: HashMap<String, f32> = HashMap::new();
            let mut last_frame = Instant::now();

            while running.load(Ordering::SeqCst) {
                let frame_start = Instant::now();
                log.set_frame(engine.frame());

                // Hardware events first, then the frame tick
                for message in input.drain() {
                    engine.dispatch(message);
                }
                let dt = frame_start.duration_since(last_frame).as_secs_f32();
                last_frame = frame_start;
                engine.tick(dt);

                for emission in log.drain() {
                    if let OutputEvent::Value { value } = emission.event {
                        // Smoothed values repeat every frame; only show changes
                        if last_values.get(&emission.mapper) == Some(&value) {
                            continue;
                        }
                        last_values.insert(emission.mapper.clone(), value);
                    }
                    print_emission(&emission);
                }

                if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
                    std::thread::sleep(rest);
                }
            }

            println!("\nStopped after {} frames", engine.frame());
        }

        Commands::Replay {
            config: config_path,
            script,
        } => {
            let cfg = config::load_config(&config_path)?;
            let script = Script::load(&script)?;

            let mut engine = Engine::from_config(&cfg)?;
            let log = EventLog::new();
            engine.attach_log(&log);

            script.run(&mut engine, &log, cfg.host.frame_time())?;

            for emission in log.drain() {
                println!("{}", serde_json::to_string(&emission)?);
            }
        }

        Commands::Ports => {
            println!("Available MIDI input ports:\n");

            match list_input_ports() {
                Ok(ports) if ports.is_empty() => println!("  (none)"),
                Ok(ports) => {
                    for (i, name) in ports.iter().enumerate() {
                        println!("  {}: {}", i, name);
                    }
                }
                Err(e) => println!("  Error listing ports: {}", e),
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Frame rate: {} fps", cfg.host.frame_rate);
                    println!("  Port: {}", cfg.host.port.as_deref().unwrap_or("(first available)"));
                    println!("  Knobs: {}", cfg.knobs.len());
                    for knob in &cfg.knobs {
                        println!(
                            "    - {} (channel {}, cc {}) {:?}",
                            knob.name, knob.channel, knob.knob, knob.mode
                        );
                    }
                    println!("  Notes: {}", cfg.notes.len());
                    for note in &cfg.notes {
                        println!(
                            "    - {} (channel {}, {:?}) {:?}",
                            note.name, note.channel, note.filter, note.mode
                        );
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "midimap.yaml";
            if std::path::Path::new(path).exists() {
                println!("midimap.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, config::EXAMPLE_CONFIG)?;
                println!("Created midimap.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

fn print_emission(emission: &Emission) {
    let detail = match emission.event {
        OutputEvent::Value { value } => format!("value {:.4}", value),
        OutputEvent::Trigger => "trigger".to_string(),
        OutputEvent::TriggerVelocity { velocity } => format!("trigger {:.3}", velocity),
        OutputEvent::ToggleOn => "toggle on".to_string(),
        OutputEvent::ToggleOff => "toggle off".to_string(),
        OutputEvent::NoteOn { note, velocity } => format!("note on {} {:.3}", note, velocity),
        OutputEvent::NoteOff { note } => format!("note off {}", note),
    };
    println!("{:>8}  {:<16} {}", emission.frame, emission.mapper, detail);
}
