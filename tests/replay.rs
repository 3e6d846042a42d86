//! End-to-end: configuration file, engine, replay script, emissions

use midimap::config::parse_config;
use midimap::engine::{Engine, EventLog, MidiMessage, OutputEvent, Script};
use std::io::Write;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
host:
  frame_rate: 50

knobs:
  - name: level
    channel: 0
    knob: 7
    mode:
      type: value
      low: 0.0
      high: 10.0
      smoothing:
        kind: exponential
        speed: 10.0
  - name: mute
    knob: 8
    mode:
      type: toggle

notes:
  - name: pads
    channel: 9
    filter:
      type: note_name
      name: c
    mode:
      type: gate
      voice: poly
"#;

const SCRIPT: &str = r#"
- type: knob
  channel: 0
  number: 7
  value: 1.0
- type: knob
  channel: 0
  number: 8
  value: 1.0
- type: note_on
  channel: 9
  note: 36
  velocity: 1.0
- type: note_on
  channel: 9
  note: 37
  velocity: 1.0
- type: note_on
  channel: 9
  note: 48
  velocity: 0.5
- type: note_off
  channel: 9
  note: 36
- type: tick
  frames: 200
"#;

fn values_of(log: &[midimap::engine::Emission], mapper: &str) -> Vec<f32> {
    log.iter()
        .filter(|e| e.mapper == mapper)
        .filter_map(|e| match e.event {
            OutputEvent::Value { value } => Some(value),
            _ => None,
        })
        .collect()
}

#[test]
fn test_replay_from_files() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SCRIPT.as_bytes()).unwrap();

    let config = parse_config(CONFIG).unwrap();
    let script = Script::load(file.path()).unwrap();

    let mut engine = Engine::from_config(&config).unwrap();
    let log = EventLog::new();
    engine.attach_log(&log);
    script.run(&mut engine, &log, config.host.frame_time()).unwrap();

    let entries = log.drain();

    // One value per frame, rising steadily toward the top of the range
    let levels = values_of(&entries, "level");
    assert_eq!(levels.len(), 200);
    assert!(levels.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(*levels.last().unwrap(), 10.0);

    let discrete: Vec<_> = entries
        .iter()
        .filter(|e| e.mapper != "level")
        .map(|e| (e.mapper.as_str(), e.event))
        .collect();
    assert_eq!(
        discrete,
        vec![
            ("mute", OutputEvent::ToggleOn),
            ("pads", OutputEvent::NoteOn { note: 36, velocity: 1.0 }),
            ("pads", OutputEvent::NoteOn { note: 48, velocity: 0.5 }),
            ("pads", OutputEvent::NoteOff { note: 36 }),
        ]
    );
}

#[test]
fn test_raw_bytes_reach_mappers() {
    let config = parse_config(CONFIG).unwrap();
    let engine = Engine::from_config(&config).unwrap();
    let log = EventLog::new();
    engine.attach_log(&log);

    for bytes in [[0xB0u8, 8, 127], [0xB0, 8, 0], [0xB1, 8, 127], [0x99, 60, 100], [0x99, 60, 0]] {
        if let Some(message) = MidiMessage::parse(&bytes) {
            engine.dispatch(message);
        }
    }

    let events: Vec<_> = log.drain().into_iter().map(|e| e.event).collect();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], OutputEvent::ToggleOn);
    // Channel 1 is accepted too: mute listens on every channel
    assert_eq!(events[1], OutputEvent::ToggleOff);
    assert!(matches!(events[2], OutputEvent::NoteOn { note: 60, .. }));
    assert_eq!(events[3], OutputEvent::NoteOff { note: 60 });
}
