//! Replay a recorded gesture script through the engine and print the events.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use kurbo::{Point, Size, Vec2};
use serde::Deserialize;
use sketchframe_core::{
    Engine, EngineConfig, EngineEvent, Frame, Modifiers, MouseButton, SerializableColor,
    ShortcutRegistry, Stroke, TextBox,
};

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] sketchframe_core::ConfigError),
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sketchframe-replay", about = "Drive the SketchFrame engine from a gesture script")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a script and print one JSON event per line.
    Run {
        script: PathBuf,
        /// Print the final board as JSON after the events.
        #[arg(long)]
        board: bool,
    },
    /// List keyboard shortcuts.
    Shortcuts,
}

/// A gesture script.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Script {
    config: Option<EngineConfig>,
    viewport: Option<Size>,
    frames: Vec<Frame>,
    strokes: Vec<Stroke>,
    text_boxes: Vec<TextBox>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    /// Offset from the start of the replay.
    #[serde(default)]
    at_ms: u64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Action {
    Tool {
        tool: String,
    },
    Color {
        color: SerializableColor,
    },
    Width {
        width: f64,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default = "left_button")]
        button: MouseButton,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default = "left_button")]
        button: MouseButton,
    },
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Tick,
    FitToScreen,
}

fn left_button() -> MouseButton {
    MouseButton::Left
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ReplayError> {
    match cli.command {
        Command::Run { script, board } => {
            let source = fs::read_to_string(&script).map_err(|source| ReplayError::Read {
                path: script.clone(),
                source,
            })?;
            let script: Script = serde_json::from_str(&source)?;
            log::info!("replaying {} steps", script.steps.len());

            let (engine, events) = replay(script)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for event in &events {
                writeln!(out, "{}", serde_json::to_string(event)?)?;
            }
            if board {
                writeln!(out, "{}", engine.board.to_json()?)?;
            }
        }
        Command::Shortcuts => {
            for line in ShortcutRegistry::describe_all() {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Build an engine from the script and feed it every step in order.
fn replay(script: Script) -> Result<(Engine, Vec<EngineEvent>), ReplayError> {
    let mut engine = Engine::new(script.config.unwrap_or_default())?;
    engine.set_viewport(script.viewport.unwrap_or(Size::new(1280.0, 800.0)));
    engine.set_frames(script.frames);
    engine.load_strokes(script.strokes);
    engine.set_text_boxes(script.text_boxes);

    let start = Instant::now();
    let mut events = Vec::new();
    for step in script.steps {
        let now = start + Duration::from_millis(step.at_ms);
        let produced = match step.action {
            Action::Tool { tool } => {
                if !engine.set_tool_by_name(&tool) {
                    return Err(ReplayError::UnknownTool(tool));
                }
                Vec::new()
            }
            Action::Color { color } => {
                engine.set_color(color);
                Vec::new()
            }
            Action::Width { width } => {
                engine.set_stroke_width(width);
                Vec::new()
            }
            Action::PointerDown { x, y, button } => engine.pointer_down(Point::new(x, y), button, now),
            Action::PointerMove { x, y } => engine.pointer_move(Point::new(x, y)),
            Action::PointerUp { x, y, button } => engine.pointer_up(Point::new(x, y), button),
            Action::Wheel { x, y, delta_y } => engine.wheel(Point::new(x, y), Vec2::new(0.0, delta_y)),
            Action::KeyDown { key, modifiers } => engine.key_down(&key, modifiers, now),
            Action::KeyUp { key, modifiers } => engine.key_up(&key, modifiers),
            Action::Tick => engine.tick(now),
            Action::FitToScreen => engine.fit_to_screen(),
        };
        events.extend(produced);
    }

    Ok((engine, events))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Script {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_replay_pen_stroke() {
        let script = parse(
            r#"{
                "steps": [
                    { "action": "tool", "tool": "pen" },
                    { "action": "pointer_down", "x": 0, "y": 0 },
                    { "action": "pointer_move", "x": 20, "y": 0 },
                    { "action": "pointer_up", "x": 20, "y": 0 }
                ]
            }"#,
        );
        let (engine, events) = replay(script).unwrap();
        let kinds: Vec<&str> = events.iter().map(EngineEvent::kind).collect();
        assert_eq!(
            kinds,
            vec!["stroke_started", "cursor_moved", "stroke_updated", "stroke_finalized"]
        );
        assert_eq!(engine.board.stroke_count(), 1);
    }

    #[test]
    fn test_replay_frame_with_config() {
        let script = parse(
            r#"{
                "config": { "min_frame_size": 50 },
                "steps": [
                    { "action": "tool", "tool": "frame" },
                    { "action": "pointer_down", "x": 0, "y": 0 },
                    { "action": "pointer_move", "x": 30, "y": 40 },
                    { "action": "pointer_up", "x": 30, "y": 40 }
                ]
            }"#,
        );
        let (engine, _) = replay(script).unwrap();
        assert!(engine.board.frames().is_empty());
    }

    #[test]
    fn test_replay_timed_auto_switch() {
        let script = parse(
            r#"{
                "strokes": [
                    { "id": "7f7c1f2e-3b0c-4b0b-9b5d-4f3a4f8c2a11", "points": [0, 0, 100, 0],
                      "tool": "pen", "stroke_width": 2, "color": { "r": 0, "g": 0, "b": 0, "a": 255 } }
                ],
                "steps": [
                    { "action": "tool", "tool": "select" },
                    { "at_ms": 0, "action": "pointer_down", "x": 50, "y": 0 },
                    { "at_ms": 10, "action": "pointer_up", "x": 50, "y": 0 },
                    { "action": "tool", "tool": "select" },
                    { "at_ms": 40, "action": "pointer_down", "x": 50, "y": 0 }
                ]
            }"#,
        );
        let (engine, events) = replay(script).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "tool_changed");
        assert_eq!(engine.tool(), sketchframe_core::ToolKind::Select);
    }

    #[test]
    fn test_replay_unknown_tool() {
        let script = parse(r#"{ "steps": [ { "action": "tool", "tool": "lasso" } ] }"#);
        assert!(matches!(replay(script), Err(ReplayError::UnknownTool(name)) if name == "lasso"));
    }

    #[test]
    fn test_replay_rejects_bad_config() {
        let script = parse(r#"{ "config": { "min_zoom": 10, "max_zoom": 1 } }"#);
        assert!(matches!(replay(script), Err(ReplayError::Config(_))));
    }

    #[test]
    fn test_shortcut_step() {
        let script = parse(
            r#"{ "steps": [ { "action": "key_down", "key": "'", "modifiers": { "ctrl": true } } ] }"#,
        );
        let (engine, events) = replay(script).unwrap();
        assert_eq!(events.len(), 1);
        assert!(!engine.view.show_grid);
    }
}
