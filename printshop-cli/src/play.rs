//! Realtime playback: a fixed-rate frame loop driving the timeline.
//!
//! Keys arrive as lines on stdin: `m` toggles mute, `q` stops and shuts the
//! audio down. Ctrl+C ends the process without that shutdown.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use printshop_engine::{CpalHost, Synthesizer};
use printshop_scene::{Renderer, Timeline};
use tracing::{debug, info};

use crate::term::{JsonLines, StatusLine};
use crate::{load_config, PlayArgs};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Key {
    ToggleMute,
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim().to_ascii_lowercase().as_str() {
        "m" | "mute" => Some(Key::ToggleMute),
        "q" | "quit" => Some(Key::Quit),
        _ => None,
    }
}

/// Read keys from stdin on a helper thread.
fn spawn_keys() -> Result<Receiver<Key>> {
    let (tx, rx) = mpsc::sync_channel(8);
    thread::Builder::new()
        .name("printshop-keys".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if let Some(key) = parse_key(&line) {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
            }
        })
        .context("spawning the key reader")?;
    Ok(rx)
}

pub fn run(args: &PlayArgs) -> Result<()> {
    ensure!(args.scene.fps.is_finite() && args.scene.fps > 0.0, "--fps must be positive");
    let config = load_config(args.scene.timing.as_deref())?;

    let synth = if args.no_audio {
        Synthesizer::silent()
    } else {
        let mut host = CpalHost::new();
        if let Some(name) = &args.device {
            host = host.with_device(name.clone());
        }
        Synthesizer::new(Box::new(host))
    };

    let mut timeline = Timeline::new(config, synth)?;
    timeline.set_muted(args.scene.muted);
    if args.scene.ambient {
        timeline.synthesizer_mut().play_ambient();
    }

    info!(
        cycle_seconds = timeline.cycle_seconds(),
        fps = args.scene.fps,
        muted = args.scene.muted,
        "playing (m + Enter toggles mute, q + Enter stops)"
    );
    let mut keys = Some(spawn_keys()?);

    let mut renderer: Box<dyn Renderer> = if args.json {
        Box::new(JsonLines::new(io::stdout()))
    } else {
        Box::new(StatusLine::new(io::stderr()))
    };

    let frame = Duration::from_secs_f32(1.0 / args.scene.fps);
    let start = Instant::now();
    let mut last = start;
    loop {
        if args.seconds.is_some_and(|s| start.elapsed().as_secs_f64() >= s) {
            break;
        }
        let polled = keys.as_ref().map(Receiver::try_recv);
        match polled {
            Some(Ok(Key::Quit)) => break,
            Some(Ok(Key::ToggleMute)) => {
                let muted = !timeline.is_muted();
                timeline.set_muted(muted);
                info!(muted, "mute toggled");
            }
            Some(Err(TryRecvError::Disconnected)) => {
                debug!("stdin closed, keys disabled");
                keys = None;
            }
            Some(Err(TryRecvError::Empty)) | None => {}
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        timeline.tick(dt);
        renderer.draw(&timeline.render_state());

        thread::sleep(frame.saturating_sub(now.elapsed()));
    }

    eprintln!();
    timeline.dispose();
    info!(item_index = timeline.item_index(), "stopped");
    Ok(())
}
