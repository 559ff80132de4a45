//! Terminal renderers.

use std::io::Write;

use printshop_scene::motion::{EXIT_X, OFFSTAGE_X};
use printshop_scene::{Renderer, SceneState};

const TRACK_WIDTH: usize = 36;

/// Column of world position `x` on the track, or `None` when off the track.
fn column(x: f32) -> Option<usize> {
    let t = (x - OFFSTAGE_X) / (EXIT_X - OFFSTAGE_X);
    if (0.0..=1.0).contains(&t) {
        Some(((t * (TRACK_WIDTH - 1) as f32).round() as usize).min(TRACK_WIDTH - 1))
    } else {
        None
    }
}

/// One line describing the frame: phase, item, a track with customer `C`,
/// object `o` (or `*` once printed), the machine `M` and the flags.
pub fn status_line(s: &SceneState) -> String {
    let mut track = vec!['.'; TRACK_WIDTH];
    if let Some(m) = column(3.0) {
        track[m] = 'M';
    }
    if s.customer_visible {
        if let Some(c) = column(s.customer_x) {
            track[c] = 'C';
        }
    }
    if s.object_visible {
        if let Some(o) = column(s.object_position.x) {
            track[o] = if s.is_printed { '*' } else { 'o' };
        }
    }
    let track: String = track.into_iter().collect();
    format!(
        "{:<17} {:>5.2}s  {:<6} [{track}] {}{}{}",
        s.phase.name(),
        s.phase_elapsed,
        s.item.kind.name(),
        if s.print_effects.particles { " printing" } else { "" },
        if s.is_printed { " printed" } else { "" },
        if s.is_happy { " :)" } else { "" },
    )
}

/// Redraws a single status line in place.
pub struct StatusLine<W: Write> {
    out: W,
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for StatusLine<W> {
    fn draw(&mut self, state: &SceneState) {
        // a closed terminal is not worth stopping the scene for
        let _ = write!(self.out, "\r{:<96}", status_line(state));
        let _ = self.out.flush();
    }
}

/// One JSON object per frame.
pub struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for JsonLines<W> {
    fn draw(&mut self, state: &SceneState) {
        if let Ok(line) = serde_json::to_string(state) {
            let _ = writeln!(self.out, "{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printshop_engine::Synthesizer;
    use printshop_scene::Timeline;

    #[test]
    fn idle_track_shows_only_the_machine() {
        let t = Timeline::with_defaults(Synthesizer::silent());
        let line = status_line(&t.render_state());
        assert!(line.starts_with("idle"));
        assert!(line.contains('M') && !line.contains('C'));
    }

    #[test]
    fn json_lines_are_parseable() {
        let mut t = Timeline::with_defaults(Synthesizer::silent());
        t.tick(1.0);
        let mut r = JsonLines::new(Vec::new());
        r.draw(&t.render_state());
        let v: serde_json::Value = serde_json::from_slice(&r.out).unwrap();
        assert_eq!(v["phase"], "customer-entering");
        assert_eq!(v["item"]["kind"], "bottle");
    }
}
