//! Whole-cycle behavior of the timeline, with audio captured by a recording host.

use printshop_engine::{Recorder, RecordingHost, RecordingOptions, Synthesizer};
use printshop_scene::motion::{COUNTER_X, EXIT_X};
use printshop_scene::{FrameLog, ItemKind, Phase, Timeline, TimelineConfig};

const DT: f32 = 1.0 / 60.0;
/// 11 s at 60 fps.
const CYCLE_FRAMES: usize = 660;

fn recorded(options: RecordingOptions) -> (Timeline, Recorder) {
    let (host, rec) = RecordingHost::new(options);
    let synth = Synthesizer::new(Box::new(host)).with_seed(5);
    (Timeline::with_defaults(synth), rec)
}

/// Tick `frames` frames, advancing the recorder's clock alongside.
fn run(t: &mut Timeline, rec: &Recorder, frames: usize) -> Vec<Phase> {
    let mut entered = Vec::new();
    for _ in 0..frames {
        rec.advance(f64::from(DT));
        if let Some(p) = t.tick(DT) {
            entered.push(p);
        }
    }
    entered
}

#[test]
fn one_full_cycle_returns_to_idle_with_next_item() {
    let (mut t, rec) = recorded(RecordingOptions::default());
    assert_eq!(t.item().kind, ItemKind::Bottle);

    let entered = run(&mut t, &rec, CYCLE_FRAMES);

    let mut expected: Vec<Phase> = Phase::ALL[1..].to_vec();
    expected.push(Phase::Idle);
    assert_eq!(entered, expected);
    assert_eq!(t.phase(), Phase::Idle);
    assert_eq!(t.item_index(), 1);
    assert_eq!(t.item().kind, ItemKind::Tshirt);
    let s = t.render_state();
    assert!(!s.is_printed && !s.is_happy);
    assert!(!s.customer_visible);
}

#[test]
fn cycle_plays_the_expected_sounds() {
    let (mut t, rec) = recorded(RecordingOptions::default());
    run(&mut t, &rec, CYCLE_FRAMES);

    assert_eq!(rec.voices_labelled("footstep").len(), 10);
    assert_eq!(rec.voices_labelled("whoosh").len(), 4);
    assert_eq!(rec.voices_labelled("chime").len(), 3);
    let printing = rec.voices_labelled("printing");
    assert_eq!(printing.len(), 1);
    assert!((printing[0].stop - printing[0].start - 2.0).abs() < 1e-9);
    assert!(rec.voices_labelled("ambient").is_empty());
}

#[test]
fn flags_follow_the_phase() {
    let (mut t, rec) = recorded(RecordingOptions::default());
    let mut log = FrameLog::default();
    for _ in 0..CYCLE_FRAMES {
        rec.advance(f64::from(DT));
        t.frame(DT, &mut log);
    }
    for s in &log.frames {
        let printed_phase = matches!(
            s.phase,
            Phase::Printed | Phase::FromMachine | Phase::ToCustomer | Phase::CustomerHappy | Phase::CustomerLeaving
        );
        assert_eq!(s.is_printed, printed_phase, "{:?}", s.phase);
        assert_eq!(s.is_happy, matches!(s.phase, Phase::CustomerHappy | Phase::CustomerLeaving));
        assert_eq!(s.customer_visible, s.phase != Phase::Idle);
        assert_eq!(s.print_effects.particles, s.phase == Phase::Printing);
    }
}

#[test]
fn customer_walks_in_monotonically_and_leaves() {
    let (mut t, rec) = recorded(RecordingOptions::default());
    let mut log = FrameLog::default();
    for _ in 0..CYCLE_FRAMES {
        rec.advance(f64::from(DT));
        t.frame(DT, &mut log);
    }
    let walk_in: Vec<f32> = log
        .frames
        .iter()
        .filter(|s| s.phase == Phase::CustomerEntering)
        .map(|s| s.customer_x)
        .collect();
    assert!(walk_in.windows(2).all(|w| w[1] >= w[0] && w[1] <= COUNTER_X));

    let waiting = log.frames.iter().find(|s| s.phase == Phase::CustomerWaiting).map(|s| s.customer_x);
    assert_eq!(waiting, Some(COUNTER_X));

    let walk_out: Vec<f32> = log
        .frames
        .iter()
        .filter(|s| s.phase == Phase::CustomerLeaving)
        .map(|s| s.customer_x)
        .collect();
    assert!(walk_out.windows(2).all(|w| w[1] >= w[0] && w[1] <= EXIT_X));
}

#[test]
fn muted_timeline_makes_no_nodes() {
    let (mut t, rec) = recorded(RecordingOptions::default());
    t.set_muted(true);
    assert!(t.is_muted());
    run(&mut t, &rec, CYCLE_FRAMES);
    assert_eq!(rec.nodes_created(), 0);
    assert_eq!(rec.open_attempts(), 0);
}

#[test]
fn timeline_survives_missing_audio() {
    let (mut t, rec) = recorded(RecordingOptions { unavailable: true, ..Default::default() });
    run(&mut t, &rec, CYCLE_FRAMES * 2);
    assert_eq!(t.phase(), Phase::Idle);
    assert_eq!(t.item_index(), 2);
    assert!(rec.voices().is_empty());
}

#[test]
fn dispose_cancels_pending_footsteps_and_closes_audio() {
    let (mut t, rec) = recorded(RecordingOptions::default());
    t.synthesizer_mut().play_ambient();
    // just into customer-entering: one footstep played, four pending
    run(&mut t, &rec, 61);
    assert_eq!(t.phase(), Phase::CustomerEntering);
    assert_eq!(rec.voices_labelled("footstep").len(), 1);
    t.dispose();
    run(&mut t, &rec, 120);
    assert_eq!(rec.voices_labelled("footstep").len(), 1);
    assert_eq!(rec.closes(), 1);
    assert_eq!(rec.releases().len(), 1);
}

#[test]
fn custom_timing_changes_printing_length() {
    let cfg = TimelineConfig::from_json_str(r#"{ "durations": { "printing": 3.5 } }"#).unwrap();
    let (host, rec) = RecordingHost::new(RecordingOptions::default());
    let mut t = Timeline::new(cfg, Synthesizer::new(Box::new(host))).unwrap();
    assert!((t.cycle_seconds() - 12.5).abs() < 1e-5);
    while t.phase() != Phase::Printed {
        rec.advance(0.1);
        t.tick(0.1);
    }
    let printing = rec.voices_labelled("printing");
    assert!((printing[0].stop - printing[0].start - 3.5).abs() < 1e-9);
}

#[test]
fn tiny_footstep_interval_does_not_flood_the_mixer() {
    let cfg = TimelineConfig::from_json_str(r#"{ "footstep_interval": 0.000001 }"#).unwrap();
    let (host, rec) = RecordingHost::new(RecordingOptions::default());
    let mut t = Timeline::new(cfg, Synthesizer::new(Box::new(host))).unwrap();
    rec.advance(1.0);
    t.tick(1.0);
    assert_eq!(t.phase(), Phase::CustomerEntering);
    run(&mut t, &rec, 1);
    // steps 0.05 s apart: the entry step and nothing else within one frame
    assert_eq!(rec.voices_labelled("footstep").len(), 1);
    run(&mut t, &rec, 90);
    assert_eq!(rec.voices_labelled("footstep").len(), 28);
    assert_eq!(t.pending_cues(), 0);
}
