//! Deferred cues on the scene clock.
//!
//! Repeating effects (the footstep cadence) are expanded into one cue per
//! occurrence when scheduled; the controller fires whatever is due after each
//! tick. Cancelling drops everything still pending.

/// Upper bound on the occurrences one repeating cue expands into.
pub const MAX_REPEATS: usize = 64;

/// Something the controller does later.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Footstep,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Pending {
    due: f64,
    cue: Cue,
}

#[derive(Clone, Debug, Default)]
pub struct CueQueue {
    // kept sorted by due time; equal times keep insertion order
    pending: Vec<Pending>,
}

impl CueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64, cue: Cue) {
        let idx = self.pending.partition_point(|p| p.due <= due);
        self.pending.insert(idx, Pending { due, cue });
    }

    /// Schedule `cue` at `start`, then every `interval` seconds while less
    /// than `span` seconds have passed since `start`, at most [`MAX_REPEATS`]
    /// times in all.
    pub fn schedule_repeating(&mut self, start: f64, interval: f32, span: f32, cue: Cue) {
        if !(interval > 0.0) {
            self.schedule(start, cue);
            return;
        }
        let (interval, span) = (f64::from(interval), f64::from(span));
        for k in 0..MAX_REPEATS {
            let offset = k as f64 * interval;
            if k > 0 && !(offset < span) {
                break;
            }
            self.schedule(start + offset, cue);
        }
    }

    /// Remove and return every cue due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<Cue> {
        let n = self.pending.partition_point(|p| p.due <= now);
        self.pending.drain(..n).map(|p| p.cue).collect()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[inline] pub fn len(&self) -> usize { self.pending.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    /// Due time of the next cue.
    pub fn next_due(&self) -> Option<f64> {
        self.pending.first().map(|p| p.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footstep_cadence_has_five_steps() {
        let mut q = CueQueue::new();
        q.schedule_repeating(10.0, 0.3, 1.4, Cue::Footstep);
        assert_eq!(q.len(), 5);
        assert_eq!(q.drain_due(10.0), vec![Cue::Footstep]);
        assert_eq!(q.drain_due(10.65).len(), 2);
        assert_eq!(q.drain_due(100.0).len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn cues_come_out_in_due_order() {
        let mut q = CueQueue::new();
        q.schedule(2.0, Cue::Footstep);
        q.schedule(1.0, Cue::Footstep);
        assert_eq!(q.next_due(), Some(1.0));
        assert_eq!(q.drain_due(1.5).len(), 1);
        assert_eq!(q.next_due(), Some(2.0));
    }

    #[test]
    fn cancel_drops_everything() {
        let mut q = CueQueue::new();
        q.schedule_repeating(0.0, 0.3, 1.4, Cue::Footstep);
        q.cancel_all();
        assert!(q.drain_due(10.0).is_empty());
    }

    #[test]
    fn dense_cadence_is_capped() {
        let mut q = CueQueue::new();
        q.schedule_repeating(0.0, 1e-6, 1.4, Cue::Footstep);
        assert_eq!(q.len(), MAX_REPEATS);
        q.cancel_all();
        q.schedule_repeating(0.0, 0.3, f32::INFINITY, Cue::Footstep);
        assert_eq!(q.len(), MAX_REPEATS);
    }

    #[test]
    fn zero_span_still_plays_once() {
        let mut q = CueQueue::new();
        q.schedule_repeating(0.0, 0.3, 0.0, Cue::Footstep);
        assert_eq!(q.len(), 1);
    }
}
