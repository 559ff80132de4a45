//! The seam between the timeline and whatever draws it.

use crate::state::SceneState;

/// Draws one frame. Called once per frame, after the timeline has ticked.
pub trait Renderer {
    fn draw(&mut self, state: &SceneState);
}

/// Keeps every frame it is given. Handy in tests and for dumping a run.
#[derive(Clone, Debug, Default)]
pub struct FrameLog {
    pub frames: Vec<SceneState>,
}

impl Renderer for FrameLog {
    fn draw(&mut self, state: &SceneState) {
        self.frames.push(state.clone());
    }
}
