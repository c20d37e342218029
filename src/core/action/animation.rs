//=========================================================================
// Frame Animation
//=========================================================================
//
// Flips a sprite through a frame sequence over the tween duration.
//
//   index = min(floor(len * progress), len - 1)
//
// The sequence is a shared, reference-counted resource: every animation
// (and every clone of one) holds a retain on it and releases it on drop.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::action::Action;
use super::tween::Tween;
use crate::core::object::Shared;
use crate::core::render::FrameSequence;
use crate::core::scene::ActorRef;

//=== Animation ===========================================================

#[derive(Debug)]
pub struct Animation {
    frames: Shared<FrameSequence>,
}

impl Animation {
    /// Plays `frames`, retaining the sequence for as long as the animation
    /// (or any clone) lives.
    pub fn new(frames: &Shared<FrameSequence>) -> Self {
        frames.retain();
        Self {
            frames: frames.clone(),
        }
    }

    pub fn frames(&self) -> &Shared<FrameSequence> {
        &self.frames
    }

    fn frame_index(len: usize, progress: f64) -> usize {
        let index = (len as f64 * progress.clamp(0.0, 1.0)).floor() as usize;
        index.min(len - 1)
    }
}

impl Clone for Animation {
    fn clone(&self) -> Self {
        Self::new(&self.frames)
    }
}

impl Drop for Animation {
    fn drop(&mut self) {
        self.frames.release();
    }
}

impl Tween for Animation {
    fn start(&mut self, _target: &ActorRef) {}

    fn apply(&mut self, target: &ActorRef, progress: f64) {
        let frame = self.frames.with(|seq| {
            if seq.is_empty() {
                return None;
            }
            seq.get(Self::frame_index(seq.len(), progress)).copied()
        });

        if let Some(Some(frame)) = frame {
            target.set_sprite_frame(frame);
        }
    }

    /// Plays the frames backwards. `None` if the sequence was destroyed.
    fn reversed(&self) -> Option<Self> {
        let reversed = self.frames.with(FrameSequence::reversed)?;
        // The fresh handle's initial count is owned by the new animation.
        Some(Self {
            frames: Shared::new(reversed),
        })
    }
}

impl Action {
    pub fn animation(duration: f64, frames: &Shared<FrameSequence>) -> Self {
        Self::tween(duration, Animation::new(frames))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
