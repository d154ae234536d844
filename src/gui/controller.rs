use std::sync::Arc;

use crate::animation::AnimationClip;
use crate::helper::AnimationHelper;
use crate::scene::{ModelKey, Scene};

/// Cycles one model's mixer through the model's clip list.
///
/// The index starts at 0 and is always kept below the clip count it was
/// last advanced with.
#[derive(Debug, Clone)]
pub struct MotionController {
    model: ModelKey,
    motion_index: usize,
}

impl MotionController {
    #[must_use]
    pub fn new(model: ModelKey) -> Self {
        Self {
            model,
            motion_index: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> ModelKey {
        self.model
    }

    #[inline]
    #[must_use]
    pub fn motion_index(&self) -> usize {
        self.motion_index
    }

    /// Steps to the next clip, wrapping at `clip_count`. `None` with no clips.
    pub fn advance_index(&mut self, clip_count: usize) -> Option<usize> {
        if clip_count == 0 {
            return None;
        }
        self.motion_index = (self.motion_index + 1) % clip_count;
        Some(self.motion_index)
    }

    fn current_clip(&self, scene: &Scene) -> Option<Arc<AnimationClip>> {
        let model = scene.model(self.model)?;
        model.animations.get(self.motion_index).cloned()
    }

    /// Stops every action on the model's mixer and plays the current clip.
    ///
    /// Returns `false` when the model, its mixer or the clip is missing; the
    /// mixer is left untouched in that case.
    pub fn play_current(&self, scene: &mut Scene, helper: &mut AnimationHelper) -> bool {
        let Some(clip) = self.current_clip(scene) else {
            return false;
        };
        let Some(mixer) = helper.mixer_mut(self.model) else {
            return false;
        };

        mixer.stop_all_action(scene);
        let action = mixer.clip_action(&clip, scene);
        mixer.play(action);
        log::debug!("Playing motion #{} '{}'", self.motion_index, clip.name);
        true
    }

    /// [`advance_index`](Self::advance_index) then [`play_current`](Self::play_current).
    pub fn change_motion(&mut self, scene: &mut Scene, helper: &mut AnimationHelper) -> bool {
        let clip_count = scene.model(self.model).map_or(0, |m| m.animations.len());
        if self.advance_index(clip_count).is_none() {
            return false;
        }
        self.play_current(scene, helper)
    }
}

#[cfg(test)]
mod tests {
    use slotmap::KeyData;

    use super::*;

    #[test]
    fn index_wraps_and_ignores_empty_lists() {
        let mut controller = MotionController::new(ModelKey::from(KeyData::from_ffi(1)));
        assert_eq!(controller.advance_index(0), None);
        assert_eq!(controller.motion_index(), 0);

        let visited: Vec<_> = (0..5).filter_map(|_| controller.advance_index(3)).collect();
        assert_eq!(visited, vec![1, 2, 0, 1, 2]);
    }
}
