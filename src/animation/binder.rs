use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves each track of `clip` to a node under `root` by name.
    ///
    /// Tracks naming bones the model does not have are skipped; motion
    /// files routinely carry channels for optional bones.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let bindings: Vec<PropertyBinding> = clip
            .tracks
            .iter()
            .enumerate()
            .filter_map(|(track_index, track)| {
                let node_handle = scene.find_node_by_name(root, &track.meta.node_name)?;
                Some(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                })
            })
            .collect();

        let skipped = clip.tracks.len() - bindings.len();
        if skipped > 0 {
            log::debug!(
                "Clip '{}': {} of {} tracks have no matching node",
                clip.name,
                skipped,
                clip.tracks.len()
            );
        }
        bindings
    }
}
