//! Animation/physics helper.
//!
//! Aggregates, per registered model, an [`AnimationMixer`] and an optional
//! [`PhysicsBinding`] and advances all of them together once per frame.

use std::sync::Arc;

use serde::Deserialize;
use slotmap::SecondaryMap;

use crate::animation::{AnimationClip, AnimationMixer};
use crate::errors::{Error, Result};
use crate::physics::{PhysicsBinding, PhysicsConfig};
use crate::scene::{ModelKey, Scene};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Seconds physics keeps running after playback stops.
    pub afterglow: f32,
    pub physics: PhysicsConfig,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            afterglow: 2.0,
            physics: PhysicsConfig::default(),
        }
    }
}

/// Features that can be switched on and off across all objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperFeature {
    Animation,
    Physics,
}

/// Registration parameters for [`AnimationHelper::add`].
#[derive(Debug, Clone, Default)]
pub struct HelperOptions {
    /// Clips started right away.
    pub animations: Vec<Arc<AnimationClip>>,
    pub physics: bool,
}

#[derive(Debug)]
pub struct HelperObject {
    pub mixer: AnimationMixer,
    pub physics: Option<PhysicsBinding>,
    // Seconds since animation last advanced this object.
    idle_time: f32,
    // Physics was skipped since the last step; bodies are re-seated on the
    // current pose before stepping again.
    physics_stale: bool,
}

#[derive(Debug)]
pub struct AnimationHelper {
    objects: SecondaryMap<ModelKey, HelperObject>,
    animation_enabled: bool,
    physics_enabled: bool,
    afterglow: f32,
    physics_config: PhysicsConfig,
}

impl Default for AnimationHelper {
    fn default() -> Self {
        Self::new(HelperConfig::default())
    }
}

impl AnimationHelper {
    #[must_use]
    pub fn new(config: HelperConfig) -> Self {
        Self {
            objects: SecondaryMap::new(),
            animation_enabled: true,
            physics_enabled: true,
            afterglow: config.afterglow.max(0.0),
            physics_config: config.physics,
        }
    }

    /// Registers `model`, plays `options.animations` and optionally builds
    /// its physics binding. Re-registering replaces the previous object.
    pub fn add(&mut self, model: ModelKey, scene: &mut Scene, options: HelperOptions) -> Result<()> {
        let root = scene.model(model).ok_or(Error::ModelNotFound)?.root;
        scene.update_matrix_world();

        let mut mixer = AnimationMixer::new(root);
        for clip in &options.animations {
            let action = mixer.clip_action(clip, scene);
            mixer.play(action);
        }

        let physics = options
            .physics
            .then(|| PhysicsBinding::new(scene, root, &self.physics_config));

        log::info!(
            "Helper: registered model ({} clips, physics: {})",
            options.animations.len(),
            physics.is_some()
        );

        self.objects.insert(
            model,
            HelperObject {
                mixer,
                physics,
                idle_time: 0.0,
                physics_stale: false,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, model: ModelKey) -> bool {
        self.objects.remove(model).is_some()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, model: ModelKey) -> bool {
        self.objects.contains_key(model)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn afterglow(&self) -> f32 {
        self.afterglow
    }

    #[must_use]
    pub fn object(&self, model: ModelKey) -> Option<&HelperObject> {
        self.objects.get(model)
    }

    #[must_use]
    pub fn mixer(&self, model: ModelKey) -> Option<&AnimationMixer> {
        self.objects.get(model).map(|o| &o.mixer)
    }

    pub fn mixer_mut(&mut self, model: ModelKey) -> Option<&mut AnimationMixer> {
        self.objects.get_mut(model).map(|o| &mut o.mixer)
    }

    #[must_use]
    pub fn is_enabled(&self, feature: HelperFeature) -> bool {
        match feature {
            HelperFeature::Animation => self.animation_enabled,
            HelperFeature::Physics => self.physics_enabled,
        }
    }

    /// Switches a feature for every registered object.
    pub fn set_enabled(&mut self, feature: HelperFeature, enabled: bool) {
        log::debug!("Helper: {feature:?} -> {enabled}");
        match feature {
            HelperFeature::Animation => self.animation_enabled = enabled,
            HelperFeature::Physics => self.physics_enabled = enabled,
        }
    }

    /// Whether physics is still evaluated for `model`: animation is
    /// advancing, or stopped for no longer than the afterglow.
    #[must_use]
    pub fn is_physics_active(&self, model: ModelKey) -> bool {
        self.objects
            .get(model)
            .is_some_and(|o| self.physics_enabled && o.physics.is_some() && o.idle_time <= self.afterglow)
    }

    /// Advances every object by `dt` seconds.
    ///
    /// On return world matrices and skeleton palettes reflect this frame.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for object in self.objects.values_mut() {
            let animating = self.animation_enabled && object.mixer.is_playing();
            if self.animation_enabled {
                object.mixer.update(dt, scene);
            }
            if animating {
                object.idle_time = 0.0;
            } else {
                object.idle_time += dt;
            }
        }

        scene.update_matrix_world();

        if self.physics_enabled {
            let mut stepped = false;
            for object in self.objects.values_mut() {
                let Some(physics) = object.physics.as_mut() else {
                    continue;
                };
                if object.idle_time > self.afterglow {
                    object.physics_stale = true;
                    continue;
                }
                if object.physics_stale {
                    physics.reset(scene);
                    object.physics_stale = false;
                }
                physics.update(dt, scene);
                stepped = true;
            }
            if stepped {
                scene.update_matrix_world();
            }
        } else {
            for object in self.objects.values_mut() {
                object.physics_stale = true;
            }
        }

        scene.update_skeletons();
    }
}
