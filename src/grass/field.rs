//! Grass field lifecycle.
//!
//! A field starts `Unbuilt`, becomes `Built` on the first bake, and is
//! rebaked in place on regenerate, randomize or a quality change. The old
//! attribute set is dropped before the new one is baked.

use std::time::Instant;

use super::bake::{BakedField, Baker};
use super::config::{BakeConfig, Quality};
use crate::core::types::Result;
use crate::math::SimpleRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldState {
    Unbuilt,
    Built,
}

/// Owns the bake config and the current baked attribute set.
pub struct GrassField {
    config: BakeConfig,
    baked: Option<BakedField>,
    seed_rng: SimpleRng,
}

impl GrassField {
    pub fn new(config: BakeConfig) -> Self {
        let seed_rng = SimpleRng::new(config.seed ^ ((config.distortion_seed as u64) << 32));
        Self { config, baked: None, seed_rng }
    }

    pub fn with_quality(quality: Quality) -> Self {
        Self::new(BakeConfig { count: quality.blade_count(), ..Default::default() })
    }

    pub fn state(&self) -> FieldState {
        if self.baked.is_some() { FieldState::Built } else { FieldState::Unbuilt }
    }

    pub fn is_built(&self) -> bool {
        self.baked.is_some()
    }

    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    pub fn baked(&self) -> Option<&BakedField> {
        self.baked.as_ref()
    }

    /// Bake with the current config. Rebuilds if already built.
    pub fn build(&mut self) -> Result<&BakedField> {
        self.config.validate()?;
        self.discard();
        let baked = Baker::bake(&self.config)?;
        Ok(&*self.baked.insert(baked))
    }

    /// Rebake with explicit seeds.
    pub fn regenerate(&mut self, seed: u64, distortion_seed: u32) -> Result<&BakedField> {
        let start = Instant::now();
        self.config.seed = seed;
        self.config.distortion_seed = distortion_seed;
        let count = self.config.count;
        let baked = self.build()?;
        log::info!(
            "Regenerated field (seed {}, distortion {}, {} blades) in {:.1}ms",
            seed,
            distortion_seed,
            count,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(baked)
    }

    /// Rebake with the next seeds from the field's own sequence.
    pub fn randomize(&mut self) -> Result<&BakedField> {
        let seed = self.seed_rng.next_u64();
        let distortion_seed = self.seed_rng.next_u32();
        self.regenerate(seed, distortion_seed)
    }

    /// Change the blade count preset. A built field is rebaked at the new
    /// count; an unbuilt one only records it.
    pub fn set_quality(&mut self, quality: Quality) -> Result<()> {
        self.config.count = quality.blade_count();
        if self.is_built() {
            log::debug!("Quality set to {:?}, rebuilding", quality);
            self.build()?;
        }
        Ok(())
    }

    /// Drop the baked attribute set.
    pub fn discard(&mut self) {
        self.baked = None;
    }
}
