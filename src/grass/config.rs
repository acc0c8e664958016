//! Bake configuration and quality presets.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::generation::normal::NormalParams;
use crate::generation::sampler::{SamplingPattern, Surface};

/// Blade count presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    pub fn blade_count(self) -> u32 {
        match self {
            Quality::Low => 50_000,
            Quality::Medium => 100_000,
            Quality::High => 300_000,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "low" => Some(Quality::Low),
            "medium" => Some(Quality::Medium),
            "high" => Some(Quality::High),
            _ => None,
        }
    }
}

/// Everything the baker needs for one distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Number of blades
    pub count: u32,
    pub surface: Surface,
    pub pattern: SamplingPattern,
    pub normal: NormalParams,
    /// Twist range: theta is drawn uniformly from [-max_twist, max_twist]
    pub max_twist: f32,
    /// Blade length, baked as the Z scale
    pub blade_length: f32,
    /// Random in-cell root offset for grid sampling, as a fraction of the
    /// cell size (0 = exact cell centers)
    pub root_jitter: f32,
    /// Seed for twist and jitter
    pub seed: u64,
    /// Seed for the surface distortion and the normal-estimation offset
    pub distortion_seed: u32,
    /// Explicit attribute texture size `[width, height]`; computed from
    /// `count` when absent
    pub texture_size: Option<[u32; 2]>,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            count: Quality::default().blade_count(),
            surface: Surface::default(),
            pattern: SamplingPattern::default(),
            normal: NormalParams::default(),
            max_twist: 0.3,
            blade_length: 0.1,
            root_jitter: 0.8,
            seed: 1,
            distortion_seed: 1,
            texture_size: None,
        }
    }
}

impl BakeConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Fixed per-blade scale: unit footprint, `blade_length` tall.
    pub fn blade_scale(&self) -> Vec3 {
        Vec3::new(1.0, 1.0, self.blade_length)
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::Config("blade count must be greater than zero".into()));
        }
        match self.surface {
            Surface::Plane { size } if !(size > 0.0 && size.is_finite()) => {
                return Err(Error::Config(format!("plane size must be positive, got {}", size)));
            }
            Surface::Sphere { radius } if !(radius > 0.0 && radius.is_finite()) => {
                return Err(Error::Config(format!("sphere radius must be positive, got {}", radius)));
            }
            _ => {}
        }
        if !(self.normal.epsilon > 0.0 && self.normal.epsilon.is_finite()) {
            return Err(Error::Config(format!("normal epsilon must be positive, got {}", self.normal.epsilon)));
        }
        if !(0.0..=1.0).contains(&self.normal.up_blend) {
            return Err(Error::Config(format!("up_blend must be in [0, 1], got {}", self.normal.up_blend)));
        }
        if !(self.max_twist >= 0.0 && self.max_twist.is_finite()) {
            return Err(Error::Config(format!("max_twist must be non-negative, got {}", self.max_twist)));
        }
        if !(self.blade_length > 0.0 && self.blade_length.is_finite()) {
            return Err(Error::Config(format!("blade_length must be positive, got {}", self.blade_length)));
        }
        if !(0.0..=1.0).contains(&self.root_jitter) {
            return Err(Error::Config(format!("root_jitter must be in [0, 1], got {}", self.root_jitter)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valid() {
        let cfg = BakeConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.count, 100_000);
        assert_eq!(cfg.blade_scale(), Vec3::new(1.0, 1.0, 0.1));
    }

    #[test]
    fn test_quality_counts() {
        assert_eq!(Quality::Low.blade_count(), 50_000);
        assert_eq!(Quality::Medium.blade_count(), 100_000);
        assert_eq!(Quality::High.blade_count(), 300_000);
        assert_eq!(Quality::from_name("high"), Some(Quality::High));
        assert_eq!(Quality::from_name("ultra"), None);
    }

    #[test]
    fn test_invalid_configs() {
        let bad = [
            BakeConfig { count: 0, ..Default::default() },
            BakeConfig { surface: Surface::Plane { size: 0.0 }, ..Default::default() },
            BakeConfig { surface: Surface::Sphere { radius: -1.0 }, ..Default::default() },
            BakeConfig { max_twist: f32::NAN, ..Default::default() },
            BakeConfig { blade_length: 0.0, ..Default::default() },
            BakeConfig { root_jitter: 1.5, ..Default::default() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(Error::Config(_))), "{cfg:?}");
        }
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = BakeConfig::from_json_str(
            r#"{ "count": 4, "surface": { "kind": "plane", "size": 1.0 }, "pattern": "grid" }"#,
        )
        .unwrap();
        assert_eq!(cfg.count, 4);
        assert_eq!(cfg.surface, Surface::Plane { size: 1.0 });
        assert_eq!(cfg.pattern, SamplingPattern::Grid);
        assert_eq!(cfg.max_twist, 0.3);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(BakeConfig::from_json_str(r#"{ "count": 0 }"#), Err(Error::Config(_))));
        assert!(matches!(BakeConfig::from_json_str("{ nope"), Err(Error::Json(_))));
    }
}
