//! Shading profiles: named sets of the constants the blade shader uses.
//!
//! Several iterations of the field used different cutoffs, bend curves
//! and blend factors. Each iteration is a preset here rather than a magic
//! number in the shader; `GrassUniform` carries the chosen one to the GPU.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::math::Ease;

/// Constants shared by the CPU shading reference and grass.wgsl.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingProfile {
    /// Disturbance influence radius, world units
    pub cutoff: f32,
    /// Light falloff: `light = (1 / (distance * light_falloff))^2`
    pub light_falloff: f32,
    /// Light at zero distance, and the clamp for everything closer
    pub light_max: f32,
    /// Scale of the curl vector when tilting the bend target
    pub curl_bend: f32,
    /// How far blade tips are pushed away from the disturbance; 0 leaves it
    /// a highlight only
    pub disturbance_push: f32,
    /// Bend curve over the blade's rest height
    pub ease: Ease,
    /// Half-size of the tiling window around the camera target
    pub tile_half_range: f32,
    /// Vertical stretch applied after placement
    pub vertical_stretch: f32,
    pub base_color: [f32; 3],
    pub tip_color: [f32; 3],
    pub dry_color: [f32; 3],
    pub highlight_color: [f32; 3],
    /// Highlight blend with no disturbance light
    pub highlight_base: f32,
    /// Mask red below this discards the fragment
    pub mask_threshold: f32,
}

const fn rgb(r: f32, g: f32, b: f32) -> [f32; 3] {
    [r / 255.0, g / 255.0, b / 255.0]
}

impl Default for ShadingProfile {
    fn default() -> Self {
        Self::meadow()
    }
}

impl ShadingProfile {
    /// Flat infinite meadow. The cursor boulder lights blades but does not
    /// push them.
    pub fn meadow() -> Self {
        Self {
            cutoff: 0.25,
            light_falloff: 5.0,
            light_max: 1.0,
            curl_bend: 0.01,
            disturbance_push: 0.0,
            ease: Ease::InCubic,
            tile_half_range: 2.0,
            vertical_stretch: 1.5,
            base_color: rgb(75.0, 112.0, 34.0),
            tip_color: rgb(93.0, 128.0, 47.0),
            dry_color: rgb(102.0, 146.0, 44.0),
            highlight_color: rgb(216.0, 255.0, 147.0),
            highlight_base: 0.3,
            mask_threshold: 0.5,
        }
    }

    /// Looser blades: out-cubic bend, stronger wind, wider disturbance.
    pub fn windswept() -> Self {
        Self {
            cutoff: 0.35,
            curl_bend: 0.05,
            disturbance_push: 0.8,
            ease: Ease::OutCubic,
            vertical_stretch: 1.0,
            highlight_base: 0.2,
            ..Self::meadow()
        }
    }

    /// No wrap window, no stretch; for blades covering a sphere.
    pub fn planet() -> Self {
        Self {
            tile_half_range: 0.0,
            vertical_stretch: 1.0,
            ..Self::meadow()
        }
    }

    pub fn base_color(&self) -> Vec3 {
        Vec3::from_array(self.base_color)
    }

    pub fn tip_color(&self) -> Vec3 {
        Vec3::from_array(self.tip_color)
    }

    pub fn dry_color(&self) -> Vec3 {
        Vec3::from_array(self.dry_color)
    }

    pub fn highlight_color(&self) -> Vec3 {
        Vec3::from_array(self.highlight_color)
    }
}

/// Named profile presets.
pub struct ShadingProfileTable {
    profiles: Vec<(String, ShadingProfile)>,
}

impl ShadingProfileTable {
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ShadingProfile> {
        self.profiles.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|(n, _)| n.as_str())
    }

    /// Add or replace a named profile.
    pub fn insert(&mut self, name: impl Into<String>, profile: ShadingProfile) {
        let name = name.into();
        match self.profiles.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = profile,
            None => self.profiles.push((name, profile)),
        }
    }
}

impl Default for ShadingProfileTable {
    fn default() -> Self {
        Self {
            profiles: vec![
                ("meadow".into(), ShadingProfile::meadow()),
                ("windswept".into(), ShadingProfile::windswept()),
                ("planet".into(), ShadingProfile::planet()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meadow_constants() {
        let p = ShadingProfile::default();
        assert_eq!(p.cutoff, 0.25);
        assert_eq!(p.ease, Ease::InCubic);
        assert_eq!(p.disturbance_push, 0.0);
        assert!(ShadingProfile::windswept().disturbance_push > 0.0);
        assert!((p.base_color[0] - 75.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_table_lookup() {
        let table = ShadingProfileTable::default();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("windswept").unwrap().ease, Ease::OutCubic);
        assert!(table.get("desert").is_none());
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["meadow", "windswept", "planet"]);
    }

    #[test]
    fn test_table_insert_replaces() {
        let mut table = ShadingProfileTable::default();
        table.insert("meadow", ShadingProfile { cutoff: 1.0, ..Default::default() });
        table.insert("custom", ShadingProfile::planet());
        assert_eq!(table.len(), 4);
        assert_eq!(table.get("meadow").unwrap().cutoff, 1.0);
    }

    #[test]
    fn test_profile_json() {
        let p: ShadingProfile = serde_json::from_str(r#"{ "cutoff": 0.5, "ease": "out_cubic" }"#).unwrap();
        assert_eq!(p.cutoff, 0.5);
        assert_eq!(p.ease, Ease::OutCubic);
        assert_eq!(p.light_falloff, 5.0);
    }
}
