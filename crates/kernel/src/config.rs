use outrun_render::Fog;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::KernelError;
use crate::pool::PoolLayout;

/// Procedural mountain strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub width_segments: u32,
    pub height_segments: u32,
    /// Mesh scale; `y` is the length along the scroll axis once rotated.
    pub scale: [f32; 3],
    pub elevation: f32,
    /// Scroll offset wraps at `scale.y / wrap_divisor`.
    pub wrap_divisor: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width_segments: 8,
            height_segments: 10,
            scale: [500.0, 1000.0, 1.0],
            elevation: -1.75,
            wrap_divisor: 10.0,
        }
    }
}

/// Textured ground slab under the road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub width: f32,
    pub length: f32,
    pub thickness: f32,
    pub elevation: f32,
    /// Short wrap: the ground texture tiles densely.
    pub repeat_period: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            length: 500.0,
            thickness: 5.0,
            elevation: -2.5,
            repeat_period: 2.0,
        }
    }
}

/// Sinusoidal drift of the vehicle plus its wheel spin pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleMotion {
    pub lateral_amplitude: f32,
    pub lateral_frequency: f32,
    pub longitudinal_amplitude: f32,
    pub longitudinal_frequency: f32,
    /// Spin sign per wheel, cycled over the wheel container's children.
    pub wheel_pattern: [f32; 4],
    /// Shadow proxy height above the vehicle origin.
    pub shadow_lift: f32,
}

impl Default for VehicleMotion {
    fn default() -> Self {
        Self {
            lateral_amplitude: 1.5,
            lateral_frequency: 0.5,
            longitudinal_amplitude: 2.0,
            longitudinal_frequency: 0.1,
            wheel_pattern: [-1.0, -1.0, 1.0, 1.0],
            shadow_lift: 0.05,
        }
    }
}

/// Orbit of the flying object around the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerMotion {
    pub altitude: f32,
    /// Distance ahead of the vehicle along +Z.
    pub lead: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    pub surge_amplitude: f32,
    pub surge_frequency: f32,
}

impl Default for FlyerMotion {
    fn default() -> Self {
        Self {
            altitude: 30.0,
            lead: 45.0,
            sway_amplitude: 5.0,
            sway_frequency: 1.25,
            surge_amplitude: 5.0,
            surge_frequency: 1.0,
        }
    }
}

/// Every constant the drive scene uses.
///
/// Loaded from YAML; missing keys fall back to the defaults, which reproduce
/// the stock scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Multiplier from host time units to seconds (host supplies ms).
    pub time_scale: f64,
    pub speed: f32,
    pub terrain: TerrainConfig,
    pub ground: GroundConfig,
    pub vehicle: VehicleMotion,
    pub flyer: FlyerMotion,
    pub pool: PoolLayout,
    pub fog: Fog,
    pub wire_thickness: f32,
    /// Polls before the stand-in asset provider releases its assets.
    pub stand_in_delay: u32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            time_scale: 0.001,
            speed: 47.0,
            terrain: TerrainConfig::default(),
            ground: GroundConfig::default(),
            vehicle: VehicleMotion::default(),
            flyer: FlyerMotion::default(),
            pool: PoolLayout::default(),
            fog: Fog::default(),
            wire_thickness: 1.0,
            stand_in_delay: 30,
        }
    }
}

impl DriveConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, KernelError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, KernelError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, KernelError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would make a frame undefined (zero divisors,
    /// empty grids or pools).
    pub fn validate(&self) -> Result<(), KernelError> {
        let invalid = |msg: String| Err(KernelError::InvalidConfiguration(msg));
        if self.terrain.width_segments == 0 || self.terrain.height_segments == 0 {
            return invalid(format!(
                "terrain segments must be positive, got {}x{}",
                self.terrain.width_segments, self.terrain.height_segments
            ));
        }
        if self.pool.count == 0 {
            return invalid("pool count must be positive".into());
        }
        if !(self.time_scale > 0.0) {
            return invalid(format!("time_scale must be positive, got {}", self.time_scale));
        }
        let positive = [
            ("ground.repeat_period", self.ground.repeat_period),
            ("terrain.scale.y", self.terrain.scale[1]),
            ("terrain.wrap_divisor", self.terrain.wrap_divisor),
            ("pool.full_range", self.pool.full_range),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return invalid(format!("{name} must be positive and finite, got {value}"));
            }
        }
        Ok(())
    }

    /// Period the terrain and wire offsets wrap at while the terrain node
    /// keeps its configured scale.
    pub fn terrain_period(&self) -> f32 {
        self.terrain.scale[1] / self.terrain.wrap_divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DriveConfig::default();
        config.validate().unwrap();
        assert_eq!(config.speed, 47.0);
        assert_eq!(config.pool.count, 20);
        assert_eq!(config.terrain_period(), 100.0);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = DriveConfig::from_yaml_str("speed: 60.0\npool:\n  count: 4\n").unwrap();
        assert_eq!(config.speed, 60.0);
        assert_eq!(config.pool.count, 4);
        assert_eq!(config.pool.spacing, 100.0);
        assert_eq!(config.terrain, TerrainConfig::default());
    }

    #[test]
    fn yaml_round_trip() {
        let config = DriveConfig::default();
        let text = config.to_yaml().unwrap();
        assert_eq!(DriveConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn zero_segments_rejected() {
        let err = DriveConfig::from_yaml_str("terrain:\n  width_segments: 0\n").unwrap_err();
        assert!(matches!(err, KernelError::InvalidConfiguration(_)));
    }

    #[test]
    fn zero_pool_rejected() {
        let mut config = DriveConfig::default();
        config.pool.count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_period_rejected() {
        let mut config = DriveConfig::default();
        config.ground.repeat_period = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = DriveConfig::from_yaml_str("speed: [fast").unwrap_err();
        assert!(matches!(err, KernelError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drive.yaml");
        std::fs::write(&path, "speed: 12.5\n").unwrap();
        assert_eq!(DriveConfig::load(&path).unwrap().speed, 12.5);
        assert!(matches!(
            DriveConfig::load(dir.path().join("missing.yaml")),
            Err(KernelError::Io(_))
        ));
    }
}
