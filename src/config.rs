use anyhow::Result;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::ecs::components::{palette, Rgba, ShapeColor};

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub camera: CameraConfigData,
    pub player: PlayerConfigData,
    pub click: ClickConfigData,
    pub level: LevelStyle,
    /// Zoom used by the headless runner when no input supplies one
    pub zoom: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfigData::default(),
            player: PlayerConfigData::default(),
            click: ClickConfigData::default(),
            level: LevelStyle::default(),
            zoom: 1.0,
        }
    }
}

impl SimConfig {
    /// Load configuration from JSON file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file with pretty formatting
    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_default(path: &str) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Using default config ({}): {}", path, e);
            let config = Self::default();
            // Try to save the default config
            let _ = config.save(path);
            config
        })
    }
}

/// World rectangle the camera starts on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfigData {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for CameraConfigData {
    fn default() -> Self {
        Self {
            left: 0.0,
            right: 8.0,
            top: 0.0,
            bottom: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfigData {
    #[serde(with = "dvec2_serde")]
    pub position: DVec2,
    pub radius: f64,
    #[serde(with = "shape_color_serde")]
    pub color: ShapeColor,
}

impl Default for PlayerConfigData {
    fn default() -> Self {
        Self {
            position: DVec2::new(4.0, 4.0),
            radius: 0.05,
            color: ShapeColor::fill(palette::YELLOW),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickConfigData {
    /// Radius of the click marker's hit-test circle
    pub marker_radius: f64,
}

impl Default for ClickConfigData {
    fn default() -> Self {
        Self { marker_radius: 0.1 }
    }
}

/// How materialized level entities look
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelStyle {
    pub vertex_radius: f64,
    #[serde(with = "shape_color_serde")]
    pub vertex_color: ShapeColor,
    #[serde(with = "rgba_serde")]
    pub edge_stroke: Rgba,
    pub edge_stroke_weight: f64,
}

impl Default for LevelStyle {
    fn default() -> Self {
        Self {
            vertex_radius: 0.1,
            vertex_color: ShapeColor::fill(palette::GREEN),
            edge_stroke: palette::BLACK,
            edge_stroke_weight: 1.0,
        }
    }
}

/// Custom serialization for DVec2
pub(crate) mod dvec2_serde {
    use glam::DVec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct DVec2Data {
        x: f64,
        y: f64,
    }

    pub fn serialize<S>(vec: &DVec2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        DVec2Data { x: vec.x, y: vec.y }.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DVec2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = DVec2Data::deserialize(deserializer)?;
        Ok(DVec2::new(data.x, data.y))
    }
}

/// Custom serialization for colours as `{r, g, b, a}`
pub(crate) mod rgba_serde {
    use crate::ecs::components::Rgba;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    pub(super) struct RgbaData {
        r: f32,
        g: f32,
        b: f32,
        #[serde(default = "opaque")]
        a: f32,
    }

    fn opaque() -> f32 {
        1.0
    }

    impl From<Rgba> for RgbaData {
        fn from(c: Rgba) -> Self {
            Self {
                r: c.x,
                g: c.y,
                b: c.z,
                a: c.w,
            }
        }
    }

    impl From<RgbaData> for Rgba {
        fn from(data: RgbaData) -> Self {
            Rgba::new(data.r, data.g, data.b, data.a)
        }
    }

    pub fn serialize<S>(color: &Rgba, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RgbaData::from(*color).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Rgba, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(RgbaData::deserialize(deserializer)?.into())
    }
}

/// Custom serialization for fill/stroke pairs
pub(crate) mod shape_color_serde {
    use super::rgba_serde::RgbaData;
    use crate::ecs::components::ShapeColor;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct ShapeColorData {
        fill: RgbaData,
        stroke: RgbaData,
    }

    pub fn serialize<S>(color: &ShapeColor, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ShapeColorData {
            fill: color.fill.into(),
            stroke: color.stroke.into(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ShapeColor, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = ShapeColorData::deserialize(deserializer)?;
        Ok(ShapeColor::new(data.fill.into(), data.stroke.into()))
    }
}
