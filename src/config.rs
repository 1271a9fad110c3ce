//! Scene configuration.
//!
//! Everything tunable about the scene lives in [`SceneConfig`]. The defaults
//! reproduce the reference look; embedders can override fields before
//! handing the config to [`crate::flow::run_with_config`].

use crate::placement::AntiRepeat;

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 45.0,
            znear: 10.0,
            zfar: 2000.0,
            position: [0.0, 10.0, 45.0],
        }
    }
}

/// Parameters of the full-screen effect chain, applied in field order.
#[derive(Clone, Debug, PartialEq)]
pub struct PostProcessConfig {
    pub enabled: bool,
    /// UV offset of the red and blue channels.
    pub chromatic_offset: [f32; 2],
    pub bloom_threshold: f32,
    pub bloom_intensity: f32,
    pub noise_opacity: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    pub white_point: f32,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chromatic_offset: [0.001, 0.004],
            bloom_threshold: 0.0,
            bloom_intensity: 2.0,
            noise_opacity: 0.25,
            vignette_offset: 0.1,
            vignette_darkness: 0.9,
            white_point: 2.0,
        }
    }
}

/// One vector-art layer of the skyline.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgLayer {
    pub path: String,
    pub position: [f32; 3],
    pub scale: f32,
    pub name: String,
}

impl SvgLayer {
    pub fn new(path: &str, x: f32, y: f32, z: f32, scale: f32, name: &str) -> Self {
        Self {
            path: path.to_string(),
            position: [x, y, z],
            scale,
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetConfig {
    /// Paths are relative to the `assets/` directory (native) or site origin (web).
    pub skybox: String,
    pub svgs: Vec<SvgLayer>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            skybox: "skybox/2048/px.png".to_string(),
            svgs: vec![
                SvgLayer::new("scenery/sun.svg", -62.5, 90.0, -500.0, 0.11, "sun"),
                SvgLayer::new("scenery/city_far.svg", -68.5, 45.0, -450.0, 0.4, "cityFar"),
                SvgLayer::new("scenery/city_close.svg", -30.5, 45.0, -300.0, 0.2, "cityClose"),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub post: PostProcessConfig,
    pub assets: AssetConfig,
    pub ambient_intensity: f32,
    pub clear_colour: wgpu::Color,
    /// Fixed seed for the prop layout; `None` draws a new layout per run.
    pub seed: Option<u64>,
    pub anti_repeat: AntiRepeat,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            post: PostProcessConfig::default(),
            assets: AssetConfig::default(),
            ambient_intensity: 1.0,
            clear_colour: wgpu::Color::BLACK,
            seed: None,
            anti_repeat: AntiRepeat::PerCall,
        }
    }
}
