//! Caller-facing configuration.
//!
//! [`EffectConfig`] is reactive: hosts may replace it at any time and the
//! running surface picks the change up through uniform writes.
//! [`EffectOptions`] is fixed for the lifetime of a controller.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::geometry::RaysOrigin;

pub const DEFAULT_COLOR: &str = "#ffffff";

/// Lower bound for the length-like fields; both are used as divisors.
const MIN_DISTANCE: f32 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct EffectConfig {
    pub origin: RaysOrigin,
    pub color: String,
    pub speed: f32,
    pub spread: f32,
    pub length: f32,
    pub pulsating: bool,
    pub fade_distance: f32,
    pub saturation: f32,
    pub follow_mouse: bool,
    pub mouse_influence: f32,
    pub noise_amount: f32,
    pub distortion: f32,
    pub class_name: String,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            origin: RaysOrigin::TopCenter,
            color: DEFAULT_COLOR.to_owned(),
            speed: 1.0,
            spread: 1.0,
            length: 2.0,
            pulsating: false,
            fade_distance: 1.0,
            saturation: 1.0,
            follow_mouse: true,
            mouse_influence: 0.1,
            noise_amount: 0.0,
            distortion: 0.0,
            class_name: String::new(),
        }
    }
}

/// Wire form of [`EffectConfig`]. Every field is optional and a field of the
/// wrong type is treated as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PartialConfig {
    #[serde(deserialize_with = "lenient")]
    rays_origin: Option<RaysOrigin>,
    #[serde(deserialize_with = "lenient")]
    rays_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    rays_speed: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    light_spread: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    ray_length: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pulsating: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    fade_distance: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    saturation: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    follow_mouse: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    mouse_influence: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    noise_amount: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    distortion: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    class_name: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl EffectConfig {
    /// Decodes a JSON object using the component's camelCase prop names.
    /// Never fails: unusable input yields the defaults.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<PartialConfig>(text) {
            Ok(partial) => Self::default().merged(partial).sanitized(),
            Err(err) => {
                log::warn!("ignoring malformed effect config: {err}");
                Self::default()
            }
        }
    }

    fn merged(mut self, p: PartialConfig) -> Self {
        macro_rules! take {
            ($($src:ident => $dst:ident),* $(,)?) => {
                $(if let Some(v) = p.$src { self.$dst = v; })*
            };
        }
        take!(
            rays_origin => origin,
            rays_color => color,
            rays_speed => speed,
            light_spread => spread,
            ray_length => length,
            pulsating => pulsating,
            fade_distance => fade_distance,
            saturation => saturation,
            follow_mouse => follow_mouse,
            mouse_influence => mouse_influence,
            noise_amount => noise_amount,
            distortion => distortion,
            class_name => class_name,
        );
        self
    }

    /// Replaces non-finite numbers with their defaults and clamps the rest
    /// into the range the shader can handle.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        let finite = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        self.speed = finite(self.speed, d.speed);
        self.spread = finite(self.spread, d.spread).max(0.0);
        self.length = finite(self.length, d.length).max(MIN_DISTANCE);
        self.fade_distance = finite(self.fade_distance, d.fade_distance).max(MIN_DISTANCE);
        self.saturation = finite(self.saturation, d.saturation).max(0.0);
        self.mouse_influence = finite(self.mouse_influence, d.mouse_influence).clamp(0.0, 1.0);
        self.noise_amount = finite(self.noise_amount, d.noise_amount).clamp(0.0, 1.0);
        self.distortion = finite(self.distortion, d.distortion);
        self
    }

    /// Whether the per-frame pointer smoothing step should run.
    pub fn tracks_pointer(&self) -> bool {
        self.follow_mouse && self.mouse_influence > 0.0
    }
}

/// How the fragment stage writes alpha.
///
/// `Intensity` lets the page background show through wherever the rays are
/// dim; `Opaque` paints a solid surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Intensity,
    Opaque,
}

/// When the anchor and direction are recomputed from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorPolicy {
    /// On every resize and immediately when the configured origin changes.
    #[default]
    FollowConfig,
    /// Only on resize; an origin change waits for the next resize.
    ResizeOnly,
}

/// Presentation options fixed at construction. Changing any of these requires
/// a new controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectOptions {
    pub alpha: AlphaMode,
    pub anchor_policy: AnchorPolicy,
    /// Cap on the device pixel ratio used for the drawing buffer.
    pub max_pixel_ratio: f64,
    /// Animation frames to wait after becoming visible before touching the GPU.
    pub defer_frames: u8,
    pub visibility_threshold: f64,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            alpha: AlphaMode::Intensity,
            anchor_policy: AnchorPolicy::FollowConfig,
            max_pixel_ratio: 2.0,
            defer_frames: 2,
            visibility_threshold: 0.01,
        }
    }
}
