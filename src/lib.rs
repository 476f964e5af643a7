//! Visibility-gated ray-light background effect for web pages.
//!
//! The platform-independent pieces (color and placement helpers, the uniform
//! buffer, the render surface and the lifecycle state machine) build on any
//! target. The browser bindings live in `wasm` and are only compiled for
//! `wasm32`.

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod pointer;
pub mod shader;
pub mod surface;
pub mod uniforms;

pub use color::color_to_linear_triple;
pub use config::{AlphaMode, AnchorPolicy, EffectConfig, EffectOptions};
pub use error::EffectError;
pub use geometry::{anchor_and_direction, RayPlacement, RaysOrigin};
pub use lifecycle::{EffectController, Phase, Platform};
pub use surface::{GpuContext, Surface, SurfaceOptions};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod dom;
    mod effect;
    mod render;

    pub use effect::LightRays;

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        // The console logger accepts everything; `setLogLevel` narrows it.
        if console_log::init_with_level(log::Level::Trace).is_ok() {
            log::set_max_level(if cfg!(debug_assertions) {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            });
        }
    }

    /// Adjusts log verbosity at runtime ("off", "error", ..., "trace").
    #[wasm_bindgen(js_name = setLogLevel)]
    pub fn set_log_level(level: &str) {
        match level.parse::<log::LevelFilter>() {
            Ok(filter) => log::set_max_level(filter),
            Err(_) => log::warn!("unknown log level {level:?}"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{set_log_level, LightRays};
