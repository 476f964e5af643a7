//! Render surface: one GPU context, the ray program and its uniform set.

use crate::config::{AnchorPolicy, EffectConfig};
use crate::geometry::{anchor_and_direction, RaysOrigin};
use crate::uniforms::{DirtySet, RayUniforms, Uniform, UniformValue, UniformWrite};

/// Backend operations a [`Surface`] needs from the graphics API.
///
/// Implementations own the context, compiled program and full-screen geometry
/// from the moment they are constructed.
pub trait GpuContext {
    /// Resizes the drawing buffer and viewport, in device pixels.
    fn resize(&mut self, width: u32, height: u32);
    /// Uploads the slots in `dirty`.
    fn upload(&mut self, uniforms: &RayUniforms, dirty: DirtySet);
    fn draw(&mut self);
    /// Drops every GPU handle, forces context loss and detaches the canvas.
    /// Must tolerate repeated calls.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    /// Device pixel ratio after capping.
    pub pixel_ratio: f64,
    pub anchor_policy: AnchorPolicy,
}

pub struct Surface<G: GpuContext> {
    gpu: G,
    uniforms: RayUniforms,
    origin: RaysOrigin,
    options: SurfaceOptions,
    pixel_size: Option<(u32, u32)>,
    destroyed: bool,
}

impl<G: GpuContext> Surface<G> {
    pub fn new(gpu: G, config: &EffectConfig, options: SurfaceOptions) -> Self {
        Self {
            gpu,
            uniforms: RayUniforms::from_config(config),
            origin: config.origin,
            options,
            pixel_size: None,
            destroyed: false,
        }
    }

    /// Adopts a new container size in CSS pixels. Calling it again with the
    /// same size changes nothing.
    pub fn resize(&mut self, css_width: f64, css_height: f64) {
        if self.destroyed {
            return;
        }
        let ratio = self.options.pixel_ratio;
        let to_px = |css: f64| (css.max(0.0) * ratio).round().max(1.0) as u32;
        let size = (to_px(css_width), to_px(css_height));
        if self.pixel_size != Some(size) {
            log::debug!("surface resized to {}x{} px", size.0, size.1);
            self.gpu.resize(size.0, size.1);
            self.pixel_size = Some(size);
        }
        self.uniforms.set(
            Uniform::Resolution,
            UniformValue::Vec2([size.0 as f32, size.1 as f32]),
        );
        self.place_rays();
    }

    fn place_rays(&mut self) {
        let [w, h] = self.uniforms.vec2(Uniform::Resolution);
        let placement = anchor_and_direction(self.origin, w, h);
        self.uniforms
            .set(Uniform::RayPos, UniformValue::Vec2(placement.anchor));
        self.uniforms
            .set(Uniform::RayDir, UniformValue::Vec2(placement.direction));
    }

    /// Applies writes in place. Origin writes move the anchor right away under
    /// [`AnchorPolicy::FollowConfig`] and wait for the next resize otherwise.
    pub fn set_uniforms(&mut self, writes: &[UniformWrite]) {
        if self.destroyed {
            return;
        }
        for write in writes {
            match *write {
                UniformWrite::Set(slot, value) => {
                    self.uniforms.set(slot, value);
                }
                UniformWrite::Origin(origin) => {
                    self.origin = origin;
                    if self.options.anchor_policy == AnchorPolicy::FollowConfig
                        && self.pixel_size.is_some()
                    {
                        self.place_rays();
                    }
                }
            }
        }
    }

    /// Draws one frame at `time_seconds` with the current uniform values.
    pub fn render_frame(&mut self, time_seconds: f32) {
        if self.destroyed {
            return;
        }
        self.uniforms
            .set(Uniform::Time, UniformValue::Float(time_seconds));
        let dirty = self.uniforms.take_dirty();
        self.gpu.upload(&self.uniforms, dirty);
        self.gpu.draw();
    }

    /// Releases the GPU context. Later calls, and any other operation after
    /// this one, are no-ops.
    pub fn destroy(&mut self) {
        if std::mem::replace(&mut self.destroyed, true) {
            return;
        }
        log::debug!("destroying render surface");
        self.gpu.release();
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn uniforms(&self) -> &RayUniforms {
        &self.uniforms
    }

    pub fn origin(&self) -> RaysOrigin {
        self.origin
    }

    /// Drawing buffer size, once the first resize has happened.
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        self.pixel_size
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }
}

impl<G: GpuContext> Drop for Surface<G> {
    fn drop(&mut self) {
        self.destroy();
    }
}
