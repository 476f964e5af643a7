//! Visibility-gated lifecycle of the ray effect.
//!
//! ```text
//! Unmounted -> WaitingForVisibility -> Initializing -> Running
//!                    ^                     |             |
//!                    +------ hidden -------+-------------+
//! any -> Destroyed (unmount)          Initializing -> Failed (GPU error)
//! ```
//!
//! The controller is driven entirely by callbacks from its [`Platform`]:
//! intersection and resize notifications, pointer moves and animation frames.
//! It never blocks; every frame schedules the next one.

use crate::config::{AlphaMode, EffectConfig, EffectOptions};
use crate::error::EffectError;
use crate::pointer::{ContainerRect, PointerState};
use crate::surface::{GpuContext, Surface, SurfaceOptions};
use crate::uniforms::{config_writes, Uniform, UniformValue, UniformWrite};

/// Host services for one container element.
///
/// Handles returned by the `observe_*`, `listen_*` and `request_*` methods are
/// always handed back through the matching release method; none are dropped
/// silently by the controller.
pub trait Platform {
    type Frame;
    type Observer;
    type Listener;
    type Gpu: GpuContext;

    /// Schedules one `on_animation_frame` call. `None` if the host refused.
    fn request_frame(&mut self) -> Option<Self::Frame>;
    fn cancel_frame(&mut self, frame: Self::Frame);

    /// Starts reporting intersection changes through `set_visible`.
    /// `None` when the host has no intersection observer.
    fn observe_visibility(&mut self, threshold: f64) -> Option<Self::Observer>;
    /// Starts reporting container size changes through `on_resize`.
    /// `None` when the host has no resize observer.
    fn observe_resize(&mut self) -> Option<Self::Observer>;
    fn disconnect(&mut self, observer: Self::Observer);

    /// Starts forwarding pointer moves to `on_pointer_move`.
    fn listen_pointer(&mut self) -> Option<Self::Listener>;
    fn unlisten_pointer(&mut self, listener: Self::Listener);

    fn container_rect(&self) -> ContainerRect;
    fn device_pixel_ratio(&self) -> f64;

    /// Creates a context, compiles the ray program and allocates geometry.
    fn create_gpu(&mut self, alpha: AlphaMode) -> Result<Self::Gpu, EffectError>;

    /// Told when the first frame of a session has been drawn and when the
    /// session ends.
    fn set_ready(&mut self, _ready: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    WaitingForVisibility,
    Initializing,
    Running,
    /// GPU setup failed. Nothing renders until unmount.
    Failed,
    Destroyed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Unmounted => "unmounted",
            Phase::WaitingForVisibility => "waiting-for-visibility",
            Phase::Initializing => "initializing",
            Phase::Running => "running",
            Phase::Failed => "failed",
            Phase::Destroyed => "destroyed",
        }
    }
}

pub struct EffectController<P: Platform> {
    platform: P,
    options: EffectOptions,
    config: EffectConfig,
    phase: Phase,
    visibility: Option<P::Observer>,
    resize: Option<P::Observer>,
    pointer_listener: Option<P::Listener>,
    pending_frame: Option<P::Frame>,
    defer_remaining: u8,
    surface: Option<Surface<P::Gpu>>,
    pointer: PointerState,
    writes: Vec<UniformWrite>,
    sessions: u64,
    ready: bool,
}

impl<P: Platform> EffectController<P> {
    pub fn new(platform: P, config: EffectConfig, options: EffectOptions) -> Self {
        Self {
            platform,
            options,
            config: config.sanitized(),
            phase: Phase::Unmounted,
            visibility: None,
            resize: None,
            pointer_listener: None,
            pending_frame: None,
            defer_remaining: 0,
            surface: None,
            pointer: PointerState::default(),
            writes: Vec::with_capacity(Uniform::COUNT + 1),
            sessions: 0,
            ready: false,
        }
    }

    /// Attaches the visibility observer and, if enabled, the pointer listener.
    /// Without an intersection observer the container counts as visible.
    pub fn mount(&mut self) {
        if self.phase != Phase::Unmounted {
            return;
        }
        self.phase = Phase::WaitingForVisibility;
        self.sync_pointer_listener();
        match self.platform.observe_visibility(self.options.visibility_threshold) {
            Some(observer) => self.visibility = Some(observer),
            None => {
                log::warn!("intersection observer unavailable, treating container as visible");
                self.set_visible(true);
            }
        }
    }

    /// Intersection callback.
    pub fn set_visible(&mut self, visible: bool) {
        match (self.phase, visible) {
            (Phase::WaitingForVisibility, true) => self.begin_session(),
            (Phase::Initializing | Phase::Running, false) => {
                self.end_session();
                self.phase = Phase::WaitingForVisibility;
            }
            _ => {}
        }
    }

    fn begin_session(&mut self) {
        self.sessions += 1;
        log::debug!("visibility session {} started", self.sessions);
        self.phase = Phase::Initializing;
        self.defer_remaining = self.options.defer_frames;
        if self.defer_remaining == 0 {
            self.initialize();
        } else {
            self.schedule_frame();
        }
    }

    fn schedule_frame(&mut self) {
        debug_assert!(self.pending_frame.is_none());
        self.pending_frame = self.platform.request_frame();
        if self.pending_frame.is_none() {
            log::warn!("animation frame request refused; effect paused");
        }
    }

    /// Animation frame callback; `timestamp_ms` is the host's frame clock.
    pub fn on_animation_frame(&mut self, timestamp_ms: f64) {
        // Frames cancelled by a transition can still be delivered by hosts
        // that race the cancellation; only the outstanding request counts.
        if self.pending_frame.take().is_none() {
            return;
        }
        match self.phase {
            Phase::Initializing => {
                self.defer_remaining = self.defer_remaining.saturating_sub(1);
                if self.defer_remaining == 0 {
                    self.initialize();
                } else {
                    self.schedule_frame();
                }
            }
            Phase::Running => self.tick(timestamp_ms),
            _ => {}
        }
    }

    fn initialize(&mut self) {
        let gpu = match self.platform.create_gpu(self.options.alpha) {
            Ok(gpu) => gpu,
            Err(err) => {
                log::error!("light rays disabled: {err}");
                self.phase = Phase::Failed;
                return;
            }
        };
        let reported = self.platform.device_pixel_ratio();
        let pixel_ratio = if reported.is_finite() && reported > 0.0 {
            reported.min(self.options.max_pixel_ratio)
        } else {
            1.0
        };
        let mut surface = Surface::new(
            gpu,
            &self.config,
            SurfaceOptions {
                pixel_ratio,
                anchor_policy: self.options.anchor_policy,
            },
        );
        surface.set_uniforms(&[UniformWrite::Set(
            Uniform::MousePos,
            UniformValue::Vec2(self.pointer.smoothed()),
        )]);
        self.resize = self.platform.observe_resize();
        if self.resize.is_none() {
            log::warn!("resize observer unavailable, surface size is fixed");
        }
        let rect = self.platform.container_rect();
        surface.resize(rect.width, rect.height);
        self.surface = Some(surface);
        self.phase = Phase::Running;
        log::debug!("render surface ready at pixel ratio {pixel_ratio}");
        self.schedule_frame();
    }

    fn tick(&mut self, timestamp_ms: f64) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.config.tracks_pointer() {
            let smoothed = self.pointer.step();
            surface.set_uniforms(&[UniformWrite::Set(
                Uniform::MousePos,
                UniformValue::Vec2(smoothed),
            )]);
        }
        surface.render_frame((timestamp_ms * 0.001) as f32);
        if !self.ready {
            self.ready = true;
            self.platform.set_ready(true);
        }
        self.schedule_frame();
    }

    /// Resize observer callback.
    pub fn on_resize(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let rect = self.platform.container_rect();
            surface.resize(rect.width, rect.height);
        }
    }

    /// Pointer move callback, in viewport coordinates.
    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64) {
        if !self.config.follow_mouse {
            return;
        }
        if let Some(position) = self.platform.container_rect().normalize(client_x, client_y) {
            self.pointer.record(position);
        }
    }

    /// Replaces the configuration. A live surface receives only the changed
    /// uniforms; it is never rebuilt.
    pub fn update_config(&mut self, next: EffectConfig) {
        let next = next.sanitized();
        self.writes.clear();
        config_writes(&self.config, &next, &mut self.writes);
        self.config = next;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_uniforms(&self.writes);
        }
        if matches!(self.phase, Phase::Unmounted | Phase::Destroyed) {
            return;
        }
        self.sync_pointer_listener();
    }

    fn sync_pointer_listener(&mut self) {
        match (self.config.follow_mouse, self.pointer_listener.is_some()) {
            (true, false) => self.pointer_listener = self.platform.listen_pointer(),
            (false, true) => {
                if let Some(listener) = self.pointer_listener.take() {
                    self.platform.unlisten_pointer(listener);
                }
            }
            _ => {}
        }
    }

    /// Stops the loop, disconnects the resize observer and destroys the
    /// surface, in that order.
    fn end_session(&mut self) {
        if let Some(frame) = self.pending_frame.take() {
            self.platform.cancel_frame(frame);
        }
        if let Some(observer) = self.resize.take() {
            self.platform.disconnect(observer);
        }
        if let Some(mut surface) = self.surface.take() {
            surface.destroy();
        }
        if std::mem::take(&mut self.ready) {
            self.platform.set_ready(false);
        }
        log::debug!("visibility session {} ended", self.sessions);
    }

    /// Tears everything down. Terminal.
    pub fn unmount(&mut self) {
        if self.phase == Phase::Destroyed {
            return;
        }
        self.end_session();
        if let Some(observer) = self.visibility.take() {
            self.platform.disconnect(observer);
        }
        if let Some(listener) = self.pointer_listener.take() {
            self.platform.unlisten_pointer(listener);
        }
        self.phase = Phase::Destroyed;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&Surface<P::Gpu>> {
        self.surface.as_ref()
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Number of visibility sessions started so far.
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}

impl<P: Platform> Drop for EffectController<P> {
    fn drop(&mut self) {
        self.unmount();
    }
}
