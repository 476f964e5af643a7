#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use light_rays::error::EffectError;
use light_rays::pointer::ContainerRect;
use light_rays::uniforms::{DirtySet, RayUniforms};
use light_rays::{AlphaMode, EffectConfig, EffectController, EffectOptions, GpuContext, Platform};

/// Everything the fake host observed, shared between the platform, the GPU
/// contexts it hands out and the test body.
#[derive(Debug)]
pub struct Host {
    pub rect: ContainerRect,
    pub pixel_ratio: f64,
    pub intersection_supported: bool,
    pub resize_supported: bool,
    pub gpu_fails: bool,

    pub next_frame: u64,
    pub pending_frames: Vec<u64>,
    pub max_pending_frames: usize,
    pub cancelled_frames: usize,

    pub observers_attached: usize,
    pub observers_disconnected: usize,
    pub listeners_attached: usize,
    pub listeners_detached: usize,

    pub contexts_created: usize,
    pub contexts_released: usize,
    pub gpu_resizes: Vec<(u32, u32)>,
    pub uploads: Vec<DirtySet>,
    pub draws: usize,
    pub draws_after_release: usize,
    pub alpha_modes: Vec<AlphaMode>,
    pub ready_signals: Vec<bool>,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            rect: ContainerRect::new(0.0, 100.0, 800.0, 400.0),
            pixel_ratio: 1.0,
            intersection_supported: true,
            resize_supported: true,
            gpu_fails: false,
            next_frame: 0,
            pending_frames: Vec::new(),
            max_pending_frames: 0,
            cancelled_frames: 0,
            observers_attached: 0,
            observers_disconnected: 0,
            listeners_attached: 0,
            listeners_detached: 0,
            contexts_created: 0,
            contexts_released: 0,
            gpu_resizes: Vec::new(),
            uploads: Vec::new(),
            draws: 0,
            draws_after_release: 0,
            alpha_modes: Vec::new(),
            ready_signals: Vec::new(),
        }
    }
}

pub type SharedHost = Rc<RefCell<Host>>;

pub struct FakeGpu {
    host: SharedHost,
    released: bool,
}

impl GpuContext for FakeGpu {
    fn resize(&mut self, width: u32, height: u32) {
        self.host.borrow_mut().gpu_resizes.push((width, height));
    }

    fn upload(&mut self, _uniforms: &RayUniforms, dirty: DirtySet) {
        self.host.borrow_mut().uploads.push(dirty);
    }

    fn draw(&mut self) {
        let mut host = self.host.borrow_mut();
        host.draws += 1;
        if self.released {
            host.draws_after_release += 1;
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.host.borrow_mut().contexts_released += 1;
        }
    }
}

pub struct FakePlatform {
    host: SharedHost,
}

pub struct Observer;
pub struct Listener;

impl Platform for FakePlatform {
    type Frame = u64;
    type Observer = Observer;
    type Listener = Listener;
    type Gpu = FakeGpu;

    fn request_frame(&mut self) -> Option<u64> {
        let mut host = self.host.borrow_mut();
        host.next_frame += 1;
        let id = host.next_frame;
        host.pending_frames.push(id);
        host.max_pending_frames = host.max_pending_frames.max(host.pending_frames.len());
        Some(id)
    }

    fn cancel_frame(&mut self, frame: u64) {
        let mut host = self.host.borrow_mut();
        host.pending_frames.retain(|f| *f != frame);
        host.cancelled_frames += 1;
    }

    fn observe_visibility(&mut self, _threshold: f64) -> Option<Observer> {
        let mut host = self.host.borrow_mut();
        if !host.intersection_supported {
            return None;
        }
        host.observers_attached += 1;
        Some(Observer)
    }

    fn observe_resize(&mut self) -> Option<Observer> {
        let mut host = self.host.borrow_mut();
        if !host.resize_supported {
            return None;
        }
        host.observers_attached += 1;
        Some(Observer)
    }

    fn disconnect(&mut self, _observer: Observer) {
        self.host.borrow_mut().observers_disconnected += 1;
    }

    fn listen_pointer(&mut self) -> Option<Listener> {
        self.host.borrow_mut().listeners_attached += 1;
        Some(Listener)
    }

    fn unlisten_pointer(&mut self, _listener: Listener) {
        self.host.borrow_mut().listeners_detached += 1;
    }

    fn container_rect(&self) -> ContainerRect {
        self.host.borrow().rect
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.host.borrow().pixel_ratio
    }

    fn create_gpu(&mut self, alpha: AlphaMode) -> Result<FakeGpu, EffectError> {
        let mut host = self.host.borrow_mut();
        if host.gpu_fails {
            return Err(EffectError::ContextUnavailable);
        }
        host.contexts_created += 1;
        host.alpha_modes.push(alpha);
        Ok(FakeGpu {
            host: Rc::clone(&self.host),
            released: false,
        })
    }

    fn set_ready(&mut self, ready: bool) {
        self.host.borrow_mut().ready_signals.push(ready);
    }
}

pub type Controller = EffectController<FakePlatform>;

pub fn controller_with(
    host: Host,
    config: EffectConfig,
    options: EffectOptions,
) -> (Controller, SharedHost) {
    let host = Rc::new(RefCell::new(host));
    let platform = FakePlatform {
        host: Rc::clone(&host),
    };
    (EffectController::new(platform, config, options), host)
}

pub fn controller() -> (Controller, SharedHost) {
    controller_with(Host::default(), EffectConfig::default(), EffectOptions::default())
}

/// Delivers the outstanding animation frame, if any. Returns whether one was
/// delivered.
pub fn pump(controller: &mut Controller, host: &SharedHost, timestamp_ms: f64) -> bool {
    let next = {
        let mut host = host.borrow_mut();
        if host.pending_frames.is_empty() {
            None
        } else {
            Some(host.pending_frames.remove(0))
        }
    };
    match next {
        Some(_) => {
            controller.on_animation_frame(timestamp_ms);
            true
        }
        None => false,
    }
}

/// Mounts, reports visibility and runs the deferred initialization.
pub fn running() -> (Controller, SharedHost) {
    let (mut controller, host) = controller();
    controller.mount();
    controller.set_visible(true);
    pump(&mut controller, &host, 16.0);
    pump(&mut controller, &host, 32.0);
    (controller, host)
}

/// A GPU context reporting into `host`, for driving a `Surface` directly.
pub fn gpu(host: &SharedHost) -> FakeGpu {
    host.borrow_mut().contexts_created += 1;
    FakeGpu {
        host: Rc::clone(host),
        released: false,
    }
}

pub fn shared_host() -> SharedHost {
    Rc::new(RefCell::new(Host::default()))
}
