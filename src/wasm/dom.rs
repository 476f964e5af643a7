use std::cell::RefCell;
use std::rc::Weak;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, AddEventListenerOptions, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, PointerEvent, ResizeObserver,
};

use super::render::WebGlContext;
use crate::config::AlphaMode;
use crate::error::EffectError;
use crate::lifecycle::{EffectController, Platform};
use crate::pointer::ContainerRect;

pub type DomController = EffectController<DomPlatform>;

/// Browser services for one container. Callbacks reach the controller through
/// a weak handle so a dropped controller simply stops receiving them.
pub struct DomPlatform {
    container: HtmlElement,
    controller: Weak<RefCell<DomController>>,
    frame_callback: Closure<dyn FnMut(f64)>,
}

/// A connected observer together with the callback it invokes.
pub enum DomObserver {
    Intersection(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>),
    Resize(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>),
}

pub struct PointerListener {
    callback: Closure<dyn FnMut(PointerEvent)>,
}

/// Runs `f` against the controller unless it is gone or already borrowed.
fn with_controller(handle: &Weak<RefCell<DomController>>, f: impl FnOnce(&mut DomController)) {
    let Some(controller) = handle.upgrade() else {
        return;
    };
    match controller.try_borrow_mut() {
        Ok(mut controller) => f(&mut controller),
        Err(_) => log::warn!("light rays callback re-entered; event dropped"),
    };
}

impl DomPlatform {
    pub fn new(container: HtmlElement, controller: Weak<RefCell<DomController>>) -> Self {
        let frame_callback = {
            let handle = controller.clone();
            Closure::wrap(Box::new(move |timestamp: f64| {
                with_controller(&handle, |c| c.on_animation_frame(timestamp));
            }) as Box<dyn FnMut(f64)>)
        };
        Self {
            container,
            controller,
            frame_callback,
        }
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }
}

impl Platform for DomPlatform {
    type Frame = i32;
    type Observer = DomObserver;
    type Listener = PointerListener;
    type Gpu = WebGlContext;

    fn request_frame(&mut self) -> Option<i32> {
        let window = window()?;
        window
            .request_animation_frame(self.frame_callback.as_ref().unchecked_ref())
            .map_err(|err| log::warn!("requestAnimationFrame failed: {:?}", err))
            .ok()
    }

    fn cancel_frame(&mut self, frame: i32) {
        if let Some(window) = window() {
            let _ = window.cancel_animation_frame(frame);
        }
    }

    fn observe_visibility(&mut self, threshold: f64) -> Option<DomObserver> {
        let handle = self.controller.clone();
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let latest = entries
                .iter()
                .last()
                .and_then(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok());
            if let Some(entry) = latest {
                let visible = entry.is_intersecting();
                with_controller(&handle, |c| c.set_visible(visible));
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|err| log::debug!("IntersectionObserver: {:?}", err))
                .ok()?;
        observer.observe(&self.container);
        Some(DomObserver::Intersection(observer, callback))
    }

    fn observe_resize(&mut self) -> Option<DomObserver> {
        let handle = self.controller.clone();
        let callback = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            with_controller(&handle, |c| c.on_resize());
        }) as Box<dyn FnMut(js_sys::Array)>);
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|err| log::debug!("ResizeObserver: {:?}", err))
            .ok()?;
        observer.observe(&self.container);
        Some(DomObserver::Resize(observer, callback))
    }

    fn disconnect(&mut self, observer: DomObserver) {
        match observer {
            DomObserver::Intersection(observer, _callback) => observer.disconnect(),
            DomObserver::Resize(observer, _callback) => observer.disconnect(),
        }
    }

    fn listen_pointer(&mut self) -> Option<PointerListener> {
        let window = window()?;
        let handle = self.controller.clone();
        let callback = Closure::wrap(Box::new(move |event: PointerEvent| {
            let (x, y) = (f64::from(event.client_x()), f64::from(event.client_y()));
            with_controller(&handle, |c| c.on_pointer_move(x, y));
        }) as Box<dyn FnMut(PointerEvent)>);

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "pointermove",
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| log::warn!("pointer tracking unavailable: {:?}", err))
            .ok()?;
        Some(PointerListener { callback })
    }

    fn unlisten_pointer(&mut self, listener: PointerListener) {
        if let Some(window) = window() {
            let _ = window.remove_event_listener_with_callback(
                "pointermove",
                listener.callback.as_ref().unchecked_ref(),
            );
        }
    }

    fn container_rect(&self) -> ContainerRect {
        let bounds = self.container.get_bounding_client_rect();
        ContainerRect::new(bounds.left(), bounds.top(), bounds.width(), bounds.height())
    }

    fn device_pixel_ratio(&self) -> f64 {
        window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
    }

    fn create_gpu(&mut self, alpha: AlphaMode) -> Result<WebGlContext, EffectError> {
        WebGlContext::create(&self.container, alpha)
    }

    fn set_ready(&mut self, ready: bool) {
        let value = if ready { "true" } else { "false" };
        if let Err(err) = self.container.set_attribute("data-ready", value) {
            log::debug!("failed to flag readiness: {:?}", err);
        }
    }
}
