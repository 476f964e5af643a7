use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{window, HtmlElement};

use super::dom::{DomController, DomPlatform};
use crate::config::{AlphaMode, AnchorPolicy, EffectConfig, EffectOptions};
use crate::lifecycle::EffectController;

const CONTAINER_CLASS: &str = "light-rays-container";

/// Ray-light background bound to one container element.
///
/// The effect stays dormant until the container scrolls into view and releases
/// its WebGL context whenever it leaves. Call `destroy()` (or `free()`) when
/// the container goes away.
#[wasm_bindgen]
pub struct LightRays {
    controller: Rc<RefCell<DomController>>,
}

#[wasm_bindgen]
impl LightRays {
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, config: JsValue) -> LightRays {
        Self::mount(container, config_from_js(&config), EffectOptions::default())
    }

    /// Like the constructor, with the fixed presentation modes spelled out.
    #[wasm_bindgen(js_name = withOptions)]
    pub fn with_options(
        container: HtmlElement,
        config: JsValue,
        opaque: bool,
        anchor_on_resize_only: bool,
    ) -> LightRays {
        let options = EffectOptions {
            alpha: if opaque { AlphaMode::Opaque } else { AlphaMode::Intensity },
            anchor_policy: if anchor_on_resize_only {
                AnchorPolicy::ResizeOnly
            } else {
                AnchorPolicy::FollowConfig
            },
            ..EffectOptions::default()
        };
        Self::mount(container, config_from_js(&config), options)
    }

    #[wasm_bindgen(js_name = mountById)]
    pub fn mount_by_id(id: &str, config: JsValue) -> Result<LightRays, JsValue> {
        let window = window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let container = document
            .get_element_by_id(id)
            .ok_or("container not found")?
            .dyn_into::<HtmlElement>()?;
        Ok(Self::new(container, config))
    }

    /// Applies new props without rebuilding the surface.
    pub fn update(&self, config: JsValue) {
        let next = config_from_js(&config);
        let mut controller = self.controller.borrow_mut();
        let previous = controller.config().class_name.clone();
        if previous != next.class_name {
            let container = controller.platform().container();
            swap_classes(container, &previous, &next.class_name);
        }
        controller.update_config(next);
    }

    pub fn destroy(&self) {
        self.controller.borrow_mut().unmount();
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.controller.borrow().phase().as_str().to_owned()
    }
}

impl LightRays {
    fn mount(container: HtmlElement, config: EffectConfig, options: EffectOptions) -> LightRays {
        swap_classes(&container, "", &format!("{CONTAINER_CLASS} {}", config.class_name));
        contain_canvas(&container);
        let controller = Rc::new_cyclic(|weak| {
            let platform = DomPlatform::new(container, weak.clone());
            RefCell::new(EffectController::new(platform, config, options))
        });
        controller.borrow_mut().mount();
        LightRays { controller }
    }
}

fn swap_classes(container: &HtmlElement, old: &str, new: &str) {
    let classes = container.class_list();
    for token in old.split_whitespace().filter(|t| *t != CONTAINER_CLASS) {
        let _ = classes.remove_1(token);
    }
    for token in new.split_whitespace() {
        if let Err(err) = classes.add_1(token) {
            log::warn!("invalid class name {token:?}: {:?}", err);
        }
    }
}

/// The canvas is absolutely positioned, so a statically positioned container
/// becomes its containing block.
fn contain_canvas(container: &HtmlElement) {
    let position = window()
        .and_then(|w| w.get_computed_style(container).ok().flatten())
        .and_then(|style| style.get_property_value("position").ok())
        .unwrap_or_default();
    if position.is_empty() || position == "static" {
        if let Err(err) = container.style().set_property("position", "relative") {
            log::warn!("cannot position container: {:?}", err);
        }
    }
}

/// Accepts a props object, a JSON string, or nothing.
fn config_from_js(value: &JsValue) -> EffectConfig {
    if value.is_undefined() || value.is_null() {
        return EffectConfig::default();
    }
    if let Some(text) = value.as_string() {
        return EffectConfig::from_json(&text);
    }
    match js_sys::JSON::stringify(value).ok().and_then(|s| s.as_string()) {
        Some(text) => EffectConfig::from_json(&text),
        None => {
            log::warn!("effect config is not serializable; using defaults");
            EffectConfig::default()
        }
    }
}
