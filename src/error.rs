use thiserror::Error;
use wasm_bindgen::JsValue;

/// Shader stage reported in compile failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures that can occur while bringing up or driving the effect.
///
/// None of these are ever thrown into the host page from the render path; the
/// lifecycle controller logs them and stops rendering instead.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("WebGL2 context unavailable")]
    ContextUnavailable,
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {0}")]
    ProgramLink(String),
    #[error("failed to allocate {0}")]
    Resource(&'static str),
    #[error("dom: {0}")]
    Dom(String),
}

impl EffectError {
    /// Wraps a value thrown by a browser API.
    pub fn from_js(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        EffectError::Dom(message)
    }
}

impl From<EffectError> for JsValue {
    fn from(err: EffectError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
