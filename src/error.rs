use thiserror::Error;

/// Faults that abort site startup. Missing optional markup is not an error; features
/// without their elements are simply not wired.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("window is not available")]
    MissingWindow,

    #[error("document is not available")]
    MissingDocument,

    #[error("document has no body")]
    MissingBody,

    #[error("invalid site config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("browser call failed: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for SiteError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &wasm_bindgen::JsValue::from_str("message"))
                    .ok()
                    .and_then(|message| message.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Js(message)
    }
}
