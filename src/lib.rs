//! Client-side behaviour for a single-page CV site.
//!
//! Everything outside [`frontend`] is written against the [`dom::Node`] capability trait so
//! it runs, and is tested, on the host target. `frontend` binds it to the browser.

pub mod a11y;
pub mod config;
pub mod dom;
pub mod error;
pub mod forms;
pub mod logging;
pub mod modal;
pub mod navigation;
pub mod perf;
pub mod reveal;
pub mod startup;
pub mod theme;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod frontend;
