//! voice-nav UI - browser client for spoken page control

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod queue;
pub mod reconcile;
pub mod session;
pub mod speech;
pub mod status;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use client::{ClientCommand, ClientEvent, ClientParts, VoiceClient};
pub use config::ClientConfig;
pub use error::VoiceError;
pub use queue::EventQueue;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    web_sys::console::log_1(&"=== voice-nav WASM loaded ===".into());
}
