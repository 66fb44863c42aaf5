/// Tab Courier - browser extension popup that reads the active tab
/// and forwards its URL to a chat channel.
/// Built with Rust + WASM + Yew

mod bridge;
pub mod courier;
pub mod error;
pub mod inspect;
pub mod settings;
pub mod tab_data;
pub mod tabs;
mod transport;
pub mod ui;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
