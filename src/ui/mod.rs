/// UI module exports
pub mod popup;
mod components;
