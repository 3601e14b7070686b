// MODEL: overlay configuration and UI state
pub mod config;
pub mod keymap;
pub mod overlay;

pub use config::{DevUiConfig, DevUiOptions, DEFAULT_BUTTON_PRESS_DURATION_MS};
pub use keymap::{ControllerAction, KeyMap};
pub use overlay::OverlayState;
