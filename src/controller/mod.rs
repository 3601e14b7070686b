// CONTROLLER: input translation, pointer-lock plumbing, and the frame loop
pub mod input;
pub mod lock;
#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

pub use input::{InputEvent, InputLayer};
pub use lock::{LockEventHub, LockProbe, LockSubscription, LOCK_CHANGE_EVENTS};
#[cfg(target_arch = "wasm32")]
pub use frame_loop::OverlayLoop;
#[cfg(target_arch = "wasm32")]
pub use lock::{DocumentLockProbe, DomLockHub};
