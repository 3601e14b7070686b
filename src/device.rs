/// Surface the overlay consumes from the emulated headset.
///
/// The device itself (projection, session plumbing, controller emulation)
/// lives outside this crate; the overlay only ever writes the IPD once at
/// mount, edits the FOV through its menu, and forwards translated input.
/// Implementors are expected to use interior mutability; the overlay and
/// the input layer share one `Rc<dyn XrDeviceHandle>` and never take
/// exclusive ownership.
use crate::model::ControllerAction;

pub trait XrDeviceHandle {
    /// Interpupillary distance in meters. Forced to zero at mount so the
    /// overlay sits over a single centered stereo view.
    fn ipd(&self) -> f32;
    fn set_ipd(&self, meters: f32);

    /// Vertical field of view in radians, edited by the FOV menu.
    fn fov_y(&self) -> f32;
    fn set_fov_y(&self, radians: f32);

    /// Pointer-locked mouse look, in raw movement units.
    fn rotate_view(&self, dx: f32, dy: f32);

    /// Press or release an emulated controller action.
    fn set_action_pressed(&self, action: ControllerAction, pressed: bool);

    /// The DOM container the emulator renders its canvas into; the overlay
    /// appends its own nodes here.
    #[cfg(target_arch = "wasm32")]
    fn canvas_container(&self) -> web_sys::HtmlElement;
}
