/// Input-capture layer: translates raw pointer/keyboard events into the
/// emulator's input model.
use std::collections::HashMap;
use std::rc::Rc;

use crate::device::XrDeviceHandle;
use crate::model::{ControllerAction, KeyMap};

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events, raw movement units
    MouseMove { dx: f32, dy: f32 },

    // Window events
    FocusLost,
}

struct TimedPress {
    action: ControllerAction,
    release_at_ms: f64,
}

/// Capture surface bound to one device handle. Hold actions follow the
/// physical key; tap actions become simulated presses held for the
/// configured duration and released by the per-frame sweep.
pub struct InputLayer {
    device: Rc<dyn XrDeviceHandle>,
    press_duration_ms: f64,
    /// Hold actions currently down, keyed by the physical key that pressed
    /// them so a mid-hold rebind cannot strand a pressed action.
    held: HashMap<String, ControllerAction>,
    timed: Vec<TimedPress>,
    #[cfg(target_arch = "wasm32")]
    dom_element: web_sys::HtmlElement,
}

impl InputLayer {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(device: Rc<dyn XrDeviceHandle>, press_duration_ms: f64) -> Self {
        Self {
            device,
            press_duration_ms,
            held: HashMap::new(),
            timed: Vec::new(),
        }
    }

    /// Creates the layer together with its capture element. The element is
    /// styled and attached by the mount façade.
    #[cfg(target_arch = "wasm32")]
    pub fn new(
        device: Rc<dyn XrDeviceHandle>,
        press_duration_ms: f64,
        document: &web_sys::Document,
    ) -> Result<Self, wasm_bindgen::JsValue> {
        use wasm_bindgen::JsCast;
        let dom_element = document
            .create_element("div")?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| wasm_bindgen::JsValue::from_str("input layer element is not an HtmlElement"))?;
        Ok(Self {
            device,
            press_duration_ms,
            held: HashMap::new(),
            timed: Vec::new(),
            dom_element,
        })
    }

    pub fn device(&self) -> &Rc<dyn XrDeviceHandle> {
        &self.device
    }

    #[cfg(target_arch = "wasm32")]
    pub fn dom_element(&self) -> &web_sys::HtmlElement {
        &self.dom_element
    }

    /// Translate one raw event. `pointer_locked` gates mouse look: without
    /// the lock, movement belongs to the overlay widgets, not the device.
    pub fn process_event(
        &mut self,
        event: &InputEvent,
        key_map: &KeyMap,
        pointer_locked: bool,
        now_ms: f64,
    ) {
        match event {
            InputEvent::KeyDown(key) => {
                let key = key.to_lowercase();
                let Some(action) = key_map.action_for(&key) else {
                    return;
                };
                if action.is_hold() {
                    if !self.held.contains_key(&key) {
                        self.held.insert(key, action);
                        self.device.set_action_pressed(action, true);
                    }
                } else {
                    self.begin_timed_press(action, now_ms);
                }
            }
            InputEvent::KeyUp(key) => {
                let key = key.to_lowercase();
                if let Some(action) = self.held.remove(&key) {
                    self.device.set_action_pressed(action, false);
                }
            }
            InputEvent::MouseMove { dx, dy } => {
                if pointer_locked {
                    self.device.rotate_view(*dx, *dy);
                }
            }
            InputEvent::FocusLost => {
                self.release_all();
            }
        }
    }

    fn begin_timed_press(&mut self, action: ControllerAction, now_ms: f64) {
        let release_at_ms = now_ms + self.press_duration_ms;
        // Re-tapping an already-held button restarts its window.
        if let Some(press) = self.timed.iter_mut().find(|p| p.action == action) {
            press.release_at_ms = release_at_ms;
            return;
        }
        self.device.set_action_pressed(action, true);
        self.timed.push(TimedPress { action, release_at_ms });
    }

    /// Per-frame sweep releasing simulated presses whose window expired.
    pub fn update(&mut self, now_ms: f64) {
        let device = Rc::clone(&self.device);
        self.timed.retain(|press| {
            if now_ms >= press.release_at_ms {
                device.set_action_pressed(press.action, false);
                false
            } else {
                true
            }
        });
    }

    /// Releases everything, held keys and pending timed presses alike. Used on
    /// focus loss so keys cannot stay stuck while the page is hidden.
    pub fn release_all(&mut self) {
        for (_, action) in self.held.drain() {
            self.device.set_action_pressed(action, false);
        }
        for press in self.timed.drain(..) {
            self.device.set_action_pressed(press.action, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[derive(Default)]
    struct RecordingDevice {
        pressed: RefCell<HashSet<ControllerAction>>,
        look: RefCell<Vec<(f32, f32)>>,
    }

    impl XrDeviceHandle for RecordingDevice {
        fn ipd(&self) -> f32 {
            0.0
        }
        fn set_ipd(&self, _meters: f32) {}
        fn fov_y(&self) -> f32 {
            std::f32::consts::FRAC_PI_2
        }
        fn set_fov_y(&self, _radians: f32) {}
        fn rotate_view(&self, dx: f32, dy: f32) {
            self.look.borrow_mut().push((dx, dy));
        }
        fn set_action_pressed(&self, action: ControllerAction, pressed: bool) {
            if pressed {
                self.pressed.borrow_mut().insert(action);
            } else {
                self.pressed.borrow_mut().remove(&action);
            }
        }
    }

    fn layer() -> (Rc<RecordingDevice>, InputLayer) {
        let device = Rc::new(RecordingDevice::default());
        let handle: Rc<dyn XrDeviceHandle> = device.clone();
        (device, InputLayer::new(handle, 250.0))
    }

    #[test]
    fn test_hold_action_follows_the_key() {
        let (device, mut layer) = layer();
        let map = KeyMap::default();
        layer.process_event(&InputEvent::KeyDown("w".into()), &map, false, 0.0);
        assert!(device.pressed.borrow().contains(&ControllerAction::MoveForward));
        layer.process_event(&InputEvent::KeyUp("w".into()), &map, false, 100.0);
        assert!(!device.pressed.borrow().contains(&ControllerAction::MoveForward));
    }

    #[test]
    fn test_tap_action_is_released_after_press_duration() {
        let (device, mut layer) = layer();
        let map = KeyMap::default();
        layer.process_event(&InputEvent::KeyDown("1".into()), &map, false, 1000.0);
        assert!(device.pressed.borrow().contains(&ControllerAction::ButtonA));

        layer.update(1249.0);
        assert!(
            device.pressed.borrow().contains(&ControllerAction::ButtonA),
            "released before the window elapsed"
        );
        layer.update(1250.0);
        assert!(!device.pressed.borrow().contains(&ControllerAction::ButtonA));
    }

    #[test]
    fn test_retap_restarts_the_press_window() {
        let (device, mut layer) = layer();
        let map = KeyMap::default();
        layer.process_event(&InputEvent::KeyDown("1".into()), &map, false, 0.0);
        layer.process_event(&InputEvent::KeyDown("1".into()), &map, false, 200.0);
        layer.update(300.0);
        assert!(device.pressed.borrow().contains(&ControllerAction::ButtonA));
        layer.update(450.0);
        assert!(!device.pressed.borrow().contains(&ControllerAction::ButtonA));
    }

    #[test]
    fn test_mouse_look_requires_pointer_lock() {
        let (device, mut layer) = layer();
        let map = KeyMap::default();
        layer.process_event(&InputEvent::MouseMove { dx: 3.0, dy: -1.0 }, &map, false, 0.0);
        assert!(device.look.borrow().is_empty());
        layer.process_event(&InputEvent::MouseMove { dx: 3.0, dy: -1.0 }, &map, true, 0.0);
        assert_eq!(device.look.borrow().as_slice(), &[(3.0, -1.0)]);
    }

    #[test]
    fn test_focus_loss_releases_everything() {
        let (device, mut layer) = layer();
        let map = KeyMap::default();
        layer.process_event(&InputEvent::KeyDown("w".into()), &map, false, 0.0);
        layer.process_event(&InputEvent::KeyDown("1".into()), &map, false, 0.0);
        layer.process_event(&InputEvent::FocusLost, &map, false, 10.0);
        assert!(device.pressed.borrow().is_empty());
    }

    #[test]
    fn test_rebound_key_cannot_strand_a_held_action() {
        let (device, mut layer) = layer();
        let mut map = KeyMap::default();
        layer.process_event(&InputEvent::KeyDown("w".into()), &map, false, 0.0);
        // Binding changes while the key is down; the key-up must still
        // release what that key pressed.
        map.bind(ControllerAction::MoveForward, "i");
        layer.process_event(&InputEvent::KeyUp("w".into()), &map, false, 50.0);
        assert!(!device.pressed.borrow().contains(&ControllerAction::MoveForward));
    }

    #[test]
    fn test_unmapped_keys_are_ignored() {
        let (device, mut layer) = layer();
        let map = KeyMap::default();
        layer.process_event(&InputEvent::KeyDown("F13".into()), &map, false, 0.0);
        assert!(device.pressed.borrow().is_empty());
    }
}
