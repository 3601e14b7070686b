use crate::model::{ControllerAction, DevUiConfig, DevUiOptions, KeyMap};

/// Transient overlay UI state: four independent pieces (pointer-lock flag,
/// key map, two menu flags) plus the config snapshot resolved once at
/// activation. No transition here can fail and there is no terminal state;
/// the overlay lives until the page drops it.
pub struct OverlayState {
    pub pointer_locked: bool,
    pub key_map: KeyMap,
    pub key_map_open: bool,
    pub fov_menu_open: bool,
    /// Action armed for rebinding by the key-map menu; the next physical
    /// key press is consumed as its new binding.
    pub rebinding: Option<ControllerAction>,
    config: DevUiConfig,
}

impl OverlayState {
    pub fn new(options: DevUiOptions) -> Self {
        Self {
            pointer_locked: false,
            key_map: KeyMap::default(),
            key_map_open: false,
            fov_menu_open: false,
            rebinding: None,
            config: options.resolve(),
        }
    }

    /// The immutable config snapshot for this mount.
    pub fn config(&self) -> DevUiConfig {
        self.config
    }

    pub fn toggle_key_map_menu(&mut self) {
        self.key_map_open = !self.key_map_open;
        if !self.key_map_open {
            self.rebinding = None;
        }
    }

    pub fn toggle_fov_menu(&mut self) {
        self.fov_menu_open = !self.fov_menu_open;
    }

    /// Full re-derivation from the platform's current lock target, not an
    /// incremental update: repeated or out-of-order change notifications
    /// are idempotent and self-correcting.
    pub fn set_pointer_locked(&mut self, lock_target_present: bool) {
        self.pointer_locked = lock_target_present;
    }

    /// Route a key press into an armed rebind. Returns true when the key
    /// was consumed and must not reach the input layer.
    pub fn consume_rebind(&mut self, key: &str) -> bool {
        match self.rebinding.take() {
            Some(action) => {
                self.key_map.bind(action, key);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_flags_toggle_independently() {
        let mut state = OverlayState::new(DevUiOptions::default());
        state.toggle_key_map_menu();
        assert!(state.key_map_open);
        assert!(!state.fov_menu_open);
        state.toggle_fov_menu();
        assert!(state.key_map_open && state.fov_menu_open);
        state.toggle_key_map_menu();
        assert!(!state.key_map_open);
        assert!(state.fov_menu_open, "closing one menu must not close the other");
    }

    #[test]
    fn test_pointer_lock_rederivation_is_idempotent() {
        let mut state = OverlayState::new(DevUiOptions::default());
        // Duplicate and out-of-order firings only ever reflect the last
        // observed platform state.
        state.set_pointer_locked(true);
        state.set_pointer_locked(true);
        assert!(state.pointer_locked);
        state.set_pointer_locked(false);
        assert!(!state.pointer_locked);
        state.set_pointer_locked(false);
        assert!(!state.pointer_locked);
    }

    #[test]
    fn test_config_resolves_at_activation() {
        let state = OverlayState::new(DevUiOptions {
            button_press_duration_ms: Some(500.0),
        });
        assert_eq!(state.config().button_press_duration_ms, 500.0);

        let state = OverlayState::new(DevUiOptions::default());
        assert_eq!(state.config().button_press_duration_ms, 250.0);
    }

    #[test]
    fn test_rebind_consumes_exactly_one_key() {
        let mut state = OverlayState::new(DevUiOptions::default());
        state.rebinding = Some(ControllerAction::ButtonA);
        assert!(state.consume_rebind("5"));
        assert_eq!(state.key_map.key_for(ControllerAction::ButtonA), Some("5"));
        // Cursor is spent; the next key flows through normally.
        assert!(!state.consume_rebind("6"));
        assert_eq!(state.key_map.key_for(ControllerAction::ButtonA), Some("5"));
    }

    #[test]
    fn test_closing_key_map_menu_disarms_rebind() {
        let mut state = OverlayState::new(DevUiOptions::default());
        state.toggle_key_map_menu();
        state.rebinding = Some(ControllerAction::ButtonB);
        state.toggle_key_map_menu();
        assert!(state.rebinding.is_none());
    }
}
