use std::collections::BTreeMap;

/// Emulated controller/rig actions the overlay can drive from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControllerAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    LeftTrigger,
    RightTrigger,
    LeftGrip,
    RightGrip,
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
}

impl ControllerAction {
    pub const ALL: [ControllerAction; 12] = [
        ControllerAction::MoveForward,
        ControllerAction::MoveBackward,
        ControllerAction::MoveLeft,
        ControllerAction::MoveRight,
        ControllerAction::LeftTrigger,
        ControllerAction::RightTrigger,
        ControllerAction::LeftGrip,
        ControllerAction::RightGrip,
        ControllerAction::ButtonA,
        ControllerAction::ButtonB,
        ControllerAction::ButtonX,
        ControllerAction::ButtonY,
    ];

    /// Hold actions track the physical key (down = pressed, up = released);
    /// everything else is a tap that turns into a timed simulated press.
    pub fn is_hold(self) -> bool {
        matches!(
            self,
            ControllerAction::MoveForward
                | ControllerAction::MoveBackward
                | ControllerAction::MoveLeft
                | ControllerAction::MoveRight
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ControllerAction::MoveForward => "Move Forward",
            ControllerAction::MoveBackward => "Move Backward",
            ControllerAction::MoveLeft => "Move Left",
            ControllerAction::MoveRight => "Move Right",
            ControllerAction::LeftTrigger => "Left Trigger",
            ControllerAction::RightTrigger => "Right Trigger",
            ControllerAction::LeftGrip => "Left Grip",
            ControllerAction::RightGrip => "Right Grip",
            ControllerAction::ButtonA => "Button A",
            ControllerAction::ButtonB => "Button B",
            ControllerAction::ButtonX => "Button X",
            ControllerAction::ButtonY => "Button Y",
        }
    }
}

/// User-editable mapping from action to physical key (`KeyboardEvent.key`
/// values, lowercased on lookup so `W`/`w` behave the same).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: BTreeMap<ControllerAction, String>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut bindings = BTreeMap::new();
        bindings.insert(ControllerAction::MoveForward, "w".to_string());
        bindings.insert(ControllerAction::MoveBackward, "s".to_string());
        bindings.insert(ControllerAction::MoveLeft, "a".to_string());
        bindings.insert(ControllerAction::MoveRight, "d".to_string());
        bindings.insert(ControllerAction::LeftTrigger, "q".to_string());
        bindings.insert(ControllerAction::RightTrigger, "e".to_string());
        bindings.insert(ControllerAction::LeftGrip, "z".to_string());
        bindings.insert(ControllerAction::RightGrip, "c".to_string());
        bindings.insert(ControllerAction::ButtonA, "1".to_string());
        bindings.insert(ControllerAction::ButtonB, "2".to_string());
        bindings.insert(ControllerAction::ButtonX, "3".to_string());
        bindings.insert(ControllerAction::ButtonY, "4".to_string());
        Self { bindings }
    }
}

impl KeyMap {
    pub fn key_for(&self, action: ControllerAction) -> Option<&str> {
        self.bindings.get(&action).map(String::as_str)
    }

    /// The action a physical key currently drives, if any.
    pub fn action_for(&self, key: &str) -> Option<ControllerAction> {
        let key = key.to_lowercase();
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == key)
            .map(|(action, _)| *action)
    }

    /// Bind `key` to `action`. A key already bound to another action is
    /// stolen from it, keeping the map injective so routing stays
    /// unambiguous.
    pub fn bind(&mut self, action: ControllerAction, key: &str) {
        let key = key.to_lowercase();
        self.bindings.retain(|other, bound| *other == action || *bound != key);
        self.bindings.insert(action, key);
    }

    pub fn entries(&self) -> impl Iterator<Item = (ControllerAction, &str)> {
        self.bindings.iter().map(|(a, k)| (*a, k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_covers_every_action() {
        let map = KeyMap::default();
        for action in ControllerAction::ALL {
            assert!(
                map.key_for(action).is_some(),
                "{:?} has no default binding",
                action
            );
        }
    }

    #[test]
    fn test_default_map_has_no_duplicate_keys() {
        let map = KeyMap::default();
        let mut seen = std::collections::HashSet::new();
        for (_, key) in map.entries() {
            assert!(seen.insert(key.to_string()), "key {key:?} bound twice");
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = KeyMap::default();
        assert_eq!(map.action_for("W"), Some(ControllerAction::MoveForward));
        assert_eq!(map.action_for("w"), Some(ControllerAction::MoveForward));
    }

    #[test]
    fn test_rebinding_steals_a_taken_key() {
        let mut map = KeyMap::default();
        map.bind(ControllerAction::ButtonA, "w");
        assert_eq!(map.action_for("w"), Some(ControllerAction::ButtonA));
        // The previous owner is left unbound, not silently duplicated.
        assert_eq!(map.key_for(ControllerAction::MoveForward), None);
    }

    #[test]
    fn test_rebinding_same_action_keeps_it_bound() {
        let mut map = KeyMap::default();
        map.bind(ControllerAction::MoveForward, "i");
        assert_eq!(map.key_for(ControllerAction::MoveForward), Some("i"));
        assert_eq!(map.action_for("w"), None);
    }
}
