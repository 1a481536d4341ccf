use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::KeyAction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Configurable keyboard bindings mapping actions to key codes.
pub struct KeybindingOptions {
    /// Maps action → key string (e.g. `ToggleProjection` → `"KeyP"`).
    pub bindings: HashMap<KeyAction, String>,
    /// Reverse lookup cache (key string → action). Rebuilt on load.
    #[serde(skip)]
    key_to_action: HashMap<String, KeyAction>,
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        let bindings = HashMap::from([
            (KeyAction::MoveForward, "KeyW".into()),
            (KeyAction::MoveBackward, "KeyS".into()),
            (KeyAction::MoveLeft, "KeyA".into()),
            (KeyAction::MoveRight, "KeyD".into()),
            (KeyAction::MoveUp, "KeyQ".into()),
            (KeyAction::MoveDown, "KeyE".into()),
            (KeyAction::ToggleProjection, "KeyP".into()),
            (KeyAction::Exit, "Escape".into()),
            (KeyAction::WrapRepeat, "Digit1".into()),
            (KeyAction::WrapMirroredRepeat, "Digit2".into()),
            (KeyAction::WrapClampToEdge, "Digit3".into()),
            (KeyAction::WrapClampToBorder, "Digit4".into()),
            (KeyAction::UvScaleUp, "BracketRight".into()),
            (KeyAction::UvScaleDown, "BracketLeft".into()),
            (KeyAction::ToggleLampOrbit, "KeyL".into()),
        ]);

        let mut opts = Self {
            bindings,
            key_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl KeybindingOptions {
    /// Rebuild the reverse lookup map (key string → action).
    pub fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            let _ = self.key_to_action.insert(key.clone(), *action);
        }
    }

    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.key_to_action.get(key).copied()
    }

    /// Bind `action` to `key`, replacing its previous key.
    pub fn bind(&mut self, action: KeyAction, key: &str) {
        let _ = self.bindings.insert(action, key.to_owned());
        self.rebuild_reverse_map();
    }
}

impl KeybindingOptions {
    /// Add the default key for every action missing from `bindings`,
    /// unless that key is already taken, then rebuild the reverse map.
    pub fn fill_defaults(&mut self) {
        let defaults = Self::default();
        for (action, key) in defaults.bindings {
            let taken = self.bindings.values().any(|k| *k == key);
            if !taken {
                let _ = self.bindings.entry(action).or_insert(key);
            }
        }
        self.rebuild_reverse_map();
    }
}
