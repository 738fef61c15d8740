//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! here, not in the host UI, so every embedding (web shell, desktop shell)
//! resolves the same bindings. Keystrokes originating inside text inputs
//! are the host's problem to filter before calling in.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,
    Copy,
    Cut,
    Paste,
    SelectAll,
    Deselect,

    // ── Structure ──
    Group,
    Ungroup,

    // ── Z-order ──
    SendBackward,
    BringForward,
    SendToBack,
    BringToFront,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Resolves key events into shortcut actions.
///
/// Platform-aware modifier detection: on macOS `meta` is ⌘, elsewhere
/// `ctrl` serves the same role — either counts as the command modifier.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "g" | "G" => Some(ShortcutAction::Ungroup),
                "[" => Some(ShortcutAction::SendToBack),
                "]" => Some(ShortcutAction::BringToFront),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                "g" | "G" => Some(ShortcutAction::Group),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                "[" => Some(ShortcutAction::SendBackward),
                "]" => Some(ShortcutAction::BringForward),
                _ => None,
            };
        }

        // ── Single keys (no modifiers) ──
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z and Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Cmd+Shift+Z and Cmd+Y → Redo
        assert_eq!(
            ShortcutMap::resolve("z", false, true, false, true),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            ShortcutMap::resolve("y", false, false, false, true),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn resolve_clipboard_and_selection() {
        assert_eq!(
            ShortcutMap::resolve("c", true, false, false, false),
            Some(ShortcutAction::Copy)
        );
        assert_eq!(
            ShortcutMap::resolve("v", true, false, false, false),
            Some(ShortcutAction::Paste)
        );
        assert_eq!(
            ShortcutMap::resolve("x", true, false, false, false),
            Some(ShortcutAction::Cut)
        );
        assert_eq!(
            ShortcutMap::resolve("a", true, false, false, false),
            Some(ShortcutAction::SelectAll)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn resolve_grouping_and_z_order() {
        assert_eq!(
            ShortcutMap::resolve("g", true, false, false, false),
            Some(ShortcutAction::Group)
        );
        assert_eq!(
            ShortcutMap::resolve("g", true, true, false, false),
            Some(ShortcutAction::Ungroup)
        );
        assert_eq!(
            ShortcutMap::resolve("]", true, false, false, false),
            Some(ShortcutAction::BringForward)
        );
        assert_eq!(
            ShortcutMap::resolve("[", true, true, false, false),
            Some(ShortcutAction::SendToBack)
        );
    }

    #[test]
    fn delete_requires_no_modifier() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(ShortcutMap::resolve("Delete", true, false, false, false), None);
    }

    #[test]
    fn unbound_keys_resolve_to_none() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("q", true, false, false, false), None);
    }
}
