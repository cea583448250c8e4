//! Raw key code mapping for the modal surface
//!
//! The presentation layer forwards platform key codes unchanged; only the
//! keys the modal reacts to are mapped here.

/// Return key
pub const KEY_RETURN: u16 = 36;
/// Escape key
pub const KEY_ESCAPE: u16 = 53;
/// Keypad Enter
pub const KEY_ENTER: u16 = 76;

/// Action bound to a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Toggle the connection state of the selected row
    Activate,
    /// Dismiss the modal
    Close,
}

/// Map a raw key code to its bound action, if any
pub fn key_action(keycode: u16) -> Option<KeyAction> {
    match keycode {
        KEY_RETURN | KEY_ENTER => Some(KeyAction::Activate),
        KEY_ESCAPE => Some(KeyAction::Close),
        _ => None,
    }
}
