use log::debug;
use winit::event::{MouseButton as WinitMouseButton, VirtualKeyCode};
use winit::window::{CursorGrabMode, Window};

use crate::bodies::BodySet;
use crate::input::{KeyCode, MouseButton, NamedKey};

pub fn print_body_summary(bodies: &BodySet) {
    println!("Final body states:");
    for body in bodies.bodies() {
        println!(
            " - {} visible={} spin={:.2} rad tilt={:.2} deg",
            body.name(),
            body.is_visible(),
            body.spin(),
            body.tilt().to_degrees()
        );
    }
}

pub fn map_keycode(code: VirtualKeyCode) -> Option<KeyCode> {
    use VirtualKeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Left => KeyCode::Named(NamedKey::Left),
        Key::Right => KeyCode::Named(NamedKey::Right),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Key1 | Key::Numpad1 => KeyCode::Digit(1),
        Key::Key2 | Key::Numpad2 => KeyCode::Digit(2),
        Key::Key3 | Key::Numpad3 => KeyCode::Digit(3),
        Key::Key4 | Key::Numpad4 => KeyCode::Digit(4),
        Key::Key5 | Key::Numpad5 => KeyCode::Digit(5),
        Key::Key6 | Key::Numpad6 => KeyCode::Digit(6),
        Key::Key7 | Key::Numpad7 => KeyCode::Digit(7),
        Key::Key8 | Key::Numpad8 => KeyCode::Digit(8),
        Key::Key9 | Key::Numpad9 => KeyCode::Digit(9),
        Key::N => KeyCode::Character('N'),
        Key::P => KeyCode::Character('P'),
        _ => return None,
    })
}

pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Other(value) => value.min(u16::from(u8::MAX)) as u8,
    };
    MouseButton::new(index)
}

/// Locks the cursor to the window, falling back to confining it.
///
/// Returns `false` when the platform refuses both modes.
pub fn grab_cursor(window: &Window) -> bool {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(err) => {
            debug!("cursor grab refused: {err}");
            false
        }
    }
}

pub fn release_cursor(window: &Window) {
    if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
        debug!("failed to release cursor grab: {err}");
    }
    window.set_cursor_visible(true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_and_numpad_map_to_the_same_key() {
        assert_eq!(map_keycode(VirtualKeyCode::Key3), Some(KeyCode::Digit(3)));
        assert_eq!(map_keycode(VirtualKeyCode::Numpad3), Some(KeyCode::Digit(3)));
        assert_eq!(map_keycode(VirtualKeyCode::Key0), None);
    }

    #[test]
    fn escape_is_named() {
        assert_eq!(
            map_keycode(VirtualKeyCode::Escape),
            Some(KeyCode::Named(NamedKey::Escape))
        );
    }

    #[test]
    fn mouse_buttons_are_indexed_from_left() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::LEFT);
        assert_eq!(map_mouse_button(WinitMouseButton::Middle).index(), 2);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(7)).index(), 7);
    }
}
