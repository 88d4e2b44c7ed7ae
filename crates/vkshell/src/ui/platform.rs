//! GLFW to Dear ImGui input plumbing
//!
//! The GUI gets a copy of every window event before the layer stack sees it,
//! via the Io event queue. Key and button translation are pure lookups so
//! they can be tested without a window.

use imgui::Io;

/// Map a GLFW key to the ImGui named key set.
///
/// Returns `None` for keys ImGui has no slot for (F13 and above, world keys).
pub fn map_key(key: glfw::Key) -> Option<imgui::Key> {
    use glfw::Key as G;
    use imgui::Key as I;

    Some(match key {
        G::A => I::A,
        G::B => I::B,
        G::C => I::C,
        G::D => I::D,
        G::E => I::E,
        G::F => I::F,
        G::G => I::G,
        G::H => I::H,
        G::I => I::I,
        G::J => I::J,
        G::K => I::K,
        G::L => I::L,
        G::M => I::M,
        G::N => I::N,
        G::O => I::O,
        G::P => I::P,
        G::Q => I::Q,
        G::R => I::R,
        G::S => I::S,
        G::T => I::T,
        G::U => I::U,
        G::V => I::V,
        G::W => I::W,
        G::X => I::X,
        G::Y => I::Y,
        G::Z => I::Z,
        G::Num0 => I::Alpha0,
        G::Num1 => I::Alpha1,
        G::Num2 => I::Alpha2,
        G::Num3 => I::Alpha3,
        G::Num4 => I::Alpha4,
        G::Num5 => I::Alpha5,
        G::Num6 => I::Alpha6,
        G::Num7 => I::Alpha7,
        G::Num8 => I::Alpha8,
        G::Num9 => I::Alpha9,
        G::Kp0 => I::Keypad0,
        G::Kp1 => I::Keypad1,
        G::Kp2 => I::Keypad2,
        G::Kp3 => I::Keypad3,
        G::Kp4 => I::Keypad4,
        G::Kp5 => I::Keypad5,
        G::Kp6 => I::Keypad6,
        G::Kp7 => I::Keypad7,
        G::Kp8 => I::Keypad8,
        G::Kp9 => I::Keypad9,
        G::KpDecimal => I::KeypadDecimal,
        G::KpDivide => I::KeypadDivide,
        G::KpMultiply => I::KeypadMultiply,
        G::KpSubtract => I::KeypadSubtract,
        G::KpAdd => I::KeypadAdd,
        G::KpEnter => I::KeypadEnter,
        G::KpEqual => I::KeypadEqual,
        G::Space => I::Space,
        G::Apostrophe => I::Apostrophe,
        G::Comma => I::Comma,
        G::Minus => I::Minus,
        G::Period => I::Period,
        G::Slash => I::Slash,
        G::Semicolon => I::Semicolon,
        G::Equal => I::Equal,
        G::LeftBracket => I::LeftBracket,
        G::Backslash => I::Backslash,
        G::RightBracket => I::RightBracket,
        G::GraveAccent => I::GraveAccent,
        G::Escape => I::Escape,
        G::Enter => I::Enter,
        G::Tab => I::Tab,
        G::Backspace => I::Backspace,
        G::Insert => I::Insert,
        G::Delete => I::Delete,
        G::Right => I::RightArrow,
        G::Left => I::LeftArrow,
        G::Down => I::DownArrow,
        G::Up => I::UpArrow,
        G::PageUp => I::PageUp,
        G::PageDown => I::PageDown,
        G::Home => I::Home,
        G::End => I::End,
        G::CapsLock => I::CapsLock,
        G::ScrollLock => I::ScrollLock,
        G::NumLock => I::NumLock,
        G::PrintScreen => I::PrintScreen,
        G::Pause => I::Pause,
        G::F1 => I::F1,
        G::F2 => I::F2,
        G::F3 => I::F3,
        G::F4 => I::F4,
        G::F5 => I::F5,
        G::F6 => I::F6,
        G::F7 => I::F7,
        G::F8 => I::F8,
        G::F9 => I::F9,
        G::F10 => I::F10,
        G::F11 => I::F11,
        G::F12 => I::F12,
        G::LeftShift => I::LeftShift,
        G::LeftControl => I::LeftCtrl,
        G::LeftAlt => I::LeftAlt,
        G::LeftSuper => I::LeftSuper,
        G::RightShift => I::RightShift,
        G::RightControl => I::RightCtrl,
        G::RightAlt => I::RightAlt,
        G::RightSuper => I::RightSuper,
        G::Menu => I::Menu,
        _ => return None,
    })
}

/// Map a GLFW mouse button to an ImGui button.
///
/// Buttons past the fifth are dropped.
pub fn map_mouse_button(button: glfw::MouseButton) -> Option<imgui::MouseButton> {
    use glfw::MouseButton as G;
    use imgui::MouseButton as I;

    Some(match button {
        G::Button1 => I::Left,
        G::Button2 => I::Right,
        G::Button3 => I::Middle,
        G::Button4 => I::Extra1,
        G::Button5 => I::Extra2,
        _ => return None,
    })
}

fn update_modifiers(io: &mut Io, modifiers: glfw::Modifiers) {
    io.key_ctrl = modifiers.contains(glfw::Modifiers::Control);
    io.key_shift = modifiers.contains(glfw::Modifiers::Shift);
    io.key_alt = modifiers.contains(glfw::Modifiers::Alt);
    io.key_super = modifiers.contains(glfw::Modifiers::Super);
}

/// Feed one window event into the GUI's input queue
pub fn forward_event(io: &mut Io, event: &glfw::WindowEvent) {
    match *event {
        glfw::WindowEvent::Key(key, _, action, modifiers) => {
            update_modifiers(io, modifiers);
            if let Some(key) = map_key(key) {
                io.add_key_event(key, action != glfw::Action::Release);
            }
        }
        glfw::WindowEvent::Char(character) => {
            io.add_input_character(character);
        }
        glfw::WindowEvent::CursorPos(x, y) => {
            io.add_mouse_pos_event([x as f32, y as f32]);
        }
        glfw::WindowEvent::MouseButton(button, action, modifiers) => {
            update_modifiers(io, modifiers);
            if let Some(button) = map_mouse_button(button) {
                io.add_mouse_button_event(button, action == glfw::Action::Press);
            }
        }
        glfw::WindowEvent::Scroll(x, y) => {
            io.add_mouse_wheel_event([x as f32, y as f32]);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_letters_digits_and_navigation() {
        assert_eq!(map_key(glfw::Key::A), Some(imgui::Key::A));
        assert_eq!(map_key(glfw::Key::Num7), Some(imgui::Key::Alpha7));
        assert_eq!(map_key(glfw::Key::Kp7), Some(imgui::Key::Keypad7));
        assert_eq!(map_key(glfw::Key::Left), Some(imgui::Key::LeftArrow));
        assert_eq!(map_key(glfw::Key::Escape), Some(imgui::Key::Escape));
        assert_eq!(map_key(glfw::Key::LeftControl), Some(imgui::Key::LeftCtrl));
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        assert_eq!(map_key(glfw::Key::F13), None);
        assert_eq!(map_key(glfw::Key::World1), None);
    }

    #[test]
    fn maps_mouse_buttons() {
        assert_eq!(map_mouse_button(glfw::MouseButton::Button1), Some(imgui::MouseButton::Left));
        assert_eq!(map_mouse_button(glfw::MouseButton::Button2), Some(imgui::MouseButton::Right));
        assert_eq!(map_mouse_button(glfw::MouseButton::Button3), Some(imgui::MouseButton::Middle));
        assert_eq!(map_mouse_button(glfw::MouseButton::Button8), None);
    }
}
