//! Input events and the layer system
//!
//! Platform events are translated into a closed tagged-variant event set and
//! dispatched top-to-bottom through an ordered list of layers: the most
//! recently pushed layer sees an event first, and a layer that reports the
//! event as consumed stops propagation. Layers also participate in the frame:
//! they build GUI widgets and may record commands into the frame's command
//! buffer.

use ash::vk;
use std::cell::RefCell;
use std::rc::Rc;

/// Shell event set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A key went down (or auto-repeated)
    KeyPressed {
        /// The key that was pressed
        key: glfw::Key,
        /// True when generated by key auto-repeat
        repeat: bool,
    },
    /// A key was released
    KeyReleased {
        /// The key that was released
        key: glfw::Key,
    },
    /// A mouse button went down
    MouseButtonPressed {
        /// The button that was pressed
        button: glfw::MouseButton,
    },
    /// A mouse button was released
    MouseButtonReleased {
        /// The button that was released
        button: glfw::MouseButton,
    },
    /// The cursor moved, position in screen coordinates
    MouseMoved {
        /// Cursor x position
        x: f32,
        /// Cursor y position
        y: f32,
    },
    /// The framebuffer was resized, size in pixels
    WindowResized {
        /// New framebuffer width
        width: u32,
        /// New framebuffer height
        height: u32,
    },
    /// The window was asked to close
    WindowClosed,
}

/// Translate a platform event into the shell event set.
///
/// Returns `None` for platform events the shell does not model (refresh,
/// focus, character input, ...). Character and scroll input still reach the
/// GUI through [`crate::ui::platform`].
pub fn translate(event: &glfw::WindowEvent) -> Option<Event> {
    match *event {
        glfw::WindowEvent::Key(key, _, action, _) => match action {
            glfw::Action::Press => Some(Event::KeyPressed { key, repeat: false }),
            glfw::Action::Repeat => Some(Event::KeyPressed { key, repeat: true }),
            glfw::Action::Release => Some(Event::KeyReleased { key }),
        },
        glfw::WindowEvent::MouseButton(button, action, _) => match action {
            glfw::Action::Release => Some(Event::MouseButtonReleased { button }),
            _ => Some(Event::MouseButtonPressed { button }),
        },
        glfw::WindowEvent::CursorPos(x, y) => Some(Event::MouseMoved {
            x: x as f32,
            y: y as f32,
        }),
        glfw::WindowEvent::FramebufferSize(width, height) => Some(Event::WindowResized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::Close => Some(Event::WindowClosed),
        _ => None,
    }
}

/// A listener/drawable unit in the window's layer list.
///
/// All callbacks run on the thread that owns the event loop.
pub trait Layer {
    /// Build GUI widgets for this frame
    fn on_update(&mut self, _ui: &imgui::Ui) {}

    /// Handle an event; return true to consume it and stop propagation
    fn on_event(&mut self, _event: &Event) -> bool {
        false
    }

    /// Record commands into the frame's command buffer, inside the color pass
    fn record_commands(&mut self, _device: &ash::Device, _cmd: vk::CommandBuffer) {}
}

/// Shared-ownership handle to a layer
pub type LayerRef = Rc<RefCell<dyn Layer>>;

/// Ordered list of layers.
///
/// Insertion order is push order; event dispatch and command recording run in
/// reverse push order.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<LayerRef>,
}

impl LayerStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer on top of the stack
    pub fn push(&mut self, layer: LayerRef) {
        self.layers.push(layer);
    }

    /// Remove a previously pushed layer, if present
    pub fn pop(&mut self, layer: &LayerRef) {
        self.layers.retain(|l| !Rc::ptr_eq(l, layer));
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when no layers are registered
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Release all layers
    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Offer an event to layers in reverse push order, stopping at the first
    /// layer that consumes it. Returns true if any layer consumed the event.
    pub fn dispatch(&mut self, event: &Event) -> bool {
        for layer in self.layers.iter().rev() {
            if layer.borrow_mut().on_event(event) {
                return true;
            }
        }
        false
    }

    /// Run every layer's GUI callback in push order
    pub fn update(&mut self, ui: &imgui::Ui) {
        for layer in &self.layers {
            layer.borrow_mut().on_update(ui);
        }
    }

    /// Run every layer's command-recording callback in reverse push order
    pub fn record(&mut self, device: &ash::Device, cmd: vk::CommandBuffer) {
        for layer in self.layers.iter().rev() {
            layer.borrow_mut().record_commands(device, cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestLayer {
        id: u32,
        consume: bool,
        seen: Rc<RefCell<Vec<u32>>>,
    }

    impl Layer for TestLayer {
        fn on_event(&mut self, _event: &Event) -> bool {
            self.seen.borrow_mut().push(self.id);
            self.consume
        }
    }

    fn layer(id: u32, consume: bool, seen: &Rc<RefCell<Vec<u32>>>) -> LayerRef {
        Rc::new(RefCell::new(TestLayer {
            id,
            consume,
            seen: Rc::clone(seen),
        }))
    }

    #[test]
    fn dispatch_runs_in_reverse_push_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut stack = LayerStack::new();
        stack.push(layer(1, false, &seen));
        stack.push(layer(2, false, &seen));
        stack.push(layer(3, false, &seen));

        let consumed = stack.dispatch(&Event::WindowClosed);
        assert!(!consumed);
        assert_eq!(*seen.borrow(), vec![3, 2, 1]);
    }

    #[test]
    fn dispatch_stops_at_consumer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut stack = LayerStack::new();
        stack.push(layer(1, false, &seen));
        stack.push(layer(2, true, &seen));
        stack.push(layer(3, false, &seen));

        let consumed = stack.dispatch(&Event::WindowClosed);
        assert!(consumed);
        // Layer 2 consumes, so layer 1 must never see the event.
        assert_eq!(*seen.borrow(), vec![3, 2]);
    }

    #[test]
    fn pop_removes_only_the_given_layer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut stack = LayerStack::new();
        let middle = layer(2, false, &seen);
        stack.push(layer(1, false, &seen));
        stack.push(Rc::clone(&middle));
        stack.push(layer(3, false, &seen));

        stack.pop(&middle);
        assert_eq!(stack.len(), 2);

        stack.dispatch(&Event::WindowClosed);
        assert_eq!(*seen.borrow(), vec![3, 1]);
    }

    #[test]
    fn translates_key_events() {
        let pressed = translate(&glfw::WindowEvent::Key(
            glfw::Key::A,
            0,
            glfw::Action::Press,
            glfw::Modifiers::empty(),
        ));
        assert_eq!(
            pressed,
            Some(Event::KeyPressed {
                key: glfw::Key::A,
                repeat: false
            })
        );

        let repeated = translate(&glfw::WindowEvent::Key(
            glfw::Key::A,
            0,
            glfw::Action::Repeat,
            glfw::Modifiers::empty(),
        ));
        assert_eq!(
            repeated,
            Some(Event::KeyPressed {
                key: glfw::Key::A,
                repeat: true
            })
        );

        let released = translate(&glfw::WindowEvent::Key(
            glfw::Key::Escape,
            0,
            glfw::Action::Release,
            glfw::Modifiers::empty(),
        ));
        assert_eq!(released, Some(Event::KeyReleased { key: glfw::Key::Escape }));
    }

    #[test]
    fn translates_window_events() {
        assert_eq!(
            translate(&glfw::WindowEvent::FramebufferSize(800, 600)),
            Some(Event::WindowResized {
                width: 800,
                height: 600
            })
        );
        assert_eq!(translate(&glfw::WindowEvent::Close), Some(Event::WindowClosed));
        // Events outside the shell's set are dropped.
        assert_eq!(translate(&glfw::WindowEvent::Refresh), None);
    }
}
