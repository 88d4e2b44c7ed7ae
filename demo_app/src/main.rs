//! Demo application for the vkshell window shell.
//!
//! Opens a window with a single layer that draws a small control panel and
//! reacts to keyboard input.

use std::cell::RefCell;
use std::rc::Rc;

use vkshell::{Event, Layer, Window, WindowConfig};

/// A panel showing frame stats and a couple of interactive widgets
struct ControlPanel {
    frame_count: u64,
    clicks: u32,
    show_metrics: bool,
}

impl ControlPanel {
    fn new() -> Self {
        Self {
            frame_count: 0,
            clicks: 0,
            show_metrics: false,
        }
    }
}

impl Layer for ControlPanel {
    fn on_update(&mut self, ui: &imgui::Ui) {
        self.frame_count += 1;

        ui.window("Control Panel")
            .size([320.0, 200.0], imgui::Condition::FirstUseEver)
            .build(|| {
                ui.text(format!("frame {}", self.frame_count));
                ui.text(format!(
                    "{:.1} fps ({:.2} ms)",
                    ui.io().framerate,
                    1000.0 / ui.io().framerate.max(1.0)
                ));
                ui.separator();

                if ui.button("click me") {
                    self.clicks += 1;
                }
                ui.same_line();
                ui.text(format!("{} clicks", self.clicks));

                ui.checkbox("show metrics (M)", &mut self.show_metrics);
            });

        if self.show_metrics {
            ui.show_metrics_window(&mut self.show_metrics);
        }
    }

    fn on_event(&mut self, event: &Event) -> bool {
        match event {
            Event::KeyPressed {
                key: vkshell::glfw::Key::M,
                repeat: false,
            } => {
                self.show_metrics = !self.show_metrics;
                true
            }
            Event::WindowResized { width, height } => {
                log::debug!("framebuffer resized to {width}x{height}");
                false
            }
            _ => false,
        }
    }
}

fn main() {
    env_logger::init();

    log::info!("starting shell demo");

    let config = WindowConfig {
        title: "vkshell demo".to_string(),
        width: 1280,
        height: 720,
        clear_color: [0.05, 0.05, 0.08, 1.0],
    };

    let mut window = match Window::new(config) {
        Ok(window) => window,
        Err(e) => {
            log::error!("failed to create window: {e}");
            std::process::exit(1);
        }
    };

    window.push_layer(Rc::new(RefCell::new(ControlPanel::new())));

    if let Err(e) = window.run() {
        log::error!("render loop failed: {e}");
        std::process::exit(1);
    }

    log::info!("shell demo exited cleanly");
}
