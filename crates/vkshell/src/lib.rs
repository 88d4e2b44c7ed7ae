//! vkshell - a windowed Vulkan + Dear ImGui application shell
//!
//! Creates a window, brings up a Vulkan device with a VMA allocator behind
//! it, and runs an event/render loop that clears the swapchain and draws a
//! docking-enabled GUI every frame. Applications participate through layers:
//! each layer can handle input events, build GUI widgets, and record Vulkan
//! commands inside the frame's color pass.
//!
//! ```no_run
//! use vkshell::{Window, WindowConfig};
//!
//! let config = WindowConfig::new("demo", 1280, 720);
//! let mut window = Window::new(config)?;
//! window.run()?;
//! # Ok::<(), vkshell::WindowError>(())
//! ```

pub mod config;
pub mod event;
pub mod foundation;
pub mod ui;
pub mod vulkan;
pub mod window;

pub use config::{ConfigError, WindowConfig};
pub use event::{Event, Layer, LayerRef, LayerStack};
pub use vulkan::{VulkanError, VulkanResult};
pub use window::{Window, WindowError};

// Crates applications are expected to interact with directly.
pub use ash;
pub use glfw;
pub use imgui;
