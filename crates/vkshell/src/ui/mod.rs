//! Dear ImGui integration
//!
//! Owns the ImGui context and the Vulkan renderer backend that turns GUI
//! draw lists into commands inside the shell's color pass. Docking is enabled
//! so applications can build editor-style panel layouts.

pub mod platform;

use imgui::{ConfigFlags, StyleColor};
use imgui_rs_vulkan_renderer::{Options, Renderer};

use crate::vulkan::context::{GraphicsContext, VulkanError, VulkanResult};
use crate::vulkan::sync::MAX_FRAMES_IN_FLIGHT;

/// ImGui context plus its Vulkan rendering backend
pub struct GuiContext {
    pub(crate) context: imgui::Context,
    pub(crate) renderer: Renderer,
}

impl GuiContext {
    /// Create the GUI context and renderer against an initialized device.
    ///
    /// The renderer shares the shell's VMA allocator for font atlas and
    /// vertex/index buffer memory.
    pub fn new(gfx: &GraphicsContext) -> VulkanResult<Self> {
        let mut context = imgui::Context::create();
        context.set_ini_filename(None);
        context.io_mut().config_flags.insert(shell_config_flags());

        apply_dark_theme(context.style_mut());

        // With multi-viewport active, secondary windows need square corners
        // and an opaque background to blend with native decorations.
        if context.io().config_flags.contains(ConfigFlags::VIEWPORTS_ENABLE) {
            let style = context.style_mut();
            style.window_rounding = 0.0;
            style[StyleColor::WindowBg][3] = 1.0;
        }

        let renderer = Renderer::with_vk_mem_allocator(
            gfx.allocator(),
            gfx.device.device.clone(),
            gfx.device.graphics_queue,
            gfx.command_pool.handle(),
            gfx.render_pass.handle(),
            &mut context,
            Some(Options {
                in_flight_frames: MAX_FRAMES_IN_FLIGHT,
                ..Default::default()
            }),
        )
        .map_err(|e| {
            VulkanError::InitializationFailed(format!("GUI renderer creation failed: {e}"))
        })?;

        log::debug!("GUI context initialized");

        Ok(Self { context, renderer })
    }

    /// Mutable access to the ImGui Io for event forwarding
    pub fn io_mut(&mut self) -> &mut imgui::Io {
        self.context.io_mut()
    }

    /// Start a GUI frame.
    ///
    /// Display size is in screen coordinates with the framebuffer scale
    /// carrying the pixel ratio; `delta_time` is seconds since the last
    /// frame and is clamped away from zero.
    pub fn prepare_frame(
        &mut self,
        display_size: [f32; 2],
        framebuffer_scale: [f32; 2],
        delta_time: f32,
    ) -> &mut imgui::Ui {
        let io = self.context.io_mut();
        io.display_size = display_size;
        io.display_framebuffer_scale = framebuffer_scale;
        io.delta_time = delta_time.max(f32::EPSILON);
        self.context.new_frame()
    }

    /// Propagate secondary platform windows after present.
    ///
    /// Only does anything when multi-viewport is enabled, which in turn
    /// requires a platform viewport backend to be installed.
    pub fn update_platform_windows(&mut self) {
        if self
            .context
            .io()
            .config_flags
            .contains(ConfigFlags::VIEWPORTS_ENABLE)
        {
            self.context.update_platform_windows();
            self.context.render_platform_windows_default();
        }
    }
}

/// Config flags the shell always runs with: docking plus keyboard and
/// gamepad navigation.
// TODO: VIEWPORTS_ENABLE needs a glfw implementation of imgui's
// PlatformViewportBackend before it can be turned on here.
fn shell_config_flags() -> ConfigFlags {
    ConfigFlags::DOCKING_ENABLE
        | ConfigFlags::NAV_ENABLE_KEYBOARD
        | ConfigFlags::NAV_ENABLE_GAMEPAD
}

/// Dark grey theme applied at startup
fn apply_dark_theme(style: &mut imgui::Style) {
    let bg = [0.1, 0.105, 0.11, 1.0];
    let idle = [0.2, 0.205, 0.21, 1.0];
    let hovered = [0.3, 0.305, 0.31, 1.0];
    let active = [0.15, 0.1505, 0.151, 1.0];

    style[StyleColor::WindowBg] = bg;

    style[StyleColor::Header] = idle;
    style[StyleColor::HeaderHovered] = hovered;
    style[StyleColor::HeaderActive] = active;

    style[StyleColor::Button] = idle;
    style[StyleColor::ButtonHovered] = hovered;
    style[StyleColor::ButtonActive] = active;

    style[StyleColor::FrameBg] = idle;
    style[StyleColor::FrameBgHovered] = hovered;
    style[StyleColor::FrameBgActive] = active;

    style[StyleColor::Tab] = active;
    style[StyleColor::TabHovered] = [0.38, 0.3805, 0.381, 1.0];
    style[StyleColor::TabActive] = [0.28, 0.2805, 0.281, 1.0];
    style[StyleColor::TabUnfocused] = active;
    style[StyleColor::TabUnfocusedActive] = idle;

    style[StyleColor::TitleBg] = active;
    style[StyleColor::TitleBgActive] = active;
    style[StyleColor::TitleBgCollapsed] = active;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docking_and_nav_are_enabled_viewports_are_not() {
        let flags = shell_config_flags();
        assert!(flags.contains(ConfigFlags::DOCKING_ENABLE));
        assert!(flags.contains(ConfigFlags::NAV_ENABLE_KEYBOARD));
        assert!(flags.contains(ConfigFlags::NAV_ENABLE_GAMEPAD));
        // Off until a platform viewport backend exists.
        assert!(!flags.contains(ConfigFlags::VIEWPORTS_ENABLE));
    }
}
