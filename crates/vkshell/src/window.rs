//! Window shell and render loop
//!
//! One window owns the whole stack: the GLFW window and event stream, the
//! Vulkan device context, the GUI context, the layer list, and the deferred
//! task queue. `run` blocks on the event/render loop until the window closes,
//! then tears everything down in dependency order.

use ash::vk;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::{ConfigError, WindowConfig};
use crate::event::{self, Event, LayerRef, LayerStack};
use crate::foundation::tasks::TaskQueue;
use crate::ui::{platform, GuiContext};
use crate::vulkan::context::{GraphicsContext, VulkanError};

/// Window creation and run-loop errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The windowing system could not be initialized
    #[error("window system error: {0}")]
    Platform(String),

    /// A Vulkan operation failed
    #[error(transparent)]
    Vulkan(#[from] VulkanError),

    /// The window configuration was invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The GUI renderer failed
    #[error("GUI renderer error: {0}")]
    Gui(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running,
    Closing,
    Terminated,
}

/// How a frame attempt ended, for slot bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameOutcome {
    /// No image was acquired; nothing was recorded or submitted
    Skipped,
    /// The frame failed after its image was acquired
    Failed,
    /// Submitted and presented; `stale` carries the staleness report
    Presented { stale: bool },
}

/// A slot is consumed by any frame that got past image acquisition, even a
/// failed one; only skipped frames reuse their slot next iteration.
fn consumes_slot(outcome: FrameOutcome) -> bool {
    outcome != FrameOutcome::Skipped
}

/// Framebuffer size bookkeeping: the new size only when it actually changed,
/// so spurious same-size resize events never force recreation.
fn apply_resize(current: (u32, u32), reported: (i32, i32)) -> Option<(u32, u32)> {
    let size = (reported.0.max(0) as u32, reported.1.max(0) as u32);
    (size != current).then_some(size)
}

/// Ratio between framebuffer pixels and screen coordinates, per axis.
/// Degenerate window sizes fall back to a 1:1 scale.
fn framebuffer_scale(framebuffer: (u32, u32), window: (i32, i32)) -> [f32; 2] {
    if window.0 <= 0 || window.1 <= 0 {
        return [1.0, 1.0];
    }
    [
        framebuffer.0 as f32 / window.0 as f32,
        framebuffer.1 as f32 / window.1 as f32,
    ]
}

/// An application window with its device context, GUI, and layer list.
///
/// Field order is drop order: layers and the GUI release their GPU resources
/// while the device context is still alive, and the platform window outlives
/// nothing but the GLFW handle itself.
pub struct Window {
    layers: LayerStack,
    tasks: TaskQueue,
    gui: GuiContext,
    gfx: GraphicsContext,
    clear_color: [f32; 4],
    framebuffer_size: (u32, u32),
    resized: bool,
    state: LoopState,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    window: glfw::PWindow,
    glfw: glfw::Glfw,
}

impl Window {
    /// Create a window and bring up the full rendering stack behind it.
    ///
    /// The window stays hidden until initialization finished, so a failed
    /// bootstrap never flashes an empty frame.
    pub fn new(config: WindowConfig) -> Result<Self, WindowError> {
        config.validate()?;

        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::Platform(format!("GLFW initialization failed: {e}")))?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(true));
        glfw.window_hint(glfw::WindowHint::Visible(false));
        glfw.window_hint(glfw::WindowHint::ScaleToMonitor(true));

        let (mut window, events) = glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or_else(|| WindowError::Platform("window creation failed".to_string()))?;

        window.set_all_polling(true);

        let gfx = GraphicsContext::new(&glfw, &mut window, &config.title)?;
        let gui = GuiContext::new(&gfx)?;

        let (fb_width, fb_height) = window.get_framebuffer_size();
        window.show();

        log::info!(
            "window '{}' created at {}x{}",
            config.title,
            config.width,
            config.height
        );

        Ok(Self {
            layers: LayerStack::new(),
            tasks: TaskQueue::new(),
            gui,
            gfx,
            clear_color: config.clear_color,
            framebuffer_size: (fb_width.max(0) as u32, fb_height.max(0) as u32),
            resized: false,
            state: LoopState::Idle,
            events,
            window,
            glfw,
        })
    }

    /// Push a layer on top of the layer list
    pub fn push_layer(&mut self, layer: LayerRef) {
        self.layers.push(layer);
    }

    /// Remove a previously pushed layer
    pub fn pop_layer(&mut self, layer: &LayerRef) {
        self.layers.pop(layer);
    }

    /// Queue a callable to run on the loop thread after the current frame
    pub fn defer(&mut self, task: impl FnOnce() + 'static) {
        self.tasks.push(task);
    }

    /// Ask the loop to exit after the current iteration
    pub fn close(&mut self) {
        self.state = LoopState::Closing;
    }

    /// Run the event/render loop until the window closes.
    ///
    /// Each iteration polls events, renders a frame unless the framebuffer
    /// has zero area, and then drains the deferred task queue. Shutdown runs
    /// unconditionally when the loop ends, including the error path, so the
    /// device is idled and layers are released before `run` returns.
    pub fn run(&mut self) -> Result<(), WindowError> {
        self.state = LoopState::Running;
        let result = self.pump();
        self.shutdown();
        result
    }

    fn pump(&mut self) -> Result<(), WindowError> {
        let mut last_frame = Instant::now();

        while self.state == LoopState::Running {
            self.glfw.poll_events();

            let pending: Vec<glfw::WindowEvent> = glfw::flush_messages(&self.events)
                .map(|(_, event)| event)
                .collect();
            for event in &pending {
                self.handle_event(event);
            }

            if self.window.should_close() {
                self.state = LoopState::Closing;
            }
            if self.state != LoopState::Running {
                break;
            }

            let now = Instant::now();
            let delta_time = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;

            if self.framebuffer_size.0 > 0 && self.framebuffer_size.1 > 0 {
                self.draw_frame(delta_time)?;
            } else {
                // Minimized; don't spin the CPU while there is nothing to draw.
                std::thread::sleep(Duration::from_millis(16));
            }

            self.tasks.drain();
        }

        Ok(())
    }

    fn handle_event(&mut self, event: &glfw::WindowEvent) {
        // The GUI sees every platform event, independent of layer consumption.
        platform::forward_event(self.gui.io_mut(), event);

        if let glfw::WindowEvent::FramebufferSize(width, height) = *event {
            if let Some(size) = apply_resize(self.framebuffer_size, (width, height)) {
                self.framebuffer_size = size;
                self.resized = true;
            }
        }

        if let Some(shell_event) = event::translate(event) {
            if shell_event == Event::WindowClosed {
                self.state = LoopState::Closing;
            }
            self.layers.dispatch(&shell_event);
        }
    }

    /// Record and submit one frame.
    ///
    /// Every failure in here is logged and costs at most this one frame;
    /// nothing escalates out of the render loop. Fence-wait and acquire
    /// failures skip the frame without advancing the slot; any failure after
    /// an image was acquired consumes the slot. The slot fence is only reset
    /// immediately before submission, so an aborted frame never leaves it
    /// unsignalable. The returned error covers swapchain recreation only.
    fn draw_frame(&mut self, delta_time: f32) -> Result<(), WindowError> {
        // A resize observed this iteration recreates up front, so the frame
        // below already renders on the fresh chain.
        if self.resized {
            self.recreate_swapchain()?;
        }

        let outcome = 'frame: {
            if let Err(e) = self.gfx.frames.current_slot().in_flight.wait() {
                log::error!("frame fence wait failed: {e}");
                break 'frame FrameOutcome::Skipped;
            }

            let (cmd, image_available) = {
                let slot = self.gfx.frames.current_slot();
                (slot.command_buffer, slot.image_available.handle())
            };

            let acquired = unsafe {
                self.gfx.device.swapchain_loader.acquire_next_image(
                    self.gfx.swapchain.handle(),
                    u64::MAX,
                    image_available,
                    vk::Fence::null(),
                )
            };
            let image_index = match acquired {
                // A suboptimal acquire still renders; present reports it again.
                Ok((index, _suboptimal)) => index,
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    self.recreate_swapchain()?;
                    break 'frame FrameOutcome::Skipped;
                }
                Err(e) => {
                    log::error!("image acquire failed: {e:?}");
                    break 'frame FrameOutcome::Skipped;
                }
            };

            match self.record_and_present(cmd, image_available, image_index, delta_time) {
                Ok(stale) => FrameOutcome::Presented { stale },
                Err(e) => {
                    log::error!("frame submission failed: {e}");
                    FrameOutcome::Failed
                }
            }
        };

        if outcome == (FrameOutcome::Presented { stale: true }) {
            self.recreate_swapchain()?;
        }

        self.gui.update_platform_windows();

        if consumes_slot(outcome) {
            self.gfx.frames.advance();
        }
        Ok(())
    }

    /// Record, submit, and present one acquired image. Returns whether
    /// present reported the swapchain stale.
    fn record_and_present(
        &mut self,
        cmd: vk::CommandBuffer,
        image_available: vk::Semaphore,
        image_index: u32,
        delta_time: f32,
    ) -> Result<bool, WindowError> {
        // Build the GUI frame before recording so the draw data is final.
        let window_size = self.window.get_size();
        let scale = framebuffer_scale(self.framebuffer_size, window_size);
        let ui = self.gui.prepare_frame(
            [window_size.0.max(0) as f32, window_size.1.max(0) as f32],
            scale,
            delta_time,
        );
        self.layers.update(ui);
        let draw_data = self.gui.context.render();

        let device = self.gfx.device.device.clone();
        unsafe {
            device
                .reset_command_buffer(cmd, vk::CommandBufferResetFlags::empty())
                .map_err(VulkanError::Api)?;
            device
                .begin_command_buffer(cmd, &vk::CommandBufferBeginInfo::builder())
                .map_err(VulkanError::Api)?;

            let clear_values = [vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            }];
            let pass_begin = vk::RenderPassBeginInfo::builder()
                .render_pass(self.gfx.render_pass.handle())
                .framebuffer(self.gfx.swapchain.framebuffer(image_index))
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D::default(),
                    extent: self.gfx.swapchain.extent(),
                })
                .clear_values(&clear_values);
            device.cmd_begin_render_pass(cmd, &pass_begin, vk::SubpassContents::INLINE);
        }

        self.layers.record(&device, cmd);
        self.gui
            .renderer
            .cmd_draw(cmd, draw_data)
            .map_err(|e| WindowError::Gui(e.to_string()))?;

        unsafe {
            device.cmd_end_render_pass(cmd);
            device
                .end_command_buffer(cmd)
                .map_err(VulkanError::Api)?;
        }

        let render_finished = self.gfx.frames.render_finished(image_index);
        let wait_semaphores = [image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [cmd];
        let signal_semaphores = [render_finished];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        let in_flight = self.gfx.frames.current_slot().in_flight.handle();
        self.gfx.frames.current_slot().in_flight.reset()?;
        unsafe {
            device
                .queue_submit(self.gfx.device.graphics_queue, &[submit_info], in_flight)
                .map_err(VulkanError::Api)?;
        }

        let swapchains = [self.gfx.swapchain.handle()];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let presented = unsafe {
            self.gfx
                .device
                .swapchain_loader
                .queue_present(self.gfx.device.present_queue, &present_info)
        };
        match presented {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(true),
            Err(e) => Err(VulkanError::Api(e).into()),
        }
    }

    fn recreate_swapchain(&mut self) -> Result<(), WindowError> {
        let (width, height) = self.framebuffer_size;
        // Zero-area surfaces cannot back a swapchain; the loop suspends
        // rendering instead and recreation happens on the next real resize.
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.gfx
            .recreate_swapchain(vk::Extent2D { width, height })?;
        self.resized = false;
        Ok(())
    }

    fn shutdown(&mut self) {
        log::info!("window closing");
        self.gfx.wait_idle();
        self.layers.clear();
        self.tasks.drain();
        self.state = LoopState::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_pixels_over_screen_coordinates() {
        assert_eq!(framebuffer_scale((2560, 1440), (1280, 720)), [2.0, 2.0]);
        assert_eq!(framebuffer_scale((1280, 720), (1280, 720)), [1.0, 1.0]);
    }

    #[test]
    fn degenerate_window_size_falls_back_to_unit_scale() {
        assert_eq!(framebuffer_scale((1280, 720), (0, 0)), [1.0, 1.0]);
        assert_eq!(framebuffer_scale((1280, 720), (-1, 720)), [1.0, 1.0]);
    }

    #[test]
    fn failed_frames_still_consume_their_slot() {
        assert!(consumes_slot(FrameOutcome::Failed));
        assert!(consumes_slot(FrameOutcome::Presented { stale: false }));
        assert!(consumes_slot(FrameOutcome::Presented { stale: true }));
    }

    #[test]
    fn skipped_frames_reuse_their_slot() {
        assert!(!consumes_slot(FrameOutcome::Skipped));
    }

    #[test]
    fn same_size_resize_events_are_suppressed() {
        assert_eq!(apply_resize((800, 600), (800, 600)), None);
        assert_eq!(apply_resize((800, 600), (1024, 768)), Some((1024, 768)));
    }

    #[test]
    fn negative_reported_sizes_clamp_to_zero() {
        assert_eq!(apply_resize((800, 600), (-1, -1)), Some((0, 0)));
        assert_eq!(apply_resize((0, 0), (-5, -5)), None);
    }
}
