//! Frame synchronization primitives
//!
//! Two levels of per-frame state exist with different cardinalities: slot
//! state (acquire semaphore, in-flight fence, command buffer) sized by the
//! frame-overlap depth, and per-image state (render-finished semaphore) sized
//! by the swapchain image count. Mixing the two up causes semaphore reuse
//! hazards, so the pool keeps them in separate arrays.

use ash::{vk, Device};

use crate::vulkan::commands::CommandPool;
use crate::vulkan::context::{VulkanError, VulkanResult};

/// Number of frames the CPU may record ahead of the GPU
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Binary semaphore wrapper with RAII cleanup
pub struct Semaphore {
    device: Device,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Create an unsignaled binary semaphore
    pub fn new(device: Device) -> VulkanResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::builder();
        let semaphore = unsafe {
            device
                .create_semaphore(&create_info, None)
                .map_err(VulkanError::Api)?
        };
        Ok(Self { device, semaphore })
    }

    /// Get the semaphore handle
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Fence wrapper with RAII cleanup
pub struct Fence {
    device: Device,
    fence: vk::Fence,
}

impl Fence {
    /// Create a fence, signaled or not.
    ///
    /// In-flight fences start signaled so the first wait on a fresh slot
    /// returns immediately.
    pub fn new(device: Device, signaled: bool) -> VulkanResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::builder().flags(flags);
        let fence = unsafe {
            device
                .create_fence(&create_info, None)
                .map_err(VulkanError::Api)?
        };
        Ok(Self { device, fence })
    }

    /// Get the fence handle
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    /// Block until the fence is signaled
    pub fn wait(&self) -> VulkanResult<()> {
        unsafe {
            self.device
                .wait_for_fences(&[self.fence], true, u64::MAX)
                .map_err(VulkanError::Api)
        }
    }

    /// Return the fence to the unsignaled state
    pub fn reset(&self) -> VulkanResult<()> {
        unsafe {
            self.device
                .reset_fences(&[self.fence])
                .map_err(VulkanError::Api)
        }
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_fence(self.fence, None);
        }
    }
}

/// Round-robin cursor over frame slots.
///
/// The cursor only advances when the caller says the slot was actually
/// consumed; aborted frames (zero-area swapchain, failed acquire) reuse the
/// same slot next iteration.
#[derive(Debug, Clone, Copy)]
pub struct SlotCursor {
    current: usize,
    depth: usize,
}

impl SlotCursor {
    /// Create a cursor over `depth` slots, starting at slot zero
    pub fn new(depth: usize) -> Self {
        Self { current: 0, depth }
    }

    /// Index of the current slot
    pub fn current(&self) -> usize {
        self.current
    }

    /// Move to the next slot, wrapping at the overlap depth
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.depth;
    }
}

/// State owned by one frame slot
pub struct FrameSlot {
    /// Signaled when the acquired image is ready to be rendered to
    pub image_available: Semaphore,
    /// Signaled when this slot's previous submission finished on the GPU
    pub in_flight: Fence,
    /// Command buffer recorded fresh each time the slot comes around
    pub command_buffer: vk::CommandBuffer,
}

/// All per-frame synchronization state.
///
/// Render-finished semaphores are indexed by swapchain image, not by slot:
/// presentation holds the semaphore until the image comes back, which can
/// outlive the slot's next turn.
pub struct FramePool {
    device: Device,
    slots: Vec<FrameSlot>,
    render_finished: Vec<Semaphore>,
    cursor: SlotCursor,
}

impl FramePool {
    /// Create slot state for the fixed overlap depth and one render-finished
    /// semaphore per swapchain image.
    pub fn new(device: Device, command_pool: &CommandPool, image_count: usize) -> VulkanResult<Self> {
        let command_buffers = command_pool.allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;

        let mut slots = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        for &command_buffer in &command_buffers {
            slots.push(FrameSlot {
                image_available: Semaphore::new(device.clone())?,
                in_flight: Fence::new(device.clone(), true)?,
                command_buffer,
            });
        }

        let mut render_finished = Vec::with_capacity(image_count);
        for _ in 0..image_count {
            render_finished.push(Semaphore::new(device.clone())?);
        }

        Ok(Self {
            device,
            slots,
            render_finished,
            cursor: SlotCursor::new(MAX_FRAMES_IN_FLIGHT),
        })
    }

    /// The slot the next frame will use
    pub fn current_slot(&self) -> &FrameSlot {
        &self.slots[self.cursor.current()]
    }

    /// Mark the current slot consumed and move to the next one
    pub fn advance(&mut self) {
        self.cursor.advance();
    }

    /// Render-finished semaphore for a swapchain image index
    pub fn render_finished(&self, image_index: u32) -> vk::Semaphore {
        self.render_finished[image_index as usize].handle()
    }

    /// Rebuild the per-image semaphore array if the swapchain image count
    /// changed on recreation. Caller must have the device idle.
    pub fn match_image_count(&mut self, image_count: usize) -> VulkanResult<()> {
        if self.render_finished.len() == image_count {
            return Ok(());
        }

        let mut rebuilt = Vec::with_capacity(image_count);
        for _ in 0..image_count {
            rebuilt.push(Semaphore::new(self.device.clone())?);
        }
        self.render_finished = rebuilt;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_rotates_over_both_slots() {
        let mut cursor = SlotCursor::new(MAX_FRAMES_IN_FLIGHT);
        assert_eq!(cursor.current(), 0);

        cursor.advance();
        assert_eq!(cursor.current(), 1);

        cursor.advance();
        assert_eq!(cursor.current(), 0);

        cursor.advance();
        assert_eq!(cursor.current(), 1);
    }

    #[test]
    fn cursor_without_advance_stays_put() {
        let cursor = SlotCursor::new(MAX_FRAMES_IN_FLIGHT);
        assert_eq!(cursor.current(), 0);
        assert_eq!(cursor.current(), 0);
    }
}
