//! Command pool management

use ash::{vk, Device};

use crate::vulkan::context::{VulkanError, VulkanResult};

/// Command pool wrapper with RAII cleanup.
///
/// Created with the reset flag so per-frame buffers can be re-recorded
/// individually instead of resetting the whole pool.
pub struct CommandPool {
    device: Device,
    pool: vk::CommandPool,
}

impl CommandPool {
    /// Create a command pool for the given queue family
    pub fn new(device: Device, queue_family_index: u32) -> VulkanResult<Self> {
        let create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);

        let pool = unsafe {
            device
                .create_command_pool(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, pool })
    }

    /// Get the command pool handle
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }

    /// Allocate primary command buffers from this pool.
    ///
    /// The buffers are freed implicitly when the pool is destroyed.
    pub fn allocate_command_buffers(&self, count: u32) -> VulkanResult<Vec<vk::CommandBuffer>> {
        let allocate_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        unsafe {
            self.device
                .allocate_command_buffers(&allocate_info)
                .map_err(VulkanError::Api)
        }
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_command_pool(self.pool, None);
        }
    }
}
