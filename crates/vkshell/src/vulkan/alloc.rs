//! RAII wrappers over VMA allocations
//!
//! A buffer or image and its memory allocation are created together and must
//! be released together; these wrappers make the pairing a type instead of a
//! convention. An empty (default) wrapper owns nothing and its drop is a
//! no-op, which gives move-out semantics via [`AllocatedBuffer::take`].

use ash::vk;
use std::sync::{Arc, Mutex};
use vk_mem::Alloc;

use crate::vulkan::context::{VulkanError, VulkanResult};

/// A buffer handle paired with the VMA allocation backing it
pub struct AllocatedBuffer {
    allocator: Option<Arc<Mutex<vk_mem::Allocator>>>,
    buffer: vk::Buffer,
    allocation: Option<vk_mem::Allocation>,
}

impl AllocatedBuffer {
    /// Create a buffer with automatic memory placement
    pub fn new(
        allocator: Arc<Mutex<vk_mem::Allocator>>,
        buffer_info: &vk::BufferCreateInfo,
        usage: vk_mem::MemoryUsage,
    ) -> VulkanResult<Self> {
        let allocation_info = vk_mem::AllocationCreateInfo {
            usage,
            ..Default::default()
        };

        let (buffer, allocation) = unsafe {
            allocator
                .lock()
                .expect("allocator mutex poisoned")
                .create_buffer(buffer_info, &allocation_info)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            allocator: Some(allocator),
            buffer,
            allocation: Some(allocation),
        })
    }

    /// Wrap an existing buffer/allocation pair, taking ownership of both
    pub fn adopt(
        allocator: Arc<Mutex<vk_mem::Allocator>>,
        buffer: vk::Buffer,
        allocation: vk_mem::Allocation,
    ) -> Self {
        Self {
            allocator: Some(allocator),
            buffer,
            allocation: Some(allocation),
        }
    }

    /// Get the buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// True when this wrapper owns nothing
    pub fn is_empty(&self) -> bool {
        self.allocation.is_none()
    }

    /// Move the buffer and allocation out, leaving this wrapper empty.
    ///
    /// Returns `None` if the wrapper was already empty. The caller becomes
    /// responsible for releasing the pair.
    pub fn take(&mut self) -> Option<(vk::Buffer, vk_mem::Allocation)> {
        let allocation = self.allocation.take()?;
        self.allocator = None;
        let buffer = std::mem::take(&mut self.buffer);
        Some((buffer, allocation))
    }
}

impl Default for AllocatedBuffer {
    fn default() -> Self {
        Self {
            allocator: None,
            buffer: vk::Buffer::null(),
            allocation: None,
        }
    }
}

impl Drop for AllocatedBuffer {
    fn drop(&mut self) {
        if let (Some(allocator), Some(mut allocation)) =
            (self.allocator.take(), self.allocation.take())
        {
            unsafe {
                allocator
                    .lock()
                    .expect("allocator mutex poisoned")
                    .destroy_buffer(self.buffer, &mut allocation);
            }
        }
    }
}

/// An image handle paired with the VMA allocation backing it
pub struct AllocatedImage {
    allocator: Option<Arc<Mutex<vk_mem::Allocator>>>,
    image: vk::Image,
    allocation: Option<vk_mem::Allocation>,
}

impl AllocatedImage {
    /// Create an image with automatic memory placement
    pub fn new(
        allocator: Arc<Mutex<vk_mem::Allocator>>,
        image_info: &vk::ImageCreateInfo,
        usage: vk_mem::MemoryUsage,
    ) -> VulkanResult<Self> {
        let allocation_info = vk_mem::AllocationCreateInfo {
            usage,
            ..Default::default()
        };

        let (image, allocation) = unsafe {
            allocator
                .lock()
                .expect("allocator mutex poisoned")
                .create_image(image_info, &allocation_info)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            allocator: Some(allocator),
            image,
            allocation: Some(allocation),
        })
    }

    /// Wrap an existing image/allocation pair, taking ownership of both
    pub fn adopt(
        allocator: Arc<Mutex<vk_mem::Allocator>>,
        image: vk::Image,
        allocation: vk_mem::Allocation,
    ) -> Self {
        Self {
            allocator: Some(allocator),
            image,
            allocation: Some(allocation),
        }
    }

    /// Get the image handle
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// True when this wrapper owns nothing
    pub fn is_empty(&self) -> bool {
        self.allocation.is_none()
    }

    /// Move the image and allocation out, leaving this wrapper empty
    pub fn take(&mut self) -> Option<(vk::Image, vk_mem::Allocation)> {
        let allocation = self.allocation.take()?;
        self.allocator = None;
        let image = std::mem::take(&mut self.image);
        Some((image, allocation))
    }
}

impl Default for AllocatedImage {
    fn default() -> Self {
        Self {
            allocator: None,
            image: vk::Image::null(),
            allocation: None,
        }
    }
}

impl Drop for AllocatedImage {
    fn drop(&mut self) {
        if let (Some(allocator), Some(mut allocation)) =
            (self.allocator.take(), self.allocation.take())
        {
            unsafe {
                allocator
                    .lock()
                    .expect("allocator mutex poisoned")
                    .destroy_image(self.image, &mut allocation);
            }
        }
    }
}

/// A bare memory allocation with no resource bound to it
pub struct GpuAllocation {
    allocator: Option<Arc<Mutex<vk_mem::Allocator>>>,
    allocation: Option<vk_mem::Allocation>,
}

impl GpuAllocation {
    /// Allocate memory satisfying the given requirements
    pub fn new(
        allocator: Arc<Mutex<vk_mem::Allocator>>,
        requirements: &vk::MemoryRequirements,
        usage: vk_mem::MemoryUsage,
    ) -> VulkanResult<Self> {
        let allocation_info = vk_mem::AllocationCreateInfo {
            usage,
            ..Default::default()
        };

        let allocation = unsafe {
            allocator
                .lock()
                .expect("allocator mutex poisoned")
                .allocate_memory(requirements, &allocation_info)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            allocator: Some(allocator),
            allocation: Some(allocation),
        })
    }

    /// Wrap an existing allocation, taking ownership
    pub fn adopt(allocator: Arc<Mutex<vk_mem::Allocator>>, allocation: vk_mem::Allocation) -> Self {
        Self {
            allocator: Some(allocator),
            allocation: Some(allocation),
        }
    }

    /// True when this wrapper owns nothing
    pub fn is_empty(&self) -> bool {
        self.allocation.is_none()
    }

    /// Move the allocation out, leaving this wrapper empty
    pub fn take(&mut self) -> Option<vk_mem::Allocation> {
        self.allocator = None;
        self.allocation.take()
    }
}

impl Default for GpuAllocation {
    fn default() -> Self {
        Self {
            allocator: None,
            allocation: None,
        }
    }
}

impl Drop for GpuAllocation {
    fn drop(&mut self) {
        if let (Some(allocator), Some(mut allocation)) =
            (self.allocator.take(), self.allocation.take())
        {
            unsafe {
                allocator
                    .lock()
                    .expect("allocator mutex poisoned")
                    .free_memory(&mut allocation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Creating a live allocation needs an instance and device, so the
    // destroy-exactly-once half of the contract is not exercised here. A
    // moved-from wrapper is field-for-field identical to a default one, so
    // the empty-state checks below cover the inert side of take().

    #[test]
    fn default_buffer_is_empty() {
        let buffer = AllocatedBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.handle(), vk::Buffer::null());
        // Dropping an empty wrapper must not touch an allocator.
    }

    #[test]
    fn take_on_empty_buffer_returns_none() {
        let mut buffer = AllocatedBuffer::default();
        assert!(buffer.take().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn default_image_is_empty() {
        let image = AllocatedImage::default();
        assert!(image.is_empty());
        assert_eq!(image.handle(), vk::Image::null());
    }

    #[test]
    fn take_on_empty_image_returns_none() {
        let mut image = AllocatedImage::default();
        assert!(image.take().is_none());
        assert!(image.is_empty());
    }

    #[test]
    fn default_allocation_is_empty_and_take_returns_none() {
        let mut allocation = GpuAllocation::default();
        assert!(allocation.is_empty());
        assert!(allocation.take().is_none());
    }
}
