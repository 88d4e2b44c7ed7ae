//! Vulkan device layer
//!
//! Bootstrap, swapchain, synchronization, and memory plumbing behind the
//! window shell. Everything here is RAII-wrapped; handle lifetimes follow
//! struct field order.

pub mod alloc;
pub mod commands;
pub mod context;
pub mod swapchain;
pub mod sync;

pub use alloc::{AllocatedBuffer, AllocatedImage, GpuAllocation};
pub use commands::CommandPool;
pub use context::{
    GraphicsContext, LogicalDevice, PhysicalDeviceInfo, QueueFamilyIndices, VulkanError,
    VulkanInstance, VulkanResult,
};
pub use swapchain::Swapchain;
pub use sync::{FramePool, FrameSlot, MAX_FRAMES_IN_FLIGHT};
