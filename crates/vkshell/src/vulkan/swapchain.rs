//! Swapchain management
//!
//! Owns the presentable image chain together with one image view and one
//! framebuffer per image, so the three arrays can never drift out of step.
//! Surface format, present mode, extent, and image count selection are pure
//! functions over the queried surface capabilities.

use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::{vk, Device};

use crate::vulkan::context::{PhysicalDeviceInfo, VulkanError, VulkanResult};

/// Pick the surface format.
///
/// Prefers 8-bit BGRA unorm with sRGB nonlinear color space, otherwise takes
/// whatever the surface lists first. Callers must pass a non-empty slice;
/// device selection already rejected surfaces without formats.
pub fn choose_surface_format(available: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    available
        .iter()
        .find(|format| {
            format.format == vk::Format::B8G8R8A8_UNORM
                && format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .copied()
        .unwrap_or(available[0])
}

/// Resolve the swapchain extent from the surface capabilities.
///
/// When the surface reports a fixed extent that is used directly; the
/// all-ones sentinel means the window system lets the application choose, in
/// which case the framebuffer size is clamped into the supported range.
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_extent: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: window_extent.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window_extent.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// Request one image more than the minimum, clamped to the surface maximum.
/// A reported maximum of zero means no upper limit.
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

/// Swapchain and its per-image views and framebuffers, with RAII cleanup
pub struct Swapchain {
    device: Device,
    loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    framebuffers: Vec<vk::Framebuffer>,
    format: vk::Format,
    extent: vk::Extent2D,
}

impl Swapchain {
    /// Create a swapchain for the surface, plus an image view and framebuffer
    /// per image.
    ///
    /// `old_swapchain` may be null on first creation; on recreation the
    /// retired chain's handle is passed so the driver can reuse its images.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: Device,
        loader: &SwapchainLoader,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
        physical: &PhysicalDeviceInfo,
        window_extent: vk::Extent2D,
        render_pass: vk::RenderPass,
        old_swapchain: vk::SwapchainKHR,
    ) -> VulkanResult<Self> {
        let capabilities = unsafe {
            surface_loader
                .get_physical_device_surface_capabilities(physical.device, surface)
                .map_err(VulkanError::Api)?
        };
        let formats = unsafe {
            surface_loader
                .get_physical_device_surface_formats(physical.device, surface)
                .map_err(VulkanError::Api)?
        };

        let surface_format = choose_surface_format(&formats);
        let extent = choose_extent(&capabilities, window_extent);
        let image_count = choose_image_count(&capabilities);

        // FIFO is the only present mode every driver must support, and it
        // caps the frame rate at the display refresh, which suits a tool
        // shell.
        let present_mode = vk::PresentModeKHR::FIFO;

        let mut create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let family_indices = [physical.graphics_family, physical.present_family];
        if physical.graphics_family != physical.present_family {
            create_info = create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&family_indices);
        } else {
            create_info = create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE);
        }

        let swapchain = unsafe {
            loader
                .create_swapchain(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        let images = unsafe {
            loader
                .get_swapchain_images(swapchain)
                .map_err(VulkanError::Api)?
        };

        let image_views =
            Self::create_image_views(&device, &images, surface_format.format).map_err(|e| {
                unsafe { loader.destroy_swapchain(swapchain, None) };
                e
            })?;

        let framebuffers =
            Self::create_framebuffers(&device, &image_views, render_pass, extent).map_err(|e| {
                unsafe {
                    for view in &image_views {
                        device.destroy_image_view(*view, None);
                    }
                    loader.destroy_swapchain(swapchain, None);
                }
                e
            })?;

        log::debug!(
            "swapchain created: {} images, {:?}, {}x{}",
            images.len(),
            surface_format.format,
            extent.width,
            extent.height
        );

        Ok(Self {
            device,
            loader: loader.clone(),
            swapchain,
            images,
            image_views,
            framebuffers,
            format: surface_format.format,
            extent,
        })
    }

    fn create_image_views(
        device: &Device,
        images: &[vk::Image],
        format: vk::Format,
    ) -> VulkanResult<Vec<vk::ImageView>> {
        let mut views = Vec::with_capacity(images.len());

        for &image in images {
            let create_info = vk::ImageViewCreateInfo::builder()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping::default())
                .subresource_range(
                    vk::ImageSubresourceRange::builder()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1)
                        .build(),
                );

            let view = unsafe {
                device
                    .create_image_view(&create_info, None)
                    .map_err(|e| {
                        for view in &views {
                            device.destroy_image_view(*view, None);
                        }
                        VulkanError::Api(e)
                    })?
            };
            views.push(view);
        }

        Ok(views)
    }

    fn create_framebuffers(
        device: &Device,
        image_views: &[vk::ImageView],
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
    ) -> VulkanResult<Vec<vk::Framebuffer>> {
        let mut framebuffers = Vec::with_capacity(image_views.len());

        for &view in image_views {
            let attachments = [view];
            let create_info = vk::FramebufferCreateInfo::builder()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            let framebuffer = unsafe {
                device
                    .create_framebuffer(&create_info, None)
                    .map_err(|e| {
                        for fb in &framebuffers {
                            device.destroy_framebuffer(*fb, None);
                        }
                        VulkanError::Api(e)
                    })?
            };
            framebuffers.push(framebuffer);
        }

        Ok(framebuffers)
    }

    /// Get the swapchain handle
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Number of images in the chain
    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }

    /// Framebuffer for a swapchain image index
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    /// Image format of the chain
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Current extent of the chain
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for &framebuffer in &self.framebuffers {
                self.device.destroy_framebuffer(framebuffer, None);
            }
            for &view in &self.image_views {
                self.device.destroy_image_view(view, None);
            }
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    fn capabilities(
        current: vk::Extent2D,
        min: vk::Extent2D,
        max: vk::Extent2D,
        min_images: u32,
        max_images: u32,
    ) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: current,
            min_image_extent: min,
            max_image_extent: max,
            min_image_count: min_images,
            max_image_count: max_images,
            ..Default::default()
        }
    }

    fn extent(width: u32, height: u32) -> vk::Extent2D {
        vk::Extent2D { width, height }
    }

    #[test]
    fn prefers_bgra_unorm_srgb() {
        let formats = [
            format(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];

        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [
            format(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::R16G16B16A16_SFLOAT, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];

        assert_eq!(choose_surface_format(&formats).format, vk::Format::R8G8B8A8_SRGB);
    }

    #[test]
    fn uses_fixed_extent_when_surface_reports_one() {
        let caps = capabilities(extent(800, 600), extent(1, 1), extent(4096, 4096), 2, 8);
        assert_eq!(choose_extent(&caps, extent(1280, 720)), extent(800, 600));
    }

    #[test]
    fn clamps_window_extent_when_surface_defers() {
        let caps = capabilities(
            extent(u32::MAX, u32::MAX),
            extent(64, 64),
            extent(2048, 2048),
            2,
            8,
        );

        // Below the minimum on both axes.
        assert_eq!(choose_extent(&caps, extent(50, 50)), extent(64, 64));
        // Above the maximum on both axes.
        assert_eq!(choose_extent(&caps, extent(4000, 3000)), extent(2048, 2048));
        // In range passes through.
        assert_eq!(choose_extent(&caps, extent(1280, 720)), extent(1280, 720));
    }

    #[test]
    fn requests_one_image_over_minimum() {
        let caps = capabilities(extent(800, 600), extent(1, 1), extent(4096, 4096), 2, 8);
        assert_eq!(choose_image_count(&caps), 3);
    }

    #[test]
    fn image_count_respects_surface_maximum() {
        let caps = capabilities(extent(800, 600), extent(1, 1), extent(4096, 4096), 3, 3);
        assert_eq!(choose_image_count(&caps), 3);
    }

    #[test]
    fn zero_maximum_means_unbounded() {
        let caps = capabilities(extent(800, 600), extent(1, 1), extent(4096, 4096), 5, 0);
        assert_eq!(choose_image_count(&caps), 6);
    }
}
