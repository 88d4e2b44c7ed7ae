//! Vulkan context bootstrap
//!
//! Creates the instance, debug instrumentation, surface, physical/logical
//! device, and the VMA allocator, in that order. Every failure in here is
//! fatal: the shell cannot run without a capable device, so errors are
//! returned to the caller and nothing is retried.

use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
#[cfg(debug_assertions)]
use ash::extensions::ext::DebugUtils;
use ash::{vk, Device, Entry, Instance};
use std::ffi::{CStr, CString};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::vulkan::commands::CommandPool;
use crate::vulkan::swapchain::{choose_surface_format, Swapchain};
use crate::vulkan::sync::FramePool;

/// Vulkan-specific error type
#[derive(Error, Debug)]
pub enum VulkanError {
    /// Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Context initialization failed
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

#[cfg(debug_assertions)]
const VALIDATION_LAYER: &CStr =
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_LAYER_KHRONOS_validation\0") };

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    /// Vulkan entry point
    pub entry: Entry,
    /// Vulkan instance handle
    pub instance: Instance,
    /// Debug utilities extension (debug builds)
    #[cfg(debug_assertions)]
    debug_utils: DebugUtils,
    /// Debug messenger handle (debug builds)
    #[cfg(debug_assertions)]
    debug_messenger: vk::DebugUtilsMessengerEXT,
}

impl VulkanInstance {
    /// Create a Vulkan instance with the extensions the window system needs.
    ///
    /// In debug builds the Khronos validation layer and a debug messenger are
    /// enabled; a missing validation layer is a fatal bootstrap error.
    pub fn new(glfw: &glfw::Glfw, app_name: &str) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }.map_err(|e| {
            VulkanError::InitializationFailed(format!("failed to load Vulkan: {e:?}"))
        })?;

        #[cfg(debug_assertions)]
        Self::check_validation_layer_support(&entry)?;

        let app_name_cstr = CString::new(app_name).unwrap_or_default();
        let engine_name_cstr = CString::new("vkshell").unwrap();
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&engine_name_cstr)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_3);

        let required_extensions = glfw.get_required_instance_extensions().ok_or_else(|| {
            VulkanError::InitializationFailed(
                "window system reports no Vulkan support".to_string(),
            )
        })?;

        let cstr_extensions: Vec<CString> = required_extensions
            .iter()
            .map(|ext| CString::new(ext.as_str()).unwrap())
            .collect();

        #[allow(unused_mut)] // extended in debug builds
        let mut extensions: Vec<*const i8> =
            cstr_extensions.iter().map(|ext| ext.as_ptr()).collect();

        #[cfg(debug_assertions)]
        extensions.push(DebugUtils::name().as_ptr());

        #[cfg(debug_assertions)]
        let layers = [VALIDATION_LAYER.as_ptr()];
        #[cfg(not(debug_assertions))]
        let layers: [*const i8; 0] = [];

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        #[cfg(debug_assertions)]
        let (debug_utils, debug_messenger) = {
            let debug_utils = DebugUtils::new(&entry, &instance);
            let messenger = Self::setup_debug_messenger(&debug_utils)?;
            (debug_utils, messenger)
        };

        Ok(Self {
            entry,
            instance,
            #[cfg(debug_assertions)]
            debug_utils,
            #[cfg(debug_assertions)]
            debug_messenger,
        })
    }

    #[cfg(debug_assertions)]
    fn check_validation_layer_support(entry: &Entry) -> VulkanResult<()> {
        let available = entry
            .enumerate_instance_layer_properties()
            .map_err(VulkanError::Api)?;

        let found = available.iter().any(|layer| {
            let name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
            name == VALIDATION_LAYER
        });

        if found {
            Ok(())
        } else {
            Err(VulkanError::InitializationFailed(
                "validation layers requested, but not available".to_string(),
            ))
        }
    }

    #[cfg(debug_assertions)]
    fn setup_debug_messenger(debug_utils: &DebugUtils) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        unsafe {
            debug_utils
                .create_debug_utils_messenger(&create_info, None)
                .map_err(VulkanError::Api)
        }
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            #[cfg(debug_assertions)]
            self.debug_utils
                .destroy_debug_utils_messenger(self.debug_messenger, None);

            self.instance.destroy_instance(None);
        }
    }
}

/// Debug callback for validation layers, routed through the log facade
#[cfg(debug_assertions)]
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[vulkan] {:?} - {}", message_type, message);
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::warn!("[vulkan] {:?} - {}", message_type, message);
    } else {
        log::debug!("[vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}

/// Graphics and present queue family indices discovered on a device
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueFamilyIndices {
    /// Family supporting graphics operations
    pub graphics: Option<u32>,
    /// Family supporting presentation to the surface
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    /// True when both required families were found
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }
}

/// True if every required extension name appears in the available set
pub(crate) fn supports_required_extensions(
    available: &[vk::ExtensionProperties],
    required: &[&CStr],
) -> bool {
    required.iter().all(|required| {
        available.iter().any(|props| {
            let name = unsafe { CStr::from_ptr(props.extension_name.as_ptr()) };
            name == *required
        })
    })
}

/// Device-suitability predicate: a conjunction of queue completeness,
/// extension support, and a non-empty format/present-mode set. No scoring.
pub(crate) fn is_device_suitable(
    indices: &QueueFamilyIndices,
    extensions_supported: bool,
    format_count: usize,
    present_mode_count: usize,
) -> bool {
    indices.is_complete() && extensions_supported && format_count > 0 && present_mode_count > 0
}

/// Selected physical device and its queue families
pub struct PhysicalDeviceInfo {
    /// Vulkan physical device handle
    pub device: vk::PhysicalDevice,
    /// Device properties and limits
    pub properties: vk::PhysicalDeviceProperties,
    /// Index of the graphics queue family
    pub graphics_family: u32,
    /// Index of the presentation queue family
    pub present_family: u32,
}

impl PhysicalDeviceInfo {
    /// Select the first device satisfying all suitability predicates
    pub fn select(
        instance: &Instance,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
    ) -> VulkanResult<Self> {
        let devices = unsafe {
            instance
                .enumerate_physical_devices()
                .map_err(VulkanError::Api)?
        };

        if devices.is_empty() {
            return Err(VulkanError::InitializationFailed(
                "failed to find GPUs with Vulkan support".to_string(),
            ));
        }

        for device in devices {
            if let Some(info) = Self::evaluate(instance, device, surface, surface_loader)? {
                log::info!("selected GPU: {}", unsafe {
                    CStr::from_ptr(info.properties.device_name.as_ptr()).to_string_lossy()
                });
                return Ok(info);
            }
        }

        Err(VulkanError::InitializationFailed(
            "no suitable GPU found".to_string(),
        ))
    }

    /// Find the graphics and present queue families on a device
    pub fn find_queue_families(
        instance: &Instance,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
    ) -> VulkanResult<QueueFamilyIndices> {
        let queue_families =
            unsafe { instance.get_physical_device_queue_family_properties(device) };

        let mut indices = QueueFamilyIndices::default();

        for (index, family) in queue_families.iter().enumerate() {
            let index = index as u32;

            if family.queue_flags.contains(vk::QueueFlags::GRAPHICS) && indices.graphics.is_none() {
                indices.graphics = Some(index);
            }

            let present_support = unsafe {
                surface_loader
                    .get_physical_device_surface_support(device, index, surface)
                    .map_err(VulkanError::Api)?
            };

            if present_support && indices.present.is_none() {
                indices.present = Some(index);
            }

            if indices.is_complete() {
                break;
            }
        }

        Ok(indices)
    }

    fn evaluate(
        instance: &Instance,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &Surface,
    ) -> VulkanResult<Option<Self>> {
        let indices = Self::find_queue_families(instance, device, surface, surface_loader)?;

        let available_extensions = unsafe {
            instance
                .enumerate_device_extension_properties(device)
                .map_err(VulkanError::Api)?
        };
        let extensions_supported =
            supports_required_extensions(&available_extensions, &[SwapchainLoader::name()]);

        // Only query swapchain support once the extension is known to exist.
        let (format_count, present_mode_count) = if extensions_supported {
            let formats = unsafe {
                surface_loader
                    .get_physical_device_surface_formats(device, surface)
                    .map_err(VulkanError::Api)?
            };
            let present_modes = unsafe {
                surface_loader
                    .get_physical_device_surface_present_modes(device, surface)
                    .map_err(VulkanError::Api)?
            };
            (formats.len(), present_modes.len())
        } else {
            (0, 0)
        };

        if !is_device_suitable(&indices, extensions_supported, format_count, present_mode_count) {
            return Ok(None);
        }

        let properties = unsafe { instance.get_physical_device_properties(device) };

        Ok(Some(Self {
            device,
            properties,
            graphics_family: indices.graphics.unwrap_or_default(),
            present_family: indices.present.unwrap_or_default(),
        }))
    }
}

/// Logical device wrapper with RAII cleanup
pub struct LogicalDevice {
    /// Vulkan logical device handle
    pub device: Device,
    /// Graphics operations queue
    pub graphics_queue: vk::Queue,
    /// Surface presentation queue
    pub present_queue: vk::Queue,
    /// Index of the graphics queue family
    pub graphics_family: u32,
    /// Index of the presentation queue family
    pub present_family: u32,
    /// Swapchain extension loader
    pub swapchain_loader: SwapchainLoader,
}

impl LogicalDevice {
    /// Create a logical device with one queue per unique required family
    pub fn new(instance: &Instance, physical: &PhysicalDeviceInfo) -> VulkanResult<Self> {
        let unique_families: std::collections::HashSet<u32> =
            [physical.graphics_family, physical.present_family]
                .iter()
                .copied()
                .collect();

        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = unique_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&[1.0])
                    .build()
            })
            .collect();

        let required_extensions = [SwapchainLoader::name().as_ptr()];
        let device_features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&required_extensions)
            .enabled_features(&device_features);

        let device = unsafe {
            instance
                .create_device(physical.device, &create_info, None)
                .map_err(VulkanError::Api)?
        };

        let graphics_queue = unsafe { device.get_device_queue(physical.graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(physical.present_family, 0) };
        let swapchain_loader = SwapchainLoader::new(instance, &device);

        Ok(Self {
            device,
            graphics_queue,
            present_queue,
            graphics_family: physical.graphics_family,
            present_family: physical.present_family,
            swapchain_loader,
        })
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

/// Render pass wrapper with RAII cleanup
pub struct RenderPass {
    device: Device,
    render_pass: vk::RenderPass,
}

impl RenderPass {
    /// Create the single-color-attachment clear pass the shell renders with
    pub fn new(device: Device, color_format: vk::Format) -> VulkanResult<Self> {
        let color_attachment = vk::AttachmentDescription::builder()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
            .build();

        let color_attachment_ref = vk::AttachmentReference::builder()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .build();

        let color_attachments = [color_attachment_ref];
        let subpass = vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_attachments)
            .build();

        let dependency = vk::SubpassDependency::builder()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
            .build();

        let attachments = [color_attachment];
        let subpasses = [subpass];
        let dependencies = [dependency];
        let create_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = unsafe {
            device
                .create_render_pass(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device,
            render_pass,
        })
    }

    /// Get the render pass handle
    pub fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

/// Descriptor pool wrapper with RAII cleanup.
///
/// Fixed sizing: 10 combined-image-sampler descriptors across 10 sets, with
/// the free-descriptor-set flag so the GUI renderer can return sets.
pub struct DescriptorPool {
    device: Device,
    pool: vk::DescriptorPool,
}

impl DescriptorPool {
    /// Create the shell's descriptor pool
    pub fn new(device: Device) -> VulkanResult<Self> {
        let pool_sizes = [vk::DescriptorPoolSize::builder()
            .ty(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(10)
            .build()];

        let create_info = vk::DescriptorPoolCreateInfo::builder()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(10)
            .pool_sizes(&pool_sizes);

        let pool = unsafe {
            device
                .create_descriptor_pool(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, pool })
    }

    /// Get the descriptor pool handle
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

/// Sampler wrapper with RAII cleanup; fixed linear filtering / repeat wrap
pub struct Sampler {
    device: Device,
    sampler: vk::Sampler,
}

impl Sampler {
    /// Create the shell's default sampler
    pub fn new(device: Device) -> VulkanResult<Self> {
        let create_info = vk::SamplerCreateInfo::builder()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(false)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false);

        let sampler = unsafe {
            device
                .create_sampler(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, sampler })
    }

    /// Get the sampler handle
    pub fn handle(&self) -> vk::Sampler {
        self.sampler
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler(self.sampler, None);
        }
    }
}

/// Fully initialized device context owning every bootstrap resource.
///
/// Field order matters: sync objects and the command pool drop before the
/// allocator and logical device, and the instance drops last.
pub struct GraphicsContext {
    /// Per-frame sync objects and command buffers
    pub frames: FramePool,
    /// Command pool for the graphics family
    pub command_pool: CommandPool,
    /// Default linear/repeat sampler
    pub sampler: Sampler,
    /// Shared descriptor pool
    pub descriptor_pool: DescriptorPool,
    /// Presentable image chain
    pub swapchain: Swapchain,
    /// Clear pass over the swapchain color attachment
    pub render_pass: RenderPass,
    allocator: Arc<Mutex<vk_mem::Allocator>>,
    /// Logical device and queues
    pub device: LogicalDevice,
    /// Selected physical device
    pub physical_device: PhysicalDeviceInfo,
    surface: vk::SurfaceKHR,
    surface_loader: Surface,
    /// Instance and debug instrumentation
    pub instance: VulkanInstance,
}

impl GraphicsContext {
    /// Bootstrap the full device context for a window.
    ///
    /// Any failure here is unrecoverable and is returned to the caller.
    pub fn new(
        glfw: &glfw::Glfw,
        window: &mut glfw::PWindow,
        app_name: &str,
    ) -> VulkanResult<Self> {
        let instance = VulkanInstance::new(glfw, app_name)?;
        let surface_loader = Surface::new(&instance.entry, &instance.instance);

        let mut surface = vk::SurfaceKHR::null();
        let result =
            window.create_window_surface(instance.instance.handle(), std::ptr::null(), &mut surface);
        if result != vk::Result::SUCCESS {
            return Err(VulkanError::InitializationFailed(format!(
                "surface creation failed: {result:?}"
            )));
        }

        let physical_device =
            PhysicalDeviceInfo::select(&instance.instance, surface, &surface_loader)?;
        let device = LogicalDevice::new(&instance.instance, &physical_device)?;

        let allocator = {
            let create_info = vk_mem::AllocatorCreateInfo::new(
                &instance.instance,
                &device.device,
                physical_device.device,
            );
            let allocator = vk_mem::Allocator::new(create_info).map_err(VulkanError::Api)?;
            Arc::new(Mutex::new(allocator))
        };

        // The render pass only depends on the surface format, which is
        // stable across swapchain recreation, so it is created once here.
        let formats = unsafe {
            surface_loader
                .get_physical_device_surface_formats(physical_device.device, surface)
                .map_err(VulkanError::Api)?
        };
        let surface_format = choose_surface_format(&formats);
        let render_pass = RenderPass::new(device.device.clone(), surface_format.format)?;

        let (fb_width, fb_height) = window.get_framebuffer_size();
        let window_extent = vk::Extent2D {
            width: fb_width.max(0) as u32,
            height: fb_height.max(0) as u32,
        };

        let swapchain = Swapchain::new(
            device.device.clone(),
            &device.swapchain_loader,
            surface,
            &surface_loader,
            &physical_device,
            window_extent,
            render_pass.handle(),
            vk::SwapchainKHR::null(),
        )?;

        let descriptor_pool = DescriptorPool::new(device.device.clone())?;
        let sampler = Sampler::new(device.device.clone())?;
        let command_pool = CommandPool::new(device.device.clone(), physical_device.graphics_family)?;
        let frames = FramePool::new(
            device.device.clone(),
            &command_pool,
            swapchain.image_count() as usize,
        )?;

        Ok(Self {
            frames,
            command_pool,
            sampler,
            descriptor_pool,
            swapchain,
            render_pass,
            allocator,
            device,
            physical_device,
            surface,
            surface_loader,
            instance,
        })
    }

    /// Shared handle to the VMA allocator
    pub fn allocator(&self) -> Arc<Mutex<vk_mem::Allocator>> {
        Arc::clone(&self.allocator)
    }

    /// Current swapchain extent
    pub fn swapchain_extent(&self) -> vk::Extent2D {
        self.swapchain.extent()
    }

    /// Tear down and rebuild the swapchain and its dependent image views and
    /// framebuffers for a new framebuffer size.
    ///
    /// The old swapchain handle is passed to the creation call so the driver
    /// can reuse resources before the old chain is destroyed.
    pub fn recreate_swapchain(&mut self, window_extent: vk::Extent2D) -> VulkanResult<()> {
        unsafe {
            self.device
                .device
                .device_wait_idle()
                .map_err(VulkanError::Api)?;
        }

        let new_swapchain = Swapchain::new(
            self.device.device.clone(),
            &self.device.swapchain_loader,
            self.surface,
            &self.surface_loader,
            &self.physical_device,
            window_extent,
            self.render_pass.handle(),
            self.swapchain.handle(),
        )?;

        // Dropping the old chain here destroys its views, framebuffers, and
        // retired swapchain handle; the device is idle so nothing is in use.
        self.swapchain = new_swapchain;

        self.frames
            .match_image_count(self.swapchain.image_count() as usize)?;

        log::debug!(
            "swapchain recreated at {}x{}",
            self.swapchain.extent().width,
            self.swapchain.extent().height
        );

        Ok(())
    }

    /// Block until the device finished all submitted work
    pub fn wait_idle(&self) {
        unsafe {
            let _ = self.device.device.device_wait_idle();
        }
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device.device_wait_idle();
            self.surface_loader.destroy_surface(self.surface, None);
        }
        // Remaining cleanup happens through field drop order declared above.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::c_char;

    fn extension(name: &CStr) -> vk::ExtensionProperties {
        let mut props = vk::ExtensionProperties::default();
        for (i, byte) in name.to_bytes_with_nul().iter().enumerate() {
            props.extension_name[i] = *byte as c_char;
        }
        props
    }

    fn complete_indices() -> QueueFamilyIndices {
        QueueFamilyIndices {
            graphics: Some(0),
            present: Some(0),
        }
    }

    #[test]
    fn extension_check_accepts_superset() {
        let available = [
            extension(SwapchainLoader::name()),
            extension(CStr::from_bytes_with_nul(b"VK_EXT_memory_budget\0").unwrap()),
        ];
        assert!(supports_required_extensions(
            &available,
            &[SwapchainLoader::name()]
        ));
    }

    #[test]
    fn extension_check_rejects_missing() {
        let available = [extension(
            CStr::from_bytes_with_nul(b"VK_EXT_memory_budget\0").unwrap(),
        )];
        assert!(!supports_required_extensions(
            &available,
            &[SwapchainLoader::name()]
        ));
    }

    #[test]
    fn suitable_device_passes_all_predicates() {
        assert!(is_device_suitable(&complete_indices(), true, 2, 1));
    }

    #[test]
    fn device_without_present_family_is_rejected() {
        let indices = QueueFamilyIndices {
            graphics: Some(0),
            present: None,
        };
        assert!(!is_device_suitable(&indices, true, 2, 1));
    }

    #[test]
    fn device_without_graphics_family_is_rejected() {
        let indices = QueueFamilyIndices {
            graphics: None,
            present: Some(1),
        };
        assert!(!is_device_suitable(&indices, true, 2, 1));
    }

    #[test]
    fn device_without_extensions_is_rejected() {
        assert!(!is_device_suitable(&complete_indices(), false, 2, 1));
    }

    #[test]
    fn device_without_formats_or_present_modes_is_rejected() {
        assert!(!is_device_suitable(&complete_indices(), true, 0, 1));
        assert!(!is_device_suitable(&complete_indices(), true, 2, 0));
    }

    #[test]
    fn failure_combinations_are_rejected() {
        let incomplete = QueueFamilyIndices::default();
        for extensions_ok in [false, true] {
            for formats in [0usize, 2] {
                for modes in [0usize, 1] {
                    let all_ok = extensions_ok && formats > 0 && modes > 0;
                    assert!(!is_device_suitable(&incomplete, extensions_ok, formats, modes));
                    assert_eq!(
                        is_device_suitable(&complete_indices(), extensions_ok, formats, modes),
                        all_ok
                    );
                }
            }
        }
    }
}
