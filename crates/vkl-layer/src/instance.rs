//! Instance teardown, physical devices and surfaces.

use ash::vk;
use vkl_core::RecordObject;

use crate::context::{self, instance_or_return};
use crate::dispatch::{forward_intercepts, InstanceDispatch};
use crate::params::{created, created_slice};

pub unsafe extern "system" fn vkDestroyInstance(
    instance: vk::Instance,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        if instance == vk::Instance::null() {
            return;
        }
        let ctx = instance_or_return!(instance);
        let record = RecordObject::new("vkDestroyInstance");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_instance(instance, &record));
        (ctx.dispatch.v1_0.destroy_instance)(instance, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_instance(instance, &record));

        ctx.dispatch.handles().destroy_object(instance);
        context::unregister_instance(instance);
    }
}

pub unsafe extern "system" fn vkEnumeratePhysicalDevices(
    instance: vk::Instance,
    p_physical_device_count: *mut u32,
    p_physical_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    unsafe {
        let ctx = instance_or_return!(instance, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkEnumeratePhysicalDevices");
        ctx.chain
            .pre(|vo| vo.pre_call_record_enumerate_physical_devices(instance, &record));
        record.result = ctx.dispatch.enumerate_physical_devices(
            instance,
            p_physical_device_count,
            p_physical_devices,
        );
        let count = if p_physical_device_count.is_null() {
            0
        } else {
            *p_physical_device_count
        };
        let physical_devices = created_slice(&record, p_physical_devices, count);
        ctx.chain.post(|vo| {
            vo.post_call_record_enumerate_physical_devices(instance, physical_devices, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkCreateHeadlessSurfaceEXT(
    instance: vk::Instance,
    p_create_info: *const vk::HeadlessSurfaceCreateInfoEXT<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_surface: *mut vk::SurfaceKHR,
) -> vk::Result {
    unsafe {
        let ctx = instance_or_return!(instance, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateHeadlessSurfaceEXT");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_headless_surface_ext(instance, create_info, &record));
        record.result = ctx
            .dispatch
            .create_headless_surface_ext(instance, p_create_info, p_allocator, p_surface);
        let surface = created(&record, p_surface);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_headless_surface_ext(instance, create_info, surface, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroySurfaceKHR(
    instance: vk::Instance,
    surface: vk::SurfaceKHR,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = instance_or_return!(instance);
        let record = RecordObject::new("vkDestroySurfaceKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_surface_khr(instance, surface, &record));
        let native = ctx.dispatch.handles.erase(surface);
        (ctx.dispatch.surface.destroy_surface_khr)(instance, native, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_surface_khr(instance, surface, &record));
    }
}

forward_intercepts! {
    instance fn vkGetPhysicalDeviceSurfaceSupportKHR(
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
        p_supported: *mut vk::Bool32
    ) -> vk::Result = surface.get_physical_device_surface_support_khr;
        hooks pre_call_record_get_physical_device_surface_support_khr,
            post_call_record_get_physical_device_surface_support_khr(queue_family_index, surface);
        unwrap(surface);

    instance fn vkGetPhysicalDeviceSurfaceCapabilitiesKHR(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        p_surface_capabilities: *mut vk::SurfaceCapabilitiesKHR
    ) -> vk::Result = surface.get_physical_device_surface_capabilities_khr;
        hooks pre_call_record_get_physical_device_surface_capabilities_khr,
            post_call_record_get_physical_device_surface_capabilities_khr(surface);
        unwrap(surface);

    instance fn vkGetPhysicalDeviceSurfaceFormatsKHR(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        p_surface_format_count: *mut u32,
        p_surface_formats: *mut vk::SurfaceFormatKHR
    ) -> vk::Result = surface.get_physical_device_surface_formats_khr;
        hooks pre_call_record_get_physical_device_surface_formats_khr,
            post_call_record_get_physical_device_surface_formats_khr(surface);
        unwrap(surface);

    instance fn vkGetPhysicalDeviceSurfacePresentModesKHR(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        p_present_mode_count: *mut u32,
        p_present_modes: *mut vk::PresentModeKHR
    ) -> vk::Result = surface.get_physical_device_surface_present_modes_khr;
        hooks pre_call_record_get_physical_device_surface_present_modes_khr,
            post_call_record_get_physical_device_surface_present_modes_khr(surface);
        unwrap(surface);

    instance fn vkGetPhysicalDevicePresentRectanglesKHR(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        p_rect_count: *mut u32,
        p_rects: *mut vk::Rect2D
    ) -> vk::Result = swapchain.get_physical_device_present_rectangles_khr;
        hooks pre_call_record_get_physical_device_present_rectangles_khr,
            post_call_record_get_physical_device_present_rectangles_khr(surface);
        unwrap(surface);
}

impl InstanceDispatch {
    /// Physical devices are dispatchable; they are registered, never wrapped.
    pub unsafe fn enumerate_physical_devices(
        &self,
        instance: vk::Instance,
        p_physical_device_count: *mut u32,
        p_physical_devices: *mut vk::PhysicalDevice,
    ) -> vk::Result {
        unsafe {
            let result = (self.v1_0.enumerate_physical_devices)(
                instance,
                p_physical_device_count,
                p_physical_devices,
            );
            if result.as_raw() >= 0 && !p_physical_devices.is_null() && !p_physical_device_count.is_null() {
                let written = std::slice::from_raw_parts(p_physical_devices, *p_physical_device_count as usize);
                for &physical_device in written {
                    self.handles.create_object(physical_device);
                }
            }
            result
        }
    }

    pub unsafe fn create_headless_surface_ext(
        &self,
        instance: vk::Instance,
        p_create_info: *const vk::HeadlessSurfaceCreateInfoEXT<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_surface: *mut vk::SurfaceKHR,
    ) -> vk::Result {
        unsafe {
            let result = (self.headless_surface.create_headless_surface_ext)(
                instance,
                p_create_info,
                p_allocator,
                p_surface,
            );
            if result == vk::Result::SUCCESS && !p_surface.is_null() {
                *p_surface = self.handles.wrap_new(*p_surface, None);
            }
            result
        }
    }
}
