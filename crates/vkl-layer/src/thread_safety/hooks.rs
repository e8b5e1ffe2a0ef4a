//! Claims taken and released around each intercepted call.

use std::ffi::c_void;

use ash::vk;
use ash::vk::Handle;
use vkl_core::RecordObject;

use super::ThreadSafety;
use crate::chain::ValidatorKind;
use crate::params::slice;
use crate::validation_object::ValidationObject;

/// One claim, started or finished.
macro_rules! claim {
    ($ts:tt, start, read, $h:expr, $loc:expr) => { $ts.start_read($h, $loc) };
    ($ts:tt, finish, read, $h:expr, $loc:expr) => { $ts.finish_read($h, $loc) };
    ($ts:tt, start, write, $h:expr, $loc:expr) => { $ts.start_write($h, $loc) };
    ($ts:tt, finish, write, $h:expr, $loc:expr) => { $ts.finish_write($h, $loc) };
    ($ts:tt, start, record, $h:expr, $loc:expr) => {
        $ts.start_write_command_buffer($h, $loc, true)
    };
    ($ts:tt, finish, record, $h:expr, $loc:expr) => {
        $ts.finish_write_command_buffer($h, $loc, true)
    };
    ($ts:tt, start, read_all, $h:expr, $loc:expr) => {
        for &handle in $h {
            $ts.start_read(handle, $loc);
        }
    };
    ($ts:tt, finish, read_all, $h:expr, $loc:expr) => {
        for &handle in $h {
            $ts.finish_read(handle, $loc);
        }
    };
}

/// Hook pairs whose claims are a fixed list over their own parameters. The
/// pre hook starts each claim and the post hook finishes it.
macro_rules! claim_hooks {
    ($(
        $pre:ident, $post:ident($($arg:ident: $ty:ty),*) { $($kind:ident($target:expr)),* };
    )*) => {
        $(
            #[allow(unused_variables)]
            fn $pre(&self, $($arg: $ty,)* record: &RecordObject) {
                $(claim!(self, start, $kind, $target, record.location);)*
            }

            #[allow(unused_variables)]
            fn $post(&self, $($arg: $ty,)* record: &RecordObject) {
                $(claim!(self, finish, $kind, $target, record.location);)*
            }
        )*
    };
}

/// Create and destroy hooks of a device child with no other bookkeeping.
macro_rules! object_lifetime_hooks {
    ($(
        $create_pre:ident, $create_post:ident($info_ty:ty) => $object:ident: $object_ty:ty;
        $destroy_pre:ident, $destroy_post:ident;
    )*) => {
        $(
            fn $create_pre(&self, device: vk::Device, _create_info: &$info_ty, record: &RecordObject) {
                self.start_read(device, record.location);
            }

            fn $create_post(
                &self,
                device: vk::Device,
                _create_info: &$info_ty,
                $object: $object_ty,
                record: &RecordObject,
            ) {
                self.finish_read(device, record.location);
                self.create_object($object);
            }

            fn $destroy_pre(&self, device: vk::Device, $object: $object_ty, record: &RecordObject) {
                self.start_read(device, record.location);
                self.start_write($object, record.location);
            }

            fn $destroy_post(&self, device: vk::Device, $object: $object_ty, record: &RecordObject) {
                self.finish_read(device, record.location);
                self.finish_write($object, record.location);
                self.destroy_object($object);
            }
        )*
    };
}

impl ValidationObject for ThreadSafety {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::ThreadSafety
    }

    // ── Instance ────────────────────────────────────────────

    fn post_call_record_create_instance(&self, instance: vk::Instance, _record: &RecordObject) {
        self.create_object(instance);
    }

    fn pre_call_record_destroy_instance(&self, instance: vk::Instance, record: &RecordObject) {
        self.start_write(instance, record.location);
    }

    fn post_call_record_destroy_instance(&self, instance: vk::Instance, record: &RecordObject) {
        self.finish_write(instance, record.location);
        self.destroy_object(instance);
    }

    fn pre_call_record_enumerate_physical_devices(&self, instance: vk::Instance, record: &RecordObject) {
        self.start_read(instance, record.location);
    }

    fn post_call_record_enumerate_physical_devices(
        &self,
        instance: vk::Instance,
        physical_devices: &[vk::PhysicalDevice],
        record: &RecordObject,
    ) {
        self.finish_read(instance, record.location);
        for &pd in physical_devices {
            self.create_object(pd);
        }
    }

    fn pre_call_record_create_headless_surface_ext(
        &self,
        instance: vk::Instance,
        _create_info: &vk::HeadlessSurfaceCreateInfoEXT<'_>,
        record: &RecordObject,
    ) {
        self.start_read(instance, record.location);
    }

    fn post_call_record_create_headless_surface_ext(
        &self,
        instance: vk::Instance,
        _create_info: &vk::HeadlessSurfaceCreateInfoEXT<'_>,
        surface: vk::SurfaceKHR,
        record: &RecordObject,
    ) {
        self.finish_read(instance, record.location);
        self.create_object(surface);
    }

    fn pre_call_record_destroy_surface_khr(
        &self,
        instance: vk::Instance,
        surface: vk::SurfaceKHR,
        record: &RecordObject,
    ) {
        self.start_read(instance, record.location);
        self.start_write(surface, record.location);
    }

    fn post_call_record_destroy_surface_khr(
        &self,
        instance: vk::Instance,
        surface: vk::SurfaceKHR,
        record: &RecordObject,
    ) {
        self.finish_read(instance, record.location);
        self.finish_write(surface, record.location);
        self.destroy_object(surface);
    }

    // ── Device and queues ───────────────────────────────────

    fn post_call_record_create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        device: vk::Device,
        _record: &RecordObject,
    ) {
        self.create_object(physical_device);
        self.create_object(device);
    }

    fn pre_call_record_destroy_device(&self, device: vk::Device, record: &RecordObject) {
        self.start_write(device, record.location);
    }

    fn post_call_record_destroy_device(&self, device: vk::Device, record: &RecordObject) {
        self.finish_write(device, record.location);
        self.destroy_object(device);
    }

    fn pre_call_record_get_device_queue(
        &self,
        device: vk::Device,
        _queue_family_index: u32,
        _queue_index: u32,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_get_device_queue(
        &self,
        device: vk::Device,
        _queue_family_index: u32,
        _queue_index: u32,
        queue: vk::Queue,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        if queue != vk::Queue::null() {
            self.create_object(queue);
            self.maps.write().device_queues.insert(queue.as_raw());
        }
    }

    fn pre_call_record_device_wait_idle(&self, device: vk::Device, record: &RecordObject) {
        self.start_read(device, record.location);
        for queue in self.device_queues() {
            self.start_write(queue, record.location);
        }
    }

    fn post_call_record_device_wait_idle(&self, device: vk::Device, record: &RecordObject) {
        self.finish_read(device, record.location);
        for queue in self.device_queues() {
            self.finish_write(queue, record.location);
        }
    }

    fn pre_call_record_queue_wait_idle(&self, queue: vk::Queue, record: &RecordObject) {
        self.start_write(queue, record.location);
    }

    fn post_call_record_queue_wait_idle(&self, queue: vk::Queue, record: &RecordObject) {
        self.finish_write(queue, record.location);
    }

    fn pre_call_record_queue_submit(
        &self,
        queue: vk::Queue,
        submits: &[vk::SubmitInfo<'_>],
        fence: vk::Fence,
        record: &RecordObject,
    ) {
        self.start_write(queue, record.location);
        self.start_write(fence, record.location);
        for submit in submits {
            for &semaphore in submit_semaphores(submit) {
                self.start_read(semaphore, record.location);
            }
        }
    }

    fn post_call_record_queue_submit(
        &self,
        queue: vk::Queue,
        submits: &[vk::SubmitInfo<'_>],
        fence: vk::Fence,
        record: &RecordObject,
    ) {
        self.finish_write(queue, record.location);
        self.finish_write(fence, record.location);
        for submit in submits {
            for &semaphore in submit_semaphores(submit) {
                self.finish_read(semaphore, record.location);
            }
        }
    }

    // ── Memory and buffers ──────────────────────────────────

    fn pre_call_record_allocate_memory(
        &self,
        device: vk::Device,
        _allocate_info: &vk::MemoryAllocateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_allocate_memory(
        &self,
        device: vk::Device,
        _allocate_info: &vk::MemoryAllocateInfo<'_>,
        memory: vk::DeviceMemory,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(memory);
    }

    fn pre_call_record_free_memory(&self, device: vk::Device, memory: vk::DeviceMemory, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(memory, record.location);
    }

    fn post_call_record_free_memory(&self, device: vk::Device, memory: vk::DeviceMemory, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(memory, record.location);
        self.destroy_object(memory);
    }

    fn pre_call_record_map_memory(
        &self,
        device: vk::Device,
        memory: vk::DeviceMemory,
        _offset: vk::DeviceSize,
        _size: vk::DeviceSize,
        _flags: vk::MemoryMapFlags,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(memory, record.location);
    }

    fn post_call_record_map_memory(
        &self,
        device: vk::Device,
        memory: vk::DeviceMemory,
        _offset: vk::DeviceSize,
        _size: vk::DeviceSize,
        _flags: vk::MemoryMapFlags,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(memory, record.location);
    }

    fn pre_call_record_unmap_memory(&self, device: vk::Device, memory: vk::DeviceMemory, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(memory, record.location);
    }

    fn post_call_record_unmap_memory(&self, device: vk::Device, memory: vk::DeviceMemory, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(memory, record.location);
    }

    fn pre_call_record_flush_mapped_memory_ranges(
        &self,
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        for range in ranges {
            self.start_read(range.memory, record.location);
        }
    }

    fn post_call_record_flush_mapped_memory_ranges(
        &self,
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        for range in ranges {
            self.finish_read(range.memory, record.location);
        }
    }

    fn pre_call_record_create_buffer(
        &self,
        device: vk::Device,
        _create_info: &vk::BufferCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_buffer(
        &self,
        device: vk::Device,
        _create_info: &vk::BufferCreateInfo<'_>,
        buffer: vk::Buffer,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(buffer);
    }

    fn pre_call_record_destroy_buffer(&self, device: vk::Device, buffer: vk::Buffer, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(buffer, record.location);
    }

    fn post_call_record_destroy_buffer(&self, device: vk::Device, buffer: vk::Buffer, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(buffer, record.location);
        self.destroy_object(buffer);
    }

    fn pre_call_record_bind_buffer_memory(
        &self,
        device: vk::Device,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        _memory_offset: vk::DeviceSize,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(buffer, record.location);
        self.start_read(memory, record.location);
    }

    fn post_call_record_bind_buffer_memory(
        &self,
        device: vk::Device,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        _memory_offset: vk::DeviceSize,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(buffer, record.location);
        self.finish_read(memory, record.location);
    }

    fn pre_call_record_get_buffer_memory_requirements(
        &self,
        device: vk::Device,
        buffer: vk::Buffer,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(buffer, record.location);
    }

    fn post_call_record_get_buffer_memory_requirements(
        &self,
        device: vk::Device,
        buffer: vk::Buffer,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_read(buffer, record.location);
    }

    // ── Images and samplers ─────────────────────────────────

    fn pre_call_record_create_image(&self, device: vk::Device, _create_info: &vk::ImageCreateInfo<'_>, record: &RecordObject) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_image(
        &self,
        device: vk::Device,
        _create_info: &vk::ImageCreateInfo<'_>,
        image: vk::Image,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(image);
    }

    fn pre_call_record_destroy_image(&self, device: vk::Device, image: vk::Image, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(image, record.location);
    }

    fn post_call_record_destroy_image(&self, device: vk::Device, image: vk::Image, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(image, record.location);
        self.destroy_object(image);
    }

    fn pre_call_record_bind_image_memory(
        &self,
        device: vk::Device,
        image: vk::Image,
        memory: vk::DeviceMemory,
        _memory_offset: vk::DeviceSize,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(image, record.location);
        self.start_read(memory, record.location);
    }

    fn post_call_record_bind_image_memory(
        &self,
        device: vk::Device,
        image: vk::Image,
        memory: vk::DeviceMemory,
        _memory_offset: vk::DeviceSize,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(image, record.location);
        self.finish_read(memory, record.location);
    }

    fn pre_call_record_create_image_view(
        &self,
        device: vk::Device,
        create_info: &vk::ImageViewCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(create_info.image, record.location);
    }

    fn post_call_record_create_image_view(
        &self,
        device: vk::Device,
        create_info: &vk::ImageViewCreateInfo<'_>,
        view: vk::ImageView,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_read(create_info.image, record.location);
        self.create_object(view);
    }

    fn pre_call_record_destroy_image_view(&self, device: vk::Device, image_view: vk::ImageView, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(image_view, record.location);
    }

    fn post_call_record_destroy_image_view(&self, device: vk::Device, image_view: vk::ImageView, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(image_view, record.location);
        self.destroy_object(image_view);
    }

    fn pre_call_record_create_sampler(&self, device: vk::Device, _create_info: &vk::SamplerCreateInfo<'_>, record: &RecordObject) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_sampler(
        &self,
        device: vk::Device,
        _create_info: &vk::SamplerCreateInfo<'_>,
        sampler: vk::Sampler,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(sampler);
    }

    fn pre_call_record_destroy_sampler(&self, device: vk::Device, sampler: vk::Sampler, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(sampler, record.location);
    }

    fn post_call_record_destroy_sampler(&self, device: vk::Device, sampler: vk::Sampler, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(sampler, record.location);
        self.destroy_object(sampler);
    }

    // ── Synchronization ─────────────────────────────────────

    fn pre_call_record_create_fence(&self, device: vk::Device, _create_info: &vk::FenceCreateInfo<'_>, record: &RecordObject) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_fence(
        &self,
        device: vk::Device,
        _create_info: &vk::FenceCreateInfo<'_>,
        fence: vk::Fence,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(fence);
    }

    fn pre_call_record_destroy_fence(&self, device: vk::Device, fence: vk::Fence, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(fence, record.location);
    }

    fn post_call_record_destroy_fence(&self, device: vk::Device, fence: vk::Fence, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(fence, record.location);
        self.destroy_object(fence);
    }

    fn pre_call_record_reset_fences(&self, device: vk::Device, fences: &[vk::Fence], record: &RecordObject) {
        self.start_read(device, record.location);
        for &fence in fences {
            self.start_write(fence, record.location);
        }
    }

    fn post_call_record_reset_fences(&self, device: vk::Device, fences: &[vk::Fence], record: &RecordObject) {
        self.finish_read(device, record.location);
        for &fence in fences {
            self.finish_write(fence, record.location);
        }
    }

    fn pre_call_record_get_fence_status(&self, device: vk::Device, fence: vk::Fence, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_read(fence, record.location);
    }

    fn post_call_record_get_fence_status(&self, device: vk::Device, fence: vk::Fence, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_read(fence, record.location);
    }

    fn pre_call_record_wait_for_fences(
        &self,
        device: vk::Device,
        fences: &[vk::Fence],
        _wait_all: bool,
        _timeout: u64,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        for &fence in fences {
            self.start_read(fence, record.location);
        }
    }

    fn post_call_record_wait_for_fences(
        &self,
        device: vk::Device,
        fences: &[vk::Fence],
        _wait_all: bool,
        _timeout: u64,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        for &fence in fences {
            self.finish_read(fence, record.location);
        }
    }

    fn pre_call_record_create_semaphore(
        &self,
        device: vk::Device,
        _create_info: &vk::SemaphoreCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_semaphore(
        &self,
        device: vk::Device,
        _create_info: &vk::SemaphoreCreateInfo<'_>,
        semaphore: vk::Semaphore,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(semaphore);
    }

    fn pre_call_record_destroy_semaphore(&self, device: vk::Device, semaphore: vk::Semaphore, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(semaphore, record.location);
    }

    fn post_call_record_destroy_semaphore(&self, device: vk::Device, semaphore: vk::Semaphore, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(semaphore, record.location);
        self.destroy_object(semaphore);
    }

    // ── Shaders and pipelines ───────────────────────────────

    fn pre_call_record_create_shader_module(
        &self,
        device: vk::Device,
        _create_info: &vk::ShaderModuleCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_shader_module(
        &self,
        device: vk::Device,
        _create_info: &vk::ShaderModuleCreateInfo<'_>,
        shader_module: vk::ShaderModule,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(shader_module);
    }

    fn pre_call_record_destroy_shader_module(
        &self,
        device: vk::Device,
        shader_module: vk::ShaderModule,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(shader_module, record.location);
    }

    fn post_call_record_destroy_shader_module(
        &self,
        device: vk::Device,
        shader_module: vk::ShaderModule,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(shader_module, record.location);
        self.destroy_object(shader_module);
    }

    fn pre_call_record_create_pipeline_cache(
        &self,
        device: vk::Device,
        _create_info: &vk::PipelineCacheCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_pipeline_cache(
        &self,
        device: vk::Device,
        _create_info: &vk::PipelineCacheCreateInfo<'_>,
        pipeline_cache: vk::PipelineCache,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(pipeline_cache);
    }

    fn pre_call_record_destroy_pipeline_cache(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(pipeline_cache, record.location);
    }

    fn post_call_record_destroy_pipeline_cache(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(pipeline_cache, record.location);
        self.destroy_object(pipeline_cache);
    }

    fn pre_call_record_create_pipeline_layout(
        &self,
        device: vk::Device,
        _create_info: &vk::PipelineLayoutCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_pipeline_layout(
        &self,
        device: vk::Device,
        _create_info: &vk::PipelineLayoutCreateInfo<'_>,
        pipeline_layout: vk::PipelineLayout,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(pipeline_layout);
    }

    fn pre_call_record_destroy_pipeline_layout(
        &self,
        device: vk::Device,
        pipeline_layout: vk::PipelineLayout,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(pipeline_layout, record.location);
    }

    fn post_call_record_destroy_pipeline_layout(
        &self,
        device: vk::Device,
        pipeline_layout: vk::PipelineLayout,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(pipeline_layout, record.location);
        self.destroy_object(pipeline_layout);
    }

    fn pre_call_record_create_graphics_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        _create_infos: &[vk::GraphicsPipelineCreateInfo<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(pipeline_cache, record.location);
    }

    fn post_call_record_create_graphics_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        _create_infos: &[vk::GraphicsPipelineCreateInfo<'_>],
        pipelines: &[vk::Pipeline],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(pipeline_cache, record.location);
        for &pipeline in pipelines {
            self.create_object(pipeline);
        }
    }

    fn pre_call_record_create_compute_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        _create_infos: &[vk::ComputePipelineCreateInfo<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(pipeline_cache, record.location);
    }

    fn post_call_record_create_compute_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        _create_infos: &[vk::ComputePipelineCreateInfo<'_>],
        pipelines: &[vk::Pipeline],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(pipeline_cache, record.location);
        for &pipeline in pipelines {
            self.create_object(pipeline);
        }
    }

    fn pre_call_record_destroy_pipeline(&self, device: vk::Device, pipeline: vk::Pipeline, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(pipeline, record.location);
    }

    fn post_call_record_destroy_pipeline(&self, device: vk::Device, pipeline: vk::Pipeline, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(pipeline, record.location);
        self.destroy_object(pipeline);
    }

    // ── Descriptors ─────────────────────────────────────────

    fn pre_call_record_create_descriptor_set_layout(
        &self,
        device: vk::Device,
        _create_info: &vk::DescriptorSetLayoutCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_descriptor_set_layout(
        &self,
        device: vk::Device,
        create_info: &vk::DescriptorSetLayoutCreateInfo<'_>,
        set_layout: vk::DescriptorSetLayout,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        if set_layout == vk::DescriptorSetLayout::null() {
            return;
        }
        self.create_object(set_layout);
        let read_only = Self::layout_is_read_only(create_info);
        self.maps
            .write()
            .dsl_read_only
            .insert(set_layout.as_raw(), read_only);
    }

    fn pre_call_record_destroy_descriptor_set_layout(
        &self,
        device: vk::Device,
        set_layout: vk::DescriptorSetLayout,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(set_layout, record.location);
    }

    fn post_call_record_destroy_descriptor_set_layout(
        &self,
        device: vk::Device,
        set_layout: vk::DescriptorSetLayout,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(set_layout, record.location);
        self.destroy_object(set_layout);
        self.maps.write().dsl_read_only.remove(&set_layout.as_raw());
    }

    fn pre_call_record_create_descriptor_pool(
        &self,
        device: vk::Device,
        _create_info: &vk::DescriptorPoolCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_descriptor_pool(
        &self,
        device: vk::Device,
        _create_info: &vk::DescriptorPoolCreateInfo<'_>,
        descriptor_pool: vk::DescriptorPool,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(descriptor_pool);
    }

    fn pre_call_record_destroy_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(descriptor_pool, record.location);
        for set in self.descriptor_sets_of(descriptor_pool) {
            self.start_write(set, record.location);
        }
    }

    fn post_call_record_destroy_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(descriptor_pool, record.location);
        let sets = self.descriptor_sets_of(descriptor_pool);
        for &set in &sets {
            self.finish_write(set, record.location);
        }
        self.remove_descriptor_sets(descriptor_pool, &sets);
        self.maps
            .write()
            .pool_descriptor_sets
            .remove(&descriptor_pool.as_raw());
        self.destroy_object(descriptor_pool);
    }

    fn pre_call_record_reset_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        _flags: vk::DescriptorPoolResetFlags,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(descriptor_pool, record.location);
        for set in self.descriptor_sets_of(descriptor_pool) {
            self.start_write(set, record.location);
        }
    }

    fn post_call_record_reset_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        _flags: vk::DescriptorPoolResetFlags,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(descriptor_pool, record.location);
        let sets = self.descriptor_sets_of(descriptor_pool);
        for &set in &sets {
            self.finish_write(set, record.location);
        }
        if record.result == vk::Result::SUCCESS {
            self.remove_descriptor_sets(descriptor_pool, &sets);
        }
    }

    fn pre_call_record_allocate_descriptor_sets(
        &self,
        device: vk::Device,
        allocate_info: &vk::DescriptorSetAllocateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(allocate_info.descriptor_pool, record.location);
    }

    fn post_call_record_allocate_descriptor_sets(
        &self,
        device: vk::Device,
        allocate_info: &vk::DescriptorSetAllocateInfo<'_>,
        descriptor_sets: &[vk::DescriptorSet],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(allocate_info.descriptor_pool, record.location);
        let layouts = unsafe {
            slice(allocate_info.p_set_layouts, allocate_info.descriptor_set_count)
        };
        self.add_descriptor_sets(allocate_info.descriptor_pool, layouts, descriptor_sets);
    }

    fn pre_call_record_free_descriptor_sets(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        descriptor_sets: &[vk::DescriptorSet],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(descriptor_pool, record.location);
        for &set in descriptor_sets {
            self.start_write(set, record.location);
        }
    }

    fn post_call_record_free_descriptor_sets(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        descriptor_sets: &[vk::DescriptorSet],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(descriptor_pool, record.location);
        for &set in descriptor_sets {
            self.finish_write(set, record.location);
        }
        if record.result == vk::Result::SUCCESS {
            self.remove_descriptor_sets(descriptor_pool, descriptor_sets);
        }
    }

    fn pre_call_record_update_descriptor_sets(
        &self,
        device: vk::Device,
        writes: &[vk::WriteDescriptorSet<'_>],
        copies: &[vk::CopyDescriptorSet<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        for write in writes {
            self.start_descriptor_set_update(write.dst_set, record.location);
        }
        for copy in copies {
            self.start_read(copy.src_set, record.location);
            self.start_descriptor_set_update(copy.dst_set, record.location);
        }
    }

    fn post_call_record_update_descriptor_sets(
        &self,
        device: vk::Device,
        writes: &[vk::WriteDescriptorSet<'_>],
        copies: &[vk::CopyDescriptorSet<'_>],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        for write in writes {
            self.finish_descriptor_set_update(write.dst_set, record.location);
        }
        for copy in copies {
            self.finish_read(copy.src_set, record.location);
            self.finish_descriptor_set_update(copy.dst_set, record.location);
        }
    }

    // ── Render passes ───────────────────────────────────────

    fn pre_call_record_create_render_pass(
        &self,
        device: vk::Device,
        _create_info: &vk::RenderPassCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_render_pass(
        &self,
        device: vk::Device,
        _create_info: &vk::RenderPassCreateInfo<'_>,
        render_pass: vk::RenderPass,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(render_pass);
    }

    fn pre_call_record_destroy_render_pass(&self, device: vk::Device, render_pass: vk::RenderPass, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(render_pass, record.location);
    }

    fn post_call_record_destroy_render_pass(&self, device: vk::Device, render_pass: vk::RenderPass, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(render_pass, record.location);
        self.destroy_object(render_pass);
    }

    fn pre_call_record_create_framebuffer(
        &self,
        device: vk::Device,
        _create_info: &vk::FramebufferCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_framebuffer(
        &self,
        device: vk::Device,
        _create_info: &vk::FramebufferCreateInfo<'_>,
        framebuffer: vk::Framebuffer,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(framebuffer);
    }

    fn pre_call_record_destroy_framebuffer(&self, device: vk::Device, framebuffer: vk::Framebuffer, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(framebuffer, record.location);
    }

    fn post_call_record_destroy_framebuffer(&self, device: vk::Device, framebuffer: vk::Framebuffer, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(framebuffer, record.location);
        self.destroy_object(framebuffer);
    }

    // ── Command pools and buffers ───────────────────────────

    fn pre_call_record_create_command_pool(
        &self,
        device: vk::Device,
        _create_info: &vk::CommandPoolCreateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_command_pool(
        &self,
        device: vk::Device,
        _create_info: &vk::CommandPoolCreateInfo<'_>,
        command_pool: vk::CommandPool,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        if command_pool != vk::CommandPool::null() {
            self.create_command_pool(command_pool);
        }
    }

    fn pre_call_record_destroy_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(command_pool, record.location);
        self.start_write_pool_contents(command_pool, record.location);
        for cb in self.command_buffers_of(command_pool) {
            self.start_write_command_buffer(cb, record.location, false);
        }
    }

    fn post_call_record_destroy_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(command_pool, record.location);
        self.finish_write_pool_contents(command_pool, record.location);
        let command_buffers = self.command_buffers_of(command_pool);
        for &cb in &command_buffers {
            self.finish_write_command_buffer(cb, record.location, false);
        }
        self.remove_command_buffers(command_pool, &command_buffers);
        self.maps
            .write()
            .pool_command_buffers
            .remove(&command_pool.as_raw());
        self.command_pool_contents.destroy(command_pool.as_raw());
        self.destroy_object(command_pool);
    }

    fn pre_call_record_reset_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        _flags: vk::CommandPoolResetFlags,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(command_pool, record.location);
        self.start_write_pool_contents(command_pool, record.location);
        for cb in self.command_buffers_of(command_pool) {
            self.start_write_command_buffer(cb, record.location, false);
        }
    }

    fn post_call_record_reset_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        _flags: vk::CommandPoolResetFlags,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(command_pool, record.location);
        self.finish_write_pool_contents(command_pool, record.location);
        for cb in self.command_buffers_of(command_pool) {
            self.finish_write_command_buffer(cb, record.location, false);
        }
    }

    fn pre_call_record_trim_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        _flags: vk::CommandPoolTrimFlags,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(command_pool, record.location);
    }

    fn post_call_record_trim_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        _flags: vk::CommandPoolTrimFlags,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(command_pool, record.location);
    }

    fn pre_call_record_allocate_command_buffers(
        &self,
        device: vk::Device,
        allocate_info: &vk::CommandBufferAllocateInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(allocate_info.command_pool, record.location);
    }

    fn post_call_record_allocate_command_buffers(
        &self,
        device: vk::Device,
        allocate_info: &vk::CommandBufferAllocateInfo<'_>,
        command_buffers: &[vk::CommandBuffer],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(allocate_info.command_pool, record.location);
        self.add_command_buffers(allocate_info.command_pool, command_buffers);
    }

    fn pre_call_record_free_command_buffers(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        command_buffers: &[vk::CommandBuffer],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(command_pool, record.location);
        self.start_write_pool_contents(command_pool, record.location);
        for &cb in command_buffers {
            self.start_write_command_buffer(cb, record.location, false);
        }
    }

    fn post_call_record_free_command_buffers(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        command_buffers: &[vk::CommandBuffer],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(command_pool, record.location);
        self.finish_write_pool_contents(command_pool, record.location);
        for &cb in command_buffers {
            self.finish_write_command_buffer(cb, record.location, false);
        }
        self.remove_command_buffers(command_pool, command_buffers);
    }

    fn pre_call_record_begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        _begin_info: &vk::CommandBufferBeginInfo<'_>,
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
    }

    fn post_call_record_begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        _begin_info: &vk::CommandBufferBeginInfo<'_>,
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
    }

    fn pre_call_record_end_command_buffer(&self, command_buffer: vk::CommandBuffer, record: &RecordObject) {
        self.start_write_command_buffer(command_buffer, record.location, true);
    }

    fn post_call_record_end_command_buffer(&self, command_buffer: vk::CommandBuffer, record: &RecordObject) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
    }

    fn pre_call_record_reset_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        _flags: vk::CommandBufferResetFlags,
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
    }

    fn post_call_record_reset_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        _flags: vk::CommandBufferResetFlags,
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
    }

    fn pre_call_record_cmd_bind_pipeline(
        &self,
        command_buffer: vk::CommandBuffer,
        _bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        self.start_read(pipeline, record.location);
    }

    fn post_call_record_cmd_bind_pipeline(
        &self,
        command_buffer: vk::CommandBuffer,
        _bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        self.finish_read(pipeline, record.location);
    }

    fn pre_call_record_cmd_bind_descriptor_sets(
        &self,
        command_buffer: vk::CommandBuffer,
        _bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        _first_set: u32,
        descriptor_sets: &[vk::DescriptorSet],
        _dynamic_offsets: &[u32],
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        self.start_read(layout, record.location);
        for &set in descriptor_sets {
            self.start_read(set, record.location);
        }
    }

    fn post_call_record_cmd_bind_descriptor_sets(
        &self,
        command_buffer: vk::CommandBuffer,
        _bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        _first_set: u32,
        descriptor_sets: &[vk::DescriptorSet],
        _dynamic_offsets: &[u32],
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        self.finish_read(layout, record.location);
        for &set in descriptor_sets {
            self.finish_read(set, record.location);
        }
    }

    fn pre_call_record_cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        _first_binding: u32,
        buffers: &[vk::Buffer],
        _offsets: &[vk::DeviceSize],
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        for &buffer in buffers {
            self.start_read(buffer, record.location);
        }
    }

    fn post_call_record_cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        _first_binding: u32,
        buffers: &[vk::Buffer],
        _offsets: &[vk::DeviceSize],
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        for &buffer in buffers {
            self.finish_read(buffer, record.location);
        }
    }

    fn pre_call_record_cmd_draw(
        &self,
        command_buffer: vk::CommandBuffer,
        _vertex_count: u32,
        _instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
    }

    fn post_call_record_cmd_draw(
        &self,
        command_buffer: vk::CommandBuffer,
        _vertex_count: u32,
        _instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
    }

    fn pre_call_record_cmd_dispatch(
        &self,
        command_buffer: vk::CommandBuffer,
        _group_count_x: u32,
        _group_count_y: u32,
        _group_count_z: u32,
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
    }

    fn post_call_record_cmd_dispatch(
        &self,
        command_buffer: vk::CommandBuffer,
        _group_count_x: u32,
        _group_count_y: u32,
        _group_count_z: u32,
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
    }

    fn pre_call_record_cmd_copy_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_buffer: vk::Buffer,
        _regions: &[vk::BufferCopy],
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        self.start_read(src_buffer, record.location);
        self.start_read(dst_buffer, record.location);
    }

    fn post_call_record_cmd_copy_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_buffer: vk::Buffer,
        _regions: &[vk::BufferCopy],
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        self.finish_read(src_buffer, record.location);
        self.finish_read(dst_buffer, record.location);
    }

    fn pre_call_record_cmd_pipeline_barrier(
        &self,
        command_buffer: vk::CommandBuffer,
        _src_stage_mask: vk::PipelineStageFlags,
        _dst_stage_mask: vk::PipelineStageFlags,
        _dependency_flags: vk::DependencyFlags,
        _memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_memory_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_memory_barriers: &[vk::ImageMemoryBarrier<'_>],
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        for barrier in buffer_memory_barriers {
            self.start_read(barrier.buffer, record.location);
        }
        for barrier in image_memory_barriers {
            self.start_read(barrier.image, record.location);
        }
    }

    fn post_call_record_cmd_pipeline_barrier(
        &self,
        command_buffer: vk::CommandBuffer,
        _src_stage_mask: vk::PipelineStageFlags,
        _dst_stage_mask: vk::PipelineStageFlags,
        _dependency_flags: vk::DependencyFlags,
        _memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_memory_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_memory_barriers: &[vk::ImageMemoryBarrier<'_>],
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        for barrier in buffer_memory_barriers {
            self.finish_read(barrier.buffer, record.location);
        }
        for barrier in image_memory_barriers {
            self.finish_read(barrier.image, record.location);
        }
    }

    fn pre_call_record_cmd_begin_render_pass(
        &self,
        command_buffer: vk::CommandBuffer,
        begin_info: &vk::RenderPassBeginInfo<'_>,
        _contents: vk::SubpassContents,
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        self.start_read(begin_info.render_pass, record.location);
        self.start_read(begin_info.framebuffer, record.location);
    }

    fn post_call_record_cmd_begin_render_pass(
        &self,
        command_buffer: vk::CommandBuffer,
        begin_info: &vk::RenderPassBeginInfo<'_>,
        _contents: vk::SubpassContents,
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        self.finish_read(begin_info.render_pass, record.location);
        self.finish_read(begin_info.framebuffer, record.location);
    }

    fn pre_call_record_cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer, record: &RecordObject) {
        self.start_write_command_buffer(command_buffer, record.location, true);
    }

    fn post_call_record_cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer, record: &RecordObject) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
    }

    fn pre_call_record_cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        _stage_flags: vk::ShaderStageFlags,
        _offset: u32,
        _values: &[u8],
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        self.start_read(layout, record.location);
    }

    fn post_call_record_cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        _stage_flags: vk::ShaderStageFlags,
        _offset: u32,
        _values: &[u8],
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        self.finish_read(layout, record.location);
    }

    fn pre_call_record_cmd_execute_commands(
        &self,
        command_buffer: vk::CommandBuffer,
        command_buffers: &[vk::CommandBuffer],
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        for &secondary in command_buffers {
            self.start_read_command_buffer(secondary, record.location);
        }
    }

    fn post_call_record_cmd_execute_commands(
        &self,
        command_buffer: vk::CommandBuffer,
        command_buffers: &[vk::CommandBuffer],
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        for &secondary in command_buffers {
            self.finish_read_command_buffer(secondary, record.location);
        }
    }

    // ── Swapchains ──────────────────────────────────────────

    fn pre_call_record_create_swapchain_khr(
        &self,
        device: vk::Device,
        create_info: &vk::SwapchainCreateInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(create_info.surface, record.location);
        self.start_write(create_info.old_swapchain, record.location);
    }

    fn post_call_record_create_swapchain_khr(
        &self,
        device: vk::Device,
        create_info: &vk::SwapchainCreateInfoKHR<'_>,
        swapchain: vk::SwapchainKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(create_info.surface, record.location);
        self.finish_write(create_info.old_swapchain, record.location);
        self.create_object(swapchain);
    }

    fn pre_call_record_destroy_swapchain_khr(&self, device: vk::Device, swapchain: vk::SwapchainKHR, record: &RecordObject) {
        self.start_read(device, record.location);
        self.start_write(swapchain, record.location);
    }

    fn post_call_record_destroy_swapchain_khr(&self, device: vk::Device, swapchain: vk::SwapchainKHR, record: &RecordObject) {
        self.finish_read(device, record.location);
        self.finish_write(swapchain, record.location);
        let images = self
            .maps
            .write()
            .swapchain_images
            .remove(&swapchain.as_raw())
            .unwrap_or_default();
        for image in images {
            self.destroy_object(vk::Image::from_raw(image));
        }
        self.destroy_object(swapchain);
    }

    fn pre_call_record_get_swapchain_images_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(swapchain, record.location);
    }

    fn post_call_record_get_swapchain_images_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        images: &[vk::Image],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_read(swapchain, record.location);
        if images.is_empty() {
            return;
        }
        for &image in images {
            self.create_object(image);
        }
        let mut maps = self.maps.write();
        let known = maps.swapchain_images.entry(swapchain.as_raw()).or_default();
        for image in images {
            if !known.contains(&image.as_raw()) {
                known.push(image.as_raw());
            }
        }
    }

    fn pre_call_record_acquire_next_image_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        _timeout: u64,
        semaphore: vk::Semaphore,
        fence: vk::Fence,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(swapchain, record.location);
        self.start_write(semaphore, record.location);
        self.start_write(fence, record.location);
    }

    fn post_call_record_acquire_next_image_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        _timeout: u64,
        semaphore: vk::Semaphore,
        fence: vk::Fence,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(swapchain, record.location);
        self.finish_write(semaphore, record.location);
        self.finish_write(fence, record.location);
    }

    fn pre_call_record_queue_present_khr(
        &self,
        queue: vk::Queue,
        present_info: &vk::PresentInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.start_write(queue, record.location);
        let (waits, swapchains) = present_objects(present_info);
        for &semaphore in waits {
            self.start_read(semaphore, record.location);
        }
        for &swapchain in swapchains {
            self.start_write(swapchain, record.location);
        }
    }

    fn post_call_record_queue_present_khr(
        &self,
        queue: vk::Queue,
        present_info: &vk::PresentInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.finish_write(queue, record.location);
        let (waits, swapchains) = present_objects(present_info);
        for &semaphore in waits {
            self.finish_read(semaphore, record.location);
        }
        for &swapchain in swapchains {
            self.finish_write(swapchain, record.location);
        }
    }

    // Other threads may keep presenting to the swapchain while one waits on
    // it, so only the device is claimed.
    fn pre_call_record_wait_for_present_khr(
        &self,
        device: vk::Device,
        _swapchain: vk::SwapchainKHR,
        _present_id: u64,
        _timeout: u64,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_wait_for_present_khr(
        &self,
        device: vk::Device,
        _swapchain: vk::SwapchainKHR,
        _present_id: u64,
        _timeout: u64,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
    }

    // ── Deferred operations and ray tracing ─────────────────

    fn pre_call_record_create_deferred_operation_khr(&self, device: vk::Device, record: &RecordObject) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_deferred_operation_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(operation);
    }

    fn pre_call_record_destroy_deferred_operation_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(operation, record.location);
    }

    fn post_call_record_destroy_deferred_operation_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(operation, record.location);
        self.destroy_object(operation);
    }

    fn pre_call_record_get_deferred_operation_max_concurrency_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(operation, record.location);
    }

    fn post_call_record_get_deferred_operation_max_concurrency_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_read(operation, record.location);
    }

    fn pre_call_record_deferred_operation_join_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(operation, record.location);
    }

    fn post_call_record_deferred_operation_join_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_read(operation, record.location);
    }

    fn pre_call_record_get_deferred_operation_result_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(operation, record.location);
    }

    fn post_call_record_get_deferred_operation_result_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_read(operation, record.location);
    }

    fn pre_call_record_create_acceleration_structure_khr(
        &self,
        device: vk::Device,
        _create_info: &vk::AccelerationStructureCreateInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_create_acceleration_structure_khr(
        &self,
        device: vk::Device,
        _create_info: &vk::AccelerationStructureCreateInfoKHR<'_>,
        acceleration_structure: vk::AccelerationStructureKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.create_object(acceleration_structure);
    }

    fn pre_call_record_destroy_acceleration_structure_khr(
        &self,
        device: vk::Device,
        acceleration_structure: vk::AccelerationStructureKHR,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_write(acceleration_structure, record.location);
    }

    fn post_call_record_destroy_acceleration_structure_khr(
        &self,
        device: vk::Device,
        acceleration_structure: vk::AccelerationStructureKHR,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_write(acceleration_structure, record.location);
        self.destroy_object(acceleration_structure);
    }

    fn pre_call_record_build_acceleration_structures_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _infos: &[vk::AccelerationStructureBuildGeometryInfoKHR<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(deferred_operation, record.location);
    }

    fn post_call_record_build_acceleration_structures_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _infos: &[vk::AccelerationStructureBuildGeometryInfoKHR<'_>],
        record: &RecordObject,
    ) {
        let location = record.location;
        let release = move |ts: &ThreadSafety| {
            ts.finish_read(device, location);
            ts.finish_read(deferred_operation, location);
        };
        if let Some((ledger, this)) = self.deferral(deferred_operation, record) {
            ledger.on_completion(
                deferred_operation.as_raw(),
                Box::new(move || release(this.as_ref())),
            );
        } else {
            release(self);
        }
    }

    fn pre_call_record_create_ray_tracing_pipelines_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        pipeline_cache: vk::PipelineCache,
        _create_infos: &[vk::RayTracingPipelineCreateInfoKHR<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(deferred_operation, record.location);
        self.start_write(pipeline_cache, record.location);
    }

    fn post_call_record_create_ray_tracing_pipelines_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        pipeline_cache: vk::PipelineCache,
        _create_infos: &[vk::RayTracingPipelineCreateInfoKHR<'_>],
        pipelines: &[vk::Pipeline],
        record: &RecordObject,
    ) {
        let location = record.location;
        let release = move |ts: &ThreadSafety| {
            ts.finish_read(device, location);
            ts.finish_read(deferred_operation, location);
            ts.finish_write(pipeline_cache, location);
        };
        if let Some((ledger, this)) = self.deferral(deferred_operation, record) {
            let key = deferred_operation.as_raw();
            let creator = this.clone();
            ledger.on_completion(key, Box::new(move || release(this.as_ref())));
            ledger.on_success(
                key,
                Box::new(move |created: &[u64]| {
                    for &pipeline in created {
                        creator.create_object(vk::Pipeline::from_raw(pipeline));
                    }
                }),
            );
        } else {
            release(self);
            for &pipeline in pipelines {
                self.create_object(pipeline);
            }
        }
    }

    // ── Calls added for full coverage ───────────────────────

    claim_hooks! {
        pre_call_record_get_physical_device_surface_support_khr,
            post_call_record_get_physical_device_surface_support_khr(
            physical_device: vk::PhysicalDevice,
            queue_family_index: u32,
            surface: vk::SurfaceKHR
        ) { read(surface) };
        pre_call_record_get_physical_device_surface_capabilities_khr,
            post_call_record_get_physical_device_surface_capabilities_khr(
            physical_device: vk::PhysicalDevice,
            surface: vk::SurfaceKHR
        ) { read(surface) };
        pre_call_record_get_physical_device_surface_formats_khr,
            post_call_record_get_physical_device_surface_formats_khr(
            physical_device: vk::PhysicalDevice,
            surface: vk::SurfaceKHR
        ) { read(surface) };
        pre_call_record_get_physical_device_surface_present_modes_khr,
            post_call_record_get_physical_device_surface_present_modes_khr(
            physical_device: vk::PhysicalDevice,
            surface: vk::SurfaceKHR
        ) { read(surface) };
        pre_call_record_get_physical_device_present_rectangles_khr,
            post_call_record_get_physical_device_present_rectangles_khr(
            physical_device: vk::PhysicalDevice,
            surface: vk::SurfaceKHR
        ) { read(surface) };

        pre_call_record_get_device_memory_commitment, post_call_record_get_device_memory_commitment(
            device: vk::Device,
            memory: vk::DeviceMemory
        ) { read(device), read(memory) };
        pre_call_record_get_buffer_memory_requirements2, post_call_record_get_buffer_memory_requirements2(
            device: vk::Device,
            info: &vk::BufferMemoryRequirementsInfo2<'_>
        ) { read(device), read(info.buffer) };

        pre_call_record_get_image_memory_requirements, post_call_record_get_image_memory_requirements(
            device: vk::Device,
            image: vk::Image
        ) { read(device), read(image) };
        pre_call_record_get_image_sparse_memory_requirements,
            post_call_record_get_image_sparse_memory_requirements(device: vk::Device, image: vk::Image)
            { read(device), read(image) };
        pre_call_record_get_image_subresource_layout, post_call_record_get_image_subresource_layout(
            device: vk::Device,
            image: vk::Image
        ) { read(device), read(image) };
        pre_call_record_get_image_memory_requirements2, post_call_record_get_image_memory_requirements2(
            device: vk::Device,
            info: &vk::ImageMemoryRequirementsInfo2<'_>
        ) { read(device), read(info.image) };
        pre_call_record_get_image_sparse_memory_requirements2,
            post_call_record_get_image_sparse_memory_requirements2(
            device: vk::Device,
            info: &vk::ImageSparseMemoryRequirementsInfo2<'_>
        ) { read(device), read(info.image) };

        pre_call_record_get_event_status, post_call_record_get_event_status(
            device: vk::Device,
            event: vk::Event
        ) { read(device), read(event) };
        pre_call_record_set_event, post_call_record_set_event(device: vk::Device, event: vk::Event)
            { read(device), write(event) };
        pre_call_record_reset_event, post_call_record_reset_event(device: vk::Device, event: vk::Event)
            { read(device), write(event) };

        pre_call_record_get_query_pool_results, post_call_record_get_query_pool_results(
            device: vk::Device,
            query_pool: vk::QueryPool,
            first_query: u32,
            query_count: u32,
            flags: vk::QueryResultFlags
        ) { read(device), read(query_pool) };
        pre_call_record_cmd_begin_query, post_call_record_cmd_begin_query(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            query: u32,
            flags: vk::QueryControlFlags
        ) { record(command_buffer), read(query_pool) };
        pre_call_record_cmd_end_query, post_call_record_cmd_end_query(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            query: u32
        ) { record(command_buffer), read(query_pool) };
        pre_call_record_cmd_reset_query_pool, post_call_record_cmd_reset_query_pool(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            first_query: u32,
            query_count: u32
        ) { record(command_buffer), read(query_pool) };
        pre_call_record_cmd_write_timestamp, post_call_record_cmd_write_timestamp(
            command_buffer: vk::CommandBuffer,
            pipeline_stage: vk::PipelineStageFlags,
            query_pool: vk::QueryPool,
            query: u32
        ) { record(command_buffer), read(query_pool) };
        pre_call_record_cmd_copy_query_pool_results, post_call_record_cmd_copy_query_pool_results(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            first_query: u32,
            query_count: u32,
            dst_buffer: vk::Buffer,
            dst_offset: vk::DeviceSize,
            stride: vk::DeviceSize,
            flags: vk::QueryResultFlags
        ) { record(command_buffer), read(query_pool), read(dst_buffer) };

        pre_call_record_get_pipeline_cache_data, post_call_record_get_pipeline_cache_data(
            device: vk::Device,
            pipeline_cache: vk::PipelineCache
        ) { read(device), read(pipeline_cache) };
        pre_call_record_merge_pipeline_caches, post_call_record_merge_pipeline_caches(
            device: vk::Device,
            dst_cache: vk::PipelineCache,
            src_caches: &[vk::PipelineCache]
        ) { read(device), write(dst_cache), read_all(src_caches) };

        pre_call_record_get_descriptor_set_layout_support,
            post_call_record_get_descriptor_set_layout_support(
            device: vk::Device,
            create_info: &vk::DescriptorSetLayoutCreateInfo<'_>
        ) { read(device) };

        pre_call_record_get_render_area_granularity, post_call_record_get_render_area_granularity(
            device: vk::Device,
            render_pass: vk::RenderPass
        ) { read(device), read(render_pass) };

        pre_call_record_cmd_bind_index_buffer, post_call_record_cmd_bind_index_buffer(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize,
            index_type: vk::IndexType
        ) { record(command_buffer), read(buffer) };
        pre_call_record_cmd_draw_indexed, post_call_record_cmd_draw_indexed(
            command_buffer: vk::CommandBuffer,
            index_count: u32,
            instance_count: u32,
            first_index: u32,
            vertex_offset: i32,
            first_instance: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_draw_indirect, post_call_record_cmd_draw_indirect(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize,
            draw_count: u32,
            stride: u32
        ) { record(command_buffer), read(buffer) };
        pre_call_record_cmd_draw_indexed_indirect, post_call_record_cmd_draw_indexed_indirect(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize,
            draw_count: u32,
            stride: u32
        ) { record(command_buffer), read(buffer) };
        pre_call_record_cmd_dispatch_indirect, post_call_record_cmd_dispatch_indirect(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize
        ) { record(command_buffer), read(buffer) };
        pre_call_record_cmd_dispatch_base, post_call_record_cmd_dispatch_base(
            command_buffer: vk::CommandBuffer,
            base_group_x: u32,
            base_group_y: u32,
            base_group_z: u32,
            group_count_x: u32,
            group_count_y: u32,
            group_count_z: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_device_mask, post_call_record_cmd_set_device_mask(
            command_buffer: vk::CommandBuffer,
            device_mask: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_copy_image, post_call_record_cmd_copy_image(
            command_buffer: vk::CommandBuffer,
            src_image: vk::Image,
            src_image_layout: vk::ImageLayout,
            dst_image: vk::Image,
            dst_image_layout: vk::ImageLayout
        ) { record(command_buffer), read(src_image), read(dst_image) };
        pre_call_record_cmd_blit_image, post_call_record_cmd_blit_image(
            command_buffer: vk::CommandBuffer,
            src_image: vk::Image,
            src_image_layout: vk::ImageLayout,
            dst_image: vk::Image,
            dst_image_layout: vk::ImageLayout,
            filter: vk::Filter
        ) { record(command_buffer), read(src_image), read(dst_image) };
        pre_call_record_cmd_copy_buffer_to_image, post_call_record_cmd_copy_buffer_to_image(
            command_buffer: vk::CommandBuffer,
            src_buffer: vk::Buffer,
            dst_image: vk::Image,
            dst_image_layout: vk::ImageLayout
        ) { record(command_buffer), read(src_buffer), read(dst_image) };
        pre_call_record_cmd_copy_image_to_buffer, post_call_record_cmd_copy_image_to_buffer(
            command_buffer: vk::CommandBuffer,
            src_image: vk::Image,
            src_image_layout: vk::ImageLayout,
            dst_buffer: vk::Buffer
        ) { record(command_buffer), read(src_image), read(dst_buffer) };
        pre_call_record_cmd_update_buffer, post_call_record_cmd_update_buffer(
            command_buffer: vk::CommandBuffer,
            dst_buffer: vk::Buffer,
            dst_offset: vk::DeviceSize,
            data_size: vk::DeviceSize
        ) { record(command_buffer), read(dst_buffer) };
        pre_call_record_cmd_fill_buffer, post_call_record_cmd_fill_buffer(
            command_buffer: vk::CommandBuffer,
            dst_buffer: vk::Buffer,
            dst_offset: vk::DeviceSize,
            size: vk::DeviceSize,
            data: u32
        ) { record(command_buffer), read(dst_buffer) };
        pre_call_record_cmd_clear_color_image, post_call_record_cmd_clear_color_image(
            command_buffer: vk::CommandBuffer,
            image: vk::Image,
            image_layout: vk::ImageLayout
        ) { record(command_buffer), read(image) };
        pre_call_record_cmd_clear_depth_stencil_image, post_call_record_cmd_clear_depth_stencil_image(
            command_buffer: vk::CommandBuffer,
            image: vk::Image,
            image_layout: vk::ImageLayout
        ) { record(command_buffer), read(image) };
        pre_call_record_cmd_clear_attachments, post_call_record_cmd_clear_attachments(
            command_buffer: vk::CommandBuffer,
            attachment_count: u32,
            rect_count: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_resolve_image, post_call_record_cmd_resolve_image(
            command_buffer: vk::CommandBuffer,
            src_image: vk::Image,
            src_image_layout: vk::ImageLayout,
            dst_image: vk::Image,
            dst_image_layout: vk::ImageLayout
        ) { record(command_buffer), read(src_image), read(dst_image) };
        pre_call_record_cmd_set_viewport, post_call_record_cmd_set_viewport(
            command_buffer: vk::CommandBuffer,
            first_viewport: u32,
            viewport_count: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_scissor, post_call_record_cmd_set_scissor(
            command_buffer: vk::CommandBuffer,
            first_scissor: u32,
            scissor_count: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_line_width, post_call_record_cmd_set_line_width(
            command_buffer: vk::CommandBuffer,
            line_width: f32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_depth_bias, post_call_record_cmd_set_depth_bias(
            command_buffer: vk::CommandBuffer,
            depth_bias_constant_factor: f32,
            depth_bias_clamp: f32,
            depth_bias_slope_factor: f32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_blend_constants, post_call_record_cmd_set_blend_constants(
            command_buffer: vk::CommandBuffer
        ) { record(command_buffer) };
        pre_call_record_cmd_set_depth_bounds, post_call_record_cmd_set_depth_bounds(
            command_buffer: vk::CommandBuffer,
            min_depth_bounds: f32,
            max_depth_bounds: f32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_stencil_compare_mask, post_call_record_cmd_set_stencil_compare_mask(
            command_buffer: vk::CommandBuffer,
            face_mask: vk::StencilFaceFlags,
            compare_mask: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_stencil_write_mask, post_call_record_cmd_set_stencil_write_mask(
            command_buffer: vk::CommandBuffer,
            face_mask: vk::StencilFaceFlags,
            write_mask: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_set_stencil_reference, post_call_record_cmd_set_stencil_reference(
            command_buffer: vk::CommandBuffer,
            face_mask: vk::StencilFaceFlags,
            reference: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_next_subpass, post_call_record_cmd_next_subpass(
            command_buffer: vk::CommandBuffer,
            contents: vk::SubpassContents
        ) { record(command_buffer) };
        pre_call_record_cmd_set_event, post_call_record_cmd_set_event(
            command_buffer: vk::CommandBuffer,
            event: vk::Event,
            stage_mask: vk::PipelineStageFlags
        ) { record(command_buffer), read(event) };
        pre_call_record_cmd_reset_event, post_call_record_cmd_reset_event(
            command_buffer: vk::CommandBuffer,
            event: vk::Event,
            stage_mask: vk::PipelineStageFlags
        ) { record(command_buffer), read(event) };

        pre_call_record_acquire_next_image2_khr, post_call_record_acquire_next_image2_khr(
            device: vk::Device,
            acquire_info: &vk::AcquireNextImageInfoKHR<'_>
        ) {
            read(device),
            write(acquire_info.swapchain),
            write(acquire_info.semaphore),
            write(acquire_info.fence)
        };
        pre_call_record_get_device_group_surface_present_modes_khr,
            post_call_record_get_device_group_surface_present_modes_khr(
            device: vk::Device,
            surface: vk::SurfaceKHR
        ) { read(device), write(surface) };

        pre_call_record_cmd_build_acceleration_structures_khr,
            post_call_record_cmd_build_acceleration_structures_khr(
            command_buffer: vk::CommandBuffer,
            infos: &[vk::AccelerationStructureBuildGeometryInfoKHR<'_>]
        ) { record(command_buffer) };
        pre_call_record_cmd_build_acceleration_structures_indirect_khr,
            post_call_record_cmd_build_acceleration_structures_indirect_khr(
            command_buffer: vk::CommandBuffer,
            infos: &[vk::AccelerationStructureBuildGeometryInfoKHR<'_>]
        ) { record(command_buffer) };
        pre_call_record_write_acceleration_structures_properties_khr,
            post_call_record_write_acceleration_structures_properties_khr(
            device: vk::Device,
            acceleration_structures: &[vk::AccelerationStructureKHR],
            query_type: vk::QueryType
        ) { read(device), read_all(acceleration_structures) };
        pre_call_record_cmd_copy_acceleration_structure_khr,
            post_call_record_cmd_copy_acceleration_structure_khr(
            command_buffer: vk::CommandBuffer,
            info: &vk::CopyAccelerationStructureInfoKHR<'_>
        ) { record(command_buffer), read(info.src), read(info.dst) };
        pre_call_record_cmd_copy_acceleration_structure_to_memory_khr,
            post_call_record_cmd_copy_acceleration_structure_to_memory_khr(
            command_buffer: vk::CommandBuffer,
            info: &vk::CopyAccelerationStructureToMemoryInfoKHR<'_>
        ) { record(command_buffer), read(info.src) };
        pre_call_record_cmd_copy_memory_to_acceleration_structure_khr,
            post_call_record_cmd_copy_memory_to_acceleration_structure_khr(
            command_buffer: vk::CommandBuffer,
            info: &vk::CopyMemoryToAccelerationStructureInfoKHR<'_>
        ) { record(command_buffer), read(info.dst) };
        pre_call_record_get_acceleration_structure_device_address_khr,
            post_call_record_get_acceleration_structure_device_address_khr(
            device: vk::Device,
            info: &vk::AccelerationStructureDeviceAddressInfoKHR<'_>
        ) { read(device), read(info.acceleration_structure) };
        pre_call_record_cmd_write_acceleration_structures_properties_khr,
            post_call_record_cmd_write_acceleration_structures_properties_khr(
            command_buffer: vk::CommandBuffer,
            acceleration_structures: &[vk::AccelerationStructureKHR],
            query_type: vk::QueryType,
            query_pool: vk::QueryPool,
            first_query: u32
        ) { record(command_buffer), read_all(acceleration_structures), read(query_pool) };
        pre_call_record_get_acceleration_structure_build_sizes_khr,
            post_call_record_get_acceleration_structure_build_sizes_khr(
            device: vk::Device,
            build_type: vk::AccelerationStructureBuildTypeKHR,
            build_info: &vk::AccelerationStructureBuildGeometryInfoKHR<'_>
        ) { read(device) };
        pre_call_record_cmd_trace_rays_khr, post_call_record_cmd_trace_rays_khr(
            command_buffer: vk::CommandBuffer,
            width: u32,
            height: u32,
            depth: u32
        ) { record(command_buffer) };
        pre_call_record_cmd_trace_rays_indirect_khr, post_call_record_cmd_trace_rays_indirect_khr(
            command_buffer: vk::CommandBuffer,
            indirect_device_address: vk::DeviceAddress
        ) { record(command_buffer) };
        pre_call_record_get_ray_tracing_shader_group_handles_khr,
            post_call_record_get_ray_tracing_shader_group_handles_khr(
            device: vk::Device,
            pipeline: vk::Pipeline,
            first_group: u32,
            group_count: u32
        ) { read(device), read(pipeline) };
        pre_call_record_get_ray_tracing_capture_replay_shader_group_handles_khr,
            post_call_record_get_ray_tracing_capture_replay_shader_group_handles_khr(
            device: vk::Device,
            pipeline: vk::Pipeline,
            first_group: u32,
            group_count: u32
        ) { read(device), read(pipeline) };
        pre_call_record_get_ray_tracing_shader_group_stack_size_khr,
            post_call_record_get_ray_tracing_shader_group_stack_size_khr(
            device: vk::Device,
            pipeline: vk::Pipeline,
            group: u32,
            group_shader: vk::ShaderGroupShaderKHR
        ) { read(device), read(pipeline) };
        pre_call_record_cmd_set_ray_tracing_pipeline_stack_size_khr,
            post_call_record_cmd_set_ray_tracing_pipeline_stack_size_khr(
            command_buffer: vk::CommandBuffer,
            pipeline_stack_size: u32
        ) { record(command_buffer) };
    }

    object_lifetime_hooks! {
        pre_call_record_create_buffer_view, post_call_record_create_buffer_view(vk::BufferViewCreateInfo<'_>)
            => buffer_view: vk::BufferView;
        pre_call_record_destroy_buffer_view, post_call_record_destroy_buffer_view;

        pre_call_record_create_sampler_ycbcr_conversion,
            post_call_record_create_sampler_ycbcr_conversion(vk::SamplerYcbcrConversionCreateInfo<'_>)
            => conversion: vk::SamplerYcbcrConversion;
        pre_call_record_destroy_sampler_ycbcr_conversion, post_call_record_destroy_sampler_ycbcr_conversion;

        pre_call_record_create_event, post_call_record_create_event(vk::EventCreateInfo<'_>)
            => event: vk::Event;
        pre_call_record_destroy_event, post_call_record_destroy_event;

        pre_call_record_create_query_pool, post_call_record_create_query_pool(vk::QueryPoolCreateInfo<'_>)
            => query_pool: vk::QueryPool;
        pre_call_record_destroy_query_pool, post_call_record_destroy_query_pool;

        pre_call_record_create_descriptor_update_template,
            post_call_record_create_descriptor_update_template(vk::DescriptorUpdateTemplateCreateInfo<'_>)
            => update_template: vk::DescriptorUpdateTemplate;
        pre_call_record_destroy_descriptor_update_template,
            post_call_record_destroy_descriptor_update_template;
    }

    fn pre_call_record_get_device_queue2(
        &self,
        device: vk::Device,
        _queue_info: &vk::DeviceQueueInfo2<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
    }

    fn post_call_record_get_device_queue2(
        &self,
        device: vk::Device,
        _queue_info: &vk::DeviceQueueInfo2<'_>,
        queue: vk::Queue,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        if queue != vk::Queue::null() {
            self.create_object(queue);
            self.maps.write().device_queues.insert(queue.as_raw());
        }
    }

    fn pre_call_record_queue_bind_sparse(
        &self,
        queue: vk::Queue,
        bind_infos: &[vk::BindSparseInfo<'_>],
        fence: vk::Fence,
        record: &RecordObject,
    ) {
        self.start_write(queue, record.location);
        self.start_write(fence, record.location);
        for info in bind_infos {
            let (semaphores, buffers, images) = sparse_bind_objects(info);
            for semaphore in semaphores {
                self.start_read(semaphore, record.location);
            }
            for buffer in buffers {
                self.start_write(buffer, record.location);
            }
            for image in images {
                self.start_write(image, record.location);
            }
        }
    }

    fn post_call_record_queue_bind_sparse(
        &self,
        queue: vk::Queue,
        bind_infos: &[vk::BindSparseInfo<'_>],
        fence: vk::Fence,
        record: &RecordObject,
    ) {
        self.finish_write(queue, record.location);
        self.finish_write(fence, record.location);
        for info in bind_infos {
            let (semaphores, buffers, images) = sparse_bind_objects(info);
            for semaphore in semaphores {
                self.finish_read(semaphore, record.location);
            }
            for buffer in buffers {
                self.finish_write(buffer, record.location);
            }
            for image in images {
                self.finish_write(image, record.location);
            }
        }
    }

    fn pre_call_record_invalidate_mapped_memory_ranges(
        &self,
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        for range in ranges {
            self.start_read(range.memory, record.location);
        }
    }

    fn post_call_record_invalidate_mapped_memory_ranges(
        &self,
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        for range in ranges {
            self.finish_read(range.memory, record.location);
        }
    }

    fn pre_call_record_bind_buffer_memory2(
        &self,
        device: vk::Device,
        bind_infos: &[vk::BindBufferMemoryInfo<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        for info in bind_infos {
            self.start_write(info.buffer, record.location);
            self.start_read(info.memory, record.location);
        }
    }

    fn post_call_record_bind_buffer_memory2(
        &self,
        device: vk::Device,
        bind_infos: &[vk::BindBufferMemoryInfo<'_>],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        for info in bind_infos {
            self.finish_write(info.buffer, record.location);
            self.finish_read(info.memory, record.location);
        }
    }

    fn pre_call_record_bind_image_memory2(
        &self,
        device: vk::Device,
        bind_infos: &[vk::BindImageMemoryInfo<'_>],
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        for info in bind_infos {
            self.start_write(info.image, record.location);
            self.start_read(info.memory, record.location);
        }
    }

    fn post_call_record_bind_image_memory2(
        &self,
        device: vk::Device,
        bind_infos: &[vk::BindImageMemoryInfo<'_>],
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        for info in bind_infos {
            self.finish_write(info.image, record.location);
            self.finish_read(info.memory, record.location);
        }
    }

    fn pre_call_record_update_descriptor_set_with_template(
        &self,
        device: vk::Device,
        descriptor_set: vk::DescriptorSet,
        update_template: vk::DescriptorUpdateTemplate,
        _data: *const c_void,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(update_template, record.location);
        self.start_descriptor_set_update(descriptor_set, record.location);
    }

    fn post_call_record_update_descriptor_set_with_template(
        &self,
        device: vk::Device,
        descriptor_set: vk::DescriptorSet,
        update_template: vk::DescriptorUpdateTemplate,
        _data: *const c_void,
        record: &RecordObject,
    ) {
        self.finish_read(device, record.location);
        self.finish_read(update_template, record.location);
        self.finish_descriptor_set_update(descriptor_set, record.location);
    }

    #[allow(clippy::too_many_arguments)]
    fn pre_call_record_cmd_wait_events(
        &self,
        command_buffer: vk::CommandBuffer,
        events: &[vk::Event],
        _src_stage_mask: vk::PipelineStageFlags,
        _dst_stage_mask: vk::PipelineStageFlags,
        _memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_memory_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_memory_barriers: &[vk::ImageMemoryBarrier<'_>],
        record: &RecordObject,
    ) {
        self.start_write_command_buffer(command_buffer, record.location, true);
        for &event in events {
            self.start_read(event, record.location);
        }
        for barrier in buffer_memory_barriers {
            self.start_read(barrier.buffer, record.location);
        }
        for barrier in image_memory_barriers {
            self.start_read(barrier.image, record.location);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn post_call_record_cmd_wait_events(
        &self,
        command_buffer: vk::CommandBuffer,
        events: &[vk::Event],
        _src_stage_mask: vk::PipelineStageFlags,
        _dst_stage_mask: vk::PipelineStageFlags,
        _memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_memory_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_memory_barriers: &[vk::ImageMemoryBarrier<'_>],
        record: &RecordObject,
    ) {
        self.finish_write_command_buffer(command_buffer, record.location, true);
        for &event in events {
            self.finish_read(event, record.location);
        }
        for barrier in buffer_memory_barriers {
            self.finish_read(barrier.buffer, record.location);
        }
        for barrier in image_memory_barriers {
            self.finish_read(barrier.image, record.location);
        }
    }

    fn pre_call_record_copy_acceleration_structure_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _info: &vk::CopyAccelerationStructureInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(deferred_operation, record.location);
    }

    fn post_call_record_copy_acceleration_structure_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _info: &vk::CopyAccelerationStructureInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.finish_deferrable_read(device, deferred_operation, record);
    }

    fn pre_call_record_copy_acceleration_structure_to_memory_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _info: &vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(deferred_operation, record.location);
    }

    fn post_call_record_copy_acceleration_structure_to_memory_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _info: &vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.finish_deferrable_read(device, deferred_operation, record);
    }

    fn pre_call_record_copy_memory_to_acceleration_structure_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _info: &vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.start_read(device, record.location);
        self.start_read(deferred_operation, record.location);
    }

    fn post_call_record_copy_memory_to_acceleration_structure_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        _info: &vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
        record: &RecordObject,
    ) {
        self.finish_deferrable_read(device, deferred_operation, record);
    }
}

impl ThreadSafety {
    /// Release the device and operation read claims of a deferrable call,
    /// now or once the operation completes.
    fn finish_deferrable_read(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) {
        let location = record.location;
        let release = move |ts: &ThreadSafety| {
            ts.finish_read(device, location);
            ts.finish_read(deferred_operation, location);
        };
        if let Some((ledger, this)) = self.deferral(deferred_operation, record) {
            ledger.on_completion(
                deferred_operation.as_raw(),
                Box::new(move || release(this.as_ref())),
            );
        } else {
            release(self);
        }
    }

    /// The ledger and an owning handle to `self`, when the call was deferred
    /// onto a real operation and its effects must wait for completion.
    fn deferral(
        &self,
        deferred_operation: vk::DeferredOperationKHR,
        record: &RecordObject,
    ) -> Option<(std::sync::Arc<vkl_core::DeferredLedger>, std::sync::Arc<ThreadSafety>)> {
        if !record.deferred() || deferred_operation == vk::DeferredOperationKHR::null() {
            return None;
        }
        let ledger = self.deferred.clone()?;
        let this = self.arc()?;
        Some((ledger, this))
    }
}

fn submit_semaphores<'a>(submit: &'a vk::SubmitInfo<'_>) -> impl Iterator<Item = &'a vk::Semaphore> {
    let waits = unsafe { slice(submit.p_wait_semaphores, submit.wait_semaphore_count) };
    let signals = unsafe { slice(submit.p_signal_semaphores, submit.signal_semaphore_count) };
    waits.iter().chain(signals.iter())
}

fn present_objects<'a>(present_info: &'a vk::PresentInfoKHR<'_>) -> (&'a [vk::Semaphore], &'a [vk::SwapchainKHR]) {
    unsafe {
        (
            slice(present_info.p_wait_semaphores, present_info.wait_semaphore_count),
            slice(present_info.p_swapchains, present_info.swapchain_count),
        )
    }
}

/// Semaphores, buffers and images a sparse bind touches.
fn sparse_bind_objects(
    info: &vk::BindSparseInfo<'_>,
) -> (Vec<vk::Semaphore>, Vec<vk::Buffer>, Vec<vk::Image>) {
    unsafe {
        let semaphores = slice(info.p_wait_semaphores, info.wait_semaphore_count)
            .iter()
            .chain(slice(info.p_signal_semaphores, info.signal_semaphore_count))
            .copied()
            .collect();
        let buffers = slice(info.p_buffer_binds, info.buffer_bind_count)
            .iter()
            .map(|bind| bind.buffer)
            .collect();
        let images = slice(info.p_image_opaque_binds, info.image_opaque_bind_count)
            .iter()
            .map(|bind| bind.image)
            .chain(
                slice(info.p_image_binds, info.image_bind_count)
                    .iter()
                    .map(|bind| bind.image),
            )
            .collect();
        (semaphores, buffers, images)
    }
}
