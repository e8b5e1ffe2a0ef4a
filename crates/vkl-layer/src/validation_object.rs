//! The hook surface shared by every validator in the chain.
//!
//! One `pre_call_record_*` / `post_call_record_*` pair exists per intercepted
//! entry point. Hooks see the application's view of the call: wrapped
//! handles, original structures. Post hooks of create and allocate calls also
//! receive the handles handed back to the application, which are null (or an
//! empty slice) when the driver call failed or was deferred.

use std::ffi::c_void;

use ash::vk;
use vkl_core::RecordObject;

use crate::chain::ValidatorKind;

macro_rules! validation_hooks {
    ($(
        $pre:ident, $post:ident ( $($arg:ident : $ty:ty),* ) $(=> $out:ident : $out_ty:ty)? ;
    )*) => {
        /// A validator participating in the chain. Every hook defaults to a
        /// no-op, so implementors only override the calls they care about.
        pub trait ValidationObject: Send + Sync {
            fn kind(&self) -> ValidatorKind;

            $(
                #[allow(unused_variables)]
                fn $pre(&self, $($arg: $ty,)* record: &RecordObject) {}

                #[allow(unused_variables)]
                fn $post(&self, $($arg: $ty,)* $($out: $out_ty,)? record: &RecordObject) {}
            )*
        }
    };
}

validation_hooks! {
    // ── Instance ────────────────────────────────────────────
    pre_call_record_create_instance, post_call_record_create_instance()
        => instance: vk::Instance;
    pre_call_record_destroy_instance, post_call_record_destroy_instance(instance: vk::Instance);
    pre_call_record_enumerate_physical_devices, post_call_record_enumerate_physical_devices(
        instance: vk::Instance
    ) => physical_devices: &[vk::PhysicalDevice];
    pre_call_record_create_headless_surface_ext, post_call_record_create_headless_surface_ext(
        instance: vk::Instance,
        create_info: &vk::HeadlessSurfaceCreateInfoEXT<'_>
    ) => surface: vk::SurfaceKHR;
    pre_call_record_destroy_surface_khr, post_call_record_destroy_surface_khr(
        instance: vk::Instance,
        surface: vk::SurfaceKHR
    );
    pre_call_record_get_physical_device_surface_support_khr,
        post_call_record_get_physical_device_surface_support_khr(
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR
    );
    pre_call_record_get_physical_device_surface_capabilities_khr,
        post_call_record_get_physical_device_surface_capabilities_khr(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR
    );
    pre_call_record_get_physical_device_surface_formats_khr,
        post_call_record_get_physical_device_surface_formats_khr(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR
    );
    pre_call_record_get_physical_device_surface_present_modes_khr,
        post_call_record_get_physical_device_surface_present_modes_khr(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR
    );
    pre_call_record_get_physical_device_present_rectangles_khr,
        post_call_record_get_physical_device_present_rectangles_khr(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR
    );

    // ── Device and queues ───────────────────────────────────
    pre_call_record_create_device, post_call_record_create_device(
        physical_device: vk::PhysicalDevice
    ) => device: vk::Device;
    pre_call_record_destroy_device, post_call_record_destroy_device(device: vk::Device);
    pre_call_record_get_device_queue, post_call_record_get_device_queue(
        device: vk::Device,
        queue_family_index: u32,
        queue_index: u32
    ) => queue: vk::Queue;
    pre_call_record_device_wait_idle, post_call_record_device_wait_idle(device: vk::Device);
    pre_call_record_queue_wait_idle, post_call_record_queue_wait_idle(queue: vk::Queue);
    pre_call_record_queue_submit, post_call_record_queue_submit(
        queue: vk::Queue,
        submits: &[vk::SubmitInfo<'_>],
        fence: vk::Fence
    );
    pre_call_record_get_device_queue2, post_call_record_get_device_queue2(
        device: vk::Device,
        queue_info: &vk::DeviceQueueInfo2<'_>
    ) => queue: vk::Queue;
    pre_call_record_queue_bind_sparse, post_call_record_queue_bind_sparse(
        queue: vk::Queue,
        bind_infos: &[vk::BindSparseInfo<'_>],
        fence: vk::Fence
    );

    // ── Memory and buffers ──────────────────────────────────
    pre_call_record_allocate_memory, post_call_record_allocate_memory(
        device: vk::Device,
        allocate_info: &vk::MemoryAllocateInfo<'_>
    ) => memory: vk::DeviceMemory;
    pre_call_record_free_memory, post_call_record_free_memory(
        device: vk::Device,
        memory: vk::DeviceMemory
    );
    pre_call_record_map_memory, post_call_record_map_memory(
        device: vk::Device,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        flags: vk::MemoryMapFlags
    );
    pre_call_record_unmap_memory, post_call_record_unmap_memory(
        device: vk::Device,
        memory: vk::DeviceMemory
    );
    pre_call_record_flush_mapped_memory_ranges, post_call_record_flush_mapped_memory_ranges(
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>]
    );
    pre_call_record_create_buffer, post_call_record_create_buffer(
        device: vk::Device,
        create_info: &vk::BufferCreateInfo<'_>
    ) => buffer: vk::Buffer;
    pre_call_record_destroy_buffer, post_call_record_destroy_buffer(
        device: vk::Device,
        buffer: vk::Buffer
    );
    pre_call_record_bind_buffer_memory, post_call_record_bind_buffer_memory(
        device: vk::Device,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        memory_offset: vk::DeviceSize
    );
    pre_call_record_get_buffer_memory_requirements, post_call_record_get_buffer_memory_requirements(
        device: vk::Device,
        buffer: vk::Buffer
    );
    pre_call_record_invalidate_mapped_memory_ranges, post_call_record_invalidate_mapped_memory_ranges(
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>]
    );
    pre_call_record_get_device_memory_commitment, post_call_record_get_device_memory_commitment(
        device: vk::Device,
        memory: vk::DeviceMemory
    );
    pre_call_record_bind_buffer_memory2, post_call_record_bind_buffer_memory2(
        device: vk::Device,
        bind_infos: &[vk::BindBufferMemoryInfo<'_>]
    );
    pre_call_record_get_buffer_memory_requirements2, post_call_record_get_buffer_memory_requirements2(
        device: vk::Device,
        info: &vk::BufferMemoryRequirementsInfo2<'_>
    );
    pre_call_record_create_buffer_view, post_call_record_create_buffer_view(
        device: vk::Device,
        create_info: &vk::BufferViewCreateInfo<'_>
    ) => buffer_view: vk::BufferView;
    pre_call_record_destroy_buffer_view, post_call_record_destroy_buffer_view(
        device: vk::Device,
        buffer_view: vk::BufferView
    );

    // ── Images and samplers ─────────────────────────────────
    pre_call_record_create_image, post_call_record_create_image(
        device: vk::Device,
        create_info: &vk::ImageCreateInfo<'_>
    ) => image: vk::Image;
    pre_call_record_destroy_image, post_call_record_destroy_image(
        device: vk::Device,
        image: vk::Image
    );
    pre_call_record_bind_image_memory, post_call_record_bind_image_memory(
        device: vk::Device,
        image: vk::Image,
        memory: vk::DeviceMemory,
        memory_offset: vk::DeviceSize
    );
    pre_call_record_create_image_view, post_call_record_create_image_view(
        device: vk::Device,
        create_info: &vk::ImageViewCreateInfo<'_>
    ) => view: vk::ImageView;
    pre_call_record_destroy_image_view, post_call_record_destroy_image_view(
        device: vk::Device,
        image_view: vk::ImageView
    );
    pre_call_record_create_sampler, post_call_record_create_sampler(
        device: vk::Device,
        create_info: &vk::SamplerCreateInfo<'_>
    ) => sampler: vk::Sampler;
    pre_call_record_destroy_sampler, post_call_record_destroy_sampler(
        device: vk::Device,
        sampler: vk::Sampler
    );
    pre_call_record_get_image_memory_requirements, post_call_record_get_image_memory_requirements(
        device: vk::Device,
        image: vk::Image
    );
    pre_call_record_get_image_sparse_memory_requirements,
        post_call_record_get_image_sparse_memory_requirements(
        device: vk::Device,
        image: vk::Image
    );
    pre_call_record_get_image_subresource_layout, post_call_record_get_image_subresource_layout(
        device: vk::Device,
        image: vk::Image
    );
    pre_call_record_bind_image_memory2, post_call_record_bind_image_memory2(
        device: vk::Device,
        bind_infos: &[vk::BindImageMemoryInfo<'_>]
    );
    pre_call_record_get_image_memory_requirements2, post_call_record_get_image_memory_requirements2(
        device: vk::Device,
        info: &vk::ImageMemoryRequirementsInfo2<'_>
    );
    pre_call_record_get_image_sparse_memory_requirements2,
        post_call_record_get_image_sparse_memory_requirements2(
        device: vk::Device,
        info: &vk::ImageSparseMemoryRequirementsInfo2<'_>
    );
    pre_call_record_create_sampler_ycbcr_conversion, post_call_record_create_sampler_ycbcr_conversion(
        device: vk::Device,
        create_info: &vk::SamplerYcbcrConversionCreateInfo<'_>
    ) => conversion: vk::SamplerYcbcrConversion;
    pre_call_record_destroy_sampler_ycbcr_conversion, post_call_record_destroy_sampler_ycbcr_conversion(
        device: vk::Device,
        conversion: vk::SamplerYcbcrConversion
    );

    // ── Synchronization ─────────────────────────────────────
    pre_call_record_create_fence, post_call_record_create_fence(
        device: vk::Device,
        create_info: &vk::FenceCreateInfo<'_>
    ) => fence: vk::Fence;
    pre_call_record_destroy_fence, post_call_record_destroy_fence(
        device: vk::Device,
        fence: vk::Fence
    );
    pre_call_record_reset_fences, post_call_record_reset_fences(
        device: vk::Device,
        fences: &[vk::Fence]
    );
    pre_call_record_get_fence_status, post_call_record_get_fence_status(
        device: vk::Device,
        fence: vk::Fence
    );
    pre_call_record_wait_for_fences, post_call_record_wait_for_fences(
        device: vk::Device,
        fences: &[vk::Fence],
        wait_all: bool,
        timeout: u64
    );
    pre_call_record_create_semaphore, post_call_record_create_semaphore(
        device: vk::Device,
        create_info: &vk::SemaphoreCreateInfo<'_>
    ) => semaphore: vk::Semaphore;
    pre_call_record_destroy_semaphore, post_call_record_destroy_semaphore(
        device: vk::Device,
        semaphore: vk::Semaphore
    );
    pre_call_record_create_event, post_call_record_create_event(
        device: vk::Device,
        create_info: &vk::EventCreateInfo<'_>
    ) => event: vk::Event;
    pre_call_record_destroy_event, post_call_record_destroy_event(
        device: vk::Device,
        event: vk::Event
    );
    pre_call_record_get_event_status, post_call_record_get_event_status(
        device: vk::Device,
        event: vk::Event
    );
    pre_call_record_set_event, post_call_record_set_event(device: vk::Device, event: vk::Event);
    pre_call_record_reset_event, post_call_record_reset_event(device: vk::Device, event: vk::Event);

    // ── Queries ─────────────────────────────────────────────
    pre_call_record_create_query_pool, post_call_record_create_query_pool(
        device: vk::Device,
        create_info: &vk::QueryPoolCreateInfo<'_>
    ) => query_pool: vk::QueryPool;
    pre_call_record_destroy_query_pool, post_call_record_destroy_query_pool(
        device: vk::Device,
        query_pool: vk::QueryPool
    );
    pre_call_record_get_query_pool_results, post_call_record_get_query_pool_results(
        device: vk::Device,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        flags: vk::QueryResultFlags
    );
    pre_call_record_cmd_begin_query, post_call_record_cmd_begin_query(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        query: u32,
        flags: vk::QueryControlFlags
    );
    pre_call_record_cmd_end_query, post_call_record_cmd_end_query(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        query: u32
    );
    pre_call_record_cmd_reset_query_pool, post_call_record_cmd_reset_query_pool(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32
    );
    pre_call_record_cmd_write_timestamp, post_call_record_cmd_write_timestamp(
        command_buffer: vk::CommandBuffer,
        pipeline_stage: vk::PipelineStageFlags,
        query_pool: vk::QueryPool,
        query: u32
    );
    pre_call_record_cmd_copy_query_pool_results, post_call_record_cmd_copy_query_pool_results(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags
    );

    // ── Shaders and pipelines ───────────────────────────────
    pre_call_record_create_shader_module, post_call_record_create_shader_module(
        device: vk::Device,
        create_info: &vk::ShaderModuleCreateInfo<'_>
    ) => shader_module: vk::ShaderModule;
    pre_call_record_destroy_shader_module, post_call_record_destroy_shader_module(
        device: vk::Device,
        shader_module: vk::ShaderModule
    );
    pre_call_record_create_pipeline_cache, post_call_record_create_pipeline_cache(
        device: vk::Device,
        create_info: &vk::PipelineCacheCreateInfo<'_>
    ) => pipeline_cache: vk::PipelineCache;
    pre_call_record_destroy_pipeline_cache, post_call_record_destroy_pipeline_cache(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache
    );
    pre_call_record_create_pipeline_layout, post_call_record_create_pipeline_layout(
        device: vk::Device,
        create_info: &vk::PipelineLayoutCreateInfo<'_>
    ) => pipeline_layout: vk::PipelineLayout;
    pre_call_record_destroy_pipeline_layout, post_call_record_destroy_pipeline_layout(
        device: vk::Device,
        pipeline_layout: vk::PipelineLayout
    );
    pre_call_record_create_graphics_pipelines, post_call_record_create_graphics_pipelines(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_infos: &[vk::GraphicsPipelineCreateInfo<'_>]
    ) => pipelines: &[vk::Pipeline];
    pre_call_record_create_compute_pipelines, post_call_record_create_compute_pipelines(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_infos: &[vk::ComputePipelineCreateInfo<'_>]
    ) => pipelines: &[vk::Pipeline];
    pre_call_record_destroy_pipeline, post_call_record_destroy_pipeline(
        device: vk::Device,
        pipeline: vk::Pipeline
    );
    pre_call_record_get_pipeline_cache_data, post_call_record_get_pipeline_cache_data(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache
    );
    pre_call_record_merge_pipeline_caches, post_call_record_merge_pipeline_caches(
        device: vk::Device,
        dst_cache: vk::PipelineCache,
        src_caches: &[vk::PipelineCache]
    );

    // ── Descriptors ─────────────────────────────────────────
    pre_call_record_create_descriptor_set_layout, post_call_record_create_descriptor_set_layout(
        device: vk::Device,
        create_info: &vk::DescriptorSetLayoutCreateInfo<'_>
    ) => set_layout: vk::DescriptorSetLayout;
    pre_call_record_destroy_descriptor_set_layout, post_call_record_destroy_descriptor_set_layout(
        device: vk::Device,
        set_layout: vk::DescriptorSetLayout
    );
    pre_call_record_create_descriptor_pool, post_call_record_create_descriptor_pool(
        device: vk::Device,
        create_info: &vk::DescriptorPoolCreateInfo<'_>
    ) => descriptor_pool: vk::DescriptorPool;
    pre_call_record_destroy_descriptor_pool, post_call_record_destroy_descriptor_pool(
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool
    );
    pre_call_record_reset_descriptor_pool, post_call_record_reset_descriptor_pool(
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        flags: vk::DescriptorPoolResetFlags
    );
    pre_call_record_allocate_descriptor_sets, post_call_record_allocate_descriptor_sets(
        device: vk::Device,
        allocate_info: &vk::DescriptorSetAllocateInfo<'_>
    ) => descriptor_sets: &[vk::DescriptorSet];
    pre_call_record_free_descriptor_sets, post_call_record_free_descriptor_sets(
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        descriptor_sets: &[vk::DescriptorSet]
    );
    pre_call_record_update_descriptor_sets, post_call_record_update_descriptor_sets(
        device: vk::Device,
        writes: &[vk::WriteDescriptorSet<'_>],
        copies: &[vk::CopyDescriptorSet<'_>]
    );
    pre_call_record_get_descriptor_set_layout_support, post_call_record_get_descriptor_set_layout_support(
        device: vk::Device,
        create_info: &vk::DescriptorSetLayoutCreateInfo<'_>
    );
    pre_call_record_create_descriptor_update_template, post_call_record_create_descriptor_update_template(
        device: vk::Device,
        create_info: &vk::DescriptorUpdateTemplateCreateInfo<'_>
    ) => update_template: vk::DescriptorUpdateTemplate;
    pre_call_record_destroy_descriptor_update_template, post_call_record_destroy_descriptor_update_template(
        device: vk::Device,
        update_template: vk::DescriptorUpdateTemplate
    );
    pre_call_record_update_descriptor_set_with_template,
        post_call_record_update_descriptor_set_with_template(
        device: vk::Device,
        descriptor_set: vk::DescriptorSet,
        update_template: vk::DescriptorUpdateTemplate,
        data: *const c_void
    );

    // ── Render passes ───────────────────────────────────────
    pre_call_record_create_render_pass, post_call_record_create_render_pass(
        device: vk::Device,
        create_info: &vk::RenderPassCreateInfo<'_>
    ) => render_pass: vk::RenderPass;
    pre_call_record_destroy_render_pass, post_call_record_destroy_render_pass(
        device: vk::Device,
        render_pass: vk::RenderPass
    );
    pre_call_record_create_framebuffer, post_call_record_create_framebuffer(
        device: vk::Device,
        create_info: &vk::FramebufferCreateInfo<'_>
    ) => framebuffer: vk::Framebuffer;
    pre_call_record_destroy_framebuffer, post_call_record_destroy_framebuffer(
        device: vk::Device,
        framebuffer: vk::Framebuffer
    );
    pre_call_record_get_render_area_granularity, post_call_record_get_render_area_granularity(
        device: vk::Device,
        render_pass: vk::RenderPass
    );

    // ── Command pools and buffers ───────────────────────────
    pre_call_record_create_command_pool, post_call_record_create_command_pool(
        device: vk::Device,
        create_info: &vk::CommandPoolCreateInfo<'_>
    ) => command_pool: vk::CommandPool;
    pre_call_record_destroy_command_pool, post_call_record_destroy_command_pool(
        device: vk::Device,
        command_pool: vk::CommandPool
    );
    pre_call_record_reset_command_pool, post_call_record_reset_command_pool(
        device: vk::Device,
        command_pool: vk::CommandPool,
        flags: vk::CommandPoolResetFlags
    );
    pre_call_record_trim_command_pool, post_call_record_trim_command_pool(
        device: vk::Device,
        command_pool: vk::CommandPool,
        flags: vk::CommandPoolTrimFlags
    );
    pre_call_record_allocate_command_buffers, post_call_record_allocate_command_buffers(
        device: vk::Device,
        allocate_info: &vk::CommandBufferAllocateInfo<'_>
    ) => command_buffers: &[vk::CommandBuffer];
    pre_call_record_free_command_buffers, post_call_record_free_command_buffers(
        device: vk::Device,
        command_pool: vk::CommandPool,
        command_buffers: &[vk::CommandBuffer]
    );
    pre_call_record_begin_command_buffer, post_call_record_begin_command_buffer(
        command_buffer: vk::CommandBuffer,
        begin_info: &vk::CommandBufferBeginInfo<'_>
    );
    pre_call_record_end_command_buffer, post_call_record_end_command_buffer(
        command_buffer: vk::CommandBuffer
    );
    pre_call_record_reset_command_buffer, post_call_record_reset_command_buffer(
        command_buffer: vk::CommandBuffer,
        flags: vk::CommandBufferResetFlags
    );
    pre_call_record_cmd_bind_pipeline, post_call_record_cmd_bind_pipeline(
        command_buffer: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline
    );
    pre_call_record_cmd_bind_descriptor_sets, post_call_record_cmd_bind_descriptor_sets(
        command_buffer: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        descriptor_sets: &[vk::DescriptorSet],
        dynamic_offsets: &[u32]
    );
    pre_call_record_cmd_bind_vertex_buffers, post_call_record_cmd_bind_vertex_buffers(
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        buffers: &[vk::Buffer],
        offsets: &[vk::DeviceSize]
    );
    pre_call_record_cmd_draw, post_call_record_cmd_draw(
        command_buffer: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32
    );
    pre_call_record_cmd_dispatch, post_call_record_cmd_dispatch(
        command_buffer: vk::CommandBuffer,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32
    );
    pre_call_record_cmd_copy_buffer, post_call_record_cmd_copy_buffer(
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_buffer: vk::Buffer,
        regions: &[vk::BufferCopy]
    );
    pre_call_record_cmd_pipeline_barrier, post_call_record_cmd_pipeline_barrier(
        command_buffer: vk::CommandBuffer,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_memory_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_memory_barriers: &[vk::ImageMemoryBarrier<'_>]
    );
    pre_call_record_cmd_begin_render_pass, post_call_record_cmd_begin_render_pass(
        command_buffer: vk::CommandBuffer,
        begin_info: &vk::RenderPassBeginInfo<'_>,
        contents: vk::SubpassContents
    );
    pre_call_record_cmd_end_render_pass, post_call_record_cmd_end_render_pass(
        command_buffer: vk::CommandBuffer
    );
    pre_call_record_cmd_push_constants, post_call_record_cmd_push_constants(
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stage_flags: vk::ShaderStageFlags,
        offset: u32,
        values: &[u8]
    );
    pre_call_record_cmd_execute_commands, post_call_record_cmd_execute_commands(
        command_buffer: vk::CommandBuffer,
        command_buffers: &[vk::CommandBuffer]
    );
    pre_call_record_cmd_bind_index_buffer, post_call_record_cmd_bind_index_buffer(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        index_type: vk::IndexType
    );
    pre_call_record_cmd_draw_indexed, post_call_record_cmd_draw_indexed(
        command_buffer: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32
    );
    pre_call_record_cmd_draw_indirect, post_call_record_cmd_draw_indirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32
    );
    pre_call_record_cmd_draw_indexed_indirect, post_call_record_cmd_draw_indexed_indirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32
    );
    pre_call_record_cmd_dispatch_indirect, post_call_record_cmd_dispatch_indirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize
    );
    pre_call_record_cmd_dispatch_base, post_call_record_cmd_dispatch_base(
        command_buffer: vk::CommandBuffer,
        base_group_x: u32,
        base_group_y: u32,
        base_group_z: u32,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32
    );
    pre_call_record_cmd_set_device_mask, post_call_record_cmd_set_device_mask(
        command_buffer: vk::CommandBuffer,
        device_mask: u32
    );
    pre_call_record_cmd_copy_image, post_call_record_cmd_copy_image(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout
    );
    pre_call_record_cmd_blit_image, post_call_record_cmd_blit_image(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        filter: vk::Filter
    );
    pre_call_record_cmd_copy_buffer_to_image, post_call_record_cmd_copy_buffer_to_image(
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout
    );
    pre_call_record_cmd_copy_image_to_buffer, post_call_record_cmd_copy_image_to_buffer(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_buffer: vk::Buffer
    );
    pre_call_record_cmd_update_buffer, post_call_record_cmd_update_buffer(
        command_buffer: vk::CommandBuffer,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        data_size: vk::DeviceSize
    );
    pre_call_record_cmd_fill_buffer, post_call_record_cmd_fill_buffer(
        command_buffer: vk::CommandBuffer,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        size: vk::DeviceSize,
        data: u32
    );
    pre_call_record_cmd_clear_color_image, post_call_record_cmd_clear_color_image(
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        image_layout: vk::ImageLayout
    );
    pre_call_record_cmd_clear_depth_stencil_image, post_call_record_cmd_clear_depth_stencil_image(
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        image_layout: vk::ImageLayout
    );
    pre_call_record_cmd_clear_attachments, post_call_record_cmd_clear_attachments(
        command_buffer: vk::CommandBuffer,
        attachment_count: u32,
        rect_count: u32
    );
    pre_call_record_cmd_resolve_image, post_call_record_cmd_resolve_image(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout
    );
    pre_call_record_cmd_set_viewport, post_call_record_cmd_set_viewport(
        command_buffer: vk::CommandBuffer,
        first_viewport: u32,
        viewport_count: u32
    );
    pre_call_record_cmd_set_scissor, post_call_record_cmd_set_scissor(
        command_buffer: vk::CommandBuffer,
        first_scissor: u32,
        scissor_count: u32
    );
    pre_call_record_cmd_set_line_width, post_call_record_cmd_set_line_width(
        command_buffer: vk::CommandBuffer,
        line_width: f32
    );
    pre_call_record_cmd_set_depth_bias, post_call_record_cmd_set_depth_bias(
        command_buffer: vk::CommandBuffer,
        depth_bias_constant_factor: f32,
        depth_bias_clamp: f32,
        depth_bias_slope_factor: f32
    );
    pre_call_record_cmd_set_blend_constants, post_call_record_cmd_set_blend_constants(
        command_buffer: vk::CommandBuffer
    );
    pre_call_record_cmd_set_depth_bounds, post_call_record_cmd_set_depth_bounds(
        command_buffer: vk::CommandBuffer,
        min_depth_bounds: f32,
        max_depth_bounds: f32
    );
    pre_call_record_cmd_set_stencil_compare_mask, post_call_record_cmd_set_stencil_compare_mask(
        command_buffer: vk::CommandBuffer,
        face_mask: vk::StencilFaceFlags,
        compare_mask: u32
    );
    pre_call_record_cmd_set_stencil_write_mask, post_call_record_cmd_set_stencil_write_mask(
        command_buffer: vk::CommandBuffer,
        face_mask: vk::StencilFaceFlags,
        write_mask: u32
    );
    pre_call_record_cmd_set_stencil_reference, post_call_record_cmd_set_stencil_reference(
        command_buffer: vk::CommandBuffer,
        face_mask: vk::StencilFaceFlags,
        reference: u32
    );
    pre_call_record_cmd_next_subpass, post_call_record_cmd_next_subpass(
        command_buffer: vk::CommandBuffer,
        contents: vk::SubpassContents
    );
    pre_call_record_cmd_set_event, post_call_record_cmd_set_event(
        command_buffer: vk::CommandBuffer,
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags
    );
    pre_call_record_cmd_reset_event, post_call_record_cmd_reset_event(
        command_buffer: vk::CommandBuffer,
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags
    );
    pre_call_record_cmd_wait_events, post_call_record_cmd_wait_events(
        command_buffer: vk::CommandBuffer,
        events: &[vk::Event],
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_memory_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_memory_barriers: &[vk::ImageMemoryBarrier<'_>]
    );

    // ── Swapchains ──────────────────────────────────────────
    pre_call_record_create_swapchain_khr, post_call_record_create_swapchain_khr(
        device: vk::Device,
        create_info: &vk::SwapchainCreateInfoKHR<'_>
    ) => swapchain: vk::SwapchainKHR;
    pre_call_record_destroy_swapchain_khr, post_call_record_destroy_swapchain_khr(
        device: vk::Device,
        swapchain: vk::SwapchainKHR
    );
    pre_call_record_get_swapchain_images_khr, post_call_record_get_swapchain_images_khr(
        device: vk::Device,
        swapchain: vk::SwapchainKHR
    ) => images: &[vk::Image];
    pre_call_record_acquire_next_image_khr, post_call_record_acquire_next_image_khr(
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        semaphore: vk::Semaphore,
        fence: vk::Fence
    );
    pre_call_record_queue_present_khr, post_call_record_queue_present_khr(
        queue: vk::Queue,
        present_info: &vk::PresentInfoKHR<'_>
    );
    pre_call_record_wait_for_present_khr, post_call_record_wait_for_present_khr(
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        present_id: u64,
        timeout: u64
    );
    pre_call_record_acquire_next_image2_khr, post_call_record_acquire_next_image2_khr(
        device: vk::Device,
        acquire_info: &vk::AcquireNextImageInfoKHR<'_>
    );
    pre_call_record_get_device_group_surface_present_modes_khr,
        post_call_record_get_device_group_surface_present_modes_khr(
        device: vk::Device,
        surface: vk::SurfaceKHR
    );

    // ── Deferred operations and ray tracing ─────────────────
    pre_call_record_create_deferred_operation_khr, post_call_record_create_deferred_operation_khr(
        device: vk::Device
    ) => operation: vk::DeferredOperationKHR;
    pre_call_record_destroy_deferred_operation_khr, post_call_record_destroy_deferred_operation_khr(
        device: vk::Device,
        operation: vk::DeferredOperationKHR
    );
    pre_call_record_get_deferred_operation_max_concurrency_khr,
        post_call_record_get_deferred_operation_max_concurrency_khr(
        device: vk::Device,
        operation: vk::DeferredOperationKHR
    );
    pre_call_record_deferred_operation_join_khr, post_call_record_deferred_operation_join_khr(
        device: vk::Device,
        operation: vk::DeferredOperationKHR
    );
    pre_call_record_get_deferred_operation_result_khr, post_call_record_get_deferred_operation_result_khr(
        device: vk::Device,
        operation: vk::DeferredOperationKHR
    );
    pre_call_record_create_acceleration_structure_khr, post_call_record_create_acceleration_structure_khr(
        device: vk::Device,
        create_info: &vk::AccelerationStructureCreateInfoKHR<'_>
    ) => acceleration_structure: vk::AccelerationStructureKHR;
    pre_call_record_destroy_acceleration_structure_khr, post_call_record_destroy_acceleration_structure_khr(
        device: vk::Device,
        acceleration_structure: vk::AccelerationStructureKHR
    );
    pre_call_record_build_acceleration_structures_khr, post_call_record_build_acceleration_structures_khr(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        infos: &[vk::AccelerationStructureBuildGeometryInfoKHR<'_>]
    );
    pre_call_record_create_ray_tracing_pipelines_khr, post_call_record_create_ray_tracing_pipelines_khr(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        pipeline_cache: vk::PipelineCache,
        create_infos: &[vk::RayTracingPipelineCreateInfoKHR<'_>]
    ) => pipelines: &[vk::Pipeline];
    pre_call_record_cmd_build_acceleration_structures_khr, post_call_record_cmd_build_acceleration_structures_khr(
        command_buffer: vk::CommandBuffer,
        infos: &[vk::AccelerationStructureBuildGeometryInfoKHR<'_>]
    );
    pre_call_record_cmd_build_acceleration_structures_indirect_khr,
        post_call_record_cmd_build_acceleration_structures_indirect_khr(
        command_buffer: vk::CommandBuffer,
        infos: &[vk::AccelerationStructureBuildGeometryInfoKHR<'_>]
    );
    pre_call_record_copy_acceleration_structure_khr, post_call_record_copy_acceleration_structure_khr(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        info: &vk::CopyAccelerationStructureInfoKHR<'_>
    );
    pre_call_record_copy_acceleration_structure_to_memory_khr,
        post_call_record_copy_acceleration_structure_to_memory_khr(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        info: &vk::CopyAccelerationStructureToMemoryInfoKHR<'_>
    );
    pre_call_record_copy_memory_to_acceleration_structure_khr,
        post_call_record_copy_memory_to_acceleration_structure_khr(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        info: &vk::CopyMemoryToAccelerationStructureInfoKHR<'_>
    );
    pre_call_record_write_acceleration_structures_properties_khr,
        post_call_record_write_acceleration_structures_properties_khr(
        device: vk::Device,
        acceleration_structures: &[vk::AccelerationStructureKHR],
        query_type: vk::QueryType
    );
    pre_call_record_cmd_copy_acceleration_structure_khr, post_call_record_cmd_copy_acceleration_structure_khr(
        command_buffer: vk::CommandBuffer,
        info: &vk::CopyAccelerationStructureInfoKHR<'_>
    );
    pre_call_record_cmd_copy_acceleration_structure_to_memory_khr,
        post_call_record_cmd_copy_acceleration_structure_to_memory_khr(
        command_buffer: vk::CommandBuffer,
        info: &vk::CopyAccelerationStructureToMemoryInfoKHR<'_>
    );
    pre_call_record_cmd_copy_memory_to_acceleration_structure_khr,
        post_call_record_cmd_copy_memory_to_acceleration_structure_khr(
        command_buffer: vk::CommandBuffer,
        info: &vk::CopyMemoryToAccelerationStructureInfoKHR<'_>
    );
    pre_call_record_get_acceleration_structure_device_address_khr,
        post_call_record_get_acceleration_structure_device_address_khr(
        device: vk::Device,
        info: &vk::AccelerationStructureDeviceAddressInfoKHR<'_>
    );
    pre_call_record_cmd_write_acceleration_structures_properties_khr,
        post_call_record_cmd_write_acceleration_structures_properties_khr(
        command_buffer: vk::CommandBuffer,
        acceleration_structures: &[vk::AccelerationStructureKHR],
        query_type: vk::QueryType,
        query_pool: vk::QueryPool,
        first_query: u32
    );
    pre_call_record_get_acceleration_structure_build_sizes_khr,
        post_call_record_get_acceleration_structure_build_sizes_khr(
        device: vk::Device,
        build_type: vk::AccelerationStructureBuildTypeKHR,
        build_info: &vk::AccelerationStructureBuildGeometryInfoKHR<'_>
    );
    pre_call_record_cmd_trace_rays_khr, post_call_record_cmd_trace_rays_khr(
        command_buffer: vk::CommandBuffer,
        width: u32,
        height: u32,
        depth: u32
    );
    pre_call_record_cmd_trace_rays_indirect_khr, post_call_record_cmd_trace_rays_indirect_khr(
        command_buffer: vk::CommandBuffer,
        indirect_device_address: vk::DeviceAddress
    );
    pre_call_record_get_ray_tracing_shader_group_handles_khr,
        post_call_record_get_ray_tracing_shader_group_handles_khr(
        device: vk::Device,
        pipeline: vk::Pipeline,
        first_group: u32,
        group_count: u32
    );
    pre_call_record_get_ray_tracing_capture_replay_shader_group_handles_khr,
        post_call_record_get_ray_tracing_capture_replay_shader_group_handles_khr(
        device: vk::Device,
        pipeline: vk::Pipeline,
        first_group: u32,
        group_count: u32
    );
    pre_call_record_get_ray_tracing_shader_group_stack_size_khr,
        post_call_record_get_ray_tracing_shader_group_stack_size_khr(
        device: vk::Device,
        pipeline: vk::Pipeline,
        group: u32,
        group_shader: vk::ShaderGroupShaderKHR
    );
    pre_call_record_cmd_set_ray_tracing_pipeline_stack_size_khr,
        post_call_record_cmd_set_ray_tracing_pipeline_stack_size_khr(
        command_buffer: vk::CommandBuffer,
        pipeline_stack_size: u32
    );
}
