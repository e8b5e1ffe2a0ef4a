//! Command pools, command buffer lifecycle and recorded commands.

use std::ffi::c_void;

use ash::vk;
use ash::vk::Handle;
use vkl_core::RecordObject;

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_intercepts, DeviceDispatch};
use crate::params::{array_ptr, created, created_slice, slice, unwrap_array};
use crate::safe_struct::{unwrap_pnext_chain, unwrap_struct, Scratch};

// ── Command pool ────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateCommandPool(
    device: vk::Device,
    p_create_info: *const vk::CommandPoolCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_command_pool: *mut vk::CommandPool,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateCommandPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_command_pool(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_command_pool(device, p_create_info, p_allocator, p_command_pool);
        let command_pool = created(&record, p_command_pool);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_command_pool(device, create_info, command_pool, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyCommandPool(
    device: vk::Device,
    command_pool: vk::CommandPool,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyCommandPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_command_pool(device, command_pool, &record));
        ctx.dispatch.destroy_command_pool(device, command_pool, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_command_pool(device, command_pool, &record));
    }
}

pub unsafe extern "system" fn vkResetCommandPool(
    device: vk::Device,
    command_pool: vk::CommandPool,
    flags: vk::CommandPoolResetFlags,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkResetCommandPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_reset_command_pool(device, command_pool, flags, &record));
        record.result =
            (ctx.dispatch.v1_0.reset_command_pool)(device, ctx.dispatch.unwrap(command_pool), flags);
        ctx.chain
            .post(|vo| vo.post_call_record_reset_command_pool(device, command_pool, flags, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkTrimCommandPool(
    device: vk::Device,
    command_pool: vk::CommandPool,
    flags: vk::CommandPoolTrimFlags,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkTrimCommandPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_trim_command_pool(device, command_pool, flags, &record));
        (ctx.dispatch.v1_1.trim_command_pool)(device, ctx.dispatch.unwrap(command_pool), flags);
        ctx.chain
            .post(|vo| vo.post_call_record_trim_command_pool(device, command_pool, flags, &record));
    }
}

// ── Command buffer lifecycle ────────────────────────────────

pub unsafe extern "system" fn vkAllocateCommandBuffers(
    device: vk::Device,
    p_allocate_info: *const vk::CommandBufferAllocateInfo<'_>,
    p_command_buffers: *mut vk::CommandBuffer,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let allocate_info = &*p_allocate_info;
        let mut record = RecordObject::new("vkAllocateCommandBuffers");
        ctx.chain
            .pre(|vo| vo.pre_call_record_allocate_command_buffers(device, allocate_info, &record));
        record.result = ctx
            .dispatch
            .allocate_command_buffers(device, p_allocate_info, p_command_buffers);
        let command_buffers = created_slice(
            &record,
            p_command_buffers,
            allocate_info.command_buffer_count,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_allocate_command_buffers(device, allocate_info, command_buffers, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkFreeCommandBuffers(
    device: vk::Device,
    command_pool: vk::CommandPool,
    command_buffer_count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let command_buffers = slice(p_command_buffers, command_buffer_count);
        let record = RecordObject::new("vkFreeCommandBuffers");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_free_command_buffers(device, command_pool, command_buffers, &record)
        });
        for &cb in command_buffers {
            ctx.handles().destroy_object(cb);
        }
        (ctx.dispatch.v1_0.free_command_buffers)(
            device,
            ctx.dispatch.unwrap(command_pool),
            command_buffer_count,
            p_command_buffers,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_free_command_buffers(device, command_pool, command_buffers, &record)
        });
    }
}

pub unsafe extern "system" fn vkBeginCommandBuffer(
    command_buffer: vk::CommandBuffer,
    p_begin_info: *const vk::CommandBufferBeginInfo<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(command_buffer, vk::Result::ERROR_INITIALIZATION_FAILED);
        let begin_info = &*p_begin_info;
        let mut record = RecordObject::new("vkBeginCommandBuffer");
        ctx.chain
            .pre(|vo| vo.pre_call_record_begin_command_buffer(command_buffer, begin_info, &record));
        record.result = ctx.dispatch.begin_command_buffer(command_buffer, p_begin_info);
        ctx.chain
            .post(|vo| vo.post_call_record_begin_command_buffer(command_buffer, begin_info, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkEndCommandBuffer(command_buffer: vk::CommandBuffer) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(command_buffer, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkEndCommandBuffer");
        ctx.chain
            .pre(|vo| vo.pre_call_record_end_command_buffer(command_buffer, &record));
        record.result = (ctx.dispatch.v1_0.end_command_buffer)(command_buffer);
        ctx.chain
            .post(|vo| vo.post_call_record_end_command_buffer(command_buffer, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkResetCommandBuffer(
    command_buffer: vk::CommandBuffer,
    flags: vk::CommandBufferResetFlags,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(command_buffer, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkResetCommandBuffer");
        ctx.chain
            .pre(|vo| vo.pre_call_record_reset_command_buffer(command_buffer, flags, &record));
        record.result = (ctx.dispatch.v1_0.reset_command_buffer)(command_buffer, flags);
        ctx.chain
            .post(|vo| vo.post_call_record_reset_command_buffer(command_buffer, flags, &record));
        record.result
    }
}

// ── Recorded commands ───────────────────────────────────────

pub unsafe extern "system" fn vkCmdBindPipeline(
    command_buffer: vk::CommandBuffer,
    pipeline_bind_point: vk::PipelineBindPoint,
    pipeline: vk::Pipeline,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let record = RecordObject::new("vkCmdBindPipeline");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_bind_pipeline(command_buffer, pipeline_bind_point, pipeline, &record)
        });
        (ctx.dispatch.v1_0.cmd_bind_pipeline)(
            command_buffer,
            pipeline_bind_point,
            ctx.dispatch.unwrap(pipeline),
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_bind_pipeline(command_buffer, pipeline_bind_point, pipeline, &record)
        });
    }
}

pub unsafe extern "system" fn vkCmdBindDescriptorSets(
    command_buffer: vk::CommandBuffer,
    pipeline_bind_point: vk::PipelineBindPoint,
    layout: vk::PipelineLayout,
    first_set: u32,
    descriptor_set_count: u32,
    p_descriptor_sets: *const vk::DescriptorSet,
    dynamic_offset_count: u32,
    p_dynamic_offsets: *const u32,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let descriptor_sets = slice(p_descriptor_sets, descriptor_set_count);
        let dynamic_offsets = slice(p_dynamic_offsets, dynamic_offset_count);
        let record = RecordObject::new("vkCmdBindDescriptorSets");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_bind_descriptor_sets(
                command_buffer,
                pipeline_bind_point,
                layout,
                first_set,
                descriptor_sets,
                dynamic_offsets,
                &record,
            )
        });
        let natives = unwrap_array(ctx.handles(), p_descriptor_sets, descriptor_set_count);
        (ctx.dispatch.v1_0.cmd_bind_descriptor_sets)(
            command_buffer,
            pipeline_bind_point,
            ctx.dispatch.unwrap(layout),
            first_set,
            descriptor_set_count,
            array_ptr(p_descriptor_sets, &natives),
            dynamic_offset_count,
            p_dynamic_offsets,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_bind_descriptor_sets(
                command_buffer,
                pipeline_bind_point,
                layout,
                first_set,
                descriptor_sets,
                dynamic_offsets,
                &record,
            )
        });
    }
}

pub unsafe extern "system" fn vkCmdBindVertexBuffers(
    command_buffer: vk::CommandBuffer,
    first_binding: u32,
    binding_count: u32,
    p_buffers: *const vk::Buffer,
    p_offsets: *const vk::DeviceSize,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let buffers = slice(p_buffers, binding_count);
        let offsets = slice(p_offsets, binding_count);
        let record = RecordObject::new("vkCmdBindVertexBuffers");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_bind_vertex_buffers(command_buffer, first_binding, buffers, offsets, &record)
        });
        let natives = unwrap_array(ctx.handles(), p_buffers, binding_count);
        (ctx.dispatch.v1_0.cmd_bind_vertex_buffers)(
            command_buffer,
            first_binding,
            binding_count,
            array_ptr(p_buffers, &natives),
            p_offsets,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_bind_vertex_buffers(command_buffer, first_binding, buffers, offsets, &record)
        });
    }
}

pub unsafe extern "system" fn vkCmdDraw(
    command_buffer: vk::CommandBuffer,
    vertex_count: u32,
    instance_count: u32,
    first_vertex: u32,
    first_instance: u32,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let record = RecordObject::new("vkCmdDraw");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_draw(
                command_buffer,
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
                &record,
            )
        });
        (ctx.dispatch.v1_0.cmd_draw)(
            command_buffer,
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_draw(
                command_buffer,
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
                &record,
            )
        });
    }
}

pub unsafe extern "system" fn vkCmdDispatch(
    command_buffer: vk::CommandBuffer,
    group_count_x: u32,
    group_count_y: u32,
    group_count_z: u32,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let record = RecordObject::new("vkCmdDispatch");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_dispatch(command_buffer, group_count_x, group_count_y, group_count_z, &record)
        });
        (ctx.dispatch.v1_0.cmd_dispatch)(command_buffer, group_count_x, group_count_y, group_count_z);
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_dispatch(command_buffer, group_count_x, group_count_y, group_count_z, &record)
        });
    }
}

pub unsafe extern "system" fn vkCmdCopyBuffer(
    command_buffer: vk::CommandBuffer,
    src_buffer: vk::Buffer,
    dst_buffer: vk::Buffer,
    region_count: u32,
    p_regions: *const vk::BufferCopy,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let regions = slice(p_regions, region_count);
        let record = RecordObject::new("vkCmdCopyBuffer");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_copy_buffer(command_buffer, src_buffer, dst_buffer, regions, &record)
        });
        (ctx.dispatch.v1_0.cmd_copy_buffer)(
            command_buffer,
            ctx.dispatch.unwrap(src_buffer),
            ctx.dispatch.unwrap(dst_buffer),
            region_count,
            p_regions,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_copy_buffer(command_buffer, src_buffer, dst_buffer, regions, &record)
        });
    }
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "system" fn vkCmdPipelineBarrier(
    command_buffer: vk::CommandBuffer,
    src_stage_mask: vk::PipelineStageFlags,
    dst_stage_mask: vk::PipelineStageFlags,
    dependency_flags: vk::DependencyFlags,
    memory_barrier_count: u32,
    p_memory_barriers: *const vk::MemoryBarrier<'_>,
    buffer_memory_barrier_count: u32,
    p_buffer_memory_barriers: *const vk::BufferMemoryBarrier<'_>,
    image_memory_barrier_count: u32,
    p_image_memory_barriers: *const vk::ImageMemoryBarrier<'_>,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let memory_barriers = slice(p_memory_barriers, memory_barrier_count);
        let buffer_barriers = slice(p_buffer_memory_barriers, buffer_memory_barrier_count);
        let image_barriers = slice(p_image_memory_barriers, image_memory_barrier_count);
        let record = RecordObject::new("vkCmdPipelineBarrier");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_pipeline_barrier(
                command_buffer,
                src_stage_mask,
                dst_stage_mask,
                dependency_flags,
                memory_barriers,
                buffer_barriers,
                image_barriers,
                &record,
            )
        });

        let mut scratch = Scratch::new();
        let d = &ctx.dispatch;
        let buffer_memory_barriers = d.local_array(
            &mut scratch,
            p_buffer_memory_barriers,
            buffer_memory_barrier_count,
            |handles, s, barrier| {
                barrier.p_next = unwrap_pnext_chain(handles, s, barrier.p_next);
                barrier.buffer = handles.unwrap_handle(barrier.buffer);
            },
        );
        let image_memory_barriers = d.local_array(
            &mut scratch,
            p_image_memory_barriers,
            image_memory_barrier_count,
            |handles, s, barrier| {
                barrier.p_next = unwrap_pnext_chain(handles, s, barrier.p_next);
                barrier.image = handles.unwrap_handle(barrier.image);
            },
        );
        (d.v1_0.cmd_pipeline_barrier)(
            command_buffer,
            src_stage_mask,
            dst_stage_mask,
            dependency_flags,
            memory_barrier_count,
            p_memory_barriers,
            buffer_memory_barrier_count,
            buffer_memory_barriers,
            image_memory_barrier_count,
            image_memory_barriers,
        );

        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_pipeline_barrier(
                command_buffer,
                src_stage_mask,
                dst_stage_mask,
                dependency_flags,
                memory_barriers,
                buffer_barriers,
                image_barriers,
                &record,
            )
        });
    }
}

pub unsafe extern "system" fn vkCmdBeginRenderPass(
    command_buffer: vk::CommandBuffer,
    p_render_pass_begin: *const vk::RenderPassBeginInfo<'_>,
    contents: vk::SubpassContents,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let begin_info = &*p_render_pass_begin;
        let record = RecordObject::new("vkCmdBeginRenderPass");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_begin_render_pass(command_buffer, begin_info, contents, &record)
        });
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_render_pass_begin, |handles, s, info| {
            info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
            info.render_pass = handles.unwrap_handle(info.render_pass);
            info.framebuffer = handles.unwrap_handle(info.framebuffer);
        });
        (ctx.dispatch.v1_0.cmd_begin_render_pass)(command_buffer, local, contents);
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_begin_render_pass(command_buffer, begin_info, contents, &record)
        });
    }
}

pub unsafe extern "system" fn vkCmdEndRenderPass(command_buffer: vk::CommandBuffer) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let record = RecordObject::new("vkCmdEndRenderPass");
        ctx.chain
            .pre(|vo| vo.pre_call_record_cmd_end_render_pass(command_buffer, &record));
        (ctx.dispatch.v1_0.cmd_end_render_pass)(command_buffer);
        ctx.chain
            .post(|vo| vo.post_call_record_cmd_end_render_pass(command_buffer, &record));
    }
}

pub unsafe extern "system" fn vkCmdPushConstants(
    command_buffer: vk::CommandBuffer,
    layout: vk::PipelineLayout,
    stage_flags: vk::ShaderStageFlags,
    offset: u32,
    size: u32,
    p_values: *const c_void,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let values = slice(p_values.cast::<u8>(), size);
        let record = RecordObject::new("vkCmdPushConstants");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_push_constants(command_buffer, layout, stage_flags, offset, values, &record)
        });
        (ctx.dispatch.v1_0.cmd_push_constants)(
            command_buffer,
            ctx.dispatch.unwrap(layout),
            stage_flags,
            offset,
            size,
            p_values,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_push_constants(command_buffer, layout, stage_flags, offset, values, &record)
        });
    }
}

pub unsafe extern "system" fn vkCmdExecuteCommands(
    command_buffer: vk::CommandBuffer,
    command_buffer_count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let command_buffers = slice(p_command_buffers, command_buffer_count);
        let record = RecordObject::new("vkCmdExecuteCommands");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_execute_commands(command_buffer, command_buffers, &record)
        });
        (ctx.dispatch.v1_0.cmd_execute_commands)(command_buffer, command_buffer_count, p_command_buffers);
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_execute_commands(command_buffer, command_buffers, &record)
        });
    }
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "system" fn vkCmdWaitEvents(
    command_buffer: vk::CommandBuffer,
    event_count: u32,
    p_events: *const vk::Event,
    src_stage_mask: vk::PipelineStageFlags,
    dst_stage_mask: vk::PipelineStageFlags,
    memory_barrier_count: u32,
    p_memory_barriers: *const vk::MemoryBarrier<'_>,
    buffer_memory_barrier_count: u32,
    p_buffer_memory_barriers: *const vk::BufferMemoryBarrier<'_>,
    image_memory_barrier_count: u32,
    p_image_memory_barriers: *const vk::ImageMemoryBarrier<'_>,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let events = slice(p_events, event_count);
        let memory_barriers = slice(p_memory_barriers, memory_barrier_count);
        let buffer_barriers = slice(p_buffer_memory_barriers, buffer_memory_barrier_count);
        let image_barriers = slice(p_image_memory_barriers, image_memory_barrier_count);
        let record = RecordObject::new("vkCmdWaitEvents");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_wait_events(
                command_buffer,
                events,
                src_stage_mask,
                dst_stage_mask,
                memory_barriers,
                buffer_barriers,
                image_barriers,
                &record,
            )
        });

        let mut scratch = Scratch::new();
        let d = &ctx.dispatch;
        let native_events = d.local_handles(&mut scratch, p_events, event_count);
        let buffer_memory_barriers = d.local_array(
            &mut scratch,
            p_buffer_memory_barriers,
            buffer_memory_barrier_count,
            |handles, s, barrier| {
                barrier.p_next = unwrap_pnext_chain(handles, s, barrier.p_next);
                barrier.buffer = handles.unwrap_handle(barrier.buffer);
            },
        );
        let image_memory_barriers = d.local_array(
            &mut scratch,
            p_image_memory_barriers,
            image_memory_barrier_count,
            |handles, s, barrier| {
                barrier.p_next = unwrap_pnext_chain(handles, s, barrier.p_next);
                barrier.image = handles.unwrap_handle(barrier.image);
            },
        );
        (d.v1_0.cmd_wait_events)(
            command_buffer,
            event_count,
            native_events,
            src_stage_mask,
            dst_stage_mask,
            memory_barrier_count,
            p_memory_barriers,
            buffer_memory_barrier_count,
            buffer_memory_barriers,
            image_memory_barrier_count,
            image_memory_barriers,
        );

        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_wait_events(
                command_buffer,
                events,
                src_stage_mask,
                dst_stage_mask,
                memory_barriers,
                buffer_barriers,
                image_barriers,
                &record,
            )
        });
    }
}

// Commands whose only handles are top-level parameters. Region and value
// arrays carry no handles and reach the driver untouched.
forward_intercepts! {
    device fn vkCmdBindIndexBuffer(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        index_type: vk::IndexType
    ) = v1_0.cmd_bind_index_buffer;
        hooks pre_call_record_cmd_bind_index_buffer,
            post_call_record_cmd_bind_index_buffer(buffer, offset, index_type);
        unwrap(buffer);

    device fn vkCmdDrawIndexed(
        command_buffer: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32
    ) = v1_0.cmd_draw_indexed;
        hooks pre_call_record_cmd_draw_indexed, post_call_record_cmd_draw_indexed(
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance
        );
        unwrap();

    device fn vkCmdDrawIndirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32
    ) = v1_0.cmd_draw_indirect;
        hooks pre_call_record_cmd_draw_indirect,
            post_call_record_cmd_draw_indirect(buffer, offset, draw_count, stride);
        unwrap(buffer);

    device fn vkCmdDrawIndexedIndirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32
    ) = v1_0.cmd_draw_indexed_indirect;
        hooks pre_call_record_cmd_draw_indexed_indirect,
            post_call_record_cmd_draw_indexed_indirect(buffer, offset, draw_count, stride);
        unwrap(buffer);

    device fn vkCmdDispatchIndirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize
    ) = v1_0.cmd_dispatch_indirect;
        hooks pre_call_record_cmd_dispatch_indirect, post_call_record_cmd_dispatch_indirect(buffer, offset);
        unwrap(buffer);

    device fn vkCmdDispatchBase(
        command_buffer: vk::CommandBuffer,
        base_group_x: u32,
        base_group_y: u32,
        base_group_z: u32,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32
    ) = v1_1.cmd_dispatch_base;
        hooks pre_call_record_cmd_dispatch_base, post_call_record_cmd_dispatch_base(
            base_group_x,
            base_group_y,
            base_group_z,
            group_count_x,
            group_count_y,
            group_count_z
        );
        unwrap();

    device fn vkCmdSetDeviceMask(command_buffer: vk::CommandBuffer, device_mask: u32)
        = v1_1.cmd_set_device_mask;
        hooks pre_call_record_cmd_set_device_mask, post_call_record_cmd_set_device_mask(device_mask);
        unwrap();

    device fn vkCmdCopyImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageCopy
    ) = v1_0.cmd_copy_image;
        hooks pre_call_record_cmd_copy_image, post_call_record_cmd_copy_image(
            src_image,
            src_image_layout,
            dst_image,
            dst_image_layout
        );
        unwrap(src_image, dst_image);

    device fn vkCmdBlitImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageBlit,
        filter: vk::Filter
    ) = v1_0.cmd_blit_image;
        hooks pre_call_record_cmd_blit_image, post_call_record_cmd_blit_image(
            src_image,
            src_image_layout,
            dst_image,
            dst_image_layout,
            filter
        );
        unwrap(src_image, dst_image);

    device fn vkCmdCopyBufferToImage(
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::BufferImageCopy
    ) = v1_0.cmd_copy_buffer_to_image;
        hooks pre_call_record_cmd_copy_buffer_to_image,
            post_call_record_cmd_copy_buffer_to_image(src_buffer, dst_image, dst_image_layout);
        unwrap(src_buffer, dst_image);

    device fn vkCmdCopyImageToBuffer(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_buffer: vk::Buffer,
        region_count: u32,
        p_regions: *const vk::BufferImageCopy
    ) = v1_0.cmd_copy_image_to_buffer;
        hooks pre_call_record_cmd_copy_image_to_buffer,
            post_call_record_cmd_copy_image_to_buffer(src_image, src_image_layout, dst_buffer);
        unwrap(src_image, dst_buffer);

    device fn vkCmdUpdateBuffer(
        command_buffer: vk::CommandBuffer,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        data_size: vk::DeviceSize,
        p_data: *const c_void
    ) = v1_0.cmd_update_buffer;
        hooks pre_call_record_cmd_update_buffer,
            post_call_record_cmd_update_buffer(dst_buffer, dst_offset, data_size);
        unwrap(dst_buffer);

    device fn vkCmdFillBuffer(
        command_buffer: vk::CommandBuffer,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        size: vk::DeviceSize,
        data: u32
    ) = v1_0.cmd_fill_buffer;
        hooks pre_call_record_cmd_fill_buffer,
            post_call_record_cmd_fill_buffer(dst_buffer, dst_offset, size, data);
        unwrap(dst_buffer);

    device fn vkCmdClearColorImage(
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        image_layout: vk::ImageLayout,
        p_color: *const vk::ClearColorValue,
        range_count: u32,
        p_ranges: *const vk::ImageSubresourceRange
    ) = v1_0.cmd_clear_color_image;
        hooks pre_call_record_cmd_clear_color_image,
            post_call_record_cmd_clear_color_image(image, image_layout);
        unwrap(image);

    device fn vkCmdClearDepthStencilImage(
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        image_layout: vk::ImageLayout,
        p_depth_stencil: *const vk::ClearDepthStencilValue,
        range_count: u32,
        p_ranges: *const vk::ImageSubresourceRange
    ) = v1_0.cmd_clear_depth_stencil_image;
        hooks pre_call_record_cmd_clear_depth_stencil_image,
            post_call_record_cmd_clear_depth_stencil_image(image, image_layout);
        unwrap(image);

    device fn vkCmdClearAttachments(
        command_buffer: vk::CommandBuffer,
        attachment_count: u32,
        p_attachments: *const vk::ClearAttachment,
        rect_count: u32,
        p_rects: *const vk::ClearRect
    ) = v1_0.cmd_clear_attachments;
        hooks pre_call_record_cmd_clear_attachments,
            post_call_record_cmd_clear_attachments(attachment_count, rect_count);
        unwrap();

    device fn vkCmdResolveImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageResolve
    ) = v1_0.cmd_resolve_image;
        hooks pre_call_record_cmd_resolve_image, post_call_record_cmd_resolve_image(
            src_image,
            src_image_layout,
            dst_image,
            dst_image_layout
        );
        unwrap(src_image, dst_image);

    device fn vkCmdSetViewport(
        command_buffer: vk::CommandBuffer,
        first_viewport: u32,
        viewport_count: u32,
        p_viewports: *const vk::Viewport
    ) = v1_0.cmd_set_viewport;
        hooks pre_call_record_cmd_set_viewport,
            post_call_record_cmd_set_viewport(first_viewport, viewport_count);
        unwrap();

    device fn vkCmdSetScissor(
        command_buffer: vk::CommandBuffer,
        first_scissor: u32,
        scissor_count: u32,
        p_scissors: *const vk::Rect2D
    ) = v1_0.cmd_set_scissor;
        hooks pre_call_record_cmd_set_scissor,
            post_call_record_cmd_set_scissor(first_scissor, scissor_count);
        unwrap();

    device fn vkCmdSetLineWidth(command_buffer: vk::CommandBuffer, line_width: f32)
        = v1_0.cmd_set_line_width;
        hooks pre_call_record_cmd_set_line_width, post_call_record_cmd_set_line_width(line_width);
        unwrap();

    device fn vkCmdSetDepthBias(
        command_buffer: vk::CommandBuffer,
        depth_bias_constant_factor: f32,
        depth_bias_clamp: f32,
        depth_bias_slope_factor: f32
    ) = v1_0.cmd_set_depth_bias;
        hooks pre_call_record_cmd_set_depth_bias, post_call_record_cmd_set_depth_bias(
            depth_bias_constant_factor,
            depth_bias_clamp,
            depth_bias_slope_factor
        );
        unwrap();

    device fn vkCmdSetBlendConstants(
        command_buffer: vk::CommandBuffer,
        blend_constants: *const [f32; 4]
    ) = v1_0.cmd_set_blend_constants;
        hooks pre_call_record_cmd_set_blend_constants, post_call_record_cmd_set_blend_constants();
        unwrap();

    device fn vkCmdSetDepthBounds(
        command_buffer: vk::CommandBuffer,
        min_depth_bounds: f32,
        max_depth_bounds: f32
    ) = v1_0.cmd_set_depth_bounds;
        hooks pre_call_record_cmd_set_depth_bounds,
            post_call_record_cmd_set_depth_bounds(min_depth_bounds, max_depth_bounds);
        unwrap();

    device fn vkCmdSetStencilCompareMask(
        command_buffer: vk::CommandBuffer,
        face_mask: vk::StencilFaceFlags,
        compare_mask: u32
    ) = v1_0.cmd_set_stencil_compare_mask;
        hooks pre_call_record_cmd_set_stencil_compare_mask,
            post_call_record_cmd_set_stencil_compare_mask(face_mask, compare_mask);
        unwrap();

    device fn vkCmdSetStencilWriteMask(
        command_buffer: vk::CommandBuffer,
        face_mask: vk::StencilFaceFlags,
        write_mask: u32
    ) = v1_0.cmd_set_stencil_write_mask;
        hooks pre_call_record_cmd_set_stencil_write_mask,
            post_call_record_cmd_set_stencil_write_mask(face_mask, write_mask);
        unwrap();

    device fn vkCmdSetStencilReference(
        command_buffer: vk::CommandBuffer,
        face_mask: vk::StencilFaceFlags,
        reference: u32
    ) = v1_0.cmd_set_stencil_reference;
        hooks pre_call_record_cmd_set_stencil_reference,
            post_call_record_cmd_set_stencil_reference(face_mask, reference);
        unwrap();

    device fn vkCmdNextSubpass(command_buffer: vk::CommandBuffer, contents: vk::SubpassContents)
        = v1_0.cmd_next_subpass;
        hooks pre_call_record_cmd_next_subpass, post_call_record_cmd_next_subpass(contents);
        unwrap();

    device fn vkCmdSetEvent(
        command_buffer: vk::CommandBuffer,
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags
    ) = v1_0.cmd_set_event;
        hooks pre_call_record_cmd_set_event, post_call_record_cmd_set_event(event, stage_mask);
        unwrap(event);

    device fn vkCmdResetEvent(
        command_buffer: vk::CommandBuffer,
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags
    ) = v1_0.cmd_reset_event;
        hooks pre_call_record_cmd_reset_event, post_call_record_cmd_reset_event(event, stage_mask);
        unwrap(event);
}

impl DeviceDispatch {
    forward_create!(create_command_pool, v1_0.create_command_pool, vk::CommandPoolCreateInfo<'_>, vk::CommandPool);

    /// Destroying a pool frees every command buffer allocated from it.
    pub unsafe fn destroy_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        unsafe {
            self.handles.destroy_children(command_pool.as_raw());
            let native = self.handles.erase(command_pool);
            (self.v1_0.destroy_command_pool)(device, native, p_allocator)
        }
    }

    /// Command buffers are dispatchable and handed out unwrapped; they are
    /// registered as children of the pool they came from.
    pub unsafe fn allocate_command_buffers(
        &self,
        device: vk::Device,
        p_allocate_info: *const vk::CommandBufferAllocateInfo<'_>,
        p_command_buffers: *mut vk::CommandBuffer,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let allocate_info = self.local(&mut scratch, p_allocate_info, |handles, s, ai| {
                ai.p_next = unwrap_pnext_chain(handles, s, ai.p_next);
                ai.command_pool = handles.unwrap_handle(ai.command_pool);
            });
            let result = (self.v1_0.allocate_command_buffers)(device, allocate_info, p_command_buffers);
            if result == vk::Result::SUCCESS {
                let info = &*p_allocate_info;
                let pool = Some(info.command_pool.as_raw());
                for &cb in slice(p_command_buffers, info.command_buffer_count) {
                    self.handles.create_object_with_parent(cb, pool);
                }
            }
            result
        }
    }

    pub unsafe fn begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        p_begin_info: *const vk::CommandBufferBeginInfo<'_>,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let begin_info = self.local(&mut scratch, p_begin_info, |handles, s, bi| {
                bi.p_next = unwrap_pnext_chain(handles, s, bi.p_next);
                bi.p_inheritance_info = unwrap_struct(s, bi.p_inheritance_info, |s, inheritance| {
                    inheritance.p_next = unwrap_pnext_chain(handles, s, inheritance.p_next);
                    inheritance.render_pass = handles.unwrap_handle(inheritance.render_pass);
                    inheritance.framebuffer = handles.unwrap_handle(inheritance.framebuffer);
                });
            });
            (self.v1_0.begin_command_buffer)(command_buffer, begin_info)
        }
    }
}
