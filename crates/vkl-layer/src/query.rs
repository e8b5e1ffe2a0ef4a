//! Query pools and the commands that write them.

use std::ffi::c_void;

use ash::vk;
use vkl_core::RecordObject;

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_destroy, forward_intercepts, DeviceDispatch};
use crate::params::created;

pub unsafe extern "system" fn vkCreateQueryPool(
    device: vk::Device,
    p_create_info: *const vk::QueryPoolCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_query_pool: *mut vk::QueryPool,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateQueryPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_query_pool(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_query_pool(device, p_create_info, p_allocator, p_query_pool);
        let query_pool = created(&record, p_query_pool);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_query_pool(device, create_info, query_pool, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyQueryPool(
    device: vk::Device,
    query_pool: vk::QueryPool,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyQueryPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_query_pool(device, query_pool, &record));
        ctx.dispatch.destroy_query_pool(device, query_pool, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_query_pool(device, query_pool, &record));
    }
}

forward_intercepts! {
    device fn vkGetQueryPoolResults(
        device: vk::Device,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        data_size: usize,
        p_data: *mut c_void,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags
    ) -> vk::Result = v1_0.get_query_pool_results;
        hooks pre_call_record_get_query_pool_results,
            post_call_record_get_query_pool_results(query_pool, first_query, query_count, flags);
        unwrap(query_pool);

    device fn vkCmdBeginQuery(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        query: u32,
        flags: vk::QueryControlFlags
    ) = v1_0.cmd_begin_query;
        hooks pre_call_record_cmd_begin_query, post_call_record_cmd_begin_query(query_pool, query, flags);
        unwrap(query_pool);

    device fn vkCmdEndQuery(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        query: u32
    ) = v1_0.cmd_end_query;
        hooks pre_call_record_cmd_end_query, post_call_record_cmd_end_query(query_pool, query);
        unwrap(query_pool);

    device fn vkCmdResetQueryPool(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32
    ) = v1_0.cmd_reset_query_pool;
        hooks pre_call_record_cmd_reset_query_pool,
            post_call_record_cmd_reset_query_pool(query_pool, first_query, query_count);
        unwrap(query_pool);

    device fn vkCmdWriteTimestamp(
        command_buffer: vk::CommandBuffer,
        pipeline_stage: vk::PipelineStageFlags,
        query_pool: vk::QueryPool,
        query: u32
    ) = v1_0.cmd_write_timestamp;
        hooks pre_call_record_cmd_write_timestamp,
            post_call_record_cmd_write_timestamp(pipeline_stage, query_pool, query);
        unwrap(query_pool);

    device fn vkCmdCopyQueryPoolResults(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags
    ) = v1_0.cmd_copy_query_pool_results;
        hooks pre_call_record_cmd_copy_query_pool_results, post_call_record_cmd_copy_query_pool_results(
            query_pool,
            first_query,
            query_count,
            dst_buffer,
            dst_offset,
            stride,
            flags
        );
        unwrap(query_pool, dst_buffer);
}

impl DeviceDispatch {
    forward_create!(create_query_pool, v1_0.create_query_pool, vk::QueryPoolCreateInfo<'_>, vk::QueryPool);
    forward_destroy!(destroy_query_pool, v1_0.destroy_query_pool, vk::QueryPool);
}
