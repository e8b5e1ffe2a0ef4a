//! Deferred host operations, acceleration structures and ray tracing
//! pipelines.
//!
//! A build or pipeline creation that returns `VK_OPERATION_DEFERRED_KHR`
//! keeps running on whatever threads join the operation. The unwrapped
//! parameter copies must outlive the call, and the pipelines it creates only
//! exist once the operation has completed, so both are parked in the
//! device's [`DeferredLedger`](vkl_core::DeferredLedger) and released by the
//! join or result query that observes completion.

use std::ffi::c_void;

use ash::vk;
use ash::vk::Handle;
use vkl_core::{HandleTable, RecordObject};

use crate::context::device_or_return;
use crate::dispatch::{forward_destroy, forward_intercepts, DeviceDispatch};
use crate::params::{created, created_slice, slice};
use crate::pipeline::unwrap_stages;
use crate::safe_struct::{unwrap_handles, unwrap_pnext_chain, unwrap_struct, Scratch};

// ── Deferred operations ─────────────────────────────────────

pub unsafe extern "system" fn vkCreateDeferredOperationKHR(
    device: vk::Device,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_deferred_operation: *mut vk::DeferredOperationKHR,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkCreateDeferredOperationKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_deferred_operation_khr(device, &record));
        record.result = (ctx.dispatch.deferred_host_operations.create_deferred_operation_khr)(
            device,
            p_allocator,
            p_deferred_operation,
        );
        ctx.dispatch
            .wrap_created(record.result, p_deferred_operation, None);
        let operation = created(&record, p_deferred_operation);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_deferred_operation_khr(device, operation, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyDeferredOperationKHR(
    device: vk::Device,
    operation: vk::DeferredOperationKHR,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyDeferredOperationKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_deferred_operation_khr(device, operation, &record));
        ctx.deferred().discard(operation.as_raw());
        ctx.dispatch
            .destroy_deferred_operation_khr(device, operation, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_deferred_operation_khr(device, operation, &record));
    }
}

pub unsafe extern "system" fn vkGetDeferredOperationMaxConcurrencyKHR(
    device: vk::Device,
    operation: vk::DeferredOperationKHR,
) -> u32 {
    unsafe {
        let ctx = device_or_return!(device, 0);
        let record = RecordObject::new("vkGetDeferredOperationMaxConcurrencyKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_get_deferred_operation_max_concurrency_khr(device, operation, &record)
        });
        let concurrency = (ctx
            .dispatch
            .deferred_host_operations
            .get_deferred_operation_max_concurrency_khr)(
            device, ctx.dispatch.unwrap(operation)
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_get_deferred_operation_max_concurrency_khr(device, operation, &record)
        });
        concurrency
    }
}

pub unsafe extern "system" fn vkDeferredOperationJoinKHR(
    device: vk::Device,
    operation: vk::DeferredOperationKHR,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkDeferredOperationJoinKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_deferred_operation_join_khr(device, operation, &record));
        record.result = ctx.dispatch.deferred_operation_join_khr(device, operation);
        ctx.chain
            .post(|vo| vo.post_call_record_deferred_operation_join_khr(device, operation, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkGetDeferredOperationResultKHR(
    device: vk::Device,
    operation: vk::DeferredOperationKHR,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkGetDeferredOperationResultKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_get_deferred_operation_result_khr(device, operation, &record)
        });
        record.result = ctx.dispatch.get_deferred_operation_result_khr(device, operation);
        ctx.chain.post(|vo| {
            vo.post_call_record_get_deferred_operation_result_khr(device, operation, &record)
        });
        record.result
    }
}

// ── Acceleration structures ─────────────────────────────────

pub unsafe extern "system" fn vkCreateAccelerationStructureKHR(
    device: vk::Device,
    p_create_info: *const vk::AccelerationStructureCreateInfoKHR<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_acceleration_structure: *mut vk::AccelerationStructureKHR,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateAccelerationStructureKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_create_acceleration_structure_khr(device, create_info, &record)
        });
        record.result = ctx.dispatch.create_acceleration_structure_khr(
            device,
            p_create_info,
            p_allocator,
            p_acceleration_structure,
        );
        let acceleration_structure = created(&record, p_acceleration_structure);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_acceleration_structure_khr(
                device,
                create_info,
                acceleration_structure,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyAccelerationStructureKHR(
    device: vk::Device,
    acceleration_structure: vk::AccelerationStructureKHR,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyAccelerationStructureKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_destroy_acceleration_structure_khr(device, acceleration_structure, &record)
        });
        ctx.dispatch
            .destroy_acceleration_structure_khr(device, acceleration_structure, p_allocator);
        ctx.chain.post(|vo| {
            vo.post_call_record_destroy_acceleration_structure_khr(device, acceleration_structure, &record)
        });
    }
}

pub unsafe extern "system" fn vkBuildAccelerationStructuresKHR(
    device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    info_count: u32,
    p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
    pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let infos = slice(p_infos, info_count);
        let mut record = RecordObject::new("vkBuildAccelerationStructuresKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_build_acceleration_structures_khr(device, deferred_operation, infos, &record)
        });
        record.result = ctx.dispatch.build_acceleration_structures_khr(
            device,
            deferred_operation,
            info_count,
            p_infos,
            pp_build_range_infos,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_build_acceleration_structures_khr(device, deferred_operation, infos, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkCmdBuildAccelerationStructuresKHR(
    command_buffer: vk::CommandBuffer,
    info_count: u32,
    p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
    pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let infos = slice(p_infos, info_count);
        let record = RecordObject::new("vkCmdBuildAccelerationStructuresKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_build_acceleration_structures_khr(command_buffer, infos, &record)
        });
        let mut scratch = Scratch::new();
        let local = ctx
            .dispatch
            .local_array(&mut scratch, p_infos, info_count, |h, s, i| unsafe { unwrap_build_info(h, s, i) });
        (ctx.dispatch.acceleration_structure.cmd_build_acceleration_structures_khr)(
            command_buffer,
            info_count,
            local,
            pp_build_range_infos,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_build_acceleration_structures_khr(command_buffer, infos, &record)
        });
    }
}

pub unsafe extern "system" fn vkCmdBuildAccelerationStructuresIndirectKHR(
    command_buffer: vk::CommandBuffer,
    info_count: u32,
    p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
    p_indirect_device_addresses: *const vk::DeviceAddress,
    p_indirect_strides: *const u32,
    pp_max_primitive_counts: *const *const u32,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let infos = slice(p_infos, info_count);
        let record = RecordObject::new("vkCmdBuildAccelerationStructuresIndirectKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_build_acceleration_structures_indirect_khr(command_buffer, infos, &record)
        });
        let mut scratch = Scratch::new();
        let local = ctx
            .dispatch
            .local_array(&mut scratch, p_infos, info_count, |h, s, i| unsafe { unwrap_build_info(h, s, i) });
        (ctx
            .dispatch
            .acceleration_structure
            .cmd_build_acceleration_structures_indirect_khr)(
            command_buffer,
            info_count,
            local,
            p_indirect_device_addresses,
            p_indirect_strides,
            pp_max_primitive_counts,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_build_acceleration_structures_indirect_khr(command_buffer, infos, &record)
        });
    }
}

pub unsafe extern "system" fn vkCopyAccelerationStructureKHR(
    device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    p_info: *const vk::CopyAccelerationStructureInfoKHR<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let info = &*p_info;
        let mut record = RecordObject::new("vkCopyAccelerationStructureKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_copy_acceleration_structure_khr(device, deferred_operation, info, &record)
        });
        let d = &ctx.dispatch;
        let mut scratch = Box::new(Scratch::new());
        let local = d.local(&mut scratch, p_info, |handles, s, copy| {
            copy.p_next = unwrap_pnext_chain(handles, s, copy.p_next);
            copy.src = handles.unwrap_handle(copy.src);
            copy.dst = handles.unwrap_handle(copy.dst);
        });
        record.result = (d.acceleration_structure.copy_acceleration_structure_khr)(
            device,
            d.unwrap(deferred_operation),
            local,
        );
        d.keep_until_complete(record.result, deferred_operation, scratch);
        ctx.chain.post(|vo| {
            vo.post_call_record_copy_acceleration_structure_khr(device, deferred_operation, info, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkCopyAccelerationStructureToMemoryKHR(
    device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    p_info: *const vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let info = &*p_info;
        let mut record = RecordObject::new("vkCopyAccelerationStructureToMemoryKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_copy_acceleration_structure_to_memory_khr(
                device,
                deferred_operation,
                info,
                &record,
            )
        });
        let d = &ctx.dispatch;
        let mut scratch = Box::new(Scratch::new());
        let local = d.local(&mut scratch, p_info, |handles, s, copy| {
            copy.p_next = unwrap_pnext_chain(handles, s, copy.p_next);
            copy.src = handles.unwrap_handle(copy.src);
        });
        record.result = (d.acceleration_structure.copy_acceleration_structure_to_memory_khr)(
            device,
            d.unwrap(deferred_operation),
            local,
        );
        d.keep_until_complete(record.result, deferred_operation, scratch);
        ctx.chain.post(|vo| {
            vo.post_call_record_copy_acceleration_structure_to_memory_khr(
                device,
                deferred_operation,
                info,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkCopyMemoryToAccelerationStructureKHR(
    device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    p_info: *const vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let info = &*p_info;
        let mut record = RecordObject::new("vkCopyMemoryToAccelerationStructureKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_copy_memory_to_acceleration_structure_khr(
                device,
                deferred_operation,
                info,
                &record,
            )
        });
        let d = &ctx.dispatch;
        let mut scratch = Box::new(Scratch::new());
        let local = d.local(&mut scratch, p_info, |handles, s, copy| {
            copy.p_next = unwrap_pnext_chain(handles, s, copy.p_next);
            copy.dst = handles.unwrap_handle(copy.dst);
        });
        record.result = (d.acceleration_structure.copy_memory_to_acceleration_structure_khr)(
            device,
            d.unwrap(deferred_operation),
            local,
        );
        d.keep_until_complete(record.result, deferred_operation, scratch);
        ctx.chain.post(|vo| {
            vo.post_call_record_copy_memory_to_acceleration_structure_khr(
                device,
                deferred_operation,
                info,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkWriteAccelerationStructuresPropertiesKHR(
    device: vk::Device,
    acceleration_structure_count: u32,
    p_acceleration_structures: *const vk::AccelerationStructureKHR,
    query_type: vk::QueryType,
    data_size: usize,
    p_data: *mut c_void,
    stride: usize,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let acceleration_structures = slice(p_acceleration_structures, acceleration_structure_count);
        let mut record = RecordObject::new("vkWriteAccelerationStructuresPropertiesKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_write_acceleration_structures_properties_khr(
                device,
                acceleration_structures,
                query_type,
                &record,
            )
        });
        let mut scratch = Scratch::new();
        let native = ctx.dispatch.local_handles(
            &mut scratch,
            p_acceleration_structures,
            acceleration_structure_count,
        );
        record.result = (ctx
            .dispatch
            .acceleration_structure
            .write_acceleration_structures_properties_khr)(
            device,
            acceleration_structure_count,
            native,
            query_type,
            data_size,
            p_data,
            stride,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_write_acceleration_structures_properties_khr(
                device,
                acceleration_structures,
                query_type,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkCmdCopyAccelerationStructureKHR(
    command_buffer: vk::CommandBuffer,
    p_info: *const vk::CopyAccelerationStructureInfoKHR<'_>,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let info = &*p_info;
        let record = RecordObject::new("vkCmdCopyAccelerationStructureKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_cmd_copy_acceleration_structure_khr(command_buffer, info, &record));
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_info, |handles, s, copy| {
            copy.p_next = unwrap_pnext_chain(handles, s, copy.p_next);
            copy.src = handles.unwrap_handle(copy.src);
            copy.dst = handles.unwrap_handle(copy.dst);
        });
        (ctx.dispatch.acceleration_structure.cmd_copy_acceleration_structure_khr)(command_buffer, local);
        ctx.chain
            .post(|vo| vo.post_call_record_cmd_copy_acceleration_structure_khr(command_buffer, info, &record));
    }
}

pub unsafe extern "system" fn vkCmdCopyAccelerationStructureToMemoryKHR(
    command_buffer: vk::CommandBuffer,
    p_info: *const vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let info = &*p_info;
        let record = RecordObject::new("vkCmdCopyAccelerationStructureToMemoryKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_copy_acceleration_structure_to_memory_khr(command_buffer, info, &record)
        });
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_info, |handles, s, copy| {
            copy.p_next = unwrap_pnext_chain(handles, s, copy.p_next);
            copy.src = handles.unwrap_handle(copy.src);
        });
        (ctx
            .dispatch
            .acceleration_structure
            .cmd_copy_acceleration_structure_to_memory_khr)(command_buffer, local);
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_copy_acceleration_structure_to_memory_khr(command_buffer, info, &record)
        });
    }
}

pub unsafe extern "system" fn vkCmdCopyMemoryToAccelerationStructureKHR(
    command_buffer: vk::CommandBuffer,
    p_info: *const vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let info = &*p_info;
        let record = RecordObject::new("vkCmdCopyMemoryToAccelerationStructureKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_copy_memory_to_acceleration_structure_khr(command_buffer, info, &record)
        });
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_info, |handles, s, copy| {
            copy.p_next = unwrap_pnext_chain(handles, s, copy.p_next);
            copy.dst = handles.unwrap_handle(copy.dst);
        });
        (ctx
            .dispatch
            .acceleration_structure
            .cmd_copy_memory_to_acceleration_structure_khr)(command_buffer, local);
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_copy_memory_to_acceleration_structure_khr(command_buffer, info, &record)
        });
    }
}

pub unsafe extern "system" fn vkGetAccelerationStructureDeviceAddressKHR(
    device: vk::Device,
    p_info: *const vk::AccelerationStructureDeviceAddressInfoKHR<'_>,
) -> vk::DeviceAddress {
    unsafe {
        let ctx = device_or_return!(device, 0);
        let info = &*p_info;
        let record = RecordObject::new("vkGetAccelerationStructureDeviceAddressKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_get_acceleration_structure_device_address_khr(device, info, &record)
        });
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_info, |handles, s, query| {
            query.p_next = unwrap_pnext_chain(handles, s, query.p_next);
            query.acceleration_structure = handles.unwrap_handle(query.acceleration_structure);
        });
        let address = (ctx
            .dispatch
            .acceleration_structure
            .get_acceleration_structure_device_address_khr)(device, local);
        ctx.chain.post(|vo| {
            vo.post_call_record_get_acceleration_structure_device_address_khr(device, info, &record)
        });
        address
    }
}

pub unsafe extern "system" fn vkCmdWriteAccelerationStructuresPropertiesKHR(
    command_buffer: vk::CommandBuffer,
    acceleration_structure_count: u32,
    p_acceleration_structures: *const vk::AccelerationStructureKHR,
    query_type: vk::QueryType,
    query_pool: vk::QueryPool,
    first_query: u32,
) {
    unsafe {
        let ctx = device_or_return!(command_buffer);
        let acceleration_structures = slice(p_acceleration_structures, acceleration_structure_count);
        let record = RecordObject::new("vkCmdWriteAccelerationStructuresPropertiesKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_cmd_write_acceleration_structures_properties_khr(
                command_buffer,
                acceleration_structures,
                query_type,
                query_pool,
                first_query,
                &record,
            )
        });
        let d = &ctx.dispatch;
        let mut scratch = Scratch::new();
        let native = d.local_handles(&mut scratch, p_acceleration_structures, acceleration_structure_count);
        (d.acceleration_structure.cmd_write_acceleration_structures_properties_khr)(
            command_buffer,
            acceleration_structure_count,
            native,
            query_type,
            d.unwrap(query_pool),
            first_query,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_cmd_write_acceleration_structures_properties_khr(
                command_buffer,
                acceleration_structures,
                query_type,
                query_pool,
                first_query,
                &record,
            )
        });
    }
}

pub unsafe extern "system" fn vkGetAccelerationStructureBuildSizesKHR(
    device: vk::Device,
    build_type: vk::AccelerationStructureBuildTypeKHR,
    p_build_info: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
    p_max_primitive_counts: *const u32,
    p_size_info: *mut vk::AccelerationStructureBuildSizesInfoKHR<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let build_info = &*p_build_info;
        let record = RecordObject::new("vkGetAccelerationStructureBuildSizesKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_get_acceleration_structure_build_sizes_khr(device, build_type, build_info, &record)
        });
        // The size query ignores the structures named in the build info, so
        // only the chain is unwrapped.
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_build_info, |handles, s, info| {
            info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
        });
        (ctx
            .dispatch
            .acceleration_structure
            .get_acceleration_structure_build_sizes_khr)(
            device,
            build_type,
            local,
            p_max_primitive_counts,
            p_size_info,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_get_acceleration_structure_build_sizes_khr(device, build_type, build_info, &record)
        });
    }
}

// ── Ray tracing pipelines ───────────────────────────────────

pub unsafe extern "system" fn vkCreateRayTracingPipelinesKHR(
    device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    pipeline_cache: vk::PipelineCache,
    create_info_count: u32,
    p_create_infos: *const vk::RayTracingPipelineCreateInfoKHR<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_pipelines: *mut vk::Pipeline,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_infos = slice(p_create_infos, create_info_count);
        let mut record = RecordObject::new("vkCreateRayTracingPipelinesKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_create_ray_tracing_pipelines_khr(
                device,
                deferred_operation,
                pipeline_cache,
                create_infos,
                &record,
            )
        });
        record.result = ctx.dispatch.create_ray_tracing_pipelines_khr(
            device,
            deferred_operation,
            pipeline_cache,
            create_info_count,
            p_create_infos,
            p_allocator,
            p_pipelines,
        );
        let pipelines = created_slice(&record, p_pipelines, create_info_count);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_ray_tracing_pipelines_khr(
                device,
                deferred_operation,
                pipeline_cache,
                create_infos,
                pipelines,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkGetRayTracingShaderGroupStackSizeKHR(
    device: vk::Device,
    pipeline: vk::Pipeline,
    group: u32,
    group_shader: vk::ShaderGroupShaderKHR,
) -> vk::DeviceSize {
    unsafe {
        let ctx = device_or_return!(device, 0);
        let record = RecordObject::new("vkGetRayTracingShaderGroupStackSizeKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_get_ray_tracing_shader_group_stack_size_khr(
                device,
                pipeline,
                group,
                group_shader,
                &record,
            )
        });
        let size = (ctx
            .dispatch
            .ray_tracing_pipeline
            .get_ray_tracing_shader_group_stack_size_khr)(
            device,
            ctx.dispatch.unwrap(pipeline),
            group,
            group_shader,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_get_ray_tracing_shader_group_stack_size_khr(
                device,
                pipeline,
                group,
                group_shader,
                &record,
            )
        });
        size
    }
}

forward_intercepts! {
    device fn vkCmdTraceRaysKHR(
        command_buffer: vk::CommandBuffer,
        p_raygen_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_miss_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_hit_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_callable_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        width: u32,
        height: u32,
        depth: u32
    ) = ray_tracing_pipeline.cmd_trace_rays_khr;
        hooks pre_call_record_cmd_trace_rays_khr, post_call_record_cmd_trace_rays_khr(width, height, depth);
        unwrap();

    device fn vkCmdTraceRaysIndirectKHR(
        command_buffer: vk::CommandBuffer,
        p_raygen_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_miss_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_hit_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_callable_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        indirect_device_address: vk::DeviceAddress
    ) = ray_tracing_pipeline.cmd_trace_rays_indirect_khr;
        hooks pre_call_record_cmd_trace_rays_indirect_khr,
            post_call_record_cmd_trace_rays_indirect_khr(indirect_device_address);
        unwrap();

    device fn vkGetRayTracingShaderGroupHandlesKHR(
        device: vk::Device,
        pipeline: vk::Pipeline,
        first_group: u32,
        group_count: u32,
        data_size: usize,
        p_data: *mut c_void
    ) -> vk::Result = ray_tracing_pipeline.get_ray_tracing_shader_group_handles_khr;
        hooks pre_call_record_get_ray_tracing_shader_group_handles_khr,
            post_call_record_get_ray_tracing_shader_group_handles_khr(pipeline, first_group, group_count);
        unwrap(pipeline);

    device fn vkGetRayTracingCaptureReplayShaderGroupHandlesKHR(
        device: vk::Device,
        pipeline: vk::Pipeline,
        first_group: u32,
        group_count: u32,
        data_size: usize,
        p_data: *mut c_void
    ) -> vk::Result = ray_tracing_pipeline.get_ray_tracing_capture_replay_shader_group_handles_khr;
        hooks pre_call_record_get_ray_tracing_capture_replay_shader_group_handles_khr,
            post_call_record_get_ray_tracing_capture_replay_shader_group_handles_khr(
                pipeline,
                first_group,
                group_count
            );
        unwrap(pipeline);

    device fn vkCmdSetRayTracingPipelineStackSizeKHR(
        command_buffer: vk::CommandBuffer,
        pipeline_stack_size: u32
    ) = ray_tracing_pipeline.cmd_set_ray_tracing_pipeline_stack_size_khr;
        hooks pre_call_record_cmd_set_ray_tracing_pipeline_stack_size_khr,
            post_call_record_cmd_set_ray_tracing_pipeline_stack_size_khr(pipeline_stack_size);
        unwrap();
}

/// The application's output array for pipelines a deferred operation has
/// yet to write.
struct OutputSlot {
    ptr: *mut vk::Pipeline,
    count: u32,
}

// The application keeps the array alive and untouched until the operation
// completes; only the completing thread writes it.
unsafe impl Send for OutputSlot {}

unsafe fn unwrap_build_info(
    handles: &HandleTable,
    scratch: &mut Scratch,
    info: &mut vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
) {
    unsafe {
        info.p_next = unwrap_pnext_chain(handles, scratch, info.p_next);
        info.src_acceleration_structure = handles.unwrap_handle(info.src_acceleration_structure);
        info.dst_acceleration_structure = handles.unwrap_handle(info.dst_acceleration_structure);
    }
}

impl DeviceDispatch {
    forward_destroy!(destroy_deferred_operation_khr, deferred_host_operations.destroy_deferred_operation_khr, vk::DeferredOperationKHR);
    forward_destroy!(destroy_acceleration_structure_khr, acceleration_structure.destroy_acceleration_structure_khr, vk::AccelerationStructureKHR);

    /// Join the operation. When the join finishes it, the terminal result
    /// decides whether parked outputs are created.
    pub unsafe fn deferred_operation_join_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
    ) -> vk::Result {
        unsafe {
            let native = self.unwrap(operation);
            let result = (self.deferred_host_operations.deferred_operation_join_khr)(device, native);
            if result == vk::Result::SUCCESS {
                let terminal =
                    (self.deferred_host_operations.get_deferred_operation_result_khr)(device, native);
                self.deferred.complete(operation.as_raw(), terminal.as_raw() >= 0);
            }
            result
        }
    }

    pub unsafe fn get_deferred_operation_result_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
    ) -> vk::Result {
        unsafe {
            let result = (self.deferred_host_operations.get_deferred_operation_result_khr)(
                device,
                self.unwrap(operation),
            );
            if result != vk::Result::NOT_READY {
                self.deferred.complete(operation.as_raw(), result.as_raw() >= 0);
            }
            result
        }
    }

    pub unsafe fn create_acceleration_structure_khr(
        &self,
        device: vk::Device,
        p_create_info: *const vk::AccelerationStructureCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_acceleration_structure: *mut vk::AccelerationStructureKHR,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.buffer = handles.unwrap_handle(ci.buffer);
            });
            let result = (self.acceleration_structure.create_acceleration_structure_khr)(
                device,
                create_info,
                p_allocator,
                p_acceleration_structure,
            );
            self.wrap_created(result, p_acceleration_structure, None);
            result
        }
    }

    pub unsafe fn build_acceleration_structures_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        info_count: u32,
        p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
        pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Box::new(Scratch::new());
            let infos = self.local_array(&mut scratch, p_infos, info_count, |h, s, i| unsafe { unwrap_build_info(h, s, i) });
            let result = (self.acceleration_structure.build_acceleration_structures_khr)(
                device,
                self.unwrap(deferred_operation),
                info_count,
                infos,
                pp_build_range_infos,
            );
            self.keep_until_complete(result, deferred_operation, scratch);
            result
        }
    }

    /// Park the unwrapped copies of a deferred call's parameters until the
    /// operation completes. The driver keeps reading them until then, so the
    /// scratch was boxed before any copy was taken.
    pub(crate) fn keep_until_complete(
        &self,
        result: vk::Result,
        deferred_operation: vk::DeferredOperationKHR,
        scratch: Box<Scratch>,
    ) {
        if result == vk::Result::OPERATION_DEFERRED_KHR && !scratch.is_empty() {
            self.deferred.on_completion(
                deferred_operation.as_raw(),
                Box::new(move || drop(scratch)),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub unsafe fn create_ray_tracing_pipelines_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::RayTracingPipelineCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Box::new(Scratch::new());
            let create_infos = self.local_array(&mut scratch, p_create_infos, create_info_count, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.p_stages = unwrap_stages(handles, s, ci.p_stages, ci.stage_count);
                ci.p_library_info = unwrap_struct(s, ci.p_library_info, |s, library| {
                    library.p_libraries =
                        unwrap_handles(handles, s, library.p_libraries, library.library_count);
                });
                ci.layout = handles.unwrap_handle(ci.layout);
                ci.base_pipeline_handle = handles.unwrap_handle(ci.base_pipeline_handle);
            });
            let result = (self.ray_tracing_pipeline.create_ray_tracing_pipelines_khr)(
                device,
                self.unwrap(deferred_operation),
                self.unwrap(pipeline_cache),
                create_info_count,
                create_infos,
                p_allocator,
                p_pipelines,
            );

            if result == vk::Result::OPERATION_DEFERRED_KHR {
                let key = deferred_operation.as_raw();
                self.deferred.on_completion(key, Box::new(move || drop(scratch)));

                let handles = self.handles.clone();
                let slot = OutputSlot {
                    ptr: p_pipelines,
                    count: create_info_count,
                };
                self.deferred.on_outputs(
                    key,
                    Box::new(move || {
                        let slot = slot;
                        let mut created = Vec::with_capacity(slot.count as usize);
                        for i in 0..slot.count as usize {
                            // SAFETY: the application keeps `pPipelines` valid
                            // until the operation completes.
                            let entry = unsafe { &mut *slot.ptr.add(i) };
                            if entry.as_raw() != 0 {
                                *entry = handles.wrap_new(*entry, None);
                                created.push(entry.as_raw());
                            }
                        }
                        created
                    }),
                );
            } else if result.as_raw() >= 0 {
                self.wrap_created_array(p_pipelines, create_info_count, None);
            }
            result
        }
    }
}
