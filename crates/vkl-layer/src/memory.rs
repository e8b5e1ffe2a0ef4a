//! Device memory and buffers.

use std::ffi::c_void;

use ash::vk;
use vkl_core::RecordObject;

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_destroy, forward_intercepts, DeviceDispatch};
use crate::params::{created, slice};
use crate::safe_struct::{unwrap_pnext_chain, Scratch};

// ── Memory ──────────────────────────────────────────────────

pub unsafe extern "system" fn vkAllocateMemory(
    device: vk::Device,
    p_allocate_info: *const vk::MemoryAllocateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_memory: *mut vk::DeviceMemory,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let allocate_info = &*p_allocate_info;
        let mut record = RecordObject::new("vkAllocateMemory");
        ctx.chain
            .pre(|vo| vo.pre_call_record_allocate_memory(device, allocate_info, &record));
        record.result = ctx
            .dispatch
            .allocate_memory(device, p_allocate_info, p_allocator, p_memory);
        let memory = created(&record, p_memory);
        ctx.chain
            .post(|vo| vo.post_call_record_allocate_memory(device, allocate_info, memory, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkFreeMemory(
    device: vk::Device,
    memory: vk::DeviceMemory,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkFreeMemory");
        ctx.chain.pre(|vo| vo.pre_call_record_free_memory(device, memory, &record));
        ctx.dispatch.free_memory(device, memory, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_free_memory(device, memory, &record));
    }
}

pub unsafe extern "system" fn vkMapMemory(
    device: vk::Device,
    memory: vk::DeviceMemory,
    offset: vk::DeviceSize,
    size: vk::DeviceSize,
    flags: vk::MemoryMapFlags,
    pp_data: *mut *mut c_void,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkMapMemory");
        ctx.chain
            .pre(|vo| vo.pre_call_record_map_memory(device, memory, offset, size, flags, &record));
        record.result = (ctx.dispatch.v1_0.map_memory)(
            device,
            ctx.dispatch.unwrap(memory),
            offset,
            size,
            flags,
            pp_data,
        );
        ctx.chain
            .post(|vo| vo.post_call_record_map_memory(device, memory, offset, size, flags, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkUnmapMemory(device: vk::Device, memory: vk::DeviceMemory) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkUnmapMemory");
        ctx.chain.pre(|vo| vo.pre_call_record_unmap_memory(device, memory, &record));
        (ctx.dispatch.v1_0.unmap_memory)(device, ctx.dispatch.unwrap(memory));
        ctx.chain.post(|vo| vo.post_call_record_unmap_memory(device, memory, &record));
    }
}

pub unsafe extern "system" fn vkFlushMappedMemoryRanges(
    device: vk::Device,
    memory_range_count: u32,
    p_memory_ranges: *const vk::MappedMemoryRange<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let ranges = slice(p_memory_ranges, memory_range_count);
        let mut record = RecordObject::new("vkFlushMappedMemoryRanges");
        ctx.chain
            .pre(|vo| vo.pre_call_record_flush_mapped_memory_ranges(device, ranges, &record));
        record.result = ctx
            .dispatch
            .flush_mapped_memory_ranges(device, memory_range_count, p_memory_ranges);
        ctx.chain
            .post(|vo| vo.post_call_record_flush_mapped_memory_ranges(device, ranges, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkInvalidateMappedMemoryRanges(
    device: vk::Device,
    memory_range_count: u32,
    p_memory_ranges: *const vk::MappedMemoryRange<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let ranges = slice(p_memory_ranges, memory_range_count);
        let mut record = RecordObject::new("vkInvalidateMappedMemoryRanges");
        ctx.chain
            .pre(|vo| vo.pre_call_record_invalidate_mapped_memory_ranges(device, ranges, &record));
        record.result = ctx
            .dispatch
            .invalidate_mapped_memory_ranges(device, memory_range_count, p_memory_ranges);
        ctx.chain
            .post(|vo| vo.post_call_record_invalidate_mapped_memory_ranges(device, ranges, &record));
        record.result
    }
}

forward_intercepts! {
    device fn vkGetDeviceMemoryCommitment(
        device: vk::Device,
        memory: vk::DeviceMemory,
        p_committed_memory_in_bytes: *mut vk::DeviceSize
    ) = v1_0.get_device_memory_commitment;
        hooks pre_call_record_get_device_memory_commitment, post_call_record_get_device_memory_commitment(memory);
        unwrap(memory);
}

// ── Buffer ──────────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateBuffer(
    device: vk::Device,
    p_create_info: *const vk::BufferCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_buffer: *mut vk::Buffer,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateBuffer");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_buffer(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_buffer(device, p_create_info, p_allocator, p_buffer);
        let buffer = created(&record, p_buffer);
        ctx.chain
            .post(|vo| vo.post_call_record_create_buffer(device, create_info, buffer, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyBuffer(
    device: vk::Device,
    buffer: vk::Buffer,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyBuffer");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_buffer(device, buffer, &record));
        ctx.dispatch.destroy_buffer(device, buffer, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_buffer(device, buffer, &record));
    }
}

pub unsafe extern "system" fn vkBindBufferMemory(
    device: vk::Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    memory_offset: vk::DeviceSize,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkBindBufferMemory");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_bind_buffer_memory(device, buffer, memory, memory_offset, &record)
        });
        record.result = (ctx.dispatch.v1_0.bind_buffer_memory)(
            device,
            ctx.dispatch.unwrap(buffer),
            ctx.dispatch.unwrap(memory),
            memory_offset,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_bind_buffer_memory(device, buffer, memory, memory_offset, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkGetBufferMemoryRequirements(
    device: vk::Device,
    buffer: vk::Buffer,
    p_memory_requirements: *mut vk::MemoryRequirements,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkGetBufferMemoryRequirements");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_buffer_memory_requirements(device, buffer, &record));
        (ctx.dispatch.v1_0.get_buffer_memory_requirements)(
            device,
            ctx.dispatch.unwrap(buffer),
            p_memory_requirements,
        );
        ctx.chain
            .post(|vo| vo.post_call_record_get_buffer_memory_requirements(device, buffer, &record));
    }
}

pub unsafe extern "system" fn vkBindBufferMemory2(
    device: vk::Device,
    bind_info_count: u32,
    p_bind_infos: *const vk::BindBufferMemoryInfo<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let bind_infos = slice(p_bind_infos, bind_info_count);
        let mut record = RecordObject::new("vkBindBufferMemory2");
        ctx.chain
            .pre(|vo| vo.pre_call_record_bind_buffer_memory2(device, bind_infos, &record));
        let mut scratch = Scratch::new();
        let local = ctx
            .dispatch
            .local_array(&mut scratch, p_bind_infos, bind_info_count, |handles, s, info| {
                info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
                info.buffer = handles.unwrap_handle(info.buffer);
                info.memory = handles.unwrap_handle(info.memory);
            });
        record.result = (ctx.dispatch.v1_1.bind_buffer_memory2)(device, bind_info_count, local);
        ctx.chain
            .post(|vo| vo.post_call_record_bind_buffer_memory2(device, bind_infos, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkGetBufferMemoryRequirements2(
    device: vk::Device,
    p_info: *const vk::BufferMemoryRequirementsInfo2<'_>,
    p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let info = &*p_info;
        let record = RecordObject::new("vkGetBufferMemoryRequirements2");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_buffer_memory_requirements2(device, info, &record));
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_info, |handles, s, info| {
            info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
            info.buffer = handles.unwrap_handle(info.buffer);
        });
        (ctx.dispatch.v1_1.get_buffer_memory_requirements2)(device, local, p_memory_requirements);
        ctx.chain
            .post(|vo| vo.post_call_record_get_buffer_memory_requirements2(device, info, &record));
    }
}

// ── Buffer view ─────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateBufferView(
    device: vk::Device,
    p_create_info: *const vk::BufferViewCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_view: *mut vk::BufferView,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateBufferView");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_buffer_view(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_buffer_view(device, p_create_info, p_allocator, p_view);
        let buffer_view = created(&record, p_view);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_buffer_view(device, create_info, buffer_view, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyBufferView(
    device: vk::Device,
    buffer_view: vk::BufferView,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyBufferView");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_buffer_view(device, buffer_view, &record));
        ctx.dispatch.destroy_buffer_view(device, buffer_view, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_buffer_view(device, buffer_view, &record));
    }
}

impl DeviceDispatch {
    forward_create!(create_buffer, v1_0.create_buffer, vk::BufferCreateInfo<'_>, vk::Buffer);
    forward_destroy!(destroy_buffer, v1_0.destroy_buffer, vk::Buffer);
    forward_destroy!(free_memory, v1_0.free_memory, vk::DeviceMemory);
    forward_destroy!(destroy_buffer_view, v1_0.destroy_buffer_view, vk::BufferView);

    pub unsafe fn create_buffer_view(
        &self,
        device: vk::Device,
        p_create_info: *const vk::BufferViewCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_view: *mut vk::BufferView,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.buffer = handles.unwrap_handle(ci.buffer);
            });
            let result = (self.v1_0.create_buffer_view)(device, create_info, p_allocator, p_view);
            self.wrap_created(result, p_view, None);
            result
        }
    }

    pub unsafe fn allocate_memory(
        &self,
        device: vk::Device,
        p_allocate_info: *const vk::MemoryAllocateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_memory: *mut vk::DeviceMemory,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let allocate_info = self.local(&mut scratch, p_allocate_info, |handles, s, ai| {
                ai.p_next = unwrap_pnext_chain(handles, s, ai.p_next);
            });
            let result = (self.v1_0.allocate_memory)(device, allocate_info, p_allocator, p_memory);
            self.wrap_created(result, p_memory, None);
            result
        }
    }

    pub unsafe fn flush_mapped_memory_ranges(
        &self,
        device: vk::Device,
        memory_range_count: u32,
        p_memory_ranges: *const vk::MappedMemoryRange<'_>,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let ranges = self.local_array(&mut scratch, p_memory_ranges, memory_range_count, |handles, _, range| {
                range.memory = handles.unwrap_handle(range.memory);
            });
            (self.v1_0.flush_mapped_memory_ranges)(device, memory_range_count, ranges)
        }
    }

    pub unsafe fn invalidate_mapped_memory_ranges(
        &self,
        device: vk::Device,
        memory_range_count: u32,
        p_memory_ranges: *const vk::MappedMemoryRange<'_>,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let ranges = self.local_array(&mut scratch, p_memory_ranges, memory_range_count, |handles, _, range| {
                range.memory = handles.unwrap_handle(range.memory);
            });
            (self.v1_0.invalidate_mapped_memory_ranges)(device, memory_range_count, ranges)
        }
    }
}
