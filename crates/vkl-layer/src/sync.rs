//! Fences, semaphores and events.

use ash::vk;
use vkl_core::RecordObject;

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_destroy, forward_intercepts, DeviceDispatch};
use crate::params::{array_ptr, created, slice, unwrap_array};

// ── Fence ───────────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateFence(
    device: vk::Device,
    p_create_info: *const vk::FenceCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_fence: *mut vk::Fence,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateFence");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_fence(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_fence(device, p_create_info, p_allocator, p_fence);
        let fence = created(&record, p_fence);
        ctx.chain
            .post(|vo| vo.post_call_record_create_fence(device, create_info, fence, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyFence(
    device: vk::Device,
    fence: vk::Fence,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyFence");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_fence(device, fence, &record));
        ctx.dispatch.destroy_fence(device, fence, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_fence(device, fence, &record));
    }
}

pub unsafe extern "system" fn vkResetFences(
    device: vk::Device,
    fence_count: u32,
    p_fences: *const vk::Fence,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let fences = slice(p_fences, fence_count);
        let mut record = RecordObject::new("vkResetFences");
        ctx.chain.pre(|vo| vo.pre_call_record_reset_fences(device, fences, &record));
        record.result = ctx.dispatch.reset_fences(device, fence_count, p_fences);
        ctx.chain.post(|vo| vo.post_call_record_reset_fences(device, fences, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkGetFenceStatus(device: vk::Device, fence: vk::Fence) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkGetFenceStatus");
        ctx.chain.pre(|vo| vo.pre_call_record_get_fence_status(device, fence, &record));
        record.result = (ctx.dispatch.v1_0.get_fence_status)(device, ctx.dispatch.unwrap(fence));
        ctx.chain.post(|vo| vo.post_call_record_get_fence_status(device, fence, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkWaitForFences(
    device: vk::Device,
    fence_count: u32,
    p_fences: *const vk::Fence,
    wait_all: vk::Bool32,
    timeout: u64,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let fences = slice(p_fences, fence_count);
        let all = wait_all != vk::FALSE;
        let mut record = RecordObject::new("vkWaitForFences");
        ctx.chain
            .pre(|vo| vo.pre_call_record_wait_for_fences(device, fences, all, timeout, &record));
        record.result = ctx
            .dispatch
            .wait_for_fences(device, fence_count, p_fences, wait_all, timeout);
        ctx.chain
            .post(|vo| vo.post_call_record_wait_for_fences(device, fences, all, timeout, &record));
        record.result
    }
}

// ── Semaphore ───────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateSemaphore(
    device: vk::Device,
    p_create_info: *const vk::SemaphoreCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_semaphore: *mut vk::Semaphore,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateSemaphore");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_semaphore(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_semaphore(device, p_create_info, p_allocator, p_semaphore);
        let semaphore = created(&record, p_semaphore);
        ctx.chain
            .post(|vo| vo.post_call_record_create_semaphore(device, create_info, semaphore, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkDestroySemaphore(
    device: vk::Device,
    semaphore: vk::Semaphore,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroySemaphore");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_semaphore(device, semaphore, &record));
        ctx.dispatch.destroy_semaphore(device, semaphore, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_semaphore(device, semaphore, &record));
    }
}

// ── Event ───────────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateEvent(
    device: vk::Device,
    p_create_info: *const vk::EventCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_event: *mut vk::Event,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateEvent");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_event(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_event(device, p_create_info, p_allocator, p_event);
        let event = created(&record, p_event);
        ctx.chain
            .post(|vo| vo.post_call_record_create_event(device, create_info, event, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyEvent(
    device: vk::Device,
    event: vk::Event,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyEvent");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_event(device, event, &record));
        ctx.dispatch.destroy_event(device, event, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_event(device, event, &record));
    }
}

forward_intercepts! {
    device fn vkGetEventStatus(device: vk::Device, event: vk::Event) -> vk::Result
        = v1_0.get_event_status;
        hooks pre_call_record_get_event_status, post_call_record_get_event_status(event);
        unwrap(event);

    device fn vkSetEvent(device: vk::Device, event: vk::Event) -> vk::Result
        = v1_0.set_event;
        hooks pre_call_record_set_event, post_call_record_set_event(event);
        unwrap(event);

    device fn vkResetEvent(device: vk::Device, event: vk::Event) -> vk::Result
        = v1_0.reset_event;
        hooks pre_call_record_reset_event, post_call_record_reset_event(event);
        unwrap(event);
}

impl DeviceDispatch {
    forward_create!(create_fence, v1_0.create_fence, vk::FenceCreateInfo<'_>, vk::Fence);
    forward_destroy!(destroy_fence, v1_0.destroy_fence, vk::Fence);
    forward_create!(create_semaphore, v1_0.create_semaphore, vk::SemaphoreCreateInfo<'_>, vk::Semaphore);
    forward_destroy!(destroy_semaphore, v1_0.destroy_semaphore, vk::Semaphore);
    forward_create!(create_event, v1_0.create_event, vk::EventCreateInfo<'_>, vk::Event);
    forward_destroy!(destroy_event, v1_0.destroy_event, vk::Event);

    pub unsafe fn reset_fences(
        &self,
        device: vk::Device,
        fence_count: u32,
        p_fences: *const vk::Fence,
    ) -> vk::Result {
        unsafe {
            if !self.handles.wrapping_enabled() {
                return (self.v1_0.reset_fences)(device, fence_count, p_fences);
            }
            let fences = unwrap_array(&self.handles, p_fences, fence_count);
            (self.v1_0.reset_fences)(device, fence_count, array_ptr(p_fences, &fences))
        }
    }

    pub unsafe fn wait_for_fences(
        &self,
        device: vk::Device,
        fence_count: u32,
        p_fences: *const vk::Fence,
        wait_all: vk::Bool32,
        timeout: u64,
    ) -> vk::Result {
        unsafe {
            if !self.handles.wrapping_enabled() {
                return (self.v1_0.wait_for_fences)(device, fence_count, p_fences, wait_all, timeout);
            }
            let fences = unwrap_array(&self.handles, p_fences, fence_count);
            (self.v1_0.wait_for_fences)(
                device,
                fence_count,
                array_ptr(p_fences, &fences),
                wait_all,
                timeout,
            )
        }
    }
}
