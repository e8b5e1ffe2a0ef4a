//! Device teardown, queue retrieval and submission.

use ash::vk;
use vkl_core::RecordObject;

use crate::context::{self, device_or_return};
use crate::dispatch::DeviceDispatch;
use crate::params::{created, slice};
use crate::safe_struct::{unwrap_handles, unwrap_pnext_chain, unwrap_structs, Scratch};

// ── Device ──────────────────────────────────────────────────

pub unsafe extern "system" fn vkDestroyDevice(
    device: vk::Device,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        if device == vk::Device::null() {
            return;
        }
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyDevice");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_device(device, &record));
        (ctx.dispatch.v1_0.destroy_device)(device, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_device(device, &record));

        ctx.handles().destroy_object(device);
        context::unregister_device(device);
        if !ctx.deferred().is_empty() {
            tracing::debug!(
                pending = ctx.deferred().len(),
                "device destroyed with deferred operations never joined"
            );
        }
    }
}

pub unsafe extern "system" fn vkGetDeviceQueue(
    device: vk::Device,
    queue_family_index: u32,
    queue_index: u32,
    p_queue: *mut vk::Queue,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkGetDeviceQueue");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_device_queue(device, queue_family_index, queue_index, &record));
        ctx.dispatch
            .get_device_queue(device, queue_family_index, queue_index, p_queue);
        let queue = created(&record, p_queue);
        ctx.chain.post(|vo| {
            vo.post_call_record_get_device_queue(device, queue_family_index, queue_index, queue, &record)
        });
    }
}

pub unsafe extern "system" fn vkGetDeviceQueue2(
    device: vk::Device,
    p_queue_info: *const vk::DeviceQueueInfo2<'_>,
    p_queue: *mut vk::Queue,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let queue_info = &*p_queue_info;
        let record = RecordObject::new("vkGetDeviceQueue2");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_device_queue2(device, queue_info, &record));
        (ctx.dispatch.v1_1.get_device_queue2)(device, p_queue_info, p_queue);
        if !p_queue.is_null() && *p_queue != vk::Queue::null() {
            ctx.handles().create_object(*p_queue);
        }
        let queue = created(&record, p_queue);
        ctx.chain
            .post(|vo| vo.post_call_record_get_device_queue2(device, queue_info, queue, &record));
    }
}

pub unsafe extern "system" fn vkDeviceWaitIdle(device: vk::Device) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkDeviceWaitIdle");
        ctx.chain.pre(|vo| vo.pre_call_record_device_wait_idle(device, &record));
        record.result = (ctx.dispatch.v1_0.device_wait_idle)(device);
        ctx.chain.post(|vo| vo.post_call_record_device_wait_idle(device, &record));
        record.result
    }
}

// ── Queue ───────────────────────────────────────────────────

pub unsafe extern "system" fn vkQueueWaitIdle(queue: vk::Queue) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(queue, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkQueueWaitIdle");
        ctx.chain.pre(|vo| vo.pre_call_record_queue_wait_idle(queue, &record));
        record.result = (ctx.dispatch.v1_0.queue_wait_idle)(queue);
        ctx.chain.post(|vo| vo.post_call_record_queue_wait_idle(queue, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkQueueSubmit(
    queue: vk::Queue,
    submit_count: u32,
    p_submits: *const vk::SubmitInfo<'_>,
    fence: vk::Fence,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(queue, vk::Result::ERROR_INITIALIZATION_FAILED);
        let submits = slice(p_submits, submit_count);
        let mut record = RecordObject::new("vkQueueSubmit");
        ctx.chain.pre(|vo| vo.pre_call_record_queue_submit(queue, submits, fence, &record));
        record.result = ctx.dispatch.queue_submit(queue, submit_count, p_submits, fence);
        ctx.chain.post(|vo| vo.post_call_record_queue_submit(queue, submits, fence, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkQueueBindSparse(
    queue: vk::Queue,
    bind_info_count: u32,
    p_bind_info: *const vk::BindSparseInfo<'_>,
    fence: vk::Fence,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(queue, vk::Result::ERROR_INITIALIZATION_FAILED);
        let bind_infos = slice(p_bind_info, bind_info_count);
        let mut record = RecordObject::new("vkQueueBindSparse");
        ctx.chain
            .pre(|vo| vo.pre_call_record_queue_bind_sparse(queue, bind_infos, fence, &record));
        record.result = ctx
            .dispatch
            .queue_bind_sparse(queue, bind_info_count, p_bind_info, fence);
        ctx.chain
            .post(|vo| vo.post_call_record_queue_bind_sparse(queue, bind_infos, fence, &record));
        record.result
    }
}

impl DeviceDispatch {
    pub unsafe fn get_device_queue(
        &self,
        device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
        p_queue: *mut vk::Queue,
    ) {
        unsafe {
            (self.v1_0.get_device_queue)(device, queue_family_index, queue_index, p_queue);
            if !p_queue.is_null() {
                self.handles.create_object(*p_queue);
            }
        }
    }

    pub unsafe fn queue_submit(
        &self,
        queue: vk::Queue,
        submit_count: u32,
        p_submits: *const vk::SubmitInfo<'_>,
        fence: vk::Fence,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let submits = self.local_array(&mut scratch, p_submits, submit_count, |handles, s, submit| {
                submit.p_next = unwrap_pnext_chain(handles, s, submit.p_next);
                submit.p_wait_semaphores =
                    unwrap_handles(handles, s, submit.p_wait_semaphores, submit.wait_semaphore_count);
                submit.p_signal_semaphores =
                    unwrap_handles(handles, s, submit.p_signal_semaphores, submit.signal_semaphore_count);
            });
            (self.v1_0.queue_submit)(queue, submit_count, submits, self.unwrap(fence))
        }
    }

    /// Sparse binds nest two levels of arrays, each naming a resource and
    /// the memory bound to it.
    pub unsafe fn queue_bind_sparse(
        &self,
        queue: vk::Queue,
        bind_info_count: u32,
        p_bind_info: *const vk::BindSparseInfo<'_>,
        fence: vk::Fence,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let bind_infos = self.local_array(&mut scratch, p_bind_info, bind_info_count, |handles, s, info| {
                info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
                info.p_wait_semaphores =
                    unwrap_handles(handles, s, info.p_wait_semaphores, info.wait_semaphore_count);
                info.p_signal_semaphores =
                    unwrap_handles(handles, s, info.p_signal_semaphores, info.signal_semaphore_count);
                info.p_buffer_binds = unwrap_structs(s, info.p_buffer_binds, info.buffer_bind_count, |s, bind| {
                    bind.buffer = handles.unwrap_handle(bind.buffer);
                    bind.p_binds = unwrap_structs(s, bind.p_binds, bind.bind_count, |_, range| {
                        range.memory = handles.unwrap_handle(range.memory);
                    });
                });
                info.p_image_opaque_binds = unwrap_structs(
                    s,
                    info.p_image_opaque_binds,
                    info.image_opaque_bind_count,
                    |s, bind| {
                        bind.image = handles.unwrap_handle(bind.image);
                        bind.p_binds = unwrap_structs(s, bind.p_binds, bind.bind_count, |_, range| {
                            range.memory = handles.unwrap_handle(range.memory);
                        });
                    },
                );
                info.p_image_binds = unwrap_structs(s, info.p_image_binds, info.image_bind_count, |s, bind| {
                    bind.image = handles.unwrap_handle(bind.image);
                    bind.p_binds = unwrap_structs(s, bind.p_binds, bind.bind_count, |_, range| {
                        range.memory = handles.unwrap_handle(range.memory);
                    });
                });
            });
            (self.v1_0.queue_bind_sparse)(queue, bind_info_count, bind_infos, self.unwrap(fence))
        }
    }
}
