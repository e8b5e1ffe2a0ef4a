//! Render passes and framebuffers.

use ash::vk;
use vkl_core::RecordObject;

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_destroy, forward_intercepts, DeviceDispatch};
use crate::params::created;
use crate::safe_struct::{unwrap_handles, unwrap_pnext_chain, Scratch};

pub unsafe extern "system" fn vkCreateRenderPass(
    device: vk::Device,
    p_create_info: *const vk::RenderPassCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_render_pass: *mut vk::RenderPass,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateRenderPass");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_render_pass(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_render_pass(device, p_create_info, p_allocator, p_render_pass);
        let render_pass = created(&record, p_render_pass);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_render_pass(device, create_info, render_pass, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyRenderPass(
    device: vk::Device,
    render_pass: vk::RenderPass,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyRenderPass");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_render_pass(device, render_pass, &record));
        ctx.dispatch.destroy_render_pass(device, render_pass, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_render_pass(device, render_pass, &record));
    }
}

pub unsafe extern "system" fn vkCreateFramebuffer(
    device: vk::Device,
    p_create_info: *const vk::FramebufferCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_framebuffer: *mut vk::Framebuffer,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateFramebuffer");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_framebuffer(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_framebuffer(device, p_create_info, p_allocator, p_framebuffer);
        let framebuffer = created(&record, p_framebuffer);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_framebuffer(device, create_info, framebuffer, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyFramebuffer(
    device: vk::Device,
    framebuffer: vk::Framebuffer,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyFramebuffer");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_framebuffer(device, framebuffer, &record));
        ctx.dispatch.destroy_framebuffer(device, framebuffer, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_framebuffer(device, framebuffer, &record));
    }
}

forward_intercepts! {
    device fn vkGetRenderAreaGranularity(
        device: vk::Device,
        render_pass: vk::RenderPass,
        p_granularity: *mut vk::Extent2D
    ) = v1_0.get_render_area_granularity;
        hooks pre_call_record_get_render_area_granularity, post_call_record_get_render_area_granularity(render_pass);
        unwrap(render_pass);
}

impl DeviceDispatch {
    forward_create!(create_render_pass, v1_0.create_render_pass, vk::RenderPassCreateInfo<'_>, vk::RenderPass);
    forward_destroy!(destroy_render_pass, v1_0.destroy_render_pass, vk::RenderPass);
    forward_destroy!(destroy_framebuffer, v1_0.destroy_framebuffer, vk::Framebuffer);

    pub unsafe fn create_framebuffer(
        &self,
        device: vk::Device,
        p_create_info: *const vk::FramebufferCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_framebuffer: *mut vk::Framebuffer,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.render_pass = handles.unwrap_handle(ci.render_pass);
                // Imageless framebuffers ignore the attachment array.
                if !ci.flags.contains(vk::FramebufferCreateFlags::IMAGELESS) {
                    ci.p_attachments = unwrap_handles(handles, s, ci.p_attachments, ci.attachment_count);
                }
            });
            let result = (self.v1_0.create_framebuffer)(device, create_info, p_allocator, p_framebuffer);
            self.wrap_created(result, p_framebuffer, None);
            result
        }
    }
}
