//! Images, image views, samplers and sampler Y'CbCr conversions.

use ash::vk;
use vkl_core::RecordObject;

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_destroy, forward_intercepts, DeviceDispatch};
use crate::params::{created, slice};
use crate::safe_struct::{unwrap_pnext_chain, Scratch};

// ── Image ───────────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateImage(
    device: vk::Device,
    p_create_info: *const vk::ImageCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_image: *mut vk::Image,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateImage");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_image(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_image(device, p_create_info, p_allocator, p_image);
        let image = created(&record, p_image);
        ctx.chain
            .post(|vo| vo.post_call_record_create_image(device, create_info, image, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyImage(
    device: vk::Device,
    image: vk::Image,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyImage");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_image(device, image, &record));
        ctx.dispatch.destroy_image(device, image, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_image(device, image, &record));
    }
}

pub unsafe extern "system" fn vkBindImageMemory(
    device: vk::Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    memory_offset: vk::DeviceSize,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkBindImageMemory");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_bind_image_memory(device, image, memory, memory_offset, &record)
        });
        record.result = (ctx.dispatch.v1_0.bind_image_memory)(
            device,
            ctx.dispatch.unwrap(image),
            ctx.dispatch.unwrap(memory),
            memory_offset,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_bind_image_memory(device, image, memory, memory_offset, &record)
        });
        record.result
    }
}

forward_intercepts! {
    device fn vkGetImageMemoryRequirements(
        device: vk::Device,
        image: vk::Image,
        p_memory_requirements: *mut vk::MemoryRequirements
    ) = v1_0.get_image_memory_requirements;
        hooks pre_call_record_get_image_memory_requirements, post_call_record_get_image_memory_requirements(image);
        unwrap(image);

    device fn vkGetImageSparseMemoryRequirements(
        device: vk::Device,
        image: vk::Image,
        p_sparse_memory_requirement_count: *mut u32,
        p_sparse_memory_requirements: *mut vk::SparseImageMemoryRequirements
    ) = v1_0.get_image_sparse_memory_requirements;
        hooks pre_call_record_get_image_sparse_memory_requirements,
            post_call_record_get_image_sparse_memory_requirements(image);
        unwrap(image);

    device fn vkGetImageSubresourceLayout(
        device: vk::Device,
        image: vk::Image,
        p_subresource: *const vk::ImageSubresource,
        p_layout: *mut vk::SubresourceLayout
    ) = v1_0.get_image_subresource_layout;
        hooks pre_call_record_get_image_subresource_layout, post_call_record_get_image_subresource_layout(image);
        unwrap(image);
}

pub unsafe extern "system" fn vkBindImageMemory2(
    device: vk::Device,
    bind_info_count: u32,
    p_bind_infos: *const vk::BindImageMemoryInfo<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let bind_infos = slice(p_bind_infos, bind_info_count);
        let mut record = RecordObject::new("vkBindImageMemory2");
        ctx.chain
            .pre(|vo| vo.pre_call_record_bind_image_memory2(device, bind_infos, &record));
        let mut scratch = Scratch::new();
        let local = ctx
            .dispatch
            .local_array(&mut scratch, p_bind_infos, bind_info_count, |handles, s, info| {
                info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
                info.image = handles.unwrap_handle(info.image);
                info.memory = handles.unwrap_handle(info.memory);
            });
        record.result = (ctx.dispatch.v1_1.bind_image_memory2)(device, bind_info_count, local);
        ctx.chain
            .post(|vo| vo.post_call_record_bind_image_memory2(device, bind_infos, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkGetImageMemoryRequirements2(
    device: vk::Device,
    p_info: *const vk::ImageMemoryRequirementsInfo2<'_>,
    p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let info = &*p_info;
        let record = RecordObject::new("vkGetImageMemoryRequirements2");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_image_memory_requirements2(device, info, &record));
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_info, |handles, s, info| {
            info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
            info.image = handles.unwrap_handle(info.image);
        });
        (ctx.dispatch.v1_1.get_image_memory_requirements2)(device, local, p_memory_requirements);
        ctx.chain
            .post(|vo| vo.post_call_record_get_image_memory_requirements2(device, info, &record));
    }
}

pub unsafe extern "system" fn vkGetImageSparseMemoryRequirements2(
    device: vk::Device,
    p_info: *const vk::ImageSparseMemoryRequirementsInfo2<'_>,
    p_sparse_memory_requirement_count: *mut u32,
    p_sparse_memory_requirements: *mut vk::SparseImageMemoryRequirements2<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let info = &*p_info;
        let record = RecordObject::new("vkGetImageSparseMemoryRequirements2");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_image_sparse_memory_requirements2(device, info, &record));
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_info, |handles, s, info| {
            info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
            info.image = handles.unwrap_handle(info.image);
        });
        (ctx.dispatch.v1_1.get_image_sparse_memory_requirements2)(
            device,
            local,
            p_sparse_memory_requirement_count,
            p_sparse_memory_requirements,
        );
        ctx.chain
            .post(|vo| vo.post_call_record_get_image_sparse_memory_requirements2(device, info, &record));
    }
}

// ── Image view ──────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateImageView(
    device: vk::Device,
    p_create_info: *const vk::ImageViewCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_view: *mut vk::ImageView,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateImageView");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_image_view(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_image_view(device, p_create_info, p_allocator, p_view);
        let view = created(&record, p_view);
        ctx.chain
            .post(|vo| vo.post_call_record_create_image_view(device, create_info, view, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyImageView(
    device: vk::Device,
    image_view: vk::ImageView,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyImageView");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_image_view(device, image_view, &record));
        ctx.dispatch.destroy_image_view(device, image_view, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_image_view(device, image_view, &record));
    }
}

// ── Sampler ─────────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateSampler(
    device: vk::Device,
    p_create_info: *const vk::SamplerCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_sampler: *mut vk::Sampler,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateSampler");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_sampler(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_sampler(device, p_create_info, p_allocator, p_sampler);
        let sampler = created(&record, p_sampler);
        ctx.chain
            .post(|vo| vo.post_call_record_create_sampler(device, create_info, sampler, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkDestroySampler(
    device: vk::Device,
    sampler: vk::Sampler,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroySampler");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_sampler(device, sampler, &record));
        ctx.dispatch.destroy_sampler(device, sampler, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_sampler(device, sampler, &record));
    }
}

// ── Sampler Y'CbCr conversion ───────────────────────────────

pub unsafe extern "system" fn vkCreateSamplerYcbcrConversion(
    device: vk::Device,
    p_create_info: *const vk::SamplerYcbcrConversionCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_ycbcr_conversion: *mut vk::SamplerYcbcrConversion,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateSamplerYcbcrConversion");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_sampler_ycbcr_conversion(device, create_info, &record));
        record.result = ctx.dispatch.create_sampler_ycbcr_conversion(
            device,
            p_create_info,
            p_allocator,
            p_ycbcr_conversion,
        );
        let conversion = created(&record, p_ycbcr_conversion);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_sampler_ycbcr_conversion(device, create_info, conversion, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroySamplerYcbcrConversion(
    device: vk::Device,
    ycbcr_conversion: vk::SamplerYcbcrConversion,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroySamplerYcbcrConversion");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_destroy_sampler_ycbcr_conversion(device, ycbcr_conversion, &record)
        });
        ctx.dispatch
            .destroy_sampler_ycbcr_conversion(device, ycbcr_conversion, p_allocator);
        ctx.chain.post(|vo| {
            vo.post_call_record_destroy_sampler_ycbcr_conversion(device, ycbcr_conversion, &record)
        });
    }
}

impl DeviceDispatch {
    forward_create!(create_image, v1_0.create_image, vk::ImageCreateInfo<'_>, vk::Image);
    forward_destroy!(destroy_image, v1_0.destroy_image, vk::Image);
    forward_create!(create_sampler, v1_0.create_sampler, vk::SamplerCreateInfo<'_>, vk::Sampler);
    forward_destroy!(destroy_sampler, v1_0.destroy_sampler, vk::Sampler);
    forward_destroy!(destroy_image_view, v1_0.destroy_image_view, vk::ImageView);
    forward_create!(create_sampler_ycbcr_conversion, v1_1.create_sampler_ycbcr_conversion, vk::SamplerYcbcrConversionCreateInfo<'_>, vk::SamplerYcbcrConversion);
    forward_destroy!(destroy_sampler_ycbcr_conversion, v1_1.destroy_sampler_ycbcr_conversion, vk::SamplerYcbcrConversion);

    pub unsafe fn create_image_view(
        &self,
        device: vk::Device,
        p_create_info: *const vk::ImageViewCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_view: *mut vk::ImageView,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.image = handles.unwrap_handle(ci.image);
            });
            let result = (self.v1_0.create_image_view)(device, create_info, p_allocator, p_view);
            self.wrap_created(result, p_view, None);
            result
        }
    }
}
