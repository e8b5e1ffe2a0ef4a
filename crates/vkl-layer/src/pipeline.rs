//! Shader modules, pipeline caches, pipeline layouts and pipelines.

use std::ffi::c_void;

use ash::vk;
use vkl_core::{HandleTable, RecordObject};

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_destroy, forward_intercepts, DeviceDispatch};
use crate::params::{array_ptr, created, created_slice, slice, unwrap_array};
use crate::safe_struct::{unwrap_handles, unwrap_pnext_chain, unwrap_shader_stage, unwrap_structs, Scratch};

// ── Shader module ───────────────────────────────────────────

pub unsafe extern "system" fn vkCreateShaderModule(
    device: vk::Device,
    p_create_info: *const vk::ShaderModuleCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_shader_module: *mut vk::ShaderModule,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateShaderModule");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_shader_module(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_shader_module(device, p_create_info, p_allocator, p_shader_module);
        let shader_module = created(&record, p_shader_module);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_shader_module(device, create_info, shader_module, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyShaderModule(
    device: vk::Device,
    shader_module: vk::ShaderModule,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyShaderModule");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_shader_module(device, shader_module, &record));
        ctx.dispatch
            .destroy_shader_module(device, shader_module, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_shader_module(device, shader_module, &record));
    }
}

// ── Pipeline cache ──────────────────────────────────────────

pub unsafe extern "system" fn vkCreatePipelineCache(
    device: vk::Device,
    p_create_info: *const vk::PipelineCacheCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_pipeline_cache: *mut vk::PipelineCache,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreatePipelineCache");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_pipeline_cache(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_pipeline_cache(device, p_create_info, p_allocator, p_pipeline_cache);
        let pipeline_cache = created(&record, p_pipeline_cache);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_pipeline_cache(device, create_info, pipeline_cache, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyPipelineCache(
    device: vk::Device,
    pipeline_cache: vk::PipelineCache,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyPipelineCache");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_pipeline_cache(device, pipeline_cache, &record));
        ctx.dispatch
            .destroy_pipeline_cache(device, pipeline_cache, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_pipeline_cache(device, pipeline_cache, &record));
    }
}

forward_intercepts! {
    device fn vkGetPipelineCacheData(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        p_data_size: *mut usize,
        p_data: *mut c_void
    ) -> vk::Result = v1_0.get_pipeline_cache_data;
        hooks pre_call_record_get_pipeline_cache_data, post_call_record_get_pipeline_cache_data(pipeline_cache);
        unwrap(pipeline_cache);
}

pub unsafe extern "system" fn vkMergePipelineCaches(
    device: vk::Device,
    dst_cache: vk::PipelineCache,
    src_cache_count: u32,
    p_src_caches: *const vk::PipelineCache,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let src_caches = slice(p_src_caches, src_cache_count);
        let mut record = RecordObject::new("vkMergePipelineCaches");
        ctx.chain
            .pre(|vo| vo.pre_call_record_merge_pipeline_caches(device, dst_cache, src_caches, &record));
        let natives = unwrap_array(ctx.handles(), p_src_caches, src_cache_count);
        record.result = (ctx.dispatch.v1_0.merge_pipeline_caches)(
            device,
            ctx.dispatch.unwrap(dst_cache),
            src_cache_count,
            array_ptr(p_src_caches, &natives),
        );
        ctx.chain
            .post(|vo| vo.post_call_record_merge_pipeline_caches(device, dst_cache, src_caches, &record));
        record.result
    }
}

// ── Pipeline layout ─────────────────────────────────────────

pub unsafe extern "system" fn vkCreatePipelineLayout(
    device: vk::Device,
    p_create_info: *const vk::PipelineLayoutCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_pipeline_layout: *mut vk::PipelineLayout,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreatePipelineLayout");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_pipeline_layout(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_pipeline_layout(device, p_create_info, p_allocator, p_pipeline_layout);
        let pipeline_layout = created(&record, p_pipeline_layout);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_pipeline_layout(device, create_info, pipeline_layout, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyPipelineLayout(
    device: vk::Device,
    pipeline_layout: vk::PipelineLayout,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyPipelineLayout");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_pipeline_layout(device, pipeline_layout, &record));
        ctx.dispatch
            .destroy_pipeline_layout(device, pipeline_layout, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_pipeline_layout(device, pipeline_layout, &record));
    }
}

// ── Pipelines ───────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateGraphicsPipelines(
    device: vk::Device,
    pipeline_cache: vk::PipelineCache,
    create_info_count: u32,
    p_create_infos: *const vk::GraphicsPipelineCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_pipelines: *mut vk::Pipeline,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_infos = slice(p_create_infos, create_info_count);
        let mut record = RecordObject::new("vkCreateGraphicsPipelines");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_create_graphics_pipelines(device, pipeline_cache, create_infos, &record)
        });
        record.result = ctx.dispatch.create_graphics_pipelines(
            device,
            pipeline_cache,
            create_info_count,
            p_create_infos,
            p_allocator,
            p_pipelines,
        );
        let pipelines = created_slice(&record, p_pipelines, create_info_count);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_graphics_pipelines(
                device,
                pipeline_cache,
                create_infos,
                pipelines,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkCreateComputePipelines(
    device: vk::Device,
    pipeline_cache: vk::PipelineCache,
    create_info_count: u32,
    p_create_infos: *const vk::ComputePipelineCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_pipelines: *mut vk::Pipeline,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_infos = slice(p_create_infos, create_info_count);
        let mut record = RecordObject::new("vkCreateComputePipelines");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_create_compute_pipelines(device, pipeline_cache, create_infos, &record)
        });
        record.result = ctx.dispatch.create_compute_pipelines(
            device,
            pipeline_cache,
            create_info_count,
            p_create_infos,
            p_allocator,
            p_pipelines,
        );
        let pipelines = created_slice(&record, p_pipelines, create_info_count);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_compute_pipelines(
                device,
                pipeline_cache,
                create_infos,
                pipelines,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyPipeline(
    device: vk::Device,
    pipeline: vk::Pipeline,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyPipeline");
        ctx.chain.pre(|vo| vo.pre_call_record_destroy_pipeline(device, pipeline, &record));
        ctx.dispatch.destroy_pipeline(device, pipeline, p_allocator);
        ctx.chain.post(|vo| vo.post_call_record_destroy_pipeline(device, pipeline, &record));
    }
}

/// Unwrap every shader stage of a pipeline into scratch storage.
pub(crate) unsafe fn unwrap_stages<'a>(
    handles: &HandleTable,
    scratch: &mut Scratch,
    p_stages: *const vk::PipelineShaderStageCreateInfo<'a>,
    stage_count: u32,
) -> *const vk::PipelineShaderStageCreateInfo<'a> {
    unsafe {
        unwrap_structs(scratch, p_stages, stage_count, |s, stage| {
            unwrap_shader_stage(handles, s, stage)
        })
    }
}

impl DeviceDispatch {
    forward_create!(create_shader_module, v1_0.create_shader_module, vk::ShaderModuleCreateInfo<'_>, vk::ShaderModule);
    forward_destroy!(destroy_shader_module, v1_0.destroy_shader_module, vk::ShaderModule);
    forward_create!(create_pipeline_cache, v1_0.create_pipeline_cache, vk::PipelineCacheCreateInfo<'_>, vk::PipelineCache);
    forward_destroy!(destroy_pipeline_cache, v1_0.destroy_pipeline_cache, vk::PipelineCache);
    forward_destroy!(destroy_pipeline_layout, v1_0.destroy_pipeline_layout, vk::PipelineLayout);
    forward_destroy!(destroy_pipeline, v1_0.destroy_pipeline, vk::Pipeline);

    pub unsafe fn create_pipeline_layout(
        &self,
        device: vk::Device,
        p_create_info: *const vk::PipelineLayoutCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipeline_layout: *mut vk::PipelineLayout,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.p_set_layouts = unwrap_handles(handles, s, ci.p_set_layouts, ci.set_layout_count);
            });
            let result = (self.v1_0.create_pipeline_layout)(device, create_info, p_allocator, p_pipeline_layout);
            self.wrap_created(result, p_pipeline_layout, None);
            result
        }
    }

    pub unsafe fn create_graphics_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::GraphicsPipelineCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_infos = self.local_array(&mut scratch, p_create_infos, create_info_count, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.p_stages = unwrap_stages(handles, s, ci.p_stages, ci.stage_count);
                ci.layout = handles.unwrap_handle(ci.layout);
                ci.render_pass = handles.unwrap_handle(ci.render_pass);
                ci.base_pipeline_handle = handles.unwrap_handle(ci.base_pipeline_handle);
            });
            let result = (self.v1_0.create_graphics_pipelines)(
                device,
                self.unwrap(pipeline_cache),
                create_info_count,
                create_infos,
                p_allocator,
                p_pipelines,
            );
            if result.as_raw() >= 0 {
                self.wrap_created_array(p_pipelines, create_info_count, None);
            }
            result
        }
    }

    pub unsafe fn create_compute_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::ComputePipelineCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_infos = self.local_array(&mut scratch, p_create_infos, create_info_count, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                unwrap_shader_stage(handles, s, &mut ci.stage);
                ci.layout = handles.unwrap_handle(ci.layout);
                ci.base_pipeline_handle = handles.unwrap_handle(ci.base_pipeline_handle);
            });
            let result = (self.v1_0.create_compute_pipelines)(
                device,
                self.unwrap(pipeline_cache),
                create_info_count,
                create_infos,
                p_allocator,
                p_pipelines,
            );
            if result.as_raw() >= 0 {
                self.wrap_created_array(p_pipelines, create_info_count, None);
            }
            result
        }
    }
}
