//! Descriptor set layouts, descriptor pools, descriptor sets and descriptor
//! update templates.

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr;
use std::sync::Arc;

use ash::vk;
use ash::vk::Handle;
use vkl_core::{HandleTable, RecordObject};

use crate::context::device_or_return;
use crate::dispatch::{forward_create, forward_destroy, DeviceDispatch};
use crate::params::{array_ptr, created, created_slice, slice, HandleVec};
use crate::safe_struct::{unwrap_handles, unwrap_pnext_chain, unwrap_structs, Scratch};

// ── Set layout ──────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateDescriptorSetLayout(
    device: vk::Device,
    p_create_info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_set_layout: *mut vk::DescriptorSetLayout,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateDescriptorSetLayout");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_descriptor_set_layout(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_descriptor_set_layout(device, p_create_info, p_allocator, p_set_layout);
        let set_layout = created(&record, p_set_layout);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_descriptor_set_layout(device, create_info, set_layout, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyDescriptorSetLayout(
    device: vk::Device,
    set_layout: vk::DescriptorSetLayout,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyDescriptorSetLayout");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_descriptor_set_layout(device, set_layout, &record));
        ctx.dispatch
            .destroy_descriptor_set_layout(device, set_layout, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_descriptor_set_layout(device, set_layout, &record));
    }
}

pub unsafe extern "system" fn vkGetDescriptorSetLayoutSupport(
    device: vk::Device,
    p_create_info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
    p_support: *mut vk::DescriptorSetLayoutSupport<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let create_info = &*p_create_info;
        let record = RecordObject::new("vkGetDescriptorSetLayoutSupport");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_descriptor_set_layout_support(device, create_info, &record));
        let mut scratch = Scratch::new();
        let local = ctx
            .dispatch
            .local(&mut scratch, p_create_info, |h, s, ci| unsafe { unwrap_set_layout_info(h, s, ci) });
        (ctx.dispatch.v1_1.get_descriptor_set_layout_support)(device, local, p_support);
        ctx.chain
            .post(|vo| vo.post_call_record_get_descriptor_set_layout_support(device, create_info, &record));
    }
}

// ── Pool ────────────────────────────────────────────────────

pub unsafe extern "system" fn vkCreateDescriptorPool(
    device: vk::Device,
    p_create_info: *const vk::DescriptorPoolCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_descriptor_pool: *mut vk::DescriptorPool,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateDescriptorPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_descriptor_pool(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_descriptor_pool(device, p_create_info, p_allocator, p_descriptor_pool);
        let descriptor_pool = created(&record, p_descriptor_pool);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_descriptor_pool(device, create_info, descriptor_pool, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyDescriptorPool(
    device: vk::Device,
    descriptor_pool: vk::DescriptorPool,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyDescriptorPool");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_descriptor_pool(device, descriptor_pool, &record));
        ctx.dispatch
            .destroy_descriptor_pool(device, descriptor_pool, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_descriptor_pool(device, descriptor_pool, &record));
    }
}

pub unsafe extern "system" fn vkResetDescriptorPool(
    device: vk::Device,
    descriptor_pool: vk::DescriptorPool,
    flags: vk::DescriptorPoolResetFlags,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkResetDescriptorPool");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_reset_descriptor_pool(device, descriptor_pool, flags, &record)
        });
        record.result = ctx
            .dispatch
            .reset_descriptor_pool(device, descriptor_pool, flags);
        ctx.chain.post(|vo| {
            vo.post_call_record_reset_descriptor_pool(device, descriptor_pool, flags, &record)
        });
        record.result
    }
}

// ── Sets ────────────────────────────────────────────────────

pub unsafe extern "system" fn vkAllocateDescriptorSets(
    device: vk::Device,
    p_allocate_info: *const vk::DescriptorSetAllocateInfo<'_>,
    p_descriptor_sets: *mut vk::DescriptorSet,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let allocate_info = &*p_allocate_info;
        let mut record = RecordObject::new("vkAllocateDescriptorSets");
        ctx.chain
            .pre(|vo| vo.pre_call_record_allocate_descriptor_sets(device, allocate_info, &record));
        record.result = ctx
            .dispatch
            .allocate_descriptor_sets(device, p_allocate_info, p_descriptor_sets);
        let descriptor_sets = created_slice(
            &record,
            p_descriptor_sets,
            allocate_info.descriptor_set_count,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_allocate_descriptor_sets(device, allocate_info, descriptor_sets, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkFreeDescriptorSets(
    device: vk::Device,
    descriptor_pool: vk::DescriptorPool,
    descriptor_set_count: u32,
    p_descriptor_sets: *const vk::DescriptorSet,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let descriptor_sets = slice(p_descriptor_sets, descriptor_set_count);
        let mut record = RecordObject::new("vkFreeDescriptorSets");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_free_descriptor_sets(device, descriptor_pool, descriptor_sets, &record)
        });
        record.result = ctx.dispatch.free_descriptor_sets(
            device,
            descriptor_pool,
            descriptor_set_count,
            p_descriptor_sets,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_free_descriptor_sets(device, descriptor_pool, descriptor_sets, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkUpdateDescriptorSets(
    device: vk::Device,
    descriptor_write_count: u32,
    p_descriptor_writes: *const vk::WriteDescriptorSet<'_>,
    descriptor_copy_count: u32,
    p_descriptor_copies: *const vk::CopyDescriptorSet<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let writes = slice(p_descriptor_writes, descriptor_write_count);
        let copies = slice(p_descriptor_copies, descriptor_copy_count);
        let record = RecordObject::new("vkUpdateDescriptorSets");
        ctx.chain
            .pre(|vo| vo.pre_call_record_update_descriptor_sets(device, writes, copies, &record));
        ctx.dispatch.update_descriptor_sets(
            device,
            descriptor_write_count,
            p_descriptor_writes,
            descriptor_copy_count,
            p_descriptor_copies,
        );
        ctx.chain
            .post(|vo| vo.post_call_record_update_descriptor_sets(device, writes, copies, &record));
    }
}

// ── Update templates ────────────────────────────────────────

pub unsafe extern "system" fn vkCreateDescriptorUpdateTemplate(
    device: vk::Device,
    p_create_info: *const vk::DescriptorUpdateTemplateCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_descriptor_update_template: *mut vk::DescriptorUpdateTemplate,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateDescriptorUpdateTemplate");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_create_descriptor_update_template(device, create_info, &record)
        });
        record.result = ctx.dispatch.create_descriptor_update_template(
            device,
            p_create_info,
            p_allocator,
            p_descriptor_update_template,
        );
        let update_template = created(&record, p_descriptor_update_template);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_descriptor_update_template(
                device,
                create_info,
                update_template,
                &record,
            )
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroyDescriptorUpdateTemplate(
    device: vk::Device,
    descriptor_update_template: vk::DescriptorUpdateTemplate,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroyDescriptorUpdateTemplate");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_destroy_descriptor_update_template(
                device,
                descriptor_update_template,
                &record,
            )
        });
        ctx.dispatch
            .destroy_descriptor_update_template(device, descriptor_update_template, p_allocator);
        ctx.chain.post(|vo| {
            vo.post_call_record_destroy_descriptor_update_template(
                device,
                descriptor_update_template,
                &record,
            )
        });
    }
}

pub unsafe extern "system" fn vkUpdateDescriptorSetWithTemplate(
    device: vk::Device,
    descriptor_set: vk::DescriptorSet,
    descriptor_update_template: vk::DescriptorUpdateTemplate,
    p_data: *const c_void,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkUpdateDescriptorSetWithTemplate");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_update_descriptor_set_with_template(
                device,
                descriptor_set,
                descriptor_update_template,
                p_data,
                &record,
            )
        });
        ctx.dispatch.update_descriptor_set_with_template(
            device,
            descriptor_set,
            descriptor_update_template,
            p_data,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_update_descriptor_set_with_template(
                device,
                descriptor_set,
                descriptor_update_template,
                p_data,
                &record,
            )
        });
    }
}

fn uses_samplers(ty: vk::DescriptorType) -> bool {
    matches!(
        ty,
        vk::DescriptorType::SAMPLER | vk::DescriptorType::COMBINED_IMAGE_SAMPLER
    )
}

/// Unwrap the one payload array a descriptor write reads for its type.
/// Arrays the type does not use may hold garbage and are left alone.
unsafe fn unwrap_write(
    handles: &HandleTable,
    scratch: &mut Scratch,
    write: &mut vk::WriteDescriptorSet<'_>,
) {
    unsafe {
        write.p_next = unwrap_pnext_chain(handles, scratch, write.p_next);
        write.dst_set = handles.unwrap_handle(write.dst_set);
        let count = write.descriptor_count;
        match write.descriptor_type {
            vk::DescriptorType::SAMPLER
            | vk::DescriptorType::COMBINED_IMAGE_SAMPLER
            | vk::DescriptorType::SAMPLED_IMAGE
            | vk::DescriptorType::STORAGE_IMAGE
            | vk::DescriptorType::INPUT_ATTACHMENT => {
                write.p_image_info = unwrap_structs(scratch, write.p_image_info, count, |_, info| {
                    info.sampler = handles.unwrap_handle(info.sampler);
                    info.image_view = handles.unwrap_handle(info.image_view);
                });
            }
            vk::DescriptorType::UNIFORM_TEXEL_BUFFER | vk::DescriptorType::STORAGE_TEXEL_BUFFER => {
                write.p_texel_buffer_view =
                    unwrap_handles(handles, scratch, write.p_texel_buffer_view, count);
            }
            vk::DescriptorType::UNIFORM_BUFFER
            | vk::DescriptorType::STORAGE_BUFFER
            | vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
            | vk::DescriptorType::STORAGE_BUFFER_DYNAMIC => {
                write.p_buffer_info = unwrap_structs(scratch, write.p_buffer_info, count, |_, info| {
                    info.buffer = handles.unwrap_handle(info.buffer);
                });
            }
            _ => {}
        }
    }
}

unsafe fn unwrap_set_layout_info(
    handles: &HandleTable,
    scratch: &mut Scratch,
    ci: &mut vk::DescriptorSetLayoutCreateInfo<'_>,
) {
    unsafe {
        ci.p_next = unwrap_pnext_chain(handles, scratch, ci.p_next);
        ci.p_bindings = unwrap_structs(scratch, ci.p_bindings, ci.binding_count, |s, binding| {
            if uses_samplers(binding.descriptor_type) {
                binding.p_immutable_samplers = unwrap_handles(
                    handles,
                    s,
                    binding.p_immutable_samplers,
                    binding.descriptor_count,
                );
            }
        });
    }
}

/// Bytes of the template data one entry reads, counted from the start of
/// the blob.
fn template_entry_end(entry: &vk::DescriptorUpdateTemplateEntry) -> usize {
    let element = match entry.descriptor_type {
        vk::DescriptorType::INLINE_UNIFORM_BLOCK => {
            return entry.offset + entry.descriptor_count as usize;
        }
        vk::DescriptorType::SAMPLER
        | vk::DescriptorType::COMBINED_IMAGE_SAMPLER
        | vk::DescriptorType::SAMPLED_IMAGE
        | vk::DescriptorType::STORAGE_IMAGE
        | vk::DescriptorType::INPUT_ATTACHMENT => size_of::<vk::DescriptorImageInfo>(),
        vk::DescriptorType::UNIFORM_BUFFER
        | vk::DescriptorType::STORAGE_BUFFER
        | vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
        | vk::DescriptorType::STORAGE_BUFFER_DYNAMIC => size_of::<vk::DescriptorBufferInfo>(),
        vk::DescriptorType::UNIFORM_TEXEL_BUFFER | vk::DescriptorType::STORAGE_TEXEL_BUFFER => {
            size_of::<vk::BufferView>()
        }
        vk::DescriptorType::ACCELERATION_STRUCTURE_KHR => size_of::<vk::AccelerationStructureKHR>(),
        _ => 0,
    };
    if entry.descriptor_count == 0 || element == 0 {
        return entry.offset;
    }
    entry.offset + (entry.descriptor_count as usize - 1) * entry.stride + element
}

/// Rewrite one element of a template blob in place.
unsafe fn unwrap_template_element<T: Copy>(at: *mut u8, fix: impl FnOnce(&mut T)) {
    unsafe {
        let element = at.cast::<T>();
        let mut value = element.read_unaligned();
        fix(&mut value);
        element.write_unaligned(value);
    }
}

/// Copy the raw data of a template update with every entry's handles
/// unwrapped. The copy is 8-byte aligned like the structures it holds.
unsafe fn unwrap_template_data(
    handles: &HandleTable,
    entries: &[vk::DescriptorUpdateTemplateEntry],
    p_data: *const c_void,
) -> Vec<u64> {
    unsafe {
        let size = entries.iter().map(template_entry_end).max().unwrap_or(0);
        let mut blob = vec![0u64; size.div_ceil(8)];
        let base = blob.as_mut_ptr().cast::<u8>();
        ptr::copy_nonoverlapping(p_data.cast::<u8>(), base, size);
        for entry in entries {
            for i in 0..entry.descriptor_count as usize {
                let at = base.add(entry.offset + i * entry.stride);
                match entry.descriptor_type {
                    vk::DescriptorType::SAMPLER => {
                        unwrap_template_element(at, |info: &mut vk::DescriptorImageInfo| {
                            info.sampler = handles.unwrap_handle(info.sampler);
                        });
                    }
                    vk::DescriptorType::COMBINED_IMAGE_SAMPLER => {
                        unwrap_template_element(at, |info: &mut vk::DescriptorImageInfo| {
                            info.sampler = handles.unwrap_handle(info.sampler);
                            info.image_view = handles.unwrap_handle(info.image_view);
                        });
                    }
                    vk::DescriptorType::SAMPLED_IMAGE
                    | vk::DescriptorType::STORAGE_IMAGE
                    | vk::DescriptorType::INPUT_ATTACHMENT => {
                        unwrap_template_element(at, |info: &mut vk::DescriptorImageInfo| {
                            info.image_view = handles.unwrap_handle(info.image_view);
                        });
                    }
                    vk::DescriptorType::UNIFORM_BUFFER
                    | vk::DescriptorType::STORAGE_BUFFER
                    | vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
                    | vk::DescriptorType::STORAGE_BUFFER_DYNAMIC => {
                        unwrap_template_element(at, |info: &mut vk::DescriptorBufferInfo| {
                            info.buffer = handles.unwrap_handle(info.buffer);
                        });
                    }
                    vk::DescriptorType::UNIFORM_TEXEL_BUFFER
                    | vk::DescriptorType::STORAGE_TEXEL_BUFFER => {
                        unwrap_template_element(at, |view: &mut vk::BufferView| {
                            *view = handles.unwrap_handle(*view);
                        });
                    }
                    vk::DescriptorType::ACCELERATION_STRUCTURE_KHR => {
                        unwrap_template_element(at, |accel: &mut vk::AccelerationStructureKHR| {
                            *accel = handles.unwrap_handle(*accel);
                        });
                    }
                    _ => break,
                }
            }
        }
        blob
    }
}

impl DeviceDispatch {
    forward_create!(create_descriptor_pool, v1_0.create_descriptor_pool, vk::DescriptorPoolCreateInfo<'_>, vk::DescriptorPool);
    forward_destroy!(destroy_descriptor_set_layout, v1_0.destroy_descriptor_set_layout, vk::DescriptorSetLayout);

    pub unsafe fn create_descriptor_set_layout(
        &self,
        device: vk::Device,
        p_create_info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_set_layout: *mut vk::DescriptorSetLayout,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |h, s, ci| unsafe { unwrap_set_layout_info(h, s, ci) });
            let result =
                (self.v1_0.create_descriptor_set_layout)(device, create_info, p_allocator, p_set_layout);
            self.wrap_created(result, p_set_layout, None);
            result
        }
    }

    /// Destroying a pool frees every set allocated from it.
    pub unsafe fn destroy_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        unsafe {
            self.handles.destroy_children(descriptor_pool.as_raw());
            let native = self.handles.erase(descriptor_pool);
            (self.v1_0.destroy_descriptor_pool)(device, native, p_allocator)
        }
    }

    pub unsafe fn reset_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        flags: vk::DescriptorPoolResetFlags,
    ) -> vk::Result {
        unsafe {
            let result =
                (self.v1_0.reset_descriptor_pool)(device, self.unwrap(descriptor_pool), flags);
            if result == vk::Result::SUCCESS {
                self.handles.destroy_children(descriptor_pool.as_raw());
            }
            result
        }
    }

    pub unsafe fn allocate_descriptor_sets(
        &self,
        device: vk::Device,
        p_allocate_info: *const vk::DescriptorSetAllocateInfo<'_>,
        p_descriptor_sets: *mut vk::DescriptorSet,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let allocate_info = self.local(&mut scratch, p_allocate_info, |handles, s, ai| {
                ai.p_next = unwrap_pnext_chain(handles, s, ai.p_next);
                ai.descriptor_pool = handles.unwrap_handle(ai.descriptor_pool);
                ai.p_set_layouts = unwrap_handles(handles, s, ai.p_set_layouts, ai.descriptor_set_count);
            });
            let result = (self.v1_0.allocate_descriptor_sets)(device, allocate_info, p_descriptor_sets);
            if result == vk::Result::SUCCESS {
                let info = &*p_allocate_info;
                self.wrap_created_array(
                    p_descriptor_sets,
                    info.descriptor_set_count,
                    Some(info.descriptor_pool.as_raw()),
                );
            }
            result
        }
    }

    pub unsafe fn free_descriptor_sets(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        descriptor_set_count: u32,
        p_descriptor_sets: *const vk::DescriptorSet,
    ) -> vk::Result {
        unsafe {
            let natives: HandleVec<vk::DescriptorSet> = slice(p_descriptor_sets, descriptor_set_count)
                .iter()
                .map(|set| self.handles.erase(*set))
                .collect();
            (self.v1_0.free_descriptor_sets)(
                device,
                self.unwrap(descriptor_pool),
                descriptor_set_count,
                array_ptr(p_descriptor_sets, &natives),
            )
        }
    }

    pub unsafe fn update_descriptor_sets(
        &self,
        device: vk::Device,
        descriptor_write_count: u32,
        p_descriptor_writes: *const vk::WriteDescriptorSet<'_>,
        descriptor_copy_count: u32,
        p_descriptor_copies: *const vk::CopyDescriptorSet<'_>,
    ) {
        unsafe {
            let mut scratch = Scratch::new();
            let writes = self.local_array(
                &mut scratch,
                p_descriptor_writes,
                descriptor_write_count,
                |handles, s, write| unwrap_write(handles, s, write),
            );
            let copies = self.local_array(
                &mut scratch,
                p_descriptor_copies,
                descriptor_copy_count,
                |handles, _, copy| {
                    copy.src_set = handles.unwrap_handle(copy.src_set);
                    copy.dst_set = handles.unwrap_handle(copy.dst_set);
                },
            );
            (self.v1_0.update_descriptor_sets)(
                device,
                descriptor_write_count,
                writes,
                descriptor_copy_count,
                copies,
            )
        }
    }

    pub unsafe fn create_descriptor_update_template(
        &self,
        device: vk::Device,
        p_create_info: *const vk::DescriptorUpdateTemplateCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_descriptor_update_template: *mut vk::DescriptorUpdateTemplate,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                // Only the handle matching the template type is read.
                if ci.template_type == vk::DescriptorUpdateTemplateType::DESCRIPTOR_SET {
                    ci.descriptor_set_layout = handles.unwrap_handle(ci.descriptor_set_layout);
                } else {
                    ci.pipeline_layout = handles.unwrap_handle(ci.pipeline_layout);
                }
            });
            let result = (self.v1_1.create_descriptor_update_template)(
                device,
                create_info,
                p_allocator,
                p_descriptor_update_template,
            );
            self.wrap_created(result, p_descriptor_update_template, None);
            if result == vk::Result::SUCCESS && self.handles.wrapping_enabled() {
                let info = &*p_create_info;
                let entries: Arc<[vk::DescriptorUpdateTemplateEntry]> =
                    slice(info.p_descriptor_update_entries, info.descriptor_update_entry_count).into();
                self.update_templates
                    .lock()
                    .insert((*p_descriptor_update_template).as_raw(), entries);
            }
            result
        }
    }

    pub unsafe fn destroy_descriptor_update_template(
        &self,
        device: vk::Device,
        descriptor_update_template: vk::DescriptorUpdateTemplate,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        unsafe {
            self.update_templates
                .lock()
                .remove(&descriptor_update_template.as_raw());
            let native = self.handles.erase(descriptor_update_template);
            (self.v1_1.destroy_descriptor_update_template)(device, native, p_allocator)
        }
    }

    /// The data blob is opaque to the driver call, so its handles are found
    /// through the entries recorded when the template was created.
    pub unsafe fn update_descriptor_set_with_template(
        &self,
        device: vk::Device,
        descriptor_set: vk::DescriptorSet,
        descriptor_update_template: vk::DescriptorUpdateTemplate,
        p_data: *const c_void,
    ) {
        unsafe {
            if !self.handles.wrapping_enabled() {
                return (self.v1_1.update_descriptor_set_with_template)(
                    device,
                    descriptor_set,
                    descriptor_update_template,
                    p_data,
                );
            }
            let entries = self
                .update_templates
                .lock()
                .get(&descriptor_update_template.as_raw())
                .cloned();
            let blob = match entries {
                Some(entries) if !p_data.is_null() => unwrap_template_data(&self.handles, &entries, p_data),
                _ => {
                    tracing::warn!(
                        template = format_args!("{:#x}", descriptor_update_template.as_raw()),
                        "template update with no recorded entries, forwarding data as is"
                    );
                    Vec::new()
                }
            };
            let data = if blob.is_empty() {
                p_data
            } else {
                blob.as_ptr().cast::<c_void>()
            };
            (self.v1_1.update_descriptor_set_with_template)(
                device,
                self.unwrap(descriptor_set),
                self.unwrap(descriptor_update_template),
                data,
            )
        }
    }
}
