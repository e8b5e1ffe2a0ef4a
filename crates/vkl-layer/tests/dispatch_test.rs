//! Handle wrapping and forwarding through the dispatch shim.

mod common;

use std::ffi::c_void;
use std::sync::atomic::Ordering;

use ash::vk;
use ash::vk::Handle;
use common::TestEnv;
use vkl_layer::command::{vkCmdBindDescriptorSets, vkCmdBindIndexBuffer};
use vkl_layer::descriptor::{
    vkCreateDescriptorUpdateTemplate, vkDestroyDescriptorPool, vkDestroyDescriptorUpdateTemplate,
    vkUpdateDescriptorSetWithTemplate,
};
use vkl_layer::device::{vkDestroyDevice, vkQueueSubmit};
use vkl_layer::memory::{vkAllocateMemory, vkBindBufferMemory};
use vkl_layer::query::vkCmdBeginQuery;
use vkl_layer::swapchain::vkDestroySwapchainKHR;
use vkl_layer::{device_context, vkGetDeviceProcAddr, vkGetInstanceProcAddr};

fn allocate_memory(env: &TestEnv, buffer: vk::Buffer) -> vk::DeviceMemory {
    let mut dedicated = vk::MemoryDedicatedAllocateInfo::default().buffer(buffer);
    let info = vk::MemoryAllocateInfo::default()
        .allocation_size(256)
        .memory_type_index(0)
        .push_next(&mut dedicated);
    let mut memory = vk::DeviceMemory::null();
    let result = unsafe { vkAllocateMemory(env.device, &info, std::ptr::null(), &mut memory) };
    assert_eq!(result, vk::Result::SUCCESS);
    memory
}

#[test]
fn test_handles_pass_through_when_wrapping_is_off() {
    let env = TestEnv::unwrapped();
    let buffer = env.buffer();

    assert_eq!(env.driver.last("vkCreateBuffer"), vec![buffer.as_raw()]);
    assert_eq!(env.ctx.handles().wrapped_len(), 0);
    assert!(env.ctx.handles().is_live(buffer));

    let memory = allocate_memory(&env, buffer);
    unsafe { vkBindBufferMemory(env.device, buffer, memory, 0) };
    assert_eq!(
        env.driver.last("vkBindBufferMemory"),
        vec![buffer.as_raw(), memory.as_raw()]
    );
}

#[test]
fn test_created_handles_are_wrapped() {
    let env = TestEnv::new();
    let buffer = env.buffer();
    let native = env.driver.last("vkCreateBuffer")[0];

    assert_ne!(buffer.as_raw(), native);
    assert_eq!(env.native(buffer), native);
    assert!(env.ctx.handles().is_live(buffer));

    let memory = allocate_memory(&env, buffer);
    unsafe { vkBindBufferMemory(env.device, buffer, memory, 0) };
    assert_eq!(
        env.driver.last("vkBindBufferMemory"),
        vec![native, env.native(memory)]
    );
}

#[test]
fn test_failed_create_is_not_wrapped() {
    let env = TestEnv::new();
    let before = env.ctx.handles().wrapped_len();

    let (result, buffer) = env.create_buffer(0);

    assert_eq!(result, vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
    assert_eq!(buffer, vk::Buffer::null());
    assert_eq!(env.ctx.handles().wrapped_len(), before);
}

#[test]
fn test_unknown_handle_is_forwarded_as_null() {
    let env = TestEnv::new();
    let buffer = env.buffer();
    let memory = allocate_memory(&env, buffer);

    let stale = vk::Buffer::from_raw(0xdead_0000);
    unsafe { vkBindBufferMemory(env.device, stale, memory, 0) };

    assert_eq!(
        env.driver.last("vkBindBufferMemory"),
        vec![0, env.native(memory)]
    );
}

#[test]
fn test_extension_chain_handles_are_unwrapped() {
    let env = TestEnv::new();
    let buffer = env.buffer();

    let memory = allocate_memory(&env, buffer);

    assert_eq!(
        env.driver.last("vkAllocateMemory"),
        vec![env.native(memory), env.native(buffer), 0]
    );
}

#[test]
fn test_chain_handles_behind_handle_free_structs_are_unwrapped() {
    let env = TestEnv::new();
    let buffer = env.buffer();
    let mut dedicated = vk::MemoryDedicatedAllocateInfo::default().buffer(buffer);
    let mut import = vk::ImportMemoryFdInfoKHR::default()
        .handle_type(vk::ExternalMemoryHandleTypeFlags::OPAQUE_FD)
        .fd(3);
    let info = vk::MemoryAllocateInfo::default()
        .allocation_size(256)
        .memory_type_index(0)
        .push_next(&mut dedicated)
        .push_next(&mut import);
    let mut memory = vk::DeviceMemory::null();

    let result = unsafe { vkAllocateMemory(env.device, &info, std::ptr::null(), &mut memory) };

    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(
        env.driver.last("vkAllocateMemory"),
        vec![env.native(memory), env.native(buffer), 0]
    );
    assert_eq!(dedicated.buffer, buffer);
}

#[test]
fn test_queue_submit_unwraps_semaphores_and_fence() {
    let env = TestEnv::new();
    let queue = env.queue(0);
    let wait = env.semaphore();
    let signal = env.semaphore();
    let fence = env.fence();

    let waits = [wait];
    let signals = [signal];
    let stages = [vk::PipelineStageFlags::ALL_COMMANDS];
    let submit = vk::SubmitInfo::default()
        .wait_semaphores(&waits)
        .wait_dst_stage_mask(&stages)
        .signal_semaphores(&signals);
    let result = unsafe { vkQueueSubmit(queue, 1, &submit, fence) };

    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(
        env.driver.last("vkQueueSubmit"),
        vec![env.native(fence), env.native(wait), env.native(signal)]
    );
    // Queues are dispatchable and never wrapped.
    assert_eq!(env.queue(0), queue);
}

#[test]
fn test_recorded_commands_reach_the_driver_unwrapped() {
    let env = TestEnv::new();
    let pool = env.command_pool();
    let cb = env.command_buffers(pool, 1)[0];
    let layout = env.set_layout(vk::DescriptorSetLayoutCreateFlags::empty());
    let pipeline_layout = env.pipeline_layout(&[layout]);
    let set = env.descriptor_sets(env.descriptor_pool(), &[layout])[0];

    unsafe {
        vkCmdBindDescriptorSets(
            cb,
            vk::PipelineBindPoint::GRAPHICS,
            pipeline_layout,
            0,
            1,
            &set,
            0,
            std::ptr::null(),
        )
    };

    assert_eq!(
        env.driver.last("vkCmdBindDescriptorSets"),
        vec![env.native(pipeline_layout), env.native(set)]
    );
    assert_eq!(
        env.driver.last("vkAllocateDescriptorSets")[1..],
        [env.native(layout)]
    );
}

#[test]
fn test_destroying_descriptor_pool_retires_its_sets() {
    let env = TestEnv::new();
    let layout = env.set_layout(vk::DescriptorSetLayoutCreateFlags::empty());
    let pool = env.descriptor_pool();
    let sets = env.descriptor_sets(pool, &[layout, layout, layout]);
    let native_pool = env.native(pool);
    for &set in &sets {
        assert!(env.ctx.handles().is_live(set));
    }

    unsafe { vkDestroyDescriptorPool(env.device, pool, std::ptr::null()) };

    assert_eq!(env.driver.last("vkDestroyDescriptorPool"), vec![native_pool]);
    assert!(!env.ctx.handles().is_live(pool));
    for &set in &sets {
        assert!(!env.ctx.handles().is_live(set));
        assert!(env.ctx.handles().try_unwrap(set).is_err());
    }
    // The layout is not owned by the pool.
    assert!(env.ctx.handles().is_live(layout));
}

#[test]
fn test_swapchain_images_keep_their_ids() {
    let env = TestEnv::new();
    let swapchain = env.swapchain(env.surface());

    let first = env.swapchain_images(swapchain);
    let second = env.swapchain_images(swapchain);

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);

    let natives = env.driver.images_of(env.native(swapchain));
    let unwrapped: Vec<u64> = first.iter().map(|&image| env.native(image)).collect();
    assert_eq!(unwrapped, natives);
    assert!(first.iter().all(|image| !natives.contains(&image.as_raw())));

    unsafe { vkDestroySwapchainKHR(env.device, swapchain, std::ptr::null()) };
    for &image in &first {
        assert!(!env.ctx.handles().is_live(image));
    }
}

#[test]
fn test_swapchain_create_unwraps_surface() {
    let env = TestEnv::new();
    let surface = env.surface();
    let swapchain = env.swapchain(surface);

    assert_eq!(
        env.driver.last("vkCreateSwapchainKHR"),
        vec![env.native(swapchain), env.native(surface), 0]
    );
}

#[test]
fn test_device_proc_addr_resolution() {
    let env = TestEnv::new();
    let resolve = |name: &std::ffi::CStr| unsafe {
        vkGetDeviceProcAddr(env.device, name.as_ptr()).map(|f| f as usize)
    };

    assert_eq!(
        resolve(c"vkCreateBuffer"),
        Some(vkl_layer::memory::vkCreateBuffer as usize)
    );
    assert_eq!(
        resolve(c"vkGetDeviceProcAddr"),
        Some(vkGetDeviceProcAddr as usize)
    );
    assert_eq!(
        resolve(c"vkCmdSetLineWidth"),
        Some(vkl_layer::command::vkCmdSetLineWidth as usize)
    );
    // Handle-free: the next layer's function is handed out.
    assert_eq!(
        resolve(c"vkGetDeviceGroupPeerMemoryFeatures"),
        Some(common::fake_get_device_group_peer_memory_features as usize)
    );
    assert_eq!(resolve(c"vkNotAnEntryPoint"), None);
}

#[test]
fn test_unintercepted_handle_call_is_withheld_while_wrapping() {
    let env = TestEnv::new();
    let name = c"vkCmdBindInvocationMaskHUAWEI";

    let resolved = unsafe { vkGetDeviceProcAddr(env.device, name.as_ptr()) };

    // The driver would otherwise receive the layer's ids for the view.
    assert!(resolved.is_none());
}

#[test]
fn test_unintercepted_handle_call_is_forwarded_without_wrapping() {
    let env = TestEnv::unwrapped();
    let name = c"vkCmdBindInvocationMaskHUAWEI";

    let resolved = unsafe { vkGetDeviceProcAddr(env.device, name.as_ptr()) };

    assert_eq!(
        resolved.map(|f| f as usize),
        Some(common::fake_cmd_bind_invocation_mask as usize)
    );
}

#[test]
fn test_index_buffer_binding_reaches_the_driver_unwrapped() {
    let env = TestEnv::new();
    let pool = env.command_pool();
    let cb = env.command_buffers(pool, 1)[0];
    let buffer = env.buffer();

    unsafe { vkCmdBindIndexBuffer(cb, buffer, 0, vk::IndexType::UINT32) };

    assert_eq!(
        env.driver.last("vkCmdBindIndexBuffer"),
        vec![env.native(buffer)]
    );
}

#[test]
fn test_begin_query_reaches_the_driver_unwrapped() {
    let env = TestEnv::new();
    let cb = env.command_buffers(env.command_pool(), 1)[0];
    let query_pool = env.query_pool();
    assert_ne!(query_pool.as_raw(), env.native(query_pool));

    unsafe { vkCmdBeginQuery(cb, query_pool, 0, vk::QueryControlFlags::empty()) };

    assert_eq!(env.driver.last("vkCmdBeginQuery"), vec![env.native(query_pool)]);
}

#[test]
fn test_template_update_unwraps_the_data_blob() {
    let env = TestEnv::new();
    let layout = env.set_layout(vk::DescriptorSetLayoutCreateFlags::empty());
    let set = env.descriptor_sets(env.descriptor_pool(), &[layout])[0];
    let buffer = env.buffer();

    let entries = [vk::DescriptorUpdateTemplateEntry {
        dst_binding: 0,
        dst_array_element: 0,
        descriptor_count: 1,
        descriptor_type: vk::DescriptorType::UNIFORM_BUFFER,
        offset: 0,
        stride: std::mem::size_of::<vk::DescriptorBufferInfo>(),
    }];
    let info = vk::DescriptorUpdateTemplateCreateInfo::default()
        .descriptor_update_entries(&entries)
        .template_type(vk::DescriptorUpdateTemplateType::DESCRIPTOR_SET)
        .descriptor_set_layout(layout);
    let mut update_template = vk::DescriptorUpdateTemplate::null();
    let result = unsafe {
        vkCreateDescriptorUpdateTemplate(env.device, &info, std::ptr::null(), &mut update_template)
    };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(
        env.driver.last("vkCreateDescriptorUpdateTemplate"),
        vec![env.native(update_template), env.native(layout)]
    );

    let data = [vk::DescriptorBufferInfo {
        buffer,
        offset: 0,
        range: vk::WHOLE_SIZE,
    }];
    env.driver.template_buffer_count.store(1, Ordering::Relaxed);
    unsafe {
        vkUpdateDescriptorSetWithTemplate(
            env.device,
            set,
            update_template,
            data.as_ptr().cast::<c_void>(),
        )
    };

    assert_eq!(
        env.driver.last("vkUpdateDescriptorSetWithTemplate"),
        vec![env.native(set), env.native(update_template), env.native(buffer)]
    );
    // The application's blob is left as it was.
    assert_eq!(data[0].buffer, buffer);

    unsafe { vkDestroyDescriptorUpdateTemplate(env.device, update_template, std::ptr::null()) };
    assert!(!env.ctx.handles().is_live(update_template));
}

#[test]
fn test_instance_proc_addr_resolution() {
    let env = TestEnv::new();
    let resolve = |name: &std::ffi::CStr| unsafe {
        vkGetInstanceProcAddr(env.instance, name.as_ptr()).map(|f| f as usize)
    };

    assert_eq!(
        resolve(c"vkDestroySurfaceKHR"),
        Some(vkl_layer::instance::vkDestroySurfaceKHR as usize)
    );
    assert_eq!(
        resolve(c"vkQueueSubmit"),
        Some(vkl_layer::device::vkQueueSubmit as usize)
    );
    assert_eq!(resolve(c"vkNotAnEntryPoint"), None);
}

#[test]
fn test_destroy_device_unregisters_context() {
    let env = TestEnv::new();
    assert!(unsafe { device_context(env.device) }.is_some());

    unsafe { vkDestroyDevice(env.device, std::ptr::null()) };

    assert_eq!(env.driver.count("vkDestroyDevice"), 1);
    assert!(unsafe { device_context(env.device) }.is_none());
    assert!(!env.ctx.handles().is_live(env.device));
}
