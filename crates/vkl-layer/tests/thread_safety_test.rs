//! Concurrent-use detection through the layer's entry points.
//!
//! Conflicting calls are held together inside the fake driver with a barrier,
//! so both claims are live when the second one is taken.

mod common;

use std::thread;

use ash::vk;
use ash::vk::Handle;
use common::TestEnv;
use vkl_layer::command::{vkFreeCommandBuffers, vkDestroyCommandPool, vkResetCommandPool};
use vkl_layer::device::{vkDeviceWaitIdle, vkQueueSubmit};
use vkl_layer::memory::vkGetBufferMemoryRequirements;
use vkl_layer::swapchain::{vkAcquireNextImageKHR, vkWaitForPresentKHR};
use vkl_layer::sync::vkSetEvent;
use vkl_layer::thread_safety::{VUID_MULTIPLE_THREADS_READ, VUID_MULTIPLE_THREADS_WRITE};

#[test]
fn test_disjoint_pools_reset_concurrently() {
    let env = TestEnv::new();
    let pools = [env.command_pool(), env.command_pool()];
    for &pool in &pools {
        env.command_buffers(pool, 2);
    }

    env.driver.gate(&["vkResetCommandPool"], 2);
    thread::scope(|s| {
        for &pool in &pools {
            let env = &env;
            s.spawn(move || unsafe {
                vkResetCommandPool(env.device, pool, vk::CommandPoolResetFlags::empty())
            });
        }
    });
    env.driver.ungate_all();

    assert_eq!(env.driver.count("vkResetCommandPool"), 2);
    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());
}

#[test]
fn test_same_pool_reset_reports_both_call_sites() {
    let env = TestEnv::new();
    let pool = env.command_pool();
    env.command_buffers(pool, 2);

    env.driver.gate(&["vkResetCommandPool"], 2);
    thread::scope(|s| {
        for _ in 0..2 {
            let env = &env;
            s.spawn(move || unsafe {
                vkResetCommandPool(env.device, pool, vk::CommandPoolResetFlags::empty())
            });
        }
    });
    env.driver.ungate_all();

    // Both calls still reached the driver.
    assert_eq!(env.driver.count("vkResetCommandPool"), 2);

    let reports = env.sink.reports();
    let report = reports
        .iter()
        .find(|r| r.object_type == vk::ObjectType::COMMAND_POOL && r.handle == pool.as_raw())
        .expect("pool conflict reported");
    assert_eq!(report.vuid, VUID_MULTIPLE_THREADS_WRITE);
    assert_eq!(report.location.function, "vkResetCommandPool");
    let other = report.conflict.expect("conflicting call site");
    assert_eq!(other.function, "vkResetCommandPool");
    assert_ne!(other.thread, report.location.thread);
    assert!(report.message.starts_with("THREADING ERROR"));

    // Claims are released once both calls return.
    assert_eq!(
        env.thread_safety().claims(vk::ObjectType::COMMAND_POOL, pool.as_raw()),
        Some((0, 0))
    );
}

#[test]
fn test_concurrent_reads_are_allowed() {
    let env = TestEnv::new();
    let buffer = env.buffer();

    env.driver.gate(&["vkGetBufferMemoryRequirements"], 2);
    thread::scope(|s| {
        for _ in 0..2 {
            let env = &env;
            s.spawn(move || {
                let mut requirements = vk::MemoryRequirements::default();
                unsafe { vkGetBufferMemoryRequirements(env.device, buffer, &mut requirements) };
                assert_eq!(requirements.size, 256);
            });
        }
    });
    env.driver.ungate_all();

    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());
    assert_eq!(
        env.driver.calls_to("vkGetBufferMemoryRequirements"),
        vec![vec![env.native(buffer)]; 2]
    );
}

#[test]
fn test_pool_destroy_releases_remaining_command_buffers() {
    let env = TestEnv::new();
    let pool = env.command_pool();
    let command_buffers = env.command_buffers(pool, 10);
    let ts = env.thread_safety();
    assert_eq!(ts.command_buffers_of(pool).len(), 10);

    unsafe { vkFreeCommandBuffers(env.device, pool, 3, command_buffers.as_ptr()) };
    assert_eq!(ts.command_buffers_of(pool).len(), 7);
    assert_eq!(ts.tracked_count(vk::ObjectType::COMMAND_BUFFER), 7);
    for cb in &command_buffers[..3] {
        assert!(!env.ctx.handles().is_live(*cb));
    }

    unsafe { vkDestroyCommandPool(env.device, pool, std::ptr::null()) };

    assert!(ts.command_buffers_of(pool).is_empty());
    assert_eq!(ts.tracked_count(vk::ObjectType::COMMAND_BUFFER), 0);
    assert!(!ts.is_tracked(vk::ObjectType::COMMAND_POOL, pool.as_raw()));
    for cb in &command_buffers {
        assert!(!env.ctx.handles().is_live(*cb));
    }
    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());

    // The driver saw the pool's own handle, not the layer's id.
    assert_eq!(env.driver.last("vkDestroyCommandPool").len(), 1);
    assert_ne!(env.driver.last("vkDestroyCommandPool")[0], pool.as_raw());
}

/// Update each of `sets` from its own thread, both calls held inside the
/// driver together.
fn update_sets_concurrently(env: &TestEnv, sets: &[vk::DescriptorSet]) {
    let buffers: Vec<vk::Buffer> = sets.iter().map(|_| env.buffer()).collect();
    env.driver.gate(&["vkUpdateDescriptorSets"], sets.len());
    thread::scope(|s| {
        for (&set, &buffer) in sets.iter().zip(&buffers) {
            s.spawn(move || env.update_set(set, buffer));
        }
    });
    env.driver.ungate_all();
}

#[test]
fn test_read_only_descriptor_sets_update_concurrently() {
    let env = TestEnv::new();
    let layout = env.set_layout(vk::DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL);
    let pool = env.descriptor_pool();
    let sets = env.descriptor_sets(pool, &[layout, layout]);
    assert_ne!(sets[0], sets[1]);
    for &set in &sets {
        assert!(env.thread_safety().is_descriptor_set_read_only(set));
    }

    update_sets_concurrently(&env, &sets);

    assert_eq!(env.driver.count("vkUpdateDescriptorSets"), 2);
    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());
}

#[test]
fn test_host_only_layout_makes_sets_read_only() {
    let env = TestEnv::new();
    let layout = env.set_layout(vk::DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL_EXT);
    let set = env.descriptor_sets(env.descriptor_pool(), &[layout])[0];
    assert!(env.thread_safety().is_descriptor_set_read_only(set));

    // Even the same set may be updated from two threads.
    update_sets_concurrently(&env, &[set, set]);

    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());
}

#[test]
fn test_update_after_bind_on_every_binding_makes_sets_read_only() {
    let env = TestEnv::new();
    let layout = env.set_layout_with_binding_flags(&[
        vk::DescriptorBindingFlags::UPDATE_AFTER_BIND,
        vk::DescriptorBindingFlags::UPDATE_AFTER_BIND | vk::DescriptorBindingFlags::PARTIALLY_BOUND,
    ]);
    let set = env.descriptor_sets(env.descriptor_pool(), &[layout])[0];
    assert!(env.thread_safety().is_descriptor_set_read_only(set));

    update_sets_concurrently(&env, &[set, set]);

    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());
}

#[test]
fn test_update_after_bind_on_some_bindings_keeps_sets_writable() {
    let env = TestEnv::new();
    let layout = env.set_layout_with_binding_flags(&[
        vk::DescriptorBindingFlags::UPDATE_AFTER_BIND,
        vk::DescriptorBindingFlags::empty(),
    ]);
    let set = env.descriptor_sets(env.descriptor_pool(), &[layout])[0];
    assert!(!env.thread_safety().is_descriptor_set_read_only(set));

    update_sets_concurrently(&env, &[set, set]);

    let reports = env.sink.reports();
    assert!(reports.iter().any(|r| r.object_type == vk::ObjectType::DESCRIPTOR_SET
        && r.handle == set.as_raw()
        && r.vuid == VUID_MULTIPLE_THREADS_WRITE));
}

#[test]
fn test_writable_descriptor_sets_conflict() {
    let env = TestEnv::new();
    let layout = env.set_layout(vk::DescriptorSetLayoutCreateFlags::empty());
    let pool = env.descriptor_pool();
    let set = env.descriptor_sets(pool, &[layout])[0];
    let buffer = env.buffer();
    assert!(!env.thread_safety().is_descriptor_set_read_only(set));

    env.driver.gate(&["vkUpdateDescriptorSets"], 2);
    thread::scope(|s| {
        for _ in 0..2 {
            let env = &env;
            s.spawn(move || env.update_set(set, buffer));
        }
    });
    env.driver.ungate_all();

    let reports = env.sink.reports();
    assert!(reports.iter().any(|r| r.object_type == vk::ObjectType::DESCRIPTOR_SET
        && r.handle == set.as_raw()
        && r.vuid == VUID_MULTIPLE_THREADS_WRITE));

    // The driver got the buffer behind the wrapped id.
    let last = env.driver.last("vkUpdateDescriptorSets");
    assert_eq!(last, vec![env.native(set), env.native(buffer)]);
}

#[test]
fn test_concurrent_set_event_conflicts() {
    let env = TestEnv::new();
    let event = env.event();

    env.driver.gate(&["vkSetEvent"], 2);
    thread::scope(|s| {
        for _ in 0..2 {
            let env = &env;
            s.spawn(move || unsafe { vkSetEvent(env.device, event) });
        }
    });
    env.driver.ungate_all();

    assert_eq!(env.driver.count("vkSetEvent"), 2);
    let reports = env.sink.reports();
    let report = reports
        .iter()
        .find(|r| r.object_type == vk::ObjectType::EVENT && r.handle == event.as_raw())
        .expect("event conflict reported");
    assert_eq!(report.vuid, VUID_MULTIPLE_THREADS_WRITE);
}

#[test]
fn test_device_wait_idle_conflicts_with_submit() {
    let env = TestEnv::new();
    let queue = env.queue(0);

    env.driver.gate(&["vkDeviceWaitIdle", "vkQueueSubmit"], 2);
    thread::scope(|s| {
        let env = &env;
        s.spawn(move || unsafe { vkDeviceWaitIdle(env.device) });
        s.spawn(move || unsafe { vkQueueSubmit(queue, 0, std::ptr::null(), vk::Fence::null()) });
    });
    env.driver.ungate_all();

    let reports = env.sink.reports();
    let report = reports
        .iter()
        .find(|r| r.object_type == vk::ObjectType::QUEUE)
        .expect("queue conflict reported");
    assert_eq!(report.handle, queue.as_raw());
    assert_eq!(report.vuid, VUID_MULTIPLE_THREADS_WRITE);
    let mut functions = [
        report.location.function,
        report.conflict.expect("conflicting call site").function,
    ];
    functions.sort_unstable();
    assert_eq!(functions, ["vkDeviceWaitIdle", "vkQueueSubmit"]);
}

#[test]
fn test_wait_for_present_does_not_claim_swapchain() {
    let env = TestEnv::new();
    let swapchain = env.swapchain(env.surface());
    let semaphore = env.semaphore();

    env.driver.gate(&["vkWaitForPresentKHR", "vkAcquireNextImageKHR"], 2);
    thread::scope(|s| {
        let env = &env;
        s.spawn(move || unsafe { vkWaitForPresentKHR(env.device, swapchain, 1, u64::MAX) });
        s.spawn(move || {
            let mut index = u32::MAX;
            let result = unsafe {
                vkAcquireNextImageKHR(
                    env.device,
                    swapchain,
                    u64::MAX,
                    semaphore,
                    vk::Fence::null(),
                    &mut index,
                )
            };
            assert_eq!(result, vk::Result::SUCCESS);
            assert_eq!(index, 0);
        });
    });
    env.driver.ungate_all();

    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());
    assert_eq!(
        env.driver.last("vkAcquireNextImageKHR"),
        vec![env.native(swapchain), env.native(semaphore), 0]
    );
}

#[test]
fn test_writer_after_reader_on_other_thread_is_reported() {
    let env = TestEnv::new();
    let buffer = env.buffer();
    let ts = env.thread_safety();

    // A reader claim from another thread is still held when this thread
    // starts writing the buffer.
    env.driver.gate(&["vkGetBufferMemoryRequirements", "vkDestroyBuffer"], 2);
    thread::scope(|s| {
        let env = &env;
        s.spawn(move || {
            let mut requirements = vk::MemoryRequirements::default();
            unsafe { vkGetBufferMemoryRequirements(env.device, buffer, &mut requirements) };
        });
        s.spawn(move || unsafe {
            vkl_layer::memory::vkDestroyBuffer(env.device, buffer, std::ptr::null())
        });
    });
    env.driver.ungate_all();

    let reports = env.sink.reports();
    let report = reports
        .iter()
        .find(|r| r.object_type == vk::ObjectType::BUFFER)
        .expect("buffer conflict reported");
    assert!(report.vuid == VUID_MULTIPLE_THREADS_WRITE || report.vuid == VUID_MULTIPLE_THREADS_READ);
    assert!(!ts.is_tracked(vk::ObjectType::BUFFER, buffer.as_raw()));
}
