//! Calls returning `VK_OPERATION_DEFERRED_KHR` and their completion.

mod common;

use ash::vk;
use ash::vk::Handle;
use common::TestEnv;
use vkl_layer::ray_tracing::{
    vkBuildAccelerationStructuresKHR, vkCreateRayTracingPipelinesKHR, vkDeferredOperationJoinKHR,
    vkDestroyDeferredOperationKHR, vkGetDeferredOperationMaxConcurrencyKHR,
    vkGetDeferredOperationResultKHR,
};

fn create_pipelines(
    env: &TestEnv,
    operation: vk::DeferredOperationKHR,
    cache: vk::PipelineCache,
    pipelines: &mut [vk::Pipeline],
) -> vk::Result {
    let layout = env.pipeline_layout(&[]);
    let infos: Vec<_> = pipelines
        .iter()
        .map(|_| {
            vk::RayTracingPipelineCreateInfoKHR::default()
                .max_pipeline_ray_recursion_depth(1)
                .layout(layout)
        })
        .collect();
    unsafe {
        vkCreateRayTracingPipelinesKHR(
            env.device,
            operation,
            cache,
            infos.len() as u32,
            infos.as_ptr(),
            std::ptr::null(),
            pipelines.as_mut_ptr(),
        )
    }
}

#[test]
fn test_pipelines_appear_after_join() {
    let env = TestEnv::new();
    let ts = env.thread_safety();
    let operation = env.deferred_operation();
    let cache = env.pipeline_cache();
    let mut pipelines = vec![vk::Pipeline::null(); 2];

    let result = create_pipelines(&env, operation, cache, &mut pipelines);

    assert_eq!(result, vk::Result::OPERATION_DEFERRED_KHR);
    assert!(env.ctx.deferred().is_pending(operation.as_raw()));
    assert_eq!(ts.tracked_count(vk::ObjectType::PIPELINE), 0);
    assert_eq!(
        ts.claims(vk::ObjectType::PIPELINE_CACHE, cache.as_raw()),
        Some((0, 1))
    );
    // The driver was handed its own operation and cache.
    assert_eq!(
        env.driver.last("vkCreateRayTracingPipelinesKHR"),
        vec![env.native(operation), env.native(cache)]
    );

    let status = unsafe { vkGetDeferredOperationResultKHR(env.device, operation) };
    assert_eq!(status, vk::Result::NOT_READY);
    assert!(env.ctx.deferred().is_pending(operation.as_raw()));

    let result = unsafe { vkDeferredOperationJoinKHR(env.device, operation) };
    assert_eq!(result, vk::Result::SUCCESS);

    assert!(!env.ctx.deferred().is_pending(operation.as_raw()));
    let natives = env.driver.deferred_pipelines.lock().clone();
    assert_eq!(natives.len(), 2);
    for (pipeline, native) in pipelines.iter().zip(&natives) {
        assert_ne!(*pipeline, vk::Pipeline::null());
        assert_ne!(pipeline.as_raw(), *native);
        assert_eq!(env.native(*pipeline), *native);
        assert!(ts.is_tracked(vk::ObjectType::PIPELINE, pipeline.as_raw()));
    }
    assert_eq!(
        ts.claims(vk::ObjectType::PIPELINE_CACHE, cache.as_raw()),
        Some((0, 0))
    );
    assert_eq!(
        ts.claims(vk::ObjectType::DEFERRED_OPERATION_KHR, operation.as_raw()),
        Some((0, 0))
    );

    // Reading the result afterwards finds nothing left to complete.
    let status = unsafe { vkGetDeferredOperationResultKHR(env.device, operation) };
    assert_eq!(status, vk::Result::SUCCESS);
    assert_eq!(ts.tracked_count(vk::ObjectType::PIPELINE), 2);
    assert!(env.sink.is_empty(), "unexpected reports: {:?}", env.sink.reports());
}

#[test]
fn test_failed_operation_registers_nothing() {
    let env = TestEnv::new();
    let ts = env.thread_safety();
    let operation = env.deferred_operation();
    let cache = env.pipeline_cache();
    *env.driver.deferred_result.lock() = vk::Result::ERROR_OUT_OF_HOST_MEMORY;
    let wrapped_before = env.ctx.handles().wrapped_len();
    let mut pipelines = vec![vk::Pipeline::null(); 3];

    let result = create_pipelines(&env, operation, cache, &mut pipelines);
    assert_eq!(result, vk::Result::OPERATION_DEFERRED_KHR);

    unsafe { vkDeferredOperationJoinKHR(env.device, operation) };

    assert!(!env.ctx.deferred().is_pending(operation.as_raw()));
    assert!(pipelines.iter().all(|p| *p == vk::Pipeline::null()));
    assert_eq!(ts.tracked_count(vk::ObjectType::PIPELINE), 0);
    // Only the pipeline layout made for the call was added.
    assert_eq!(env.ctx.handles().wrapped_len(), wrapped_before + 1);
    // Claims are released whatever the outcome.
    assert_eq!(
        ts.claims(vk::ObjectType::PIPELINE_CACHE, cache.as_raw()),
        Some((0, 0))
    );
}

#[test]
fn test_immediate_pipelines_are_registered_at_once() {
    let env = TestEnv::new();
    let ts = env.thread_safety();
    let cache = env.pipeline_cache();
    let mut pipelines = vec![vk::Pipeline::null(); 2];

    let result = create_pipelines(&env, vk::DeferredOperationKHR::null(), cache, &mut pipelines);

    assert_eq!(result, vk::Result::SUCCESS);
    assert!(env.ctx.deferred().is_empty());
    for pipeline in &pipelines {
        assert!(env.ctx.handles().is_live(*pipeline));
        assert!(ts.is_tracked(vk::ObjectType::PIPELINE, pipeline.as_raw()));
    }
}

#[test]
fn test_destroy_without_join_drops_parked_work() {
    let env = TestEnv::new();
    let operation = env.deferred_operation();
    let cache = env.pipeline_cache();
    let native_operation = env.native(operation);
    let mut pipelines = vec![vk::Pipeline::null(); 1];

    create_pipelines(&env, operation, cache, &mut pipelines);
    assert!(env.ctx.deferred().is_pending(operation.as_raw()));

    unsafe { vkDestroyDeferredOperationKHR(env.device, operation, std::ptr::null()) };

    assert!(env.ctx.deferred().is_empty());
    assert_eq!(
        env.driver.last("vkDestroyDeferredOperationKHR"),
        vec![native_operation]
    );
    assert!(!env.ctx.handles().is_live(operation));
    assert_eq!(pipelines[0], vk::Pipeline::null());
    assert_eq!(env.thread_safety().tracked_count(vk::ObjectType::PIPELINE), 0);
}

#[test]
fn test_build_claims_held_until_join() {
    let env = TestEnv::new();
    let ts = env.thread_safety();
    let operation = env.deferred_operation();
    let buffer = env.buffer();

    let create_info = vk::AccelerationStructureCreateInfoKHR::default()
        .buffer(buffer)
        .size(256)
        .ty(vk::AccelerationStructureTypeKHR::BOTTOM_LEVEL);
    let mut acceleration_structure = vk::AccelerationStructureKHR::null();
    let result = unsafe {
        vkl_layer::ray_tracing::vkCreateAccelerationStructureKHR(
            env.device,
            &create_info,
            std::ptr::null(),
            &mut acceleration_structure,
        )
    };
    assert_eq!(result, vk::Result::SUCCESS);

    let info = vk::AccelerationStructureBuildGeometryInfoKHR::default()
        .ty(vk::AccelerationStructureTypeKHR::BOTTOM_LEVEL)
        .mode(vk::BuildAccelerationStructureModeKHR::BUILD)
        .dst_acceleration_structure(acceleration_structure);
    let ranges: [vk::AccelerationStructureBuildRangeInfoKHR; 0] = [];
    let p_ranges = ranges.as_ptr();
    let result = unsafe {
        vkBuildAccelerationStructuresKHR(env.device, operation, 1, &info, &p_ranges)
    };

    assert_eq!(result, vk::Result::OPERATION_DEFERRED_KHR);
    assert_eq!(
        env.driver.last("vkBuildAccelerationStructuresKHR"),
        vec![env.native(operation), env.native(acceleration_structure)]
    );
    assert_eq!(
        ts.claims(vk::ObjectType::DEFERRED_OPERATION_KHR, operation.as_raw()),
        Some((1, 0))
    );
    assert_eq!(
        ts.claims(vk::ObjectType::DEVICE, env.device.as_raw()),
        Some((1, 0))
    );

    assert_eq!(
        unsafe { vkGetDeferredOperationMaxConcurrencyKHR(env.device, operation) },
        4
    );
    unsafe { vkDeferredOperationJoinKHR(env.device, operation) };

    assert_eq!(
        ts.claims(vk::ObjectType::DEFERRED_OPERATION_KHR, operation.as_raw()),
        Some((0, 0))
    );
    assert_eq!(
        ts.claims(vk::ObjectType::DEVICE, env.device.as_raw()),
        Some((0, 0))
    );
    assert!(env.ctx.deferred().is_empty());
}
