//! Vulkan validation layer core.
//!
//! The layer sits between the application and the next layer (or driver).
//! Every intercepted call is routed through the validation chain of its
//! instance or device and forwarded with wrapped handles swapped for the
//! driver's own. Contexts are created through [`register_instance`] and
//! [`register_device`] once the next layer has created the object.
//!
//! While handle wrapping is on, a name the layer neither intercepts nor
//! knows to be free of non-dispatchable handles is not resolved at all:
//! handing out the next layer's function would let wrapped handles reach
//! the driver.

#![allow(non_snake_case)]

use std::ffi::{c_char, CStr};

use ash::vk;

pub mod chain;
pub mod command;
pub mod context;
pub mod descriptor;
pub mod device;
pub mod dispatch;
pub mod image;
pub mod instance;
pub mod memory;
pub mod params;
pub mod pipeline;
pub mod query;
pub mod ray_tracing;
pub mod renderpass;
pub mod safe_struct;
pub mod swapchain;
pub mod sync;
pub mod thread_safety;
pub mod validation_object;

pub use chain::{ChainScope, ValidationChain, ValidatorKind, ValidatorRegistry};
pub use context::{
    device_context, instance_context, register_device, register_instance, DeviceContext,
    InstanceContext, LayerOptions,
};
pub use thread_safety::ThreadSafety;
pub use validation_object::ValidationObject;

/// Expand a name -> intercept table into a lookup function.
macro_rules! intercept_table {
    ($fn_name:ident { $($name:literal => $path:path,)* }) => {
        fn $fn_name(name: &str) -> vk::PFN_vkVoidFunction {
            match name {
                $(
                    $name => Some(unsafe {
                        std::mem::transmute::<*const (), unsafe extern "system" fn()>(
                            $path as *const (),
                        )
                    }),
                )*
                _ => None,
            }
        }
    };
}

intercept_table!(device_intercept {
    // ── Device and queues ───────────────────────────────────
    "vkGetDeviceProcAddr" => vkGetDeviceProcAddr,
    "vkDestroyDevice" => device::vkDestroyDevice,
    "vkGetDeviceQueue" => device::vkGetDeviceQueue,
    "vkDeviceWaitIdle" => device::vkDeviceWaitIdle,
    "vkQueueWaitIdle" => device::vkQueueWaitIdle,
    "vkQueueSubmit" => device::vkQueueSubmit,
    "vkGetDeviceQueue2" => device::vkGetDeviceQueue2,
    "vkQueueBindSparse" => device::vkQueueBindSparse,

    // ── Memory ──────────────────────────────────────────────
    "vkAllocateMemory" => memory::vkAllocateMemory,
    "vkFreeMemory" => memory::vkFreeMemory,
    "vkMapMemory" => memory::vkMapMemory,
    "vkUnmapMemory" => memory::vkUnmapMemory,
    "vkFlushMappedMemoryRanges" => memory::vkFlushMappedMemoryRanges,
    "vkCreateBuffer" => memory::vkCreateBuffer,
    "vkDestroyBuffer" => memory::vkDestroyBuffer,
    "vkBindBufferMemory" => memory::vkBindBufferMemory,
    "vkGetBufferMemoryRequirements" => memory::vkGetBufferMemoryRequirements,
    "vkInvalidateMappedMemoryRanges" => memory::vkInvalidateMappedMemoryRanges,
    "vkGetDeviceMemoryCommitment" => memory::vkGetDeviceMemoryCommitment,
    "vkBindBufferMemory2" => memory::vkBindBufferMemory2,
    "vkGetBufferMemoryRequirements2" => memory::vkGetBufferMemoryRequirements2,
    "vkCreateBufferView" => memory::vkCreateBufferView,
    "vkDestroyBufferView" => memory::vkDestroyBufferView,

    // ── Images ──────────────────────────────────────────────
    "vkCreateImage" => image::vkCreateImage,
    "vkDestroyImage" => image::vkDestroyImage,
    "vkBindImageMemory" => image::vkBindImageMemory,
    "vkCreateImageView" => image::vkCreateImageView,
    "vkDestroyImageView" => image::vkDestroyImageView,
    "vkCreateSampler" => image::vkCreateSampler,
    "vkDestroySampler" => image::vkDestroySampler,
    "vkGetImageMemoryRequirements" => image::vkGetImageMemoryRequirements,
    "vkGetImageSparseMemoryRequirements" => image::vkGetImageSparseMemoryRequirements,
    "vkGetImageSubresourceLayout" => image::vkGetImageSubresourceLayout,
    "vkBindImageMemory2" => image::vkBindImageMemory2,
    "vkGetImageMemoryRequirements2" => image::vkGetImageMemoryRequirements2,
    "vkGetImageSparseMemoryRequirements2" => image::vkGetImageSparseMemoryRequirements2,
    "vkCreateSamplerYcbcrConversion" => image::vkCreateSamplerYcbcrConversion,
    "vkDestroySamplerYcbcrConversion" => image::vkDestroySamplerYcbcrConversion,

    // ── Synchronization ─────────────────────────────────────
    "vkCreateFence" => sync::vkCreateFence,
    "vkDestroyFence" => sync::vkDestroyFence,
    "vkResetFences" => sync::vkResetFences,
    "vkGetFenceStatus" => sync::vkGetFenceStatus,
    "vkWaitForFences" => sync::vkWaitForFences,
    "vkCreateSemaphore" => sync::vkCreateSemaphore,
    "vkDestroySemaphore" => sync::vkDestroySemaphore,
    "vkCreateEvent" => sync::vkCreateEvent,
    "vkDestroyEvent" => sync::vkDestroyEvent,
    "vkGetEventStatus" => sync::vkGetEventStatus,
    "vkSetEvent" => sync::vkSetEvent,
    "vkResetEvent" => sync::vkResetEvent,

    // ── Queries ─────────────────────────────────────────────
    "vkCreateQueryPool" => query::vkCreateQueryPool,
    "vkDestroyQueryPool" => query::vkDestroyQueryPool,
    "vkGetQueryPoolResults" => query::vkGetQueryPoolResults,
    "vkCmdBeginQuery" => query::vkCmdBeginQuery,
    "vkCmdEndQuery" => query::vkCmdEndQuery,
    "vkCmdResetQueryPool" => query::vkCmdResetQueryPool,
    "vkCmdWriteTimestamp" => query::vkCmdWriteTimestamp,
    "vkCmdCopyQueryPoolResults" => query::vkCmdCopyQueryPoolResults,

    // ── Pipelines ───────────────────────────────────────────
    "vkCreateShaderModule" => pipeline::vkCreateShaderModule,
    "vkDestroyShaderModule" => pipeline::vkDestroyShaderModule,
    "vkCreatePipelineCache" => pipeline::vkCreatePipelineCache,
    "vkDestroyPipelineCache" => pipeline::vkDestroyPipelineCache,
    "vkGetPipelineCacheData" => pipeline::vkGetPipelineCacheData,
    "vkMergePipelineCaches" => pipeline::vkMergePipelineCaches,
    "vkCreatePipelineLayout" => pipeline::vkCreatePipelineLayout,
    "vkDestroyPipelineLayout" => pipeline::vkDestroyPipelineLayout,
    "vkCreateGraphicsPipelines" => pipeline::vkCreateGraphicsPipelines,
    "vkCreateComputePipelines" => pipeline::vkCreateComputePipelines,
    "vkDestroyPipeline" => pipeline::vkDestroyPipeline,

    // ── Descriptors ─────────────────────────────────────────
    "vkCreateDescriptorSetLayout" => descriptor::vkCreateDescriptorSetLayout,
    "vkDestroyDescriptorSetLayout" => descriptor::vkDestroyDescriptorSetLayout,
    "vkCreateDescriptorPool" => descriptor::vkCreateDescriptorPool,
    "vkDestroyDescriptorPool" => descriptor::vkDestroyDescriptorPool,
    "vkResetDescriptorPool" => descriptor::vkResetDescriptorPool,
    "vkAllocateDescriptorSets" => descriptor::vkAllocateDescriptorSets,
    "vkFreeDescriptorSets" => descriptor::vkFreeDescriptorSets,
    "vkUpdateDescriptorSets" => descriptor::vkUpdateDescriptorSets,
    "vkGetDescriptorSetLayoutSupport" => descriptor::vkGetDescriptorSetLayoutSupport,
    "vkCreateDescriptorUpdateTemplate" => descriptor::vkCreateDescriptorUpdateTemplate,
    "vkDestroyDescriptorUpdateTemplate" => descriptor::vkDestroyDescriptorUpdateTemplate,
    "vkUpdateDescriptorSetWithTemplate" => descriptor::vkUpdateDescriptorSetWithTemplate,

    // ── Render passes ───────────────────────────────────────
    "vkCreateRenderPass" => renderpass::vkCreateRenderPass,
    "vkDestroyRenderPass" => renderpass::vkDestroyRenderPass,
    "vkCreateFramebuffer" => renderpass::vkCreateFramebuffer,
    "vkDestroyFramebuffer" => renderpass::vkDestroyFramebuffer,
    "vkGetRenderAreaGranularity" => renderpass::vkGetRenderAreaGranularity,

    // ── Command pools and buffers ───────────────────────────
    "vkCreateCommandPool" => command::vkCreateCommandPool,
    "vkDestroyCommandPool" => command::vkDestroyCommandPool,
    "vkResetCommandPool" => command::vkResetCommandPool,
    "vkTrimCommandPool" => command::vkTrimCommandPool,
    "vkAllocateCommandBuffers" => command::vkAllocateCommandBuffers,
    "vkFreeCommandBuffers" => command::vkFreeCommandBuffers,
    "vkBeginCommandBuffer" => command::vkBeginCommandBuffer,
    "vkEndCommandBuffer" => command::vkEndCommandBuffer,
    "vkResetCommandBuffer" => command::vkResetCommandBuffer,
    "vkCmdBindPipeline" => command::vkCmdBindPipeline,
    "vkCmdBindDescriptorSets" => command::vkCmdBindDescriptorSets,
    "vkCmdBindVertexBuffers" => command::vkCmdBindVertexBuffers,
    "vkCmdDraw" => command::vkCmdDraw,
    "vkCmdDispatch" => command::vkCmdDispatch,
    "vkCmdCopyBuffer" => command::vkCmdCopyBuffer,
    "vkCmdPipelineBarrier" => command::vkCmdPipelineBarrier,
    "vkCmdBeginRenderPass" => command::vkCmdBeginRenderPass,
    "vkCmdEndRenderPass" => command::vkCmdEndRenderPass,
    "vkCmdPushConstants" => command::vkCmdPushConstants,
    "vkCmdExecuteCommands" => command::vkCmdExecuteCommands,
    "vkCmdBindIndexBuffer" => command::vkCmdBindIndexBuffer,
    "vkCmdDrawIndexed" => command::vkCmdDrawIndexed,
    "vkCmdDrawIndirect" => command::vkCmdDrawIndirect,
    "vkCmdDrawIndexedIndirect" => command::vkCmdDrawIndexedIndirect,
    "vkCmdDispatchIndirect" => command::vkCmdDispatchIndirect,
    "vkCmdDispatchBase" => command::vkCmdDispatchBase,
    "vkCmdSetDeviceMask" => command::vkCmdSetDeviceMask,
    "vkCmdCopyImage" => command::vkCmdCopyImage,
    "vkCmdBlitImage" => command::vkCmdBlitImage,
    "vkCmdCopyBufferToImage" => command::vkCmdCopyBufferToImage,
    "vkCmdCopyImageToBuffer" => command::vkCmdCopyImageToBuffer,
    "vkCmdUpdateBuffer" => command::vkCmdUpdateBuffer,
    "vkCmdFillBuffer" => command::vkCmdFillBuffer,
    "vkCmdClearColorImage" => command::vkCmdClearColorImage,
    "vkCmdClearDepthStencilImage" => command::vkCmdClearDepthStencilImage,
    "vkCmdClearAttachments" => command::vkCmdClearAttachments,
    "vkCmdResolveImage" => command::vkCmdResolveImage,
    "vkCmdSetViewport" => command::vkCmdSetViewport,
    "vkCmdSetScissor" => command::vkCmdSetScissor,
    "vkCmdSetLineWidth" => command::vkCmdSetLineWidth,
    "vkCmdSetDepthBias" => command::vkCmdSetDepthBias,
    "vkCmdSetBlendConstants" => command::vkCmdSetBlendConstants,
    "vkCmdSetDepthBounds" => command::vkCmdSetDepthBounds,
    "vkCmdSetStencilCompareMask" => command::vkCmdSetStencilCompareMask,
    "vkCmdSetStencilWriteMask" => command::vkCmdSetStencilWriteMask,
    "vkCmdSetStencilReference" => command::vkCmdSetStencilReference,
    "vkCmdNextSubpass" => command::vkCmdNextSubpass,
    "vkCmdSetEvent" => command::vkCmdSetEvent,
    "vkCmdResetEvent" => command::vkCmdResetEvent,
    "vkCmdWaitEvents" => command::vkCmdWaitEvents,

    // ── Swapchains ──────────────────────────────────────────
    "vkCreateSwapchainKHR" => swapchain::vkCreateSwapchainKHR,
    "vkDestroySwapchainKHR" => swapchain::vkDestroySwapchainKHR,
    "vkGetSwapchainImagesKHR" => swapchain::vkGetSwapchainImagesKHR,
    "vkAcquireNextImageKHR" => swapchain::vkAcquireNextImageKHR,
    "vkAcquireNextImage2KHR" => swapchain::vkAcquireNextImage2KHR,
    "vkGetDeviceGroupSurfacePresentModesKHR" => swapchain::vkGetDeviceGroupSurfacePresentModesKHR,
    "vkQueuePresentKHR" => swapchain::vkQueuePresentKHR,
    "vkWaitForPresentKHR" => swapchain::vkWaitForPresentKHR,

    // ── Deferred operations and ray tracing ─────────────────
    "vkCreateDeferredOperationKHR" => ray_tracing::vkCreateDeferredOperationKHR,
    "vkDestroyDeferredOperationKHR" => ray_tracing::vkDestroyDeferredOperationKHR,
    "vkGetDeferredOperationMaxConcurrencyKHR" => ray_tracing::vkGetDeferredOperationMaxConcurrencyKHR,
    "vkDeferredOperationJoinKHR" => ray_tracing::vkDeferredOperationJoinKHR,
    "vkGetDeferredOperationResultKHR" => ray_tracing::vkGetDeferredOperationResultKHR,
    "vkCreateAccelerationStructureKHR" => ray_tracing::vkCreateAccelerationStructureKHR,
    "vkDestroyAccelerationStructureKHR" => ray_tracing::vkDestroyAccelerationStructureKHR,
    "vkBuildAccelerationStructuresKHR" => ray_tracing::vkBuildAccelerationStructuresKHR,
    "vkCmdBuildAccelerationStructuresKHR" => ray_tracing::vkCmdBuildAccelerationStructuresKHR,
    "vkCmdBuildAccelerationStructuresIndirectKHR" => ray_tracing::vkCmdBuildAccelerationStructuresIndirectKHR,
    "vkCopyAccelerationStructureKHR" => ray_tracing::vkCopyAccelerationStructureKHR,
    "vkCopyAccelerationStructureToMemoryKHR" => ray_tracing::vkCopyAccelerationStructureToMemoryKHR,
    "vkCopyMemoryToAccelerationStructureKHR" => ray_tracing::vkCopyMemoryToAccelerationStructureKHR,
    "vkWriteAccelerationStructuresPropertiesKHR" => ray_tracing::vkWriteAccelerationStructuresPropertiesKHR,
    "vkCmdCopyAccelerationStructureKHR" => ray_tracing::vkCmdCopyAccelerationStructureKHR,
    "vkCmdCopyAccelerationStructureToMemoryKHR" => ray_tracing::vkCmdCopyAccelerationStructureToMemoryKHR,
    "vkCmdCopyMemoryToAccelerationStructureKHR" => ray_tracing::vkCmdCopyMemoryToAccelerationStructureKHR,
    "vkGetAccelerationStructureDeviceAddressKHR" => ray_tracing::vkGetAccelerationStructureDeviceAddressKHR,
    "vkCmdWriteAccelerationStructuresPropertiesKHR" => ray_tracing::vkCmdWriteAccelerationStructuresPropertiesKHR,
    "vkGetAccelerationStructureBuildSizesKHR" => ray_tracing::vkGetAccelerationStructureBuildSizesKHR,
    "vkCreateRayTracingPipelinesKHR" => ray_tracing::vkCreateRayTracingPipelinesKHR,
    "vkCmdTraceRaysKHR" => ray_tracing::vkCmdTraceRaysKHR,
    "vkCmdTraceRaysIndirectKHR" => ray_tracing::vkCmdTraceRaysIndirectKHR,
    "vkGetRayTracingShaderGroupHandlesKHR" => ray_tracing::vkGetRayTracingShaderGroupHandlesKHR,
    "vkGetRayTracingCaptureReplayShaderGroupHandlesKHR" => ray_tracing::vkGetRayTracingCaptureReplayShaderGroupHandlesKHR,
    "vkGetRayTracingShaderGroupStackSizeKHR" => ray_tracing::vkGetRayTracingShaderGroupStackSizeKHR,
    "vkCmdSetRayTracingPipelineStackSizeKHR" => ray_tracing::vkCmdSetRayTracingPipelineStackSizeKHR,
});

intercept_table!(instance_intercept {
    "vkGetInstanceProcAddr" => vkGetInstanceProcAddr,
    "vkDestroyInstance" => instance::vkDestroyInstance,
    "vkEnumeratePhysicalDevices" => instance::vkEnumeratePhysicalDevices,
    "vkCreateHeadlessSurfaceEXT" => instance::vkCreateHeadlessSurfaceEXT,
    "vkDestroySurfaceKHR" => instance::vkDestroySurfaceKHR,
    "vkGetPhysicalDeviceSurfaceSupportKHR" => instance::vkGetPhysicalDeviceSurfaceSupportKHR,
    "vkGetPhysicalDeviceSurfaceCapabilitiesKHR" => instance::vkGetPhysicalDeviceSurfaceCapabilitiesKHR,
    "vkGetPhysicalDeviceSurfaceFormatsKHR" => instance::vkGetPhysicalDeviceSurfaceFormatsKHR,
    "vkGetPhysicalDeviceSurfacePresentModesKHR" => instance::vkGetPhysicalDeviceSurfacePresentModesKHR,
    "vkGetPhysicalDevicePresentRectanglesKHR" => instance::vkGetPhysicalDevicePresentRectanglesKHR,
});

/// Entry points the layer forwards untouched: their only handles are
/// dispatchable ones, which are never wrapped.
const PASS_THROUGH: &[&str] = &[
    "vkCreateInstance",
    "vkEnumerateInstanceVersion",
    "vkEnumerateInstanceExtensionProperties",
    "vkEnumerateInstanceLayerProperties",
    "vkCreateDevice",
    "vkEnumerateDeviceExtensionProperties",
    "vkEnumerateDeviceLayerProperties",
    "vkEnumeratePhysicalDeviceGroups",
    "vkGetPhysicalDeviceFeatures",
    "vkGetPhysicalDeviceFormatProperties",
    "vkGetPhysicalDeviceImageFormatProperties",
    "vkGetPhysicalDeviceProperties",
    "vkGetPhysicalDeviceQueueFamilyProperties",
    "vkGetPhysicalDeviceMemoryProperties",
    "vkGetPhysicalDeviceSparseImageFormatProperties",
    "vkGetPhysicalDeviceFeatures2",
    "vkGetPhysicalDeviceFormatProperties2",
    "vkGetPhysicalDeviceImageFormatProperties2",
    "vkGetPhysicalDeviceProperties2",
    "vkGetPhysicalDeviceQueueFamilyProperties2",
    "vkGetPhysicalDeviceMemoryProperties2",
    "vkGetPhysicalDeviceSparseImageFormatProperties2",
    "vkGetPhysicalDeviceExternalBufferProperties",
    "vkGetPhysicalDeviceExternalFenceProperties",
    "vkGetPhysicalDeviceExternalSemaphoreProperties",
    "vkGetDeviceGroupPeerMemoryFeatures",
    "vkGetDeviceGroupPresentCapabilitiesKHR",
    "vkGetDeviceAccelerationStructureCompatibilityKHR",
];

/// Whether the next layer's function may be handed out for `name`.
fn resolvable_downstream(name: &CStr, wrapping: bool) -> bool {
    if !wrapping {
        return true;
    }
    let known = name
        .to_str()
        .is_ok_and(|name| PASS_THROUGH.contains(&name));
    if !known {
        tracing::warn!(
            name = %name.to_string_lossy(),
            "entry point not intercepted while handles are wrapped, withholding it"
        );
    }
    known
}

/// Resolve a device-level entry point: the layer's intercept when there is
/// one, the next layer's function otherwise.
#[no_mangle]
pub unsafe extern "system" fn vkGetDeviceProcAddr(
    device: vk::Device,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    unsafe {
        if p_name.is_null() {
            return None;
        }
        let name = CStr::from_ptr(p_name);
        if let Some(f) = name.to_str().ok().and_then(device_intercept) {
            return Some(f);
        }
        let ctx = device_context(device)?;
        if !resolvable_downstream(name, ctx.handles().wrapping_enabled()) {
            return None;
        }
        ctx.dispatch.next_proc_addr(device, name)
    }
}

/// Resolve an instance-level entry point. Device-level intercepts are also
/// handed out here, as the loader builds its device trampolines from them.
#[no_mangle]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    unsafe {
        if p_name.is_null() {
            return None;
        }
        let name = CStr::from_ptr(p_name);
        if let Ok(s) = name.to_str() {
            if let Some(f) = instance_intercept(s).or_else(|| device_intercept(s)) {
                return Some(f);
            }
        }
        let ctx = instance_context(instance)?;
        if !resolvable_downstream(name, ctx.dispatch.handles().wrapping_enabled()) {
            return None;
        }
        ctx.dispatch.next_proc_addr(instance, name)
    }
}
