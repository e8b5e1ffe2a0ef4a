//! Swapchains, presentation images and presentation.

use std::collections::hash_map::Entry;

use ash::vk;
use ash::vk::Handle;
use vkl_core::RecordObject;

use crate::context::device_or_return;
use crate::dispatch::{forward_intercepts, DeviceDispatch};
use crate::params::{created, created_slice};
use crate::safe_struct::{unwrap_handles, unwrap_pnext_chain, Scratch};

pub unsafe extern "system" fn vkCreateSwapchainKHR(
    device: vk::Device,
    p_create_info: *const vk::SwapchainCreateInfoKHR<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_swapchain: *mut vk::SwapchainKHR,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let create_info = &*p_create_info;
        let mut record = RecordObject::new("vkCreateSwapchainKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_create_swapchain_khr(device, create_info, &record));
        record.result = ctx
            .dispatch
            .create_swapchain_khr(device, p_create_info, p_allocator, p_swapchain);
        let swapchain = created(&record, p_swapchain);
        ctx.chain.post(|vo| {
            vo.post_call_record_create_swapchain_khr(device, create_info, swapchain, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkDestroySwapchainKHR(
    device: vk::Device,
    swapchain: vk::SwapchainKHR,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    unsafe {
        let ctx = device_or_return!(device);
        let record = RecordObject::new("vkDestroySwapchainKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_destroy_swapchain_khr(device, swapchain, &record));
        ctx.dispatch.destroy_swapchain_khr(device, swapchain, p_allocator);
        ctx.chain
            .post(|vo| vo.post_call_record_destroy_swapchain_khr(device, swapchain, &record));
    }
}

pub unsafe extern "system" fn vkGetSwapchainImagesKHR(
    device: vk::Device,
    swapchain: vk::SwapchainKHR,
    p_swapchain_image_count: *mut u32,
    p_swapchain_images: *mut vk::Image,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkGetSwapchainImagesKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_get_swapchain_images_khr(device, swapchain, &record));
        record.result = ctx.dispatch.get_swapchain_images_khr(
            device,
            swapchain,
            p_swapchain_image_count,
            p_swapchain_images,
        );
        let count = if p_swapchain_image_count.is_null() {
            0
        } else {
            *p_swapchain_image_count
        };
        let images = created_slice(&record, p_swapchain_images, count);
        ctx.chain.post(|vo| {
            vo.post_call_record_get_swapchain_images_khr(device, swapchain, images, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkAcquireNextImageKHR(
    device: vk::Device,
    swapchain: vk::SwapchainKHR,
    timeout: u64,
    semaphore: vk::Semaphore,
    fence: vk::Fence,
    p_image_index: *mut u32,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkAcquireNextImageKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_acquire_next_image_khr(device, swapchain, timeout, semaphore, fence, &record)
        });
        let d = &ctx.dispatch;
        record.result = (d.swapchain.acquire_next_image_khr)(
            device,
            d.unwrap(swapchain),
            timeout,
            d.unwrap(semaphore),
            d.unwrap(fence),
            p_image_index,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_acquire_next_image_khr(device, swapchain, timeout, semaphore, fence, &record)
        });
        record.result
    }
}

pub unsafe extern "system" fn vkAcquireNextImage2KHR(
    device: vk::Device,
    p_acquire_info: *const vk::AcquireNextImageInfoKHR<'_>,
    p_image_index: *mut u32,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let acquire_info = &*p_acquire_info;
        let mut record = RecordObject::new("vkAcquireNextImage2KHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_acquire_next_image2_khr(device, acquire_info, &record));
        let mut scratch = Scratch::new();
        let local = ctx.dispatch.local(&mut scratch, p_acquire_info, |handles, s, info| {
            info.p_next = unwrap_pnext_chain(handles, s, info.p_next);
            info.swapchain = handles.unwrap_handle(info.swapchain);
            info.semaphore = handles.unwrap_handle(info.semaphore);
            info.fence = handles.unwrap_handle(info.fence);
        });
        record.result = (ctx.dispatch.swapchain.acquire_next_image2_khr)(device, local, p_image_index);
        ctx.chain
            .post(|vo| vo.post_call_record_acquire_next_image2_khr(device, acquire_info, &record));
        record.result
    }
}

forward_intercepts! {
    device fn vkGetDeviceGroupSurfacePresentModesKHR(
        device: vk::Device,
        surface: vk::SurfaceKHR,
        p_modes: *mut vk::DeviceGroupPresentModeFlagsKHR
    ) -> vk::Result = swapchain.get_device_group_surface_present_modes_khr;
        hooks pre_call_record_get_device_group_surface_present_modes_khr,
            post_call_record_get_device_group_surface_present_modes_khr(surface);
        unwrap(surface);
}

pub unsafe extern "system" fn vkQueuePresentKHR(
    queue: vk::Queue,
    p_present_info: *const vk::PresentInfoKHR<'_>,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(queue, vk::Result::ERROR_INITIALIZATION_FAILED);
        let present_info = &*p_present_info;
        let mut record = RecordObject::new("vkQueuePresentKHR");
        ctx.chain
            .pre(|vo| vo.pre_call_record_queue_present_khr(queue, present_info, &record));
        record.result = ctx.dispatch.queue_present_khr(queue, p_present_info);
        ctx.chain
            .post(|vo| vo.post_call_record_queue_present_khr(queue, present_info, &record));
        record.result
    }
}

pub unsafe extern "system" fn vkWaitForPresentKHR(
    device: vk::Device,
    swapchain: vk::SwapchainKHR,
    present_id: u64,
    timeout: u64,
) -> vk::Result {
    unsafe {
        let ctx = device_or_return!(device, vk::Result::ERROR_INITIALIZATION_FAILED);
        let mut record = RecordObject::new("vkWaitForPresentKHR");
        ctx.chain.pre(|vo| {
            vo.pre_call_record_wait_for_present_khr(device, swapchain, present_id, timeout, &record)
        });
        record.result = (ctx.dispatch.present_wait.wait_for_present_khr)(
            device,
            ctx.dispatch.unwrap(swapchain),
            present_id,
            timeout,
        );
        ctx.chain.post(|vo| {
            vo.post_call_record_wait_for_present_khr(device, swapchain, present_id, timeout, &record)
        });
        record.result
    }
}

impl DeviceDispatch {
    pub unsafe fn create_swapchain_khr(
        &self,
        device: vk::Device,
        p_create_info: *const vk::SwapchainCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_swapchain: *mut vk::SwapchainKHR,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let create_info = self.local(&mut scratch, p_create_info, |handles, s, ci| {
                ci.p_next = unwrap_pnext_chain(handles, s, ci.p_next);
                ci.surface = handles.unwrap_handle(ci.surface);
                ci.old_swapchain = handles.unwrap_handle(ci.old_swapchain);
            });
            let result =
                (self.swapchain.create_swapchain_khr)(device, create_info, p_allocator, p_swapchain);
            self.wrap_created(result, p_swapchain, None);
            result
        }
    }

    /// Presentable images are owned by the swapchain and retire with it.
    pub unsafe fn destroy_swapchain_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        unsafe {
            self.swapchain_images.lock().remove(&swapchain.as_raw());
            self.handles.destroy_children(swapchain.as_raw());
            let native = self.handles.erase(swapchain);
            (self.swapchain.destroy_swapchain_khr)(device, native, p_allocator)
        }
    }

    /// Query the images and hand out one stable wrapped id per driver image,
    /// no matter how often the application asks.
    pub unsafe fn get_swapchain_images_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        p_swapchain_image_count: *mut u32,
        p_swapchain_images: *mut vk::Image,
    ) -> vk::Result {
        unsafe {
            let result = (self.swapchain.get_swapchain_images_khr)(
                device,
                self.unwrap(swapchain),
                p_swapchain_image_count,
                p_swapchain_images,
            );
            if result.as_raw() < 0 || p_swapchain_images.is_null() || p_swapchain_image_count.is_null() {
                return result;
            }

            let mut known = self.swapchain_images.lock();
            let images = known.entry(swapchain.as_raw()).or_default();
            for i in 0..*p_swapchain_image_count as usize {
                let slot = p_swapchain_images.add(i);
                let native = (*slot).as_raw();
                let wrapped = match images.entry(native) {
                    Entry::Occupied(e) => *e.get(),
                    Entry::Vacant(e) => {
                        let id = self
                            .handles
                            .wrap_new(vk::Image::from_raw(native), Some(swapchain.as_raw()))
                            .as_raw();
                        *e.insert(id)
                    }
                };
                *slot = vk::Image::from_raw(wrapped);
            }
            result
        }
    }

    pub unsafe fn queue_present_khr(
        &self,
        queue: vk::Queue,
        p_present_info: *const vk::PresentInfoKHR<'_>,
    ) -> vk::Result {
        unsafe {
            let mut scratch = Scratch::new();
            let present_info = self.local(&mut scratch, p_present_info, |handles, s, pi| {
                pi.p_next = unwrap_pnext_chain(handles, s, pi.p_next);
                pi.p_wait_semaphores =
                    unwrap_handles(handles, s, pi.p_wait_semaphores, pi.wait_semaphore_count);
                pi.p_swapchains = unwrap_handles(handles, s, pi.p_swapchains, pi.swapchain_count);
            });
            (self.swapchain.queue_present_khr)(queue, present_info)
        }
    }
}
