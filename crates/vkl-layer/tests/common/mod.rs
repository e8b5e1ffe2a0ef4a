//! A fake driver sitting below the layer, and helpers to stand up an
//! instance and device on top of it.
//!
//! Dispatchable handles are leaked words holding a per-driver key, so the
//! layer's dispatch-key lookup works the way it does under the loader. Every
//! driver entry point logs the handles it received, which is what the tests
//! inspect to see what the layer forwarded.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, OnceLock};

use ash::vk;
use ash::vk::Handle;
use dashmap::DashMap;
use parking_lot::Mutex;
use vkl_core::{LayerSettings, Report, ReportSink};
use vkl_layer::{
    register_device, register_instance, DeviceContext, InstanceContext, LayerOptions,
    ThreadSafety, ValidatorRegistry,
};

// ── Reports ─────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<Report>>,
}

impl CollectingSink {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl ReportSink for CollectingSink {
    fn report(&self, report: Report) {
        self.reports.lock().push(report);
    }
}

// ── Fake handles ────────────────────────────────────────────

static NEXT_KEY: AtomicUsize = AtomicUsize::new(0x4b00);
static NEXT_NATIVE: AtomicU64 = AtomicU64::new(0xd000_0000);

/// A dispatchable handle whose first word is `key`.
fn dispatchable<H: Handle + Copy>(key: usize) -> H {
    let word: &'static mut usize = Box::leak(Box::new(key));
    H::from_raw(word as *mut usize as u64)
}

fn key_of<H: Handle + Copy>(handle: H) -> usize {
    unsafe { *(handle.as_raw() as usize as *const usize) }
}

fn native<H: Handle + Copy>() -> H {
    H::from_raw(NEXT_NATIVE.fetch_add(0x10, Ordering::Relaxed))
}

// ── Driver state ────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Call {
    pub name: &'static str,
    pub handles: Vec<u64>,
}

/// A deferred operation the fake driver has accepted work for.
#[derive(Default)]
struct PendingOp {
    /// Application array the pipelines are written to on completion
    pipelines: usize,
    count: u32,
    done: bool,
}

pub struct FakeDriver {
    key: usize,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<&'static str, Arc<Barrier>>>,
    queues: Mutex<HashMap<(u32, u32), u64>>,
    swapchain_images: Mutex<HashMap<u64, Vec<u64>>>,
    pending: Mutex<HashMap<u64, PendingOp>>,
    /// Terminal result of every deferred operation
    pub deferred_result: Mutex<vk::Result>,
    /// Pipelines written by completed deferred operations
    pub deferred_pipelines: Mutex<Vec<u64>>,
    /// Buffer infos a template update blob holds
    pub template_buffer_count: AtomicUsize,
}

impl FakeDriver {
    fn new(key: usize) -> Self {
        Self {
            key,
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
            queues: Mutex::new(HashMap::new()),
            swapchain_images: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
            deferred_result: Mutex::new(vk::Result::SUCCESS),
            deferred_pipelines: Mutex::new(Vec::new()),
            template_buffer_count: AtomicUsize::new(0),
        }
    }

    fn record(&self, name: &'static str, handles: Vec<u64>) {
        self.calls.lock().push(Call { name, handles });
    }

    /// Handles passed to every call of `name`, in call order.
    pub fn calls_to(&self, name: &str) -> Vec<Vec<u64>> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.handles.clone())
            .collect()
    }

    pub fn last(&self, name: &str) -> Vec<u64> {
        self.calls_to(name).pop().unwrap_or_default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls_to(name).len()
    }

    /// Hold calls of any of `names` until `parties` threads are inside one
    /// of them.
    pub fn gate(&self, names: &[&'static str], parties: usize) {
        let barrier = Arc::new(Barrier::new(parties));
        let mut gates = self.gates.lock();
        for &name in names {
            gates.insert(name, barrier.clone());
        }
    }

    pub fn ungate_all(&self) {
        self.gates.lock().clear();
    }

    fn pass(&self, name: &str) {
        let gate = self.gates.lock().get(name).cloned();
        if let Some(gate) = gate {
            gate.wait();
        }
    }

    pub fn images_of(&self, swapchain: u64) -> Vec<u64> {
        self.swapchain_images
            .lock()
            .get(&swapchain)
            .cloned()
            .unwrap_or_default()
    }
}

fn drivers() -> &'static DashMap<usize, Arc<FakeDriver>> {
    static DRIVERS: OnceLock<DashMap<usize, Arc<FakeDriver>>> = OnceLock::new();
    DRIVERS.get_or_init(DashMap::new)
}

fn driver<H: Handle + Copy>(handle: H) -> Arc<FakeDriver> {
    let key = key_of(handle);
    drivers()
        .get(&key)
        .map(|d| d.value().clone())
        .expect("call on a handle the fake driver never created")
}

unsafe fn chain_find<T>(mut p_next: *const c_void, s_type: vk::StructureType) -> Option<&'static T> {
    unsafe {
        while !p_next.is_null() {
            let base = &*(p_next as *const vk::BaseInStructure<'_>);
            if base.s_type == s_type {
                return Some(&*(p_next as *const T));
            }
            p_next = base.p_next as *const c_void;
        }
        None
    }
}

unsafe fn raw_slice<'a, T>(ptr: *const T, count: u32) -> &'a [T] {
    unsafe {
        if ptr.is_null() || count == 0 {
            &[]
        } else {
            std::slice::from_raw_parts(ptr, count as usize)
        }
    }
}

fn raws<H: Handle + Copy>(handles: &[H]) -> Vec<u64> {
    handles.iter().map(|h| h.as_raw()).collect()
}

// ── Fake entry points ───────────────────────────────────────

/// A create call that hands back a fresh driver handle.
macro_rules! fake_create {
    ($fn_name:ident, $name:literal, $info:ty, $out:ty) => {
        unsafe extern "system" fn $fn_name(
            device: vk::Device,
            _info: *const $info,
            _allocator: *const vk::AllocationCallbacks<'_>,
            p_out: *mut $out,
        ) -> vk::Result {
            unsafe {
                let handle: $out = native();
                *p_out = handle;
                driver(device).record($name, vec![handle.as_raw()]);
                vk::Result::SUCCESS
            }
        }
    };
}

macro_rules! fake_destroy {
    ($fn_name:ident, $name:literal, $handle:ty) => {
        unsafe extern "system" fn $fn_name(
            device: vk::Device,
            handle: $handle,
            _allocator: *const vk::AllocationCallbacks<'_>,
        ) {
            let d = driver(device);
            d.pass($name);
            d.record($name, vec![handle.as_raw()]);
        }
    };
}

unsafe extern "system" fn fake_destroy_instance(
    instance: vk::Instance,
    _allocator: *const vk::AllocationCallbacks<'_>,
) {
    driver(instance).record("vkDestroyInstance", vec![]);
}

unsafe extern "system" fn fake_enumerate_physical_devices(
    instance: vk::Instance,
    p_count: *mut u32,
    p_physical_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    unsafe {
        if !p_physical_devices.is_null() {
            *p_physical_devices = dispatchable(key_of(instance));
        }
        *p_count = 1;
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_create_headless_surface(
    instance: vk::Instance,
    _info: *const vk::HeadlessSurfaceCreateInfoEXT<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_surface: *mut vk::SurfaceKHR,
) -> vk::Result {
    unsafe {
        let surface: vk::SurfaceKHR = native();
        *p_surface = surface;
        driver(instance).record("vkCreateHeadlessSurfaceEXT", vec![surface.as_raw()]);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_destroy_surface(
    instance: vk::Instance,
    surface: vk::SurfaceKHR,
    _allocator: *const vk::AllocationCallbacks<'_>,
) {
    driver(instance).record("vkDestroySurfaceKHR", vec![surface.as_raw()]);
}

unsafe extern "system" fn fake_destroy_device(
    device: vk::Device,
    _allocator: *const vk::AllocationCallbacks<'_>,
) {
    driver(device).record("vkDestroyDevice", vec![]);
}

unsafe extern "system" fn fake_get_device_queue(
    device: vk::Device,
    family: u32,
    index: u32,
    p_queue: *mut vk::Queue,
) {
    unsafe {
        let d = driver(device);
        let queue = *d
            .queues
            .lock()
            .entry((family, index))
            .or_insert_with(|| dispatchable::<vk::Queue>(d.key).as_raw());
        *p_queue = vk::Queue::from_raw(queue);
    }
}

unsafe extern "system" fn fake_device_wait_idle(device: vk::Device) -> vk::Result {
    let d = driver(device);
    d.pass("vkDeviceWaitIdle");
    d.record("vkDeviceWaitIdle", vec![]);
    vk::Result::SUCCESS
}

unsafe extern "system" fn fake_queue_wait_idle(queue: vk::Queue) -> vk::Result {
    let d = driver(queue);
    d.pass("vkQueueWaitIdle");
    d.record("vkQueueWaitIdle", vec![queue.as_raw()]);
    vk::Result::SUCCESS
}

unsafe extern "system" fn fake_queue_submit(
    queue: vk::Queue,
    submit_count: u32,
    p_submits: *const vk::SubmitInfo<'_>,
    fence: vk::Fence,
) -> vk::Result {
    unsafe {
        let d = driver(queue);
        d.pass("vkQueueSubmit");
        let mut handles = vec![fence.as_raw()];
        for submit in raw_slice(p_submits, submit_count) {
            handles.extend(raws(raw_slice(submit.p_wait_semaphores, submit.wait_semaphore_count)));
            handles.extend(raws(raw_slice(submit.p_signal_semaphores, submit.signal_semaphore_count)));
        }
        d.record("vkQueueSubmit", handles);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_allocate_memory(
    device: vk::Device,
    info: *const vk::MemoryAllocateInfo<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_memory: *mut vk::DeviceMemory,
) -> vk::Result {
    unsafe {
        let memory: vk::DeviceMemory = native();
        *p_memory = memory;
        let mut handles = vec![memory.as_raw()];
        if let Some(dedicated) = chain_find::<vk::MemoryDedicatedAllocateInfo<'_>>(
            (*info).p_next,
            vk::StructureType::MEMORY_DEDICATED_ALLOCATE_INFO,
        ) {
            handles.push(dedicated.buffer.as_raw());
            handles.push(dedicated.image.as_raw());
        }
        driver(device).record("vkAllocateMemory", handles);
        vk::Result::SUCCESS
    }
}

fake_destroy!(fake_free_memory, "vkFreeMemory", vk::DeviceMemory);

unsafe extern "system" fn fake_create_buffer(
    device: vk::Device,
    info: *const vk::BufferCreateInfo<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_buffer: *mut vk::Buffer,
) -> vk::Result {
    unsafe {
        // Zero-sized buffers stand in for any allocation failure.
        if (*info).size == 0 {
            driver(device).record("vkCreateBuffer", vec![]);
            return vk::Result::ERROR_OUT_OF_DEVICE_MEMORY;
        }
        let buffer: vk::Buffer = native();
        *p_buffer = buffer;
        driver(device).record("vkCreateBuffer", vec![buffer.as_raw()]);
        vk::Result::SUCCESS
    }
}

fake_destroy!(fake_destroy_buffer, "vkDestroyBuffer", vk::Buffer);

unsafe extern "system" fn fake_bind_buffer_memory(
    device: vk::Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    _offset: vk::DeviceSize,
) -> vk::Result {
    driver(device).record("vkBindBufferMemory", vec![buffer.as_raw(), memory.as_raw()]);
    vk::Result::SUCCESS
}

unsafe extern "system" fn fake_get_buffer_memory_requirements(
    device: vk::Device,
    buffer: vk::Buffer,
    p_requirements: *mut vk::MemoryRequirements,
) {
    unsafe {
        let d = driver(device);
        d.pass("vkGetBufferMemoryRequirements");
        *p_requirements = vk::MemoryRequirements {
            size: 256,
            alignment: 16,
            memory_type_bits: 1,
        };
        d.record("vkGetBufferMemoryRequirements", vec![buffer.as_raw()]);
    }
}

fake_create!(fake_create_fence, "vkCreateFence", vk::FenceCreateInfo<'_>, vk::Fence);
fake_destroy!(fake_destroy_fence, "vkDestroyFence", vk::Fence);
fake_create!(fake_create_semaphore, "vkCreateSemaphore", vk::SemaphoreCreateInfo<'_>, vk::Semaphore);
fake_destroy!(fake_destroy_semaphore, "vkDestroySemaphore", vk::Semaphore);
fake_create!(fake_create_event, "vkCreateEvent", vk::EventCreateInfo<'_>, vk::Event);

unsafe extern "system" fn fake_set_event(device: vk::Device, event: vk::Event) -> vk::Result {
    let d = driver(device);
    d.pass("vkSetEvent");
    d.record("vkSetEvent", vec![event.as_raw()]);
    vk::Result::SUCCESS
}

fake_create!(fake_create_query_pool, "vkCreateQueryPool", vk::QueryPoolCreateInfo<'_>, vk::QueryPool);

unsafe extern "system" fn fake_cmd_begin_query(
    command_buffer: vk::CommandBuffer,
    query_pool: vk::QueryPool,
    _query: u32,
    _flags: vk::QueryControlFlags,
) {
    driver(command_buffer).record("vkCmdBeginQuery", vec![query_pool.as_raw()]);
}

unsafe extern "system" fn fake_reset_fences(
    device: vk::Device,
    fence_count: u32,
    p_fences: *const vk::Fence,
) -> vk::Result {
    unsafe {
        driver(device).record("vkResetFences", raws(raw_slice(p_fences, fence_count)));
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_wait_for_fences(
    device: vk::Device,
    fence_count: u32,
    p_fences: *const vk::Fence,
    _wait_all: vk::Bool32,
    _timeout: u64,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        d.pass("vkWaitForFences");
        d.record("vkWaitForFences", raws(raw_slice(p_fences, fence_count)));
        vk::Result::SUCCESS
    }
}

fake_create!(fake_create_command_pool, "vkCreateCommandPool", vk::CommandPoolCreateInfo<'_>, vk::CommandPool);
fake_destroy!(fake_destroy_command_pool, "vkDestroyCommandPool", vk::CommandPool);

unsafe extern "system" fn fake_reset_command_pool(
    device: vk::Device,
    pool: vk::CommandPool,
    _flags: vk::CommandPoolResetFlags,
) -> vk::Result {
    let d = driver(device);
    d.pass("vkResetCommandPool");
    d.record("vkResetCommandPool", vec![pool.as_raw()]);
    vk::Result::SUCCESS
}

unsafe extern "system" fn fake_allocate_command_buffers(
    device: vk::Device,
    info: *const vk::CommandBufferAllocateInfo<'_>,
    p_command_buffers: *mut vk::CommandBuffer,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        let info = &*info;
        for i in 0..info.command_buffer_count as usize {
            *p_command_buffers.add(i) = dispatchable(d.key);
        }
        d.record("vkAllocateCommandBuffers", vec![info.command_pool.as_raw()]);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_free_command_buffers(
    device: vk::Device,
    pool: vk::CommandPool,
    count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    unsafe {
        let mut handles = vec![pool.as_raw()];
        handles.extend(raws(raw_slice(p_command_buffers, count)));
        driver(device).record("vkFreeCommandBuffers", handles);
    }
}

unsafe extern "system" fn fake_begin_command_buffer(
    command_buffer: vk::CommandBuffer,
    info: *const vk::CommandBufferBeginInfo<'_>,
) -> vk::Result {
    unsafe {
        let d = driver(command_buffer);
        d.pass("vkBeginCommandBuffer");
        let mut handles = vec![command_buffer.as_raw()];
        if let Some(inheritance) = (*info).p_inheritance_info.as_ref() {
            handles.push(inheritance.render_pass.as_raw());
            handles.push(inheritance.framebuffer.as_raw());
        }
        d.record("vkBeginCommandBuffer", handles);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_end_command_buffer(command_buffer: vk::CommandBuffer) -> vk::Result {
    driver(command_buffer).record("vkEndCommandBuffer", vec![command_buffer.as_raw()]);
    vk::Result::SUCCESS
}

unsafe extern "system" fn fake_cmd_bind_descriptor_sets(
    command_buffer: vk::CommandBuffer,
    _bind_point: vk::PipelineBindPoint,
    layout: vk::PipelineLayout,
    _first_set: u32,
    set_count: u32,
    p_sets: *const vk::DescriptorSet,
    _dynamic_offset_count: u32,
    _p_dynamic_offsets: *const u32,
) {
    unsafe {
        let mut handles = vec![layout.as_raw()];
        handles.extend(raws(raw_slice(p_sets, set_count)));
        driver(command_buffer).record("vkCmdBindDescriptorSets", handles);
    }
}

unsafe extern "system" fn fake_cmd_bind_index_buffer(
    command_buffer: vk::CommandBuffer,
    buffer: vk::Buffer,
    _offset: vk::DeviceSize,
    _index_type: vk::IndexType,
) {
    driver(command_buffer).record("vkCmdBindIndexBuffer", vec![buffer.as_raw()]);
}

/// Carries a non-dispatchable handle and has no intercept in the layer.
pub unsafe extern "system" fn fake_cmd_bind_invocation_mask(
    command_buffer: vk::CommandBuffer,
    image_view: vk::ImageView,
    _image_layout: vk::ImageLayout,
) {
    driver(command_buffer).record("vkCmdBindInvocationMaskHUAWEI", vec![image_view.as_raw()]);
}

/// Takes no non-dispatchable handle, so the layer hands it out as is.
pub unsafe extern "system" fn fake_get_device_group_peer_memory_features(
    _device: vk::Device,
    _heap_index: u32,
    _local_device_index: u32,
    _remote_device_index: u32,
    p_features: *mut vk::PeerMemoryFeatureFlags,
) {
    unsafe {
        *p_features = vk::PeerMemoryFeatureFlags::COPY_SRC;
    }
}

unsafe extern "system" fn fake_create_descriptor_update_template(
    device: vk::Device,
    info: *const vk::DescriptorUpdateTemplateCreateInfo<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_template: *mut vk::DescriptorUpdateTemplate,
) -> vk::Result {
    unsafe {
        let update_template: vk::DescriptorUpdateTemplate = native();
        *p_template = update_template;
        driver(device).record(
            "vkCreateDescriptorUpdateTemplate",
            vec![update_template.as_raw(), (*info).descriptor_set_layout.as_raw()],
        );
        vk::Result::SUCCESS
    }
}

fake_destroy!(
    fake_destroy_descriptor_update_template,
    "vkDestroyDescriptorUpdateTemplate",
    vk::DescriptorUpdateTemplate
);

/// Reads the blob as tightly packed buffer infos, which is the only layout
/// the tests build.
unsafe extern "system" fn fake_update_descriptor_set_with_template(
    device: vk::Device,
    set: vk::DescriptorSet,
    update_template: vk::DescriptorUpdateTemplate,
    p_data: *const c_void,
) {
    unsafe {
        let d = driver(device);
        let count = d.template_buffer_count.load(Ordering::Relaxed) as u32;
        let mut handles = vec![set.as_raw(), update_template.as_raw()];
        for info in raw_slice(p_data as *const vk::DescriptorBufferInfo, count) {
            handles.push(info.buffer.as_raw());
        }
        d.record("vkUpdateDescriptorSetWithTemplate", handles);
    }
}

fake_create!(fake_create_pipeline_layout, "vkCreatePipelineLayout", vk::PipelineLayoutCreateInfo<'_>, vk::PipelineLayout);
fake_create!(fake_create_pipeline_cache, "vkCreatePipelineCache", vk::PipelineCacheCreateInfo<'_>, vk::PipelineCache);
fake_create!(fake_create_descriptor_pool, "vkCreateDescriptorPool", vk::DescriptorPoolCreateInfo<'_>, vk::DescriptorPool);
fake_destroy!(fake_destroy_descriptor_pool, "vkDestroyDescriptorPool", vk::DescriptorPool);

unsafe extern "system" fn fake_create_descriptor_set_layout(
    device: vk::Device,
    info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_layout: *mut vk::DescriptorSetLayout,
) -> vk::Result {
    unsafe {
        let layout: vk::DescriptorSetLayout = native();
        *p_layout = layout;
        let mut handles = vec![layout.as_raw()];
        let info = &*info;
        for binding in raw_slice(info.p_bindings, info.binding_count) {
            handles.extend(raws(raw_slice(binding.p_immutable_samplers, binding.descriptor_count)));
        }
        driver(device).record("vkCreateDescriptorSetLayout", handles);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_allocate_descriptor_sets(
    device: vk::Device,
    info: *const vk::DescriptorSetAllocateInfo<'_>,
    p_sets: *mut vk::DescriptorSet,
) -> vk::Result {
    unsafe {
        let info = &*info;
        let mut handles = vec![info.descriptor_pool.as_raw()];
        handles.extend(raws(raw_slice(info.p_set_layouts, info.descriptor_set_count)));
        for i in 0..info.descriptor_set_count as usize {
            *p_sets.add(i) = native();
        }
        driver(device).record("vkAllocateDescriptorSets", handles);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_free_descriptor_sets(
    device: vk::Device,
    pool: vk::DescriptorPool,
    count: u32,
    p_sets: *const vk::DescriptorSet,
) -> vk::Result {
    unsafe {
        let mut handles = vec![pool.as_raw()];
        handles.extend(raws(raw_slice(p_sets, count)));
        driver(device).record("vkFreeDescriptorSets", handles);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_update_descriptor_sets(
    device: vk::Device,
    write_count: u32,
    p_writes: *const vk::WriteDescriptorSet<'_>,
    copy_count: u32,
    p_copies: *const vk::CopyDescriptorSet<'_>,
) {
    unsafe {
        let d = driver(device);
        d.pass("vkUpdateDescriptorSets");
        let mut handles = Vec::new();
        for write in raw_slice(p_writes, write_count) {
            handles.push(write.dst_set.as_raw());
            if write.descriptor_type == vk::DescriptorType::UNIFORM_BUFFER {
                for info in raw_slice(write.p_buffer_info, write.descriptor_count) {
                    handles.push(info.buffer.as_raw());
                }
            }
        }
        for copy in raw_slice(p_copies, copy_count) {
            handles.push(copy.src_set.as_raw());
            handles.push(copy.dst_set.as_raw());
        }
        d.record("vkUpdateDescriptorSets", handles);
    }
}

unsafe extern "system" fn fake_create_swapchain(
    device: vk::Device,
    info: *const vk::SwapchainCreateInfoKHR<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_swapchain: *mut vk::SwapchainKHR,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        let swapchain: vk::SwapchainKHR = native();
        *p_swapchain = swapchain;
        let images = (0..3).map(|_| native::<vk::Image>().as_raw()).collect();
        d.swapchain_images.lock().insert(swapchain.as_raw(), images);
        d.record(
            "vkCreateSwapchainKHR",
            vec![swapchain.as_raw(), (*info).surface.as_raw(), (*info).old_swapchain.as_raw()],
        );
        vk::Result::SUCCESS
    }
}

fake_destroy!(fake_destroy_swapchain, "vkDestroySwapchainKHR", vk::SwapchainKHR);

unsafe extern "system" fn fake_get_swapchain_images(
    device: vk::Device,
    swapchain: vk::SwapchainKHR,
    p_count: *mut u32,
    p_images: *mut vk::Image,
) -> vk::Result {
    unsafe {
        let images = driver(device).images_of(swapchain.as_raw());
        if p_images.is_null() {
            *p_count = images.len() as u32;
            return vk::Result::SUCCESS;
        }
        let n = (*p_count as usize).min(images.len());
        for (i, &image) in images.iter().take(n).enumerate() {
            *p_images.add(i) = vk::Image::from_raw(image);
        }
        *p_count = n as u32;
        if n < images.len() {
            vk::Result::INCOMPLETE
        } else {
            vk::Result::SUCCESS
        }
    }
}

unsafe extern "system" fn fake_acquire_next_image(
    device: vk::Device,
    swapchain: vk::SwapchainKHR,
    _timeout: u64,
    semaphore: vk::Semaphore,
    fence: vk::Fence,
    p_index: *mut u32,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        d.pass("vkAcquireNextImageKHR");
        *p_index = 0;
        d.record(
            "vkAcquireNextImageKHR",
            vec![swapchain.as_raw(), semaphore.as_raw(), fence.as_raw()],
        );
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_wait_for_present(
    device: vk::Device,
    swapchain: vk::SwapchainKHR,
    _present_id: u64,
    _timeout: u64,
) -> vk::Result {
    let d = driver(device);
    d.pass("vkWaitForPresentKHR");
    d.record("vkWaitForPresentKHR", vec![swapchain.as_raw()]);
    vk::Result::SUCCESS
}

unsafe extern "system" fn fake_create_deferred_operation(
    device: vk::Device,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_operation: *mut vk::DeferredOperationKHR,
) -> vk::Result {
    unsafe {
        let operation: vk::DeferredOperationKHR = native();
        *p_operation = operation;
        driver(device).record("vkCreateDeferredOperationKHR", vec![operation.as_raw()]);
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_destroy_deferred_operation(
    device: vk::Device,
    operation: vk::DeferredOperationKHR,
    _allocator: *const vk::AllocationCallbacks<'_>,
) {
    let d = driver(device);
    d.pending.lock().remove(&operation.as_raw());
    d.record("vkDestroyDeferredOperationKHR", vec![operation.as_raw()]);
}

unsafe extern "system" fn fake_get_deferred_operation_max_concurrency(
    _device: vk::Device,
    _operation: vk::DeferredOperationKHR,
) -> u32 {
    4
}

/// Runs the parked work to completion: pipelines are written only when the
/// configured terminal result is a success.
unsafe extern "system" fn fake_deferred_operation_join(
    device: vk::Device,
    operation: vk::DeferredOperationKHR,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        d.record("vkDeferredOperationJoinKHR", vec![operation.as_raw()]);
        let succeeded = d.deferred_result.lock().as_raw() >= 0;
        let mut pending = d.pending.lock();
        if let Some(op) = pending.get_mut(&operation.as_raw()) {
            if !op.done && succeeded {
                let out = op.pipelines as *mut vk::Pipeline;
                for i in 0..op.count as usize {
                    let pipeline: vk::Pipeline = native();
                    *out.add(i) = pipeline;
                    d.deferred_pipelines.lock().push(pipeline.as_raw());
                }
            }
            op.done = true;
        }
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_get_deferred_operation_result(
    device: vk::Device,
    operation: vk::DeferredOperationKHR,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        let done = d
            .pending
            .lock()
            .get(&operation.as_raw())
            .map_or(true, |op| op.done);
        if done {
            *d.deferred_result.lock()
        } else {
            vk::Result::NOT_READY
        }
    }
}

unsafe extern "system" fn fake_create_ray_tracing_pipelines(
    device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    pipeline_cache: vk::PipelineCache,
    count: u32,
    _infos: *const vk::RayTracingPipelineCreateInfoKHR<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_pipelines: *mut vk::Pipeline,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        d.record(
            "vkCreateRayTracingPipelinesKHR",
            vec![deferred_operation.as_raw(), pipeline_cache.as_raw()],
        );
        if deferred_operation != vk::DeferredOperationKHR::null() {
            d.pending.lock().insert(
                deferred_operation.as_raw(),
                PendingOp {
                    pipelines: p_pipelines as usize,
                    count,
                    done: false,
                },
            );
            return vk::Result::OPERATION_DEFERRED_KHR;
        }
        for i in 0..count as usize {
            *p_pipelines.add(i) = native();
        }
        vk::Result::SUCCESS
    }
}

unsafe extern "system" fn fake_build_acceleration_structures(
    device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    info_count: u32,
    p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
    _pp_ranges: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
) -> vk::Result {
    unsafe {
        let d = driver(device);
        let mut handles = vec![deferred_operation.as_raw()];
        for info in raw_slice(p_infos, info_count) {
            handles.push(info.dst_acceleration_structure.as_raw());
        }
        d.record("vkBuildAccelerationStructuresKHR", handles);
        if deferred_operation != vk::DeferredOperationKHR::null() {
            d.pending
                .lock()
                .insert(deferred_operation.as_raw(), PendingOp::default());
            return vk::Result::OPERATION_DEFERRED_KHR;
        }
        vk::Result::SUCCESS
    }
}

fake_create!(
    fake_create_acceleration_structure,
    "vkCreateAccelerationStructureKHR",
    vk::AccelerationStructureCreateInfoKHR<'_>,
    vk::AccelerationStructureKHR
);

macro_rules! lookup {
    ($name:expr, { $($vk:literal => $f:expr,)* }) => {
        match $name {
            $(
                $vk => Some(unsafe {
                    std::mem::transmute::<*const (), unsafe extern "system" fn()>($f as *const ())
                }),
            )*
            _ => None,
        }
    };
}

unsafe extern "system" fn fake_get_instance_proc_addr(
    _instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    unsafe {
        let name = CStr::from_ptr(p_name).to_str().ok()?;
        lookup!(name, {
            "vkDestroyInstance" => fake_destroy_instance,
            "vkEnumeratePhysicalDevices" => fake_enumerate_physical_devices,
            "vkCreateHeadlessSurfaceEXT" => fake_create_headless_surface,
            "vkDestroySurfaceKHR" => fake_destroy_surface,
        })
    }
}

unsafe extern "system" fn fake_get_device_proc_addr(
    _device: vk::Device,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    unsafe {
        let name = CStr::from_ptr(p_name).to_str().ok()?;
        lookup!(name, {
            "vkDestroyDevice" => fake_destroy_device,
            "vkGetDeviceQueue" => fake_get_device_queue,
            "vkDeviceWaitIdle" => fake_device_wait_idle,
            "vkQueueWaitIdle" => fake_queue_wait_idle,
            "vkQueueSubmit" => fake_queue_submit,
            "vkAllocateMemory" => fake_allocate_memory,
            "vkFreeMemory" => fake_free_memory,
            "vkCreateBuffer" => fake_create_buffer,
            "vkDestroyBuffer" => fake_destroy_buffer,
            "vkBindBufferMemory" => fake_bind_buffer_memory,
            "vkGetBufferMemoryRequirements" => fake_get_buffer_memory_requirements,
            "vkCreateFence" => fake_create_fence,
            "vkDestroyFence" => fake_destroy_fence,
            "vkResetFences" => fake_reset_fences,
            "vkWaitForFences" => fake_wait_for_fences,
            "vkCreateSemaphore" => fake_create_semaphore,
            "vkDestroySemaphore" => fake_destroy_semaphore,
            "vkCreateEvent" => fake_create_event,
            "vkSetEvent" => fake_set_event,
            "vkCreateQueryPool" => fake_create_query_pool,
            "vkCmdBeginQuery" => fake_cmd_begin_query,
            "vkCreateCommandPool" => fake_create_command_pool,
            "vkDestroyCommandPool" => fake_destroy_command_pool,
            "vkResetCommandPool" => fake_reset_command_pool,
            "vkAllocateCommandBuffers" => fake_allocate_command_buffers,
            "vkFreeCommandBuffers" => fake_free_command_buffers,
            "vkBeginCommandBuffer" => fake_begin_command_buffer,
            "vkEndCommandBuffer" => fake_end_command_buffer,
            "vkCmdBindDescriptorSets" => fake_cmd_bind_descriptor_sets,
            "vkCmdBindIndexBuffer" => fake_cmd_bind_index_buffer,
            "vkCmdBindInvocationMaskHUAWEI" => fake_cmd_bind_invocation_mask,
            "vkGetDeviceGroupPeerMemoryFeatures" => fake_get_device_group_peer_memory_features,
            "vkCreateDescriptorUpdateTemplate" => fake_create_descriptor_update_template,
            "vkDestroyDescriptorUpdateTemplate" => fake_destroy_descriptor_update_template,
            "vkUpdateDescriptorSetWithTemplate" => fake_update_descriptor_set_with_template,
            "vkCreatePipelineLayout" => fake_create_pipeline_layout,
            "vkCreatePipelineCache" => fake_create_pipeline_cache,
            "vkCreateDescriptorSetLayout" => fake_create_descriptor_set_layout,
            "vkCreateDescriptorPool" => fake_create_descriptor_pool,
            "vkDestroyDescriptorPool" => fake_destroy_descriptor_pool,
            "vkAllocateDescriptorSets" => fake_allocate_descriptor_sets,
            "vkFreeDescriptorSets" => fake_free_descriptor_sets,
            "vkUpdateDescriptorSets" => fake_update_descriptor_sets,
            "vkCreateSwapchainKHR" => fake_create_swapchain,
            "vkDestroySwapchainKHR" => fake_destroy_swapchain,
            "vkGetSwapchainImagesKHR" => fake_get_swapchain_images,
            "vkAcquireNextImageKHR" => fake_acquire_next_image,
            "vkWaitForPresentKHR" => fake_wait_for_present,
            "vkCreateDeferredOperationKHR" => fake_create_deferred_operation,
            "vkDestroyDeferredOperationKHR" => fake_destroy_deferred_operation,
            "vkGetDeferredOperationMaxConcurrencyKHR" => fake_get_deferred_operation_max_concurrency,
            "vkDeferredOperationJoinKHR" => fake_deferred_operation_join,
            "vkGetDeferredOperationResultKHR" => fake_get_deferred_operation_result,
            "vkCreateRayTracingPipelinesKHR" => fake_create_ray_tracing_pipelines,
            "vkBuildAccelerationStructuresKHR" => fake_build_acceleration_structures,
            "vkCreateAccelerationStructureKHR" => fake_create_acceleration_structure,
        })
    }
}

// ── Test environment ────────────────────────────────────────

/// An instance and a device registered with the layer on top of one fake
/// driver.
pub struct TestEnv {
    pub instance: vk::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: vk::Device,
    pub instance_ctx: Arc<InstanceContext>,
    pub ctx: Arc<DeviceContext>,
    pub driver: Arc<FakeDriver>,
    pub sink: Arc<CollectingSink>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::build(LayerSettings::default(), ValidatorRegistry::new())
    }

    pub fn unwrapped() -> Self {
        Self::build(
            LayerSettings {
                wrap_handles: false,
                ..LayerSettings::default()
            },
            ValidatorRegistry::new(),
        )
    }

    pub fn build(settings: LayerSettings, validators: ValidatorRegistry) -> Self {
        let instance_key = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
        let device_key = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
        let driver = Arc::new(FakeDriver::new(device_key));
        drivers().insert(instance_key, driver.clone());
        drivers().insert(device_key, driver.clone());

        let sink = Arc::new(CollectingSink::default());
        let instance: vk::Instance = dispatchable(instance_key);
        let physical_device: vk::PhysicalDevice = dispatchable(instance_key);
        let device: vk::Device = dispatchable(device_key);

        let options = LayerOptions {
            settings,
            validators,
            sink: sink.clone(),
        };
        let (instance_ctx, ctx) = unsafe {
            let instance_ctx = register_instance(instance, fake_get_instance_proc_addr, options);
            let ctx = register_device(physical_device, device, fake_get_device_proc_addr)
                .expect("instance registered above");
            (instance_ctx, ctx)
        };

        Self {
            instance,
            physical_device,
            device,
            instance_ctx,
            ctx,
            driver,
            sink,
        }
    }

    pub fn thread_safety(&self) -> &ThreadSafety {
        self.ctx
            .thread_safety
            .as_deref()
            .expect("thread safety enabled")
    }

    /// Driver handle behind an application handle.
    pub fn native<H: Handle + Copy>(&self, handle: H) -> u64 {
        self.ctx
            .handles()
            .try_unwrap(handle)
            .expect("handle known to the layer")
            .as_raw()
    }

    // ── Shortcuts through the layer's intercepts ────────────

    pub fn queue(&self, index: u32) -> vk::Queue {
        let mut queue = vk::Queue::null();
        unsafe { vkl_layer::device::vkGetDeviceQueue(self.device, 0, index, &mut queue) };
        queue
    }

    pub fn create_buffer(&self, size: vk::DeviceSize) -> (vk::Result, vk::Buffer) {
        let info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(vk::BufferUsageFlags::UNIFORM_BUFFER);
        let mut buffer = vk::Buffer::null();
        let result = unsafe {
            vkl_layer::memory::vkCreateBuffer(self.device, &info, std::ptr::null(), &mut buffer)
        };
        (result, buffer)
    }

    pub fn buffer(&self) -> vk::Buffer {
        let (result, buffer) = self.create_buffer(256);
        assert_eq!(result, vk::Result::SUCCESS);
        buffer
    }

    pub fn fence(&self) -> vk::Fence {
        let info = vk::FenceCreateInfo::default();
        let mut fence = vk::Fence::null();
        let result =
            unsafe { vkl_layer::sync::vkCreateFence(self.device, &info, std::ptr::null(), &mut fence) };
        assert_eq!(result, vk::Result::SUCCESS);
        fence
    }

    pub fn semaphore(&self) -> vk::Semaphore {
        let info = vk::SemaphoreCreateInfo::default();
        let mut semaphore = vk::Semaphore::null();
        let result = unsafe {
            vkl_layer::sync::vkCreateSemaphore(self.device, &info, std::ptr::null(), &mut semaphore)
        };
        assert_eq!(result, vk::Result::SUCCESS);
        semaphore
    }

    pub fn event(&self) -> vk::Event {
        let info = vk::EventCreateInfo::default();
        let mut event = vk::Event::null();
        let result =
            unsafe { vkl_layer::sync::vkCreateEvent(self.device, &info, std::ptr::null(), &mut event) };
        assert_eq!(result, vk::Result::SUCCESS);
        event
    }

    pub fn query_pool(&self) -> vk::QueryPool {
        let info = vk::QueryPoolCreateInfo::default()
            .query_type(vk::QueryType::OCCLUSION)
            .query_count(4);
        let mut pool = vk::QueryPool::null();
        let result = unsafe {
            vkl_layer::query::vkCreateQueryPool(self.device, &info, std::ptr::null(), &mut pool)
        };
        assert_eq!(result, vk::Result::SUCCESS);
        pool
    }

    pub fn command_pool(&self) -> vk::CommandPool {
        let info = vk::CommandPoolCreateInfo::default();
        let mut pool = vk::CommandPool::null();
        let result = unsafe {
            vkl_layer::command::vkCreateCommandPool(self.device, &info, std::ptr::null(), &mut pool)
        };
        assert_eq!(result, vk::Result::SUCCESS);
        pool
    }

    pub fn command_buffers(&self, pool: vk::CommandPool, count: u32) -> Vec<vk::CommandBuffer> {
        let info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);
        let mut command_buffers = vec![vk::CommandBuffer::null(); count as usize];
        let result = unsafe {
            vkl_layer::command::vkAllocateCommandBuffers(
                self.device,
                &info,
                command_buffers.as_mut_ptr(),
            )
        };
        assert_eq!(result, vk::Result::SUCCESS);
        command_buffers
    }

    pub fn set_layout(&self, flags: vk::DescriptorSetLayoutCreateFlags) -> vk::DescriptorSetLayout {
        let bindings = [vk::DescriptorSetLayoutBinding::default()
            .binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::ALL)];
        let info = vk::DescriptorSetLayoutCreateInfo::default()
            .flags(flags)
            .bindings(&bindings);
        let mut layout = vk::DescriptorSetLayout::null();
        let result = unsafe {
            vkl_layer::descriptor::vkCreateDescriptorSetLayout(
                self.device,
                &info,
                std::ptr::null(),
                &mut layout,
            )
        };
        assert_eq!(result, vk::Result::SUCCESS);
        layout
    }

    /// One uniform buffer binding per entry of `binding_flags`, declared
    /// through a binding-flags structure in the create info's chain.
    pub fn set_layout_with_binding_flags(
        &self,
        binding_flags: &[vk::DescriptorBindingFlags],
    ) -> vk::DescriptorSetLayout {
        let bindings: Vec<vk::DescriptorSetLayoutBinding<'_>> = (0..binding_flags.len() as u32)
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(binding)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .descriptor_count(1)
                    .stage_flags(vk::ShaderStageFlags::ALL)
            })
            .collect();
        let mut flags_info =
            vk::DescriptorSetLayoutBindingFlagsCreateInfo::default().binding_flags(binding_flags);
        let info = vk::DescriptorSetLayoutCreateInfo::default()
            .bindings(&bindings)
            .push_next(&mut flags_info);
        let mut layout = vk::DescriptorSetLayout::null();
        let result = unsafe {
            vkl_layer::descriptor::vkCreateDescriptorSetLayout(
                self.device,
                &info,
                std::ptr::null(),
                &mut layout,
            )
        };
        assert_eq!(result, vk::Result::SUCCESS);
        layout
    }

    pub fn descriptor_pool(&self) -> vk::DescriptorPool {
        let sizes = [vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: 16,
        }];
        let info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(16)
            .pool_sizes(&sizes);
        let mut pool = vk::DescriptorPool::null();
        let result = unsafe {
            vkl_layer::descriptor::vkCreateDescriptorPool(self.device, &info, std::ptr::null(), &mut pool)
        };
        assert_eq!(result, vk::Result::SUCCESS);
        pool
    }

    pub fn descriptor_sets(
        &self,
        pool: vk::DescriptorPool,
        layouts: &[vk::DescriptorSetLayout],
    ) -> Vec<vk::DescriptorSet> {
        let info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(pool)
            .set_layouts(layouts);
        let mut sets = vec![vk::DescriptorSet::null(); layouts.len()];
        let result = unsafe {
            vkl_layer::descriptor::vkAllocateDescriptorSets(self.device, &info, sets.as_mut_ptr())
        };
        assert_eq!(result, vk::Result::SUCCESS);
        sets
    }

    /// Point binding 0 of `set` at `buffer`.
    pub fn update_set(&self, set: vk::DescriptorSet, buffer: vk::Buffer) {
        let buffer_info = [vk::DescriptorBufferInfo {
            buffer,
            offset: 0,
            range: vk::WHOLE_SIZE,
        }];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .buffer_info(&buffer_info);
        unsafe {
            vkl_layer::descriptor::vkUpdateDescriptorSets(self.device, 1, &write, 0, std::ptr::null())
        };
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        let info = vk::HeadlessSurfaceCreateInfoEXT::default();
        let mut surface = vk::SurfaceKHR::null();
        let result = unsafe {
            vkl_layer::instance::vkCreateHeadlessSurfaceEXT(
                self.instance,
                &info,
                std::ptr::null(),
                &mut surface,
            )
        };
        assert_eq!(result, vk::Result::SUCCESS);
        surface
    }

    pub fn swapchain(&self, surface: vk::SurfaceKHR) -> vk::SwapchainKHR {
        let info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(3)
            .image_format(vk::Format::B8G8R8A8_UNORM)
            .image_extent(vk::Extent2D {
                width: 64,
                height: 64,
            })
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT);
        let mut swapchain = vk::SwapchainKHR::null();
        let result = unsafe {
            vkl_layer::swapchain::vkCreateSwapchainKHR(
                self.device,
                &info,
                std::ptr::null(),
                &mut swapchain,
            )
        };
        assert_eq!(result, vk::Result::SUCCESS);
        swapchain
    }

    pub fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> Vec<vk::Image> {
        let mut count = 0u32;
        let mut images;
        unsafe {
            vkl_layer::swapchain::vkGetSwapchainImagesKHR(
                self.device,
                swapchain,
                &mut count,
                std::ptr::null_mut(),
            );
            images = vec![vk::Image::null(); count as usize];
            vkl_layer::swapchain::vkGetSwapchainImagesKHR(
                self.device,
                swapchain,
                &mut count,
                images.as_mut_ptr(),
            );
        }
        images
    }

    pub fn deferred_operation(&self) -> vk::DeferredOperationKHR {
        let mut operation = vk::DeferredOperationKHR::null();
        let result = unsafe {
            vkl_layer::ray_tracing::vkCreateDeferredOperationKHR(
                self.device,
                std::ptr::null(),
                &mut operation,
            )
        };
        assert_eq!(result, vk::Result::SUCCESS);
        operation
    }

    pub fn pipeline_cache(&self) -> vk::PipelineCache {
        let info = vk::PipelineCacheCreateInfo::default();
        let mut cache = vk::PipelineCache::null();
        let result = unsafe {
            vkl_layer::pipeline::vkCreatePipelineCache(self.device, &info, std::ptr::null(), &mut cache)
        };
        assert_eq!(result, vk::Result::SUCCESS);
        cache
    }

    pub fn pipeline_layout(&self, set_layouts: &[vk::DescriptorSetLayout]) -> vk::PipelineLayout {
        let info = vk::PipelineLayoutCreateInfo::default().set_layouts(set_layouts);
        let mut layout = vk::PipelineLayout::null();
        let result = unsafe {
            vkl_layer::pipeline::vkCreatePipelineLayout(self.device, &info, std::ptr::null(), &mut layout)
        };
        assert_eq!(result, vk::Result::SUCCESS);
        layout
    }
}
