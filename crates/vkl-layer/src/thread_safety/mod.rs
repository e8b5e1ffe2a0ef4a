//! Detection of concurrent host access to externally synchronized objects.
//!
//! Every hook brackets the driver call with start/finish claims on the
//! objects the call touches. Claims are detective: a conflicting claim from
//! another thread is reported and then recorded anyway, so tracking carries on
//! and the application's call still reaches the driver.

pub mod counter;
mod hooks;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use ash::vk;
use ash::vk::Handle;
use parking_lot::RwLock;
use vkl_core::{DeferredLedger, Location, ReportSink};

pub use counter::{Counter, ObjectUseData, VUID_MULTIPLE_THREADS_READ, VUID_MULTIPLE_THREADS_WRITE};

const INSTANCE_OBJECT_TYPES: &[vk::ObjectType] = &[
    vk::ObjectType::INSTANCE,
    vk::ObjectType::PHYSICAL_DEVICE,
    vk::ObjectType::SURFACE_KHR,
];

const DEVICE_OBJECT_TYPES: &[vk::ObjectType] = &[
    vk::ObjectType::DEVICE,
    vk::ObjectType::QUEUE,
    vk::ObjectType::COMMAND_BUFFER,
    vk::ObjectType::COMMAND_POOL,
    vk::ObjectType::DEVICE_MEMORY,
    vk::ObjectType::BUFFER,
    vk::ObjectType::BUFFER_VIEW,
    vk::ObjectType::IMAGE,
    vk::ObjectType::IMAGE_VIEW,
    vk::ObjectType::SAMPLER,
    vk::ObjectType::SAMPLER_YCBCR_CONVERSION,
    vk::ObjectType::FENCE,
    vk::ObjectType::SEMAPHORE,
    vk::ObjectType::EVENT,
    vk::ObjectType::QUERY_POOL,
    vk::ObjectType::SHADER_MODULE,
    vk::ObjectType::PIPELINE_CACHE,
    vk::ObjectType::PIPELINE_LAYOUT,
    vk::ObjectType::PIPELINE,
    vk::ObjectType::DESCRIPTOR_SET_LAYOUT,
    vk::ObjectType::DESCRIPTOR_POOL,
    vk::ObjectType::DESCRIPTOR_SET,
    vk::ObjectType::DESCRIPTOR_UPDATE_TEMPLATE,
    vk::ObjectType::RENDER_PASS,
    vk::ObjectType::FRAMEBUFFER,
    vk::ObjectType::SWAPCHAIN_KHR,
    vk::ObjectType::DEFERRED_OPERATION_KHR,
    vk::ObjectType::ACCELERATION_STRUCTURE_KHR,
];

/// Ownership and flag bookkeeping, separate from the per-object claims.
#[derive(Default)]
struct PoolMaps {
    /// Command buffer -> owning pool
    command_pool_of: HashMap<u64, u64>,
    pool_command_buffers: HashMap<u64, HashSet<u64>>,
    pool_descriptor_sets: HashMap<u64, HashSet<u64>>,
    /// Descriptor set layout -> every binding is host read-only
    dsl_read_only: HashMap<u64, bool>,
    ds_read_only: HashSet<u64>,
    device_queues: HashSet<u64>,
    swapchain_images: HashMap<u64, Vec<u64>>,
}

/// The thread-safety validator for one instance or one device.
pub struct ThreadSafety {
    weak_self: Weak<ThreadSafety>,
    /// The instance tracker, for device trackers.
    parent: Option<Arc<ThreadSafety>>,
    sink: Arc<dyn ReportSink>,
    counters: HashMap<vk::ObjectType, Counter>,
    /// Claims on "the command buffers of a pool", taken while recording.
    command_pool_contents: Counter,
    maps: RwLock<PoolMaps>,
    deferred: Option<Arc<DeferredLedger>>,
}

impl ThreadSafety {
    fn new(
        weak_self: &Weak<ThreadSafety>,
        parent: Option<Arc<ThreadSafety>>,
        sink: Arc<dyn ReportSink>,
        object_types: &[vk::ObjectType],
        deferred: Option<Arc<DeferredLedger>>,
    ) -> Self {
        Self {
            weak_self: weak_self.clone(),
            parent,
            sink,
            counters: object_types
                .iter()
                .map(|&ty| (ty, Counter::new(ty)))
                .collect(),
            command_pool_contents: Counter::new(vk::ObjectType::COMMAND_POOL),
            maps: RwLock::new(PoolMaps::default()),
            deferred,
        }
    }

    /// Tracker for instance-level objects.
    pub fn for_instance(sink: Arc<dyn ReportSink>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self::new(weak, None, sink, INSTANCE_OBJECT_TYPES, None))
    }

    /// Tracker for one device; instance-level objects are looked up in
    /// `parent`.
    pub fn for_device(parent: Arc<ThreadSafety>, deferred: Arc<DeferredLedger>) -> Arc<Self> {
        let sink = parent.sink.clone();
        Arc::new_cyclic(|weak| {
            Self::new(weak, Some(parent), sink, DEVICE_OBJECT_TYPES, Some(deferred))
        })
    }

    fn counter(&self, object_type: vk::ObjectType) -> Option<&Counter> {
        self.counters.get(&object_type).or_else(|| {
            self.parent
                .as_deref()
                .and_then(|p| p.counters.get(&object_type))
        })
    }

    // ── Claims ──────────────────────────────────────────────

    pub(crate) fn create_object<H: Handle + Copy>(&self, handle: H) {
        if let Some(c) = self.counter(H::TYPE) {
            c.create(handle.as_raw());
        }
    }

    pub(crate) fn destroy_object<H: Handle + Copy>(&self, handle: H) {
        if let Some(c) = self.counter(H::TYPE) {
            c.destroy(handle.as_raw());
        }
    }

    pub(crate) fn start_read<H: Handle + Copy>(&self, handle: H, location: Location) {
        if let Some(c) = self.counter(H::TYPE) {
            c.start_read(handle.as_raw(), location, self.sink.as_ref());
        }
    }

    pub(crate) fn finish_read<H: Handle + Copy>(&self, handle: H, location: Location) {
        if let Some(c) = self.counter(H::TYPE) {
            c.finish_read(handle.as_raw(), location);
        }
    }

    pub(crate) fn start_write<H: Handle + Copy>(&self, handle: H, location: Location) {
        if let Some(c) = self.counter(H::TYPE) {
            c.start_write(handle.as_raw(), location, self.sink.as_ref());
        }
    }

    pub(crate) fn finish_write<H: Handle + Copy>(&self, handle: H, location: Location) {
        if let Some(c) = self.counter(H::TYPE) {
            c.finish_write(handle.as_raw(), location);
        }
    }

    fn pool_of(&self, command_buffer: vk::CommandBuffer) -> Option<u64> {
        self.maps
            .read()
            .command_pool_of
            .get(&command_buffer.as_raw())
            .copied()
    }

    /// Write-claim a command buffer, and the contents of its pool when
    /// `lock_pool` is set.
    pub(crate) fn start_write_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        location: Location,
        lock_pool: bool,
    ) {
        if lock_pool {
            if let Some(pool) = self.pool_of(command_buffer) {
                self.command_pool_contents
                    .start_write(pool, location, self.sink.as_ref());
            }
        }
        self.start_write(command_buffer, location);
    }

    pub(crate) fn finish_write_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        location: Location,
        lock_pool: bool,
    ) {
        self.finish_write(command_buffer, location);
        if lock_pool {
            if let Some(pool) = self.pool_of(command_buffer) {
                self.command_pool_contents.finish_write(pool, location);
            }
        }
    }

    pub(crate) fn start_read_command_buffer(&self, command_buffer: vk::CommandBuffer, location: Location) {
        if let Some(pool) = self.pool_of(command_buffer) {
            self.command_pool_contents
                .start_read(pool, location, self.sink.as_ref());
        }
        self.start_read(command_buffer, location);
    }

    pub(crate) fn finish_read_command_buffer(&self, command_buffer: vk::CommandBuffer, location: Location) {
        self.finish_read(command_buffer, location);
        if let Some(pool) = self.pool_of(command_buffer) {
            self.command_pool_contents.finish_read(pool, location);
        }
    }

    fn start_write_pool_contents(&self, pool: vk::CommandPool, location: Location) {
        self.command_pool_contents
            .start_write(pool.as_raw(), location, self.sink.as_ref());
    }

    fn finish_write_pool_contents(&self, pool: vk::CommandPool, location: Location) {
        self.command_pool_contents
            .finish_write(pool.as_raw(), location);
    }

    // ── Pool bookkeeping ────────────────────────────────────

    fn create_command_pool(&self, pool: vk::CommandPool) {
        self.create_object(pool);
        self.command_pool_contents.create(pool.as_raw());
    }

    fn add_command_buffers(&self, pool: vk::CommandPool, command_buffers: &[vk::CommandBuffer]) {
        for &cb in command_buffers {
            self.create_object(cb);
        }
        let mut maps = self.maps.write();
        let children = maps.pool_command_buffers.entry(pool.as_raw()).or_default();
        children.extend(command_buffers.iter().map(|cb| cb.as_raw()));
        for cb in command_buffers {
            maps.command_pool_of.insert(cb.as_raw(), pool.as_raw());
        }
    }

    fn remove_command_buffers(&self, pool: vk::CommandPool, command_buffers: &[vk::CommandBuffer]) {
        {
            let mut maps = self.maps.write();
            if let Some(children) = maps.pool_command_buffers.get_mut(&pool.as_raw()) {
                for cb in command_buffers {
                    children.remove(&cb.as_raw());
                }
            }
            for cb in command_buffers {
                maps.command_pool_of.remove(&cb.as_raw());
            }
        }
        for &cb in command_buffers {
            self.destroy_object(cb);
        }
    }

    /// Command buffers currently allocated from `pool`.
    pub fn command_buffers_of(&self, pool: vk::CommandPool) -> Vec<vk::CommandBuffer> {
        self.maps
            .read()
            .pool_command_buffers
            .get(&pool.as_raw())
            .map(|set| set.iter().map(|&cb| vk::CommandBuffer::from_raw(cb)).collect())
            .unwrap_or_default()
    }

    fn descriptor_sets_of(&self, pool: vk::DescriptorPool) -> Vec<vk::DescriptorSet> {
        self.maps
            .read()
            .pool_descriptor_sets
            .get(&pool.as_raw())
            .map(|set| set.iter().map(|&ds| vk::DescriptorSet::from_raw(ds)).collect())
            .unwrap_or_default()
    }

    fn add_descriptor_sets(
        &self,
        pool: vk::DescriptorPool,
        layouts: &[vk::DescriptorSetLayout],
        sets: &[vk::DescriptorSet],
    ) {
        for &set in sets {
            self.create_object(set);
        }
        let mut maps = self.maps.write();
        for (i, set) in sets.iter().enumerate() {
            maps.pool_descriptor_sets
                .entry(pool.as_raw())
                .or_default()
                .insert(set.as_raw());
            let read_only = layouts
                .get(i)
                .and_then(|layout| maps.dsl_read_only.get(&layout.as_raw()).copied())
                .unwrap_or(false);
            if read_only {
                maps.ds_read_only.insert(set.as_raw());
            }
        }
    }

    fn remove_descriptor_sets(&self, pool: vk::DescriptorPool, sets: &[vk::DescriptorSet]) {
        {
            let mut maps = self.maps.write();
            if let Some(children) = maps.pool_descriptor_sets.get_mut(&pool.as_raw()) {
                for set in sets {
                    children.remove(&set.as_raw());
                }
            }
            for set in sets {
                maps.ds_read_only.remove(&set.as_raw());
            }
        }
        for &set in sets {
            self.destroy_object(set);
        }
    }

    /// Whether every binding of a layout is host read-only, so that updates
    /// to sets allocated from it may run concurrently.
    fn layout_is_read_only(create_info: &vk::DescriptorSetLayoutCreateInfo<'_>) -> bool {
        if create_info.flags.intersects(
            vk::DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL
                | vk::DescriptorSetLayoutCreateFlags::HOST_ONLY_POOL_EXT,
        ) {
            return true;
        }
        let mut p_next = create_info.p_next;
        while !p_next.is_null() {
            let base = unsafe { &*(p_next as *const vk::BaseInStructure<'_>) };
            if base.s_type == vk::StructureType::DESCRIPTOR_SET_LAYOUT_BINDING_FLAGS_CREATE_INFO {
                let info = unsafe {
                    &*(p_next as *const vk::DescriptorSetLayoutBindingFlagsCreateInfo<'_>)
                };
                let flags = unsafe { crate::params::slice(info.p_binding_flags, info.binding_count) };
                return !flags.is_empty()
                    && flags
                        .iter()
                        .all(|f| f.contains(vk::DescriptorBindingFlags::UPDATE_AFTER_BIND));
            }
            p_next = base.p_next as *const _;
        }
        false
    }

    fn is_read_only_set(&self, set: vk::DescriptorSet) -> bool {
        self.maps.read().ds_read_only.contains(&set.as_raw())
    }

    fn start_descriptor_set_update(&self, set: vk::DescriptorSet, location: Location) {
        if self.is_read_only_set(set) {
            self.start_read(set, location);
        } else {
            self.start_write(set, location);
        }
    }

    fn finish_descriptor_set_update(&self, set: vk::DescriptorSet, location: Location) {
        if self.is_read_only_set(set) {
            self.finish_read(set, location);
        } else {
            self.finish_write(set, location);
        }
    }

    fn device_queues(&self) -> Vec<vk::Queue> {
        self.maps
            .read()
            .device_queues
            .iter()
            .map(|&q| vk::Queue::from_raw(q))
            .collect()
    }

    fn arc(&self) -> Option<Arc<ThreadSafety>> {
        self.weak_self.upgrade()
    }

    // ── Introspection ───────────────────────────────────────

    /// Whether `handle` currently has a claim record under `object_type`.
    pub fn is_tracked(&self, object_type: vk::ObjectType, handle: u64) -> bool {
        self.counter(object_type)
            .is_some_and(|c| c.contains(handle))
    }

    pub fn tracked_count(&self, object_type: vk::ObjectType) -> usize {
        self.counter(object_type).map_or(0, Counter::len)
    }

    /// `(readers, writers)` currently held on an object.
    pub fn claims(&self, object_type: vk::ObjectType, handle: u64) -> Option<(u32, u32)> {
        self.counter(object_type).and_then(|c| c.claims(handle))
    }

    pub fn is_descriptor_set_read_only(&self, set: vk::DescriptorSet) -> bool {
        self.is_read_only_set(set)
    }
}
