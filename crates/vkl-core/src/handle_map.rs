//! The object handle table: liveness of every handle the layer validates, and
//! the mapping from layer-wrapped ids back to driver handles.
//!
//! Dispatchable and non-dispatchable handles live in separate maps because
//! their value spaces do not overlap. Only non-dispatchable handles are ever
//! wrapped; dispatchable handles carry the loader's dispatch pointer and are
//! forwarded untouched.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use ash::vk;
use ash::vk::Handle;
use parking_lot::RwLock;

use crate::error::CoreError;

/// Which value space a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleCategory {
    Dispatchable,
    NonDispatchable,
}

impl HandleCategory {
    pub fn of(object_type: vk::ObjectType) -> Self {
        match object_type {
            vk::ObjectType::INSTANCE
            | vk::ObjectType::PHYSICAL_DEVICE
            | vk::ObjectType::DEVICE
            | vk::ObjectType::QUEUE
            | vk::ObjectType::COMMAND_BUFFER => HandleCategory::Dispatchable,
            _ => HandleCategory::NonDispatchable,
        }
    }
}

/// Bookkeeping kept for every live handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRecord {
    pub object_type: vk::ObjectType,
    /// Owning pool or swapchain, if any.
    pub parent: Option<u64>,
}

/// A layer-generated id standing in for a driver handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappedHandle {
    pub native: u64,
    pub object_type: vk::ObjectType,
    pub parent: Option<u64>,
}

#[derive(Default)]
struct TableInner {
    dispatchable: HashMap<u64, ObjectRecord>,
    non_dispatchable: HashMap<u64, ObjectRecord>,
    /// Wrapped id -> driver handle
    wrapped: HashMap<u64, WrappedHandle>,
    /// Parent handle -> live children
    children: HashMap<u64, HashSet<u64>>,
}

impl TableInner {
    fn records(&mut self, category: HandleCategory) -> &mut HashMap<u64, ObjectRecord> {
        match category {
            HandleCategory::Dispatchable => &mut self.dispatchable,
            HandleCategory::NonDispatchable => &mut self.non_dispatchable,
        }
    }

    fn insert(&mut self, handle: u64, record: ObjectRecord) {
        let category = HandleCategory::of(record.object_type);
        if self.records(category).contains_key(&handle) {
            return;
        }
        if let Some(parent) = record.parent {
            self.children.entry(parent).or_default().insert(handle);
        }
        self.records(category).insert(handle, record);
    }

    fn remove(&mut self, handle: u64, object_type: vk::ObjectType) -> Option<ObjectRecord> {
        let record = self.records(HandleCategory::of(object_type)).remove(&handle)?;
        if let Some(parent) = record.parent {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.remove(&handle);
                if siblings.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
        Some(record)
    }
}

/// Concurrent handle table guarded by a single reader/writer lock.
///
/// Lookups share the lock; every structural change takes it exclusively.
/// The lock is never held across a driver call.
pub struct HandleTable {
    wrap_handles: bool,
    /// Counter for generating wrapped ids
    next_id: AtomicU64,
    inner: RwLock<TableInner>,
}

impl HandleTable {
    pub fn new(wrap_handles: bool) -> Self {
        Self {
            wrap_handles,
            // Start from 1 to avoid confusion with NULL/0 handles
            next_id: AtomicU64::new(1),
            inner: RwLock::new(TableInner::default()),
        }
    }

    pub fn wrapping_enabled(&self) -> bool {
        self.wrap_handles
    }

    fn wraps<H: Handle + Copy>(&self, handle: H) -> bool {
        self.wrap_handles
            && handle.as_raw() != 0
            && HandleCategory::of(H::TYPE) == HandleCategory::NonDispatchable
    }

    /// Register `handle` as live. Re-registering a live handle is a no-op;
    /// drivers may hand out a value again after it was destroyed.
    pub fn create_object<H: Handle + Copy>(&self, handle: H) {
        self.create_object_with_parent(handle, None);
    }

    pub fn create_object_with_parent<H: Handle + Copy>(&self, handle: H, parent: Option<u64>) {
        let raw = handle.as_raw();
        if raw == 0 {
            return;
        }
        self.inner.write().insert(
            raw,
            ObjectRecord {
                object_type: H::TYPE,
                parent,
            },
        );
    }

    /// Forget `handle`. Absent handles are ignored.
    pub fn destroy_object<H: Handle + Copy>(&self, handle: H) {
        self.destroy_raw(handle.as_raw(), H::TYPE);
    }

    fn destroy_raw(&self, raw: u64, object_type: vk::ObjectType) {
        if raw == 0 {
            return;
        }
        let mut inner = self.inner.write();
        inner.remove(raw, object_type);
        inner.wrapped.remove(&raw);
    }

    pub fn is_live<H: Handle + Copy>(&self, handle: H) -> bool {
        let inner = self.inner.read();
        let raw = handle.as_raw();
        match HandleCategory::of(H::TYPE) {
            HandleCategory::Dispatchable => inner.dispatchable.contains_key(&raw),
            HandleCategory::NonDispatchable => inner.non_dispatchable.contains_key(&raw),
        }
    }

    /// Allocate a fresh wrapped id for `native` and register it live.
    /// Returns `native` unchanged when wrapping does not apply.
    pub fn wrap_new<H: Handle + Copy>(&self, native: H, parent: Option<u64>) -> H {
        if !self.wraps(native) {
            self.create_object_with_parent(native, parent);
            return native;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.write();
        inner.wrapped.insert(
            id,
            WrappedHandle {
                native: native.as_raw(),
                object_type: H::TYPE,
                parent,
            },
        );
        inner.insert(
            id,
            ObjectRecord {
                object_type: H::TYPE,
                parent,
            },
        );
        H::from_raw(id)
    }

    /// Look up the driver handle behind `handle`.
    pub fn try_unwrap<H: Handle + Copy>(&self, handle: H) -> Result<H, CoreError> {
        if !self.wraps(handle) {
            return Ok(handle);
        }
        let raw = handle.as_raw();
        self.inner
            .read()
            .wrapped
            .get(&raw)
            .map(|w| H::from_raw(w.native))
            .ok_or(CoreError::HandleNotFound {
                object_type: H::TYPE,
                handle: raw,
            })
    }

    /// Like [`try_unwrap`](Self::try_unwrap), but a miss is logged and the
    /// null handle is forwarded instead of a stale value.
    pub fn unwrap_handle<H: Handle + Copy>(&self, handle: H) -> H {
        match self.try_unwrap(handle) {
            Ok(native) => native,
            Err(e) => {
                tracing::error!("unwrap: {}", e);
                H::from_raw(0)
            }
        }
    }

    /// Remove `handle` from the table and return the driver handle behind it.
    pub fn erase<H: Handle + Copy>(&self, handle: H) -> H {
        let raw = handle.as_raw();
        if raw == 0 {
            return handle;
        }
        if !self.wraps(handle) {
            self.destroy_object(handle);
            return handle;
        }
        let mut inner = self.inner.write();
        inner.remove(raw, H::TYPE);
        match inner.wrapped.remove(&raw) {
            Some(w) => H::from_raw(w.native),
            None => {
                tracing::error!(
                    "erase: {}",
                    CoreError::HandleNotFound {
                        object_type: H::TYPE,
                        handle: raw,
                    }
                );
                H::from_raw(0)
            }
        }
    }

    /// Live children registered with `parent`.
    pub fn children_of(&self, parent: u64) -> Vec<u64> {
        self.inner
            .read()
            .children
            .get(&parent)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove every child of `parent`, returning `(handle, native)` pairs.
    /// Used when a pool is reset or destroyed and its children go with it.
    pub fn destroy_children(&self, parent: u64) -> Vec<(u64, u64)> {
        let mut inner = self.inner.write();
        let Some(children) = inner.children.remove(&parent) else {
            return Vec::new();
        };
        let mut removed = Vec::with_capacity(children.len());
        for child in children {
            let native = match inner.wrapped.remove(&child) {
                Some(w) => w.native,
                None => child,
            };
            inner.dispatchable.remove(&child);
            inner.non_dispatchable.remove(&child);
            removed.push((child, native));
        }
        removed
    }

    /// Number of live handles across both categories.
    pub fn len(&self) -> usize {
        let inner = self.inner.read();
        inner.dispatchable.len() + inner.non_dispatchable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of outstanding wrapped ids.
    pub fn wrapped_len(&self) -> usize {
        self.inner.read().wrapped.len()
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new(true)
    }
}
