//! Per-object read/write claim tracking for one object type.

use std::thread::ThreadId;

use ash::vk;
use dashmap::DashMap;
use smallvec::SmallVec;
use vkl_core::{Location, Report, ReportSink};

pub const VUID_MULTIPLE_THREADS_READ: &str = "UNASSIGNED-Threading-MultipleThreads-Read";
pub const VUID_MULTIPLE_THREADS_WRITE: &str = "UNASSIGNED-Threading-MultipleThreads-Write";

/// One thread's claims of a single kind on an object. Nested calls on the
/// same thread bump `count`.
#[derive(Debug, Clone, Copy)]
struct Holder {
    thread: ThreadId,
    /// Call site of the outermost claim
    location: Location,
    count: u32,
}

/// Current claims on one object.
#[derive(Debug, Default)]
pub struct ObjectUseData {
    readers: SmallVec<[Holder; 2]>,
    writers: SmallVec<[Holder; 1]>,
}

impl ObjectUseData {
    pub fn reader_count(&self) -> u32 {
        self.readers.iter().map(|h| h.count).sum()
    }

    pub fn writer_count(&self) -> u32 {
        self.writers.iter().map(|h| h.count).sum()
    }

    pub fn is_idle(&self) -> bool {
        self.readers.is_empty() && self.writers.is_empty()
    }

    fn other_thread(holders: &[Holder], thread: ThreadId) -> Option<Location> {
        holders
            .iter()
            .find(|h| h.thread != thread)
            .map(|h| h.location)
    }

    fn claim(holders: &mut SmallVec<impl smallvec::Array<Item = Holder>>, location: Location) {
        match holders.iter_mut().find(|h| h.thread == location.thread) {
            Some(h) => h.count += 1,
            None => holders.push(Holder {
                thread: location.thread,
                location,
                count: 1,
            }),
        }
    }

    fn release(holders: &mut SmallVec<impl smallvec::Array<Item = Holder>>, thread: ThreadId) {
        if let Some(i) = holders.iter().position(|h| h.thread == thread) {
            holders[i].count -= 1;
            if holders[i].count == 0 {
                holders.remove(i);
            }
        }
    }
}

/// Claim tracker for every live object of one type. Transitions happen under
/// the map's shard guard; reports are sent after it is released.
pub struct Counter {
    object_type: vk::ObjectType,
    uses: DashMap<u64, ObjectUseData>,
}

impl Counter {
    pub fn new(object_type: vk::ObjectType) -> Self {
        Self {
            object_type,
            uses: DashMap::new(),
        }
    }

    pub fn object_type(&self) -> vk::ObjectType {
        self.object_type
    }

    pub fn create(&self, handle: u64) {
        if handle != 0 {
            self.uses.entry(handle).or_default();
        }
    }

    pub fn destroy(&self, handle: u64) {
        self.uses.remove(&handle);
    }

    pub fn contains(&self, handle: u64) -> bool {
        self.uses.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.uses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty()
    }

    /// `(readers, writers)` currently held on `handle`.
    pub fn claims(&self, handle: u64) -> Option<(u32, u32)> {
        self.uses
            .get(&handle)
            .map(|u| (u.reader_count(), u.writer_count()))
    }

    pub fn start_read(&self, handle: u64, location: Location, sink: &dyn ReportSink) {
        if handle == 0 {
            return;
        }
        let conflict = {
            let Some(mut use_data) = self.uses.get_mut(&handle) else {
                return;
            };
            let conflict = ObjectUseData::other_thread(&use_data.writers, location.thread);
            ObjectUseData::claim(&mut use_data.readers, location);
            conflict
        };
        if let Some(other) = conflict {
            self.report(sink, VUID_MULTIPLE_THREADS_READ, handle, location, other);
        }
    }

    pub fn finish_read(&self, handle: u64, location: Location) {
        if let Some(mut use_data) = self.uses.get_mut(&handle) {
            ObjectUseData::release(&mut use_data.readers, location.thread);
        }
    }

    pub fn start_write(&self, handle: u64, location: Location, sink: &dyn ReportSink) {
        if handle == 0 {
            return;
        }
        let conflict = {
            let Some(mut use_data) = self.uses.get_mut(&handle) else {
                return;
            };
            let conflict = ObjectUseData::other_thread(&use_data.writers, location.thread)
                .or_else(|| ObjectUseData::other_thread(&use_data.readers, location.thread));
            ObjectUseData::claim(&mut use_data.writers, location);
            conflict
        };
        if let Some(other) = conflict {
            self.report(sink, VUID_MULTIPLE_THREADS_WRITE, handle, location, other);
        }
    }

    pub fn finish_write(&self, handle: u64, location: Location) {
        if let Some(mut use_data) = self.uses.get_mut(&handle) {
            ObjectUseData::release(&mut use_data.writers, location.thread);
        }
    }

    fn report(
        &self,
        sink: &dyn ReportSink,
        vuid: &'static str,
        handle: u64,
        location: Location,
        other: Location,
    ) {
        let message = format!(
            "THREADING ERROR: {}(): object of type {:?} {:#x} is simultaneously used in current thread {:?} and thread {:?} ({}())",
            location.function, self.object_type, handle, location.thread, other.thread, other.function
        );
        sink.report(Report {
            vuid,
            object_type: self.object_type,
            handle,
            location,
            conflict: Some(other),
            message,
        });
    }
}
