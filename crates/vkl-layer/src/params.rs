//! Helpers turning raw C parameters into the references and slices the
//! validator hooks receive.

use ash::vk;
use ash::vk::Handle;
use smallvec::SmallVec;
use vkl_core::{HandleTable, RecordObject};

/// Handle arrays up to this length are unwrapped on the stack.
pub const INLINE_HANDLES: usize = 32;

pub type HandleVec<H> = SmallVec<[H; INLINE_HANDLES]>;

/// View a `(pointer, count)` parameter pair as a slice. Null or zero-length
/// input yields an empty slice.
pub unsafe fn slice<'a, T>(ptr: *const T, count: u32) -> &'a [T] {
    unsafe {
        if ptr.is_null() || count == 0 {
            &[]
        } else {
            std::slice::from_raw_parts(ptr, count as usize)
        }
    }
}

/// The handle a create call wrote back, or null when the call failed.
pub unsafe fn created<H: Handle + Copy>(record: &RecordObject, ptr: *const H) -> H {
    unsafe {
        if ptr.is_null() || record.result != vk::Result::SUCCESS {
            H::from_raw(0)
        } else {
            *ptr
        }
    }
}

/// The handles an allocate/create call wrote back, or nothing when the call
/// failed. Positive status codes still return what the driver wrote.
pub unsafe fn created_slice<'a, H>(record: &RecordObject, ptr: *const H, count: u32) -> &'a [H] {
    unsafe {
        if !record.succeeded() || record.deferred() {
            &[]
        } else {
            slice(ptr, count)
        }
    }
}

/// Unwrap a handle array into stack-or-heap scratch storage.
pub unsafe fn unwrap_array<H: Handle + Copy>(
    handles: &HandleTable,
    ptr: *const H,
    count: u32,
) -> HandleVec<H> {
    unsafe {
        slice(ptr, count)
            .iter()
            .map(|h| handles.unwrap_handle(*h))
            .collect()
    }
}

/// Pointer to unwrapped storage, preserving null for absent arrays.
pub fn array_ptr<H>(original: *const H, unwrapped: &[H]) -> *const H {
    if original.is_null() {
        original
    } else {
        unwrapped.as_ptr()
    }
}
