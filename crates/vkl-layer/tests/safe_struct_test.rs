//! Unwrapped copies of handle arrays and extension chains.

use ash::vk;
use ash::vk::Handle;
use vkl_core::HandleTable;
use vkl_layer::params::INLINE_HANDLES;
use vkl_layer::safe_struct::{unwrap_handles, unwrap_pnext_chain, Scratch, INLINE_WORDS};

fn wrapped_buffers(table: &HandleTable, count: usize) -> (Vec<vk::Buffer>, Vec<vk::Buffer>) {
    let natives: Vec<vk::Buffer> = (0..count as u64)
        .map(|i| vk::Buffer::from_raw(0xd000_0000 + i * 0x10))
        .collect();
    let wrapped = natives.iter().map(|&n| table.wrap_new(n, None)).collect();
    (natives, wrapped)
}

unsafe fn unwrap_all(table: &HandleTable, scratch: &mut Scratch, wrapped: &[vk::Buffer]) -> Vec<vk::Buffer> {
    unsafe {
        let ptr = unwrap_handles(table, scratch, wrapped.as_ptr(), wrapped.len() as u32);
        std::slice::from_raw_parts(ptr, wrapped.len()).to_vec()
    }
}

#[test]
fn test_short_handle_arrays_stay_off_the_heap() {
    let table = HandleTable::new(true);
    let (natives, wrapped) = wrapped_buffers(&table, 4);
    let mut scratch = Scratch::new();

    let unwrapped = unsafe { unwrap_all(&table, &mut scratch, &wrapped) };

    assert_eq!(unwrapped, natives);
    assert!(!scratch.is_empty());
    assert_eq!(scratch.heap_allocations(), 0);
}

#[test]
fn test_long_handle_arrays_spill_to_the_heap() {
    let table = HandleTable::new(true);
    let (natives, wrapped) = wrapped_buffers(&table, INLINE_HANDLES + 8);
    let mut scratch = Scratch::new();

    let unwrapped = unsafe { unwrap_all(&table, &mut scratch, &wrapped) };

    assert_eq!(unwrapped, natives);
    assert_eq!(scratch.heap_allocations(), 1);
}

#[test]
fn test_full_arena_sends_arrays_to_the_heap() {
    let table = HandleTable::new(true);
    let (natives, wrapped) = wrapped_buffers(&table, INLINE_HANDLES);
    let mut scratch = Scratch::new();

    let fits = INLINE_WORDS / INLINE_HANDLES;
    let mut copies = Vec::new();
    for _ in 0..fits + 1 {
        let ptr = unsafe { unwrap_handles(&table, &mut scratch, wrapped.as_ptr(), INLINE_HANDLES as u32) };
        copies.push(ptr);
    }

    assert_eq!(scratch.heap_allocations(), 1);
    // Earlier copies are not disturbed by later ones.
    for ptr in copies {
        let unwrapped = unsafe { std::slice::from_raw_parts(ptr, INLINE_HANDLES) };
        assert_eq!(unwrapped, natives.as_slice());
    }
}

#[test]
fn test_null_and_empty_arrays_are_not_copied() {
    let table = HandleTable::new(true);
    let mut scratch = Scratch::new();

    let null = unsafe { unwrap_handles::<vk::Buffer>(&table, &mut scratch, std::ptr::null(), 3) };

    assert!(null.is_null());
    assert!(scratch.is_empty());
}

#[test]
fn test_chain_is_copied_past_handle_free_structs() {
    let table = HandleTable::new(true);
    let native = vk::Buffer::from_raw(0xd000_1000);
    let buffer = table.wrap_new(native, None);
    let mut dedicated = vk::MemoryDedicatedAllocateInfo::default().buffer(buffer);
    let mut import = vk::ImportMemoryFdInfoKHR::default()
        .handle_type(vk::ExternalMemoryHandleTypeFlags::OPAQUE_FD)
        .fd(7);
    let info = vk::MemoryAllocateInfo::default()
        .push_next(&mut dedicated)
        .push_next(&mut import);
    let mut scratch = Scratch::new();

    let chain = unsafe { unwrap_pnext_chain(&table, &mut scratch, info.p_next) };

    let first = unsafe { &*(chain as *const vk::ImportMemoryFdInfoKHR<'_>) };
    assert_eq!(first.s_type, vk::StructureType::IMPORT_MEMORY_FD_INFO_KHR);
    assert_eq!(first.fd, 7);
    let second = unsafe { &*(first.p_next as *const vk::MemoryDedicatedAllocateInfo<'_>) };
    assert_eq!(second.s_type, vk::StructureType::MEMORY_DEDICATED_ALLOCATE_INFO);
    assert_eq!(second.buffer, native);
    assert!(second.p_next.is_null());
    // The application's chain is left alone.
    assert_ne!(chain, info.p_next);
    assert_eq!(dedicated.buffer, buffer);
}
