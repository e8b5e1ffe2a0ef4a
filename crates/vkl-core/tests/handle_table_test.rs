//! Tests for the object handle table: wrap/unwrap round trips, idempotent
//! destruction and pool-owned children.

use std::sync::Arc;

use ash::vk;
use ash::vk::Handle;
use vkl_core::{CoreError, HandleTable};

#[test]
fn test_wrap_unwrap_round_trip() {
    let table = HandleTable::new(true);
    let native = vk::Buffer::from_raw(0xdead_0000);

    let wrapped = table.wrap_new(native, None);
    assert_ne!(wrapped, native);
    assert_eq!(table.unwrap_handle(wrapped), native);
    assert!(table.is_live(wrapped));

    assert_eq!(table.erase(wrapped), native);
    assert!(!table.is_live(wrapped));
    match table.try_unwrap(wrapped) {
        Err(CoreError::HandleNotFound { object_type, handle }) => {
            assert_eq!(object_type, vk::ObjectType::BUFFER);
            assert_eq!(handle, wrapped.as_raw());
        }
        other => panic!("expected HandleNotFound, got {:?}", other),
    }
    assert_eq!(table.unwrap_handle(wrapped), vk::Buffer::null());
}

#[test]
fn test_wrapping_disabled_is_identity() {
    let table = HandleTable::new(false);
    let native = vk::Image::from_raw(0x1234);

    let wrapped = table.wrap_new(native, None);
    assert_eq!(wrapped, native);
    assert_eq!(table.unwrap_handle(native), native);
    assert!(table.is_live(native));
    assert_eq!(table.wrapped_len(), 0);

    assert_eq!(table.erase(native), native);
    assert!(!table.is_live(native));
}

#[test]
fn test_dispatchable_handles_are_never_wrapped() {
    let table = HandleTable::new(true);
    let cb = vk::CommandBuffer::from_raw(0x7000);

    assert_eq!(table.wrap_new(cb, Some(42)), cb);
    assert!(table.is_live(cb));
    assert_eq!(table.unwrap_handle(cb), cb);
    assert_eq!(table.children_of(42), vec![cb.as_raw()]);
}

#[test]
fn test_null_handles_are_ignored() {
    let table = HandleTable::new(true);
    assert_eq!(table.wrap_new(vk::Fence::null(), None), vk::Fence::null());
    assert_eq!(table.unwrap_handle(vk::Fence::null()), vk::Fence::null());
    table.create_object(vk::Fence::null());
    assert!(table.is_empty());
}

#[test]
fn test_destroy_object_is_idempotent() {
    let table = HandleTable::new(false);
    let a = vk::Semaphore::from_raw(0x10);
    let b = vk::Semaphore::from_raw(0x20);
    table.create_object(a);
    table.create_object(b);

    table.destroy_object(a);
    table.destroy_object(a);

    assert!(!table.is_live(a));
    assert!(table.is_live(b));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_recreate_after_destroy() {
    let table = HandleTable::new(false);
    let fence = vk::Fence::from_raw(0x99);
    table.create_object(fence);
    table.create_object(fence);
    assert_eq!(table.len(), 1);

    table.destroy_object(fence);
    table.create_object(fence);
    assert!(table.is_live(fence));
}

#[test]
fn test_value_spaces_do_not_collide() {
    let table = HandleTable::new(false);
    table.create_object(vk::CommandBuffer::from_raw(0x500));
    table.create_object(vk::Buffer::from_raw(0x500));
    assert_eq!(table.len(), 2);

    table.destroy_object(vk::Buffer::from_raw(0x500));
    assert!(table.is_live(vk::CommandBuffer::from_raw(0x500)));
}

#[test]
fn test_destroy_children_removes_every_child() {
    let table = HandleTable::new(true);
    let pool = table.wrap_new(vk::DescriptorPool::from_raw(0x100), None);
    let sets: Vec<vk::DescriptorSet> = (0..4)
        .map(|i| table.wrap_new(vk::DescriptorSet::from_raw(0x200 + i), Some(pool.as_raw())))
        .collect();

    table.erase(sets[0]);
    assert_eq!(table.children_of(pool.as_raw()).len(), 3);

    let mut removed = table.destroy_children(pool.as_raw());
    removed.sort();
    assert_eq!(removed.len(), 3);
    for (i, (wrapped, native)) in removed.iter().enumerate() {
        assert_eq!(*wrapped, sets[i + 1].as_raw());
        assert_eq!(*native, 0x200 + i as u64 + 1);
    }
    for set in &sets {
        assert!(!table.is_live(*set));
    }
    assert!(table.is_live(pool));
    assert!(table.destroy_children(pool.as_raw()).is_empty());
}

#[test]
fn test_concurrent_wraps_are_unique() {
    let table = Arc::new(HandleTable::new(true));

    let mut all: Vec<u64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let table = Arc::clone(&table);
                s.spawn(move || {
                    (0..100u64)
                        .map(|i| table.wrap_new(vk::Sampler::from_raw(t * 1000 + i + 1), None).as_raw())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    all.sort();
    all.dedup();
    assert_eq!(all.len(), 800);
    assert_eq!(table.wrapped_len(), 800);
}
