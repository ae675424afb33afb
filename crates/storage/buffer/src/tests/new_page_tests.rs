use crate::errors::BufferError;
use crate::tests::{LruPool, create_pool, write_bytes};
use disk::errors::DiskError;
use page::page_id::PageId;
use std::sync::atomic::Ordering;

#[test]
fn new_pages_get_sequential_ids_and_free_frames() {
    let pool: LruPool = create_pool(3);

    for expected in 0..3u32 {
        let (page_id, handle) = pool.new_page().unwrap();

        assert_eq!(page_id, PageId::new(expected));
        assert_eq!(handle.page_id(), page_id);
        assert_eq!(handle.frame_id(), expected as usize);
        assert!(handle.read().unwrap().is_zeroed());
        assert_eq!(pool.pin_count(page_id), Some(1));
        assert_eq!(pool.is_dirty(page_id), Some(false));
    }

    assert!(pool.disk_manager().reads().is_empty());
    assert_eq!(pool.free_frames(), 0);
    pool.assert_invariants();
}

#[test]
fn exhausted_pool_does_not_allocate_page_ids() {
    let pool: LruPool = create_pool(3);
    for _ in 0..3 {
        pool.new_page().unwrap();
    }

    let result = pool.new_page();

    assert!(matches!(result, Err(BufferError::PoolExhausted)));
    assert_eq!(pool.disk_manager().allocations().len(), 3);
    assert!(matches!(
        pool.fetch_page(PageId::new(9)),
        Err(BufferError::PoolExhausted)
    ));
    pool.assert_invariants();
}

#[test]
fn new_page_reuses_frame_of_evicted_page() {
    let pool: LruPool = create_pool(1);
    let first = {
        let (page_id, mut handle) = pool.new_page().unwrap();
        write_bytes(&mut handle, 0, &[9; 16]);
        handle.unpin(true).unwrap();
        page_id
    };

    let (second, handle) = pool.new_page().unwrap();

    assert_eq!(handle.frame_id(), 0);
    assert_ne!(first, second);
    assert!(handle.read().unwrap().is_zeroed());
    assert!(!pool.contains(first));
    assert_eq!(pool.disk_manager().writes(), vec![first]);
    assert_eq!(&pool.disk_manager().stored(first).unwrap()[..16], &[9; 16]);
    pool.assert_invariants();
}

#[test]
fn failed_allocation_returns_frame_to_free_list() {
    let pool: LruPool = create_pool(2);
    pool.disk_manager()
        .fail_allocations
        .store(true, Ordering::Relaxed);

    let result = pool.new_page();

    assert!(matches!(
        result,
        Err(BufferError::Disk(DiskError::OutOfPageIds))
    ));
    assert_eq!(pool.free_frames(), 2);
    assert_eq!(pool.resident_pages(), 0);
    pool.assert_invariants();
}

#[test]
fn failed_victim_write_keeps_victim_resident() {
    let pool: LruPool = create_pool(1);
    let (victim, handle) = pool.new_page().unwrap();
    handle.unpin(true).unwrap();
    pool.disk_manager().fail_writes.store(true, Ordering::Relaxed);

    let result = pool.new_page();

    assert!(matches!(result, Err(BufferError::Disk(DiskError::Io { .. }))));
    assert!(pool.contains(victim));
    assert_eq!(pool.is_dirty(victim), Some(true));
    assert_eq!(pool.evictable_frames(), 1);
    assert_eq!(pool.disk_manager().allocations(), vec![victim]);
    pool.assert_invariants();

    pool.disk_manager()
        .fail_writes
        .store(false, Ordering::Relaxed);
    let (page_id, _handle) = pool.new_page().unwrap();
    assert_eq!(page_id, PageId::new(1));
    assert_eq!(pool.disk_manager().writes(), vec![victim]);
}
