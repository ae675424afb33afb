use crate::errors::BufferError;
use crate::tests::{LruPool, create_pool, write_bytes};
use page::page_id::PageId;
use std::sync::atomic::Ordering;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

#[test]
fn flush_of_non_resident_page_is_not_found() {
    let pool: LruPool = create_pool(2);

    let result = pool.flush_page(PageId::new(3));

    assert!(matches!(result, Err(BufferError::NotFound(_))));
    assert!(pool.disk_manager().writes().is_empty());
}

#[test]
fn flush_writes_clean_pages_too() {
    let pool: LruPool = create_pool(2);
    let page_id = PageId::new(1);
    pool.fetch_page(page_id).unwrap();
    pool.unpin_page(page_id, false).unwrap();

    pool.flush_page(page_id).unwrap();

    assert_eq!(pool.disk_manager().writes(), vec![page_id]);
    assert_eq!(pool.stats().disk_writes, 1);
}

#[test]
fn flush_clears_dirty_flag_and_keeps_pin() {
    let pool: LruPool = create_pool(2);
    let (page_id, mut handle) = pool.new_page().unwrap();
    write_bytes(&mut handle, 10, &[4, 2]);
    pool.unpin_page(page_id, true).unwrap();
    pool.fetch_page(page_id).unwrap();

    pool.flush_page(page_id).unwrap();

    assert_eq!(pool.is_dirty(page_id), Some(false));
    assert_eq!(pool.pin_count(page_id), Some(1));
    assert_eq!(&pool.disk_manager().stored(page_id).unwrap()[10..12], &[4, 2]);
    pool.assert_invariants();
}

#[test]
fn flushed_page_is_not_written_again_on_eviction() {
    let pool: LruPool = create_pool(1);
    let (page_id, handle) = pool.new_page().unwrap();
    handle.unpin(true).unwrap();
    pool.flush_page(page_id).unwrap();

    pool.new_page().unwrap();

    assert_eq!(pool.disk_manager().writes(), vec![page_id]);
}

#[test]
fn flush_all_writes_every_resident_page_once_in_order() {
    let pool: LruPool = create_pool(4);
    for page_number in [7, 3, 5] {
        let page_id = PageId::new(page_number);
        pool.fetch_page(page_id).unwrap();
        pool.unpin_page(page_id, page_number != 5).unwrap();
    }
    // page 4 stays pinned and dirty
    let pinned = PageId::new(4);
    pool.fetch_page(pinned).unwrap();
    pool.fetch_page(pinned).unwrap();
    pool.unpin_page(pinned, true).unwrap();

    pool.flush_all_pages().unwrap();

    assert_eq!(
        pool.disk_manager().writes(),
        vec![PageId::new(3), PageId::new(4), PageId::new(5), PageId::new(7)]
    );
    for page_number in [3, 4, 5, 7] {
        assert_eq!(pool.is_dirty(PageId::new(page_number)), Some(false));
    }
    assert_eq!(pool.pin_count(pinned), Some(1));
    assert_eq!(pool.evictable_frames(), 3);
    assert_eq!(pool.resident_pages(), 4);
    pool.assert_invariants();
}

#[test]
fn flush_all_on_empty_pool_writes_nothing() {
    let pool: LruPool = create_pool(4);

    pool.flush_all_pages().unwrap();

    assert!(pool.disk_manager().writes().is_empty());
}

#[test]
fn failed_flush_keeps_page_dirty_and_releases_its_pin() {
    let pool: LruPool = create_pool(2);
    let (page_id, handle) = pool.new_page().unwrap();
    handle.unpin(true).unwrap();
    pool.disk_manager().fail_writes.store(true, Ordering::Relaxed);

    let result = pool.flush_page(page_id);

    assert!(matches!(result, Err(BufferError::Disk(_))));
    assert_eq!(pool.is_dirty(page_id), Some(true));
    assert_eq!(pool.pin_count(page_id), Some(0));
    assert_eq!(pool.evictable_frames(), 1);
    assert_eq!(pool.stats().disk_writes, 0);
    pool.assert_invariants();
}

#[test]
fn flush_waits_for_writer_without_blocking_the_pool() {
    let pool: Arc<LruPool> = Arc::new(create_pool(4));
    let written = PageId::new(1);
    let (locked_tx, locked_rx) = mpsc::channel();
    let (writer_tx, writer_rx) = mpsc::channel();
    let (flusher_tx, flusher_rx) = mpsc::channel();

    let writer = {
        let pool = pool.clone();
        thread::spawn(move || {
            let mut handle = pool.fetch_page(written).unwrap();
            let mut guard = handle.write().unwrap();
            guard.data_mut()[0] = 9;
            locked_tx.send(()).unwrap();

            // give the flush time to block on this page
            thread::sleep(Duration::from_millis(50));
            let other = pool
                .fetch_page(PageId::new(2))
                .and_then(|other| other.unpin(false));

            drop(guard);
            let unpinned = handle.unpin(true);
            writer_tx.send(other.is_ok() && unpinned.is_ok()).unwrap();
        })
    };

    locked_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let flusher = {
        let pool = pool.clone();
        thread::spawn(move || {
            flusher_tx.send(pool.flush_all_pages().is_ok()).unwrap();
        })
    };

    assert_eq!(writer_rx.recv_timeout(Duration::from_secs(5)), Ok(true));
    assert_eq!(flusher_rx.recv_timeout(Duration::from_secs(5)), Ok(true));
    writer.join().unwrap();
    flusher.join().unwrap();

    assert_eq!(pool.disk_manager().stored(written).unwrap()[0], 9);
    assert_eq!(pool.pin_count(written), Some(0));
    pool.assert_invariants();
}
