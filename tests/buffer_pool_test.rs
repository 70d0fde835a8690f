//! Integration tests for the buffer manager: eviction under pinning, dirty
//! write-back, and clock second-chance behavior.

use std::rc::Rc;

use heapcore::buffer::BufMgr;
use heapcore::common::{FileId, StorageError, PAGESIZE};
use heapcore::storage::{Db, FileHandle};
use tempfile::tempdir;

fn open_file(db: &Db, name: &str) -> Rc<FileHandle> {
    db.create_file(name).unwrap();
    Rc::new(db.open_file(name).unwrap())
}

#[test]
fn s1_eviction_under_pinning_hits_buffer_exceeded() {
    let dir = tempdir().unwrap();
    let db = Db::new(dir.path());
    let bufmgr = BufMgr::new(2);
    let file = open_file(&db, "a.hf");
    bufmgr.register_file(file.clone());

    for _ in 0..3 {
        file.allocate_page().unwrap();
    }

    bufmgr.read_page(file.id(), 0).unwrap();
    bufmgr.read_page(file.id(), 1).unwrap();

    assert!(matches!(
        bufmgr.read_page(file.id(), 2),
        Err(StorageError::BufferExceeded)
    ));

    bufmgr.unpin_page(file.id(), 0, false).unwrap();
    let frame = bufmgr.read_page(file.id(), 2).unwrap();
    assert_eq!(frame, 0);
}

#[test]
fn s2_dirty_writeback_on_eviction() {
    let dir = tempdir().unwrap();
    let db = Db::new(dir.path());
    let bufmgr = BufMgr::new(1);
    let file = open_file(&db, "a.hf");
    bufmgr.register_file(file.clone());

    file.allocate_page().unwrap();
    file.allocate_page().unwrap();

    let frame = bufmgr.read_page(file.id(), 0).unwrap();
    {
        let mut bytes = bufmgr.frame_bytes(frame);
        bytes[0..4].copy_from_slice(b"ABCD");
    }
    bufmgr.unpin_page(file.id(), 0, true).unwrap();

    // only one frame -- reading page 1 must evict page 0 and flush it.
    bufmgr.read_page(file.id(), 1).unwrap();

    let mut on_disk = [0u8; PAGESIZE];
    file.read_page(0, &mut on_disk).unwrap();
    assert_eq!(&on_disk[0..4], b"ABCD");
}

#[test]
fn s3_clock_gives_second_chance_before_evicting() {
    let dir = tempdir().unwrap();
    let db = Db::new(dir.path());
    let bufmgr = BufMgr::new(3);
    let file = open_file(&db, "a.hf");
    bufmgr.register_file(file.clone());

    for _ in 0..4 {
        file.allocate_page().unwrap();
    }

    bufmgr.read_page(file.id(), 0).unwrap();
    bufmgr.unpin_page(file.id(), 0, false).unwrap();
    bufmgr.read_page(file.id(), 1).unwrap();
    bufmgr.unpin_page(file.id(), 1, false).unwrap();
    bufmgr.read_page(file.id(), 2).unwrap();
    bufmgr.unpin_page(file.id(), 2, false).unwrap();

    // re-touching page 0 sets its ref bit, giving it a second chance
    let frame0 = bufmgr.read_page(file.id(), 0).unwrap();
    bufmgr.unpin_page(file.id(), 0, false).unwrap();

    // page 3 must evict page 1 (oldest without a ref bit), not page 0
    bufmgr.read_page(file.id(), 3).unwrap();

    assert!(matches!(
        bufmgr.read_page(file.id(), 0),
        Ok(f) if f == frame0
    ));
    assert!(bufmgr.read_page(file.id(), 1).is_ok());
}

#[test]
fn unregistered_file_is_bad_buffer() {
    let bufmgr = BufMgr::new(2);
    assert!(matches!(
        bufmgr.read_page(FileId(99), 0),
        Err(StorageError::BadBuffer(_))
    ));
}
