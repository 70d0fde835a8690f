//! Integration tests for filtered scanning and in-place deletion.

use heapcore::buffer::BufMgr;
use heapcore::common::{AttrType, Operator};
use heapcore::heap::{create_heap_file, HeapFile, HeapFileScan, InsertFileScan};
use heapcore::storage::Db;
use tempfile::tempdir;

fn make_rec(a: i32) -> Vec<u8> {
    a.to_ne_bytes().to_vec()
}

/// S5: a predicate scan (`a >= 50`) over 100 records with a 4-byte integer
/// attribute at offset 0 returns exactly the 50 matching records.
#[test]
fn filtered_scan_returns_only_matching_records() {
    let dir = tempdir().unwrap();
    let db = Db::new(dir.path());
    let bufmgr = BufMgr::new(8);

    create_heap_file(&db, &bufmgr, "ints.hf").unwrap();
    {
        let mut insert = InsertFileScan::open(&db, &bufmgr, "ints.hf").unwrap();
        for a in 0..100 {
            insert.insert_record(&make_rec(a)).unwrap();
        }
    }

    let mut scan = HeapFileScan::open(&db, &bufmgr, "ints.hf").unwrap();
    scan.start_scan(0, 4, AttrType::Integer, Some(&50i32.to_ne_bytes()), Operator::Gte)
        .unwrap();

    let mut count = 0;
    loop {
        match scan.scan_next() {
            Ok(rid) => {
                let rec = scan.get_record().unwrap();
                let a = i32::from_ne_bytes(rec[0..4].try_into().unwrap());
                assert!(a >= 50, "record {:?} with a={} should not match", rid, a);
                count += 1;
            }
            Err(_) => break,
        }
    }
    assert_eq!(count, 50);
}

/// S6: deleting every record with `a < 10` from the S5 fixture leaves 90
/// records, and a subsequent unfiltered scan confirms none of the deleted
/// attribute values remain.
#[test]
fn delete_record_updates_count_and_is_excluded_from_rescan() {
    let dir = tempdir().unwrap();
    let db = Db::new(dir.path());
    let bufmgr = BufMgr::new(8);

    create_heap_file(&db, &bufmgr, "ints.hf").unwrap();
    {
        let mut insert = InsertFileScan::open(&db, &bufmgr, "ints.hf").unwrap();
        for a in 0..100 {
            insert.insert_record(&make_rec(a)).unwrap();
        }
    }

    {
        let mut scan = HeapFileScan::open(&db, &bufmgr, "ints.hf").unwrap();
        scan.start_scan(0, 4, AttrType::Integer, Some(&10i32.to_ne_bytes()), Operator::Lt)
            .unwrap();
        while scan.scan_next().is_ok() {
            scan.delete_record().unwrap();
        }
    }

    let heap = HeapFile::open(&db, &bufmgr, "ints.hf").unwrap();
    assert_eq!(heap.get_rec_cnt(), 90);
    drop(heap);

    let mut rescan = HeapFileScan::open(&db, &bufmgr, "ints.hf").unwrap();
    let mut seen = 0;
    loop {
        match rescan.scan_next() {
            Ok(_) => {
                let rec = rescan.get_record().unwrap();
                let a = i32::from_ne_bytes(rec[0..4].try_into().unwrap());
                assert!(a >= 10, "record with a={} should have been deleted", a);
                seen += 1;
            }
            Err(_) => break,
        }
    }
    assert_eq!(seen, 90);
}

#[test]
fn mark_and_reset_scan_returns_to_marked_position() {
    let dir = tempdir().unwrap();
    let db = Db::new(dir.path());
    let bufmgr = BufMgr::new(8);

    create_heap_file(&db, &bufmgr, "mark.hf").unwrap();
    {
        let mut insert = InsertFileScan::open(&db, &bufmgr, "mark.hf").unwrap();
        for a in 0..20 {
            insert.insert_record(&make_rec(a)).unwrap();
        }
    }

    let mut scan = HeapFileScan::open(&db, &bufmgr, "mark.hf").unwrap();
    let first = scan.scan_next().unwrap();
    scan.mark_scan();
    let second = scan.scan_next().unwrap();
    assert_ne!(first, second);

    scan.reset_scan().unwrap();
    let replayed = scan.scan_next().unwrap();
    assert_eq!(replayed, second);
}
