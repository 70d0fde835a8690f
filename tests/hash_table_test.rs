//! Integration-level exercise of `BufHashTbl` through the public crate API.

use heapcore::buffer::BufHashTbl;
use heapcore::common::FileId;

#[test]
fn many_pages_across_few_buckets_all_resolve() {
    let mut tbl = BufHashTbl::new(4);
    for page in 0..50 {
        tbl.insert(FileId(0), page, page as usize).unwrap();
    }
    for page in 0..50 {
        assert_eq!(tbl.lookup(FileId(0), page).unwrap(), page as usize);
    }
}

#[test]
fn remove_frees_the_slot_for_reinsertion() {
    let mut tbl = BufHashTbl::new(4);
    tbl.insert(FileId(1), 7, 0).unwrap();
    tbl.remove(FileId(1), 7).unwrap();
    // a fresh insert at the same (file, page) after removal must succeed,
    // not be rejected as a duplicate.
    tbl.insert(FileId(1), 7, 3).unwrap();
    assert_eq!(tbl.lookup(FileId(1), 7).unwrap(), 3);
}
