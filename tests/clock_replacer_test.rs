//! Integration-level exercise of `ClockReplacer` through the public crate
//! API, proving the hand wraps around and an all-pinned pool is reported as
//! exceeded rather than looping forever.

use heapcore::buffer::{BufDesc, ClockReplacer};
use heapcore::common::StorageError;

#[test]
fn hand_wraps_around_the_pool() {
    let mut replacer = ClockReplacer::new(3);
    let mut descs = vec![BufDesc::empty(); 3];
    for d in &mut descs {
        d.valid = true;
    }
    let first = replacer.find_victim(&mut descs).unwrap();
    descs[first].pin_cnt = 1;
    let second = replacer.find_victim(&mut descs).unwrap();
    assert_ne!(first, second);
}

#[test]
fn every_frame_pinned_is_buffer_exceeded() {
    let mut replacer = ClockReplacer::new(4);
    let mut descs = vec![BufDesc::empty(); 4];
    for d in &mut descs {
        d.valid = true;
        d.pin_cnt = 1;
    }
    assert!(matches!(
        replacer.find_victim(&mut descs),
        Err(StorageError::BufferExceeded)
    ));
}
