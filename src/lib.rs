//! heapcore - a disk-oriented heap-file storage engine core
//!
//! This crate provides the core of a relational storage engine: a
//! fixed-size buffer pool over paged files, and a heap-file record layer
//! built on top of it. It stores data on persistent storage and caches
//! pages in memory behind pin-counted frames, exactly the layer a query
//! executor or catalog would sit on top of.
//!
//! # Architecture
//!
//! - **Storage layer** (`storage`): paged files and on-disk page formats
//!   - `FileHandle`: allocate/read/write/dispose fixed-size pages of one file
//!   - `Db`: resolves named heap files to on-disk paths
//!   - `DataPage`: slotted record page (insert/delete/get/iterate)
//!   - `FileHdrPage`: the header page every heap file keeps as page 0
//!
//! - **Buffer pool** (`buffer`): memory management for pages
//!   - `BufMgr`: fetches pages from disk and pins them into frames
//!   - `ClockReplacer`: second-chance clock eviction
//!   - `BufHashTbl`: chained hash index from `(file, page)` to frame
//!
//! - **Heap file layer** (`heap`): records on top of the buffer pool
//!   - `HeapFile`: random access by `Rid`, header bookkeeping
//!   - `HeapFileScan`: filtered forward iteration with mark/reset
//!   - `InsertFileScan`: append-only insertion, growing the page chain
//!
//! This crate is single-threaded by design: no concurrency control, no
//! transactions or recovery log, no secondary indexes, no query optimizer.
//!
//! # Example
//!
//! ```rust,no_run
//! use heapcore::buffer::BufMgr;
//! use heapcore::storage::Db;
//! use heapcore::heap::{create_heap_file, HeapFile, InsertFileScan};
//!
//! let db = Db::new("/tmp/heapcore-example");
//! let bufmgr = BufMgr::new(64);
//!
//! create_heap_file(&db, &bufmgr, "students.hf").unwrap();
//!
//! let mut insert = InsertFileScan::open(&db, &bufmgr, "students.hf").unwrap();
//! let rid = insert.insert_record(b"alice").unwrap();
//! drop(insert);
//!
//! let mut heap = HeapFile::open(&db, &bufmgr, "students.hf").unwrap();
//! assert_eq!(heap.get_record(rid).unwrap(), b"alice");
//! ```

pub mod buffer;
pub mod common;
pub mod heap;
pub mod storage;

pub use common::{Result, StorageError};
