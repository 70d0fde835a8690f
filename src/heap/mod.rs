mod heap_file;
mod heap_scan;
mod insert_scan;

pub use heap_file::{create_heap_file, destroy_heap_file, HeapFile};
pub use heap_scan::HeapFileScan;
pub use insert_scan::InsertFileScan;
