mod buffer_pool_manager;
mod clock_replacer;
mod desc;
mod hash_table;

pub use buffer_pool_manager::BufMgr;
pub use clock_replacer::ClockReplacer;
pub use desc::BufDesc;
pub use hash_table::BufHashTbl;
