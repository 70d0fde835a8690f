use thiserror::Error;

use super::types::{FileId, PageNo};

/// Every public operation in this crate returns one of these outcomes in
/// place of the original engine's integer status codes. Variants are
/// grouped the way `spec.md` §7 groups them: structural invariant
/// violations, resource exhaustion, I/O failures, end-of-iteration signals,
/// and input validation.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every frame is pinned; the clock replacer swept twice without
    /// finding a victim.
    #[error("buffer pool exceeded: no evictable frame available")]
    BufferExceeded,

    #[error("no frame found for (file {0}, page {1}) in the hash index")]
    HashNotFound(FileId, PageNo),

    #[error("duplicate hash table insert for (file {0}, page {1})")]
    HashTblError(FileId, PageNo),

    #[error("unpin of (file {0}, page {1}) with pin count already zero")]
    PageNotPinned(FileId, PageNo),

    #[error("flushFile: page {1} of file {0} is still pinned")]
    PagePinned(FileId, PageNo),

    #[error("structural bug: frame references file {0} but is marked invalid")]
    BadBuffer(FileId),

    #[error("end of file reached during scan")]
    FileEof,

    #[error("heap file already exists")]
    FileExists,

    #[error("page has no records")]
    NoRecords,

    #[error("end of page reached")]
    EndOfPage,

    #[error("invalid slot number {0}")]
    InvalidSlot(i32),

    #[error("record of length {len} exceeds the maximum record length {max}")]
    InvalidRecLen { len: usize, max: usize },

    #[error("not enough free space on page to insert {needed} bytes")]
    NoSpace { needed: usize },

    #[error("invalid scan predicate parameters")]
    BadScanParm,

    #[error("invalid catalog parameters")]
    BadCatParm,

    #[error("attribute not found")]
    AttrNotFound,
}

pub type Result<T> = std::result::Result<T, StorageError>;
