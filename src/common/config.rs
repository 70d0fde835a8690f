/// Size of a page in bytes.
pub const PAGESIZE: usize = 1024;

/// Bytes reserved at the front of a data page for the next-page link and
/// slot-directory bookkeeping. Record bytes and slot entries never encroach
/// on this region.
pub const DPFIXED: usize = 24;

/// Maximum length of a file name stored in a `FileHdrPage`.
pub const MAXNAMESIZE: usize = 256;

/// Sentinel meaning "no next page" in a data page's next-page link.
pub const NO_NEXT_PAGE: i32 = -1;

/// Size in bytes of a single slot-directory entry (offset + length).
pub const SLOT_SIZE: usize = 4;
