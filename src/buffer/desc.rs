use crate::common::{FileId, PageNo};

/// Per-frame bookkeeping: which (file, page) a frame holds, its pin count,
/// dirty/valid bits, and the clock algorithm's reference bit. Mirrors
/// `BufDesc` from the original buffer manager, minus the raw `File*` —
/// frames reference their file by `FileId` instead (spec.md §9, design note
/// (a)), so a closed file can never leave a dangling back-reference.
#[derive(Debug, Clone, Copy)]
pub struct BufDesc {
    pub file: Option<FileId>,
    pub page_no: PageNo,
    pub pin_cnt: u32,
    pub dirty: bool,
    pub valid: bool,
    pub refbit: bool,
}

impl BufDesc {
    pub const fn empty() -> Self {
        Self {
            file: None,
            page_no: -1,
            pin_cnt: 0,
            dirty: false,
            valid: false,
            refbit: false,
        }
    }

    /// Associates this (now-valid) frame with a file and page, pinned once —
    /// the state a frame lands in right after being loaded. The ref bit
    /// starts clear; it is only set by a later `read_page` hit.
    pub fn set(&mut self, file: FileId, page_no: PageNo) {
        self.file = Some(file);
        self.page_no = page_no;
        self.pin_cnt = 1;
        self.dirty = false;
        self.valid = true;
        self.refbit = false;
    }

    /// Returns a frame to the empty state, ready to be reused for another
    /// page.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

impl Default for BufDesc {
    fn default() -> Self {
        Self::empty()
    }
}
