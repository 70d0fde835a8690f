use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::common::{FileId, FrameId, PageNo, Result, StorageError, PAGESIZE};
use crate::storage::FileHandle;

use super::clock_replacer::ClockReplacer;
use super::desc::BufDesc;
use super::hash_table::BufHashTbl;

/// The buffer manager: a fixed pool of page-sized frames, a hash index from
/// `(file, page)` to frame, and a clock replacer choosing victims. Mirrors
/// `BufMgr` (§4.4) — single-threaded, no locking, frames addressed by index
/// rather than pointer.
///
/// Files are looked up by `FileId` through an internal registry populated by
/// `register_file`; callers (the heap-file layer) own the `FileHandle`
/// itself and register it here before issuing any page operations against
/// it.
pub struct BufMgr {
    num_bufs: usize,
    pool: RefCell<Vec<[u8; PAGESIZE]>>,
    descs: RefCell<Vec<BufDesc>>,
    hash_table: RefCell<BufHashTbl>,
    replacer: RefCell<ClockReplacer>,
    files: RefCell<HashMap<FileId, Rc<FileHandle>>>,
}

impl BufMgr {
    pub fn new(num_bufs: usize) -> Self {
        Self {
            num_bufs,
            pool: RefCell::new(vec![[0u8; PAGESIZE]; num_bufs]),
            descs: RefCell::new(vec![BufDesc::empty(); num_bufs]),
            hash_table: RefCell::new(BufHashTbl::new(num_bufs)),
            replacer: RefCell::new(ClockReplacer::new(num_bufs)),
            files: RefCell::new(HashMap::new()),
        }
    }

    pub fn register_file(&self, file: Rc<FileHandle>) {
        self.files.borrow_mut().insert(file.id(), file);
    }

    pub fn unregister_file(&self, file: FileId) {
        self.files.borrow_mut().remove(&file);
    }

    fn file_handle(&self, file: FileId) -> Result<Rc<FileHandle>> {
        self.files
            .borrow()
            .get(&file)
            .cloned()
            .ok_or(StorageError::BadBuffer(file))
    }

    /// Picks a victim frame via the clock replacer, writing it back if
    /// dirty and dropping it from the hash index. Mirrors `allocBuf`, split
    /// so the replacer itself stays a pure clock sweep.
    fn alloc_buf(&self) -> Result<FrameId> {
        let frame = {
            let mut descs = self.descs.borrow_mut();
            self.replacer.borrow_mut().find_victim(&mut descs)?
        };

        let (victim_file, victim_page, dirty) = {
            let descs = self.descs.borrow();
            let d = &descs[frame];
            (d.file, d.page_no, d.dirty)
        };

        if let Some(file_id) = victim_file {
            // the frame being evicted may already be gone from the index
            // (disposePage clears descriptors without removing the hash
            // entry first in some callers) -- removal failing here is not
            // an error worth propagating.
            let _ = self.hash_table.borrow_mut().remove(file_id, victim_page);
            if dirty {
                let handle = self.file_handle(file_id)?;
                let pool = self.pool.borrow();
                debug!(
                    "alloc_buf: flushing dirty page {} of file {} from frame {}",
                    victim_page, file_id, frame
                );
                handle.write_page(victim_page, &pool[frame])?;
            }
        }

        Ok(frame)
    }

    /// Fetches a page into the pool, pinning it. Returns the frame already
    /// holding the page if it is resident.
    pub fn read_page(&self, file: FileId, page_no: PageNo) -> Result<FrameId> {
        let existing = self.hash_table.borrow().lookup(file, page_no);
        if let Ok(frame) = existing {
            let mut descs = self.descs.borrow_mut();
            descs[frame].refbit = true;
            descs[frame].pin_cnt += 1;
            trace!(
                "read_page: page {} of file {} already in frame {} (pin_cnt={})",
                page_no, file, frame, descs[frame].pin_cnt
            );
            return Ok(frame);
        }

        let frame = self.alloc_buf()?;
        let handle = self.file_handle(file)?;
        {
            let mut pool = self.pool.borrow_mut();
            handle.read_page(page_no, &mut pool[frame])?;
        }
        self.hash_table.borrow_mut().insert(file, page_no, frame)?;
        self.descs.borrow_mut()[frame].set(file, page_no);
        trace!("read_page: loaded page {} of file {} into frame {}", page_no, file, frame);
        Ok(frame)
    }

    /// Allocates a fresh page in `file` and pins it into a frame, per
    /// `allocPage`.
    pub fn alloc_page(&self, file: FileId) -> Result<(PageNo, FrameId)> {
        let handle = self.file_handle(file)?;
        let page_no = handle.allocate_page()?;
        let frame = self.alloc_buf()?;
        self.hash_table.borrow_mut().insert(file, page_no, frame)?;
        {
            let mut pool = self.pool.borrow_mut();
            handle.read_page(page_no, &mut pool[frame])?;
        }
        self.descs.borrow_mut()[frame].set(file, page_no);
        Ok((page_no, frame))
    }

    pub fn unpin_page(&self, file: FileId, page_no: PageNo, dirty: bool) -> Result<()> {
        let frame = self.hash_table.borrow().lookup(file, page_no)?;
        let mut descs = self.descs.borrow_mut();
        let desc = &mut descs[frame];
        if desc.pin_cnt == 0 {
            return Err(StorageError::PageNotPinned(file, page_no));
        }
        desc.pin_cnt -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    pub fn dispose_page(&self, file: FileId, page_no: PageNo) -> Result<()> {
        if let Ok(frame) = self.hash_table.borrow().lookup(file, page_no) {
            self.descs.borrow_mut()[frame].clear();
            let _ = self.hash_table.borrow_mut().remove(file, page_no);
        }
        let handle = self.file_handle(file)?;
        handle.dispose_page(page_no)
    }

    /// Flushes every dirty, valid frame belonging to `file` and drops them
    /// from the pool. Errors if any of `file`'s frames are still pinned.
    pub fn flush_file(&self, file: FileId) -> Result<()> {
        let handle = self.file_handle(file)?;
        let mut descs = self.descs.borrow_mut();
        let pool = self.pool.borrow();
        for frame in 0..self.num_bufs {
            let desc = &mut descs[frame];
            if !desc.valid || desc.file != Some(file) {
                continue;
            }
            if desc.pin_cnt > 0 {
                return Err(StorageError::PagePinned(file, desc.page_no));
            }
            if desc.dirty {
                debug!("flush_file: writing back page {} of file {}", desc.page_no, file);
                handle.write_page(desc.page_no, &pool[frame])?;
                desc.dirty = false;
            }
            let _ = self.hash_table.borrow_mut().remove(file, desc.page_no);
            desc.clear();
        }
        Ok(())
    }

    /// Mutable access to one frame's raw page bytes, for the heap-file layer
    /// to lay a `DataPage`/`FileHdrPage` view over.
    pub fn frame_bytes(&self, frame: FrameId) -> RefMut<'_, [u8; PAGESIZE]> {
        RefMut::map(self.pool.borrow_mut(), |pool| &mut pool[frame])
    }
}

impl Drop for BufMgr {
    /// Best-effort flush of every dirty, valid frame. Mirrors `~BufMgr`,
    /// which has no status code to report failures through; a failed
    /// write-back here is logged, not propagated.
    fn drop(&mut self) {
        let descs = self.descs.borrow();
        let pool = self.pool.borrow();
        let files = self.files.borrow();
        for frame in 0..self.num_bufs {
            let desc = &descs[frame];
            if !desc.valid || !desc.dirty {
                continue;
            }
            let Some(file_id) = desc.file else { continue };
            let Some(handle) = files.get(&file_id) else { continue };
            if let Err(e) = handle.write_page(desc.page_no, &pool[frame]) {
                warn!(
                    "drop: failed to flush page {} of file {}: {}",
                    desc.page_no, file_id, e
                );
            }
        }
    }
}
