use log::warn;

use crate::buffer::BufMgr;
use crate::common::{Result, Rid, StorageError, DPFIXED, NO_NEXT_PAGE, PAGESIZE};
use crate::storage::{DataPage, Db, FileHdrPage};

use super::heap_file::HeapFile;

/// The append path over a heap file: always inserts at `headerPage.lastPage`,
/// allocating and linking a new page when the tail is full. Per §4.7.
pub struct InsertFileScan<'m> {
    heap: HeapFile<'m>,
}

impl<'m> InsertFileScan<'m> {
    pub fn open(db: &Db, bufmgr: &'m BufMgr, name: &str) -> Result<Self> {
        let mut heap = HeapFile::open(db, bufmgr, name)?;

        let last_page = {
            let mut bytes = heap.bufmgr.frame_bytes(heap.header_frame());
            FileHdrPage::new(&mut bytes[..]).last_page()
        };

        if heap.cur_frame.is_some() && heap.cur_page_no != last_page {
            heap.bufmgr
                .unpin_page(heap.file.id(), heap.cur_page_no, heap.cur_dirty)?;
            heap.cur_page_no = last_page;
            let frame = heap.bufmgr.read_page(heap.file.id(), last_page)?;
            heap.cur_frame = Some(frame);
            heap.cur_dirty = false;
        }

        Ok(Self { heap })
    }

    fn bump_rec_cnt(&mut self) {
        let mut bytes = self.heap.bufmgr.frame_bytes(self.heap.header_frame());
        let mut hdr = FileHdrPage::new(&mut bytes[..]);
        let cnt = hdr.rec_cnt();
        hdr.set_rec_cnt(cnt + 1);
        drop(bytes);
        self.heap.hdr_dirty = true;
    }

    /// Inserts `rec` at the tail of the file, allocating a new page if the
    /// last page is full. Rejects records that could never fit on any page.
    pub fn insert_record(&mut self, rec: &[u8]) -> Result<Rid> {
        if rec.len() > PAGESIZE - DPFIXED {
            return Err(StorageError::InvalidRecLen {
                len: rec.len(),
                max: PAGESIZE - DPFIXED,
            });
        }

        if self.heap.cur_frame.is_none() {
            let last_page = {
                let mut bytes = self.heap.bufmgr.frame_bytes(self.heap.header_frame());
                FileHdrPage::new(&mut bytes[..]).last_page()
            };
            let frame = self.heap.bufmgr.read_page(self.heap.file.id(), last_page)?;
            self.heap.cur_page_no = last_page;
            self.heap.cur_frame = Some(frame);
            self.heap.cur_dirty = false;
        }

        let frame = self.heap.cur_frame.expect("just ensured above");
        let attempt = {
            let mut bytes = self.heap.bufmgr.frame_bytes(frame);
            DataPage::new(&mut bytes[..]).insert_record(rec, self.heap.cur_page_no)
        };

        match attempt {
            Ok(rid) => {
                self.heap.cur_dirty = true;
                self.bump_rec_cnt();
                Ok(rid)
            }
            Err(StorageError::NoSpace { .. }) => self.insert_on_new_page(rec),
            Err(e) => Err(e),
        }
    }

    /// Allocates a fresh tail page, links it after the current one, and
    /// retries the insert there. The retry is expected to succeed by
    /// construction (the size check in `insert_record` already ruled out
    /// records too large for any page); failure there is a structural bug.
    fn insert_on_new_page(&mut self, rec: &[u8]) -> Result<Rid> {
        let (new_page_no, new_frame) = self.heap.bufmgr.alloc_page(self.heap.file.id())?;
        {
            let mut bytes = self.heap.bufmgr.frame_bytes(new_frame);
            DataPage::new(&mut bytes[..]).init(new_page_no);
        }

        {
            let mut bytes = self.heap.bufmgr.frame_bytes(self.heap.header_frame());
            let mut hdr = FileHdrPage::new(&mut bytes[..]);
            hdr.set_last_page(new_page_no);
            let page_cnt = hdr.page_cnt();
            hdr.set_page_cnt(page_cnt + 1);
        }
        self.heap.hdr_dirty = true;

        let old_page_no = self.heap.cur_page_no;
        let old_frame = self
            .heap
            .cur_frame
            .expect("insert_on_new_page only called with a pinned tail page");
        {
            let mut bytes = self.heap.bufmgr.frame_bytes(old_frame);
            DataPage::new(&mut bytes[..]).set_next_page(new_page_no);
        }

        if let Err(e) = self.heap.bufmgr.unpin_page(self.heap.file.id(), old_page_no, true) {
            self.heap.cur_frame = None;
            self.heap.cur_page_no = NO_NEXT_PAGE;
            self.heap.cur_dirty = false;
            // the old page failed to unpin; roll back by unpinning the new
            // page we just allocated so no pin is leaked.
            self.heap.bufmgr.unpin_page(self.heap.file.id(), new_page_no, true)?;
            return Err(e);
        }

        self.heap.cur_page_no = new_page_no;
        self.heap.cur_frame = Some(new_frame);
        self.heap.cur_dirty = false;

        let rid = {
            let mut bytes = self.heap.bufmgr.frame_bytes(new_frame);
            DataPage::new(&mut bytes[..]).insert_record(rec, new_page_no)?
        };
        self.heap.cur_dirty = true;
        self.bump_rec_cnt();
        Ok(rid)
    }
}

impl<'m> Drop for InsertFileScan<'m> {
    /// Unconditionally unpins the tail page dirty, matching the original's
    /// destructor (it does not consult `curDirtyFlag` here, since every
    /// open insert scan either just wrote a record or is about to).
    fn drop(&mut self) {
        if self.heap.cur_frame.take().is_some() {
            if let Err(e) = self.heap.bufmgr.unpin_page(self.heap.file.id(), self.heap.cur_page_no, true) {
                warn!("error unpinning data page on insert scan close: {}", e);
            }
        }
    }
}
