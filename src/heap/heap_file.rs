use std::rc::Rc;

use log::{info, warn};

use crate::buffer::BufMgr;
use crate::common::{FileId, FrameId, PageNo, Rid, Result, StorageError, NULL_RID};
use crate::storage::{Db, FileHandle, FileHdrPage};

/// A heap file: a header page plus a singly-linked chain of slotted data
/// pages, opened against a buffer manager. Holds at most two pins at a
/// time — the header page and the "current" data page — per spec.md's
/// resource-model note that the heap-file layer never retains more.
///
/// `hdr_dirty`/`cur_dirty` start `false` and are only set on an actual
/// header/page mutation; the original engine set both unconditionally on
/// open, dirtying pages that were never written to. That is treated as a
/// bug here (see DESIGN.md).
pub struct HeapFile<'m> {
    pub(crate) bufmgr: &'m BufMgr,
    pub(crate) file: Rc<FileHandle>,
    pub(crate) header_page_no: PageNo,
    header_frame: FrameId,
    pub(crate) hdr_dirty: bool,
    pub(crate) cur_page_no: PageNo,
    pub(crate) cur_frame: Option<FrameId>,
    pub(crate) cur_dirty: bool,
    pub(crate) cur_rec: Rid,
}

/// Creates a new, empty heap file. Mirrors `createHeapFile`: try opening the
/// name first (an existing file is an error), and only create on that
/// failure — not a separate existence probe, per `heapfile.C`.
pub fn create_heap_file(db: &Db, bufmgr: &BufMgr, name: &str) -> Result<()> {
    if db.open_file(name).is_ok() {
        return Err(StorageError::FileExists);
    }

    db.create_file(name)?;
    let file = Rc::new(db.open_file(name)?);
    bufmgr.register_file(file.clone());

    let result = (|| -> Result<()> {
        let (hdr_page_no, hdr_frame) = bufmgr.alloc_page(file.id())?;
        {
            let mut bytes = bufmgr.frame_bytes(hdr_frame);
            FileHdrPage::new(&mut bytes[..]).init(name);
        }

        let (data_page_no, data_frame) = bufmgr.alloc_page(file.id())?;
        {
            let mut bytes = bufmgr.frame_bytes(data_frame);
            crate::storage::DataPage::new(&mut bytes[..]).init(data_page_no);
        }
        {
            let mut bytes = bufmgr.frame_bytes(hdr_frame);
            let mut hdr = FileHdrPage::new(&mut bytes[..]);
            hdr.set_first_page(data_page_no);
            hdr.set_last_page(data_page_no);
            hdr.set_page_cnt(1);
        }

        bufmgr.unpin_page(file.id(), hdr_page_no, true)?;
        bufmgr.unpin_page(file.id(), data_page_no, true)?;
        Ok(())
    })();

    bufmgr.unregister_file(file.id());
    result
}

pub fn destroy_heap_file(db: &Db, name: &str) -> Result<()> {
    db.destroy_file(name)
}

impl<'m> HeapFile<'m> {
    pub fn open(db: &Db, bufmgr: &'m BufMgr, name: &str) -> Result<Self> {
        info!("opening heap file {}", name);
        let file = Rc::new(db.open_file(name)?);
        bufmgr.register_file(file.clone());

        let header_page_no = file.get_first_page()?;
        let header_frame = bufmgr.read_page(file.id(), header_page_no)?;
        let cur_page_no = {
            let mut bytes = bufmgr.frame_bytes(header_frame);
            FileHdrPage::new(&mut bytes[..]).first_page()
        };
        let cur_frame = Some(bufmgr.read_page(file.id(), cur_page_no)?);

        Ok(Self {
            bufmgr,
            file,
            header_page_no,
            header_frame,
            hdr_dirty: false,
            cur_page_no,
            cur_frame,
            cur_dirty: false,
            cur_rec: NULL_RID,
        })
    }

    pub fn id(&self) -> FileId {
        self.file.id()
    }

    pub fn get_rec_cnt(&self) -> i32 {
        let mut bytes = self.bufmgr.frame_bytes(self.header_frame);
        FileHdrPage::new(&mut bytes[..]).rec_cnt()
    }

    /// Reads an arbitrary record. If `rid` is not on the currently pinned
    /// page, unpins the current page and pins `rid.page_no` instead.
    pub fn get_record(&mut self, rid: Rid) -> Result<Vec<u8>> {
        self.ensure_current_page(rid.page_no)?;
        let frame = self.cur_frame.expect("ensure_current_page pins a frame");
        let mut bytes = self.bufmgr.frame_bytes(frame);
        let page = crate::storage::DataPage::new(&mut bytes[..]);
        page.get_record(rid).map(|r| r.as_bytes().to_vec())
    }

    /// Switches the pinned "current" page to `page_no` if it isn't already.
    pub(crate) fn ensure_current_page(&mut self, page_no: PageNo) -> Result<()> {
        if self.cur_page_no == page_no && self.cur_frame.is_some() {
            return Ok(());
        }
        if self.cur_frame.is_some() {
            self.bufmgr
                .unpin_page(self.file.id(), self.cur_page_no, self.cur_dirty)?;
        }
        let frame = self.bufmgr.read_page(self.file.id(), page_no)?;
        self.cur_page_no = page_no;
        self.cur_frame = Some(frame);
        self.cur_dirty = false;
        Ok(())
    }

    pub(crate) fn header_frame(&self) -> FrameId {
        self.header_frame
    }
}

impl<'m> Drop for HeapFile<'m> {
    fn drop(&mut self) {
        if self.cur_frame.is_some() {
            if let Err(e) = self
                .bufmgr
                .unpin_page(self.file.id(), self.cur_page_no, self.cur_dirty)
            {
                warn!("error unpinning data page on heap file close: {}", e);
            }
            self.cur_frame = None;
        }
        if let Err(e) = self
            .bufmgr
            .unpin_page(self.file.id(), self.header_page_no, self.hdr_dirty)
        {
            warn!("error unpinning header page on heap file close: {}", e);
        }
        self.bufmgr.unregister_file(self.file.id());
    }
}
