use log::warn;

use crate::buffer::BufMgr;
use crate::common::{AttrType, Operator, PageNo, Result, Rid, StorageError, NO_NEXT_PAGE, NULL_RID};
use crate::storage::{DataPage, Db, FileHdrPage};

use super::heap_file::HeapFile;

struct ScanFilter {
    offset: usize,
    length: usize,
    attr_type: AttrType,
    filter_bytes: Vec<u8>,
    op: Operator,
}

/// A filtered forward scan over a heap file's records, page by page. Starts
/// unpositioned: the header is pinned (inherited from `HeapFile::open`) but
/// no data page is pinned until the first `scan_next` call, which lazily
/// loads `headerPage.firstPage` — matching `spec.md` §4.6's state machine
/// rather than the original's eager first-page pin.
pub struct HeapFileScan<'m> {
    heap: HeapFile<'m>,
    filter: Option<ScanFilter>,
    marked_page_no: PageNo,
    marked_rec: Rid,
}

impl<'m> HeapFileScan<'m> {
    pub fn open(db: &Db, bufmgr: &'m BufMgr, name: &str) -> Result<Self> {
        let mut heap = HeapFile::open(db, bufmgr, name)?;
        if heap.cur_frame.take().is_some() {
            heap.bufmgr
                .unpin_page(heap.file.id(), heap.cur_page_no, heap.cur_dirty)?;
        }
        heap.cur_dirty = false;
        heap.cur_rec = NULL_RID;
        let marked_page_no = heap.cur_page_no;
        Ok(Self {
            heap,
            filter: None,
            marked_page_no,
            marked_rec: NULL_RID,
        })
    }

    /// Installs (or clears) the scan predicate. `filter_bytes = None` means
    /// an unfiltered scan. Validates offset/length/type/operator
    /// combinations per §4.6; invalid combinations return `BadScanParm`.
    pub fn start_scan(
        &mut self,
        offset: usize,
        length: usize,
        attr_type: AttrType,
        filter_bytes: Option<&[u8]>,
        op: Operator,
    ) -> Result<()> {
        let Some(filter_bytes) = filter_bytes else {
            self.filter = None;
            return Ok(());
        };

        if length < 1
            || (attr_type == AttrType::Integer && length != 4)
            || (attr_type == AttrType::Float && length != 4)
            || filter_bytes.len() != length
        {
            return Err(StorageError::BadScanParm);
        }

        self.filter = Some(ScanFilter {
            offset,
            length,
            attr_type,
            filter_bytes: filter_bytes.to_vec(),
            op,
        });
        Ok(())
    }

    fn match_rec(&self, rec: &[u8]) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };
        if filter.offset + filter.length > rec.len() {
            return false;
        }
        let attr = &rec[filter.offset..filter.offset + filter.length];

        let ordering = match filter.attr_type {
            AttrType::Integer => {
                let a = i32::from_ne_bytes(attr.try_into().unwrap());
                let f = i32::from_ne_bytes(filter.filter_bytes[..].try_into().unwrap());
                a.cmp(&f)
            }
            AttrType::Float => {
                let a = f32::from_ne_bytes(attr.try_into().unwrap());
                let f = f32::from_ne_bytes(filter.filter_bytes[..].try_into().unwrap());
                a.partial_cmp(&f).unwrap_or(std::cmp::Ordering::Equal)
            }
            AttrType::String => attr.cmp(&filter.filter_bytes[..]),
        };

        match filter.op {
            Operator::Lt => ordering.is_lt(),
            Operator::Lte => ordering.is_le(),
            Operator::Eq => ordering.is_eq(),
            Operator::Gte => ordering.is_ge(),
            Operator::Gt => ordering.is_gt(),
            Operator::Ne => ordering.is_ne(),
        }
    }

    fn record_at_cursor(&self) -> Result<Vec<u8>> {
        let frame = self
            .heap
            .cur_frame
            .expect("record cursor without a pinned page");
        let mut bytes = self.heap.bufmgr.frame_bytes(frame);
        DataPage::new(&mut bytes[..])
            .get_record(self.heap.cur_rec)
            .map(|r| r.as_bytes().to_vec())
    }

    /// Returns the current record without advancing the scan. The page
    /// stays pinned.
    pub fn get_record(&self) -> Result<Vec<u8>> {
        self.record_at_cursor()
    }

    fn load_page(&mut self, page_no: PageNo) -> Result<()> {
        let frame = self.heap.bufmgr.read_page(self.heap.file.id(), page_no)?;
        self.heap.cur_page_no = page_no;
        self.heap.cur_frame = Some(frame);
        self.heap.cur_dirty = false;
        Ok(())
    }

    fn unpin_cur(&mut self) -> Result<()> {
        if self.heap.cur_frame.take().is_some() {
            self.heap
                .bufmgr
                .unpin_page(self.heap.file.id(), self.heap.cur_page_no, self.heap.cur_dirty)?;
        }
        Ok(())
    }

    /// Advances to the next record satisfying the predicate, returning its
    /// `Rid`. `FileEof` once the chain is exhausted.
    pub fn scan_next(&mut self) -> Result<Rid> {
        if self.heap.cur_page_no < 0 {
            self.heap.cur_rec = NULL_RID;
            return Err(StorageError::FileEof);
        }

        if self.heap.cur_frame.is_none() {
            let first_page = {
                let mut bytes = self.heap.bufmgr.frame_bytes(self.heap.header_frame());
                FileHdrPage::new(&mut bytes[..]).first_page()
            };
            if first_page < 0 {
                return Err(StorageError::FileEof);
            }
            self.load_page(first_page)?;
            self.heap.cur_rec = NULL_RID;

            let first_rid = {
                let mut bytes = self.heap.bufmgr.frame_bytes(self.heap.cur_frame.unwrap());
                DataPage::new(&mut bytes[..]).first_record()
            };
            match first_rid {
                Ok(rid) => {
                    self.heap.cur_rec = rid;
                    let rec = self.record_at_cursor()?;
                    if self.match_rec(&rec) {
                        return Ok(rid);
                    }
                }
                Err(StorageError::NoRecords) => {
                    self.unpin_cur()?;
                    self.heap.cur_page_no = NO_NEXT_PAGE;
                    return Err(StorageError::FileEof);
                }
                Err(e) => return Err(e),
            }
        }

        loop {
            let frame = self
                .heap
                .cur_frame
                .expect("loop invariant: a page is pinned while scanning");
            let next = {
                let mut bytes = self.heap.bufmgr.frame_bytes(frame);
                DataPage::new(&mut bytes[..]).next_record(self.heap.cur_rec)
            };

            match next {
                Ok(rid) => self.heap.cur_rec = rid,
                Err(StorageError::EndOfPage) => loop {
                    let next_page_no = {
                        let mut bytes = self.heap.bufmgr.frame_bytes(frame);
                        DataPage::new(&mut bytes[..]).get_next_page()
                    };
                    self.unpin_cur()?;
                    if next_page_no < 0 {
                        self.heap.cur_page_no = NO_NEXT_PAGE;
                        return Err(StorageError::FileEof);
                    }
                    self.load_page(next_page_no)?;
                    let first = {
                        let mut bytes = self.heap.bufmgr.frame_bytes(self.heap.cur_frame.unwrap());
                        DataPage::new(&mut bytes[..]).first_record()
                    };
                    match first {
                        Ok(rid) => {
                            self.heap.cur_rec = rid;
                            break;
                        }
                        Err(StorageError::NoRecords) => continue,
                        Err(e) => return Err(e),
                    }
                },
                Err(e) => return Err(e),
            }

            let rec = self.record_at_cursor()?;
            if self.match_rec(&rec) {
                return Ok(self.heap.cur_rec);
            }
        }
    }

    pub fn mark_scan(&mut self) {
        self.marked_page_no = self.heap.cur_page_no;
        self.marked_rec = self.heap.cur_rec;
    }

    pub fn reset_scan(&mut self) -> Result<()> {
        if self.marked_page_no != self.heap.cur_page_no {
            self.unpin_cur()?;
            self.heap.cur_page_no = self.marked_page_no;
            self.heap.cur_rec = self.marked_rec;
            if self.heap.cur_page_no >= 0 {
                self.load_page(self.heap.cur_page_no)?;
            }
        } else {
            self.heap.cur_rec = self.marked_rec;
        }
        Ok(())
    }

    pub fn end_scan(&mut self) -> Result<()> {
        let result = self.unpin_cur();
        self.heap.cur_page_no = NO_NEXT_PAGE;
        result
    }

    pub fn delete_record(&mut self) -> Result<()> {
        let frame = self
            .heap
            .cur_frame
            .ok_or(StorageError::PageNotPinned(self.heap.id(), self.heap.cur_page_no))?;
        {
            let mut bytes = self.heap.bufmgr.frame_bytes(frame);
            DataPage::new(&mut bytes[..]).delete_record(self.heap.cur_rec)?;
        }
        self.heap.cur_dirty = true;

        {
            let mut bytes = self.heap.bufmgr.frame_bytes(self.heap.header_frame());
            let mut hdr = FileHdrPage::new(&mut bytes[..]);
            let cnt = hdr.rec_cnt();
            hdr.set_rec_cnt(cnt - 1);
        }
        self.heap.hdr_dirty = true;
        Ok(())
    }

    pub fn mark_dirty(&mut self) {
        self.heap.cur_dirty = true;
    }
}

impl<'m> Drop for HeapFileScan<'m> {
    fn drop(&mut self) {
        if let Err(e) = self.end_scan() {
            warn!("error ending scan: {}", e);
        }
    }
}
