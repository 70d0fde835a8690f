use crate::common::{Record, Rid, SlotNo, PageNo, Result, StorageError, DPFIXED, NO_NEXT_PAGE, PAGESIZE, SLOT_SIZE};

/// Slotted data page layout:
///
/// ```text
/// +----------------------------------+  0
/// | page_no: i32                     |
/// | next_page_no: i32                |
/// | num_slots: u16                   |
/// | free_ptr: u16                    |
/// +----------------------------------+  DPFIXED
/// | slot 0: (offset: u16, len: i16)  |
/// | slot 1: ...                      |  -- grows downward (increasing offset)
/// | ...                              |
/// +----------------------------------+
/// |           free space             |
/// +----------------------------------+
/// | record N-1                       |
/// | ...                              |  -- grows upward from PAGESIZE
/// | record 0                         |
/// +----------------------------------+  PAGESIZE
/// ```
///
/// A slot's `len` is negative for a deleted (tombstoned) slot; `offset` is
/// meaningless in that case. `free_ptr` is the current low-water mark of the
/// record area — the next record is written just below it.
const PAGE_NO_OFFSET: usize = 0;
const NEXT_PAGE_OFFSET: usize = 4;
const NUM_SLOTS_OFFSET: usize = 8;
const FREE_PTR_OFFSET: usize = 10;

const TOMBSTONE: i16 = -1;

/// A mutable view of one data page's bytes, addressed by its page number.
/// Borrows the page's byte buffer for the duration of the access; callers
/// obtain the buffer from a pinned buffer-pool frame and drop the view
/// before making another buffer-manager call.
pub struct DataPage<'a> {
    data: &'a mut [u8],
}

impl<'a> DataPage<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        debug_assert_eq!(data.len(), PAGESIZE);
        Self { data }
    }

    /// Formats a fresh page: empty slot directory, full free space, no next
    /// page.
    pub fn init(&mut self, page_no: PageNo) {
        self.data.fill(0);
        self.set_page_no(page_no);
        self.set_next_page(NO_NEXT_PAGE);
        self.set_num_slots(0);
        self.set_free_ptr(PAGESIZE as u16);
    }

    pub fn page_no(&self) -> PageNo {
        i32::from_le_bytes(self.data[PAGE_NO_OFFSET..PAGE_NO_OFFSET + 4].try_into().unwrap())
    }

    fn set_page_no(&mut self, page_no: PageNo) {
        self.data[PAGE_NO_OFFSET..PAGE_NO_OFFSET + 4].copy_from_slice(&page_no.to_le_bytes());
    }

    pub fn get_next_page(&self) -> PageNo {
        i32::from_le_bytes(self.data[NEXT_PAGE_OFFSET..NEXT_PAGE_OFFSET + 4].try_into().unwrap())
    }

    pub fn set_next_page(&mut self, next: PageNo) {
        self.data[NEXT_PAGE_OFFSET..NEXT_PAGE_OFFSET + 4].copy_from_slice(&next.to_le_bytes());
    }

    fn num_slots(&self) -> u16 {
        u16::from_le_bytes(self.data[NUM_SLOTS_OFFSET..NUM_SLOTS_OFFSET + 2].try_into().unwrap())
    }

    fn set_num_slots(&mut self, n: u16) {
        self.data[NUM_SLOTS_OFFSET..NUM_SLOTS_OFFSET + 2].copy_from_slice(&n.to_le_bytes());
    }

    fn free_ptr(&self) -> u16 {
        u16::from_le_bytes(self.data[FREE_PTR_OFFSET..FREE_PTR_OFFSET + 2].try_into().unwrap())
    }

    fn set_free_ptr(&mut self, p: u16) {
        self.data[FREE_PTR_OFFSET..FREE_PTR_OFFSET + 2].copy_from_slice(&p.to_le_bytes());
    }

    fn slot_offset(&self, slot_no: SlotNo) -> usize {
        DPFIXED + slot_no as usize * SLOT_SIZE
    }

    fn read_slot(&self, slot_no: SlotNo) -> (u16, i16) {
        let at = self.slot_offset(slot_no);
        let offset = u16::from_le_bytes(self.data[at..at + 2].try_into().unwrap());
        let length = i16::from_le_bytes(self.data[at + 2..at + 4].try_into().unwrap());
        (offset, length)
    }

    fn write_slot(&mut self, slot_no: SlotNo, offset: u16, length: i16) {
        let at = self.slot_offset(slot_no);
        self.data[at..at + 2].copy_from_slice(&offset.to_le_bytes());
        self.data[at + 2..at + 4].copy_from_slice(&length.to_le_bytes());
    }

    fn slot_dir_end(&self) -> usize {
        DPFIXED + self.num_slots() as usize * SLOT_SIZE
    }

    /// Bytes available for a new record body, after accounting for the slot
    /// directory (and, if no tombstone can be reused, a new slot entry).
    fn free_space(&self) -> usize {
        (self.free_ptr() as usize).saturating_sub(self.slot_dir_end())
    }

    fn find_tombstone(&self) -> Option<SlotNo> {
        (0..self.num_slots() as SlotNo).find(|&s| self.read_slot(s).1 < 0)
    }

    /// Inserts a record, reusing a tombstoned slot when one exists.
    /// Returns `NoSpace` if the page cannot fit the record (plus a new slot
    /// entry, when no tombstone is reused).
    pub fn insert_record(&mut self, rec: &[u8], page_no: PageNo) -> Result<Rid> {
        let reuse = self.find_tombstone();
        let needed = rec.len() + if reuse.is_none() { SLOT_SIZE } else { 0 };
        if self.free_space() < needed {
            return Err(StorageError::NoSpace { needed });
        }

        let new_offset = self.free_ptr() as usize - rec.len();
        self.data[new_offset..new_offset + rec.len()].copy_from_slice(rec);
        self.set_free_ptr(new_offset as u16);

        let slot_no = match reuse {
            Some(s) => s,
            None => {
                let s = self.num_slots() as SlotNo;
                self.set_num_slots(self.num_slots() + 1);
                s
            }
        };
        self.write_slot(slot_no, new_offset as u16, rec.len() as i16);

        Ok(Rid::new(page_no, slot_no))
    }

    fn slot_for(&self, slot_no: SlotNo) -> Result<(u16, i16)> {
        if slot_no < 0 || slot_no >= self.num_slots() as SlotNo {
            return Err(StorageError::InvalidSlot(slot_no));
        }
        let (offset, length) = self.read_slot(slot_no);
        if length < 0 {
            return Err(StorageError::InvalidSlot(slot_no));
        }
        Ok((offset, length))
    }

    pub fn get_record(&self, rid: Rid) -> Result<Record<'_>> {
        let (offset, length) = self.slot_for(rid.slot_no)?;
        let offset = offset as usize;
        let length = length as usize;
        Ok(Record::new(&self.data[offset..offset + length]))
    }

    pub fn delete_record(&mut self, rid: Rid) -> Result<()> {
        self.slot_for(rid.slot_no)?;
        let at = self.slot_offset(rid.slot_no);
        self.data[at + 2..at + 4].copy_from_slice(&TOMBSTONE.to_le_bytes());
        Ok(())
    }

    pub fn first_record(&self) -> Result<Rid> {
        let page_no = self.page_no();
        (0..self.num_slots() as SlotNo)
            .find(|&s| self.read_slot(s).1 >= 0)
            .map(|s| Rid::new(page_no, s))
            .ok_or(StorageError::NoRecords)
    }

    /// Returns the next live record after `rid` on this page, or
    /// `EndOfPage` once the slot directory is exhausted.
    pub fn next_record(&self, rid: Rid) -> Result<Rid> {
        let page_no = self.page_no();
        let num_slots = self.num_slots() as SlotNo;
        ((rid.slot_no + 1)..num_slots)
            .find(|&s| self.read_slot(s).1 >= 0)
            .map(|s| Rid::new(page_no, s))
            .ok_or(StorageError::EndOfPage)
    }
}
