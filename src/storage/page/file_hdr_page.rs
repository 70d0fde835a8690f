use crate::common::{PageNo, MAXNAMESIZE, NO_NEXT_PAGE, PAGESIZE};

/// The zero-length-record header page every heap file keeps as its physical
/// page 0 (spec.md §3, §4.5). Carries the file's name and the bookkeeping a
/// `HeapFile` needs to append new pages and report record counts without a
/// full scan.
const NAME_OFFSET: usize = 0;
const REC_CNT_OFFSET: usize = MAXNAMESIZE;
const PAGE_CNT_OFFSET: usize = REC_CNT_OFFSET + 4;
const FIRST_PAGE_OFFSET: usize = PAGE_CNT_OFFSET + 4;
const LAST_PAGE_OFFSET: usize = FIRST_PAGE_OFFSET + 4;

pub struct FileHdrPage<'a> {
    data: &'a mut [u8],
}

impl<'a> FileHdrPage<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        debug_assert_eq!(data.len(), PAGESIZE);
        Self { data }
    }

    pub fn init(&mut self, name: &str) {
        self.data.fill(0);
        self.set_name(name);
        self.set_rec_cnt(0);
        self.set_page_cnt(0);
        self.set_first_page(NO_NEXT_PAGE);
        self.set_last_page(NO_NEXT_PAGE);
    }

    pub fn name(&self) -> String {
        let raw = &self.data[NAME_OFFSET..NAME_OFFSET + MAXNAMESIZE];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        String::from_utf8_lossy(&raw[..end]).into_owned()
    }

    fn set_name(&mut self, name: &str) {
        let bytes = name.as_bytes();
        let n = bytes.len().min(MAXNAMESIZE - 1);
        self.data[NAME_OFFSET..NAME_OFFSET + MAXNAMESIZE].fill(0);
        self.data[NAME_OFFSET..NAME_OFFSET + n].copy_from_slice(&bytes[..n]);
    }

    pub fn rec_cnt(&self) -> i32 {
        self.read_i32(REC_CNT_OFFSET)
    }

    pub fn set_rec_cnt(&mut self, n: i32) {
        self.write_i32(REC_CNT_OFFSET, n);
    }

    pub fn page_cnt(&self) -> i32 {
        self.read_i32(PAGE_CNT_OFFSET)
    }

    pub fn set_page_cnt(&mut self, n: i32) {
        self.write_i32(PAGE_CNT_OFFSET, n);
    }

    pub fn first_page(&self) -> PageNo {
        self.read_i32(FIRST_PAGE_OFFSET)
    }

    pub fn set_first_page(&mut self, p: PageNo) {
        self.write_i32(FIRST_PAGE_OFFSET, p);
    }

    pub fn last_page(&self) -> PageNo {
        self.read_i32(LAST_PAGE_OFFSET)
    }

    pub fn set_last_page(&mut self, p: PageNo) {
        self.write_i32(LAST_PAGE_OFFSET, p);
    }

    fn read_i32(&self, at: usize) -> i32 {
        i32::from_le_bytes(self.data[at..at + 4].try_into().unwrap())
    }

    fn write_i32(&mut self, at: usize, v: i32) {
        self.data[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_round_trip_fields() {
        let mut buf = [0u8; PAGESIZE];
        let mut hdr = FileHdrPage::new(&mut buf);
        hdr.init("students.hf");
        assert_eq!(hdr.name(), "students.hf");
        assert_eq!(hdr.rec_cnt(), 0);
        assert_eq!(hdr.first_page(), NO_NEXT_PAGE);

        hdr.set_rec_cnt(42);
        hdr.set_page_cnt(3);
        hdr.set_first_page(1);
        hdr.set_last_page(3);
        assert_eq!(hdr.rec_cnt(), 42);
        assert_eq!(hdr.page_cnt(), 3);
        assert_eq!(hdr.first_page(), 1);
        assert_eq!(hdr.last_page(), 3);
    }

    #[test]
    fn long_name_is_truncated_not_overrun() {
        let mut buf = [0u8; PAGESIZE];
        let mut hdr = FileHdrPage::new(&mut buf);
        let long = "x".repeat(MAXNAMESIZE + 10);
        hdr.init(&long);
        assert_eq!(hdr.name().len(), MAXNAMESIZE - 1);
    }
}
