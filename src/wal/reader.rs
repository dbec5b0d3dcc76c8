//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::entry::Header;
use super::{WalEntry, HEADER_SIZE, MAX_RECORD_SIZE};
use crate::error::{ChunkKvError, Result};

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Offset just past the last entry read successfully
    position: u64,
    /// LSN of the last entry read successfully (0 before the first)
    last_lsn: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            last_lsn: 0,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at a clean end of file. A torn record, a CRC
    /// mismatch or an LSN that does not increase is reported as
    /// [`ChunkKvError::WalCorruption`]; [`Self::position`] still points at
    /// the end of the last good entry.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let mut header_buf = [0u8; HEADER_SIZE];
        let read = read_full(&mut self.reader, &mut header_buf)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(ChunkKvError::WalCorruption(format!(
                "Truncated header at offset {}: {} of {} bytes",
                self.position, read, HEADER_SIZE
            )));
        }

        let header = Header::parse(&header_buf);
        if header.len > MAX_RECORD_SIZE {
            return Err(ChunkKvError::WalCorruption(format!(
                "Record length {} at offset {} exceeds maximum {}",
                header.len, self.position, MAX_RECORD_SIZE
            )));
        }

        let mut body = vec![0u8; header.len as usize];
        let read = read_full(&mut self.reader, &mut body)?;
        if read < body.len() {
            return Err(ChunkKvError::WalCorruption(format!(
                "Truncated record at offset {}: {} of {} bytes",
                self.position,
                read,
                body.len()
            )));
        }

        if header.lsn <= self.last_lsn {
            return Err(ChunkKvError::WalCorruption(format!(
                "Non-monotonic LSN {} after {}",
                header.lsn, self.last_lsn
            )));
        }

        let entry = WalEntry::decode(header.lsn, header.crc, &body)?;

        self.position += (HEADER_SIZE + body.len()) as u64;
        self.last_lsn = entry.lsn;
        Ok(Some(entry))
    }

    /// Offset just past the last valid entry
    pub fn position(&self) -> u64 {
        self.position
    }

    /// LSN of the last valid entry, 0 if none was read
    pub fn last_lsn(&self) -> u64 {
        self.last_lsn
    }

    /// Iterate over all valid entries
    ///
    /// The iterator yields the first error it meets and then stops.
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the file allows, returning the bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
