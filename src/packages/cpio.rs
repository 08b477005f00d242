// src/packages/cpio.rs

//! Reader for the CPIO "newc" stream inside RPM payloads

use std::io::{self, Read};

/// newc header size
const HEADER_SIZE: usize = 110;
const MAGIC_NEWC: &[u8] = b"070701";
const MAGIC_CRC: &[u8] = b"070702";
const TRAILER: &str = "TRAILER!!!";

/// Metadata of one archive member
#[derive(Debug, Clone)]
pub struct CpioEntry {
    /// Member name as stored, usually `./usr/bin/foo`
    pub name: String,
    pub size: u64,
    pub mode: u32,
    pub ino: u32,
    /// Hard links sharing `ino`; only the last of them carries the data
    pub nlink: u32,
    /// Content was discarded unread because `size` exceeds the size limit
    pub oversized: bool,
}

impl CpioEntry {
    /// A hard link whose data arrives with a later member
    pub fn is_deferred_link(&self) -> bool {
        self.nlink > 1 && self.size == 0
    }
}

/// A streaming reader over a newc archive
pub struct CpioReader<R: Read> {
    reader: R,
    size_limit: Option<u64>,
}

impl<R: Read> CpioReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            size_limit: None,
        }
    }

    /// Discard, without buffering, the content of members larger than `limit`
    pub fn with_size_limit(mut self, limit: u64) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Read the next member and its content
    ///
    /// Returns `Ok(None)` at the trailer or at a clean end of stream.
    /// Oversized members come back flagged with empty content.
    pub fn next_entry(&mut self) -> io::Result<Option<(CpioEntry, Vec<u8>)>> {
        let mut header = [0u8; HEADER_SIZE];
        match self.reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }

        let magic = &header[0..6];
        if magic != MAGIC_NEWC && magic != MAGIC_CRC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid CPIO magic: {:?}", String::from_utf8_lossy(magic)),
            ));
        }

        let ino = hex_field(&header, 6)?;
        let mode = hex_field(&header, 14)?;
        let nlink = hex_field(&header, 38)?;
        let size = u64::from(hex_field(&header, 54)?);
        let namesize = hex_field(&header, 94)? as usize;

        let mut name_buf = vec![0u8; namesize];
        self.reader.read_exact(&mut name_buf)?;
        if name_buf.last() == Some(&0) {
            name_buf.pop();
        }
        let name = String::from_utf8_lossy(&name_buf).into_owned();

        if name == TRAILER {
            return Ok(None);
        }

        self.skip_padding(HEADER_SIZE + namesize)?;

        let oversized = self.size_limit.is_some_and(|limit| size > limit);
        let content = if oversized {
            let skipped = io::copy(&mut (&mut self.reader).take(size), &mut io::sink())?;
            if skipped < size {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            Vec::new()
        } else {
            let mut content = vec![0u8; size as usize];
            self.reader.read_exact(&mut content)?;
            content
        };
        self.skip_padding((size % 4) as usize)?;

        let entry = CpioEntry {
            name,
            size,
            mode,
            ino,
            nlink,
            oversized,
        };
        Ok(Some((entry, content)))
    }

    /// newc aligns headers and data to 4 bytes
    fn skip_padding(&mut self, consumed: usize) -> io::Result<()> {
        let pad = (4 - consumed % 4) % 4;
        if pad > 0 {
            let mut skip = [0u8; 3];
            self.reader.read_exact(&mut skip[..pad])?;
        }
        Ok(())
    }
}

fn hex_field(header: &[u8; HEADER_SIZE], offset: usize) -> io::Result<u32> {
    let text = std::str::from_utf8(&header[offset..offset + 8])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    u32::from_str_radix(text, 16).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
