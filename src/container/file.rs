//! Container file I/O
//!
//! Opening, creating and closing the backing file, plus the positioned
//! reads and writes every operation is built from. Writes land at fixed
//! places only: the header at offset 0, slot `i` at
//! `HEADER_SIZE + i * SLOT_SIZE`, and payload appends at end-of-file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::CreateConfig;
use crate::error::{ImgFsError, Result};

use super::{Header, Slot, HEADER_SIZE, SLOT_SIZE};

/// An open ImgFS container: the backing file plus the in-memory mirror of
/// its header and metadata table.
///
/// The table is owned and contiguous; payload bytes are only ever read
/// into per-call buffers. Dropping the container closes the file.
#[derive(Debug)]
pub struct Container {
    path: PathBuf,
    file: File,
    writable: bool,
    pub(crate) header: Header,
    pub(crate) slots: Vec<Slot>,
}

impl Container {
    /// Create a new, empty container file
    ///
    /// An existing file at `path` is overwritten without warning. The
    /// header carries the standard label, `version = 0`, `nb_files = 0`
    /// and the capacity/resolutions from `config`; the metadata table is
    /// written out fully zeroed.
    pub fn create(path: impl AsRef<Path>, config: &CreateConfig) -> Result<Self> {
        config.validate()?;

        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let header = Header::new(config);
        let slots = vec![Slot::default(); header.max_files as usize];

        let mut container = Self {
            path,
            file,
            writable: true,
            header,
            slots,
        };

        container.write_header()?;
        for i in 0..container.slots.len() {
            container.write_slot(i)?;
        }

        tracing::debug!(
            "created container {} with {} slot(s)",
            container.path.display(),
            container.header.max_files
        );

        Ok(container)
    }

    /// Open an existing container
    ///
    /// Reads the header, validates it, then loads all `max_files`
    /// metadata slots into memory. With `writable = false` every
    /// mutating operation is rejected.
    pub fn open(path: impl AsRef<Path>, writable: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(writable).open(&path)?;

        let mut header_buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)?;
        let header = Header::decode(&header_buf)?;

        if header.max_files == 0 || header.nb_files > header.max_files {
            return Err(ImgFsError::Runtime(format!(
                "corrupted container header in {} (nb_files {}, max_files {})",
                path.display(),
                header.nb_files,
                header.max_files
            )));
        }

        let mut slots = Vec::with_capacity(header.max_files as usize);
        let mut slot_buf = [0u8; SLOT_SIZE];
        for _ in 0..header.max_files {
            file.read_exact(&mut slot_buf)?;
            slots.push(Slot::decode(&slot_buf)?);
        }

        tracing::debug!(
            "opened container {} ({}/{} images, version {})",
            path.display(),
            header.nb_files,
            header.max_files,
            header.version
        );

        Ok(Self {
            path,
            file,
            writable,
            header,
            slots,
        })
    }

    /// The container header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The in-memory metadata table
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First file offset past the metadata table
    pub fn table_end(&self) -> u64 {
        HEADER_SIZE as u64 + self.header.max_files as u64 * SLOT_SIZE as u64
    }

    /// Current length of the backing file
    pub fn file_len(&mut self) -> Result<u64> {
        Ok(self.file.seek(SeekFrom::End(0))?)
    }

    // =========================================================================
    // Positioned writes
    // =========================================================================

    /// Rewrite the header at offset 0
    pub(crate) fn write_header(&mut self) -> Result<()> {
        self.require_writable()?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.header.encode())?;
        Ok(())
    }

    /// Rewrite slot `index` at its fixed table position
    pub(crate) fn write_slot(&mut self, index: usize) -> Result<()> {
        self.require_writable()?;
        let offset = HEADER_SIZE as u64 + index as u64 * SLOT_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&self.slots[index].encode())?;
        Ok(())
    }

    /// Overwrite slot `index` on disk with zeroes, leaving memory untouched
    pub(crate) fn write_zeroed_slot(&mut self, index: usize) -> Result<()> {
        self.require_writable()?;
        let offset = HEADER_SIZE as u64 + index as u64 * SLOT_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&[0u8; SLOT_SIZE])?;
        Ok(())
    }

    /// Append a payload blob at end-of-file, returning its offset
    pub(crate) fn append_payload(&mut self, payload: &[u8]) -> Result<u64> {
        self.require_writable()?;
        let offset = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(payload)?;
        Ok(offset)
    }

    /// Read `size` payload bytes starting at `offset`
    pub(crate) fn read_payload(&mut self, offset: u64, size: u32) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; size as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn require_writable(&self) -> Result<()> {
        if self.writable {
            Ok(())
        } else {
            Err(ImgFsError::InvalidArgument(
                "container is opened read-only".to_string(),
            ))
        }
    }

    // =========================================================================
    // Table lookups
    // =========================================================================

    /// Index of the valid slot carrying `img_id`, if any
    pub(crate) fn find_by_id(&self, img_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_valid() && slot.img_id == img_id)
    }

    /// Index of the first empty slot, if any
    pub(crate) fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.is_valid())
    }
}
