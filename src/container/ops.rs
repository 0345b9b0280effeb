//! Container operations
//!
//! The four engine-facing operations on an open container: `list`,
//! `insert`, `read` and `delete`. Each one runs to completion on the
//! calling thread; cross-thread exclusion is the engine's concern.

use std::io::Cursor;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{ImgFsError, Result};

use super::dedup::name_and_content_dedup;
use super::slot::{EMPTY, NON_EMPTY};
use super::{Container, Resolution};

/// Output mode for [`Container::list`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Print the header and every valid slot to stdout
    Stdout,
    /// Return a JSON object with the ids of every valid slot
    Json,
}

#[derive(Serialize)]
struct Listing<'a> {
    #[serde(rename = "Images")]
    images: Vec<&'a str>,
}

impl Container {
    /// List the container contents.
    ///
    /// Returns the JSON string in [`ListMode::Json`], `None` otherwise.
    /// The JSON payload is `{"Images":[...]}` with ids in slot order.
    pub fn list(&self, mode: ListMode) -> Result<Option<String>> {
        match mode {
            ListMode::Stdout => {
                println!("{}", self.header);
                if self.header.nb_files == 0 {
                    println!("<< empty imgFS >>");
                } else {
                    for slot in self.slots.iter().filter(|slot| slot.is_valid()) {
                        println!("{slot}");
                    }
                }
                Ok(None)
            }
            ListMode::Json => {
                let listing = Listing {
                    images: self
                        .slots
                        .iter()
                        .filter(|slot| slot.is_valid())
                        .map(|slot| slot.img_id.as_str())
                        .collect(),
                };
                let json = serde_json::to_string(&listing)
                    .map_err(|e| ImgFsError::Runtime(format!("json: {e}")))?;
                Ok(Some(json))
            }
        }
    }

    /// Insert an image under `img_id`.
    ///
    /// The identifier is truncated at the slot capacity. Content equal to
    /// an already-stored image (by SHA-256) shares its payload bytes
    /// instead of being appended again. Disk writes happen in an order
    /// that keeps a crashed insert invisible: the claimed slot is zeroed
    /// on disk before any payload byte lands, the populated slot is
    /// written next, and the header goes last.
    pub fn insert(&mut self, image: &[u8], img_id: &str) -> Result<()> {
        if image.is_empty() {
            return Err(ImgFsError::InvalidArgument("empty image buffer".to_string()));
        }
        if self.header.nb_files >= self.header.max_files {
            return Err(ImgFsError::Full);
        }

        // nb_files < max_files guarantees a free slot exists
        let index = self.find_free().ok_or(ImgFsError::Full)?;

        let slot = &mut self.slots[index];
        slot.zero();
        slot.sha.copy_from_slice(&Sha256::digest(image));
        slot.set_img_id(img_id);
        slot.is_valid = NON_EMPTY;
        self.header.nb_files += 1;

        match probe_dimensions(image) {
            Ok((width, height)) => self.slots[index].orig_res = [width, height],
            Err(err) => {
                self.rollback_insert(index);
                return Err(err);
            }
        }

        if let Err(err) = name_and_content_dedup(&mut self.slots, index) {
            self.rollback_insert(index);
            return Err(err);
        }

        if let Err(err) = self.persist_insert(index, image) {
            self.rollback_insert(index);
            return Err(err);
        }

        tracing::debug!(
            "inserted image '{}' ({} bytes) into slot {}",
            self.slots[index].img_id,
            image.len(),
            index
        );

        Ok(())
    }

    /// Read the payload of `img_id` at `resolution`.
    ///
    /// A missing derived resolution is materialized first (which appends
    /// to the file but does not bump the header version).
    pub fn read(&mut self, img_id: &str, resolution: Resolution) -> Result<Vec<u8>> {
        let index = self
            .find_by_id(img_id)
            .ok_or_else(|| ImgFsError::ImageNotFound(img_id.to_string()))?;

        if resolution != Resolution::Orig && self.slots[index].size_of(resolution) == 0 {
            self.lazily_resize(resolution, index)?;
        }

        let offset = self.slots[index].offset_of(resolution);
        let size = self.slots[index].size_of(resolution);
        self.read_payload(offset, size)
    }

    /// Delete the image carrying `img_id`.
    ///
    /// The slot becomes a tombstone; payload bytes stay in the file since
    /// deduplicated slots may still reference them.
    pub fn delete(&mut self, img_id: &str) -> Result<()> {
        let index = self
            .find_by_id(img_id)
            .ok_or_else(|| ImgFsError::ImageNotFound(img_id.to_string()))?;

        self.slots[index].is_valid = EMPTY;
        if let Err(err) = self.write_slot(index) {
            self.slots[index].is_valid = NON_EMPTY;
            return Err(err);
        }

        self.header.nb_files -= 1;
        self.header.version += 1;
        self.write_header()?;

        tracing::debug!("deleted image '{img_id}' from slot {index}");

        Ok(())
    }

    // =========================================================================
    // Insert persistence
    // =========================================================================

    /// Write an insert to disk: zeroed slot, payload, populated slot, header.
    fn persist_insert(&mut self, index: usize, image: &[u8]) -> Result<()> {
        self.write_zeroed_slot(index)?;

        if self.slots[index].offset_of(Resolution::Orig) == 0 {
            let offset = self.append_payload(image)?;
            let slot = &mut self.slots[index];
            slot.offset[Resolution::Orig.index()] = offset;
            slot.size[Resolution::Orig.index()] = image.len() as u32;
        }

        self.write_slot(index)?;
        self.header.version += 1;
        self.write_header()
    }

    /// Undo an in-memory slot claim after a failed insert step
    fn rollback_insert(&mut self, index: usize) {
        self.slots[index].zero();
        self.header.nb_files -= 1;
    }
}

/// Decode just enough of the image to learn its width and height
fn probe_dimensions(image: &[u8]) -> Result<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(image))
        .with_guessed_format()
        .map_err(|e| ImgFsError::ImageLib(format!("probe: {e}")))?;
    reader
        .into_dimensions()
        .map_err(|e| ImgFsError::ImageLib(format!("probe: {e}")))
}
