//! Lazy resolution derivation
//!
//! Derived resolutions are not produced at insert time. The first read
//! that asks for one decodes the original JPEG, downscales it into the
//! declared bounding box with the aspect ratio preserved, re-encodes it
//! and appends the result to the container, so every later read is a
//! plain positioned read.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::{ImgFsError, Result};

use super::{Container, Resolution};

impl Container {
    /// Materialize `resolution` for the image in slot `index`.
    ///
    /// A no-op for the original resolution or when the derived copy
    /// already exists. The header version is untouched: this is cache
    /// population, not a logical mutation.
    pub fn lazily_resize(&mut self, resolution: Resolution, index: usize) -> Result<()> {
        let slot = self
            .slots
            .get(index)
            .filter(|slot| slot.is_valid())
            .ok_or_else(|| ImgFsError::InvalidImgId(format!("slot {index}")))?;

        if resolution == Resolution::Orig || slot.size_of(resolution) != 0 {
            return Ok(());
        }

        let orig_offset = slot.offset_of(Resolution::Orig);
        let orig_size = slot.size_of(Resolution::Orig);
        let original = self.read_payload(orig_offset, orig_size)?;

        let decoded = image::load_from_memory(&original)
            .map_err(|e| ImgFsError::ImageLib(format!("decode: {e}")))?;

        let width = u32::from(self.header.resized_width(resolution));
        let height = u32::from(self.header.resized_height(resolution));
        let resized = decoded.thumbnail(width, height);

        let mut encoded = Cursor::new(Vec::new());
        resized
            .write_to(&mut encoded, ImageFormat::Jpeg)
            .map_err(|e| ImgFsError::ImageLib(format!("encode: {e}")))?;
        let encoded = encoded.into_inner();

        let offset = self.append_payload(&encoded)?;
        let slot = &mut self.slots[index];
        slot.offset[resolution.index()] = offset;
        slot.size[resolution.index()] = encoded.len() as u32;
        self.write_slot(index)?;

        tracing::debug!(
            "materialized {} ({} bytes) for image '{}'",
            resolution,
            encoded.len(),
            self.slots[index].img_id
        );

        Ok(())
    }
}
