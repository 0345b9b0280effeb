//! Metadata slot
//!
//! In-memory mirror of one 216-byte metadata record, with bit-exact
//! little-endian serialization.
//!
//! ## Layout
//! ```text
//! offset  size  field
//!      0   128  img_id (NUL-terminated ASCII)
//!    128    32  sha (SHA-256 of the original payload)
//!    160     8  orig_res (u32 x 2: width, height)
//!    168    12  size (u32 x 3: thumb, small, orig)
//!    180     4  alignment padding (zero)
//!    184    24  offset (u64 x 3: thumb, small, orig)
//!    208     2  is_valid (u16: 0 empty, 1 valid)
//!    210     6  reserved / trailing padding (zero)
//! ```

use std::fmt;

use crate::error::{ImgFsError, Result};

use super::{Resolution, MAX_IMG_ID, NB_RES, SLOT_SIZE};

/// `is_valid` value of a free or tombstoned slot
pub const EMPTY: u16 = 0;

/// `is_valid` value of a populated slot
pub const NON_EMPTY: u16 = 1;

/// One metadata record of the container table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slot {
    /// Image identifier, at most [`MAX_IMG_ID`] bytes, unique among valid slots
    pub img_id: String,

    /// SHA-256 digest of the original payload bytes
    pub sha: [u8; 32],

    /// Original width and height in pixels
    pub orig_res: [u32; 2],

    /// Payload byte length per resolution; 0 means not materialized
    pub size: [u32; NB_RES],

    /// Absolute file offset per resolution
    pub offset: [u64; NB_RES],

    /// [`EMPTY`] or [`NON_EMPTY`]
    pub is_valid: u16,
}

impl Slot {
    /// Whether this slot holds a live image
    pub fn is_valid(&self) -> bool {
        self.is_valid == NON_EMPTY
    }

    /// Reset every field to the empty state
    pub fn zero(&mut self) {
        *self = Slot::default();
    }

    /// Set the identifier, truncated at [`MAX_IMG_ID`] bytes
    pub fn set_img_id(&mut self, img_id: &str) {
        let mut id = img_id.to_string();
        if id.len() > MAX_IMG_ID {
            // truncate on a char boundary at or below the byte capacity
            let mut cut = MAX_IMG_ID;
            while !id.is_char_boundary(cut) {
                cut -= 1;
            }
            id.truncate(cut);
        }
        self.img_id = id;
    }

    /// Payload length of a resolution, 0 when absent
    pub fn size_of(&self, resolution: Resolution) -> u32 {
        self.size[resolution.index()]
    }

    /// Payload offset of a resolution
    pub fn offset_of(&self, resolution: Resolution) -> u64 {
        self.offset[resolution.index()]
    }

    /// SHA-256 digest as lowercase hex
    pub fn sha_hex(&self) -> String {
        hex::encode(self.sha)
    }

    /// Serialize to the on-disk representation
    pub fn encode(&self) -> [u8; SLOT_SIZE] {
        let mut buf = [0u8; SLOT_SIZE];

        let id = self.img_id.as_bytes();
        let len = id.len().min(MAX_IMG_ID);
        buf[..len].copy_from_slice(&id[..len]);

        buf[128..160].copy_from_slice(&self.sha);
        buf[160..164].copy_from_slice(&self.orig_res[0].to_le_bytes());
        buf[164..168].copy_from_slice(&self.orig_res[1].to_le_bytes());
        for (i, size) in self.size.iter().enumerate() {
            let at = 168 + 4 * i;
            buf[at..at + 4].copy_from_slice(&size.to_le_bytes());
        }
        // bytes 180..184 stay zero (alignment padding)
        for (i, offset) in self.offset.iter().enumerate() {
            let at = 184 + 8 * i;
            buf[at..at + 8].copy_from_slice(&offset.to_le_bytes());
        }
        buf[208..210].copy_from_slice(&self.is_valid.to_le_bytes());
        // bytes 210..216 stay zero (reserved)

        buf
    }

    /// Deserialize from the on-disk representation
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < SLOT_SIZE {
            return Err(ImgFsError::Runtime(format!(
                "truncated metadata slot: expected {SLOT_SIZE} bytes, got {}",
                buf.len()
            )));
        }

        let id_end = buf[..128].iter().position(|&b| b == 0).unwrap_or(MAX_IMG_ID);
        let img_id = String::from_utf8_lossy(&buf[..id_end]).into_owned();

        let mut sha = [0u8; 32];
        sha.copy_from_slice(&buf[128..160]);

        let mut size = [0u32; NB_RES];
        for (i, s) in size.iter_mut().enumerate() {
            let at = 168 + 4 * i;
            *s = u32::from_le_bytes(buf[at..at + 4].try_into().unwrap());
        }

        let mut offset = [0u64; NB_RES];
        for (i, o) in offset.iter_mut().enumerate() {
            let at = 184 + 8 * i;
            *o = u64::from_le_bytes(buf[at..at + 8].try_into().unwrap());
        }

        Ok(Self {
            img_id,
            sha,
            orig_res: [
                u32::from_le_bytes(buf[160..164].try_into().unwrap()),
                u32::from_le_bytes(buf[164..168].try_into().unwrap()),
            ],
            size,
            offset,
            is_valid: u16::from_le_bytes([buf[208], buf[209]]),
        })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IMAGE ID: {}", self.img_id)?;
        writeln!(f, "SHA: {}", self.sha_hex())?;
        writeln!(f, "VALID: {}", self.is_valid)?;
        writeln!(f, "OFFSET ORIG. : {}", self.offset[Resolution::Orig.index()])?;
        writeln!(f, "SIZE ORIG. : {}", self.size[Resolution::Orig.index()])?;
        writeln!(f, "OFFSET THUMB.: {}", self.offset[Resolution::Thumb.index()])?;
        writeln!(f, "SIZE THUMB.: {}", self.size[Resolution::Thumb.index()])?;
        writeln!(f, "OFFSET SMALL : {}", self.offset[Resolution::Small.index()])?;
        writeln!(f, "SIZE SMALL : {}", self.size[Resolution::Small.index()])?;
        write!(f, "ORIGINAL: {} x {}", self.orig_res[0], self.orig_res[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slot() -> Slot {
        let mut slot = Slot::default();
        slot.set_img_id("cat1");
        slot.sha = [0xab; 32];
        slot.orig_res = [1200, 800];
        slot.size = [0, 0, 72876];
        slot.offset = [0, 0, 27712];
        slot.is_valid = NON_EMPTY;
        slot
    }

    #[test]
    fn encode_is_slot_size() {
        assert_eq!(sample_slot().encode().len(), SLOT_SIZE);
    }

    #[test]
    fn field_offsets_are_pinned() {
        let bytes = sample_slot().encode();

        assert_eq!(&bytes[..4], b"cat1");
        assert_eq!(bytes[4], 0);
        assert!(bytes[128..160].iter().all(|&b| b == 0xab));
        assert_eq!(u32::from_le_bytes(bytes[160..164].try_into().unwrap()), 1200);
        assert_eq!(u32::from_le_bytes(bytes[164..168].try_into().unwrap()), 800);
        assert_eq!(u32::from_le_bytes(bytes[176..180].try_into().unwrap()), 72876);
        assert!(bytes[180..184].iter().all(|&b| b == 0)); // alignment hole
        assert_eq!(u64::from_le_bytes(bytes[200..208].try_into().unwrap()), 27712);
        assert_eq!(u16::from_le_bytes(bytes[208..210].try_into().unwrap()), NON_EMPTY);
        assert!(bytes[210..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_round_trips() {
        let slot = sample_slot();
        let decoded = Slot::decode(&slot.encode()).unwrap();
        assert_eq!(decoded, slot);
    }

    #[test]
    fn zeroed_slot_is_empty() {
        let mut slot = sample_slot();
        slot.zero();
        assert!(!slot.is_valid());
        assert!(slot.encode().iter().all(|&b| b == 0));
    }

    #[test]
    fn zeroing_is_idempotent() {
        let mut slot = sample_slot();
        slot.zero();
        let once = slot.clone();
        slot.zero();
        assert_eq!(slot, once);
    }

    #[test]
    fn overlong_img_id_is_truncated() {
        let mut slot = Slot::default();
        slot.set_img_id(&"i".repeat(300));
        assert_eq!(slot.img_id.len(), MAX_IMG_ID);

        let decoded = Slot::decode(&slot.encode()).unwrap();
        assert_eq!(decoded.img_id.len(), MAX_IMG_ID);
    }
}
