//! Container Module
//!
//! One ImgFS instance lives in a single regular file with the layout:
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ Header (64 bytes, offset 0)                │
//! │ ┌───────┬─────────┬──────────┬───────────┐ │
//! │ │ name  │ version │ nb_files │ max_files │ │
//! │ │ (32)  │  (u32)  │  (u32)   │  (u32)    │ │
//! │ ├───────┴─────────┴──────────┴───────────┤ │
//! │ │ resized_res (u16 x 4)  reserved (12)   │ │
//! │ └────────────────────────────────────────┘ │
//! ├────────────────────────────────────────────┤
//! │ Metadata table (max_files x 216 bytes)     │
//! │ ┌────────┬─────┬──────────┬──────────────┐ │
//! │ │ img_id │ SHA │ orig_res │ size/offset  │ │
//! │ │ (128)  │(32) │ (u32 x2) │ per res      │ │
//! │ └────────┴─────┴──────────┴──────────────┘ │
//! ├────────────────────────────────────────────┤
//! │ Payload area (JPEG blobs, append-only)     │
//! └────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Offsets stored in slots are absolute
//! file offsets into the payload area. The file only grows: deleting an
//! image tombstones its slot and leaves the payload bytes in place, since
//! deduplicated slots may still reference them.

mod header;
mod slot;
mod file;
mod ops;
mod dedup;
mod resize;

pub use header::Header;
pub use slot::{Slot, EMPTY, NON_EMPTY};
pub use file::Container;
pub use ops::ListMode;

use std::fmt;
use std::str::FromStr;

use crate::error::ImgFsError;

/// Container label written into every new header
pub const CONTAINER_LABEL: &str = "EPFL ImgFS 2024";

/// Capacity of the header name field, excluding the NUL terminator
pub const MAX_NAME: usize = 31;

/// Capacity of an image identifier, excluding the NUL terminator
pub const MAX_IMG_ID: usize = 127;

/// Number of stored resolutions per image
pub const NB_RES: usize = 3;

/// Serialized header size in bytes
pub const HEADER_SIZE: usize = 64;

/// Serialized metadata slot size in bytes
pub const SLOT_SIZE: usize = 216;

/// One of the three per-image resolutions
///
/// The discriminants index the `size`/`offset` arrays of a slot and,
/// doubled, the `resized_res` array of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Thumb = 0,
    Small = 1,
    Orig = 2,
}

impl Resolution {
    /// All resolutions in slot-array order
    pub const ALL: [Resolution; NB_RES] = [Resolution::Thumb, Resolution::Small, Resolution::Orig];

    /// Index into a slot's `size`/`offset` arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// Filename suffix used when exporting an image to disk
    pub fn suffix(self) -> &'static str {
        match self {
            Resolution::Thumb => "_thumb",
            Resolution::Small => "_small",
            Resolution::Orig => "_orig",
        }
    }
}

impl FromStr for Resolution {
    type Err = ImgFsError;

    /// Case-sensitive mapping of the textual resolution names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" | "thumbnail" => Ok(Resolution::Thumb),
            "small" => Ok(Resolution::Small),
            "orig" | "original" => Ok(Resolution::Orig),
            other => Err(ImgFsError::Resolutions(other.to_string())),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolution::Thumb => "thumb",
            Resolution::Small => "small",
            Resolution::Orig => "orig",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_names_parse() {
        assert_eq!("thumb".parse::<Resolution>().unwrap(), Resolution::Thumb);
        assert_eq!("thumbnail".parse::<Resolution>().unwrap(), Resolution::Thumb);
        assert_eq!("small".parse::<Resolution>().unwrap(), Resolution::Small);
        assert_eq!("orig".parse::<Resolution>().unwrap(), Resolution::Orig);
        assert_eq!("original".parse::<Resolution>().unwrap(), Resolution::Orig);
    }

    #[test]
    fn resolution_names_are_case_sensitive() {
        assert!("Thumb".parse::<Resolution>().is_err());
        assert!("SMALL".parse::<Resolution>().is_err());
        assert!("medium".parse::<Resolution>().is_err());
        assert!("".parse::<Resolution>().is_err());
    }

    #[test]
    fn resolution_indexes_match_array_order() {
        assert_eq!(Resolution::Thumb.index(), 0);
        assert_eq!(Resolution::Small.index(), 1);
        assert_eq!(Resolution::Orig.index(), 2);
    }
}
