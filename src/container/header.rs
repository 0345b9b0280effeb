//! Container header
//!
//! In-memory mirror of the 64-byte header at offset 0, with bit-exact
//! little-endian serialization.
//!
//! ## Layout
//! ```text
//! offset  size  field
//!      0    32  name (NUL-terminated ASCII)
//!     32     4  version (u32)
//!     36     4  nb_files (u32)
//!     40     4  max_files (u32)
//!     44     8  resized_res (u16 x 4: thumb_w, thumb_h, small_w, small_h)
//!     52     4  reserved (u32, zero)
//!     56     8  reserved (u64, zero)
//! ```

use std::fmt;

use crate::config::CreateConfig;
use crate::error::{ImgFsError, Result};

use super::{Resolution, CONTAINER_LABEL, HEADER_SIZE, MAX_NAME};

/// Container header: label, mutation counter, capacity and the declared
/// derived resolutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Container label, at most [`MAX_NAME`] bytes
    pub name: String,

    /// Incremented by every successful insert or delete
    pub version: u32,

    /// Number of valid metadata slots
    pub nb_files: u32,

    /// Table capacity, fixed at create time
    pub max_files: u32,

    /// Declared derived resolutions: thumb_w, thumb_h, small_w, small_h
    pub resized_res: [u16; 4],
}

impl Header {
    /// Build the header of a fresh, empty container
    pub fn new(config: &CreateConfig) -> Self {
        Self {
            name: CONTAINER_LABEL.to_string(),
            version: 0,
            nb_files: 0,
            max_files: config.max_files,
            resized_res: [
                config.thumb_res.0,
                config.thumb_res.1,
                config.small_res.0,
                config.small_res.1,
            ],
        }
    }

    /// Target width for a derived resolution
    ///
    /// `Orig` has no declared target; callers never resize to it.
    pub fn resized_width(&self, resolution: Resolution) -> u16 {
        self.resized_res[2 * resolution.index()]
    }

    /// Target height for a derived resolution
    pub fn resized_height(&self, resolution: Resolution) -> u16 {
        self.resized_res[2 * resolution.index() + 1]
    }

    /// Serialize to the on-disk representation
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        let name = self.name.as_bytes();
        let len = name.len().min(MAX_NAME);
        buf[..len].copy_from_slice(&name[..len]);

        buf[32..36].copy_from_slice(&self.version.to_le_bytes());
        buf[36..40].copy_from_slice(&self.nb_files.to_le_bytes());
        buf[40..44].copy_from_slice(&self.max_files.to_le_bytes());
        for (i, res) in self.resized_res.iter().enumerate() {
            let at = 44 + 2 * i;
            buf[at..at + 2].copy_from_slice(&res.to_le_bytes());
        }
        // bytes 52..64 stay zero (reserved)

        buf
    }

    /// Deserialize from the on-disk representation
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(ImgFsError::Runtime(format!(
                "truncated header: expected {HEADER_SIZE} bytes, got {}",
                buf.len()
            )));
        }

        let name_end = buf[..32].iter().position(|&b| b == 0).unwrap_or(MAX_NAME);
        let name = String::from_utf8_lossy(&buf[..name_end]).into_owned();

        let mut resized_res = [0u16; 4];
        for (i, res) in resized_res.iter_mut().enumerate() {
            let at = 44 + 2 * i;
            *res = u16::from_le_bytes([buf[at], buf[at + 1]]);
        }

        Ok(Self {
            name,
            version: u32::from_le_bytes([buf[32], buf[33], buf[34], buf[35]]),
            nb_files: u32::from_le_bytes([buf[36], buf[37], buf[38], buf[39]]),
            max_files: u32::from_le_bytes([buf[40], buf[41], buf[42], buf[43]]),
            resized_res,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*****************************************")?;
        writeln!(f, "**********IMGFS HEADER START*************")?;
        writeln!(f, "TYPE: {}", self.name)?;
        writeln!(f, "VERSION: {}", self.version)?;
        writeln!(
            f,
            "IMAGE COUNT: {}\t\tMAX IMAGES: {}",
            self.nb_files, self.max_files
        )?;
        writeln!(
            f,
            "THUMBNAIL: {} x {}\tSMALL: {} x {}",
            self.resized_res[0], self.resized_res[1], self.resized_res[2], self.resized_res[3]
        )?;
        writeln!(f, "***********IMGFS HEADER END**************")?;
        write!(f, "*****************************************")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            name: CONTAINER_LABEL.to_string(),
            version: 7,
            nb_files: 3,
            max_files: 128,
            resized_res: [64, 64, 256, 256],
        }
    }

    #[test]
    fn encode_is_header_size() {
        assert_eq!(sample_header().encode().len(), HEADER_SIZE);
    }

    #[test]
    fn field_offsets_are_pinned() {
        let bytes = sample_header().encode();

        assert_eq!(&bytes[..15], CONTAINER_LABEL.as_bytes());
        assert_eq!(bytes[15], 0); // NUL terminated
        assert_eq!(u32::from_le_bytes(bytes[32..36].try_into().unwrap()), 7);
        assert_eq!(u32::from_le_bytes(bytes[36..40].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 128);
        assert_eq!(u16::from_le_bytes(bytes[44..46].try_into().unwrap()), 64);
        assert_eq!(u16::from_le_bytes(bytes[50..52].try_into().unwrap()), 256);
        assert!(bytes[52..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_round_trips() {
        let header = sample_header();
        let decoded = Header::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        assert!(Header::decode(&[0u8; HEADER_SIZE - 1]).is_err());
    }

    #[test]
    fn resized_targets_index_by_resolution() {
        let header = sample_header();
        assert_eq!(header.resized_width(Resolution::Thumb), 64);
        assert_eq!(header.resized_height(Resolution::Thumb), 64);
        assert_eq!(header.resized_width(Resolution::Small), 256);
    }

    #[test]
    fn overlong_name_is_truncated() {
        let mut header = sample_header();
        header.name = "x".repeat(80);
        let decoded = Header::decode(&header.encode()).unwrap();
        assert_eq!(decoded.name.len(), MAX_NAME);
    }
}
