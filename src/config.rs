//! Configuration for ImgFS
//!
//! Create-time container parameters and HTTP server settings,
//! with sensible defaults and hard limits.

use std::path::PathBuf;

use crate::error::{ImgFsError, Result};

/// Default number of metadata slots in a new container
pub const DEFAULT_MAX_FILES: u32 = 128;

/// Default thumbnail resolution (width and height)
pub const DEFAULT_THUMB_RES: u16 = 64;

/// Default small resolution (width and height)
pub const DEFAULT_SMALL_RES: u16 = 256;

/// Largest accepted thumbnail dimension
pub const MAX_THUMB_RES: u16 = 128;

/// Largest accepted small dimension
pub const MAX_SMALL_RES: u16 = 512;

/// Parameters for creating a new container
///
/// `max_files` and the two declared resolutions are fixed at create time
/// and immutable for the lifetime of the container file.
#[derive(Debug, Clone)]
pub struct CreateConfig {
    /// Number of metadata slots (capacity of the container)
    pub max_files: u32,

    /// Thumbnail resolution as (width, height)
    pub thumb_res: (u16, u16),

    /// Small resolution as (width, height)
    pub small_res: (u16, u16),
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            thumb_res: (DEFAULT_THUMB_RES, DEFAULT_THUMB_RES),
            small_res: (DEFAULT_SMALL_RES, DEFAULT_SMALL_RES),
        }
    }
}

impl CreateConfig {
    /// Set the slot count
    pub fn max_files(mut self, max_files: u32) -> Self {
        self.max_files = max_files;
        self
    }

    /// Set the thumbnail resolution
    pub fn thumb_res(mut self, width: u16, height: u16) -> Self {
        self.thumb_res = (width, height);
        self
    }

    /// Set the small resolution
    pub fn small_res(mut self, width: u16, height: u16) -> Self {
        self.small_res = (width, height);
        self
    }

    /// Check the configured values against the hard limits
    pub fn validate(&self) -> Result<()> {
        if self.max_files == 0 {
            return Err(ImgFsError::MaxFiles(self.max_files));
        }
        let (tw, th) = self.thumb_res;
        if tw == 0 || th == 0 || tw > MAX_THUMB_RES || th > MAX_THUMB_RES {
            return Err(ImgFsError::Resolutions(format!("thumbnail {tw}x{th}")));
        }
        let (sw, sh) = self.small_res;
        if sw == 0 || sh == 0 || sw > MAX_SMALL_RES || sh > MAX_SMALL_RES {
            return Err(ImgFsError::Resolutions(format!("small {sw}x{sh}")));
        }
        Ok(())
    }
}

/// Settings for the HTTP frontend
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP listen address
    pub listen_addr: String,

    /// Directory the static root file is served from
    pub web_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            web_root: PathBuf::from("."),
        }
    }
}

impl ServerConfig {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    /// Set the directory the static root file is served from
    pub fn web_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.web_root = root.into();
        self
    }
}
