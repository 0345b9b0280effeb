//! Engine Module
//!
//! The shared handle the HTTP workers operate through. One mutex gate
//! serializes every operation against the single container, so the
//! on-disk state after any prefix of operations equals that prefix run
//! sequentially in gate-acquisition order.
//!
//! parking_lot's mutex never poisons, so a worker that panics while
//! holding the gate does not wedge the others.

use std::path::Path;

use parking_lot::Mutex;

use crate::container::{Container, Header, ListMode, Resolution};
use crate::error::Result;

/// Gated, shareable handle over an open container
///
/// All methods take `&self`; callers typically wrap the engine in an
/// `Arc` and hand clones to worker threads. Dropping the engine closes
/// the backing file.
pub struct Engine {
    container: Mutex<Container>,
}

impl Engine {
    /// Open a container read-write and wrap it behind the gate
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = Container::open(path, true)?;
        Ok(Self {
            container: Mutex::new(container),
        })
    }

    /// Snapshot of the current header
    pub fn header(&self) -> Header {
        self.container.lock().header().clone()
    }

    /// List every stored image id as a JSON payload
    pub fn list_json(&self) -> Result<String> {
        let json = self.container.lock().list(ListMode::Json)?;
        // Json mode always yields a payload
        Ok(json.unwrap_or_default())
    }

    /// Insert an image under `img_id`
    pub fn insert(&self, image: &[u8], img_id: &str) -> Result<()> {
        self.container.lock().insert(image, img_id)
    }

    /// Read the payload of `img_id` at `resolution`
    pub fn read(&self, img_id: &str, resolution: Resolution) -> Result<Vec<u8>> {
        self.container.lock().read(img_id, resolution)
    }

    /// Delete the image carrying `img_id`
    pub fn delete(&self, img_id: &str) -> Result<()> {
        self.container.lock().delete(img_id)
    }
}
