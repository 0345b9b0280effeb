//! # ImgFS
//!
//! A single-file photo store in the spirit of Facebook Haystack:
//! - Many small JPEGs packed into one append-mostly container file
//! - Fixed-size metadata table at the head of the file
//! - Content deduplication by SHA-256 of the original payload
//! - Derived resolutions (thumbnail, small) generated on first read
//!   and cached in the same file
//! - HTTP/1.1 frontend with one worker thread per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │             (accept loop + detached workers)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │                 (single mutex gate)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Dedup    │          │   Resize    │
//!   │  (SHA-256)  │          │   (lazy)    │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌─────────────┐
//!              │  Container  │
//!              │ (one file)  │
//!              └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod container;
pub mod engine;
pub mod http;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ImgFsError, Result};
pub use config::{CreateConfig, ServerConfig};
pub use container::{Container, ListMode, Resolution};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the imgfs crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
