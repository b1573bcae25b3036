//! Segmented download core
//!
//! The pipeline is probe -> plan -> concurrent fetch -> merge, driven by
//! [`Downloader`]. Each stage lives in its own module and can be used on its
//! own.

mod coordinator;
mod error;
mod fetch;
mod merge;
mod naming;
mod plan;
mod probe;

pub use coordinator::{DownloadOptions, DownloadReport, Downloader};
pub use error::{DownloadError, Result, Stage};
pub use fetch::{Chunk, fetch_segment};
pub use merge::merge;
pub use naming::filename_from_url;
pub use plan::{Segment, plan};
pub use probe::{Resource, probe};
