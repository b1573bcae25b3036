//! Parallel byte-range downloader.
//!
//! A resource is probed for its length, split into contiguous inclusive byte
//! ranges, fetched concurrently into memory and merged in range order into a
//! single output file. See [`download::Downloader`] for the entry point.

pub mod config;
pub mod download;
pub mod humanize;
pub mod observability;
pub mod transport;
