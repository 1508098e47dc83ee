//! `.torrent` decoding and torrent-to-magnet conversion
//!
//! - [`bencode`] - Bencode decoder with value spans
//! - [`metainfo`] - Tracker list, info hash and magnet link

pub mod bencode;
pub mod metainfo;

pub use metainfo::Metainfo;

use crate::error::TorrentError;
use std::path::Path;

/// Convert a torrent file into a magnet link carrying all of its trackers
pub fn torrent_to_magnet(path: impl AsRef<Path>) -> Result<String, TorrentError> {
    let meta = Metainfo::from_file(path)?;
    Ok(meta.magnet_with_trackers())
}
