//! Torrent metainfo: tracker list, name, info hash and magnet link

use super::bencode::{self, SpannedEntry, Value};
use crate::error::TorrentError;
use sha1::{Digest, Sha1};
use std::path::Path;

/// The parts of a `.torrent` file needed to build a magnet link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metainfo {
    /// Lowercase hex SHA-1 of the bencoded `info` dictionary
    pub info_hash: String,
    /// `info.name`, if present
    pub name: Option<String>,
    /// Top-level `announce` URL
    pub announce: Option<String>,
    /// `announce-list` tiers, in file order
    pub announce_list: Vec<Vec<String>>,
}

impl Metainfo {
    /// Decode a torrent file from memory
    pub fn from_bytes(data: &[u8]) -> Result<Self, TorrentError> {
        let entries = bencode::parse_dict_spanned(data)?;

        let info = lookup(&entries, b"info").ok_or(TorrentError::MissingKey("info"))?;
        if !matches!(info.value, Value::Dict(_)) {
            return Err(TorrentError::MissingKey("info"));
        }
        let info_hash = format!("{:x}", Sha1::digest(&data[info.span.clone()]));
        let name = info.value.get(b"name").and_then(Value::as_str_lossy);

        let announce = lookup(&entries, b"announce").and_then(|e| e.value.as_str_lossy());

        let announce_list = match lookup(&entries, b"announce-list") {
            None => Vec::new(),
            Some(entry) => {
                let tiers = entry
                    .value
                    .as_list()
                    .ok_or(TorrentError::MissingKey("announce-list"))?;
                let mut out = Vec::with_capacity(tiers.len());
                for tier in tiers {
                    let urls = tier
                        .as_list()
                        .ok_or(TorrentError::MissingKey("announce-list"))?
                        .iter()
                        .filter_map(Value::as_str_lossy)
                        .collect::<Vec<_>>();
                    out.push(urls);
                }
                out
            }
        };

        Ok(Self {
            info_hash,
            name,
            announce,
            announce_list,
        })
    }

    /// Read and decode a torrent file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TorrentError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| TorrentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data)
    }

    /// Every tracker URL: announce-list tiers first, then `announce`, without repeats
    pub fn announce_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        let candidates = self
            .announce_list
            .iter()
            .flatten()
            .chain(self.announce.iter());
        for url in candidates {
            if !url.is_empty() && !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }

    /// Base magnet link: info hash plus display name
    pub fn magnet_link(&self) -> String {
        let mut link = format!("magnet:?xt=urn:btih:{}", self.info_hash);
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            link.push_str("&dn=");
            link.push_str(&urlencoding::encode(name));
        }
        link
    }

    /// Magnet link with every tracker appended as a URL-encoded `tr` parameter
    pub fn magnet_with_trackers(&self) -> String {
        let mut link = self.magnet_link();
        for url in self.announce_urls() {
            link.push_str("&tr=");
            link.push_str(&urlencoding::encode(&url));
        }
        link
    }
}

fn lookup<'a>(entries: &'a [SpannedEntry], key: &[u8]) -> Option<&'a SpannedEntry> {
    entries.iter().find(|e| e.key == key)
}
