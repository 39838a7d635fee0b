//! SHA-256 fingerprints for audit trails.
//!
//! - `entries_sha256`: the eligible list, independent of import order
//!   (records sorted by id, one tab-separated line each).
//! - `winners_sha256`: the committed results in commit order
//!   (turn, tier, id; timestamps excluded so a seeded replay hashes the same).
//!
//! Digests are lowercase hex.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use ld_core::{Entry, Winner};

use crate::IoResult;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over a file's raw bytes.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn entries_sha256<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut sorted: Vec<&Entry> = entries.into_iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut hasher = Sha256::new();
    for e in sorted {
        let amount = e.amount.map(|a| a.to_string()).unwrap_or_default();
        let region = e.region.as_ref().map(|r| r.as_str()).unwrap_or_default();
        hasher.update(format!("{}\t{}\t{}\t{}\t{}\n", e.id, e.name, e.phone, amount, region).as_bytes());
    }
    hex::encode(hasher.finalize())
}

pub fn winners_sha256<'a, I>(winners: I) -> String
where
    I: IntoIterator<Item = &'a Winner>,
{
    let mut hasher = Sha256::new();
    for w in winners {
        hasher.update(format!("{}\t{}\t{}\n", w.turn, w.tier_name, w.entry.id).as_bytes());
    }
    hex::encode(hasher.finalize())
}
