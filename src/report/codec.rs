//! Cache file naming and on-disk encoding
//!
//! A cache file is named `<branch> <revision> <fingerprint>.json.zstd` and
//! holds one zstd-compressed JSON suite tree.

use crate::report::cache::CacheKey;
use crate::report::fingerprint::Fingerprint;
use crate::report::tree::SuiteTree;
use std::io::{Read, Write};

/// Fixed suffix of every cache file
pub const FILE_SUFFIX: &str = ".json.zstd";

/// zstd level used for cache files
const COMPRESSION_LEVEL: i32 = 3;

/// Characters that cannot appear verbatim inside a name field
const ESCAPES: &[(char, &str)] = &[('%', "%25"), ('/', "%2F"), (' ', "%20")];

/// Build the file name for a cache entry
pub fn generate_file_name(key: &CacheKey, fingerprint: &Fingerprint) -> String {
    format!(
        "{} {} {}{}",
        escape(&key.branch),
        escape(&key.revision),
        escape(fingerprint.as_str()),
        FILE_SUFFIX
    )
}

/// Inverse of [`generate_file_name`]
///
/// Returns `None` for anything that is not one of our cache files; such
/// files are never an error.
pub fn parse_file_name(name: &str) -> Option<(CacheKey, Fingerprint)> {
    let stem = name.strip_suffix(FILE_SUFFIX)?;
    let fields: Vec<&str> = stem.split(' ').collect();
    let [branch, revision, fingerprint] = fields.as_slice() else {
        return None;
    };

    Some((
        CacheKey::new(unescape(branch)?, unescape(revision)?),
        Fingerprint::new(unescape(fingerprint)?),
    ))
}

/// Serialize `tree` as JSON and compress it into `writer`
pub fn encode<W: Write>(tree: &SuiteTree, writer: W) -> std::io::Result<W> {
    let mut encoder = zstd::Encoder::new(writer, COMPRESSION_LEVEL)?;
    serde_json::to_writer(&mut encoder, tree)?;
    encoder.finish()
}

/// Decompress and deserialize one tree from `reader`
pub fn decode<R: Read>(reader: R) -> std::io::Result<SuiteTree> {
    let decoder = zstd::Decoder::new(reader)?;
    Ok(serde_json::from_reader(decoder)?)
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out
}

fn unescape(field: &str) -> Option<String> {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let (raw, escaped) = ESCAPES
            .iter()
            .find(|(_, escaped)| tail.starts_with(escaped))?;
        out.push(*raw);
        rest = &tail[escaped.len()..];
    }
    out.push_str(rest);
    Some(out)
}
