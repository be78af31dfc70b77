//! Versioned bincode cache of processed collections.
//!
//! A cache file is a [`CacheHeader`] followed by the encoded [`Collection`].
//! The fingerprint records everything that shaped the encoding, so a cache
//! written under another configuration is reported as [`Error::StaleCache`].

use super::error::Error;
use crate::model::graph::{Collection, GraphSample};
use bincode::{Decode, Encode};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const MAGIC: [u8; 8] = *b"MOLGRAPH";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CacheHeader {
    pub magic: [u8; 8],
    pub format_version: u32,
    pub fingerprint: String,
}

impl CacheHeader {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            fingerprint: fingerprint.into(),
        }
    }
}

/// Upper bound on the memory a single decode may claim.
pub const DECODE_LIMIT: usize = 1 << 30;

fn config() -> bincode::config::Configuration {
    bincode::config::standard()
}

fn decode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<DECODE_LIMIT>()
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomically<F>(path: &Path, body: F) -> Result<(), Error>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), Error>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_sibling(path);
    match write_file(&tmp, body) {
        Ok(()) => {
            fs::rename(&tmp, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn write_file<F>(path: &Path, body: F) -> Result<(), Error>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), Error>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    body(&mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write(path: impl AsRef<Path>, fingerprint: &str, collection: &Collection) -> Result<(), Error> {
    let header = CacheHeader::new(fingerprint);
    write_atomically(path.as_ref(), |w| {
        bincode::encode_into_std_write(&header, w, config())?;
        bincode::encode_into_std_write(collection, w, config())?;
        Ok(())
    })
}

pub fn read_header(path: impl AsRef<Path>) -> Result<CacheHeader, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    decode_header(&mut reader)
}

fn decode_header(reader: &mut BufReader<File>) -> Result<CacheHeader, Error> {
    let header: CacheHeader = bincode::decode_from_std_read(reader, decode_config())?;
    if header.magic != MAGIC {
        return Err(Error::Cache("not a molgraph cache file".to_string()));
    }
    Ok(header)
}

/// Loads a cached collection, checking that it was written for `fingerprint`.
pub fn load(path: impl AsRef<Path>, fingerprint: &str) -> Result<Collection, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = decode_header(&mut reader)?;

    if header.format_version != FORMAT_VERSION {
        return Err(Error::StaleCache {
            expected: format!("format v{FORMAT_VERSION}"),
            found: format!("format v{}", header.format_version),
        });
    }
    if header.fingerprint != fingerprint {
        return Err(Error::StaleCache {
            expected: fingerprint.to_string(),
            found: header.fingerprint,
        });
    }

    let collection: Collection = bincode::decode_from_std_read(&mut reader, decode_config())?;
    if !collection.slices_consistent() {
        return Err(Error::Cache(
            "slice offsets do not match the stored samples".to_string(),
        ));
    }
    Ok(collection)
}

/// Reads a pre-encoded list of graph samples shipped alongside the raw data.
pub fn read_prebuilt(path: impl AsRef<Path>) -> Result<Vec<GraphSample>, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    Ok(bincode::decode_from_std_read(&mut reader, decode_config())?)
}

pub fn write_prebuilt(path: impl AsRef<Path>, samples: &[GraphSample]) -> Result<(), Error> {
    write_atomically(path.as_ref(), |w| {
        bincode::encode_into_std_write(samples, w, config())?;
        Ok(())
    })
}
