//! Fetching and unpacking raw dataset archives.

use super::error::Error;
use flate2::read::GzDecoder;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    /// Plain or gzip-compressed tarball.
    Tar,
    Zip,
}

impl ArchiveKind {
    fn file_name(&self) -> &'static str {
        match self {
            ArchiveKind::Tar => "download.tar",
            ArchiveKind::Zip => "download.zip",
        }
    }
}

/// Downloads `url` into `dest_dir` and returns the path of the saved file.
///
/// One GET, no timeout and no retry.
pub fn download(url: &str, dest_dir: &Path, file_name: &str) -> Result<PathBuf, Error> {
    fs::create_dir_all(dest_dir)?;
    let target = dest_dir.join(file_name);
    info!("Downloading {url}");

    let response = ureq::get(url).call()?;
    let mut body = response.into_body().into_reader();
    let mut file = File::create(&target)?;
    let bytes = io::copy(&mut body, &mut file)?;
    debug!("Saved {bytes} bytes to {}", target.display());
    Ok(target)
}

pub fn extract(archive: &Path, kind: ArchiveKind, dest_dir: &Path) -> Result<(), Error> {
    info!("Extracting {}", archive.display());
    match kind {
        ArchiveKind::Tar => extract_tar(archive, dest_dir),
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
            zip.extract(dest_dir)?;
            Ok(())
        }
    }
}

fn extract_tar(archive: &Path, dest_dir: &Path) -> Result<(), Error> {
    let mut magic = [0u8; 2];
    let gzipped = {
        let mut file = File::open(archive)?;
        file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC
    };

    let reader = BufReader::new(File::open(archive)?);
    let result = if gzipped {
        tar::Archive::new(GzDecoder::new(reader)).unpack(dest_dir)
    } else {
        tar::Archive::new(reader).unpack(dest_dir)
    };
    result.map_err(|e| Error::Archive(e.to_string()))
}

/// Downloads and unpacks an archive into `dest_dir`, then removes the archive.
pub fn fetch(url: &str, kind: ArchiveKind, dest_dir: &Path) -> Result<(), Error> {
    let archive = download(url, dest_dir, kind.file_name())?;
    unpack_and_remove(&archive, kind, dest_dir)
}

fn unpack_and_remove(archive: &Path, kind: ArchiveKind, dest_dir: &Path) -> Result<(), Error> {
    match extract(archive, kind, dest_dir) {
        Ok(()) => {
            fs::remove_file(archive)?;
            Ok(())
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(archive) {
                warn!("Could not remove {}: {rm}", archive.display());
            }
            Err(e)
        }
    }
}
