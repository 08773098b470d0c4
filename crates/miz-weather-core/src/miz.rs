// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::lua::{self, LuaDocument, LuaError};
use log::{debug, error};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MISSION_ENTRY: &str = "mission";
pub const L10N_DIR: &str = "l10n/DEFAULT/";
pub const REQUIRED_ENTRIES: [&str; 5] = [
    "mission",
    "options",
    "warehouses",
    "l10n/DEFAULT/dictionary",
    "l10n/DEFAULT/mapResource",
];

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 64 << 20;

#[derive(Error, Debug)]
pub enum MizError {
    #[error("mission file not found: {0}")]
    NotFound(PathBuf),
    #[error("MIZ file should end with the \".miz\" extension: {0}")]
    BadExtension(PathBuf),
    #[error("bad zip file {path}: {source}")]
    BadZip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("missing file in miz: {0}")]
    MissingEntry(String),
    #[error("unable to decode {entry}: {source}")]
    Lua {
        entry: String,
        #[source]
        source: LuaError,
    },
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct MizEntry {
    name: String,
    is_dir: bool,
    data: Vec<u8>,
}

/// A DCS mission archive held in memory.
///
/// The `mission` entry is decoded on open and re-encoded by [`Miz::zip`];
/// every other entry is carried over untouched.
#[derive(Debug, Clone)]
pub struct Miz {
    path: PathBuf,
    entries: Vec<MizEntry>,
    mission: LuaDocument,
}

impl Miz {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MizError> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(MizError::NotFound(path));
        }
        if path.extension().and_then(|e| e.to_str()) != Some("miz") {
            return Err(MizError::BadExtension(path));
        }

        debug!("Opening mission archive — path={}", path.display());
        let file = File::open(&path)?;
        let mut archive = zip::ZipArchive::new(file).map_err(|source| MizError::BadZip {
            path: path.clone(),
            source,
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(initial_capacity(file.size()));
            file.read_to_end(&mut data)?;
            debug!("Read archive member — name={} bytes={}", file.name(), data.len());
            entries.push(MizEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                data,
            });
        }

        for required in REQUIRED_ENTRIES {
            if !entries.iter().any(|e| e.name == required) {
                error!("missing file in miz: {} — path={}", required, path.display());
                return Err(MizError::MissingEntry(required.to_string()));
            }
        }

        let mission_bytes = entries
            .iter()
            .find(|e| e.name == MISSION_ENTRY)
            .map(|e| e.data.as_slice())
            .ok_or_else(|| MizError::MissingEntry(MISSION_ENTRY.to_string()))?;
        let mission = lua::decode(&bytes_to_text(mission_bytes)).map_err(|source| MizError::Lua {
            entry: MISSION_ENTRY.to_string(),
            source,
        })?;

        Ok(Self {
            path,
            entries,
            mission,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mission(&self) -> &LuaDocument {
        &self.mission
    }

    pub fn mission_mut(&mut self) -> &mut LuaDocument {
        &mut self.mission
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Extra files shipped under `l10n/DEFAULT` (briefing images, sounds...).
    pub fn resources(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .filter_map(|e| e.name.strip_prefix(L10N_DIR))
            .filter(|name| !name.is_empty() && *name != "dictionary" && *name != "mapResource")
            .map(str::to_string)
            .collect()
    }

    /// `<stem>_EMIZ.miz` next to the source archive.
    pub fn default_destination(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.path.with_file_name(format!("{}_EMIZ.miz", stem))
    }

    /// Writes the archive with the current mission table and returns where it went.
    pub fn zip(&self, destination: Option<&Path>) -> Result<PathBuf, MizError> {
        let destination = destination
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_destination());
        debug!("Zipping mission — destination={}", destination.display());

        // Written next to the destination, renamed once complete
        let partial = partial_path(&destination);
        let written = self
            .write_archive(&partial)
            .and_then(|()| fs::rename(&partial, &destination).map_err(MizError::from));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&partial) {
                debug!(
                    "No partial archive to remove — path={} error={}",
                    partial.display(),
                    cleanup
                );
            }
            error!(
                "Failed to write mission archive — destination={} error={}",
                destination.display(),
                e
            );
            return Err(e);
        }

        Ok(destination)
    }

    fn write_archive(&self, path: &Path) -> Result<(), MizError> {
        let mission_bytes = text_to_bytes(&lua::encode(&self.mission));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let mut writer = zip::ZipWriter::new(File::create(path)?);
        for entry in &self.entries {
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options)?;
            if entry.name == MISSION_ENTRY {
                writer.write_all(&mission_bytes)?;
            } else {
                writer.write_all(&entry.data)?;
            }
        }
        writer.finish()?;
        Ok(())
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    destination.with_file_name(name)
}

fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

// Mission text is handled one byte per char so any encoding survives a round trip.
fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn text_to_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
