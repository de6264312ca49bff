//! Locating the configuration file.

use std::fs;
use std::io;
use std::path::{Path as FsPath, PathBuf};

/// Name of the configuration file inside the search directories.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// The outcome of resolving a configuration file.
pub struct Resolution {
    /// The opened document, if any candidate was readable.
    pub reader: Option<Box<dyn io::Read>>,
    /// Where `reader` was opened from.
    pub read_from: Option<PathBuf>,
    /// Where saves should write the document back to.
    pub write_to: PathBuf,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("reader", &self.reader.is_some())
            .field("read_from", &self.read_from)
            .field("write_to", &self.write_to)
            .finish()
    }
}

/// Turns a candidate file path into a readable document and a write-back path.
pub trait FileResolver {
    fn resolve(&self, candidate: &FsPath) -> Resolution;
}

/// Searches the candidate, then the user's config directory, then a
/// system-wide directory.
///
/// A file found in the system-wide directory is only read: saves go to the
/// user's directory so the shared copy is never overwritten.
#[derive(Clone, Debug)]
pub struct SearchPathResolver {
    user_dir: Option<PathBuf>,
    system_dir: Option<PathBuf>,
}

impl SearchPathResolver {
    /// Resolver using the platform directories for `app`.
    pub fn new(app: &str) -> Self {
        SearchPathResolver {
            user_dir: dirs::config_dir().map(|p| p.join(app)),
            system_dir: system_config_dir().map(|p| p.join(app)),
        }
    }

    /// Resolver with explicit search directories.
    pub fn with_dirs(user_dir: Option<PathBuf>, system_dir: Option<PathBuf>) -> Self {
        SearchPathResolver {
            user_dir,
            system_dir,
        }
    }

    fn user_file(&self) -> Option<PathBuf> {
        self.user_dir.as_ref().map(|d| d.join(CONFIG_FILE_NAME))
    }

    fn system_file(&self) -> Option<PathBuf> {
        self.system_dir.as_ref().map(|d| d.join(CONFIG_FILE_NAME))
    }
}

impl FileResolver for SearchPathResolver {
    fn resolve(&self, candidate: &FsPath) -> Resolution {
        let user_file = self.user_file();
        let fallback_target = user_file.clone().unwrap_or_else(|| candidate.to_path_buf());

        let searched = [
            (Some(candidate.to_path_buf()), candidate.to_path_buf()),
            (user_file, fallback_target.clone()),
            (self.system_file(), fallback_target.clone()),
        ];

        for (source, write_to) in searched {
            let Some(source) = source else {
                continue;
            };
            match open_file(&source) {
                Ok(file) => {
                    log::debug!("Reading configuration from {}...", source.display());
                    return Resolution {
                        reader: Some(Box::new(io::BufReader::new(file))),
                        read_from: Some(source),
                        write_to,
                    };
                }
                Err(error) => {
                    log::debug!("Skipping {}: {}", source.display(), error);
                }
            }
        }

        Resolution {
            reader: None,
            read_from: None,
            write_to: fallback_target,
        }
    }
}

fn open_file(path: &FsPath) -> io::Result<fs::File> {
    let file = fs::File::open(path)?;
    if file.metadata()?.is_dir() {
        return Err(io::Error::other("is a directory"));
    }
    Ok(file)
}

#[cfg(unix)]
fn system_config_dir() -> Option<PathBuf> {
    Some(PathBuf::from("/etc"))
}

#[cfg(not(unix))]
fn system_config_dir() -> Option<PathBuf> {
    std::env::var_os("ProgramData").map(PathBuf::from)
}
