//! Local filesystem storage for uploaded submission files
//!
//! Files live under `<root>/ifrs17_submissions/<YYYY>/<MM>/`. Paths handed
//! back to callers are relative to the root and always use `/`.

use crate::domain::repository::FileStore;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const SUBMISSIONS_DIR: &str = "ifrs17_submissions";
const SUFFIX_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
const MAX_ATTEMPTS: usize = 8;

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        info!("Using upload root {:?}", root);
        Self { root }
    }

    /// Resolve a stored relative path, refusing anything that escapes the root
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let safe = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if relative.is_empty() || !safe {
            bail!("invalid stored file path '{}'", relative);
        }
        Ok(self.root.join(path))
    }
}

/// `name.ext` becomes `name_<suffix>.ext`
fn with_suffix(filename: &str, suffix: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", filename, suffix),
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, reporting_period: NaiveDate, filename: &str, content: &[u8]) -> Result<String> {
        let partition = format!(
            "{}/{:04}/{:02}",
            SUBMISSIONS_DIR,
            reporting_period.year(),
            reporting_period.month()
        );
        let dir = self.root.join(&partition);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create directory {:?}", dir))?;

        let mut candidate = filename.to_string();
        for _ in 0..MAX_ATTEMPTS {
            let target = dir.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .await
                        .with_context(|| format!("Failed to write {:?}", target))?;
                    file.flush().await?;
                    let relative = format!("{}/{}", partition, candidate);
                    debug!(path = %relative, bytes = content.len(), "Stored uploaded file");
                    return Ok(relative);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = with_suffix(filename, &nanoid::nanoid!(7, &SUFFIX_ALPHABET));
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {:?}", target));
                }
            }
        }
        bail!("could not find a free name for '{}' in {}", filename, partition)
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        fs::read(&full)
            .await
            .with_context(|| format!("Failed to read stored file {}", path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete stored file {}", path)),
        }
    }

    async fn set_aside(&self, path: &str) -> Result<Option<String>> {
        let full = self.resolve(path)?;
        let marker = nanoid::nanoid!(7, &SUFFIX_ALPHABET);
        let aside = match path.rsplit_once('/') {
            Some((dir, name)) => format!("{}/.replaced-{}-{}", dir, marker, name),
            None => format!(".replaced-{}-{}", marker, path),
        };
        match fs::rename(&full, self.resolve(&aside)?).await {
            Ok(()) => {
                debug!(path = %path, aside = %aside, "Set stored file aside");
                Ok(Some(aside))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to set aside stored file {}", path)),
        }
    }

    async fn restore(&self, aside: &str, path: &str) -> Result<()> {
        fs::rename(self.resolve(aside)?, self.resolve(path)?)
            .await
            .with_context(|| format!("Failed to restore stored file {}", path))
    }
}
