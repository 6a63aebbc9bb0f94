use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::{fs::{self, OpenOptions}, io::AsyncWriteExt};

/// Flat newline-delimited list of topics used so far. No locking.
#[derive(Debug, Clone)]
pub struct TopicHistory {
    path: PathBuf,
    entries: Vec<String>,
}

impl TopicHistory {
    /// Missing file -> empty history.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(txt) => txt.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    /// No known entries; appends still go to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), entries: Vec::new() }
    }

    pub fn path(&self) -> &Path { &self.path }

    #[cfg(test)]
    pub fn entries(&self) -> &[String] { &self.entries }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }

    pub fn contains(&self, topic: &str) -> bool {
        let topic = topic.trim().to_lowercase();
        self.entries.iter().any(|e| e.to_lowercase() == topic)
    }

    pub async fn append(&mut self, topic: &str) -> Result<()> {
        let line = topic.replace(['\r', '\n'], " ");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        f.write_all(line.trim().as_bytes()).await?;
        f.write_all(b"\n").await?;
        f.flush().await?;
        self.entries.push(line.trim().to_string());
        Ok(())
    }
}
