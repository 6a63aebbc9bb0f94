use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

pub fn post_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}{}.html", prefix, at.format("%Y%m%d%H%M%S"))
}

/// Writes the page next to a `.tmp` sibling and renames it into place.
/// A second write with the same name in the same second replaces the first whole.
pub async fn save_post(out_dir: &Path, prefix: &str, at: DateTime<Local>, html: &str) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(out_dir).await?;

    let name = post_file_name(prefix, at);
    let path = out_dir.join(&name);
    let tmp = out_dir.join(format!("{name}.{}.tmp", std::process::id()));
    let written = async {
        let mut f = fs::File::create(&tmp).await?;
        f.write_all(html.as_bytes()).await?;
        let _ = f.sync_all().await; // best-effort
        drop(f);
        fs::rename(&tmp, &path).await
    }
    .await;
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(path)
}
