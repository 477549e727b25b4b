use std::path::PathBuf;

use crate::{
    model::{OutputFormat, QualityPreset},
    theme::Skin,
};

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "ytdlp_gui=info";

/// Start-up values for the form. Nothing is persisted between runs.
#[derive(Clone, Debug)]
pub struct Settings {
    /// yt-dlp executable, looked up on `PATH` unless absolute
    pub ytdlp_binary: PathBuf,
    pub download_dir: PathBuf,
    pub quality: QualityPreset,
    pub format: OutputFormat,
    pub skin: Skin,
}

impl Default for Settings {
    fn default() -> Self {
        let bin = if cfg!(target_os = "windows") { "yt-dlp.exe" } else { "yt-dlp" };
        Self {
            ytdlp_binary: PathBuf::from(bin),
            download_dir: default_download_dir(),
            quality: QualityPreset::Best,
            format: OutputFormat::Mp4,
            skin: Skin::Classic,
        }
    }
}

/// `~/Downloads`, or `./downloads` when there is no home directory
pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("./downloads"))
}
