use std::{fmt, path::PathBuf};

/// Target resolution or stream combination picked in the quality dropdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityPreset {
    Best,
    Worst,
    P720,
    P1080,
    P1440,
    P2160,
    BestVideoBestAudio,
    BestAudio,
}

impl QualityPreset {
    /// Every preset, in dropdown order
    pub const ALL: [QualityPreset; 8] = [
        QualityPreset::Best,
        QualityPreset::Worst,
        QualityPreset::P720,
        QualityPreset::P1080,
        QualityPreset::P1440,
        QualityPreset::P2160,
        QualityPreset::BestVideoBestAudio,
        QualityPreset::BestAudio,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QualityPreset::Best => "best",
            QualityPreset::Worst => "worst",
            QualityPreset::P720 => "720p",
            QualityPreset::P1080 => "1080p",
            QualityPreset::P1440 => "1440p",
            QualityPreset::P2160 => "2160p (4K)",
            QualityPreset::BestVideoBestAudio => "bestvideo+bestaudio",
            QualityPreset::BestAudio => "bestaudio",
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Container or audio codec the finished file should end up in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Keep whatever yt-dlp produces; never offered in the dropdown
    #[cfg(test)]
    Best,
    Mp4,
    Mkv,
    Webm,
    Mp3,
    M4a,
    Flac,
    Wav,
}

impl OutputFormat {
    /// The formats offered in the dropdown
    pub const CHOICES: [OutputFormat; 7] = [
        OutputFormat::Mp4,
        OutputFormat::Mkv,
        OutputFormat::Webm,
        OutputFormat::Mp3,
        OutputFormat::M4a,
        OutputFormat::Flac,
        OutputFormat::Wav,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            #[cfg(test)]
            OutputFormat::Best => "best",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Webm => "webm",
            OutputFormat::Mp3 => "mp3",
            OutputFormat::M4a => "m4a",
            OutputFormat::Flac => "flac",
            OutputFormat::Wav => "wav",
        }
    }

    /// Audio-only formats are produced by extracting the audio track
    pub fn is_audio(self) -> bool {
        matches!(
            self,
            OutputFormat::Mp3 | OutputFormat::M4a | OutputFormat::Flac | OutputFormat::Wav
        )
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One download attempt, snapshotted from the form when Download is pressed
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadRequest {
    /// Raw contents of the URL field
    pub url: String,
    pub quality: QualityPreset,
    pub format: OutputFormat,
    /// Folder the finished file is written into
    pub destination: PathBuf,
}

/// Where the current (or last) download attempt stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Downloading,
    Finished,
    Failed,
}
