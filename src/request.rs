//! Turns the form's choices into the options handed to yt-dlp.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::AppError,
    model::{DownloadRequest, OutputFormat, QualityPreset},
};

/// Text shown in the empty URL field
pub const URL_PLACEHOLDER: &str = "Paste YouTube URL here...";

/// Hosts accepted even without an explicit http(s) scheme
const KNOWN_SITES: [&str; 5] = ["youtube", "youtu.be", "vimeo", "dailymotion", "twitch"];

/// Line prefix marking a JSON progress dictionary on yt-dlp's stdout
pub const PROGRESS_PREFIX: &str = "__PROGRESS__ ";

const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Maps a quality preset to yt-dlp's format selector expression
pub fn format_selector(quality: QualityPreset) -> &'static str {
    match quality {
        QualityPreset::Best => "best",
        QualityPreset::Worst => "worst",
        QualityPreset::P720 => "bestvideo[height<=720]+bestaudio/best[height<=720]",
        QualityPreset::P1080 => "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
        QualityPreset::P1440 => "bestvideo[height<=1440]+bestaudio/best[height<=1440]",
        QualityPreset::P2160 => "bestvideo[height<=2160]+bestaudio/best[height<=2160]",
        QualityPreset::BestVideoBestAudio => "bestvideo+bestaudio",
        QualityPreset::BestAudio => "bestaudio/best",
    }
}

/// Checks the URL field and returns the trimmed URL.
pub fn validate_url(raw: &str) -> Result<String, AppError> {
    let url = raw.trim();
    if url.is_empty() || url == URL_PLACEHOLDER {
        return Err(AppError::InputValidation("Please enter a video URL".into()));
    }

    let lower = url.to_lowercase();
    let known_site = KNOWN_SITES.iter().any(|site| lower.contains(site));
    if !known_site && !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::InputValidation("Please enter a valid URL".into()));
    }
    Ok(url.to_owned())
}

/// Creates the destination folder and any missing parents.
pub fn ensure_directory(dir: &Path) -> Result<(), AppError> {
    if dir.as_os_str().is_empty() {
        return Err(AppError::InputValidation(
            "Please choose a download directory".into(),
        ));
    }
    fs::create_dir_all(dir).map_err(|source| AppError::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })
}

/// Requested quality for extracted audio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioQuality {
    Kbps(u32),
    Best,
}

impl AudioQuality {
    /// Value as yt-dlp's post-processor spells it
    pub fn preferred(self) -> String {
        match self {
            AudioQuality::Kbps(rate) => rate.to_string(),
            AudioQuality::Best => "best".to_owned(),
        }
    }

    fn cli_value(self) -> String {
        match self {
            AudioQuality::Kbps(rate) => format!("{rate}K"),
            AudioQuality::Best => "0".to_owned(),
        }
    }
}

/// Audio extraction post-processing step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractAudio {
    pub codec: OutputFormat,
    pub quality: AudioQuality,
}

/// Everything yt-dlp needs for one download, minus the URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadOptions {
    pub format: &'static str,
    pub output_template: PathBuf,
    pub extract_audio: Option<ExtractAudio>,
    pub merge_output_format: Option<OutputFormat>,
}

impl DownloadOptions {
    /// Builds the options without touching the filesystem.
    pub fn build(request: &DownloadRequest) -> Self {
        let mut options = DownloadOptions {
            format: format_selector(request.quality),
            output_template: request.destination.join(OUTPUT_TEMPLATE),
            extract_audio: None,
            merge_output_format: None,
        };

        match request.format {
            #[cfg(test)]
            OutputFormat::Best => {}
            format if format.is_audio() => {
                let quality = if format == OutputFormat::Mp3 {
                    AudioQuality::Kbps(192)
                } else {
                    AudioQuality::Best
                };
                options.extract_audio = Some(ExtractAudio {
                    codec: format,
                    quality,
                });
            }
            format => options.merge_output_format = Some(format),
        }
        options
    }

    /// Command line for the yt-dlp executable; the URL always comes last.
    pub fn to_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--newline".to_owned(),
            "--progress-template".to_owned(),
            format!("download:{PROGRESS_PREFIX}%(progress)j"),
            "-f".to_owned(),
            self.format.to_owned(),
            "-o".to_owned(),
            self.output_template.to_string_lossy().into_owned(),
        ];

        if let Some(extract) = &self.extract_audio {
            args.push("-x".to_owned());
            args.push("--audio-format".to_owned());
            args.push(extract.codec.as_str().to_owned());
            args.push("--audio-quality".to_owned());
            args.push(extract.quality.cli_value());
        }
        if let Some(merge) = self.merge_output_format {
            args.push("--merge-output-format".to_owned());
            args.push(merge.as_str().to_owned());
        }

        args.push("--".to_owned());
        args.push(url.to_owned());
        args
    }
}

/// Validates the request, makes sure the folder exists and builds its options.
/// Returns the cleaned-up URL alongside the options.
pub fn prepare(request: &DownloadRequest) -> Result<(String, DownloadOptions), AppError> {
    let url = validate_url(&request.url)?;
    ensure_directory(&request.destination)?;
    let options = DownloadOptions::build(request);
    debug!(
        %url,
        format = options.format,
        audio_quality = ?options.extract_audio.as_ref().map(|e| e.quality.preferred()),
        merge = ?options.merge_output_format,
        "built download options"
    );
    Ok((url, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(quality: QualityPreset, format: OutputFormat) -> DownloadRequest {
        DownloadRequest {
            url: "https://www.youtube.com/watch?v=abc".into(),
            quality,
            format,
            destination: PathBuf::from("/tmp/videos"),
        }
    }

    #[test]
    fn selector_table_is_exact() {
        let expected = [
            (QualityPreset::Best, "best"),
            (QualityPreset::Worst, "worst"),
            (QualityPreset::P720, "bestvideo[height<=720]+bestaudio/best[height<=720]"),
            (QualityPreset::P1080, "bestvideo[height<=1080]+bestaudio/best[height<=1080]"),
            (QualityPreset::P1440, "bestvideo[height<=1440]+bestaudio/best[height<=1440]"),
            (QualityPreset::P2160, "bestvideo[height<=2160]+bestaudio/best[height<=2160]"),
            (QualityPreset::BestVideoBestAudio, "bestvideo+bestaudio"),
            (QualityPreset::BestAudio, "bestaudio/best"),
        ];
        for (quality, selector) in expected {
            assert_eq!(format_selector(quality), selector, "{quality}");
        }
    }

    #[test]
    fn audio_formats_extract_audio() {
        for format in [OutputFormat::Mp3, OutputFormat::M4a, OutputFormat::Flac, OutputFormat::Wav] {
            let options = DownloadOptions::build(&request(QualityPreset::BestAudio, format));
            let extract = options.extract_audio.expect("audio extraction");
            assert_eq!(extract.codec, format);
            let expected = if format == OutputFormat::Mp3 { "192" } else { "best" };
            assert_eq!(extract.quality.preferred(), expected);
            assert_eq!(options.merge_output_format, None);
        }
    }

    #[test]
    fn video_formats_set_merge_format() {
        for format in [OutputFormat::Mp4, OutputFormat::Mkv, OutputFormat::Webm] {
            let options = DownloadOptions::build(&request(QualityPreset::Best, format));
            assert_eq!(options.merge_output_format, Some(format));
            assert_eq!(options.extract_audio, None);
        }

        let options = DownloadOptions::build(&request(QualityPreset::Best, OutputFormat::Best));
        assert_eq!(options.merge_output_format, None);
        assert_eq!(options.extract_audio, None);
    }

    #[test]
    fn url_rules() {
        assert_eq!(validate_url("https://vimeo.com/x").unwrap(), "https://vimeo.com/x");
        assert_eq!(
            validate_url("https://example.com/v").unwrap(),
            "https://example.com/v"
        );
        assert_eq!(validate_url("  youtu.be/abc  ").unwrap(), "youtu.be/abc");
        assert_eq!(validate_url("www.YouTube.com/watch?v=1").unwrap(), "www.YouTube.com/watch?v=1");

        for bad in ["", "   ", URL_PLACEHOLDER, "ftp://foo"] {
            assert!(
                matches!(validate_url(bad), Err(AppError::InputValidation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn creates_nested_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
        // already there
        ensure_directory(&nested).unwrap();
    }

    #[test]
    fn destination_blocked_by_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let err = ensure_directory(&file.join("sub")).unwrap_err();
        assert!(matches!(err, AppError::DirectoryCreation { .. }));
        assert!(matches!(
            ensure_directory(Path::new("")),
            Err(AppError::InputValidation(_))
        ));
    }

    #[test]
    fn args_for_1080p_mp4() {
        let tmp = tempfile::tempdir().unwrap();
        let req = DownloadRequest {
            url: " https://www.youtube.com/watch?v=abc ".into(),
            quality: QualityPreset::P1080,
            format: OutputFormat::Mp4,
            destination: tmp.path().join("out"),
        };
        let (url, options) = prepare(&req).unwrap();
        assert!(tmp.path().join("out").is_dir());
        assert_eq!(url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(
            options.format,
            "bestvideo[height<=1080]+bestaudio/best[height<=1080]"
        );
        assert_eq!(options.extract_audio, None);
        assert_eq!(options.merge_output_format, Some(OutputFormat::Mp4));

        let args = options.to_args(&url);
        let template = tmp.path().join("out").join("%(title)s.%(ext)s");
        assert!(args.windows(2).any(|w| w[0] == "-f" && w[1] == options.format));
        assert!(args.windows(2).any(|w| w[0] == "-o" && w[1] == template.to_string_lossy()));
        assert!(args.windows(2).any(|w| w == ["--merge-output-format", "mp4"]));
        assert!(!args.iter().any(|a| a == "-x"));
        assert_eq!(args[args.len() - 2..], ["--", url.as_str()]);
    }

    #[test]
    fn args_for_mp3_extraction() {
        let options = DownloadOptions::build(&request(QualityPreset::BestAudio, OutputFormat::Mp3));
        let args = options.to_args("https://youtu.be/abc");
        assert!(args.windows(5).any(|w| w == ["-x", "--audio-format", "mp3", "--audio-quality", "192K"]));
        assert!(!args.iter().any(|a| a == "--merge-output-format"));

        let options = DownloadOptions::build(&request(QualityPreset::BestAudio, OutputFormat::Flac));
        let args = options.to_args("https://youtu.be/abc");
        assert!(args.windows(2).any(|w| w == ["--audio-quality", "0"]));
    }

    #[test]
    fn invalid_url_does_not_create_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("never");
        let req = DownloadRequest {
            url: "ftp://foo".into(),
            quality: QualityPreset::Best,
            format: OutputFormat::Mp4,
            destination: dest.clone(),
        };
        assert!(matches!(prepare(&req), Err(AppError::InputValidation(_))));
        assert!(!dest.exists());
    }
}
