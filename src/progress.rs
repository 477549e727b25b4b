use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::{model::Phase, request::PROGRESS_PREFIX};

/// One progress dictionary reported by yt-dlp
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProgressEvent {
    pub status: String,
    #[serde(default)]
    pub downloaded_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes: Option<f64>,
    /// Bytes per second
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default, rename = "_percent_str")]
    pub percent_str: Option<String>,
}

/// Parses a `__PROGRESS__ {json}` line; anything else yields `None`.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let payload = line.trim().strip_prefix(PROGRESS_PREFIX.trim_end())?;
    serde_json::from_str(payload.trim()).ok()
}

/// Receiver for progress events coming off the worker
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// Formats a transfer rate the way the status line shows it
pub fn format_rate(bytes_per_second: Option<f64>) -> String {
    match bytes_per_second {
        Some(speed) if speed > 0.0 => format!("{:.1} MB/s", speed / 1024.0 / 1024.0),
        _ => "-- MB/s".to_owned(),
    }
}

/// Progress bar and status line contents
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressState {
    pub phase: Phase,
    /// 0 to 100
    pub percent: f32,
    /// `None` while the rate is unknown
    pub rate: Option<f64>,
    pub status: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            percent: 0.0,
            rate: None,
            status: "Ready to download".to_owned(),
        }
    }
}

impl ProgressState {
    /// Clears everything for a fresh attempt.
    pub fn begin(&mut self) {
        *self = Self {
            status: "Initializing download...".to_owned(),
            ..Self::default()
        };
    }

    /// Folds one event into the state. Malformed payloads leave it untouched.
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event.status.as_str() {
            "downloading" => self.apply_downloading(event),
            "finished" => self.finish(),
            "error" => self.fail(),
            _ => {}
        }
    }

    fn apply_downloading(&mut self, event: &ProgressEvent) {
        match (event.total_bytes, event.downloaded_bytes) {
            (Some(total), Some(done)) if total > 0.0 => {
                let percent = (done / total * 100.0) as f32;
                if !percent.is_finite() {
                    return;
                }
                self.percent = percent.clamp(0.0, 100.0);
                self.rate = event.speed.filter(|s| s.is_finite() && *s > 0.0);
                self.phase = Phase::Downloading;
                self.status = format!(
                    "Downloading: {:.1}% ({})",
                    self.percent,
                    format_rate(self.rate)
                );
            }
            (Some(total), None) if total > 0.0 => {}
            _ => {
                let Some(raw) = event.percent_str.as_deref() else {
                    return;
                };
                let cleaned = ANSI_ESCAPE.replace_all(raw, "");
                let cleaned = cleaned.trim_matches(|c: char| c == '%' || c.is_whitespace());
                if cleaned.is_empty() || cleaned == "N/A" {
                    return;
                }
                if let Ok(percent) = cleaned.parse::<f32>() {
                    if percent.is_finite() {
                        self.percent = percent.clamp(0.0, 100.0);
                        self.phase = Phase::Downloading;
                        self.status = format!("Downloading: {cleaned}%");
                    }
                }
            }
        }
    }

    pub fn finish(&mut self) {
        self.percent = 100.0;
        self.phase = Phase::Finished;
        self.status = "Download completed successfully!".to_owned();
    }

    pub fn fail(&mut self) {
        self.phase = Phase::Failed;
        self.status = "Download failed!".to_owned();
    }
}

/// Terminal colour escapes such as `\x1b[0;94m`
static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ANSI escape pattern is valid"));

#[cfg(test)]
mod tests {
    use super::*;

    fn downloading(done: f64, total: f64, speed: Option<f64>) -> ProgressEvent {
        ProgressEvent {
            status: "downloading".into(),
            downloaded_bytes: Some(done),
            total_bytes: Some(total),
            speed,
            percent_str: None,
        }
    }

    fn percent_only(text: &str) -> ProgressEvent {
        ProgressEvent {
            status: "downloading".into(),
            percent_str: Some(text.into()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_template_lines() {
        let line = r#"__PROGRESS__ {"status": "downloading", "downloaded_bytes": 1024, "total_bytes": 4096, "speed": 2097152.5, "_percent_str": " 25.0%", "eta": 3, "filename": "x.mp4"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.status, "downloading");
        assert_eq!(event.downloaded_bytes, Some(1024.0));
        assert_eq!(event.total_bytes, Some(4096.0));
        assert_eq!(event.speed, Some(2097152.5));
        assert_eq!(event.percent_str.as_deref(), Some(" 25.0%"));

        let event = parse_progress_line(r#"__PROGRESS__ {"status": "finished", "total_bytes": null}"#).unwrap();
        assert_eq!(event.status, "finished");
        assert_eq!(event.total_bytes, None);

        assert!(parse_progress_line("[youtube] abc: Downloading webpage").is_none());
        assert!(parse_progress_line("__PROGRESS__ {not json").is_none());
        assert!(parse_progress_line(r#"__PROGRESS__ {"downloaded_bytes": 3}"#).is_none());
    }

    #[test]
    fn byte_counts_drive_percent_and_rate() {
        let mut state = ProgressState::default();
        state.begin();
        state.apply(&downloading(512.0, 1024.0, Some(1.5 * 1024.0 * 1024.0)));
        assert_eq!(state.phase, Phase::Downloading);
        assert_eq!(state.percent, 50.0);
        assert_eq!(state.status, "Downloading: 50.0% (1.5 MB/s)");

        state.apply(&downloading(768.0, 1024.0, None));
        assert_eq!(state.percent, 75.0);
        assert_eq!(state.rate, None);
        assert_eq!(state.status, "Downloading: 75.0% (-- MB/s)");
    }

    #[test]
    fn percent_string_fallback() {
        let mut state = ProgressState::default();
        state.apply(&percent_only("\u{1b}[0;94m 42.5%\u{1b}[0m"));
        assert_eq!(state.percent, 42.5);
        assert_eq!(state.status, "Downloading: 42.5%");
    }

    #[test]
    fn not_available_percent_is_ignored() {
        let mut state = ProgressState::default();
        state.apply(&percent_only("30%"));
        let before = state.clone();

        state.apply(&percent_only("N/A"));
        assert_eq!(state, before);
        state.apply(&percent_only("  N/A%"));
        assert_eq!(state, before);
    }

    #[test]
    fn malformed_payloads_keep_last_good_state() {
        let mut state = ProgressState::default();
        state.apply(&downloading(10.0, 100.0, None));
        let before = state.clone();

        state.apply(&percent_only("abc"));
        state.apply(&downloading(10.0, 0.0, None));
        state.apply(&ProgressEvent {
            status: "downloading".into(),
            total_bytes: Some(100.0),
            ..Default::default()
        });
        state.apply(&ProgressEvent {
            status: "downloading".into(),
            ..Default::default()
        });
        state.apply(&ProgressEvent {
            status: "post_process".into(),
            ..Default::default()
        });
        assert_eq!(state, before);
    }

    #[test]
    fn finished_is_idempotent() {
        let finished = ProgressEvent {
            status: "finished".into(),
            ..Default::default()
        };
        let mut state = ProgressState::default();
        state.apply(&downloading(10.0, 100.0, None));
        state.apply(&finished);
        state.apply(&finished);
        assert_eq!(state.percent, 100.0);
        assert_eq!(state.phase, Phase::Finished);
    }

    #[test]
    fn error_keeps_percent() {
        let mut state = ProgressState::default();
        state.apply(&downloading(30.0, 100.0, None));
        state.apply(&ProgressEvent {
            status: "error".into(),
            ..Default::default()
        });
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.percent, 30.0);
        assert_eq!(state.status, "Download failed!");
    }

    #[test]
    fn rate_formatting() {
        assert_eq!(format_rate(Some(3.0 * 1024.0 * 1024.0)), "3.0 MB/s");
        assert_eq!(format_rate(Some(0.0)), "-- MB/s");
        assert_eq!(format_rate(None), "-- MB/s");
    }
}
