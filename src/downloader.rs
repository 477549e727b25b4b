use std::{io::ErrorKind, path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    process::Command,
};
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    progress::{ProgressSink, parse_progress_line},
    request::DownloadOptions,
};

/// Something that can fetch a URL with the given options, reporting progress as it goes
#[async_trait]
pub trait Backend: Send + Sync {
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        sink: &dyn ProgressSink,
    ) -> Result<(), AppError>;
}

/// Reads one line, decoding invalid UTF-8 lossily so odd titles never stop the reader.
async fn read_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf[..]);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

/// The yt-dlp executable, driven as a child process
#[derive(Clone, Debug)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> AppError {
        if err.kind() == ErrorKind::NotFound {
            AppError::DownloadLibrary(format!(
                "{} not found. Install it with: pip install yt-dlp",
                self.binary.display()
            ))
        } else {
            AppError::Unexpected(format!("failed to start {}: {err}", self.binary.display()))
        }
    }

    /// Asks the executable for its version; used to check it is installed.
    pub async fn version(&self) -> Result<String, AppError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(AppError::DownloadLibrary(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

#[async_trait]
impl Backend for YtDlp {
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        sink: &dyn ProgressSink,
    ) -> Result<(), AppError> {
        let args = options.to_args(url);
        info!(binary = %self.binary.display(), ?args, "starting yt-dlp");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::Unexpected("yt-dlp stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::Unexpected("yt-dlp stderr was not captured".into()))?;

        // Drained on its own task so a chatty stderr can't block stdout
        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            let mut last_error = None;
            let mut last_line = None;
            loop {
                let line = match read_lossy_line(&mut reader, &mut buf).await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        warn!(%err, "stopped reading yt-dlp stderr");
                        break;
                    }
                };
                debug!(target: "ytdlp_gui::yt_dlp", "stderr> {line}");
                if let Some(message) = line.strip_prefix("ERROR: ") {
                    last_error = Some(message.trim().to_owned());
                } else if !line.trim().is_empty() {
                    last_line = Some(line.trim().to_owned());
                }
            }
            last_error.or(last_line)
        });

        {
            // Dropped before waiting so an early exit closes the pipe instead of stalling yt-dlp
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                match read_lossy_line(&mut reader, &mut buf).await {
                    Ok(Some(line)) => match parse_progress_line(&line) {
                        Some(event) => sink.on_progress(event),
                        None => debug!(target: "ytdlp_gui::yt_dlp", "stdout> {line}"),
                    },
                    Ok(None) => break,
                    Err(err) => {
                        warn!(%err, "stopped reading yt-dlp output");
                        break;
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| AppError::Unexpected(format!("waiting for yt-dlp: {e}")))?;
        let tail = stderr_task.await.ok().flatten();

        if status.success() {
            info!(%url, "yt-dlp finished");
            Ok(())
        } else {
            let message = tail.unwrap_or_else(|| format!("yt-dlp exited with {status}"));
            warn!(%url, %status, %message, "yt-dlp failed");
            Err(AppError::DownloadLibrary(message))
        }
    }
}
