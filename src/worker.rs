//! Runs one download at a time and relays its progress back to the UI thread.
//!
//! The worker task never touches [`ProgressState`] itself. It posts
//! [`UiMessage`]s on a channel which the UI drains once per frame with
//! [`DownloadController::poll`], so every visible change happens on the UI thread.

use std::sync::Arc;

use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
use tracing::{error, info, warn};

use crate::{
    downloader::Backend,
    error::AppError,
    model::{DownloadRequest, Phase},
    progress::{ProgressEvent, ProgressSink, ProgressState},
    request,
};

/// Messages posted from the worker to the UI thread
#[derive(Debug)]
pub enum UiMessage {
    Progress(ProgressEvent),
    /// Sent exactly once per download, whatever the outcome
    Completed(Result<(), AppError>),
}

/// Forwards progress into the UI queue and does nothing else
struct ChannelSink {
    tx: UnboundedSender<UiMessage>,
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, event: ProgressEvent) {
        // The receiver only goes away when the app is shutting down
        let _ = self.tx.send(UiMessage::Progress(event));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Modal message waiting to be acknowledged
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn error(err: &AppError) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: err.title().to_owned(),
            message: err.to_string(),
        }
    }
}

/// Owns the download state shown by the UI
pub struct DownloadController {
    backend: Arc<dyn Backend>,
    runtime: Handle,
    tx: UnboundedSender<UiMessage>,
    rx: UnboundedReceiver<UiMessage>,
    state: ProgressState,
    in_flight: bool,
    notice: Option<Notice>,
}

impl DownloadController {
    pub fn new(backend: Arc<dyn Backend>, runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            backend,
            runtime,
            tx,
            rx,
            state: ProgressState::default(),
            in_flight: false,
            notice: None,
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// True from the moment a worker is spawned until its completion is applied
    pub fn is_busy(&self) -> bool {
        self.in_flight || self.state.phase == Phase::Downloading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Starts a download for `request`.
    ///
    /// Returns `Ok(false)` without doing anything while another download is
    /// running. Validation and directory errors are returned before any work
    /// is spawned and are also queued as a notice.
    pub fn start(&mut self, request: DownloadRequest) -> Result<bool, AppError> {
        if self.is_busy() {
            warn!("download already in progress, ignoring start");
            return Ok(false);
        }

        let (url, options) = match request::prepare(&request) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(%err, "rejected download request");
                self.notice = Some(Notice::error(&err));
                return Err(err);
            }
        };

        self.state.begin();
        self.in_flight = true;
        info!(%url, quality = %request.quality, format = %request.format, "download started");

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let runtime = self.runtime.clone();
        self.runtime.spawn(async move {
            let sink = ChannelSink { tx: tx.clone() };
            // Nested task so a panic in the backend still produces a completion
            let job = runtime.spawn(async move { backend.download(&url, &options, &sink).await });
            let outcome = match job.await {
                Ok(outcome) => outcome,
                Err(err) => Err(AppError::Unexpected(err.to_string())),
            };
            let _ = tx.send(UiMessage::Completed(outcome));
        });
        Ok(true)
    }

    /// Applies everything the worker has posted so far. Call from the UI thread.
    pub fn poll(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
        }
    }

    fn apply(&mut self, message: UiMessage) {
        match message {
            UiMessage::Progress(event) => self.state.apply(&event),
            UiMessage::Completed(Ok(())) => {
                info!("download completed");
                self.in_flight = false;
                self.state.finish();
                self.notice = Some(Notice {
                    kind: NoticeKind::Info,
                    title: "Success".to_owned(),
                    message: "Download completed successfully!".to_owned(),
                });
            }
            UiMessage::Completed(Err(err)) => {
                error!(%err, "download failed");
                self.in_flight = false;
                self.state.fail();
                self.notice = Some(Notice::error(&err));
            }
        }
    }
}
