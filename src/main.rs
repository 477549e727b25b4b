//! Desktop front-end for yt-dlp

// Embedded help text
mod assets;
// yt-dlp child process driver
mod downloader;
// Error taxonomy shown in the notification window
mod error;
// Form choices and download request types
mod model;
// Progress event parsing and progress bar state
mod progress;
// Quality/format to yt-dlp option mapping and input checks
mod request;
// Start-up defaults
mod settings;
// Colours and skins
mod theme;
// Single background download and its UI message queue
mod worker;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
// eframe/egui for GUI application framework
use eframe::{App, Frame, egui};
use egui::{Align2, RichText};
// OnceCell for single-time runtime initialization
use once_cell::sync::OnceCell;
// FileDialog for folder selection dialogs
use rfd::FileDialog;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use downloader::YtDlp;
use model::{DownloadRequest, OutputFormat, QualityPreset};
use settings::{DEFAULT_LOG_FILTER, Settings};
use theme::Skin;
use worker::{DownloadController, NoticeKind};

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

const TITLE: &str = "YT-DLP Video Downloader";

/// Program entry point: initializes logging and the runtime, then launches the GUI
fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = Runtime::new().context("failed to start the tokio runtime")?;
    let runtime = RUNTIME.get_or_init(|| runtime);

    let settings = Settings::default();
    let ytdlp = YtDlp::new(settings.ytdlp_binary.clone());
    let missing_ytdlp = match runtime.block_on(ytdlp.version()) {
        Ok(version) => {
            info!(%version, "found yt-dlp");
            None
        }
        Err(err) => {
            warn!(%err, "yt-dlp is not available");
            Some(err.to_string())
        }
    };

    let controller = DownloadController::new(Arc::new(ytdlp), runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(settings.skin.visuals());
            Box::new(DownloaderApp::new(settings, controller, missing_ytdlp))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the window: {e}"))
}

/// Application state for the GUI
struct DownloaderApp {
    /// Contents of the URL field
    url_input: String,
    /// Destination folder field
    download_dir: String,
    quality: QualityPreset,
    format: OutputFormat,
    skin: Skin,
    controller: DownloadController,
    help: String,
    /// Set when the start-up yt-dlp probe failed
    missing_ytdlp: Option<String>,
}

impl DownloaderApp {
    fn new(settings: Settings, controller: DownloadController, missing_ytdlp: Option<String>) -> Self {
        Self {
            url_input: String::new(),
            download_dir: settings.download_dir.display().to_string(),
            quality: settings.quality,
            format: settings.format,
            skin: settings.skin,
            controller,
            help: assets::help_text().into_owned(),
            missing_ytdlp,
        }
    }

    fn start_download(&mut self) {
        let request = DownloadRequest {
            url: self.url_input.clone(),
            quality: self.quality,
            format: self.format,
            destination: PathBuf::from(self.download_dir.trim()),
        };
        match self.controller.start(request) {
            Ok(true) => {}
            Ok(false) => debug!("download button pressed while busy"),
            // Already queued as a notice by the controller
            Err(err) => debug!(%err, "download not started"),
        }
    }

    fn browse_directory(&mut self) {
        if let Some(folder) = FileDialog::new()
            .set_directory(&self.download_dir)
            .pick_folder()
        {
            self.download_dir = folder.display().to_string();
        }
    }

    fn section_label(ui: &mut egui::Ui, text: &str) {
        ui.label(RichText::new(text).size(15.0).strong());
        ui.add_space(4.0);
    }

    fn url_section(&mut self, ui: &mut egui::Ui) {
        self.skin.section().show(ui, |ui| {
            Self::section_label(ui, "🎬 Video URL:");
            ui.add(
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text(request::URL_PLACEHOLDER)
                    .text_color(theme::TEXT)
                    .desired_width(f32::INFINITY),
            );
        });
    }

    fn options_section(&mut self, ui: &mut egui::Ui) {
        self.skin.section().show(ui, |ui| {
            ui.set_width(ui.available_width());
            Self::section_label(ui, "🎯 Quality:");
            egui::ComboBox::from_id_source("quality")
                .selected_text(self.quality.label())
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for quality in QualityPreset::ALL {
                        ui.selectable_value(&mut self.quality, quality, quality.label());
                    }
                });

            ui.add_space(10.0);
            Self::section_label(ui, "📁 Output Format:");
            egui::ComboBox::from_id_source("format")
                .selected_text(self.format.as_str())
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for format in OutputFormat::CHOICES {
                        ui.selectable_value(&mut self.format, format, format.as_str());
                    }
                });
        });
    }

    fn path_section(&mut self, ui: &mut egui::Ui) {
        self.skin.section().show(ui, |ui| {
            Self::section_label(ui, "📂 Download Directory:");
            ui.horizontal(|ui| {
                let browse_width = 90.0;
                ui.add(
                    egui::TextEdit::singleline(&mut self.download_dir)
                        .text_color(theme::TEXT)
                        .desired_width(ui.available_width() - browse_width),
                );
                let browse = egui::Button::new(RichText::new("Browse").strong())
                    .rounding(self.skin.rounding());
                if ui.add_sized([browse_width - 8.0, 24.0], browse).clicked() {
                    self.browse_directory();
                }
            });
        });
    }

    fn progress_section(&self, ui: &mut egui::Ui) {
        let state = self.controller.state();
        self.skin.section().show(ui, |ui| {
            Self::section_label(ui, "📊 Progress:");
            ui.add(egui::ProgressBar::new(state.percent / 100.0).fill(theme::SUCCESS));
            ui.add_space(6.0);
            ui.vertical_centered(|ui| ui.label(state.status.as_str()));
        });
    }

    fn download_button(&mut self, ui: &mut egui::Ui) {
        let busy = self.controller.is_busy();
        let text = if busy { "⏳ Downloading..." } else { "⬇ Download" };
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new(text).size(20.0).strong())
                .fill(theme::SUCCESS)
                .rounding(self.skin.rounding())
                .min_size(egui::vec2(220.0, 48.0));
            let response = ui.add_enabled(!busy, button);
            if response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if response.clicked() {
                self.start_download();
            }
        });
    }

    fn info_section(&self, ui: &mut egui::Ui) {
        self.skin.section().show(ui, |ui| {
            Self::section_label(ui, "ℹ Information:");
            egui::Frame::none()
                .fill(theme::LIGHT)
                .rounding(self.skin.rounding())
                .inner_margin(egui::Margin::same(6.0))
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false; 2])
                        .show(ui, |ui| {
                            ui.label(RichText::new(&self.help).color(theme::TEXT).monospace());
                        });
                });
        });
    }

    fn notice_window(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.controller.notice().cloned() else {
            return;
        };
        let colour = match notice.kind {
            NoticeKind::Info => theme::SUCCESS,
            NoticeKind::Error => theme::ERROR,
        };
        let mut dismissed = false;
        egui::Window::new(RichText::new(&notice.title).color(colour).strong())
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(notice.message.as_str());
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            self.controller.dismiss_notice();
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // Apply whatever the worker posted since the last frame
        self.controller.poll();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(RichText::new(TITLE).size(24.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let before = self.skin;
                    egui::ComboBox::from_id_source("skin")
                        .selected_text(self.skin.label())
                        .show_ui(ui, |ui| {
                            for skin in Skin::ALL {
                                ui.selectable_value(&mut self.skin, skin, skin.label());
                            }
                        });
                    if self.skin != before {
                        ctx.set_visuals(self.skin.visuals());
                    }
                });
            });
            if let Some(problem) = &self.missing_ytdlp {
                ui.colored_label(theme::WARNING, format!("⚠ {problem}"));
            }
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 12.0;
            self.url_section(ui);
            self.options_section(ui);
            self.path_section(ui);
            self.progress_section(ui);
            self.download_button(ui);
            self.info_section(ui);
        });

        self.notice_window(ctx);

        // Keep polling the worker channel
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
