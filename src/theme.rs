//! Blue colour scheme and the two window skins.

use eframe::egui::{self, Color32, Rounding, Stroke, Visuals};

pub const PRIMARY: Color32 = Color32::from_rgb(0x1e, 0x40, 0xaf);
pub const SECONDARY: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
pub const ACCENT: Color32 = Color32::from_rgb(0x60, 0xa5, 0xfa);
pub const DARK: Color32 = Color32::from_rgb(0x1e, 0x3a, 0x8a);
pub const LIGHT: Color32 = Color32::from_rgb(0xdb, 0xea, 0xfe);
pub const TEXT: Color32 = Color32::from_rgb(0x1f, 0x29, 0x37);
pub const SUCCESS: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
pub const ERROR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
pub const WARNING: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
pub const HOVER_LIGHT: Color32 = Color32::from_rgb(0x93, 0xc5, 0xfd);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skin {
    /// Raised section frames, square buttons
    Classic,
    /// Flat sections with rounded corners and softer hover colours
    Zen,
}

impl Skin {
    pub const ALL: [Skin; 2] = [Skin::Classic, Skin::Zen];

    pub fn label(self) -> &'static str {
        match self {
            Skin::Classic => "Classic",
            Skin::Zen => "Zen",
        }
    }

    pub fn rounding(self) -> Rounding {
        match self {
            Skin::Classic => Rounding::same(2.0),
            Skin::Zen => Rounding::same(12.0),
        }
    }

    fn hover(self) -> Color32 {
        match self {
            Skin::Classic => DARK,
            Skin::Zen => HOVER_LIGHT,
        }
    }

    pub fn visuals(self) -> Visuals {
        let mut visuals = Visuals::dark();
        visuals.panel_fill = PRIMARY;
        visuals.window_fill = SECONDARY;
        visuals.extreme_bg_color = LIGHT;
        visuals.override_text_color = Some(Color32::WHITE);
        visuals.selection.bg_fill = ACCENT;

        let rounding = self.rounding();
        let widgets = &mut visuals.widgets;
        widgets.inactive.weak_bg_fill = ACCENT;
        widgets.inactive.bg_fill = ACCENT;
        widgets.hovered.weak_bg_fill = self.hover();
        widgets.hovered.bg_fill = self.hover();
        widgets.active.weak_bg_fill = DARK;
        for w in [
            &mut widgets.noninteractive,
            &mut widgets.inactive,
            &mut widgets.hovered,
            &mut widgets.active,
            &mut widgets.open,
        ] {
            w.rounding = rounding;
        }
        visuals.window_rounding = rounding;
        visuals
    }

    /// Frame around one form section
    pub fn section(self) -> egui::Frame {
        let stroke = match self {
            Skin::Classic => Stroke::new(2.0, DARK),
            Skin::Zen => Stroke::NONE,
        };
        egui::Frame::none()
            .fill(SECONDARY)
            .stroke(stroke)
            .rounding(self.rounding())
            .inner_margin(egui::Margin::symmetric(20.0, 15.0))
    }
}
