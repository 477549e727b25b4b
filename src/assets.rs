use std::borrow::Cow;

use rust_embed::RustEmbed;
use tracing::warn;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

const FALLBACK_HELP: &str = "Paste a video URL, pick a quality and format, choose a folder and press Download.";

/// Text for the information panel
pub fn help_text() -> Cow<'static, str> {
    let Some(file) = Asset::get("help.txt") else {
        warn!("help.txt missing from embedded assets");
        return Cow::Borrowed(FALLBACK_HELP);
    };
    match file.data {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}
