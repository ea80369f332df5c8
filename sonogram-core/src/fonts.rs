//! Label font registration for figure text.
//!
//! plotters draws text through ab_glyph and needs the font bytes registered
//! up front. Registration happens once per process; the first caller's
//! configured path wins. DejaVu Sans is compiled in and used whenever no
//! font is configured or the configured one cannot be loaded.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::FontStyle;

/// Family name every text style in the figure refers to.
pub const FONT_FAMILY: &str = "sans-serif";

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Which font ended up behind [`FONT_FAMILY`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelFont {
    Configured(PathBuf),
    Bundled,
    /// Nothing could be registered; figures are drawn without text.
    Unavailable,
}

static LABEL_FONT: OnceLock<LabelFont> = OnceLock::new();

/// Register the label font on first use and report which one is active.
pub fn label_font(configured: Option<&Path>) -> &'static LabelFont {
    LABEL_FONT.get_or_init(|| register(configured))
}

/// Whether figure text can be drawn.
pub fn labels_available(configured: Option<&Path>) -> bool {
    *label_font(configured) != LabelFont::Unavailable
}

fn register(configured: Option<&Path>) -> LabelFont {
    if let Some(path) = configured {
        match std::fs::read(path) {
            Ok(bytes) => {
                // plotters keeps a 'static reference to registered fonts.
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                if plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
                    log::debug!("label font: {}", path.display());
                    return LabelFont::Configured(path.to_path_buf());
                }
                log::warn!("{} is not a usable font, using DejaVu Sans", path.display());
            }
            Err(e) => log::warn!("cannot read font {}: {e}, using DejaVu Sans", path.display()),
        }
    }

    match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, BUNDLED_FONT) {
        Ok(()) => LabelFont::Bundled,
        Err(_) => {
            log::warn!("bundled font rejected; figures are rendered without text");
            LabelFont::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_font_falls_back_to_bundled() {
        let bogus = std::env::temp_dir().join(format!("sonogram-font-{}.ttf", std::process::id()));
        std::fs::write(&bogus, b"not a font").unwrap();

        assert_eq!(register(Some(&bogus)), LabelFont::Bundled);
        assert_eq!(register(Some(Path::new("/nonexistent/font.ttf"))), LabelFont::Bundled);

        std::fs::remove_file(&bogus).ok();
    }

    #[test]
    fn readable_font_file_is_used() {
        let copy = std::env::temp_dir().join(format!("sonogram-font-ok-{}.ttf", std::process::id()));
        std::fs::write(&copy, BUNDLED_FONT).unwrap();

        assert_eq!(register(Some(&copy)), LabelFont::Configured(copy.clone()));

        std::fs::remove_file(&copy).ok();
    }

    #[test]
    fn labels_work_without_configuration() {
        assert!(labels_available(None));
        assert!(labels_available(Some(Path::new("/nonexistent.ttf"))));
    }
}
