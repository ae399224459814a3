use std::path::{Path, PathBuf};
use std::sync::Mutex;
use plotters::style::{register_font, FontStyle};
use super::RenderError;

/// Family name every text element is drawn with.
pub const FAMILY : &str = "sans-serif";

/// TrueType files tried, in order, when the configuration names none.
pub const DEFAULT_FONTS : [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf"
];

// Font files read so far. Each path is read and leaked at most once per process.
static LOADED : Mutex<Vec<(PathBuf, &'static [u8])>> = Mutex::new(Vec::new());

pub fn default_fonts() -> Vec<PathBuf> {
    DEFAULT_FONTS.iter().map(PathBuf::from).collect()
}

/// First candidate that exists on disk.
pub fn locate(candidates : &[PathBuf]) -> Option<&Path> {
    candidates.iter().map(|p| p.as_path() ).find(|p| p.is_file() )
}

/// Contents of the font file at path. Repeated calls with the same path
/// return the same buffer.
pub fn load(path : &Path) -> Result<&'static [u8], RenderError> {
    let mut loaded = LOADED.lock()
        .map_err(|_| RenderError::Font(String::from("font cache lock poisoned")) )?;
    if let Some((_, bytes)) = loaded.iter().find(|(p, _)| p == path ) {
        return Ok(*bytes);
    }
    let bytes = std::fs::read(path)
        .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)) )?;
    let bytes : &'static [u8] = Box::leak(bytes.into_boxed_slice());
    loaded.push((path.to_path_buf(), bytes));
    Ok(bytes)
}

/// Loads the first available candidate and registers it as the sans-serif
/// family for both regular and bold text.
pub fn register_sans_serif(candidates : &[PathBuf]) -> Result<PathBuf, RenderError> {
    let path = locate(candidates).ok_or_else(|| {
        RenderError::Font(format!("none of {} candidate font files exist", candidates.len()))
    })?;
    let bytes = load(path)?;
    for style in [FontStyle::Normal, FontStyle::Bold].iter() {
        register_font(FAMILY, *style, bytes)
            .map_err(|_| RenderError::Font(format!("{}: not a valid TrueType font", path.display())) )?;
    }
    tracing::debug!(path = %path.display(), "font registered");
    Ok(path.to_path_buf())
}
