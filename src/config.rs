//! Process-wide configuration and the equation-numbering counter.
//!
//! The configuration is a snapshot: every render entry point calls
//! [`snapshot`] exactly once and threads the copy through the layout pass, so
//! a concurrent [`set`] cannot produce a half-updated render.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use once_cell::sync::Lazy;

/// Horizontal alignment of lines in mixed-text blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Halign {
    Left,
    Center,
    Right,
}

/// Settings for math spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathConfig {
    /// Path to the OpenType math font. `None` means the embedder supplies a
    /// [`FontContext`](crate::font::FontContext) directly.
    pub mathfont: Option<PathBuf>,
    /// Default `mathvariant` applied when the input does not specify one.
    pub variant: Option<String>,
    /// Font size in pixels per em.
    pub fontsize: f64,
    pub color: String,
    pub background: Option<String>,
}

/// Settings for prose spans in mixed text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    pub textfont: Option<PathBuf>,
    pub variant: Option<String>,
    pub fontsize: f64,
    pub color: String,
    /// Leading between lines as a multiple of the font size.
    pub linespacing: f64,
}

/// Equation numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberingConfig {
    /// Number every top-level render automatically.
    pub autonumber: bool,
    /// Format string; `{}` is replaced by the counter value.
    pub format: String,
    /// Overrides `format` when set.
    #[serde(skip)]
    pub format_func: Option<fn(u64) -> String>,
    /// Width of the column the equation is centered in and the tag is
    /// right-aligned to, e.g. `"6.5in"`.
    pub columnwidth: String,
}

/// The process-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Emit `<symbol>`/`<use>` (SVG 2). When false every glyph is inlined as
    /// a `<path>`, which some legacy SVG 1.1 consumers require.
    pub svg2: bool,
    /// Decimal places written for numeric SVG attributes.
    pub precision: u8,
    /// Scripts never shrink below this fraction of the root font size.
    pub min_size_fraction: f64,
    /// `'.'` or `','`; with `','` a comma between digits in `<mn>` is a
    /// decimal mark and gets no trailing space.
    pub decimal_separator: char,
    pub math: MathConfig,
    pub text: TextConfig,
    pub numbering: NumberingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            svg2: true,
            precision: 4,
            min_size_fraction: 0.3,
            decimal_separator: '.',
            math: MathConfig {
                mathfont: None,
                variant: None,
                fontsize: 24.0,
                color: "black".to_string(),
                background: None,
            },
            text: TextConfig {
                textfont: None,
                variant: None,
                fontsize: 24.0,
                color: "black".to_string(),
                linespacing: 1.2,
            },
            numbering: NumberingConfig {
                autonumber: false,
                format: "({})".to_string(),
                format_func: None,
                columnwidth: "6.5in".to_string(),
            },
        }
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Returns a copy of the current configuration.
pub fn snapshot() -> Config {
    CONFIG.read().expect("config lock poisoned").clone()
}

/// Replaces the configuration wholesale.
pub fn set(config: Config) {
    *CONFIG.write().expect("config lock poisoned") = config;
}

/// Applies an in-place update to the configuration.
pub fn update(f: impl FnOnce(&mut Config)) {
    f(&mut CONFIG.write().expect("config lock poisoned"));
}

// The equation counter stores the number the *next* autonumbered equation
// will receive.
static EQUATION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Takes the next equation number and advances the counter.
pub fn next_equation_number() -> u64 {
    EQUATION_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Resets the counter so that the next equation is numbered `n`.
pub fn reset_numbering(n: u64) {
    EQUATION_COUNTER.store(n, Ordering::SeqCst);
}

/// Formats an equation number with the configured format.
pub fn format_equation_number(config: &Config, n: u64) -> String {
    if let Some(func) = config.numbering.format_func {
        return func(n);
    }
    config.numbering.format.replacen("{}", &n.to_string(), 1)
}
