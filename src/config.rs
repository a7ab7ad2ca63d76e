//! Environment-driven configuration.
//!
//! All keys are optional with working defaults; a `.env` file is honored
//! when present. Template file names inside the slide library are fixed
//! (`individual_template.pptx`, `theme_slide.pptx`, `constant_slide.pptx`).

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address (DECKGEN_ADDR)
    pub addr: String,
    /// Slide library: templates plus saved per-person slides (DECKGEN_SLIDES_DIR)
    pub slides_dir: PathBuf,
    /// Assembled output location (DECKGEN_OUTPUT_DIR)
    pub output_dir: PathBuf,
    /// Tag overlay images (DECKGEN_ASSETS_DIR)
    pub assets_dir: PathBuf,
    /// Member ledger CSV (DECKGEN_LEDGER)
    pub ledger_path: PathBuf,
    /// Identifier prefix (DECKGEN_ID_PREFIX)
    pub id_prefix: String,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let var = |key: &str, default: &str| {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let slides_dir = PathBuf::from(var("DECKGEN_SLIDES_DIR", "slides"));
        let ledger_path = std::env::var("DECKGEN_LEDGER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| slides_dir.join("members.csv"));

        Self {
            addr: var("DECKGEN_ADDR", "127.0.0.1:8080"),
            output_dir: PathBuf::from(var("DECKGEN_OUTPUT_DIR", "output")),
            assets_dir: PathBuf::from(var("DECKGEN_ASSETS_DIR", "assets")),
            ledger_path,
            id_prefix: var("DECKGEN_ID_PREFIX", "BNIP"),
            slides_dir,
        }
    }

    /// Create the working directories if they do not exist yet.
    pub fn bootstrap_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.slides_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::create_dir_all(&self.assets_dir)?;
        Ok(())
    }
}
