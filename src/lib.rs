//! sigblock: email signature blocks for municipal staff
//!
//! Turns raw identity fields (name, role, department, phone, address and an
//! optional photo) into the display strings of a signature block, renders the
//! block as a preview document and exports it as a PNG image.
//!
//! # Features
//!
//! - **Formatting**: pure normalization helpers in [`format`]
//! - **Form state**: immutable [`state::FormState`] with reducer transitions
//! - **Export** (`render` feature, default): preview markup, layout and PNG
//!   rasterization without a browser
//!
//! # Example
//!
//! ```no_run
//! use sigblock::export::{DirectorySink, Exporter, PreviewDocument};
//! use sigblock::fields::Field;
//! use sigblock::preview::SignaturePreview;
//! use sigblock::state::{Action, FormState};
//! use sigblock::ExportConfig;
//!
//! # async fn run() -> sigblock::Result<()> {
//! let config = ExportConfig::default();
//! let state = FormState::default()
//!     .apply(Action::SetField(Field::Name, "maria da silva santos".into()))
//!     .apply(Action::SetField(Field::Role, "analista de sistemas".into()))
//!     .apply(Action::SetField(Field::Department, "SMCTIC".into()))
//!     .apply(Action::SetField(Field::Phone, "21988887777".into()))
//!     .apply(Action::SetField(Field::Address, "Rua General Bocaiúva, 636".into()));
//!
//! let preview = SignaturePreview::new(&state, &config);
//! let mut surface = PreviewDocument::from_preview(&preview)?;
//! let mut sink = DirectorySink::new(".");
//! let exporter = Exporter::with_default_loader(&config);
//! let (state, report) = exporter.download(state, &mut surface, &mut sink).await;
//! println!("{} -> {:?}", state.button().label(), report?.path);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod avatar;
pub mod department;
pub mod fields;
pub mod format;
pub mod settle;
pub mod state;

// Preview document, asset loading and rasterization
#[cfg(feature = "render")]
pub mod assets;
#[cfg(feature = "render")]
pub mod dom;
#[cfg(feature = "render")]
pub mod export;
#[cfg(feature = "render")]
pub mod preview;
#[cfg(feature = "render")]
pub mod rendering;

/// Widest image [`ExportConfig::validate`] accepts, in pixels.
pub const MAX_WIDTH: u32 = 4096;

/// Configuration for signature export
///
/// The defaults reproduce the municipal layout: a 700px wide image on a white
/// background saved as `assinatura-email.png`. Every field may be overridden
/// from a JSON file (see [`ExportConfig::from_json_file`]); missing keys keep
/// their defaults.
///
/// # Examples
///
/// ```
/// let cfg = sigblock::ExportConfig::default();
/// assert_eq!(cfg.width, 700);
/// assert_eq!(cfg.file_name, "assinatura-email.png");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Fixed image width in pixels; the height follows the content
    pub width: u32,
    /// Background color as a CSS hex string
    pub background: String,
    /// File name handed to the download sink
    pub file_name: String,
    /// How long success/failure labels stay on the button, in milliseconds
    pub revert_delay_ms: u64,
    /// Organization logo shown in the header; the organization name is
    /// printed instead when unset
    pub logo_path: Option<PathBuf>,
    /// Organization name used as logo alt text
    pub organization: String,
    /// Directory that relative image sources resolve against
    pub asset_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 700,
            background: "#ffffff".to_string(),
            file_name: "assinatura-email.png".to_string(),
            revert_delay_ms: 3000,
            logo_path: None,
            organization: "Prefeitura Municipal de Itaguaí".to_string(),
            asset_dir: None,
        }
    }
}

impl ExportConfig {
    /// Load from a JSON file layered over the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        let cfg: ExportConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(Error::ConfigError(format!(
                "width must be between 1 and {}: {}",
                MAX_WIDTH, self.width
            )));
        }
        if !self.file_name.to_ascii_lowercase().ends_with(".png") {
            return Err(Error::ConfigError(format!(
                "file name must end in .png: {}",
                self.file_name
            )));
        }
        let hex = self.background.trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 3) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::ConfigError(format!(
                "background must be a hex color: {}",
                self.background
            )));
        }
        Ok(())
    }

    pub fn revert_delay(&self) -> Duration {
        Duration::from_millis(self.revert_delay_ms)
    }
}
