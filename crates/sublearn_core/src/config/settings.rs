//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::align::AlignMode;
use crate::logging::LogLevel;
use crate::subtitles::{AssColor, RoundingMode};
use crate::track::Role;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Output naming and log locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Parser acceptance thresholds.
    #[serde(default)]
    pub parse: ParseSettings,

    /// Alignment strategy selection and tuning.
    #[serde(default)]
    pub align: AlignSettings,

    /// Timeline composition.
    #[serde(default)]
    pub compose: ComposeSettings,

    /// Per-role presentation.
    #[serde(default)]
    pub styles: StyleSettings,

    /// Output document header values.
    #[serde(default)]
    pub document: DocumentSettings,

    /// Batch worker pool.
    #[serde(default)]
    pub batch: BatchSettings,
}

impl Settings {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let layout = &self.compose.layout;
        if layout.len() != Role::ALL.len() || Role::ALL.iter().any(|r| !layout.contains(r)) {
            return Err(format!(
                "compose.layout must list original, dub and native exactly once, got {:?}",
                layout
            ));
        }
        if !(0.0..=1.0).contains(&self.parse.min_coverage) {
            return Err(format!(
                "parse.min_coverage must be between 0 and 1, got {}",
                self.parse.min_coverage
            ));
        }
        if self.align.low_confidence_ratio <= 0.0 {
            return Err(format!(
                "align.low_confidence_ratio must be positive, got {}",
                self.align.low_confidence_ratio
            ));
        }
        if self.align.position_weight < 0.0 {
            return Err(format!(
                "align.position_weight must not be negative, got {}",
                self.align.position_weight
            ));
        }
        if self.document.wrap_style > 3 {
            return Err(format!(
                "document.wrap_style must be 0-3, got {}",
                self.document.wrap_style
            ));
        }
        Ok(())
    }
}

/// Output naming and log folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Suffix replacing the video extension in the output name.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Folder for per-file log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_suffix() -> String {
    "sublearn.ass".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for the global subscriber and job logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Write one log file per processed file in batch mode.
    #[serde(default)]
    pub per_file_logs: bool,

    /// Number of recent lines replayed when a file fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix job log lines with a wall-clock timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            per_file_logs: false,
            error_tail: default_error_tail(),
            show_timestamps: true,
        }
    }
}

/// Parser acceptance thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseSettings {
    /// Minimum parsed/seen block ratio for a track to be used (0.0 - 1.0).
    #[serde(default)]
    pub min_coverage: f64,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self { min_coverage: 0.0 }
    }
}

/// Alignment strategy selection and tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignSettings {
    /// `auto` selects from input provenance.
    #[serde(default)]
    pub strategy: AlignMode,

    /// Original/dub count ratio above which alignment is flagged.
    #[serde(default = "default_low_confidence_ratio")]
    pub low_confidence_ratio: f64,

    /// Weight of the positional prior in similarity matching.
    #[serde(default = "default_position_weight")]
    pub position_weight: f64,
}

fn default_low_confidence_ratio() -> f64 {
    2.0
}

fn default_position_weight() -> f64 {
    0.5
}

impl Default for AlignSettings {
    fn default() -> Self {
        Self {
            strategy: AlignMode::default(),
            low_confidence_ratio: default_low_confidence_ratio(),
            position_weight: default_position_weight(),
        }
    }
}

/// Timeline composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeSettings {
    /// Roles from top of screen to bottom.
    #[serde(default = "default_layout")]
    pub layout: Vec<Role>,

    /// Minimum gap between consecutive cues of a role (0 = off).
    #[serde(default)]
    pub min_gap_ms: u64,

    /// Shortest duration an overlap-corrected event may have.
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
}

fn default_layout() -> Vec<Role> {
    Role::ALL.to_vec()
}

fn default_min_duration_ms() -> u64 {
    100
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            min_gap_ms: 0,
            min_duration_ms: default_min_duration_ms(),
        }
    }
}

impl ComposeSettings {
    /// Vertical slot of a role (0 = top).
    pub fn slot_of(&self, role: Role) -> usize {
        self.layout
            .iter()
            .position(|&r| r == role)
            .unwrap_or_else(|| role.layer() as usize)
    }
}

/// Presentation of one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    #[serde(default = "default_fontname")]
    pub fontname: String,

    #[serde(default = "default_fontsize")]
    pub fontsize: f64,

    /// Text color (`&HAABBGGRR`).
    #[serde(default = "default_white")]
    pub primary_color: AssColor,

    /// Outline color (`&HAABBGGRR`).
    #[serde(default = "default_black")]
    pub outline_color: AssColor,

    /// Shadow color (`&HAABBGGRR`).
    #[serde(default = "default_black")]
    pub back_color: AssColor,

    #[serde(default)]
    pub bold: bool,

    #[serde(default)]
    pub italic: bool,

    /// Outline width.
    #[serde(default = "default_outline")]
    pub outline: f64,

    /// Shadow depth.
    #[serde(default = "default_shadow")]
    pub shadow: f64,

    /// Vertical margin from the anchored edge.
    #[serde(default = "default_margin_v")]
    pub margin_v: i32,
}

fn default_fontname() -> String {
    "Arial".to_string()
}

fn default_fontsize() -> f64 {
    20.0
}

fn default_white() -> AssColor {
    AssColor::from_rgb(255, 255, 255)
}

fn default_black() -> AssColor {
    AssColor::from_rgb(0, 0, 0)
}

fn default_outline() -> f64 {
    1.0
}

fn default_shadow() -> f64 {
    0.5
}

fn default_margin_v() -> i32 {
    10
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            fontname: default_fontname(),
            fontsize: default_fontsize(),
            primary_color: default_white(),
            outline_color: default_black(),
            back_color: default_black(),
            bold: false,
            italic: false,
            outline: default_outline(),
            shadow: default_shadow(),
            margin_v: default_margin_v(),
        }
    }
}

impl StyleSpec {
    fn sized(fontsize: f64, primary_color: AssColor) -> Self {
        Self {
            fontsize,
            primary_color,
            ..Default::default()
        }
    }
}

/// Per-role styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSettings {
    #[serde(default = "default_original_style")]
    pub original: StyleSpec,

    #[serde(default = "default_dub_style")]
    pub dub: StyleSpec,

    #[serde(default = "default_native_style")]
    pub native: StyleSpec,
}

fn default_original_style() -> StyleSpec {
    StyleSpec::sized(20.0, AssColor::from_rgb(255, 255, 255)) // White
}

fn default_dub_style() -> StyleSpec {
    StyleSpec::sized(24.0, AssColor::from_rgb(255, 255, 0)) // Yellow
}

fn default_native_style() -> StyleSpec {
    StyleSpec::sized(22.0, AssColor::from_rgb(0, 255, 255)) // Cyan
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            original: default_original_style(),
            dub: default_dub_style(),
            native: default_native_style(),
        }
    }
}

impl StyleSettings {
    /// Style for a role.
    pub fn for_role(&self, role: Role) -> &StyleSpec {
        match role {
            Role::Original => &self.original,
            Role::Dub => &self.dub,
            Role::Native => &self.native,
        }
    }
}

/// Output document header values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    #[serde(default = "default_title")]
    pub title: String,

    /// Script resolution; omitted from the header when unset.
    #[serde(default)]
    pub play_res_x: Option<u32>,

    #[serde(default)]
    pub play_res_y: Option<u32>,

    /// ASS WrapStyle (0-3).
    #[serde(default)]
    pub wrap_style: u8,

    #[serde(default = "default_true")]
    pub scaled_border_and_shadow: bool,

    /// Millisecond to centisecond rounding.
    #[serde(default)]
    pub rounding: RoundingMode,
}

fn default_title() -> String {
    "Sublearn merged subtitles".to_string()
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            play_res_x: None,
            play_res_y: None,
            wrap_style: 0,
            scaled_border_and_shadow: true,
            rounding: RoundingMode::default(),
        }
    }
}

/// Batch worker pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Worker threads (0 = available cores).
    #[serde(default)]
    pub workers: usize,
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Parse,
    Align,
    Compose,
    Styles,
    Document,
    Batch,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 8] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Parse,
        ConfigSection::Align,
        ConfigSection::Compose,
        ConfigSection::Styles,
        ConfigSection::Document,
        ConfigSection::Batch,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Parse => "parse",
            ConfigSection::Align => "align",
            ConfigSection::Compose => "compose",
            ConfigSection::Styles => "styles",
            ConfigSection::Document => "document",
            ConfigSection::Batch => "batch",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output naming and log locations",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Parse => "Parser acceptance",
            ConfigSection::Align => "Alignment: auto, pass-through, proportional-cadence, similarity-matched",
            ConfigSection::Compose => "Timeline composition (layout lists roles top to bottom)",
            ConfigSection::Styles => "Per-role styles (colors are &HAABBGGRR)",
            ConfigSection::Document => "Output document header",
            ConfigSection::Batch => "Batch worker pool (0 = all cores)",
        }
    }
}
