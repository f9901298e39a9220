//! Per-file pipeline.
//!
//! Runs the stages strictly in order, each consuming the complete output
//! of the previous one:
//!
//! ```text
//! parse ─► validate ─► align ─► native ─► normalize ─► compose ─► write
//! ```
//!
//! Non-fatal conditions accumulate in a [`Diagnostics`] report returned
//! with the output. Any fatal error stops only this file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::align::{create_aligner, AlignConfig, AlignError, AlignStrategy, Provenance};
use crate::config::Settings;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::merge::{build_document, compose};
use crate::subtitles::{
    decode_source, parse_content, write_ass, ParseError, SubtitleError, SubtitleFormat,
    WriteOptions,
};
use crate::track::{Role, Track, TrackValidationError};

/// Raw subtitle text for one track, as handed over by a source provider.
#[derive(Debug, Clone)]
pub struct TrackSource {
    pub text: String,
    /// Language code (e.g. "en").
    pub language: String,
    /// How the subtitle was obtained; drives strategy selection.
    pub provenance: Provenance,
    /// Parse as this format instead of detecting it from the content.
    pub format: Option<SubtitleFormat>,
}

impl TrackSource {
    pub fn new(text: impl Into<String>, language: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            provenance,
            format: None,
        }
    }

    /// Read a subtitle file, decoding its bytes and taking the format
    /// from the extension when it is a known one.
    pub fn read(
        path: impl AsRef<Path>,
        language: impl Into<String>,
        provenance: Provenance,
    ) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| SubtitleError::read(path, e))?;
        let text = decode_source(&bytes)?;

        Ok(Self {
            text,
            language: language.into(),
            provenance,
            format: SubtitleFormat::from_extension(path),
        })
    }

    pub fn with_format(mut self, format: SubtitleFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Translator output for the Native track, one text per Dub cue.
#[derive(Debug, Clone)]
pub struct NativeSource {
    pub language: String,
    pub texts: Vec<String>,
}

/// Everything one file's pipeline consumes.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub original: TrackSource,
    pub dub: TrackSource,
    pub native: Option<NativeSource>,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Serialized ASS document.
    pub document: String,
    /// Strategy used to align Original onto Dub.
    pub strategy: AlignStrategy,
    /// Number of Dialogue events written.
    pub event_count: usize,
    pub diagnostics: Diagnostics,
}

/// Fatal error of one file's pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A track could not be parsed.
    #[error("Failed to parse {role} track: {source}")]
    Parse {
        role: Role,
        #[source]
        source: ParseError,
    },

    /// A track violates timing invariants.
    #[error(transparent)]
    Validation(#[from] TrackValidationError),

    /// Alignment failed.
    #[error("Alignment failed: {0}")]
    Alignment(#[from] AlignError),

    /// The output document could not be written.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    fn parse(role: Role, source: ParseError) -> Self {
        Self::Parse { role, source }
    }

    fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Run the pipeline for one file.
///
/// # Arguments
/// * `input` - Track sources for this file
/// * `settings` - Configuration, shared read-only between concurrent runs
///
/// # Returns
/// * `Ok(PipelineOutput)` - The document and every non-fatal diagnostic
/// * `Err(PipelineError)` - The first fatal error
pub fn run(input: &PipelineInput, settings: &Settings) -> Result<PipelineOutput, PipelineError> {
    settings.validate().map_err(PipelineError::InvalidSettings)?;

    let mut diagnostics = Diagnostics::new();
    let min_coverage = settings.parse.min_coverage;

    // Parse
    let original = parse_track(Role::Original, &input.original, min_coverage, &mut diagnostics)?;
    let dub = parse_track(Role::Dub, &input.dub, min_coverage, &mut diagnostics)?;
    tracing::info!(
        "Parsed {} original and {} dub cues",
        original.len(),
        dub.len()
    );

    // Validate
    original.validate()?;
    dub.validate()?;

    // Align
    let strategy = settings
        .align
        .strategy
        .resolve(input.original.provenance, input.dub.provenance);
    let mut config = AlignConfig {
        low_confidence_ratio: settings.align.low_confidence_ratio,
        position_weight: settings.align.position_weight,
        reference: None,
    };
    if let Some(native) = &input.native {
        config = config.with_reference(native.texts.clone());
    }

    let aligner = create_aligner(strategy);
    let alignment = aligner.align(&dub, &original, &config)?;
    tracing::info!("{}", alignment.summary);
    if let Some(reason) = alignment.low_confidence {
        diagnostics.record(DiagnosticKind::LowConfidence, Some(Role::Original), reason);
    }

    // Native
    let mut tracks = vec![alignment.track, dub];
    if let Some(native) = &input.native {
        let (native_track, mismatch) =
            Track::translated_from(&tracks[1], native.language.as_str(), &native.texts);
        if let Some(diagnostic) = mismatch {
            diagnostics.push(diagnostic);
            tracks[1] = tracks[1].truncated(native_track.len());
        }
        tracks.push(native_track);
    }

    // Normalize
    let min_gap_ms = settings.compose.min_gap_ms;
    if min_gap_ms > 0 {
        for track in &mut tracks {
            let (normalized, adjusted) = track.normalize_gaps(min_gap_ms);
            if adjusted > 0 {
                diagnostics.record(
                    DiagnosticKind::GapAdjusted,
                    Some(track.role),
                    format!("{} cue ends pulled back to keep a {}ms gap", adjusted, min_gap_ms),
                );
            }
            *track = normalized;
        }
    }

    // Compose and write
    let events = compose(&tracks, &settings.compose, &mut diagnostics);
    let document = build_document(&events, settings);
    let options = WriteOptions {
        rounding: settings.document.rounding,
    };

    Ok(PipelineOutput {
        document: write_ass(&document, &options),
        strategy,
        event_count: events.len(),
        diagnostics,
    })
}

/// Run the pipeline and write the document to `path`.
///
/// The parent directory is created when missing.
pub fn run_to_file(
    input: &PipelineInput,
    settings: &Settings,
    path: impl AsRef<Path>,
) -> Result<PipelineOutput, PipelineError> {
    let path = path.as_ref();
    let output = run(input, settings)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::write(path, e))?;
    }
    fs::write(path, &output.document).map_err(|e| PipelineError::write(path, e))?;

    tracing::info!("Wrote {} events to {}", output.event_count, path.display());
    Ok(output)
}

/// Output document path for a video: `<dir>/<stem>.<output_suffix>`.
pub fn output_path_for(video: impl AsRef<Path>, settings: &Settings) -> PathBuf {
    let video = video.as_ref();
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    video.with_file_name(format!("{}.{}", stem, settings.paths.output_suffix))
}

fn parse_track(
    role: Role,
    source: &TrackSource,
    min_coverage: f64,
    diagnostics: &mut Diagnostics,
) -> Result<Track, PipelineError> {
    let parsed =
        parse_content(&source.text, source.format).map_err(|e| PipelineError::parse(role, e))?;

    for skipped in &parsed.skipped {
        diagnostics.record(DiagnosticKind::SkippedBlock, Some(role), skipped.to_string());
    }

    let coverage = parsed.coverage();
    if coverage < min_coverage {
        return Err(PipelineError::parse(
            role,
            ParseError::LowCoverage {
                parsed: parsed.cues.len(),
                seen: parsed.blocks_seen,
            },
        ));
    }
    if parsed.is_partial() {
        diagnostics.record(
            DiagnosticKind::PartialCoverage,
            Some(role),
            format!(
                "{} of {} blocks parsed ({:.1}%)",
                parsed.cues.len(),
                parsed.blocks_seen,
                coverage * 100.0
            ),
        );
    }

    Ok(Track::new(role, source.language.clone(), parsed.cues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::parse_ass;
    use tempfile::tempdir;

    const ORIGINAL: &str = "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,000 --> 00:00:04,000\nWorld\n";
    const DUB: &str = "1\n00:00:00,100 --> 00:00:02,100\nSzia\n\n2\n00:00:02,300 --> 00:00:04,300\nVilág\n";

    fn input(original: &str, dub: &str, provenance: Provenance) -> PipelineInput {
        PipelineInput {
            original: TrackSource::new(original, "en", provenance),
            dub: TrackSource::new(dub, "hu", provenance),
            native: None,
        }
    }

    #[test]
    fn retimes_original_onto_dub_cadence() {
        let output = run(
            &input(ORIGINAL, DUB, Provenance::TitleSearched),
            &Settings::default(),
        )
        .unwrap();

        assert_eq!(output.strategy, AlignStrategy::ProportionalCadence);
        assert_eq!(output.event_count, 4);
        assert!(output.diagnostics.is_empty());

        let parsed = parse_ass(&output.document).unwrap();
        let cues: Vec<_> = parsed
            .cues
            .iter()
            .map(|c| (c.start_ms, c.end_ms, c.text()))
            .collect();
        assert_eq!(
            cues,
            vec![
                (100, 2100, "Hello".to_string()),
                (100, 2100, "Szia".to_string()),
                (2300, 4300, "World".to_string()),
                (2300, 4300, "Világ".to_string()),
            ]
        );
        assert!(output.document.contains("Dialogue: 0,0:00:00.10,0:00:02.10,Style_Orig,,0,0,0,,Hello"));
        assert!(output.document.contains("Dialogue: 1,0:00:00.10,0:00:02.10,Style_Dub,,0,0,0,,Szia"));
    }

    #[test]
    fn hash_matched_tracks_pass_through() {
        let output = run(
            &input(ORIGINAL, DUB, Provenance::HashMatched),
            &Settings::default(),
        )
        .unwrap();

        assert_eq!(output.strategy, AlignStrategy::PassThrough);
        let parsed = parse_ass(&output.document).unwrap();
        assert_eq!(parsed.cues[0].start_ms, 0);
        assert_eq!(parsed.cues[0].text(), "Hello");
    }

    #[test]
    fn single_track_round_trips_through_writer() {
        let srt = "1\n00:00:01,234 --> 00:00:02,500\nFirst line\nsecond line\n\n2\n00:00:03,000 --> 00:00:04,999\n{braces} and \\ slash\n";
        let output = run(&input(srt, srt, Provenance::HashMatched), &Settings::default()).unwrap();

        let source = crate::subtitles::parse_srt(srt);
        let written = parse_ass(&output.document).unwrap();
        let dub_cues: Vec<_> = written.cues.iter().skip(1).step_by(2).collect();

        assert_eq!(dub_cues.len(), source.cues.len());
        for (out, orig) in dub_cues.iter().zip(&source.cues) {
            assert_eq!(out.lines, orig.lines);
            assert!(out.start_ms.abs_diff(orig.start_ms) <= 5);
            assert!(out.end_ms.abs_diff(orig.end_ms) <= 5);
        }
    }

    #[test]
    fn formatting_markup_reaches_output_as_overrides() {
        let original = "[Events]\n\
                        Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
                        Dialogue: 0,0:00:00.00,0:00:02.00,Default,,0,0,0,,{\\i1}Hello{\\i0}\n";
        let dub = "1\n00:00:00,000 --> 00:00:02,000\n<i>Szia</i> {itt}\n";

        let output = run(&input(original, dub, Provenance::HashMatched), &Settings::default()).unwrap();

        assert!(output
            .document
            .contains(r"Style_Orig,,0,0,0,,{\i1}Hello{\i0}"));
        assert!(output
            .document
            .contains(r"Style_Dub,,0,0,0,,{\i1}Szia{\i0} \{itt\}"));
    }

    #[test]
    fn native_track_follows_dub_timing() {
        let mut pipeline_input = input(ORIGINAL, DUB, Provenance::TitleSearched);
        pipeline_input.native = Some(NativeSource {
            language: "en".to_string(),
            texts: vec!["Hi".to_string(), "World".to_string()],
        });

        let output = run(&pipeline_input, &Settings::default()).unwrap();

        assert_eq!(output.event_count, 6);
        assert!(output.document.contains("Dialogue: 2,0:00:02.30,0:00:04.30,Style_Trans,,0,0,0,,World"));
    }

    #[test]
    fn native_count_mismatch_truncates_dub() {
        let mut pipeline_input = input(ORIGINAL, DUB, Provenance::HashMatched);
        pipeline_input.native = Some(NativeSource {
            language: "en".to_string(),
            texts: vec!["Hi".to_string()],
        });

        let output = run(&pipeline_input, &Settings::default()).unwrap();

        assert!(output.diagnostics.has(DiagnosticKind::CountMismatch));
        // 2 original + 1 dub + 1 native
        assert_eq!(output.event_count, 4);
    }

    #[test]
    fn skipped_blocks_are_reported() {
        let broken = "1\n00:00:00,000 --> 00:00:02,000\nHello\n\nx\n00:00:02,000 --> 00:00:04,000\nWorld\n";
        let output = run(
            &input(broken, DUB, Provenance::TitleSearched),
            &Settings::default(),
        )
        .unwrap();

        assert_eq!(output.diagnostics.count(DiagnosticKind::SkippedBlock), 1);
        assert!(output.diagnostics.has(DiagnosticKind::PartialCoverage));
    }

    #[test]
    fn coverage_below_minimum_fails() {
        let broken = "1\n00:00:00,000 --> 00:00:02,000\nHello\n\nx\n00:00:02,000 --> 00:00:04,000\nWorld\n";
        let mut settings = Settings::default();
        settings.parse.min_coverage = 0.9;

        let err = run(&input(broken, DUB, Provenance::TitleSearched), &settings).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Parse {
                role: Role::Original,
                source: ParseError::LowCoverage { parsed: 1, seen: 2 }
            }
        ));
    }

    #[test]
    fn inverted_track_stops_before_alignment() {
        let inverted = "1\n00:00:03,000 --> 00:00:01,000\nBackwards\n";
        let err = run(
            &input(inverted, DUB, Provenance::TitleSearched),
            &Settings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Validation(ref e) if e.role == Role::Original));
    }

    #[test]
    fn empty_dub_is_fatal_for_cadence() {
        let err = run(
            &input(ORIGINAL, "", Provenance::TitleSearched),
            &Settings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Alignment(AlignError::NoTimingMaster)));
    }

    #[test]
    fn gap_normalization_is_reported() {
        let tight = "1\n00:00:00,000 --> 00:00:01,000\na\n\n2\n00:00:01,020 --> 00:00:02,000\nb\n";
        let mut settings = Settings::default();
        settings.compose.min_gap_ms = 100;

        let output = run(&input(tight, tight, Provenance::HashMatched), &settings).unwrap();

        assert_eq!(output.diagnostics.count(DiagnosticKind::GapAdjusted), 2);
        assert!(output.document.contains("0:00:00.00,0:00:00.92"));
    }

    #[test]
    fn compressed_cues_stay_stacked_with_min_gap() {
        let original = "1\n00:00:00,000 --> 00:00:01,000\nA\n\n\
                        2\n00:00:01,000 --> 00:00:02,000\nB\n\n\
                        3\n00:00:02,000 --> 00:00:03,000\nC\n\n\
                        4\n00:00:03,000 --> 00:00:04,000\nD\n";
        let dub = "1\n00:00:00,000 --> 00:00:02,000\nEgy\n\n\
                   2\n00:00:02,000 --> 00:00:04,000\nKettő\n";
        let mut settings = Settings::default();
        settings.compose.min_gap_ms = 100;

        let output = run(&input(original, dub, Provenance::TitleSearched), &settings).unwrap();

        assert!(!output.diagnostics.has(DiagnosticKind::Overlap));
        let parsed = parse_ass(&output.document).unwrap();
        let originals: Vec<_> = parsed
            .cues
            .iter()
            .filter(|c| c.lines.len() == 2)
            .map(|c| (c.start_ms, c.end_ms, c.lines.clone()))
            .collect();
        assert_eq!(
            originals,
            vec![
                (0, 1900, vec!["A".to_string(), "B".to_string()]),
                (2000, 4000, vec!["C".to_string(), "D".to_string()]),
            ]
        );
        assert_eq!(output.event_count, 4);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.compose.layout = vec![Role::Dub, Role::Dub, Role::Native];

        let err = run(&input(ORIGINAL, DUB, Provenance::TitleSearched), &settings).unwrap_err();

        assert!(matches!(err, PipelineError::InvalidSettings(ref m) if m.contains("compose.layout")));
    }

    #[test]
    fn run_to_file_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("movie.sublearn.ass");

        let output = run_to_file(
            &input(ORIGINAL, DUB, Provenance::TitleSearched),
            &Settings::default(),
            &path,
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), output.document);
    }

    #[test]
    fn run_to_file_reports_path_on_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("movie.ass");

        let err = run_to_file(
            &input(ORIGINAL, DUB, Provenance::TitleSearched),
            &Settings::default(),
            &path,
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Write { path: ref p, .. } if p == &path));
    }

    #[test]
    fn track_source_reads_file_with_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movie.hu.srt");
        fs::write(&path, DUB).unwrap();

        let source = TrackSource::read(&path, "hu", Provenance::HashMatched).unwrap();

        assert_eq!(source.format, Some(SubtitleFormat::Srt));
        assert!(source.text.contains("Világ"));
    }

    #[test]
    fn output_path_uses_suffix() {
        let settings = Settings::default();
        assert_eq!(
            output_path_for("/media/movie.mkv", &settings),
            PathBuf::from("/media/movie.sublearn.ass")
        );
    }
}
