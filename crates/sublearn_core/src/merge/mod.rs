//! Timeline composition.
//!
//! Combines up to three tracks with final timings into one event list:
//!
//! 1. Consecutive cues of a role sharing one interval are stacked into a
//!    single event (several source lines aligned onto one master cue).
//! 2. Same-role overlaps are corrected by moving the later start to the
//!    earlier end. Events are never merged, so no dialogue is dropped.
//! 3. Events are ordered by start, then layer, then track order.
//!
//! Roles never collide on screen: each has its own layer and a style
//! anchored to its layout slot (see [`StyleSheet`]).

mod styles;

pub use styles::StyleSheet;

use crate::config::{ComposeSettings, Settings};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::subtitles::{AssDocument, AssEvent, ScriptInfo};
use crate::track::{Role, Track};

/// One event of the merged timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEvent {
    pub start_ms: u64,
    pub end_ms: u64,
    pub role: Role,
    /// Text lines in reading order.
    pub lines: Vec<String>,
}

impl MergedEvent {
    /// ASS layer (z-order) of this event.
    pub fn layer(&self) -> u32 {
        self.role.layer()
    }

    pub fn style_name(&self) -> &'static str {
        self.role.style_name()
    }

    pub fn overlaps(&self, other: &MergedEvent) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    fn to_ass_event(&self) -> AssEvent {
        AssEvent {
            layer: self.layer(),
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            style: self.style_name().to_string(),
            lines: self.lines.clone(),
        }
    }
}

/// Compose tracks into one ordered timeline.
///
/// # Arguments
/// * `tracks` - Tracks with final timings, in presentation order
/// * `settings` - Overlap correction floor
/// * `diagnostics` - Receives one `Overlap` entry per corrected event
pub fn compose(
    tracks: &[Track],
    settings: &ComposeSettings,
    diagnostics: &mut Diagnostics,
) -> Vec<MergedEvent> {
    let mut events: Vec<MergedEvent> = tracks
        .iter()
        .flat_map(|track| {
            let stacked = stack_shared_intervals(track);
            correct_overlaps(stacked, track.role, settings.min_duration_ms, diagnostics)
        })
        .collect();

    // Stable: ties keep track order, then cue order.
    events.sort_by_key(|e| (e.start_ms, e.layer()));

    tracing::debug!(
        "Composed {} events from {} tracks",
        events.len(),
        tracks.len()
    );
    events
}

/// Build the output document from composed events.
pub fn build_document(events: &[MergedEvent], settings: &Settings) -> AssDocument {
    let document = &settings.document;
    AssDocument {
        info: ScriptInfo {
            title: document.title.clone(),
            play_res_x: document.play_res_x,
            play_res_y: document.play_res_y,
            wrap_style: document.wrap_style,
            scaled_border_and_shadow: document.scaled_border_and_shadow,
        },
        styles: StyleSheet::from_settings(settings).into_styles(),
        events: events.iter().map(MergedEvent::to_ass_event).collect(),
    }
}

fn stack_shared_intervals(track: &Track) -> Vec<MergedEvent> {
    let mut events: Vec<MergedEvent> = Vec::with_capacity(track.len());

    for cue in &track.cues {
        match events.last_mut() {
            Some(last) if last.start_ms == cue.start_ms && last.end_ms == cue.end_ms => {
                last.lines.extend(cue.lines.iter().cloned());
            }
            _ => events.push(MergedEvent {
                start_ms: cue.start_ms,
                end_ms: cue.end_ms,
                role: track.role,
                lines: cue.lines.clone(),
            }),
        }
    }

    events
}

fn correct_overlaps(
    mut events: Vec<MergedEvent>,
    role: Role,
    min_duration_ms: u64,
    diagnostics: &mut Diagnostics,
) -> Vec<MergedEvent> {
    for i in 1..events.len() {
        let previous_end = events[i - 1].end_ms;
        let event = &mut events[i];
        if event.start_ms >= previous_end {
            continue;
        }

        let (old_start, old_end) = (event.start_ms, event.end_ms);
        event.start_ms = previous_end;
        if event.end_ms < event.start_ms + min_duration_ms {
            event.end_ms = event.start_ms + min_duration_ms;
        }

        diagnostics.record(
            DiagnosticKind::Overlap,
            Some(role),
            format!(
                "event {} ({}-{}ms) overlapped the previous event; moved to {}-{}ms",
                i, old_start, old_end, event.start_ms, event.end_ms
            ),
        );
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::test_support::track;

    fn settings() -> ComposeSettings {
        ComposeSettings::default()
    }

    #[test]
    fn same_role_overlap_is_clamped() {
        let dub = track(Role::Dub, &[(1000, 3000, "a"), (2500, 4000, "b")]);
        let mut diags = Diagnostics::new();

        let events = compose(&[dub], &settings(), &mut diags);

        let spans: Vec<_> = events.iter().map(|e| (e.start_ms, e.end_ms)).collect();
        assert_eq!(spans, vec![(1000, 3000), (3000, 4000)]);
        assert_eq!(diags.count(DiagnosticKind::Overlap), 1);
        assert_eq!(events[1].lines, vec!["b"]);
    }

    #[test]
    fn contained_overlap_gets_minimum_duration() {
        let dub = track(Role::Dub, &[(1000, 5000, "a"), (2000, 3000, "b")]);
        let mut diags = Diagnostics::new();

        let events = compose(&[dub], &settings(), &mut diags);

        assert_eq!((events[1].start_ms, events[1].end_ms), (5000, 5100));
        assert!(diags.has(DiagnosticKind::Overlap));
    }

    #[test]
    fn two_roles_produce_distinct_layers() {
        let original = track(Role::Original, &[(100, 2100, "Hello"), (2300, 4300, "World")]);
        let dub = track(Role::Dub, &[(100, 2100, "Szia"), (2300, 4300, "Világ")]);
        let mut diags = Diagnostics::new();

        let events = compose(&[original, dub], &settings(), &mut diags);

        assert_eq!(events.len(), 4);
        assert!(diags.is_empty());
        assert_eq!(events[0].lines, vec!["Hello"]);
        assert_eq!(events[0].layer(), 0);
        assert_eq!(events[1].lines, vec!["Szia"]);
        assert_eq!(events[1].layer(), 1);

        for role in [Role::Original, Role::Dub] {
            let same: Vec<_> = events.iter().filter(|e| e.role == role).collect();
            assert!(same.windows(2).all(|w| !w[0].overlaps(w[1])));
        }
    }

    #[test]
    fn shared_interval_cues_are_stacked() {
        let original = track(
            Role::Original,
            &[(0, 1000, "first"), (0, 1000, "second"), (1000, 2000, "third")],
        );
        let mut diags = Diagnostics::new();

        let events = compose(&[original], &settings(), &mut diags);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].lines, vec!["first", "second"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn document_uses_settings_header_and_styles() {
        let dub = track(Role::Dub, &[(0, 1000, "x")]);
        let mut diags = Diagnostics::new();
        let events = compose(&[dub], &settings(), &mut diags);

        let mut all = Settings::default();
        all.document.play_res_y = Some(1080);
        let doc = build_document(&events, &all);

        assert_eq!(doc.info.title, "Sublearn merged subtitles");
        assert_eq!(doc.info.play_res_y, Some(1080));
        assert_eq!(doc.styles.len(), 3);
        assert_eq!(doc.events[0].style, "Style_Dub");
        assert_eq!(doc.events[0].layer, 1);
    }
}
