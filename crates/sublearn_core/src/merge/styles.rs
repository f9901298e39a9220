//! Per-role ASS styles.
//!
//! Each role's [`StyleSpec`] is laid over the stock [`SubtitleStyle`]
//! defaults; only the screen anchor comes from the compose layout.

use crate::config::{Settings, StyleSpec};
use crate::subtitles::SubtitleStyle;
use crate::track::Role;

/// Numpad alignment for each vertical slot, top to bottom.
const SLOT_ALIGNMENT: [i32; 3] = [8, 5, 2];

/// The three role styles of a merged document, in role order.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    styles: Vec<SubtitleStyle>,
}

impl StyleSheet {
    /// Build the style sheet from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let styles = Role::ALL
            .iter()
            .map(|&role| {
                let slot = settings.compose.slot_of(role);
                role_style(role, settings.styles.for_role(role), slot)
            })
            .collect();
        Self { styles }
    }

    /// Style used for a role.
    pub fn get(&self, role: Role) -> Option<&SubtitleStyle> {
        self.styles.iter().find(|s| s.name == role.style_name())
    }

    pub fn styles(&self) -> &[SubtitleStyle] {
        &self.styles
    }

    pub fn into_styles(self) -> Vec<SubtitleStyle> {
        self.styles
    }
}

fn role_style(role: Role, spec: &StyleSpec, slot: usize) -> SubtitleStyle {
    let alignment = SLOT_ALIGNMENT
        .get(slot)
        .copied()
        .unwrap_or(SLOT_ALIGNMENT[SLOT_ALIGNMENT.len() - 1]);

    SubtitleStyle {
        name: role.style_name().to_string(),
        fontname: spec.fontname.clone(),
        fontsize: spec.fontsize,
        primary_color: spec.primary_color,
        outline_color: spec.outline_color,
        back_color: spec.back_color,
        bold: spec.bold,
        italic: spec.italic,
        outline: spec.outline,
        shadow: spec.shadow,
        alignment,
        margin_v: spec.margin_v,
        ..SubtitleStyle::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::AssColor;

    #[test]
    fn default_layout_anchors_top_middle_bottom() {
        let sheet = StyleSheet::from_settings(&Settings::default());

        assert_eq!(sheet.styles().len(), 3);
        assert_eq!(sheet.get(Role::Original).unwrap().alignment, 8);
        assert_eq!(sheet.get(Role::Dub).unwrap().alignment, 5);
        assert_eq!(sheet.get(Role::Native).unwrap().alignment, 2);
    }

    #[test]
    fn permuted_layout_moves_anchors() {
        let mut settings = Settings::default();
        settings.compose.layout = vec![Role::Native, Role::Original, Role::Dub];
        let sheet = StyleSheet::from_settings(&settings);

        assert_eq!(sheet.get(Role::Native).unwrap().alignment, 8);
        assert_eq!(sheet.get(Role::Original).unwrap().alignment, 5);
        assert_eq!(sheet.get(Role::Dub).unwrap().alignment, 2);
    }

    #[test]
    fn spec_values_override_stock_style() {
        let sheet = StyleSheet::from_settings(&Settings::default());
        let dub = sheet.get(Role::Dub).unwrap();

        assert_eq!(dub.name, "Style_Dub");
        assert_eq!(dub.fontsize, 24.0);
        assert_eq!(dub.primary_color, AssColor::from_rgb(255, 255, 0));
        assert_eq!(dub.outline, 1.0);
        assert_eq!(dub.shadow, 0.5);
        assert_eq!(dub.border_style, 1);
        assert_eq!(dub.scale_x, 100.0);
    }
}
