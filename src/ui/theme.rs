use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::Category;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_FIELD: Color32 = Color32::from_rgb(20, 20, 28);
pub const BG_TIP: Color32 = Color32::from_rgb(28, 40, 66);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BLOCK: Color32 = Color32::WHITE;
pub const TEXT_ERROR: Color32 = Color32::from_rgb(245, 101, 101);

pub const ACCENT: Color32 = Color32::from_rgb(56, 178, 172);
pub const DANGER: Color32 = Color32::from_rgb(229, 62, 62);
pub const NOW_LINE: Color32 = Color32::from_rgb(245, 101, 101);
pub const HOUR_LINE: Color32 = Color32::from_rgb(44, 46, 58);

// ── Sizes ────────────────────────────────────────────────────────────────────

/// Left gutter holding the hour labels; blocks start after it.
pub const GUTTER_WIDTH: f32 = 60.0;
pub const BLOCK_RIGHT_MARGIN: f32 = 10.0;
pub const BLOCK_ROUNDING: f32 = 5.0;
pub const BLOCK_PADDING: f32 = 6.0;
/// Blocks shorter than this show no notes line.
pub const NOTES_MIN_HEIGHT: f32 = 30.0;
pub const SUMMARY_PANEL_WIDTH: f32 = 300.0;
pub const DIALOG_WIDTH: f32 = 380.0;
pub const STATUS_BAR_HEIGHT: f32 = 24.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_hour() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_block_title() -> FontId {
    FontId::proportional(12.5)
}

pub fn font_block_detail() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_status() -> FontId {
    FontId::proportional(11.0)
}

// ── Category colors ──────────────────────────────────────────────────────────

pub fn category_color(category: Category) -> Color32 {
    match category {
        Category::Trading => Color32::from_rgb(66, 153, 225),
        Category::Learning => Color32::from_rgb(72, 187, 120),
        Category::Exercise => Color32::from_rgb(237, 137, 54),
        Category::Personal => Color32::from_rgb(159, 122, 234),
        Category::Other => Color32::from_rgb(160, 174, 192),
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

/// Dark visuals driven by the planner palette.
pub fn planner_visuals() -> Visuals {
    let mut visuals = Visuals::dark();
    let rounding = Rounding::same(4.0);

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.faint_bg_color = BG_DARK;
    visuals.extreme_bg_color = BG_FIELD;
    visuals.code_bg_color = BG_FIELD;
    visuals.error_fg_color = TEXT_ERROR;
    visuals.warn_fg_color = NOW_LINE;
    visuals.hyperlink_color = BORDER_ACCENT;

    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);

    for (widget, fill) in [
        (&mut visuals.widgets.inactive, BG_FIELD),
        (&mut visuals.widgets.hovered, HOUR_LINE),
        (&mut visuals.widgets.active, BORDER_SUBTLE),
        (&mut visuals.widgets.open, BG_FIELD),
    ] {
        widget.bg_fill = fill;
        widget.weak_bg_fill = fill;
        widget.rounding = rounding;
    }
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, BORDER_ACCENT);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);

    visuals.selection.bg_fill = ACCENT.gamma_multiply(0.45);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals
}

pub fn apply_theme(ctx: &egui::Context) {
    ctx.set_visuals(planner_visuals());

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visuals_use_planner_palette() {
        let visuals = planner_visuals();
        assert_eq!(visuals.error_fg_color, TEXT_ERROR);
        assert_eq!(visuals.extreme_bg_color, BG_FIELD);
        assert_eq!(visuals.widgets.inactive.bg_fill, BG_FIELD);
        assert_eq!(visuals.selection.stroke.color, ACCENT);
    }

    #[test]
    fn apply_theme_installs_visuals() {
        let ctx = egui::Context::default();
        apply_theme(&ctx);
        assert_eq!(ctx.style().visuals.error_fg_color, TEXT_ERROR);
        assert_eq!(ctx.style().visuals.panel_fill, BG_PANEL);
    }

    #[test]
    fn categories_have_distinct_colors() {
        let colors: std::collections::HashSet<_> =
            Category::ALL.iter().map(|&c| category_color(c)).collect();
        assert_eq!(colors.len(), Category::ALL.len());
    }
}
