use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::{Category, Lane};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_LANE_ALT: Color32 = Color32::from_rgb(27, 27, 36);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_CARD: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(240, 110, 110);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const RULER_WIDTH: f32 = 84.0;
pub const LANE_HEADER_HEIGHT: f32 = 44.0;
pub const LANE_MIN_WIDTH: f32 = 180.0;
/// Height of the 0..100% span before auto-growth.
pub const MIN_CONTENT_HEIGHT: f32 = 600.0;
pub const MIN_CARD_HEIGHT: f32 = 22.0;
pub const CARD_ROUNDING: f32 = 5.0;
pub const CARD_INSET: f32 = 4.0; // horizontal inset from the lane edges

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_card() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

pub fn font_status() -> FontId {
    FontId::proportional(11.0)
}

// ── Domain colors ────────────────────────────────────────────────────────────

pub fn category_color(category: Category) -> Color32 {
    match category {
        Category::Planning => Color32::from_rgb(66, 133, 244),
        Category::Development => Color32::from_rgb(52, 168, 83),
        Category::Review => Color32::from_rgb(251, 140, 0),
        Category::Milestone => Color32::from_rgb(171, 71, 188),
        Category::Delivery => Color32::from_rgb(229, 57, 53),
    }
}

pub fn lane_accent(lane: Lane) -> Color32 {
    match lane {
        Lane::Testing => Color32::from_rgb(3, 169, 244),
        Lane::Design => Color32::from_rgb(255, 193, 7),
        Lane::Prototype => Color32::from_rgb(0, 188, 212),
        Lane::Outreach => Color32::from_rgb(236, 64, 122),
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 28); // TextEdit bg

    let rounding = Rounding::same(4.0);
    let widgets = &mut visuals.widgets;

    widgets.noninteractive.bg_fill = BG_PANEL;
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    widgets.noninteractive.rounding = rounding;

    widgets.inactive.bg_fill = Color32::from_rgb(42, 44, 56);
    widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    widgets.inactive.rounding = rounding;

    widgets.hovered.bg_fill = Color32::from_rgb(52, 54, 68);
    widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    widgets.hovered.rounding = rounding;

    widgets.active.bg_fill = Color32::from_rgb(60, 62, 76);
    widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    widgets.active.rounding = rounding;

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.striped = false;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
