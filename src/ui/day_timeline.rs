use crate::controller::{self, BlockLayout, TimelineController, TimelineIntent};
use crate::model::time_grid::{self, DAY_HEIGHT};
use crate::model::PlanItem;
use crate::ui::theme;
use chrono::{NaiveDate, NaiveDateTime};
use egui::{Color32, CursorIcon, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

/// Render the scrollable 24-hour canvas and return what a click asked for.
///
/// `scroll_to` jumps the scroll position once (used when a day is opened).
pub fn show_day_timeline(
    controller: &mut TimelineController,
    items: &[PlanItem],
    date: NaiveDate,
    now: NaiveDateTime,
    scroll_to: Option<f32>,
    ui: &mut Ui,
) -> Option<TimelineIntent> {
    let mut intent = None;
    let layouts = controller.layout_of(items);

    let mut area = egui::ScrollArea::vertical()
        .id_salt("day_timeline")
        .auto_shrink([false, false]);
    if let Some(offset) = scroll_to {
        area = area.vertical_scroll_offset(offset);
    }

    area.show(ui, |ui| {
        let width = ui.available_width();
        let (response, painter) = ui.allocate_painter(Vec2::new(width, DAY_HEIGHT), Sense::click());
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
        draw_hour_grid(&painter, origin, width);

        // Raise whatever is under the pointer before painting so the hovered
        // block comes out on top this frame.
        let hovered = response
            .hover_pos()
            .and_then(|pos| controller.hit_test(&layouts, pos.y - origin.y))
            .map(|block| block.item.id.clone());
        if hovered.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        } else if response.hovered() {
            ui.ctx().set_cursor_icon(CursorIcon::Cell);
        }
        controller.set_raised(hovered);

        for block in controller.paint_order(&layouts) {
            let is_raised = controller.raised() == Some(&block.item.id);
            draw_block(&painter, origin, width, block, is_raised);
        }

        if let Some(offset) = controller::now_indicator_offset(date, now) {
            draw_now_line(&painter, origin, width, offset as f32);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                intent = Some(controller.click(&layouts, date, pos.y - origin.y));
            }
        }
    });

    intent
}

fn draw_hour_grid(painter: &egui::Painter, origin: Pos2, width: f32) {
    for (time, offset) in time_grid::hour_marks() {
        let y = origin.y + offset as f32;
        painter.line_segment(
            [Pos2::new(origin.x, y), Pos2::new(origin.x + width, y)],
            Stroke::new(1.0, theme::HOUR_LINE),
        );
        // Label sits on the line; the first one is nudged below the top edge.
        let label_y = if offset == 0 { y + 8.0 } else { y };
        let galley = painter.layout_no_wrap(time.to_string(), theme::font_hour(), theme::TEXT_DIM);
        let label_rect = Rect::from_min_size(
            Pos2::new(origin.x + 6.0, label_y - galley.size().y / 2.0),
            galley.size() + Vec2::new(6.0, 0.0),
        );
        painter.rect_filled(label_rect, 0.0, theme::BG_DARK);
        painter.galley(label_rect.min + Vec2::new(3.0, 0.0), galley, Color32::TRANSPARENT);
    }
}

fn block_rect(origin: Pos2, width: f32, block: &BlockLayout) -> Rect {
    let top = origin.y + block.top as f32;
    Rect::from_min_max(
        Pos2::new(origin.x + theme::GUTTER_WIDTH, top),
        Pos2::new(
            origin.x + width - theme::BLOCK_RIGHT_MARGIN,
            top + block.height as f32,
        ),
    )
}

fn draw_block(painter: &egui::Painter, origin: Pos2, width: f32, block: &BlockLayout, is_raised: bool) {
    let rect = block_rect(origin, width, block);
    let rounding = Rounding::same(theme::BLOCK_ROUNDING);
    let base = theme::category_color(block.item.category);

    if is_raised {
        painter.rect_filled(rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(60));
        painter.rect_filled(rect, rounding, base);
        painter.rect_stroke(rect.expand(1.0), rounding, Stroke::new(1.5, Color32::from_white_alpha(90)));
    } else {
        painter.rect_filled(rect, rounding, base.gamma_multiply(0.9));
    }

    let clipped = painter.with_clip_rect(rect.shrink(1.0));
    let text_left = rect.left() + theme::BLOCK_PADDING;
    let text_top = rect.top() + theme::BLOCK_PADDING.min(rect.height() / 4.0);

    let range = format!("{} - {}", block.item.start_time, block.item.end_time);
    let range_galley = painter.layout_no_wrap(range, theme::font_block_detail(), theme::TEXT_ON_BLOCK);
    let range_width = range_galley.size().x;
    clipped.galley(
        Pos2::new(rect.right() - theme::BLOCK_PADDING - range_width, text_top),
        range_galley,
        Color32::TRANSPARENT,
    );

    let title_galley = painter.layout(
        block.item.title.clone(),
        theme::font_block_title(),
        theme::TEXT_ON_BLOCK,
        (rect.width() - range_width - theme::BLOCK_PADDING * 3.0).max(10.0),
    );
    let title_height = title_galley.size().y;
    clipped.galley(Pos2::new(text_left, text_top), title_galley, Color32::TRANSPARENT);

    if rect.height() > theme::NOTES_MIN_HEIGHT {
        if let Some(notes) = block.item.notes.as_deref().filter(|n| !n.is_empty()) {
            let notes_galley = painter.layout(
                notes.to_string(),
                theme::font_block_detail(),
                theme::TEXT_ON_BLOCK.gamma_multiply(0.85),
                rect.width() - theme::BLOCK_PADDING * 2.0,
            );
            clipped.galley(
                Pos2::new(text_left, text_top + title_height + 2.0),
                notes_galley,
                Color32::TRANSPARENT,
            );
        }
    }
}

fn draw_now_line(painter: &egui::Painter, origin: Pos2, width: f32, offset: f32) {
    let y = origin.y + offset;
    painter.line_segment(
        [Pos2::new(origin.x, y), Pos2::new(origin.x + width, y)],
        Stroke::new(2.0, theme::NOW_LINE),
    );
    painter.circle_filled(Pos2::new(origin.x + 4.0, y), 4.0, theme::NOW_LINE);
}
