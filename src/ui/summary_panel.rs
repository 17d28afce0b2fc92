use crate::model::Category;
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{RichText, Rounding, Sense, Ui, Vec2};

/// Right-hand panel: per-type plan counts for the day and a usage tip.
pub fn show_summary_panel(date: NaiveDate, counts: &[(Category, usize)], ui: &mut Ui) {
    ui.add_space(6.0);
    egui::Frame::none()
        .fill(theme::BG_DARK)
        .rounding(Rounding::same(8.0))
        .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(format!("Summary for {}", date.format("%b %-d")))
                    .strong()
                    .size(13.0),
            );
            ui.add_space(8.0);
            if counts.is_empty() {
                ui.label(RichText::new("Nothing planned yet").color(theme::TEXT_DIM));
            }
            for (category, count) in counts {
                ui.horizontal(|ui| {
                    let (dot, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
                    ui.painter()
                        .circle_filled(dot.center(), 5.0, theme::category_color(*category));
                    ui.label(category.label());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(count.to_string()).strong());
                    });
                });
            }
        });

    ui.add_space(10.0);
    egui::Frame::none()
        .fill(theme::BG_TIP)
        .rounding(Rounding::same(8.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Tip").strong().color(theme::BORDER_ACCENT));
            ui.add_space(2.0);
            ui.label(
                RichText::new("Click anywhere on the timeline to add a plan at that time.")
                    .size(11.5)
                    .color(theme::TEXT_SECONDARY),
            );
        });
}
