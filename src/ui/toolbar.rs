use crate::app::PlannerApp;
use crate::ui::theme;
use egui::{menu, Color32, RichText, Ui};
use egui_phosphor::regular as icons;

/// Render the menu bar and the day navigation row.
pub fn show_toolbar(app: &mut PlannerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button("  File  ", |ui| {
            if ui.button(format!("{}  Export Day as CSV...", icons::EXPORT)).clicked() {
                app.export_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Open Settings Folder", icons::FOLDER_OPEN)).clicked() {
                app.open_settings_folder();
                ui.close_menu();
            }
        });

        ui.menu_button("  View  ", |ui| {
            if ui
                .add_enabled(!app.is_editing() && !app.is_today(), egui::Button::new("  Today"))
                .clicked()
            {
                app.go_to_today();
                ui.close_menu();
            }
            if ui.button(format!("{}  Reload Day", icons::ARROWS_CLOCKWISE)).clicked() {
                app.request_load();
                ui.close_menu();
            }
        });

        ui.menu_button("  Help  ", |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });
    });

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Daily Planner").strong().size(18.0));
        ui.add_space(12.0);

        // Navigation stays locked while a draft is open in the editor
        let can_navigate = !app.is_editing();
        ui.add_enabled_ui(can_navigate, |ui| {
            if ui.button(icons::CARET_LEFT).on_hover_text("Previous day").clicked() {
                app.previous_day();
            }

            let mut picked = app.selected_date();
            ui.add(egui_extras::DatePickerButton::new(&mut picked).id_salt("day_picker"));
            if picked != app.selected_date() {
                app.select_date(picked);
            }

            if ui.button(icons::CARET_RIGHT).on_hover_text("Next day").clicked() {
                app.next_day();
            }
            if ui.add_enabled(!app.is_today(), egui::Button::new("Today")).clicked() {
                app.go_to_today();
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let add_btn = egui::Button::new(
                RichText::new(format!("{}  Add Plan", icons::PLUS)).color(Color32::WHITE),
            )
            .fill(theme::ACCENT)
            .rounding(egui::Rounding::same(5.0));
            if ui.add(add_btn).clicked() {
                app.open_add();
            }
            if app.is_loading() {
                ui.spinner();
            }
        });
    });
    ui.add_space(4.0);
}
