use crate::model::time_grid::TimeParseError;
use crate::model::{Category, PlanDraft, PlanId, TimeOfDay};
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};

/// Actions the editor can request.
pub enum EditorAction {
    None,
    Save(PlanDraft),
    Delete(PlanId),
    Close,
}

/// Modal form state for creating or editing one plan.
#[derive(Debug, Clone)]
pub struct PlanEditor {
    pub draft: PlanDraft,
    pub start_text: String,
    pub end_text: String,
    /// Last validation or save failure, shown under the form.
    pub error: Option<String>,
}

impl PlanEditor {
    pub fn open(draft: PlanDraft) -> Self {
        Self {
            start_text: draft.start_time.map(|t| t.to_string()).unwrap_or_default(),
            end_text: draft.end_time.map(|t| t.to_string()).unwrap_or_default(),
            draft,
            error: None,
        }
    }

    /// The draft with the typed times applied. Blank fields become missing
    /// values and are reported by validation later.
    pub fn to_draft(&self) -> Result<PlanDraft, TimeParseError> {
        let mut draft = self.draft.clone();
        draft.start_time = parse_optional(&self.start_text)?;
        draft.end_time = parse_optional(&self.end_text)?;
        Ok(draft)
    }
}

fn parse_optional(text: &str) -> Result<Option<TimeOfDay>, TimeParseError> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        text.parse().map(Some)
    }
}

/// Render the add/edit plan window. `busy` disables saving and deleting while
/// an earlier change is in flight.
pub fn show_plan_editor(editor: &mut PlanEditor, busy: bool, ctx: &Context) -> EditorAction {
    let mut action = EditorAction::None;
    let title = if editor.draft.is_new() { "New Plan" } else { "Edit Plan" };

    Window::new(RichText::new(title).strong().size(14.0))
        .id(egui::Id::new("plan_editor"))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("plan_editor_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Title *").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [240.0, 24.0],
                        egui::TextEdit::singleline(&mut editor.draft.title)
                            .hint_text("e.g., Morning Analysis"),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Type *").color(theme::TEXT_SECONDARY));
                    let selected = editor.draft.category.unwrap_or_default();
                    egui::ComboBox::from_id_salt("plan_category")
                        .selected_text(
                            RichText::new(selected.label()).color(theme::category_color(selected)),
                        )
                        .width(240.0)
                        .show_ui(ui, |ui| {
                            for category in Category::ALL {
                                ui.selectable_value(
                                    &mut editor.draft.category,
                                    Some(category),
                                    RichText::new(category.label()).color(theme::category_color(category)),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Start *").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [80.0, 24.0],
                        egui::TextEdit::singleline(&mut editor.start_text).hint_text("HH:MM"),
                    );
                    ui.end_row();

                    ui.label(RichText::new("End *").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [80.0, 24.0],
                        egui::TextEdit::singleline(&mut editor.end_text).hint_text("HH:MM"),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Notes").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [240.0, 60.0],
                        egui::TextEdit::multiline(&mut editor.draft.notes)
                            .hint_text("Additional details..."),
                    );
                    ui.end_row();
                });

            if let Some(error) = &editor.error {
                ui.add_space(4.0);
                ui.label(RichText::new(error).color(theme::TEXT_ERROR).size(11.5));
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                if let Some(id) = editor.draft.id.clone() {
                    let delete_btn = egui::Button::new(
                        RichText::new(egui_phosphor::regular::TRASH).color(Color32::WHITE),
                    )
                    .fill(theme::DANGER);
                    if ui
                        .add_enabled(!busy, delete_btn)
                        .on_hover_text("Delete plan")
                        .clicked()
                    {
                        action = EditorAction::Delete(id);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = if busy { "Saving..." } else { "Save" };
                    let save_btn = egui::Button::new(RichText::new(label).color(Color32::WHITE))
                        .fill(theme::ACCENT)
                        .rounding(egui::Rounding::same(4.0));
                    if ui.add_enabled(!busy, save_btn).clicked() {
                        match editor.to_draft() {
                            Ok(draft) => action = EditorAction::Save(draft),
                            Err(e) => editor.error = Some(e.to_string()),
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        action = EditorAction::Close;
                    }
                });
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = EditorAction::Close;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn editor() -> PlanEditor {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        PlanEditor::open(PlanDraft::new(
            date,
            TimeOfDay::from_hm(2, 0).unwrap(),
            TimeOfDay::from_hm(3, 0).unwrap(),
        ))
    }

    #[test]
    fn open_prefills_time_fields() {
        let e = editor();
        assert_eq!(e.start_text, "02:00");
        assert_eq!(e.end_text, "03:00");
        assert!(e.error.is_none());
    }

    #[test]
    fn typed_times_replace_draft_times() {
        let mut e = editor();
        e.start_text = "14:15".into();
        e.end_text = " ".into();
        let draft = e.to_draft().unwrap();
        assert_eq!(draft.start_time, TimeOfDay::from_hm(14, 15));
        assert_eq!(draft.end_time, None);
    }

    #[test]
    fn malformed_time_is_reported() {
        let mut e = editor();
        e.end_text = "7pm".into();
        assert!(e.to_draft().is_err());
    }
}
