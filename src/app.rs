use chrono::{Local, NaiveDate, NaiveDateTime};
use std::time::Duration;

use crate::controller::{self, TimelineController, TimelineIntent};
use crate::io::{AppConfig, PlanBackend};
use crate::model::{DayNavigator, PlanDraft, PlanId};
use crate::store::{LoadOutcome, PlanError, PlanStore};
use crate::ui;
use crate::ui::plan_editor::{EditorAction, PlanEditor};
use crate::worker::{BackendWorker, Job, JobResult};

/// How often the view repaints on its own so the now line keeps moving.
const NOW_LINE_TICK: Duration = Duration::from_secs(30);

/// Main application state.
pub struct PlannerApp {
    navigator: DayNavigator,
    store: PlanStore,
    controller: TimelineController,
    worker: Option<BackendWorker>,
    backend_label: String,

    // Dialog state
    editor: Option<PlanEditor>,
    pub show_about: bool,

    pub status_message: String,
    /// Scroll offset applied on the next frame, then cleared.
    pending_scroll: Option<f32>,
}

impl PlannerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        backend: Box<dyn PlanBackend>,
        backend_label: String,
    ) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let repaint_ctx = cc.egui_ctx.clone();
        let (worker, status_message) =
            match BackendWorker::spawn(backend, move || repaint_ctx.request_repaint()) {
                Ok(worker) => (Some(worker), "Ready".to_string()),
                Err(e) => {
                    tracing::error!(error = %e, "could not start backend worker");
                    (None, format!("Backend unavailable: {}", e))
                }
            };
        let mut app = Self::from_parts(worker, backend_label, Local::now().naive_local());
        if app.status_message.is_empty() {
            app.status_message = status_message;
        }
        app
    }

    /// App state for today with the first load already queued.
    fn from_parts(worker: Option<BackendWorker>, backend_label: String, now: NaiveDateTime) -> Self {
        let navigator = DayNavigator::new(now.date());
        let mut app = Self {
            store: PlanStore::new(navigator.date()),
            pending_scroll: controller::initial_scroll(navigator.date(), now),
            navigator,
            controller: TimelineController::new(),
            worker,
            backend_label,
            editor: None,
            show_about: false,
            status_message: String::new(),
        };
        app.request_load();
        app
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.navigator.date()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn is_today(&self) -> bool {
        self.navigator.is_today(Local::now().date_naive())
    }

    /// While the editor is open its draft is tied to the viewed day, so day
    /// navigation is locked.
    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn backend_label(&self) -> &str {
        &self.backend_label
    }

    // --- Navigation ---

    pub fn select_date(&mut self, date: NaiveDate) {
        if self.navigator.set_date(date) {
            self.day_changed();
        }
    }

    pub fn next_day(&mut self) {
        if self.navigator.next_day() {
            self.day_changed();
        }
    }

    pub fn previous_day(&mut self) {
        if self.navigator.previous_day() {
            self.day_changed();
        }
    }

    pub fn go_to_today(&mut self) {
        self.select_date(Local::now().date_naive());
    }

    fn day_changed(&mut self) {
        let date = self.navigator.date();
        if self.editor.take().is_some() {
            tracing::debug!(%date, "day changed, discarding open draft");
        }
        self.store.select(date);
        self.controller.set_raised(None);
        self.pending_scroll = controller::initial_scroll(date, Local::now().naive_local());
        self.status_message = format!("Viewing {}", date.format("%A, %B %-d, %Y"));
        self.request_load();
    }

    // --- Backend traffic ---

    /// Ask the worker for the selected day's plans.
    pub fn request_load(&mut self) {
        let ticket = self.store.begin_load();
        if let Err(e) = self.submit(Job::Load(ticket)) {
            match self.store.finish_load(ticket, Err(e)) {
                Ok(LoadOutcome::Applied(_)) | Ok(LoadOutcome::Stale) => {}
                Err(e) => self.status_message = format!("Could not load plans: {}", e),
            }
        }
    }

    fn submit(&self, job: Job) -> Result<(), crate::io::TransportError> {
        match &self.worker {
            Some(worker) => worker.submit(job),
            None => Err(crate::io::TransportError::Unavailable("no backend worker".into())),
        }
    }

    pub fn open_add(&mut self) {
        self.editor = Some(PlanEditor::open(
            self.controller.add_template(self.navigator.date()),
        ));
    }

    fn handle_intent(&mut self, intent: TimelineIntent) {
        let draft = match intent {
            TimelineIntent::Create(draft) | TimelineIntent::Edit(draft) => draft,
        };
        self.editor = Some(PlanEditor::open(draft));
    }

    fn save(&mut self, draft: PlanDraft) {
        let is_new = draft.is_new();
        let begun = if is_new {
            self.store.begin_create(&draft)
        } else {
            self.store.begin_update(&draft)
        };
        let item = match begun {
            Ok(item) => item,
            Err(e) => return self.show_editor_error(&e),
        };
        let job = if is_new {
            Job::Create(item)
        } else {
            Job::Update(item)
        };
        if let Err(e) = self.submit(job) {
            let failed = if is_new {
                self.store.finish_create(Err(e))
            } else {
                self.store.finish_update(Err(e))
            };
            if let Err(e) = failed {
                self.show_editor_error(&e);
            }
        }
    }

    fn delete(&mut self, id: PlanId) {
        let change = match self.store.begin_remove(&id) {
            Ok(change) => change,
            Err(e) => return self.show_editor_error(&e),
        };
        let date = change.date();
        if let Err(e) = self.submit(Job::Delete { date, id: id.clone() }) {
            if let Err(e) = self.store.finish_remove(date, &id, Err(e)) {
                self.show_editor_error(&e);
            }
        }
    }

    fn show_editor_error(&mut self, error: &PlanError) {
        match self.editor.as_mut() {
            Some(editor) => editor.error = Some(error.to_string()),
            None => self.status_message = error.to_string(),
        }
    }

    /// Commit every answer the worker has produced since the last frame.
    fn process_results(&mut self) {
        let results = match &self.worker {
            Some(worker) => worker.drain(),
            None => return,
        };
        for result in results {
            match result {
                JobResult::Loaded(ticket, result) => match self.store.finish_load(ticket, result) {
                    Ok(LoadOutcome::Applied(_)) | Ok(LoadOutcome::Stale) => {}
                    Err(e) => self.status_message = format!("Could not load plans: {}", e),
                },
                JobResult::Created(result) => match self.store.finish_create(result) {
                    Ok(item) => {
                        self.editor = None;
                        self.status_message = format!("Added '{}'", item.title);
                    }
                    Err(e) => self.show_editor_error(&e),
                },
                JobResult::Updated(result) => match self.store.finish_update(result) {
                    Ok(item) => {
                        self.editor = None;
                        self.status_message = format!("Updated '{}'", item.title);
                    }
                    Err(e) => self.show_editor_error(&e),
                },
                JobResult::Deleted { date, id, result } => {
                    match self.store.finish_remove(date, &id, result) {
                        Ok(()) => {
                            self.editor = None;
                            self.status_message = "Plan deleted".to_string();
                        }
                        Err(e) => self.show_editor_error(&e),
                    }
                }
            }
        }
    }

    // --- File operations ---

    pub fn export_csv(&mut self) {
        let plans = self.store.items();
        if plans.is_empty() {
            self.status_message = "Nothing to export, no plans on this day".to_string();
            return;
        }

        let default_name = format!("plans-{}.csv", self.navigator.date_key());
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(&default_name)
            .save_file()
        {
            match crate::io::csv_export::export_day(plans, &path) {
                Ok(count) => {
                    self.status_message = format!("Exported {} plans to CSV", count);
                }
                Err(e) => {
                    tracing::warn!(error = %e, ?path, "csv export failed");
                    self.status_message = format!("CSV export failed: {}", e);
                }
            }
        }
    }

    pub fn open_settings_folder(&mut self) {
        let opened = AppConfig::config_dir().and_then(|dir| {
            std::fs::create_dir_all(&dir)?;
            open::that(&dir)?;
            Ok(())
        });
        if let Err(e) = opened {
            tracing::warn!(error = %e, "could not open settings folder");
            self.status_message = format!("Could not open settings folder: {}", e);
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Plans: {}", self.store.items().len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        if let Some(error) = self.store.last_error() {
                            ui.label(
                                egui::RichText::new(egui_phosphor::regular::WARNING)
                                    .color(ui::theme::TEXT_ERROR),
                            )
                            .on_hover_text(error.to_string());
                        }
                    });
                });
            });
    }

    fn show_timeline(&mut self, ctx: &egui::Context, now: NaiveDateTime) -> Option<TimelineIntent> {
        let frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let scroll_to = self.pending_scroll.take();
        egui::CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| {
                ui::day_timeline::show_day_timeline(
                    &mut self.controller,
                    self.store.items(),
                    self.navigator.date(),
                    now,
                    scroll_to,
                    ui,
                )
            })
            .inner
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        self.process_results();
        if self.store.needs_refresh() && !self.store.is_loading() {
            self.request_load();
        }

        // Arrow keys step through days unless a text field has focus
        if !self.is_editing() && !ctx.wants_keyboard_input() {
            let (prev, next) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::ArrowLeft),
                    i.key_pressed(egui::Key::ArrowRight),
                )
            });
            if prev {
                self.previous_day();
            } else if next {
                self.next_day();
            }
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        self.show_status_bar(ctx);

        // Right panel: day summary
        egui::SidePanel::right("summary_panel")
            .exact_width(ui::theme::SUMMARY_PANEL_WIDTH)
            .resizable(false)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(12.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                ui::summary_panel::show_summary_panel(
                    self.navigator.date(),
                    &self.store.category_counts(),
                    ui,
                );
            });

        // Central panel: timeline
        let now = Local::now().naive_local();
        if let Some(intent) = self.show_timeline(ctx, now) {
            if self.editor.is_none() {
                self.handle_intent(intent);
            }
        }

        // Dialogs
        let busy = self.store.is_busy();
        let action = match self.editor.as_mut() {
            Some(editor) => ui::plan_editor::show_plan_editor(editor, busy, ctx),
            None => EditorAction::None,
        };
        match action {
            EditorAction::Save(draft) => self.save(draft),
            EditorAction::Delete(id) => self.delete(id),
            EditorAction::Close => self.editor = None,
            EditorAction::None => {}
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }

        ctx.request_repaint_after(NOW_LINE_TICK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryBackend;
    use std::time::Duration;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn app_with(backend: &MemoryBackend) -> PlannerApp {
        let worker = BackendWorker::spawn(backend.clone(), || {}).unwrap();
        PlannerApp::from_parts(Some(worker), "memory".into(), day(1).and_hms_opt(12, 0, 0).unwrap())
    }

    fn settle(app: &mut PlannerApp) {
        for _ in 0..200 {
            app.process_results();
            if !app.store.is_busy() && !app.store.is_loading() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("worker did not answer");
    }

    #[test]
    fn changing_day_discards_the_open_draft() {
        let backend = MemoryBackend::new();
        let mut app = app_with(&backend);
        settle(&mut app);

        let intent = app.controller.click(&[], day(1), 540.0);
        app.handle_intent(intent);
        assert!(app.is_editing());

        app.next_day();
        assert_eq!(app.selected_date(), day(2));
        assert!(!app.is_editing());
        settle(&mut app);
        assert!(backend.stored(day(1)).is_empty());
        assert!(backend.stored(day(2)).is_empty());
    }

    #[test]
    fn saved_draft_lands_on_the_viewed_day_and_closes_the_editor() {
        let backend = MemoryBackend::new();
        let mut app = app_with(&backend);
        settle(&mut app);

        app.open_add();
        let mut draft = app.editor.as_ref().unwrap().draft.clone();
        draft.title = "Review".into();
        app.save(draft);
        settle(&mut app);
        // The follow-up reload is queued on the next frame.
        app.request_load();
        settle(&mut app);

        assert!(!app.is_editing());
        assert_eq!(backend.stored(day(1)).len(), 1);
        assert_eq!(app.store.items().len(), 1);
        assert_eq!(app.status_message, "Added 'Review'");
    }

    #[test]
    fn missing_worker_is_reported_instead_of_loading() {
        let app = PlannerApp::from_parts(None, "none".into(), day(1).and_hms_opt(8, 0, 0).unwrap());
        assert!(!app.is_loading());
        assert!(app.status_message.starts_with("Could not load plans"));
    }
}
