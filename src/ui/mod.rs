pub mod day_timeline;
pub mod dialogs;
pub mod plan_editor;
pub mod summary_panel;
pub mod theme;
pub mod toolbar;
