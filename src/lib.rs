//! Day planner core and egui front end.
//!
//! The core (`model`, `store`, `controller`, `worker`, `io`) has no egui
//! dependency and can drive a plan service directly: [`store::PlanStore`]
//! offers both the synchronous `load_day`/`create`/`update`/`remove` calls and
//! the split `begin_*`/`finish_*` halves used by the GUI through
//! [`worker::BackendWorker`].

pub mod app;
pub mod controller;
pub mod io;
pub mod model;
pub mod store;
pub mod ui;
pub mod worker;
