#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use day_planner::app::PlannerApp;
use day_planner::io::{AppConfig, ConfigOrigin, HttpBackend, MemoryBackend, PlanBackend};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let loaded = AppConfig::load();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = loaded
            .as_ref()
            .map(|l| l.config.log_filter.as_str())
            .unwrap_or("info");
        EnvFilter::new(directive)
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match loaded {
        Ok(loaded) => {
            match loaded.origin {
                ConfigOrigin::Created => tracing::info!(path = ?loaded.path, "wrote default settings"),
                ConfigOrigin::Read => tracing::debug!(path = ?loaded.path, "settings loaded"),
            }
            loaded.config
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not load settings, using defaults");
            AppConfig::default()
        }
    };
    let (backend, label) = choose_backend(&config);
    tracing::info!(backend = %label, "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Day Planner"),
        ..Default::default()
    };

    eframe::run_native(
        "Day Planner",
        options,
        Box::new(move |cc| Ok(Box::new(PlannerApp::new(cc, backend, label)))),
    )
}

fn choose_backend(config: &AppConfig) -> (Box<dyn PlanBackend>, String) {
    if config.offline {
        return (Box::new(MemoryBackend::new()), "offline (in memory)".to_string());
    }
    match HttpBackend::from_config(config) {
        Ok(http) => {
            let label = http.base_url().to_string();
            (Box::new(http), label)
        }
        Err(e) => {
            tracing::warn!(error = %e, "http client unavailable, falling back to in-memory plans");
            (Box::new(MemoryBackend::new()), "offline (in memory)".to_string())
        }
    }
}
