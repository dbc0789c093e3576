#![allow(dead_code)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use formvis::config::ConfigManager;
use formvis::{App, AppEvent, FormSpec, FormState, QueryParams};
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
pub fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

pub fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn app_with(spec: FormSpec, query: &str) -> App {
    let form = FormState::from_params(spec, &QueryParams::parse(query)).unwrap();
    App::new(form)
}

/// Feed an event and every follow-up event it produces, like the main loop does.
/// Returns true when the chain ended in an exit.
pub fn dispatch(app: &mut App, event: AppEvent) -> bool {
    let mut next = Some(event);
    while let Some(event) = next {
        if matches!(event, AppEvent::Exit) {
            return true;
        }
        next = app.event(&event);
    }
    false
}
