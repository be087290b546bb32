#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use activity_logger::export::ExportFile;
use activity_logger::{config, logging, Action, ActivityApp, PageView, SessionState};
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager, State, Window, WindowEvent};

/// One session per window, keyed by window label.
struct DesktopState {
    app: ActivityApp,
    sessions: Mutex<HashMap<String, SessionState>>,
}

#[derive(Deserialize)]
struct PageActionRequest {
    action: Action,
}

#[derive(Deserialize)]
struct ExportSubmissionsRequest {
    filename: String,
}

#[derive(Serialize)]
struct SaveCsvResult {
    ok: bool,
    canceled: bool,
    filename: String,
    rows: usize,
    path: Option<String>,
    error: Option<String>,
}

#[tauri::command]
fn app_version(app: AppHandle) -> String {
    app.package_info().version.to_string()
}

#[tauri::command]
fn page_current(window: Window, state: State<'_, DesktopState>) -> Result<PageView, String> {
    with_session(&state, window.label(), |app, session| {
        app.render(session, Vec::new())
    })
}

#[tauri::command]
fn page_action(
    window: Window,
    state: State<'_, DesktopState>,
    payload: PageActionRequest,
) -> Result<PageView, String> {
    with_session(&state, window.label(), |app, session| {
        app.handle(session, payload.action)
    })
}

#[tauri::command]
fn export_submissions(
    window: Window,
    state: State<'_, DesktopState>,
    payload: ExportSubmissionsRequest,
) -> Result<SaveCsvResult, String> {
    let file = with_session(&state, window.label(), |app, session| {
        app.export_submissions(session, payload.filename.as_str())
    })?
    .map_err(|err| err.to_string())?;
    save_csv_file(file)
}

fn save_csv_file(file: ExportFile) -> Result<SaveCsvResult, String> {
    let path = rfd::FileDialog::new()
        .set_file_name(file.filename.as_str())
        .add_filter("CSV", &["csv"])
        .save_file();

    let Some(path) = path else {
        return Ok(SaveCsvResult {
            ok: false,
            canceled: true,
            filename: file.filename,
            rows: file.rows,
            path: None,
            error: None,
        });
    };

    write_text_file(path.clone(), file.content.as_str())?;
    Ok(SaveCsvResult {
        ok: true,
        canceled: false,
        filename: file.filename,
        rows: file.rows,
        path: Some(path.to_string_lossy().to_string()),
        error: None,
    })
}

fn with_session<T>(
    state: &DesktopState,
    label: &str,
    f: impl FnOnce(&ActivityApp, &mut SessionState) -> T,
) -> Result<T, String> {
    let mut sessions = state
        .sessions
        .lock()
        .map_err(|_| "Session state is unavailable.".to_string())?;
    let session = sessions
        .entry(label.to_string())
        .or_insert_with(|| state.app.new_session());
    Ok(f(&state.app, session))
}

fn write_text_file(path: PathBuf, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    fs::write(path, content).map_err(|err| err.to_string())?;
    Ok(())
}

fn main() {
    let config = match config::load() {
        Ok(config) => config,
        Err(err) => {
            logging::init(&Default::default());
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(2);
        }
    };
    logging::init(&config.logging);

    let app = match ActivityApp::from_config(&config) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(error = %err, label = err.label(), "failed to open submissions store");
            std::process::exit(1);
        }
    };
    tracing::info!(store = %config.store.path.display(), "activity logger starting");

    tauri::Builder::default()
        .manage(DesktopState {
            app,
            sessions: Mutex::new(HashMap::new()),
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                let state = window.state::<DesktopState>();
                if let Ok(mut sessions) = state.sessions.lock() {
                    sessions.remove(window.label());
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            app_version,
            page_current,
            page_action,
            export_submissions
        ])
        .run(tauri::generate_context!())
        .expect("failed to run Activity Logger");
}
