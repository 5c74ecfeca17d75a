use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use ev_dashboard::aggregate::table::spec_for;
use ev_dashboard::aggregate::{ViewKind, ViewRequest};
use ev_dashboard::data::source::FileSource;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – view selector
// ---------------------------------------------------------------------------

/// Render the left view panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Views");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for kind in ViewKind::ALL {
                let selected = state.request.kind == kind;
                if ui
                    .selectable_label(selected, kind.label())
                    .on_hover_text(kind.description())
                    .clicked()
                {
                    state.select_view(kind);
                }
            }

            ui.separator();
            limit_controls(ui, state);
        });
}

/// Top-N / per-group-N controls for the views that rank groups.
fn limit_controls(ui: &mut Ui, state: &mut AppState) {
    let spec = spec_for(state.request.kind);
    let request = state.request;
    let mut next = request;

    if let Some(default_n) = spec.top_n {
        let mut n = request.top_n.unwrap_or(default_n);
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Show top");
            if ui.add(DragValue::new(&mut n).range(0..=50)).changed() {
                next = next.with_top_n(n);
            }
        });
    }

    if let Some(default_n) = spec.per_group_n {
        let mut n = request.per_group_n.unwrap_or(default_n);
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Per group");
            if ui.add(DragValue::new(&mut n).range(0..=20)).changed() {
                next = next.with_per_group_n(n);
            }
        });
    }

    let has_limits = spec.top_n.is_some() || spec.per_group_n.is_some();
    if has_limits && ui.small_button("Reset").clicked() {
        next = ViewRequest::new(request.kind);
    }

    if next != request {
        state.set_request(next);
    }
}

// ---------------------------------------------------------------------------
// Right side panel – insights
// ---------------------------------------------------------------------------

pub fn insights_panel(ui: &mut Ui, state: &AppState) {
    let kind = state.request.kind;
    ui.heading(kind.title());
    ui.label(RichText::new(kind.description()).italics());
    ui.separator();

    let Some(result) = &state.result else {
        return;
    };

    ui.strong("Insights");
    if result.insights.is_empty() {
        ui.label("Nothing to report for this view.");
        return;
    }
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for insight in &result.insights {
                ui.horizontal_wrapped(|ui: &mut Ui| {
                    ui.label("•");
                    ui.label(insight);
                });
                ui.add_space(2.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.result.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export view as JSON…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let mode = if state.dark_mode { "☀ Light" } else { "🌙 Dark" };
        if ui.button(mode).clicked() {
            state.toggle_dark_mode();
        }

        ui.separator();

        if state.is_loading() {
            ui.spinner();
            ui.label(format!(
                "Loading {}…",
                state.source_location.as_deref().unwrap_or("dataset")
            ));
        } else if let Some(ds) = state.ingest.dataset() {
            ui.label(format!(
                "{} vehicles loaded from {}",
                ds.len(),
                state.source_location.as_deref().unwrap_or("memory")
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open EV registration data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("opening {}", path.display());
        state.start_load(Box::new(FileSource::new(path)));
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export view")
        .add_filter("JSON", &["json"])
        .set_file_name(format!("{}.json", state.request.kind.id()))
        .save_file();

    let Some(path) = file else {
        return;
    };
    match state.export_json(&path) {
        Ok(()) => {
            log::info!("exported {} to {}", state.request.kind, path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
