use std::time::Duration;

use eframe::egui;

use crate::cli::AppConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EvDashboardApp {
    pub state: AppState,
}

impl EvDashboardApp {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for EvDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The loader thread cannot wake the UI, so keep polling while it runs.
        self.state.poll_load();
        if self.state.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        ctx.set_visuals(if self.state.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: view selector ----
        egui::SidePanel::left("view_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: insights ----
        egui::SidePanel::right("insights_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::insights_panel(ui, &self.state);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart(ui, &self.state);
        });
    }
}
