//! Main askpanel window

use crate::gui::details;
use crate::{PrimaryAction, QueryController};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(106, 124, 255);
const ERROR: egui::Color32 = egui::Color32::from_rgb(255, 107, 107);

/// Storage key for the persisted UI state
const STATE_KEY: &str = "askpanel_state";

/// UI state restored between runs
#[derive(Default, Serialize, Deserialize)]
struct PersistedState {
    query: String,
    show_details: bool,
}

/// Main application state
pub struct QueryApp {
    controller: QueryController,
    /// Show the metadata side panel
    show_details: bool,
    /// Show about dialog
    show_about: bool,
    /// Focus the input on the next frame
    focus_input: bool,
}

impl QueryApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut controller: QueryController) -> Self {
        let restored: PersistedState = cc
            .storage
            .and_then(|s| eframe::get_value(s, STATE_KEY))
            .unwrap_or_default();
        controller.panel_mut().query = restored.query;

        Self {
            controller,
            show_details: restored.show_details,
            show_about: false,
            focus_input: true,
        }
    }

    /// Primary control: search when idle, stop when pending
    fn press_primary(&mut self) {
        if !self.controller.panel().is_pending() {
            self.focus_input = true;
        }
        self.controller.press_primary();
    }

    fn copy_answer(&self) {
        let answer = self.controller.panel().answer();
        if answer.is_empty() {
            return;
        }
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(answer) {
                    tracing::warn!(error = %e, "copy to clipboard failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
        }
    }

    /// Render menu bar
    fn render_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let has_answer = !self.controller.panel().answer().is_empty();
                    if ui
                        .add_enabled(has_answer, egui::Button::new("Copy Answer"))
                        .clicked()
                    {
                        self.copy_answer();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut self.show_details, "Show Details").clicked() {
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About askpanel").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });
    }

    /// Render status bar
    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let panel = self.controller.panel();
                if let Some(pending) = panel.pending_for() {
                    ui.spinner();
                    ui.label(format!(
                        "Waiting for {} ({})",
                        self.controller.client().endpoint(),
                        crate::format_elapsed(pending)
                    ));
                } else if let Some(stats) = panel.last_request() {
                    ui.label(crate::request_summary(stats));
                } else {
                    ui.label("Ready");
                }
            });
        });
    }

    /// Render about dialog
    fn render_about_dialog(&mut self, ctx: &egui::Context) {
        if self.show_about {
            egui::Window::new("About askpanel")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("askpanel");
                        ui.label(format!("Version {}", crate::VERSION));
                        ui.add_space(10.0);
                        ui.label("Ask a question, get an answer.");
                        ui.label(format!("Service: {}", self.controller.client().endpoint()));
                        if let Some(path) = crate::logging::log_path() {
                            ui.label(format!("Log: {}", path.display()));
                        }
                        ui.add_space(10.0);
                        if ui.button("OK").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }

    /// Greeting, input row and output area
    fn render_main(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(egui::RichText::new("Good to See You!").color(egui::Color32::GRAY));
            ui.heading("How Can I be an Assistance?");
            ui.label("I\u{2019}m available 24/7 for you, ask me anything.");
            ui.add_space(24.0);
        });

        self.render_input_row(ui);

        ui.add_space(24.0);
        self.render_output(ui);
    }

    fn render_input_row(&mut self, ui: &mut egui::Ui) {
        let pending = self.controller.panel().is_pending();
        let action = self.controller.panel().primary_action();
        let mut commit = false;
        let mut primary = false;
        let mut stop = false;

        ui.horizontal(|ui| {
            let _ = ui.button("\u{1F642}").on_hover_text("Smile");

            let buttons_width = if pending { 90.0 } else { 45.0 };
            let response = ui.add_enabled(
                !pending,
                egui::TextEdit::singleline(&mut self.controller.panel_mut().query)
                    .desired_width(ui.available_width() - buttons_width)
                    .hint_text("Ask anything\u{2026}"),
            );

            if self.focus_input && !pending {
                response.request_focus();
                self.focus_input = false;
            }

            // Single-line edits lose focus on Enter; Shift+Enter never submits
            if response.lost_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift)
            {
                commit = true;
            }

            if ui
                .button(action.icon())
                .on_hover_text(action.label())
                .clicked()
            {
                primary = true;
            }

            if pending && ui.button("\u{23F9}").on_hover_text(PrimaryAction::Stop.label()).clicked() {
                stop = true;
            }
        });

        if commit {
            self.focus_input = true;
            self.controller.submit();
        } else if primary {
            self.press_primary();
        } else if stop {
            self.controller.cancel_query();
        }
    }

    fn render_output(&self, ui: &mut egui::Ui) {
        let panel = self.controller.panel();

        if panel.is_pending() {
            ui.vertical_centered(|ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(egui::RichText::new("Thinking\u{2026}").color(ACCENT).strong());
                });
            });
            return;
        }

        if !panel.error_message().is_empty() {
            ui.vertical_centered(|ui| {
                ui.colored_label(ERROR, format!("Error: {}", panel.error_message()));
            });
            return;
        }

        if !panel.answer().is_empty() {
            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.add(egui::Label::new(panel.answer()).wrap().selectable(true));
                });
            });
        }
    }
}

impl eframe::App for QueryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.process_messages();

        self.render_menu(ctx);
        self.render_status_bar(ctx);
        self.render_about_dialog(ctx);

        if self.show_details {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(280.0)
                .show(ctx, |ui| {
                    details::render(ui, self.controller.panel().meta());
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_main(ui);
        });

        // Results arrive over a channel; keep polling while one is due
        if self.controller.panel().is_pending() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedState {
            query: self.controller.panel().query.clone(),
            show_details: self.show_details,
        };
        eframe::set_value(storage, STATE_KEY, &state);
    }
}
