//! Metadata table for the last answer

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use serde_json::{Map, Value};

pub fn render(ui: &mut egui::Ui, meta: &Map<String, Value>) {
    ui.heading("Details");
    ui.separator();

    if meta.is_empty() {
        ui.label(egui::RichText::new("No metadata for this answer").weak());
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(120.0).at_least(40.0).clip(true))
        .column(Column::remainder().at_least(40.0).clip(true))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Key");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
        })
        .body(|mut body| {
            for (key, value) in meta {
                let text = crate::format_meta_value(value);
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(key);
                    });
                    row.col(|ui| {
                        ui.label(&text).on_hover_text(&text);
                    });
                });
            }
        });
}
