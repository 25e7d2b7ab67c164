pub mod app;
pub mod details;

use crate::QueryController;

/// Entry point: launch the native GUI window
pub fn run(controller: QueryController) -> crate::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("askpanel")
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "askpanel",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::QueryApp::new(cc, controller)))),
    )
    .map_err(|e| crate::AskError::Gui(e.to_string()))
}
