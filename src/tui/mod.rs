pub mod app;
pub mod input;
pub mod ui;

use crate::QueryController;

/// Entry point: take over the terminal until the user quits
pub fn run(controller: QueryController) -> crate::Result<()> {
    let mut terminal = ratatui::try_init()?;
    let mut app = app::App::new(controller);
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
