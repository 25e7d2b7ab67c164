use crate::tui::input::{EditResult, LineEditor};
use crate::tui::ui;
use crate::QueryController;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

pub struct App {
    pub controller: QueryController,
    pub editor: LineEditor,

    /// Show the metadata table of the last answer
    pub show_meta: bool,
    /// Advances every tick while a request is pending
    pub spinner_frame: usize,

    pub should_quit: bool,
}

impl App {
    pub fn new(controller: QueryController) -> Self {
        Self {
            controller,
            editor: LineEditor::default(),
            show_meta: false,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> crate::Result<()> {
        let tick_rate = Duration::from_millis(50);
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.controller.process_messages();
                if self.controller.panel().is_pending() {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                }
                last_tick = Instant::now();
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    // --- Key handling ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.should_quit = true;
                return;
            }
            KeyCode::Esc => {
                if self.controller.panel().is_pending() {
                    self.controller.cancel_query();
                } else if !self.controller.panel().query.is_empty() {
                    let panel = self.controller.panel_mut();
                    self.editor.clear(&mut panel.query);
                } else {
                    self.should_quit = true;
                }
                return;
            }
            KeyCode::F(2) => {
                self.show_meta = !self.show_meta;
                return;
            }
            _ => {}
        }

        // Input is disabled while a request is in flight
        if self.controller.panel().is_pending() {
            return;
        }

        let panel = self.controller.panel_mut();
        if self.editor.handle_key(&mut panel.query, key) == EditResult::Commit {
            self.controller.submit();
        }
    }
}
