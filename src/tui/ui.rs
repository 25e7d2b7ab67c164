use crate::tui::app::App;
use crate::PrimaryAction;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const ACCENT: Color = Color::Rgb(106, 124, 255);
const ERROR: Color = Color::Rgb(255, 107, 107);
const BAR_BG: Color = Color::Rgb(0, 95, 135);

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Greeting
            Constraint::Length(3), // Input
            Constraint::Min(3),    // Output
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_greeting(frame, chunks[0]);
    draw_input(frame, app, chunks[1]);

    if app.show_meta && !app.controller.panel().meta().is_empty() {
        let output = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(meta_height(app))])
            .split(chunks[2]);
        draw_output(frame, app, output[0]);
        draw_meta(frame, app, output[1]);
    } else {
        draw_output(frame, app, chunks[2]);
    }

    draw_status_bar(frame, app, chunks[3]);

    if !app.controller.panel().is_pending() {
        // Border (1) + prompt "> " (2)
        let query = &app.controller.panel().query;
        let cursor_x = chunks[1].x + 1 + 2 + app.editor.cursor_column(query);
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position(Position::new(cursor_x, cursor_y));
    }
}

fn draw_greeting(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Good to See You!", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            "How Can I be an Assistance?",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "I\u{2019}m available 24/7 for you, ask me anything.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let panel = app.controller.panel();
    let action = panel.primary_action();

    let border_style = match action {
        PrimaryAction::Stop => Style::default().fg(Color::DarkGray),
        PrimaryAction::Search => Style::default().fg(Color::Cyan),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Ask ")
        .title_bottom(
            Line::from(format!(" {} {} ", action.icon(), action.label())).right_aligned(),
        );

    let line = if panel.query.is_empty() && !panel.is_pending() {
        Line::from(vec![
            Span::raw("> "),
            Span::styled("Ask anything\u{2026}", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        let text_style = if panel.is_pending() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![Span::raw("> "), Span::styled(panel.query.as_str(), text_style)])
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_output(frame: &mut Frame, app: &App, area: Rect) {
    let panel = app.controller.panel();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Answer ");

    let paragraph = if panel.is_pending() {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        Paragraph::new(Line::from(Span::styled(
            format!("{} Thinking\u{2026}", spinner),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
    } else if !panel.error_message().is_empty() {
        Paragraph::new(Line::from(Span::styled(
            format!("Error: {}", panel.error_message()),
            Style::default().fg(ERROR),
        )))
        .wrap(Wrap { trim: false })
    } else {
        Paragraph::new(panel.answer()).wrap(Wrap { trim: false })
    };

    frame.render_widget(paragraph.block(block), area);
}

fn meta_height(app: &App) -> u16 {
    (app.controller.panel().meta().len() as u16 + 3).min(12)
}

fn draw_meta(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.controller.panel().meta().iter().map(|(key, value)| {
        Row::new(vec![
            Cell::from(key.as_str()).style(Style::default().fg(Color::Cyan)),
            Cell::from(crate::format_meta_value(value)),
        ])
    });

    let header = Row::new(vec!["Key", "Value"]).style(
        Style::default()
            .fg(Color::White)
            .bg(BAR_BG)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(10)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Details "),
        );

    frame.render_widget(table, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let panel = app.controller.panel();
    let left_text = if let Some(pending) = panel.pending_for() {
        format!(
            " \u{23F3} Waiting for {} ({})",
            app.controller.client().endpoint(),
            crate::format_elapsed(pending)
        )
    } else if let Some(stats) = panel.last_request() {
        format!(" {}", crate::request_summary(stats))
    } else {
        " Ready".to_string()
    };

    let right_text = if panel.is_pending() {
        " Esc:Stop  F2:Details  Ctrl+Q:Quit "
    } else {
        " Enter:Ask  Esc:Clear  F2:Details  Ctrl+Q:Quit "
    };

    let available_width = area.width as usize;
    let left_len = left_text.chars().count();
    let right_len = right_text.len();

    let status_str = if left_len + right_len < available_width {
        let padding = available_width - left_len - right_len;
        format!("{}{:padding$}{}", left_text, "", right_text, padding = padding)
    } else {
        format!("{:width$}", left_text, width = available_width)
    };

    let status = Paragraph::new(status_str).style(Style::default().fg(Color::White).bg(BAR_BG));

    frame.render_widget(status, area);
}
