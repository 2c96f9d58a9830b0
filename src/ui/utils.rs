use ratatui::style::Color;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use textwrap::Options;
use crate::app::{App, Screen};

pub fn hex_to_rgb(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    // byte slicing below needs ascii
    if hex.len() == 6 && hex.is_ascii() {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
        Color::Rgb(r, g, b)
    } else {
        Color::White
    }
}

/// Wraps each paragraph on its own so blank lines in the story survive.
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    let width = (width as usize).max(10);
    let options = Options::new(width).break_words(true);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(
            textwrap::wrap(paragraph, &options)
                .into_iter()
                .map(|cow| cow.into_owned()),
        );
    }
    lines
}

/// Same horizontal framing on every screen: a centered column with margins.
pub fn centered(area: Rect, percent: u16) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Percentage(percent),
            Constraint::Fill(1),
        ])
        .split(area)[1]
}

pub fn main_area(f: &Frame) -> Rect {
    Rect::new(0, 2, f.area().width, f.area().height.saturating_sub(3))
}

pub fn render_header(f: &mut Frame, app: &App) {
    let mut header_spans = vec![Span::styled(
        "fabula",
        Style::default()
            .fg(hex_to_rgb(&app.theme.main))
            .add_modifier(Modifier::BOLD),
    )];

    let section = match app.screen {
        Screen::Form => "story generator".to_string(),
        Screen::History => format!("history ({})", app.session.story_count()),
        Screen::Story(idx) => format!("story #{}", idx + 1),
    };
    header_spans.push(Span::styled(
        format!(" | {}", section),
        Style::default().fg(hex_to_rgb(&app.theme.sub)),
    ));

    let header_row_area = Rect::new(0, 1, f.area().width, 1);
    f.render_widget(
        Paragraph::new(Line::from(header_spans)),
        centered(header_row_area, 90),
    );
}

pub fn render_footer(f: &mut Frame, app: &App) {
    let hints = match app.screen {
        Screen::Form => "tab: next field | ←/→: change | ctrl+g: generate | ctrl+s: save | ctrl+o: history | esc: quit",
        Screen::History => "↑/↓: select | enter: open | s: save | esc: back",
        Screen::Story(_) => "↑/↓/pgup/pgdn: scroll | s: save | esc: back",
    };
    let footer = Paragraph::new(hints)
        .style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)))
        .alignment(Alignment::Center);
    f.render_widget(
        footer,
        Rect::new(0, f.area().height.saturating_sub(1), f.area().width, 1),
    );
}
