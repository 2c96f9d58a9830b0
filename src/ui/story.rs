use crate::app::App;
use crate::ui::utils::{centered, hex_to_rgb, main_area, render_footer, render_header, wrap_text};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App, idx: usize) {
    render_header(f, app);

    let Some(record) = app.session.story(idx) else {
        render_footer(f, app);
        return;
    };

    let area = centered(main_area(f), 76);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let sub = hex_to_rgb(&app.theme.sub);
    let main = hex_to_rgb(&app.theme.main);

    let info = vec![
        Line::from(vec![
            Span::styled(
                record.genre.label(),
                Style::default().fg(main).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", record.timestamp_label()), Style::default().fg(sub)),
        ]),
        Line::from(vec![
            Span::styled("Prompt: ", Style::default().fg(sub)),
            Span::styled(
                record.prompt.replace('\n', " "),
                Style::default().fg(hex_to_rgb(&app.theme.text)),
            ),
        ]),
        Line::styled(
            format!("{} words | {} sentences", record.words, record.sentences),
            Style::default().fg(sub),
        ),
    ];
    f.render_widget(Paragraph::new(info), chunks[0]);

    let body = chunks[1];
    let lines: Vec<Line> = wrap_text(&record.story, body.width.saturating_sub(2))
        .into_iter()
        .map(|row| Line::styled(row, Style::default().fg(hex_to_rgb(&app.theme.text))))
        .collect();

    // don't scroll past the last line
    let visible = body.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible) as u16;
    app.story_max_scroll.set(max_scroll);
    let scroll = app.story_scroll.min(max_scroll);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)));
    f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), body);

    render_footer(f, app);
}
