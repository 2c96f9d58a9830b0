use crate::app::App;
use crate::ui::utils::{centered, hex_to_rgb, main_area, render_footer, render_header};
use crate::utils::strings;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    render_header(f, app);

    let area = centered(main_area(f), 82);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)))
        .title(Span::styled(
            " Generation history ",
            Style::default().fg(hex_to_rgb(&app.theme.main)),
        ));

    let lines = history_lines(app, area.width.saturating_sub(2), Some(app.history_selected));

    // each entry takes two rows; keep the selection on screen
    let visible_rows = area.height.saturating_sub(2) as usize;
    let selected_bottom = (app.history_selected + 1) * 2;
    let scroll = selected_bottom.saturating_sub(visible_rows) as u16;

    f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
    render_footer(f, app);
}

/// Compact history panel next to the form.
pub fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)))
        .title(Span::styled(
            " History ",
            Style::default().fg(hex_to_rgb(&app.theme.main)),
        ));
    let lines = history_lines(app, area.width.saturating_sub(2), None);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn history_lines(app: &App, width: u16, selected: Option<usize>) -> Vec<Line<'static>> {
    let sub = hex_to_rgb(&app.theme.sub);
    let text = hex_to_rgb(&app.theme.text);
    let main = hex_to_rgb(&app.theme.main);

    if app.session.story_count() == 0 {
        return vec![Line::styled(
            " No stories yet. Generate your first one!",
            Style::default().fg(sub),
        )];
    }

    let mut lines = Vec::new();
    for (idx, record) in app.session.stories().enumerate() {
        let is_selected = selected == Some(idx);
        let title_style = if is_selected {
            Style::default().fg(main).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(text)
        };

        lines.push(Line::from(vec![
            Span::styled(if is_selected { "> " } else { "  " }, title_style),
            Span::styled(
                format!("{} - {}", record.genre, record.timestamp_label()),
                title_style,
            ),
        ]));

        let detail = format!(
            "{}w {}s | {}",
            record.words, record.sentences, record.prompt
        );
        lines.push(Line::styled(
            format!("    {}", strings::preview(&detail, width.saturating_sub(5) as usize)),
            Style::default().fg(sub),
        ));
    }
    lines
}
