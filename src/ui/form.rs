use crate::app::{App, Field, StatusKind};
use crate::ui::history;
use crate::ui::utils::{centered, hex_to_rgb, main_area, render_footer, render_header, wrap_text};
use crate::utils::strings;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const TOPIC_ROWS: usize = 3;
const SLIDER_CELLS: usize = 20;

pub fn draw(f: &mut Frame, app: &App) {
    render_header(f, app);

    let area = centered(main_area(f), 94);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TOPIC_ROWS as u16 + 9),
            Constraint::Length(1),
            Constraint::Min(5),
        ])
        .split(columns[0]);

    draw_settings(f, app, left[0]);
    draw_status(f, app, left[1]);
    draw_latest(f, app, left[2]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(app.tips.len() as u16 + 2),
            Constraint::Min(3),
        ])
        .split(columns[1]);

    draw_stats(f, app, right[0]);
    draw_tips(f, app, right[1]);
    history::draw_sidebar(f, app, right[2]);

    render_footer(f, app);
}

fn draw_settings(f: &mut Frame, app: &App, area: Rect) {
    let sub = hex_to_rgb(&app.theme.sub);
    let text = hex_to_rgb(&app.theme.text);
    let main = hex_to_rgb(&app.theme.main);

    let label = |field: Field, name: &'static str| {
        let focused = app.focus == field;
        let style = if focused {
            Style::default().fg(main).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(sub)
        };
        Span::styled(format!("{} {:<12}", if focused { ">" } else { " " }, name), style)
    };
    let value = |s: String| Span::styled(s, Style::default().fg(text));

    let mut lines = Vec::new();

    let key_display = if app.api_key_input.is_empty() {
        Span::styled("(not set)", Style::default().fg(sub))
    } else {
        value(strings::mask(&app.api_key_input))
    };
    lines.push(Line::from(vec![label(Field::ApiKey, "API key"), key_display]));

    lines.push(Line::from(label(Field::Topic, "Topic")));
    let width = area.width.saturating_sub(6);
    let topic_lines = if app.topic.is_empty() {
        vec![String::new()]
    } else {
        wrap_text(&app.topic, width)
    };
    // keep the end of the topic in view while typing
    let skip = topic_lines.len().saturating_sub(TOPIC_ROWS);
    for (i, row) in topic_lines.iter().skip(skip).enumerate() {
        let mut spans = vec![Span::raw("    "), value(row.clone())];
        let is_last = skip + i + 1 == topic_lines.len();
        if is_last && app.focus == Field::Topic {
            spans.push(Span::styled(" ", Style::default().bg(hex_to_rgb(&app.theme.caret))));
        }
        if app.topic.is_empty() && app.focus != Field::Topic {
            spans = vec![
                Span::raw("    "),
                Span::styled("e.g. an astronaut discovering a new planet", Style::default().fg(sub)),
            ];
        }
        lines.push(Line::from(spans));
    }
    for _ in topic_lines.len().min(TOPIC_ROWS)..TOPIC_ROWS {
        lines.push(Line::raw(""));
    }

    lines.push(Line::from(vec![
        label(Field::Genre, "Genre"),
        value(format!("‹ {} ›", app.genre)),
    ]));
    lines.push(Line::from(vec![
        label(Field::Length, "Length"),
        value(format!("‹ {} ›", app.length.label())),
    ]));

    let filled = (app.creativity.value() * 10.0).round() as usize;
    lines.push(Line::from(vec![
        label(Field::Creativity, "Creativity"),
        Span::styled("━".repeat(filled), Style::default().fg(main)),
        Span::styled("─".repeat(SLIDER_CELLS - filled.min(SLIDER_CELLS)), Style::default().fg(sub)),
        value(format!(" {}", app.creativity)),
    ]));

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("  "),
        button(app, Field::Generate, "[ Generate story ]"),
        Span::raw("   "),
        button(app, Field::Clear, "[ Clear history ]"),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)))
        .title(Span::styled(" Story settings ", Style::default().fg(main)));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn button(app: &App, field: Field, text: &'static str) -> Span<'static> {
    if app.focus == field {
        Span::styled(
            text,
            Style::default()
                .fg(hex_to_rgb(&app.theme.bg))
                .bg(hex_to_rgb(&app.theme.main))
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(text, Style::default().fg(hex_to_rgb(&app.theme.sub)))
    }
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let Some(status) = &app.status else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => hex_to_rgb(&app.theme.sub),
        StatusKind::Success => hex_to_rgb(&app.theme.main),
        StatusKind::Warning | StatusKind::Error => hex_to_rgb(&app.theme.error),
    };
    let prefix = match status.kind {
        StatusKind::Warning => "⚠ ",
        StatusKind::Error => "✗ ",
        StatusKind::Success => "✓ ",
        StatusKind::Info => "",
    };
    f.render_widget(
        Paragraph::new(format!(" {}{}", prefix, status.text)).style(Style::default().fg(color)),
        area,
    );
}

fn draw_latest(f: &mut Frame, app: &App, area: Rect) {
    let sub = hex_to_rgb(&app.theme.sub);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)));

    let Some(record) = app.session.latest() else {
        f.render_widget(
            Paragraph::new("No stories yet. Generate your first one!")
                .style(Style::default().fg(sub))
                .block(block.title(" Your story ")),
            area,
        );
        return;
    };

    let width = area.width.saturating_sub(2);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Prompt: ", Style::default().fg(sub)),
            Span::styled(
                strings::preview(&record.prompt, width.saturating_sub(8) as usize),
                Style::default().fg(hex_to_rgb(&app.theme.text)),
            ),
        ]),
        Line::raw(""),
    ];

    // the footer line always stays visible; the story is cut to fit
    let body_rows = area.height.saturating_sub(2 + 2 + 2) as usize;
    let story_lines = wrap_text(&record.story, width);
    let truncated = story_lines.len() > body_rows;
    for row in story_lines.into_iter().take(body_rows) {
        lines.push(Line::styled(row, Style::default().fg(hex_to_rgb(&app.theme.text))));
    }
    if truncated {
        if let Some(last) = lines.last_mut() {
            *last = Line::styled("… (ctrl+o to read it in full)", Style::default().fg(sub));
        }
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!(
            "{} words | {} sentences | {}",
            record.words,
            record.sentences,
            record.timestamp_label()
        ),
        Style::default().fg(sub),
    ));

    let title = Span::styled(
        format!(" {} ", record.genre),
        Style::default()
            .fg(hex_to_rgb(&app.theme.main))
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(Paragraph::new(lines).block(block.title(title)), area);
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let main = hex_to_rgb(&app.theme.main);
    let sub = hex_to_rgb(&app.theme.sub);
    let stat = |n: usize, label: &'static str, color: Color| {
        Line::from(vec![
            Span::styled(format!(" {:>7} ", n), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(label, Style::default().fg(sub)),
        ])
    };

    let lines = vec![
        stat(app.session.story_count(), "stories generated", main),
        stat(app.session.total_words(), "total words", hex_to_rgb(&app.theme.text)),
        stat(app.session.total_sentences(), "total sentences", hex_to_rgb(&app.theme.text)),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)))
        .title(Span::styled(" Statistics ", Style::default().fg(main)));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_tips(f: &mut Frame, app: &App, area: Rect) {
    let sub = hex_to_rgb(&app.theme.sub);
    let lines: Vec<Line> = app
        .tips
        .iter()
        .map(|tip| Line::styled(format!(" - {}", tip), Style::default().fg(sub)))
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)))
        .title(Span::styled(" Tips ", Style::default().fg(hex_to_rgb(&app.theme.main))));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
