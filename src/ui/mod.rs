pub mod form;
pub mod history;
pub mod story;
pub mod utils;

use crate::app::{App, Screen};
use crate::ui::utils::hex_to_rgb;
use ratatui::{
    style::Style,
    widgets::Block,
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let bg_color = hex_to_rgb(&app.theme.bg);
    f.render_widget(
        Block::default().style(Style::default().bg(bg_color)),
        f.area(),
    );

    match app.screen {
        Screen::Form => form::draw(f, app),
        Screen::History => history::draw(f, app),
        Screen::Story(idx) => story::draw(f, app, idx),
    }
}
