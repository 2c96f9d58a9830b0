use crate::client::StoryGenerator;
use crate::config::Theme;
use crate::export;
use crate::models::{Creativity, Genre, StoryLength};
use crate::session::{Session, StoryRequest};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::Cell;
use std::path::PathBuf;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ApiKey,
    Topic,
    Genre,
    Length,
    Creativity,
    Generate,
    Clear,
}

impl Field {
    const ORDER: [Field; 7] = [
        Field::ApiKey,
        Field::Topic,
        Field::Genre,
        Field::Length,
        Field::Creativity,
        Field::Generate,
        Field::Clear,
    ];

    fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    History,
    Story(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// Initial form values, taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct FormDefaults {
    pub topic: String,
    pub genre: Genre,
    pub length: StoryLength,
    pub creativity: Creativity,
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub focus: Field,
    pub theme: Theme,
    pub tips: Vec<String>,

    pub session: Session,

    pub api_key_input: String,
    pub topic: String,
    pub genre: Genre,
    pub length: StoryLength,
    pub creativity: Creativity,

    pub history_selected: usize,
    pub story_scroll: u16,
    /// Last line offset the story view can show, written on every draw.
    pub story_max_scroll: Cell<u16>,
    pub status: Option<Status>,
    pub pending_generation: bool,

    export_dir: PathBuf,
}

impl App {
    pub fn new(
        session: Session,
        defaults: FormDefaults,
        theme: Theme,
        tips: Vec<String>,
        export_dir: PathBuf,
    ) -> Self {
        let api_key_input = session.api_key().to_string();
        Self {
            should_quit: false,
            screen: Screen::Form,
            focus: if api_key_input.is_empty() { Field::ApiKey } else { Field::Topic },
            theme,
            tips,
            session,
            api_key_input,
            topic: defaults.topic,
            genre: defaults.genre,
            length: defaults.length,
            creativity: defaults.creativity,
            history_selected: 0,
            story_scroll: 0,
            story_max_scroll: Cell::new(0),
            status: None,
            pending_generation: false,
            export_dir,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        // AltGr arrives as ctrl+alt on some layouts
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('q') if ctrl => return self.quit(),
            KeyCode::Char('g') if ctrl => return self.request_generation(),
            KeyCode::Char('s') if ctrl => return self.save_latest(),
            KeyCode::Char('o') if ctrl => return self.toggle_history(),
            // other ctrl chords must not leak into the text fields
            KeyCode::Char(_) if ctrl && !alt => return,
            _ => {}
        }

        match self.screen {
            Screen::Form => self.on_form_key(key),
            Screen::History => self.on_history_key(key),
            Screen::Story(idx) => self.on_story_key(key, idx),
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Enter => match self.focus {
                Field::Topic => self.topic.push('\n'),
                Field::Generate => self.request_generation(),
                Field::Clear => self.clear_history(),
                _ => self.focus = self.focus.next(),
            },
            KeyCode::Left => self.adjust(false),
            KeyCode::Right => self.adjust(true),
            KeyCode::Backspace => match self.focus {
                Field::ApiKey => {
                    self.api_key_input.pop();
                }
                Field::Topic => {
                    self.topic.pop();
                }
                _ => {}
            },
            KeyCode::Char(c) => match self.focus {
                Field::ApiKey => self.api_key_input.push(c),
                Field::Topic => self.topic.push(c),
                Field::Creativity if c == '+' => self.adjust(true),
                Field::Creativity if c == '-' => self.adjust(false),
                _ => {}
            },
            _ => {}
        }
    }

    fn adjust(&mut self, forward: bool) {
        match (self.focus, forward) {
            (Field::Genre, true) => self.genre = self.genre.next(),
            (Field::Genre, false) => self.genre = self.genre.prev(),
            (Field::Length, true) => self.length = self.length.next(),
            (Field::Length, false) => self.length = self.length.prev(),
            (Field::Creativity, true) => self.creativity = self.creativity.increase(),
            (Field::Creativity, false) => self.creativity = self.creativity.decrease(),
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        let count = self.session.story_count();
        match key.code {
            KeyCode::Esc => self.screen = Screen::Form,
            KeyCode::Up => self.history_selected = self.history_selected.saturating_sub(1),
            KeyCode::Down if self.history_selected + 1 < count => self.history_selected += 1,
            KeyCode::Enter if count > 0 => {
                self.story_scroll = 0;
                self.screen = Screen::Story(self.history_selected);
            }
            KeyCode::Char('s') if count > 0 => self.save_story(self.history_selected),
            _ => {}
        }
    }

    fn on_story_key(&mut self, key: KeyEvent, idx: usize) {
        let max = self.story_max_scroll.get();
        match key.code {
            KeyCode::Esc => self.screen = Screen::History,
            KeyCode::Up => self.story_scroll = self.story_scroll.saturating_sub(1),
            KeyCode::Down => self.story_scroll = self.story_scroll.saturating_add(1).min(max),
            KeyCode::PageUp => self.story_scroll = self.story_scroll.saturating_sub(10),
            KeyCode::PageDown => self.story_scroll = self.story_scroll.saturating_add(10).min(max),
            KeyCode::Char('s') => self.save_story(idx),
            _ => {}
        }
    }

    fn toggle_history(&mut self) {
        self.screen = match self.screen {
            Screen::Form => {
                self.history_selected = 0;
                Screen::History
            }
            _ => Screen::Form,
        };
    }

    /// Queues a generation. The caller draws one frame and then runs it,
    /// so the "generating" line is visible while the request blocks.
    pub fn request_generation(&mut self) {
        self.session.set_api_key(&self.api_key_input);
        self.screen = Screen::Form;
        self.pending_generation = true;
        if self.session.has_api_key() && !self.topic.trim().is_empty() {
            self.set_status(StatusKind::Info, "Generating your story...");
        }
    }

    pub fn run_generation(&mut self, generator: &dyn StoryGenerator) {
        if !self.pending_generation {
            return;
        }
        self.pending_generation = false;

        let request = StoryRequest {
            topic: &self.topic,
            genre: self.genre,
            length_label: self.length.label(),
            creativity: self.creativity,
        };

        let outcome = self.session.generate(generator, &request).map(|_| ());
        match outcome {
            Ok(()) => self.set_status(StatusKind::Success, "Story generated successfully!"),
            Err(e) if e.is_validation() => self.set_status(StatusKind::Warning, e.user_message()),
            Err(e) => self.set_status(StatusKind::Error, e.user_message()),
        }
    }

    pub fn clear_history(&mut self) {
        self.session.clear();
        self.history_selected = 0;
        self.set_status(StatusKind::Info, "History cleared.");
    }

    fn save_latest(&mut self) {
        if self.session.latest().is_none() {
            self.set_status(StatusKind::Warning, "Nothing to save yet.");
            return;
        }
        let idx = match self.screen {
            Screen::Story(idx) => idx,
            Screen::History => self.history_selected,
            Screen::Form => 0,
        };
        self.save_story(idx);
    }

    fn save_story(&mut self, idx: usize) {
        let Some(record) = self.session.story(idx) else {
            return;
        };
        // the latest story keeps the plain name, older entries carry their index
        let history_idx = (idx > 0).then_some(idx);
        match export::save_story(&self.export_dir, record, history_idx) {
            Ok(path) => self.set_status(StatusKind::Success, format!("Saved to {}", path.display())),
            Err(e) => {
                error!(error = %e, "export failed");
                self.set_status(StatusKind::Error, format!("Could not save story: {e:#}"));
            }
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            kind,
            text: text.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GenerationError;
    use crate::prompt::{PromptTemplates, Prompts};

    struct Canned {
        reply: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl StoryGenerator for Canned {
        fn generate(&self, _: &str, _: &Prompts) -> Result<String, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            self.reply
                .map(str::to_string)
                .ok_or(GenerationError::Network("connection refused".into()))
        }
    }

    fn canned(reply: Option<&'static str>) -> Canned {
        Canned {
            reply,
            calls: Cell::new(0),
        }
    }

    fn app(key: &str, export_dir: PathBuf) -> App {
        let session = Session::new(key.to_string(), PromptTemplates::load().unwrap());
        App::new(session, FormDefaults::default(), Theme::default(), Vec::new(), export_dir)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn focus_starts_on_key_when_none_configured() {
        assert_eq!(app("", PathBuf::from(".")).focus, Field::ApiKey);
        assert_eq!(app("sk-env", PathBuf::from(".")).focus, Field::Topic);
    }

    #[test]
    fn tab_cycles_fields_and_wraps() {
        let mut a = app("", PathBuf::from("."));
        for _ in 0..Field::ORDER.len() {
            press(&mut a, KeyCode::Tab);
        }
        assert_eq!(a.focus, Field::ApiKey);
        press(&mut a, KeyCode::BackTab);
        assert_eq!(a.focus, Field::Clear);
    }

    #[test]
    fn arrows_adjust_selectors() {
        let mut a = app("sk", PathBuf::from("."));
        a.focus = Field::Genre;
        press(&mut a, KeyCode::Right);
        assert_eq!(a.genre, Genre::Fantasy);
        a.focus = Field::Length;
        press(&mut a, KeyCode::Left);
        assert_eq!(a.length, StoryLength::Long);
        a.focus = Field::Creativity;
        press(&mut a, KeyCode::Right);
        press(&mut a, KeyCode::Char('+'));
        assert_eq!(a.creativity.to_string(), "0.9");
    }

    #[test]
    fn topic_accepts_multiline_text() {
        let mut a = app("sk", PathBuf::from("."));
        type_str(&mut a, "two moons");
        press(&mut a, KeyCode::Enter);
        type_str(&mut a, "x");
        press(&mut a, KeyCode::Backspace);
        assert_eq!(a.topic, "two moons\n");
    }

    #[test]
    fn missing_topic_warns_without_calling() {
        let gen = canned(Some("never"));
        let mut a = app("sk", PathBuf::from("."));
        ctrl(&mut a, 'g');
        a.run_generation(&gen);

        assert_eq!(gen.calls.get(), 0);
        let status = a.status.unwrap();
        assert_eq!(status.kind, StatusKind::Warning);
        assert_eq!(status.text, "Please enter a story topic!");
    }

    #[test]
    fn typed_key_is_used_for_generation() {
        let gen = canned(Some("The end."));
        let mut a = app("", PathBuf::from("."));
        type_str(&mut a, "sk-typed");
        press(&mut a, KeyCode::Tab);
        type_str(&mut a, "a haunted mill");
        ctrl(&mut a, 'g');
        assert_eq!(a.status.as_ref().unwrap().kind, StatusKind::Info);

        a.run_generation(&gen);
        assert_eq!(gen.calls.get(), 1);
        assert_eq!(a.session.api_key(), "sk-typed");
        assert_eq!(a.session.story_count(), 1);
        assert_eq!(a.status.unwrap().kind, StatusKind::Success);
    }

    #[test]
    fn failure_is_shown_and_history_kept() {
        let gen = canned(None);
        let mut a = app("sk", PathBuf::from("."));
        type_str(&mut a, "topic");
        a.request_generation();
        a.run_generation(&gen);

        let status = a.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Story generation failed: network error: connection refused");
        assert_eq!(a.session.story_count(), 0);
    }

    #[test]
    fn run_without_request_is_noop() {
        let gen = canned(Some("x"));
        let mut a = app("sk", PathBuf::from("."));
        a.run_generation(&gen);
        assert_eq!(gen.calls.get(), 0);
    }

    #[test]
    fn clear_button_resets_session() {
        let gen = canned(Some("One. Two."));
        let mut a = app("sk", PathBuf::from("."));
        type_str(&mut a, "t");
        a.request_generation();
        a.run_generation(&gen);

        a.focus = Field::Clear;
        press(&mut a, KeyCode::Enter);
        assert_eq!(a.session.story_count(), 0);
        assert_eq!(a.session.total_words(), 0);
        assert_eq!(a.session.total_sentences(), 0);
    }

    #[test]
    fn history_navigation_and_save() {
        let tmp = tempfile::tempdir().unwrap();
        let gen = canned(Some("Saved text."));
        let mut a = app("sk", tmp.path().to_path_buf());
        type_str(&mut a, "t");
        for _ in 0..2 {
            a.request_generation();
            a.run_generation(&gen);
        }

        ctrl(&mut a, 'o');
        assert_eq!(a.screen, Screen::History);
        press(&mut a, KeyCode::Down);
        press(&mut a, KeyCode::Down);
        assert_eq!(a.history_selected, 1);
        press(&mut a, KeyCode::Enter);
        assert_eq!(a.screen, Screen::Story(1));

        press(&mut a, KeyCode::Char('s'));
        let status = a.status.clone().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        let saved: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(saved.len(), 1);

        press(&mut a, KeyCode::Esc);
        assert_eq!(a.screen, Screen::History);
        press(&mut a, KeyCode::Esc);
        assert_eq!(a.screen, Screen::Form);
    }

    #[test]
    fn story_scroll_stops_at_last_line() {
        let gen = canned(Some("Line.\n\nLine.\n\nLine.\n\nLine."));
        let mut a = app("sk", PathBuf::from("."));
        type_str(&mut a, "t");
        a.request_generation();
        a.run_generation(&gen);
        ctrl(&mut a, 'o');
        press(&mut a, KeyCode::Enter);
        a.story_max_scroll.set(3);

        for _ in 0..50 {
            press(&mut a, KeyCode::PageDown);
        }
        assert_eq!(a.story_scroll, 3);
        press(&mut a, KeyCode::Up);
        assert_eq!(a.story_scroll, 2);
        press(&mut a, KeyCode::Down);
        press(&mut a, KeyCode::Down);
        assert_eq!(a.story_scroll, 3);
    }

    #[test]
    fn altgr_chars_reach_the_topic() {
        let mut a = app("sk", PathBuf::from("."));
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        a.on_key(KeyEvent::new(KeyCode::Char('@'), altgr));
        a.on_key(KeyEvent::new(KeyCode::Char('{'), altgr));
        ctrl(&mut a, 'x');
        assert_eq!(a.topic, "@{");
    }

    #[test]
    fn save_without_story_warns() {
        let mut a = app("sk", PathBuf::from("."));
        ctrl(&mut a, 's');
        assert_eq!(a.status.unwrap().kind, StatusKind::Warning);
    }

    #[test]
    fn esc_on_form_quits() {
        let mut a = app("sk", PathBuf::from("."));
        press(&mut a, KeyCode::Esc);
        assert!(a.should_quit);
    }
}
