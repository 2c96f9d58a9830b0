use chrono::{DateTime, Local};
use std::fmt;

pub const DEFAULT_TARGET_WORDS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Genre {
    #[default]
    ScienceFiction,
    Fantasy,
    Thriller,
    Romance,
    Horror,
    Adventure,
    Detective,
    Comedy,
}

impl Genre {
    pub const ALL: [Genre; 8] = [
        Genre::ScienceFiction,
        Genre::Fantasy,
        Genre::Thriller,
        Genre::Romance,
        Genre::Horror,
        Genre::Adventure,
        Genre::Detective,
        Genre::Comedy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Genre::ScienceFiction => "Science Fiction",
            Genre::Fantasy => "Fantasy",
            Genre::Thriller => "Thriller",
            Genre::Romance => "Romance",
            Genre::Horror => "Horror",
            Genre::Adventure => "Adventure",
            Genre::Detective => "Detective",
            Genre::Comedy => "Comedy",
        }
    }

    /// Accepts the display label or a loose cli spelling ("sci-fi", "science_fiction").
    pub fn from_label(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "sciencefiction" | "scifi" => Some(Genre::ScienceFiction),
            "fantasy" => Some(Genre::Fantasy),
            "thriller" => Some(Genre::Thriller),
            "romance" => Some(Genre::Romance),
            "horror" => Some(Genre::Horror),
            "adventure" => Some(Genre::Adventure),
            "detective" => Some(Genre::Detective),
            "comedy" => Some(Genre::Comedy),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoryLength {
    #[default]
    Short,
    Medium,
    Long,
}

impl StoryLength {
    pub const ALL: [StoryLength; 3] = [StoryLength::Short, StoryLength::Medium, StoryLength::Long];

    pub fn label(self) -> &'static str {
        match self {
            StoryLength::Short => "Short (100-200 words)",
            StoryLength::Medium => "Medium (200-400 words)",
            StoryLength::Long => "Long (400-600 words)",
        }
    }

    pub fn target_words(self) -> u32 {
        match self {
            StoryLength::Short => 150,
            StoryLength::Medium => 300,
            StoryLength::Long => 500,
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.label() == s)
    }

    /// Bare bucket name as typed on the command line, or a full label.
    pub fn from_arg(s: &str) -> Option<Self> {
        if let Some(found) = Self::from_label(s) {
            return Some(found);
        }
        match s.trim().to_lowercase().as_str() {
            "short" => Some(StoryLength::Short),
            "medium" => Some(StoryLength::Medium),
            "long" => Some(StoryLength::Long),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

/// Target word count for a length label. Unknown labels fall back to the default.
pub fn target_words(label: &str) -> u32 {
    StoryLength::from_label(label)
        .map(StoryLength::target_words)
        .unwrap_or(DEFAULT_TARGET_WORDS)
}

/// Sampling temperature in tenths, 0.0 to 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Creativity(u8);

impl Creativity {
    const MAX_TENTHS: u8 = 20;

    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let tenths = (value * 10.0).round().clamp(0.0, Self::MAX_TENTHS as f32);
        Self(tenths as u8)
    }

    pub fn value(self) -> f32 {
        self.0 as f32 / 10.0
    }

    pub fn increase(self) -> Self {
        Self((self.0 + 1).min(Self::MAX_TENTHS))
    }

    pub fn decrease(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl Default for Creativity {
    fn default() -> Self {
        Self(7)
    }
}

impl fmt::Display for Creativity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoryRecord {
    pub prompt: String,
    pub genre: Genre,
    pub story: String,
    pub words: usize,
    pub sentences: usize,
    pub created_at: DateTime<Local>,
}

impl StoryRecord {
    pub fn timestamp_label(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}
