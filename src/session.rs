use crate::client::{GenerationError, StoryGenerator};
use crate::models::{Creativity, Genre, StoryRecord};
use crate::prompt::PromptTemplates;
use crate::utils::strings;
use chrono::Local;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Please enter your OpenAI API key!")]
    MissingCredential,

    #[error("Please enter a story topic!")]
    MissingTopic,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl GenerateError {
    /// Validation failures are shown as warnings, the rest as errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, GenerateError::MissingCredential | GenerateError::MissingTopic)
    }

    pub fn user_message(&self) -> String {
        match self {
            GenerateError::Generation(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// What the form hands over on "generate".
#[derive(Debug, Clone)]
pub struct StoryRequest<'a> {
    pub topic: &'a str,
    pub genre: Genre,
    pub length_label: &'a str,
    pub creativity: Creativity,
}

/// Everything one interactive session remembers. Dropped when the session ends.
pub struct Session {
    api_key: String,
    templates: PromptTemplates,
    stories: VecDeque<StoryRecord>,
    total_words: usize,
    total_sentences: usize,
}

impl Session {
    pub fn new(default_api_key: String, templates: PromptTemplates) -> Self {
        Self {
            api_key: default_api_key.trim().to_string(),
            templates,
            stories: VecDeque::new(),
            total_words: 0,
            total_sentences: 0,
        }
    }

    /// A typed key replaces the startup default. Empty input keeps what we have.
    pub fn set_api_key(&mut self, key: &str) {
        let key = key.trim();
        if !key.is_empty() {
            self.api_key = key.to_string();
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn generate(
        &mut self,
        generator: &dyn StoryGenerator,
        request: &StoryRequest<'_>,
    ) -> Result<&StoryRecord, GenerateError> {
        if !self.has_api_key() {
            warn!("generation rejected: no api key");
            return Err(GenerateError::MissingCredential);
        }
        if request.topic.trim().is_empty() {
            warn!("generation rejected: empty topic");
            return Err(GenerateError::MissingTopic);
        }

        let prompts = self.templates.build(
            request.topic,
            request.genre,
            request.length_label,
            request.creativity,
        );

        info!(
            genre = request.genre.label(),
            length = request.length_label,
            creativity = request.creativity.value(),
            topic_chars = request.topic.chars().count(),
            "generating story"
        );

        let story = generator.generate(&self.api_key, &prompts).map_err(|e| {
            warn!(error = %e, "story generation failed");
            GenerateError::Generation(e)
        })?;

        let (words, sentences) = strings::count_words_and_sentences(&story);
        self.total_words += words;
        self.total_sentences += sentences;

        self.stories.push_front(StoryRecord {
            prompt: request.topic.to_string(),
            genre: request.genre,
            story,
            words,
            sentences,
            created_at: Local::now(),
        });

        info!(words, sentences, stories = self.stories.len(), "story generated");
        Ok(&self.stories[0])
    }

    pub fn clear(&mut self) {
        info!(dropped = self.stories.len(), "history cleared");
        self.stories.clear();
        self.total_words = 0;
        self.total_sentences = 0;
    }

    /// Newest first.
    pub fn stories(&self) -> impl Iterator<Item = &StoryRecord> {
        self.stories.iter()
    }

    pub fn latest(&self) -> Option<&StoryRecord> {
        self.stories.front()
    }

    pub fn story(&self, idx: usize) -> Option<&StoryRecord> {
        self.stories.get(idx)
    }

    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    pub fn total_words(&self) -> usize {
        self.total_words
    }

    pub fn total_sentences(&self) -> usize {
        self.total_sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoryLength;
    use crate::prompt::Prompts;
    use std::cell::RefCell;

    /// Hands out canned replies and remembers every call.
    struct FakeGenerator {
        replies: RefCell<Vec<Result<String, GenerationError>>>,
        calls: RefCell<Vec<(String, Prompts)>>,
    }

    impl FakeGenerator {
        fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl StoryGenerator for FakeGenerator {
        fn generate(&self, api_key: &str, prompts: &Prompts) -> Result<String, GenerationError> {
            self.calls
                .borrow_mut()
                .push((api_key.to_string(), prompts.clone()));
            self.replies.borrow_mut().remove(0)
        }
    }

    fn session(key: &str) -> Session {
        Session::new(key.to_string(), PromptTemplates::load().unwrap())
    }

    fn request(topic: &str) -> StoryRequest<'_> {
        StoryRequest {
            topic,
            genre: Genre::Fantasy,
            length_label: StoryLength::Medium.label(),
            creativity: Creativity::new(0.9),
        }
    }

    #[test]
    fn starts_empty() {
        let s = session("");
        assert_eq!(s.story_count(), 0);
        assert_eq!(s.total_words(), 0);
        assert_eq!(s.total_sentences(), 0);
        assert!(s.latest().is_none());
    }

    #[test]
    fn missing_key_is_rejected_before_any_call() {
        let gen = FakeGenerator::new(vec![Ok("never".into())]);
        let mut s = session("");
        let err = s.generate(&gen, &request("dragons")).unwrap_err();
        assert!(matches!(err, GenerateError::MissingCredential));
        assert!(err.is_validation());
        assert_eq!(gen.calls(), 0);
        assert_eq!(s.story_count(), 0);
    }

    #[test]
    fn whitespace_default_key_is_rejected() {
        let gen = FakeGenerator::new(vec![Ok("never".into())]);
        let mut s = session("  \t");
        assert!(!s.has_api_key());
        let err = s.generate(&gen, &request("dragons")).unwrap_err();
        assert!(matches!(err, GenerateError::MissingCredential));
        assert_eq!(gen.calls(), 0);
    }

    #[test]
    fn default_key_is_trimmed() {
        assert_eq!(session(" sk-env\n").api_key(), "sk-env");
    }

    #[test]
    fn empty_topic_is_rejected_before_any_call() {
        let gen = FakeGenerator::new(vec![Ok("never".into())]);
        let mut s = session("sk-test");
        for topic in ["", "   \n"] {
            let err = s.generate(&gen, &request(topic)).unwrap_err();
            assert!(matches!(err, GenerateError::MissingTopic));
        }
        assert_eq!(gen.calls(), 0);
    }

    #[test]
    fn success_prepends_one_record_and_bumps_counters() {
        let gen = FakeGenerator::new(vec![
            Ok("First story. It ends!".into()),
            Ok("Second one? Yes.".into()),
        ]);
        let mut s = session("sk-test");

        let first = s.generate(&gen, &request("a quiet village")).unwrap();
        assert_eq!((first.words, first.sentences), (4, 2));
        assert_eq!(first.prompt, "a quiet village");
        assert_eq!(first.genre, Genre::Fantasy);
        assert_eq!((s.total_words(), s.total_sentences()), (4, 2));

        s.generate(&gen, &request("a storm")).unwrap();
        assert_eq!(s.story_count(), 2);
        assert_eq!(s.latest().unwrap().prompt, "a storm");
        assert_eq!(s.story(1).unwrap().prompt, "a quiet village");
        assert_eq!((s.total_words(), s.total_sentences()), (7, 4));
    }

    #[test]
    fn generator_receives_key_and_built_prompts() {
        let gen = FakeGenerator::new(vec![Ok("Done.".into())]);
        let mut s = session("sk-env");
        s.set_api_key("sk-typed");
        s.generate(&gen, &request("a lost robot")).unwrap();

        let calls = gen.calls.borrow();
        let (key, prompts) = &calls[0];
        assert_eq!(key, "sk-typed");
        assert!(prompts.user.contains("a lost robot"));
        assert!(prompts.user.contains("about 300 words"));
        assert!((prompts.temperature - 0.9).abs() < 1e-6);
    }

    #[test]
    fn failure_leaves_state_untouched() {
        let gen = FakeGenerator::new(vec![
            Ok("Kept. Safe.".into()),
            Err(GenerationError::RateLimited("quota".into())),
        ]);
        let mut s = session("sk-test");
        s.generate(&gen, &request("one")).unwrap();

        let err = s.generate(&gen, &request("two")).unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(
            err.user_message(),
            "Story generation failed: rate limit or quota exceeded: quota"
        );
        assert_eq!(s.story_count(), 1);
        assert_eq!((s.total_words(), s.total_sentences()), (2, 2));
    }

    #[test]
    fn clear_resets_everything() {
        let gen = FakeGenerator::new(vec![Ok("A. B. C.".into()), Ok("D!".into())]);
        let mut s = session("sk-test");
        s.generate(&gen, &request("x")).unwrap();
        s.generate(&gen, &request("y")).unwrap();

        s.clear();
        assert_eq!(s.story_count(), 0);
        assert_eq!((s.total_words(), s.total_sentences()), (0, 0));

        s.clear();
        assert_eq!(s.story_count(), 0);
        assert!(s.has_api_key());
    }

    #[test]
    fn empty_key_input_keeps_current() {
        let mut s = session("sk-env");
        s.set_api_key("  ");
        assert_eq!(s.api_key(), "sk-env");
        s.set_api_key("sk-new");
        assert_eq!(s.api_key(), "sk-new");
    }
}
