use crate::models::{target_words, Creativity, Genre};
use anyhow::{Context, Result};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "resources/"]
pub struct Asset;

pub fn load_asset(path: &str) -> Result<String> {
    let file = Asset::get(path).context(format!("Could not find embedded resource: {}", path))?;
    let text = std::str::from_utf8(file.data.as_ref())?;
    Ok(text.trim_end().to_string())
}

/// The two chat messages sent for one story.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    system: String,
    user: String,
}

impl PromptTemplates {
    pub fn load() -> Result<Self> {
        Ok(Self {
            system: load_asset("prompts/system.txt")?,
            user: load_asset("prompts/user.txt")?,
        })
    }

    /// Interpolates the form inputs. The topic is passed through as is, callers
    /// reject an empty one before getting here.
    pub fn build(
        &self,
        topic: &str,
        genre: Genre,
        length_label: &str,
        creativity: Creativity,
    ) -> Prompts {
        let target = target_words(length_label).to_string();
        let genre_lower = genre.label().to_lowercase();
        let fill = |template: &str| {
            template
                .replace("{genre_lower}", &genre_lower)
                .replace("{genre}", genre.label())
                .replace("{target_words}", &target)
                .replace("{topic}", topic)
        };

        Prompts {
            system: fill(&self.system),
            user: fill(&self.user),
            temperature: creativity.value(),
        }
    }
}
