use crate::client::{DEFAULT_API_BASE, DEFAULT_MODEL};
use anyhow::Result;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;

pub const APP_NAME: &str = "fabula";

#[derive(Debug, Deserialize, Clone)]
pub struct Theme {
    pub bg: String,      // background
    pub main: String,    // brand color (titles, focused field)
    pub caret: String,   // cursor block color
    pub text: String,    // story text
    pub sub: String,     // labels / unfocused fields
    #[serde(alias = "subAlt", alias = "subalt")]
    pub sub_alt: String, // subtle UI elements (footer, borders)
    pub error: String,   // warnings and failures
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: "#2c2e34".to_string(),
            main: "#e2b714".to_string(),
            caret: "#e2b714".to_string(),
            text: "#d1d0c5".to_string(),
            sub: "#646669".to_string(),
            sub_alt: "#45474d".to_string(),
            error: "#ca4754".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub api_base: String,
    /// None keeps the http client's own default
    pub timeout_secs: Option<u64>,
    pub default_creativity: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: None,
            default_creativity: 0.7,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportSettings {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub theme: Theme,
    pub generation: GenerationSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .filter(|p| p.exists());
        Self::load_from(path)
    }

    fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let theme = Theme::default();
        let generation = GenerationSettings::default();

        let mut builder = Config::builder()
            .set_default("theme.bg", theme.bg)?
            .set_default("theme.main", theme.main)?
            .set_default("theme.caret", theme.caret)?
            .set_default("theme.text", theme.text)?
            .set_default("theme.sub", theme.sub)?
            .set_default("theme.subAlt", theme.sub_alt)?
            .set_default("theme.error", theme.error)?
            .set_default("generation.model", generation.model)?
            .set_default("generation.api_base", generation.api_base)?
            .set_default("generation.default_creativity", generation.default_creativity as f64)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        // FABULA_GENERATION__MODEL=gpt-4o-mini and friends
        builder = builder.add_source(
            Environment::with_prefix("FABULA")
                .prefix_separator("_")
                .separator("__"),
        );

        let app_config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(app_config)
    }
}
