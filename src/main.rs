mod app;
mod client;
mod config;
mod export;
mod logging;
mod models;
mod prompt;
mod session;
mod ui;
pub mod utils;

use anyhow::{bail, Result};
use app::{App, FormDefaults};
use clap::Parser;
use client::{OpenAiClient, StoryGenerator};
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use models::{Creativity, Genre, StoryLength};
use prompt::PromptTemplates;
use ratatui::{backend::CrosstermBackend, Terminal};
use session::{Session, StoryRequest};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "fabula")]
#[command(version)]
#[command(about = "Generate short stories from a topic, right in the terminal", long_about = None)]
struct Cli {
    /// Topic of the story. Given a topic, fabula prints one story and exits
    #[arg(short, long)]
    topic: Option<String>,

    /// Genre: "sci-fi", "fantasy", "thriller", "romance", "horror", "adventure", "detective", "comedy"
    #[arg(short, long, value_parser = parse_genre, default_value = "sci-fi")]
    genre: Genre,

    /// Length: "short" (~150 words), "medium" (~300) or "long" (~500)
    #[arg(short, long, value_parser = parse_length, default_value = "short")]
    length: StoryLength,

    /// Creativity (sampling temperature) from 0.0 to 2.0
    #[arg(short, long, value_parser = parse_creativity)]
    creativity: Option<Creativity>,

    /// OpenAI API key. Overrides OPENAI_API_KEY for this session
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory for saved stories
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Save the story after a one-shot run
    #[arg(long, default_value_t = false, requires = "topic")]
    save: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_genre(s: &str) -> Result<Genre, String> {
    Genre::from_label(s).ok_or_else(|| format!("unknown genre '{}'", s))
}

fn parse_length(s: &str) -> Result<StoryLength, String> {
    StoryLength::from_arg(s).ok_or_else(|| format!("unknown length '{}'", s))
}

fn parse_creativity(s: &str) -> Result<Creativity, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=2.0).contains(&value) {
        return Err("creativity must be between 0.0 and 2.0".to_string());
    }
    Ok(Creativity::new(value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config, using defaults. Error: {}",
            e
        );
        AppConfig::default()
    });

    // clap fills this from OPENAI_API_KEY when the flag is absent
    let api_key = cli.api_key.clone().unwrap_or_default();
    let templates = PromptTemplates::load()?;
    let session = Session::new(api_key, templates);
    let client = OpenAiClient::new(&app_config.generation)?;

    let export_dir = export::export_dir(
        cli.output_dir
            .as_deref()
            .or(app_config.export.dir.as_deref()),
    );

    let defaults = FormDefaults {
        topic: cli.topic.clone().unwrap_or_default(),
        genre: cli.genre,
        length: cli.length,
        creativity: cli
            .creativity
            .unwrap_or_else(|| Creativity::new(app_config.generation.default_creativity)),
    };

    if cli.topic.is_some() {
        logging::init_stderr(&cli.log_level)?;
        return run_once(session, &client, &defaults, cli.save.then_some(export_dir));
    }

    let _log_guard = match logging::init_file(&cli.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: file logging disabled: {:#}", e);
            None
        }
    };
    info!(model = client.model(), "starting interactive session");

    let tips: Vec<String> = prompt::load_asset("tips.txt")?
        .lines()
        .map(str::to_string)
        .collect();
    let mut app = App::new(session, defaults, app_config.theme, tips, export_dir);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &client);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    info!(stories = app.session.story_count(), "session ended");
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &dyn StoryGenerator,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if app.pending_generation {
            // blocks until the API answers; the frame above shows the status
            app.run_generation(client);
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.on_key(key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn run_once(
    mut session: Session,
    client: &dyn StoryGenerator,
    form: &FormDefaults,
    save_to: Option<PathBuf>,
) -> Result<()> {
    let request = StoryRequest {
        topic: &form.topic,
        genre: form.genre,
        length_label: form.length.label(),
        creativity: form.creativity,
    };

    let record = match session.generate(client, &request) {
        Ok(record) => record,
        Err(e) => bail!(e.user_message()),
    };

    println!("{}\n", record.story);
    println!(
        "{} | {} words | {} sentences | {}",
        record.genre,
        record.words,
        record.sentences,
        record.timestamp_label()
    );

    if let Some(dir) = save_to {
        match export::save_story(&dir, record, None) {
            Ok(path) => println!("Saved to {}", path.display()),
            Err(e) => {
                warn!(error = %e, "export failed");
                return Err(e);
            }
        }
    }
    Ok(())
}
