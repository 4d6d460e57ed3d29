mod script;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use caretta_config::{CharacterSet, FieldConfig};
use caretta_core::history::{HistoryConfig, PersistenceLayer};
use caretta_core::surface::SEPARATOR_MARKER;
use caretta_core::{
    Clock, Editor, EditorOptions, Formatter, ManualClock, MemorySurface, SystemClock,
};
use clap::Parser;

use crate::script::Runner;

/// Replays scripted input events against an editable field.
#[derive(Parser, Debug)]
#[command(name = "caretta", version, about)]
struct Cli {
    /// Script to replay. Reads stdin when omitted.
    script: Option<PathBuf>,

    /// Field config file (JSON). Defaults to the platform config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Multi-line field.
    #[arg(long)]
    area: bool,

    /// Only accept these characters.
    #[arg(long)]
    include: Option<String>,

    /// Reject these characters, on top of the configured ones.
    #[arg(long)]
    exclude: Option<String>,

    /// Maximum value length in chars.
    #[arg(long = "max-length")]
    max_length: Option<usize>,

    /// Undo coalescing window in milliseconds.
    #[arg(long)]
    window: Option<u64>,

    /// Render with a separator every N chars.
    #[arg(long)]
    group: Option<usize>,

    /// Load history from, and save it to, this session.
    #[arg(long)]
    session: Option<String>,

    /// Directory of the history database. Used with --session.
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,
}

impl Cli {
    fn field_config(&self) -> Result<FieldConfig> {
        let mut config = match &self.config {
            Some(path) => FieldConfig::load(path)?,
            None => FieldConfig::load_or_create(&FieldConfig::config_path()),
        };

        if self.area {
            config.area = true;
        }
        if self.include.is_some() || self.exclude.is_some() {
            let set = config
                .character_set
                .get_or_insert_with(CharacterSet::default);
            if let Some(include) = &self.include {
                set.include = Some(include.chars().collect());
            }
            if let Some(exclude) = &self.exclude {
                exclude.chars().for_each(|ch| set.exclude_char(ch));
            }
        }
        if let Some(max) = self.max_length {
            config.max_length = Some(max);
        }
        if let Some(window) = self.window {
            config.coalesce_window_ms = window;
        }
        if self.group.is_some() && !config.ignore.iter().any(|m| m == SEPARATOR_MARKER) {
            config.ignore.push(SEPARATOR_MARKER.to_string());
        }
        config.sanitize();
        Ok(config)
    }

    fn read_script(&self) -> Result<String> {
        match &self.script {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script: {}", path.display())),
            None => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("Failed to read script from stdin")?;
                Ok(source)
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.field_config()?;
    let commands = script::parse_script(&cli.read_script()?)?;
    tracing::debug!(commands = commands.len(), "Parsed script");

    let surface = match cli.group {
        Some(every) => MemorySurface::with_formatter(Formatter::grouped(every, " ")),
        None => MemorySurface::new(),
    };
    let options = EditorOptions::new(config.clone());

    let persistence = match &cli.session {
        Some(session) => {
            let data_dir = cli
                .data_dir
                .clone()
                .unwrap_or_else(|| HistoryConfig::from(&config).data_dir);
            Some((PersistenceLayer::open(&data_dir)?, session.clone()))
        }
        None => None,
    };

    let editor = match &persistence {
        Some((layer, session)) => Editor::open_session(surface, options, layer, session)?,
        None => Editor::new(surface, options)?,
    };

    // Replays are deterministic: time only moves on `wait`.
    let clock = ManualClock::new(SystemClock.now_ms());
    let editor = editor.with_clock(clock.clone());

    let mut runner = Runner::new(editor, clock, std::io::stdout().lock());
    runner.run_all(&commands)?;
    runner.show()?;

    if let Some((layer, session)) = &persistence {
        runner.editor().save_session(layer, session)?;
        tracing::info!(session = %session, "Session saved");
    }

    Ok(())
}
