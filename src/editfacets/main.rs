use clap::Parser;
use colored::*;
use editfacets::config::EngineConfig;
use editfacets::engine::Engine;
use editfacets::error::{EngineError, Result};
use editfacets::model::{FacetValue, RawRecord};
use editfacets::schedule::{Clock, SystemClock};
use editfacets::source::memory::{RecordingSurface, SharedSource, StaticLocator};
use editfacets::store::fs::FilePreferences;
use editfacets::store::PreferenceStore;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;
use cli::render::{render_list, ListView};
use cli::setup::{Cli, Commands, Toggle};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

struct AppContext {
    config: EngineConfig,
    prefs: FilePreferences,
}

fn run(cli: Cli) -> Result<()> {
    let ctx = init_context(cli.data_dir)?;

    match cli.command {
        Commands::List {
            records,
            status,
            kind,
            from,
            to,
            go_to,
        } => handle_list(ctx, &records, status.map(FacetValue::Status), kind, from, to, go_to),
        Commands::Numbering { state } => handle_numbering(ctx, state),
    }
}

fn init_context(data_dir: Option<PathBuf>) -> Result<AppContext> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => FilePreferences::default_dir()?,
    };
    let config = EngineConfig::load(&data_dir).unwrap_or_else(|e| {
        warn!("Ignoring unreadable config in {}: {}", data_dir.display(), e);
        EngineConfig::default()
    });

    Ok(AppContext {
        config,
        prefs: FilePreferences::new(data_dir),
    })
}

fn handle_list(
    ctx: AppContext,
    path: &Path,
    status: Option<FacetValue>,
    kind: Option<String>,
    from: Option<String>,
    to: Option<String>,
    go_to: Option<usize>,
) -> Result<()> {
    let records = load_records(path)?;
    let placeholders = ctx.config.placeholders.clone();

    let source = SharedSource::new(records.clone());
    let mut engine = Engine::new(
        StaticLocator::found(source),
        RecordingSurface::new(),
        ctx.prefs,
        SystemClock,
        ctx.config,
    );
    engine.navigate(true);

    let mut notes = Vec::new();
    for value in status.into_iter().chain(kind.map(FacetValue::Type)) {
        engine.select(&value);
        let applied = engine
            .filters()
            .map(|filters| filters.is_active(&value))
            .unwrap_or(false);
        if !applied {
            notes.push(format!("No {} edits, filter ignored", value));
        }
    }
    if let Some(from) = from {
        if engine.set_date_filter_text(&from, to.as_deref()).is_none() {
            notes.push(format!("Could not read date \"{}\", date filter ignored", from));
        }
    }
    if let Some(n) = go_to {
        engine.go_to(n)?;
    }

    let output = render_list(&ListView {
        records: &records,
        surface: engine.surface(),
        placeholders: &placeholders,
        now: SystemClock.now(),
        use_color: console::colors_enabled(),
    });
    print!("{}", output);
    for note in notes {
        println!("{}", note.yellow());
    }
    Ok(())
}

fn handle_numbering(mut ctx: AppContext, state: Option<Toggle>) -> Result<()> {
    match state {
        None => {
            let enabled = ctx
                .prefs
                .numbering_enabled()?
                .unwrap_or(ctx.config.numbering_default);
            println!("numbering = {}", if enabled { "on" } else { "off" });
        }
        Some(toggle) => {
            ctx.prefs.set_numbering_enabled(toggle.enabled())?;
            let message = format!(
                "Numbering turned {}",
                if toggle.enabled() { "on" } else { "off" }
            );
            println!("{}", message.green());
        }
    }
    Ok(())
}

fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = fs::read_to_string(path).map_err(|e| {
        EngineError::Records(format!("could not read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| EngineError::Records(format!("{}: {}", path.display(), e)))
}
