use std::io;
use std::path::Path;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use backoffice::{
    admin::{Editable, EntityListScreen},
    api::{ApiClient, CountryService},
    cli::{Cli, Commands, EntityKind},
    config::Config,
    import::{sample_file_name, write_sample, FromImportRow, SpreadsheetParser},
    models::{Client, Entity, Supplier},
    notify::LogNotifier,
    tui::{components::TableColumns, ui::fit_width, App},
};

const LOG_FILE: &str = "backoffice.log";

fn init_logging(tui_mode: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "backoffice=info");
    }

    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    // The terminal belongs to the TUI, so only the file gets log lines there
    let stderr_layer = (!tui_mode).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(tui_mode);

    let mut config = Config::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    config.validate()?;

    match cli.command {
        None | Some(Commands::Tui) => run_tui(config).await,
        Some(Commands::List { kind, search }) => match kind {
            EntityKind::Suppliers => list_records::<Supplier>(&config, search.as_deref()).await,
            EntityKind::Clients => list_records::<Client>(&config, search.as_deref()).await,
        },
        Some(Commands::Import { kind, file }) => match kind {
            EntityKind::Suppliers => import_records::<Supplier>(&config, &file).await,
            EntityKind::Clients => import_records::<Client>(&config, &file).await,
        },
        Some(Commands::Sample { kind, output }) => match kind {
            EntityKind::Suppliers => write_sample_file::<Supplier>(&config, output.as_deref()),
            EntityKind::Clients => write_sample_file::<Client>(&config, output.as_deref()),
        },
        Some(Commands::Delete { kind, ids, yes }) => {
            if !yes {
                bail!("Refusing to delete {} record(s) without --yes", ids.len());
            }
            match kind {
                EntityKind::Suppliers => delete_records::<Supplier>(&config, ids).await,
                EntityKind::Clients => delete_records::<Client>(&config, ids).await,
            }
        }
    }
}

async fn run_tui(config: Config) -> Result<()> {
    info!("Starting back-office TUI...");
    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            info!("TUI exited successfully");
            Ok(())
        }
        Err(e) => {
            error!("TUI encountered an error: {}", e);
            Err(e)
        }
    }
}

async fn list_records<E>(config: &Config, search: Option<&str>) -> Result<()>
where
    E: Editable + TableColumns,
{
    let api = ApiClient::new(config)?;
    let service = api.entities::<E>();
    let countries = api.countries().fetch_all().await.unwrap_or_else(|e| {
        error!("Failed to load countries: {}", e);
        Vec::new()
    });

    let mut screen = EntityListScreen::<E>::new();
    if !screen.refresh(&service, &mut LogNotifier).await {
        bail!("Could not load {}", E::RESOURCE);
    }
    if let Some(search) = search {
        screen.set_search(search);
    }

    let rows = screen.rows(&config.session().permissions());
    let header: Vec<String> = std::iter::once(fit_width("Id", 12))
        .chain(E::COLUMNS.iter().map(|(name, width)| fit_width(name, *width)))
        .collect();
    println!("{}", header.join(" "));
    println!("{}", "-".repeat(header.iter().map(|h| h.chars().count() + 1).sum()));

    for row in &rows {
        let cells = row.entity.cells(&countries);
        let line: Vec<String> = std::iter::once(fit_width(row.entity.id(), 12))
            .chain(
                cells
                    .iter()
                    .zip(E::COLUMNS)
                    .map(|(cell, (_, width))| fit_width(cell, *width)),
            )
            .collect();
        let marker = if row.can_edit { " ✎" } else { "" };
        println!("{}{}", line.join(" "), marker);
    }

    println!();
    println!("Total: {} {}", rows.len(), E::LABEL.to_lowercase());
    Ok(())
}

async fn import_records<E>(config: &Config, file: &Path) -> Result<()>
where
    E: Editable,
    E::Payload: FromImportRow,
{
    let api = ApiClient::new(config)?;
    let service = api.entities::<E>();
    let parser = SpreadsheetParser::<E>::new();

    let mut screen = EntityListScreen::<E>::new();
    let summary = screen
        .import_file(file, &parser, &service, &mut LogNotifier)
        .await;

    match summary {
        Some(summary) => {
            println!(
                "Import finished: {} created, {} failed",
                summary.created, summary.failed
            );
            if summary.failed > 0 {
                bail!("{} row(s) were rejected", summary.failed);
            }
            Ok(())
        }
        None => bail!(
            "Import failed: {}",
            screen.import_error().unwrap_or("unknown error")
        ),
    }
}

fn write_sample_file<E>(config: &Config, output: Option<&Path>) -> Result<()>
where
    E: Entity,
    E::Payload: FromImportRow,
{
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => config.sample_dir.join(sample_file_name::<E>()),
    };
    write_sample::<E::Payload>(&path)?;
    println!("Sample file written to {}", path.display());
    Ok(())
}

async fn delete_records<E: Editable>(config: &Config, ids: Vec<String>) -> Result<()> {
    let api = ApiClient::new(config)?;
    let service = api.entities::<E>();

    let mut screen = EntityListScreen::<E>::new();
    for id in &ids {
        if !screen.is_selected(id) {
            screen.toggle_selected(id);
        }
    }
    screen.request_delete();
    if !screen.confirm_delete(&service, &mut LogNotifier).await {
        bail!("Could not delete {}", E::RESOURCE);
    }
    println!("Deleted {} {}", ids.len(), E::LABEL.to_lowercase());
    Ok(())
}
