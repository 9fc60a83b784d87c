mod api;
mod catalog;
mod cli;
mod config;
mod models;
mod photos;
mod report;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};

use crate::api::{fetch_with_retry, ApiClient, FetchReport, ProjectFetcher, RetryPolicy, SaveKind};
use crate::catalog::Catalog;
use crate::cli::{Cli, Commands, ExportFormat};
use crate::config::{Config, PhotoMode};
use crate::models::{ProjectDraft, ProjectStatus, Settings};
use crate::photos::prepare_photos;
use crate::ui::{
    components::popup::{render_alert, Alert},
    dashboard::{render_dashboard, handle_input as handle_dashboard_input, DashboardAction, DashboardState},
    properties::{render_properties, handle_input as handle_properties_input, PropertiesState, PropertyAction},
    property_wizard::{render_property_wizard, handle_input as handle_wizard_input, PropertyWizardAction, PropertyWizardState},
    settings::{render_settings, handle_input as handle_settings_input, SettingsAction, SettingsState},
    HeaderInfo, Page,
};

const DEFAULT_LOG_FILTER: &str = "estate_admin=info";

// Represents the current screen in the app
#[derive(Clone, Copy, PartialEq, Debug)]
enum AppScreen {
    Dashboard,
    Properties,
    PropertyWizard,
    Settings,
}

// Main application state
struct AppState {
    client: Arc<ApiClient>,
    photo_mode: PhotoMode,
    fetcher: ProjectFetcher,
    fetch_rx: UnboundedReceiver<FetchReport>,
    catalog: Catalog,
    settings: Settings,
    today: String,
    screen: AppScreen,
    // Screen the wizard returns to
    wizard_return: AppScreen,
    dashboard_state: DashboardState,
    properties_state: PropertiesState,
    wizard_state: Option<PropertyWizardState>,
    settings_state: SettingsState,
    alert: Option<Alert>,
}

impl AppState {
    fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(ApiClient::new(config)?);
        let (fetcher, fetch_rx) = ProjectFetcher::new(Arc::clone(&client), RetryPolicy::from_config(config));
        let settings = Settings::default();

        Ok(Self {
            client,
            photo_mode: config.photo_mode,
            fetcher,
            fetch_rx,
            catalog: Catalog::default(),
            settings_state: SettingsState::new(&settings),
            settings,
            today: today(),
            screen: AppScreen::Dashboard,
            wizard_return: AppScreen::Dashboard,
            dashboard_state: DashboardState::new(),
            properties_state: PropertiesState::new(),
            wizard_state: None,
            alert: None,
        })
    }

    fn refresh(&mut self) {
        let generation = self.fetcher.refresh();
        tracing::debug!(generation, "Started project fetch");
    }

    /// Apply finished background fetches to the catalog
    fn drain_fetches(&mut self) {
        while let Ok(report) = self.fetch_rx.try_recv() {
            if let Some(projects) = self.fetcher.finish(report) {
                tracing::info!(count = projects.len(), "Catalog updated");
                self.catalog.replace(projects);
            }
        }
    }

    fn navigate(&mut self, page: Page) {
        self.screen = match page {
            Page::Dashboard => AppScreen::Dashboard,
            Page::Properties => {
                if self.catalog.is_empty() && !self.fetcher.in_flight() {
                    self.refresh();
                }
                AppScreen::Properties
            }
            Page::Settings => {
                self.settings_state.reset(&self.settings);
                AppScreen::Settings
            }
        };
    }

    fn open_wizard(&mut self, state: PropertyWizardState) {
        self.wizard_state = Some(state);
        self.wizard_return = self.screen;
        self.screen = AppScreen::PropertyWizard;
    }

    fn close_wizard(&mut self) {
        self.wizard_state = None;
        self.screen = self.wizard_return;
    }

    fn edit_project(&mut self, id: &str) {
        match self.catalog.find(id) {
            Some(project) => {
                let state = PropertyWizardState::from_existing(project);
                self.open_wizard(state);
            }
            None => self.alert = Some(Alert::error(format!("Project {} not found", id))),
        }
    }

    async fn save_project(&mut self, draft: ProjectDraft) {
        let verb = if draft.is_update() { "update" } else { "add" };

        match submit_draft(&self.client, self.photo_mode, &draft).await {
            Ok(kind) => {
                let message = match kind {
                    SaveKind::Created => "Project added successfully!",
                    SaveKind::Updated => "Project updated successfully!",
                };
                tracing::info!(?kind, name = %draft.name, "Project saved");
                self.alert = Some(Alert::info(message));
                self.close_wizard();
                self.refresh();
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to {} project", verb);
                self.alert = Some(Alert::error(format!("Failed to {} project: {}", verb, err)));
            }
        }
    }

    async fn delete_project(&mut self, id: &str) {
        match self.client.delete_project(id).await {
            Ok(()) => {
                tracing::info!(id, "Project deleted");
                self.alert = Some(Alert::info("Project deleted successfully!"));
                self.refresh();
            }
            Err(err) => {
                tracing::error!(id, error = %err, "Failed to delete project");
                self.alert = Some(Alert::error(format!("Failed to delete project: {}", err)));
            }
        }
    }

    async fn export_data(&mut self, path: &Path) {
        let result = match report::export_json(self.catalog.projects(), &self.settings) {
            Ok(json) => tokio::fs::write(path, json).await.map_err(anyhow::Error::from),
            Err(err) => Err(err),
        };

        self.alert = Some(match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Exported data");
                Alert::info(format!("Data exported to {}", path.display()))
            }
            Err(err) => {
                tracing::error!(error = %err, "Export failed");
                Alert::error(format!("Failed to export data: {}", err))
            }
        });
    }

    fn clear_data(&mut self) {
        self.fetcher.cancel();
        self.catalog.clear();
        self.properties_state = PropertiesState::new();
        self.dashboard_state = DashboardState::new();
        tracing::info!("Cleared local data");
        self.alert = Some(Alert::info("All data cleared"));
    }
}

async fn submit_draft(client: &ApiClient, mode: PhotoMode, draft: &ProjectDraft) -> api::Result<SaveKind> {
    let photos = prepare_photos(draft, mode, client).await?;
    client.save_project(draft, photos).await
}

fn today() -> String {
    chrono::Local::now().format("%A, %B %-d, %Y").to_string()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// The dashboard owns the terminal, so tracing goes to a file
fn init_file_logging(path: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = config::init()?;
    cli.apply_overrides(&mut config);

    match cli.command.clone().unwrap_or(Commands::Tui) {
        Commands::Tui => run_dashboard(&config).await,
        Commands::List => {
            init_stderr_logging();
            run_list(&config).await
        }
        Commands::Export { format, output } => {
            init_stderr_logging();
            run_export(&config, format, &output).await
        }
    }
}

async fn fetch_catalog(config: &Config) -> Result<Catalog> {
    let client = ApiClient::new(config)?;
    let outcome = fetch_with_retry(&client, RetryPolicy::from_config(config), &CancellationToken::new()).await;
    Ok(Catalog::new(outcome.into_projects().unwrap_or_default()))
}

async fn run_list(config: &Config) -> Result<()> {
    let catalog = fetch_catalog(config).await?;

    if catalog.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    println!("{:<15} {:<30} {:<24} {:<10} {}", "ID", "NAME", "LOCATION", "STATUS", "PHOTOS");
    for project in catalog.projects() {
        println!(
            "{:<15} {:<30} {:<24} {:<10} {}",
            project.id,
            project.name,
            project.location,
            project.status,
            project.photos.len()
        );
    }
    Ok(())
}

async fn run_export(config: &Config, format: ExportFormat, output: &Path) -> Result<()> {
    let catalog = fetch_catalog(config).await?;
    let settings = Settings::default();

    let contents = match format {
        ExportFormat::Json => report::export_json(catalog.projects(), &settings)?,
        ExportFormat::Html => report::render_dashboard_html(&catalog, &settings, &today()),
    };

    tokio::fs::write(output, contents)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {} projects to {}", catalog.len(), output.display());
    Ok(())
}

async fn run_dashboard(config: &Config) -> Result<()> {
    init_file_logging(&config.log_file)?;
    tracing::info!(list_url = %config.list_url, "Starting dashboard");

    let mut app_state = AppState::new(config)?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut terminal = undo_on_error(setup_terminal, || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = terminal::disable_raw_mode();
    })?;

    app_state.refresh();

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        tracing::error!(error = %err, "Dashboard exited with error");
        println!("Error: {}", err);
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Run `setup`; if it fails, run `undo` before handing back the error
fn undo_on_error<T>(setup: impl FnOnce() -> Result<T>, undo: impl FnOnce()) -> Result<T> {
    let result = setup();
    if result.is_err() {
        undo();
    }
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        app_state.drain_fetches();

        terminal.draw(|f| draw(f, app_state))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Any key dismisses an alert
        if app_state.alert.take().is_some() {
            continue;
        }

        if handle_key(app_state, key.code).await? {
            break;
        }
    }

    Ok(())
}

fn draw<B: Backend>(f: &mut Frame<B>, app_state: &mut AppState) {
    let header = HeaderInfo {
        company: &app_state.settings.company_name,
        today: &app_state.today,
        loading: app_state.fetcher.in_flight(),
    };

    match app_state.screen {
        AppScreen::Dashboard => {
            render_dashboard(f, &app_state.dashboard_state, &app_state.catalog, &header);
        }
        AppScreen::Properties => {
            render_properties(f, &mut app_state.properties_state, &app_state.catalog, &header);
        }
        AppScreen::PropertyWizard => {
            if let Some(state) = &app_state.wizard_state {
                render_property_wizard(f, state);
            }
        }
        AppScreen::Settings => {
            render_settings(f, &app_state.settings_state, &header);
        }
    }

    if let Some(alert) = &app_state.alert {
        render_alert(f, alert);
    }
}

/// Route a key press to the current screen. Returns true to quit.
async fn handle_key(app_state: &mut AppState, key: KeyCode) -> Result<bool> {
    match app_state.screen {
        AppScreen::Dashboard => {
            match handle_dashboard_input(&mut app_state.dashboard_state, key, &app_state.catalog) {
                Some(DashboardAction::Quit) => return Ok(true),
                Some(DashboardAction::Refresh) => app_state.refresh(),
                Some(DashboardAction::Navigate(page)) => app_state.navigate(page),
                Some(DashboardAction::NewProject(status)) => {
                    app_state.open_wizard(PropertyWizardState::new(status));
                }
                Some(DashboardAction::EditProject(id)) => app_state.edit_project(&id),
                None => {}
            }
        }
        AppScreen::Properties => {
            match handle_properties_input(&mut app_state.properties_state, key, &app_state.catalog) {
                Some(PropertyAction::Quit) => return Ok(true),
                Some(PropertyAction::Refresh) => app_state.refresh(),
                Some(PropertyAction::Navigate(page)) => app_state.navigate(page),
                Some(PropertyAction::NewProject) => {
                    app_state.open_wizard(PropertyWizardState::new(ProjectStatus::Ongoing));
                }
                Some(PropertyAction::EditProject(id)) => app_state.edit_project(&id),
                Some(PropertyAction::DeleteProject(id)) => app_state.delete_project(&id).await,
                None => {}
            }
        }
        AppScreen::PropertyWizard => {
            let action = match &mut app_state.wizard_state {
                Some(state) => handle_wizard_input(state, key),
                None => Some(PropertyWizardAction::Cancel),
            };
            match action {
                Some(PropertyWizardAction::Cancel) => app_state.close_wizard(),
                Some(PropertyWizardAction::Save(draft)) => app_state.save_project(draft).await,
                None => {}
            }
        }
        AppScreen::Settings => match handle_settings_input(&mut app_state.settings_state, key) {
            Some(SettingsAction::Quit) => return Ok(true),
            Some(SettingsAction::Refresh) => app_state.refresh(),
            Some(SettingsAction::Navigate(page)) => app_state.navigate(page),
            Some(SettingsAction::Save(settings)) => {
                tracing::info!(company = %settings.company_name, "Settings saved");
                app_state.settings = settings;
                app_state.alert = Some(Alert::info("Settings saved successfully!"));
                app_state.screen = AppScreen::Dashboard;
            }
            Some(SettingsAction::Export(path)) => app_state.export_data(&path).await,
            Some(SettingsAction::ClearData) => app_state.clear_data(),
            None => {}
        },
    }

    Ok(false)
}
