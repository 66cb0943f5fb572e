//! Main TUI application state and event loop

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{error, info};

use super::components::status_display::{StatusDisplay, StatusType};
use super::screens::entities::{EntityScreen, ScreenContext};
use super::screens::main_menu::MainMenuScreen;
use super::traits::ScreenAction;
use super::ui::{centered_rect, Styles};
use crate::api::{ApiClient, CountryService, EntityService};
use crate::config::Config;
use crate::models::{Client, Country, Supplier};
use crate::notify::Notifier;
use crate::session::Permissions;

const TICK_RATE: Duration = Duration::from_millis(250);
const STATUS_TIMEOUT: Duration = Duration::from_secs(8);

/// Application screens
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    MainMenu,
    Suppliers,
    Clients,
}

impl Screen {
    pub fn title(&self) -> &str {
        match self {
            Screen::MainMenu => "Main Menu",
            Screen::Suppliers => "Suppliers",
            Screen::Clients => "Clients",
        }
    }
}

pub struct App {
    pub current_screen: Screen,
    pub config: Config,
    permissions: Permissions,

    supplier_service: Box<dyn EntityService<Supplier>>,
    client_service: Box<dyn EntityService<Client>>,
    country_service: Box<dyn CountryService>,
    /// Countries offered by every form, shared across screens
    pub countries: Vec<Country>,

    pub main_menu: MainMenuScreen,
    pub suppliers: EntityScreen<Supplier>,
    pub clients: EntityScreen<Client>,

    pub status: StatusDisplay,
    pub should_quit: bool,
    pub show_help_popup: bool,
}

impl App {
    /// Create the application bound to the REST API
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self::with_services(
            config,
            Box::new(api.entities::<Supplier>()),
            Box::new(api.entities::<Client>()),
            Box::new(api.countries()),
        ))
    }

    pub fn with_services(
        config: Config,
        supplier_service: Box<dyn EntityService<Supplier>>,
        client_service: Box<dyn EntityService<Client>>,
        country_service: Box<dyn CountryService>,
    ) -> Self {
        Self {
            current_screen: Screen::MainMenu,
            permissions: config.session().permissions(),
            config,
            supplier_service,
            client_service,
            country_service,
            countries: Vec::new(),
            main_menu: MainMenuScreen::new(),
            suppliers: EntityScreen::new(),
            clients: EntityScreen::new(),
            status: StatusDisplay::new().with_auto_clear(STATUS_TIMEOUT),
            should_quit: false,
            show_help_popup: false,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.load_countries().await;

        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key).await?;
                    }
                }
            }
            self.status.tick();

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Fetch the country list used by the forms
    pub async fn load_countries(&mut self) {
        match self.country_service.fetch_all().await {
            Ok(countries) => {
                info!("Loaded {} countries", countries.len());
                self.status.set_info(format!("Countries loaded: {}", countries.len()));
                self.countries = countries;
            }
            Err(e) => {
                error!("Failed to load countries: {}", e);
                self.status.error(format!("Could not load countries: {}", e));
            }
        }
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Char('?') if self.current_screen == Screen::MainMenu => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return Ok(());
            }
            _ => {}
        }
        if self.show_help_popup {
            return Ok(());
        }

        let action = match self.current_screen {
            Screen::MainMenu => self.main_menu.handle_key_event(key),
            Screen::Suppliers => {
                let mut ctx = ScreenContext {
                    service: self.supplier_service.as_ref(),
                    country_service: self.country_service.as_ref(),
                    countries: &mut self.countries,
                    permissions: &self.permissions,
                    notifier: &mut self.status,
                    sample_dir: &self.config.sample_dir,
                };
                self.suppliers.handle_key_event(key, &mut ctx).await
            }
            Screen::Clients => {
                let mut ctx = ScreenContext {
                    service: self.client_service.as_ref(),
                    country_service: self.country_service.as_ref(),
                    countries: &mut self.countries,
                    permissions: &self.permissions,
                    notifier: &mut self.status,
                    sample_dir: &self.config.sample_dir,
                };
                self.clients.handle_key_event(key, &mut ctx).await
            }
        };

        self.apply_action(action).await;
        Ok(())
    }

    async fn apply_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::NavigateTo(screen) => self.navigate_to_screen(screen).await,
            ScreenAction::NavigateBack => self.navigate_to_screen(Screen::MainMenu).await,
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::None => {}
        }
    }

    /// Switch screens; entity screens reload their collection on entry
    pub async fn navigate_to_screen(&mut self, screen: Screen) {
        info!("Navigating to {}", screen.title());
        self.current_screen = screen;
        match self.current_screen {
            Screen::Suppliers => {
                self.status.set_loading("Loading suppliers...".to_string());
                self.suppliers
                    .refresh(self.supplier_service.as_ref(), &mut self.status)
                    .await;
            }
            Screen::Clients => {
                self.status.set_loading("Loading clients...".to_string());
                self.clients
                    .refresh(self.client_service.as_ref(), &mut self.status)
                    .await;
            }
            Screen::MainMenu => {}
        }
        if self
            .status
            .get_current()
            .map(|m| m.status_type == StatusType::Loading)
            .unwrap_or(false)
        {
            self.status.clear();
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match self.current_screen {
            Screen::MainMenu => self.main_menu.draw(f, chunks[0], &self.config.user.id),
            Screen::Suppliers => self
                .suppliers
                .draw(f, chunks[0], &self.permissions, &self.countries),
            Screen::Clients => self
                .clients
                .draw(f, chunks[0], &self.permissions, &self.countries),
        }

        let fallback = format!(
            "Back Office - {} | Esc: Back | Ctrl+Q: Quit | F1: Help",
            self.current_screen.title()
        );
        self.status.render(f, chunks[1], &fallback);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 70, area);
        f.render_widget(Clear, popup_area);

        let help = Paragraph::new(self.get_context_help())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            );
        f.render_widget(help, popup_area);
    }

    /// Context-sensitive help content
    pub fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            Esc - Go back / close dialog\n\
            Ctrl+Q - Quit application\n\
            F1 - Toggle this help\n\n";

        let screen_help = match self.current_screen {
            Screen::MainMenu => {
                "Main Menu:\n\
                ↑/↓ - Navigate menu\n\
                Enter - Select option\n\
                S - Suppliers\n\
                C - Clients"
            }
            Screen::Suppliers | Screen::Clients => {
                "Records:\n\
                ↑/↓ - Move cursor\n\
                / - Search by name\n\
                Space - Select row, a - Select all shown\n\
                n - New record, e/Enter - Edit (admin or creator)\n\
                d - Delete selection\n\
                i - Import .csv/.xlsx/.xls/.ods, t - Write sample file\n\
                r - Reload\n\n\
                Form:\n\
                Tab/↑/↓ - Move between fields\n\
                ←/→ - Change VAT rate or country\n\
                Space - Open/close a day\n\
                Ctrl+E add email, Ctrl+O add contact, Ctrl+D remove row\n\
                Ctrl+N - Create a country\n\
                Enter - Save, Esc - Cancel"
            }
        };

        format!("{}{}", global_help, screen_help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::testing::{supplier, FakeCountries, FakeEntities};

    fn app(suppliers: Vec<Supplier>) -> App {
        let config = Config::from_env().unwrap();
        App::with_services(
            config,
            Box::new(FakeEntities::new(suppliers)),
            Box::new(FakeEntities::<Client>::new(vec![])),
            Box::new(FakeCountries::new(vec![Country {
                id: "fr".to_string(),
                name: "France".to_string(),
                code: "FR".to_string(),
            }])),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_entering_screen_loads_records() {
        let mut app = app(vec![supplier("s1", "Acme", None)]);
        app.load_countries().await;
        assert_eq!(app.countries.len(), 1);
        assert_eq!(
            app.status.get_current().map(|m| m.message.as_str()),
            Some("Countries loaded: 1")
        );

        app.handle_key_event(press(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(app.current_screen, Screen::Suppliers);
        assert_eq!(app.suppliers.list.items().len(), 1);

        app.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.current_screen, Screen::MainMenu);
    }

    #[tokio::test]
    async fn test_help_popup_swallows_keys() {
        let mut app = app(vec![]);
        app.handle_key_event(press(KeyCode::F(1))).await.unwrap();
        assert!(app.show_help_popup);

        app.handle_key_event(press(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(app.current_screen, Screen::MainMenu);

        app.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        assert!(!app.show_help_popup);
    }

    #[tokio::test]
    async fn test_ctrl_q_quits() {
        let mut app = app(vec![]);
        app.handle_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert!(app.should_quit);
    }
}
