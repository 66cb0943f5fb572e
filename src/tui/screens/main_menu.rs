//! Main menu screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::tui::{app::Screen, traits::Navigable, traits::ScreenAction, ui::Styles};

#[derive(Debug, Clone)]
pub struct MenuOption {
    pub title: String,
    pub description: String,
    pub shortcut: char,
    pub screen: Screen,
}

impl MenuOption {
    pub fn new(title: &str, description: &str, shortcut: char, screen: Screen) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            shortcut,
            screen,
        }
    }
}

pub struct MainMenuScreen {
    pub menu_state: ListState,
    pub menu_options: Vec<MenuOption>,
}

impl Default for MainMenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl MainMenuScreen {
    pub fn new() -> Self {
        let menu_options = vec![
            MenuOption::new(
                "Suppliers",
                "Browse, create, import and delete suppliers",
                'S',
                Screen::Suppliers,
            ),
            MenuOption::new(
                "Clients",
                "Browse, create, import and delete clients",
                'C',
                Screen::Clients,
            ),
        ];

        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            menu_state,
            menu_options,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            KeyCode::Enter => {
                if let Some(option) = self.menu_state.selected().and_then(|i| self.menu_options.get(i)) {
                    return ScreenAction::NavigateTo(option.screen.clone());
                }
            }
            KeyCode::Esc => return ScreenAction::Quit,
            KeyCode::Char(c) => {
                let upper_c = c.to_ascii_uppercase();
                if let Some(option) = self.menu_options.iter().find(|o| o.shortcut == upper_c) {
                    return ScreenAction::NavigateTo(option.screen.clone());
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, user: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(4),
            ])
            .split(area);

        let title = Paragraph::new(format!("Back Office  ({})", user))
            .style(Styles::title().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        self.draw_menu(f, chunks[1]);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let instructions = vec![
            Line::from(vec![
                Span::styled("Navigation: ", Styles::info()),
                Span::raw("↑/↓ to move, "),
                Span::styled("Enter", bold),
                Span::raw(" to select, "),
                Span::styled("S/C", bold),
                Span::raw(" for direct access"),
            ]),
            Line::from(vec![
                Span::styled("Global: ", Styles::info()),
                Span::styled("F1/?", bold),
                Span::raw(" for help, "),
                Span::styled("Ctrl+Q", bold),
                Span::raw(" to quit"),
            ]),
        ];
        let instructions = Paragraph::new(instructions).block(
            Block::default()
                .title("Instructions")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(instructions, chunks[2]);
    }

    fn draw_menu(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .menu_options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let selected = Some(i) == self.menu_state.selected();
                let style = if selected { Styles::selected() } else { Style::default() };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("[{}] ", option.shortcut), Styles::info()),
                        Span::styled(option.title.clone(), style.add_modifier(Modifier::BOLD)),
                    ]),
                    Line::from(Span::styled(
                        format!("     {}", option.description),
                        if selected { style } else { Styles::inactive() },
                    )),
                ])
            })
            .collect();

        let menu = List::new(items).block(
            Block::default()
                .title("Main Menu")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );
        f.render_stateful_widget(menu, area, &mut self.menu_state);
    }
}

impl Navigable for MainMenuScreen {
    fn navigate_up(&mut self) {
        let selected = self.menu_state.selected().unwrap_or(0);
        let count = self.menu_options.len();
        self.menu_state.select(Some((selected + count - 1) % count));
    }

    fn navigate_down(&mut self) {
        let selected = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some((selected + 1) % self.menu_options.len()));
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.menu_state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.menu_state.select(index);
    }

    fn get_item_count(&self) -> usize {
        self.menu_options.len()
    }
}
