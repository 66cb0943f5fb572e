//! Supplier/client management screen: table, search, bulk actions and form

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info};

use crate::admin::{Draft, Editable, EntityListScreen};
use crate::api::{CountryService, EntityService};
use crate::import::{sample_file_name, write_sample, FromImportRow, SpreadsheetParser};
use crate::models::{Country, Entity};
use crate::notify::Notifier;
use crate::session::Permissions;
use crate::tui::components::entity_table::{render_entity_table, TableColumns};
use crate::tui::components::form_view::{render_form, CountryFocus};
use crate::tui::forms::{FormLayout, Slot, SlotKind};
use crate::tui::traits::{Navigable, ScreenAction};
use crate::tui::ui::{centered_rect, Styles};

/// Services and shared state a screen needs while handling a key
pub struct ScreenContext<'a, E: Entity> {
    pub service: &'a dyn EntityService<E>,
    pub country_service: &'a dyn CountryService,
    pub countries: &'a mut Vec<Country>,
    pub permissions: &'a Permissions,
    pub notifier: &'a mut dyn Notifier,
    pub sample_dir: &'a Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    ImportPath,
}

pub struct EntityScreen<E: Editable> {
    pub list: EntityListScreen<E>,
    pub table_state: ListState,
    pub input_mode: InputMode,
    pub form_focus: usize,
    pub country_focus: CountryFocus,
    parser: SpreadsheetParser<E>,
}

impl<E> Default for EntityScreen<E>
where
    E: Editable + TableColumns,
    E::Draft: FormLayout,
    E::Payload: FromImportRow,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EntityScreen<E>
where
    E: Editable + TableColumns,
    E::Draft: FormLayout,
    E::Payload: FromImportRow,
{
    pub fn new() -> Self {
        Self {
            list: EntityListScreen::new(),
            table_state: ListState::default(),
            input_mode: InputMode::Normal,
            form_focus: 0,
            country_focus: CountryFocus::Name,
            parser: SpreadsheetParser::new(),
        }
    }

    /// Reload the collection and keep the cursor in range
    pub async fn refresh(&mut self, service: &dyn EntityService<E>, notifier: &mut dyn Notifier) {
        self.list.refresh(service, notifier).await;
        self.clamp_selection();
    }

    fn current_id(&self) -> Option<String> {
        let visible = self.list.visible();
        self.table_state
            .selected()
            .and_then(|i| visible.get(i))
            .map(|e| e.id().to_string())
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent, ctx: &mut ScreenContext<'_, E>) -> ScreenAction {
        if self.list.form().is_some() {
            self.handle_form_key(key, ctx).await;
            return ScreenAction::None;
        }
        if self.list.is_confirming_delete() {
            self.handle_confirm_key(key, ctx).await;
            return ScreenAction::None;
        }
        match self.input_mode {
            InputMode::Search => {
                self.handle_search_key(key);
                ScreenAction::None
            }
            InputMode::ImportPath => {
                self.handle_import_key(key, ctx).await;
                ScreenAction::None
            }
            InputMode::Normal => self.handle_normal_key(key, ctx).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent, ctx: &mut ScreenContext<'_, E>) -> ScreenAction {
        match key.code {
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            KeyCode::Home => self.navigate_to_first(),
            KeyCode::End => self.navigate_to_last(),
            KeyCode::Char(' ') => {
                if let Some(id) = self.current_id() {
                    self.list.toggle_selected(&id);
                }
            }
            KeyCode::Char('a') => self.list.toggle_select_all(),
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('n') => {
                self.list.open_create(ctx.countries.clone());
                self.form_focus = 0;
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = self.current_id() {
                    if self.list.open_edit(&id, ctx.countries.clone(), ctx.permissions) {
                        self.form_focus = 0;
                    } else {
                        ctx.notifier
                            .error("Only administrators and the creator can edit this record".to_string());
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if !self.list.request_delete() {
                    ctx.notifier.error("Select at least one row to delete".to_string());
                }
            }
            KeyCode::Char('i') => {
                self.list.reset_import();
                self.input_mode = InputMode::ImportPath;
            }
            KeyCode::Char('t') => self.write_sample(ctx),
            KeyCode::Char('r') => self.refresh(ctx.service, ctx.notifier).await,
            KeyCode::Esc => {
                if !self.list.search().is_empty() {
                    self.list.set_search("");
                    self.clamp_selection();
                } else {
                    return ScreenAction::NavigateBack;
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.list.search_mut().push(c),
            KeyCode::Backspace => {
                self.list.search_mut().pop();
            }
            KeyCode::Esc => {
                self.list.set_search("");
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            _ => {}
        }
        self.clamp_selection();
    }

    async fn handle_import_key(&mut self, key: KeyEvent, ctx: &mut ScreenContext<'_, E>) {
        match key.code {
            KeyCode::Char(c) => self.list.import_input_mut().push(c),
            KeyCode::Backspace => {
                self.list.import_input_mut().pop();
            }
            KeyCode::Esc => {
                self.list.reset_import();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let summary = self
                    .list
                    .import_from_input(&self.parser, ctx.service, ctx.notifier)
                    .await;
                // A failed import keeps the prompt open with its error
                if summary.is_some() {
                    self.input_mode = InputMode::Normal;
                }
                self.clamp_selection();
            }
            _ => {}
        }
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent, ctx: &mut ScreenContext<'_, E>) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.list.confirm_delete(ctx.service, ctx.notifier).await;
                self.clamp_selection();
            }
            KeyCode::Char('n') | KeyCode::Esc => self.list.cancel_delete(),
            _ => {}
        }
    }

    async fn handle_form_key(&mut self, key: KeyEvent, ctx: &mut ScreenContext<'_, E>) {
        let dialog_open = self
            .list
            .form()
            .map(|f| f.country_dialog().is_some())
            .unwrap_or(false);
        if dialog_open {
            self.handle_country_key(key, ctx).await;
            return;
        }

        match key.code {
            KeyCode::Enter => {
                if self.list.submit_form(ctx.service, ctx.notifier).await {
                    self.form_focus = 0;
                    self.clamp_selection();
                }
                return;
            }
            KeyCode::Esc => {
                self.list.close_form();
                return;
            }
            _ => {}
        }

        let Some(form) = self.list.form_mut() else {
            return;
        };
        let slots = form.draft.slots();
        let focus = self.form_focus.min(slots.len().saturating_sub(1));
        let slot = slots.get(focus).copied();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('e') if ctrl => form.draft.add_email(),
            KeyCode::Char('o') if ctrl => {
                form.draft.add_contact();
            }
            KeyCode::Char('d') if ctrl => {
                if let Some(slot) = slot {
                    form.draft.remove_row(slot);
                }
            }
            KeyCode::Char('n') if ctrl => {
                form.open_country_dialog();
                self.country_focus = CountryFocus::Name;
            }
            KeyCode::Down | KeyCode::Tab => self.form_focus = (focus + 1) % slots.len().max(1),
            KeyCode::Up | KeyCode::BackTab => {
                self.form_focus = (focus + slots.len().max(1) - 1) % slots.len().max(1)
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match slot {
                    Some(Slot::Vat) => form.draft.common_mut().vat.cycle(forward),
                    Some(Slot::Country) => form.cycle_country(forward),
                    Some(s) if s.kind() == SlotKind::Toggle => form.draft.toggle(s),
                    _ => {}
                }
            }
            KeyCode::Char(' ') if slot.map(|s| s.kind()) == Some(SlotKind::Toggle) => {
                if let Some(slot) = slot {
                    form.draft.toggle(slot);
                }
            }
            KeyCode::Char(c) if !ctrl => {
                if let Some(slot) = slot.filter(|s| s.kind() == SlotKind::Text) {
                    let mut value = form.draft.value(slot).unwrap_or_default();
                    value.push(c);
                    form.draft.set_value(slot, &value);
                }
            }
            KeyCode::Backspace => {
                if let Some(slot) = slot.filter(|s| s.kind() == SlotKind::Text) {
                    let mut value = form.draft.value(slot).unwrap_or_default();
                    value.pop();
                    form.draft.set_value(slot, &value);
                }
            }
            _ => {}
        }

        let count = form.draft.slots().len();
        self.form_focus = self.form_focus.min(count.saturating_sub(1));
    }

    async fn handle_country_key(&mut self, key: KeyEvent, ctx: &mut ScreenContext<'_, E>) {
        let Some(form) = self.list.form_mut() else {
            return;
        };

        if key.code == KeyCode::Esc {
            form.close_country_dialog();
            return;
        }
        if key.code == KeyCode::Enter {
            if let Some(country) = form.create_country(ctx.country_service, ctx.notifier).await {
                if !ctx.countries.iter().any(|c| c.id == country.id) {
                    ctx.countries.push(country);
                }
            }
            return;
        }

        let Some(dialog) = form.country_dialog_mut() else {
            return;
        };
        let field = match self.country_focus {
            CountryFocus::Name => &mut dialog.name,
            CountryFocus::Code => &mut dialog.code,
        };
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.country_focus = match self.country_focus {
                    CountryFocus::Name => CountryFocus::Code,
                    CountryFocus::Code => CountryFocus::Name,
                };
            }
            KeyCode::Char(c) => field.push(c),
            KeyCode::Backspace => {
                field.pop();
            }
            _ => {}
        }
    }

    fn write_sample(&self, ctx: &mut ScreenContext<'_, E>) {
        let path = ctx.sample_dir.join(sample_file_name::<E>());
        match write_sample::<E::Payload>(&path) {
            Ok(()) => {
                info!(file = %path.display(), "Sample template written");
                ctx.notifier
                    .success(format!("Sample file written to {}", path.display()));
            }
            Err(e) => ctx.notifier.error(format!("Could not write sample file: {}", e)),
        }
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, permissions: &Permissions, countries: &[Country]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        self.draw_search(f, chunks[0]);

        let rows = self.list.rows(permissions);
        render_entity_table(f, chunks[1], &rows, countries, &mut self.table_state, E::LABEL);

        self.draw_instructions(f, chunks[2]);

        if self.input_mode == InputMode::ImportPath {
            self.draw_import_prompt(f, area);
        }
        if self.list.is_confirming_delete() {
            self.draw_delete_confirmation(f, area);
        }
        if let Some(form) = self.list.form() {
            render_form(f, area, form, self.form_focus, self.country_focus);
        }
    }

    fn draw_search(&self, f: &mut Frame, area: Rect) {
        let focused = self.input_mode == InputMode::Search;
        let text = if self.list.search().is_empty() && !focused {
            Span::styled("Press / to search by name", Styles::inactive())
        } else {
            Span::raw(self.list.search().to_string())
        };
        let block = Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .border_style(if focused {
                Styles::active_border()
            } else {
                Styles::inactive_border()
            });
        f.render_widget(Paragraph::new(Line::from(text)).block(block), area);

        if focused {
            let cursor_x = area.x + 1 + self.list.search().chars().count() as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, area.y + 1);
            }
        }
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect) {
        let bold = Styles::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled("n", bold),
            Span::raw(" new  "),
            Span::styled("e", bold),
            Span::raw(" edit  "),
            Span::styled("Space", bold),
            Span::raw(" select  "),
            Span::styled("a", bold),
            Span::raw(" all  "),
            Span::styled("d", bold),
            Span::raw(" delete  "),
            Span::styled("i", bold),
            Span::raw(" import  "),
            Span::styled("t", bold),
            Span::raw(" sample  "),
            Span::styled("r", bold),
            Span::raw(" reload"),
        ]);
        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(paragraph, area);
    }

    fn draw_import_prompt(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 25, area);
        f.render_widget(Clear, popup);

        let mut lines = vec![
            Line::from(Span::styled("File (.csv, .xlsx, .xls, .ods):", Styles::info())),
            Line::from(self.list.import_input().to_string()),
        ];
        if let Some(error) = self.list.import_error() {
            lines.push(Line::from(Span::styled(error.to_string(), Styles::error())));
        }
        lines.push(Line::from(Span::styled("Enter import, Esc cancel", Styles::inactive())));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(format!("Import {}", E::LABEL.to_lowercase()))
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );
        f.render_widget(paragraph, popup);
    }

    fn draw_delete_confirmation(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 20, area);
        f.render_widget(Clear, popup);

        let count = self.list.selected_ids().len();
        let text = vec![
            Line::from(format!("Delete {} {}?", count, E::LABEL.to_lowercase())),
            Line::from(""),
            Line::from(Span::styled("y confirm, n cancel", Styles::inactive())),
        ];
        let paragraph = Paragraph::new(text).block(
            Block::default()
                .title("Confirm deletion")
                .borders(Borders::ALL)
                .border_style(Styles::error()),
        );
        f.render_widget(paragraph, popup);
    }
}

impl<E> Navigable for EntityScreen<E>
where
    E: Editable + TableColumns,
    E::Draft: FormLayout,
    E::Payload: FromImportRow,
{
    fn navigate_up(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let selected = self.table_state.selected().unwrap_or(0);
        let next = if selected == 0 { count - 1 } else { selected - 1 };
        self.table_state.select(Some(next));
    }

    fn navigate_down(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let next = self.table_state.selected().map(|i| (i + 1) % count).unwrap_or(0);
        self.table_state.select(Some(next));
        debug!(row = next, "Row focused");
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.table_state.select(index);
    }

    fn get_item_count(&self) -> usize {
        self.list.visible().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::testing::{supplier, FakeCountries, FakeEntities, RecordingNotifier};
    use crate::models::Supplier;
    use crate::session::Session;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(c))
        }
    }

    struct Harness {
        service: FakeEntities<Supplier>,
        countries_service: FakeCountries,
        countries: Vec<Country>,
        permissions: Permissions,
        notifier: RecordingNotifier,
        dir: tempfile::TempDir,
    }

    impl Harness {
        fn new(items: Vec<Supplier>, role: &str) -> Self {
            Self {
                service: FakeEntities::new(items),
                countries_service: FakeCountries::new(vec![]),
                countries: vec![],
                permissions: Session::new("u1", role).permissions(),
                notifier: RecordingNotifier::default(),
                dir: tempfile::TempDir::new().unwrap(),
            }
        }

        async fn press(&mut self, screen: &mut EntityScreen<Supplier>, event: KeyEvent) -> ScreenAction {
            let mut ctx = ScreenContext {
                service: &self.service,
                country_service: &self.countries_service,
                countries: &mut self.countries,
                permissions: &self.permissions,
                notifier: &mut self.notifier,
                sample_dir: self.dir.path(),
            };
            screen.handle_key_event(event, &mut ctx).await
        }

        async fn type_text(&mut self, screen: &mut EntityScreen<Supplier>, text: &str) {
            for c in text.chars() {
                self.press(screen, key(KeyCode::Char(c))).await;
            }
        }
    }

    fn seeded() -> Vec<Supplier> {
        vec![
            supplier("s1", "Acme Parts", Some("u1")),
            supplier("s2", "Bolt Works", Some("u2")),
        ]
    }

    #[tokio::test]
    async fn test_create_supplier_through_form() {
        let mut h = Harness::new(vec![], "user");
        let mut screen = EntityScreen::<Supplier>::new();

        h.press(&mut screen, key(KeyCode::Char('n'))).await;
        h.type_text(&mut screen, "Nuts Inc").await;
        h.press(&mut screen, key(KeyCode::Tab)).await;
        h.type_text(&mut screen, "hello@nuts.test").await;
        h.press(&mut screen, key(KeyCode::Enter)).await;

        assert!(screen.list.form().is_none());
        assert_eq!(screen.list.items().len(), 1);
        assert_eq!(screen.list.items()[0].name, "Nuts Inc");
        assert_eq!(h.notifier.successes, vec!["Nuts Inc created".to_string()]);
    }

    #[tokio::test]
    async fn test_search_then_bulk_delete() {
        let mut h = Harness::new(seeded(), "admin");
        let mut screen = EntityScreen::<Supplier>::new();
        screen.refresh(&h.service, &mut h.notifier).await;

        h.press(&mut screen, key(KeyCode::Char('/'))).await;
        h.type_text(&mut screen, "bolt").await;
        h.press(&mut screen, key(KeyCode::Enter)).await;
        assert_eq!(screen.get_item_count(), 1);

        h.press(&mut screen, key(KeyCode::Char('a'))).await;
        h.press(&mut screen, key(KeyCode::Char('d'))).await;
        assert!(screen.list.is_confirming_delete());
        h.press(&mut screen, key(KeyCode::Char('y'))).await;

        assert_eq!(h.service.ids(), vec!["s1".to_string()]);
        assert!(screen.list.selected_ids().is_empty());
    }

    #[tokio::test]
    async fn test_edit_refused_for_other_users_record() {
        let mut h = Harness::new(seeded(), "user");
        let mut screen = EntityScreen::<Supplier>::new();
        screen.refresh(&h.service, &mut h.notifier).await;

        h.press(&mut screen, key(KeyCode::Down)).await;
        h.press(&mut screen, key(KeyCode::Char('e'))).await;
        assert!(screen.list.form().is_none());
        assert_eq!(h.notifier.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_without_selection_is_reported() {
        let mut h = Harness::new(seeded(), "admin");
        let mut screen = EntityScreen::<Supplier>::new();
        screen.refresh(&h.service, &mut h.notifier).await;

        h.press(&mut screen, key(KeyCode::Char('d'))).await;
        assert!(!screen.list.is_confirming_delete());
        assert_eq!(h.notifier.errors, vec!["Select at least one row to delete".to_string()]);
    }

    #[tokio::test]
    async fn test_country_dialog_adds_to_shared_list() {
        let mut h = Harness::new(vec![], "user");
        let mut screen = EntityScreen::<Supplier>::new();

        h.press(&mut screen, key(KeyCode::Char('n'))).await;
        h.press(&mut screen, ctrl('n')).await;
        h.type_text(&mut screen, "Spain").await;
        h.press(&mut screen, key(KeyCode::Tab)).await;
        h.type_text(&mut screen, "es").await;
        h.press(&mut screen, key(KeyCode::Enter)).await;

        assert_eq!(h.countries.len(), 1);
        let form = screen.list.form().unwrap();
        assert!(form.country_dialog().is_none());
        assert_eq!(form.selected_country().map(|c| c.code.as_str()), Some("ES"));
    }

    #[tokio::test]
    async fn test_sample_and_import_round() {
        let mut h = Harness::new(vec![], "user");
        let mut screen = EntityScreen::<Supplier>::new();

        h.press(&mut screen, key(KeyCode::Char('t'))).await;
        let sample = h.dir.path().join("suppliers_sample.csv");
        assert!(sample.exists());

        h.press(&mut screen, key(KeyCode::Char('i'))).await;
        assert_eq!(screen.input_mode, InputMode::ImportPath);
        let path = sample.display().to_string();
        h.type_text(&mut screen, &path).await;
        h.press(&mut screen, key(KeyCode::Enter)).await;

        assert_eq!(screen.input_mode, InputMode::Normal);
        assert_eq!(h.service.ids(), vec!["new-1".to_string()]);
        assert_eq!(
            h.notifier.successes.last().map(String::as_str),
            Some("Import finished: 1 created, 0 failed")
        );
    }

    #[tokio::test]
    async fn test_failed_import_keeps_prompt_with_error() {
        let mut h = Harness::new(vec![], "user");
        let mut screen = EntityScreen::<Supplier>::new();

        h.press(&mut screen, key(KeyCode::Char('i'))).await;
        let missing = h.dir.path().join("missing.csv").display().to_string();
        h.type_text(&mut screen, &missing).await;
        h.press(&mut screen, key(KeyCode::Enter)).await;

        assert_eq!(screen.input_mode, InputMode::ImportPath);
        assert!(screen.list.import_error().is_some());
        assert_eq!(screen.list.import_input(), "");
        assert!(h.service.ids().is_empty());

        h.press(&mut screen, key(KeyCode::Esc)).await;
        assert_eq!(screen.input_mode, InputMode::Normal);
        assert!(screen.list.import_error().is_none());

        h.press(&mut screen, key(KeyCode::Char('i'))).await;
        assert!(screen.list.import_error().is_none());
    }

    #[tokio::test]
    async fn test_escape_navigates_back() {
        let mut h = Harness::new(vec![], "user");
        let mut screen = EntityScreen::<Supplier>::new();
        assert_eq!(h.press(&mut screen, key(KeyCode::Esc)).await, ScreenAction::NavigateBack);
    }
}
