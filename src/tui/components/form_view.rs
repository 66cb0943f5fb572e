//! Popup rendering of an entity form and its country sub-dialog

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::admin::{CountryDialog, EntityForm};
use crate::tui::forms::{FormLayout, Slot, SlotKind};
use crate::tui::ui::{centered_rect, fit_width, Styles};

const LABEL_WIDTH: usize = 22;

/// Which field of the country sub-dialog has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountryFocus {
    #[default]
    Name,
    Code,
}

fn display_value<D: FormLayout>(form: &EntityForm<D>, slot: Slot) -> String {
    match slot {
        Slot::Country => form
            .selected_country()
            .map(|c| format!("< {} ({}) >", c.name, c.code))
            .unwrap_or_else(|| "< none >".to_string()),
        Slot::Vat => format!("< {} >", form.draft.value(slot).unwrap_or_default()),
        _ => form.draft.value(slot).unwrap_or_default(),
    }
}

pub fn render_form<D: FormLayout>(
    f: &mut Frame,
    area: Rect,
    form: &EntityForm<D>,
    focus: usize,
    country_focus: CountryFocus,
) {
    let popup = centered_rect(70, 85, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(form.title())
        .borders(Borders::ALL)
        .border_style(Styles::active_border());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2), Constraint::Length(2)])
        .split(inner);

    let slots = form.draft.slots();
    let items: Vec<ListItem> = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let focused = i == focus;
            let label_style = if focused { Styles::title() } else { Styles::info() };
            let mut value = display_value(form, *slot);
            if focused && slot.kind() == SlotKind::Text {
                value.push('▏');
            }
            let value_style = if focused {
                Styles::selected()
            } else {
                Styles::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(fit_width(&slot.label(), LABEL_WIDTH), label_style),
                Span::raw(" "),
                Span::styled(value, value_style),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(focus.min(slots.len().saturating_sub(1))));
    f.render_stateful_widget(List::new(items), chunks[0], &mut state);

    if let Some(error) = form.error() {
        let error = Paragraph::new(error.to_string())
            .style(Styles::error())
            .wrap(Wrap { trim: true });
        f.render_widget(error, chunks[1]);
    }

    let mut hints = vec![
        Span::styled("Enter", Styles::default().add_modifier(Modifier::BOLD)),
        Span::raw(" save  "),
        Span::styled("Esc", Styles::default().add_modifier(Modifier::BOLD)),
        Span::raw(" cancel  "),
        Span::styled("Ctrl+E", Styles::default().add_modifier(Modifier::BOLD)),
        Span::raw(" add email  "),
    ];
    if form.draft.has_contacts() {
        hints.push(Span::styled("Ctrl+O", Styles::default().add_modifier(Modifier::BOLD)));
        hints.push(Span::raw(" add contact  "));
    }
    hints.extend([
        Span::styled("Ctrl+D", Styles::default().add_modifier(Modifier::BOLD)),
        Span::raw(" remove row  "),
        Span::styled("Ctrl+N", Styles::default().add_modifier(Modifier::BOLD)),
        Span::raw(" new country"),
    ]);
    f.render_widget(
        Paragraph::new(Line::from(hints)).style(Styles::inactive()).wrap(Wrap { trim: true }),
        chunks[2],
    );

    if let Some(dialog) = form.country_dialog() {
        render_country_dialog(f, area, dialog, country_focus);
    }
}

fn render_country_dialog(f: &mut Frame, area: Rect, dialog: &CountryDialog, focus: CountryFocus) {
    let popup = centered_rect(40, 30, area);
    f.render_widget(Clear, popup);

    let line = |label: &str, value: &str, focused: bool| {
        let style = if focused { Styles::selected() } else { Styles::default() };
        Line::from(vec![
            Span::styled(fit_width(label, 8), Styles::info()),
            Span::styled(value.to_string(), style),
        ])
    };

    let mut lines = vec![
        line("Name", &dialog.name, focus == CountryFocus::Name),
        line("Code", &dialog.code, focus == CountryFocus::Code),
        Line::from(""),
    ];
    if let Some(error) = &dialog.error {
        lines.push(Line::from(Span::styled(error.clone(), Styles::error())));
    }
    lines.push(Line::from(Span::styled(
        "Tab switch field, Enter create, Esc cancel",
        Styles::inactive(),
    )));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title("New country")
            .borders(Borders::ALL)
            .border_style(Styles::active_border()),
    );
    f.render_widget(paragraph, popup);
}
