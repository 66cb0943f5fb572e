//! Entity table component: selectable rows with checkbox and edit marker

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::admin::{vat::format_rate, RowView};
use crate::models::{Client, Country, Entity, Supplier};
use crate::tui::ui::{fit_width, Styles};

/// Column layout of an entity type in the table
pub trait TableColumns: Entity {
    /// Header label and width of each column
    const COLUMNS: &'static [(&'static str, usize)];

    fn cells(&self, countries: &[Country]) -> Vec<String>;
}

fn country_name(id: Option<&str>, countries: &[Country]) -> String {
    id.and_then(|id| countries.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

impl TableColumns for Supplier {
    const COLUMNS: &'static [(&'static str, usize)] = &[
        ("Name", 24),
        ("Email", 26),
        ("Phone", 16),
        ("Services", 22),
        ("Country", 12),
        ("VAT", 6),
    ];

    fn cells(&self, countries: &[Country]) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone().unwrap_or_default(),
            self.services.join(", "),
            country_name(self.country_id.as_deref(), countries),
            format!("{}%", format_rate(self.vat_rate)),
        ]
    }
}

impl TableColumns for Client {
    const COLUMNS: &'static [(&'static str, usize)] = &[
        ("Name", 24),
        ("Email", 26),
        ("Phone", 16),
        ("Contacts", 8),
        ("Country", 12),
        ("VAT", 6),
    ];

    fn cells(&self, countries: &[Country]) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone().unwrap_or_default(),
            self.contacts.len().to_string(),
            country_name(self.country_id.as_deref(), countries),
            format!("{}%", format_rate(self.vat_rate)),
        ]
    }
}

fn row_line<'a>(cells: Vec<String>, widths: &[usize], prefix: String, style: Style) -> Line<'a> {
    let mut spans = vec![Span::styled(prefix, style)];
    for (cell, width) in cells.iter().zip(widths) {
        spans.push(Span::styled(" | ", style));
        spans.push(Span::styled(fit_width(cell, *width), style));
    }
    Line::from(spans)
}

/// Render `rows` with the cursor on `state`; the header is not selectable
pub fn render_entity_table<E: TableColumns>(
    f: &mut Frame,
    area: Rect,
    rows: &[RowView<'_, E>],
    countries: &[Country],
    state: &mut ListState,
    title: &str,
) {
    let widths: Vec<usize> = E::COLUMNS.iter().map(|(_, w)| *w).collect();
    let headers: Vec<String> = E::COLUMNS.iter().map(|(h, _)| h.to_string()).collect();
    let header = row_line(headers, &widths, "    ".to_string(), Styles::title());

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if Some(i) == state.selected() {
                Styles::selected()
            } else if row.can_edit {
                Style::default()
            } else {
                Styles::inactive()
            };
            let checkbox = if row.selected { "[x]" } else { "[ ]" };
            let marker = if row.can_edit { '✎' } else { ' ' };
            let prefix = format!("{}{}", checkbox, marker);
            ListItem::new(row_line(row.entity.cells(countries), &widths, prefix, style))
        })
        .collect();

    let selected = rows.iter().filter(|r| r.selected).count();
    let block = Block::default()
        .title(format!("{} ({} shown, {} selected)", title, rows.len(), selected))
        .borders(Borders::ALL)
        .border_style(Styles::active_border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(header), chunks[0]);
    f.render_stateful_widget(List::new(items), chunks[1], state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_cells_resolve_country() {
        let supplier = Supplier {
            id: "s1".to_string(),
            name: "Parts Ltd".to_string(),
            email: "sales@parts.test".to_string(),
            emails: vec![],
            phone: None,
            payment_terms: None,
            siret: None,
            vat_number: None,
            vat_rate: 5.5,
            country_id: Some("fr".to_string()),
            services: vec!["repair".to_string(), "install".to_string()],
            coverage_zones: vec![],
            created_by: None,
        };
        let countries = vec![Country {
            id: "fr".to_string(),
            name: "France".to_string(),
            code: "FR".to_string(),
        }];

        let cells = supplier.cells(&countries);
        assert_eq!(cells.len(), Supplier::COLUMNS.len());
        assert_eq!(cells[3], "repair, install");
        assert_eq!(cells[4], "France");
        assert_eq!(cells[5], "5.5%");
    }
}
