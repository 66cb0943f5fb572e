//! Entity list screen: collection state, search, selection and batch flows
//!
//! The screen is UI independent. Each operation takes the services it needs
//! and a notifier; the TUI and the CLI drive the same state machine.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{error, info, warn};

use super::draft::Editable;
use super::form::{EntityForm, FormMode, Submission};
use crate::api::EntityService;
use crate::import::ImportParser;
use crate::models::{Country, Entity};
use crate::notify::Notifier;
use crate::session::Permissions;

/// Outcome counters of one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub failed: usize,
}

/// One rendered row with its resolved actions
#[derive(Debug)]
pub struct RowView<'a, E> {
    pub entity: &'a E,
    pub selected: bool,
    pub can_edit: bool,
}

pub struct EntityListScreen<E: Editable> {
    items: Vec<E>,
    search: String,
    selected: BTreeSet<String>,
    form: Option<EntityForm<E::Draft>>,
    confirming_delete: bool,
    importing: bool,
    import_input: String,
    import_error: Option<String>,
}

impl<E: Editable> Default for EntityListScreen<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Editable> EntityListScreen<E> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            search: String::new(),
            selected: BTreeSet::new(),
            form: None,
            confirming_delete: false,
            importing: false,
            import_input: String::new(),
            import_error: None,
        }
    }

    pub fn with_items(mut self, items: Vec<E>) -> Self {
        self.items = items;
        self
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    /// Reload the collection from the remote service
    pub async fn refresh(&mut self, service: &dyn EntityService<E>, notifier: &mut dyn Notifier) -> bool {
        match service.fetch_all().await {
            Ok(items) => {
                info!("Loaded {} {}", items.len(), E::RESOURCE);
                self.items = items;
                true
            }
            Err(e) => {
                error!("Failed to load {}: {}", E::RESOURCE, e);
                notifier.error(format!("Could not load {}: {}", E::LABEL.to_lowercase(), e));
                false
            }
        }
    }

    // Search

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
    }

    pub fn search_mut(&mut self) -> &mut String {
        &mut self.search
    }

    /// Entities whose name contains the search text, ignoring case
    pub fn visible(&self) -> Vec<&E> {
        let needle = self.search.trim().to_lowercase();
        self.items
            .iter()
            .filter(|e| needle.is_empty() || e.name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Visible rows with selection and edit capability resolved
    pub fn rows(&self, permissions: &Permissions) -> Vec<RowView<'_, E>> {
        self.visible()
            .into_iter()
            .map(|entity| RowView {
                entity,
                selected: self.selected.contains(entity.id()),
                can_edit: permissions.can_edit(entity),
            })
            .collect()
    }

    // Selection

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Select every visible id, or clear them when all are already selected
    pub fn toggle_select_all(&mut self) {
        let visible: Vec<String> = self.visible().iter().map(|e| e.id().to_string()).collect();
        let all_selected = !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id));
        if all_selected {
            for id in &visible {
                self.selected.remove(id);
            }
        } else {
            self.selected = visible.into_iter().collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // Form flow

    pub fn form(&self) -> Option<&EntityForm<E::Draft>> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut EntityForm<E::Draft>> {
        self.form.as_mut()
    }

    pub fn open_create(&mut self, countries: Vec<Country>) {
        self.form = Some(EntityForm::create(countries));
    }

    /// Open the edit form; refused when the user may not edit this row
    pub fn open_edit(&mut self, id: &str, countries: Vec<Country>, permissions: &Permissions) -> bool {
        match self.items.iter().find(|e| e.id() == id) {
            Some(entity) if permissions.can_edit(entity) => {
                self.form = Some(EntityForm::edit(entity, countries));
                true
            }
            Some(_) => {
                warn!(id, "Edit refused: not an administrator nor the creator");
                false
            }
            None => false,
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Validate the open form, send it, and refresh on success.
    ///
    /// The form stays open when validation or the remote call fails.
    pub async fn submit_form(&mut self, service: &dyn EntityService<E>, notifier: &mut dyn Notifier) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };

        let Submission { mode, payload } = match form.submit() {
            Ok(submission) => submission,
            Err(e) => {
                notifier.error(e.to_string());
                return false;
            }
        };

        let result = match &mode {
            FormMode::Create => service.create(&payload).await,
            FormMode::Edit { id } => service.update(id, &payload).await,
        };

        match result {
            Ok(entity) => {
                let verb = if mode == FormMode::Create { "created" } else { "updated" };
                info!(id = entity.id(), "{} {}", E::RESOURCE, verb);
                self.form = None;
                notifier.success(format!("{} {}", entity.name(), verb));
                self.refresh(service, notifier).await;
                true
            }
            Err(e) => {
                error!("Failed to save {}: {}", E::RESOURCE, e);
                let message = format!("Save failed: {}", e);
                if let Some(form) = self.form.as_mut() {
                    form.set_error(Some(message.clone()));
                }
                notifier.error(message);
                false
            }
        }
    }

    // Bulk delete

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    /// Ask for confirmation; does nothing without a selection
    pub fn request_delete(&mut self) -> bool {
        self.confirming_delete = !self.selected.is_empty();
        self.confirming_delete
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Delete the selection, then clear it and refresh
    pub async fn confirm_delete(&mut self, service: &dyn EntityService<E>, notifier: &mut dyn Notifier) -> bool {
        if !self.confirming_delete {
            return false;
        }
        self.confirming_delete = false;

        let ids = self.selected_ids();
        match service.delete(&ids).await {
            Ok(()) => {
                info!("Deleted {} {}", ids.len(), E::RESOURCE);
                self.selected.clear();
                notifier.success(format!("{} {} deleted", ids.len(), E::LABEL.to_lowercase()));
                self.refresh(service, notifier).await;
                true
            }
            Err(e) => {
                error!("Bulk delete of {} failed: {}", E::RESOURCE, e);
                notifier.error(format!("Delete failed: {}", e));
                false
            }
        }
    }

    // Import

    pub fn is_importing(&self) -> bool {
        self.importing
    }

    pub fn import_input(&self) -> &str {
        &self.import_input
    }

    pub fn import_input_mut(&mut self) -> &mut String {
        &mut self.import_input
    }

    pub fn import_error(&self) -> Option<&str> {
        self.import_error.as_deref()
    }

    /// Clear the path input and the last import error
    pub fn reset_import(&mut self) {
        self.import_input.clear();
        self.import_error = None;
    }

    /// Import the file named in the import input, which is reset afterwards
    pub async fn import_from_input(
        &mut self,
        parser: &dyn ImportParser<E>,
        service: &dyn EntityService<E>,
        notifier: &mut dyn Notifier,
    ) -> Option<ImportSummary> {
        let path = std::mem::take(&mut self.import_input);
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        self.import_file(Path::new(path), parser, service, notifier).await
    }

    /// Parse `path` and create every row sequentially.
    ///
    /// An unreadable file aborts the import. A row that is invalid or
    /// rejected by the service only counts as a failure. The collection is
    /// refreshed once at the end.
    pub async fn import_file(
        &mut self,
        path: &Path,
        parser: &dyn ImportParser<E>,
        service: &dyn EntityService<E>,
        notifier: &mut dyn Notifier,
    ) -> Option<ImportSummary> {
        self.importing = true;
        self.import_error = None;
        self.import_input.clear();
        info!(file = %path.display(), "Importing {}", E::RESOURCE);

        let rows = match parser.parse(path) {
            Ok(rows) => rows,
            Err(e) => {
                error!(file = %path.display(), "Import parse failed: {}", e);
                self.import_error = Some(e.to_string());
                notifier.error(format!("Import failed: {}", e));
                self.importing = false;
                return None;
            }
        };

        let mut summary = ImportSummary::default();
        for (index, row) in rows.iter().enumerate() {
            let payload = match row {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Import row skipped: {}", e);
                    summary.failed += 1;
                    continue;
                }
            };
            match service.create(payload).await {
                Ok(_) => summary.created += 1,
                Err(e) => {
                    warn!(entry = index + 1, "Import row rejected: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(created = summary.created, failed = summary.failed, "Import finished");
        self.refresh(service, notifier).await;
        let message = format!(
            "Import finished: {} created, {} failed",
            summary.created, summary.failed
        );
        if summary.failed == 0 {
            notifier.success(message);
        } else {
            notifier.error(message);
        }
        self.importing = false;
        Some(summary)
    }
}
