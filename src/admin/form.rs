//! Modal entity form: owns a draft and the country creation sub-dialog

use tracing::{error, info};

use super::draft::Draft;
use crate::api::CountryService;
use crate::errors::FormError;
use crate::models::{Country, Entity};
use crate::notify::Notifier;

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Result of a successful form submission, handed back to the list screen
#[derive(Debug, Clone, PartialEq)]
pub struct Submission<P> {
    pub mode: FormMode,
    pub payload: P,
}

/// Inline dialog used to create a country without leaving the form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryDialog {
    pub name: String,
    pub code: String,
    pub error: Option<String>,
}

pub struct EntityForm<D: Draft> {
    mode: FormMode,
    pub draft: D,
    countries: Vec<Country>,
    country_dialog: Option<CountryDialog>,
    error: Option<String>,
}

impl<D: Draft> EntityForm<D> {
    pub fn create(countries: Vec<Country>) -> Self {
        Self {
            mode: FormMode::Create,
            draft: D::default(),
            countries,
            country_dialog: None,
            error: None,
        }
    }

    pub fn edit(entity: &D::Entity, countries: Vec<Country>) -> Self {
        Self {
            mode: FormMode::Edit {
                id: entity.id().to_string(),
            },
            draft: D::from_entity(entity),
            countries,
            country_dialog: None,
            error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn title(&self) -> String {
        let label = <D::Entity as Entity>::LABEL.trim_end_matches('s');
        match self.mode {
            FormMode::Create => format!("New {}", label.to_lowercase()),
            FormMode::Edit { .. } => format!("Edit {}", label.to_lowercase()),
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn selected_country(&self) -> Option<&Country> {
        let id = self.draft.common().country_id.as_deref()?;
        self.countries.iter().find(|c| c.id == id)
    }

    pub fn select_country(&mut self, id: Option<&str>) {
        self.draft.common_mut().country_id = id.map(str::to_string);
    }

    /// Step through "no country" followed by the known countries
    pub fn cycle_country(&mut self, forward: bool) {
        let slots = self.countries.len() + 1;
        let current = self
            .draft
            .common()
            .country_id
            .as_deref()
            .and_then(|id| self.countries.iter().position(|c| c.id == id))
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        let id = next
            .checked_sub(1)
            .and_then(|i| self.countries.get(i))
            .map(|c| c.id.clone());
        self.draft.common_mut().country_id = id;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: Option<String>) {
        self.error = message;
    }

    pub fn country_dialog(&self) -> Option<&CountryDialog> {
        self.country_dialog.as_ref()
    }

    pub fn country_dialog_mut(&mut self) -> Option<&mut CountryDialog> {
        self.country_dialog.as_mut()
    }

    pub fn open_country_dialog(&mut self) {
        self.country_dialog = Some(CountryDialog::default());
    }

    pub fn close_country_dialog(&mut self) {
        self.country_dialog = None;
    }

    /// Create the country typed in the sub-dialog and select it.
    ///
    /// On failure the dialog stays open with the error attached.
    pub async fn create_country(
        &mut self,
        service: &dyn CountryService,
        notifier: &mut dyn Notifier,
    ) -> Option<Country> {
        let dialog = self.country_dialog.as_mut()?;
        let name = dialog.name.trim().to_string();
        let code = dialog.code.trim().to_uppercase();
        if name.is_empty() || code.is_empty() {
            let message = FormError::IncompleteCountry.to_string();
            dialog.error = Some(message.clone());
            notifier.error(message);
            return None;
        }

        match service.create(&name, &code).await {
            Ok(country) => {
                info!(country = %country.name, "Country created");
                self.countries.push(country.clone());
                self.draft.common_mut().country_id = Some(country.id.clone());
                self.country_dialog = None;
                notifier.success(format!("Country {} created", country.name));
                Some(country)
            }
            Err(e) => {
                error!("Country creation failed: {}", e);
                let message = format!("Could not create country: {}", e);
                if let Some(dialog) = self.country_dialog.as_mut() {
                    dialog.error = Some(message.clone());
                }
                notifier.error(message);
                None
            }
        }
    }

    /// Validate the draft and produce the payload for the caller
    pub fn submit(&mut self) -> Result<Submission<<D::Entity as Entity>::Payload>, FormError> {
        match self.draft.submit() {
            Ok(payload) => {
                self.error = None;
                Ok(Submission {
                    mode: self.mode.clone(),
                    payload,
                })
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::draft::SupplierDraft;
    use crate::admin::testing::{FakeCountries, RecordingNotifier};
    use crate::models::Supplier;

    fn countries() -> Vec<Country> {
        vec![
            Country { id: "fr".to_string(), name: "France".to_string(), code: "FR".to_string() },
            Country { id: "de".to_string(), name: "Germany".to_string(), code: "DE".to_string() },
        ]
    }

    #[tokio::test]
    async fn test_country_creation_selects_new_country() {
        let service = FakeCountries::new(countries());
        let mut notifier = RecordingNotifier::default();
        let mut form: EntityForm<SupplierDraft> = EntityForm::create(countries());

        form.open_country_dialog();
        let dialog = form.country_dialog_mut().unwrap();
        dialog.name = "Belgium".to_string();
        dialog.code = "be".to_string();

        let created = form.create_country(&service, &mut notifier).await.unwrap();
        assert_eq!(created.code, "BE");
        assert!(form.country_dialog().is_none());
        assert_eq!(form.selected_country().map(|c| c.name.as_str()), Some("Belgium"));
        assert_eq!(form.countries().len(), 3);
        assert_eq!(notifier.successes.len(), 1);
    }

    #[tokio::test]
    async fn test_country_creation_failure_keeps_dialog_open() {
        let service = FakeCountries::failing();
        let mut notifier = RecordingNotifier::default();
        let mut form: EntityForm<SupplierDraft> = EntityForm::create(countries());
        form.select_country(Some("fr"));

        form.open_country_dialog();
        let dialog = form.country_dialog_mut().unwrap();
        dialog.name = "Belgium".to_string();
        dialog.code = "BE".to_string();

        assert!(form.create_country(&service, &mut notifier).await.is_none());
        assert!(form.country_dialog().unwrap().error.is_some());
        assert_eq!(form.selected_country().map(|c| c.id.as_str()), Some("fr"));
        assert_eq!(notifier.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_country_is_not_sent() {
        let service = FakeCountries::new(vec![]);
        let mut notifier = RecordingNotifier::default();
        let mut form: EntityForm<SupplierDraft> = EntityForm::create(vec![]);
        form.open_country_dialog();

        assert!(form.create_country(&service, &mut notifier).await.is_none());
        assert_eq!(service.created(), 0);
        assert_eq!(
            form.country_dialog().unwrap().error.as_deref(),
            Some("Country name and code are required")
        );
    }

    #[test]
    fn test_cycle_country_wraps_through_none() {
        let mut form: EntityForm<SupplierDraft> = EntityForm::create(countries());
        form.cycle_country(true);
        assert_eq!(form.selected_country().map(|c| c.id.as_str()), Some("fr"));
        form.cycle_country(true);
        form.cycle_country(true);
        assert!(form.selected_country().is_none());
        form.cycle_country(false);
        assert_eq!(form.selected_country().map(|c| c.id.as_str()), Some("de"));
    }

    #[test]
    fn test_edit_submission_carries_id() {
        let supplier = Supplier {
            id: "s9".to_string(),
            name: "Parts Ltd".to_string(),
            email: "sales@parts.test".to_string(),
            emails: vec![],
            phone: None,
            payment_terms: None,
            siret: None,
            vat_number: None,
            vat_rate: 20.0,
            country_id: None,
            services: vec![],
            coverage_zones: vec![],
            created_by: None,
        };
        let mut form: EntityForm<SupplierDraft> = EntityForm::edit(&supplier, vec![]);
        assert_eq!(form.title(), "Edit supplier");

        let submission = form.submit().unwrap();
        assert_eq!(submission.mode, FormMode::Edit { id: "s9".to_string() });
        assert_eq!(submission.payload.vat_rate, 20.0);
    }

    #[test]
    fn test_invalid_submit_sets_inline_error() {
        let mut form: EntityForm<SupplierDraft> = EntityForm::create(vec![]);
        assert!(form.submit().is_err());
        assert_eq!(form.error(), Some("Name is required"));
    }
}
