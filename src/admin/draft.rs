//! In-memory edit state for one entity, serialized to a payload on submit

use chrono::{NaiveTime, Weekday};

use super::field_list::FieldList;
use super::vat::VatSelection;
use crate::errors::FormError;
use crate::models::{
    weekday_label, AccountingContact, Client, ClientPayload, Contact, DayHours, Entity,
    OpeningHours, Supplier, SupplierPayload,
};

const TIME_FORMAT: &str = "%H:%M";

/// Draft state of an entity form
pub trait Draft: Clone + Default + Send + Sync {
    type Entity: Entity;

    /// Draft pre-filled from an existing record
    fn from_entity(entity: &Self::Entity) -> Self;

    fn common(&self) -> &CommonFields;

    fn common_mut(&mut self) -> &mut CommonFields;

    /// Check the client-visible rules
    fn validate(&self) -> Result<(), FormError>;

    /// Normalized payload, built without validation
    fn to_payload(&self) -> <Self::Entity as Entity>::Payload;

    /// Validate then build the payload
    fn submit(&self) -> Result<<Self::Entity as Entity>::Payload, FormError> {
        self.validate()?;
        Ok(self.to_payload())
    }
}

/// Entities that can be edited through a form
pub trait Editable: Entity {
    type Draft: Draft<Entity = Self>;
}

impl Editable for Supplier {
    type Draft = SupplierDraft;
}

impl Editable for Client {
    type Draft = ClientDraft;
}

/// Split a comma separated input into trimmed segments.
///
/// Empty segments are kept, so "a, b," yields `["a", "b", ""]` and a blank
/// input yields `[""]`.
pub fn split_comma_list(value: &str) -> Vec<String> {
    value.split(',').map(|part| part.trim().to_string()).collect()
}

pub fn join_comma_list(values: &[String]) -> String {
    values.join(", ")
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Loose address check matching what an email input accepts
pub fn is_valid_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.trim().contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Contact, billing and locale fields shared by suppliers and clients
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonFields {
    pub name: String,
    pub email: String,
    pub emails: FieldList<String>,
    pub phone: String,
    pub payment_terms: String,
    pub siret: String,
    pub vat_number: String,
    pub vat: VatSelection,
    pub country_id: Option<String>,
}

impl CommonFields {
    #[allow(clippy::too_many_arguments)]
    fn load(
        name: &str,
        email: &str,
        emails: &[String],
        phone: &Option<String>,
        payment_terms: &Option<String>,
        siret: &Option<String>,
        vat_number: &Option<String>,
        vat_rate: f64,
        country_id: &Option<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            emails: FieldList::from_vec(emails.to_vec()),
            phone: phone.clone().unwrap_or_default(),
            payment_terms: payment_terms.clone().unwrap_or_default(),
            siret: siret.clone().unwrap_or_default(),
            vat_number: vat_number.clone().unwrap_or_default(),
            vat: VatSelection::from_rate(vat_rate),
            country_id: country_id.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if self.email.trim().is_empty() {
            return Err(FormError::MissingEmail);
        }
        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidEmail(self.email.trim().to_string()));
        }
        if let Some(bad) = self
            .emails
            .iter()
            .find(|e| !e.trim().is_empty() && !is_valid_email(e))
        {
            return Err(FormError::InvalidEmail(bad.trim().to_string()));
        }
        self.vat.validate()
    }

    fn extra_emails(&self) -> Vec<String> {
        self.emails.iter().map(|e| e.trim().to_string()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierDraft {
    pub common: CommonFields,
    /// Comma separated services offered
    pub services: String,
    /// Comma separated coverage zones
    pub coverage_zones: String,
}

impl Draft for SupplierDraft {
    type Entity = Supplier;

    fn from_entity(s: &Supplier) -> Self {
        Self {
            common: CommonFields::load(
                &s.name,
                &s.email,
                &s.emails,
                &s.phone,
                &s.payment_terms,
                &s.siret,
                &s.vat_number,
                s.vat_rate,
                &s.country_id,
            ),
            services: join_comma_list(&s.services),
            coverage_zones: join_comma_list(&s.coverage_zones),
        }
    }

    fn common(&self) -> &CommonFields {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonFields {
        &mut self.common
    }

    fn validate(&self) -> Result<(), FormError> {
        self.common.validate()
    }

    fn to_payload(&self) -> SupplierPayload {
        let c = &self.common;
        SupplierPayload {
            name: c.name.trim().to_string(),
            email: c.email.trim().to_string(),
            emails: c.extra_emails(),
            phone: optional(&c.phone),
            payment_terms: optional(&c.payment_terms),
            siret: optional(&c.siret),
            vat_number: optional(&c.vat_number),
            vat_rate: c.vat.resolve(),
            country_id: c.country_id.clone(),
            services: split_comma_list(&self.services),
            coverage_zones: split_comma_list(&self.coverage_zones),
        }
    }
}

/// One weekday of the opening-hours editor
#[derive(Debug, Clone, PartialEq)]
pub struct DayDraft {
    pub day: Weekday,
    pub closed: bool,
    pub open: String,
    pub close: String,
}

impl DayDraft {
    fn from_hours(hours: &DayHours) -> Self {
        let fmt = |t: Option<NaiveTime>| t.map(|t| t.format(TIME_FORMAT).to_string()).unwrap_or_default();
        Self {
            day: hours.day,
            closed: hours.closed,
            open: fmt(hours.open),
            close: fmt(hours.close),
        }
    }

    fn parse_time(&self, value: &str) -> Result<Option<NaiveTime>, FormError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(value, TIME_FORMAT)
            .map(Some)
            .map_err(|_| FormError::InvalidTime {
                day: weekday_label(self.day).to_string(),
                value: value.to_string(),
            })
    }

    fn validate(&self) -> Result<(), FormError> {
        if self.closed {
            return Ok(());
        }
        let open = self.parse_time(&self.open)?;
        let close = self.parse_time(&self.close)?;
        if open.is_none() || close.is_none() {
            return Err(FormError::MissingHours(weekday_label(self.day).to_string()));
        }
        Ok(())
    }

    fn to_hours(&self) -> DayHours {
        if self.closed {
            return DayHours {
                day: self.day,
                closed: true,
                open: None,
                close: None,
            };
        }
        DayHours {
            day: self.day,
            closed: false,
            open: self.parse_time(&self.open).ok().flatten(),
            close: self.parse_time(&self.close).ok().flatten(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub common: CommonFields,
    pub contacts: FieldList<Contact>,
    pub accounting: AccountingContact,
    pub hours: Vec<DayDraft>,
}

impl Default for ClientDraft {
    fn default() -> Self {
        Self {
            common: CommonFields::default(),
            contacts: FieldList::new(),
            accounting: AccountingContact::default(),
            hours: OpeningHours::default().days.iter().map(DayDraft::from_hours).collect(),
        }
    }
}

impl ClientDraft {
    pub fn toggle_closed(&mut self, index: usize) {
        if let Some(day) = self.hours.get_mut(index) {
            day.closed = !day.closed;
        }
    }

    fn accounting_contact(&self) -> Option<AccountingContact> {
        let a = &self.accounting;
        if a.name.trim().is_empty() && a.email.trim().is_empty() && a.phone.trim().is_empty() {
            return None;
        }
        Some(AccountingContact {
            name: a.name.trim().to_string(),
            email: a.email.trim().to_string(),
            phone: a.phone.trim().to_string(),
        })
    }
}

impl Draft for ClientDraft {
    type Entity = Client;

    fn from_entity(c: &Client) -> Self {
        let mut hours: Vec<DayDraft> = c.opening_hours.days.iter().map(DayDraft::from_hours).collect();
        if hours.is_empty() {
            hours = ClientDraft::default().hours;
        }
        Self {
            common: CommonFields::load(
                &c.name,
                &c.email,
                &c.emails,
                &c.phone,
                &c.payment_terms,
                &c.siret,
                &c.vat_number,
                c.vat_rate,
                &c.country_id,
            ),
            contacts: FieldList::from_vec(c.contacts.clone()),
            accounting: c.accounting_contact.clone().unwrap_or_default(),
            hours,
        }
    }

    fn common(&self) -> &CommonFields {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonFields {
        &mut self.common
    }

    fn validate(&self) -> Result<(), FormError> {
        self.common.validate()?;
        for contact in self.contacts.iter() {
            if !contact.email.trim().is_empty() && !is_valid_email(&contact.email) {
                return Err(FormError::InvalidEmail(contact.email.trim().to_string()));
            }
        }
        let accounting_email = self.accounting.email.trim();
        if !accounting_email.is_empty() && !is_valid_email(accounting_email) {
            return Err(FormError::InvalidEmail(accounting_email.to_string()));
        }
        self.hours.iter().try_for_each(DayDraft::validate)
    }

    fn to_payload(&self) -> ClientPayload {
        let c = &self.common;
        ClientPayload {
            name: c.name.trim().to_string(),
            email: c.email.trim().to_string(),
            emails: c.extra_emails(),
            phone: optional(&c.phone),
            payment_terms: optional(&c.payment_terms),
            siret: optional(&c.siret),
            vat_number: optional(&c.vat_number),
            vat_rate: c.vat.resolve(),
            country_id: c.country_id.clone(),
            contacts: self.contacts.to_vec(),
            accounting_contact: self.accounting_contact(),
            opening_hours: OpeningHours {
                days: self.hours.iter().map(DayDraft::to_hours).collect(),
            },
        }
    }
}
