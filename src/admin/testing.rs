//! In-memory services and notifier for screen tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{CountryService, EntityService};
use crate::errors::ApiError;
use crate::models::{Client, ClientPayload, Country, Entity, Supplier, SupplierPayload};
use crate::notify::Notifier;

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub successes: Vec<String>,
    pub errors: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn success(&mut self, message: String) {
        self.successes.push(message);
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }
}

fn rejected(message: &str) -> ApiError {
    ApiError::Status {
        status_code: 422,
        message: message.to_string(),
    }
}

/// Builds a stored record out of a payload
pub trait Materialize: Entity {
    fn materialize(id: String, created_by: Option<String>, payload: &Self::Payload) -> Self;

    fn payload_name(payload: &Self::Payload) -> &str;
}

impl Materialize for Supplier {
    fn materialize(id: String, created_by: Option<String>, p: &SupplierPayload) -> Self {
        Supplier {
            id,
            name: p.name.clone(),
            email: p.email.clone(),
            emails: p.emails.clone(),
            phone: p.phone.clone(),
            payment_terms: p.payment_terms.clone(),
            siret: p.siret.clone(),
            vat_number: p.vat_number.clone(),
            vat_rate: p.vat_rate,
            country_id: p.country_id.clone(),
            services: p.services.clone(),
            coverage_zones: p.coverage_zones.clone(),
            created_by,
        }
    }

    fn payload_name(payload: &SupplierPayload) -> &str {
        &payload.name
    }
}

impl Materialize for Client {
    fn materialize(id: String, created_by: Option<String>, p: &ClientPayload) -> Self {
        Client {
            id,
            name: p.name.clone(),
            email: p.email.clone(),
            emails: p.emails.clone(),
            phone: p.phone.clone(),
            payment_terms: p.payment_terms.clone(),
            siret: p.siret.clone(),
            vat_number: p.vat_number.clone(),
            vat_rate: p.vat_rate,
            country_id: p.country_id.clone(),
            contacts: p.contacts.clone(),
            accounting_contact: p.accounting_contact.clone(),
            opening_hours: p.opening_hours.clone(),
            created_by,
        }
    }

    fn payload_name(payload: &ClientPayload) -> &str {
        &payload.name
    }
}

/// Collection service holding records in memory
pub struct FakeEntities<E> {
    items: Mutex<Vec<E>>,
    fetches: AtomicUsize,
    next_id: AtomicUsize,
    reject_names: Vec<String>,
    fail_all: bool,
}

impl<E: Materialize> FakeEntities<E> {
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items: Mutex::new(items),
            fetches: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
            reject_names: Vec::new(),
            fail_all: false,
        }
    }

    /// Creation of a payload with one of these names is rejected
    pub fn rejecting(mut self, names: &[&str]) -> Self {
        self.reject_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Every call fails
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn ids(&self) -> Vec<String> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }
}

#[async_trait]
impl<E: Materialize> EntityService<E> for FakeEntities<E> {
    async fn fetch_all(&self) -> Result<Vec<E>, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_all {
            return Err(rejected("unavailable"));
        }
        Ok(self.items.lock().unwrap().clone())
    }

    async fn create(&self, payload: &E::Payload) -> Result<E, ApiError> {
        let name = E::payload_name(payload);
        if self.fail_all || self.reject_names.iter().any(|n| n == name) {
            return Err(rejected("rejected"));
        }
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let entity = E::materialize(id, Some("u1".to_string()), payload);
        self.items.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &str, payload: &E::Payload) -> Result<E, ApiError> {
        if self.fail_all {
            return Err(rejected("rejected"));
        }
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| ApiError::Status {
                status_code: 404,
                message: format!("{} not found", id),
            })?;
        let created_by = slot.created_by().map(str::to_string);
        *slot = E::materialize(id.to_string(), created_by, payload);
        Ok(slot.clone())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), ApiError> {
        if self.fail_all {
            return Err(rejected("rejected"));
        }
        self.items
            .lock()
            .unwrap()
            .retain(|e| !ids.iter().any(|id| id == e.id()));
        Ok(())
    }
}

pub struct FakeCountries {
    countries: Mutex<Vec<Country>>,
    created: AtomicUsize,
    fail: bool,
}

impl FakeCountries {
    pub fn new(countries: Vec<Country>) -> Self {
        Self {
            countries: Mutex::new(countries),
            created: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CountryService for FakeCountries {
    async fn fetch_all(&self) -> Result<Vec<Country>, ApiError> {
        Ok(self.countries.lock().unwrap().clone())
    }

    async fn create(&self, name: &str, code: &str) -> Result<Country, ApiError> {
        if self.fail {
            return Err(rejected("country already exists"));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        let country = Country {
            id: code.to_lowercase(),
            name: name.to_string(),
            code: code.to_string(),
        };
        self.countries.lock().unwrap().push(country.clone());
        Ok(country)
    }
}

pub fn supplier(id: &str, name: &str, created_by: Option<&str>) -> Supplier {
    Supplier {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@suppliers.test", id),
        emails: vec![],
        phone: None,
        payment_terms: None,
        siret: None,
        vat_number: None,
        vat_rate: 20.0,
        country_id: None,
        services: vec![],
        coverage_zones: vec![],
        created_by: created_by.map(str::to_string),
    }
}
