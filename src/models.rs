use chrono::{NaiveTime, Weekday};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Common behaviour of the records managed by the administration screens
pub trait Entity: Clone + Send + Sync + DeserializeOwned + 'static {
    /// Creation/update body sent to the remote service
    type Payload: Clone + Send + Sync + Serialize + 'static;

    /// Human readable plural label, e.g. "Suppliers"
    const LABEL: &'static str;
    /// REST resource segment, e.g. "suppliers"
    const RESOURCE: &'static str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn created_by(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// Body of a country creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCountry {
    pub name: String,
    pub code: String,
}

/// Named contact attached to a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub day: Weekday,
    pub closed: bool,
    pub open: Option<NaiveTime>,
    pub close: Option<NaiveTime>,
}

/// Weekly schedule, one entry per weekday starting on Monday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpeningHours {
    pub days: Vec<DayHours>,
}

pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl Default for OpeningHours {
    fn default() -> Self {
        let open = NaiveTime::from_hms_opt(9, 0, 0);
        let close = NaiveTime::from_hms_opt(18, 0, 0);
        let days = WEEK
            .iter()
            .map(|&day| {
                let weekend = matches!(day, Weekday::Sat | Weekday::Sun);
                DayHours {
                    day,
                    closed: weekend,
                    open: if weekend { None } else { open },
                    close: if weekend { None } else { close },
                }
            })
            .collect();
        Self { days }
    }
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub siret: Option<String>,
    #[serde(default)]
    pub vat_number: Option<String>,
    pub vat_rate: f64,
    #[serde(default)]
    pub country_id: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub coverage_zones: Vec<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    pub name: String,
    pub email: String,
    pub emails: Vec<String>,
    pub phone: Option<String>,
    pub payment_terms: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub vat_rate: f64,
    pub country_id: Option<String>,
    pub services: Vec<String>,
    pub coverage_zones: Vec<String>,
}

impl Entity for Supplier {
    type Payload = SupplierPayload;

    const LABEL: &'static str = "Suppliers";
    const RESOURCE: &'static str = "suppliers";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub siret: Option<String>,
    #[serde(default)]
    pub vat_number: Option<String>,
    pub vat_rate: f64,
    #[serde(default)]
    pub country_id: Option<String>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub accounting_contact: Option<AccountingContact>,
    #[serde(default)]
    pub opening_hours: OpeningHours,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub name: String,
    pub email: String,
    pub emails: Vec<String>,
    pub phone: Option<String>,
    pub payment_terms: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub vat_rate: f64,
    pub country_id: Option<String>,
    pub contacts: Vec<Contact>,
    pub accounting_contact: Option<AccountingContact>,
    pub opening_hours: OpeningHours,
}

impl Entity for Client {
    type Payload = ClientPayload;

    const LABEL: &'static str = "Clients";
    const RESOURCE: &'static str = "clients";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_deserialization_with_defaults() {
        let body = r#"{
            "id": "c1",
            "name": "Acme",
            "email": "billing@acme.test",
            "vatRate": 20,
            "createdBy": "u42"
        }"#;

        let client: Client = serde_json::from_str(body).unwrap();
        assert_eq!(client.id(), "c1");
        assert_eq!(client.created_by(), Some("u42"));
        assert!(client.contacts.is_empty());
        assert_eq!(client.opening_hours.days.len(), 7);
        assert!(client.opening_hours.days[5].closed);
    }

    #[test]
    fn test_supplier_payload_uses_camel_case() {
        let payload = SupplierPayload {
            name: "Parts Ltd".to_string(),
            email: "sales@parts.test".to_string(),
            emails: vec![],
            phone: None,
            payment_terms: Some("30 days".to_string()),
            siret: None,
            vat_number: None,
            vat_rate: 5.5,
            country_id: Some("fr".to_string()),
            services: vec!["repair".to_string()],
            coverage_zones: vec![],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["paymentTerms"], "30 days");
        assert_eq!(json["vatRate"], 5.5);
        assert_eq!(json["coverageZones"], serde_json::json!([]));
    }
}
