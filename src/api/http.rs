//! REST binding of the remote services

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CountryService, EntityService};
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{Country, Entity, NewCountry};

/// Shared HTTP client bound to the API base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        reqwest::Url::parse(&config.api_url)
            .map_err(|_| ApiError::InvalidUrl(config.api_url.clone()))?;

        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    /// Service for one entity collection
    pub fn entities<E: Entity>(&self) -> HttpEntityService<E> {
        HttpEntityService {
            api: self.clone(),
            _entity: PhantomData,
        }
    }

    pub fn countries(&self) -> HttpCountryService {
        HttpCountryService { api: self.clone() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|err| err.message)
            .unwrap_or(body);
        warn!(status = status.as_u16(), %message, "API request rejected");

        Err(ApiError::Status {
            status_code: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, resource: &str) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            resource: resource.to_string(),
            source,
        })
    }
}

/// `EntityService` backed by `{base}/{E::RESOURCE}`
#[derive(Debug, Clone)]
pub struct HttpEntityService<E> {
    api: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

#[async_trait]
impl<E: Entity> EntityService<E> for HttpEntityService<E> {
    async fn fetch_all(&self) -> Result<Vec<E>, ApiError> {
        debug!(resource = E::RESOURCE, "fetching collection");
        let response = self.api.send(self.api.client.get(self.api.url(E::RESOURCE))).await?;
        self.api.decode(response, E::RESOURCE).await
    }

    async fn create(&self, payload: &E::Payload) -> Result<E, ApiError> {
        let request = self.api.client.post(self.api.url(E::RESOURCE)).json(payload);
        let response = self.api.send(request).await?;
        self.api.decode(response, E::RESOURCE).await
    }

    async fn update(&self, id: &str, payload: &E::Payload) -> Result<E, ApiError> {
        let path = format!("{}/{}", E::RESOURCE, id);
        let request = self.api.client.put(self.api.url(&path)).json(payload);
        let response = self.api.send(request).await?;
        self.api.decode(response, E::RESOURCE).await
    }

    async fn delete(&self, ids: &[String]) -> Result<(), ApiError> {
        let request = self
            .api
            .client
            .delete(self.api.url(E::RESOURCE))
            .json(&DeleteRequest { ids });
        self.api.send(request).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HttpCountryService {
    api: ApiClient,
}

const COUNTRIES: &str = "countries";

#[async_trait]
impl CountryService for HttpCountryService {
    async fn fetch_all(&self) -> Result<Vec<Country>, ApiError> {
        let response = self.api.send(self.api.client.get(self.api.url(COUNTRIES))).await?;
        self.api.decode(response, COUNTRIES).await
    }

    async fn create(&self, name: &str, code: &str) -> Result<Country, ApiError> {
        let body = NewCountry {
            name: name.to_string(),
            code: code.to_string(),
        };
        let request = self.api.client.post(self.api.url(COUNTRIES)).json(&body);
        let response = self.api.send(request).await?;
        self.api.decode(response, COUNTRIES).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Supplier;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn supplier_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": "sales@parts.test",
            "vatRate": 20.0,
            "createdBy": "u1"
        })
    }

    fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        let mut config = Config::from_env().unwrap().with_api_url(&server.uri());
        config.api_token = token.map(str::to_string);
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_all_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/suppliers"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                supplier_json("s1", "Parts Ltd"),
                supplier_json("s2", "Bolts & Co"),
            ])))
            .mount(&server)
            .await;

        let service = client_for(&server, Some("secret")).entities::<Supplier>();
        let suppliers = service.fetch_all().await.unwrap();
        assert_eq!(suppliers.len(), 2);
        assert_eq!(suppliers[1].name, "Bolts & Co");
    }

    #[tokio::test]
    async fn test_delete_sends_id_batch() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/suppliers"))
            .and(body_json(json!({ "ids": ["s1", "s3"] })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let service = client_for(&server, None).entities::<Supplier>();
        service
            .delete(&["s1".to_string(), "s3".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/suppliers/s1"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "message": "not your supplier" })),
            )
            .mount(&server)
            .await;

        let service = client_for(&server, None).entities::<Supplier>();
        let payload = crate::models::SupplierPayload {
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
        };

        match service.update("s1", &payload).await {
            Err(ApiError::Status { status_code, message }) => {
                assert_eq!(status_code, 403);
                assert_eq!(message, "not your supplier");
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.id)),
        }
    }

    #[tokio::test]
    async fn test_create_country_returns_new_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/countries"))
            .and(body_json(json!({ "name": "Belgium", "code": "BE" })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "id": "be", "name": "Belgium", "code": "BE" })),
            )
            .mount(&server)
            .await;

        let countries = client_for(&server, None).countries();
        let country = countries.create("Belgium", "BE").await.unwrap();
        assert_eq!(country.id, "be");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/countries"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let countries = client_for(&server, None).countries();
        assert!(matches!(
            countries.fetch_all().await,
            Err(ApiError::Decode { .. })
        ));
    }
}
