//! REST client for the plans service.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | operation | request |
//! |---|---|
//! | fetch a day | `GET /plans?date=YYYY-MM-DD` |
//! | create | `POST /plans` |
//! | update | `PUT /plans/{id}` |
//! | delete | `DELETE /plans/{id}` |

use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{AppConfig, PlanBackend, TransportError};
use crate::model::{PlanId, PlanItem};

pub struct HttpBackend {
    base: Url,
    token: Option<String>,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        let base_url = base_url.into();
        let base = Url::parse(&base_url)
            .map_err(|e| TransportError::Unavailable(format!("invalid API URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::Unavailable(format!("API URL '{}' cannot take a path", base_url)));
        }
        Ok(Self {
            base,
            token,
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        Self::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn plans_url(&self) -> Url {
        self.endpoint(None)
    }

    /// Ids are opaque, so they go in as one escaped path segment.
    fn plan_url(&self, id: &PlanId) -> Url {
        self.endpoint(Some(id))
    }

    fn endpoint(&self, id: Option<&PlanId>) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are always there.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("plans");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = self
            .with_auth(request)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(TransportError::Status {
                code: status.as_u16(),
                body,
            })
        }
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        self.send(request)?
            .json()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl PlanBackend for HttpBackend {
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<PlanItem>, TransportError> {
        let key = date.format("%Y-%m-%d").to_string();
        tracing::debug!(date = %key, "GET /plans");
        let request = self.client.get(self.plans_url()).query(&[("date", key)]);
        self.send_json(request)
    }

    fn create(&self, item: &PlanItem) -> Result<PlanItem, TransportError> {
        tracing::debug!(id = %item.id, "POST /plans");
        self.send_json(self.client.post(self.plans_url()).json(item))
    }

    fn update(&self, item: &PlanItem) -> Result<PlanItem, TransportError> {
        tracing::debug!(id = %item.id, "PUT /plans/{{id}}");
        self.send_json(self.client.put(self.plan_url(&item.id)).json(item))
    }

    fn delete(&self, id: &PlanId) -> Result<(), TransportError> {
        tracing::debug!(%id, "DELETE /plans/{{id}}");
        self.send(self.client.delete(self.plan_url(id)))?;
        Ok(())
    }
}
