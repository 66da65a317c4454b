/// CKAN action API client
///
/// Only resource deletion is needed here: when a watershed whose RAPID
/// inputs were published to CKAN is removed, its input resource goes too.
///
/// API Documentation: https://docs.ckan.org/en/latest/api/

use super::{CatalogManager, RemoteError};
use crate::model::DataStore;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

const SERVICE: &str = "CKAN";

#[derive(Debug, Deserialize)]
struct ActionResponse {
    success: bool,
    error: Option<ActionError>,
}

#[derive(Debug, Deserialize)]
struct ActionError {
    message: Option<String>,
    #[serde(rename = "__type")]
    kind: Option<String>,
}

pub struct CkanClient {
    client: Client,
    api_endpoint: String,
    api_key: String,
}

impl CkanClient {
    /// `api_endpoint` is the action API root, e.g. `http://ckan.example.org/api/3`.
    pub fn new(client: Client, api_endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            api_endpoint: api_endpoint.trim().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn for_data_store(client: Client, data_store: &DataStore) -> Self {
        Self::new(client, &data_store.api_endpoint, &data_store.api_key)
    }

    pub fn action_url(&self, action: &str) -> String {
        format!("{}/action/{}", self.api_endpoint, action)
    }
}

impl CatalogManager for CkanClient {
    fn delete_resource(&self, resource_id: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.action_url("resource_delete"))
            .header("Authorization", &self.api_key)
            .json(&serde_json::json!({ "id": resource_id }))
            .send()
            .map_err(|source| RemoteError::Http {
                service: SERVICE,
                source,
            })?;

        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        check_action_response(status, &body)?;

        info!(resource_id = %resource_id, "deleted CKAN resource");
        Ok(())
    }
}

/// CKAN reports failures both as HTTP errors and as `"success": false`
/// bodies; a JSON body is preferred when present since it carries the reason.
fn check_action_response(status: u16, body: &str) -> Result<(), RemoteError> {
    match serde_json::from_str::<ActionResponse>(body) {
        Ok(parsed) if parsed.success => Ok(()),
        Ok(parsed) => {
            let message = parsed
                .error
                .map(|e| match (e.kind, e.message) {
                    (Some(kind), Some(message)) => format!("{}: {}", kind, message),
                    (Some(kind), None) => kind,
                    (None, Some(message)) => message,
                    (None, None) => "unknown error".to_string(),
                })
                .unwrap_or_else(|| "unknown error".to_string());
            Err(RemoteError::Api {
                service: SERVICE,
                message,
            })
        }
        Err(_) if !(200..300).contains(&status) => Err(RemoteError::Status {
            service: SERVICE,
            status,
            body: body.to_string(),
        }),
        Err(e) => Err(RemoteError::Decode {
            service: SERVICE,
            message: e.to_string(),
        }),
    }
}
