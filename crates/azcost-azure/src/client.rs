//! Azure Resource Manager HTTP client.
//!
//! Implements [`ResourceGroupSource`] and [`CostQueryService`] over the ARM
//! REST API with a bearer token obtained from a session.

use std::time::Duration;

use async_trait::async_trait;
use azcost_config::DEFAULT_MANAGEMENT_ENDPOINT;
use azcost_cost::{
    CostQueryRequest, CostQueryResult, CostQueryService, ResourceGroup, ResourceGroupSource,
};
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{AzureError, Result};
use crate::models::{QueryDefinition, QueryResponse, ResourceGroupListResponse};

/// API version for resource group listing.
const RESOURCES_API_VERSION: &str = "2021-04-01";

/// API version for Cost Management queries.
const COST_MANAGEMENT_API_VERSION: &str = "2023-03-01";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Azure Resource Manager client.
#[derive(Clone)]
pub struct AzureClient {
    /// HTTP client.
    client: Client,
    /// ARM endpoint without trailing slash.
    endpoint: String,
    /// OAuth2 access token.
    access_token: String,
}

impl AzureClient {
    /// Create a client for the public cloud with the default timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(
            DEFAULT_MANAGEMENT_ENDPOINT,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client against a specific ARM endpoint.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            endpoint,
            access_token: access_token.into(),
        })
    }

    /// ARM endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn resource_groups_url(&self, subscription_id: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourcegroups?api-version={}",
            self.endpoint, subscription_id, RESOURCES_API_VERSION
        )
    }

    fn cost_query_url(&self, scope: &str) -> String {
        format!(
            "{}{}/providers/Microsoft.CostManagement/query?api-version={}",
            self.endpoint, scope, COST_MANAGEMENT_API_VERSION
        )
    }

    /// List every resource group in a subscription, following `nextLink`.
    pub async fn resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>> {
        let mut groups = Vec::new();
        let mut next = Some(self.resource_groups_url(subscription_id));

        while let Some(url) = next {
            let page: ResourceGroupListResponse = self.get(&url).await?;
            groups.extend(page.value.into_iter().map(|rg| ResourceGroup {
                name: rg.name,
                location: rg.location,
            }));
            next = page.next_link;
        }

        debug!(subscription_id, count = groups.len(), "listed resource groups");
        Ok(groups)
    }

    /// Run a cost query, following `properties.nextLink` and concatenating rows.
    pub async fn query(&self, request: &CostQueryRequest) -> Result<CostQueryResult> {
        let body = QueryDefinition::from(request);
        let mut result = CostQueryResult::default();
        let mut next = Some(self.cost_query_url(&request.scope));

        while let Some(url) = next {
            let page: QueryResponse = self.post(&url, &body).await?;
            let properties = page.properties;
            if result.columns.is_empty() {
                result.columns = properties.columns;
            }
            result.rows.extend(properties.rows);
            next = properties.next_link;
        }

        debug!(scope = %request.scope, rows = result.rows.len(), "cost query complete");
        Ok(result)
    }

    /// Make an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Make an authenticated POST request with a JSON body.
    async fn post<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .json(body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Map status codes to errors and decode successful bodies.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(AzureError::Throttled { retry_after_secs });
        }

        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "failed to parse response");
                AzureError::Serialization(e)
            })
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(AzureError::Auth(text))
        } else {
            Err(AzureError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl ResourceGroupSource for AzureClient {
    async fn list_resource_groups(
        &self,
        subscription_id: &str,
    ) -> azcost_cost::Result<Vec<ResourceGroup>> {
        Ok(self.resource_groups(subscription_id).await?)
    }
}

#[async_trait]
impl CostQueryService for AzureClient {
    async fn query_costs(
        &self,
        request: &CostQueryRequest,
    ) -> azcost_cost::Result<CostQueryResult> {
        Ok(self.query(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = AzureClient::with_endpoint(
            "https://management.azure.com/",
            "token",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.endpoint(), "https://management.azure.com");
        assert_eq!(
            client.resource_groups_url("abc"),
            "https://management.azure.com/subscriptions/abc/resourcegroups?api-version=2021-04-01"
        );
        assert_eq!(
            client.cost_query_url("/subscriptions/abc/resourceGroups/rg1"),
            "https://management.azure.com/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.CostManagement/query?api-version=2023-03-01"
        );
    }
}
