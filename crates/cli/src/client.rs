//! API client for communicating with a running vehicle-pricer server

use anyhow::{Context, Result};
use pricer_lib::models::UserInputs;
use pricer_lib::{PriceOutcome, SchemaReport};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// API client for the pricer JSON API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn schema(&self) -> Result<SchemaReport> {
        self.get("api/v1/schema").await
    }

    pub async fn predict(&self, inputs: &UserInputs) -> Result<PriceOutcome> {
        self.post("api/v1/predict", inputs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_lib::models::KnownInput;
    use pricer_lib::reconcile::CountSource;

    #[tokio::test]
    async fn test_schema_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/schema")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "model_kind": "tree_ensemble",
                    "expected_count": 4,
                    "count_known": true,
                    "count_source": "booster_feature_names",
                    "feature_names": ["year", "mileage", null, "fuel_gas"],
                    "named_inputs": [["year", 0], ["mileage", 1]],
                    "categorical_groups": [{"key": "fuel", "options": ["fuel_gas"]}]
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let schema = client.schema().await.unwrap();

        mock.assert_async().await;
        assert_eq!(schema.expected_count, 4);
        assert_eq!(schema.count_source, CountSource::BoosterFeatureNames);
        assert_eq!(schema.feature_names[2], None);
        assert_eq!(schema.input_at(1), Some(KnownInput::Mileage));
        assert_eq!(schema.input_at(3), None);
        assert_eq!(schema.categorical_groups[0].key, "fuel");
        assert!(schema.warning.is_none());
    }

    #[tokio::test]
    async fn test_predict_sends_inputs_and_parses_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/predict")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "year": 2020,
                "mileage": 30000,
                "cylinders": 6,
                "selections": {"color": "color_blue"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "status": "failure",
                    "error": "bad width",
                    "message": "Prediction failed: bad width",
                    "remediation": ["retrain", "inspect"]
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let inputs = UserInputs::new(2020, 30000, 6).with_selection("color", "color_blue");
        let outcome = client.predict(&inputs).await.unwrap();

        mock.assert_async().await;
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/schema")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.schema().await.unwrap_err();

        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
