use reqwest::header::CONTENT_TYPE;
use reqwest::Client as ReqwestClient;
use std::time::Duration;

use crate::errors::UploadError;

const CSV_CONTENT_TYPE: &str = "text/csv";

pub(crate) struct HttpClient {
    client: ReqwestClient,
    endpoint: String,
    token: Option<String>,
}

impl HttpClient {
    pub(crate) fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Stores `body` under `key`. Any non-success status is an error.
    pub(crate) async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), String> {
        let url = format!("{}/{}", self.endpoint, key);
        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, CSV_CONTENT_TYPE)
            .body(body);
        if let Some(token) = self.token.as_ref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        response.error_for_status().map_err(|e| e.to_string())?;
        Ok(())
    }
}
