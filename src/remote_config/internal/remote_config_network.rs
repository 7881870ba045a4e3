use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use reqwest::Client;

use crate::remote_config::remote_config_error::{RemoteConfigError, Result};
use crate::RemoteConfigOptions;

use super::data_types::ServerTemplateData;
use super::template_fetcher::TemplateFetcher;

const CLIENT_HEADER: &str = "X-FIREBASE-CLIENT";

/// Fetches server templates from the Remote Config REST endpoint.
pub struct RemoteConfigNetwork {
    client: Client,
    url: String,
    headers: HeaderMap,
}

impl RemoteConfigNetwork {
    pub fn new(project_id: &str, access_token: &str, options: &RemoteConfigOptions) -> Result<Self> {
        let client = Client::builder().timeout(options.http_timeout()).build()?;
        Ok(RemoteConfigNetwork {
            client,
            url: template_url(&options.api_override, project_id, &options.namespace),
            headers: request_headers(access_token, &options.client_header)?,
        })
    }
}

fn request_headers(access_token: &str, client_header: &str) -> Result<HeaderMap> {
    let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
        .map_err(|_| RemoteConfigError::InvalidOptions("access token is not a valid header value".to_string()))?;
    let client = HeaderValue::from_str(client_header)
        .map_err(|_| RemoteConfigError::InvalidOptions("client header is not a valid header value".to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CLIENT_HEADER, client);
    Ok(headers)
}

#[async_trait]
impl TemplateFetcher for RemoteConfigNetwork {
    async fn fetch_template(&self) -> Result<ServerTemplateData> {
        let res = self
            .client
            .get(&self.url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await?;

        if !status.is_success() {
            tracing::error!(%status, "Server template request failed");
            return Err(RemoteConfigError::FetchStatus {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        ServerTemplateData::from_response(&headers, &body)
    }
}

fn template_url(api: &str, project_id: &str, namespace: &str) -> String {
    format!(
        "{}/v1/projects/{}/namespaces/{}/serverRemoteConfig",
        api.trim_end_matches('/'),
        project_id,
        namespace
    )
}
