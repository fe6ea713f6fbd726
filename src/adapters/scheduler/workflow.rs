use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    infra::http_client::build_client,
    use_cases::subscription::ReminderScheduler,
};
use secrecy::ExposeSecret;

/// Client for the Upstash workflow service that runs reminder schedules.
///
/// The contract is a single fire-and-forget trigger per created subscription:
/// the workflow engine calls the given callback URL later and owns all
/// delivery/retry semantics.
#[derive(Clone)]
pub struct UpstashSchedulerClient {
    client: Client,
    workflow_url: Url,
    callback_url: String,
    token: secrecy::SecretString,
}

impl UpstashSchedulerClient {
    pub fn new(workflow_url: Url, server_url: &Url, token: secrecy::SecretString) -> Self {
        let callback_url = format!(
            "{}/api/v1/workflows/subscription/reminder",
            server_url.as_str().trim_end_matches('/')
        );
        Self {
            client: build_client(),
            workflow_url,
            callback_url,
            token,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerBody {
    subscription_id: Uuid,
}

#[derive(Serialize)]
struct TriggerRequest<'a> {
    url: &'a str,
    body: TriggerBody,
    retries: u8,
}

#[async_trait]
impl ReminderScheduler for UpstashSchedulerClient {
    async fn trigger(&self, subscription_id: Uuid) -> AppResult<()> {
        let request = TriggerRequest {
            url: &self.callback_url,
            body: TriggerBody { subscription_id },
            retries: 0,
        };
        self.client
            .post(self.workflow_url.clone())
            .bearer_auth(self.token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AppError::Unavailable
                } else {
                    AppError::Internal(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(())
    }
}
