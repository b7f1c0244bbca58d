//! Clone strategies
//!
//! Cloning a campaign is attempted through an ordered list of strategies of
//! decreasing fidelity. A strategy returns `Some(CloneResult)` when it owns
//! the outcome (success or failure) and `None` when it cannot apply here and
//! the next strategy should be tried.

use crate::api::constants::{account_id, copies_path};
use crate::api::GraphClient;
use crate::clone::extract::SnapshotExtractor;
use crate::clone::models::{CloneResult, DestinationAccount};
use crate::clone::recreate::RecreationPipeline;
use crate::clone::sanitize::sanitize;
use async_trait::async_trait;
use log::{info, warn};
use serde_json::json;

#[async_trait]
pub trait CloneStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Attempt the clone; `None` hands over to the next strategy
    async fn attempt(
        &self,
        source_campaign_id: &str,
        destination: &DestinationAccount,
    ) -> Option<CloneResult>;
}

/// Preferred path: the platform's native deep-copy endpoint duplicates the
/// whole campaign subtree server-side in one call, atomically on the remote
/// side.
pub struct NativeCopyStrategy {
    client: GraphClient,
}

impl NativeCopyStrategy {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CloneStrategy for NativeCopyStrategy {
    fn name(&self) -> &'static str {
        "native_copy"
    }

    async fn attempt(
        &self,
        source_campaign_id: &str,
        destination: &DestinationAccount,
    ) -> Option<CloneResult> {
        let params = vec![
            ("deep_copy".to_string(), "true".to_string()),
            ("status_option".to_string(), "PAUSED".to_string()),
            (
                "rename_options".to_string(),
                json!({"rename_suffix": " - Copy"}).to_string(),
            ),
            (
                "parameter_overrides".to_string(),
                json!({"ad_account_id": account_id(&destination.account_id)}).to_string(),
            ),
        ];

        match self
            .client
            .create(&copies_path(source_campaign_id), params)
            .await
        {
            Ok(response) => {
                let copied_id = response["copied_campaign_id"]
                    .as_str()
                    .or_else(|| response["id"].as_str())
                    .filter(|id| !id.is_empty());
                match copied_id {
                    Some(id) => {
                        info!(
                            "Native copy of {} into {} produced campaign {}",
                            source_campaign_id, destination.account_id, id
                        );
                        Some(CloneResult::success(
                            &destination.account_id,
                            id.to_string(),
                            self.name(),
                            None,
                        ))
                    }
                    None => {
                        warn!(
                            "Native copy of {} into {} returned no campaign id, falling back",
                            source_campaign_id, destination.account_id
                        );
                        None
                    }
                }
            }
            Err(e) => {
                warn!(
                    "Native copy of {} into {} unavailable ({}), falling back",
                    source_campaign_id, destination.account_id, e
                );
                None
            }
        }
    }
}

/// Fallback path: fetch a fresh snapshot, sanitize it into an
/// account-agnostic template, and rebuild the hierarchy object by object.
pub struct ManualCloneStrategy {
    client: GraphClient,
}

impl ManualCloneStrategy {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CloneStrategy for ManualCloneStrategy {
    fn name(&self) -> &'static str {
        "manual_recreation"
    }

    async fn attempt(
        &self,
        source_campaign_id: &str,
        destination: &DestinationAccount,
    ) -> Option<CloneResult> {
        let extractor = SnapshotExtractor::new(&self.client);
        let snapshot = match extractor.extract(source_campaign_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return Some(CloneResult::failed(
                    &destination.account_id,
                    Some(self.name()),
                    format!("extraction failed: {}", e),
                ));
            }
        };

        let template = sanitize(&snapshot);

        let pipeline = RecreationPipeline::new(&self.client);
        match pipeline.recreate(&template, destination).await {
            Ok(outcome) => Some(CloneResult::success(
                &destination.account_id,
                outcome.campaign_id.clone(),
                self.name(),
                outcome.failure_summary(),
            )),
            Err(e) => Some(CloneResult::failed(
                &destination.account_id,
                Some(self.name()),
                format!("recreation failed: {}", e),
            )),
        }
    }
}
