//! Hierarchical recreation pipeline
//!
//! Replays a sanitized template into a destination account: campaign, then
//! ad sets bound to the new campaign id, then creatives, then ads bound to
//! the new ad set and creative ids. Order is strict because each step needs
//! the parent id from the previous one. Every created object is paused.
//!
//! Individual ad-set/creative/ad failures are logged and accumulated, never
//! thrown: the pipeline returns the new campaign id whenever the campaign
//! itself was created. Only campaign-creation and auth failures abort the
//! destination-account attempt.

use crate::api::constants::account_edge_path;
use crate::api::{GraphClient, RemoteError};
use crate::clone::models::{DestinationAccount, RecreationOutcome, Stage, StepFailure};
use crate::clone::snapshot::{AdSetSnapshot, AdSnapshot, CampaignSnapshot, CreativeSnapshot};
use log::{info, warn};
use serde_json::{json, Value};
use std::collections::HashMap;

pub struct RecreationPipeline<'a> {
    client: &'a GraphClient,
}

impl<'a> RecreationPipeline<'a> {
    pub fn new(client: &'a GraphClient) -> Self {
        Self { client }
    }

    /// Recreate the template's hierarchy inside the destination account
    pub async fn recreate(
        &self,
        template: &CampaignSnapshot,
        destination: &DestinationAccount,
    ) -> Result<RecreationOutcome, RemoteError> {
        let account = &destination.account_id;
        info!(
            "Recreating campaign '{}' into {} ({} ad sets, {} ads)",
            template.name,
            account,
            template.ad_sets.len(),
            template.ad_count()
        );

        let page_id = self.resolve_page_id(destination).await;

        let response = self
            .client
            .create(
                &account_edge_path(account, "campaigns"),
                campaign_create_params(template),
            )
            .await?;
        let campaign_id = extract_id(&response).ok_or_else(|| RemoteError::Object {
            code: 0,
            status: None,
            message: "campaign create response carried no id".to_string(),
        })?;
        info!("Created campaign {} in {}", campaign_id, account);

        let mut outcome = RecreationOutcome {
            campaign_id: campaign_id.clone(),
            ad_sets_created: 0,
            creatives_created: 0,
            ads_created: 0,
            failures: Vec::new(),
        };

        // Ad set ids, indexed in template order; the mapping from original
        // ids is kept alongside for ads that reference their ad set by id.
        let mut created_ad_sets: Vec<Option<String>> = Vec::with_capacity(template.ad_sets.len());
        let mut id_map: HashMap<String, String> = HashMap::new();

        for ad_set in &template.ad_sets {
            match self
                .client
                .create(
                    &account_edge_path(account, "adsets"),
                    ad_set_create_params(ad_set, &campaign_id),
                )
                .await
            {
                Ok(response) => match extract_id(&response) {
                    Some(new_id) => {
                        if !ad_set.id.is_empty() {
                            id_map.insert(ad_set.id.clone(), new_id.clone());
                        }
                        outcome.ad_sets_created += 1;
                        created_ad_sets.push(Some(new_id));
                    }
                    None => {
                        outcome.failures.push(StepFailure {
                            stage: Stage::AdSet,
                            object_name: ad_set.name.clone(),
                            error: "create response carried no id".to_string(),
                        });
                        created_ad_sets.push(None);
                    }
                },
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warn!("Ad set '{}' failed in {}: {}", ad_set.name, account, e);
                    outcome.failures.push(StepFailure {
                        stage: Stage::AdSet,
                        object_name: ad_set.name.clone(),
                        error: e.to_string(),
                    });
                    created_ad_sets.push(None);
                }
            }
        }

        let first_created = created_ad_sets.iter().flatten().next().cloned();

        for (index, ad_set) in template.ad_sets.iter().enumerate() {
            for ad in &ad_set.ads {
                // Exact ad set first; if its creation failed, keep the run
                // productive by falling back to the first created ad set.
                let target_ad_set = created_ad_sets[index]
                    .clone()
                    .or_else(|| id_map.get(&ad.ad_set_id).cloned())
                    .or_else(|| first_created.clone());

                let Some(target_ad_set_id) = target_ad_set else {
                    outcome.failures.push(StepFailure {
                        stage: Stage::Ad,
                        object_name: ad.name.clone(),
                        error: "no ad set was created to attach this ad to".to_string(),
                    });
                    continue;
                };

                let Some(page) = page_id.as_deref() else {
                    outcome.failures.push(StepFailure {
                        stage: Stage::Creative,
                        object_name: ad.creative.name.clone(),
                        error: "no page available in destination account".to_string(),
                    });
                    continue;
                };

                let creative_id = match self
                    .client
                    .create(
                        &account_edge_path(account, "adcreatives"),
                        creative_create_params(&ad.creative, page),
                    )
                    .await
                {
                    Ok(response) => match extract_id(&response) {
                        Some(id) => {
                            outcome.creatives_created += 1;
                            id
                        }
                        None => {
                            outcome.failures.push(StepFailure {
                                stage: Stage::Creative,
                                object_name: ad.creative.name.clone(),
                                error: "create response carried no id".to_string(),
                            });
                            continue;
                        }
                    },
                    Err(e) if e.is_auth() => return Err(e),
                    Err(e) => {
                        warn!("Creative '{}' failed in {}: {}", ad.creative.name, account, e);
                        outcome.failures.push(StepFailure {
                            stage: Stage::Creative,
                            object_name: ad.creative.name.clone(),
                            error: e.to_string(),
                        });
                        continue;
                    }
                };

                match self
                    .client
                    .create(
                        &account_edge_path(account, "ads"),
                        ad_create_params(
                            ad,
                            &target_ad_set_id,
                            &creative_id,
                            destination.pixel_id.as_deref(),
                        ),
                    )
                    .await
                {
                    Ok(_) => outcome.ads_created += 1,
                    Err(e) if e.is_auth() => return Err(e),
                    Err(e) => {
                        warn!("Ad '{}' failed in {}: {}", ad.name, account, e);
                        outcome.failures.push(StepFailure {
                            stage: Stage::Ad,
                            object_name: ad.name.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            "Recreation into {} done: campaign {}, {} ad set(s), {} creative(s), {} ad(s), {} failure(s)",
            account,
            outcome.campaign_id,
            outcome.ad_sets_created,
            outcome.creatives_created,
            outcome.ads_created,
            outcome.failures.len()
        );
        Ok(outcome)
    }

    /// Destination page id: per-account override first, otherwise the first
    /// of the authenticated user's available pages. Source page ids are
    /// never reusable across accounts.
    async fn resolve_page_id(&self, destination: &DestinationAccount) -> Option<String> {
        if let Some(page_id) = &destination.page_id {
            return Some(page_id.clone());
        }

        match self.client.get_edge("me", "accounts", "id,name").await {
            Ok(pages) => {
                let page = pages.first().and_then(|p| p["id"].as_str()).map(str::to_string);
                match &page {
                    Some(id) => info!(
                        "Using page {} for account {}",
                        id, destination.account_id
                    ),
                    None => warn!(
                        "No pages available for account {}; creatives will be skipped",
                        destination.account_id
                    ),
                }
                page
            }
            Err(e) => {
                warn!(
                    "Page lookup failed for account {}: {}",
                    destination.account_id, e
                );
                None
            }
        }
    }
}

/// Id of a freshly created object from the platform's `{id}` response
fn extract_id(response: &Value) -> Option<String> {
    response["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

pub(crate) fn campaign_create_params(template: &CampaignSnapshot) -> Vec<(String, String)> {
    let mut params = vec![
        ("name".to_string(), template.name.clone()),
        ("objective".to_string(), template.objective.clone()),
        ("status".to_string(), "PAUSED".to_string()),
        (
            "special_ad_categories".to_string(),
            json!(template.special_ad_categories).to_string(),
        ),
    ];
    if let Some(budget) = &template.daily_budget {
        params.push(("daily_budget".to_string(), budget.clone()));
    }
    if let Some(budget) = &template.lifetime_budget {
        params.push(("lifetime_budget".to_string(), budget.clone()));
    }
    if let Some(strategy) = &template.bid_strategy {
        params.push(("bid_strategy".to_string(), strategy.clone()));
    }
    params
}

pub(crate) fn ad_set_create_params(
    ad_set: &AdSetSnapshot,
    campaign_id: &str,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("name".to_string(), ad_set.name.clone()),
        ("campaign_id".to_string(), campaign_id.to_string()),
        ("status".to_string(), "PAUSED".to_string()),
        ("billing_event".to_string(), ad_set.billing_event.clone()),
        (
            "optimization_goal".to_string(),
            ad_set.optimization_goal.clone(),
        ),
    ];
    if let Some(targeting) = &ad_set.targeting {
        params.push(("targeting".to_string(), targeting.to_string()));
    }
    if let Some(budget) = &ad_set.daily_budget {
        params.push(("daily_budget".to_string(), budget.clone()));
    }
    if let Some(budget) = &ad_set.lifetime_budget {
        params.push(("lifetime_budget".to_string(), budget.clone()));
    }
    if let Some(bid) = ad_set.bid_amount {
        params.push(("bid_amount".to_string(), bid.to_string()));
    }
    if let Some(strategy) = &ad_set.bid_strategy {
        params.push(("bid_strategy".to_string(), strategy.clone()));
    }
    if let Some(start) = &ad_set.start_time {
        params.push(("start_time".to_string(), start.clone()));
    }
    if let Some(end) = &ad_set.end_time {
        params.push(("end_time".to_string(), end.clone()));
    }
    params
}

pub(crate) fn creative_create_params(
    creative: &CreativeSnapshot,
    page_id: &str,
) -> Vec<(String, String)> {
    let link = &creative.link_data;
    let mut link_data = json!({
        "name": link.title,
        "message": link.message,
        "link": link.link,
        "description": link.description,
    });
    if let Some(hash) = &link.image_hash {
        link_data["image_hash"] = json!(hash);
    }
    if let Some(video_id) = &link.video_id {
        link_data["video_id"] = json!(video_id);
    }
    if let Some(cta) = &link.call_to_action {
        link_data["call_to_action"] = cta.clone();
    }

    let story_spec = json!({
        "page_id": page_id,
        "link_data": link_data,
    });

    vec![
        ("name".to_string(), creative.name.clone()),
        ("object_story_spec".to_string(), story_spec.to_string()),
    ]
}

pub(crate) fn ad_create_params(
    ad: &AdSnapshot,
    ad_set_id: &str,
    creative_id: &str,
    pixel_id: Option<&str>,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("name".to_string(), ad.name.clone()),
        ("adset_id".to_string(), ad_set_id.to_string()),
        (
            "creative".to_string(),
            json!({ "creative_id": creative_id }).to_string(),
        ),
        ("status".to_string(), "PAUSED".to_string()),
    ];
    if let Some(pixel) = pixel_id {
        params.push((
            "tracking_specs".to_string(),
            json!([{"action.type": ["offsite_conversion"], "fb_pixel": [pixel]}]).to_string(),
        ));
    }
    params
}
