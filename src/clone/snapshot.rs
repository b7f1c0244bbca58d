//! Snapshot data model for one replication run
//!
//! A snapshot captures a campaign's full hierarchy as read from the source
//! account. The same structures, with account-scoped identifiers cleared,
//! serve as the account-agnostic template (see `sanitize`). Every instance is
//! created fresh for one clone run and discarded at its end; nothing here is
//! persisted by the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Complete hierarchical capture of a campaign
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CampaignSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_budget: Option<String>,
    #[serde(default)]
    pub special_ad_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_strategy: Option<String>,
    #[serde(default)]
    pub ad_sets: Vec<AdSetSnapshot>,
}

/// Budget/targeting/schedule container under a campaign.
///
/// `targeting` is an opaque platform-owned structure: the engine carries it
/// byte-for-byte and never interprets its sub-fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdSetSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_budget: Option<String>,
    #[serde(default)]
    pub billing_event: String,
    #[serde(default)]
    pub optimization_goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub ads: Vec<AdSnapshot>,
}

/// A single served unit, referencing one creative
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ad_set_id: String,
    #[serde(default)]
    pub creative: CreativeSnapshot,
}

/// Rendered ad content
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreativeSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub page_id: String,
    #[serde(default)]
    pub link_data: LinkData,
}

/// Link-ad content fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<Value>,
}

impl CampaignSnapshot {
    /// Total ads across all ad sets
    pub fn ad_count(&self) -> usize {
        self.ad_sets.iter().map(|s| s.ads.len()).sum()
    }
}
