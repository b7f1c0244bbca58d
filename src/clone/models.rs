//! Result and configuration types for clone runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A destination ad account plus its per-account overrides.
///
/// Page and pixel ids are account-scoped; the UI-level "account config"
/// globals map to this explicit value at the engine boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationAccount {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_id: Option<String>,
}

impl DestinationAccount {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            page_id: None,
            pixel_id: None,
        }
    }
}

/// Terminal state of one destination-account clone attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneStatus {
    Success,
    Failed,
}

/// Outcome of cloning one campaign into one destination account.
///
/// Created once per account per orchestration run and never mutated; a batch
/// produces one result per destination regardless of individual failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneResult {
    pub destination_account_id: String,
    pub status: CloneStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Which strategy produced this outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl CloneResult {
    pub fn success(
        account_id: &str,
        campaign_id: String,
        strategy: &str,
        error: Option<String>,
    ) -> Self {
        Self {
            destination_account_id: account_id.to_string(),
            status: CloneStatus::Success,
            new_campaign_id: Some(campaign_id),
            error,
            strategy: Some(strategy.to_string()),
            completed_at: Utc::now(),
        }
    }

    pub fn failed(account_id: &str, strategy: Option<&str>, error: String) -> Self {
        Self {
            destination_account_id: account_id.to_string(),
            status: CloneStatus::Failed,
            new_campaign_id: None,
            error: Some(error),
            strategy: strategy.map(|s| s.to_string()),
            completed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CloneStatus::Success
    }
}

/// Pipeline stage at which an individual object failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Campaign,
    AdSet,
    Creative,
    Ad,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Campaign => "campaign",
            Stage::AdSet => "ad set",
            Stage::Creative => "creative",
            Stage::Ad => "ad",
        };
        write!(f, "{}", name)
    }
}

/// One non-fatal object failure inside the recreation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailure {
    pub stage: Stage,
    pub object_name: String,
    pub error: String,
}

/// What the recreation pipeline built for one destination account.
///
/// Present whenever the campaign itself was created; individual ad set /
/// creative / ad failures accumulate here instead of aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecreationOutcome {
    pub campaign_id: String,
    pub ad_sets_created: usize,
    pub creatives_created: usize,
    pub ads_created: usize,
    pub failures: Vec<StepFailure>,
}

impl RecreationOutcome {
    /// Summary line for reports when parts of the hierarchy failed
    pub fn failure_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let detail: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{} '{}': {}", f.stage, f.object_name, f.error))
            .collect();
        Some(format!(
            "{} object(s) failed: {}",
            self.failures.len(),
            detail.join("; ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_summary_names_stage_and_object() {
        let outcome = RecreationOutcome {
            campaign_id: "c1".to_string(),
            ad_sets_created: 2,
            creatives_created: 1,
            ads_created: 1,
            failures: vec![StepFailure {
                stage: Stage::AdSet,
                object_name: "US broad".to_string(),
                error: "invalid billing event".to_string(),
            }],
        };

        let summary = outcome.failure_summary().unwrap();
        assert!(summary.contains("ad set 'US broad'"));
        assert!(summary.contains("invalid billing event"));
    }

    #[test]
    fn test_clean_outcome_has_no_summary() {
        let outcome = RecreationOutcome {
            campaign_id: "c1".to_string(),
            ad_sets_created: 1,
            creatives_created: 1,
            ads_created: 1,
            failures: vec![],
        };
        assert!(outcome.failure_summary().is_none());
    }
}
