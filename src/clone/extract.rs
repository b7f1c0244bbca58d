//! Snapshot extractor
//!
//! Reads a campaign's full hierarchy from the source account. Sub-resource
//! queries fall back through progressively broader tiers because the
//! platform's object graph is not always traversable from the expected
//! direction; an empty sub-resource never fails the extraction. Only the
//! top-level campaign fetch itself can error.

use crate::api::constants::fields;
use crate::api::{GraphClient, RemoteError};
use crate::clone::snapshot::{
    AdSetSnapshot, AdSnapshot, CampaignSnapshot, CreativeSnapshot, LinkData,
};
use log::{debug, info, warn};
use serde_json::Value;

pub struct SnapshotExtractor<'a> {
    client: &'a GraphClient,
    /// Optional probe hints for the ad-set fallback tier: ad set ids known
    /// from a previous run or supplied by the operator.
    known_ad_set_ids: Vec<String>,
}

impl<'a> SnapshotExtractor<'a> {
    pub fn new(client: &'a GraphClient) -> Self {
        Self {
            client,
            known_ad_set_ids: Vec::new(),
        }
    }

    pub fn with_known_ad_set_ids(mut self, ids: Vec<String>) -> Self {
        self.known_ad_set_ids = ids;
        self
    }

    /// Extract a best-effort snapshot of the campaign hierarchy
    pub async fn extract(&self, campaign_id: &str) -> Result<CampaignSnapshot, RemoteError> {
        info!("Extracting snapshot for campaign {}", campaign_id);

        let campaign_value = self.client.get_object(campaign_id, fields::CAMPAIGN).await?;
        let mut snapshot = parse_campaign(&campaign_value);

        let ad_set_values = self.fetch_ad_sets(campaign_id).await;
        snapshot.ad_sets = ad_set_values.iter().map(parse_ad_set).collect();

        let ad_values = self.fetch_ads(campaign_id, &snapshot.ad_sets).await;
        let ads: Vec<AdSnapshot> = ad_values.iter().map(parse_ad).collect();
        attach_ads(&mut snapshot, ads);

        info!(
            "Extracted campaign '{}': {} ad set(s), {} ad(s)",
            snapshot.name,
            snapshot.ad_sets.len(),
            snapshot.ad_count()
        );
        Ok(snapshot)
    }

    /// Ad sets: campaign edge first, then direct probes of known ids
    async fn fetch_ad_sets(&self, campaign_id: &str) -> Vec<Value> {
        match self.client.get_edge(campaign_id, "adsets", fields::ADSET).await {
            Ok(values) if !values.is_empty() => {
                debug!("Ad sets resolved via campaign edge ({})", values.len());
                values
            }
            Ok(_) => {
                if self.known_ad_set_ids.is_empty() {
                    info!("Campaign {} returned no ad sets and no probe hints are available", campaign_id);
                    return Vec::new();
                }
                info!(
                    "Campaign {} returned no ad sets, probing {} known id(s)",
                    campaign_id,
                    self.known_ad_set_ids.len()
                );
                let mut values = Vec::new();
                for id in &self.known_ad_set_ids {
                    match self.client.get_object(id, fields::ADSET).await {
                        Ok(value) => values.push(value),
                        Err(e) => debug!("Ad set probe {} failed: {}", id, e),
                    }
                }
                values
            }
            Err(e) => {
                warn!("Ad set listing failed for campaign {}: {}", campaign_id, e);
                Vec::new()
            }
        }
    }

    /// Ads: campaign edge, then per-ad-set edges, then derived-id probes
    async fn fetch_ads(&self, campaign_id: &str, ad_sets: &[AdSetSnapshot]) -> Vec<Value> {
        match self.client.get_edge(campaign_id, "ads", fields::AD).await {
            Ok(values) if !values.is_empty() => {
                debug!("Ads resolved via campaign edge ({})", values.len());
                return values;
            }
            Ok(_) => {}
            Err(e) => warn!("Ad listing failed for campaign {}: {}", campaign_id, e),
        }

        let mut values = Vec::new();
        for ad_set in ad_sets {
            match self.client.get_edge(&ad_set.id, "ads", fields::AD).await {
                Ok(mut ads) => values.append(&mut ads),
                Err(e) => warn!("Ad listing failed for ad set {}: {}", ad_set.id, e),
            }
        }
        if !values.is_empty() {
            info!("Ads resolved via per-ad-set edges ({})", values.len());
            return values;
        }

        // Last resort for a known platform quirk where ad listings silently
        // return nothing. Candidate ids are a best-effort heuristic; probe
        // failures are expected and ignored.
        let candidates = derived_ad_id_candidates(campaign_id);
        if candidates.is_empty() {
            return Vec::new();
        }
        info!(
            "Ads still empty for campaign {}, probing {} derived candidate id(s)",
            campaign_id,
            candidates.len()
        );
        for id in candidates {
            match self.client.get_object(&id, fields::AD).await {
                Ok(value) => values.push(value),
                Err(e) => debug!("Ad candidate probe {} failed: {}", id, e),
            }
        }
        if !values.is_empty() {
            info!("Ads resolved via derived candidate ids ({})", values.len());
        }
        values
    }
}

/// Candidate ad ids derived from a numeric campaign id: the next few
/// consecutive ids. The platform's numbering convention is undocumented, so
/// this is strictly best-effort recovery, isolated here so it can be deleted
/// independently of the primary tiers.
pub(crate) fn derived_ad_id_candidates(campaign_id: &str) -> Vec<String> {
    let Ok(base) = campaign_id.parse::<u64>() else {
        return Vec::new();
    };
    (1..=5).filter_map(|i| base.checked_add(i)).map(|id| id.to_string()).collect()
}

fn str_field(value: &Value, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

/// Budgets and similar fields arrive as strings on the wire, but tolerate
/// numeric encodings from saved templates.
fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    match &value[key] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_campaign(value: &Value) -> CampaignSnapshot {
    CampaignSnapshot {
        id: str_field(value, "id"),
        name: str_field(value, "name"),
        objective: str_field(value, "objective"),
        status: str_field(value, "status"),
        daily_budget: opt_str_field(value, "daily_budget"),
        lifetime_budget: opt_str_field(value, "lifetime_budget"),
        special_ad_categories: value["special_ad_categories"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        bid_strategy: opt_str_field(value, "bid_strategy"),
        ad_sets: Vec::new(),
    }
}

fn parse_ad_set(value: &Value) -> AdSetSnapshot {
    AdSetSnapshot {
        id: str_field(value, "id"),
        name: str_field(value, "name"),
        targeting: match &value["targeting"] {
            Value::Null => None,
            targeting => Some(targeting.clone()),
        },
        daily_budget: opt_str_field(value, "daily_budget"),
        lifetime_budget: opt_str_field(value, "lifetime_budget"),
        billing_event: str_field(value, "billing_event"),
        optimization_goal: str_field(value, "optimization_goal"),
        bid_amount: value["bid_amount"]
            .as_i64()
            .or_else(|| value["bid_amount"].as_str().and_then(|s| s.parse().ok())),
        bid_strategy: opt_str_field(value, "bid_strategy"),
        start_time: opt_str_field(value, "start_time"),
        end_time: opt_str_field(value, "end_time"),
        ads: Vec::new(),
    }
}

fn parse_ad(value: &Value) -> AdSnapshot {
    let creative = &value["creative"];
    let story_spec = &creative["object_story_spec"];
    let link = &story_spec["link_data"];

    AdSnapshot {
        id: str_field(value, "id"),
        name: str_field(value, "name"),
        status: str_field(value, "status"),
        ad_set_id: str_field(value, "adset_id"),
        creative: CreativeSnapshot {
            id: str_field(creative, "id"),
            name: str_field(creative, "name"),
            page_id: opt_str_field(story_spec, "page_id").unwrap_or_default(),
            link_data: LinkData {
                // link ads carry their headline as "name" on the wire
                title: str_field(link, "name"),
                message: str_field(link, "message"),
                link: str_field(link, "link"),
                description: str_field(link, "description"),
                image_hash: opt_str_field(link, "image_hash"),
                video_id: opt_str_field(link, "video_id"),
                call_to_action: match &link["call_to_action"] {
                    Value::Null => None,
                    cta => Some(cta.clone()),
                },
            },
        },
    }
}

/// Place ads under their ad sets. An ad whose ad set was not extracted goes
/// under the first ad set (mirroring the recreation-side fallback); with no
/// ad sets at all it is dropped with a warning.
fn attach_ads(snapshot: &mut CampaignSnapshot, ads: Vec<AdSnapshot>) {
    for ad in ads {
        let index = snapshot
            .ad_sets
            .iter()
            .position(|s| !ad.ad_set_id.is_empty() && s.id == ad.ad_set_id);
        match index {
            Some(i) => snapshot.ad_sets[i].ads.push(ad),
            None if !snapshot.ad_sets.is_empty() => {
                warn!(
                    "Ad '{}' references unknown ad set '{}', attaching to first ad set",
                    ad.name, ad.ad_set_id
                );
                snapshot.ad_sets[0].ads.push(ad);
            }
            None => {
                warn!(
                    "Dropping ad '{}': no ad sets were extracted to attach it to",
                    ad.name
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derived_candidates_for_numeric_id() {
        let candidates = derived_ad_id_candidates("120330");
        assert_eq!(candidates, vec!["120331", "120332", "120333", "120334", "120335"]);
    }

    #[test]
    fn test_derived_candidates_empty_for_non_numeric_id() {
        assert!(derived_ad_id_candidates("cmp_1").is_empty());
        assert!(derived_ad_id_candidates("").is_empty());
    }

    #[test]
    fn test_parse_campaign_fields() {
        let value = json!({
            "id": "120330",
            "name": "Spring Launch",
            "objective": "OUTCOME_TRAFFIC",
            "status": "ACTIVE",
            "daily_budget": "5000",
            "special_ad_categories": ["HOUSING"],
            "bid_strategy": "LOWEST_COST_WITHOUT_CAP"
        });
        let campaign = parse_campaign(&value);
        assert_eq!(campaign.id, "120330");
        assert_eq!(campaign.daily_budget.as_deref(), Some("5000"));
        assert_eq!(campaign.special_ad_categories, vec!["HOUSING"]);
    }

    #[test]
    fn test_parse_ad_set_keeps_targeting_opaque() {
        let targeting = json!({
            "geo_locations": {"countries": ["US"]},
            "flexible_spec": [{"interests": [{"id": "601", "name": "Running"}]}]
        });
        let value = json!({
            "id": "as_1",
            "name": "US broad",
            "targeting": targeting,
            "daily_budget": 5000,
            "billing_event": "IMPRESSIONS",
            "optimization_goal": "LINK_CLICKS",
            "bid_amount": "150"
        });
        let ad_set = parse_ad_set(&value);
        assert_eq!(ad_set.targeting, Some(targeting));
        assert_eq!(ad_set.daily_budget.as_deref(), Some("5000"));
        assert_eq!(ad_set.bid_amount, Some(150));
    }

    #[test]
    fn test_parse_ad_with_nested_creative() {
        let value = json!({
            "id": "ad_1",
            "name": "Hero ad",
            "status": "ACTIVE",
            "adset_id": "as_1",
            "creative": {
                "id": "cr_1",
                "name": "Hero creative",
                "object_story_spec": {
                    "page_id": "pg_77",
                    "link_data": {
                        "name": "Buy now",
                        "message": "Hello",
                        "link": "https://x.com",
                        "image_hash": "abc123"
                    }
                }
            }
        });
        let ad = parse_ad(&value);
        assert_eq!(ad.ad_set_id, "as_1");
        assert_eq!(ad.creative.page_id, "pg_77");
        assert_eq!(ad.creative.link_data.title, "Buy now");
        assert_eq!(ad.creative.link_data.image_hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_attach_ads_falls_back_to_first_ad_set() {
        let mut snapshot = CampaignSnapshot {
            ad_sets: vec![
                AdSetSnapshot {
                    id: "as_1".to_string(),
                    ..Default::default()
                },
                AdSetSnapshot {
                    id: "as_2".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let ads = vec![
            AdSnapshot {
                id: "ad_1".to_string(),
                ad_set_id: "as_2".to_string(),
                ..Default::default()
            },
            AdSnapshot {
                id: "ad_2".to_string(),
                ad_set_id: "as_gone".to_string(),
                ..Default::default()
            },
        ];
        attach_ads(&mut snapshot, ads);
        assert_eq!(snapshot.ad_sets[0].ads.len(), 1); // fallback
        assert_eq!(snapshot.ad_sets[1].ads.len(), 1); // matched
    }
}
