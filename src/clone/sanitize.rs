//! Template sanitizer
//!
//! Turns a captured snapshot (or a tabular-import row set) into an
//! account-agnostic template by clearing every identifier that is only valid
//! inside the source account. Structural fields (targeting, budgets,
//! schedule, creative copy text) pass through untouched.
//!
//! Sanitization is idempotent: sanitizing an already-sanitized template is a
//! no-op.

use super::snapshot::{AdSetSnapshot, AdSnapshot, CampaignSnapshot, CreativeSnapshot, LinkData};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;

/// Field names that are only meaningful inside the source account, drawn from
/// the platform's bulk-export schema. Matching is done on the normalized form
/// (lowercased, spaces/dashes folded to underscores) so the same list covers
/// API field names ("image_hash") and export column headers ("Image Hash").
static ACCOUNT_SCOPED_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "id",
        "campaign_id",
        "adset_id",
        "ad_set_id",
        "ad_id",
        "creative_id",
        "page_id",
        "pixel_id",
        "data_set_id",
        "image_hash",
        "video_id",
        "application_id",
        "instagram_actor_id",
        "product_set_id",
        "product_catalog_id",
        "lead_gen_form_id",
        "offer_id",
        "place_page_set_id",
        "app_store_id",
    ]
    .into_iter()
    .collect()
});

fn normalize(field: &str) -> String {
    field
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Whether a field (API name or export column header) is account-scoped
pub fn is_account_scoped(field: &str) -> bool {
    ACCOUNT_SCOPED_FIELDS.contains(normalize(field).as_str())
}

/// Produce the account-agnostic template for a snapshot
pub fn sanitize(snapshot: &CampaignSnapshot) -> CampaignSnapshot {
    CampaignSnapshot {
        id: String::new(),
        name: snapshot.name.clone(),
        objective: snapshot.objective.clone(),
        status: snapshot.status.clone(),
        daily_budget: snapshot.daily_budget.clone(),
        lifetime_budget: snapshot.lifetime_budget.clone(),
        special_ad_categories: snapshot.special_ad_categories.clone(),
        bid_strategy: snapshot.bid_strategy.clone(),
        ad_sets: snapshot.ad_sets.iter().map(sanitize_ad_set).collect(),
    }
}

fn sanitize_ad_set(ad_set: &AdSetSnapshot) -> AdSetSnapshot {
    AdSetSnapshot {
        id: String::new(),
        name: ad_set.name.clone(),
        targeting: ad_set.targeting.clone(),
        daily_budget: ad_set.daily_budget.clone(),
        lifetime_budget: ad_set.lifetime_budget.clone(),
        billing_event: ad_set.billing_event.clone(),
        optimization_goal: ad_set.optimization_goal.clone(),
        bid_amount: ad_set.bid_amount,
        bid_strategy: ad_set.bid_strategy.clone(),
        start_time: ad_set.start_time.clone(),
        end_time: ad_set.end_time.clone(),
        ads: ad_set.ads.iter().map(sanitize_ad).collect(),
    }
}

fn sanitize_ad(ad: &AdSnapshot) -> AdSnapshot {
    AdSnapshot {
        id: String::new(),
        name: ad.name.clone(),
        status: ad.status.clone(),
        ad_set_id: String::new(),
        creative: sanitize_creative(&ad.creative),
    }
}

fn sanitize_creative(creative: &CreativeSnapshot) -> CreativeSnapshot {
    CreativeSnapshot {
        id: String::new(),
        name: creative.name.clone(),
        page_id: String::new(),
        link_data: LinkData {
            title: creative.link_data.title.clone(),
            message: creative.link_data.message.clone(),
            link: creative.link_data.link.clone(),
            description: creative.link_data.description.clone(),
            image_hash: None,
            video_id: None,
            call_to_action: creative.link_data.call_to_action.clone(),
        },
    }
}

/// Clear account-scoped fields in raw JSON (tabular rows, saved templates).
///
/// String values are cleared to `""`, everything else to `null`. The walk
/// never descends into `targeting`: its internal shape is platform-defined
/// and must pass through byte-for-byte.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "targeting" {
                    continue;
                }
                if is_account_scoped(key) {
                    *child = match child {
                        Value::String(_) => Value::String(String::new()),
                        _ => Value::Null,
                    };
                } else {
                    sanitize_value(child);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize_value(item);
            }
        }
        _ => {}
    }
}
