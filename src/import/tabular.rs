//! Tabular template parser
//!
//! Parses flattened spreadsheet exports (one row per ad, campaign and ad-set
//! columns repeated) into a campaign hierarchy using the platform's
//! bulk-export column vocabulary. The result still carries source-account
//! identifiers; callers pass it through the sanitizer before replaying it.

use crate::clone::snapshot::{
    AdSetSnapshot, AdSnapshot, CampaignSnapshot, CreativeSnapshot, LinkData,
};
use csv::ReaderBuilder;
use log::warn;
use serde_json::Value;
use std::collections::HashMap;

/// Parse a CSV/TSV-derived template export into one campaign hierarchy.
///
/// Rows are grouped into ad sets by "Ad Set Name" in first-seen order; each
/// row with an "Ad Name" contributes one ad to its group. The campaign
/// columns are taken from the first row.
pub fn parse_tabular_template(content: &str) -> anyhow::Result<CampaignSnapshot> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut campaign: Option<CampaignSnapshot> = None;
    let mut ad_set_order: Vec<String> = Vec::new();
    let mut ad_sets: HashMap<String, AdSetSnapshot> = HashMap::new();
    let mut errors = Vec::new();

    for (line_index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                // +2 accounts for the header line and zero-indexing
                errors.push(format!("line {}: {}", line_index + 2, e));
                continue;
            }
        };

        let row: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect();

        if campaign.is_none() {
            campaign = Some(campaign_from_row(&row));
        }

        let ad_set_name = cell(&row, "Ad Set Name").unwrap_or_default();
        let ad_set = ad_sets.entry(ad_set_name.clone()).or_insert_with(|| {
            ad_set_order.push(ad_set_name.clone());
            ad_set_from_row(&row)
        });

        if let Some(ad) = ad_from_row(&row) {
            ad_set.ads.push(ad);
        }
    }

    if !errors.is_empty() {
        warn!("Tabular template had {} unreadable row(s): {}", errors.len(), errors.join("; "));
    }

    let mut campaign = campaign
        .ok_or_else(|| anyhow::anyhow!("template file contains no data rows"))?;
    campaign.ad_sets = ad_set_order
        .into_iter()
        .filter_map(|name| ad_sets.remove(&name))
        .collect();
    Ok(campaign)
}

fn cell(row: &HashMap<&str, &str>, column: &str) -> Option<String> {
    row.get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn campaign_from_row(row: &HashMap<&str, &str>) -> CampaignSnapshot {
    CampaignSnapshot {
        id: cell(row, "Campaign ID").unwrap_or_default(),
        name: cell(row, "Campaign Name").unwrap_or_default(),
        objective: cell(row, "Campaign Objective").unwrap_or_default(),
        status: cell(row, "Campaign Status").unwrap_or_default(),
        daily_budget: cell(row, "Campaign Daily Budget"),
        lifetime_budget: cell(row, "Campaign Lifetime Budget"),
        special_ad_categories: cell(row, "Special Ad Categories")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
        bid_strategy: cell(row, "Campaign Bid Strategy"),
        ad_sets: Vec::new(),
    }
}

fn ad_set_from_row(row: &HashMap<&str, &str>) -> AdSetSnapshot {
    AdSetSnapshot {
        id: cell(row, "Ad Set ID").unwrap_or_default(),
        name: cell(row, "Ad Set Name").unwrap_or_default(),
        targeting: cell(row, "Targeting").map(|raw| parse_targeting(&raw)),
        daily_budget: cell(row, "Ad Set Daily Budget"),
        lifetime_budget: cell(row, "Ad Set Lifetime Budget"),
        billing_event: cell(row, "Billing Event").unwrap_or_default(),
        optimization_goal: cell(row, "Optimization Goal").unwrap_or_default(),
        bid_amount: cell(row, "Bid Amount").and_then(|v| v.parse().ok()),
        bid_strategy: cell(row, "Ad Set Bid Strategy"),
        start_time: cell(row, "Ad Set Time Start"),
        end_time: cell(row, "Ad Set Time Stop"),
        ads: Vec::new(),
    }
}

/// Targeting cells hold the platform's JSON export; carry unparseable cells
/// through as raw strings rather than dropping them.
fn parse_targeting(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Targeting cell is not valid JSON ({}), carrying it verbatim", e);
            Value::String(raw.to_string())
        }
    }
}

fn ad_from_row(row: &HashMap<&str, &str>) -> Option<AdSnapshot> {
    let name = cell(row, "Ad Name")?;
    Some(AdSnapshot {
        id: cell(row, "Ad ID").unwrap_or_default(),
        name: name.clone(),
        status: cell(row, "Ad Status").unwrap_or_default(),
        ad_set_id: cell(row, "Ad Set ID").unwrap_or_default(),
        creative: CreativeSnapshot {
            id: cell(row, "Creative ID").unwrap_or_default(),
            name: cell(row, "Creative Name").unwrap_or_else(|| name),
            page_id: cell(row, "Page ID").unwrap_or_default(),
            link_data: LinkData {
                title: cell(row, "Title").unwrap_or_default(),
                message: cell(row, "Body").unwrap_or_default(),
                link: cell(row, "Link").unwrap_or_default(),
                description: cell(row, "Link Description").unwrap_or_default(),
                image_hash: cell(row, "Image Hash"),
                video_id: cell(row, "Video ID"),
                call_to_action: cell(row, "Call to Action")
                    .map(|cta| Value::String(cta)),
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clone::sanitize::sanitize;

    const SAMPLE: &str = "\
Campaign Name,Campaign Objective,Campaign Status,Campaign Daily Budget,Ad Set Name,Ad Set ID,Ad Set Daily Budget,Billing Event,Optimization Goal,Targeting,Ad Name,Ad Status,Title,Body,Link,Image Hash,Page ID
Spring Launch,OUTCOME_TRAFFIC,ACTIVE,10000,US broad,as_1,5000,IMPRESSIONS,LINK_CLICKS,\"{\"\"countries\"\":[\"\"US\"\"]}\",Hero ad,ACTIVE,Buy now,Hello,https://x.com,abc123,pg_77
Spring Launch,OUTCOME_TRAFFIC,ACTIVE,10000,US broad,as_1,5000,IMPRESSIONS,LINK_CLICKS,\"{\"\"countries\"\":[\"\"US\"\"]}\",Second ad,PAUSED,Try it,World,https://x.com/2,def456,pg_77
Spring Launch,OUTCOME_TRAFFIC,ACTIVE,10000,UK narrow,as_2,3000,IMPRESSIONS,REACH,\"{\"\"countries\"\":[\"\"GB\"\"]}\",UK ad,ACTIVE,Go,Hi,https://x.com/uk,ghi789,pg_77
";

    #[test]
    fn test_rows_group_into_ad_sets_in_order() {
        let campaign = parse_tabular_template(SAMPLE).unwrap();
        assert_eq!(campaign.name, "Spring Launch");
        assert_eq!(campaign.daily_budget.as_deref(), Some("10000"));
        assert_eq!(campaign.ad_sets.len(), 2);
        assert_eq!(campaign.ad_sets[0].name, "US broad");
        assert_eq!(campaign.ad_sets[0].ads.len(), 2);
        assert_eq!(campaign.ad_sets[1].name, "UK narrow");
        assert_eq!(campaign.ad_sets[1].ads.len(), 1);
    }

    #[test]
    fn test_targeting_cell_parses_to_json() {
        let campaign = parse_tabular_template(SAMPLE).unwrap();
        let targeting = campaign.ad_sets[0].targeting.as_ref().unwrap();
        assert_eq!(targeting["countries"][0], "US");
    }

    #[test]
    fn test_parsed_template_sanitizes_like_a_live_snapshot() {
        let campaign = parse_tabular_template(SAMPLE).unwrap();
        assert_eq!(campaign.ad_sets[0].id, "as_1");
        assert_eq!(
            campaign.ad_sets[0].ads[0].creative.link_data.image_hash.as_deref(),
            Some("abc123")
        );

        let template = sanitize(&campaign);
        assert!(template.ad_sets[0].id.is_empty());
        assert!(template.ad_sets[0].ads[0].creative.link_data.image_hash.is_none());
        assert!(template.ad_sets[0].ads[0].creative.page_id.is_empty());
        // structure untouched
        assert_eq!(template.ad_sets[0].ads[0].creative.link_data.message, "Hello");
        assert_eq!(template.ad_sets[0].targeting, campaign.ad_sets[0].targeting);
    }

    #[test]
    fn test_empty_file_is_an_error() {
        assert!(parse_tabular_template("Campaign Name,Ad Set Name\n").is_err());
    }
}
