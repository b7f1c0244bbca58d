//! API constants and endpoint builders for the advertising platform's Graph API

/// Graph API version
pub const API_VERSION: &str = "v19.0";

/// Base URL for the Graph API
pub const GRAPH_BASE_URL: &str = "https://graph.facebook.com";

/// Full base path with version
pub fn api_base(base_url: &str) -> String {
    format!("{}/{}", base_url, API_VERSION)
}

/// Platform error codes that indicate request throttling. Calls failing with
/// one of these are retried with backoff; everything else propagates.
pub const RATE_LIMIT_ERROR_CODES: &[i64] = &[4, 17, 32, 613, 80004];

/// Platform error codes for invalid or expired access tokens
pub const AUTH_ERROR_CODES: &[i64] = &[102, 190];

/// Delivery status forced onto every object the engine creates
pub const STATUS_PAUSED: &str = "PAUSED";

/// Field projections for snapshot reads
pub mod fields {
    /// Campaign-level fields
    pub const CAMPAIGN: &str =
        "id,name,objective,status,daily_budget,lifetime_budget,special_ad_categories,bid_strategy";

    /// Ad-set fields, including targeting and schedule
    pub const ADSET: &str = "id,name,targeting,daily_budget,lifetime_budget,billing_event,\
optimization_goal,bid_amount,bid_strategy,start_time,end_time,campaign_id";

    /// Ad fields with nested creative projection
    pub const AD: &str = "id,name,status,adset_id,creative{id,name,object_story_spec}";
}

/// Object path: `/{id}`. Ids are caller-supplied, so they are encoded.
pub fn object_path(id: &str) -> String {
    format!("/{}", urlencoding::encode(id))
}

/// Edge path: `/{id}/{edge}`
pub fn edge_path(id: &str, edge: &str) -> String {
    format!("/{}/{}", urlencoding::encode(id), edge)
}

/// Deep-copy endpoint for a campaign subtree
pub fn copies_path(campaign_id: &str) -> String {
    format!("/{}/copies", urlencoding::encode(campaign_id))
}

/// Ad account ids are prefixed with `act_` on the wire; accept both forms.
pub fn account_id(raw: &str) -> String {
    if raw.starts_with("act_") {
        raw.to_string()
    } else {
        format!("act_{}", raw)
    }
}

/// Create edge under an ad account: `/act_{id}/{edge}`
pub fn account_edge_path(raw_account_id: &str, edge: &str) -> String {
    format!("/{}/{}", account_id(raw_account_id), edge)
}
