//! Integration tests for retry/backoff behavior of the remote client

mod common;

use adclone::api::{
    GraphClient, RateLimitConfig, RemoteError, ResilienceConfig, RetryConfig, RetryPolicy,
};
use common::{object_error, rate_limited, MockTransport};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn fast_retries(max_attempts: u32) -> ResilienceConfig {
    ResilienceConfig {
        retry: RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        rate_limit: RateLimitConfig {
            requests_per_minute: u32::MAX,
            burst_capacity: u32::MAX,
            enabled: false,
        },
    }
}

#[tokio::test]
async fn rate_limited_call_succeeds_on_third_attempt() {
    let transport = Arc::new(MockTransport::new(|_, nth| {
        if nth < 2 {
            Err(rate_limited())
        } else {
            Ok(json!({"id": "cmp_1", "name": "Spring"}))
        }
    }));
    let client = GraphClient::with_transport(transport.clone(), &fast_retries(3));

    let result = client.get_object("cmp_1", "id,name").await.unwrap();

    assert_eq!(result["id"], "cmp_1");
    assert_eq!(transport.count("/cmp_1"), 3);
}

#[tokio::test]
async fn exhausted_attempts_surface_max_retries_exceeded() {
    let transport = Arc::new(MockTransport::new(|_, _| Err(rate_limited())));
    let client = GraphClient::with_transport(transport.clone(), &fast_retries(3));

    let result = client.get_object("cmp_1", "id").await;

    assert_eq!(transport.count("/cmp_1"), 3);
    match result {
        Err(RemoteError::MaxRetriesExceeded { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected MaxRetriesExceeded, got {:?}", other),
    }
}

#[tokio::test]
async fn object_errors_are_not_retried() {
    let transport = Arc::new(MockTransport::new(|_, _| {
        Err(object_error("Invalid parameter"))
    }));
    let client = GraphClient::with_transport(transport.clone(), &fast_retries(3));

    let result = client.get_object("cmp_1", "id").await;

    assert_eq!(transport.count("/cmp_1"), 1);
    assert!(matches!(result, Err(RemoteError::Object { .. })));
}

/// The backoff schedule between attempts is 1000ms then 2000ms with the
/// default config (jitter disabled for determinism).
#[test]
fn default_backoff_schedule_doubles_from_one_second() {
    let policy = RetryPolicy::new(RetryConfig {
        jitter: false,
        ..RetryConfig::default()
    });

    assert_eq!(policy.calculate_delay(1), Duration::from_millis(1000));
    assert_eq!(policy.calculate_delay(2), Duration::from_millis(2000));
}

#[tokio::test]
async fn edge_reads_follow_pagination_cursors() {
    let transport = Arc::new(MockTransport::new(|request, _| {
        match request.param("after") {
            None => Ok(json!({
                "data": [{"id": "as_1"}],
                "paging": {"cursors": {"after": "CURSOR1"}, "next": "https://next"}
            })),
            Some("CURSOR1") => Ok(json!({
                "data": [{"id": "as_2"}],
                "paging": {"cursors": {"after": "CURSOR2"}}
            })),
            Some(other) => panic!("unexpected cursor {}", other),
        }
    }));
    let client = GraphClient::with_transport(transport.clone(), &ResilienceConfig::disabled());

    let ad_sets = client.get_edge("cmp_1", "adsets", "id").await.unwrap();

    assert_eq!(ad_sets.len(), 2);
    assert_eq!(ad_sets[0]["id"], "as_1");
    assert_eq!(ad_sets[1]["id"], "as_2");
    assert_eq!(transport.count("/cmp_1/adsets"), 2);
}
