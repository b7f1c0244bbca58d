//! Clone orchestrator
//!
//! Entry point for "clone campaign X into accounts Y…". Per destination
//! account the strategies are tried in order until one yields a result.
//! Destination accounts are independent failure domains: they run
//! concurrently, each over its own client instance (the platform scopes
//! rate limits per token/account, so one account's backoff must not throttle
//! another), and one account's failure never disturbs another's result.

use crate::api::{GraphClient, ResilienceConfig};
use crate::clone::models::{CloneResult, DestinationAccount};
use crate::clone::strategy::{CloneStrategy, ManualCloneStrategy, NativeCopyStrategy};
use log::{debug, info};

enum Strategies {
    /// Built fresh per destination account over an isolated client
    PerAccount {
        client: GraphClient,
        resilience: ResilienceConfig,
    },
    /// Fixed list supplied by the caller
    Fixed(Vec<Box<dyn CloneStrategy>>),
}

pub struct CloneOrchestrator {
    strategies: Strategies,
}

impl CloneOrchestrator {
    /// Default strategy order: native deep copy, then manual recreation
    pub fn new(client: GraphClient) -> Self {
        Self::with_resilience(client, ResilienceConfig::default())
    }

    pub fn with_resilience(client: GraphClient, resilience: ResilienceConfig) -> Self {
        Self {
            strategies: Strategies::PerAccount { client, resilience },
        }
    }

    /// Replace the strategy list entirely (the order is the fallback order)
    pub fn with_strategies(strategies: Vec<Box<dyn CloneStrategy>>) -> Self {
        Self {
            strategies: Strategies::Fixed(strategies),
        }
    }

    /// Clone one source campaign into every destination account, producing
    /// exactly one result per account.
    pub async fn clone_campaign(
        &self,
        source_campaign_id: &str,
        destinations: &[DestinationAccount],
    ) -> Vec<CloneResult> {
        info!(
            "Cloning campaign {} into {} account(s)",
            source_campaign_id,
            destinations.len()
        );

        let attempts = destinations
            .iter()
            .map(|destination| self.clone_into(source_campaign_id, destination));
        futures::future::join_all(attempts).await
    }

    async fn clone_into(
        &self,
        source_campaign_id: &str,
        destination: &DestinationAccount,
    ) -> CloneResult {
        match &self.strategies {
            Strategies::PerAccount { client, resilience } => {
                let account_client = client.isolated(resilience);
                let strategies: Vec<Box<dyn CloneStrategy>> = vec![
                    Box::new(NativeCopyStrategy::new(account_client.clone())),
                    Box::new(ManualCloneStrategy::new(account_client)),
                ];
                Self::try_in_order(&strategies, source_campaign_id, destination).await
            }
            Strategies::Fixed(strategies) => {
                Self::try_in_order(strategies, source_campaign_id, destination).await
            }
        }
    }

    async fn try_in_order(
        strategies: &[Box<dyn CloneStrategy>],
        source_campaign_id: &str,
        destination: &DestinationAccount,
    ) -> CloneResult {
        for strategy in strategies {
            debug!(
                "Trying strategy '{}' for {} -> {}",
                strategy.name(),
                source_campaign_id,
                destination.account_id
            );
            if let Some(result) = strategy.attempt(source_campaign_id, destination).await {
                info!(
                    "Account {}: strategy '{}' finished with {:?}",
                    destination.account_id,
                    strategy.name(),
                    result.status
                );
                return result;
            }
        }

        CloneResult::failed(
            &destination.account_id,
            None,
            "no clone strategy produced a result".to_string(),
        )
    }
}
