//! Command handlers

use crate::api::GraphClient;
use crate::clone::models::{CloneResult, DestinationAccount};
use crate::clone::recreate::RecreationPipeline;
use crate::clone::sanitize::{sanitize, sanitize_value};
use crate::clone::snapshot::CampaignSnapshot;
use crate::clone::{CloneOrchestrator, SnapshotExtractor};
use crate::config::Config;
use crate::import::parse_tabular_template;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

fn build_client(config: &Config) -> Result<GraphClient> {
    let token = config.require_token()?;
    Ok(GraphClient::with_resilience(token, &config.resilience()))
}

fn destinations(config: &Config, account_ids: &[String]) -> Vec<DestinationAccount> {
    account_ids.iter().map(|id| config.destination(id)).collect()
}

/// Clone a live campaign into destination accounts
pub async fn clone_command(config: &Config, campaign: &str, to: &[String]) -> Result<()> {
    let client = build_client(config)?;
    let orchestrator = CloneOrchestrator::with_resilience(client, config.resilience());

    let results = orchestrator
        .clone_campaign(campaign, &destinations(config, to))
        .await;

    print_results(&results);
    Ok(())
}

/// Extract a campaign and write the sanitized template to disk
pub async fn export_command(config: &Config, campaign: &str, output: &Path) -> Result<()> {
    let client = build_client(config)?;
    let extractor = SnapshotExtractor::new(&client);

    let snapshot = extractor.extract(campaign).await?;
    let template = sanitize(&snapshot);

    let json = serde_json::to_string_pretty(&template)?;
    std::fs::write(output, json)?;

    println!(
        "{} template for '{}' ({} ad sets, {} ads) written to {}",
        "Exported".green().bold(),
        template.name,
        template.ad_sets.len(),
        template.ad_count(),
        output.display()
    );
    Ok(())
}

/// Replay a saved JSON template or spreadsheet export into accounts
pub async fn import_command(config: &Config, file: &Path, to: &[String]) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", file.display(), e))?;

    let parsed: CampaignSnapshot = if file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
    {
        // The same field-clearing rule applies whether the template came
        // from a live fetch or a file, so raw JSON is scrubbed before the
        // typed pass.
        let mut value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid template {}: {}", file.display(), e))?;
        sanitize_value(&mut value);
        serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("invalid template {}: {}", file.display(), e))?
    } else {
        parse_tabular_template(&content)?
    };

    // Sanitization is idempotent: clean templates pass through unchanged,
    // raw exports lose their source-account identifiers.
    let template = sanitize(&parsed);

    let client = build_client(config)?;
    let accounts = destinations(config, to);

    let attempts = accounts.iter().map(|destination| {
        let account_client = client.isolated(&config.resilience());
        let template = &template;
        async move {
            let pipeline = RecreationPipeline::new(&account_client);
            match pipeline.recreate(template, destination).await {
                Ok(outcome) => CloneResult::success(
                    &destination.account_id,
                    outcome.campaign_id.clone(),
                    "template_replay",
                    outcome.failure_summary(),
                ),
                Err(e) => CloneResult::failed(
                    &destination.account_id,
                    Some("template_replay"),
                    e.to_string(),
                ),
            }
        }
    });
    let results = futures::future::join_all(attempts).await;

    print_results(&results);
    Ok(())
}

/// List ad accounts reachable with the configured token
pub async fn accounts_command(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let accounts = client
        .get_edge("me", "adaccounts", "id,name,account_status")
        .await?;

    if accounts.is_empty() {
        println!("No ad accounts visible to this token.");
        return Ok(());
    }

    for account in accounts {
        let id = account["id"].as_str().unwrap_or("?");
        let name = account["name"].as_str().unwrap_or("(unnamed)");
        println!("{}  {}", id.cyan(), name);
    }
    Ok(())
}

fn print_results(results: &[CloneResult]) {
    for result in results {
        if result.is_success() {
            let campaign_id = result.new_campaign_id.as_deref().unwrap_or("?");
            let strategy = result.strategy.as_deref().unwrap_or("?");
            println!(
                "{} {} -> campaign {} (via {})",
                "✓".green().bold(),
                result.destination_account_id,
                campaign_id,
                strategy
            );
            if let Some(detail) = &result.error {
                println!("  {} {}", "partial:".yellow(), detail);
            }
        } else {
            println!(
                "{} {} -> {}",
                "✗".red().bold(),
                result.destination_account_id,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    println!(
        "\n{} of {} account(s) succeeded",
        succeeded,
        results.len()
    );
}
