//! Extraction and analysis commands.

use console::style;

use crate::app::App;
use crate::cli::helpers::{enter_dashboard, print_analysis, print_extraction};
use crate::dashboard::StepOutcome;

/// Run the extraction step and print what came back.
async fn extract(app: &App, url: &str, json: bool) -> anyhow::Result<()> {
    println!("{} Extracting {}...", style("→").cyan(), url);
    let outcome = app.dashboard.submit_url(url).await;
    let state = app.dashboard.state();

    match outcome {
        StepOutcome::Applied => {}
        _ => anyhow::bail!(state
            .extraction_error
            .clone()
            .unwrap_or_else(|| "Extraction did not complete".to_string())),
    }

    if let Some(ref extraction) = state.extraction {
        if json {
            println!("{}", serde_json::to_string_pretty(extraction)?);
        } else {
            print_extraction(extraction);
        }
    }
    if let Some(ref issue) = state.extraction_error {
        println!("{} {}", style("!").yellow(), issue);
    }

    Ok(())
}

pub async fn cmd_extract(app: &App, url: &str, json: bool) -> anyhow::Result<()> {
    if !enter_dashboard(app) {
        return Ok(());
    }
    extract(app, url, json).await
}

pub async fn cmd_analyze(app: &App, url: &str, json: bool) -> anyhow::Result<()> {
    if !enter_dashboard(app) {
        return Ok(());
    }
    extract(app, url, json).await?;

    println!("{} Requesting AI analysis...", style("→").cyan());
    let outcome = app.dashboard.request_analysis().await;
    let state = app.dashboard.state();

    match (outcome, state.analysis) {
        (StepOutcome::Applied, Some(analysis)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
            Ok(())
        }
        _ => anyhow::bail!(state
            .analysis_error
            .unwrap_or_else(|| "Analysis did not complete".to_string())),
    }
}
