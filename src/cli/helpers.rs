//! Shared helper functions for CLI commands.

use console::style;

use crate::app::App;
use crate::dashboard::{AnalysisResult, ExtractionResult};
use crate::router::{Navigator, Route};

/// Enter the dashboard through the navigation guard. Prints the redirect
/// and returns `false` when there is no session.
pub fn enter_dashboard(app: &App) -> bool {
    match app.router.navigate(Route::Dashboard) {
        Route::Dashboard => true,
        landed => {
            println!(
                "{} Not logged in, redirected to {}",
                style("!").yellow(),
                landed
            );
            println!("  Run `compann login -u <username>` first");
            false
        }
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn print_list(label: &str, items: Option<&Vec<String>>) {
    let items = match items {
        Some(items) if !items.is_empty() => items,
        _ => return,
    };
    println!("  {}:", style(label).bold());
    for item in items {
        println!("    - {}", item);
    }
}

pub fn print_extraction(result: &ExtractionResult) {
    println!("\n{}", style(format!("Extraction: {}", result.requested_url)).bold());
    println!("{}", "-".repeat(40));
    println!(
        "  {:<18} {}",
        "Title:",
        result.title.as_deref().unwrap_or("(none)")
    );
    if let Some(ref description) = result.meta_description {
        println!("  {:<18} {}", "Description:", truncate(description, 100));
    }

    let images = result
        .image_count
        .map(|n| n as usize)
        .or_else(|| result.image_urls.as_ref().map(Vec::len))
        .unwrap_or(0);
    println!("  {:<18} {}", "Images:", images);

    let og_tags = result
        .open_graph_tag_count
        .map(|n| n as usize)
        .or_else(|| result.open_graph_tags.as_ref().map(|t| t.len()))
        .unwrap_or(0);
    println!("  {:<18} {}", "OpenGraph tags:", og_tags);

    let twitter_tags = result
        .twitter_tag_count
        .map(|n| n as usize)
        .or_else(|| result.twitter_tags.as_ref().map(|t| t.len()))
        .unwrap_or(0);
    println!("  {:<18} {}", "Twitter tags:", twitter_tags);

    if let Some(has_favicon) = result.has_favicon {
        println!(
            "  {:<18} {}",
            "Favicon:",
            if has_favicon { "yes" } else { "no" }
        );
    }
    print_list("Social links", result.social_media_links.as_ref());
}

pub fn print_analysis(result: &AnalysisResult) {
    println!("\n{}", style("AI Analysis").bold());
    println!("{}", "-".repeat(40));
    if let Some(ref summary) = result.summary {
        println!("  {}", summary);
    }
    print_list("Pros", result.pros.as_ref());
    print_list("Cons", result.cons.as_ref());
    print_list("Opportunities", result.opportunities.as_ref());
    print_list("Red flags", result.red_flags.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 10), "a longe...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }
}
