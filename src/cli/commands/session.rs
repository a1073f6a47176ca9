//! Login, registration and session commands.

use console::style;

use crate::app::App;
use crate::auth::{registration_error_message, LoginRequest, RegisterRequest};
use crate::router::{Navigator, Route};

/// Mirror of the login view: an existing session skips straight to the
/// dashboard.
fn already_logged_in(app: &App) -> bool {
    if !app.auth.is_logged_in() {
        return false;
    }
    let landed = app.router.navigate(Route::Dashboard);
    println!(
        "{} Already logged in as {}, continuing to {}",
        style("!").yellow(),
        app.session.username().unwrap_or_default(),
        landed
    );
    true
}

pub async fn cmd_login(app: &App, username: &str, password: Option<&str>) -> anyhow::Result<()> {
    if already_logged_in(app) {
        return Ok(());
    }

    let request = LoginRequest::new(username, password.unwrap_or_default());
    if request.validate().is_err() {
        anyhow::bail!("Please enter both username and password.");
    }

    if app.auth.login(&request).await.is_err() {
        anyhow::bail!("Login failed. Please check your username and password.");
    }

    let landed = app.router.navigate(Route::Dashboard);
    println!(
        "{} Logged in as {}",
        style("✓").green(),
        app.session.username().unwrap_or_default()
    );
    println!("  Continuing to {}", landed);
    Ok(())
}

pub async fn cmd_register(
    app: &App,
    username: &str,
    password: Option<&str>,
) -> anyhow::Result<()> {
    if already_logged_in(app) {
        return Ok(());
    }

    let request = RegisterRequest::new(username, password.unwrap_or_default());
    if let Err(e) = request.validate() {
        anyhow::bail!("Please fill in all fields correctly. {}.", e);
    }

    match app.auth.register(&request).await {
        Ok(reply) => {
            println!(
                "{} Registration successful! You can now login.",
                style("✓").green()
            );
            let message = reply.message();
            if !message.is_empty() {
                println!("  {}", style(message).dim());
            }
            Ok(())
        }
        Err(e) => anyhow::bail!(registration_error_message(&e)),
    }
}

pub fn cmd_logout(app: &App) -> anyhow::Result<()> {
    let was_logged_in = app.auth.is_logged_in();
    let landed = app.auth.logout();
    if was_logged_in {
        println!("{} Logged out", style("✓").green());
    } else {
        println!("{} No session to log out of", style("!").yellow());
    }
    println!("  Continuing to {}", landed);
    Ok(())
}

pub fn cmd_whoami(app: &App) -> anyhow::Result<()> {
    let snapshot = app.session.snapshot();
    if snapshot.authenticated {
        println!(
            "{} Logged in as {}",
            style("✓").green(),
            snapshot.username.as_deref().unwrap_or("(unknown user)")
        );
    } else {
        println!("{} Not logged in", style("!").yellow());
    }
    println!("  API: {}", app.api.base_url());
    Ok(())
}
