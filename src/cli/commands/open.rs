//! View navigation command.

use console::style;

use crate::app::App;
use crate::router::Route;

/// Resolve `path`, navigate through the guard, and report the result.
pub fn cmd_open(app: &App, path: &str) -> anyhow::Result<()> {
    let requested = Route::resolve(path);
    let landed = app.router.navigate_to(path);

    if landed == requested {
        println!("{} {}", style("→").green(), landed);
    } else {
        println!(
            "{} {} requires a session, redirected to {}",
            style("!").yellow(),
            requested,
            landed
        );
    }
    Ok(())
}
