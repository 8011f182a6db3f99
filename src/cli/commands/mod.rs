pub mod auth;
pub mod client;
pub mod entity;
pub mod user;

use crate::console::Console;

/// Run the route guard for `route` and return the bearer token, or fail
/// with a hint to sign in.
pub(crate) fn signed_in(console: &Console, route: &str) -> anyhow::Result<String> {
    console.enter(route).map_err(|redirect| {
        tracing::debug!(route, to = %redirect.to, "route guard redirected");
        anyhow::anyhow!("Not signed in. Run `orgctl auth login <email or employee id>` first")
    })
}
