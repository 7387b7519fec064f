//! Proxy route inspection.
//!
//! Loads the proxy settings from the environment (and `.env`) the way the
//! gateway does, so the answer matches what a browser would see.

use marketplace_core::routes::{ProxyDecision, RouteRequest};
use marketplace_gateway::config::ProxySettings;
use marketplace_gateway::middleware::ProxyPolicy;

/// Print the class of `path` and what the proxy would do with it.
#[allow(clippy::print_stdout)]
pub fn show(path: &str, method: &str, has_session: bool) {
    let settings = ProxySettings::from_env();
    for line in describe(&settings, path, method, has_session) {
        println!("{line}");
    }
}

fn describe(settings: &ProxySettings, path: &str, method: &str, has_session: bool) -> Vec<String> {
    let policy = ProxyPolicy::from_settings(settings);
    let routes = policy.routes();

    let decision = match routes.decide(&RouteRequest {
        method,
        path,
        has_session,
    }) {
        ProxyDecision::Preflight => "decision: 204 preflight".to_owned(),
        ProxyDecision::Redirect { location } => format!("decision: 307 redirect to {location}"),
        ProxyDecision::PassThrough(_) => "decision: pass through".to_owned(),
    };

    vec![
        format!("path:     {path}"),
        format!("class:    {:?}", routes.classify(path)),
        decision,
    ]
}
