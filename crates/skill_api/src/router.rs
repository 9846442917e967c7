use shared::{
    domain::AccessToken,
    error::ErrorCode,
    protocol::{
        Directive, DirectiveOutcome, CONTROL_NAMESPACE, DISCOVERY_FAIL, DISCOVERY_NAMESPACE,
        UNSUPPORTED_DIRECTIVE,
    },
};
use tracing::{info, warn};

use crate::{control::control, discovery::discover, response::build_error, DirectiveContext};

/// Dispatches a directive on its namespace. Unknown namespaces fail with a
/// structured `UNSUPPORTED_OPERATION` error named after the inbound directive.
pub async fn route(ctx: &DirectiveContext, directive: &Directive) -> DirectiveOutcome {
    let header = &directive.header;
    info!(
        namespace = %header.namespace,
        name = %header.name,
        payload_version = %header.payload_version,
        "directive received"
    );

    let outcome = match header.namespace.as_str() {
        DISCOVERY_NAMESPACE => {
            match directive
                .payload
                .access_token
                .as_deref()
                .and_then(AccessToken::parse)
            {
                Some(token) => discover(ctx, &token).await,
                None => {
                    warn!("discovery: directive has no access token");
                    Err(build_error(
                        DISCOVERY_FAIL,
                        ErrorCode::UnsupportedOperation,
                        "Missing access token",
                    ))
                }
            }
        }
        CONTROL_NAMESPACE => control(ctx, directive).await,
        other => {
            warn!(namespace = %other, "no supported namespace");
            let name = match header.name.trim() {
                "" => UNSUPPORTED_DIRECTIVE,
                name => name,
            };
            Err(build_error(
                name,
                ErrorCode::UnsupportedOperation,
                format!("No supported namespace: {other}"),
            ))
        }
    };

    match &outcome {
        Ok(response) => info!(name = %response.header.name, "directive succeeded"),
        Err(error) => warn!(%error, "directive failed"),
    }
    outcome
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
