use shared::{
    domain::AccessToken,
    error::ErrorCode,
    protocol::{DirectiveOutcome, DISCOVERY_FAIL},
};
use tracing::{error, info};

use crate::{
    response::{build_error, discovery_response},
    DirectiveContext,
};

/// Lists the customer's appliances and wraps them in a discovery response.
/// Descriptors are passed through untouched.
pub async fn discover(ctx: &DirectiveContext, token: &AccessToken) -> DirectiveOutcome {
    match ctx.devices.list_appliances(token).await {
        Ok(appliances) => {
            info!(count = appliances.len(), "discovery: appliances listed");
            Ok(discovery_response(appliances))
        }
        Err(error) => {
            error!(%error, "discovery: device api call failed");
            Err(build_error(
                DISCOVERY_FAIL,
                ErrorCode::DependentServiceUnavailable,
                "Unable to connect to server",
            ))
        }
    }
}

#[cfg(test)]
#[path = "tests/discovery_tests.rs"]
mod tests;
