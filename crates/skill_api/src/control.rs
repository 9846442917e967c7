use shared::{
    domain::{AccessToken, SwitchAction},
    error::ErrorCode,
    protocol::{Directive, DirectiveOutcome, CONTROL_NAMESPACE, SWITCH_ON_OFF_REQUEST},
};
use tracing::{debug, error, info, warn};

use crate::{
    classify::{classify_control_body, classify_downstream_error},
    response::{build_error, control_confirmation},
    DirectiveContext,
};

/// Case-insensitive `...TurnOnRequest` / `...TurnOffRequest`.
pub fn is_switch_request(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.ends_with("turnonrequest") || name.ends_with("turnoffrequest")
}

/// Any "on" anywhere in the name counts, not just a whole token.
pub fn requests_turn_on(name: &str) -> bool {
    name.to_ascii_lowercase().contains("on")
}

/// Turns one appliance on or off. Exactly one downstream call is issued for a
/// well-formed directive and none for a rejected one.
pub async fn control(ctx: &DirectiveContext, directive: &Directive) -> DirectiveOutcome {
    let header = &directive.header;
    if header.namespace != CONTROL_NAMESPACE || !is_switch_request(&header.name) {
        warn!(
            namespace = %header.namespace,
            name = %header.name,
            "control: unsupported operation"
        );
        return Err(build_error(
            SWITCH_ON_OFF_REQUEST,
            ErrorCode::UnsupportedOperation,
            "Unrecognized operation",
        ));
    }

    let Some(appliance_id) = directive.appliance_id() else {
        warn!(name = %header.name, "control: directive has no appliance id");
        return Err(build_error(
            SWITCH_ON_OFF_REQUEST,
            ErrorCode::UnsupportedOperation,
            "Missing appliance id",
        ));
    };
    let Some(token) = directive
        .payload
        .access_token
        .as_deref()
        .and_then(AccessToken::parse)
    else {
        warn!(%appliance_id, "control: directive has no access token");
        return Err(build_error(
            SWITCH_ON_OFF_REQUEST,
            ErrorCode::UnsupportedOperation,
            "Missing access token",
        ));
    };

    let turn_on = requests_turn_on(&header.name);
    let action = SwitchAction::from_turn_on(turn_on);
    info!(%appliance_id, action = action.path_segment(), "control: switching appliance");

    match ctx.devices.set_switch(&token, appliance_id, action).await {
        Ok(reply) => {
            debug!(status = reply.status, body = %reply.body, "control: device api replied");
            if let Some((code, description)) = classify_control_body(&reply.body, ctx.control_body)
            {
                warn!(%appliance_id, code = code.as_str(), "control: device api reported failure");
                return Err(build_error(SWITCH_ON_OFF_REQUEST, code, description));
            }
            Ok(control_confirmation(turn_on))
        }
        Err(error) => {
            error!(%appliance_id, %error, "control: device api call failed");
            Err(build_error(
                SWITCH_ON_OFF_REQUEST,
                classify_downstream_error(&error, ctx.control_body),
                "Unable to connect to server",
            ))
        }
    }
}

#[cfg(test)]
#[path = "tests/control_tests.rs"]
mod tests;
