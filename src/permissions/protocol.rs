//! Feature-permission decision protocol
//!
//! Turns an engine request `(origin, feature)` into exactly one
//! `PermissionState` for that origin+feature. A stored decision is applied
//! as-is. An unset feature is passed to the optional prompt; without a
//! prompt, or when the prompt gives no answer, the engine gets `Unknown`.

use url::Url;

use super::manager::PermissionManager;
use super::types::{Decision, Feature, PermissionState};

/// Asks the user about a feature that has no stored decision
///
/// Returning `None` means the user dismissed the prompt.
pub trait PermissionPrompt {
    fn ask(&mut self, origin: &Url, feature: Feature) -> Option<bool>;
}

/// Implement PermissionPrompt for closures
impl<F> PermissionPrompt for F
where
    F: FnMut(&Url, Feature) -> Option<bool>,
{
    fn ask(&mut self, origin: &Url, feature: Feature) -> Option<bool> {
        (self)(origin, feature)
    }
}

/// Resolve a request from stored decisions only
pub fn resolve_feature_request(
    permissions: &PermissionManager,
    origin: &Url,
    feature: Feature,
) -> PermissionState {
    let decision = permissions.get(feature);
    tracing::debug!("Permission request {} for {}: stored {}", feature, origin, decision);
    decision.into()
}

/// Resolve a request, prompting when nothing is stored
///
/// A prompted answer is recorded before it is returned. If recording
/// fails the answer still applies to this request and the failure is only
/// logged, since the user will simply be asked again next session.
pub fn resolve_with_prompt(
    permissions: &mut PermissionManager,
    prompt: Option<&mut dyn PermissionPrompt>,
    origin: &Url,
    feature: Feature,
) -> PermissionState {
    let stored = resolve_feature_request(permissions, origin, feature);
    if stored != PermissionState::Unknown {
        return stored;
    }

    let Some(prompt) = prompt else {
        return PermissionState::Unknown;
    };

    match prompt.ask(origin, feature) {
        Some(granted) => {
            let decision = Decision::from(granted);
            if let Err(e) = permissions.set(feature, decision) {
                tracing::warn!("Answer for {} applies to this session only: {}", feature, e);
            }
            decision.into()
        }
        None => {
            tracing::debug!("Prompt for {} dismissed", feature);
            PermissionState::Unknown
        }
    }
}
