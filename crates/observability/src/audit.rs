use jobportal_auth::{Decision, DecisionExplanation};

/// Log a policy decision that did not allow the request.
///
/// Allowed decisions are logged at `debug`, everything else at `warn` with the
/// full explanation attached as JSON.
pub fn policy_decision(explanation: &DecisionExplanation) {
    let detail = serde_json::to_string(explanation).unwrap_or_default();
    match explanation.decision {
        Decision::Allow => tracing::debug!(
            operation = ?explanation.operation,
            resource = explanation.resource.as_str(),
            "access allowed"
        ),
        Decision::Deny(_) | Decision::Paywall => tracing::warn!(
            operation = ?explanation.operation,
            resource = explanation.resource.as_str(),
            user_id = ?explanation.user_id,
            reason = %explanation.reason,
            explanation = %detail,
            "access denied"
        ),
    }
}
