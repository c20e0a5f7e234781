use serde::Serialize;
use thiserror::Error;

use siteerp_core::{OrganizationId, UserId};

use crate::{Action, Principal, Role};

/// Verdict of the decision engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AuthzError::Forbidden),
        }
    }
}

/// Authorization failure.
///
/// Deliberately carries no detail about the target: a denial must not reveal
/// whether the resource exists in another tenant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden")]
    Forbidden,
}

/// The rule that produced a verdict. Rules are evaluated in declaration order
/// and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Superadmins may do anything, across tenants.
    Superadmin,
    /// No target organization; only a superadmin may act without one.
    UnscopedTarget,
    /// Target is the principal's own organization.
    SameTenant,
    /// Target belongs to a different organization.
    CrossTenant,
}

impl DecisionRule {
    pub fn decision(self) -> Decision {
        match self {
            DecisionRule::Superadmin | DecisionRule::SameTenant => Decision::Allow,
            DecisionRule::UnscopedTarget | DecisionRule::CrossTenant => Decision::Deny,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision engine
// ─────────────────────────────────────────────────────────────────────────────

/// Decide whether `principal` may perform `action` on a resource owned by
/// `target` (`None` for operations with no owning tenant, such as creating or
/// listing organizations).
///
/// - No IO
/// - No panics
/// - Same inputs, same verdict
pub fn decide(principal: &Principal, _action: Action, target: Option<OrganizationId>) -> Decision {
    matched_rule(principal, target).decision()
}

fn matched_rule(principal: &Principal, target: Option<OrganizationId>) -> DecisionRule {
    if principal.role() == Role::Superadmin {
        return DecisionRule::Superadmin;
    }
    let Some(target) = target else {
        return DecisionRule::UnscopedTarget;
    };
    if principal.organization_id() == Some(target) {
        DecisionRule::SameTenant
    } else {
        DecisionRule::CrossTenant
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub principal_id: UserId,
    pub role: Role,
    pub principal_organization_id: Option<OrganizationId>,
    pub action: Action,
    pub target_organization_id: Option<OrganizationId>,
    pub rule: DecisionRule,
    pub decision: Decision,
    /// Human-readable reason for the decision.
    pub reason: String,
}

/// Explain why `decide` returns what it returns for these inputs.
pub fn explain(
    principal: &Principal,
    action: Action,
    target: Option<OrganizationId>,
) -> AuthorizationExplanation {
    let rule = matched_rule(principal, target);
    let reason = match (rule, target) {
        (DecisionRule::Superadmin, _) => {
            format!("superadmin may {action} resources of any organization")
        }
        (DecisionRule::UnscopedTarget, _) => format!(
            "{} may not {action} a resource without an owning organization",
            principal.role()
        ),
        (DecisionRule::SameTenant, Some(t)) => {
            format!("principal is a member of organization {t}")
        }
        (DecisionRule::CrossTenant, Some(t)) => format!(
            "resource belongs to organization {t}, principal is scoped to another organization"
        ),
        (_, None) => String::from("no target organization"),
    };

    AuthorizationExplanation {
        principal_id: principal.user_id(),
        role: principal.role(),
        principal_organization_id: principal.organization_id(),
        action,
        target_organization_id: target,
        rule,
        decision: rule.decision(),
        reason,
    }
}
