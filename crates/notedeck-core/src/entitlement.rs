//! Client-side entitlement gate
//!
//! FREE tenants may hold up to [`FREE_NOTE_LIMIT`] notes. The gate only decides
//! which affordances to offer; the backend remains the authority and any call
//! made anyway is judged by its response alone.

use crate::identity::{Identity, Plan};

/// Maximum number of notes on the FREE plan
pub const FREE_NOTE_LIMIT: usize = 3;

/// What the user is offered when the plan limit matters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeAffordance {
    /// ADMIN users can upgrade the tenant themselves
    Offer,
    /// MEMBER users are told to ask an admin
    ContactAdmin,
}

impl UpgradeAffordance {
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_admin() {
            UpgradeAffordance::Offer
        } else {
            UpgradeAffordance::ContactAdmin
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            UpgradeAffordance::Offer => "Upgrade to PRO Plan for unlimited notes.",
            UpgradeAffordance::ContactAdmin => "Contact your admin to upgrade to PRO plan.",
        }
    }
}

/// Evaluated gate for the current session and note list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlements {
    pub plan: Plan,
    pub note_count: usize,
    pub editing: bool,
    /// Whether the note form accepts input and submission
    pub can_create: bool,
    /// Whether the limit warning is shown
    pub limit_reached: bool,
    pub upgrade: UpgradeAffordance,
}

impl Entitlements {
    pub fn evaluate(identity: &Identity, note_count: usize, editing: bool) -> Self {
        let plan = identity.effective_plan();
        let blocked = creation_blocked(plan, note_count, editing);
        Self {
            plan,
            note_count,
            editing,
            can_create: !blocked,
            limit_reached: blocked,
            upgrade: UpgradeAffordance::for_identity(identity),
        }
    }

    /// The upgrade screen is only reachable for ADMIN users.
    pub fn upgrade_visible(&self) -> bool {
        self.upgrade == UpgradeAffordance::Offer
    }
}

/// Creation is blocked exactly when the FREE limit is reached and no note is being edited.
pub fn creation_blocked(plan: Plan, note_count: usize, editing: bool) -> bool {
    note_count >= FREE_NOTE_LIMIT && !editing && plan != Plan::Pro
}
