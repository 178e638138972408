//! Plain-text views of the session state

use std::fmt::Write;

use notedeck_core::{Entitlements, FREE_NOTE_LIMIT, Identity, Note, Plan, UpgradeAffordance};
use notedeck_session::AppState;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn dashboard(state: &AppState) -> String {
    let Some(identity) = state.identity() else {
        return "Not logged in.".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "Logged in as {}", identity.email);
    let _ = writeln!(out, "  Role:   {}", identity.role);
    let _ = writeln!(out, "  Tenant: {}", identity.tenant_slug);
    let _ = writeln!(out, "  Plan:   {}", identity.effective_plan());
    let _ = writeln!(out, "  Notes:  {}", note_count(state.notes().len(), identity));

    if let Some(gate) = state.entitlements() {
        out.push_str(&gate_summary(&gate));
    }
    out
}

fn note_count(count: usize, identity: &Identity) -> String {
    match identity.effective_plan() {
        Plan::Free => format!("{}/{}", count, FREE_NOTE_LIMIT),
        Plan::Pro => count.to_string(),
    }
}

/// Limit warning when it applies, then the upgrade affordance for FREE tenants
fn gate_summary(gate: &Entitlements) -> String {
    let mut out = String::new();
    if gate.plan == Plan::Pro {
        return out;
    }
    out.push('\n');
    if gate.limit_reached {
        out.push_str("You've reached the note limit for the FREE plan.\n");
    }
    let _ = writeln!(out, "{}", gate.upgrade.message());
    out
}

pub fn note_list(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes yet.\n".to_string();
    }

    let mut out = String::new();
    for note in notes {
        let _ = write!(out, "[{}] {}", note.id, note.title);
        if let Some(created) = note.created_at {
            let _ = write!(out, "  ({})", created.format(TIMESTAMP_FORMAT));
        }
        out.push('\n');
        for line in note.content.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

/// Upgrade screen for ADMIN users
pub fn upgrade_offer(identity: &Identity) -> String {
    match identity.effective_plan() {
        Plan::Pro => format!("Tenant {} is already on the PRO plan.", identity.tenant_slug),
        Plan::Free => format!(
            "{}\nTenant {} is on the FREE plan ({} notes max).",
            UpgradeAffordance::Offer.message(),
            identity.tenant_slug,
            FREE_NOTE_LIMIT
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedeck_core::{Credential, NoteId, Role, Session, note::parse_timestamp};

    fn identity(role: Role, plan: Option<Plan>) -> Identity {
        Identity {
            email: "member@acme.test".to_string(),
            role,
            tenant_slug: "acme".to_string(),
            plan,
        }
    }

    fn note(id: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: format!("title {id}"),
            content: "line one\nline two".to_string(),
            created_at: parse_timestamp("2024-05-01T10:00:00"),
            updated_at: None,
        }
    }

    #[test]
    fn test_dashboard_anonymous() {
        assert_eq!(dashboard(&AppState::new()), "Not logged in.");
    }

    #[test]
    fn test_dashboard_member_shows_contact_admin_at_limit() {
        let mut state = AppState::new();
        state.authenticate(
            Session::new(identity(Role::Member, None), Credential::new("t1")),
            None,
        );
        let ticket = state.begin(notedeck_core::Operation::FetchNotes).unwrap();
        state.apply_notes(&ticket, vec![note("a"), note("b"), note("c")]);

        let text = dashboard(&state);
        assert!(text.contains("Role:   MEMBER"));
        assert!(text.contains("Notes:  3/3"));
        assert!(text.contains("Contact your admin to upgrade to PRO plan."));
    }

    #[test]
    fn test_dashboard_admin_below_limit_offers_upgrade() {
        let mut state = AppState::new();
        state.authenticate(
            Session::new(identity(Role::Admin, None), Credential::new("t1")),
            None,
        );
        let text = dashboard(&state);
        assert!(text.contains("Plan:   FREE"));
        assert!(text.contains("Notes:  0/3"));
        assert!(!text.contains("note limit"));
        assert!(text.contains("Upgrade to PRO Plan for unlimited notes."));
        assert!(!text.contains("Contact your admin"));
    }

    #[test]
    fn test_dashboard_pro_has_no_affordance() {
        let mut state = AppState::new();
        state.authenticate(
            Session::new(identity(Role::Admin, Some(Plan::Pro)), Credential::new("t1")),
            None,
        );
        let text = dashboard(&state);
        assert!(text.contains("Plan:   PRO"));
        assert!(!text.contains("Upgrade"));
    }

    #[test]
    fn test_note_list() {
        assert_eq!(note_list(&[]), "No notes yet.\n");

        let text = note_list(&[note("n1")]);
        assert!(text.starts_with("[n1] title n1  (2024-05-01 10:00)\n"));
        assert!(text.contains("    line two\n"));
    }

    #[test]
    fn test_upgrade_offer() {
        let free = upgrade_offer(&identity(Role::Admin, None));
        assert!(free.contains("Upgrade to PRO Plan"));

        let pro = upgrade_offer(&identity(Role::Admin, Some(Plan::Pro)));
        assert_eq!(pro, "Tenant acme is already on the PRO plan.");
    }
}
