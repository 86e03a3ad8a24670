//! Terminal output helpers

use serde::Serialize;
use tailnet_membership::{MembershipId, MembershipState, PendingDrift, PlannedCall};

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {message}");
    } else {
        println!("OK: {message}");
    }
}

/// Print a warning message (yellow)
pub fn print_warning(message: &str) {
    if use_color() {
        eprintln!("\x1b[33mWarning:\x1b[0m {message}");
    } else {
        eprintln!("Warning: {message}");
    }
}

/// Print a key-value pair with consistent formatting
pub fn print_key_value(key: &str, value: &str) {
    if use_color() {
        println!("  \x1b[1m{key}:\x1b[0m {value}");
    } else {
        println!("  {key}: {value}");
    }
}

/// Print a numbered list under a title, if there is anything to list.
pub fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}:");
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", i + 1, item);
    }
}

/// JSON view of a membership.
#[derive(Debug, Serialize)]
pub struct MembershipOutput {
    pub id: String,
    pub login_name: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drift: Vec<String>,
}

impl MembershipOutput {
    pub fn new(id: &MembershipId, state: &MembershipState) -> Self {
        Self {
            id: id.to_string(),
            login_name: id.login_name().to_string(),
            state: state.label(),
            role: state.role().map(str::to_string),
            invite_id: state.invitation_id().map(str::to_string),
            user_id: state.user_id().map(str::to_string),
            planned: Vec::new(),
            applied: Vec::new(),
            drift: Vec::new(),
        }
    }

    pub fn with_planned(mut self, calls: &[PlannedCall]) -> Self {
        self.planned = calls.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_applied(mut self, calls: &[PlannedCall]) -> Self {
        self.applied = calls.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_drift(mut self, drift: &[PendingDrift]) -> Self {
        self.drift = drift.iter().map(ToString::to_string).collect();
        self
    }

    /// Print as pretty JSON or as key-value lines.
    pub fn print(&self, json: bool) -> crate::error::CliResult<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        println!();
        print_key_value("ID", &self.id);
        print_key_value("State", self.state);
        if let Some(role) = &self.role {
            print_key_value("Role", role);
        }
        if let Some(invite_id) = &self.invite_id {
            print_key_value("Invite ID", invite_id);
        }
        if let Some(user_id) = &self.user_id {
            print_key_value("User ID", user_id);
        }
        print_list("Planned", &self.planned);
        print_list("Applied", &self.applied);
        println!();
        Ok(())
    }
}
