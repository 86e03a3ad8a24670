//! In-memory directory for engine tests.
//!
//! Keeps invites and users in memory, records every call, and can be told
//! to fail or hang on a given call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tailnet_directory::{
    DirectoryError, DirectoryGateway, DirectoryResult, Invitation, Role, User, UserMutation,
    UserStatus,
};

pub const SCOPE: &str = "example.com";

/// Call names used in the call log and for failure injection.
pub const LIST_USERS: &str = "list_users";
pub const LIST_INVITATIONS: &str = "list_invitations";
pub const CREATE_INVITATION: &str = "create_invitation";
pub const DELETE_INVITATION: &str = "delete_invitation";
pub const SET_ROLE: &str = "set_role";
pub const SUSPEND: &str = "suspend";
pub const RESTORE: &str = "restore";
pub const REMOVE: &str = "remove";

fn mutation_name(mutation: UserMutation) -> &'static str {
    match mutation {
        UserMutation::SetRole(_) => SET_ROLE,
        UserMutation::Suspend => SUSPEND,
        UserMutation::Restore => RESTORE,
        UserMutation::Remove => REMOVE,
    }
}

pub fn user(id: &str, login_name: &str, role: &str, status: UserStatus) -> User {
    User {
        id: id.to_string(),
        display_name: login_name.split('@').next().unwrap_or(login_name).to_string(),
        login_name: login_name.to_string(),
        role: role.to_string(),
        status,
        created: None,
        last_seen: None,
    }
}

pub fn invitation(id: &str, email: &str, role: &str) -> Invitation {
    Invitation {
        id: id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
    }
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    invitations: Vec<Invitation>,
    calls: Vec<String>,
    failures: HashMap<&'static str, u16>,
    hang_on: Option<&'static str>,
    hide_created: bool,
    next_id: u32,
}

/// A recording in-memory directory.
#[derive(Default)]
pub struct FakeDirectory {
    state: Mutex<State>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.state.lock().unwrap().users.push(user);
        self
    }

    pub fn with_invitation(self, invitation: Invitation) -> Self {
        self.state.lock().unwrap().invitations.push(invitation);
        self
    }

    /// Answer every `call` with `status` (409 becomes a conflict).
    pub fn fail_on(self, call: &'static str, status: u16) -> Self {
        self.state.lock().unwrap().failures.insert(call, status);
        self
    }

    /// Never answer `call`.
    pub fn hang_on(self, call: &'static str) -> Self {
        self.state.lock().unwrap().hang_on = Some(call);
        self
    }

    /// Accept invite creation without listing the new invite.
    pub fn hiding_created_invitations(self) -> Self {
        self.state.lock().unwrap().hide_created = true;
        self
    }

    /// Simulate the invitee accepting: the invite turns into an active user.
    pub fn accept_invitation(&self, email: &str, user_id: &str) {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .invitations
            .iter()
            .position(|i| i.email == email)
            .expect("invitation to accept");
        let invite = state.invitations.remove(pos);
        state
            .users
            .push(user(user_id, &invite.email, &invite.role, UserStatus::Active));
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that change remote state.
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list_"))
            .collect()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn invitations(&self) -> Vec<Invitation> {
        self.state.lock().unwrap().invitations.clone()
    }

    /// Log the call, then report an injected failure or a hang.
    async fn enter(&self, name: &'static str, entry: String) -> DirectoryResult<()> {
        let (failure, hang) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(entry);
            (state.failures.get(name).copied(), state.hang_on == Some(name))
        };
        if hang {
            std::future::pending::<()>().await;
        }
        match failure {
            Some(409) => Err(DirectoryError::Conflict {
                operation: name,
                body: "already exists".to_string(),
            }),
            Some(status) => Err(DirectoryError::Api {
                operation: name,
                status,
                body: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryGateway for FakeDirectory {
    fn scope(&self) -> &str {
        SCOPE
    }

    async fn list_invitations(&self) -> DirectoryResult<Vec<Invitation>> {
        self.enter(LIST_INVITATIONS, LIST_INVITATIONS.to_string())
            .await?;
        Ok(self.invitations())
    }

    async fn list_users(&self) -> DirectoryResult<Vec<User>> {
        self.enter(LIST_USERS, LIST_USERS.to_string()).await?;
        Ok(self.users())
    }

    async fn create_invitation(&self, email: &str, role: Role) -> DirectoryResult<Invitation> {
        self.enter(CREATE_INVITATION, format!("{CREATE_INVITATION} {email} {role}"))
            .await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = invitation(&format!("inv-{}", state.next_id), email, role.as_str());
        if !state.hide_created {
            state.invitations.push(created.clone());
        }
        Ok(created)
    }

    async fn delete_invitation(&self, invitation_id: &str) -> DirectoryResult<()> {
        self.enter(
            DELETE_INVITATION,
            format!("{DELETE_INVITATION} {invitation_id}"),
        )
        .await?;
        self.state
            .lock()
            .unwrap()
            .invitations
            .retain(|i| i.id != invitation_id);
        Ok(())
    }

    async fn mutate_user(&self, user_id: &str, mutation: UserMutation) -> DirectoryResult<()> {
        let name = mutation_name(mutation);
        let entry = match mutation {
            UserMutation::SetRole(role) => format!("{name} {user_id} {role}"),
            _ => format!("{name} {user_id}"),
        };
        self.enter(name, entry).await?;

        let mut state = self.state.lock().unwrap();
        if mutation == UserMutation::Remove {
            state.users.retain(|u| u.id != user_id);
            return Ok(());
        }
        // A missing user is not an error.
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            match mutation {
                UserMutation::SetRole(role) => user.role = role.as_str().to_string(),
                UserMutation::Suspend => user.status = UserStatus::Suspended,
                UserMutation::Restore => user.status = UserStatus::Active,
                UserMutation::Remove => {}
            }
        }
        Ok(())
    }
}
