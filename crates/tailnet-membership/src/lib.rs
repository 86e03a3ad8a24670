//! Tailnet membership reconciliation
//!
//! Reconciles one identity's membership in a tailnet against the directory
//! API, which offers only pending invites, user records and user actions with
//! no transactions across them.
//!
//! An identity resolves to exactly one [`MembershipState`]:
//!
//! ```text
//! Absent --invite--> Pending --(accepted remotely)--> Active
//! Active --suspend--> Disabled --restore--> Active
//! Pending --delete--> Absent
//! Active|Disabled --remove--> Absent
//! Active|Disabled --downgrade--> Disabled, role member
//! ```
//!
//! [`MembershipEngine`] drives the transitions. [`plan_ensure`] and
//! [`plan_release`] compute the writes without issuing them.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tailnet_directory::{DirectoryConfig, Role, TailnetClient};
//! use tailnet_membership::{DesiredMembership, MembershipEngine, OperationContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DirectoryConfig::with_api_key("example.com", "tskey-api-...");
//! let engine = MembershipEngine::new(Arc::new(TailnetClient::new(&config)?));
//!
//! let ctx = OperationContext::background().with_timeout(Duration::from_secs(60));
//! let desired = DesiredMembership::new("bob@example.com").with_role(Role::Admin);
//! let outcome = engine.ensure(&ctx, &desired).await?;
//! println!("{} is {}", engine.membership_id(&desired.validate()?), outcome.state);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod desired;
pub mod engine;
pub mod error;
pub mod identity;
pub mod plan;
pub mod state;

pub use context::{Interruption, OperationContext};
pub use desired::{DesiredMembership, RemovalPolicy, MAX_LOGIN_NAME_LEN};
pub use engine::{EnsureOutcome, ImportedMembership, MembershipEngine, ReleaseOutcome};
pub use error::{CallFailure, MembershipError, MembershipResult};
pub use identity::{LoginName, MembershipId};
pub use plan::{plan_ensure, plan_release, EnsurePlan, PendingDrift, PlannedCall, ReleasePlan};
pub use state::{MembershipState, Standing};
