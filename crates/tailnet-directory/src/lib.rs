//! Tailnet directory client
//!
//! A thin client over the three independent collections the directory API
//! exposes for membership management:
//!
//! - pending user invites (list, create, delete)
//! - user records (list)
//! - user actions (set role, suspend, restore, delete)
//!
//! Every call is a single remote request with no internal retry. A `404` on
//! the delete/action family is treated as success so teardown is idempotent.
//!
//! # Example
//!
//! ```no_run
//! use tailnet_directory::{DirectoryConfig, DirectoryGateway, TailnetClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DirectoryConfig::with_api_key("example.com", "tskey-api-...");
//! let client = TailnetClient::new(&config)?;
//!
//! for user in client.list_users().await? {
//!     println!("{} ({})", user.login_name, user.role);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;

pub use auth::DirectoryAuth;
pub use client::TailnetClient;
pub use config::{DirectoryConfig, DirectoryCredentials, DEFAULT_BASE_URL, DEFAULT_TAILNET};
pub use error::{DirectoryError, DirectoryResult};
pub use gateway::DirectoryGateway;
pub use models::{Invitation, Role, User, UserMutation, UserStatus};
