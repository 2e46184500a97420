//! # vsts-client
//!
//! Async client for the Azure DevOps / VSTS work item tracking REST API.
//!
//! - Projects, work item types, areas and iterations
//! - Work items: create, update, move, link, tag, attach, comment
//! - WIQL queries, fields, teams and test plans
//! - JSON Patch documents for work item edits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vsts_client::VstsClient;
//! use vsts_client::constants::{LinkType, system_fields};
//! use vsts_client::patch::{PatchDocument, PatchOperation};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = VstsClient::new("dev.azure.com/contoso", "my-pat")?;
//!
//! let mut doc = PatchDocument::new();
//! doc.add(PatchOperation::add(system_fields::TITLE, "Flying car")?);
//! let feature = client.create_workitem("Contoso", "Feature", &doc, false).await?;
//!
//! let mut doc = PatchDocument::new();
//! doc.add(PatchOperation::add(system_fields::TITLE, "Wings")?);
//! let story = client.create_workitem("Contoso", "User Story", &doc, false).await?;
//!
//! if let (Some(story_id), Some(feature_id)) = (story.id.value(), feature.id.value()) {
//!     client.add_link(*story_id, *feature_id, LinkType::Parent, "").await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod patch;

pub use api::VstsClient;
pub use config::Config;
pub use error::{Result, VstsError};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
