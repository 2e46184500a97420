//! Work item tracking REST API client.
//!
//! Layering, from the caller down:
//!
//! - [`VstsClient`] builds one request per operation and maps the response
//! - [`Dispatcher`] adds authentication, checks the status and decodes JSON
//! - [`Transport`] moves bytes; [`ReqwestTransport`] is the default
//!
//! ## Example
//!
//! ```rust,no_run
//! use vsts_client::VstsClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = VstsClient::new("dev.azure.com/contoso", "my-pat")?;
//!
//! let result = client
//!     .query("SELECT [System.Id] FROM WorkItems WHERE [System.State] = 'Active'", Some("Contoso"))
//!     .await?;
//! println!("Found {} work items", result.rows.work_item_ids().len());
//! # Ok(())
//! # }
//! ```

mod client;
mod credential;
mod dispatcher;
pub mod mappers;
mod transport;

pub use client::{ClientOptions, VstsClient};
pub use credential::{Credential, PatCredential};
pub use dispatcher::Dispatcher;
pub use transport::{
    DEFAULT_TIMEOUT, HttpRequest, HttpResponse, ProxySettings, ReqwestTransport, Transport,
};
