#![crate_name = "smb_share_access"]
#![crate_type = "lib"]

//! # smb-share-access
//!
//! smb-share-access is a small helper to work with the root of an SMB/CIFS share as a guest user.
//! Every operation opens a fresh connection to the share, performs a single remote call and releases the
//! connection once done.
//!
//! ## Get started
//!
//! ```toml
//! smb-share-access = "^0.1"
//! ```
//!
//! these features are supported:
//!
//! - `no-log`: disable logging. By default, this library will log via the `log` crate.
//!
//! ### Share client
//!
//! ```rust,no_run
//! use smb_share_access::{Fetch, RetryPolicy, ShareClient, ShareConfig, SmbConnector};
//! use std::time::Duration;
//!
//! let client = ShareClient::new(
//!     ShareConfig::new("172.31.13.160")
//!         .share("guest")
//!         .local_dir("/tmp/share"),
//!     SmbConnector::default(),
//! )
//! .retry_policy(RetryPolicy::default().max_attempts(3).initial_delay(Duration::from_secs(1)));
//!
//! // write some text and read it back
//! client.write_text("remote_test2.txt", "works really well!").unwrap();
//! let text = client.fetch_text("remote_test2.txt").unwrap();
//! assert_eq!(text, "works really well!");
//! // list share root
//! for file in client.list_files().unwrap() {
//!     println!("{}", file.name());
//! }
//! ```
//!

#![doc(html_playground_url = "https://play.rust-lang.org")]

// -- crates
#[macro_use]
extern crate log;

mod client;
mod config;
mod error;
mod retry;
mod share;

pub use client::{Connector, ShareSession, SmbConnector, SmbSession};
pub use config::ShareConfig;
pub use error::{ShareError, ShareResult};
pub use retry::{CancelToken, RetryPolicy};
pub use share::{DeleteOutcome, Fetch, Fetched, ShareClient, StoreOutcome};

// -- utils
pub(crate) mod utils;
// -- mock
#[cfg(test)]
pub(crate) mod mock;
