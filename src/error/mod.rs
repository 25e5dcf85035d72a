//! Error handling for the mention engine and its hosts.
//!
//! Errors are plain enums with hand-written `Display` impls so callers can
//! match on the failing layer:
//! - [`ApiError`] for the remote user-search endpoint
//! - [`ConfigError`] for loading and validating configuration
//! - [`WingmanError`] as the crate-wide wrapper
//!
//! Search failures inside the suggestion fetcher never reach callers; they
//! are logged and degrade to an empty suggestion list.
//!
//! # Example
//!
//! ```rust
//! use wingman_mentions::error::{ApiError, Result, WingmanError};
//!
//! fn check_status(code: u16) -> Result<()> {
//!     if code >= 400 {
//!         return Err(ApiError::Status { code, message: "bad".into() }.into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(check_status(500), Err(WingmanError::Api(_))));
//! ```

pub mod kinds;

pub use kinds::{ApiError, ConfigError, Result, WingmanError};
