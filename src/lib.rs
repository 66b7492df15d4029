//! Assume AWS IAM roles through STS directly, without the AWS SDK.
//!
//! This crate implements the two cooperating pieces needed to obtain
//! temporary AWS credentials from the Security Token Service:
//!
//! - [`RequestSigner`]: AWS Signature Version 4, specialized to the STS
//!   query protocol. A pure computation from request parameters and secret
//!   material to signed headers.
//! - [`RoleAssumer`]: builds the `AssumeRole` query request, signs it,
//!   performs one HTTPS round trip, and extracts the returned credential
//!   set from the XML response.
//!
//! Ambient capabilities (HTTP transport, credential environment) are
//! injected through a [`Context`], so production code runs against
//! [`ReqwestHttpSend`] and [`OsEnv`] while tests substitute canned
//! responses and fixed credentials.
//!
//! ## Example
//!
//! ```no_run
//! use sts_assume::{Context, OsEnv, ReqwestHttpSend, RoleAssumer};
//!
//! # async fn example() -> sts_assume::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//!
//! let assumer = RoleAssumer::new(&ctx, "arn:aws:iam::123456789012:role/demo")?
//!     .with_region("eu-west-1")
//!     .with_session_duration(900);
//!
//! let creds = assumer.assume_role(&ctx).await?;
//! println!("session expires at {}", creds.expiration);
//! # Ok(())
//! # }
//! ```
//!
//! Scheduling refresh before expiry, persisting credentials, and retry
//! policy all belong to the caller; every `assume_role` call is one
//! self-contained signed round trip.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod http_send;
pub use http_send::ReqwestHttpSend;

mod error;
pub use error::{Error, ErrorKind, Result};

mod credential;
pub use credential::TemporaryCredentials;

mod sign;
pub use sign::{RequestSigner, SignedHeaders};

mod assume;
pub use assume::RoleAssumer;

mod constants;
pub use constants::EMPTY_STRING_SHA256;
