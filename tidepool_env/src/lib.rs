//! Tidepool Environment Abstraction Layer
//!
//! This crate isolates everything the stencil engine needs from the outside
//! world, so the same rank code runs against the in-process mesh, a
//! fault-injecting wrapper in tests, or any other message-passing substrate.
//!
//! # Core Concept
//!
//! A rank only ever talks to its environment through two seams:
//! - **Transport** (`Communicator`): point-to-point `send` / `recv` with
//!   integer tags and a rank/size query
//! - **Context** (`RunContext`): monotonic clock and seeded randomness
//!
//! Deriving all entropy from a single 64-bit seed makes any run reproducible
//! via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use tidepool_env::{Communicator, LocalFabric, Rank, Tag};
//!
//! let mut ranks = LocalFabric::new(2, 4);
//! let b = ranks.pop().unwrap();
//! let a = ranks.pop().unwrap();
//!
//! a.send(Rank(1), Tag(7), vec![1, 2, 3]).await?;
//! assert_eq!(b.recv(Rank(0), Tag(7)).await?, vec![1, 2, 3]);
//! ```

mod context;
mod network;
mod local;
mod types;
mod error;
mod system_impl;

pub use context::RunContext;
pub use network::{Communicator, NetworkController};
pub use local::{LocalComm, LocalFabric};
pub use types::{Envelope, Rank, Tag};
pub use error::EnvError;
pub use system_impl::SystemContext;
