//! Tidepool simulation driver
//!
//! This crate owns everything around the stencil engine: configuration,
//! random seeding of the ocean, the fault-injecting network wrapper, the
//! world that launches one task per rank, and reporting.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SimWorld                            │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ RunContext (seed, clock) → seed_ocean → rank 0       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                        │                            │
//! │  ┌────▼────┐              ┌────▼────┐                       │
//! │  │  Rank   │◄────────────►│  Rank   │     ...               │
//! │  │   #0    │  SimNetwork  │   #1    │                       │
//! │  └─────────┘  over mesh   └─────────┘                       │
//! │       │                                                     │
//! │  ┌────▼──────────────────────────────┐                      │
//! │  │ Reports / ASCII frames / summary  │                      │
//! │  └───────────────────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tidepool_sim::{SimConfig, SimWorld};
//! use tidepool_env::SystemContext;
//!
//! let config = SimConfig {
//!     procs: 6,
//!     ..Default::default()
//! };
//!
//! let world = SimWorld::new(config, SystemContext::shared(42))?;
//! let summary = world.run().await?;
//! ```

pub mod config;
mod error;
mod network;
pub mod render;
mod report;
pub mod seeding;
mod world;

pub use config::{ConfigError, SimConfig, Speed};
pub use error::SimError;
pub use network::{SimNetwork, SimNetworkController};
pub use render::render_ascii;
pub use report::{GenerationReport, RunSummary};
pub use seeding::{seed_ocean, CellMix};
pub use world::SimWorld;
