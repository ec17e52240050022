//! Stage-layered YAML configuration.
//!
//! A configuration root holds one directory per stage:
//!
//! ```text
//! configuration/
//!   defaults/   always loaded
//!     app.yaml        defaults: { ... }
//!   test/       layered on top when STAGE=test
//!     app.yaml        test: { ... }
//! ```
//!
//! ## Merge Strategy
//! - Mappings: merged field by field, later stage wins on scalar collisions
//! - Sequences: deduplicated union, entries from the overlay are appended
//!   only when not already present
//!
//! ## Environment Variables
//! - `CONFIG_PATH` - Configuration root (default: `/app/configuration`)
//! - `STAGE` - Stage layered over `defaults` (default: `defaults`)

pub mod access;
mod dump;
mod loader;
mod merge;
pub mod node;
pub mod stage;

pub use dump::{DEFAULT_INDENT, DEFAULT_INLINE, DumpOptions};
pub use loader::{
    CONFIG_PATH_ENV, Configuration, ConfigurationAware, ConfigurationView, DEFAULT_STAGE,
    LoadOptions, STAGE_ENV, build,
};
pub use merge::{MAX_MERGE_DEPTH, distinct_merge, distinct_merge_all, merge};
pub use node::{ConfigMap, ConfigNode};
pub use stage::load_stage;
