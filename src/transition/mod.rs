//! Modern discovery-protocol transition coordination.
//!
//! Two independent idempotent state machines sharing the annotation-backed
//! state record of [`state::TransitionState`]:
//!
//! - **Bootstrap** ([`bootstrap`]): one-time computation of the initial
//!   voting set for a cluster adopting the modern protocol, frozen until the
//!   protocol confirms it has formed around it.
//! - **Voting exclusions** ([`exclusions`]): temporary removal of nodes from
//!   the voting set ahead of planned master removal.

pub mod bootstrap;
pub mod exclusions;
pub mod state;

pub use bootstrap::{clear_bootstrap_annotation, setup_initial_masters};
pub use exclusions::{add_voting_exclusions, clear_voting_exclusions};
pub use state::TransitionState;
