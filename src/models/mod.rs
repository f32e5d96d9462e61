//! CPM domain models.
//!
//! Provides the core data types for activity networks: activities with
//! PERT duration estimates, the network that keeps them in dependency
//! order, and the flat records used by persistence collaborators.
//!
//! # Domain Mappings
//!
//! | u-cpm | Construction | Software | Events |
//! |-------|--------------|----------|--------|
//! | Activity | Work Package | Ticket | Preparation Step |
//! | ActivityNetwork | Project Plan | Release Plan | Event Plan |
//! | Deadline | Handover Date | Release Date | Event Day |

mod activity;
mod network;
mod record;

pub use activity::{Activity, ActivityId, DurationEstimate};
pub use network::{ActivityNetwork, NetworkId};
pub use record::{ActivityRecord, NetworkRecord};
