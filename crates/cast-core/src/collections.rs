//! Collection name constants.
//!
//! These names are part of the durable persisted contract shared with the
//! application that reads this data. Renaming one is a breaking change that
//! must be expressed as an explicit migration, never a silent edit.

pub const USERS: &str = "users";
pub const POOLS: &str = "pools";
pub const POOL_MEMBERSHIPS: &str = "pool_memberships";
pub const PICKS: &str = "picks";
pub const SEASONS: &str = "seasons";

/// All collections the bootstrap declares, in ensure order.
pub const ALL: [&str; 5] = [USERS, POOLS, POOL_MEMBERSHIPS, PICKS, SEASONS];
