//! Entity structs for castaway domain documents.
//!
//! Only the season content documents get full typed entities: they are the
//! structured seed payload and benefit from compile-time field checking.
//! User/pool/membership/pick documents are built and validated as JSON at
//! the store boundary.

mod season;

pub use season::{Advantage, Contestant, Elimination, Season, Tribe, TribeWeek};
