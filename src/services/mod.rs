//! Service layer.
//!
//! `ledger` owns the single-active-record invariants; `moves` and
//! `scrappages` drive the request/approve/reject workflows on top of it;
//! `history` is the read-side projection. The rest is supporting CRUD.

pub mod catalog;
pub mod history;
pub mod inventories;
pub mod items;
pub mod ledger;
pub mod moves;
pub mod roles;
pub mod scrappages;
pub mod structure;
pub mod toolbooks;
pub mod users;
