//! Document review policy.
//!
//! Pure functions over a document's lifecycle status and the viewing user's
//! role. They decide which actions the UI offers; the backend re-checks every
//! one of them and its answer wins.

pub mod predicates;
pub mod role;
pub mod status;

pub use predicates::{
    can_approve, can_cancel_submission, can_create_new_version, can_edit_metadata, can_reject,
    can_submit_for_review, Affordances, DocumentAction,
};
pub use role::{resolve_role, DocumentRole};
pub use status::{DocumentStatus, UnknownStatus};
