//! Small helpers shared by the gateway crates. Keeping them here lets the
//! trust, capability, and sandbox crates stay independent of each other while
//! agreeing on how paths are expanded, how directory names are derived from
//! arbitrary keys, and how errors are rendered for users.

pub mod errors;
pub mod paths;
pub mod slug;

pub use errors::{DisplayErrorFormatter, ErrorFormatter};
pub use paths::{expand_home, normalize_path};
pub use slug::slugify_key;
