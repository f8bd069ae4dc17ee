pub(crate) mod explain;
pub mod rules;
pub(crate) mod subtype;

pub use subtype::{SubtypeChecker, SubtypeResult};
