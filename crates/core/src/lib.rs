#![forbid(unsafe_code)]

pub mod model;
pub mod scope;

pub use model::{CompletionRecord, HeadingLine, HeadingLineError, ScopeSettings, ScopeSettingsDraft};
pub use scope::{is_enabled, matches_root};
