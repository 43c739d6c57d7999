mod completion;
mod line;
mod scope_settings;

pub use completion::CompletionRecord;
pub use line::{HeadingLine, HeadingLineError};
pub use scope_settings::{ScopeSettings, ScopeSettingsDraft};
