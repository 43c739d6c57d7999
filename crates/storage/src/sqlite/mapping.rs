use headcheck_core::model::HeadingLine;

use crate::repository::StorageError;

/// Which scope list a stored root belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootKind {
    Include,
    Exclude,
}

impl RootKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            RootKind::Include => "include",
            RootKind::Exclude => "exclude",
        }
    }
}

pub(crate) fn parse_root_kind(s: &str) -> Result<RootKind, StorageError> {
    match s {
        "include" => Ok(RootKind::Include),
        "exclude" => Ok(RootKind::Exclude),
        _ => Err(StorageError::Serialization(format!("invalid root kind: {s}"))),
    }
}

pub(crate) fn line_to_i64(line: HeadingLine) -> i64 {
    i64::from(line.value())
}

/// Lines outside the `u32` range cannot have been written by this crate.
pub(crate) fn line_from_i64(v: i64) -> Option<HeadingLine> {
    u32::try_from(v).ok().map(HeadingLine::new)
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Serialization("root position overflow".into()))
}
