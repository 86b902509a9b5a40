/// Direction for iteration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl From<Direction> for rocksdb::Direction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => rocksdb::Direction::Forward,
            Direction::Reverse => rocksdb::Direction::Reverse,
        }
    }
}

/// Iterator mode for snapshot and storage iteration
#[derive(Copy, Clone, Debug)]
pub enum IteratorMode<'a> {
    /// Whole column, lowest key first
    Start,
    /// Whole column, highest key first
    End,
    /// Start from a specific key (inclusive) and walk in the given direction
    From(&'a [u8], Direction),
    /// Only keys sharing this prefix
    WithPrefix(&'a [u8], Direction),
}

impl IteratorMode<'_> {
    pub fn direction(&self) -> Direction {
        match self {
            Self::Start => Direction::Forward,
            Self::End => Direction::Reverse,
            Self::From(_, direction) | Self::WithPrefix(_, direction) => *direction,
        }
    }

    // Would the disk iterator built from this mode yield `key`
    pub fn accepts(&self, key: &[u8]) -> bool {
        match self {
            Self::Start | Self::End => true,
            Self::From(start, Direction::Forward) => key >= *start,
            Self::From(start, Direction::Reverse) => key <= *start,
            Self::WithPrefix(prefix, _) => key.starts_with(prefix),
        }
    }
}
