use super::Column;
use crate::core::storage::snapshot::Snapshot as GenericSnapshot;

/// Snapshot specialized to the RocksDB columns
pub type Snapshot = GenericSnapshot<Column>;
