use async_trait::async_trait;
use viewpay_common::{
    time::TimestampMillis,
    view::{ViewEvent, ViewKey},
};

use crate::core::error::LedgerError;

// Sequence number of a stored view event
pub type ViewId = u64;

#[async_trait]
pub trait ViewProvider {
    // Time of the last credited view for this link and IP
    async fn get_last_view(&self, key: &ViewKey)
        -> Result<Option<TimestampMillis>, LedgerError>;

    async fn set_last_view(
        &mut self,
        key: &ViewKey,
        timestamp: TimestampMillis,
    ) -> Result<(), LedgerError>;

    // Append a credited view and return its sequence number
    async fn add_view_event(&mut self, event: &ViewEvent) -> Result<ViewId, LedgerError>;

    async fn get_view_event(&self, id: ViewId) -> Result<Option<ViewEvent>, LedgerError>;

    async fn count_views(&self) -> Result<u64, LedgerError>;
}
