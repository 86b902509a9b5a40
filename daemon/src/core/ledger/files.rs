use log::{debug, info};
use viewpay_common::{
    account::UserId,
    file::{FileRecord, LinkId},
    time::{get_current_time_in_millis, TimestampMillis},
};

use crate::{
    config::MAX_LIST_LIMIT,
    core::{error::LedgerError, ledger::Ledger, storage::Storage},
};

async fn add_file<S: Storage>(
    storage: &mut S,
    file: &FileRecord,
    now: TimestampMillis,
) -> Result<(), LedgerError> {
    let mut owner = storage
        .get_user(file.owner)
        .await?
        .ok_or(LedgerError::UserNotFound(file.owner))?;

    if storage.has_file(&file.link_id).await? {
        return Err(LedgerError::FileAlreadyExists(file.link_id.clone()));
    }

    storage.add_file(file).await?;

    owner.files_uploaded = owner.files_uploaded.saturating_add(1);
    owner.updated_at = now;
    storage.set_user(&owner).await
}

async fn remove_file<S: Storage>(
    storage: &mut S,
    file: &FileRecord,
    now: TimestampMillis,
) -> Result<(), LedgerError> {
    storage.delete_file(file).await?;

    if let Some(mut owner) = storage.get_user(file.owner).await? {
        owner.files_uploaded = owner.files_uploaded.saturating_sub(1);
        owner.updated_at = now;
        storage.set_user(&owner).await?;
    }

    Ok(())
}

impl<S: Storage> Ledger<S> {
    /// Register a monetized file under its short link id.
    pub async fn register_file(
        &self,
        owner: UserId,
        link_id: LinkId,
        file_name: String,
        file_type: String,
    ) -> Result<FileRecord, LedgerError> {
        let now = get_current_time_in_millis();
        let file = FileRecord::new(link_id, owner, file_name, file_type, now);

        {
            let mut storage = self.storage.write().await;
            storage.start_snapshot().await?;
            let res = add_file(&mut *storage, &file, now).await;
            Self::end_snapshot(&mut *storage, res).await?;
        }

        info!("File {} registered by {}", file.link_id, owner);
        Ok(file)
    }

    /// Delete a file, only its owner can do it.
    /// Returns `false` if the file doesn't exist or belongs to someone else.
    pub async fn delete_file(&self, link_id: &str, owner: UserId) -> Result<bool, LedgerError> {
        let now = get_current_time_in_millis();
        let mut storage = self.storage.write().await;

        let file = match storage.get_file(link_id).await? {
            Some(file) if file.owner == owner => file,
            Some(_) => {
                debug!("User {} tried to delete file {} it doesn't own", owner, link_id);
                return Ok(false);
            }
            None => return Ok(false),
        };

        storage.start_snapshot().await?;
        let res = remove_file(&mut *storage, &file, now).await;
        Self::end_snapshot(&mut *storage, res).await?;

        info!("File {} deleted by {}", link_id, owner);
        Ok(true)
    }

    pub async fn get_file(&self, link_id: &str) -> Result<Option<FileRecord>, LedgerError> {
        let storage = self.storage.read().await;
        storage.get_file(link_id).await
    }

    // Files of `owner`, most recent first
    pub async fn get_user_files(
        &self,
        owner: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<FileRecord>, LedgerError> {
        let storage = self.storage.read().await;
        storage
            .get_files_by_owner(owner, skip, limit.min(MAX_LIST_LIMIT))
            .await
    }

    pub async fn get_file_count(&self, owner: UserId) -> Result<u64, LedgerError> {
        let storage = self.storage.read().await;
        storage.count_files_by_owner(owner).await
    }
}
