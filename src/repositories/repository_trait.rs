use crate::errors::GarageDoorResult;

/// Defines the key-value interface the door controller uses to keep its last settled state across restarts
///
/// Keys are door names; `true` means the door last settled OPEN, `false` CLOSED.
pub trait StateStore: Send + Sync {
    /// Reads the last settled state stored under `key`
    ///
    /// # Returns
    ///
    /// * `Some(bool)` if a readable record exists
    /// * `None` if nothing was stored, or what was stored could not be read
    fn get(&self, key: &str) -> Option<bool>;

    /// Stores the settled state for `key`, replacing any previous value
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the value was written
    /// * `Err(GarageDoorError)` if the backend failed to write it
    fn set(&self, key: &str, open: bool) -> GarageDoorResult<()>;
}
