use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::BoxFuture;
use crate::error::StorageError;
use crate::repository::{PauseScope, PausedRepository};

#[derive(Default)]
pub struct InMemoryPausedRepository {
    paused: Mutex<HashSet<(PauseScope, String)>>,
}

impl InMemoryPausedRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PausedRepository for InMemoryPausedRepository {
    fn pause<'a>(&'a self, scope: PauseScope, name: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move { Ok(self.paused.lock().await.insert((scope, name.to_string()))) })
    }

    fn resume<'a>(&'a self, scope: PauseScope, name: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move { Ok(self.paused.lock().await.remove(&(scope, name.to_string()))) })
    }

    fn is_paused<'a>(&'a self, scope: PauseScope, name: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move { Ok(self.paused.lock().await.contains(&(scope, name.to_string()))) })
    }
}
