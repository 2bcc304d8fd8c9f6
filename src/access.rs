// File: ./src/access.rs
//! Authorization gate in front of the reminder store.
//!
//! One gate is shared (via `Arc`) by every pipeline in the process, so widget
//! instances see the same cached state. All reads and writes of that state go
//! through a single async mutex, and the interactive prompt is shown at most
//! once per gate.
use crate::error::{StoreError, StoreResult};
use crate::fetcher::DEFAULT_FETCH_TIMEOUT;
use crate::model::AuthorizationState;
use crate::store::ReminderStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct GateState {
    last_known: Option<AuthorizationState>,
    prompted: bool,
}

pub struct AccessGate {
    store: Arc<dyn ReminderStore>,
    interactive: bool,
    timeout: Duration,
    state: Mutex<GateState>,
}

impl AccessGate {
    /// `interactive = false` models a context where no UI may be shown; the
    /// gate then never prompts.
    pub fn new(store: Arc<dyn ReminderStore>, interactive: bool) -> Self {
        Self {
            store,
            interactive,
            timeout: DEFAULT_FETCH_TIMEOUT,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Upper bound for each status query and access prompt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(&self, fut: impl Future<Output = T>) -> StoreResult<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| StoreError::TimedOut(self.timeout))
    }

    pub fn store(&self) -> &Arc<dyn ReminderStore> {
        &self.store
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Last status observed by this gate, if any.
    pub async fn cached_state(&self) -> Option<AuthorizationState> {
        self.state.lock().await.last_known
    }

    /// Resolves the current authorization, prompting once when undetermined.
    ///
    /// Denied/restricted/unknown are errors, and so is a store that does not
    /// answer within the timeout. `NotDetermined` comes back as `Ok` when the
    /// gate may not (or already did) prompt.
    pub async fn ensure_access(&self) -> StoreResult<AuthorizationState> {
        let mut state = self.state.lock().await;

        let status = self.bounded(self.store.authorization_status()).await?;
        state.last_known = Some(status);

        if status != AuthorizationState::NotDetermined {
            return check(status);
        }

        if !self.interactive {
            log::debug!("Authorization undetermined and prompting is not allowed");
            return Ok(status);
        }
        if state.prompted {
            return Ok(status);
        }

        state.prompted = true;
        log::info!("Requesting reminder access");
        let granted = self.bounded(self.store.request_access()).await??;
        let after = self.bounded(self.store.authorization_status()).await?;
        state.last_known = Some(after);
        log::info!("Access request answered: granted={}, status={:?}", granted, after);
        check(after)
    }

    /// For read paths: true only when items may be queried right now.
    pub async fn can_read(&self) -> StoreResult<bool> {
        Ok(self.ensure_access().await?.can_read())
    }

    /// For the write path: anything short of write permission is an error.
    pub async fn ensure_write_access(&self) -> StoreResult<()> {
        let status = self.ensure_access().await?;
        if status.can_write() {
            Ok(())
        } else {
            Err(StoreError::AccessDenied)
        }
    }
}

fn check(status: AuthorizationState) -> StoreResult<AuthorizationState> {
    match status {
        AuthorizationState::Denied => Err(StoreError::AccessDenied),
        AuthorizationState::Restricted => Err(StoreError::AccessRestricted),
        AuthorizationState::Unknown => Err(StoreError::AccessUnknown),
        other => Ok(other),
    }
}
