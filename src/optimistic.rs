//! Optimistic Update Module
//!
//! Local state that changes before the remote side confirms, with the
//! snapshot/apply/commit/rollback sequence implemented once.

use std::future::Future;

use tokio::sync::RwLock;

// == Failure Policy ==
/// What to do with the optimistic state when the commit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Restore the exact state seen before `apply`
    #[default]
    Rollback,
    /// Leave the optimistic state in place
    Keep,
}

// == Optimistic State ==
/// State guarded for optimistic transactions.
///
/// No lock is held while a commit is in flight, so readers observe the
/// optimistic state as soon as `apply` has run.
#[derive(Debug, Default)]
pub struct Optimistic<S> {
    state: RwLock<S>,
}

impl<S: Clone> Optimistic<S> {
    // == Constructor ==
    pub fn new(initial: S) -> Self {
        Self {
            state: RwLock::new(initial),
        }
    }

    // == Access ==
    /// A copy of the current state.
    pub async fn snapshot(&self) -> S {
        self.state.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Mutates the state outside of any transaction.
    pub async fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut *self.state.write().await)
    }

    // == Run ==
    /// Runs one optimistic transaction.
    ///
    /// 1. snapshot the state and apply the change under the write lock
    /// 2. release the lock and await `commit`
    /// 3. on failure, restore the snapshot (per `on_failure`) and return the error
    ///
    /// Concurrent transactions are not serialised: a rollback restores its
    /// own snapshot and overwrites anything applied since.
    pub async fn run<T, E, A, C, Fut>(&self, apply: A, commit: C, on_failure: OnFailure) -> Result<T, E>
    where
        A: FnOnce(&mut S),
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let snapshot = {
            let mut state = self.state.write().await;
            let snapshot = state.clone();
            apply(&mut state);
            snapshot
        };

        match commit().await {
            Ok(value) => Ok(value),
            Err(err) => {
                if on_failure == OnFailure::Rollback {
                    *self.state.write().await = snapshot;
                }
                Err(err)
            }
        }
    }
}
