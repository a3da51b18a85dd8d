//! In-memory simulated control plane.
//!
//! `SimHost` backs the test suite: it honors the same contract as a real
//! host (replace semantics, idempotent stop, unknown-name handling) and
//! additionally lets tests script the state sequence an endpoint reports
//! and count lifecycle calls.

use super::{EndpointSpec, EndpointState, HostControlPlane, PoolSpec};
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    pools: HashMap<String, PoolSpec>,
    endpoints: HashMap<String, EndpointSpec>,
    states: HashMap<String, EndpointState>,
    /// Scripted state sequences; `state()` pops from the front and keeps
    /// reporting the last value once the script is exhausted.
    scripts: HashMap<String, VecDeque<EndpointState>>,
    stop_calls: HashMap<String, usize>,
    start_calls: HashMap<String, usize>,
    commits: usize,
    fail_next_commit: bool,
}

/// Simulated host control plane. Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct SimHost {
    inner: Arc<Mutex<Inner>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the state sequence `state()` reports for `name`. The last
    /// value repeats once the sequence is exhausted.
    pub fn script_states(&self, name: &str, states: impl IntoIterator<Item = EndpointState>) {
        let mut inner = self.inner.lock();
        inner
            .scripts
            .insert(name.to_string(), states.into_iter().collect());
    }

    /// Overrides the current state of `name` directly.
    pub fn set_state(&self, name: &str, state: EndpointState) {
        self.inner.lock().states.insert(name.to_string(), state);
    }

    /// Makes the next `commit()` fail.
    pub fn fail_next_commit(&self) {
        self.inner.lock().fail_next_commit = true;
    }

    pub fn pool(&self, name: &str) -> Option<PoolSpec> {
        self.inner.lock().pools.get(name).cloned()
    }

    pub fn endpoint(&self, name: &str) -> Option<EndpointSpec> {
        self.inner.lock().endpoints.get(name).cloned()
    }

    pub fn pool_count(&self) -> usize {
        self.inner.lock().pools.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.inner.lock().endpoints.len()
    }

    pub fn stop_count(&self, name: &str) -> usize {
        self.inner.lock().stop_calls.get(name).copied().unwrap_or(0)
    }

    pub fn start_count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .start_calls
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn commit_count(&self) -> usize {
        self.inner.lock().commits
    }
}

#[async_trait]
impl HostControlPlane for SimHost {
    async fn find_pool(&self, name: &str) -> Result<Option<PoolSpec>> {
        Ok(self.inner.lock().pools.get(name).cloned())
    }

    async fn create_pool(&self, spec: &PoolSpec) -> Result<()> {
        self.inner
            .lock()
            .pools
            .insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn remove_pool(&self, name: &str) -> Result<()> {
        self.inner.lock().pools.remove(name);
        Ok(())
    }

    async fn find_endpoint(&self, name: &str) -> Result<Option<EndpointSpec>> {
        Ok(self.inner.lock().endpoints.get(name).cloned())
    }

    async fn create_endpoint(&self, spec: &EndpointSpec) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.endpoints.insert(spec.name.clone(), spec.clone());
        inner
            .states
            .insert(spec.name.clone(), EndpointState::Stopped);
        Ok(())
    }

    async fn remove_endpoint(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.endpoints.remove(name);
        inner.states.remove(name);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_next_commit {
            inner.fail_next_commit = false;
            return Err(Error::HostCommit("simulated commit failure".to_string()));
        }
        inner.commits += 1;
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.endpoints.contains_key(name) {
            return Err(Error::EndpointNotFound(name.to_string()));
        }
        *inner.start_calls.entry(name.to_string()).or_default() += 1;
        inner
            .states
            .insert(name.to_string(), EndpointState::Started);
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.endpoints.contains_key(name) {
            return Err(Error::EndpointNotFound(name.to_string()));
        }
        // Stop of an already-stopped endpoint stays a safe no-op, but the
        // call itself is recorded so tests can assert exactly-once behavior.
        *inner.stop_calls.entry(name.to_string()).or_default() += 1;
        inner
            .states
            .insert(name.to_string(), EndpointState::Stopped);
        Ok(())
    }

    async fn state(&self, name: &str) -> Result<EndpointState> {
        let mut inner = self.inner.lock();
        if !inner.endpoints.contains_key(name) {
            return Ok(EndpointState::Unknown);
        }
        if let Some(script) = inner.scripts.get_mut(name) {
            if let Some(next) = script.pop_front() {
                // Keep reporting the final scripted value after the script
                // runs dry.
                if script.is_empty() {
                    script.push_back(next);
                }
                inner.states.insert(name.to_string(), next);
                return Ok(next);
            }
        }
        Ok(inner
            .states
            .get(name)
            .copied()
            .unwrap_or(EndpointState::Unknown))
    }
}
