// SPDX-License-Identifier: GPL-3.0-only

//! Ordered policy chain over the launch call site
//!
//! Policies run in registration order on every dispatch. Dispatch iterates
//! a snapshot of the list, so registering or unregistering concurrently
//! with an in-flight dispatch is safe and never corrupts the iteration.

use crate::errors::HookError;
use crate::provider::{CallSite, InterceptionProvider, LaunchResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One value in a launch request's auxiliary payload
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraValue {
    Int(i64),
    Flag(bool),
    Text(String),
}

/// Auxiliary typed payload carried by a launch request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extras(HashMap<String, ExtraValue>);

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ExtraValue) {
        self.0.insert(key.into(), value);
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(ExtraValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(ExtraValue::Flag(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ExtraValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// A "start a new screen" request observed at the armed launch site
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Action string naming what the caller wants started
    pub action: String,
    /// Identity of the requesting component
    pub caller: String,
    /// Id the host uses to route the eventual result back to the caller
    pub correlation_id: Uuid,
    /// Destination the caller expects the result written to, if any
    pub output: Option<PathBuf>,
    pub extras: Extras,
}

impl LaunchRequest {
    pub fn new(action: impl Into<String>, caller: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            caller: caller.into(),
            correlation_id: Uuid::new_v4(),
            output: None,
            extras: Extras::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: ExtraValue) -> Self {
        self.extras.insert(key, value);
        self
    }
}

/// A single policy's verdict on a launch request
#[derive(Debug, Clone)]
pub enum Decision {
    /// Not interested; let the next policy look
    Pass,
    /// Suppress the real call; no result for the original call site yet
    Veto,
    /// Suppress the real call and hand this result back instead
    Replace(LaunchResult),
}

/// What the host glue should do after running the chain
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Every policy passed; perform the real call
    Proceed,
    /// A policy vetoed the call
    Vetoed,
    /// A policy supplied the result directly
    Replaced(LaunchResult),
}

/// A member of the interception chain
pub trait LaunchPolicy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Inspect a launch request and decide its fate
    fn on_launch(&self, request: &LaunchRequest) -> Result<Decision, HookError>;
}

struct ChainState {
    policies: Arc<Vec<Arc<dyn LaunchPolicy>>>,
    hook_armed: bool,
}

/// Ordered, snapshot-on-dispatch policy list
pub struct InterceptionChain {
    state: Mutex<ChainState>,
    provider: Arc<dyn InterceptionProvider>,
}

impl InterceptionChain {
    pub fn new(provider: Arc<dyn InterceptionProvider>) -> Self {
        Self {
            state: Mutex::new(ChainState {
                policies: Arc::new(Vec::new()),
                hook_armed: false,
            }),
            provider,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a policy once; registering the same instance again is a no-op
    ///
    /// The launch hook is armed on the first registration. An arming
    /// failure is logged and the chain stays usable for direct dispatch.
    pub fn register(&self, policy: Arc<dyn LaunchPolicy>) {
        let mut state = self.lock();
        if state.policies.iter().any(|p| Arc::ptr_eq(p, &policy)) {
            debug!(policy = policy.name(), "Policy already registered");
            return;
        }
        if !state.hook_armed {
            state.hook_armed = true;
            if let Err(e) = self.provider.install_hook(CallSite::Launch) {
                warn!(error = %e, "Failed to arm launch call site");
            }
        }
        let mut next = state.policies.as_ref().clone();
        next.push(Arc::clone(&policy));
        state.policies = Arc::new(next);
        info!(policy = policy.name(), count = state.policies.len(), "Registered policy");
    }

    /// Remove a policy by instance identity, if present
    pub fn unregister(&self, policy: &Arc<dyn LaunchPolicy>) {
        let mut state = self.lock();
        if !state.policies.iter().any(|p| Arc::ptr_eq(p, policy)) {
            return;
        }
        let next: Vec<_> = state
            .policies
            .iter()
            .filter(|p| !Arc::ptr_eq(p, policy))
            .cloned()
            .collect();
        state.policies = Arc::new(next);
        info!(policy = policy.name(), count = state.policies.len(), "Unregistered policy");
    }

    pub fn len(&self) -> usize {
        self.lock().policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the chain over a request
    ///
    /// The first non-pass verdict terminates the chain. A policy that
    /// errors is recorded and treated as a pass; one misbehaving policy
    /// never aborts the dispatch.
    pub fn dispatch(&self, request: &LaunchRequest) -> DispatchOutcome {
        let snapshot = Arc::clone(&self.lock().policies);
        for policy in snapshot.iter() {
            match policy.on_launch(request) {
                Ok(Decision::Pass) => {}
                Ok(Decision::Veto) => {
                    info!(policy = policy.name(), action = %request.action, "Launch vetoed");
                    return DispatchOutcome::Vetoed;
                }
                Ok(Decision::Replace(result)) => {
                    info!(policy = policy.name(), action = %request.action, "Launch replaced");
                    return DispatchOutcome::Replaced(result);
                }
                Err(e) => {
                    warn!(
                        policy = policy.name(),
                        error = %e,
                        "Policy failed during dispatch, treating as pass"
                    );
                }
            }
        }
        DispatchOutcome::Proceed
    }
}
