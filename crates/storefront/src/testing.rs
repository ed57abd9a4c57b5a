//! Test doubles for the kit's host-provided seams.
//!
//! Available under `cfg(test)` and with the `testing` feature.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub use crate::clock::ManualClock;
use crate::checkout::Navigator;
use crate::context::Storefront;
use crate::shopify::{Gateway, Operation, RequestError};
use crate::storage::MemoryStore;

/// Epoch the test clock starts at (2023-11-14T22:13:20Z).
pub const TEST_EPOCH_MILLIS: i64 = 1_700_000_000_000;

/// One recorded gateway call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub variables: Value,
}

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<Result<Value, RequestError>>,
    sticky: Option<Result<Value, RequestError>>,
}

/// A gateway answering from scripted responses keyed by operation name.
///
/// Queued responses are consumed first; after that the sticky response (if
/// any) answers every call. An unscripted operation fails with an
/// application error naming it.
#[derive(Debug, Default)]
pub struct MockGateway {
    scripts: Mutex<HashMap<&'static str, Script>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `operation` with `data`.
    #[must_use]
    pub fn with_data(self, operation: &Operation, data: Value) -> Self {
        self.respond(operation, Ok(data));
        self
    }

    /// Answer every call to `operation` with `response`.
    pub fn respond(&self, operation: &Operation, response: Result<Value, RequestError>) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation.name)
            .or_default()
            .sticky = Some(response);
    }

    /// Answer the next call to `operation` with `response`.
    pub fn respond_once(&self, operation: &Operation, response: Result<Value, RequestError>) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation.name)
            .or_default()
            .queued
            .push_back(response);
    }

    /// Number of calls made to `operation`.
    #[must_use]
    pub fn calls_to(&self, operation: &Operation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.operation == operation.name)
            .count()
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total number of calls.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn request(&self, operation: &Operation, variables: Value) -> Result<Value, RequestError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                operation: operation.name,
                variables,
            });

        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(script) = scripts.get_mut(operation.name) else {
            return Err(RequestError::application(format!(
                "no scripted response for {}",
                operation.name
            )));
        };
        script
            .queued
            .pop_front()
            .or_else(|| script.sticky.clone())
            .unwrap_or_else(|| {
                Err(RequestError::application(format!(
                    "scripted responses for {} exhausted",
                    operation.name
                )))
            })
    }
}

/// Something the kit asked the host to show or do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorEvent {
    Redirect(String),
    Alert(String),
}

/// A navigator that records instead of navigating.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavigatorEvent>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events, in order.
    #[must_use]
    pub fn events(&self) -> Vec<NavigatorEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// URLs redirected to.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                NavigatorEvent::Redirect(url) => Some(url),
                NavigatorEvent::Alert(_) => None,
            })
            .collect()
    }

    /// Alert messages shown.
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                NavigatorEvent::Alert(message) => Some(message),
                NavigatorEvent::Redirect(_) => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(NavigatorEvent::Redirect(url.to_string()));
    }

    fn alert(&self, message: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(NavigatorEvent::Alert(message.to_string()));
    }
}

/// A storefront over `gateway` with in-memory storage, a manual clock at
/// [`TEST_EPOCH_MILLIS`] and a five minute TTL.
#[must_use]
pub fn storefront(gateway: Arc<MockGateway>) -> (Storefront, Arc<MemoryStore>, Arc<ManualClock>) {
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(TEST_EPOCH_MILLIS));
    let storefront = Storefront::with_clock(
        gateway,
        storage.clone(),
        clock.clone(),
        Duration::from_millis(300_000),
    );
    (storefront, storage, clock)
}
