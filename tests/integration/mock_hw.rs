//! Mock adapters for integration tests.
//!
//! Every mock hands out cheap clones that share state, so a test can keep
//! one handle while the sampler or watcher owns the other and still script
//! the hardware between calls.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use levelguard::app::events::AppEvent;
use levelguard::app::ports::{
    EventSink, GpioPort, HttpResponse, PinLevel, RemoteStatePort, StorageError, StoragePort,
    TimePort,
};
use levelguard::error::{PinId, RemoteError, SensorError};

// ── MockLadder ────────────────────────────────────────────────

#[derive(Default)]
struct LadderInner {
    pins: Vec<PinId>,
    steady: Vec<usize>,
    script: VecDeque<Vec<usize>>,
    scan: Vec<usize>,
    failing_pin: Option<PinId>,
    reads: usize,
}

/// Water ladder whose wet contacts are set per scan.
///
/// Contacts are addressed by their index in configuration order. Scripted
/// snapshots are used one per scan; afterwards the steady snapshot holds.
#[derive(Clone, Default)]
pub struct MockLadder {
    inner: Rc<RefCell<LadderInner>>,
}

impl MockLadder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wet the lowest `level` contacts.
    pub fn set_level(&self, level: usize) {
        self.inner.borrow_mut().steady = (0..level).collect();
    }

    /// Wet exactly the contacts at `indices`.
    pub fn set_active(&self, indices: &[usize]) {
        self.inner.borrow_mut().steady = indices.to_vec();
    }

    /// Queue one scan per level, each wetting the lowest `level` contacts.
    pub fn script_scans(&self, levels: impl IntoIterator<Item = usize>) {
        self.inner
            .borrow_mut()
            .script
            .extend(levels.into_iter().map(|l| (0..l).collect()));
    }

    pub fn fail_reads_on(&self, pin: Option<PinId>) {
        self.inner.borrow_mut().failing_pin = pin;
    }

    pub fn configured_pins(&self) -> Vec<PinId> {
        self.inner.borrow().pins.clone()
    }

    pub fn reads(&self) -> usize {
        self.inner.borrow().reads
    }
}

impl GpioPort for MockLadder {
    fn configure_input_pullup(&mut self, pin: PinId) -> Result<(), SensorError> {
        if pin < 0 {
            return Err(SensorError::GpioConfigFailed(pin));
        }
        let mut inner = self.inner.borrow_mut();
        if !inner.pins.contains(&pin) {
            inner.pins.push(pin);
        }
        Ok(())
    }

    fn read_digital(&mut self, pin: PinId) -> Result<PinLevel, SensorError> {
        let inner = &mut *self.inner.borrow_mut();
        if inner.failing_pin == Some(pin) {
            return Err(SensorError::GpioReadFailed(pin));
        }
        let idx = inner
            .pins
            .iter()
            .position(|&p| p == pin)
            .ok_or(SensorError::GpioReadFailed(pin))?;
        if idx == 0 {
            inner.scan = match inner.script.pop_front() {
                Some(next) => next,
                None => inner.steady.clone(),
            };
        }
        inner.reads += 1;
        Ok(if inner.scan.contains(&idx) {
            PinLevel::Active
        } else {
            PinLevel::Inactive
        })
    }
}

// ── CountingDelay ─────────────────────────────────────────────

/// Delay that returns immediately and adds up the requested time.
#[derive(Clone, Default)]
pub struct CountingDelay {
    total_ns: Rc<Cell<u64>>,
}

impl CountingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
    }
}

// ── ScriptedRemote ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout_ms: u32,
}

struct RemoteInner {
    replies: VecDeque<Result<HttpResponse, RemoteError>>,
    fallback: Result<HttpResponse, RemoteError>,
    requests: Vec<Request>,
}

/// Remote device answering from a queue, then from a fallback reply.
#[derive(Clone)]
pub struct ScriptedRemote {
    inner: Rc<RefCell<RemoteInner>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RemoteInner {
                replies: VecDeque::new(),
                fallback: Err(RemoteError::Transport),
                requests: Vec::new(),
            })),
        }
    }

    pub fn reply(&self, status: u16, body: &str) {
        self.inner.borrow_mut().replies.push_back(Ok(HttpResponse {
            status,
            body: body.to_owned(),
        }));
    }

    pub fn fail(&self, error: RemoteError) {
        self.inner.borrow_mut().replies.push_back(Err(error));
    }

    pub fn always_reply(&self, status: u16, body: &str) {
        self.inner.borrow_mut().fallback = Ok(HttpResponse {
            status,
            body: body.to_owned(),
        });
    }

    pub fn requests(&self) -> Vec<Request> {
        self.inner.borrow().requests.clone()
    }
}

impl Default for ScriptedRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStatePort for ScriptedRemote {
    fn fetch(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        timeout_ms: u32,
    ) -> Result<HttpResponse, RemoteError> {
        let inner = &mut *self.inner.borrow_mut();
        inner.requests.push(Request {
            url: url.to_owned(),
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            timeout_ms,
        });
        match inner.replies.pop_front() {
            Some(reply) => reply,
            None => inner.fallback.clone(),
        }
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn at(epoch_secs: i64) -> Self {
        let clock = Self::default();
        clock.set(epoch_secs);
        clock
    }

    pub fn set(&self, epoch_secs: i64) {
        self.now.set(epoch_secs);
    }

    pub fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + secs);
    }
}

impl TimePort for ManualClock {
    fn now_epoch_secs(&self) -> i64 {
        self.now.get()
    }
}

// ── MemStorage ────────────────────────────────────────────────

#[derive(Default)]
pub struct MemStorage {
    store: HashMap<String, Vec<u8>>,
    pub fail_reads: Option<StorageError>,
    pub fail_writes: Option<StorageError>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&Vec<u8>> {
        self.store.get(&format!("{}::{}", namespace, key))
    }

    pub fn put_raw(&mut self, namespace: &str, key: &str, data: &[u8]) {
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
    }
}

impl StoragePort for MemStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        if let Some(e) = self.fail_reads {
            return Err(e);
        }
        match self.store.get(&format!("{}::{}", namespace, key)) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if let Some(e) = self.fail_writes {
            return Err(e);
        }
        self.put_raw(namespace, key, data);
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
