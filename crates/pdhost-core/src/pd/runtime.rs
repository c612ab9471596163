//! Runtime seam - the interpreter's process-global entry points
//!
//! [`Environment`](super::Environment) talks to the interpreter only through
//! [`Runtime`]. The [`HeadlessRuntime`] runs in-process without libpd and
//! records what it was asked to do; with the `libpd` feature the
//! environment forwards to libpd instead.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::error::PdResult;

/// Interpreter version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdVersion {
    pub major: u32,
    pub minor: u32,
    pub bugfix: u32,
}

impl fmt::Display for PdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.bugfix)
    }
}

/// Identifier of an interpreter instance inside a runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pd-{}", self.0)
    }
}

/// Outbound MIDI message
///
/// Field order and ranges follow libpd's `libpd_*` MIDI senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: i32, pitch: i32, velocity: i32 },
    ControlChange { channel: i32, controller: i32, value: i32 },
    ProgramChange { channel: i32, value: i32 },
    PitchBend { channel: i32, value: i32 },
    AfterTouch { channel: i32, value: i32 },
    PolyAfterTouch { channel: i32, pitch: i32, value: i32 },
    Byte { port: i32, byte: i32 },
    SysEx { port: i32, byte: i32 },
    SysRealtime { port: i32, byte: i32 },
}

/// Process-global interpreter operations
///
/// Implementations must tolerate calls from any thread; the environment
/// serializes the ones that mutate global state.
pub trait Runtime: Send + Sync {
    /// One-time global initialization
    fn init(&self);

    /// Global teardown, called once after the last instance is gone
    fn clear(&self);

    fn version(&self) -> PdVersion;

    fn add_to_search_path(&self, path: &Path) -> PdResult<()>;

    fn clear_search_path(&self);

    fn new_instance(&self) -> PdResult<InstanceId>;

    fn free_instance(&self, id: InstanceId);

    /// Make `id` the instance subsequent interpreter calls act on
    fn set_current_instance(&self, id: InstanceId);

    /// Send a float to a named receiver in the current instance
    fn send_float(&self, receiver: &str, value: f32) -> PdResult<()>;

    fn send_midi(&self, message: MidiMessage);
}

/// A call the [`HeadlessRuntime`] received
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    Init,
    Clear,
    AddSearchPath(PathBuf),
    ClearSearchPath,
    NewInstance(InstanceId),
    FreeInstance(InstanceId),
    SetCurrentInstance(InstanceId),
    SendFloat { receiver: String, value: f32 },
    Midi(MidiMessage),
}

/// In-process runtime without an interpreter behind it
///
/// Keeps the observable global state (search path, live instances,
/// current instance) and a log of every call.
#[derive(Debug, Default)]
pub struct HeadlessRuntime {
    calls: Mutex<Vec<RuntimeCall>>,
    search_path: Mutex<Vec<PathBuf>>,
    live_instances: Mutex<Vec<InstanceId>>,
    current: Mutex<Option<InstanceId>>,
    next_instance: AtomicU32,
}

impl HeadlessRuntime {
    /// Version reported by the headless runtime
    pub const VERSION: PdVersion = PdVersion {
        major: 0,
        minor: 55,
        bugfix: 2,
    };

    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: RuntimeCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn search_path(&self) -> Vec<PathBuf> {
        self.search_path.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn live_instances(&self) -> Vec<InstanceId> {
        self.live_instances.lock().map(|i| i.clone()).unwrap_or_default()
    }

    pub fn current_instance(&self) -> Option<InstanceId> {
        self.current.lock().ok().and_then(|c| *c)
    }
}

impl Runtime for HeadlessRuntime {
    fn init(&self) {
        self.record(RuntimeCall::Init);
    }

    fn clear(&self) {
        self.record(RuntimeCall::Clear);
        if let Ok(mut live) = self.live_instances.lock() {
            live.clear();
        }
    }

    fn version(&self) -> PdVersion {
        Self::VERSION
    }

    fn add_to_search_path(&self, path: &Path) -> PdResult<()> {
        self.record(RuntimeCall::AddSearchPath(path.to_path_buf()));
        if let Ok(mut paths) = self.search_path.lock() {
            paths.push(path.to_path_buf());
        }
        Ok(())
    }

    fn clear_search_path(&self) {
        self.record(RuntimeCall::ClearSearchPath);
        if let Ok(mut paths) = self.search_path.lock() {
            paths.clear();
        }
    }

    fn new_instance(&self) -> PdResult<InstanceId> {
        let id = InstanceId(self.next_instance.fetch_add(1, Ordering::Relaxed) + 1);
        self.record(RuntimeCall::NewInstance(id));
        if let Ok(mut live) = self.live_instances.lock() {
            live.push(id);
        }
        Ok(id)
    }

    fn free_instance(&self, id: InstanceId) {
        self.record(RuntimeCall::FreeInstance(id));
        if let Ok(mut live) = self.live_instances.lock() {
            live.retain(|i| *i != id);
        }
        if let Ok(mut current) = self.current.lock() {
            if *current == Some(id) {
                *current = None;
            }
        }
    }

    fn set_current_instance(&self, id: InstanceId) {
        self.record(RuntimeCall::SetCurrentInstance(id));
        if let Ok(mut current) = self.current.lock() {
            *current = Some(id);
        }
    }

    fn send_float(&self, receiver: &str, value: f32) -> PdResult<()> {
        self.record(RuntimeCall::SendFloat {
            receiver: receiver.to_string(),
            value,
        });
        Ok(())
    }

    fn send_midi(&self, message: MidiMessage) {
        self.record(RuntimeCall::Midi(message));
    }
}
