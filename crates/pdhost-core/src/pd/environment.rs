//! Environment - process-wide access to the Pd runtime
//!
//! The interpreter keeps its search path, instance list and current
//! instance in process globals. [`Environment`] is the one owner of that
//! state: it initializes the runtime on first use, serializes search-path
//! and instance-lifecycle changes behind a global mutex, and tears the
//! runtime down once it has been shut down and the last handle and
//! instance are gone.
//!
//! Two locks live here:
//!
//! - the **global** lock, exposed through [`Environment::lock`], guards the
//!   search path and instance lifecycle. It is process-wide, like the state
//!   it protects.
//! - the **context** lock, taken by [`Instance::with_context`], serializes
//!   "make this instance current, then touch native memory" sequences
//!
//! They are separate so a host can hold the global lock across several
//! calls and still read GUI state in between.
//!
//! # Lifecycle
//!
//! ```text
//! Empty ──global()──► Live ──shutdown()──► ShutDown
//!                      │                      │
//!                      └─ global() clones     └─ global() = AlreadyTornDown
//! ```
//!
//! The live environment is held strongly, so dropping every handle between
//! two `global()` calls doesn't tear anything down. The runtime is cleared
//! once, after `shutdown()` and after the last outstanding handle drops.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{default_config_path, load_config, EnvironmentConfig};

use super::error::{PdError, PdResult};
use super::instance::Instance;
use super::runtime::{MidiMessage, PdVersion, Runtime};

/// The process environment
static GLOBAL: Registry = Registry::new();

/// Guards the interpreter's process globals (search path, instance list)
static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

fn lock_global() -> MutexGuard<'static, ()> {
    GLOBAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Slot {
    Empty,
    Live(Arc<Shared>),
    ShutDown,
}

/// Holder of a process-scoped environment
pub(crate) struct Registry {
    slot: Mutex<Slot>,
}

impl Registry {
    pub(crate) const fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// The live environment, created with `init` on first use
    fn acquire(&self, init: impl FnOnce() -> Arc<Shared>) -> PdResult<Arc<Shared>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Slot::Live(shared) => Ok(Arc::clone(shared)),
            Slot::ShutDown => Err(PdError::AlreadyTornDown),
            Slot::Empty => {
                let shared = init();
                *slot = Slot::Live(Arc::clone(&shared));
                Ok(shared)
            }
        }
    }

    /// Drop the registry's reference; returns whether one was live
    fn release(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *slot, Slot::ShutDown) {
            Slot::Live(_) => {
                log::info!("Pd environment shut down");
                true
            }
            Slot::Empty | Slot::ShutDown => false,
        }
    }
}

/// State shared by every environment handle and instance
pub(crate) struct Shared {
    runtime: Arc<dyn Runtime>,
    context: Mutex<()>,
    config: EnvironmentConfig,
}

impl Shared {
    fn new(runtime: Arc<dyn Runtime>, config: EnvironmentConfig) -> Arc<Self> {
        runtime.init();

        let shared = Arc::new(Self {
            runtime,
            context: Mutex::new(()),
            config,
        });

        {
            let _guard = shared.lock_global();
            for path in &shared.config.search_paths {
                if let Err(e) = shared.runtime.add_to_search_path(path) {
                    log::warn!("Skipping configured search path: {}", e);
                }
            }
        }

        log::info!(
            "Pd environment initialized (Pd {}, {} search paths)",
            shared.runtime.version(),
            shared.config.search_paths.len()
        );
        shared
    }

    pub(crate) fn runtime(&self) -> &dyn Runtime {
        self.runtime.as_ref()
    }

    pub(crate) fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub(crate) fn lock_global(&self) -> MutexGuard<'static, ()> {
        lock_global()
    }

    pub(crate) fn lock_context(&self) -> MutexGuard<'_, ()> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.runtime.clear();
        log::info!("Pd environment torn down");
    }
}

/// Send/receive binding addressed by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tie {
    name: String,
}

impl Tie {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Handle to the Pd runtime
///
/// Cheap to clone; all clones share one runtime.
#[derive(Clone)]
pub struct Environment {
    shared: Arc<Shared>,
}

impl Environment {
    /// The process environment
    ///
    /// The first call loads the user config from [`default_config_path`]
    /// and initializes the default runtime. Every later call returns the
    /// same environment until [`shutdown`](Self::shutdown), after which
    /// this returns [`PdError::AlreadyTornDown`].
    pub fn global() -> PdResult<Self> {
        Self::from_registry(&GLOBAL, || {
            Shared::new(default_runtime(), load_config(&default_config_path()))
        })
    }

    /// Release the process environment
    ///
    /// The runtime is cleared once the handles and instances still out
    /// there drop. Returns `false` if there was no live environment.
    pub fn shutdown() -> bool {
        GLOBAL.release()
    }

    fn from_registry(registry: &Registry, init: impl FnOnce() -> Arc<Shared>) -> PdResult<Self> {
        registry.acquire(init).map(|shared| Self { shared })
    }

    /// Environment over an explicit runtime, not registered as the process one
    ///
    /// A runtime must back at most one environment.
    pub fn with_runtime(runtime: Arc<dyn Runtime>, config: EnvironmentConfig) -> Self {
        Self {
            shared: Shared::new(runtime, config),
        }
    }

    /// Whether both handles share the same runtime
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn config(&self) -> &EnvironmentConfig {
        self.shared.config()
    }

    pub fn version(&self) -> PdVersion {
        self.shared.runtime().version()
    }

    pub fn add_to_search_path(&self, path: impl AsRef<Path>) -> PdResult<()> {
        let path = path.as_ref();
        let _guard = self.shared.lock_global();
        self.shared.runtime().add_to_search_path(path)?;
        log::debug!("Added {:?} to search path", path);
        Ok(())
    }

    pub fn clear_search_path(&self) {
        let _guard = self.shared.lock_global();
        self.shared.runtime().clear_search_path();
        log::debug!("Search path cleared");
    }

    /// Hold the global lock across several operations
    ///
    /// The lock is process-wide and isn't reentrant: while the guard
    /// lives, this thread must not call methods that take it again (search
    /// path changes, instance creation, dropping an instance). GUI reads
    /// and writes don't need it.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.shared.lock_global()
    }

    pub fn create_instance(&self) -> PdResult<Instance> {
        let id = {
            let _guard = self.shared.lock_global();
            self.shared.runtime().new_instance()?
        };
        log::info!("{}: Instance created", id);
        Ok(Instance::new(id, Arc::clone(&self.shared)))
    }

    /// Destroy `instance`; equivalent to dropping it
    pub fn free(&self, instance: Instance) {
        drop(instance);
    }

    pub fn create_tie(&self, name: impl Into<String>) -> Tie {
        let tie = Tie { name: name.into() };
        log::debug!("Created tie '{}'", tie.name);
        tie
    }

    /// Send to whichever instance is current
    ///
    /// Use [`Instance::send`] to address one instance.
    pub fn send(&self, tie: &Tie, value: f32) -> PdResult<()> {
        let _context = self.shared.lock_context();
        self.shared.runtime().send_float(&tie.name, value)
    }

    pub fn send_note(&self, channel: i32, pitch: i32, velocity: i32) {
        self.send_midi(MidiMessage::NoteOn { channel, pitch, velocity });
    }

    pub fn send_control_change(&self, channel: i32, controller: i32, value: i32) {
        self.send_midi(MidiMessage::ControlChange { channel, controller, value });
    }

    pub fn send_program_change(&self, channel: i32, value: i32) {
        self.send_midi(MidiMessage::ProgramChange { channel, value });
    }

    pub fn send_pitch_bend(&self, channel: i32, value: i32) {
        self.send_midi(MidiMessage::PitchBend { channel, value });
    }

    pub fn send_after_touch(&self, channel: i32, value: i32) {
        self.send_midi(MidiMessage::AfterTouch { channel, value });
    }

    pub fn send_poly_after_touch(&self, channel: i32, pitch: i32, value: i32) {
        self.send_midi(MidiMessage::PolyAfterTouch { channel, pitch, value });
    }

    pub fn send_midi_byte(&self, port: i32, byte: i32) {
        self.send_midi(MidiMessage::Byte { port, byte });
    }

    pub fn send_sys_ex(&self, port: i32, byte: i32) {
        self.send_midi(MidiMessage::SysEx { port, byte });
    }

    pub fn send_sys_realtime(&self, port: i32, byte: i32) {
        self.send_midi(MidiMessage::SysRealtime { port, byte });
    }

    fn send_midi(&self, message: MidiMessage) {
        log::trace!("MIDI out: {:?}", message);
        self.shared.runtime().send_midi(message);
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("version", &self.version())
            .field("config", self.config())
            .finish()
    }
}

#[cfg(feature = "libpd")]
fn default_runtime() -> Arc<dyn Runtime> {
    Arc::new(super::libpd::LibPdRuntime::new())
}

#[cfg(not(feature = "libpd"))]
fn default_runtime() -> Arc<dyn Runtime> {
    log::warn!("Built without libpd, using headless runtime");
    Arc::new(super::runtime::HeadlessRuntime::new())
}
