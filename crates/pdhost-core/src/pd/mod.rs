//! Pure Data GUI introspection and control
//!
//! This module lets a host inspect and drive the graphical objects of Pd
//! patches running in an embedded interpreter: sliders, toggles, radios,
//! number and atom boxes, comments, arrays and graph-on-parent canvases.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Environment                             │
//! │  - Owns the runtime (libpd or headless)                      │
//! │  - Global lock: search path, instance lifecycle              │
//! │  - Context lock: "current instance" sequences                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌──────────────────┼──────────────────┐
//!          ▼                  ▼                  ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │    Instance     │ │    Instance     │ │    Instance     │
//! │                 │ │                 │ │                 │
//! │  ObjectGraph    │ │  ObjectGraph    │ │      ...        │
//! │  outbound queue │ │  outbound queue │ │                 │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │
//!          ▼
//!   Patch ──► GuiObject ──► Label / Array / nested Patch
//! ```
//!
//! Patches, GUI objects and arrays are non-owning views. They hold an
//! [`ObjectId`] into their instance's graph and borrow the [`Instance`],
//! so they can't outlive it; a view whose object was removed reads
//! defaults instead of dangling.
//!
//! # Threading
//!
//! Reads take the environment's context lock. Writes never do: they go on
//! the instance's outbound queue and land on the next
//! [`Instance::process_messages`], usually called once per audio block.
//!
//! # Example
//!
//! ```ignore
//! use pdhost_core::pd::{Environment, Kind};
//!
//! let env = Environment::global()?;
//! env.add_to_search_path("/usr/lib/pd/extra")?;
//!
//! let instance = env.create_instance()?;
//! let patch = instance.open_patch(canvas)?;
//!
//! for gui in patch.gui_objects() {
//!     if gui.kind() == Kind::HorizontalSlider {
//!         gui.set_value(gui.maximum());
//!     }
//! }
//! instance.process_messages();
//! ```

mod appearance;
mod array;
mod atom;
mod environment;
mod error;
mod gui;
mod instance;
mod label;
#[cfg(feature = "libpd")]
mod libpd;
pub mod native;
mod patch;
mod runtime;

// Re-export public API
pub use appearance::from_iem_color;
pub use array::Array;
pub use atom::Atom;
pub use environment::{Environment, Tie};
pub use error::{PdError, PdResult};
pub use gui::{classify, GuiObject, Kind};
pub use instance::{DirectMessage, Instance, Payload};
pub use label::Label;
#[cfg(feature = "libpd")]
pub use libpd::LibPdRuntime;
pub use native::{Bounds, ObjectId};
pub use patch::Patch;
pub use runtime::{HeadlessRuntime, InstanceId, MidiMessage, PdVersion, Runtime, RuntimeCall};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::{Environment, HeadlessRuntime};
    use crate::config::EnvironmentConfig;

    /// Fresh unregistered environment over a recording runtime
    pub(crate) fn headless_environment() -> (Environment, Arc<HeadlessRuntime>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let runtime = Arc::new(HeadlessRuntime::new());
        let env = Environment::with_runtime(runtime.clone(), EnvironmentConfig::default());
        (env, runtime)
    }
}
