//! libpd-backed runtime
//!
//! Forwards the runtime seam to libpd through libpd-rs. libpd keeps its
//! globals per process, so only one of these should exist at a time; the
//! environment singleton guarantees that.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, Once};

use libpd_rs::functions::receive::on_print;
use libpd_rs::functions::send;
use libpd_rs::functions::verbose_print_state;
use libpd_rs::Pd;

use super::error::{PdError, PdResult};
use super::runtime::{InstanceId, MidiMessage, PdVersion, Runtime};

/// Console output is hooked into `log` once per process
static CONSOLE_HOOK: Once = Once::new();

/// Sample rate instances are configured with until the host reports its own
const DEFAULT_SAMPLE_RATE: i32 = 44100;

/// Version of the Pd sources libpd-rs bundles
const BUNDLED_VERSION: PdVersion = PdVersion {
    major: 0,
    minor: 54,
    bugfix: 1,
};

/// Level a line of interpreter console output is logged at
fn console_level(line: &str) -> log::Level {
    const ERROR_MARKERS: [&str; 3] = ["error", "can't", "couldn't"];
    const WARN_MARKERS: [&str; 2] = ["warning", "deprecated"];

    if ERROR_MARKERS.iter().any(|m| line.contains(m)) {
        log::Level::Error
    } else if WARN_MARKERS.iter().any(|m| line.contains(m)) {
        log::Level::Warn
    } else {
        log::Level::Info
    }
}

fn route_console_to_log() {
    CONSOLE_HOOK.call_once(|| {
        verbose_print_state(true);
        on_print(|line: &str| {
            let line = line.trim();
            if !line.is_empty() {
                log::log!(target: "pd", console_level(line), "{}", line);
            }
        });
    });
}

struct NativeInstance(Pd);

// libpd instances are only touched while the environment's context lock is
// held, and Pd itself holds nothing thread-affine.
unsafe impl Send for NativeInstance {}

/// Runtime backed by libpd
#[derive(Default)]
pub struct LibPdRuntime {
    instances: Mutex<HashMap<InstanceId, NativeInstance>>,
    next_instance: AtomicU32,
}

impl LibPdRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Runtime for LibPdRuntime {
    fn init(&self) {
        route_console_to_log();
    }

    fn clear(&self) {
        if let Ok(mut instances) = self.instances.lock() {
            instances.clear();
        }
    }

    fn version(&self) -> PdVersion {
        BUNDLED_VERSION
    }

    fn add_to_search_path(&self, path: &Path) -> PdResult<()> {
        libpd_rs::functions::add_to_search_paths(path).map_err(|e| PdError::SearchPathFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn clear_search_path(&self) {
        libpd_rs::functions::clear_search_paths();
    }

    fn new_instance(&self) -> PdResult<InstanceId> {
        let pd = Pd::init_and_configure(0, 2, DEFAULT_SAMPLE_RATE)
            .map_err(|e| PdError::InstanceCreationFailed(e.to_string()))?;
        let id = InstanceId(self.next_instance.fetch_add(1, Ordering::Relaxed) + 1);

        self.instances
            .lock()
            .map_err(|_| PdError::InstanceCreationFailed("instance table poisoned".to_string()))?
            .insert(id, NativeInstance(pd));

        Ok(id)
    }

    fn free_instance(&self, id: InstanceId) {
        if let Ok(mut instances) = self.instances.lock() {
            instances.remove(&id);
        }
    }

    fn set_current_instance(&self, id: InstanceId) {
        if let Ok(instances) = self.instances.lock() {
            if let Some(instance) = instances.get(&id) {
                instance.0.set_as_current();
            }
        }
    }

    fn send_float(&self, receiver: &str, value: f32) -> PdResult<()> {
        send::send_float_to(receiver, value).map_err(|e| PdError::SendFailed {
            msg_type: "float".to_string(),
            receiver: receiver.to_string(),
            reason: e.to_string(),
        })
    }

    fn send_midi(&self, message: MidiMessage) {
        let result = match message {
            MidiMessage::NoteOn { channel, pitch, velocity } => {
                send::send_note_on(channel, pitch, velocity)
            }
            MidiMessage::ControlChange { channel, controller, value } => {
                send::send_control_change(channel, controller, value)
            }
            MidiMessage::ProgramChange { channel, value } => {
                send::send_program_change(channel, value)
            }
            MidiMessage::PitchBend { channel, value } => send::send_pitch_bend(channel, value),
            MidiMessage::AfterTouch { channel, value } => send::send_after_touch(channel, value),
            MidiMessage::PolyAfterTouch { channel, pitch, value } => {
                send::send_poly_after_touch(channel, pitch, value)
            }
            MidiMessage::Byte { port, byte } => send::send_midi_byte(port, byte),
            MidiMessage::SysEx { port, byte } => send::send_sysex(port, byte),
            MidiMessage::SysRealtime { port, byte } => send::send_sys_realtime(port, byte),
        };
        if let Err(e) = result {
            log::warn!("Failed to send {:?}: {}", message, e);
        }
    }
}
