//! Instance - one interpreter instance and the patches loaded into it
//!
//! An instance owns the object graph its GUI objects point into and the
//! outbound message queue their setters write to. Writers never touch the
//! graph: they push onto the queue from whatever thread they run on, and
//! the thread driving the interpreter drains it with
//! [`Instance::process_messages`]. A write is therefore invisible to
//! readers until the next drain.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam::channel::{self, Receiver, Sender};

use crate::config::ThemeConfig;

use super::array::Array;
use super::atom::Atom;
use super::environment::{Shared, Tie};
use super::error::{PdError, PdResult};
use super::native::{
    AtomType, Canvas, IemWidget, NativeBody, NativeObject, ObjectGraph, ObjectId, Token,
};
use super::patch::Patch;
use super::runtime::InstanceId;

/// Value carried by a queued write
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Float(f32),
    Symbol(String),
    List(Vec<Atom>),
}

/// A write addressed to one object, waiting for the next drain
#[derive(Debug, Clone, PartialEq)]
pub struct DirectMessage {
    pub target: ObjectId,
    pub payload: Payload,
}

/// One interpreter instance
///
/// Created and freed through [`Environment`](super::Environment).
pub struct Instance {
    id: InstanceId,
    shared: Arc<Shared>,
    graph: Mutex<ObjectGraph>,
    tx: Sender<DirectMessage>,
    rx: Receiver<DirectMessage>,
}

impl Instance {
    pub(crate) fn new(id: InstanceId, shared: Arc<Shared>) -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            id,
            shared,
            graph: Mutex::new(ObjectGraph::new()),
            tx,
            rx,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Host theme defaults for widgets without native colors
    pub fn theme(&self) -> &ThemeConfig {
        &self.shared.config().theme
    }

    /// Global font name
    pub fn default_font(&self) -> &str {
        &self.shared.config().default_font
    }

    /// Make this the instance the interpreter acts on
    ///
    /// The current instance is process-global; prefer
    /// [`with_context`](Self::with_context), which holds the environment's
    /// context lock while it is in effect.
    pub fn set_this(&self) {
        self.shared.runtime().set_current_instance(self.id);
    }

    /// Run `f` on the object graph with this instance current
    ///
    /// All interpreter-context-sensitive access goes through here and is
    /// serialized across every instance of the environment.
    pub fn with_context<R>(&self, f: impl FnOnce(&mut ObjectGraph) -> R) -> R {
        let _context = self.shared.lock_context();
        self.set_this();
        let mut graph = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut graph)
    }

    /// Send `value` to the receiver bound to `tie` in this instance
    pub fn send(&self, tie: &Tie, value: f32) -> PdResult<()> {
        let _context = self.shared.lock_context();
        self.set_this();
        self.shared.runtime().send_float(tie.name(), value)
    }

    // ─────────────────────────────────────────────────────────────
    // Patches
    // ─────────────────────────────────────────────────────────────

    /// Add a top-level patch
    pub fn open_patch(&self, canvas: Canvas) -> PdResult<Patch<'_>> {
        let name = canvas.name.clone();
        let id = self.with_context(|graph| {
            graph.insert(None, NativeObject::canvas(Default::default(), canvas))
        })?;
        log::info!("{}: Opened patch '{}' ({})", self.id, name, id);
        Ok(Patch::new(id, self))
    }

    /// Remove a top-level patch and everything in it
    ///
    /// Handles into the patch go stale; GUI objects built from them turn
    /// inert.
    pub fn close_patch(&self, patch: ObjectId) -> PdResult<()> {
        self.with_context(|graph| {
            if !graph.roots().contains(&patch) {
                return Err(PdError::InvalidHandle(patch));
            }
            graph.remove(patch)
        })?;
        log::info!("{}: Closed patch {}", self.id, patch);
        Ok(())
    }

    /// Add an object to a canvas
    pub fn add_object(&self, parent: ObjectId, object: NativeObject) -> PdResult<ObjectId> {
        self.with_context(|graph| graph.insert(Some(parent), object))
    }

    /// Remove an object (and its contents, for canvases)
    pub fn remove_object(&self, id: ObjectId) -> PdResult<()> {
        self.with_context(|graph| graph.remove(id))
    }

    /// Top-level patches in open order
    pub fn patches(&self) -> Vec<Patch<'_>> {
        let roots = self.with_context(|graph| graph.roots().to_vec());
        roots.into_iter().map(|id| Patch::new(id, self)).collect()
    }

    /// View of the named table; empty if no such table exists
    pub fn array(&self, name: &str) -> Array<'_> {
        Array::new(name, self)
    }

    // ─────────────────────────────────────────────────────────────
    // Outbound queue
    // ─────────────────────────────────────────────────────────────

    /// Queue a write to `target`; safe from any thread, never blocks
    pub fn enqueue_direct_message(&self, target: ObjectId, payload: Payload) {
        // the receiver lives as long as self, so the channel can't be closed
        if self.tx.send(DirectMessage { target, payload }).is_err() {
            log::warn!("{}: Outbound queue closed, dropping write to {}", self.id, target);
        }
    }

    /// Writes queued since the last drain
    pub fn pending_messages(&self) -> usize {
        self.rx.len()
    }

    /// Drain the outbound queue into the object graph
    ///
    /// Called from the thread driving the interpreter, typically once per
    /// audio block. Returns how many writes took effect.
    pub fn process_messages(&self) -> usize {
        if self.rx.is_empty() {
            return 0;
        }
        let applied = self.with_context(|graph| {
            let mut applied = 0;
            while let Ok(message) = self.rx.try_recv() {
                if deliver(graph, &message) {
                    applied += 1;
                }
            }
            applied
        });
        log::trace!("{}: Drained outbound queue ({} applied)", self.id, applied);
        applied
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("pending", &self.rx.len())
            .finish()
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        let _guard = self.shared.lock_global();
        self.shared.runtime().free_instance(self.id);
        log::info!("{}: Instance freed", self.id);
    }
}

fn clamp_between(value: f32, a: f32, b: f32) -> f32 {
    value.clamp(a.min(b), a.max(b))
}

/// Scalar a list payload stands for when sent to a single-value widget
fn leading_float(payload: &Payload) -> Option<f32> {
    match payload {
        Payload::Float(f) => Some(*f),
        Payload::List(atoms) => atoms.first().and_then(Atom::as_float),
        Payload::Symbol(_) => None,
    }
}

/// Apply one write to its target, the way the widget reacts to the message
fn deliver(graph: &mut ObjectGraph, message: &DirectMessage) -> bool {
    let Some(object) = graph.get_mut(message.target) else {
        log::trace!("Dropping write to stale handle {}", message.target);
        return false;
    };

    let accepted = match &mut object.body {
        NativeBody::Iem(iem) => match leading_float(&message.payload) {
            Some(value) => {
                apply_iem_float(&mut iem.widget, value);
                true
            }
            None => false,
        },
        NativeBody::Gatom(gatom) => match (gatom.flavor, &message.payload) {
            (AtomType::Float, payload) => match leading_float(payload) {
                Some(value) => {
                    gatom.buffer.set_single(Token::Float(value));
                    true
                }
                None => false,
            },
            (AtomType::Symbol, Payload::Symbol(s)) => {
                gatom.buffer.set_single(Token::Symbol(s.clone()));
                true
            }
            (AtomType::Null, Payload::Float(f)) => {
                gatom.buffer.set_single(Token::Float(*f));
                true
            }
            (AtomType::Null, Payload::Symbol(s)) => {
                gatom.buffer.set_single(Token::Symbol(s.clone()));
                true
            }
            (AtomType::Null, Payload::List(atoms)) => {
                gatom.buffer.clear();
                for atom in atoms {
                    gatom.buffer.push(Token::from(atom));
                }
                true
            }
            _ => false,
        },
        _ => false,
    };

    if !accepted {
        log::trace!(
            "{} ({}) ignored {:?}",
            message.target,
            object.class_name,
            message.payload
        );
    }
    accepted
}

fn apply_iem_float(widget: &mut IemWidget, value: f32) {
    match widget {
        IemWidget::Bang { flashed } => *flashed = true,
        IemWidget::HorizontalSlider(slider) | IemWidget::VerticalSlider(slider) => {
            slider.value = clamp_between(value, slider.min, slider.max);
        }
        IemWidget::Toggle { on } => *on = value,
        IemWidget::Number { min, max, value: current } => {
            *current = clamp_between(value, *min, *max);
        }
        IemWidget::HorizontalRadio(radio) | IemWidget::VerticalRadio(radio) => {
            let last = (radio.number - 1).max(0);
            radio.on = (value as i32).clamp(0, last);
        }
        IemWidget::VuMeter { rms } => *rms = value,
        IemWidget::Panel => {}
    }
}
