//! GuiObject - classification and value access for patch widgets
//!
//! The interpreter exposes many widget families through a handful of
//! shared layouts: every atom box is a `gatom` told apart by its flavor,
//! and a canvas can be a subpatch, an array display or a graph-on-parent.
//! [`GuiObject`] decodes the family once, at construction, into a [`Kind`];
//! every accessor afterwards is a pure function of the kind and the
//! current native state.
//!
//! Accessors never fail. A null or stale handle, or a layout that doesn't
//! match the kind, yields the kind's zero value.
//!
//! # Reads and writes
//!
//! Reads decode native memory under the instance context. Writes
//! (`set_value`, `set_symbol`, `set_list`) only enqueue a message, so they
//! are safe from any thread but become visible after the instance drains
//! its queue:
//!
//! ```ignore
//! gui.set_value(0.5);
//! assert_ne!(gui.value(), 0.5);   // still queued
//! instance.process_messages();
//! assert_eq!(gui.value(), 0.5);
//! ```

use super::array::Array;
use super::atom::Atom;
use super::instance::{Instance, Payload};
use super::native::{AtomType, IemWidget, NativeBody, NativeObject, ObjectGraph, ObjectId, Token};
use super::patch::Patch;

/// Semantic widget kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Undefined,
    Bang,
    HorizontalSlider,
    VerticalSlider,
    Toggle,
    Number,
    VerticalRadio,
    HorizontalRadio,
    Panel,
    VuMeter,
    Comment,
    AtomNumber,
    AtomSymbol,
    AtomList,
    Array,
    GraphOnParent,
}

impl Kind {
    /// Kind implied by a class name alone
    ///
    /// `gatom` and `canvas` need their native flags to be refined and map
    /// to `Undefined` here.
    pub fn from_class_name(name: &str) -> Kind {
        match name {
            "bng" => Kind::Bang,
            "hsl" => Kind::HorizontalSlider,
            "vsl" => Kind::VerticalSlider,
            "tgl" => Kind::Toggle,
            "nbx" => Kind::Number,
            "vradio" => Kind::VerticalRadio,
            "hradio" => Kind::HorizontalRadio,
            "cnv" => Kind::Panel,
            "vu" => Kind::VuMeter,
            "text" => Kind::Comment,
            _ => Kind::Undefined,
        }
    }

    /// Widgets sharing the IEM visual config (font, colors, label offset)
    pub fn is_iem(self) -> bool {
        matches!(
            self,
            Kind::Bang
                | Kind::HorizontalSlider
                | Kind::VerticalSlider
                | Kind::Toggle
                | Kind::Number
                | Kind::VerticalRadio
                | Kind::HorizontalRadio
                | Kind::Panel
                | Kind::VuMeter
        )
    }

    pub fn is_atom(self) -> bool {
        matches!(self, Kind::AtomNumber | Kind::AtomSymbol | Kind::AtomList)
    }

    pub fn is_slider(self) -> bool {
        matches!(self, Kind::HorizontalSlider | Kind::VerticalSlider)
    }
}

/// Decode the kind of `handle`
///
/// Classifying a graph-on-parent canvas maps it on the interpreter side so
/// its contents show without an explicit redraw. Repeating this is
/// harmless.
pub fn classify(graph: &mut ObjectGraph, handle: ObjectId) -> Kind {
    let Some(object) = graph.get(handle) else {
        return Kind::Undefined;
    };

    let kind = match object.class_name.as_str() {
        "gatom" => match object.as_gatom().map(|g| g.flavor) {
            Some(AtomType::Float) => Kind::AtomNumber,
            Some(AtomType::Symbol) => Kind::AtomSymbol,
            Some(AtomType::Null) => Kind::AtomList,
            _ => Kind::Undefined,
        },
        "canvas" => {
            let is_array = graph
                .first_child(handle)
                .is_some_and(|child| child.class_name == "array");
            let is_graph = object.as_canvas().is_some_and(|c| c.is_graph);
            if is_array {
                Kind::Array
            } else if is_graph {
                Kind::GraphOnParent
            } else {
                Kind::Undefined
            }
        }
        name => Kind::from_class_name(name),
    };

    if kind == Kind::GraphOnParent {
        if let Some(canvas) = graph.get_mut(handle).and_then(NativeObject::as_canvas_mut) {
            canvas.visible = true;
        }
    }

    log::trace!("Classified {} as {:?}", handle, kind);
    kind
}

/// Widget view over a native object
///
/// Non-owning: the handle stays owned by the instance's object graph, and
/// the borrow of the [`Instance`] keeps the view from outliving it. A view
/// whose object has been removed goes inert rather than dangling.
#[derive(Debug, Clone, Copy)]
pub struct GuiObject<'a> {
    handle: ObjectId,
    patch: ObjectId,
    instance: &'a Instance,
    kind: Kind,
}

impl<'a> GuiObject<'a> {
    /// Wrap `handle`, living in canvas `patch`, and classify it
    pub fn new(handle: ObjectId, patch: ObjectId, instance: &'a Instance) -> Self {
        instance.with_context(|graph| Self::classify_in(graph, handle, patch, instance))
    }

    /// Construct while already holding the instance context
    pub(crate) fn classify_in(
        graph: &mut ObjectGraph,
        handle: ObjectId,
        patch: ObjectId,
        instance: &'a Instance,
    ) -> Self {
        Self {
            handle,
            patch,
            instance,
            kind: classify(graph, handle),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn handle(&self) -> ObjectId {
        self.handle
    }

    /// Handle of the canvas this object was discovered in
    pub fn patch_handle(&self) -> ObjectId {
        self.patch
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn is_iem(&self) -> bool {
        self.kind.is_iem()
    }

    pub fn is_atom(&self) -> bool {
        self.kind.is_atom()
    }

    /// Whether the handle still resolves
    pub fn is_valid(&self) -> bool {
        self.instance.with_context(|graph| graph.contains(self.handle))
    }

    fn widget<'g>(&self, graph: &'g ObjectGraph) -> Option<&'g IemWidget> {
        graph.get(self.handle)?.as_iem().map(|iem| &iem.widget)
    }

    // ─────────────────────────────────────────────────────────────
    // Numeric
    // ─────────────────────────────────────────────────────────────

    /// Number of discrete steps, 0 for continuous
    ///
    /// For atom boxes this is 1 when the box is one character wide and 0
    /// otherwise. A horizontal radio reports one step less than it has
    /// cells while a vertical radio reports its cell count; hosts depend on
    /// both as they are.
    pub fn number_of_steps(&self) -> usize {
        let kind = self.kind;
        self.instance.with_context(|graph| {
            let Some(object) = graph.get(self.handle) else {
                return 0;
            };
            match (kind, &object.body) {
                (Kind::Toggle, _) => 2,
                (Kind::HorizontalRadio, NativeBody::Iem(iem)) => match &iem.widget {
                    IemWidget::HorizontalRadio(radio) => (radio.number - 1).max(0) as usize,
                    _ => 0,
                },
                (Kind::VerticalRadio, NativeBody::Iem(iem)) => match &iem.widget {
                    IemWidget::VerticalRadio(radio) => radio.number.max(0) as usize,
                    _ => 0,
                },
                (Kind::AtomNumber, _) => usize::from(object.width_chars == 1),
                _ => 0,
            }
        })
    }

    pub fn minimum(&self) -> f32 {
        let kind = self.kind;
        self.instance.with_context(|graph| {
            let Some(object) = graph.get(self.handle) else {
                return 0.0;
            };
            match (&object.body, kind) {
                (NativeBody::Iem(iem), _) => match &iem.widget {
                    IemWidget::HorizontalSlider(s) if kind == Kind::HorizontalSlider => s.min,
                    IemWidget::VerticalSlider(s) if kind == Kind::VerticalSlider => s.min,
                    IemWidget::Number { min, .. } if kind == Kind::Number => *min,
                    _ => 0.0,
                },
                (NativeBody::Gatom(gatom), Kind::AtomNumber) => {
                    if has_drag_range(gatom.drag_low, gatom.drag_high) {
                        gatom.drag_low
                    } else {
                        f32::MIN
                    }
                }
                _ => 0.0,
            }
        })
    }

    pub fn maximum(&self) -> f32 {
        let kind = self.kind;
        self.instance.with_context(|graph| {
            let Some(object) = graph.get(self.handle) else {
                return 1.0;
            };
            match (&object.body, kind) {
                (_, Kind::Bang) => 1.0,
                (NativeBody::Iem(iem), _) => match &iem.widget {
                    IemWidget::HorizontalSlider(s) if kind == Kind::HorizontalSlider => s.max,
                    IemWidget::VerticalSlider(s) if kind == Kind::VerticalSlider => s.max,
                    IemWidget::Number { max, .. } if kind == Kind::Number => *max,
                    IemWidget::HorizontalRadio(r) if kind == Kind::HorizontalRadio => {
                        (r.number - 1) as f32
                    }
                    IemWidget::VerticalRadio(r) if kind == Kind::VerticalRadio => {
                        (r.number - 1) as f32
                    }
                    _ => 1.0,
                },
                (NativeBody::Gatom(gatom), Kind::AtomNumber) => {
                    if has_drag_range(gatom.drag_low, gatom.drag_high) {
                        gatom.drag_high
                    } else {
                        f32::MAX
                    }
                }
                _ => 1.0,
            }
        })
    }

    /// Current value
    ///
    /// Reading a bang consumes its flash: a triggered bang reads 1 once,
    /// then 0. Reading a float atom box repairs a malformed buffer to a
    /// single `0`.
    pub fn value(&self) -> f32 {
        let kind = self.kind;
        self.instance.with_context(|graph| {
            let Some(object) = graph.get_mut(self.handle) else {
                return 0.0;
            };
            match (&mut object.body, kind) {
                (NativeBody::Iem(iem), _) => match &mut iem.widget {
                    IemWidget::HorizontalSlider(s) if kind == Kind::HorizontalSlider => s.value,
                    IemWidget::VerticalSlider(s) if kind == Kind::VerticalSlider => s.value,
                    IemWidget::Toggle { on, .. } if kind == Kind::Toggle => *on,
                    IemWidget::Number { value, .. } if kind == Kind::Number => *value,
                    IemWidget::HorizontalRadio(r) if kind == Kind::HorizontalRadio => r.on as f32,
                    IemWidget::VerticalRadio(r) if kind == Kind::VerticalRadio => r.on as f32,
                    IemWidget::Bang { flashed } if kind == Kind::Bang => {
                        if std::mem::take(flashed) {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    _ => 0.0,
                },
                (NativeBody::Gatom(gatom), Kind::AtomNumber) => match gatom.normalized_token() {
                    Some(Token::Float(f)) => *f,
                    _ => 0.0,
                },
                _ => 0.0,
            }
        })
    }

    /// Queue a numeric write; ignored by comments and symbol boxes
    pub fn set_value(&self, value: f32) {
        if self.handle.is_null() || matches!(self.kind, Kind::Comment | Kind::AtomSymbol) {
            return;
        }
        self.instance
            .enqueue_direct_message(self.handle, Payload::Float(value));
    }

    /// Slider jumps to the click position instead of dragging from the knob
    pub fn jump_on_click(&self) -> bool {
        if !self.kind.is_slider() {
            return false;
        }
        self.instance.with_context(|graph| match self.widget(graph) {
            Some(IemWidget::HorizontalSlider(s) | IemWidget::VerticalSlider(s)) => !s.steady,
            _ => false,
        })
    }

    pub fn is_log_scale(&self) -> bool {
        if !self.kind.is_slider() {
            return false;
        }
        self.instance.with_context(|graph| match self.widget(graph) {
            Some(IemWidget::HorizontalSlider(s) | IemWidget::VerticalSlider(s)) => s.log_scale,
            _ => false,
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Symbol / list
    // ─────────────────────────────────────────────────────────────

    /// Text of a symbol box; empty for every other kind
    pub fn symbol(&self) -> String {
        if self.kind != Kind::AtomSymbol {
            return String::new();
        }
        self.instance.with_context(|graph| {
            match graph
                .get_mut(self.handle)
                .and_then(NativeObject::as_gatom_mut)
                .and_then(|g| g.normalized_token())
            {
                Some(Token::Symbol(s)) => s.clone(),
                _ => String::new(),
            }
        })
    }

    pub fn set_symbol(&self, value: &str) {
        if self.handle.is_null() || self.kind != Kind::AtomSymbol {
            return;
        }
        self.instance
            .enqueue_direct_message(self.handle, Payload::Symbol(value.to_string()));
    }

    /// Contents of a list box in buffer order
    ///
    /// Tokens that are neither float nor symbol come back as [`Atom::None`].
    pub fn list(&self) -> Vec<Atom> {
        if self.kind != Kind::AtomList {
            return Vec::new();
        }
        self.instance.with_context(|graph| {
            graph
                .get(self.handle)
                .and_then(NativeObject::as_gatom)
                .map(|g| g.buffer.tokens().iter().map(Token::to_atom).collect())
                .unwrap_or_default()
        })
    }

    pub fn set_list(&self, value: &[Atom]) {
        if self.handle.is_null() || self.kind != Kind::AtomList {
            return;
        }
        self.instance
            .enqueue_direct_message(self.handle, Payload::List(value.to_vec()));
    }

    /// Words of a comment joined by single spaces
    pub fn text(&self) -> String {
        if self.kind != Kind::Comment {
            return String::new();
        }
        self.instance.with_context(|graph| {
            let Some(buffer) = graph.get(self.handle).and_then(NativeObject::as_text) else {
                return String::new();
            };
            buffer
                .tokens()
                .iter()
                .filter_map(|token| match token {
                    Token::Float(f) => Some(f.to_string()),
                    Token::Symbol(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Nested structures
    // ─────────────────────────────────────────────────────────────

    /// Table displayed by an array canvas
    pub fn array(&self) -> Option<Array<'a>> {
        if self.kind != Kind::Array {
            return None;
        }
        let name = self.instance.with_context(|graph| {
            graph
                .first_child(self.handle)
                .and_then(NativeObject::as_array)
                .map(|a| a.name.clone())
        })?;
        Some(self.instance.array(&name))
    }

    /// Contents of a graph-on-parent canvas
    pub fn patch(&self) -> Option<Patch<'a>> {
        (self.kind == Kind::GraphOnParent).then(|| Patch::new(self.handle, self.instance))
    }
}

/// Atom boxes without a drag range are unbounded
fn has_drag_range(low: f32, high: f32) -> bool {
    low.abs() > f32::EPSILON || high.abs() > f32::EPSILON
}
