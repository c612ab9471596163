//! Native object layouts
//!
//! These mirror the interpreter-side structures a GUI object is decoded
//! from. Several visually distinct widgets share one layout and are only
//! told apart by class name and internal flags, which is why
//! classification lives in [`crate::pd::gui`] rather than here.

use crate::pd::atom::Atom;

use super::binbuf::{AtomType, Binbuf, Token};
use super::graph::ObjectId;

/// Pd's default IEM font size
pub const IEM_DEFAULT_FONT_SIZE: i32 = 10;

/// Pd's default canvas font size
pub const CANVAS_DEFAULT_FONT_SIZE: i32 = 12;

/// Label symbol IEM widgets use to mean "no label"
pub const EMPTY_LABEL: &str = "empty";

/// Axis-aligned box in patch coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// A node of the object graph
#[derive(Debug, Clone)]
pub struct NativeObject {
    /// Declared class name (`hsl`, `gatom`, `canvas`, ...)
    pub class_name: String,

    /// Base bounding box
    pub bounds: Bounds,

    /// Box width in characters, 0 for automatic
    pub width_chars: i32,

    /// Canvas this object was inserted into
    pub owner: Option<ObjectId>,

    pub body: NativeBody,
}

/// Class-specific payload of a [`NativeObject`]
#[derive(Debug, Clone)]
pub enum NativeBody {
    Iem(IemGui),
    Gatom(Gatom),
    Canvas(Canvas),
    Array(GArray),
    Text(Binbuf),
    Opaque,
}

impl NativeObject {
    pub fn new(class_name: impl Into<String>, bounds: Bounds, body: NativeBody) -> Self {
        Self {
            class_name: class_name.into(),
            bounds,
            width_chars: 0,
            owner: None,
            body,
        }
    }

    /// IEM widget; the class name follows the widget variant
    pub fn iem(bounds: Bounds, iem: IemGui) -> Self {
        Self::new(iem.widget.class_name(), bounds, NativeBody::Iem(iem))
    }

    pub fn gatom(bounds: Bounds, gatom: Gatom) -> Self {
        Self::new("gatom", bounds, NativeBody::Gatom(gatom))
    }

    pub fn canvas(bounds: Bounds, canvas: Canvas) -> Self {
        Self::new("canvas", bounds, NativeBody::Canvas(canvas))
    }

    pub fn garray(array: GArray) -> Self {
        Self::new("array", Bounds::default(), NativeBody::Array(array))
    }

    pub fn comment(bounds: Bounds, text: &str) -> Self {
        let tokens = text
            .split_whitespace()
            .map(|word| Token::Symbol(word.to_string()))
            .collect();
        Self::new("text", bounds, NativeBody::Text(Binbuf::from_tokens(tokens)))
    }

    /// Any other class; carries no decodable state
    pub fn opaque(class_name: impl Into<String>, bounds: Bounds) -> Self {
        Self::new(class_name, bounds, NativeBody::Opaque)
    }

    pub fn with_width_chars(mut self, width_chars: i32) -> Self {
        self.width_chars = width_chars;
        self
    }

    pub fn as_iem(&self) -> Option<&IemGui> {
        match &self.body {
            NativeBody::Iem(iem) => Some(iem),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Binbuf> {
        match &self.body {
            NativeBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_gatom(&self) -> Option<&Gatom> {
        match &self.body {
            NativeBody::Gatom(gatom) => Some(gatom),
            _ => None,
        }
    }

    pub fn as_gatom_mut(&mut self) -> Option<&mut Gatom> {
        match &mut self.body {
            NativeBody::Gatom(gatom) => Some(gatom),
            _ => None,
        }
    }

    pub fn as_canvas(&self) -> Option<&Canvas> {
        match &self.body {
            NativeBody::Canvas(canvas) => Some(canvas),
            _ => None,
        }
    }

    pub fn as_canvas_mut(&mut self) -> Option<&mut Canvas> {
        match &mut self.body {
            NativeBody::Canvas(canvas) => Some(canvas),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&GArray> {
        match &self.body {
            NativeBody::Array(array) => Some(array),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────
// IEM widgets
// ─────────────────────────────────────────────────────────────

/// Visual config shared by all IEM widgets
///
/// Colors are packed `0xRRGGBB` as the interpreter stores them.
#[derive(Debug, Clone)]
pub struct IemGui {
    pub font: String,
    pub font_size: i32,
    pub background: i32,
    pub foreground: i32,
    pub label_color: i32,
    /// Unexpanded label symbol, may contain `$` references
    pub label: String,
    pub label_dx: i32,
    pub label_dy: i32,
    pub widget: IemWidget,
}

impl IemGui {
    /// Widget with Pd's default look: grey background, black ink, no label
    pub fn new(widget: IemWidget) -> Self {
        Self {
            font: crate::config::DEFAULT_FONT.to_string(),
            font_size: IEM_DEFAULT_FONT_SIZE,
            background: 0xFCFCFC,
            foreground: 0x000000,
            label_color: 0x000000,
            label: EMPTY_LABEL.to_string(),
            label_dx: 0,
            label_dy: -8,
            widget,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>, dx: i32, dy: i32) -> Self {
        self.label = label.into();
        self.label_dx = dx;
        self.label_dy = dy;
        self
    }

    pub fn with_colors(mut self, background: i32, foreground: i32, label: i32) -> Self {
        self.background = background;
        self.foreground = foreground;
        self.label_color = label;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>, size: i32) -> Self {
        self.font = font.into();
        self.font_size = size;
        self
    }
}

/// Per-widget state of an IEM object
#[derive(Debug, Clone, PartialEq)]
pub enum IemWidget {
    Bang { flashed: bool },
    HorizontalSlider(Slider),
    VerticalSlider(Slider),
    Toggle { on: f32 },
    Number { min: f32, max: f32, value: f32 },
    HorizontalRadio(Radio),
    VerticalRadio(Radio),
    VuMeter { rms: f32 },
    Panel,
}

impl IemWidget {
    /// Class name the interpreter registers this widget under
    pub fn class_name(&self) -> &'static str {
        match self {
            IemWidget::Bang { .. } => "bng",
            IemWidget::HorizontalSlider(_) => "hsl",
            IemWidget::VerticalSlider(_) => "vsl",
            IemWidget::Toggle { .. } => "tgl",
            IemWidget::Number { .. } => "nbx",
            IemWidget::HorizontalRadio(_) => "hradio",
            IemWidget::VerticalRadio(_) => "vradio",
            IemWidget::VuMeter { .. } => "vu",
            IemWidget::Panel => "cnv",
        }
    }

    pub fn toggle() -> Self {
        IemWidget::Toggle { on: 0.0 }
    }

    pub fn bang() -> Self {
        IemWidget::Bang { flashed: false }
    }

    pub fn number(min: f32, max: f32) -> Self {
        IemWidget::Number { min, max, value: 0.0 }
    }
}

/// Slider layout shared by `hsl` and `vsl`
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub min: f32,
    pub max: f32,
    pub value: f32,
    /// Knob stays put on click instead of jumping to the pointer
    pub steady: bool,
    pub log_scale: bool,
}

impl Slider {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            value: min,
            steady: true,
            log_scale: false,
        }
    }
}

/// Radio layout shared by `hradio` and `vradio`
#[derive(Debug, Clone, PartialEq)]
pub struct Radio {
    /// Number of cells
    pub number: i32,
    /// Selected cell
    pub on: i32,
}

impl Radio {
    pub fn new(number: i32) -> Self {
        Self { number, on: 0 }
    }
}

// ─────────────────────────────────────────────────────────────
// Atom boxes
// ─────────────────────────────────────────────────────────────

/// Atom box (`gatom`) layout
#[derive(Debug, Clone)]
pub struct Gatom {
    /// `Float`, `Symbol`, or `Null` for list boxes
    pub flavor: AtomType,
    pub buffer: Binbuf,
    pub drag_low: f32,
    pub drag_high: f32,
    /// Unexpanded label symbol, empty for none
    pub label: String,
    /// 0 left, 1 right, 2 above, 3 below
    pub where_label: u8,
}

impl Gatom {
    pub fn new(flavor: AtomType) -> Self {
        let buffer = match flavor {
            AtomType::Float => Binbuf::from_tokens(vec![Token::Float(0.0)]),
            AtomType::Symbol => Binbuf::from_tokens(vec![Token::Symbol(String::new())]),
            _ => Binbuf::new(),
        };
        Self {
            flavor,
            buffer,
            drag_low: 0.0,
            drag_high: 0.0,
            label: String::new(),
            where_label: 0,
        }
    }

    pub fn float() -> Self {
        Self::new(AtomType::Float)
    }

    pub fn symbol() -> Self {
        Self::new(AtomType::Symbol)
    }

    pub fn list() -> Self {
        Self::new(AtomType::Null)
    }

    pub fn with_range(mut self, low: f32, high: f32) -> Self {
        self.drag_low = low;
        self.drag_high = high;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>, where_label: u8) -> Self {
        self.label = label.into();
        self.where_label = where_label & 0b11;
        self
    }

    pub fn with_buffer(mut self, buffer: Binbuf) -> Self {
        self.buffer = buffer;
        self
    }

    /// First token after forcing the buffer into canonical shape
    ///
    /// Float and symbol boxes must hold exactly one token of their flavor;
    /// anything else is reset to `0` or the empty symbol.
    pub fn normalized_token(&mut self) -> Option<&Token> {
        match self.flavor {
            AtomType::Float if !self.buffer.is_single(AtomType::Float) => {
                self.buffer.set_single(Token::Float(0.0));
            }
            AtomType::Symbol if !self.buffer.is_single(AtomType::Symbol) => {
                self.buffer.set_single(Token::Symbol(String::new()));
            }
            _ => {}
        }
        self.buffer.first()
    }
}

// ─────────────────────────────────────────────────────────────
// Canvases and arrays
// ─────────────────────────────────────────────────────────────

/// `$` binding context of an abstraction or top-level patch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasEnvironment {
    pub dollar_zero: i32,
    pub args: Vec<Atom>,
}

/// Canvas (patch, subpatch, graph) layout
#[derive(Debug, Clone)]
pub struct Canvas {
    pub name: String,
    /// Children in creation order
    pub children: Vec<ObjectId>,
    /// Graph-on-parent flag
    pub is_graph: bool,
    pub font_size: i32,
    pub zoom: i32,
    /// Whether the canvas is mapped on the interpreter side
    pub visible: bool,
    /// Only abstractions and top-level patches carry their own environment
    pub env: Option<CanvasEnvironment>,
}

impl Canvas {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            is_graph: false,
            font_size: CANVAS_DEFAULT_FONT_SIZE,
            zoom: 1,
            visible: false,
            env: None,
        }
    }

    /// Top-level patch or abstraction with its own `$0` and arguments
    pub fn root(name: impl Into<String>, dollar_zero: i32, args: Vec<Atom>) -> Self {
        Self {
            env: Some(CanvasEnvironment { dollar_zero, args }),
            ..Self::new(name)
        }
    }

    pub fn graph_on_parent(mut self) -> Self {
        self.is_graph = true;
        self
    }

    pub fn with_font(mut self, font_size: i32, zoom: i32) -> Self {
        self.font_size = font_size;
        self.zoom = zoom;
        self
    }
}

/// Named float table
#[derive(Debug, Clone, PartialEq)]
pub struct GArray {
    pub name: String,
    pub data: Vec<f32>,
}

impl GArray {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            data: vec![0.0; size],
        }
    }
}
