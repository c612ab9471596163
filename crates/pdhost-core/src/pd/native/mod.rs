//! Native object model
//!
//! The interpreter-side structures GUI objects are decoded from, kept in a
//! generational handle table owned by each [`Instance`](crate::pd::Instance).

mod binbuf;
pub mod fonts;
mod graph;
mod object;

pub use binbuf::{AtomType, Binbuf, Token};
pub use graph::{ObjectGraph, ObjectId};
pub use object::{
    Bounds, Canvas, CanvasEnvironment, GArray, Gatom, IemGui, IemWidget, NativeBody,
    NativeObject, Radio, Slider, CANVAS_DEFAULT_FONT_SIZE, EMPTY_LABEL, IEM_DEFAULT_FONT_SIZE,
};
