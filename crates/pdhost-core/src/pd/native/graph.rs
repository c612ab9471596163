//! Object graph - handle table for interpreter-owned objects
//!
//! Every object of an instance lives in one slab. Handles are
//! index + generation pairs: removing an object bumps its slot's
//! generation, so a handle that outlived its object resolves to nothing
//! instead of aliasing whatever reuses the slot.

use std::fmt;

use crate::pd::atom::Atom;
use crate::pd::error::{PdError, PdResult};

use super::object::{CanvasEnvironment, GArray, NativeObject};

/// Non-owning handle to a [`NativeObject`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Handle that never resolves
    pub const NULL: ObjectId = ObjectId {
        index: u32::MAX,
        generation: 0,
    };

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "#null")
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    object: Option<NativeObject>,
}

/// Slab of native objects plus the list of top-level patches
#[derive(Debug, Default)]
pub struct ObjectGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<ObjectId>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.object.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `object` into `parent`, or as a top-level patch when `None`
    ///
    /// Fails if `parent` doesn't resolve to a canvas.
    pub fn insert(&mut self, parent: Option<ObjectId>, mut object: NativeObject) -> PdResult<ObjectId> {
        if let Some(parent) = parent {
            if self.get(parent).and_then(NativeObject::as_canvas).is_none() {
                return Err(PdError::InvalidHandle(parent));
            }
        }
        object.owner = parent;

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                ObjectId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                ObjectId { index, generation: 0 }
            }
        };

        match parent.and_then(|p| self.get_mut(p)).and_then(NativeObject::as_canvas_mut) {
            Some(canvas) => canvas.children.push(id),
            None => self.roots.push(id),
        }

        log::trace!("Inserted object {} into {:?}", id, parent);
        Ok(id)
    }

    /// Remove an object and, for canvases, everything inside it
    pub fn remove(&mut self, id: ObjectId) -> PdResult<()> {
        let object = self.take(id).ok_or(PdError::InvalidHandle(id))?;

        match object.owner.and_then(|p| self.get_mut(p)).and_then(NativeObject::as_canvas_mut) {
            Some(canvas) => canvas.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }

        let mut pending: Vec<ObjectId> = object
            .as_canvas()
            .map(|c| c.children.clone())
            .unwrap_or_default();
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.take(child) {
                if let Some(canvas) = removed.as_canvas() {
                    pending.extend(canvas.children.iter().copied());
                }
            }
        }

        log::trace!("Removed object {}", id);
        Ok(())
    }

    fn take(&mut self, id: ObjectId) -> Option<NativeObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(object)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&NativeObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut NativeObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    /// Top-level patches in open order
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Children of a canvas; empty for anything else
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.get(id)
            .and_then(NativeObject::as_canvas)
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    /// First child of a canvas
    pub fn first_child(&self, id: ObjectId) -> Option<&NativeObject> {
        self.children(id).first().and_then(|c| self.get(*c))
    }

    /// Look up a named table anywhere in the graph
    pub fn find_array(&self, name: &str) -> Option<&GArray> {
        self.slots
            .iter()
            .filter_map(|s| s.object.as_ref())
            .filter_map(NativeObject::as_array)
            .find(|a| a.name == name)
    }

    /// `$` environment governing `id`: its own, or the nearest enclosing one
    pub fn canvas_env(&self, id: ObjectId) -> Option<&CanvasEnvironment> {
        let mut current = Some(id);
        while let Some(cid) = current {
            let object = self.get(cid)?;
            if let Some(env) = object.as_canvas().and_then(|c| c.env.as_ref()) {
                return Some(env);
            }
            current = object.owner;
        }
        None
    }

    /// Expand `$0` and `$N` in `symbol` using the environment of `canvas`
    ///
    /// References that can't be resolved are kept verbatim.
    pub fn realize_dollar(&self, canvas: Option<ObjectId>, symbol: &str) -> String {
        if !symbol.contains('$') {
            return symbol.to_string();
        }
        let env = canvas.and_then(|c| self.canvas_env(c));

        let mut out = String::with_capacity(symbol.len());
        let mut chars = symbol.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            let resolved = digits.parse::<usize>().ok().and_then(|n| {
                let env = env?;
                if n == 0 {
                    Some(env.dollar_zero.to_string())
                } else {
                    match env.args.get(n - 1)? {
                        Atom::Float(f) => Some(f.to_string()),
                        Atom::Symbol(s) => Some(s.clone()),
                        Atom::None => None,
                    }
                }
            });
            match resolved {
                Some(text) => out.push_str(&text),
                None => {
                    out.push('$');
                    out.push_str(&digits);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pd::native::object::{Bounds, Canvas};

    fn patch_with_env() -> (ObjectGraph, ObjectId, ObjectId) {
        let mut graph = ObjectGraph::new();
        let root = graph
            .insert(
                None,
                NativeObject::canvas(
                    Bounds::default(),
                    Canvas::root("main", 1003, vec![Atom::Float(440.0), Atom::from("osc")]),
                ),
            )
            .unwrap();
        let sub = graph
            .insert(Some(root), NativeObject::canvas(Bounds::default(), Canvas::new("sub")))
            .unwrap();
        (graph, root, sub)
    }

    #[test]
    fn test_insert_tracks_children_and_roots() {
        let (graph, root, sub) = patch_with_env();
        assert_eq!(graph.roots(), &[root]);
        assert_eq!(graph.children(root), &[sub]);
        assert_eq!(graph.get(sub).unwrap().owner, Some(root));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_insert_into_non_canvas_fails() {
        let (mut graph, root, _) = patch_with_env();
        let bang = graph
            .insert(Some(root), NativeObject::opaque("print", Bounds::default()))
            .unwrap();
        let err = graph.insert(Some(bang), NativeObject::opaque("print", Bounds::default()));
        assert!(matches!(err, Err(PdError::InvalidHandle(id)) if id == bang));
    }

    #[test]
    fn test_stale_handle_after_remove() {
        let (mut graph, root, sub) = patch_with_env();
        graph.remove(sub).unwrap();
        assert!(!graph.contains(sub));
        assert!(graph.children(root).is_empty());

        // slot is reused under a new generation
        let again = graph
            .insert(Some(root), NativeObject::opaque("print", Bounds::default()))
            .unwrap();
        assert_ne!(again, sub);
        assert!(graph.get(sub).is_none());
        assert!(graph.remove(sub).is_err());
    }

    #[test]
    fn test_remove_is_recursive() {
        let (mut graph, root, sub) = patch_with_env();
        let leaf = graph
            .insert(Some(sub), NativeObject::opaque("osc~", Bounds::default()))
            .unwrap();
        graph.remove(root).unwrap();
        assert!(graph.is_empty());
        assert!(!graph.contains(leaf));
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn test_null_never_resolves() {
        let (graph, _, _) = patch_with_env();
        assert!(graph.get(ObjectId::NULL).is_none());
        assert_eq!(ObjectId::NULL.to_string(), "#null");
    }

    #[test]
    fn test_realize_dollar_walks_up_to_env() {
        let (graph, _, sub) = patch_with_env();
        assert_eq!(graph.realize_dollar(Some(sub), "$0-freq"), "1003-freq");
        assert_eq!(graph.realize_dollar(Some(sub), "$2 at $1 Hz"), "osc at 440 Hz");
        assert_eq!(graph.realize_dollar(Some(sub), "plain"), "plain");
    }

    #[test]
    fn test_realize_dollar_keeps_unresolved() {
        let (graph, _, sub) = patch_with_env();
        assert_eq!(graph.realize_dollar(Some(sub), "$5-x"), "$5-x");
        assert_eq!(graph.realize_dollar(Some(sub), "cost $"), "cost $");
        assert_eq!(graph.realize_dollar(None, "$0-x"), "$0-x");
    }
}
