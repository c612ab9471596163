//! Patch - view over a canvas

use super::gui::{GuiObject, Kind};
use super::instance::Instance;
use super::native::{Bounds, NativeObject, ObjectId};

/// Thin, non-owning view of a canvas in an instance
///
/// Holds only a handle; if the canvas is removed the view goes inert.
#[derive(Debug, Clone, Copy)]
pub struct Patch<'a> {
    id: ObjectId,
    instance: &'a Instance,
}

impl<'a> Patch<'a> {
    pub fn new(id: ObjectId, instance: &'a Instance) -> Self {
        Self { id, instance }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Whether the handle still resolves to a canvas
    pub fn is_valid(&self) -> bool {
        self.instance
            .with_context(|graph| graph.get(self.id).and_then(NativeObject::as_canvas).is_some())
    }

    pub fn name(&self) -> String {
        self.instance.with_context(|graph| {
            graph
                .get(self.id)
                .and_then(NativeObject::as_canvas)
                .map(|c| c.name.clone())
                .unwrap_or_default()
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.instance
            .with_context(|graph| graph.get(self.id).map(|o| o.bounds).unwrap_or_default())
    }

    /// GUI objects directly inside this canvas, in creation order
    ///
    /// Objects that don't classify as a known widget are skipped.
    pub fn gui_objects(&self) -> Vec<GuiObject<'a>> {
        let instance = self.instance;
        let patch = self.id;
        instance.with_context(|graph| {
            let children = graph.children(patch).to_vec();
            children
                .into_iter()
                .map(|child| GuiObject::classify_in(graph, child, patch, instance))
                .filter(|gui| gui.kind() != Kind::Undefined)
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::pd::native::{Bounds, Canvas, Gatom, IemGui, IemWidget, NativeObject};
    use crate::pd::test_support::headless_environment;
    use crate::pd::Kind;

    #[test]
    fn test_gui_objects_in_order_without_undefined() {
        let (env, _runtime) = headless_environment();
        let instance = env.create_instance().unwrap();
        let patch = instance.open_patch(Canvas::root("main", 1001, vec![])).unwrap();

        instance
            .add_object(patch.id(), NativeObject::iem(Bounds::default(), IemGui::new(IemWidget::toggle())))
            .unwrap();
        instance
            .add_object(patch.id(), NativeObject::opaque("osc~", Bounds::default()))
            .unwrap();
        instance
            .add_object(patch.id(), NativeObject::gatom(Bounds::default(), Gatom::float()))
            .unwrap();

        let kinds: Vec<Kind> = patch.gui_objects().iter().map(|g| g.kind()).collect();
        assert_eq!(kinds, vec![Kind::Toggle, Kind::AtomNumber]);
        assert_eq!(patch.name(), "main");
    }

    #[test]
    fn test_closed_patch_is_inert() {
        let (env, _runtime) = headless_environment();
        let instance = env.create_instance().unwrap();
        let patch = instance.open_patch(Canvas::root("main", 1001, vec![])).unwrap();
        instance.close_patch(patch.id()).unwrap();

        assert!(!patch.is_valid());
        assert!(patch.gui_objects().is_empty());
        assert_eq!(patch.name(), "");
    }
}
