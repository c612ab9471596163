//! Visual metadata of a [`GuiObject`]: fonts, colors, bounds and labels

use super::gui::{GuiObject, Kind};
use super::label::Label;
use super::native::{
    fonts, Bounds, IemGui, NativeBody, NativeObject, ObjectGraph, ObjectId,
    CANVAS_DEFAULT_FONT_SIZE, EMPTY_LABEL,
};

/// Decode a packed IEM color into opaque ARGB
///
/// The interpreter stores colors as `0xRRGGBB` in a signed int. The value
/// is shifted up a byte with an implicit full alpha, then each channel is
/// extracted and re-packed as `0xAARRGGBB`.
pub fn from_iem_color(color: i32) -> u32 {
    let c = ((color as u32) << 8) | 0xFF;
    let r = (c >> 24) & 0xFF;
    let g = (c >> 16) & 0xFF;
    let b = (c >> 8) & 0xFF;
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

/// Atom labels are always drawn opaque black
const ATOM_LABEL_COLOR: u32 = 0xFF00_0000;

impl<'a> GuiObject<'a> {
    pub fn font_height(&self) -> f32 {
        self.instance().with_context(|graph| self.font_height_in(graph))
    }

    pub fn font_name(&self) -> String {
        self.instance().with_context(|graph| self.font_name_in(graph))
    }

    /// ARGB background, theme default for non-IEM kinds
    pub fn background_color(&self) -> u32 {
        let theme = self.instance().theme();
        let color = self
            .iem_field(|iem| iem.background)
            .map(from_iem_color)
            .unwrap_or(theme.default_background);
        theme.apply_transparency(color)
    }

    pub fn foreground_color(&self) -> u32 {
        self.iem_field(|iem| iem.foreground)
            .map(from_iem_color)
            .unwrap_or(self.instance().theme().default_foreground)
    }

    /// Bounding box in patch coordinates, adjusted per kind
    pub fn bounds(&self) -> Bounds {
        self.instance().with_context(|graph| self.bounds_in(graph))
    }

    /// Label to draw next to the widget, empty if there is none
    ///
    /// Recomputed on every call from the current geometry and config.
    pub fn label(&self) -> Label {
        self.instance().with_context(|graph| {
            let Some(object) = graph.get(self.handle()) else {
                return Label::default();
            };
            match &object.body {
                NativeBody::Iem(iem) if self.is_iem() => {
                    let text = graph.realize_dollar(object.owner, &iem.label);
                    if text.is_empty() || text == EMPTY_LABEL {
                        return Label::default();
                    }
                    let bounds = self.bounds_in(graph);
                    Label::new(
                        text,
                        from_iem_color(iem.label_color),
                        bounds.x + iem.label_dx,
                        bounds.y + iem.label_dy,
                        self.font_name_in(graph),
                        self.font_height_in(graph),
                    )
                }
                NativeBody::Gatom(gatom) if self.is_atom() => {
                    let text = graph.realize_dollar(object.owner, &gatom.label);
                    if text.is_empty() {
                        return Label::default();
                    }
                    let bounds = self.bounds_in(graph);
                    let (font_size, zoom) = canvas_font(graph, Some(self.patch_handle()));
                    let height = fonts::host_font_size(font_size, zoom);

                    let (x, y) = match gatom.where_label {
                        // left
                        0 => {
                            let (owner_font, owner_zoom) = canvas_font(graph, object.owner);
                            let nchars = text.chars().count() as i32;
                            let fwidth = fonts::font_width(owner_font, owner_zoom);
                            (bounds.x - 4 - nchars * fwidth, bounds.y + 2 + height / 2)
                        }
                        // right
                        1 => (bounds.x + bounds.width + 2, bounds.y + 2 + height / 2),
                        // above
                        2 => (bounds.x - 1, bounds.y - 1 - height / 2),
                        // below
                        _ => (bounds.x - 1, bounds.y + bounds.height + 2 + height / 2),
                    };
                    Label::new(
                        text,
                        ATOM_LABEL_COLOR,
                        x,
                        y,
                        self.font_name_in(graph),
                        height as f32,
                    )
                }
                _ => Label::default(),
            }
        })
    }

    pub(crate) fn font_height_in(&self, graph: &ObjectGraph) -> f32 {
        let Some(object) = graph.get(self.handle()) else {
            return 0.0;
        };
        match object.as_iem() {
            Some(iem) if self.is_iem() => iem.font_size as f32,
            _ => {
                let (font_size, zoom) = canvas_font(graph, Some(self.patch_handle()));
                fonts::font_height(font_size, zoom) as f32
            }
        }
    }

    pub(crate) fn font_name_in(&self, graph: &ObjectGraph) -> String {
        match graph.get(self.handle()).and_then(NativeObject::as_iem) {
            Some(iem) if self.is_iem() => iem.font.clone(),
            _ => self.instance().default_font().to_string(),
        }
    }

    pub(crate) fn bounds_in(&self, graph: &ObjectGraph) -> Bounds {
        let Some(object) = graph.get(self.handle()) else {
            return Bounds::default();
        };
        let b = object.bounds;
        match self.kind() {
            Kind::Panel => Bounds::new(b.x, b.y, b.width + 1, b.height + 1),
            Kind::AtomNumber | Kind::AtomSymbol | Kind::AtomList => {
                Bounds::new(b.x, b.y, b.width, b.height - 2)
            }
            Kind::Comment => Bounds::new(b.x + 2, b.y + 2, b.width, b.height - 2),
            _ => b,
        }
    }

    fn iem_field(&self, field: impl FnOnce(&IemGui) -> i32) -> Option<i32> {
        if !self.is_iem() {
            return None;
        }
        self.instance().with_context(|graph| {
            graph
                .get(self.handle())
                .and_then(NativeObject::as_iem)
                .map(field)
        })
    }
}

/// Font size and zoom of `canvas`, Pd defaults if it isn't one
fn canvas_font(graph: &ObjectGraph, canvas: Option<ObjectId>) -> (i32, i32) {
    canvas
        .and_then(|id| graph.get(id))
        .and_then(NativeObject::as_canvas)
        .map(|c| (c.font_size, c.zoom))
        .unwrap_or((CANVAS_DEFAULT_FONT_SIZE, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pd::atom::Atom;
    use crate::pd::native::{Canvas, Gatom, IemWidget};
    use crate::pd::test_support::headless_environment;
    use crate::pd::{Environment, Instance};

    fn setup(args: Vec<Atom>) -> (Environment, Instance, ObjectId) {
        let (env, _runtime) = headless_environment();
        let instance = env.create_instance().unwrap();
        let patch = instance
            .open_patch(Canvas::root("main", 1001, args))
            .unwrap()
            .id();
        (env, instance, patch)
    }

    fn base() -> Bounds {
        Bounds::new(10, 10, 50, 30)
    }

    #[test]
    fn test_iem_color_decode() {
        assert_eq!(from_iem_color(0x102030), 0xFF102030);
        assert_eq!(from_iem_color(0x000000), 0xFF000000);
        assert_eq!(from_iem_color(0xFFFFFF), 0xFFFFFFFF);
    }

    #[test]
    fn test_bounds_per_kind() {
        let (_env, instance, patch) = setup(vec![]);
        let panel = instance
            .add_object(patch, NativeObject::iem(base(), IemGui::new(IemWidget::Panel)))
            .unwrap();
        let comment = instance.add_object(patch, NativeObject::comment(base(), "note")).unwrap();
        let number = instance.add_object(patch, NativeObject::gatom(base(), Gatom::float())).unwrap();
        let toggle = instance
            .add_object(patch, NativeObject::iem(base(), IemGui::new(IemWidget::toggle())))
            .unwrap();

        let bounds = |h| GuiObject::new(h, patch, &instance).bounds();
        assert_eq!(bounds(panel), Bounds::new(10, 10, 51, 31));
        assert_eq!(bounds(comment), Bounds::new(12, 12, 50, 28));
        assert_eq!(bounds(number), Bounds::new(10, 10, 50, 28));
        assert_eq!(bounds(toggle), base());
        assert_eq!(bounds(ObjectId::NULL), Bounds::default());
    }

    #[test]
    fn test_colors() {
        let (_env, instance, patch) = setup(vec![]);
        let slider = instance
            .add_object(
                patch,
                NativeObject::iem(base(), IemGui::new(IemWidget::toggle()).with_colors(0x102030, 0x405060, 0)),
            )
            .unwrap();
        let gui = GuiObject::new(slider, patch, &instance);
        assert_eq!(gui.background_color(), 0xFF102030);
        assert_eq!(gui.foreground_color(), 0xFF405060);

        let comment = instance.add_object(patch, NativeObject::comment(base(), "x")).unwrap();
        let gui = GuiObject::new(comment, patch, &instance);
        assert_eq!(gui.background_color(), instance.theme().default_background);
        assert_eq!(gui.foreground_color(), instance.theme().default_foreground);
    }

    #[test]
    fn test_transparent_background() {
        use crate::config::{EnvironmentConfig, ThemeConfig};
        use crate::pd::runtime::HeadlessRuntime;
        use std::sync::Arc;

        let config = EnvironmentConfig {
            theme: ThemeConfig {
                transparent: Some(0xFF102030),
                ..ThemeConfig::default()
            },
            ..EnvironmentConfig::default()
        };
        let env = Environment::with_runtime(Arc::new(HeadlessRuntime::new()), config);
        let instance = env.create_instance().unwrap();
        let patch = instance.open_patch(Canvas::new("main")).unwrap().id();

        let handle = instance
            .add_object(
                patch,
                NativeObject::iem(base(), IemGui::new(IemWidget::Panel).with_colors(0x102030, 0x102030, 0)),
            )
            .unwrap();
        let gui = GuiObject::new(handle, patch, &instance);
        assert_eq!(gui.background_color(), 0x00102030);
        // only the background is normalized
        assert_eq!(gui.foreground_color(), 0xFF102030);
    }

    #[test]
    fn test_fonts() {
        let (_env, instance, patch) = setup(vec![]);
        let iem = instance
            .add_object(
                patch,
                NativeObject::iem(base(), IemGui::new(IemWidget::bang()).with_font("Helvetica", 14)),
            )
            .unwrap();
        let gui = GuiObject::new(iem, patch, &instance);
        assert_eq!(gui.font_name(), "Helvetica");
        assert_eq!(gui.font_height(), 14.0);

        let atom = instance.add_object(patch, NativeObject::gatom(base(), Gatom::float())).unwrap();
        let gui = GuiObject::new(atom, patch, &instance);
        assert_eq!(gui.font_name(), instance.default_font());
        // canvas default size 12 at zoom 1
        assert_eq!(gui.font_height(), 16.0);

        let null = GuiObject::new(ObjectId::NULL, patch, &instance);
        assert_eq!(null.font_height(), 0.0);
    }

    #[test]
    fn test_iem_label_expands_dollars() {
        let (_env, instance, patch) = setup(vec![Atom::Float(3.0), Atom::from("osc")]);
        let iem = IemGui::new(IemWidget::toggle())
            .with_label("$2-$1-$0", 17, 7)
            .with_colors(0, 0, 0x102030);
        let handle = instance.add_object(patch, NativeObject::iem(base(), iem)).unwrap();

        let label = GuiObject::new(handle, patch, &instance).label();
        assert_eq!(label.text(), "osc-3-1001");
        assert_eq!(label.position(), (27, 17));
        assert_eq!(label.color(), 0xFF102030);
        assert_eq!(label.font_height(), 10.0);
    }

    #[test]
    fn test_iem_label_sentinels() {
        let (_env, instance, patch) = setup(vec![]);
        for text in ["", EMPTY_LABEL] {
            let iem = IemGui::new(IemWidget::toggle()).with_label(text, 0, 0);
            let handle = instance.add_object(patch, NativeObject::iem(base(), iem)).unwrap();
            assert!(GuiObject::new(handle, patch, &instance).label().is_empty());
        }

        // unresolved references are kept
        let iem = IemGui::new(IemWidget::toggle()).with_label("$4", 0, 0);
        let handle = instance.add_object(patch, NativeObject::iem(base(), iem)).unwrap();
        assert_eq!(GuiObject::new(handle, patch, &instance).label().text(), "$4");
    }

    #[test]
    fn test_label_tracks_geometry() {
        let (_env, instance, patch) = setup(vec![]);
        let iem = IemGui::new(IemWidget::toggle()).with_label("gain", 0, -8);
        let handle = instance.add_object(patch, NativeObject::iem(base(), iem)).unwrap();
        let gui = GuiObject::new(handle, patch, &instance);
        assert_eq!(gui.label().position(), (10, 2));

        instance.with_context(|g| g.get_mut(handle).unwrap().bounds.x = 100);
        assert_eq!(gui.label().position(), (100, 2));
    }

    #[test]
    fn test_atom_label_quadrants() {
        let (_env, instance, patch) = setup(vec![]);
        let label_at = |where_label| {
            let gatom = Gatom::float().with_label("ab", where_label);
            let handle = instance.add_object(patch, NativeObject::gatom(base(), gatom)).unwrap();
            GuiObject::new(handle, patch, &instance).label()
        };

        // atom bounds are (10, 10, 50, 28), host font 12, char width 7
        assert_eq!(label_at(0).position(), (-8, 18));
        assert_eq!(label_at(1).position(), (62, 18));
        assert_eq!(label_at(2).position(), (9, 3));
        assert_eq!(label_at(3).position(), (9, 46));

        let label = label_at(1);
        assert_eq!(label.color(), 0xFF000000);
        assert_eq!(label.font_height(), 12.0);
        assert_eq!(label.text(), "ab");
    }

    #[test]
    fn test_atom_label_expands_dollars() {
        let (_env, instance, patch) = setup(vec![Atom::from("x")]);
        let gatom = Gatom::float().with_label("$1-$0", 1);
        let handle = instance.add_object(patch, NativeObject::gatom(base(), gatom)).unwrap();

        let label = GuiObject::new(handle, patch, &instance).label();
        assert_eq!(label.text(), "x-1001");
        assert_eq!(label.position(), (62, 18));
    }

    #[test]
    fn test_label_empty_after_expansion() {
        let (_env, instance, patch) = setup(vec![Atom::from("")]);

        let gatom = Gatom::float().with_label("$1", 0);
        let atom = instance.add_object(patch, NativeObject::gatom(base(), gatom)).unwrap();
        assert!(GuiObject::new(atom, patch, &instance).label().is_empty());

        let iem = IemGui::new(IemWidget::toggle()).with_label("$1", 0, 0);
        let toggle = instance.add_object(patch, NativeObject::iem(base(), iem)).unwrap();
        assert!(GuiObject::new(toggle, patch, &instance).label().is_empty());
    }

    #[test]
    fn test_atom_without_label() {
        let (_env, instance, patch) = setup(vec![]);
        let handle = instance.add_object(patch, NativeObject::gatom(base(), Gatom::symbol())).unwrap();
        assert!(GuiObject::new(handle, patch, &instance).label().is_empty());

        let comment = instance.add_object(patch, NativeObject::comment(base(), "text")).unwrap();
        assert!(GuiObject::new(comment, patch, &instance).label().is_empty());
    }
}
