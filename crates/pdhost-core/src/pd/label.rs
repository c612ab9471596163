//! Widget labels

/// Text drawn next to a widget
///
/// Derived on demand from the widget's current geometry and config; it is
/// never stored, so moving or recoloring a widget shows up on the next read.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    /// Packed ARGB
    color: u32,
    position: (i32, i32),
    font_name: String,
    font_height: f32,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: 0xFF000000,
            position: (0, 0),
            font_name: String::new(),
            font_height: 0.0,
        }
    }
}

impl Label {
    pub fn new(
        text: impl Into<String>,
        color: u32,
        x: i32,
        y: i32,
        font_name: impl Into<String>,
        font_height: f32,
    ) -> Self {
        Self {
            text: text.into(),
            color,
            position: (x, y),
            font_name: font_name.into(),
            font_height,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    pub fn font_height(&self) -> f32 {
        self.font_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_black() {
        let label = Label::default();
        assert!(label.is_empty());
        assert_eq!(label.color(), 0xFF000000);
        assert_eq!(label.position(), (0, 0));
    }
}
