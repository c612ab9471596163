//! Font metrics table
//!
//! Pd snaps every requested font size to one of six known sizes and lays
//! text out with fixed per-size character cells.

/// Metrics for one supported font size (zoom 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub point_size: i32,
    pub width: i32,
    pub height: i32,
}

pub const FONT_TABLE: [FontMetrics; 6] = [
    FontMetrics { point_size: 8, width: 5, height: 11 },
    FontMetrics { point_size: 10, width: 6, height: 13 },
    FontMetrics { point_size: 12, width: 7, height: 16 },
    FontMetrics { point_size: 16, width: 10, height: 19 },
    FontMetrics { point_size: 24, width: 14, height: 29 },
    FontMetrics { point_size: 36, width: 22, height: 44 },
];

/// Index of the largest table entry not bigger than `font_size`
///
/// Sizes below the smallest entry snap to it.
pub fn nearest_font_index(font_size: i32) -> usize {
    FONT_TABLE
        .iter()
        .skip(1)
        .position(|m| m.point_size > font_size)
        .unwrap_or(FONT_TABLE.len() - 1)
}

fn metrics(font_size: i32) -> FontMetrics {
    FONT_TABLE[nearest_font_index(font_size)]
}

/// Point size the host should render `font_size` text at
pub fn host_font_size(font_size: i32, zoom: i32) -> i32 {
    metrics(font_size).point_size * zoom.max(1)
}

/// Character cell width
pub fn font_width(font_size: i32, zoom: i32) -> i32 {
    metrics(font_size).width * zoom.max(1)
}

/// Line height
pub fn font_height(font_size: i32, zoom: i32) -> i32 {
    metrics(font_size).height * zoom.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_font_index() {
        assert_eq!(nearest_font_index(2), 0);
        assert_eq!(nearest_font_index(8), 0);
        assert_eq!(nearest_font_index(10), 1);
        assert_eq!(nearest_font_index(11), 1);
        assert_eq!(nearest_font_index(12), 2);
        assert_eq!(nearest_font_index(36), 5);
        assert_eq!(nearest_font_index(100), 5);
    }

    #[test]
    fn test_zoom_scales_metrics() {
        assert_eq!(host_font_size(12, 1), 12);
        assert_eq!(host_font_size(12, 2), 24);
        assert_eq!(font_width(10, 2), 12);
        assert_eq!(font_height(16, 1), 19);
        // zoom 0 is treated as 1
        assert_eq!(font_height(16, 0), 19);
    }
}
