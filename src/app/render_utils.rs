use std::collections::BTreeMap;

use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, epaint::CubicBezierShape, pos2};

pub(super) const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(0x00, 0x78, 0xd4);
pub(super) const HOVER_COLOR: Color32 = Color32::from_rgb(0x68, 0xc1, 0xe8);
pub(super) const LINK_COLOR: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);
pub(super) const LINK_WIDTH: f32 = 2.0;
pub(super) const NODE_RADIUS: f32 = 12.0;

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and a handful of
/// named colours.
pub(super) fn parse_css_color(text: &str) -> Option<Color32> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = text.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels = args
            .split(',')
            .map(|channel| channel.trim().parse::<u8>().ok())
            .collect::<Option<Vec<_>>>()?;
        return match channels.as_slice() {
            [r, g, b] => Some(Color32::from_rgb(*r, *g, *b)),
            _ => None,
        };
    }

    let named = match lower.as_str() {
        "black" => Color32::BLACK,
        "white" => Color32::WHITE,
        "gray" | "grey" => Color32::from_rgb(128, 128, 128),
        "red" => Color32::from_rgb(255, 0, 0),
        "green" => Color32::from_rgb(0, 128, 0),
        "blue" => Color32::from_rgb(0, 0, 255),
        "orange" => Color32::from_rgb(255, 165, 0),
        "purple" => Color32::from_rgb(128, 0, 128),
        "teal" => Color32::from_rgb(0, 128, 128),
        "navy" => Color32::from_rgb(0, 0, 128),
        "gold" => Color32::from_rgb(255, 215, 0),
        _ => return None,
    };
    Some(named)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
    let nibble = |index: usize| {
        u8::from_str_radix(hex.get(index..index + 1)?, 16)
            .ok()
            .map(|value| value * 17)
    };

    match hex.len() {
        3 => Some(Color32::from_rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)?,
        )),
        _ => None,
    }
}

/// Per-level palette resolved once from the configured colour strings.
#[derive(Clone, Debug, Default)]
pub(super) struct LevelPalette {
    colors: BTreeMap<usize, Color32>,
}

impl LevelPalette {
    pub(super) fn from_config(node_colors: &BTreeMap<usize, String>) -> Self {
        let colors = node_colors
            .iter()
            .filter_map(|(level, text)| {
                let color = parse_css_color(text);
                if color.is_none() {
                    tracing::warn!(level, color = %text, "unrecognised node colour; using default");
                }
                color.map(|color| (*level, color))
            })
            .collect();
        Self { colors }
    }

    pub(super) fn color(&self, level: usize) -> Color32 {
        self.colors
            .get(&level)
            .copied()
            .unwrap_or(DEFAULT_NODE_COLOR)
    }
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 250));
}

/// Vertical link from `parent` down to `child`, bending at half height.
pub(super) fn draw_link(painter: &Painter, parent: Pos2, child: Pos2, stroke: Stroke) {
    let middle = (parent.y + child.y) / 2.0;
    painter.add(CubicBezierShape::from_points_stroke(
        [parent, pos2(parent.x, middle), pos2(child.x, middle), child],
        false,
        Color32::TRANSPARENT,
        stroke,
    ));
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn link_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand2(Vec2::splat(padding));
    rect.intersects(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_css_color("#0078d4"), Some(DEFAULT_NODE_COLOR));
        assert_eq!(parse_css_color(" #fff "), Some(Color32::WHITE));
        assert_eq!(
            parse_css_color("#ff000080"),
            Some(Color32::from_rgba_unmultiplied(255, 0, 0, 128))
        );
        assert_eq!(parse_css_color("#12345"), None);
        assert_eq!(parse_css_color("#gg0000"), None);
    }

    #[test]
    fn parses_rgb_and_names() {
        assert_eq!(parse_css_color("rgb(104, 193, 232)"), Some(HOVER_COLOR));
        assert_eq!(parse_css_color("RGB(1,2)"), None);
        assert_eq!(parse_css_color("Orange"), Some(Color32::from_rgb(255, 165, 0)));
        assert_eq!(parse_css_color("chartreuse-ish"), None);
    }

    #[test]
    fn palette_falls_back_to_default() {
        let palette = LevelPalette::from_config(&BTreeMap::from([
            (1, "#ff8800".to_owned()),
            (2, "not a colour".to_owned()),
        ]));

        assert_eq!(palette.color(1), Color32::from_rgb(255, 136, 0));
        assert_eq!(palette.color(2), DEFAULT_NODE_COLOR);
        assert_eq!(palette.color(0), DEFAULT_NODE_COLOR);
    }

    #[test]
    fn off_screen_links_are_culled() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(link_visible(rect, pos2(50.0, -20.0), pos2(50.0, 20.0), 2.0));
        assert!(!link_visible(rect, pos2(150.0, 0.0), pos2(180.0, 90.0), 2.0));
        assert!(circle_visible(rect, pos2(105.0, 50.0), 12.0));
        assert!(!circle_visible(rect, pos2(120.0, 50.0), 12.0));
    }
}
