use kuchiki::ElementData;

use crate::types::{Annotations, Color, RgbColor};

/// Canonical highlight colors the note editor emits, quantized onto the
/// background palette of the target API.
const BACKGROUND_PALETTE: [(RgbColor, Color); 8] = [
    (RgbColor { r: 0xff, g: 0xd4, b: 0x00 }, Color::YellowBackground),
    (RgbColor { r: 0xff, g: 0x66, b: 0x66 }, Color::RedBackground),
    (RgbColor { r: 0x5f, g: 0xb2, b: 0x36 }, Color::GreenBackground),
    (RgbColor { r: 0x2e, g: 0xa8, b: 0xe5 }, Color::BlueBackground),
    (RgbColor { r: 0xa2, g: 0x8a, b: 0xe5 }, Color::PurpleBackground),
    (RgbColor { r: 0xe5, g: 0x6e, b: 0xee }, Color::PinkBackground),
    (RgbColor { r: 0xf1, g: 0x98, b: 0x37 }, Color::OrangeBackground),
    (RgbColor { r: 0xaa, g: 0xaa, b: 0xaa }, Color::GrayBackground),
];

/// Same RGB anchors, mapped onto foreground text colors.
const TEXT_PALETTE: [(RgbColor, Color); 8] = [
    (RgbColor { r: 0xff, g: 0xd4, b: 0x00 }, Color::Yellow),
    (RgbColor { r: 0xff, g: 0x66, b: 0x66 }, Color::Red),
    (RgbColor { r: 0x5f, g: 0xb2, b: 0x36 }, Color::Green),
    (RgbColor { r: 0x2e, g: 0xa8, b: 0xe5 }, Color::Blue),
    (RgbColor { r: 0xa2, g: 0x8a, b: 0xe5 }, Color::Purple),
    (RgbColor { r: 0xe5, g: 0x6e, b: 0xee }, Color::Pink),
    (RgbColor { r: 0xf1, g: 0x98, b: 0x37 }, Color::Orange),
    (RgbColor { r: 0xaa, g: 0xaa, b: 0xaa }, Color::Gray),
];

/// Derives the annotation set for one element from its tag name and inline
/// style. Computed once at classification time.
pub(crate) fn annotations_for(el: &ElementData) -> Annotations {
    let mut annotations = Annotations::default();
    match el.name.local.to_lowercase().as_str() {
        "b" | "strong" => annotations.bold = true,
        "i" | "em" => annotations.italic = true,
        "u" => annotations.underline = true,
        "s" => annotations.strikethrough = true,
        "code" => annotations.code = true,
        _ => {}
    }
    let attrs = el.attributes.borrow();
    if let Some(style) = attrs.get("style") {
        if has_line_through(style) {
            annotations.strikethrough = true;
        }
        annotations.color = style_color(style);
    }
    annotations
}

fn has_line_through(style: &str) -> bool {
    ["text-decoration", "text-decoration-line"]
        .iter()
        .any(|prop| declaration(style, prop).is_some_and(|v| v.contains("line-through")))
}

/// Background color takes priority over text color when both are present.
fn style_color(style: &str) -> Option<Color> {
    if let Some(rgb) = declaration(style, "background-color").and_then(|v| parse_rgb(&v)) {
        return Some(nearest_color(&BACKGROUND_PALETTE, rgb));
    }
    declaration(style, "color")
        .and_then(|v| parse_rgb(&v))
        .map(|rgb| nearest_color(&TEXT_PALETTE, rgb))
}

/// Looks one property up in an inline `style` attribute. Declarations are
/// `;`-separated `property: value` pairs; no full CSS parsing is needed.
fn declaration(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|part| {
        let (name, value) = part.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim().to_ascii_lowercase())
    })
}

fn parse_rgb(value: &str) -> Option<RgbColor> {
    let value = value.trim();
    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = inner.split(',');
    let r = component(parts.next()?)?;
    let g = component(parts.next()?)?;
    let b = component(parts.next()?)?;
    Some(RgbColor { r, g, b })
}

fn component(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok()
}

/// Nearest-neighbor quantization; the first minimum in table order wins.
fn nearest_color(palette: &[(RgbColor, Color)], sample: RgbColor) -> Color {
    let mut best = palette[0].1;
    let mut best_distance = f64::MAX;
    for (anchor, color) in palette {
        let distance = redmean_distance(*anchor, sample);
        if distance < best_distance {
            best_distance = distance;
            best = *color;
        }
    }
    best
}

/// Squared "redmean" distance: perceptual weighting where the red term grows
/// with mean red intensity and the blue term shrinks complementarily.
fn redmean_distance(a: RgbColor, b: RgbColor) -> f64 {
    let rmean = (f64::from(a.r) + f64::from(b.r)) / 2.0;
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (2.0 + rmean / 256.0) * dr * dr + 4.0 * dg * dg + (2.0 + (255.0 - rmean) / 256.0) * db * db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_matches_whole_property_names() {
        let style = "background-color: rgb(255, 212, 0); color: rgb(170, 170, 170)";
        assert_eq!(
            declaration(style, "color").as_deref(),
            Some("rgb(170, 170, 170)")
        );
        assert_eq!(
            declaration(style, "background-color").as_deref(),
            Some("rgb(255, 212, 0)")
        );
        assert_eq!(declaration("color: red", "background-color"), None);
    }

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(
            parse_rgb("rgb(95, 178, 54)"),
            Some(RgbColor { r: 95, g: 178, b: 54 })
        );
        assert_eq!(
            parse_rgb("rgba(95,178,54,0.5)").map(|c| c.g),
            Some(178)
        );
        assert_eq!(parse_rgb("transparent"), None);
        assert_eq!(parse_rgb("rgb(300, 0, 0)"), None);
    }

    #[test]
    fn off_palette_green_quantizes_to_green() {
        // Slightly-off highlight green lands on the same entry as the
        // canonical value.
        for value in ["rgb(95, 178, 54)", "rgb(95, 240, 54)"] {
            let rgb = parse_rgb(value).unwrap();
            assert_eq!(
                nearest_color(&BACKGROUND_PALETTE, rgb),
                Color::GreenBackground
            );
        }
    }

    #[test]
    fn background_beats_text_color() {
        let style = "color: rgb(255, 102, 102); background-color: rgb(255, 212, 0)";
        assert_eq!(style_color(style), Some(Color::YellowBackground));
    }

    #[test]
    fn text_color_used_when_no_background() {
        assert_eq!(
            style_color("color: rgb(46, 168, 229)"),
            Some(Color::Blue)
        );
        assert_eq!(style_color("font-weight: bold"), None);
    }

    #[test]
    fn line_through_style_sets_strikethrough() {
        assert!(has_line_through("text-decoration: line-through"));
        assert!(has_line_through("text-decoration-line: line-through"));
        assert!(!has_line_through("text-decoration: underline"));
    }
}
