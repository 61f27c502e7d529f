//! Renders Ikigai answers onto the fixed four-circle diagram as SVG.

use std::fmt::Write;

use crate::models::ikigai::{IkigaiCategory, IkigaiData};

pub const VIEWBOX: u32 = 400;
pub const RADIUS: u32 = 120;

const BASE_OPACITY: f32 = 0.5;
const ACTIVE_OPACITY: f32 = 0.8;

struct Circle {
    category: IkigaiCategory,
    cx: u32,
    cy: u32,
    fill: &'static str,
    /// Label lines with their anchor positions.
    label: &'static [(u32, u32, &'static str)],
}

const CIRCLES: [Circle; 4] = [
    Circle {
        category: IkigaiCategory::WhatILove,
        cx: 200,
        cy: 150,
        fill: "#fde68a",
        label: &[(200, 80, "What I LOVE")],
    },
    Circle {
        category: IkigaiCategory::WhatImGoodAt,
        cx: 120,
        cy: 220,
        fill: "#bbf7d0",
        label: &[(50, 220, "What I'm"), (50, 240, "GOOD AT")],
    },
    Circle {
        category: IkigaiCategory::WhatTheWorldNeeds,
        cx: 280,
        cy: 220,
        fill: "#fbcfe8",
        label: &[(350, 220, "What the world"), (350, 240, "NEEDS")],
    },
    Circle {
        category: IkigaiCategory::WhatICanBePaidFor,
        cx: 200,
        cy: 290,
        fill: "#bae6fd",
        label: &[(200, 380, "What I can be PAID for")],
    },
];

const INTERSECTIONS: [(u32, u32, &str, &str); 4] = [
    (200, 150, "Passion", "#047857"),
    (280, 185, "Mission", "#be185d"),
    (120, 185, "Profession", "#047857"),
    (200, 255, "Vocation", "#1d4ed8"),
];

const OUTER_NOTES: [(u32, u32, &str); 9] = [
    (50, 120, "Satisfaction, but"),
    (50, 135, "feeling of uselessness"),
    (350, 120, "Delight and"),
    (350, 135, "fullness, but no wealth"),
    (50, 320, "Comfortable, but"),
    (50, 335, "feeling of emptiness"),
    (350, 320, "Excitement and"),
    (350, 335, "complacency, but"),
    (350, 350, "sense of uncertainty"),
];

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn tooltip(category: IkigaiCategory, items: &[String]) -> String {
    let mut text = format!("{}:", category.label());
    if items.is_empty() {
        text.push_str(" (nothing yet)");
    }
    for item in items {
        text.push_str("\n• ");
        text.push_str(item);
    }
    escape_xml(&text)
}

/// Renders the diagram. `active` highlights the category being answered.
pub fn render_svg(data: &IkigaiData, active: Option<IkigaiCategory>) -> String {
    let mut svg = String::new();
    // writing into a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {VIEWBOX} {VIEWBOX}" font-family="sans-serif">"#
    );

    for circle in &CIRCLES {
        let is_active = active == Some(circle.category);
        let opacity = if is_active { ACTIVE_OPACITY } else { BASE_OPACITY };
        let stroke = if is_active {
            r##" stroke="#111827" stroke-width="2""##
        } else {
            ""
        };
        let _ = writeln!(
            svg,
            r#"  <circle data-section="{section}" cx="{cx}" cy="{cy}" r="{RADIUS}" fill="{fill}" fill-opacity="{opacity}"{stroke}><title>{title}</title></circle>"#,
            section = category_key(circle.category),
            cx = circle.cx,
            cy = circle.cy,
            fill = circle.fill,
            title = tooltip(circle.category, data.items(circle.category)),
        );
    }

    for circle in &CIRCLES {
        for (x, y, line) in circle.label {
            let _ = writeln!(
                svg,
                r#"  <text x="{x}" y="{y}" text-anchor="middle" font-size="14" font-weight="600">{}</text>"#,
                escape_xml(line)
            );
        }
    }

    for (x, y, label, color) in INTERSECTIONS {
        let _ = writeln!(
            svg,
            r#"  <text x="{x}" y="{y}" text-anchor="middle" font-size="14" font-weight="500" fill="{color}">{label}</text>"#
        );
    }

    let _ = writeln!(
        svg,
        r#"  <text x="200" y="220" text-anchor="middle" font-size="16" font-weight="700">Ikigai</text>"#
    );

    let _ = writeln!(svg, r##"  <g font-size="12" fill="#4b5563">"##);
    for (x, y, note) in OUTER_NOTES {
        let _ = writeln!(
            svg,
            r#"    <text x="{x}" y="{y}" text-anchor="middle">{note}</text>"#
        );
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}

fn category_key(category: IkigaiCategory) -> &'static str {
    match category {
        IkigaiCategory::WhatILove => "whatILove",
        IkigaiCategory::WhatImGoodAt => "whatImGoodAt",
        IkigaiCategory::WhatTheWorldNeeds => "whatTheWorldNeeds",
        IkigaiCategory::WhatICanBePaidFor => "whatICanBePaidFor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_circles_fixed_geometry() {
        let svg = render_svg(&IkigaiData::default(), None);
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains(r#"cx="200" cy="150" r="120""#));
        assert!(svg.contains(r#"cx="120" cy="220" r="120""#));
        assert!(svg.contains(r#"cx="280" cy="220" r="120""#));
        assert!(svg.contains(r#"cx="200" cy="290" r="120""#));
        for label in ["Passion", "Mission", "Profession", "Vocation", "Ikigai"] {
            assert!(svg.contains(label), "missing {label}");
        }
    }

    #[test]
    fn test_items_appear_in_tooltips_escaped() {
        let data = IkigaiData {
            what_i_love: vec!["R&D <labs>".into()],
            ..Default::default()
        };
        let svg = render_svg(&data, None);
        assert!(svg.contains("R&amp;D &lt;labs&gt;"));
        assert!(!svg.contains("<labs>"));
    }

    #[test]
    fn test_active_section_highlighted() {
        let svg = render_svg(&IkigaiData::default(), Some(IkigaiCategory::WhatTheWorldNeeds));
        assert_eq!(svg.matches(r#"fill-opacity="0.8""#).count(), 1);
        assert_eq!(svg.matches("stroke-width").count(), 1);
        let active_line = svg
            .lines()
            .find(|l| l.contains("fill-opacity=\"0.8\""))
            .unwrap();
        assert!(active_line.contains(r#"data-section="whatTheWorldNeeds""#));
    }
}
