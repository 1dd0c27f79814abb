//! Fallback certificate artwork
//!
//! When the author supplies no image, the certificate gets a small inline
//! SVG card carrying its title and collection name. Viewers render this as
//! markup, so every interpolated string is escaped.

use base64::{engine::general_purpose, Engine as _};

/// Longest title rendered on the card before it is cut with an ellipsis.
pub const MAX_TITLE_CHARS: usize = 60;

/// Escape the five markup-significant characters.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn shorten(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(MAX_TITLE_CHARS - 1).collect();
    cut.push('…');
    cut
}

/// Raw SVG markup of the fallback card.
pub fn fallback_svg(title: &str, collection: Option<&str>) -> String {
    let title = escape_markup(&shorten(title.trim()));
    let subtitle = collection
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| {
            format!(
                r##"<text x="40" y="400" font-family="sans-serif" font-size="22" fill="#d8f3dc">{}</text>"##,
                escape_markup(c)
            )
        })
        .unwrap_or_default();

    format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512" viewBox="0 0 512 512">"##,
            r##"<rect width="512" height="512" rx="24" fill="#1b4332"/>"##,
            r##"<text x="40" y="80" font-family="sans-serif" font-size="18" fill="#95d5b2">IMPACT CERTIFICATE</text>"##,
            r##"<text x="40" y="360" font-family="sans-serif" font-size="30" font-weight="bold" fill="#ffffff">{}</text>"##,
            "{}",
            "</svg>"
        ),
        title, subtitle
    )
}

/// Fallback card as a `data:image/svg+xml;base64,` URI.
pub fn fallback_image(title: &str, collection: Option<&str>) -> String {
    let svg = fallback_svg(title, collection);
    format!(
        "data:image/svg+xml;base64,{}",
        general_purpose::STANDARD.encode(svg.as_bytes())
    )
}
