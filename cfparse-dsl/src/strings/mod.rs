//! String and literal processing shared by the parser.

pub mod escape;
pub mod interpolation;

pub use escape::{decode_escapes, Decoded};
pub use interpolation::{
    has_placeholders, parse_fstring, render_fstring, render_placeholders, FStringPiece,
    FormatField, RenderError, Resolved,
};

/// Body of a multi-line string token: the text between `quotes` opening
/// and closing quote characters. Too-short tokens yield an empty body.
pub fn multiline_body(raw: &str, quotes: usize) -> &str {
    if raw.len() < quotes * 2 {
        return "";
    }
    &raw[quotes..raw.len() - quotes]
}
