//! Text helpers shared by the search client and the shelf reader.

use unicode_normalization::UnicodeNormalization;

/// Unescapes HTML entities and applies NFKC normalization.
///
/// `Two&nbsp;words` becomes `Two words`: the entity decodes to a
/// non-breaking space, which compatibility normalization folds into a
/// plain space.
pub fn normalize(text: &str) -> String {
    let unescaped = html_escape::decode_html_entities(text);
    unescaped.nfkc().collect()
}

/// Turns a "Last, First" author into "First Last".
///
/// The swap happens around the first `", "` only and knows nothing about
/// names, so `King Jr., Martin Luther` becomes `Martin Luther King Jr.`.
/// Authors without a comma are returned unchanged.
pub fn unreverse_author(author: &str) -> String {
    match author.split_once(", ") {
        Some((last, first)) => format!("{first} {last}"),
        None => author.to_string(),
    }
}

/// Prepares a title for use in a search query.
///
/// Colons are escaped and everything from the first parenthesis onward
/// is dropped (series and edition notes like `(P.S.)`). Whitespace left
/// in front of the parenthesis is kept.
pub fn query_title(title: &str) -> String {
    let escaped = title.replace(':', "%3A");
    let end = escaped.find(['(', ')']).unwrap_or(escaped.len());
    escaped[..end].to_string()
}
