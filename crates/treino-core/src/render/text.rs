//! Text preparation ahead of layout: encoding normalization and markup
//! stripping.
//!
//! Both steps are total. A character that cannot be represented in the
//! target encoding is transliterated or replaced with [`PLACEHOLDER`]; it
//! never fails the render.

use unicode_normalization::UnicodeNormalization;

/// Stand-in for a character with no Latin-1 rendition.
pub const PLACEHOLDER: char = '?';

/// Tabs are expanded to this many spaces.
pub const TAB_WIDTH: usize = 4;

/// Full preparation of a body block: encoding normalization, then markup
/// stripping.
///
/// Normalization runs first so that any `#` or `*` produced by
/// transliteration (e.g. a fullwidth asterisk) is stripped as well.
pub fn prepare(text: &str) -> String {
    strip_markup(&to_latin1(text))
}

// ---------------------------------------------------------------------------
// Encoding normalization
// ---------------------------------------------------------------------------

/// Map `text` onto Latin-1 (U+0000..=U+00FF), character by character.
///
/// - Printable Latin-1 characters, `\n` and `\t` pass through.
/// - Other control characters (including `\r`) are dropped.
/// - Common typographic characters are transliterated to ASCII.
/// - Anything else is replaced by its compatibility decomposition when that
///   yields Latin-1 characters (`ő` -> `o`, `ﬁ` -> `fi`), otherwise by
///   [`PLACEHOLDER`].
pub fn to_latin1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_latin1(c) {
            if c == '\n' || c == '\t' || !c.is_control() {
                out.push(c);
            }
            continue;
        }
        if let Some(replacement) = transliterate(c) {
            out.push_str(replacement);
            continue;
        }
        let decomposed: String = std::iter::once(c)
            .nfkd()
            .filter(|d| is_latin1(*d) && !d.is_control())
            .collect();
        if decomposed.is_empty() {
            out.push(PLACEHOLDER);
        } else {
            out.push_str(&decomposed);
        }
    }
    out
}

/// Whether `c` fits in a single Latin-1 byte.
pub fn is_latin1(c: char) -> bool {
    (c as u32) <= 0xFF
}

fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' => "-",
        '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{25AA}' | '\u{25CF}' | '\u{25E6}' => "-",
        '\u{2026}' => "...",
        '\u{2002}'..='\u{200A}' | '\u{202F}' | '\u{205F}' => " ",
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => "",
        '\u{2190}' => "<-",
        '\u{2192}' => "->",
        '\u{2264}' => "<=",
        '\u{2265}' => ">=",
        '\u{2248}' => "~",
        '\u{2122}' => "(TM)",
        '\u{20AC}' => "EUR",
        '\u{2713}' | '\u{2714}' | '\u{2705}' => "v",
        _ => return None,
    };
    Some(s)
}

// ---------------------------------------------------------------------------
// Markup stripping
// ---------------------------------------------------------------------------

/// Demote the supported markdown subset to plain text.
///
/// Tabs become [`TAB_WIDTH`] spaces. Heading markers are removed together
/// with the whitespace after them, `* ` list bullets become `- `, and every
/// remaining `#` or `*` is dropped.
pub fn strip_markup(text: &str) -> String {
    let tab = " ".repeat(TAB_WIDTH);
    text.split('\n')
        .map(|line| strip_line(&line.replace('\t', &tab)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line(line: &str) -> String {
    let indent_len = line.len() - line.trim_start_matches(' ').len();
    let (indent, rest) = line.split_at(indent_len);

    let rest = if rest.starts_with('#') {
        rest.trim_start_matches('#').trim_start()
    } else {
        rest
    };

    let mut out = String::with_capacity(line.len());
    out.push_str(indent);
    let rest = match rest.strip_prefix("* ") {
        Some(item) => {
            out.push_str("- ");
            item
        }
        None => rest,
    };
    out.extend(rest.chars().filter(|c| *c != '#' && *c != '*'));
    out
}
