//! ANSI-aware width, truncation, wrapping, and padding helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 3;

/// Returns the byte length of the escape sequence starting at `index`, if any.
///
/// Recognizes CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL` or `ESC ] ... ESC \`).
pub fn ansi_sequence_len(input: &str, index: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(index) != Some(&0x1b) {
        return None;
    }

    match bytes.get(index + 1) {
        Some(b'[') => {
            let mut cursor = index + 2;
            while let Some(&byte) = bytes.get(cursor) {
                if (0x40..=0x7e).contains(&byte) {
                    return Some(cursor + 1 - index);
                }
                cursor += 1;
            }
            None
        }
        Some(b']') => {
            let mut cursor = index + 2;
            while let Some(&byte) = bytes.get(cursor) {
                if byte == 0x07 {
                    return Some(cursor + 1 - index);
                }
                if byte == 0x1b && bytes.get(cursor + 1) == Some(&b'\\') {
                    return Some(cursor + 2 - index);
                }
                cursor += 1;
            }
            None
        }
        _ => None,
    }
}

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    UnicodeWidthStr::width(grapheme)
}

/// Display width of `input`, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    segments(input)
        .into_iter()
        .map(|segment| match segment {
            Segment::Ansi(_) => 0,
            Segment::Grapheme(grapheme) => grapheme_width(grapheme),
        })
        .sum()
}

/// Number of user-visible characters (grapheme clusters) in `input`.
pub fn grapheme_count(input: &str) -> usize {
    input.graphemes(true).count()
}

/// Truncates plain text to at most `max_graphemes` user-visible characters.
///
/// When truncation happens the result keeps `max_graphemes - marker` graphemes
/// followed by `marker`, so the total never exceeds `max_graphemes`.
pub fn truncate_graphemes(input: &str, max_graphemes: usize, marker: &str) -> String {
    if grapheme_count(input) <= max_graphemes {
        return input.to_string();
    }

    let keep = max_graphemes.saturating_sub(grapheme_count(marker));
    let mut out: String = input.graphemes(true).take(keep).collect();
    out.push_str(marker);
    out
}

/// Truncates to `max_width` columns, appending `ellipsis` when text was cut.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    let (budget, ellipsis) = if ellipsis_width >= max_width {
        (max_width, "")
    } else {
        (max_width - ellipsis_width, ellipsis)
    };

    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    let mut saw_ansi = false;
    for segment in segments(text) {
        match segment {
            Segment::Ansi(sequence) => {
                saw_ansi = true;
                out.push_str(sequence);
            }
            Segment::Grapheme(grapheme) => {
                let width = grapheme_width(grapheme);
                if used + width > budget {
                    break;
                }
                used += width;
                out.push_str(grapheme);
            }
        }
    }
    if saw_ansi {
        out.push_str("\x1b[0m");
    }
    out.push_str(ellipsis);
    out
}

/// Pads `text` with spaces to exactly `width` columns, truncating if wider.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let text = truncate_to_width(text, width, "");
    let visible = visible_width(&text);
    format!("{text}{}", " ".repeat(width.saturating_sub(visible)))
}

/// Word-wraps plain text to `width` columns.
///
/// Explicit newlines start new lines; words wider than `width` are split at
/// grapheme boundaries. Always returns at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;
        let mut wrapped = false;

        for word in paragraph.split_word_bounds() {
            let word_width = visible_width(word);
            let is_space = word.chars().all(char::is_whitespace);

            if is_space && wrapped && current_width == 0 {
                continue;
            }

            if current_width + word_width <= width {
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if current_width > 0 {
                lines.push(std::mem::take(&mut current).trim_end().to_string());
                current_width = 0;
                wrapped = true;
            }
            if is_space {
                continue;
            }

            for grapheme in word.graphemes(true) {
                let grapheme_width = grapheme_width(grapheme);
                if current_width + grapheme_width > width && current_width > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push_str(grapheme);
                current_width += grapheme_width;
            }
        }

        lines.push(current.trim_end().to_string());
    }

    lines
}

enum Segment<'a> {
    Ansi(&'a str),
    Grapheme(&'a str),
}

fn segments(input: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut index = 0;

    while index < input.len() {
        if let Some(len) = ansi_sequence_len(input, index) {
            out.push(Segment::Ansi(&input[index..index + len]));
            index += len;
            continue;
        }

        // A lone ESC that starts no known sequence is kept as text.
        let search_from = if input.as_bytes()[index] == 0x1b {
            index + 1
        } else {
            index
        };
        let run_end = input[search_from..]
            .find('\x1b')
            .map_or(input.len(), |offset| search_from + offset);
        out.extend(input[index..run_end].graphemes(true).map(Segment::Grapheme));
        index = run_end;
    }

    out
}
