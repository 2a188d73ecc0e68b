//! Fixed-width reflow of compiler diagnostics for display.
//!
//! Each input line is wrapped on its own: words are packed greedily, runs
//! of whitespace between words on the same output line are kept, whitespace
//! at the start or end of an output line is dropped, and a word longer than
//! the width is split. Hyphenated words may also break after a hyphen that
//! sits between a letter and a word character. A line with no words
//! produces no output, so blank lines disappear from the wrapped text.

/// Column width used for the compiler output page.
pub const DIAGNOSTIC_WIDTH: usize = 80;

/// Wraps every line of `text` to at most `width` characters and joins the
/// results with `\n`.
pub fn wrap_diagnostic(text: &str, width: usize) -> String {
    text.split('\n')
        .flat_map(|line| wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps a single line.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let line = line.replace('\t', "        ").replace('\r', "");
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut pending_space = String::new();

    for chunk in chunks(&line) {
        if chunk.starts_with(char::is_whitespace) {
            if current_len > 0 {
                pending_space = chunk.to_string();
            }
            continue;
        }
        let mut word: Vec<char> = chunk.chars().collect();
        let space_len = pending_space.chars().count();
        if current_len > 0 && current_len + space_len + word.len() <= width {
            current.push_str(&pending_space);
            current.extend(word.iter());
            current_len += space_len + word.len();
            pending_space.clear();
            continue;
        }
        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
        }
        pending_space.clear();
        while word.len() > width {
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        current.extend(word.iter());
        current_len = word.len();
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Splits into alternating runs of whitespace and non-whitespace, with
/// hyphenated words further cut into their breakable pieces.
fn chunks(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in line.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            push_run(&mut out, &line[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < line.len() {
        push_run(&mut out, &line[start..]);
    }
    out
}

fn push_run<'a>(out: &mut Vec<&'a str>, run: &'a str) {
    if run.starts_with(char::is_whitespace) {
        out.push(run);
        return;
    }
    let chars: Vec<(usize, char)> = run.char_indices().collect();
    let mut start = 0;
    for window in chars.windows(3) {
        let [(_, before), (_, '-'), (next, after)] = window else {
            continue;
        };
        if before.is_alphabetic() && after.is_alphanumeric() {
            out.push(&run[start..*next]);
            start = *next;
        }
    }
    out.push(&run[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_pass_through() {
        let text = "line 4: syntax error";
        assert_eq!(wrap_diagnostic(text, 80), text);
    }

    #[test]
    fn long_lines_break_between_words() {
        let text = "aaaa bbbb cccc dddd";
        assert_eq!(wrap_line(text, 9), vec!["aaaa bbbb", "cccc dddd"]);
        assert_eq!(wrap_line(text, 10), vec!["aaaa bbbb", "cccc dddd"]);
        assert_eq!(wrap_line(text, 14), vec!["aaaa bbbb cccc", "dddd"]);
    }

    #[test]
    fn overlong_words_are_split() {
        assert_eq!(wrap_line("abcdefghij xy", 4), ["abcd", "efgh", "ij", "xy"]);
        assert_eq!(wrap_line("ab abcdefghij", 4), ["ab", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn edge_whitespace_is_dropped_inner_kept() {
        assert_eq!(wrap_line("   indented  twice   ", 80), ["indented  twice"]);
        assert_eq!(wrap_line("one two", 3), vec!["one", "two"]);
    }

    #[test]
    fn blank_lines_vanish() {
        let text = "first\n\n   \nsecond\n";
        assert_eq!(wrap_diagnostic(text, 80), "first\nsecond");
        assert!(wrap_line("", 80).is_empty());
    }

    #[test]
    fn hyphenated_words_break_after_the_hyphen() {
        assert_eq!(
            wrap_line("call to read-only-variable", 17),
            vec!["call to read-", "only-variable"]
        );
        assert_eq!(wrap_line("self-test", 80), vec!["self-test"]);
        let unbroken = wrap_line("x = 3-4 and -flag", 7);
        assert_eq!(unbroken, ["x = 3-4", "and", "-flag"]);
    }

    #[test]
    fn every_output_line_fits() {
        let text = "Error in procedure MAIN at line 12: the variable SCORE is used before \
                    it has been given a value; give it a value first, for example SCORE = 0";
        let wrapped = wrap_diagnostic(text, DIAGNOSTIC_WIDTH);
        assert!(wrapped.lines().count() > 1);
        let fits = |line: &str| line.chars().count() <= DIAGNOSTIC_WIDTH;
        assert!(wrapped.lines().all(fits));
        let rejoined: Vec<&str> = wrapped.split_whitespace().collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }
}
