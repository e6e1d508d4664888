//! Splitting scene text into pages.

/// Splits raw text into pages at blank lines.
///
/// A page break is a newline, any run of whitespace, then another newline.
/// Pages are trimmed and empty ones dropped; the result always holds at
/// least one page, possibly `""`.
#[must_use]
pub fn split_pages(raw: &str) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.split('\n') {
        if line.trim().is_empty() && !current.is_empty() {
            flush(&mut current, &mut pages);
        } else if !line.trim().is_empty() {
            current.push(line);
        }
    }
    flush(&mut current, &mut pages);

    if pages.is_empty() {
        pages.push(String::new());
    }
    pages
}

fn flush(lines: &mut Vec<&str>, pages: &mut Vec<String>) {
    let page = lines.join("\n");
    let page = page.trim();
    if !page.is_empty() {
        pages.push(page.to_owned());
    }
    lines.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_blank_lines() {
        assert_eq!(split_pages("Hello\n\nWorld"), vec!["Hello", "World"]);
    }

    #[test]
    fn test_whitespace_only_lines_break_pages() {
        assert_eq!(split_pages("A\n   \n\t\nB"), vec!["A", "B"]);
    }

    #[test]
    fn test_single_newline_stays_on_page() {
        assert_eq!(split_pages("line one\nline two"), vec!["line one\nline two"]);
    }

    #[test]
    fn test_indentation_inside_page_is_kept() {
        assert_eq!(split_pages("  A\n  B\n\n C "), vec!["A\n  B", "C"]);
    }

    #[test]
    fn test_carriage_returns_count_as_whitespace() {
        assert_eq!(split_pages("A\r\n\r\nB"), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_text_yields_one_empty_page() {
        assert_eq!(split_pages(""), vec![""]);
        assert_eq!(split_pages("\n\n \n"), vec![""]);
        assert_eq!(split_pages("  \n\n  "), vec![""]);
    }

    #[test]
    fn test_leading_and_trailing_breaks_are_dropped() {
        assert_eq!(split_pages("\n\nA\n\n\n\nB\n\n"), vec!["A", "B"]);
    }
}
