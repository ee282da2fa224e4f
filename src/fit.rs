pub const ELLIPSIS: &str = "...";

const CHARS_PER_STEP: usize = 4;

/// Always restarts from `original`, so repeated fits never accumulate.
pub fn fit<M>(original: &str, measure: M, container_width: i32) -> String
where
    M: Fn(&str) -> i32,
{
    if measure(original) < container_width {
        return original.to_string();
    }

    let mut rest: &str = original;
    loop {
        rest = drop_front_chars(rest, CHARS_PER_STEP);
        if rest.is_empty() {
            return ELLIPSIS.to_string();
        }
        let candidate = format!("{ELLIPSIS}{rest}");
        if measure(&candidate) < container_width {
            return candidate;
        }
    }
}

fn drop_front_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

pub fn display_width(text: &str) -> i32 {
    let width = ratatui::text::Line::from(text).width();
    i32::try_from(width).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedLabel {
    original: String,
    rendered: String,
}

impl TruncatedLabel {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            rendered: original.clone(),
            original,
        }
    }

    #[cfg(test)]
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn refit<M>(&mut self, container_width: i32, measure: M)
    where
        M: Fn(&str) -> i32,
    {
        self.rendered = fit(&self.original, measure, container_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(text: &str) -> i32 {
        text.chars().count() as i32
    }

    #[test]
    fn short_text_is_returned_unchanged() {
        assert_eq!(fit("src/main.rs", chars, 40), "src/main.rs");
    }

    #[test]
    fn text_equal_to_width_is_truncated() {
        // Fits only when strictly narrower than the container.
        assert_eq!(fit("abcdefgh", chars, 8), "...efgh");
    }

    #[test]
    fn long_path_keeps_rightmost_components() {
        let got = fit("crates/core/src/reconcile/tree.rs", chars, 20);
        assert_eq!(got, "...ncile/tree.rs");
        assert!(chars(&got) < 20);
    }

    #[test]
    fn non_positive_width_terminates_with_ellipsis() {
        for text in ["", "a", "ab", "abc", "abcd", "a/very/long/path/name.txt"] {
            assert_eq!(fit(text, chars, 0), ELLIPSIS);
            assert_eq!(fit(text, chars, -12), ELLIPSIS);
        }
    }

    #[test]
    fn text_shorter_than_one_step_falls_to_terminal() {
        assert_eq!(fit("abc", chars, 2), ELLIPSIS);
    }

    #[test]
    fn fit_is_idempotent() {
        let inputs = [
            "",
            "abc",
            "abcd",
            "src/lib.rs",
            "crates/core/src/reconcile/tree.rs",
            "日本語/ディレクトリ/ファイル.txt",
        ];
        for width in [-1, 0, 1, 3, 4, 5, 8, 13, 21, 60] {
            for input in inputs {
                let once = fit(input, display_width, width);
                let twice = fit(&once, display_width, width);
                assert_eq!(once, twice, "input={input:?} width={width}");
            }
        }
    }

    #[test]
    fn repeated_refits_do_not_accumulate_truncation() {
        let mut label = TruncatedLabel::new("docs/guide/getting-started.md");
        label.refit(12, chars);
        assert_eq!(label.rendered(), "...ed.md");
        label.refit(10, chars);
        label.refit(12, chars);
        assert_eq!(label.rendered(), "...ed.md");
        label.refit(80, chars);
        assert_eq!(label.rendered(), label.original());
    }

    #[test]
    fn multibyte_characters_are_dropped_whole() {
        let got = fit("ééééééé/x", chars, 9);
        assert_eq!(got, "...ééé/x");
    }
}
