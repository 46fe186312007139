use regex::Regex;

/// Number of alternative quote groups in the compiled pattern (`'`, `"`, `&quot;`).
const QUOTE_GROUPS: usize = 3;

/// Matcher for `<start> 'text' | translate <end>` interpolation expressions.
///
/// The compiled regex is immutable and shared; all scanning state lives in a
/// [`DelimiterScanner`], which is created fresh for every text that is scanned.
#[derive(Debug, Clone)]
pub struct DelimiterMatcher {
    regex: Regex,
}

impl DelimiterMatcher {
    /// Build a matcher for the given delimiter pair.
    ///
    /// When both delimiters are empty the start anchor becomes the beginning
    /// of the scanned text, which is how attribute values are matched.
    pub fn new(start_delim: &str, end_delim: &str) -> Result<Self, regex::Error> {
        let mut start = regex::escape(start_delim);
        let end = regex::escape(end_delim);

        if start.is_empty() && end.is_empty() {
            start = "^".to_string();
        }

        // The quote must close with the same token it opened with; each quote
        // style gets its own lazy capture group since `regex` has no backreferences.
        let pattern = format!(
            r#"{start}\s*(?:'(.*?)'|"(.*?)"|&quot;(.*?)&quot;)\s*\|\s*translate\s*{end}"#
        );

        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// Matcher without delimiters, anchored at the start of the text.
    pub fn undelimited() -> Result<Self, regex::Error> {
        Self::new("", "")
    }

    /// Scan `text` left to right, yielding every captured message.
    pub fn scan<'m, 't>(&'m self, text: &'t str) -> DelimiterScanner<'m, 't> {
        DelimiterScanner {
            regex: &self.regex,
            text,
            cursor: 0,
        }
    }

    /// First captured message in `text`, if any.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.scan(text).next()
    }
}

/// Iterator over the non-overlapping matches of a [`DelimiterMatcher`] in one text.
#[derive(Debug)]
pub struct DelimiterScanner<'m, 't> {
    regex: &'m Regex,
    text: &'t str,
    cursor: usize,
}

impl<'m, 't> DelimiterScanner<'m, 't> {
    /// Byte offset where the next search starts.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<'m, 't> Iterator for DelimiterScanner<'m, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor <= self.text.len() {
            let caps = self.regex.captures_at(self.text, self.cursor)?;
            let whole = caps.get(0)?;

            // The pattern always consumes the quotes and `translate`, so a
            // match is never empty; stop rather than loop if that ever changes.
            self.cursor = if whole.end() > whole.start() {
                whole.end()
            } else {
                self.text.len() + 1
            };

            if let Some(text) = (1..=QUOTE_GROUPS).find_map(|i| caps.get(i)) {
                return Some(text.as_str());
            }
        }
        None
    }
}
