use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use indexmap::IndexMap;
use std::fmt;

use crate::error::ExtractError;
use crate::registry::{escape, CatalogEntry};

/// Locale used to order catalog entries by msgid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collation {
    locale: Locale,
}

impl Collation {
    /// Parse a BCP-47 tag and check that collation data exists for it.
    pub fn new(tag: &str) -> Result<Self, ExtractError> {
        let locale: Locale = tag.parse().map_err(|e| ExtractError::InvalidLocale {
            locale: tag.to_string(),
            reason: format!("{:?}", e),
        })?;
        let collation = Self { locale };
        collation.collator()?;
        Ok(collation)
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    // Collators are built per catalog; they are not shared between threads.
    fn collator(&self) -> Result<Collator, ExtractError> {
        Collator::try_new(&(&self.locale).into(), CollatorOptions::new()).map_err(|e| {
            ExtractError::InvalidLocale {
                locale: self.locale.to_string(),
                reason: format!("{:?}", e),
            }
        })
    }
}

impl Default for Collation {
    fn default() -> Self {
        Self { locale: Locale::UND }
    }
}

/// Headers plus entries of one rendered catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub headers: IndexMap<String, String>,
    pub items: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(headers: Option<IndexMap<String, String>>) -> Self {
        Self {
            headers: headers.unwrap_or_default(),
            items: Vec::new(),
        }
    }

    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        self.items.extend(entries);
    }

    /// Stable sort of the entries by msgid under the given collation.
    pub fn sort(&mut self, collation: &Collation) {
        match collation.collator() {
            Ok(collator) => self
                .items
                .sort_by(|a, b| collator.compare(&a.msgid, &b.msgid)),
            Err(e) => {
                tracing::warn!("{}; falling back to code point ordering", e);
                self.items.sort_by(|a, b| a.msgid.cmp(&b.msgid));
            }
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "msgid \"\"")?;
        writeln!(f, "msgstr \"\"")?;
        for (name, value) in &self.headers {
            let line = format!("{}: {}", name, value);
            writeln!(f, "\"{}\\n\"", escape_controls(&escape(&line)))?;
        }

        for item in &self.items {
            writeln!(f)?;
            for reference in &item.references {
                writeln!(f, "#: {}", reference)?;
            }
            write_string(f, "msgid", &item.msgid)?;
            if let Some(plural) = &item.msgid_plural {
                write_string(f, "msgid_plural", plural)?;
            }
            if item.msgstr.len() > 1 {
                for (i, msgstr) in item.msgstr.iter().enumerate() {
                    write_string(f, &format!("msgstr[{}]", i), &escape(msgstr))?;
                }
            } else {
                let msgstr = item.msgstr.first().map(String::as_str).unwrap_or_default();
                write_string(f, "msgstr", &escape(msgstr))?;
            }
        }

        Ok(())
    }
}

/// Write a keyword with an already quote-escaped value, splitting on newlines.
fn write_string(f: &mut fmt::Formatter<'_>, keyword: &str, escaped: &str) -> fmt::Result {
    let text = escape_controls(escaped);
    if !text.contains('\n') {
        return writeln!(f, "{} \"{}\"", keyword, text);
    }

    writeln!(f, "{} \"\"", keyword)?;
    for segment in text.split_inclusive('\n') {
        match segment.strip_suffix('\n') {
            Some(line) => writeln!(f, "\"{}\\n\"", line)?,
            None => writeln!(f, "\"{}\"", segment)?,
        }
    }
    Ok(())
}

fn escape_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{0c}' => out.push_str("\\f"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(msgid: &str, plural: Option<&str>, references: &[&str]) -> CatalogEntry {
        CatalogEntry {
            msgid: msgid.to_string(),
            msgid_plural: plural.map(str::to_string),
            references: references.iter().map(|r| r.to_string()).collect(),
            msgstr: if plural.is_some() {
                vec![String::new(), String::new()]
            } else {
                vec![String::new()]
            },
        }
    }

    fn default_headers() -> IndexMap<String, String> {
        IndexMap::from([
            (
                "Content-Type".to_string(),
                "text/plain; charset=UTF-8".to_string(),
            ),
            ("Content-Transfer-Encoding".to_string(), "8bit".to_string()),
        ])
    }

    #[test]
    fn test_render_headers_only() {
        let catalog = Catalog::new(Some(default_headers()));
        assert_eq!(
            catalog.to_string(),
            "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\"Content-Transfer-Encoding: 8bit\\n\"\n"
        );
    }

    #[test]
    fn test_missing_headers_render_empty_block() {
        let catalog = Catalog::new(None);
        assert!(catalog.headers.is_empty());
        assert_eq!(catalog.to_string(), "msgid \"\"\nmsgstr \"\"\n");
    }

    #[test]
    fn test_render_singular_and_plural_entries() {
        let mut catalog = Catalog::new(None);
        catalog.extend(vec![
            entry("Hello", None, &["a.html"]),
            entry("Bird", Some("Birds"), &["a.html", "b.html"]),
        ]);

        let expected = "msgid \"\"\nmsgstr \"\"\n\
\n#: a.html\nmsgid \"Hello\"\nmsgstr \"\"\n\
\n#: a.html\n#: b.html\nmsgid \"Bird\"\nmsgid_plural \"Birds\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n";
        assert_eq!(catalog.to_string(), expected);
    }

    #[test]
    fn test_render_multiline_message() {
        let mut catalog = Catalog::new(None);
        catalog.extend(vec![entry("Hello\n  world", None, &["a.html"])]);

        let rendered = catalog.to_string();
        assert!(rendered.contains("msgid \"\"\n\"Hello\\n\"\n\"  world\"\n"));
    }

    #[test]
    fn test_render_escapes_tabs() {
        let mut catalog = Catalog::new(None);
        catalog.extend(vec![entry("a\tb", None, &["a.html"])]);
        assert!(catalog.to_string().contains("msgid \"a\\tb\"\n"));
    }

    #[test]
    fn test_sort_is_locale_aware() {
        let mut catalog = Catalog::new(None);
        catalog.extend(vec![
            entry("b", None, &[]),
            entry("B", None, &[]),
            entry("á", None, &[]),
            entry("a", None, &[]),
            entry("c", None, &[]),
        ]);
        catalog.sort(&Collation::default());

        let ids: Vec<_> = catalog.items.iter().map(|i| i.msgid.as_str()).collect();
        assert_eq!(ids, vec!["a", "á", "b", "B", "c"]);
    }

    #[test]
    fn test_collation_rejects_malformed_tag() {
        let err = Collation::new("not a locale!").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidLocale { .. }));
    }

    #[test]
    fn test_collation_accepts_language_tag() {
        let collation = Collation::new("de").unwrap();
        assert_eq!(collation.locale().to_string(), "de");
    }
}
