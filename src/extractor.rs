use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{Catalog, Collation};
use crate::config::Config;
use crate::delimiter::DelimiterMatcher;
use crate::error::{ExtractError, PluginError};
use crate::html::HtmlExtractor;
use crate::js;
use crate::registry::{Occurrence, Registry};

/// Extraction grammar applied to a file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Html,
    Js,
}

impl Strategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "html" => Some(Self::Html),
            "js" => Some(Self::Js),
            _ => None,
        }
    }
}

/// Content of a file travelling through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// No content at all; forwarded untouched
    Null,
    /// Fully buffered bytes
    Buffer(Vec<u8>),
    /// Chunked content, which cannot be extracted
    Stream,
}

/// A file handed over by the host pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: Contents,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Buffer(contents.into()),
        }
    }

    pub fn null(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Null,
        }
    }

    pub fn stream(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Stream,
        }
    }

    /// Buffered content decoded as UTF-8 (lossily).
    pub fn text(&self) -> Option<String> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Contents::Null | Contents::Stream => None,
        }
    }
}

/// One unit of pipeline output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    File(SourceFile),
    Error(PluginError),
}

/// Maps a file, a trimmed message and its plural to a reference string
pub type FileReferenceFn = Arc<dyn Fn(&SourceFile, &str, Option<&str>) -> String + Send + Sync>;

/// Produces the catalog headers for a file
pub type HeadersFn = Arc<dyn Fn(&SourceFile) -> Option<IndexMap<String, String>> + Send + Sync>;

/// Result of extracting one file: its registry and any plural conflicts
#[derive(Debug, Default)]
pub struct FilePass {
    pub registry: Registry,
    pub conflicts: Vec<ExtractError>,
}

impl FilePass {
    pub fn failed(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Turns source files into per-file gettext catalogs.
///
/// Holds only immutable configuration, so one instance can serve many files,
/// including from several threads at once.
#[derive(Clone)]
pub struct Extractor {
    extensions: IndexMap<String, Strategy>,
    html: HtmlExtractor,
    collation: Collation,
    file_reference: FileReferenceFn,
    headers: HeadersFn,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("extensions", &self.extensions)
            .field("html", &self.html)
            .field("collation", &self.collation)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// Validate `config` and compile the matchers.
    pub fn new(config: &Config) -> Result<Self, ExtractError> {
        let mut extensions = IndexMap::new();
        for (extension, strategy) in &config.extensions {
            let parsed =
                Strategy::parse(strategy).ok_or_else(|| ExtractError::InvalidStrategy {
                    strategy: strategy.clone(),
                    extension: extension.clone(),
                })?;
            extensions.insert(extension.clone(), parsed);
        }

        let delimiter_error = |e: regex::Error| ExtractError::InvalidDelimiter {
            start: config.start_delim.clone(),
            end: config.end_delim.clone(),
            reason: e.to_string(),
        };
        let interpolation = DelimiterMatcher::new(&config.start_delim, &config.end_delim)
            .map_err(delimiter_error)?;
        let attribute = DelimiterMatcher::undelimited().map_err(delimiter_error)?;

        let headers = config.headers.clone();

        Ok(Self {
            extensions,
            html: HtmlExtractor::new(interpolation, attribute),
            collation: Collation::new(&config.sort_locale)?,
            file_reference: Arc::new(|file: &SourceFile, _: &str, _: Option<&str>| {
                file.path.display().to_string()
            }),
            headers: Arc::new(move |_: &SourceFile| Some(headers.clone())),
        })
    }

    /// Replace the reference callback (default: the file path).
    pub fn with_file_reference<F>(mut self, file_reference: F) -> Self
    where
        F: Fn(&SourceFile, &str, Option<&str>) -> String + Send + Sync + 'static,
    {
        self.file_reference = Arc::new(file_reference);
        self
    }

    /// Replace the headers callback (default: the configured headers).
    pub fn with_headers<F>(mut self, headers: F) -> Self
    where
        F: Fn(&SourceFile) -> Option<IndexMap<String, String>> + Send + Sync + 'static,
    {
        self.headers = Arc::new(headers);
        self
    }

    /// Strategy configured for the extension of `path`.
    pub fn strategy_for(&self, path: &Path) -> Option<Strategy> {
        let extension = path.extension()?.to_str()?;
        self.extensions.get(&format!(".{}", extension)).copied()
    }

    /// Run the extraction for one file's decoded `source`.
    ///
    /// Every occurrence is registered even after a conflict so that all
    /// conflicts of the file are reported.
    pub fn extract(&self, file: &SourceFile, source: &str) -> FilePass {
        let occurrences = match self.strategy_for(&file.path) {
            Some(Strategy::Html) => self.html.extract(source),
            Some(Strategy::Js) => js::extract_messages(source, &file.path)
                .into_iter()
                .map(Occurrence::singular)
                .collect(),
            None => Vec::new(),
        };

        tracing::debug!(
            "{}: {} occurrence(s) found",
            file.path.display(),
            occurrences.len()
        );

        let mut pass = FilePass::default();
        for occurrence in &occurrences {
            let registered = pass.registry.register(
                |message, plural| (self.file_reference)(file, message, plural),
                &occurrence.text,
                occurrence.plural.as_deref(),
            );
            if let Err(conflict) = registered {
                pass.conflicts.push(conflict);
            }
        }
        pass
    }

    /// Build the sorted catalog for `file` from a finished registry.
    pub fn render(&self, file: &SourceFile, registry: Registry) -> Catalog {
        let mut catalog = Catalog::new((self.headers)(file));
        catalog.extend(registry.into_entries());
        catalog.sort(&self.collation);
        catalog
    }

    /// Process one file, yielding the events to forward downstream.
    pub fn transform(&self, mut file: SourceFile) -> Vec<Event> {
        let source = match &file.contents {
            Contents::Null => return vec![Event::File(file)],
            Contents::Buffer(bytes) if bytes.is_empty() => return vec![Event::File(file)],
            Contents::Stream => {
                return vec![Event::Error(ExtractError::StreamingNotSupported.into())]
            }
            Contents::Buffer(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        };

        let pass = self.extract(&file, &source);
        let mut events: Vec<Event> = pass
            .conflicts
            .iter()
            .cloned()
            .map(|conflict| Event::Error(conflict.into()))
            .collect();

        if pass.failed() {
            tracing::debug!(
                "{}: {} plural conflict(s), content left unchanged",
                file.path.display(),
                pass.conflicts.len()
            );
        } else {
            let catalog = self.render(&file, pass.registry);
            file.contents = Contents::Buffer(catalog.to_string().into_bytes());
        }

        events.push(Event::File(file));
        events
    }

    /// Process a sequence of files one after another.
    pub fn run<I>(&self, files: I) -> Vec<Event>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        files
            .into_iter()
            .flat_map(|file| self.transform(file))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(&Config::default()).unwrap()
    }

    fn catalog_text(events: &[Event]) -> String {
        match events.last() {
            Some(Event::File(file)) => file.text().unwrap(),
            other => panic!("expected a file event, got {:?}", other),
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(Strategy::parse("html"), Some(Strategy::Html));
        assert_eq!(Strategy::parse("js"), Some(Strategy::Js));
        assert_eq!(Strategy::parse("css"), None);
    }

    #[test]
    fn test_invalid_strategy_is_rejected() {
        let mut config = Config::default();
        config
            .extensions
            .insert(".css".to_string(), "css".to_string());

        let err = Extractor::new(&config).unwrap_err();
        assert_eq!(
            err,
            ExtractError::InvalidStrategy {
                strategy: "css".to_string(),
                extension: ".css".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_sort_locale_is_rejected() {
        let config = Config {
            sort_locale: "!!".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            Extractor::new(&config),
            Err(ExtractError::InvalidLocale { .. })
        ));
    }

    #[test]
    fn test_strategy_for_extension() {
        let extractor = extractor();
        assert_eq!(
            extractor.strategy_for(Path::new("views/a.phtml")),
            Some(Strategy::Html)
        );
        assert_eq!(
            extractor.strategy_for(Path::new("app.js")),
            Some(Strategy::Js)
        );
        assert_eq!(extractor.strategy_for(Path::new("style.css")), None);
        assert_eq!(extractor.strategy_for(Path::new("Makefile")), None);
    }

    #[test]
    fn test_null_file_passes_through() {
        let file = SourceFile::null("a.html");
        assert_eq!(extractor().transform(file.clone()), vec![Event::File(file)]);
    }

    #[test]
    fn test_empty_buffer_passes_through() {
        let file = SourceFile::new("a.html", Vec::new());
        assert_eq!(extractor().transform(file.clone()), vec![Event::File(file)]);
    }

    #[test]
    fn test_stream_is_rejected() {
        let events = extractor().transform(SourceFile::stream("a.html"));
        assert_eq!(
            events,
            vec![Event::Error(PluginError::new(
                ExtractError::StreamingNotSupported
            ))]
        );
    }

    #[test]
    fn test_html_file_is_replaced_with_catalog() {
        let events = extractor().transform(SourceFile::new(
            "test.html",
            "<div translate>Hello</div>",
        ));
        assert_eq!(events.len(), 1);
        let text = catalog_text(&events);
        assert!(text.contains("#: test.html\nmsgid \"Hello\"\nmsgstr \"\"\n"));
    }

    #[test]
    fn test_js_file_is_replaced_with_catalog() {
        let events =
            extractor().transform(SourceFile::new("app.js", "gettext('a' + 'b');"));
        assert!(catalog_text(&events).contains("#: app.js\nmsgid \"ab\"\n"));
    }

    #[test]
    fn test_unknown_extension_yields_headers_only() {
        let events = extractor().transform(SourceFile::new("notes.txt", "{{'Hi' | translate}}"));
        let text = catalog_text(&events);
        assert!(text.starts_with("msgid \"\"\nmsgstr \"\"\n"));
        assert!(!text.contains("Hi"));
    }

    #[test]
    fn test_plural_conflict_leaves_content_unchanged() {
        let source = "<p translate translate-plural=\"Birds\">Bird</p>\
                      <p translate translate-plural=\"Birdies\">Bird</p>";
        let file = SourceFile::new("birds.html", source);
        let events = extractor().transform(file.clone());

        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::Error(err) => assert_eq!(
                err.message(),
                "Incompatible plural definitions for Bird: Birds / Birdies (in: birds.html)"
            ),
            other => panic!("expected an error event, got {:?}", other),
        }
        assert_eq!(events[1], Event::File(file));
    }

    #[test]
    fn test_every_conflict_is_reported() {
        let source = "<p translate translate-plural=\"B1\">A</p>\
                      <p translate translate-plural=\"B2\">A</p>\
                      <p translate translate-plural=\"B3\">A</p>";
        let events = extractor().transform(SourceFile::new("a.html", source));
        let errors = events
            .iter()
            .filter(|e| matches!(e, Event::Error(_)))
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn test_custom_file_reference() {
        let extractor = extractor().with_file_reference(|file, message, _| {
            format!("{}#{}", file.path.display(), message.len())
        });
        let events = extractor.transform(SourceFile::new("a.html", "<b translate>Hey</b>"));
        assert!(catalog_text(&events).contains("#: a.html#3\n"));
    }

    #[test]
    fn test_custom_headers() {
        let extractor = extractor().with_headers(|file| {
            Some(IndexMap::from([(
                "X-Source".to_string(),
                file.path.display().to_string(),
            )]))
        });
        let events = extractor.transform(SourceFile::new("a.html", "<b translate>Hey</b>"));
        assert!(catalog_text(&events).starts_with("msgid \"\"\nmsgstr \"\"\n\"X-Source: a.html\\n\"\n"));
    }

    #[test]
    fn test_headers_callback_returning_none() {
        let extractor = extractor().with_headers(|_| None);
        let events = extractor.transform(SourceFile::new("a.html", "<b translate>Hey</b>"));
        assert!(catalog_text(&events).starts_with("msgid \"\"\nmsgstr \"\"\n\n#: a.html"));
    }

    #[test]
    fn test_run_keeps_files_independent() {
        let events = extractor().run(vec![
            SourceFile::new("a.html", "<b translate>One</b>"),
            SourceFile::stream("b.html"),
            SourceFile::new("c.html", "<b translate>Two</b>"),
        ]);

        assert_eq!(events.len(), 3);
        let a = match &events[0] {
            Event::File(file) => file.text().unwrap(),
            other => panic!("unexpected {:?}", other),
        };
        assert!(matches!(events[1], Event::Error(_)));
        let c = match &events[2] {
            Event::File(file) => file.text().unwrap(),
            other => panic!("unexpected {:?}", other),
        };
        assert!(a.contains("One") && !a.contains("Two"));
        assert!(c.contains("Two") && !c.contains("One"));
    }

    #[test]
    fn test_extract_exposes_registry() {
        let extractor = extractor();
        let file = SourceFile::new("a.html", "");
        let pass = extractor.extract(&file, "<i translate> Hi </i>{{'Hi' | translate}}");
        assert!(!pass.failed());
        assert_eq!(pass.registry.len(), 1);
        assert_eq!(pass.registry.get("Hi").unwrap().references, vec!["a.html"]);
    }
}
