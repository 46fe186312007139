use scraper::{ElementRef, Html};

use crate::delimiter::DelimiterMatcher;
use crate::registry::Occurrence;

const DOCUMENT_ELEMENTS: [&str; 3] = ["html", "head", "body"];

/// Ways an element attribute can mark a translatable string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `translate`: inner content is the message, `translate-plural` the plural
    PlainTranslate,
    /// `data-translate`: inner content is the message, `data-translate-plural` the plural
    DataTranslate,
    /// Any other attribute whose value is `'text' | translate`
    DelimiterAttribute(String),
}

impl Marker {
    /// Attribute holding the plural form for content markers.
    pub fn plural_attribute(&self) -> Option<&'static str> {
        match self {
            Marker::PlainTranslate => Some("translate-plural"),
            Marker::DataTranslate => Some("data-translate-plural"),
            Marker::DelimiterAttribute(_) => None,
        }
    }
}

/// Extracts strings from markup using the attribute markers and the
/// interpolation delimiters.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    interpolation: DelimiterMatcher,
    attribute: DelimiterMatcher,
}

impl HtmlExtractor {
    pub fn new(interpolation: DelimiterMatcher, attribute: DelimiterMatcher) -> Self {
        Self {
            interpolation,
            attribute,
        }
    }

    /// Collect every occurrence in `source`, element markers first, then
    /// interpolations found anywhere in the raw text.
    ///
    /// The markup is parsed as template contents so that partials made of
    /// table parts (`<tr>`, `<td>`, `<th>`) keep their elements. Template
    /// contents drop `<html>`, `<head>` and `<body>` tags, so their
    /// attributes are read from a document parse instead.
    pub fn extract(&self, source: &str) -> Vec<Occurrence> {
        let mut occurrences = Vec::new();

        let document = Html::parse_document(source);
        let roots = document
            .tree
            .nodes()
            .filter_map(ElementRef::wrap)
            .filter(|element| DOCUMENT_ELEMENTS.contains(&element.value().name()));
        self.collect(roots, &mut occurrences);

        let fragment = Html::parse_fragment(&format!("<template>{}</template>", source));
        self.collect(
            fragment.tree.nodes().filter_map(ElementRef::wrap),
            &mut occurrences,
        );

        occurrences.extend(self.interpolation.scan(source).map(Occurrence::singular));

        occurrences
    }

    fn collect<'a>(
        &self,
        elements: impl Iterator<Item = ElementRef<'a>>,
        occurrences: &mut Vec<Occurrence>,
    ) {
        for element in elements {
            for marker in self.markers(&element) {
                occurrences.push(occurrence_for(&element, marker));
            }
        }
    }

    /// Markers carried by one element, in attribute order.
    ///
    /// `data-translate` is resolved after the attribute loop and only once,
    /// whatever its value.
    fn markers(&self, element: &ElementRef<'_>) -> Vec<Marker> {
        let mut markers = Vec::new();
        let attrs = element.value();

        for (name, value) in attrs.attrs() {
            if name == "translate" {
                markers.push(Marker::PlainTranslate);
            } else if let Some(text) = self.attribute.first_match(value) {
                markers.push(Marker::DelimiterAttribute(text.to_string()));
            }
        }

        if attrs.attr("data-translate").is_some() {
            markers.push(Marker::DataTranslate);
        }

        markers
    }
}

fn occurrence_for(element: &ElementRef<'_>, marker: Marker) -> Occurrence {
    let plural = marker
        .plural_attribute()
        .and_then(|name| element.value().attr(name))
        .map(str::to_string);

    match marker {
        Marker::DelimiterAttribute(text) => Occurrence::singular(text),
        Marker::PlainTranslate | Marker::DataTranslate => Occurrence {
            text: element.inner_html(),
            plural,
        },
    }
}
