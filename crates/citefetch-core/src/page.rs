//! arXiv abstract-page model.
//!
//! Selector-based scraping of one known page layout: the paper title and
//! author list in the header, the outbound Google Scholar reference in the
//! sidebar, and the metadata table the citation row gets appended to.

use scraper::{Html, Selector};
use url::Url;

use citefetch_scholar::is_scholar_url;

use crate::CitationQuery;
use crate::agent::CITATION_LABEL;

/// Whether `s` is an arXiv abstract page URL (`arxiv.org/abs/...`).
pub fn is_abstract_url(s: &str) -> bool {
    let Ok(url) = Url::parse(s) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    matches!(url.host_str(), Some("arxiv.org") | Some("www.arxiv.org"))
        && url.path().contains("/abs/")
}

/// The fields of an abstract page the citation pipeline needs, extracted
/// once. Owned strings only: `scraper`'s DOM types are not `Send` and must
/// not be held across an await.
#[derive(Debug, Clone)]
pub struct AbstractPage {
    scholar_link: Option<String>,
    title: Option<String>,
    first_author: Option<String>,
    has_metatable: bool,
    metatable_labels: Vec<String>,
}

impl AbstractPage {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let link_sel = Selector::parse("a.cite-google-scholar").unwrap();
        let title_sel = Selector::parse("h1.title").unwrap();
        let author_sel = Selector::parse("div.authors a").unwrap();
        let table_sel = Selector::parse("div.metatable table").unwrap();
        let label_sel = Selector::parse("td.tablecell.label").unwrap();

        let scholar_link = document
            .select(&link_sel)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| is_scholar_url(href))
            .map(String::from);

        let title = document.select(&title_sel).next().map(|h1| {
            let text: String = h1.text().collect();
            // The heading embeds a "Title:" descriptor span.
            text.trim()
                .trim_start_matches("Title:")
                .trim()
                .to_string()
        });
        let title = title.filter(|t| !t.is_empty());

        let first_author = document
            .select(&author_sel)
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string())
            .filter(|a| !a.is_empty());

        let metatable = document.select(&table_sel).next();
        let has_metatable = metatable.is_some();
        let metatable_labels = metatable
            .map(|table| {
                table
                    .select(&label_sel)
                    .map(|td| td.text().collect::<String>().trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            scholar_link,
            title,
            first_author,
            has_metatable,
            metatable_labels,
        }
    }

    /// The page's outbound Scholar reference, if it carries a valid one.
    pub fn scholar_link(&self) -> Option<&str> {
        self.scholar_link.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn first_author(&self) -> Option<&str> {
        self.first_author.as_deref()
    }

    /// Whether the metadata table (the insertion anchor point) exists.
    pub fn has_anchor_point(&self) -> bool {
        self.has_metatable
    }

    /// Whether a citation row has already been rendered into the table.
    pub fn has_citation_row(&self) -> bool {
        self.metatable_labels
            .iter()
            .any(|label| label == CITATION_LABEL)
    }

    /// The query to hand the fetch service: the direct Scholar reference
    /// when the page has one, otherwise a title + first-author search.
    /// `None` when the page offers neither.
    pub fn citation_query(&self) -> Option<CitationQuery> {
        if let Some(link) = &self.scholar_link {
            return Some(CitationQuery::Reference(link.clone()));
        }
        let title = self.title.as_ref()?;
        Some(CitationQuery::Search {
            title: title.clone(),
            first_author: self.first_author.clone().unwrap_or_default(),
        })
    }
}
