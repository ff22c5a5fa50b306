//! Text rendering of search results and counts for tool and CLI output.

use crate::headline::clean_headline;
use crate::types::{MatchCount, PageRequest, SearchQuery, SearchResult};

/// Shown in place of an empty headline.
pub const NO_HEADLINE: &str = "No Headline";

/// Cleans a headline for display, substituting [`NO_HEADLINE`] when it is empty.
pub fn presentable_headline(headline: &str) -> String {
    let cleaned = clean_headline(headline);
    if cleaned.is_empty() {
        NO_HEADLINE.to_string()
    } else {
        cleaned
    }
}

/// Renders result rows grouped per document, in the order they were streamed.
pub fn format_search_results(
    query: &SearchQuery,
    rows: &[SearchResult],
    total_documents: usize,
    page: PageRequest,
) -> String {
    let mut output = format!("Search results for '{}' ({} mode)", query.text, query.mode);
    if let (Some(page), Some(page_size)) = (page.page, page.page_size) {
        output.push_str(&format!(", page {} of size {}", page, page_size));
    }
    output.push_str(&format!(
        ": {} matching document(s) in total\n\n",
        total_documents
    ));

    if rows.is_empty() {
        output.push_str(if total_documents == 0 {
            "No documents matched.\n"
        } else {
            "No documents on this page.\n"
        });
        return output;
    }

    for (idx, group) in rows
        .chunk_by(|a, b| a.document_id == b.document_id)
        .enumerate()
    {
        let first = &group[0];
        output.push_str(&format!(
            "{}. {} [{}] (document {})\n",
            idx + 1,
            first.title,
            first.slug,
            first.document_id
        ));

        for row in group {
            let until = row
                .termination_date
                .map(|date| format!(" until {}", date))
                .unwrap_or_default();
            output.push_str(&format!(
                "   - version {}, effective {}{}\n     {}\n",
                row.id,
                row.effective_date,
                until,
                presentable_headline(&row.headline)
            ));
        }
        output.push('\n');
    }

    output
}

pub fn format_count(query: &SearchQuery, count: &MatchCount) -> String {
    format!(
        "'{}' ({} mode) matches {} document(s) and {} document version(s)\n",
        query.text, query.mode, count.num_documents, count.num_document_versions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchMode;
    use crate::types::{DocumentId, VersionId};
    use assert2::check;
    use chrono::NaiveDate;

    fn row(id: i64, document_id: i64, headline: &str) -> SearchResult {
        SearchResult {
            id: VersionId(id),
            title: format!("Document {}", document_id),
            slug: format!("document-{}", document_id),
            document_id: DocumentId(document_id),
            effective_date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            termination_date: (id == 1).then(|| NaiveDate::from_ymd_opt(2020, 9, 30).unwrap()),
            headline: headline.to_string(),
        }
    }

    #[test]
    fn test_rows_grouped_per_document() {
        let query = SearchQuery::new("guidance", SearchMode::Simple);
        let rows = vec![
            row(1, 7, "pandemic <mark>guidance</mark>"),
            row(2, 7, ""),
            row(3, 9, "  office   <mark>guidance</mark> "),
        ];
        let output = format_search_results(&query, &rows, 2, PageRequest::all());

        check!(output.starts_with("Search results for 'guidance' (simple mode): 2 matching"));
        check!(output.contains("1. Document 7 [document-7] (document 7)"));
        check!(output.contains("2. Document 9 [document-9] (document 9)"));
        check!(output.contains("version 1, effective 2020-05-01 until 2020-09-30"));
        check!(output.contains("pandemic <mark>guidance</mark>"));
        check!(output.contains(NO_HEADLINE));
        check!(output.contains("office <mark>guidance</mark>\n"));
    }

    #[test]
    fn test_empty_page_message() {
        let query = SearchQuery::new("guidance", SearchMode::Simple);
        let output = format_search_results(&query, &[], 3, PageRequest::page(5, 1));
        check!(output.contains("page 5 of size 1"));
        check!(output.contains("No documents on this page."));

        let output = format_search_results(&query, &[], 0, PageRequest::all());
        check!(output.contains("No documents matched."));
    }

    #[test]
    fn test_count_line() {
        let query = SearchQuery::new("mask", SearchMode::Normal);
        let count = MatchCount {
            num_documents: 2,
            num_document_versions: 5,
        };
        check!(
            format_count(&query, &count)
                == "'mask' (normal mode) matches 2 document(s) and 5 document version(s)\n"
        );
    }
}
