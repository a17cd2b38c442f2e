//! Instructions and input formatting for the research providers

use crate::engines::WebHit;
use crate::llm::OutputSchema;
use crate::research::{SearchDirective, SearchFinding};
use serde_json::json;

/// Planner instructions asking for `count` searches
pub fn planner_instructions(count: usize) -> String {
    format!(
        "You are a helpful research assistant. Given a query, come up with a set of web searches \
         to perform to best answer the query. Output {} terms to query for.\n\n\
         Think strategically:\n\
         - Cover different aspects of the topic\n\
         - Include specific and broad searches\n\
         - Consider recent developments vs. foundational information\n\
         - Look for data, opinions, and comparisons\n",
        count
    )
}

pub const SEARCH_INSTRUCTIONS: &str = "You are a research assistant. Given a search term, you \
search the web for that term and produce a concise summary of the results. The summary must be \
2-3 paragraphs and less than 300 words. Capture the main points. Write succinctly, no need to have \
complete sentences or good grammar. This will be consumed by someone synthesizing a report, so it \
is vital you capture the essence and ignore any fluff. Do not include any additional commentary \
other than the summary itself.";

pub const SUMMARIZE_INSTRUCTIONS: &str = "You are a research assistant. You are given a search \
term and the top web results for it. Produce a concise summary of what the results say, 2-3 \
paragraphs and less than 300 words. Capture the main points and cite the source URLs inline. \
Do not include any additional commentary other than the summary itself.";

pub const WRITER_INSTRUCTIONS: &str = "You are a senior researcher tasked with writing a cohesive \
report for a research query. You will be provided with the original query, and some initial \
research done by a research assistant.\n\
You should first come up with an outline for the report that describes the structure and flow of \
the report. Then, generate the report and return that as your final output.\n\
The final output should be in markdown format, and it should be lengthy and detailed. Aim for \
5-10 pages of content, at least 1000 words. Use proper headings, subheadings, and formatting.";

pub fn planner_input(query: &str) -> String {
    format!("Query: {}", query)
}

pub fn search_input(directive: &SearchDirective) -> String {
    format!(
        "Search term: {}\nReason for searching: {}",
        directive.query, directive.reason
    )
}

/// Search term plus numbered hits, for summarizing scraped results
pub fn hits_input(directive: &SearchDirective, hits: &[WebHit]) -> String {
    let mut input = search_input(directive);
    input.push_str("\n\nResults:\n");
    for (i, hit) in hits.iter().enumerate() {
        input.push_str(&format!("{}. {} ({})\n", i + 1, hit.title, hit.url));
        if let Some(snippet) = &hit.snippet {
            input.push_str(&format!("   {}\n", snippet));
        }
    }
    input
}

pub fn writer_input(query: &str, findings: &[SearchFinding]) -> String {
    let results = serde_json::to_string_pretty(findings).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Original query: {}\n\nSummarized search results:\n{}",
        query, results
    )
}

pub fn plan_schema() -> OutputSchema {
    OutputSchema::new(
        "web_search_plan",
        json!({
            "type": "object",
            "properties": {
                "searches": {
                    "type": "array",
                    "description": "A list of web searches to perform to best answer the query.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "reason": {
                                "type": "string",
                                "description": "Your reasoning for why this search is important to the query."
                            },
                            "query": {
                                "type": "string",
                                "description": "The search term to use for the web search."
                            }
                        },
                        "required": ["reason", "query"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["searches"],
            "additionalProperties": false
        }),
    )
}

pub fn report_schema() -> OutputSchema {
    OutputSchema::new(
        "report_data",
        json!({
            "type": "object",
            "properties": {
                "short_summary": {
                    "type": "string",
                    "description": "A short 2-3 sentence summary of the findings."
                },
                "markdown_report": {
                    "type": "string",
                    "description": "The final report in markdown format, 1000+ words."
                },
                "follow_up_questions": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Suggested topics to research further, 3-5 questions."
                }
            },
            "required": ["short_summary", "markdown_report", "follow_up_questions"],
            "additionalProperties": false
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs() {
        let directive = SearchDirective::new("rust agents", "find frameworks");
        assert_eq!(planner_input("q"), "Query: q");
        assert_eq!(
            search_input(&directive),
            "Search term: rust agents\nReason for searching: find frameworks"
        );
        assert!(planner_instructions(7).contains("Output 7 terms"));
    }

    #[test]
    fn test_writer_input_lists_findings() {
        let input = writer_input("q", &["one".to_string(), "two".to_string()]);
        assert!(input.starts_with("Original query: q\n\nSummarized search results:\n["));
        assert!(input.contains("\"two\""));

        let empty = writer_input("q", &[]);
        assert!(empty.ends_with("[]"));
    }

    #[test]
    fn test_hits_input() {
        let directive = SearchDirective::new("q", "r");
        let hits = vec![
            WebHit::new("A", "https://a.example").with_snippet("alpha"),
            WebHit::new("B", "https://b.example"),
        ];
        let input = hits_input(&directive, &hits);
        assert!(input.contains("1. A (https://a.example)\n   alpha\n"));
        assert!(input.ends_with("2. B (https://b.example)\n"));
    }
}
