//! Terminal, Markdown and CSV-cell rendering of justifications and citations.

use clap::ValueEnum;

use crate::justify::{Justification, JustificationRecord};
use crate::pubmed::Citation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
}

pub fn render(
    format: OutputFormat,
    record: &JustificationRecord,
    justification: &Justification,
) -> String {
    match format {
        OutputFormat::Text => render_text(record, justification),
        OutputFormat::Markdown => render_markdown(record, justification),
    }
}

fn render_text(record: &JustificationRecord, justification: &Justification) -> String {
    let mut output = format!(
        "Justification for {} in {}\n\n",
        record.excipient.trim(),
        record.drug_name.trim()
    );
    output.push_str(justification.text.trim_end());
    output.push_str("\n\n");
    output.push_str(&citation_list(&justification.citations));
    output
}

fn render_markdown(record: &JustificationRecord, justification: &Justification) -> String {
    let mut output = format!(
        "# Justification: {} in {}\n\n",
        sanitize_heading(record.excipient.trim()),
        sanitize_heading(record.drug_name.trim())
    );
    output.push_str(&format!(
        "- **Formulation type:** {}\n- **Excipient role:** {}\n\n",
        record.formulation_type.trim(),
        record.excipient_role.trim()
    ));
    output.push_str(justification.text.trim_end());
    output.push_str("\n\n---\n**PubMed citations:**\n");
    if justification.citations.is_empty() {
        output.push_str("\n_No citations found._\n");
    }
    for citation in &justification.citations {
        output.push_str(&format!(
            "- [{}]({})\n",
            escape_md_link(&citation.title),
            escape_md_link(&citation.link)
        ));
    }
    output
}

/// Numbered `title` / indented `link` list, or a note when there are none.
pub fn citation_list(citations: &[Citation]) -> String {
    if citations.is_empty() {
        return "No PubMed citations found.\n".to_string();
    }
    let mut output = String::from("Top PubMed citations:\n");
    for (i, citation) in citations.iter().enumerate() {
        output.push_str(&format!("{}. {}\n   {}\n", i + 1, citation.title, citation.link));
    }
    output
}

/// Single CSV cell: `title (link)` entries joined with `"; "`.
pub fn citation_cell(citations: &[Citation]) -> String {
    citations
        .iter()
        .map(|c| format!("{} ({})", c.title, c.link))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Replaces newlines, which would break heading structure, with spaces.
fn sanitize_heading(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> JustificationRecord {
        JustificationRecord::new("Metformin", "CMC", "IR tablet", "Disintegrant", "")
    }

    fn cite(title: &str, pmid: &str) -> Citation {
        Citation {
            title: title.into(),
            link: format!("https://pubmed.ncbi.nlm.nih.gov/{pmid}/"),
        }
    }

    #[test]
    fn text_lists_numbered_citations() {
        let justification = Justification {
            text: "CMC is justified.\n".into(),
            citations: vec![cite("First", "1"), cite("Second", "2")],
        };
        let text = render(OutputFormat::Text, &record(), &justification);

        assert!(text.starts_with("Justification for CMC in Metformin\n\nCMC is justified.\n\n"));
        assert!(text.contains("1. First\n   https://pubmed.ncbi.nlm.nih.gov/1/\n"));
        assert!(text.contains("2. Second\n"));
    }

    #[test]
    fn text_notes_missing_citations() {
        let justification = Justification {
            text: "Body".into(),
            citations: vec![],
        };
        let text = render(OutputFormat::Text, &record(), &justification);
        assert!(text.ends_with("No PubMed citations found.\n"));
    }

    #[test]
    fn markdown_escapes_link_syntax() {
        let justification = Justification {
            text: "Body".into(),
            citations: vec![cite("Tablets [review] (2020)", "9")],
        };
        let md = render(OutputFormat::Markdown, &record(), &justification);

        assert!(md.starts_with("# Justification: CMC in Metformin\n"));
        assert!(md.contains(r"- [Tablets \[review\] \(2020\)](https://pubmed.ncbi.nlm.nih.gov/9/)"));
    }

    #[test]
    fn markdown_layout_is_stable() {
        let justification = Justification {
            text: "Body\n".into(),
            citations: vec![cite("A", "1")],
        };
        let md = render(OutputFormat::Markdown, &record(), &justification);
        assert_eq!(
            md,
            "# Justification: CMC in Metformin\n\n\
             - **Formulation type:** IR tablet\n- **Excipient role:** Disintegrant\n\n\
             Body\n\n---\n**PubMed citations:**\n\
             - [A](https://pubmed.ncbi.nlm.nih.gov/1/)\n"
        );
    }

    #[test]
    fn markdown_heading_has_no_newlines() {
        let record = JustificationRecord::new("Met\nformin", "CMC", "IR tablet", "Binder", "");
        let justification = Justification {
            text: "Body".into(),
            citations: vec![],
        };
        let md = render(OutputFormat::Markdown, &record, &justification);
        assert!(md.starts_with("# Justification: CMC in Met formin\n"));
    }

    #[test]
    fn citation_cell_joins_with_semicolons() {
        let cell = citation_cell(&[cite("A", "1"), cite("B", "2")]);
        assert_eq!(
            cell,
            "A (https://pubmed.ncbi.nlm.nih.gov/1/); B (https://pubmed.ncbi.nlm.nih.gov/2/)"
        );
        assert_eq!(citation_cell(&[]), "");
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(escape_md_link("normal text"), "normal text");
        assert_eq!(escape_md_link("a[b]c(d)e"), r"a\[b\]c\(d\)e");
    }
}
