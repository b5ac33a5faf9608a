//! Plain text and JSON rendering for the non-interactive subcommands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use scanshelf_core::tags::format_tag_list;
use scanshelf_core::ImportSummary;
use storage::{Document, TagSummary};

pub fn format_timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn document_line(doc: &Document) -> String {
    let tags = if doc.is_untagged() {
        "<untagged>".to_string()
    } else {
        format_tag_list(&doc.tags)
    };
    format!(
        "{:<40} {}  {}",
        doc.filename,
        format_timestamp(doc.updated_at),
        tags
    )
}

pub fn documents_text(docs: &[Document]) -> String {
    let mut out = String::new();
    for doc in docs {
        out.push_str(&document_line(doc));
        out.push('\n');
    }
    out.push_str(&format!("{} document(s)", docs.len()));
    out
}

pub fn tags_text(tags: &[TagSummary]) -> String {
    if tags.is_empty() {
        return "no tags".to_string();
    }
    tags.iter()
        .map(|t| format!("{:<24} {}", t.name, t.documents))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn import_text(summary: &ImportSummary) -> String {
    let mut lines: Vec<String> = summary
        .imported
        .iter()
        .map(|f| format!("imported {f}"))
        .collect();
    lines.push(format!(
        "{} imported, {} skipped",
        summary.imported.len(),
        summary.skipped
    ));
    lines.join("\n")
}

pub fn pending_text(pending: &[String]) -> String {
    if pending.is_empty() {
        return "no new documents".to_string();
    }
    let mut lines = pending.to_vec();
    lines.push(format!("Import {} new documents", pending.len()));
    lines.join("\n")
}

pub fn print_documents(docs: &[Document], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(docs)?);
    } else {
        println!("{}", documents_text(docs));
    }
    Ok(())
}

pub fn print_document(doc: &Document, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(doc)?);
    } else {
        println!("{}", document_line(doc));
    }
    Ok(())
}

pub fn print_tags(tags: &[TagSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tags)?);
    } else {
        println!("{}", tags_text(tags));
    }
    Ok(())
}

pub fn print_import(summary: &ImportSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", import_text(summary));
    }
    Ok(())
}

pub fn print_pending(pending: &[String], json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({ "pending": pending, "count": pending.len() });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", pending_text(pending));
    }
    Ok(())
}
