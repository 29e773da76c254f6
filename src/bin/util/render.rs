use colored::Colorize;
use notesearch::{Document, Origin};

/// One result line for pretty output, coloured by provenance.
pub fn pretty_line(index: Option<usize>, doc: &Document) -> String {
    let source = match doc.origin() {
        Origin::Local => doc.source.green().bold(),
        Origin::Web => doc.source.blue().bold(),
        Origin::Error => doc.source.red().bold(),
    };
    match index {
        Some(i) => format!("{:>3}. [{}] {}\n     {}", i, source, doc.title, doc.url.dimmed()),
        None => format!("     [{}] {}", source, doc.title),
    }
}

pub fn hit_json(doc: &Document) -> serde_json::Value {
    serde_json::json!({
        "id": doc.id,
        "title": doc.title,
        "url": doc.url,
        "source": doc.source,
        "error": doc.is_error(),
    })
}

/// Shortens a title for status messages.
pub fn short_title(title: &str) -> String {
    const MAX: usize = 40;
    if title.chars().count() <= MAX {
        title.to_string()
    } else {
        format!("{}...", title.chars().take(MAX).collect::<String>())
    }
}
