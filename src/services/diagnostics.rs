// src/services/diagnostics.rs

//! Listing page diagnostics for `--debug-list`.
//!
//! Dumps the markup around the first reaction card, every reaction attribute,
//! the "details" anchors and the page scripts, so extraction rules can be
//! adjusted when the site layout changes.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::CrawlerConfig;
use crate::utils::html::joined_text;
use crate::utils::{context_window, resolve_url, truncate_chars};

static REACTION_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-reaction-smiles="(.*?)""#).expect("valid attribute regex")
});

/// Network calls worth knowing about in page scripts.
static SCRIPT_CALLS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("FETCH", r#"fetch\(\s*['"](?P<url>.*?)['"]"#),
        ("AXIOS", r#"axios\.(?:get|post)\(\s*['"](?P<url>.*?)['"]"#),
        ("AJAX", r#"\$\.ajax\(\s*\{[\s\S]*?url\s*:\s*['"](?P<url>.*?)['"]"#),
        ("JQGET", r#"\$\.get\(\s*['"](?P<url>.*?)['"]"#),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).expect("valid script regex")))
    .collect()
});

const MAX_ANCHORS: usize = 50;
const MAX_ANCESTORS: usize = 5;

/// A script referenced by the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRef {
    /// Absolute URL of a `<script src>`
    External(String),
    /// Text of an inline `<script>`
    Inline(String),
}

/// Diagnostic lines for one listing page.
#[derive(Debug, Default)]
pub struct ListingReport {
    pub lines: Vec<String>,
    pub scripts: Vec<ScriptRef>,
}

/// Describe the markup of a listing page.
pub fn describe_listing(html: &str, base: &Url) -> ListingReport {
    let mut report = ListingReport::default();
    let lines = &mut report.lines;

    for (marker, label, width) in [
        ("id=\"title-0\"", "title-0", 300),
        ("id=\"display-0\"", "display-0", 400),
    ] {
        if let Some(at) = html.find(marker) {
            lines.push(format!("HTML AROUND {label}:"));
            lines.push(context_window(html, at, width, width).to_string());
        }
    }

    for caps in REACTION_ATTR.captures_iter(html) {
        if let Some(value) = caps.get(1).map(|m| m.as_str()).filter(|v| !v.is_empty()) {
            lines.push(format!("REACTION_SMILES {}", truncate_chars(value, 120)));
        }
    }

    let document = Html::parse_document(html);
    let Ok(anchor_sel) = Selector::parse("a") else {
        return report;
    };
    let anchors: Vec<ElementRef<'_>> = document.select(&anchor_sel).collect();
    let details: Vec<&ElementRef<'_>> = anchors.iter().filter(|a| is_details_link(a)).collect();

    lines.push(format!("DETAILS COUNT {}", details.len()));
    if let Some(first) = details.first() {
        lines.push(format!("DETAILS ATTRS {}", attrs_json(first)));
        for parent in first.ancestors().filter_map(ElementRef::wrap).take(MAX_ANCESTORS) {
            lines.push(format!(
                "PARENT {} {}",
                parent.value().name(),
                joined_text(parent, " ").chars().count()
            ));
        }
        lines.push("CARD TEXT SAMPLE".to_string());
        let card = first
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "div");
        if let Some(card) = card {
            lines.push(truncate_chars(&joined_text(card, " \n"), 1000).to_string());
        }
    }

    for anchor in anchors.iter().take(MAX_ANCHORS) {
        if is_details_link(anchor) {
            lines.push(format!("DETAILS {}", attrs_json(anchor)));
        } else {
            lines.push(format!(
                "{} -> {}",
                joined_text(*anchor, ""),
                anchor.value().attr("href").unwrap_or("None")
            ));
        }
    }

    if let Ok(script_sel) = Selector::parse("script") {
        for script in document.select(&script_sel) {
            match script.value().attr("src") {
                Some(src) => report
                    .scripts
                    .push(ScriptRef::External(resolve_url(base, src))),
                None => {
                    let body: String = script.text().collect();
                    if !body.trim().is_empty() {
                        report.scripts.push(ScriptRef::Inline(body));
                    }
                }
            }
        }
    }

    report
}

/// Describe hints found in an external script body.
pub fn describe_script(url: &str, body: &str) -> Vec<String> {
    let mut lines = Vec::new();

    if ["title-", "data-reaction", "window.open"]
        .iter()
        .any(|hint| body.contains(hint))
    {
        lines.push(format!("JS HINT {url}"));
        if let Some(at) = body.find("title-") {
            lines.push(context_window(body, at, 200, 200).to_string());
        }
    }

    for (label, pattern) in SCRIPT_CALLS.iter() {
        for caps in pattern.captures_iter(body) {
            if let Some(target) = caps.name("url") {
                lines.push(format!("{label} {}", target.as_str()));
            }
        }
    }

    if body.contains("data-reaction-smiles") {
        lines.push("HAS data-reaction-smiles IN JS".to_string());
    }
    if body.contains("dataModal") {
        lines.push("HAS dataModal IN JS".to_string());
    }
    lines
}

/// Fetch the first listing page for `doi` and print diagnostics to stdout.
pub async fn debug_list(
    client: &reqwest::Client,
    config: &CrawlerConfig,
    doi: &str,
) -> Result<()> {
    let url = config.start_url(doi);
    let base = Url::parse(&config.base_url)?;
    log::info!("Inspecting {}", url);

    let html = client.get(&url).send().await?.text().await?;
    let report = describe_listing(&html, &base);
    for line in &report.lines {
        println!("{line}");
    }

    println!("SCRIPTS");
    for script in &report.scripts {
        match script {
            ScriptRef::External(src) => {
                println!("SCRIPT {src}");
                match client.get(src).send().await {
                    Ok(response) => match response.text().await {
                        Ok(body) => describe_script(src, &body)
                            .iter()
                            .for_each(|line| println!("{line}")),
                        Err(e) => log::debug!("Failed to read script {}: {}", src, e),
                    },
                    Err(e) => log::debug!("Failed to fetch script {}: {}", src, e),
                }
            }
            ScriptRef::Inline(body) => {
                println!("INLINE SCRIPT");
                println!("{}", truncate_chars(body, 1000));
            }
        }
    }
    Ok(())
}

fn is_details_link(anchor: &ElementRef<'_>) -> bool {
    joined_text(*anchor, "").to_lowercase() == "details"
}

fn attrs_json(element: &ElementRef<'_>) -> String {
    let attrs: serde_json::Map<String, serde_json::Value> = element
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    serde_json::Value::Object(attrs).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r##"<html><head>
        <script src="/js/app.js"></script>
        <script>var reactions = []; reactions.push("A>>B");</script>
        </head><body>
        <div class="card">
          <h5 id="title-0">Reaction 1</h5>
          <div id="display-0" data-reaction-smiles="CCO>O>CC=O"></div>
          <a href="#" data-target="#dataModal" data-id="7">Details</a>
        </div>
        <a href="/data/reaction/doi/10.1/x/start/10">Next</a>
        <a>orphan</a>
        </body></html>"##;

    fn report() -> ListingReport {
        describe_listing(LISTING, &Url::parse("https://kmt.example").unwrap())
    }

    #[test]
    fn test_listing_markers_and_attributes() {
        let lines = report().lines;
        assert!(lines.contains(&"HTML AROUND title-0:".to_string()));
        assert!(lines.contains(&"HTML AROUND display-0:".to_string()));
        assert!(lines.contains(&"REACTION_SMILES CCO>O>CC=O".to_string()));
        assert!(lines.contains(&"DETAILS COUNT 1".to_string()));
        assert!(lines.contains(&"CARD TEXT SAMPLE".to_string()));
    }

    #[test]
    fn test_listing_anchor_lines() {
        let lines = report().lines;
        assert!(lines.contains(&"Next -> /data/reaction/doi/10.1/x/start/10".to_string()));
        assert!(lines.contains(&"orphan -> None".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("DETAILS {") && l.contains("dataModal")));
        assert!(lines.iter().any(|l| l.starts_with("PARENT div ")));
    }

    #[test]
    fn test_listing_scripts() {
        let scripts = report().scripts;
        assert_eq!(scripts.len(), 2);
        assert_eq!(
            scripts[0],
            ScriptRef::External("https://kmt.example/js/app.js".to_string())
        );
        assert!(matches!(&scripts[1], ScriptRef::Inline(body) if body.contains("reactions.push")));
    }

    #[test]
    fn test_describe_script_hints() {
        let body = r#"
            $('#title-' + i).on('click', () => window.open(url));
            fetch("/api/reaction/1");
            axios.post('/api/search', {});
            $.ajax({ type: "GET", url: "/api/details" });
            $.get("/api/list");
            $('#dataModal').modal();
        "#;
        let lines = describe_script("https://kmt.example/js/app.js", body);
        assert_eq!(lines[0], "JS HINT https://kmt.example/js/app.js");
        assert!(lines.contains(&"FETCH /api/reaction/1".to_string()));
        assert!(lines.contains(&"AXIOS /api/search".to_string()));
        assert!(lines.contains(&"AJAX /api/details".to_string()));
        assert!(lines.contains(&"JQGET /api/list".to_string()));
        assert!(lines.contains(&"HAS dataModal IN JS".to_string()));
        assert!(!lines.contains(&"HAS data-reaction-smiles IN JS".to_string()));
    }

    #[test]
    fn test_describe_plain_script() {
        assert!(describe_script("x.js", "console.log(1)").is_empty());
    }
}
