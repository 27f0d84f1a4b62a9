//! Syllabus text extraction from PDF uploads, web pages and pasted text.

use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use study_core::generation::{truncate_chars, MAX_SOURCE_CHARS};

use crate::error::{ApiError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; MyZenBrain/1.0)";

/// Elements dropped with their contents. Inner elements come first so an
/// outer `header` or `footer` is matched up to its own closing tag.
const NON_CONTENT_TAGS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

static NON_CONTENT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NON_CONTENT_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("static regex")
        })
        .collect()
});
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(\d+);").expect("static regex"));
static HEX_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#[xX]([0-9a-fA-F]+);").expect("static regex"));

/// Where syllabus text comes from
#[derive(Debug, Clone)]
pub enum SyllabusSource {
    Pdf(Vec<u8>),
    Url(String),
    Text(String),
}

impl SyllabusSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "pdf",
            Self::Url(_) => "url",
            Self::Text(_) => "text",
        }
    }
}

/// Turns a [`SyllabusSource`] into bounded plain text
#[derive(Clone)]
pub struct Extractor {
    client: reqwest::Client,
}

impl Extractor {
    pub fn new(fetch_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    /// Extract text, truncated to the ingestion limit. Whitespace-only
    /// results are rejected.
    pub async fn extract(&self, source: SyllabusSource) -> Result<String> {
        let kind = source.kind();
        let raw = match source {
            SyllabusSource::Pdf(bytes) => extract_pdf(bytes).await?,
            SyllabusSource::Url(url) => self.fetch_page_text(&url).await?,
            SyllabusSource::Text(text) => text,
        };

        if raw.trim().is_empty() {
            return Err(ApiError::Extraction("No content extracted".to_string()));
        }

        let content = truncate_chars(&raw, MAX_SOURCE_CHARS).to_string();
        tracing::info!(source = kind, chars = content.chars().count(), "extracted syllabus text");
        Ok(content)
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ApiError::BadRequest(format!("Unsupported URL: {url}")));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Extraction(format!(
                "fetching {url} returned HTTP {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ApiError::Upstream(format!("failed to read {url}: {e}")))?;

        Ok(html_to_text(&html))
    }
}

async fn extract_pdf(bytes: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            // The PDF parser panics on some malformed input
            if e.is_panic() {
                ApiError::Extraction("could not read PDF".to_string())
            } else {
                ApiError::Internal(format!("PDF extraction task failed: {e}"))
            }
        })?
        .map_err(|e| ApiError::Extraction(format!("could not read PDF: {e}")))
}

/// Visible text of an HTML page, one line per text run.
///
/// Drops `script`, `style`, `nav`, `footer` and `header` elements along with
/// their contents, decodes entities and strips blank lines.
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();
    for re in NON_CONTENT_RES.iter() {
        text = re.replace_all(&text, "\n").into_owned();
    }
    let text = COMMENT_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "\n");
    let text = decode_entities(&text);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");

    let text = NUMERIC_ENTITY_RE.replace_all(&text, |caps: &Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let text = HEX_ENTITY_RE.replace_all(&text, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    // Last, so "&amp;lt;" stays "&lt;"
    text.replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_tags_into_lines() {
        let html = "<html><body><h1>Biology 101</h1><p>Week 1: <b>Cells</b></p></body></html>";
        assert_eq!(html_to_text(html), "Biology 101\nWeek 1:\nCells");
    }

    #[test]
    fn drops_non_content_elements() {
        let html = r#"
            <header><a href="/">Home</a></header>
            <nav><ul><li>Menu</li></ul></nav>
            <script>var x = "<p>hidden</p>";</script>
            <style>p { color: red; }</style>
            <main><p>Photosynthesis</p></main>
            <!-- tracking -->
            <footer>Copyright</footer>
        "#;
        assert_eq!(html_to_text(html), "Photosynthesis");
    }

    #[test]
    fn drops_nested_header_and_footer_entirely() {
        let html = "<header><nav><a>Menu</a></nav><h1>SiteBanner</h1></header>\
                    <main><p>Photosynthesis</p></main>\
                    <footer><nav>Links</nav>Copyright</footer>";
        assert_eq!(html_to_text(html), "Photosynthesis");
    }

    #[test]
    fn decodes_entities() {
        let html = "<p>Fish &amp; Chips &lt;3 &#8211; caf&#xE9;</p>";
        assert_eq!(html_to_text(html), "Fish & Chips <3 \u{2013} café");
    }

    #[test]
    fn double_escaped_ampersand_decodes_once() {
        assert_eq!(html_to_text("<p>&amp;lt;</p>"), "&lt;");
    }

    #[tokio::test]
    async fn passthrough_text_is_truncated() {
        let extractor = Extractor::new(Duration::from_secs(1));
        let text = "a".repeat(MAX_SOURCE_CHARS + 500);
        let content = extractor.extract(SyllabusSource::Text(text)).await.unwrap();
        assert_eq!(content.len(), MAX_SOURCE_CHARS);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let extractor = Extractor::new(Duration::from_secs(1));
        let err = extractor
            .extract(SyllabusSource::Text("  \n\t ".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Extraction(_)));
    }

    #[tokio::test]
    async fn non_http_url_is_rejected() {
        let extractor = Extractor::new(Duration::from_secs(1));
        let err = extractor
            .extract(SyllabusSource::Url("file:///etc/passwd".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn garbage_pdf_is_an_extraction_error() {
        let extractor = Extractor::new(Duration::from_secs(1));
        let err = extractor
            .extract(SyllabusSource::Pdf(b"not a pdf".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Extraction(_)));
    }
}
