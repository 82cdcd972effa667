use std::{path::Path, sync::LazyLock};

use base64::{Engine as _, engine::general_purpose};
use tokio::fs;
use tracing::{debug, warn};

const FILE_SCHEME: &str = "file://";

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64"><rect width="64" height="64" rx="6" fill="#313437"/><circle cx="32" cy="32" r="22" fill="#4c5053"/><circle cx="32" cy="32" r="7" fill="#c6cdd1"/><circle cx="32" cy="32" r="2" fill="#313437"/></svg>"##;

static PLACEHOLDER: LazyLock<String> = LazyLock::new(|| {
    format!(
        "data:image/svg+xml;base64,{}",
        general_purpose::STANDARD.encode(PLACEHOLDER_SVG)
    )
});

/// Image shown when a track has no usable cover.
pub fn placeholder() -> &'static str {
    &PLACEHOLDER
}

/// Turns a metadata art URL into something a consumer can display directly.
///
/// Remote URLs pass through untouched. Local `file://` URLs are read and
/// inlined as `data:` URLs because the consumer cannot reach the local
/// filesystem. Failures fall back to the placeholder and are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverResolver;

impl CoverResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve `art_url` to a displayable image reference. Never fails.
    pub async fn resolve(&self, art_url: Option<&str>) -> String {
        let Some(art_url) = art_url.map(str::trim).filter(|url| !url.is_empty()) else {
            return placeholder().to_string();
        };

        let Some(encoded_path) = art_url.strip_prefix(FILE_SCHEME) else {
            return art_url.to_string();
        };

        let path = urlencoding::decode(encoded_path)
            .map(|path| path.into_owned())
            .unwrap_or_else(|_| encoded_path.to_string());

        match fs::read(&path).await {
            Ok(bytes) => {
                let mime = mime_from_extension(Path::new(&path));
                debug!(path, mime, bytes = bytes.len(), "Inlined local cover art");
                format!(
                    "data:{mime};base64,{}",
                    general_purpose::STANDARD.encode(bytes)
                )
            }
            Err(e) => {
                warn!(path, error = %e, "Failed to read cover art file");
                placeholder().to_string()
            }
        }
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}
