//! Static page rendering.
//!
//! ```bash
//! sfk render page.html --out rendered.html
//! ```

use std::path::Path;

use storefront_kit::{DeclarativeLoader, HtmlPage};
use tracing::{info, warn};

use super::{CommandResult, session, write_line};

/// Render every binding of the page at `path`.
///
/// Bindings that fail are rendered with the error markup; the command only
/// fails if the page cannot be read, parsed or written.
///
/// # Errors
///
/// Returns an error for I/O failures, configuration problems or malformed
/// HTML.
pub async fn page(path: &Path, out: Option<&Path>) -> CommandResult {
    let source = tokio::fs::read_to_string(path).await?;
    let storefront = session()?;

    let mut page = HtmlPage::parse(&source)?;
    let mut loader = DeclarativeLoader::from_page(&storefront, &page);
    let failures = loader.process_all(&mut page).await;
    if failures > 0 {
        warn!(failures, "Some bindings failed to render");
    }

    let html = page.to_html()?;
    match out {
        Some(out) => {
            tokio::fs::write(out, html).await?;
            info!(path = %out.display(), bindings = page.bindings().len(), "Rendered page");
            Ok(())
        }
        None => write_line(html),
    }
}
