//! HTML shells served by the portal
//!
//! These are deliberately bare: the chat widget itself is a third-party web
//! component loaded from its CDN.

use crate::config::PageConfig;
use crate::pages::VisiblePage;
use crate::server::SESSION_ROUTE;

/// ChatKit web component bundle
pub const CHATKIT_SCRIPT: &str = "https://cdn.platform.openai.com/deployments/chatkit/chatkit.js";

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn document(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"color-scheme\" content=\"light only\">\n<title>{}</title>\n{}</head>\n\
         <body>\n<div id=\"root\">{}</div>\n</body>\n</html>\n",
        escape_html(title),
        head_extra,
        body
    )
}

/// Landing page; lists `nav` or asks the visitor to log in
pub fn home_page(nav: Option<&[VisiblePage]>) -> String {
    let body = match nav {
        Some(pages) => {
            let links: String = pages
                .iter()
                .map(|p| {
                    format!(
                        "<li><a class=\"btn btn-sm\" href=\"{}\">{}</a></li>",
                        escape_html(&p.path),
                        escape_html(&p.label)
                    )
                })
                .collect();
            format!("<nav><ul>{}</ul></nav>", links)
        }
        None => "<p class=\"login-required\">Please log in to continue.</p>".to_string(),
    };
    document("Home", "", &body)
}

/// Protected page body
///
/// Chat pages embed the ChatKit component with the page's workflow selector
/// and the broker endpoint as data attributes.
pub fn page(page: &PageConfig, home_path: &str) -> String {
    let header = format!(
        "<header><a class=\"btn btn-sm\" href=\"{}\">Home</a><h1>{}</h1></header>",
        escape_html(home_path),
        escape_html(&page.label)
    );

    if !page.chat {
        return document(&page.label, "", &format!("<main>{}</main>", header));
    }

    let workflow_attr = page
        .workflow
        .as_deref()
        .map(|w| format!(" data-workflow-id=\"{}\"", escape_html(w)))
        .unwrap_or_default();
    let body = format!(
        "<main>{}<openai-chatkit data-session-endpoint=\"{}\"{}></openai-chatkit></main>",
        header, SESSION_ROUTE, workflow_attr
    );
    let script = format!("<script src=\"{}\" async></script>\n", CHATKIT_SCRIPT);
    document(&page.label, &script, &body)
}
