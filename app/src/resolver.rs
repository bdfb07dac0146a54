use crate::error::FetchError;
use crate::fetch::{Fetcher, HttpMethod};
use crate::ui;
use reqwest::Url;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static INFO_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.info").expect("Failed to parse info block selector - this is a bug")
});
static LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("Failed to parse link selector - this is a bug")
});

/// Search form fields as the directory's listing page submits them.
fn search_form(code: &str) -> [(&'static str, &str); 8] {
    [
        ("name", ""),
        ("city", "0"),
        ("word", ""),
        ("code", code),
        ("catUrlKey", ""),
        ("ok", ""),
        ("resetFilter", "0"),
        ("order", "1"),
    ]
}

/// Finds the detail page URL of the company registered under `code`.
///
/// Returns `Ok(None)` when the listing could not be retrieved or the search
/// produced no result.
pub async fn resolve_company_url<F: Fetcher>(
    fetcher: &F,
    listing_url: &str,
    code: &str,
) -> Result<Option<String>, FetchError> {
    let form = search_form(code);
    let Some(body) = fetcher.fetch(listing_url, HttpMethod::Post, &form).await? else {
        return Ok(None);
    };

    let html = String::from_utf8_lossy(&body);
    Ok(first_result_url(&html, listing_url))
}

fn first_result_url(html: &str, listing_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    // Only the first result block counts, even if a later one has a link.
    let block = document.select(&INFO_BLOCK).next()?;
    let href = block
        .select(&LINK)
        .next()
        .and_then(|link| link.value().attr("href"))?;

    match Url::parse(listing_url).and_then(|base| base.join(href)) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            ui::print_verbose(&format!("Unusable result link {:?}: {}", href, e));
            None
        }
    }
}
