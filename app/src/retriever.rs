use crate::config::DirectoryConfig;
use crate::error::FetchError;
use crate::fetch::{Fetcher, HttpMethod};
use crate::ui;

/// The two pages a company record is built from.
#[derive(Debug, Clone)]
pub struct CompanyDocuments {
    pub primary: Vec<u8>,
    pub legal_entity: Vec<u8>,
}

/// GET one page; an absent or empty body both count as missing.
async fn fetch_page<F: Fetcher>(fetcher: &F, url: &str) -> Result<Option<Vec<u8>>, FetchError> {
    match fetcher.fetch(url, HttpMethod::Get, &[]).await? {
        Some(body) if !body.is_empty() => Ok(Some(body)),
        _ => {
            ui::print_verbose(&format!("No content at {}", url));
            Ok(None)
        }
    }
}

/// Fetches the detail page and its legal entity sub-page, in that order.
///
/// Returns `Ok(None)` as soon as one of them comes back absent or empty; the
/// remaining page is not requested.
pub async fn retrieve_documents<F: Fetcher>(
    fetcher: &F,
    config: &DirectoryConfig,
    detail_url: &str,
) -> Result<Option<CompanyDocuments>, FetchError> {
    // Company profile: name, code, employees, turnover...
    let Some(primary) = fetch_page(fetcher, detail_url).await? else {
        return Ok(None);
    };

    // Registration data lives on the legal entity sub-page
    let legal_entity_url = config.legal_entity_url(detail_url);
    let Some(legal_entity) = fetch_page(fetcher, &legal_entity_url).await? else {
        return Ok(None);
    };

    Ok(Some(CompanyDocuments {
        primary,
        legal_entity,
    }))
}
