use crate::config::DirectoryConfig;
use crate::error::LookupError;
use crate::extract;
use crate::fetch::Fetcher;
use crate::models::CompanyRecord;
use crate::resolver;
use crate::retriever;
use crate::ui;

/// Resolves company codes against the directory.
///
/// Built once at startup and shared by every request handler; holds no
/// per-request state.
pub struct CompanyLookup<F> {
    fetcher: F,
    config: DirectoryConfig,
}

impl<F: Fetcher> CompanyLookup<F> {
    pub fn new(fetcher: F, config: DirectoryConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Search, fetch both company pages, extract.
    pub async fn lookup(&self, code: &str) -> Result<CompanyRecord, LookupError> {
        let not_found = || LookupError::NotFound {
            code: code.to_string(),
        };

        // 1. Search form -> detail page URL (an empty result set is "not found")
        ui::print_verbose(&format!("Searching for company {}", code));
        let detail_url =
            resolver::resolve_company_url(&self.fetcher, &self.config.listing_url(), code)
                .await?
                .ok_or_else(not_found)?;

        // 2. Detail page + legal entity page, both required
        ui::print_verbose(&format!("Company {} resolved to {}", code, detail_url));
        let documents = retriever::retrieve_documents(&self.fetcher, &self.config, &detail_url)
            .await?
            .ok_or_else(not_found)?;

        // 3. Labelled rows -> record; a missing name or industry fails here
        let record = extract::extract_company(&documents, code)?;
        ui::print_verbose(&format!("Extracted company {:?}", record.name));
        Ok(record)
    }
}
