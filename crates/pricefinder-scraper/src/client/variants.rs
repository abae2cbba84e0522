use pricefinder_core::Variant;

use crate::error::ScraperError;
use crate::normalize::normalize_variants;
use crate::types::VariantsResponse;

use super::CatalogClient;

impl CatalogClient {
    /// Fetches every color × size variant of a canonical serial, with price
    /// and stock joined in.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] if the catalog has no price group for the serial.
    /// - [`ScraperError::Deserialize`] if the response is not the expected shape.
    /// - [`ScraperError::Normalization`] if a variant entry is unusable.
    /// - Transport errors as for [`CatalogClient::resolve`].
    pub async fn fetch_variants(&self, serial: &str) -> Result<Vec<Variant>, ScraperError> {
        let url = self.variants_url(serial);
        let response: VariantsResponse = self
            .http
            .get_json(&url, &format!("variant list for {serial}"))
            .await?;
        let variants = normalize_variants(serial, &response.result)?;
        tracing::debug!(serial, count = variants.len(), "fetched variants");
        Ok(variants)
    }
}
