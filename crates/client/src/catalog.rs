//! Typed calls against the product catalog.
//!
//! Thin, typed layer over [`ApiClient`]: list, get, search, image fetch,
//! and the multipart create/update/delete calls. All failures come back as
//! [`ApiError`] and are non-fatal; callers log or surface them and move on.

use bytes::Bytes;
use tracing::{debug, instrument};
use urlencoding::encode;

use clementine_core::{Product, ProductDraft, ProductId};

use crate::error::ApiResult;
use crate::http::ApiClient;

/// Fallback file name when the catalog has none for a product image.
const DEFAULT_IMAGE_NAME: &str = "default.png";
const DEFAULT_IMAGE_TYPE: &str = "application/octet-stream";

/// A fetched (or to-be-uploaded) product image.
///
/// `Bytes` makes clones cheap, which is what lets the image cache hand the
/// same entry to any number of views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: String,
}

/// Client for the product catalog endpoints.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List the whole catalog.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.api.get_json("products").await
    }

    /// Get one product by id.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> ApiResult<Product> {
        self.api.get_json(&format!("product/{id}")).await
    }

    /// Search by keyword. Matching is case-insensitive substring matching,
    /// done server-side; the keyword only needs URL encoding here.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> ApiResult<Vec<Product>> {
        self.api
            .get_json(&format!("products/search?keyword={}", encode(keyword)))
            .await
    }

    /// Fetch the binary image for a product.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch_image(&self, id: &ProductId) -> ApiResult<ProductImage> {
        let (bytes, content_type) = self.api.get_bytes(&format!("product/{id}/image")).await?;
        debug!(len = bytes.len(), "Fetched product image");
        Ok(ProductImage {
            bytes,
            content_type: content_type.unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string()),
            file_name: format!("{id}.img"),
        })
    }

    /// Create a product: multipart `product` JSON part plus the image.
    #[instrument(skip(self, draft, image))]
    pub async fn create_product(
        &self,
        draft: &ProductDraft,
        image: &ProductImage,
    ) -> ApiResult<Product> {
        let form = multipart_form(draft, Some(image))?;
        self.api.post_multipart("product", form).await
    }

    /// Update a product. The image part is optional; metadata-only updates
    /// (stock adjustments during checkout) leave it off.
    #[instrument(skip(self, draft, image), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        image: Option<&ProductImage>,
    ) -> ApiResult<Product> {
        let form = multipart_form(draft, image)?;
        self.api.put_multipart(&format!("product/{id}"), form).await
    }

    /// Delete a product.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> ApiResult<()> {
        self.api.delete(&format!("product/{id}")).await
    }
}

/// Build the `product` + optional `imageFile` multipart form the backend
/// expects: metadata as an `application/json` part, image as a file part.
fn multipart_form(
    draft: &ProductDraft,
    image: Option<&ProductImage>,
) -> ApiResult<reqwest::multipart::Form> {
    let metadata = reqwest::multipart::Part::text(serde_json::to_string(draft)?)
        .mime_str("application/json")?;
    let mut form = reqwest::multipart::Form::new().part("product", metadata);

    if let Some(image) = image {
        let file_name = if image.file_name.is_empty() {
            DEFAULT_IMAGE_NAME.to_string()
        } else {
            image.file_name.clone()
        };
        let part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
            .file_name(file_name)
            .mime_str(&image.content_type)?;
        form = form.part("imageFile", part);
    }
    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Webcam".to_string(),
            description: String::new(),
            brand: "Lensy".to_string(),
            price: Decimal::new(59_00, 2),
            category: "peripherals".to_string(),
            release_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            available: true,
            stock_quantity: 7,
        }
    }

    #[test]
    fn test_multipart_form_metadata_only() {
        // Just exercises the construction path; reqwest validates MIME
        multipart_form(&draft(), None).unwrap();
    }

    #[test]
    fn test_multipart_form_with_image() {
        let image = ProductImage {
            bytes: Bytes::from_static(b"\x89PNG"),
            content_type: "image/png".to_string(),
            file_name: "cam.png".to_string(),
        };
        multipart_form(&draft(), Some(&image)).unwrap();
    }
}
