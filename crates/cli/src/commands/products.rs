//! Catalog browsing and product CRUD commands.
//!
//! # Usage
//!
//! ```bash
//! clem products list
//! clem products get 664f1c2a
//! clem products search "keyboard"
//! clem products add -f draft.json -i photo.png
//! clem products update 664f1c2a -f draft.json
//! clem products delete 664f1c2a
//! ```

use std::path::Path;

use bytes::Bytes;

use clementine_client::{ProductImage, Storefront};
use clementine_core::{Product, ProductDraft, ProductId};

use super::CommandError;

#[allow(clippy::print_stdout)]
pub async fn list(front: &Storefront) -> Result<(), CommandError> {
    let products = front.catalog.list_products().await?;
    print_products(&products);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn get(front: &Storefront, id: &str) -> Result<(), CommandError> {
    let product = front.catalog.get_product(&ProductId::new(id)).await?;
    println!("{:<12} {}", "id:", product.id);
    println!("{:<12} {}", "name:", product.name);
    println!("{:<12} {}", "brand:", product.brand);
    println!("{:<12} {}", "category:", product.category);
    println!("{:<12} {}", "price:", product.price);
    println!("{:<12} {}", "stock:", product.stock_quantity);
    println!("{:<12} {}", "released:", product.release_date);
    if !product.description.is_empty() {
        println!("{:<12} {}", "description:", product.description);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn search(front: &Storefront, keyword: &str) -> Result<(), CommandError> {
    let products = front.catalog.search(keyword).await?;
    if products.is_empty() {
        println!("No products match '{keyword}'");
    } else {
        print_products(&products);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn add(front: &Storefront, file: &Path, image: &Path) -> Result<(), CommandError> {
    let draft = read_draft(file)?;
    let upload = read_image(image)?;
    let product = front.catalog.create_product(&draft, &upload).await?;
    println!("Created product {} ({})", product.id, product.name);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn update(
    front: &Storefront,
    id: &str,
    file: &Path,
    image: Option<&Path>,
) -> Result<(), CommandError> {
    let draft = read_draft(file)?;
    let upload = image.map(read_image).transpose()?;
    let product = front
        .catalog
        .update_product(&ProductId::new(id), &draft, upload.as_ref())
        .await?;
    println!("Updated product {} ({})", product.id, product.name);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn delete(front: &Storefront, id: &str) -> Result<(), CommandError> {
    let id = ProductId::new(id);
    front.catalog.delete_product(&id).await?;
    println!("Deleted product {id}");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    for product in products {
        println!(
            "{:<26} {:<30} {:>10}  stock {:>4}  [{}]",
            product.id, product.name, product.price, product.stock_quantity, product.category
        );
    }
    println!("({} products)", products.len());
}

fn read_draft(path: &Path) -> Result<ProductDraft, CommandError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CommandError::InvalidDraft {
        path: path.to_path_buf(),
        source,
    })
}

fn read_image(path: &Path) -> Result<ProductImage, CommandError> {
    let bytes = std::fs::read(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload.img".to_string(), |n| n.to_string_lossy().into_owned());
    Ok(ProductImage {
        content_type: content_type_for(&file_name).to_string(),
        bytes: Bytes::from(bytes),
        file_name,
    })
}

/// Minimal extension sniffing for the upload's MIME type.
fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
