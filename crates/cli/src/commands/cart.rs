//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! clem cart show
//! clem cart add 664f1c2a
//! clem cart increase 664f1c2a
//! clem cart checkout
//! ```

use clementine_client::Storefront;
use clementine_core::ProductId;

use super::CommandError;

#[allow(clippy::print_stdout)]
pub fn show(front: &Storefront) {
    let cart = front.cart.snapshot();
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    for line in cart.lines() {
        println!(
            "{:<26} {:<30} {:>3} x {:>10} = {:>10}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.product.price,
            line.line_total()
        );
    }
    println!("Total: {}", cart.total());
}

/// Fetch the live product first so the line carries current price and stock.
#[allow(clippy::print_stdout)]
pub async fn add(front: &Storefront, id: &str) -> Result<(), CommandError> {
    let product = front.catalog.get_product(&ProductId::new(id)).await?;
    front.cart.add(&product)?;
    println!("Added {} to cart", product.name);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn remove(front: &Storefront, id: &str) -> Result<(), CommandError> {
    front.cart.remove(&ProductId::new(id))?;
    println!("Removed {id} from cart");
    Ok(())
}

pub fn increase(front: &Storefront, id: &str) -> Result<(), CommandError> {
    front.cart.increase(&ProductId::new(id))?;
    Ok(())
}

pub fn decrease(front: &Storefront, id: &str) -> Result<(), CommandError> {
    front.cart.decrease(&ProductId::new(id))?;
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn clear(front: &Storefront) -> Result<(), CommandError> {
    front.cart.clear()?;
    println!("Cart cleared");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn checkout(front: &Storefront) -> Result<(), CommandError> {
    let outcome = front.cart.checkout(&front.catalog).await?;
    for id in &outcome.committed {
        println!("Committed {id}");
    }
    match outcome.failed {
        None => println!("Checkout complete ({} lines)", outcome.committed.len()),
        Some((id, err)) => {
            println!("Checkout stopped at {id}: {err}");
            println!("Committed lines were removed; the rest stay in the cart.");
        }
    }
    Ok(())
}
