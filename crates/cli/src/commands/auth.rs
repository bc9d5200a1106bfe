//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! clem auth login -e user@example.com -p secret
//! clem auth register -e new@example.com -p secret
//! clem auth logout
//! clem auth status
//! ```

use clementine_client::Storefront;
use clementine_core::Credentials;

use super::CommandError;

#[allow(clippy::print_stdout)]
pub async fn login(front: &Storefront, email: &str, password: &str) -> Result<(), CommandError> {
    front
        .auth
        .login(&Credentials::new(email, password))
        .await?;
    println!("Signed in as {email}");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn register(front: &Storefront, email: &str, password: &str) -> Result<(), CommandError> {
    let message = front
        .auth
        .register(&Credentials::new(email, password))
        .await?;
    println!("{message}");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn logout(front: &Storefront) -> Result<(), CommandError> {
    front.auth.logout()?;
    println!("Signed out");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn status(front: &Storefront) {
    if front.auth.is_logged_in() {
        println!("Authenticated (token stored)");
    } else {
        println!("Anonymous");
    }
}
