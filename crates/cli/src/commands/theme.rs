//! Theme preference commands.

use clementine_client::Storefront;
use clementine_core::Theme;

use super::CommandError;

#[allow(clippy::print_stdout)]
pub fn get(front: &Storefront) {
    println!("{}", front.prefs.theme());
}

#[allow(clippy::print_stdout)]
pub fn set(front: &Storefront, raw: &str) -> Result<(), CommandError> {
    let theme: Theme = raw.parse()?;
    front.prefs.set_theme(theme)?;
    println!("Theme set to {theme}");
    Ok(())
}
