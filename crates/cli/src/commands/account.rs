//! Session commands.

use std::io::Write;

use lumina_storefront::Storefront;
use lumina_storefront::gateway::RemoteGateway;
use secrecy::SecretString;

use super::CliError;

pub async fn login<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
    email: &str,
    password: String,
) -> Result<(), CliError> {
    let password = SecretString::from(password);
    let identity = storefront.login(email, &password).await?;
    writeln!(out, "Signed in as {} <{}>.", identity.name, identity.email)?;
    writeln!(
        out,
        "Wishlist: {} item(s).",
        storefront.shop().wishlist().len()
    )?;
    Ok(())
}

pub async fn register<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
    name: &str,
    email: &str,
    password: String,
) -> Result<(), CliError> {
    let password = SecretString::from(password);
    let identity = storefront.register(name, email, &password).await?;
    writeln!(out, "Welcome, {}. You are signed in.", identity.name)?;
    Ok(())
}

pub async fn logout<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match storefront.logout().await {
        Some(identity) => writeln!(out, "Signed out {}. Cart and wishlist cleared.", identity.name)?,
        None => writeln!(out, "Not signed in.")?,
    }
    Ok(())
}

pub fn whoami<G: RemoteGateway>(
    storefront: &Storefront<G>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match storefront.identity() {
        Some(identity) => writeln!(
            out,
            "{} <{}> ({:?}, id {})",
            identity.name, identity.email, identity.role, identity.id
        )?,
        None => writeln!(out, "Not signed in.")?,
    }
    Ok(())
}
