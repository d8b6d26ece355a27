//! Account commands: register, login, logout, profile.

use tienda_client::state::AppState;
use tienda_core::Email;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn register(
    app: &mut AppState,
    name: &str,
    email: &str,
    password: &str,
    address: &str,
) -> CommandResult {
    let email = Email::parse(email)?;
    let user = app.register(name, email, password, address).await?;
    println!("Welcome, {}!", user.name);
    Ok(())
}

pub async fn login(app: &mut AppState, email: &str, password: &str) -> CommandResult {
    let email = Email::parse(email)?;
    let user = app.login(email, password).await?;
    println!("Welcome back, {}!", user.name);
    Ok(())
}

pub fn logout(app: &mut AppState) -> CommandResult {
    app.logout()?;
    println!("Signed out");
    Ok(())
}

pub async fn profile(app: &mut AppState) -> CommandResult {
    let user = app.refresh_profile().await?;
    println!("Name:    {}", user.name);
    if let Some(email) = &user.email {
        println!("Email:   {email}");
    }
    if let Some(address) = &user.address {
        println!("Address: {address}");
    }
    Ok(())
}
