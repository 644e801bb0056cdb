//! Login, logout and whoami.

use anyhow::{Context, Result};
use dialtone_core::config::Config;
use dialtone_core::fetcher::RandomUserClient;
use dialtone_core::interrupt::{self, InterruptedError};
use dialtone_core::phone::PhoneNumber;
use dialtone_core::session::{AUTH_FAILED_MESSAGE, LoginError, SessionManager};
use dialtone_core::storage::UserRecordStore;
use dialtone_core::user::UserRecord;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn login(config: &Config, phone: &str) -> Result<()> {
    let phone = PhoneNumber::parse(phone)?;
    let fetcher = RandomUserClient::from_config(config).context("create user fetcher")?;
    let session = SessionManager::start(UserRecordStore::open(config), fetcher);

    let cancel = CancellationToken::new();
    let login = session.login_with_cancel(phone.as_str(), cancel.clone());
    tokio::pin!(login);

    let result = tokio::select! {
        result = &mut login => result,
        () = interrupt::wait_for_interrupt() => {
            info!("login interrupted");
            cancel.cancel();
            login.await
        }
    };

    match result {
        Ok(()) => {
            let state = session.state();
            let name = state.user().map(UserRecord::full_name).unwrap_or_default();
            println!("Logged in as {name}");
            Ok(())
        }
        Err(LoginError::Cancelled) => Err(InterruptedError.into()),
        Err(e @ LoginError::Fetch(_)) => Err(anyhow::Error::new(e).context(AUTH_FAILED_MESSAGE)),
        Err(e @ LoginError::InFlight) => Err(e.into()),
    }
}

/// Clears the stored record. Needs no network, so a bad `api_url` cannot
/// block it.
pub fn logout(config: &Config) {
    let store = UserRecordStore::open(config);
    let was_logged_in = store.load().is_some();

    store.clear();
    info!(was_logged_in, "logout");

    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
}

pub fn whoami(config: &Config) {
    let Some(user) = UserRecordStore::open(config).load() else {
        println!("Not logged in.");
        return;
    };

    println!("{}", user.full_name());
    println!("Email:    {}", user.email());
    println!("Phone:    {}", user.phone());
    println!("Location: {}", user.location_line());
    println!("Picture:  {}", user.picture().large);
}
