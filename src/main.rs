#[macro_use]
extern crate rocket;

mod api;
mod app_state;
mod completion;
mod config;
mod config_store;
mod cors;
mod error;
mod firestore;
mod prompt;
mod types;

use app_state::AppState;
use config::Settings;
use tracing_subscriber::EnvFilter;

#[launch]
fn rocket() -> _ {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let state = AppState::from_settings(Settings::from_env());
    api::build(state)
}
