//! # Configuration Module
//!
//! Settings are layered, later sources winning:
//! - built-in defaults
//! - `config/default.toml`, then `config/{RUN_ENV}.toml`
//! - `APP__SECTION__KEY` environment variables (a `.env` file is loaded first)
//! - `SERVER_HOST`, `SERVER_PORT`, `DATABASE_URL`, `JWT_SECRET`
//!
//! ```rust,ignore
//! use chat_realtime::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Gateway on {}", settings.server_addr());
//! ```

mod settings;

pub use settings::*;
