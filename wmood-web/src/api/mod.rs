//! HTTP API handlers for wmood-web

pub mod auth;
pub mod health;
pub mod playlists;
pub mod recommendations;
pub mod search;
pub mod session;
pub mod ui;
pub mod weather;

pub use auth::{callback, current_user, login, logout};
pub use health::health_routes;
pub use playlists::create_playlist;
pub use recommendations::{recommendations, test_music};
pub use search::search;
pub use session::refresh_token_middleware;
pub use ui::static_files;
pub use weather::{weather_by_city, weather_by_coordinates};
