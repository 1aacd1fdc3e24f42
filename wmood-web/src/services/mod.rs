//! Outbound service clients other than the catalog itself

pub mod playlist;
pub mod spotify_auth;
pub mod weather_client;

pub use playlist::{create_weather_playlist, CreatedPlaylist, PlaylistError, PlaylistRequest};
pub use spotify_auth::{AuthError, SpotifyAuth, SpotifyCredentials, TokenSet};
pub use weather_client::{WeatherClient, WeatherError, WeatherReport};
