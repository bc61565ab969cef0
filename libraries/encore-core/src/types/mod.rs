mod ids;
mod playlist;
mod track;
mod user;

pub use ids::{PlaylistId, TrackId, UserId};
pub use playlist::{CreatePlaylist, Playlist, SaveRelation, UpdatePlaylist, Visibility};
pub use track::Track;
pub use user::UserContext;
