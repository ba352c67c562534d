//! Domain entities for the embed protocol.
//!
//! Pure data with no I/O: the cached snapshot of the remote player's state and
//! the typed records read out of it.  Everything here can be built and tested
//! without a page, a window, or a surface.

/// Remote state snapshot, see [`player_state::PlayerState`].
pub mod player_state;

pub use player_state::{fields, PlaybackPhase, PlayerState, Quality, VideoStats};
