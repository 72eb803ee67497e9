//! [`Server`]-related read definitions.

use crate::domain::episode;
#[cfg(doc)]
use crate::domain::Server;

/// Selector of [`Server`]s of multiple [`Episode`]s, ordered by their
/// priority.
///
/// [`Episode`]: crate::domain::Episode
#[derive(Clone, Debug)]
pub struct OfEpisodes {
    /// IDs of the [`Episode`]s.
    ///
    /// [`Episode`]: crate::domain::Episode
    pub episodes: Vec<episode::Id>,

    /// Indicator whether only active [`Server`]s are selected.
    pub active_only: bool,
}

impl OfEpisodes {
    /// Selects active [`Server`]s of a single [`Episode`].
    ///
    /// [`Episode`]: crate::domain::Episode
    #[must_use]
    pub fn active(episode: episode::Id) -> Self {
        Self {
            episodes: vec![episode],
            active_only: true,
        }
    }
}
