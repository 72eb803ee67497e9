//! [`WatchHistory`]-related [`Database`] implementations.
//!
//! [`WatchHistory`]: crate::domain::WatchHistory

use common::operations::{By, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{movie, user, watch_history},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::movie::summary_from_row;

/// Maps the provided [`Row`] into a [`read::watch_history::Entry`].
fn entry_from_row(row: &Row) -> read::watch_history::Entry {
    read::watch_history::Entry {
        id: row.get("id"),
        movie_id: row.get("movie_id"),
        episode_id: row.get("episode_id"),
        progress_seconds: row.get("progress_seconds"),
        last_watched_at: row.get("last_watched_at"),
        movie: summary_from_row(row),
    }
}

impl<C> Database<Update<watch_history::Report>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(report): Update<watch_history::Report>,
    ) -> Result<Self::Ok, Self::Err> {
        let watch_history::Report {
            user_id,
            movie_id,
            episode_id,
            progress,
            at,
        } = report;

        // Omitted episode and progress keep their previous values.
        const SQL: &str = "\
            INSERT INTO watch_history (\
                user_id, movie_id, episode_id, \
                progress_seconds, last_watched_at\
            ) \
            VALUES (\
                $1::UUID, $2::INT4, $3::INT4, \
                COALESCE($4::INT4, 0), $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (user_id, movie_id) DO UPDATE \
            SET episode_id = COALESCE(\
                    $3::INT4, watch_history.episode_id\
                ), \
                progress_seconds = COALESCE(\
                    $4::INT4, watch_history.progress_seconds\
                ), \
                last_watched_at = EXCLUDED.last_watched_at";
        self.exec(SQL, &[&user_id, &movie_id, &episode_id, &progress, &at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<read::watch_history::Entry>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::watch_history::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::watch_history::Entry>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();
        let limit = read::watch_history::LIMIT;

        const SQL: &str = "\
            SELECT h.id, h.movie_id, h.episode_id, \
                   h.progress_seconds, h.last_watched_at, \
                   m.id AS m_id, m.slug AS m_slug, \
                   m.title AS m_title, \
                   m.original_title AS m_original_title, \
                   m.poster AS m_poster, m.backdrop AS m_backdrop, \
                   m.year AS m_year, m.status AS m_status, \
                   m.views AS m_views, \
                   (SELECT COUNT(*) \
                    FROM episodes \
                    WHERE movie_id = m.id) AS m_episodes \
            FROM watch_history AS h \
            INNER JOIN movies AS m ON m.id = h.movie_id \
            WHERE h.user_id = $1::UUID \
            ORDER BY h.last_watched_at DESC, h.id DESC \
            LIMIT $2::INT8";
        Ok(self
            .query(SQL, &[&user_id, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(entry_from_row)
            .collect())
    }
}

impl<C>
    Database<
        Select<By<Option<read::watch_history::Entry>, (user::Id, movie::Id)>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::watch_history::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::watch_history::Entry>, (user::Id, movie::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, movie_id) = by.into_inner();

        const SQL: &str = "\
            SELECT h.id, h.movie_id, h.episode_id, \
                   h.progress_seconds, h.last_watched_at, \
                   m.id AS m_id, m.slug AS m_slug, \
                   m.title AS m_title, \
                   m.original_title AS m_original_title, \
                   m.poster AS m_poster, m.backdrop AS m_backdrop, \
                   m.year AS m_year, m.status AS m_status, \
                   m.views AS m_views, \
                   (SELECT COUNT(*) \
                    FROM episodes \
                    WHERE movie_id = m.id) AS m_episodes \
            FROM watch_history AS h \
            INNER JOIN movies AS m ON m.id = h.movie_id \
            WHERE h.user_id = $1::UUID \
              AND h.movie_id = $2::INT4";
        Ok(self
            .query_opt(SQL, &[&user_id, &movie_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(entry_from_row))
    }
}
