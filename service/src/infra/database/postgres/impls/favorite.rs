//! [`Favorite`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{favorite, movie, user, Favorite},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::movie::summary_from_row;

impl<C> Database<Select<By<Option<Favorite>, (user::Id, movie::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Favorite>, (user::Id, movie::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, movie_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, movie_id, created_at \
            FROM favorites \
            WHERE user_id = $1::UUID \
              AND movie_id = $2::INT4";
        Ok(self
            .query_opt(SQL, &[&user_id, &movie_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Favorite {
                id: row.get("id"),
                user_id: row.get("user_id"),
                movie_id: row.get("movie_id"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Select<By<Vec<read::favorite::Entry>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::favorite::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::favorite::Entry>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT f.id, f.movie_id, f.created_at, \
                   m.id AS m_id, m.slug AS m_slug, \
                   m.title AS m_title, \
                   m.original_title AS m_original_title, \
                   m.poster AS m_poster, m.backdrop AS m_backdrop, \
                   m.year AS m_year, m.status AS m_status, \
                   m.views AS m_views, \
                   (SELECT COUNT(*) \
                    FROM episodes \
                    WHERE movie_id = m.id) AS m_episodes \
            FROM favorites AS f \
            INNER JOIN movies AS m ON m.id = f.movie_id \
            WHERE f.user_id = $1::UUID \
            ORDER BY f.created_at DESC, f.id DESC";
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| read::favorite::Entry {
                id: row.get("id"),
                movie_id: row.get("movie_id"),
                created_at: row.get("created_at"),
                movie: summary_from_row(row),
            })
            .collect())
    }
}

impl<C> Database<Insert<favorite::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<favorite::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let favorite::Draft { user_id, movie_id } = draft;
        let now = DateTime::now();

        const SQL: &str = "\
            INSERT INTO favorites (user_id, movie_id, created_at) \
            VALUES ($1::UUID, $2::INT4, $3::TIMESTAMPTZ) \
            ON CONFLICT (user_id, movie_id) DO NOTHING";
        self.exec(SQL, &[&user_id, &movie_id, &now])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Favorite, favorite::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Favorite, favorite::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: favorite::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM favorites \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
