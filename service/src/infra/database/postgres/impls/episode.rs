//! [`Episode`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select},
    DateTime,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{episode, movie, server, Episode},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Maps the provided [`Row`] of the `episodes` table into an [`Episode`].
fn from_row(row: &Row) -> Episode {
    Episode {
        id: row.get("id"),
        movie_id: row.get("movie_id"),
        number: row.get("episode_number"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Vec<Episode>, movie::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Episode>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Episode>, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let movie_id: movie::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, movie_id, episode_number, \
                   name, slug, created_at \
            FROM episodes \
            WHERE movie_id = $1::INT4 \
            ORDER BY episode_number";
        Ok(self
            .query(SQL, &[&movie_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<Episode>, episode::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Episode>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Episode>, episode::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: episode::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, movie_id, episode_number, \
                   name, slug, created_at \
            FROM episodes \
            WHERE id = $1::INT4";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<Episode>, (movie::Id, episode::Number)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Episode>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Episode>, (movie::Id, episode::Number)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (movie_id, number) = by.into_inner();

        const SQL: &str = "\
            SELECT id, movie_id, episode_number, \
                   name, slug, created_at \
            FROM episodes \
            WHERE movie_id = $1::INT4 \
              AND episode_number = $2::INT4";
        Ok(self
            .query_opt(SQL, &[&movie_id, &number])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<(movie::Id, Vec<episode::Draft>)>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert((movie_id, episodes)): Insert<(movie::Id, Vec<episode::Draft>)>,
    ) -> Result<Self::Ok, Self::Err> {
        let now = DateTime::now();

        for episode::Draft {
            number,
            name,
            servers,
        } in episodes
        {
            const EPISODE_SQL: &str = "\
                INSERT INTO episodes (\
                    movie_id, episode_number, name, created_at\
                ) \
                VALUES (\
                    $1::INT4, $2::INT4, $3::VARCHAR, $4::TIMESTAMPTZ\
                ) \
                RETURNING id";
            let episode_id: episode::Id = self
                .query_opt(EPISODE_SQL, &[&movie_id, &number, &name, &now])
                .await
                .map_err(tracerr::wrap!())?
                .expect("`RETURNING` always returns a row")
                .get("id");

            for server::Draft {
                name,
                embed_url,
                priority,
            } in servers
            {
                const SERVER_SQL: &str = "\
                    INSERT INTO servers (\
                        episode_id, name, embed_url, \
                        priority, is_active, created_at\
                    ) \
                    VALUES (\
                        $1::INT4, $2::VARCHAR, $3::VARCHAR, \
                        $4::INT4, TRUE, $5::TIMESTAMPTZ\
                    )";
                self.exec(
                    SERVER_SQL,
                    &[&episode_id, &name, &embed_url, &priority, &now],
                )
                .await
                .map_err(tracerr::wrap!())?;
            }
        }
        Ok(())
    }
}

impl<C> Database<Delete<By<Vec<Episode>, movie::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Episode>, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let movie_id: movie::Id = by.into_inner();

        // Servers go along via `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM episodes \
            WHERE movie_id = $1::INT4";
        self.exec(SQL, &[&movie_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
