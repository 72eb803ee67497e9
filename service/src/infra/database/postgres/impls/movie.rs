//! [`Movie`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    DateTime,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{genre, movie, tag, Movie},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Maps the provided [`Row`] into a [`read::movie::Summary`].
///
/// Expects the columns of the [`Movie`] to be prefixed with `m_`.
pub(super) fn summary_from_row(row: &Row) -> read::movie::Summary {
    read::movie::Summary {
        id: row.get("m_id"),
        slug: row.get("m_slug"),
        title: row.get("m_title"),
        original_title: row.get("m_original_title"),
        poster: row.get("m_poster"),
        backdrop: row.get("m_backdrop"),
        year: row.get("m_year"),
        status: row.get("m_status"),
        views: row.get("m_views"),
        episodes: row.get("m_episodes"),
    }
}

impl<C> Postgres<C>
where
    C: Connection,
{
    /// Replaces [`genre::Id`]s and [`tag::Id`]s linked to the [`Movie`].
    ///
    /// Unknown IDs are skipped.
    async fn link_movie(
        &self,
        id: movie::Id,
        genres: &[genre::Id],
        tags: &[tag::Id],
    ) -> Result<(), Traced<database::Error>> {
        const UNLINK_GENRES_SQL: &str = "\
            DELETE FROM movie_genres \
            WHERE movie_id = $1::INT4";
        self.exec(UNLINK_GENRES_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;
        const LINK_GENRES_SQL: &str = "\
            INSERT INTO movie_genres (movie_id, genre_id) \
            SELECT $1::INT4, id \
            FROM genres \
            WHERE id = ANY($2::INT4[]) \
            ON CONFLICT DO NOTHING";
        self.exec(LINK_GENRES_SQL, &[&id, &genres])
            .await
            .map_err(tracerr::wrap!())?;

        const UNLINK_TAGS_SQL: &str = "\
            DELETE FROM movie_tags \
            WHERE movie_id = $1::INT4";
        self.exec(UNLINK_TAGS_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;
        const LINK_TAGS_SQL: &str = "\
            INSERT INTO movie_tags (movie_id, tag_id) \
            SELECT $1::INT4, id \
            FROM tags \
            WHERE id = ANY($2::INT4[]) \
            ON CONFLICT DO NOTHING";
        self.exec(LINK_TAGS_SQL, &[&id, &tags])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C, IDs> Database<Select<By<HashMap<movie::Id, Movie>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[movie::Id]>,
{
    type Ok = HashMap<movie::Id, Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<movie::Id, Movie>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[movie::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        const SQL: &str = "\
            SELECT m.id, m.slug, m.title, m.original_title, \
                   m.description, m.poster, m.backdrop, \
                   m.year, m.status, m.views, \
                   ARRAY(SELECT genre_id \
                         FROM movie_genres \
                         WHERE movie_id = m.id \
                         ORDER BY genre_id) AS genres, \
                   ARRAY(SELECT tag_id \
                         FROM movie_tags \
                         WHERE movie_id = m.id \
                         ORDER BY tag_id) AS tags, \
                   m.created_at, m.updated_at \
            FROM movies AS m \
            WHERE m.id IN (SELECT unnest($1::INT4[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Movie {
                        id,
                        slug: row.get("slug"),
                        title: row.get("title"),
                        original_title: row.get("original_title"),
                        description: row.get("description"),
                        poster: row.get("poster"),
                        backdrop: row.get("backdrop"),
                        year: row.get("year"),
                        status: row.get("status"),
                        views: row.get("views"),
                        genres: row.get("genres"),
                        tags: row.get("tags"),
                        created_at: row.get("created_at"),
                        updated_at: row.get("updated_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Movie>, movie::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<movie::Id, Movie>, [movie::Id; 1]>>,
        Ok = HashMap<movie::Id, Movie>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Movie>, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'s, C> Database<Select<By<Option<Movie>, &'s movie::Slug>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Movie>, movie::Id>>,
        Ok = Option<Movie>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Movie>, &'s movie::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slug = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM movies \
            WHERE slug = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[slug])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, movie::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<movie::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Movie;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<movie::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let movie::Draft {
            slug,
            title,
            original_title,
            description,
            poster,
            backdrop,
            year,
            status,
            genres,
            tags,
        } = draft;
        let views = movie::Views::default();
        let now = DateTime::now();

        const SQL: &str = "\
            INSERT INTO movies (\
                slug, title, original_title, \
                description, poster, backdrop, \
                year, status, views, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, \
                $4::TEXT, $5::VARCHAR, $6::VARCHAR, \
                $7::INT4, $8::INT2, $9::INT4, \
                $10::TIMESTAMPTZ, $10::TIMESTAMPTZ\
            ) \
            RETURNING id";
        let id: movie::Id = self
            .query_opt(
                SQL,
                &[
                    &slug,
                    &title,
                    &original_title,
                    &description,
                    &poster,
                    &backdrop,
                    &year,
                    &status,
                    &views,
                    &now,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("`RETURNING` always returns a row")
            .get("id");

        self.link_movie(id, &genres, &tags)
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Movie {
            id,
            slug,
            title,
            original_title,
            description,
            poster,
            backdrop,
            year,
            status,
            views,
            genres,
            tags,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        })
    }
}

impl<C> Database<Update<Movie>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(movie): Update<Movie>,
    ) -> Result<Self::Ok, Self::Err> {
        let Movie {
            id,
            slug,
            title,
            original_title,
            description,
            poster,
            backdrop,
            year,
            status,
            views,
            genres,
            tags,
            created_at: _,
            updated_at,
        } = movie;

        const SQL: &str = "\
            UPDATE movies \
            SET slug = $2::VARCHAR, \
                title = $3::VARCHAR, \
                original_title = $4::VARCHAR, \
                description = $5::TEXT, \
                poster = $6::VARCHAR, \
                backdrop = $7::VARCHAR, \
                year = $8::INT4, \
                status = $9::INT2, \
                views = $10::INT4, \
                updated_at = $11::TIMESTAMPTZ \
            WHERE id = $1::INT4";
        self.exec(
            SQL,
            &[
                &id,
                &slug,
                &title,
                &original_title,
                &description,
                &poster,
                &backdrop,
                &year,
                &status,
                &views,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())?;

        self.link_movie(id, &genres, &tags)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Movie, movie::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Movie, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: movie::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM movies \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Movie, movie::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Movie, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: movie::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM movies \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::movie::list::Page, read::movie::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::movie::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::movie::list::Page, read::movie::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use read::movie::list::OrderBy;

        let read::movie::list::Selector {
            arguments,
            filter: read::movie::list::Filter { status, order_by },
        } = by.into_inner();

        let limit = arguments.sql_limit();
        let offset = arguments.sql_offset();

        const COUNT_SQL: &str = "\
            SELECT COUNT(*) \
            FROM movies \
            WHERE $1::INT2 IS NULL OR status = $1::INT2";
        let total = self
            .query_opt(COUNT_SQL, &[&status])
            .await
            .map_err(tracerr::wrap!())?
            .map_or(0, |row| row.get::<_, i64>(0));

        let sql = format!(
            "SELECT m.id AS m_id, m.slug AS m_slug, \
                    m.title AS m_title, \
                    m.original_title AS m_original_title, \
                    m.poster AS m_poster, m.backdrop AS m_backdrop, \
                    m.year AS m_year, m.status AS m_status, \
                    m.views AS m_views, \
                    (SELECT COUNT(*) \
                     FROM episodes \
                     WHERE movie_id = m.id) AS m_episodes \
             FROM movies AS m \
             WHERE $1::INT2 IS NULL OR m.status = $1::INT2 \
             ORDER BY m.{column} DESC, m.id DESC \
             LIMIT $2::INT8 \
             OFFSET $3::INT8",
            column = match order_by {
                OrderBy::CreatedAt => "created_at",
                OrderBy::UpdatedAt => "updated_at",
            },
        );
        let items = self
            .query(&sql, &[&status, &limit, &offset])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(summary_from_row)
            .collect::<Vec<_>>();

        Ok(read::movie::list::Page::new(
            arguments,
            items,
            usize::try_from(total).unwrap_or_default(),
        ))
    }
}
