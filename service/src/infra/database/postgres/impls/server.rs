//! [`Server`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Server,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Vec<Server>, read::server::OfEpisodes>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Server>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Server>, read::server::OfEpisodes>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::server::OfEpisodes {
            episodes,
            active_only,
        } = by.into_inner();
        if episodes.is_empty() {
            return Ok(vec![]);
        }

        const SQL: &str = "\
            SELECT id, episode_id, name, embed_url, \
                   priority, is_active, created_at \
            FROM servers \
            WHERE episode_id = ANY($1::INT4[]) \
              AND (NOT $2::BOOL OR is_active) \
            ORDER BY episode_id, priority, id";
        Ok(self
            .query(SQL, &[&episodes, &active_only])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Server {
                id: row.get("id"),
                episode_id: row.get("episode_id"),
                name: row.get("name"),
                embed_url: row.get("embed_url"),
                priority: row.get("priority"),
                is_active: row.get("is_active"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
