//! [`Genre`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Genre,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<Genre>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Genre>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Genre>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, slug, name, \"order\" \
            FROM genres \
            ORDER BY \"order\", id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Genre {
                id: row.get("id"),
                slug: row.get("slug"),
                name: row.get("name"),
                order: row.get("order"),
            })
            .collect())
    }
}
