//! [`Tag`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Tag,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<Tag>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Tag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Tag>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, slug, name, \"order\" \
            FROM tags \
            ORDER BY \"order\", id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Tag {
                id: row.get("id"),
                slug: row.get("slug"),
                name: row.get("name"),
                order: row.get("order"),
            })
            .collect())
    }
}
