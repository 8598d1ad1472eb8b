use diesel::prelude::*;
use pgext_registry::DebPackage;

use crate::{error::Result, models::NewApt, schema::apt};

pub struct AptRepository;

impl AptRepository {
    /// Replaces all rows of `repo` with `packages`, preserving their order.
    pub fn replace(
        conn: &mut SqliteConnection,
        repo: &str,
        packages: &[DebPackage],
    ) -> Result<usize> {
        diesel::delete(apt::table.filter(apt::repo.eq(repo))).execute(conn)?;
        for pkg in packages {
            let row = NewApt::from_deb(repo, pkg)?;
            diesel::insert_into(apt::table).values(&row).execute(conn)?;
        }
        Ok(packages.len())
    }

    pub fn count(conn: &mut SqliteConnection, repo: &str) -> QueryResult<i64> {
        apt::table
            .filter(apt::repo.eq(repo))
            .count()
            .get_result(conn)
    }
}
