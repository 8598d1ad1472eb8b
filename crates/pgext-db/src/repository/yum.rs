use diesel::prelude::*;
use pgext_registry::RpmPackage;

use crate::{error::Result, models::NewYum, schema::yum};

pub struct YumRepository;

impl YumRepository {
    /// Replaces all rows of `repo` with `packages`, preserving their order.
    pub fn replace(
        conn: &mut SqliteConnection,
        repo: &str,
        packages: &[RpmPackage],
    ) -> Result<usize> {
        diesel::delete(yum::table.filter(yum::repo.eq(repo))).execute(conn)?;
        for pkg in packages {
            diesel::insert_into(yum::table)
                .values(&NewYum::from_rpm(repo, pkg))
                .execute(conn)?;
        }
        Ok(packages.len())
    }

    pub fn count(conn: &mut SqliteConnection, repo: &str) -> QueryResult<i64> {
        yum::table
            .filter(yum::repo.eq(repo))
            .count()
            .get_result(conn)
    }
}
