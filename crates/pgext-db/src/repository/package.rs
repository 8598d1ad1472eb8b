use diesel::prelude::*;

use crate::{
    error::Result,
    models::{NewPackageRow, PackageRow},
    schema::package,
};

pub struct PackageRepository;

impl PackageRepository {
    pub fn replace(
        conn: &mut SqliteConnection,
        repo: &str,
        packages: &[NewPackageRow],
    ) -> Result<usize> {
        diesel::delete(package::table.filter(package::repo.eq(repo))).execute(conn)?;
        for row in packages {
            diesel::insert_into(package::table)
                .values(row)
                .execute(conn)?;
        }
        Ok(packages.len())
    }

    /// All package records in insertion order.
    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<PackageRow>> {
        package::table
            .order(package::id.asc())
            .select(PackageRow::as_select())
            .load(conn)
    }

    pub fn list_by_repo(conn: &mut SqliteConnection, repo: &str) -> QueryResult<Vec<PackageRow>> {
        package::table
            .filter(package::repo.eq(repo))
            .order(package::id.asc())
            .select(PackageRow::as_select())
            .load(conn)
    }

    pub fn count(conn: &mut SqliteConnection, repo: &str) -> QueryResult<i64> {
        package::table
            .filter(package::repo.eq(repo))
            .count()
            .get_result(conn)
    }
}
