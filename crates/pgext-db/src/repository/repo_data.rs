use diesel::{prelude::*, upsert::excluded};

use crate::{
    models::{NewRepoData, RepoData},
    schema::repo_data,
};

pub struct RepoDataRepository;

impl RepoDataRepository {
    pub fn find(conn: &mut SqliteConnection, id: &str) -> QueryResult<Option<RepoData>> {
        repo_data::table
            .filter(repo_data::id.eq(id))
            .select(RepoData::as_select())
            .first(conn)
            .optional()
    }

    /// Lists stored repositories ordered by id.
    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<RepoData>> {
        repo_data::table
            .order(repo_data::id.asc())
            .select(RepoData::as_select())
            .load(conn)
    }

    pub fn upsert(conn: &mut SqliteConnection, record: &NewRepoData<'_>) -> QueryResult<usize> {
        diesel::insert_into(repo_data::table)
            .values(record)
            .on_conflict(repo_data::id)
            .do_update()
            .set((
                repo_data::kind.eq(excluded(repo_data::kind)),
                repo_data::etag.eq(excluded(repo_data::etag)),
                repo_data::size.eq(excluded(repo_data::size)),
                repo_data::last_modified.eq(excluded(repo_data::last_modified)),
                repo_data::data.eq(excluded(repo_data::data)),
                repo_data::updated_at.eq(excluded(repo_data::updated_at)),
            ))
            .execute(conn)
    }
}
