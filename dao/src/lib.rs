use ph_db_postgresql::db::PostgresDb;
use ph_db_sqlite::db::SqliteDb;

pub mod file;
pub mod member;
pub mod membership;
pub mod project;
pub mod project_user;
pub mod user;
mod util;

pub enum Db {
    PostgresqlDb(PostgresDb),
    SqliteDb(SqliteDb),
}

impl Db {
    pub async fn close(&self) {
        match self {
            Self::PostgresqlDb(db) => db.close().await,
            Self::SqliteDb(db) => db.close().await,
        }
    }
}
