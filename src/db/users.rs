//! User persistence on SQLite.

use super::Database;
use crate::error::ServiceError;
use crate::store::{UserDirectory, new_id};
use crate::types::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{ErrorCode, Row, params};

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        name: row.get("name")?,
        hashed_password: row.get("hashed_password")?,
    })
}

impl Database {
    /// Insert a user; a duplicate username surfaces as `AlreadyExists`.
    pub fn insert_user(&self, user: NewUser) -> Result<User> {
        let user_id = new_id();

        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, name, hashed_password) VALUES (?1, ?2, ?3, ?4)",
                params![&user_id, &user.username, &user.name, &user.hashed_password],
            );

            match inserted {
                Ok(_) => Ok(User {
                    id: user_id,
                    username: user.username,
                    name: user.name,
                    hashed_password: user.hashed_password,
                }),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(ServiceError::already_exists("Username", &user.username).into())
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_user_where(&self, column: &str, value: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT * FROM users WHERE {} = ?1", column);
            let mut stmt = conn.prepare(&sql)?;

            match stmt.query_row(params![value], parse_user_row) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.get_user_where("id", user_id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_where("username", username)
    }

    /// All users, ordered by username.
    pub fn get_all_users(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM users ORDER BY username")?;
            let users = stmt
                .query_map([], parse_user_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
    }
}

#[async_trait]
impl UserDirectory for Database {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.get_user(id)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username(username)
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.insert_user(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.get_all_users()
    }
}
