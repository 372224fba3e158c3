//! One-time bootstrap population of an empty post store.
//!
//! # Invariants
//! - Rows are inserted only when `posts` holds zero rows; the count check and
//!   the inserts share one write transaction.
//! - Every row of one seeding run carries the same explicit timestamp.

use super::{DbResult, SQL_NOW};
use log::info;
use rusqlite::{params, Connection, TransactionBehavior};

/// Bootstrap record inserted by `seed_if_empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPost {
    pub owner_id: &'static str,
    pub image_url: &'static str,
    pub description: Option<&'static str>,
    pub tags: Option<&'static str>,
}

const fn seed(
    owner_id: &'static str,
    image_url: &'static str,
    description: &'static str,
    tags: &'static str,
) -> SeedPost {
    SeedPost {
        owner_id,
        image_url,
        description: Some(description),
        tags: Some(tags),
    }
}

/// Demo content shipped with a fresh store.
pub const DEFAULT_SEED_POSTS: &[SeedPost] = &[
    seed(
        "demo_user",
        "https://images.unsplash.com/photo-1506905925346-21bda4d32df4",
        "Mountains at sunrise",
        "nature,mountains,landscape",
    ),
    seed(
        "demo_user",
        "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d",
        "Urban portrait",
        "portrait,urban,city",
    ),
    seed(
        "demo_user",
        "https://images.unsplash.com/photo-1493976040374-85c8e12f0c0e",
        "Temple in Kyoto",
        "japan,travel,architecture",
    ),
    seed(
        "demo_user",
        "https://images.unsplash.com/photo-1519125323398-675f0ddb6308",
        "Coffee and code",
        "coffee,work,minimal",
    ),
    seed(
        "demo_user",
        "https://images.unsplash.com/photo-1517836357463-d25dfeac3438",
        "Fitness motivation",
        "fitness,gym,health",
    ),
    seed(
        "emiliano",
        "https://images.unsplash.com/photo-1682687220742-aba13b6e50ba",
        "Sunset at the beach",
        "beach,sunset,ocean",
    ),
    seed(
        "lucho",
        "https://images.unsplash.com/photo-1504384308090-c894fdcc538d",
        "Workspace",
        "office,design,workspace",
    ),
    seed(
        "lucho",
        "https://images.unsplash.com/photo-1501785888041-af3ef285b470",
        "Road trip",
        "travel,road,adventure",
    ),
];

/// Inserts `records` if and only if the post table is empty.
///
/// Returns the number of inserted rows (`0` when the table already had data).
pub fn seed_if_empty(conn: &mut Connection, records: &[SeedPost]) -> DbResult<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(0);
    }

    let seeded_at: String = tx.query_row(&format!("SELECT {SQL_NOW};"), [], |row| row.get(0))?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO posts (owner_id, image_url, description, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
        )?;
        for record in records {
            stmt.execute(params![
                record.owner_id,
                record.image_url,
                record.description,
                record.tags,
                seeded_at.as_str(),
            ])?;
        }
    }
    tx.commit()?;

    info!(
        "event=db_seed module=db status=ok inserted={}",
        records.len()
    );
    Ok(records.len())
}
