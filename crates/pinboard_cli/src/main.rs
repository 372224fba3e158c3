//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open (or create) a post store, run schema and seed, and report health.
//! - Print the first page of posts for quick local sanity checks.
//!
//! Usage: `pinboard_cli [DB_PATH]` (falls back to `PINBOARD_DB_PATH`, then
//! an in-memory store). Set `PINBOARD_LOG_DIR` to an absolute path to enable
//! file logging.

use pinboard_core::{
    core_version, default_log_level, init_logging, startup, PostService, SqlitePostRepository,
    StoreConfig,
};
use std::process::ExitCode;

const FIRST_PAGE_LIMIT: u32 = 10;

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("PINBOARD_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("pinboard logging disabled: {err}");
        }
    }

    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PINBOARD_DB_PATH").ok())
    {
        Some(path) => StoreConfig::file(path),
        None => StoreConfig::in_memory(),
    };

    println!("pinboard_core version={}", core_version());
    println!("pinboard store={:?}", config.location);

    let pool = match startup(config) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("event=cli_startup module=cli status=error error={err}");
            eprintln!("failed to open store: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("pinboard database_ok={}", pool.check_connection());

    let service = PostService::new(SqlitePostRepository::new(&pool));
    match service.list_posts(1, FIRST_PAGE_LIMIT, None) {
        Ok(page) => {
            println!(
                "pinboard total={} total_pages={} page={}",
                page.total, page.total_pages, page.page
            );
            for post in &page.items {
                println!(
                    "{:>5} {:<12} {} {}",
                    post.id,
                    post.owner_id,
                    post.created_at,
                    post.description.as_deref().unwrap_or("-")
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to list posts: {err}");
            ExitCode::FAILURE
        }
    }
}
