use pinboard_core::{
    startup, ConnectionPool, NewPost, PostRepository, PostReplacement, PostValidationError,
    RepoError, SqlitePostRepository, StoreConfig,
};

fn empty_pool() -> ConnectionPool {
    startup(StoreConfig::in_memory().with_seed_on_start(false)).unwrap()
}

#[test]
fn insert_and_get_roundtrip() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);

    let created = repo
        .insert(
            &NewPost::new("emiliano", "https://example.com/beach.png")
                .with_description("beach")
                .with_tags("beach,sunset"),
        )
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.owner_id, "emiliano");
    assert_eq!(created.image_url, "https://example.com/beach.png");
    assert_eq!(created.description.as_deref(), Some("beach"));
    assert_eq!(created.tags.as_deref(), Some("beach,sunset"));
    assert_eq!(created.created_at, created.updated_at);

    let loaded = repo.get_by_id(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn insert_keeps_optional_fields_null() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);

    let created = repo
        .insert(&NewPost::new("lucho", "https://example.com/road.png"))
        .unwrap();
    assert_eq!(created.description, None);
    assert_eq!(created.tags, None);
}

#[test]
fn insert_assigns_increasing_ids() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);

    let first = repo
        .insert(&NewPost::new("a", "https://example.com/1.png"))
        .unwrap();
    let second = repo
        .insert(&NewPost::new("b", "https://example.com/2.png"))
        .unwrap();
    assert!(second.id > first.id);
    assert!(second.created_at >= first.created_at);
}

#[test]
fn insert_rejects_blank_required_fields() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);

    let err = repo
        .insert(&NewPost::new("lucho", "   "))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PostValidationError::EmptyImageUrl)
    ));

    let err = repo
        .insert(&NewPost::new("", "https://example.com/a.png"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PostValidationError::EmptyOwner)
    ));
}

#[test]
fn get_missing_post_returns_none() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);
    assert!(repo.get_by_id(999).unwrap().is_none());
}

#[test]
fn replace_overwrites_every_mutable_field() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);
    let created = repo
        .insert(
            &NewPost::new("lucho", "https://example.com/old.png")
                .with_description("old")
                .with_tags("a,b"),
        )
        .unwrap();
    backdate(&pool, created.id);

    let replaced = repo
        .replace(
            created.id,
            "lucho",
            &PostReplacement::new("https://example.com/new.png"),
        )
        .unwrap();

    assert_eq!(replaced.image_url, "https://example.com/new.png");
    assert_eq!(replaced.description, None);
    assert_eq!(replaced.tags, None);
    assert_eq!(replaced.owner_id, "lucho");
    assert_eq!(replaced.created_at, "2020-01-01T00:00:00.000");
    assert!(replaced.updated_at > replaced.created_at);
}

#[test]
fn replace_bumps_updated_at_even_when_values_are_identical() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);
    let created = repo
        .insert(&NewPost::new("lucho", "https://example.com/same.png").with_tags("x"))
        .unwrap();
    backdate(&pool, created.id);

    let replaced = repo
        .replace(
            created.id,
            "lucho",
            &PostReplacement::new("https://example.com/same.png").with_tags("x"),
        )
        .unwrap();
    assert!(replaced.updated_at > "2020-01-01T00:00:00.000".to_string());
}

#[test]
fn replace_missing_post_returns_not_found() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);

    let err = repo
        .replace(42, "lucho", &PostReplacement::new("https://example.com/x.png"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn delete_removes_row_and_reports_missing_ids() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);
    let created = repo
        .insert(&NewPost::new("lucho", "https://example.com/a.png"))
        .unwrap();

    assert!(repo.delete(created.id, "lucho").unwrap());
    assert!(repo.get_by_id(created.id).unwrap().is_none());
    assert!(!repo.delete(created.id, "lucho").unwrap());
}

#[test]
fn post_serializes_with_flat_field_names() {
    let pool = empty_pool();
    let repo = SqlitePostRepository::new(&pool);
    let created = repo
        .insert(&NewPost::new("lucho", "https://example.com/a.png").with_tags("a"))
        .unwrap();

    let value = serde_json::to_value(&created).unwrap();
    assert_eq!(value["id"], 1);
    assert_eq!(value["owner_id"], "lucho");
    assert_eq!(value["tags"], "a");
    assert!(value["description"].is_null());
    assert_eq!(value["created_at"], value["updated_at"]);
}

fn backdate(pool: &ConnectionPool, id: i64) {
    let conn = pool.acquire().unwrap();
    conn.execute(
        "UPDATE posts
         SET created_at = '2020-01-01T00:00:00.000', updated_at = '2020-01-01T00:00:00.000'
         WHERE id = ?1;",
        [id],
    )
    .unwrap();
}
