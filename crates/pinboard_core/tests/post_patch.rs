use pinboard_core::{
    startup, ConnectionPool, PostField, PostPatch, PostRepository, PostValidationError,
    RepoError, SqlitePostRepository, StoreConfig,
};

fn seeded_pool() -> ConnectionPool {
    let pool = startup(StoreConfig::in_memory()).unwrap();
    {
        let conn = pool.acquire().unwrap();
        conn.execute_batch(
            "UPDATE posts
             SET created_at = '2020-01-01T00:00:00.000', updated_at = '2020-01-01T00:00:00.000';",
        )
        .unwrap();
    }
    pool
}

#[test]
fn patch_applies_only_supplied_fields() {
    let pool = seeded_pool();
    let repo = SqlitePostRepository::new(&pool);
    let before = repo.get_by_id(7).unwrap().unwrap();

    let updated = repo
        .update_partial(
            7,
            "lucho",
            &PostPatch::default().with(PostField::Description, "New desk"),
        )
        .unwrap();

    assert_eq!(updated.description.as_deref(), Some("New desk"));
    assert_eq!(updated.image_url, before.image_url);
    assert_eq!(updated.tags, before.tags);
    assert_eq!(updated.owner_id, before.owner_id);
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.updated_at > before.updated_at);
}

#[test]
fn empty_patch_returns_record_without_bumping_updated_at() {
    let pool = seeded_pool();
    let repo = SqlitePostRepository::new(&pool);
    let before = repo.get_by_id(2).unwrap().unwrap();

    let unchanged = repo
        .update_partial(2, "demo_user", &PostPatch::default())
        .unwrap();
    assert_eq!(unchanged, before);

    let all_null = PostPatch::from_fields([
        ("image_url", None::<String>),
        ("description", None),
        ("tags", None),
    ]);
    let still_unchanged = repo.update_partial(2, "demo_user", &all_null).unwrap();
    assert_eq!(still_unchanged, before);
    assert_eq!(repo.get_by_id(2).unwrap().unwrap(), before);
}

#[test]
fn unknown_fields_are_ignored() {
    let pool = seeded_pool();
    let repo = SqlitePostRepository::new(&pool);

    let patch = PostPatch::from_fields([
        ("owner_id", Some("lucho")),
        ("created_at", Some("1999-01-01T00:00:00.000")),
        ("tags", Some("renamed")),
    ]);
    let updated = repo.update_partial(1, "demo_user", &patch).unwrap();

    assert_eq!(updated.owner_id, "demo_user");
    assert_eq!(updated.created_at, "2020-01-01T00:00:00.000");
    assert_eq!(updated.tags.as_deref(), Some("renamed"));
}

#[test]
fn patch_with_only_unknown_fields_is_noop() {
    let pool = seeded_pool();
    let repo = SqlitePostRepository::new(&pool);
    let before = repo.get_by_id(1).unwrap().unwrap();

    let patch = PostPatch::from_fields([("owner_id", Some("lucho"))]);
    assert_eq!(repo.update_partial(1, "demo_user", &patch).unwrap(), before);
}

#[test]
fn empty_string_is_an_applied_value_not_a_clear() {
    let pool = seeded_pool();
    let repo = SqlitePostRepository::new(&pool);

    let updated = repo
        .update_partial(1, "demo_user", &PostPatch::default().with(PostField::Tags, ""))
        .unwrap();
    assert_eq!(updated.tags.as_deref(), Some(""));
    assert!(updated.updated_at > updated.created_at);
}

#[test]
fn patch_cannot_blank_image_url() {
    let pool = seeded_pool();
    let repo = SqlitePostRepository::new(&pool);
    let before = repo.get_by_id(1).unwrap().unwrap();

    let err = repo
        .update_partial(1, "demo_user", &PostPatch::default().with(PostField::ImageUrl, " "))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PostValidationError::EmptyImageUrl)
    ));
    assert_eq!(repo.get_by_id(1).unwrap().unwrap(), before);
}

#[test]
fn updated_at_never_precedes_created_at() {
    let pool = seeded_pool();
    let repo = SqlitePostRepository::new(&pool);
    {
        let conn = pool.acquire().unwrap();
        conn.execute(
            "UPDATE posts
             SET created_at = '2999-01-01T00:00:00.000', updated_at = '2999-01-01T00:00:00.000'
             WHERE id = 4;",
            [],
        )
        .unwrap();
    }

    let updated = repo
        .update_partial(4, "demo_user", &PostPatch::default().with(PostField::Tags, "late"))
        .unwrap();
    assert_eq!(updated.updated_at, "2999-01-01T00:00:00.000");
    assert!(updated.updated_at >= updated.created_at);
}
