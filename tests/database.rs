//! Scenarios against a real postgres. Run with
//! `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::{collections::HashSet, str::FromStr};

use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use video_catalog::server::{router, AppState};

mod common;
use common::{ids, send};

const SCHEMA: &str = r#"
CREATE TABLE videos (
    id BIGINT PRIMARY KEY,
    site INTEGER,
    video_id TEXT,
    title TEXT,
    description TEXT,
    published_at TIMESTAMPTZ,
    deleted BOOLEAN NOT NULL DEFAULT FALSE,
    deleted_at TIMESTAMPTZ,
    alternative TEXT,
    thumbnail TEXT,
    download_format TEXT,
    downloaded_filename TEXT,
    downloaded_format TEXT,
    download BOOLEAN NOT NULL DEFAULT TRUE,
    force_redownload BOOLEAN NOT NULL DEFAULT FALSE,
    filesize BIGINT
);
CREATE TABLE channels (id BIGINT PRIMARY KEY, channel_id TEXT, name TEXT, thumbnail TEXT);
CREATE TABLE channelvideos (video_id BIGINT REFERENCES videos (id), channel_id BIGINT REFERENCES channels (id));
CREATE TABLE extra_video_files (
    video_id BIGINT PRIMARY KEY REFERENCES videos (id),
    thumbnail TEXT,
    audio_file TEXT,
    subtitles TEXT[],
    total_filesize BIGINT
);
CREATE TABLE playlists (id BIGINT PRIMARY KEY, name TEXT, playlist_id TEXT);
CREATE TABLE playlistvideos (video_id BIGINT REFERENCES videos (id), playlist_id BIGINT REFERENCES playlists (id));
CREATE TABLE tags (id BIGINT PRIMARY KEY, tag TEXT);
CREATE TABLE videotags (video_id BIGINT REFERENCES videos (id), tag_id BIGINT REFERENCES tags (id));

INSERT INTO videos (id, site, video_id, title, published_at, deleted, filesize) VALUES
    (1, 0, 'a1', 'Summer fest live', '2024-01-15T08:00:00Z', FALSE, 100),
    (2, 0, 'a2', 'Winter fest', '2024-01-15T23:30:00Z', TRUE, 200),
    (3, 0, 'a3', 'Talk', '2024-01-16T00:30:00Z', TRUE, NULL),
    (4, 1, 'b1', 'Music video', NULL, FALSE, 50),
    (5, 1, 'b2', 'Another fest', '2024-02-01T12:00:00Z', TRUE, 300);
INSERT INTO channels VALUES (1, 'UC1', 'Archive Channel', NULL), (2, 'UC2', 'Other', NULL);
INSERT INTO channelvideos VALUES (1, 1), (2, 1), (5, 2);
INSERT INTO extra_video_files VALUES (1, 'thumb.jpg', 'audio.m4a', ARRAY['en', 'fi'], 1000);
INSERT INTO playlists VALUES (42, 'Favorites', 'PL42'), (7, 'Archive', 'PL7');
INSERT INTO playlistvideos VALUES (1, 42), (2, 42), (1, 7), (3, 7);
INSERT INTO tags VALUES (1, 'music'), (2, 'live');
INSERT INTO videotags VALUES (1, 1), (1, 2), (4, 1);
"#;

/// A router over a freshly seeded schema of its own.
async fn app(name: &str) -> (Router, PgPool) {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let schema = format!("video_catalog_{name}");

    let admin = PgPool::connect(&url).await.unwrap();
    sqlx::raw_sql(&format!(
        "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema};"
    ))
    .execute(&admin)
    .await
    .unwrap();
    admin.close().await;

    let options = PgConnectOptions::from_str(&url)
        .unwrap()
        .options([("search_path", schema.as_str()), ("timezone", "UTC")]);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();

    (router(AppState { pool: pool.clone() }), pool)
}

async fn fetch(router: &Router, query: &str, body: Value) -> Value {
    let (status, body) = send(router, "POST", &format!("/videos{query}"), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
#[ignore]
async fn deleted_videos_are_paged_by_id() {
    let (router, _) = app("deleted").await;

    let body = fetch(
        &router,
        "?limit=10&offset=0",
        json!({
            "select": { "video": ["id", "title"] },
            "where": [{ "table": "video", "col": "deleted", "comp": "true" }]
        }),
    )
    .await;

    assert_eq!(ids(&body), vec![2, 3, 5]);
    assert_eq!(body["count"], 3);
    assert_eq!(body["rows"][0]["title"], "Winter fest");
}

#[tokio::test]
#[ignore]
async fn playlist_membership_does_not_duplicate_videos() {
    let (router, _) = app("playlist").await;

    let body = fetch(
        &router,
        "",
        json!({
            "select": { "video": ["id"], "playlist": ["name"] },
            "where": [{ "table": "playlist", "col": "id", "comp": "arrayAny", "value": ["42"] }]
        }),
    )
    .await;

    assert_eq!(ids(&body), vec![1, 2]);
    assert_eq!(body["count"], 2);

    let names: HashSet<_> = body["rows"][0]["playlist_name"]
        .as_array()
        .unwrap()
        .iter()
        .map(|name| name.as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        names,
        HashSet::from(["Favorites".to_owned(), "Archive".to_owned()])
    );
    assert_eq!(body["rows"][1]["playlist_name"], json!(["Favorites"]));
}

#[tokio::test]
#[ignore]
async fn date_buckets_cover_the_whole_day() {
    let (router, _) = app("dates").await;

    let at = |comp: &str, value: &str| {
        json!({
            "select": { "video": ["id"] },
            "where": [{ "table": "video", "col": "published_at", "comp": comp, "value": value }]
        })
    };

    assert_eq!(ids(&fetch(&router, "", at("at", "2024-01-15")).await), vec![1, 2]);
    assert_eq!(ids(&fetch(&router, "", at("before", "2024-01-16")).await), vec![1, 2]);
    assert_eq!(ids(&fetch(&router, "", at("after", "2024-01-15")).await), vec![3, 5]);
}

#[tokio::test]
#[ignore]
async fn count_matches_the_rows_fetched() {
    let (router, _) = app("consistency").await;

    let filter_sets = [
        json!([]),
        json!([{ "table": "video", "col": "title", "comp": "ILIKE", "value": "%fest%" }]),
        json!([{ "table": "tag", "col": "tag", "comp": "arrayAny", "value": ["music", "live"] }]),
        json!([{ "table": "tag", "col": "tag", "comp": "array=", "value": ["MUSIC"] }]),
        json!([{ "table": "playlist", "col": "name", "comp": "arrayLike", "value": ["%fav%"] }]),
        json!([{ "table": "channel", "col": "name", "comp": "=", "value": "Archive Channel" }]),
        json!([
            { "table": "files", "col": "total_filesize", "comp": ">", "value": 10 },
            { "table": "video", "col": "deleted", "comp": "false" }
        ]),
        json!([{ "table": "video", "col": "id", "comp": "arrayAny", "value": [1, 3, 99] }]),
    ];

    for filters in filter_sets {
        let body = fetch(
            &router,
            "?limit=300",
            json!({ "select": { "video": ["id"], "tag": ["tag"] }, "where": filters }),
        )
        .await;

        let (status, count) = send(
            &router,
            "POST",
            "/videos/count",
            Some(json!({ "where": filters })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let fetched = body["rows"].as_array().unwrap().len() as i64;
        assert_eq!(count["count"].as_i64(), Some(fetched), "{filters}");
        assert_eq!(body["count"].as_i64(), Some(fetched), "{filters}");
    }
}

#[tokio::test]
#[ignore]
async fn array_comparators_match_related_rows() {
    let (router, _) = app("arrays").await;

    let filter = |comp: &str, value: Value| {
        json!({
            "select": { "video": ["id"] },
            "where": [{ "table": "tag", "col": "tag", "comp": comp, "value": value }]
        })
    };

    assert_eq!(ids(&fetch(&router, "", filter("array=", json!(["MUSIC"]))).await), vec![1, 4]);
    assert_eq!(ids(&fetch(&router, "", filter("arrayLike", json!("li%"))).await), vec![1]);
    assert_eq!(ids(&fetch(&router, "", filter("arrayAny", json!(["nope"]))).await), Vec::<i64>::new());
}

#[tokio::test]
#[ignore]
async fn ordering_is_deterministic() {
    let (router, _) = app("ordering").await;

    let request = json!({
        "select": { "video": ["title"], "channel": ["name"], "files": ["subtitles"] },
        "sort": [{ "table": "video", "col": "site", "asc": false }]
    });

    let first = fetch(&router, "", request.clone()).await;
    let second = fetch(&router, "", request).await;

    assert_eq!(first, second);
    let titles: Vec<_> = first["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["title"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        titles,
        vec!["Music video", "Another fest", "Summer fest live", "Winter fest", "Talk"]
    );
    assert_eq!(first["rows"][2]["channel_name"], "Archive Channel");
    assert_eq!(first["rows"][2]["files_subtitles"], json!(["en", "fi"]));
    assert_eq!(first["rows"][4]["files_subtitles"], Value::Null);

    let paged = fetch(&router, "?limit=2&offset=2", json!({ "select": { "video": ["title"] } })).await;
    assert_eq!(ids(&paged), vec![3, 4]);
    assert_eq!(paged["count"], 5);
}

#[tokio::test]
#[ignore]
async fn timestamps_are_returned_as_rfc3339() {
    let (router, _) = app("timestamps").await;

    let body = fetch(
        &router,
        "",
        json!({
            "select": { "video": ["id", "published_at"] },
            "where": [{ "table": "video", "col": "id", "comp": "=", "value": 1 }]
        }),
    )
    .await;

    assert_eq!(body["rows"][0]["published_at"], "2024-01-15T08:00:00+00:00");
}

#[tokio::test]
#[ignore]
async fn editing_changes_only_the_target_video() {
    let (router, pool) = app("editing").await;

    let (status, _) = send(
        &router,
        "PATCH",
        "/videos/3",
        Some(json!({ "alternative": "mirror", "download_format": null })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let alternatives: Vec<(i64, Option<String>)> =
        sqlx::query_as("SELECT id, alternative FROM videos ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(alternatives[2], (3, Some("mirror".to_owned())));
    assert!(alternatives
        .iter()
        .filter(|(id, _)| *id != 3)
        .all(|(_, alternative)| alternative.is_none()));

    let (status, _) = send(
        &router,
        "PATCH",
        "/videos/999",
        Some(json!({ "alternative": "mirror" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn playlists_are_listed_by_name() {
    let (router, _) = app("playlists").await;

    let (status, body) = send(&router, "GET", "/playlists", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "rows": [{ "name": "Archive", "id": 7 }, { "name": "Favorites", "id": 42 }] })
    );

    let (status, _) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
