/// Test data factories
///
/// Payload builders mirror what the provider's extended endpoints return;
/// the raw-row helpers exist so reconciliation tests can manufacture the
/// duplicate states that normal merges are designed to prevent.
use bingelog::modules::provider::{
    AliasPayload, CharacterPayload, EpisodePayload, GenrePayload, PersonPayload, SearchResult,
    SeasonPayload, SeasonTypePayload, TitlePayload,
};
use bingelog::schema::{checkins, content, episodes, people, seasons};
use bingelog::shared::domain::ContentKind;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

pub fn title_payload(tvdb_id: i32, name: &str) -> TitlePayload {
    TitlePayload {
        id: Some(tvdb_id),
        name: Some(name.to_string()),
        overview: Some(format!("{} overview", name)),
        year: Some(2020),
        status: Some("Continuing".to_string()),
        image: Some(format!("https://art.example/{}.jpg", tvdb_id)),
        original_language: Some("eng".to_string()),
        original_country: Some("usa".to_string()),
        ..Default::default()
    }
}

pub fn season_payload(
    tvdb_id: i32,
    number: i32,
    type_id: i32,
    type_name: &str,
) -> SeasonPayload {
    SeasonPayload {
        id: Some(tvdb_id),
        number: Some(number),
        name: Some(format!("Season {}", number)),
        season_type: Some(SeasonTypePayload {
            id: Some(type_id),
            name: Some(type_name.to_string()),
            type_slug: Some(type_name.to_lowercase().replace(' ', "_")),
        }),
        year: Some("2020".to_string()),
        ..Default::default()
    }
}

pub fn episode_payload(tvdb_id: i32, season_number: i32, episode_number: i32) -> EpisodePayload {
    EpisodePayload {
        id: Some(tvdb_id),
        season_number: Some(season_number),
        episode_number: Some(episode_number),
        name: Some(format!("S{:02}E{:02}", season_number, episode_number)),
        aired: Some("2020-03-01".to_string()),
        runtime: Some(42),
        ..Default::default()
    }
}

pub fn character_payload(
    people_id: i32,
    person_name: &str,
    people_type: &str,
    character: Option<&str>,
    sort: i32,
) -> CharacterPayload {
    CharacterPayload {
        people_id: Some(people_id),
        person_name: Some(person_name.to_string()),
        people_type: Some(people_type.to_string()),
        name: character.map(|c| c.to_string()),
        sort: Some(sort),
        image: None,
    }
}

pub fn genre_payload(tvdb_id: i32, name: &str) -> GenrePayload {
    GenrePayload {
        id: Some(tvdb_id),
        name: Some(name.to_string()),
        slug: None,
    }
}

pub fn alias_payload(name: &str, language: &str) -> AliasPayload {
    AliasPayload {
        name: Some(name.to_string()),
        language: Some(language.to_string()),
    }
}

pub fn person_payload(tvdb_id: i32, name: &str) -> PersonPayload {
    PersonPayload {
        id: Some(tvdb_id),
        name: Some(name.to_string()),
        biography: Some(format!("{} biography", name)),
        image: Some(format!("https://art.example/people/{}.jpg", tvdb_id)),
        ..Default::default()
    }
}

pub fn search_result(tvdb_id: i32, name: &str, media_type: &str) -> SearchResult {
    SearchResult {
        tvdb_id: Some(tvdb_id),
        name: Some(name.to_string()),
        media_type: Some(media_type.to_string()),
        year: Some(2020),
        ..Default::default()
    }
}

/// The series payload of the full-graph scenario: 2 seasons, credits for 5
/// people, 3 genres. Pair with `twenty_episodes` for the episode list.
pub fn full_series_payload(tvdb_id: i32) -> TitlePayload {
    TitlePayload {
        seasons: vec![
            season_payload(9001, 1, 1, "Aired Order"),
            season_payload(9002, 2, 1, "Aired Order"),
        ],
        characters: vec![
            character_payload(101, "Lead Actor", "Actor", Some("The Lead"), 0),
            character_payload(102, "Second Actor", "Actor", Some("The Friend"), 1),
            character_payload(103, "Show Director", "Director", None, 2),
            character_payload(104, "Show Writer", "Writer", None, 3),
            character_payload(105, "Show Runner", "Executive Producer", None, 4),
        ],
        genres: vec![
            genre_payload(1, "Drama"),
            genre_payload(2, "Fantasy"),
            genre_payload(3, "Adventure"),
        ],
        aliases: vec![alias_payload("The Full Series", "eng")],
        number_of_seasons: Some(2),
        number_of_episodes: Some(20),
        average_runtime: Some(42),
        ..title_payload(tvdb_id, "Full Series")
    }
}

/// 20 episodes, 10 per season.
pub fn twenty_episodes() -> Vec<EpisodePayload> {
    (0..20)
        .map(|i| episode_payload(5000 + i, i / 10 + 1, i % 10 + 1))
        .collect()
}

// ---------------------------------------------------------------------
// Raw-row helpers for manufacturing invariant violations
// ---------------------------------------------------------------------

pub fn insert_series_row(conn: &mut PgConnection, tvdb_id: i32, name: &str) -> i32 {
    diesel::insert_into(content::table)
        .values((
            content::tvdb_id.eq(tvdb_id),
            content::content_type.eq(ContentKind::Series),
            content::name.eq(name),
        ))
        .returning(content::id)
        .get_result::<i32>(conn)
        .expect("Failed to insert content row")
}

pub fn insert_season_row(
    conn: &mut PgConnection,
    content_id: i32,
    tvdb_id: i32,
    season_number: i32,
    season_type_id: Option<i32>,
    season_type: Option<&str>,
) -> i32 {
    diesel::insert_into(seasons::table)
        .values((
            seasons::tvdb_id.eq(tvdb_id),
            seasons::content_id.eq(content_id),
            seasons::season_number.eq(season_number),
            seasons::season_type_id.eq(season_type_id),
            seasons::season_type.eq(season_type),
        ))
        .returning(seasons::id)
        .get_result::<i32>(conn)
        .expect("Failed to insert season row")
}

pub fn insert_episode_row(
    conn: &mut PgConnection,
    content_id: i32,
    season_id: Option<i32>,
    tvdb_id: i32,
    season_number: i32,
    episode_number: i32,
) -> i32 {
    diesel::insert_into(episodes::table)
        .values((
            episodes::tvdb_id.eq(tvdb_id),
            episodes::content_id.eq(content_id),
            episodes::season_id.eq(season_id),
            episodes::season_number.eq(season_number),
            episodes::episode_number.eq(episode_number),
        ))
        .returning(episodes::id)
        .get_result::<i32>(conn)
        .expect("Failed to insert episode row")
}

pub fn insert_checkin_row(
    conn: &mut PgConnection,
    content_id: i32,
    episode_id: Option<i32>,
) -> i32 {
    diesel::insert_into(checkins::table)
        .values((
            checkins::user_id.eq(1),
            checkins::content_id.eq(content_id),
            checkins::episode_id.eq(episode_id),
            checkins::watched_at.eq(Utc::now()),
        ))
        .returning(checkins::id)
        .get_result::<i32>(conn)
        .expect("Failed to insert checkin row")
}

pub fn insert_person_row(
    conn: &mut PgConnection,
    tvdb_id: i32,
    full_name: &str,
    last_synced_at: Option<DateTime<Utc>>,
) -> i32 {
    diesel::insert_into(people::table)
        .values((
            people::tvdb_id.eq(tvdb_id),
            people::full_name.eq(full_name),
            people::last_synced_at.eq(last_synced_at),
        ))
        .returning(people::id)
        .get_result::<i32>(conn)
        .expect("Failed to insert person row")
}

pub fn insert_aged_sync_log(conn: &mut PgConnection, tvdb_id: i32, age_days: i32) {
    diesel::sql_query(format!(
        "INSERT INTO sync_logs (entity_type, tvdb_id, outcome, synced_at)
         VALUES ('content', {}, 'success', NOW() - INTERVAL '{} days')",
        tvdb_id, age_days
    ))
    .execute(conn)
    .expect("Failed to insert sync log row");
}

pub fn set_content_last_synced(
    conn: &mut PgConnection,
    content_id: i32,
    last_synced_at: Option<DateTime<Utc>>,
) {
    diesel::update(content::table.find(content_id))
        .set(content::last_synced_at.eq(last_synced_at))
        .execute(conn)
        .expect("Failed to update last_synced_at");
}
