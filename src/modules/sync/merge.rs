//! Graph merge engine.
//!
//! Converges normalized storage onto one provider payload: core row, kind
//! detail, genres, credits, seasons/episodes and aliases, all inside a
//! single transaction per entity. Children use clear-then-recreate, so
//! re-running a merge with the same payload is a no-op in terms of final
//! state, which is what makes at-least-once job delivery safe.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use tokio::task;

use crate::log_debug;
use crate::modules::catalog::domain::value_objects::{
    AliasEntityKind, RoleType, AIRED_ORDER_SEASON_TYPE_ID,
};
use crate::modules::catalog::infrastructure::models::{
    ContentChangeset, NewAlias, NewContent, NewContentGenre, NewCredit, NewEpisode, NewGenre,
    NewMovieDetail, NewPerson, NewSeason, NewSeriesDetail, PersonChangeset,
};
use crate::modules::provider::domain::payload::{
    AliasPayload, CharacterPayload, EpisodePayload, GenrePayload, PersonPayload, SeasonPayload,
    TitlePayload,
};
use crate::schema::{
    aliases, content, content_genres, credits, episodes, genres, movie_details, people, seasons,
    series_details,
};
use crate::shared::domain::ContentKind;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

pub struct GraphMergeEngine {
    db: Arc<Database>,
}

impl GraphMergeEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Merge one title payload (plus, for series, its episode list) into
    /// storage. Returns the local content id. Any failure rolls back the
    /// whole merge; the retried job re-runs it from scratch.
    pub async fn save_title_full(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
        payload: TitlePayload,
        episode_payloads: Vec<EpisodePayload>,
    ) -> AppResult<i32> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<i32> {
            let mut conn = db.get_connection()?;

            conn.transaction::<i32, AppError, _>(|conn| {
                let content_id = Self::upsert_content(conn, tvdb_id, kind, &payload)?;

                match kind {
                    ContentKind::Series => {
                        Self::upsert_series_detail(conn, content_id, &payload, &episode_payloads)?
                    }
                    ContentKind::Movie => Self::upsert_movie_detail(conn, content_id, &payload)?,
                }

                Self::replace_genres(conn, content_id, &payload.genres)?;
                Self::replace_credits(conn, content_id, &payload.characters)?;

                if kind == ContentKind::Series {
                    Self::replace_seasons_and_episodes(
                        conn,
                        content_id,
                        &payload.seasons,
                        &episode_payloads,
                    )?;
                }

                Self::replace_aliases(
                    conn,
                    AliasEntityKind::Content,
                    content_id,
                    &payload.aliases,
                )?;

                log_debug!("Merged {} {} as content {}", kind, tvdb_id, content_id);
                Ok(content_id)
            })
        })
        .await?
    }

    /// Merge one person payload. Returns the local person id.
    pub async fn save_person_full(&self, tvdb_id: i32, payload: PersonPayload) -> AppResult<i32> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<i32> {
            let mut conn = db.get_connection()?;

            conn.transaction::<i32, AppError, _>(|conn| {
                let now = Utc::now();
                let full_name = payload.name.clone().unwrap_or_else(|| "Unknown".to_string());
                let raw = payload.to_raw();

                let existing_id: Option<i32> = people::table
                    .filter(people::tvdb_id.eq(tvdb_id))
                    .select(people::id)
                    .first::<i32>(conn)
                    .optional()?;

                let person_id = if let Some(id) = existing_id {
                    diesel::update(people::table.find(id))
                        .set(&PersonChangeset {
                            full_name,
                            biography: payload.biography.clone(),
                            image_url: payload.image.clone(),
                            last_synced_at: Some(now),
                            extra_metadata: Some(raw),
                            updated_at: now,
                        })
                        .execute(conn)?;
                    id
                } else {
                    diesel::insert_into(people::table)
                        .values(&NewPerson {
                            tvdb_id,
                            full_name,
                            biography: payload.biography.clone(),
                            image_url: payload.image.clone(),
                            last_synced_at: Some(now),
                            extra_metadata: Some(raw),
                        })
                        .returning(people::id)
                        .get_result::<i32>(conn)?
                };

                Self::replace_aliases(conn, AliasEntityKind::Person, person_id, &payload.aliases)?;

                log_debug!("Merged person {} as {}", tvdb_id, person_id);
                Ok(person_id)
            })
        })
        .await?
    }

    // -------------------------------------------------------------------
    // Blocking merge steps, all running inside the entity transaction
    // -------------------------------------------------------------------

    fn upsert_content(
        conn: &mut PgConnection,
        tvdb_id: i32,
        kind: ContentKind,
        payload: &TitlePayload,
    ) -> AppResult<i32> {
        let name = payload
            .name
            .clone()
            .ok_or_else(|| AppError::ValidationError("Provider payload has no name".to_string()))?;
        let now = Utc::now();
        let raw = payload.to_raw();

        let existing_id: Option<i32> = content::table
            .filter(content::tvdb_id.eq(tvdb_id))
            .filter(content::content_type.eq(kind))
            .select(content::id)
            .first::<i32>(conn)
            .optional()?;

        let content_id = if let Some(id) = existing_id {
            diesel::update(content::table.find(id))
                .set(&ContentChangeset {
                    name,
                    overview: payload.overview.clone(),
                    year: payload.year,
                    status: payload.status.clone(),
                    image_url: payload.image.clone(),
                    last_synced_at: Some(now),
                    extra_metadata: Some(raw),
                    updated_at: now,
                })
                .execute(conn)?;
            id
        } else {
            diesel::insert_into(content::table)
                .values(&NewContent {
                    tvdb_id,
                    content_type: kind,
                    name,
                    overview: payload.overview.clone(),
                    year: payload.year,
                    status: payload.status.clone(),
                    image_url: payload.image.clone(),
                    original_language: payload.original_language.clone(),
                    original_country: payload.original_country.clone(),
                    last_synced_at: Some(now),
                    extra_metadata: Some(raw),
                })
                .returning(content::id)
                .get_result::<i32>(conn)?
        };

        Ok(content_id)
    }

    fn upsert_series_detail(
        conn: &mut PgConnection,
        content_id: i32,
        payload: &TitlePayload,
        episode_payloads: &[EpisodePayload],
    ) -> AppResult<()> {
        // Counts fall back to what the payloads actually enumerate.
        let season_count = payload.number_of_seasons.or_else(|| {
            let distinct: HashSet<i32> = payload.seasons.iter().filter_map(|s| s.number).collect();
            (!distinct.is_empty()).then_some(distinct.len() as i32)
        });
        let episode_count = payload
            .number_of_episodes
            .or_else(|| (!episode_payloads.is_empty()).then_some(episode_payloads.len() as i32));

        let detail = NewSeriesDetail {
            content_id,
            number_of_seasons: season_count,
            number_of_episodes: episode_count,
            average_runtime: payload.average_runtime,
            first_air_date: parse_date(payload.first_aired.as_deref()),
            last_air_date: parse_date(payload.last_aired.as_deref()),
            network: payload.original_network.clone(),
        };

        diesel::insert_into(series_details::table)
            .values(&detail)
            .on_conflict(series_details::content_id)
            .do_update()
            .set(&detail)
            .execute(conn)?;

        Ok(())
    }

    fn upsert_movie_detail(
        conn: &mut PgConnection,
        content_id: i32,
        payload: &TitlePayload,
    ) -> AppResult<()> {
        let detail = NewMovieDetail {
            content_id,
            runtime: payload.runtime,
            release_date: parse_date(payload.release_date.as_deref()),
            budget: payload.budget,
            revenue: payload.box_office,
        };

        diesel::insert_into(movie_details::table)
            .values(&detail)
            .on_conflict(movie_details::content_id)
            .do_update()
            .set(&detail)
            .execute(conn)?;

        Ok(())
    }

    /// Full replace: genre lists are tiny, so diffing is not worth the
    /// bookkeeping of tracking removals.
    fn replace_genres(
        conn: &mut PgConnection,
        content_id: i32,
        genre_payloads: &[GenrePayload],
    ) -> AppResult<()> {
        diesel::delete(content_genres::table.filter(content_genres::content_id.eq(content_id)))
            .execute(conn)?;

        for genre in genre_payloads {
            let Some(name) = genre.name.clone().filter(|n| !n.is_empty()) else {
                continue;
            };
            let slug = name.to_lowercase().replace(' ', "-");

            let genre_id: i32 = diesel::insert_into(genres::table)
                .values(&NewGenre {
                    tvdb_id: genre.id,
                    name: name.clone(),
                    slug: Some(slug),
                })
                .on_conflict(genres::name)
                .do_nothing()
                .returning(genres::id)
                .get_result::<i32>(conn)
                .optional()?
                .map(Ok)
                .unwrap_or_else(|| {
                    genres::table
                        .filter(genres::name.eq(&name))
                        .select(genres::id)
                        .first::<i32>(conn)
                })?;

            diesel::insert_into(content_genres::table)
                .values(&NewContentGenre {
                    content_id,
                    genre_id,
                })
                .on_conflict_do_nothing()
                .execute(conn)?;
        }

        Ok(())
    }

    /// Deletes run before inserts so the (content, person, role, character)
    /// uniqueness constraint never trips mid-transition.
    fn replace_credits(
        conn: &mut PgConnection,
        content_id: i32,
        characters: &[CharacterPayload],
    ) -> AppResult<()> {
        diesel::delete(credits::table.filter(credits::content_id.eq(content_id)))
            .execute(conn)?;

        let mut seen: HashSet<(i32, RoleType, Option<String>)> = HashSet::new();

        for character in characters {
            let Some(people_tvdb_id) = character.people_id else {
                continue;
            };

            let person_id = Self::get_or_create_person_stub(conn, people_tvdb_id, character)?;
            let role = RoleType::from_people_type(character.people_type.as_deref());
            // Character names only mean something for actors
            let character_name = if role == RoleType::Actor {
                character.name.clone()
            } else {
                None
            };

            // The unique constraint can't catch NULL-character duplicates,
            // so duplicates are filtered here as well.
            if !seen.insert((person_id, role, character_name.clone())) {
                continue;
            }

            diesel::insert_into(credits::table)
                .values(&NewCredit {
                    content_id,
                    person_id,
                    role,
                    character_name,
                    sort_order: character.sort.unwrap_or(999),
                })
                .on_conflict_do_nothing()
                .execute(conn)?;
        }

        Ok(())
    }

    /// A stub is only created when the person is unknown; an existing row's
    /// richer data is never overwritten from a cast listing.
    fn get_or_create_person_stub(
        conn: &mut PgConnection,
        tvdb_id: i32,
        character: &CharacterPayload,
    ) -> AppResult<i32> {
        let existing: Option<i32> = people::table
            .filter(people::tvdb_id.eq(tvdb_id))
            .select(people::id)
            .first::<i32>(conn)
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let full_name = character
            .person_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());

        // last_synced_at stays NULL: the stale sweep will schedule the
        // person's own full sync.
        diesel::insert_into(people::table)
            .values(&NewPerson {
                tvdb_id,
                full_name,
                biography: None,
                image_url: character.image.clone(),
                last_synced_at: None,
                extra_metadata: None,
            })
            .on_conflict(people::tvdb_id)
            .do_nothing()
            .returning(people::id)
            .get_result::<i32>(conn)
            .optional()?
            .map(Ok)
            .unwrap_or_else(|| {
                people::table
                    .filter(people::tvdb_id.eq(tvdb_id))
                    .select(people::id)
                    .first::<i32>(conn)
            })
            .map_err(AppError::from)
    }

    fn replace_seasons_and_episodes(
        conn: &mut PgConnection,
        content_id: i32,
        season_payloads: &[SeasonPayload],
        episode_payloads: &[EpisodePayload],
    ) -> AppResult<()> {
        let now = Utc::now();

        // Episodes first: they hold the foreign key into seasons.
        diesel::delete(episodes::table.filter(episodes::content_id.eq(content_id)))
            .execute(conn)?;
        diesel::delete(seasons::table.filter(seasons::content_id.eq(content_id)))
            .execute(conn)?;

        // season_number -> season id, preferring the aired-order variant
        // when the provider emits several variants of the same number.
        let mut season_by_number: HashMap<i32, (i32, Option<i32>)> = HashMap::new();

        for season in season_payloads {
            let Some(season_tvdb_id) = season.id else {
                continue;
            };
            let season_number = season.number.unwrap_or(0);
            let type_id = season.season_type.as_ref().and_then(|t| t.id);

            let season_id: i32 = diesel::insert_into(seasons::table)
                .values(&NewSeason {
                    tvdb_id: season_tvdb_id,
                    content_id,
                    season_number,
                    name: season.name.clone(),
                    overview: season.overview.clone(),
                    image_url: season.image.clone(),
                    season_type: season.season_type.as_ref().and_then(|t| t.name.clone()),
                    season_type_id: type_id,
                    year: season.year.clone(),
                    last_synced_at: Some(now),
                })
                .returning(seasons::id)
                .get_result::<i32>(conn)?;

            match season_by_number.get(&season_number) {
                Some((_, existing_type)) if *existing_type == Some(AIRED_ORDER_SEASON_TYPE_ID) => {}
                _ => {
                    season_by_number.insert(season_number, (season_id, type_id));
                }
            }
        }

        let new_episodes: Vec<NewEpisode> = episode_payloads
            .iter()
            .filter_map(|episode| {
                let episode_tvdb_id = episode.id?;
                let season_number = episode.season_number.unwrap_or(0);

                Some(NewEpisode {
                    tvdb_id: episode_tvdb_id,
                    content_id,
                    // No matching season is fine; the link stays NULL
                    season_id: season_by_number.get(&season_number).map(|(id, _)| *id),
                    season_number,
                    episode_number: episode.episode_number.unwrap_or(0),
                    absolute_number: episode.absolute_number,
                    name: episode.name.clone(),
                    overview: episode.overview.clone(),
                    image_url: episode.image.clone(),
                    aired: parse_date(episode.aired.as_deref()),
                    runtime: episode.runtime,
                    year: episode.year.clone(),
                    finale_type: episode.finale_type.clone(),
                    last_synced_at: Some(now),
                })
            })
            .collect();

        for chunk in new_episodes.chunks(500) {
            diesel::insert_into(episodes::table)
                .values(chunk)
                .execute(conn)?;
        }

        Ok(())
    }

    fn replace_aliases(
        conn: &mut PgConnection,
        entity_type: AliasEntityKind,
        entity_id: i32,
        alias_payloads: &[AliasPayload],
    ) -> AppResult<()> {
        diesel::delete(
            aliases::table
                .filter(aliases::entity_type.eq(entity_type))
                .filter(aliases::entity_id.eq(entity_id)),
        )
        .execute(conn)?;

        let new_aliases: Vec<NewAlias> = alias_payloads
            .iter()
            .filter_map(|alias| {
                let name = alias.name.clone().filter(|n| !n.is_empty())?;
                Some(NewAlias {
                    entity_type,
                    entity_id,
                    name,
                    language: alias.language.clone().unwrap_or_else(|| "eng".to_string()),
                })
            })
            .collect();

        if !new_aliases.is_empty() {
            diesel::insert_into(aliases::table)
                .values(&new_aliases)
                .execute(conn)?;
        }

        Ok(())
    }
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2019-04-14")),
            NaiveDate::from_ymd_opt(2019, 4, 14)
        );
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(None), None);
    }
}
