//! Converts cached rows back into provider-shaped payloads.
//!
//! The resolver hands out one format whether data came from the catalog or
//! from a live provider call, so callers never branch on the source. The
//! stored raw blob seeds the payload; normalized columns then overwrite the
//! fields this schema owns.

use crate::modules::catalog::domain::entities::{PersonDetails, TitleDetails};
use crate::modules::provider::domain::payload::{
    AliasPayload, CharacterPayload, GenrePayload, PersonPayload, TitlePayload,
};
use serde_json::json;

pub fn title_details_to_payload(details: TitleDetails) -> TitlePayload {
    let TitleDetails {
        title,
        series_detail,
        movie_detail,
        genres,
        credits,
        aliases,
    } = details;

    let mut payload = title
        .extra_metadata
        .and_then(|raw| TitlePayload::from_value(raw).ok())
        .unwrap_or_default();

    payload.id = Some(title.tvdb_id);
    payload.name = Some(title.name);
    payload.overview = title.overview;
    payload.year = title.year;
    payload.status = title.status;
    payload.image = title.image_url;
    payload.original_language = title.original_language;
    payload.original_country = title.original_country;

    payload.genres = genres
        .into_iter()
        .map(|g| GenrePayload {
            id: g.tvdb_id,
            name: Some(g.name),
            slug: g.slug,
        })
        .collect();

    payload.characters = credits
        .into_iter()
        .map(|cp| CharacterPayload {
            people_id: Some(cp.person.tvdb_id),
            person_name: Some(cp.person.full_name),
            people_type: Some(cp.credit.role.to_people_type().to_string()),
            name: cp.credit.character_name,
            sort: Some(cp.credit.sort_order),
            image: cp.person.image_url,
        })
        .collect();

    payload.aliases = aliases
        .into_iter()
        .map(|a| AliasPayload {
            name: Some(a.name),
            language: Some(a.language),
        })
        .collect();

    if let Some(detail) = series_detail {
        payload.number_of_seasons = detail.number_of_seasons;
        payload.number_of_episodes = detail.number_of_episodes;
        payload.average_runtime = detail.average_runtime;
        payload.first_aired = detail.first_air_date.map(|d| d.to_string());
        payload.last_aired = detail.last_air_date.map(|d| d.to_string());
        payload.original_network = detail.network;
    }

    if let Some(detail) = movie_detail {
        payload.runtime = detail.runtime;
        payload.release_date = detail.release_date.map(|d| d.to_string());
        payload.budget = detail.budget;
        payload.box_office = detail.revenue;
    }

    payload
}

pub fn person_details_to_payload(details: PersonDetails) -> PersonPayload {
    let PersonDetails {
        person,
        aliases,
        credits,
    } = details;

    let mut payload = person
        .extra_metadata
        .and_then(|raw| PersonPayload::from_value(raw).ok())
        .unwrap_or_default();

    payload.id = Some(person.tvdb_id);
    payload.name = Some(person.full_name);
    payload.biography = person.biography;
    payload.image = person.image_url;

    payload.aliases = aliases
        .into_iter()
        .map(|a| AliasPayload {
            name: Some(a.name),
            language: Some(a.language),
        })
        .collect();

    let characters: Vec<serde_json::Value> = credits
        .into_iter()
        .map(|ct| {
            json!({
                "seriesId": matches!(ct.title.kind, crate::shared::domain::ContentKind::Series)
                    .then_some(ct.title.tvdb_id),
                "movieId": matches!(ct.title.kind, crate::shared::domain::ContentKind::Movie)
                    .then_some(ct.title.tvdb_id),
                "name": ct.credit.character_name,
                "peopleType": ct.credit.role.to_people_type(),
                "title": {
                    "name": ct.title.name,
                    "image": ct.title.image_url,
                    "year": ct.title.year,
                },
            })
        })
        .collect();
    payload
        .extra
        .insert("characters".to_string(), json!(characters));

    payload
}
