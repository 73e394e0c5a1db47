use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use tokio::task;

use crate::log_debug;
use crate::modules::catalog::domain::entities::{
    CreditWithPerson, CreditWithTitle, Episode, PersonDetails, Season, Title, TitleDetails,
};
use crate::modules::catalog::domain::repository::CatalogRepository;
use crate::modules::catalog::domain::value_objects::AliasEntityKind;
use crate::modules::catalog::infrastructure::models::*;
use crate::modules::provider::domain::payload::TitlePayload;
use crate::schema::{
    aliases, content, content_genres, credits, episodes, genres, movie_details, people, seasons,
    series_details,
};
use crate::shared::domain::ContentKind;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

pub struct CatalogRepositoryImpl {
    db: Arc<Database>,
}

impl CatalogRepositoryImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn load_content_blocking(
        conn: &mut PgConnection,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<ContentModel>> {
        let model = content::table
            .filter(content::tvdb_id.eq(tvdb_id))
            .filter(content::content_type.eq(kind))
            .first::<ContentModel>(conn)
            .optional()?;
        Ok(model)
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn find_title(&self, tvdb_id: i32, kind: ContentKind) -> AppResult<Option<Title>> {
        let db = Arc::clone(&self.db);

        let model = task::spawn_blocking(move || -> AppResult<Option<ContentModel>> {
            let mut conn = db.get_connection()?;
            Self::load_content_blocking(&mut conn, tvdb_id, kind)
        })
        .await??;

        Ok(model.map(ContentModel::to_entity))
    }

    async fn find_title_details(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<TitleDetails>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Option<TitleDetails>> {
            let mut conn = db.get_connection()?;

            let Some(model) = Self::load_content_blocking(&mut conn, tvdb_id, kind)? else {
                return Ok(None);
            };
            let content_id = model.id;

            let series_detail = match kind {
                ContentKind::Series => series_details::table
                    .filter(series_details::content_id.eq(content_id))
                    .first::<SeriesDetailModel>(&mut conn)
                    .optional()?
                    .map(SeriesDetailModel::to_entity),
                ContentKind::Movie => None,
            };

            let movie_detail = match kind {
                ContentKind::Movie => movie_details::table
                    .filter(movie_details::content_id.eq(content_id))
                    .first::<MovieDetailModel>(&mut conn)
                    .optional()?
                    .map(MovieDetailModel::to_entity),
                ContentKind::Series => None,
            };

            let genre_rows: Vec<GenreModel> = content_genres::table
                .inner_join(genres::table)
                .filter(content_genres::content_id.eq(content_id))
                .select(GenreModel::as_select())
                .order(genres::name.asc())
                .load::<GenreModel>(&mut conn)?;

            let credit_rows: Vec<(CreditModel, PersonModel)> = credits::table
                .inner_join(people::table)
                .filter(credits::content_id.eq(content_id))
                .select((CreditModel::as_select(), PersonModel::as_select()))
                .order(credits::sort_order.asc())
                .load::<(CreditModel, PersonModel)>(&mut conn)?;

            let alias_rows: Vec<AliasModel> = aliases::table
                .filter(aliases::entity_type.eq(AliasEntityKind::Content))
                .filter(aliases::entity_id.eq(content_id))
                .load::<AliasModel>(&mut conn)?;

            Ok(Some(TitleDetails {
                title: model.to_entity(),
                series_detail,
                movie_detail,
                genres: genre_rows.into_iter().map(GenreModel::to_entity).collect(),
                credits: credit_rows
                    .into_iter()
                    .map(|(c, p)| CreditWithPerson {
                        credit: c.to_entity(),
                        person: p.to_entity(),
                    })
                    .collect(),
                aliases: alias_rows.into_iter().map(AliasModel::to_entity).collect(),
            }))
        })
        .await?
    }

    async fn find_person_details(&self, tvdb_id: i32) -> AppResult<Option<PersonDetails>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Option<PersonDetails>> {
            let mut conn = db.get_connection()?;

            let Some(model) = people::table
                .filter(people::tvdb_id.eq(tvdb_id))
                .first::<PersonModel>(&mut conn)
                .optional()?
            else {
                return Ok(None);
            };
            let person_id = model.id;

            let alias_rows: Vec<AliasModel> = aliases::table
                .filter(aliases::entity_type.eq(AliasEntityKind::Person))
                .filter(aliases::entity_id.eq(person_id))
                .load::<AliasModel>(&mut conn)?;

            let credit_rows: Vec<(CreditModel, ContentModel)> = credits::table
                .inner_join(content::table)
                .filter(credits::person_id.eq(person_id))
                .select((CreditModel::as_select(), ContentModel::as_select()))
                .order(credits::sort_order.asc())
                .load::<(CreditModel, ContentModel)>(&mut conn)?;

            Ok(Some(PersonDetails {
                person: model.to_entity(),
                aliases: alias_rows.into_iter().map(AliasModel::to_entity).collect(),
                credits: credit_rows
                    .into_iter()
                    .map(|(c, t)| CreditWithTitle {
                        credit: c.to_entity(),
                        title: t.to_entity(),
                    })
                    .collect(),
            }))
        })
        .await?
    }

    async fn list_seasons(&self, tvdb_id: i32) -> AppResult<Vec<Season>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<Season>> {
            let mut conn = db.get_connection()?;

            let Some(model) = Self::load_content_blocking(&mut conn, tvdb_id, ContentKind::Series)?
            else {
                return Ok(Vec::new());
            };

            let rows = seasons::table
                .filter(seasons::content_id.eq(model.id))
                .order(seasons::season_number.asc())
                .load::<SeasonModel>(&mut conn)?;

            Ok(rows.into_iter().map(SeasonModel::to_entity).collect())
        })
        .await?
    }

    async fn list_episodes(
        &self,
        tvdb_id: i32,
        season_number: Option<i32>,
    ) -> AppResult<Vec<Episode>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<Episode>> {
            let mut conn = db.get_connection()?;

            let Some(model) = Self::load_content_blocking(&mut conn, tvdb_id, ContentKind::Series)?
            else {
                return Ok(Vec::new());
            };

            let mut query = episodes::table
                .filter(episodes::content_id.eq(model.id))
                .into_boxed();

            if let Some(number) = season_number {
                query = query.filter(episodes::season_number.eq(number));
            }

            let rows = query
                .order((episodes::season_number.asc(), episodes::episode_number.asc()))
                .load::<EpisodeModel>(&mut conn)?;

            Ok(rows.into_iter().map(EpisodeModel::to_entity).collect())
        })
        .await?
    }

    async fn insert_title_minimal(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
        payload: &TitlePayload,
    ) -> AppResult<Title> {
        let name = payload
            .name
            .clone()
            .ok_or_else(|| AppError::ValidationError("Provider payload has no name".to_string()))?;

        let db = Arc::clone(&self.db);
        let new_content = NewContent {
            tvdb_id,
            content_type: kind,
            name,
            overview: payload.overview.clone(),
            year: payload.year,
            status: payload.status.clone(),
            image_url: payload.image.clone(),
            original_language: payload.original_language.clone(),
            original_country: payload.original_country.clone(),
            // Never synced: the queued background job fills in the children.
            last_synced_at: None,
            extra_metadata: None,
        };

        let model = task::spawn_blocking(move || -> AppResult<ContentModel> {
            let mut conn = db.get_connection()?;

            if let Some(existing) = Self::load_content_blocking(&mut conn, tvdb_id, kind)? {
                return Ok(existing);
            }

            log_debug!("Minimal insert for {} {}", kind, tvdb_id);

            // A concurrent full merge may land between the check and the
            // insert; the conflict fallback re-reads whichever row won.
            diesel::insert_into(content::table)
                .values(&new_content)
                .on_conflict(content::tvdb_id)
                .do_nothing()
                .get_result::<ContentModel>(&mut conn)
                .optional()?
                .map(Ok)
                .unwrap_or_else(|| {
                    Self::load_content_blocking(&mut conn, tvdb_id, kind)?.ok_or_else(|| {
                        AppError::DatabaseError(format!(
                            "Title {} vanished during minimal insert",
                            tvdb_id
                        ))
                    })
                })
        })
        .await??;

        Ok(model.to_entity())
    }
}
