use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Candidate, Catalog, Employer, Investor, RecordStore};
use crate::error::AppError;
use crate::filter::{self, PredicateSet, Searchable};
use crate::preview::Preview;
use crate::scoring::{self, CandidateMatch, Partner};

pub const STUDENTS_PATH: &str = "/api/v1/students";
pub const EMPLOYERS_PATH: &str = "/api/v1/employers";
pub const INVESTORS_PATH: &str = "/api/v1/investors";

/// Router builder exposing the filtered listings and partner matches.
pub fn catalog_router(catalog: Arc<Catalog>) -> Router {
    Router::new()
        .route(STUDENTS_PATH, get(students_handler))
        .route(EMPLOYERS_PATH, get(employers_handler))
        .route(INVESTORS_PATH, get(investors_handler))
        .route(
            "/api/v1/employers/:employer_id/matches",
            get(employer_matches_handler),
        )
        .route(
            "/api/v1/investors/:investor_id/matches",
            get(investor_matches_handler),
        )
        .with_state(catalog)
}

/// Query string accepted by every listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingQuery {
    #[serde(default)]
    pub(crate) q: Option<String>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) min_score: Option<u16>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    #[serde(default)]
    pub(crate) sort_by_skill: Option<String>,
}

impl ListingQuery {
    pub(crate) fn predicates(&self) -> PredicateSet {
        PredicateSet {
            text: self.q.clone().unwrap_or_default(),
            category: self.category.clone(),
            min_score: self.min_score.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListingResponse<T> {
    pub(crate) filters: PredicateSet,
    #[serde(flatten)]
    pub(crate) preview: Preview<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchesQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MatchesResponse {
    pub(crate) partner_id: String,
    pub(crate) partner_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) minimum_credit_score: Option<u16>,
    pub(crate) total: usize,
    pub(crate) matches: Vec<CandidateMatch>,
}

/// Surfaces malformed query strings as JSON errors like every other failure.
fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn listing<T>(
    store: &RecordStore<T>,
    query: &ListingQuery,
    default_limit: usize,
    base_path: &str,
) -> (PredicateSet, Vec<T>, usize)
where
    T: Searchable + Clone,
{
    let predicates = query.predicates();
    let filtered = filter::apply(store, &predicates);
    debug!(
        path = base_path,
        active = predicates.active_count(),
        matched = filtered.len(),
        total = store.len(),
        "listing filtered"
    );
    (predicates, filtered, query.limit.unwrap_or(default_limit))
}

pub(crate) async fn students_handler(
    State(catalog): State<Arc<Catalog>>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ListingResponse<Candidate>>, AppError> {
    let query = parse_query(query)?;
    let (filters, mut filtered, limit) =
        listing(&catalog.students, &query, catalog.preview_limit, STUDENTS_PATH);

    if let Some(skill) = query.sort_by_skill.as_deref().map(str::trim) {
        if !skill.is_empty() {
            filter::sort_by_skill_level(&mut filtered, skill);
        }
    }

    Ok(Json(ListingResponse {
        filters,
        preview: Preview::build(&filtered, limit).with_clear_href(STUDENTS_PATH),
    }))
}

pub(crate) async fn employers_handler(
    State(catalog): State<Arc<Catalog>>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ListingResponse<Employer>>, AppError> {
    let query = parse_query(query)?;
    let (filters, filtered, limit) =
        listing(&catalog.employers, &query, catalog.preview_limit, EMPLOYERS_PATH);

    Ok(Json(ListingResponse {
        filters,
        preview: Preview::build(&filtered, limit).with_clear_href(EMPLOYERS_PATH),
    }))
}

pub(crate) async fn investors_handler(
    State(catalog): State<Arc<Catalog>>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ListingResponse<Investor>>, AppError> {
    let query = parse_query(query)?;
    let (filters, filtered, limit) =
        listing(&catalog.investors, &query, catalog.preview_limit, INVESTORS_PATH);

    Ok(Json(ListingResponse {
        filters,
        preview: Preview::build(&filtered, limit).with_clear_href(INVESTORS_PATH),
    }))
}

fn partner_matches<P: Partner>(
    catalog: &Catalog,
    partner_id: &str,
    partner_name: &str,
    partner: &P,
    limit: Option<usize>,
) -> MatchesResponse {
    let ranked = scoring::rank_candidates(&catalog.students, partner);
    let total = ranked.len();
    let limit = limit.unwrap_or(catalog.preview_limit).max(1);

    MatchesResponse {
        partner_id: partner_id.to_string(),
        partner_name: partner_name.to_string(),
        minimum_credit_score: partner.minimum_credit_score(),
        total,
        matches: ranked.into_iter().take(limit).collect(),
    }
}

pub(crate) async fn employer_matches_handler(
    State(catalog): State<Arc<Catalog>>,
    Path(employer_id): Path<String>,
    query: Result<Query<MatchesQuery>, QueryRejection>,
) -> Result<Json<MatchesResponse>, AppError> {
    let query = parse_query(query)?;
    let employer = catalog
        .employers
        .find(&employer_id)
        .ok_or_else(|| AppError::NotFound {
            kind: "employer",
            id: employer_id.clone(),
        })?;

    Ok(Json(partner_matches(
        &catalog,
        &employer.id,
        &employer.name,
        employer,
        query.limit,
    )))
}

pub(crate) async fn investor_matches_handler(
    State(catalog): State<Arc<Catalog>>,
    Path(investor_id): Path<String>,
    query: Result<Query<MatchesQuery>, QueryRejection>,
) -> Result<Json<MatchesResponse>, AppError> {
    let query = parse_query(query)?;
    let investor = catalog
        .investors
        .find(&investor_id)
        .ok_or_else(|| AppError::NotFound {
            kind: "investor",
            id: investor_id.clone(),
        })?;

    Ok(Json(partner_matches(
        &catalog,
        &investor.id,
        &investor.name,
        investor,
        query.limit,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Skill;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn catalog() -> Arc<Catalog> {
        let students = (1..=8)
            .map(|index| Candidate {
                id: format!("s{index}"),
                name: format!("Student {index}"),
                location: None,
                bio: None,
                field_of_study: None,
                skills: vec![Skill {
                    name: (if index % 2 == 0 { "Rust" } else { "Python" }).to_string(),
                    level: 10 * index as u8,
                    verified_at: None,
                }],
                credit_score: Some(600 + 30 * index as u16),
            })
            .collect();
        let employers = vec![Employer {
            id: "e1".to_string(),
            name: "Northwind".to_string(),
            industry: Some("Logistics".to_string()),
            location: None,
            description: None,
            required_skills: vec!["Rust".to_string()],
            minimum_credit_score: Some(700),
            open_roles: 3,
        }];

        Arc::new(Catalog {
            students: RecordStore::new(students),
            employers: RecordStore::new(employers),
            investors: RecordStore::empty(),
            preview_limit: 6,
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = catalog_router(catalog())
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json payload"))
    }

    #[tokio::test]
    async fn unfiltered_students_preview_overflows() {
        let (status, body) = get_json(STUDENTS_PATH).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 8);
        assert_eq!(body["items"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["view_all"]["total"], 8);
        assert!(body.get("empty_state").is_none());
    }

    #[tokio::test]
    async fn students_filter_by_category_and_score() {
        let (_, body) = get_json("/api/v1/students?category=rust&min_score=750").await;

        let ids: Vec<_> = body["items"]
            .as_array()
            .expect("items")
            .iter()
            .map(|item| item["id"].as_str().expect("id").to_string())
            .collect();
        assert_eq!(ids, vec!["s6", "s8"]);
        assert_eq!(body["filters"]["min_score"], 750);
    }

    #[tokio::test]
    async fn students_can_sort_by_skill_level() {
        let (_, body) = get_json("/api/v1/students?category=Rust&sort_by_skill=rust").await;

        let first = body["items"][0]["id"].as_str().expect("id");
        assert_eq!(first, "s8");
    }

    #[tokio::test]
    async fn no_match_renders_empty_state_with_clear_link() {
        let (_, body) = get_json("/api/v1/employers?q=nonexistent-skill-xyz").await;

        assert_eq!(body["total"], 0);
        assert_eq!(
            body["empty_state"]["clear_filters"]["href"],
            EMPLOYERS_PATH
        );
    }

    #[tokio::test]
    async fn employer_matches_rank_qualified_students() {
        let (status, body) = get_json("/api/v1/employers/e1/matches?limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 5);
        assert_eq!(body["matches"][0]["candidate_id"], "s8");
        assert_eq!(body["matches"][0]["score"], 80);
        assert_eq!(body["matches"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn malformed_listing_query_is_a_json_bad_request() {
        for uri in [
            "/api/v1/students?min_score=abc",
            "/api/v1/employers?limit=-1",
            "/api/v1/investors?min_score=70000",
        ] {
            let (status, body) = get_json(uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"]
                .as_str()
                .expect("error message")
                .starts_with("invalid request"));
        }
    }

    #[tokio::test]
    async fn malformed_matches_limit_is_a_json_bad_request() {
        let (status, body) = get_json("/api/v1/employers/e1/matches?limit=many").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_partner_is_not_found() {
        let (status, body) = get_json("/api/v1/investors/i-missing/matches").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("i-missing"));
    }
}
