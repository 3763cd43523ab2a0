use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UserPage;
use crate::inbound::http::router::AppState;

/// Raw paging parameters; unparseable values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    page: Option<String>,
    size: Option<String>,
}

impl ListUsersQuery {
    fn to_page_request(&self) -> PageRequest {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.parse::<i64>().ok());
        PageRequest::new(parse(&self.page), parse(&self.size))
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiSuccess<UserPage>, ApiError> {
    state
        .user_service
        .list_users(query.to_page_request())
        .await
        .map_err(ApiError::from)
        .map(|page| ApiSuccess::new(StatusCode::OK, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = ListUsersQuery {
            page: Some("abc".to_string()),
            size: Some("500".to_string()),
        };
        assert_eq!(query.to_page_request(), PageRequest { page: 1, size: 10 });

        let query = ListUsersQuery {
            page: Some("2".to_string()),
            size: Some("20".to_string()),
        };
        assert_eq!(query.to_page_request(), PageRequest { page: 2, size: 20 });

        assert_eq!(
            ListUsersQuery::default().to_page_request(),
            PageRequest { page: 1, size: 10 }
        );
    }
}
