//! Path and query extractors shared by the resource routers.

use anyhow::anyhow;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use uuid::Uuid;

use devcamper_core::{AppError, ListingQuery, ResourceSchema};

/// Single UUID path parameter.
///
/// A value that is not a UUID can never match a row, so it is reported as
/// 404 `Resource not found with id of <value>` rather than a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub Uuid);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found(anyhow!("Resource not found")))?;

        parse_resource_id(&raw).map(ResourceId)
    }
}

pub fn parse_resource_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::not_found(anyhow!("Resource not found with id of {}", raw)))
}

/// Raw query pairs of a collection request, in order.
#[derive(Debug, Clone, Default)]
pub struct ListingParams(pub Vec<(String, String)>);

impl ListingParams {
    pub fn parse(&self, schema: &ResourceSchema) -> Result<ListingQuery, AppError> {
        Ok(ListingQuery::parse(schema, &self.0)?)
    }
}

impl<S> FromRequestParts<S> for ListingParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(anyhow!("Invalid query string: {}", e)))?;
        Ok(ListingParams(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use devcamper_core::ErrorKind;
    use devcamper_models::BOOTCAMP_LISTING;

    #[test]
    fn test_malformed_id_is_not_found() {
        let err = parse_resource_id("5d725a1b7b292f5f8ceff78").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(
            err.public_message(),
            "Resource not found with id of 5d725a1b7b292f5f8ceff78"
        );
    }

    #[tokio::test]
    async fn test_listing_params_decode_bracket_operators() {
        let req = Request::builder()
            .uri("/api/v1/bootcamps?average_cost%5Blte%5D=10000&careers%5Bin%5D=Business,UI%2FUX&page=2")
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();

        let params = ListingParams::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(
            params.0,
            vec![
                ("average_cost[lte]".to_string(), "10000".to_string()),
                ("careers[in]".to_string(), "Business,UI/UX".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );

        let query = params.parse(&BOOTCAMP_LISTING).unwrap();
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.page, 2);
    }

    #[test]
    fn test_unknown_filter_is_bad_request() {
        let params = ListingParams(vec![("password".to_string(), "x".to_string())]);
        let err = params.parse(&BOOTCAMP_LISTING).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
