//! OpenAPI document for the REST DTOs

use super::dto::*;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "IFRS 17 Reporting API"),
    components(schemas(
        InstitutionDto,
        InstitutionFormDto,
        InstitutionListResponse,
        InstitutionDetailDto,
        InstitutionDataDto,
        SubmissionDto,
        SubmissionFormDto,
        SubmissionListResponse,
        DuplicateConflictResponse,
        ParseResponse,
        ParseErrorResponse,
        MetricValuesDto,
        MetricRequest,
        MetricRecordDto,
        QualityCheckDto,
        CurrencyAverageDto,
        QualityReviewDto,
        QualityRunSummaryDto,
        PeriodOverviewDto,
        DashboardDto,
        AlertDto,
        AlertFormDto,
        AlertListResponse,
        LoginForm,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_dto_schemas() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.schemas.contains_key("InstitutionDto"));
        assert!(components.schemas.contains_key("MetricValuesDto"));
        assert!(components.schemas.contains_key("DuplicateConflictResponse"));
    }
}
