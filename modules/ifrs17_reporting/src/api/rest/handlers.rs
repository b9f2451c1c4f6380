//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, ParseFailure, Problem},
    mapper,
};
use crate::contract::{IntakeOutcome, ReportingError, UploadForm, UploadedFile};
use crate::domain::Service;
use axum::{
    extract::{rejection::PathRejection, Multipart, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use std::sync::Arc;

// ===== Dashboard =====

pub async fn dashboard(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<DashboardDto>, Problem> {
    let summary = service.dashboard().await.map_err(map_domain_error)?;
    Ok(Json(summary.into()))
}

// ===== Institution Handlers =====

/// List institutions with optional status and type filters
pub async fn list_institutions(
    Extension(service): Extension<Arc<Service>>,
    Query(query): Query<InstitutionListQuery>,
) -> Result<Json<InstitutionListResponse>, Problem> {
    let filter = mapper::institution_filter(query).map_err(map_domain_error)?;
    let institutions = service
        .list_institutions(&filter)
        .await
        .map_err(map_domain_error)?;

    let items: Vec<InstitutionDto> = institutions.into_iter().map(Into::into).collect();
    let total = items.len();
    Ok(Json(InstitutionListResponse { items, total }))
}

pub async fn create_institution(
    Extension(service): Extension<Arc<Service>>,
    Form(form): Form<InstitutionFormDto>,
) -> Result<Redirect, Problem> {
    let institution = service
        .create_institution(&form.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Redirect::to(&format!("/institutions/{}", institution.id)))
}

pub async fn get_institution(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Json<InstitutionDetailDto>, Problem> {
    let detail = service.institution_detail(id).await.map_err(map_domain_error)?;
    Ok(Json(detail.into()))
}

pub async fn update_institution(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Form(form): Form<InstitutionFormDto>,
) -> Result<Redirect, Problem> {
    service
        .update_institution(id, &form.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Redirect::to(&format!("/institutions/{}", id)))
}

/// Delete an institution with everything recorded for it
pub async fn delete_institution(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Redirect, Problem> {
    service.delete_institution(id).await.map_err(map_domain_error)?;
    Ok(Redirect::to("/institutions"))
}

pub async fn institution_data(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Json<InstitutionDataDto>, Problem> {
    let data = service.institution_data(id).await.map_err(map_domain_error)?;
    Ok(Json(data.into()))
}

/// Recompute quality checks for the institution, then show its data page
pub async fn validate_institution_data(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Redirect, Problem> {
    service
        .validate_institution_data(id)
        .await
        .map_err(map_domain_error)?;
    Ok(Redirect::to(&format!("/institutions/{}/data", id)))
}

pub async fn upsert_metric(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Json(req): Json<MetricRequest>,
) -> Result<Json<MetricRecordDto>, Problem> {
    let input = mapper::metric_input(id, req).map_err(map_domain_error)?;
    let record = service.upsert_metric(&input).await.map_err(map_domain_error)?;
    Ok(Json(record.into()))
}

// ===== Compliance Alert Handlers =====

pub async fn list_alerts(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<AlertListResponse>, Problem> {
    let alerts = service
        .list_alerts(id, query.unresolved)
        .await
        .map_err(map_domain_error)?;

    let items: Vec<AlertDto> = alerts.into_iter().map(Into::into).collect();
    let total = items.len();
    Ok(Json(AlertListResponse { items, total }))
}

pub async fn raise_alert(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Form(form): Form<AlertFormDto>,
) -> Result<(StatusCode, Json<AlertDto>), Problem> {
    let alert = service
        .raise_alert(id, &form.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(alert.into())))
}

pub async fn resolve_alert(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Json<AlertDto>, Problem> {
    let alert = service.resolve_alert(id).await.map_err(map_domain_error)?;
    Ok(Json(alert.into()))
}

// ===== Submission Handlers =====

pub async fn list_submissions(
    Extension(service): Extension<Arc<Service>>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, Problem> {
    let filter = mapper::submission_filter(query).map_err(map_domain_error)?;
    let submissions = service
        .list_submissions(&filter)
        .await
        .map_err(map_domain_error)?;

    let items: Vec<SubmissionDto> = submissions.into_iter().map(Into::into).collect();
    let total = items.len();
    Ok(Json(SubmissionListResponse { items, total }))
}

/// Create a draft submission from the metrics form
pub async fn create_submission(
    Extension(service): Extension<Arc<Service>>,
    Form(form): Form<SubmissionFormDto>,
) -> Result<Redirect, Problem> {
    let submission = service
        .create_submission(&form.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Redirect::to(&format!("/ifrs17-submissions/{}", submission.id)))
}

pub async fn get_submission(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionDto>, Problem> {
    let submission = service.get_submission(id).await.map_err(map_domain_error)?;
    Ok(Json(submission.into()))
}

pub async fn update_submission(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Form(form): Form<SubmissionFormDto>,
) -> Result<Redirect, Problem> {
    service
        .update_submission(id, &form.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Redirect::to(&format!("/ifrs17-submissions/{}", id)))
}

/// Multipart file intake
///
/// Redirects to the new submission, or answers 409 with the submission the
/// file would duplicate when override was not confirmed.
pub async fn upload_submission(
    Extension(service): Extension<Arc<Service>>,
    multipart: Multipart,
) -> Result<Response, Problem> {
    let form = read_upload_form(multipart).await?;

    match service.upload_submission(&form).await.map_err(map_domain_error)? {
        IntakeOutcome::Accepted { submission, .. } => {
            Ok(Redirect::to(&format!("/ifrs17-submissions/{}", submission.id)).into_response())
        }
        IntakeOutcome::Duplicate(conflict) => Ok((
            StatusCode::CONFLICT,
            Json(DuplicateConflictResponse::from(conflict)),
        )
            .into_response()),
    }
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, Problem> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "uploaded_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(bad_multipart)?;
                if !filename.is_empty() {
                    form.file = Some(UploadedFile { filename, content });
                }
            }
            "institution" | "reporting_period" | "file_type" | "notes" | "confirm_override" => {
                let value = field.text().await.map_err(bad_multipart)?;
                match name.as_str() {
                    "institution" => form.institution = Some(value),
                    "reporting_period" => form.reporting_period = Some(value),
                    "file_type" => form.file_type = Some(value),
                    "notes" => form.notes = Some(value),
                    _ => form.confirm_override = is_checked(&value),
                }
            }
            other => tracing::debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    Ok(form)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> Problem {
    Problem::new(e.status(), "Invalid Multipart Body").with_detail(e.body_text())
}

/// Checkbox semantics of the override flag
fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// Parse the submission's file for display, in the parse envelope
pub async fn parse_file_data(
    Extension(service): Extension<Arc<Service>>,
    submission_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ParseResponse>, ParseFailure> {
    let Path(submission_id) = submission_id.map_err(|rejection| {
        ParseFailure(ReportingError::invalid(
            "submission_id",
            format!("Invalid submission id: {}", rejection.body_text()),
        ))
    })?;
    let table = service
        .parse_submission_file(submission_id)
        .await
        .map_err(ParseFailure)?;
    Ok(Json(table.into()))
}

// ===== Data Quality Handlers =====

pub async fn data_quality_review(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<QualityReviewDto>, Problem> {
    let review = service.data_quality_review().await.map_err(map_domain_error)?;
    Ok(Json(review.into()))
}

pub async fn reporting_period(
    Extension(service): Extension<Arc<Service>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<PeriodOverviewDto>, Problem> {
    let overview = service
        .reporting_period_overview(year, month)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(overview.into()))
}

pub async fn run_data_quality_checks(
    Extension(service): Extension<Arc<Service>>,
) -> Json<QualityRunSummaryDto> {
    Json(service.run_data_quality_checks().into())
}
