//! Request handlers for the two form operations.

use crate::compose::assembly::{Assembler, FINAL_OUTPUT};
use crate::compose::builder::{SlideBuilder, SlideRequest};
use crate::compose::ledger::Ledger;
use crate::compose::roster;
use crate::config::Config;
use crate::web::error::AppError;
use crate::web::pages::IndexTemplate;
use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::text::Text;
use actix_web::http::header;
use actix_web::{HttpResponse, web};
use askama::Template;
use parking_lot::Mutex;

const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Shared application state.
///
/// The mutex serializes ledger access so two simultaneous submissions
/// cannot interleave the load/append/persist cycle.
pub struct AppState {
    pub config: Config,
    pub ledger: Mutex<Ledger>,
}

/// GET / — the form page.
pub async fn index() -> Result<HttpResponse, AppError> {
    render(IndexTemplate)
}

#[derive(MultipartForm)]
pub struct PresentationForm {
    pub theme: Option<Text<String>>,
    pub roster: Option<Bytes>,
}

/// POST /presentation — assemble the weekly deck from a roster upload.
pub async fn create_presentation(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<PresentationForm>,
) -> Result<HttpResponse, AppError> {
    let Some(upload) = form.roster.filter(|f| !f.data.is_empty()) else {
        return Err(AppError::BadRequest(
            "A roster workbook (.xlsx) is required.".to_string(),
        ));
    };

    // Column check happens before any file output exists.
    let names = roster::names_from_xlsx(&upload.data)?;
    let theme = form.theme.map(|t| t.0).unwrap_or_default();

    let assembler = Assembler::new(&state.config.slides_dir, &state.config.output_dir);
    let out_path = {
        let mut ledger = state.ledger.lock();
        assembler.assemble(&theme, &names, &mut ledger)?
    };

    let bytes = std::fs::read(&out_path)?;
    Ok(attachment(bytes, FINAL_OUTPUT))
}

#[derive(MultipartForm)]
pub struct SlideForm {
    pub name: Option<Text<String>>,
    pub company: Option<Text<String>>,
    pub field: Option<Text<String>>,
    pub photo: Option<Bytes>,
    pub logo: Option<Bytes>,
    pub green: Option<Text<String>>,
    pub gold: Option<Text<String>>,
}

/// POST /slide — create one individual slide.
///
/// The form disables submission client-side until the required inputs are
/// present; the server enforces the same rule for direct posts.
pub async fn create_slide(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<SlideForm>,
) -> Result<HttpResponse, AppError> {
    let name = required_text(form.name)?;
    let company = required_text(form.company)?;
    let field = required_text(form.field)?;
    let Some(photo) = form.photo.filter(|f| !f.data.is_empty()) else {
        return Err(missing_input());
    };
    // Browsers send an empty part for an untouched file input.
    let logo = form
        .logo
        .filter(|f| !f.data.is_empty())
        .map(|f| f.data.to_vec());

    let request = SlideRequest {
        name,
        company,
        field,
        photo: photo.data.to_vec(),
        logo,
        green_member: form.green.is_some(),
        gold_club: form.gold.is_some(),
    };

    let builder = SlideBuilder::new(&state.config.slides_dir, &state.config.assets_dir);
    let (id, path) = {
        let mut ledger = state.ledger.lock();
        builder.build(&mut ledger, &request)?
    };

    // Download copy under the output directory, as well as the library copy
    // the assembler reads.
    let download_name = format!("{}.pptx", id);
    let bytes = std::fs::read(&path)?;
    std::fs::write(state.config.output_dir.join(&download_name), &bytes)?;

    Ok(attachment(bytes, &download_name))
}

/// Extract a required trimmed text field.
fn required_text(field: Option<Text<String>>) -> Result<String, AppError> {
    match field {
        Some(text) if !text.0.trim().is_empty() => Ok(text.0),
        _ => Err(missing_input()),
    }
}

fn missing_input() -> AppError {
    AppError::BadRequest(
        "Name, company, field of work and a photo are all required.".to_string(),
    )
}

/// Respond with .pptx bytes as a file download.
fn attachment(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(PPTX_MIME)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes)
}

/// Render an askama template into an HTML response.
fn render<T: Template>(template: T) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(template.render()?))
}
