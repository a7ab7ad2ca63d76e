use crate::compose::ComposeError;
use crate::web::pages::ErrorTemplate;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Compose(ComposeError),
    Template(askama::Error),
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Compose(e) => write!(f, "Build error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::BadRequest(msg) => write!(f, "{msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) => error_page(msg),
            AppError::Compose(ComposeError::MissingNameColumn) => {
                error_page("The uploaded workbook must have a 'Name' column.")
            },
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            },
        }
    }
}

/// Render the inline error page with a 400 status.
fn error_page(message: &str) -> HttpResponse {
    let body = ErrorTemplate { message }
        .render()
        .unwrap_or_else(|_| message.to_string());
    HttpResponse::BadRequest()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

impl From<ComposeError> for AppError {
    fn from(e: ComposeError) -> Self {
        AppError::Compose(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Compose(ComposeError::Io(e))
    }
}
