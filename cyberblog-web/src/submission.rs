//! Submitted form bodies
//!
//! The profile page accepts both plain and multipart posts: the picture
//! form uploads a file, the thought form does not. `FormData` reads either
//! into the same shape.

use std::collections::HashMap;

use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use cyberblog_core::domain::forms::UploadedFile;

/// Text fields and uploaded files of one submission
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.files.contains_key(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self {
                fields,
                files: HashMap::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let mut data = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;

            // A part with a filename is a file input, even when nothing was picked
            if file_name.is_some() {
                data.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            } else {
                data.fields
                    .insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }

        Ok(data)
    }
}
