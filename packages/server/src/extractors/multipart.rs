use std::collections::HashMap;
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A file part of a multipart form, fully buffered.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: Bytes) -> Self {
        let file_name = file_name.into();
        let content_type = match content_type {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string(),
        };
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Multipart form split into text fields and file fields.
///
/// Repeated field names keep every value in order, so `images` sent three
/// times yields three files.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read file '{name}': {e}"))
                    })?;
                    if bytes.is_empty() && file_name.is_empty() {
                        continue;
                    }
                    form.files.entry(name).or_default().push(UploadedFile::new(
                        file_name,
                        content_type.as_deref(),
                        bytes,
                    ));
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read field '{name}': {e}"))
                    })?;
                    form.fields.entry(name).or_default().push(text);
                }
            }
        }
        Ok(form)
    }
}

impl FormData {
    /// First value of a text field, trimmed. Empty strings count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// PATCH semantics for a clearable field: absent is `None`, blank is
    /// `Some(None)`, anything else is `Some(Some(value))`.
    pub fn nullable_text(&self, name: &str) -> Option<Option<String>> {
        self.fields.get(name).and_then(|values| values.first()).map(|v| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        })
    }

    pub fn required(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("Field '{name}' is required")))
    }

    /// Parse an optional field with `FromStr`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| AppError::Validation(format!("Field '{name}' is invalid")))
            })
            .transpose()
    }

    /// Parse an optional field holding a JSON value, e.g. an enum or a list.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|raw| {
                // Bare enum values arrive unquoted from HTML forms.
                serde_json::from_str::<T>(&raw)
                    .or_else(|_| serde_json::from_value::<T>(serde_json::Value::String(raw)))
                    .map_err(|e| AppError::Validation(format!("Field '{name}' is invalid: {e}")))
            })
            .transpose()
    }

    /// `"true"`/`"false"` flag.
    pub fn flag(&self, name: &str) -> Result<Option<bool>, AppError> {
        match self.text(name).as_deref() {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(_) => Err(AppError::Validation(format!(
                "Field '{name}' must be 'true' or 'false'"
            ))),
        }
    }

    /// Take the first file sent under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let files = self.files.get_mut(name)?;
        if files.is_empty() {
            None
        } else {
            Some(files.remove(0))
        }
    }

    pub fn take_required_file(&mut self, name: &str) -> Result<UploadedFile, AppError> {
        self.take_file(name)
            .ok_or_else(|| AppError::Validation(format!("File '{name}' is required")))
    }

    /// Take every file sent under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }
}

#[cfg(test)]
impl FormData {
    /// Text-only form for tests.
    pub(crate) fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut form = FormData::default();
        for (name, value) in fields {
            form.fields
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }
        form
    }
}

/// Require `file` to be an image.
pub fn ensure_image(file: &UploadedFile) -> Result<(), AppError> {
    if file.is_image() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "'{}' is not an image",
            file.file_name
        )))
    }
}
