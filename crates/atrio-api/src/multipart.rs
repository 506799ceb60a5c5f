use std::collections::HashMap;

use tracing::warn;

use crate::error::ApiError;
use crate::extract::Multipart;

pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// A fully-read multipart form: text fields plus the file parts posted under
/// the expected field name.
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// Text field value; empty strings count as absent, so omitted fields
    /// and cleared inputs behave the same in partial updates.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.files.first()
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }
}

/// Reads the whole multipart body. File parts must arrive under
/// `file_field`; a file under any other name rejects the request. Parts with
/// an empty filename are what browsers send for an unselected file input and
/// are ignored.
pub async fn read_form(
    multipart: Multipart,
    file_field: &str,
) -> Result<MultipartForm, ApiError> {
    let Multipart(mut multipart) = multipart;
    let mut fields = HashMap::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let file_name = field.file_name().map(str::to_string).filter(|f| !f.is_empty());
        match file_name {
            Some(file_name) if name == file_field => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad_multipart)?;
                files.push(UploadedFile {
                    name: file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            Some(other) => {
                warn!("Unexpected file field '{}' ({})", name, other);
                return Err(ApiError::Validation("Error al subir archivo".to_string()));
            }
            None => {
                let value = field.text().await.map_err(bad_multipart)?;
                fields.insert(name, value);
            }
        }
    }

    Ok(MultipartForm { fields, files })
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    warn!("Malformed multipart body: {}", err);
    ApiError::Validation("Error al subir archivo".to_string())
}
