//! Wire encoding of submitted forms.
//!
//! List values are sent as one part per value under a repeated `key[]`
//! name; unset optional values are omitted entirely.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use super::ApiError;

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    Multipart,
}

/// File to upload with a form.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Multipart field name, e.g. `cover_image`.
    pub field: String,
    /// Local file to read at send time.
    pub path: PathBuf,
}

/// Ordered fields plus optional attachments, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPayload {
    encoding: Encoding,
    fields: Vec<(String, FieldValue)>,
    attachments: Vec<Attachment>,
}

impl FormPayload {
    /// Payload always sent as `multipart/form-data`.
    pub fn multipart() -> Self {
        Self::with_encoding(Encoding::Multipart)
    }

    /// Payload sent as a JSON object unless an attachment is added.
    pub fn json() -> Self {
        Self::with_encoding(Encoding::Json)
    }

    fn with_encoding(encoding: Encoding) -> Self {
        Self {
            encoding,
            fields: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Append a text field.
    pub fn text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .push((key.to_string(), FieldValue::Text(value.into())));
        self
    }

    /// Append a text field only when a value is present.
    pub fn optional<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.text(key, value.to_string()),
            None => self,
        }
    }

    /// Append a multi-valued field, encoded as repeated `key[]` entries.
    pub fn list<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values = values.into_iter().map(|value| value.to_string()).collect();
        self.fields.push((key.to_string(), FieldValue::List(values)));
        self
    }

    /// Attach a file. Blank paths are ignored.
    pub fn attach(mut self, field: &str, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() {
            self.attachments.push(Attachment {
                field: field.to_string(),
                path: path.to_path_buf(),
            });
        }
        self
    }

    /// True when the payload must be sent as multipart.
    pub fn is_multipart(&self) -> bool {
        self.encoding == Encoding::Multipart || !self.attachments.is_empty()
    }

    /// Files to upload.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Flattened `(key, value)` sequence in submission order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.fields {
            match value {
                FieldValue::Text(text) => pairs.push((key.clone(), text.clone())),
                FieldValue::List(values) => {
                    let repeated = format!("{key}[]");
                    pairs.extend(values.iter().map(|value| (repeated.clone(), value.clone())));
                }
            }
        }
        pairs
    }

    /// JSON object rendering; list fields become arrays under their bare key.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (key, value) in &self.fields {
            let value = match value {
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::List(values) => {
                    Value::Array(values.iter().cloned().map(Value::String).collect())
                }
            };
            object.insert(key.clone(), value);
        }
        Value::Object(object)
    }

    /// Build the multipart body, reading attachments from disk.
    pub async fn into_multipart(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (key, value) in self.pairs() {
            form = form.text(key, value);
        }
        for attachment in self.attachments {
            let bytes = tokio::fs::read(&attachment.path)
                .await
                .map_err(|source| ApiError::Attachment {
                    path: attachment.path.clone(),
                    source,
                })?;
            let file_name = attachment
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| attachment.field.clone());
            let mime = mime_guess::from_path(&attachment.path).first_or_octet_stream();
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(mime.essence_str())?;
            form = form.part(attachment.field, part);
        }
        Ok(form)
    }
}
