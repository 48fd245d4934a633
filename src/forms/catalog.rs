//! Forms for rooms, cabinets, procedures and news.

use std::path::Path;

use serde::Serialize;

use super::{FieldErrors, FormMode, check_max, check_required_max};
use crate::api::{Cabinet, Procedure, Room};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomForm {
    pub number: String,
    pub capacity: i32,
    pub description: String,
}

impl RoomForm {
    pub fn from_room(room: &Room) -> Self {
        Self {
            number: room.number.clone(),
            capacity: room.capacity,
            description: room.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_required_max(&mut errors, "number", &self.number, 10);
        if self.capacity < 1 {
            errors.insert("capacity", "Должно быть положительным числом");
        }
        check_max(&mut errors, "description", &self.description, 50);
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CabinetForm {
    pub number: String,
    pub name: String,
}

impl CabinetForm {
    pub fn from_cabinet(cabinet: &Cabinet) -> Self {
        Self {
            number: cabinet.number.clone(),
            name: cabinet.name.clone(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_required_max(&mut errors, "number", &self.number, 10);
        check_required_max(&mut errors, "name", &self.name, 50);
        errors
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureForm {
    pub name: String,
    pub cabinet_id: Option<i64>,
    /// Minutes
    pub default_duration: i32,
}

impl Default for ProcedureForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            cabinet_id: None,
            default_duration: 30,
        }
    }
}

impl ProcedureForm {
    pub fn from_procedure(procedure: &Procedure) -> Self {
        Self {
            name: procedure.name.clone(),
            cabinet_id: procedure.cabinet_id,
            default_duration: procedure.default_duration.unwrap_or(30),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_required_max(&mut errors, "name", &self.name, 100);
        if self.cabinet_id.is_none() {
            errors.insert("cabinetId", "Выберите кабинет");
        }
        if self.default_duration <= 0 {
            errors.insert("defaultDuration", "Длительность должна быть положительной");
        }
        errors
    }
}

/// Largest accepted news image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// Image attached to a news item.
#[derive(Debug, Clone)]
pub struct NewsImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NewsImage {
    /// Read an image from disk, deriving the content type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

/// News form. Sent as multipart, see [`crate::api::NewsApi`].
#[derive(Debug, Clone, Default)]
pub struct NewsForm {
    pub title: String,
    pub content: String,
    pub image: Option<NewsImage>,
}

impl NewsForm {
    /// A new item needs an image; an edit keeps the current one when none is given.
    pub fn validate(&self, mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_required_max(&mut errors, "title", &self.title, 100);
        check_required_max(&mut errors, "content", &self.content, 2000);

        match &self.image {
            None if mode == FormMode::Create => {
                errors.insert("imageFile", "Изображение обязательно")
            }
            None => {}
            Some(image) if !IMAGE_TYPES.contains(&image.content_type.as_str()) => {
                errors.insert("imageFile", "Только JPG, PNG или GIF")
            }
            Some(image) if image.bytes.len() > MAX_IMAGE_BYTES => {
                errors.insert("imageFile", "Максимальный размер 5MB")
            }
            Some(_) => {}
        }

        errors
    }
}
