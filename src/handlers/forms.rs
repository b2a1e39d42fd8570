use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;

use crate::database::models::{Habit, NewPlant, PlantPatch};
use crate::error::ApiError;

/// An image file pulled out of a multipart form.
#[derive(Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Bytes,
}

/// Loosely-typed plant form as it arrives over the wire (multipart text
/// fields plus an optional image file). Empty text fields are normalized to
/// "not provided" here, before any domain logic runs.
#[derive(Debug, Default)]
pub struct PlantForm {
    pub local_name: Option<String>,
    pub scientific_name: Option<String>,
    pub family_name: Option<String>,
    pub habit: Option<String>,
    pub uses: Option<Vec<String>>,
    pub location: Option<String>,
    pub map_link: Option<String>,
    pub description: Option<String>,
    pub image: Option<UploadedImage>,
}

impl PlantForm {
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = PlantForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let filename = field.file_name().unwrap_or("image").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read image: {}", e)))?;
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage { filename, bytes });
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form field: {}", e)))?;

            match name.as_str() {
                "localName" => form.local_name = non_empty(text),
                "scientificName" => form.scientific_name = non_empty(text),
                "familyName" => form.family_name = non_empty(text),
                "habit" => form.habit = non_empty(text),
                "uses" => form.uses = non_empty(text).map(|raw| parse_uses(&raw)),
                "location" => form.location = non_empty(text),
                "mapLink" => form.map_link = non_empty(text),
                "description" => form.description = non_empty(text),
                // Unknown fields are ignored, not rejected
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validate a creation form: the five required fields must be present
    /// and the habit must be one of the known values.
    pub fn into_new_plant(self, created_by: uuid::Uuid) -> Result<NewPlant, ApiError> {
        let mut field_errors = HashMap::new();

        for (key, value) in [
            ("localName", &self.local_name),
            ("scientificName", &self.scientific_name),
            ("familyName", &self.family_name),
            ("location", &self.location),
        ] {
            if value.is_none() {
                field_errors.insert(key.to_string(), "This field is required".to_string());
            }
        }

        let habit = match self.habit.as_deref() {
            None => {
                field_errors.insert("habit".to_string(), "This field is required".to_string());
                None
            }
            Some(raw) => match raw.parse::<Habit>() {
                Ok(habit) => Some(habit),
                Err(()) => {
                    field_errors.insert(
                        "habit".to_string(),
                        format!("'{}' is not a recognized habit", raw),
                    );
                    None
                }
            },
        };

        match (
            self.local_name,
            self.scientific_name,
            self.family_name,
            self.location,
            habit,
        ) {
            (
                Some(local_name),
                Some(scientific_name),
                Some(family_name),
                Some(location),
                Some(habit),
            ) if field_errors.is_empty() => Ok(NewPlant {
                local_name,
                scientific_name,
                family_name,
                habit,
                uses: self.uses.unwrap_or_default(),
                image: None, // filled in by the handler once the upload is stored
                location,
                map_link: self.map_link,
                description: self.description,
                created_by,
            }),
            _ => Err(ApiError::validation_error(
                "Invalid plant data",
                Some(field_errors),
            )),
        }
    }

    /// Turn the form into a partial update. Only a present-but-invalid habit
    /// is an error; absent fields keep their stored values.
    pub fn into_patch(self) -> Result<PlantPatch, ApiError> {
        let habit = match self.habit.as_deref() {
            None => None,
            Some(raw) => Some(raw.parse::<Habit>().map_err(|_| {
                let mut fields = HashMap::new();
                fields.insert(
                    "habit".to_string(),
                    format!("'{}' is not a recognized habit", raw),
                );
                ApiError::validation_error("Invalid plant data", Some(fields))
            })?),
        };

        Ok(PlantPatch {
            local_name: self.local_name,
            scientific_name: self.scientific_name,
            family_name: self.family_name,
            habit,
            uses: self.uses,
            image: None,
            location: self.location,
            map_link: self.map_link,
            description: self.description,
        })
    }
}

/// The `uses` field arrives either as a JSON-encoded array or as a
/// comma-separated string; fall back to the latter when JSON parsing fails.
pub fn parse_uses(raw: &str) -> Vec<String> {
    if let Ok(parsed) = serde_json::from_str::<Vec<String>>(raw) {
        return parsed
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
    }
    raw.split(',')
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn valid_form() -> PlantForm {
        PlantForm {
            local_name: Some("Tulsi (Holy Basil)".into()),
            scientific_name: Some("Ocimum tenuiflorum".into()),
            family_name: Some("Lamiaceae".into()),
            habit: Some("Herb".into()),
            uses: Some(vec!["tea".into()]),
            location: Some("Courtyard".into()),
            map_link: None,
            description: None,
            image: None,
        }
    }

    #[test]
    fn uses_parses_json_arrays() {
        assert_eq!(
            parse_uses(r#"["tea", "medicine"]"#),
            vec!["tea".to_string(), "medicine".to_string()]
        );
    }

    #[test]
    fn uses_falls_back_to_csv() {
        assert_eq!(
            parse_uses("tea, medicine , incense"),
            vec!["tea".to_string(), "medicine".to_string(), "incense".to_string()]
        );
        // Broken JSON takes the CSV path too
        assert_eq!(parse_uses(r#"["tea", "#), vec![r#"["tea""#.to_string()]);
    }

    #[test]
    fn uses_drops_empty_entries() {
        assert_eq!(parse_uses("tea,,  ,medicine"), vec!["tea", "medicine"]);
    }

    #[test]
    fn create_requires_the_mandatory_fields() {
        let form = PlantForm::default();
        let err = form.into_new_plant(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_json();
        for field in ["localName", "scientificName", "familyName", "habit", "location"] {
            assert!(
                body["field_errors"].get(field).is_some(),
                "missing error for {}",
                field
            );
        }
    }

    #[test]
    fn create_rejects_unknown_habit() {
        let mut form = valid_form();
        form.habit = Some("Cactus".into());
        let err = form.into_new_plant(Uuid::new_v4()).unwrap_err();
        let body = err.to_json();
        assert!(body["field_errors"]["habit"]
            .as_str()
            .unwrap()
            .contains("Cactus"));
    }

    #[test]
    fn create_accepts_a_valid_form() {
        let admin = Uuid::new_v4();
        let plant = valid_form().into_new_plant(admin).unwrap();
        assert_eq!(plant.local_name, "Tulsi (Holy Basil)");
        assert_eq!(plant.habit, Habit::Herb);
        assert_eq!(plant.created_by, admin);
        assert_eq!(plant.uses, vec!["tea".to_string()]);
    }

    #[test]
    fn patch_keeps_absent_fields_unset() {
        let patch = PlantForm {
            description: Some("Aromatic perennial".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.description.as_deref(), Some("Aromatic perennial"));
        assert!(patch.local_name.is_none());
        assert!(patch.habit.is_none());
        assert!(patch.uses.is_none());
    }

    #[test]
    fn patch_rejects_unknown_habit() {
        let err = PlantForm {
            habit: Some("Fungus".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
