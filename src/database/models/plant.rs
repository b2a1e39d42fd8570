use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Botanical growth-form classification. The closed set is enforced at write
/// time; anything else is rejected before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "plant_habit")]
pub enum Habit {
    Herb,
    Shrub,
    Tree,
    Aquatic,
    Grass,
    Climber,
}

impl Habit {
    pub const ALL: [Habit; 6] = [
        Habit::Herb,
        Habit::Shrub,
        Habit::Tree,
        Habit::Aquatic,
        Habit::Grass,
        Habit::Climber,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Habit::Herb => "Herb",
            Habit::Shrub => "Shrub",
            Habit::Tree => "Tree",
            Habit::Aquatic => "Aquatic",
            Habit::Grass => "Grass",
            Habit::Climber => "Climber",
        }
    }
}

impl fmt::Display for Habit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Habit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Herb" => Ok(Habit::Herb),
            "Shrub" => Ok(Habit::Shrub),
            "Tree" => Ok(Habit::Tree),
            "Aquatic" => Ok(Habit::Aquatic),
            "Grass" => Ok(Habit::Grass),
            "Climber" => Ok(Habit::Climber),
            _ => Err(()),
        }
    }
}

/// Plant catalog record. Wire names follow the public API (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: Uuid,
    pub local_name: String,
    pub scientific_name: String,
    pub family_name: String,
    pub habit: Habit,
    pub uses: Vec<String>,
    pub image: String,
    pub location: String,
    pub map_link: String,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully validated insert payload.
#[derive(Debug)]
pub struct NewPlant {
    pub local_name: String,
    pub scientific_name: String,
    pub family_name: String,
    pub habit: Habit,
    pub uses: Vec<String>,
    pub image: Option<String>,
    pub location: String,
    pub map_link: Option<String>,
    pub description: Option<String>,
    pub created_by: Uuid,
}

/// Partial update: `None` means "keep the stored value".
#[derive(Debug, Default)]
pub struct PlantPatch {
    pub local_name: Option<String>,
    pub scientific_name: Option<String>,
    pub family_name: Option<String>,
    pub habit: Option<Habit>,
    pub uses: Option<Vec<String>>,
    pub image: Option<String>,
    pub location: Option<String>,
    pub map_link: Option<String>,
    pub description: Option<String>,
}

/// Trimmed projection for the dashboard's recent-additions list.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentPlant {
    pub id: Uuid,
    pub local_name: String,
    pub scientific_name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn habit_rejects_unknown_values() {
        assert_eq!("Tree".parse::<Habit>(), Ok(Habit::Tree));
        assert!("tree".parse::<Habit>().is_err());
        assert!("Cactus".parse::<Habit>().is_err());
        assert!("".parse::<Habit>().is_err());
    }

    #[test]
    fn habit_roundtrips_through_display() {
        for habit in Habit::ALL {
            assert_eq!(habit.as_str().parse::<Habit>(), Ok(habit));
        }
    }

    #[test]
    fn plant_serializes_camel_case() {
        let plant = Plant {
            id: Uuid::new_v4(),
            local_name: "Tulsi (Holy Basil)".into(),
            scientific_name: "Ocimum tenuiflorum".into(),
            family_name: "Lamiaceae".into(),
            habit: Habit::Herb,
            uses: vec!["tea".into(), "medicine".into()],
            image: String::new(),
            location: "Courtyard".into(),
            map_link: String::new(),
            description: String::new(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&plant).unwrap();
        assert!(value.get("localName").is_some());
        assert!(value.get("scientificName").is_some());
        assert!(value.get("familyName").is_some());
        assert!(value.get("mapLink").is_some());
        assert_eq!(value["habit"], serde_json::json!("Herb"));
        assert!(value.get("local_name").is_none());
    }
}
