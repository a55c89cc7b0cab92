//! Application-level configuration loading, including the fallback catalog
//! used when the booking backend is unreachable.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dao::models::{CoachEntity, LocationEntity};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TOUCHLINE_BACK_CONFIG_PATH";
/// Default directory for the autosaved booking draft slot.
const DEFAULT_DRAFT_DIR: &str = "data";

/// Whether a booking backend was configured for this process.
///
/// The distinction matters for the availability heuristics: without a backend
/// the calendar offers weekdays only and the shorter 9-17 slot day; with a
/// backend that is merely failing or empty, every future date and the full
/// 8-20 day are offered instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// A backend URL is configured, even if currently unreachable.
    Configured,
    /// No backend URL was provided at startup.
    Unconfigured,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Venues offered when the backend cannot supply any.
    pub fallback_locations: Vec<LocationEntity>,
    /// Coaches offered when the backend cannot supply any.
    pub fallback_roster: Vec<CoachEntity>,
    /// Directory holding the autosaved draft slot.
    pub draft_dir: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in catalog when the file is missing or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        locations = config.fallback_locations.len(),
                        coaches = config.fallback_roster.len(),
                        "loaded fallback catalog from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let locations = default_locations();
        let roster = default_roster(&locations);
        Self {
            fallback_locations: locations,
            fallback_roster: roster,
            draft_dir: PathBuf::from(DEFAULT_DRAFT_DIR),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    locations: Vec<RawLocation>,
    #[serde(default)]
    coaches: Vec<RawCoach>,
    draft_dir: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let locations = if value.locations.is_empty() {
            defaults.fallback_locations
        } else {
            value.locations.into_iter().map(Into::into).collect()
        };
        let roster = if value.coaches.is_empty() {
            default_roster(&locations)
        } else {
            let served: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
            value
                .coaches
                .into_iter()
                .map(|raw| raw.into_entity(served.clone()))
                .collect()
        };
        Self {
            fallback_locations: locations,
            fallback_roster: roster,
            draft_dir: value.draft_dir.unwrap_or(defaults.draft_dir),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a fallback venue entry.
struct RawLocation {
    name: String,
    city: String,
    #[serde(default)]
    address: String,
}

impl From<RawLocation> for LocationEntity {
    fn from(value: RawLocation) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: value.name,
            city: value.city,
            address: value.address,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a fallback roster entry.
struct RawCoach {
    name: String,
    #[serde(default)]
    specialties: Vec<String>,
    #[serde(default)]
    experience_label: String,
    #[serde(default)]
    bio: String,
    #[serde(default = "default_price")]
    price_per_session_pence: u32,
    #[serde(default)]
    certifications: Vec<String>,
    current_club: Option<String>,
}

fn default_price() -> u32 {
    3_000
}

impl RawCoach {
    fn into_entity(self, locations_served: Vec<Uuid>) -> CoachEntity {
        CoachEntity {
            id: Uuid::new_v4(),
            name: self.name,
            avatar_url: None,
            rating: 5.0,
            review_count: 0,
            specialties: self.specialties,
            experience_label: self.experience_label,
            bio: self.bio,
            price_per_session_pence: self.price_per_session_pence,
            certifications: self.certifications,
            current_club: self.current_club,
            locations_served,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in venues shipped with the binary.
fn default_locations() -> Vec<LocationEntity> {
    [
        ("Lochwinnoch", "Lochwinnoch", "Burnfoot Road Playing Fields"),
        ("Johnstone", "Johnstone", "Thomas Shanks Park"),
        ("Paisley", "Paisley", "Seedhill Playing Fields"),
    ]
    .into_iter()
    .map(|(name, city, address)| LocationEntity {
        id: Uuid::new_v4(),
        name: name.to_string(),
        city: city.to_string(),
        address: address.to_string(),
    })
    .collect()
}

/// Built-in roster shipped with the binary.
fn default_roster(locations: &[LocationEntity]) -> Vec<CoachEntity> {
    let served: Vec<Uuid> = locations.iter().map(|l| l.id).collect();

    let coach = |name: &str,
                 specialties: &[&str],
                 experience: &str,
                 bio: &str,
                 price: u32,
                 certifications: &[&str],
                 club: Option<&str>| CoachEntity {
        id: Uuid::new_v4(),
        name: name.to_string(),
        avatar_url: None,
        rating: 5.0,
        review_count: 0,
        specialties: specialties.iter().map(|s| s.to_string()).collect(),
        experience_label: experience.to_string(),
        bio: bio.to_string(),
        price_per_session_pence: price,
        certifications: certifications.iter().map(|s| s.to_string()).collect(),
        current_club: club.map(|s| s.to_string()),
        locations_served: served.clone(),
    };

    vec![
        coach(
            "Jack Haggerty",
            &["Finishing", "Dribbling", "1v1 Attacking"],
            "8+ years coaching",
            "Striker-turned-coach focused on building confidence in front of goal.",
            3_500,
            &["SFA Level 2", "First Aid"],
            Some("St Mirren Youth Academy"),
        ),
        coach(
            "Morven Clark",
            &["Goalkeeping", "Distribution"],
            "6 years coaching",
            "Former academy keeper specialising in shot stopping and footwork.",
            3_200,
            &["SFA Goalkeeping B"],
            None,
        ),
        coach(
            "Ross McAllister",
            &["Defending", "Passing", "Game Awareness"],
            "10+ years coaching",
            "Builds composed defenders who play out from the back.",
            3_000,
            &["UEFA C", "Safeguarding"],
            Some("Johnstone Burgh"),
        ),
    ]
}
