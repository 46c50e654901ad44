// src/config.rs

use std::collections::HashMap;
use std::env;
use std::fs;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub lesson_catalog_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set")?;

        let jwt_expiration = match env::var("JWT_EXPIRATION") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| format!("JWT_EXPIRATION must be a number of seconds: {}", e))?,
            Err(_) => 86_400,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let lesson_catalog_path = env::var("LESSON_CATALOG_PATH").ok();

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            lesson_catalog_path,
        })
    }
}

/// Read-only mapping of topic slug to total lesson count.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonCatalog {
    totals: HashMap<String, i64>,
}

impl Default for LessonCatalog {
    fn default() -> Self {
        Self::from_entries([
            ("general-psychology", 12),
            ("abnormal-psychology", 10),
            ("psychological-assessment", 8),
            ("industrial-organizational-psychology", 9),
            ("ethics-ra-10029", 6),
        ])
    }
}

impl LessonCatalog {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            totals: entries
                .into_iter()
                .map(|(slug, total)| (slug.into(), total.max(0)))
                .collect(),
        }
    }

    /// Loads a JSON object of `{"slug": total}` pairs.
    pub fn from_json_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        let totals: HashMap<String, i64> = serde_json::from_str(&raw)?;
        Ok(Self::from_entries(totals))
    }

    /// Catalog from `LESSON_CATALOG_PATH` when configured, built-in defaults otherwise.
    pub fn load(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        match &config.lesson_catalog_path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Unknown slugs have no lessons.
    pub fn total_lessons(&self, topic_slug: &str) -> i64 {
        self.totals.get(topic_slug).copied().unwrap_or(0)
    }
}
