use serde::Deserialize;
use std::collections::HashMap;

use crate::config::ApiConfig;
use crate::database::models::Habit;
use crate::error::ApiError;

/// Raw, loosely-typed query-string parameters for `GET /plants`. Everything
/// is optional and arrives as text; [`PlantListQuery::from_params`] is the
/// single place they get parsed and defaulted.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListPlantsParams {
    pub habit: Option<String>,
    pub family: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Typed, validated listing query. Ordering is fixed: creation time,
/// newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantListQuery {
    pub habit: Option<Habit>,
    pub family: Option<String>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl PlantListQuery {
    /// Parse request parameters into a well-formed query.
    ///
    /// - `habit`/`family` equal to `"all"` (or absent) contribute no clause;
    ///   an unknown habit value is a validation error rather than a silent
    ///   empty result.
    /// - `page`/`limit` fall back to 1 and the configured default page size
    ///   on missing, unparseable or non-positive input; `limit` is clamped
    ///   to `max_page_size` when one is configured.
    pub fn from_params(params: &ListPlantsParams, api: &ApiConfig) -> Result<Self, ApiError> {
        let habit = match params.habit.as_deref() {
            None | Some("all") | Some("") => None,
            Some(raw) => Some(raw.parse::<Habit>().map_err(|_| {
                let mut fields = HashMap::new();
                fields.insert(
                    "habit".to_string(),
                    format!("'{}' is not a recognized habit", raw),
                );
                ApiError::validation_error("Invalid filter parameters", Some(fields))
            })?),
        };

        let family = match params.family.as_deref() {
            None | Some("all") | Some("") => None,
            Some(raw) => Some(raw.to_string()),
        };

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let page = parse_positive(params.page.as_deref()).unwrap_or(1);
        let mut limit = parse_positive(params.limit.as_deref()).unwrap_or(api.default_page_size);
        if let Some(max) = api.max_page_size {
            limit = limit.min(max);
        }

        Ok(Self {
            habit,
            family,
            search,
            page,
            limit,
        })
    }

    /// Saturating so an absurd but positive `page` yields a huge offset
    /// (an empty page) instead of overflowing.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Render the WHERE clause with placeholders starting at `$1`. The same
    /// clause backs both the page query and the total-count query, so the
    /// pagination metadata always agrees with the rows returned.
    ///
    /// Bind order is fixed: habit, then family, then the search pattern.
    pub fn where_sql(&self) -> String {
        let mut clauses = Vec::new();
        let mut index = 1;

        if self.habit.is_some() {
            clauses.push(format!("habit = ${}", index));
            index += 1;
        }
        if self.family.is_some() {
            clauses.push(format!("family_name = ${}", index));
            index += 1;
        }
        if self.search.is_some() {
            clauses.push(format!(
                "(local_name ILIKE ${i} OR scientific_name ILIKE ${i} OR family_name ILIKE ${i})",
                i = index
            ));
        }

        if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        }
    }

    /// The `ILIKE` pattern for the search term, with wildcard characters in
    /// the user input escaped so they match literally.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
}

fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped)
}

/// Pagination metadata math: `pages = ceil(total / limit)`.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
