use regex::Regex;
use std::collections::HashSet;

use crate::error::QueryError;
use crate::service::{ResourceCatalog, ServiceError};

/// Most log groups a single query may span.
pub const MAX_RESOURCES: usize = 20;

const WILDCARD: char = '*';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResources {
    pub names: Vec<String>,
    /// Number of distinct names found before capping, set only when the cap
    /// dropped some of them.
    pub truncated_from: Option<usize>,
}

impl ResolvedResources {
    pub fn truncation_warning(&self) -> Option<String> {
        self.truncated_from.map(|total| {
            format!(
                "CloudWatch limits queries to {MAX_RESOURCES} log groups. Using first {} of {total} groups.",
                self.names.len()
            )
        })
    }
}

/// Expand wildcard patterns and confirm literal names against `catalog`.
///
/// Names keep discovery order, repeats across patterns are dropped, and the
/// result is capped at [`MAX_RESOURCES`]. Capping is reported through
/// [`ResolvedResources::truncated_from`], never as an error.
pub async fn validate<C>(catalog: &C, patterns: &[String]) -> Result<ResolvedResources, QueryError>
where
    C: ResourceCatalog + ?Sized,
{
    if patterns.is_empty() {
        return Err(QueryError::NoResources);
    }

    let mut names = Vec::new();
    let mut seen = HashSet::new();
    for pattern in patterns {
        let found = match pattern.find(WILDCARD) {
            Some(index) => expand_wildcard(catalog, pattern, &pattern[..index]).await?,
            None => vec![confirm_literal(catalog, pattern).await?],
        };
        for name in found {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
    }

    let total = names.len();
    let truncated_from = if total > MAX_RESOURCES {
        names.truncate(MAX_RESOURCES);
        tracing::warn!(
            total,
            kept = MAX_RESOURCES,
            "log group list exceeds query limit, truncating"
        );
        Some(total)
    } else {
        None
    };

    Ok(ResolvedResources {
        names,
        truncated_from,
    })
}

async fn expand_wildcard<C>(
    catalog: &C,
    pattern: &str,
    prefix: &str,
) -> Result<Vec<String>, QueryError>
where
    C: ResourceCatalog + ?Sized,
{
    let listed = catalog
        .list_by_prefix(prefix)
        .await
        .map_err(|err| catalog_error(pattern, err))?;
    let matcher = wildcard_matcher(pattern, prefix);
    let matched: Vec<String> = listed
        .into_iter()
        .filter(|name| matcher.as_ref().map_or(true, |regex| regex.is_match(name)))
        .collect();
    tracing::debug!(pattern = %pattern, count = matched.len(), "expanded log group pattern");
    if matched.is_empty() {
        return Err(QueryError::NoResourceMatch {
            pattern: pattern.to_string(),
        });
    }
    Ok(matched)
}

async fn confirm_literal<C>(catalog: &C, name: &str) -> Result<String, QueryError>
where
    C: ResourceCatalog + ?Sized,
{
    let exists = catalog
        .exists(name)
        .await
        .map_err(|err| catalog_error(name, err))?;
    if !exists {
        return Err(QueryError::ResourceNotFound {
            pattern: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Full-pattern matcher, needed only when text follows the first wildcard.
fn wildcard_matcher(pattern: &str, prefix: &str) -> Option<Regex> {
    if pattern.len() == prefix.len() + 1 {
        return None;
    }
    let body = pattern
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).ok()
}

fn catalog_error(pattern: &str, err: ServiceError) -> QueryError {
    match err {
        ServiceError::NotFound(_) => QueryError::ResourceNotFound {
            pattern: pattern.to_string(),
        },
        other => QueryError::Catalog {
            pattern: pattern.to_string(),
            message: other.to_string(),
        },
    }
}
