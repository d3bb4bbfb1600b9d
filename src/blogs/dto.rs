use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::BlogChanges;

const MAX_TITLE_LEN: usize = 200;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub author_id: Option<Uuid>,
}

fn default_limit() -> i64 {
    20
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "Title must be {MAX_TITLE_LEN} characters or less"
        )));
    }
    Ok(title.to_owned())
}

fn validate_content(content: &str) -> Result<String, ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }
    Ok(content.to_owned())
}

impl CreateBlogRequest {
    /// Returns the trimmed title and the content.
    pub fn validate(&self) -> Result<(String, String), ApiError> {
        Ok((validate_title(&self.title)?, validate_content(&self.content)?))
    }
}

impl UpdateBlogRequest {
    pub fn into_changes(self) -> Result<BlogChanges, ApiError> {
        if self.title.is_none() && self.content.is_none() {
            return Err(ApiError::validation(
                "At least one of title or content is required",
            ));
        }
        Ok(BlogChanges {
            title: self.title.as_deref().map(validate_title).transpose()?,
            content: self.content.as_deref().map(validate_content).transpose()?,
        })
    }
}

impl ListQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(ApiError::validation(format!(
                "Invalid limit: {}. Limit must be between 1 and {MAX_LIMIT}",
                self.limit
            )));
        }
        if self.offset < 0 {
            return Err(ApiError::validation("Offset cannot be negative"));
        }
        Ok(())
    }
}
