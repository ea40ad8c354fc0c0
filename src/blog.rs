//! Blog posts managed from the admin panel.

use crate::error::AppError;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const READ_CHARS_PER_MINUTE: usize = 200;

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Scheduled,
}

impl PostStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "scheduled" => Some(Self::Scheduled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub author: Author,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub publish_date: String,
    pub last_updated: String,
    pub read_time: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub likes: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub premium: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewBlogPost {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: Author,
    pub category: String,
    pub tags: Vec<String>,
    pub publish_date: String,
    pub last_updated: String,
    pub read_time: String,
    pub difficulty: Difficulty,
    pub status: PostStatus,
    pub featured: bool,
    pub premium: bool,
    pub views: u64,
    pub comments: u64,
    pub likes: u64,
}

/// Fields an edit may change; counters and slug stay as created
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlogPostPatch {
    #[serde(default, skip_serializing)]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Lowercase, whitespace runs to `-`, drop anything outside `[a-z0-9-]`
/// Every whitespace run, leading and trailing included, becomes one `-`
pub fn slugify(title: &str) -> String {
    WHITESPACE_RUN_RE
        .replace_all(&title.to_lowercase(), "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub fn read_time(content: &str) -> String {
    let minutes = content.chars().count().div_ceil(READ_CHARS_PER_MINUTE);
    format!("{} min read", minutes)
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing required field: {}", field)))
}

pub fn validate_new(input: BlogPostInput, today: NaiveDate) -> Result<NewBlogPost, AppError> {
    let title = required(input.title, "title")?;
    let content = required(input.content, "content")?;
    let category = required(input.category, "category")?;
    let date = today.format("%Y-%m-%d").to_string();

    Ok(NewBlogPost {
        slug: slugify(&title),
        read_time: read_time(&content),
        title,
        excerpt: input.excerpt.unwrap_or_default(),
        content,
        author: input.author.unwrap_or_default(),
        category,
        tags: input.tags,
        publish_date: date.clone(),
        last_updated: date,
        difficulty: input.difficulty.unwrap_or_default(),
        status: input.status.unwrap_or_default(),
        featured: input.featured,
        premium: input.premium,
        views: 0,
        comments: 0,
        likes: 0,
    })
}

impl NewBlogPost {
    pub fn into_post(self, id: i64) -> BlogPost {
        BlogPost {
            id,
            slug: self.slug,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            author: self.author,
            category: self.category,
            tags: self.tags,
            publish_date: self.publish_date,
            last_updated: self.last_updated,
            read_time: self.read_time,
            difficulty: self.difficulty,
            status: self.status,
            featured: self.featured,
            premium: self.premium,
            views: self.views,
            comments: self.comments,
            likes: self.likes,
        }
    }
}

impl BlogPostPatch {
    /// Refresh `last_updated` and recompute read time when content changes
    pub fn normalize(mut self, today: NaiveDate) -> Self {
        if let Some(content) = &self.content {
            self.read_time = Some(read_time(content));
        }
        self.last_updated = Some(today.format("%Y-%m-%d").to_string());
        self
    }

    pub fn apply(&self, post: &mut BlogPost) {
        if let Some(v) = &self.title {
            post.title = v.clone();
        }
        if let Some(v) = &self.excerpt {
            post.excerpt = v.clone();
        }
        if let Some(v) = &self.content {
            post.content = v.clone();
        }
        if let Some(v) = &self.author {
            post.author = v.clone();
        }
        if let Some(v) = &self.category {
            post.category = v.clone();
        }
        if let Some(v) = &self.tags {
            post.tags = v.clone();
        }
        if let Some(v) = self.difficulty {
            post.difficulty = v;
        }
        if let Some(v) = self.status {
            post.status = v;
        }
        if let Some(v) = self.featured {
            post.featured = v;
        }
        if let Some(v) = self.premium {
            post.premium = v;
        }
        if let Some(v) = &self.read_time {
            post.read_time = v.clone();
        }
        if let Some(v) = &self.last_updated {
            post.last_updated = v.clone();
        }
    }
}
