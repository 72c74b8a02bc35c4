use crate::{time::opt_time, Error, Time};

pub const DEFAULT_CATEGORY: &str = "Technology";
pub const CATEGORIES: [&str; 4] = ["Technology", "Life", "Reading", "Travel"];

/// Number of content characters kept in a post summary
pub const SUMMARY_LEN: usize = 200;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "coverImage")]
    pub cover_file_path: Option<String>,
    #[serde(default, alias = "isPublished")]
    pub published: bool,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default, with = "opt_time")]
    pub created_at: Option<Time>,
    #[serde(default, with = "opt_time")]
    pub updated_at: Option<Time>,
}

/// Body of both the create and the update calls
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_file_path: Option<String>,
}

impl NewPost {
    /// Derives slug, summary and tag list from what the editor holds
    pub fn from_form(
        title: &str,
        content: &str,
        category: &str,
        tags: &str,
        cover_file_path: Option<String>,
    ) -> Result<NewPost, Error> {
        let res = NewPost {
            title: title.trim().to_string(),
            slug: slugify(title),
            content: content.to_string(),
            summary: summarize(content),
            category: match category.trim().is_empty() {
                true => String::from(DEFAULT_CATEGORY),
                false => category.trim().to_string(),
            },
            tags: split_tags(tags),
            cover_file_path,
        };
        res.validate()?;
        Ok(res)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }
        Ok(())
    }
}

/// URL-friendly version of a title: lowercase ascii alphanumerics separated by dashes
pub fn slugify(title: &str) -> String {
    let mut res = String::with_capacity(title.len());
    for c in title.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            res.push(c);
        } else if !res.is_empty() && !res.ends_with('-') {
            res.push('-');
        }
    }
    while res.ends_with('-') {
        res.pop();
    }
    res
}

pub fn summarize(content: &str) -> String {
    let mut res = content.chars().take(SUMMARY_LEN).collect::<String>();
    res.push_str("...");
    res
}

pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust 2024 -- what's new?  "), "rust-2024-what-s-new");
        assert_eq!(slugify("日本語"), "");
        assert_eq!(slugify("Déjà vu"), "d-j-vu");
    }

    #[test]
    fn summary_is_truncated_and_marked() {
        assert_eq!(summarize("short"), "short...");
        let long = "x".repeat(500);
        assert_eq!(summarize(&long).chars().count(), SUMMARY_LEN + 3);
    }

    #[test]
    fn tags_round_trip_through_form_text() {
        let tags = split_tags(" rust, ,wasm ,yew,");
        assert_eq!(tags, vec!["rust", "wasm", "yew"]);
        assert_eq!(join_tags(&tags), "rust, wasm, yew");
    }

    #[test]
    fn from_form_validates_and_defaults() {
        assert_eq!(
            NewPost::from_form("", "body", "", "", None),
            Err(Error::EmptyTitle)
        );
        assert_eq!(
            NewPost::from_form("Title", "  \n", "", "", None),
            Err(Error::EmptyContent)
        );
        let p = NewPost::from_form("My Title", "body", "", "a, b", None).unwrap();
        assert_eq!(p.slug, "my-title");
        assert_eq!(p.category, DEFAULT_CATEGORY);
        assert_eq!(p.tags, vec!["a", "b"]);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("coverFilePath").is_none());
    }

    #[test]
    fn post_accepts_backend_aliases() {
        let p: Post = serde_json::from_str(
            r#"{"id": 5, "title": "T", "content": "c", "coverImage": "/uploads/a.png", "isPublished": true}"#,
        )
        .unwrap();
        assert_eq!(p.cover_file_path.as_deref(), Some("/uploads/a.png"));
        assert!(p.published);
        assert!(p.tags.is_empty());
    }
}
