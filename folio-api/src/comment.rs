use crate::{time::opt_time, Error, PostId, Time, UserId};

pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,

    #[serde(default)]
    pub post_id: Option<PostId>,

    /// Author, absent for comments whose account was removed
    #[serde(default)]
    pub user_id: Option<UserId>,

    #[serde(default)]
    pub author_name: String,

    pub content: String,

    /// Comment this one replies to, if any
    #[serde(default)]
    pub parent_id: Option<CommentId>,

    #[serde(default, with = "opt_time")]
    pub created_at: Option<Time>,

    #[serde(default)]
    pub like_count: i64,

    /// Whether the user who fetched this comment liked it
    #[serde(default)]
    pub is_liked: bool,
}

impl Comment {
    pub fn author_display(&self) -> &str {
        match self.author_name.is_empty() {
            true => "Anonymous",
            false => &self.author_name,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    /// Trims `content` and checks it before anything is sent
    pub fn new(content: &str, parent_id: Option<CommentId>) -> Result<NewComment, Error> {
        let res = NewComment {
            content: content.trim().to_string(),
            parent_id,
        };
        res.validate()?;
        Ok(res)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.content.trim().is_empty() {
            return Err(Error::EmptyComment);
        }
        let len = self.content.chars().count();
        if len > MAX_COMMENT_LEN {
            return Err(Error::CommentTooLong(len));
        }
        Ok(())
    }
}
