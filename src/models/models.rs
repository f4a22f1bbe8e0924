use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub email: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A directed follow edge. The server exposes no identity for it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Follow {
    pub follower_id: String,
    pub followed_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PostEmbedding {
    pub post_id: String,
    pub vector: Vec<f64>,
    pub content: String,
}

/// Records that carry a server-assigned id.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}
