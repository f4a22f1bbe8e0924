//! Request payloads and response envelopes for the HelixDB operations.
//!
//! Every response is normalized by the transport into a JSON object keyed by
//! the entity name (`{"user": ..}`, `{"posts": [..]}`); the envelope structs
//! below decode exactly one of those keys.

use serde::{Deserialize, Serialize};

use super::models::{Post, User};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CreateUserInput {
    pub name: String,
    pub age: u32,
    pub email: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CreateFollowInput {
    pub follower_id: String,
    pub followed_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CreatePostInput {
    pub user_id: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CreatePostEmbeddingInput {
    pub post_id: String,
    pub vector: Vec<f64>,
    pub content: String,
}

/// Payload of `getPostsByUser`, `getFollowers` and `getFollowing`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserIdInput {
    pub user_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchInput {
    pub vector: Vec<f64>,
    pub k: usize,
}

#[derive(Deserialize, Debug)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Deserialize, Debug)]
pub struct PostEnvelope {
    pub post: Post,
}

#[derive(Deserialize, Debug)]
pub struct UsersEnvelope {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Deserialize, Debug)]
pub struct PostsEnvelope {
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Deserialize, Debug)]
pub struct FollowersEnvelope {
    #[serde(default)]
    pub followers: Vec<User>,
}

#[derive(Deserialize, Debug)]
pub struct FollowingEnvelope {
    #[serde(default)]
    pub following: Vec<User>,
}

/// Stored embedding echo, when the server returns one.
#[derive(Deserialize, Debug)]
pub struct EmbeddingRecord {
    #[serde(default)]
    pub vector: Option<Vec<f64>>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct EmbeddingEnvelope {
    #[serde(default, alias = "post_embedding")]
    pub embedding: Option<EmbeddingRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_envelopes_default_to_empty() {
        let users: UsersEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(users.users.is_empty());

        let followers: FollowersEnvelope = serde_json::from_value(json!({"followers": []})).unwrap();
        assert!(followers.followers.is_empty());
    }

    #[test]
    fn embedding_envelope_accepts_either_key() {
        let a: EmbeddingEnvelope =
            serde_json::from_value(json!({"embedding": {"vector": [0.1], "content": "x"}})).unwrap();
        let b: EmbeddingEnvelope =
            serde_json::from_value(json!({"post_embedding": {"vector": [0.1]}})).unwrap();
        assert_eq!(a.embedding.unwrap().content.as_deref(), Some("x"));
        assert_eq!(b.embedding.unwrap().vector, Some(vec![0.1]));
    }

    #[test]
    fn user_timestamps_are_optional_on_the_wire() {
        let env: UserEnvelope = serde_json::from_value(json!({
            "user": {"id": "u1", "name": "Alice", "age": 25, "email": "alice@example.com"}
        }))
        .unwrap();
        assert_eq!(env.user.name, "Alice");
        assert!(env.user.created_at.is_empty());
    }
}
