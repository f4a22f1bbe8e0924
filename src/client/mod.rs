//! Typed access to the HelixDB social graph queries.
//!
//! [`SocialGraph`] is the one capability set the rest of the crate talks to.
//! [`HelixClient`] implements it on top of any [`Transport`]; which transport
//! is used is a configuration choice made once in [`connect`].

pub mod direct;
pub mod envelope;
pub mod error;
pub mod gateway;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, TransportKind};
use crate::models::queries::*;
use crate::models::{Follow, Post, PostEmbedding, User};

pub use direct::DirectTransport;
pub use error::ClientError;
pub use gateway::GatewayTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    CreateFollow,
    CreatePost,
    CreatePostEmbedding,
    GetUsers,
    GetPosts,
    GetPostsByUser,
    GetFollowers,
    GetFollowing,
    SearchPostEmbeddings,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::CreateUser,
        Operation::CreateFollow,
        Operation::CreatePost,
        Operation::CreatePostEmbedding,
        Operation::GetUsers,
        Operation::GetPosts,
        Operation::GetPostsByUser,
        Operation::GetFollowers,
        Operation::GetFollowing,
        Operation::SearchPostEmbeddings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CreateUser => "createUser",
            Operation::CreateFollow => "createFollow",
            Operation::CreatePost => "createPost",
            Operation::CreatePostEmbedding => "createPostEmbedding",
            Operation::GetUsers => "getUsers",
            Operation::GetPosts => "getPosts",
            Operation::GetPostsByUser => "getPostsByUser",
            Operation::GetFollowers => "getFollowers",
            Operation::GetFollowing => "getFollowing",
            Operation::SearchPostEmbeddings => "searchPostEmbeddings",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation: {}", s))
    }
}

/// Moves one JSON payload to the server and brings back the normalized
/// envelope object.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn call(&self, operation: Operation, payload: Value) -> Result<Value, ClientError>;
}

/// POSTs `payload` to `{base_url}/{operation}` and returns the parsed body.
/// Non-success statuses are turned into [`ClientError::Status`].
pub(crate) async fn post_operation(
    http: &reqwest::Client,
    base_url: &str,
    operation: Operation,
    payload: &Value,
) -> Result<Value, ClientError> {
    let url = format!("{}/{}", base_url, operation);
    tracing::debug!(%operation, %url, "sending query");

    let resp = http
        .post(&url)
        .json(payload)
        .send()
        .await
        .map_err(|source| ClientError::Http { operation, source })?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|source| ClientError::Http { operation, source })?;

    if !status.is_success() {
        tracing::warn!(%operation, status = status.as_u16(), "query rejected");
        return Err(ClientError::Status {
            operation,
            status: status.as_u16(),
            message: envelope::error_message(&body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|source| ClientError::Decode { operation, source })
}

/// The ten named HelixDB operations.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Label of the transport in use, shown in the UI header.
    fn transport_name(&self) -> &'static str;

    async fn create_user(&self, input: &CreateUserInput) -> Result<User, ClientError>;

    async fn create_follow(&self, input: &CreateFollowInput) -> Result<Follow, ClientError>;

    async fn create_post(&self, input: &CreatePostInput) -> Result<Post, ClientError>;

    async fn create_post_embedding(
        &self,
        input: &CreatePostEmbeddingInput,
    ) -> Result<PostEmbedding, ClientError>;

    async fn get_users(&self) -> Result<Vec<User>, ClientError>;

    async fn get_posts(&self) -> Result<Vec<Post>, ClientError>;

    async fn get_posts_by_user(&self, user_id: &str) -> Result<Vec<Post>, ClientError>;

    async fn get_followers(&self, user_id: &str) -> Result<Vec<User>, ClientError>;

    async fn get_following(&self, user_id: &str) -> Result<Vec<User>, ClientError>;

    /// Posts ordered by the server's similarity ranking, at most `input.k`.
    async fn search_post_embeddings(&self, input: &SearchInput) -> Result<Vec<Post>, ClientError>;
}

#[derive(Serialize)]
struct Empty {}

pub struct HelixClient<T> {
    transport: T,
}

impl<T: Transport> HelixClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn query<I, O>(&self, operation: Operation, input: &I) -> Result<O, ClientError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let payload = serde_json::to_value(input)
            .map_err(|source| ClientError::Encode { operation, source })?;
        let envelope = self.transport.call(operation, payload).await?;
        serde_json::from_value(envelope).map_err(|source| ClientError::Decode { operation, source })
    }

    fn user_id(user_id: &str) -> UserIdInput {
        UserIdInput {
            user_id: user_id.to_string(),
        }
    }
}

#[async_trait]
impl<T: Transport> SocialGraph for HelixClient<T> {
    fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    async fn create_user(&self, input: &CreateUserInput) -> Result<User, ClientError> {
        let env: UserEnvelope = self.query(Operation::CreateUser, input).await?;
        Ok(env.user)
    }

    async fn create_follow(&self, input: &CreateFollowInput) -> Result<Follow, ClientError> {
        // The edge has no identity on the client side, only success matters.
        let _: Value = self.query(Operation::CreateFollow, input).await?;
        Ok(Follow {
            follower_id: input.follower_id.clone(),
            followed_id: input.followed_id.clone(),
        })
    }

    async fn create_post(&self, input: &CreatePostInput) -> Result<Post, ClientError> {
        let env: PostEnvelope = self.query(Operation::CreatePost, input).await?;
        Ok(env.post)
    }

    async fn create_post_embedding(
        &self,
        input: &CreatePostEmbeddingInput,
    ) -> Result<PostEmbedding, ClientError> {
        let env: EmbeddingEnvelope = self.query(Operation::CreatePostEmbedding, input).await?;
        let stored = env.embedding;
        Ok(PostEmbedding {
            post_id: input.post_id.clone(),
            vector: stored
                .as_ref()
                .and_then(|e| e.vector.clone())
                .unwrap_or_else(|| input.vector.clone()),
            content: stored
                .and_then(|e| e.content)
                .unwrap_or_else(|| input.content.clone()),
        })
    }

    async fn get_users(&self) -> Result<Vec<User>, ClientError> {
        let env: UsersEnvelope = self.query(Operation::GetUsers, &Empty {}).await?;
        Ok(env.users)
    }

    async fn get_posts(&self) -> Result<Vec<Post>, ClientError> {
        let env: PostsEnvelope = self.query(Operation::GetPosts, &Empty {}).await?;
        Ok(env.posts)
    }

    async fn get_posts_by_user(&self, user_id: &str) -> Result<Vec<Post>, ClientError> {
        let env: PostsEnvelope = self
            .query(Operation::GetPostsByUser, &Self::user_id(user_id))
            .await?;
        Ok(env.posts)
    }

    async fn get_followers(&self, user_id: &str) -> Result<Vec<User>, ClientError> {
        let env: FollowersEnvelope = self
            .query(Operation::GetFollowers, &Self::user_id(user_id))
            .await?;
        Ok(env.followers)
    }

    async fn get_following(&self, user_id: &str) -> Result<Vec<User>, ClientError> {
        let env: FollowingEnvelope = self
            .query(Operation::GetFollowing, &Self::user_id(user_id))
            .await?;
        Ok(env.following)
    }

    async fn search_post_embeddings(&self, input: &SearchInput) -> Result<Vec<Post>, ClientError> {
        let env: PostsEnvelope = self.query(Operation::SearchPostEmbeddings, input).await?;
        let mut posts = env.posts;
        posts.truncate(input.k);
        Ok(posts)
    }
}

/// Builds the client selected by `config.transport`.
pub fn connect(config: &Config) -> Arc<dyn SocialGraph> {
    match config.transport {
        TransportKind::Sdk => Arc::new(HelixClient::new(DirectTransport::new(&config.helix_url))),
        TransportKind::Api => {
            Arc::new(HelixClient::new(GatewayTransport::new(&config.gateway_url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned envelopes and records what was sent.
    struct Canned {
        reply: Value,
        sent: Mutex<Vec<(Operation, Value)>>,
    }

    #[async_trait]
    impl Transport for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn call(&self, operation: Operation, payload: Value) -> Result<Value, ClientError> {
            self.sent.lock().unwrap().push((operation, payload));
            Ok(self.reply.clone())
        }
    }

    fn canned(reply: Value) -> HelixClient<Canned> {
        HelixClient::new(Canned {
            reply,
            sent: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("dropDatabase".parse::<Operation>().is_err());
    }

    #[tokio::test]
    async fn get_users_sends_empty_object() {
        let client = canned(json!({"users": []}));
        let users = client.get_users().await.unwrap();
        assert!(users.is_empty());

        let sent = client.transport().sent.lock().unwrap();
        assert_eq!(sent[0], (Operation::GetUsers, json!({})));
    }

    #[tokio::test]
    async fn create_follow_echoes_the_pair() {
        let client = canned(json!({}));
        let input = CreateFollowInput {
            follower_id: "a".into(),
            followed_id: "b".into(),
        };
        let follow = client.create_follow(&input).await.unwrap();
        assert_eq!(follow.follower_id, "a");
        assert_eq!(follow.followed_id, "b");
    }

    #[tokio::test]
    async fn embedding_falls_back_to_submitted_values() {
        let client = canned(json!({}));
        let input = CreatePostEmbeddingInput {
            post_id: "p1".into(),
            vector: vec![0.1, 0.2],
            content: "hello".into(),
        };
        let embedding = client.create_post_embedding(&input).await.unwrap();
        assert_eq!(embedding.vector, vec![0.1, 0.2]);
        assert_eq!(embedding.content, "hello");
    }

    #[tokio::test]
    async fn search_never_returns_more_than_k() {
        let client = canned(json!({"posts": [
            {"id": "1", "content": "a"},
            {"id": "2", "content": "b"},
            {"id": "3", "content": "c"}
        ]}));
        let posts = client
            .search_post_embeddings(&SearchInput { vector: vec![0.1], k: 1 })
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "1");
    }

    #[tokio::test]
    async fn missing_entity_is_a_decode_error() {
        let client = canned(json!({"nope": true}));
        let err = client
            .create_user(&CreateUserInput {
                name: "A".into(),
                age: 1,
                email: "a@b.co".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { operation: Operation::CreateUser, .. }));
    }
}
