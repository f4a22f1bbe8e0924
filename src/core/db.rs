use crate::client::{ClientError, DirectTransport, HelixClient, SocialGraph};
use crate::models::queries::{
    CreateFollowInput, CreatePostEmbeddingInput, CreatePostInput, CreateUserInput,
};
use crate::models::{Post, User};

pub struct SampleUser {
    pub name: &'static str,
    pub age: u32,
    pub email: &'static str,
}

pub struct SamplePost {
    pub content: &'static str,
    pub vector: [f64; 5],
}

pub const SAMPLE_USERS: [SampleUser; 3] = [
    SampleUser { name: "Alice", age: 25, email: "alice@example.com" },
    SampleUser { name: "Bob", age: 30, email: "bob@example.com" },
    SampleUser { name: "Charlie", age: 28, email: "charlie@example.com" },
];

/// One post per sample user, same order as [`SAMPLE_USERS`].
pub const SAMPLE_POSTS: [SamplePost; 3] = [
    SamplePost {
        content: "Hello world! My first post on HelixDB",
        vector: [0.1, 0.2, 0.3, 0.4, 0.5],
    },
    SamplePost {
        content: "Loving the graph database capabilities",
        vector: [0.2, 0.3, 0.4, 0.5, 0.6],
    },
    SamplePost {
        content: "Building cool social networks with Helix",
        vector: [0.3, 0.4, 0.5, 0.6, 0.7],
    },
];

/// Follow edges between sample users, as indices into [`SAMPLE_USERS`]:
/// Alice -> Bob, Bob -> Charlie, Charlie -> Alice.
pub const SAMPLE_FOLLOWS: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

/// What [`seed_sample_data`] created, in sample order.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
}

/// Creates the sample users, follows, posts and embeddings. Stops at the
/// first failed call; whatever was created before it stays on the server.
pub async fn seed_sample_data(client: &dyn SocialGraph) -> Result<SeedReport, ClientError> {
    let mut users = Vec::with_capacity(SAMPLE_USERS.len());
    for sample in &SAMPLE_USERS {
        let user = client
            .create_user(&CreateUserInput {
                name: sample.name.to_string(),
                age: sample.age,
                email: sample.email.to_string(),
            })
            .await?;
        tracing::info!(name = %user.name, id = %user.id, "created sample user");
        users.push(user);
    }

    for &(follower, followed) in &SAMPLE_FOLLOWS {
        client
            .create_follow(&CreateFollowInput {
                follower_id: users[follower].id.clone(),
                followed_id: users[followed].id.clone(),
            })
            .await?;
        tracing::info!(
            follower = %users[follower].name,
            followed = %users[followed].name,
            "created sample follow"
        );
    }

    let mut posts = Vec::with_capacity(SAMPLE_POSTS.len());
    for (user, sample) in users.iter().zip(SAMPLE_POSTS.iter()) {
        let post = client
            .create_post(&CreatePostInput {
                user_id: user.id.clone(),
                content: sample.content.to_string(),
            })
            .await?;
        posts.push(post);
    }

    for (post, sample) in posts.iter().zip(SAMPLE_POSTS.iter()) {
        client
            .create_post_embedding(&CreatePostEmbeddingInput {
                post_id: post.id.clone(),
                vector: sample.vector.to_vec(),
                content: sample.content.to_string(),
            })
            .await?;
        tracing::info!(post = %post.id, "created sample embedding");
    }

    Ok(SeedReport { users, posts })
}

/// Seeds only when the graph has no users yet, so restarting a seeding
/// server leaves a single copy of the sample data. `None` means skipped.
pub async fn seed_if_empty(client: &dyn SocialGraph) -> Result<Option<SeedReport>, ClientError> {
    let existing = client.get_users().await?;
    if !existing.is_empty() {
        tracing::info!(users = existing.len(), "graph already has users, not seeding");
        return Ok(None);
    }
    seed_sample_data(client).await.map(Some)
}

/// Startup seeding. Always talks to HelixDB directly: with the api transport
/// the gateway is the server being started, which is not listening yet.
/// Failures are logged and swallowed.
pub async fn seed_on_startup(helix_url: &str) -> Option<SeedReport> {
    let direct = HelixClient::new(DirectTransport::new(helix_url));
    match seed_if_empty(&direct).await {
        Ok(Some(report)) => {
            tracing::info!(
                users = report.users.len(),
                posts = report.posts.len(),
                "seeded sample data"
            );
            Some(report)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(error = %err, "seeding sample data failed");
            None
        }
    }
}
