//! The scripted quickstart: seed the sample graph, then read it back through
//! every query and print what came back.

use std::io::Write;

use anyhow::Context;

use crate::client::SocialGraph;
use crate::core::db::{seed_sample_data, SAMPLE_FOLLOWS, SAMPLE_POSTS};
use crate::models::queries::SearchInput;
use crate::models::{Post, User};

#[derive(Debug, Clone)]
pub struct WalkthroughReport {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub alice_posts: Vec<Post>,
    pub alice_following: Vec<User>,
    pub bob_followers: Vec<User>,
    pub nearest: Vec<Post>,
}

fn print_users(out: &mut dyn Write, heading: &str, users: &[User]) -> std::io::Result<()> {
    writeln!(out, "\n{} ({}):", heading, users.len())?;
    for user in users {
        writeln!(out, "  - {} ({}), {} [{}]", user.name, user.age, user.email, user.id)?;
    }
    Ok(())
}

fn print_posts(out: &mut dyn Write, heading: &str, posts: &[Post]) -> std::io::Result<()> {
    writeln!(out, "\n{} ({}):", heading, posts.len())?;
    for post in posts {
        writeln!(out, "  - {} [{}]", post.content, post.id)?;
    }
    Ok(())
}

/// Runs every call in order and stops at the first failure.
pub async fn run_walkthrough(client: &dyn SocialGraph, out: &mut dyn Write) -> anyhow::Result<WalkthroughReport> {
    writeln!(out, "HelixDB quickstart using the {} transport", client.transport_name())?;

    let seeded = seed_sample_data(client).await.context("Failed to seed sample data")?;
    let alice = &seeded.users[0];
    let bob = &seeded.users[1];
    writeln!(
        out,
        "Created {} users, {} follows and {} posts with embeddings.",
        seeded.users.len(),
        SAMPLE_FOLLOWS.len(),
        seeded.posts.len()
    )?;

    let users = client.get_users().await.context("getUsers failed")?;
    print_users(out, "All users", &users)?;

    let posts = client.get_posts().await.context("getPosts failed")?;
    print_posts(out, "All posts", &posts)?;

    let alice_posts = client
        .get_posts_by_user(&alice.id)
        .await
        .context("getPostsByUser failed")?;
    print_posts(out, &format!("Posts by {}", alice.name), &alice_posts)?;

    let alice_following = client.get_following(&alice.id).await.context("getFollowing failed")?;
    print_users(out, &format!("{} follows", alice.name), &alice_following)?;

    let bob_followers = client.get_followers(&bob.id).await.context("getFollowers failed")?;
    print_users(out, &format!("Followers of {}", bob.name), &bob_followers)?;

    let query = SearchInput {
        vector: SAMPLE_POSTS[0].vector.to_vec(),
        k: 1,
    };
    let nearest = client
        .search_post_embeddings(&query)
        .await
        .context("searchPostEmbeddings failed")?;
    print_posts(out, &format!("Nearest post to {:?}", query.vector), &nearest)?;

    tracing::info!("walkthrough finished");
    Ok(WalkthroughReport {
        users,
        posts,
        alice_posts,
        alice_following,
        bob_followers,
        nearest,
    })
}
