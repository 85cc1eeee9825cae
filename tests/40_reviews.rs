mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{id_of, review_body, spawn_app, wait_for_field};

#[tokio::test]
async fn one_review_per_user_and_bootcamp() -> Result<()> {
    let app = spawn_app().await?;
    let owner = app.register("Owner", "owner@gmail.com", "publisher").await?;
    let reviewer = app.register("Reviewer", "reviewer@gmail.com", "user").await?;
    let camp = app.create_bootcamp(&owner, "Devworks", "Boston").await?;
    let path = format!("/api/v1/bootcamps/{camp}/reviews");

    let res = app.post(&path).bearer_auth(&reviewer).json(&review_body("Great", 8)).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.post(&path).bearer_auth(&reviewer).json(&review_body("Again", 2)).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "You have already reviewed this bootcamp");
    Ok(())
}

#[tokio::test]
async fn publishers_cannot_review() -> Result<()> {
    let app = spawn_app().await?;
    let owner = app.register("Owner", "owner@gmail.com", "publisher").await?;
    let camp = app.create_bootcamp(&owner, "Devworks", "Boston").await?;

    let res = app
        .post(&format!("/api/v1/bootcamps/{camp}/reviews"))
        .bearer_auth(&owner)
        .json(&review_body("My own camp is great", 10))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "User does not have permission to modify this resource");
    Ok(())
}

#[tokio::test]
async fn review_validation() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    let camp = app.create_bootcamp(&admin, "Devworks", "Boston").await?;

    let res = app
        .post(&format!("/api/v1/bootcamps/{camp}/reviews"))
        .bearer_auth(&admin)
        .json(&json!({ "title": "t".repeat(101), "rating": 11 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("Text is required."));
    assert!(error.contains("Title cannot exceed 100 characters."));
    assert!(error.contains("Please choose a rating between 1 and 10."));
    Ok(())
}

#[tokio::test]
async fn average_rating_tracks_reviews() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    let first = app.register("First", "first@gmail.com", "user").await?;
    let second = app.register("Second", "second@gmail.com", "user").await?;
    let camp = app.create_bootcamp(&admin, "Devworks", "Boston").await?;
    let path = format!("/api/v1/bootcamps/{camp}/reviews");

    let res = app.post(&path).bearer_auth(&first).json(&review_body("Good", 8)).send().await?;
    let review = id_of(&res.json::<Value>().await?)?;
    wait_for_field(&app, &camp, "averageRating", json!(8.0)).await?;

    app.post(&path).bearer_auth(&second).json(&review_body("Okay", 5)).send().await?;
    wait_for_field(&app, &camp, "averageRating", json!(6.5)).await?;

    let res = app
        .put(&format!("/api/v1/reviews/{review}"))
        .bearer_auth(&first)
        .json(&json!({ "rating": 10 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    wait_for_field(&app, &camp, "averageRating", json!(7.5)).await?;

    let res = app.delete(&format!("/api/v1/reviews/{review}")).bearer_auth(&first).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    wait_for_field(&app, &camp, "averageRating", json!(5.0)).await?;
    Ok(())
}

#[tokio::test]
async fn review_ownership() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    let author = app.register("Author", "author@gmail.com", "user").await?;
    let other = app.register("Other", "other@gmail.com", "user").await?;
    let camp = app.create_bootcamp(&admin, "Devworks", "Boston").await?;

    let res = app
        .post(&format!("/api/v1/bootcamps/{camp}/reviews"))
        .bearer_auth(&author)
        .json(&review_body("Mine", 7))
        .send()
        .await?;
    let review = id_of(&res.json::<Value>().await?)?;
    let path = format!("/api/v1/reviews/{review}");

    let res = app.put(&path).bearer_auth(&other).json(&json!({ "title": "Hijacked" })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.put(&path).bearer_auth(&admin).json(&json!({ "title": "Moderated" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = app.get(&path).send().await?.json().await?;
    assert_eq!(body["data"]["title"], "Moderated");
    assert_eq!(body["data"]["bootcamp"]["name"], "Devworks");
    Ok(())
}

#[tokio::test]
async fn nested_review_listing() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    let reviewer = app.register("Reviewer", "reviewer@gmail.com", "user").await?;
    let camp = app.create_bootcamp(&admin, "Devworks", "Boston").await?;
    let empty = app.create_bootcamp(&admin, "Quiet Camp", "Lowell").await?;

    app.post(&format!("/api/v1/bootcamps/{camp}/reviews"))
        .bearer_auth(&reviewer)
        .json(&review_body("Solid", 7))
        .send()
        .await?;

    let body: Value = app.get(&format!("/api/v1/bootcamps/{camp}/reviews")).send().await?.json().await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["rating"], 7);

    let res = app.get(&format!("/api/v1/bootcamps/{empty}/reviews")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
    Ok(())
}
