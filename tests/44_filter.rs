mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{bootcamp_body, course_body, id_of, spawn_app, wait_for_field, TestApp};

/// Alpha (Boston, 02118), Beta (Cambridge, no housing, mobile only) and
/// Gamma (Lowell). Returns their ids in that order.
async fn seed_three(app: &TestApp, token: &str) -> Result<[String; 3]> {
    let alpha = app.create_bootcamp(token, "Alpha Camp", "233 Bay State Rd Boston MA 02118").await?;

    let mut beta = bootcamp_body("Beta Camp", "77 Massachusetts Ave Cambridge MA");
    beta["careers"] = json!(["Mobile Development"]);
    beta["housing"] = json!(false);
    let res = app.post("/api/v1/bootcamps").bearer_auth(token).json(&beta).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let beta = id_of(&res.json::<Value>().await?)?;

    let gamma = app.create_bootcamp(token, "Gamma Camp", "1 Merrimack St Lowell MA").await?;
    Ok([alpha, beta, gamma])
}

fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn list(app: &TestApp, query: &str) -> Result<Value> {
    let res = app.get(&format!("/api/v1/bootcamps?{query}")).send().await?;
    assert_eq!(res.status(), StatusCode::OK, "query {query}");
    Ok(res.json::<Value>().await?)
}

#[tokio::test]
async fn equality_and_membership_filters() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    seed_three(&app, &admin).await?;

    assert_eq!(names(&list(&app, "housing=false").await?), vec!["Beta Camp"]);
    assert_eq!(names(&list(&app, "careers=Mobile%20Development").await?), vec!["Beta Camp"]);

    let body = list(&app, "careers[in]=Mobile%20Development,Business&sort=name").await?;
    assert_eq!(names(&body), vec!["Alpha Camp", "Beta Camp", "Gamma Camp"]);
    Ok(())
}

#[tokio::test]
async fn leading_zero_values_stay_text() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    seed_three(&app, &admin).await?;

    let body = list(&app, "location.zipcode=02118").await?;
    assert_eq!(names(&body), vec!["Alpha Camp"]);
    Ok(())
}

#[tokio::test]
async fn numeric_comparisons() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    let [alpha, beta, _] = seed_three(&app, &admin).await?;

    for (camp, tuition) in [(&alpha, 8000.0), (&beta, 12000.0)] {
        let res = app
            .post(&format!("/api/v1/bootcamps/{camp}/courses"))
            .bearer_auth(&admin)
            .json(&course_body("Full Stack", tuition))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        wait_for_field(&app, camp, "averageCost", json!(tuition)).await?;
    }

    assert_eq!(names(&list(&app, "averageCost[lte]=10000").await?), vec!["Alpha Camp"]);
    assert_eq!(names(&list(&app, "averageCost[gt]=10000").await?), vec!["Beta Camp"]);
    assert_eq!(
        names(&list(&app, "averageCost[gte]=8000&sort=-averageCost").await?),
        vec!["Beta Camp", "Alpha Camp"]
    );

    let res = app.get("/api/v1/courses?tuition[lt]=10000").send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["tuition"], json!(8000.0));
    Ok(())
}

#[tokio::test]
async fn select_and_sort() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    seed_three(&app, &admin).await?;

    let body = list(&app, "select=name,housing&sort=-name").await?;
    assert_eq!(names(&body), vec!["Gamma Camp", "Beta Camp", "Alpha Camp"]);

    let first = body["data"][0].as_object().unwrap();
    let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["housing", "id", "name"]);
    Ok(())
}

#[tokio::test]
async fn pagination_links_follow_the_filtered_total() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    seed_three(&app, &admin).await?;

    let body = list(&app, "sort=name&limit=2").await?;
    assert_eq!(body["count"], 2);
    assert_eq!(names(&body), vec!["Alpha Camp", "Beta Camp"]);
    assert_eq!(body["pagination"]["next"], json!({ "page": 2, "limit": 2 }));
    assert!(body["pagination"]["previous"].is_null());

    let body = list(&app, "sort=name&limit=2&page=2").await?;
    assert_eq!(names(&body), vec!["Gamma Camp"]);
    assert_eq!(body["pagination"]["previous"], json!({ "page": 1, "limit": 2 }));
    assert!(body["pagination"]["next"].is_null());

    // Two bootcamps offer housing, so one page of two has nowhere to go.
    let body = list(&app, "housing=true&limit=2").await?;
    assert_eq!(body["count"], 2);
    assert!(body["pagination"]["next"].is_null());
    Ok(())
}

#[tokio::test]
async fn empty_results_are_not_errors() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    seed_three(&app, &admin).await?;

    let body = list(&app, "name=Nowhere%20Camp").await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn unknown_operator_is_rejected() -> Result<()> {
    let app = spawn_app().await?;

    let res = app.get("/api/v1/bootcamps?averageCost[where]=1").send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unsupported operator: where");
    Ok(())
}

#[tokio::test]
async fn radius_search_accepts_filters() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    seed_three(&app, &admin).await?;

    let body: Value = app.get("/api/v1/bootcamps/02118/30?sort=name").send().await?.json().await?;
    assert_eq!(names(&body), vec!["Alpha Camp", "Beta Camp", "Gamma Camp"]);

    let body: Value = app.get("/api/v1/bootcamps/02118/30?housing=false").send().await?.json().await?;
    assert_eq!(names(&body), vec!["Beta Camp"]);
    Ok(())
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() -> Result<()> {
    let app = spawn_app().await?;
    let admin = app.admin().await?;
    seed_three(&app, &admin).await?;

    let body = list(&app, "page=9223372036854775807&limit=20").await?;
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
    assert_eq!(
        body["pagination"]["previous"],
        json!({ "page": 9223372036854775806u64, "limit": 20 })
    );
    assert!(body["pagination"]["next"].is_null());
    Ok(())
}
