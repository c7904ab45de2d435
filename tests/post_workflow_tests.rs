mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::TestApp;
use esgconnect::entities::PostStatus;
use esgconnect::store;
use esgconnect::workflow::{self, PostContent, ReviewDecision};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_ecofarm_scenario() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;

    // A status in the request body is ignored
    let (status, body) = app
        .post(
            "/api/posts/create",
            Some(&owner.token),
            json!({ "title": "EcoFarm", "investmentNeeded": 5000, "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["title"], "EcoFarm");
    assert_eq!(body["businessName"], "EcoFarm");
    assert_eq!(body["investmentNeeded"], 5000);
    assert_eq!(body["createdBy"]["id"], owner.id.to_string());
    assert!(body["approvedBy"].is_null());
    let id = body["id"].as_str().unwrap().to_string();

    assert!(app.public_titles().await.is_empty());

    let (status, body) = app.review(&admin, &id, json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approvedBy"]["id"], admin.id.to_string());
    assert_eq!(body["approvedBy"]["name"], "Ada Admin");

    assert_eq!(app.public_titles().await, vec!["EcoFarm".to_string()]);

    // Approved listings are frozen for their owner
    let (status, body) = app
        .put(
            &format!("/api/posts/{}", id),
            Some(&owner.token),
            json!({ "title": "EcoFarm 2.0", "investmentNeeded": 9000 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Approved posts cannot be edited");
    assert_eq!(app.public_titles().await, vec!["EcoFarm".to_string()]);
}

#[tokio::test]
async fn test_rejection_requires_reason_and_is_stored_verbatim() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let id = app.create_post(&owner, "Solar Village").await;

    let (status, _) = app.review(&admin, &id, json!({ "status": "rejected" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = app.get(&format!("/api/posts/{}", id), None).await;
    assert_eq!(body["status"], "pending");
    assert!(body["approvedBy"].is_null());

    let (status, _) = app
        .review(&admin, &id, json!({ "status": "rejected", "rejectionReason": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let reason = "Missing impact metrics. Please add CO2 figures.";
    let (status, body) = app
        .review(&admin, &id, json!({ "status": "rejected", "rejectionReason": reason }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["rejectionReason"], reason);
    assert_eq!(body["approvedBy"]["id"], admin.id.to_string());
}

#[tokio::test]
async fn test_invalid_review_status_is_rejected() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let id = app.create_post(&owner, "Wind Co-op").await;

    for bad in ["pending", "APPROVED", ""] {
        let (status, body) = app.review(&admin, &id, json!({ "status": bad })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "status {:?}", bad);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid request"));
    }
}

#[tokio::test]
async fn test_review_of_reviewed_post_fails_without_mutation() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let superadmin = app.superadmin().await;
    let id = app.approved_post(&owner, &admin, "Clean Water Ltd").await;

    let (status, body) = app
        .review(&superadmin, &id, json!({ "status": "rejected", "rejectionReason": "changed my mind" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Post has already been reviewed");

    let (_, body) = app.get(&format!("/api/posts/{}", id), None).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approvedBy"]["id"], admin.id.to_string());
    assert!(body.get("rejectionReason").is_none());
}

#[tokio::test]
async fn test_edit_of_rejected_post_resets_review() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let id = app.create_post(&owner, "Bamboo Homes").await;
    app.review(&admin, &id, json!({ "status": "rejected", "rejectionReason": "Too vague" }))
        .await;

    let (status, body) = app
        .put(
            &format!("/api/posts/{}", id),
            Some(&owner.token),
            json!({ "businessName": "Bamboo Homes Kenya", "description": "Now with numbers", "investmentNeeded": 12000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["title"], "Bamboo Homes Kenya");
    assert_eq!(body["businessName"], "Bamboo Homes Kenya");
    assert_eq!(body["investmentNeeded"], 12000);
    assert!(body["approvedBy"].is_null());
    assert!(body.get("rejectionReason").is_none());

    // Back in the queue, so it can be reviewed again
    let (status, body) = app.review(&admin, &id, json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
}

#[tokio::test]
async fn test_edit_of_pending_post_and_validation() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let id = app.create_post(&owner, "Compost Hub").await;

    let (status, body) = app
        .put(&format!("/api/posts/{}", id), Some(&owner.token), json!({ "title": "Compost Hub+" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    let (status, _) = app
        .put(&format!("/api/posts/{}", id), Some(&owner.token), json!({ "description": "no title" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            &format!("/api/posts/{}", id),
            Some(&owner.token),
            json!({ "title": "Compost Hub", "investmentNeeded": -10 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_owner_may_edit_or_delete() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let other = app.register("Other Owner", "other@example.com", "business_owner").await;
    let id = app.create_post(&owner, "Green Bricks").await;

    let (status, body) = app
        .put(&format!("/api/posts/{}", id), Some(&other.token), json!({ "title": "Hijacked" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to update this post");

    let (status, body) = app.delete(&format!("/api/posts/{}", id), Some(&other.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to delete this post");

    let (_, body) = app.get(&format!("/api/posts/{}", id), None).await;
    assert_eq!(body["title"], "Green Bricks");
}

#[tokio::test]
async fn test_delete_rules() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;

    let approved = app.approved_post(&owner, &admin, "Reef Restoration").await;
    let (status, body) = app.delete(&format!("/api/posts/{}", approved), Some(&owner.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Approved posts cannot be deleted");
    let (status, _) = app.get(&format!("/api/posts/{}", approved), None).await;
    assert_eq!(status, StatusCode::OK);

    let pending = app.create_post(&owner, "Draft Listing").await;
    let (status, body) = app.delete(&format!("/api/posts/{}", pending), Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post deleted successfully");
    let (status, _) = app.get(&format!("/api/posts/{}", pending), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let rejected = app.create_post(&owner, "Rejected Listing").await;
    app.review(&admin, &rejected, json!({ "status": "rejected", "rejectionReason": "no" }))
        .await;
    let (status, _) = app.delete(&format!("/api/posts/{}", rejected), Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/api/posts/{}", rejected), Some(&owner.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_views() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let superadmin = app.superadmin().await;

    let approved = app.approved_post(&owner, &admin, "Approved One").await;
    let rejected = app.create_post(&owner, "Rejected One").await;
    app.review(&admin, &rejected, json!({ "status": "rejected", "rejectionReason": "thin" }))
        .await;
    let pending = app.create_post(&owner, "Pending One").await;

    let (status, body) = app.get("/api/posts/user/posts", Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = app.get("/api/posts/admin/pending", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![pending.as_str()]);

    let (status, body) = app.get("/api/posts/admin/history", Some(&superadmin.token)).await;
    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<&str> = body.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    ids.sort();
    let mut expected = vec![approved.as_str(), rejected.as_str()];
    expected.sort();
    assert_eq!(ids, expected);

    assert_eq!(app.public_titles().await, vec!["Approved One".to_string()]);
}

#[tokio::test]
async fn test_public_listing_pagination() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    for title in ["A", "B", "C"] {
        app.approved_post(&owner, &admin, title).await;
    }

    let (status, body) = app.get("/api/posts?page=1&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["currentPage"], 1);

    let (_, body) = app.get("/api/posts?page=2&limit=2", None).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert_eq!(body["currentPage"], 2);

    // Garbage falls back to the defaults
    let (status, body) = app.get("/api/posts?page=zero&limit=-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"].as_array().unwrap().len(), 3);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["currentPage"], 1);
}

#[tokio::test]
async fn test_role_gates() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let investor = app.investor().await;
    let admin = app.admin().await;
    let id = app.create_post(&owner, "Gated").await;

    let (status, _) = app
        .post("/api/posts/create", Some(&investor.token), json!({ "title": "Nope" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post("/api/posts/create", None, json!({ "title": "Nope" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.review(&owner, &id, json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/posts/admin/pending", Some(&investor.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/posts/admin/history", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/posts/{}", id), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The gate runs before the workflow: nothing changed
    let (_, body) = app.get(&format!("/api/posts/{}", id), None).await;
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_missing_post_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let missing = Uuid::new_v4().to_string();

    let (status, body) = app.get(&format!("/api/posts/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found");

    let (status, _) = app.review(&admin, &missing, json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_huge_page_is_empty_not_a_crash() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    app.approved_post(&owner, &admin, "Only One").await;

    let (status, body) = app.get("/api/posts?page=18446744073709551615&limit=100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["posts"].as_array().unwrap().is_empty());
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["currentPage"], u64::MAX);

    let (status, body) = app.get("/api/posts?page=2&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_input_is_bad_request() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let id = app.create_post(&owner, "Typed").await;

    let (status, body) = app.review(&admin, &id, json!({ "rejectionReason": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request"));

    let (status, body) = app
        .post(
            "/api/posts/create",
            Some(&owner.token),
            json!({ "title": "Typed", "investmentNeeded": "5000" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = app.get("/api/posts/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request"));

    let (_, body) = app.get(&format!("/api/posts/{}", id), None).await;
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_stale_review_writes_nothing() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let superadmin = app.superadmin().await;
    let id: Uuid = app.create_post(&owner, "Contested").await.parse().unwrap();

    // Decided against the pending snapshot, written after someone else approved
    let snapshot = store::posts::find_by_id(&app.state.db, id).await.unwrap().unwrap();
    let change = workflow::review(
        &snapshot,
        superadmin.id,
        ReviewDecision::Reject { reason: "late".to_string() },
    )
    .unwrap();
    let (status, _) = app.review(&admin, &id.to_string(), json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::OK);

    let written = store::posts::apply_change(&app.state.db, id, &change, None, Utc::now())
        .await
        .unwrap();
    assert!(written.is_none());

    let current = store::posts::find_by_id(&app.state.db, id).await.unwrap().unwrap();
    assert_eq!(current.status, PostStatus::Approved);
    assert_eq!(current.approved_by, Some(admin.id));
    assert!(current.rejection_reason.is_none());
}

#[tokio::test]
async fn test_stale_edit_and_delete_write_nothing() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let id: Uuid = app.create_post(&owner, "Frozen").await.parse().unwrap();

    let snapshot = store::posts::find_by_id(&app.state.db, id).await.unwrap().unwrap();
    let edit = workflow::edit(&snapshot, owner.id).unwrap();
    let delete = workflow::delete(&snapshot, owner.id).unwrap();
    app.review(&admin, &id.to_string(), json!({ "status": "approved" })).await;

    let content = PostContent::new(Some("Thawed".to_string()), None, None, None, None, Some(1)).unwrap();
    let written = store::posts::apply_change(&app.state.db, id, &edit, Some(content), Utc::now())
        .await
        .unwrap();
    assert!(written.is_none());

    let deleted = store::posts::delete_if(&app.state.db, id, &delete).await.unwrap();
    assert!(!deleted);

    let current = store::posts::find_by_id(&app.state.db, id).await.unwrap().unwrap();
    assert_eq!(current.status, PostStatus::Approved);
    assert_eq!(current.title, "Frozen");
}

#[tokio::test]
async fn test_concurrent_reviews_have_one_winner() {
    let app = TestApp::new().await;
    let owner = app.owner().await;
    let admin = app.admin().await;
    let superadmin = app.superadmin().await;
    let id = app.create_post(&owner, "Raced").await;

    let (first, second) = tokio::join!(
        app.review(&admin, &id, json!({ "status": "approved" })),
        app.review(&superadmin, &id, json!({ "status": "rejected", "rejectionReason": "no" })),
    );
    let mut statuses = vec![first.0.as_u16(), second.0.as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 409]);

    let (_, body) = app.get(&format!("/api/posts/{}", id), None).await;
    let winner = if first.0 == StatusCode::OK { &first.1 } else { &second.1 };
    assert_eq!(body["status"], winner["status"]);
}
