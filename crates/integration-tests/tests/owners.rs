//! Owner management and restaurant assignment across admins.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use resman_integration_tests::{TestServer, ids_of};

#[tokio::test]
async fn test_list_owners_is_scoped_to_creator() {
    let server = TestServer::spawn().await;
    let root = server.token_for("superAdmin", "root@x.com").await;
    let a = server.token_for("admin", "a@x.com").await;
    let b = server.token_for("admin", "b@x.com").await;

    let (o1, _) = server.owner(&a, "o1@x.com").await;
    let (o2, _) = server.owner(&b, "o2@x.com").await;
    let (o3, _) = server.owner(&a, "o3@x.com").await;

    let mine = server.get("/manage/owners", &a).await;
    assert_eq!(mine.status, 200);
    assert_eq!(ids_of(&mine), vec![json!(o1), json!(o3)]);

    let all = server.get("/manage/owners", &root).await;
    assert_eq!(ids_of(&all), vec![json!(o1), json!(o2), json!(o3)]);
}

#[tokio::test]
async fn test_owner_cannot_manage_owners() {
    let server = TestServer::spawn().await;
    let a = server.token_for("admin", "a@x.com").await;
    let (_, owner) = server.owner(&a, "o1@x.com").await;

    assert_eq!(server.get("/manage/owners", &owner).await.status, 401);
    let reply = server
        .post(
            "/manage/owners",
            &owner,
            json!({ "name": "x", "email": "x@x.com", "password": "p" }),
        )
        .await;
    assert_eq!(reply.status, 401);
}

#[tokio::test]
async fn test_owner_update_by_other_admin_is_unauthorized() {
    let server = TestServer::spawn().await;
    let root = server.token_for("superAdmin", "root@x.com").await;
    let a = server.token_for("admin", "a@x.com").await;
    let b = server.token_for("admin", "b@x.com").await;
    let (owner, _) = server.owner(&a, "o1@x.com").await;
    let path = format!("/manage/owners/{owner}");

    let reply = server
        .put(&path, &b, json!({ "name": "Hijack", "email": "o1@x.com" }))
        .await;
    assert_eq!(reply.status, 401);
    assert_eq!(reply.error(), "can not update owner created by other admin");

    let reply = server
        .put(&path, &a, json!({ "name": "Renamed", "email": "o1@x.com" }))
        .await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["name"], "Renamed");

    let reply = server
        .put(&path, &root, json!({ "name": "Root edit", "email": "o1@x.com" }))
        .await;
    assert_eq!(reply.status, 200);

    let reply = server
        .put(
            "/manage/owners/no-such-owner",
            &a,
            json!({ "name": "X", "email": "x@x.com" }),
        )
        .await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error(), "owner does not exist");
}

#[tokio::test]
async fn test_assign_then_unassign_restaurant() {
    let server = TestServer::spawn().await;
    let a = server.token_for("admin", "a@x.com").await;
    let (owner, owner_token) = server.owner(&a, "o1@x.com").await;
    let r1 = server.restaurant(&a, "Vidyarthi Bhavan", 12.9453, 77.5713).await;
    let r2 = server.restaurant(&a, "MTR", 12.9551, 77.5855).await;
    let path = format!("/manage/owners/{owner}/restaurants");

    let reply = server
        .post(&path, &a, json!({ "assign": [r1, r2], "deAssign": [] }))
        .await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["msg"], "List Updated Successfully");

    let held = server.get(&path, &a).await;
    assert_eq!(ids_of(&held), vec![json!(r1), json!(r2)]);
    let seen = server.get("/manage/restaurants", &owner_token).await;
    assert_eq!(ids_of(&seen), vec![json!(r1), json!(r2)]);
    let available = server.get("/manage/available/restaurants", &a).await;
    assert_eq!(ids_of(&available), Vec::<serde_json::Value>::new());

    let reply = server
        .post(&path, &a, json!({ "assign": [], "deAssign": [r1] }))
        .await;
    assert_eq!(reply.status, 200);

    let seen = server.get("/manage/restaurants", &owner_token).await;
    assert_eq!(ids_of(&seen), vec![json!(r2)]);
    let available = server.get("/manage/available/restaurants", &a).await;
    assert_eq!(ids_of(&available), vec![json!(r1)]);
}

#[tokio::test]
async fn test_assign_reports_foreign_restaurants() {
    let server = TestServer::spawn().await;
    let a = server.token_for("admin", "a@x.com").await;
    let b = server.token_for("admin", "b@x.com").await;
    let (owner, owner_token) = server.owner(&a, "o1@x.com").await;
    let mine = server.restaurant(&a, "Mine", 12.97, 77.59).await;
    let theirs = server.restaurant(&b, "Theirs", 12.98, 77.60).await;

    let reply = server
        .post(
            &format!("/manage/owners/{owner}/restaurants"),
            &a,
            json!({ "assign": [theirs, mine, 999], "deAssign": [] }),
        )
        .await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error(), "Restaurants Deleted Except entry no. 1, 3");

    let seen = server.get("/manage/restaurants", &owner_token).await;
    assert_eq!(ids_of(&seen), vec![json!(mine)]);
}

#[tokio::test]
async fn test_other_admin_cannot_touch_owner_restaurants() {
    let server = TestServer::spawn().await;
    let a = server.token_for("admin", "a@x.com").await;
    let b = server.token_for("admin", "b@x.com").await;
    let (owner, _) = server.owner(&a, "o1@x.com").await;
    let path = format!("/manage/owners/{owner}/restaurants");

    assert_eq!(server.get(&path, &b).await.status, 401);
    let reply = server
        .post(&path, &b, json!({ "assign": [], "deAssign": [] }))
        .await;
    assert_eq!(reply.status, 401);
}

#[tokio::test]
async fn test_delete_owner_frees_restaurants() {
    let server = TestServer::spawn().await;
    let a = server.token_for("admin", "a@x.com").await;
    let b = server.token_for("admin", "b@x.com").await;
    let (o1, _) = server.owner(&a, "o1@x.com").await;
    let (o2, _) = server.owner(&b, "o2@x.com").await;
    let r = server.restaurant(&a, "Mine", 12.97, 77.59).await;
    server
        .post(
            &format!("/manage/owners/{o1}/restaurants"),
            &a,
            json!({ "assign": [r] }),
        )
        .await;

    let reply = server
        .delete(&format!("/manage/owners?id={o2},{o1}"), &a)
        .await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error(), "Owners Deleted Except entry no. 1");

    let remaining = server.get("/manage/owners", &b).await;
    assert_eq!(ids_of(&remaining), vec![json!(o2)]);
    let available = server.get("/manage/available/restaurants", &a).await;
    assert_eq!(ids_of(&available), vec![json!(r)]);

    let reply = server.delete("/manage/owners?id=", &a).await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.error(), "empty id parameter");
}
