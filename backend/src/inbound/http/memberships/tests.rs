//! Tests for the membership handlers.

use super::*;
use crate::domain::ports::{InvitePreview, JoinResult};
use crate::domain::test_fixtures;
use crate::domain::UserRole;
use crate::inbound::http::test_utils::{
    MockPorts, TEST_LOGIN_PATH, login_request, session_cookie, test_login,
    test_session_middleware,
};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .wrap(test_session_middleware())
        .route(TEST_LOGIN_PATH, web::post().to(test_login))
        .service(
            web::scope("/api/v1")
                .service(join_group)
                .service(approve_request)
                .service(reject_request)
                .service(change_role)
                .service(remove_member)
                .service(leave_group),
        )
}

async fn logged_in<S>(app: &S, user: &UserId) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let response = actix_test::call_service(app, login_request(user).to_request()).await;
    session_cookie(&response)
}

#[rstest]
#[actix_web::test]
async fn joining_a_private_group_reports_requested() {
    let owner = test_fixtures::user("Olive", UserRole::Member);
    let group = test_fixtures::group("Family", &owner, true);
    let joiner = UserId::random();
    let preview = InvitePreview::for_viewer(&group, &joiner);
    let mut ports = MockPorts::default();
    ports
        .membership
        .expect_join()
        .withf(|_, code| code.as_ref() == "FIXTURE1")
        .times(1)
        .returning(move |_, _| Ok(JoinResult::Requested(preview.clone())));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, &joiner).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/groups/join")
            .cookie(cookie)
            .set_json(json!({"inviteCode": " FIXTURE1 "}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["status"], "requested");
    assert_eq!(value["preview"]["name"], "Family");
    assert_eq!(value["preview"]["memberCount"], 1);
    assert!(value.get("group").is_none(), "roster stays with members");
    assert!(!value.to_string().contains("FIXTURE1"));
}

#[rstest]
#[actix_web::test]
async fn joining_a_public_group_returns_the_group() {
    let owner = test_fixtures::user("Olive", UserRole::Member);
    let group = test_fixtures::group("Soup Club", &owner, false);
    let mut ports = MockPorts::default();
    ports
        .membership
        .expect_join()
        .returning(move |_, _| Ok(JoinResult::Joined(group.clone())));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/groups/join")
            .cookie(cookie)
            .set_json(json!({"inviteCode": "FIXTURE1"}))
            .to_request(),
    )
    .await;

    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["status"], "joined");
    assert_eq!(value["group"]["name"], "Soup Club");
    assert!(value.get("preview").is_none());
}

#[rstest]
#[actix_web::test]
async fn removing_yourself_returns_no_content() {
    let member = UserId::random();
    let expected = member.clone();
    let mut ports = MockPorts::default();
    ports
        .membership
        .expect_remove_member()
        .withf(move |actor, _, target| *actor == expected && *target == expected)
        .times(1)
        .returning(|_, _, _| Ok(None));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, &member).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/groups/{}/members/{member}", GroupId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(actix_test::read_body(response).await.is_empty());
}

#[rstest]
#[actix_web::test]
async fn approve_passes_group_and_requester() {
    let owner = test_fixtures::user("Olive", UserRole::Member);
    let group = test_fixtures::group("Family", &owner, true);
    let group_id = group.id().clone();
    let requester = UserId::random();
    let expected = (group_id.clone(), requester.clone());
    let mut ports = MockPorts::default();
    ports
        .membership
        .expect_approve_request()
        .withf(move |_, group, user| *group == expected.0 && *user == expected.1)
        .times(1)
        .returning(move |_, _, _| Ok(group.clone()));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, owner.id()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!(
                "/api/v1/groups/{group_id}/requests/{requester}/approve"
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn removing_the_owner_is_unprocessable() {
    let mut ports = MockPorts::default();
    ports.membership.expect_remove_member().returning(|_, _, _| {
        Err(Error::domain_invariant(
            "the group owner cannot be removed or demoted",
        ))
    });
    let app = actix_test::init_service(test_app(ports)).await;
    let owner = UserId::random();
    let cookie = logged_in(&app, &owner).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/groups/{}/members/{owner}", GroupId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["code"], "domain_invariant");
}

#[rstest]
#[case("owner")]
#[case("superuser")]
#[actix_web::test]
async fn unassignable_roles_never_reach_the_port(#[case] role: &str) {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let cookie = logged_in(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/groups/{}/members/{}/role",
                GroupId::random(),
                UserId::random()
            ))
            .cookie(cookie)
            .set_json(json!({"role": role}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn role_changes_are_forwarded() {
    let owner = test_fixtures::user("Olive", UserRole::Member);
    let group = test_fixtures::group("Family", &owner, false);
    let mut ports = MockPorts::default();
    ports
        .membership
        .expect_change_role()
        .withf(|_, _, _, role| *role == AssignableRole::Admin)
        .times(1)
        .returning(move |_, _, _, _| Ok(group.clone()));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, owner.id()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/groups/{}/members/{}/role",
                GroupId::random(),
                UserId::random()
            ))
            .cookie(cookie)
            .set_json(json!({"role": "admin"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn leaving_returns_no_content() {
    let mut ports = MockPorts::default();
    ports
        .membership
        .expect_leave()
        .times(1)
        .returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/groups/{}/leave", GroupId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn malformed_member_ids_are_rejected() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let cookie = logged_in(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!(
                "/api/v1/groups/{}/requests/nobody/reject",
                GroupId::random()
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["details"]["field"], "userId");
}
