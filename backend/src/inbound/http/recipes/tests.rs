//! Tests for the recipe handlers.

use super::*;
use crate::domain::test_fixtures;
use crate::domain::{Category, Difficulty, UserId, UserRole};
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
                .service(list_recipes)
                .service(create_recipe)
                .service(get_recipe)
                .service(update_recipe)
                .service(delete_recipe),
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

fn lasagne_body() -> Value {
    json!({
        "title": "Weeknight lasagne",
        "description": "Layers of pasta, ragu and bechamel",
        "ingredients": [{"name": "Pasta sheets", "quantity": "12"}],
        "steps": [{"number": 1, "description": "Layer and bake"}],
        "prepTime": 20,
        "cookTime": 40,
        "servings": 4,
        "category": "dinner",
        "difficulty": "medium",
        "tags": ["Pasta"],
    })
}

#[rstest]
#[actix_web::test]
async fn list_passes_the_parsed_filter() {
    let author = test_fixtures::user("Ada", UserRole::Member);
    let recipe = test_fixtures::recipe("Lasagne", &author, None);
    let mut ports = MockPorts::default();
    ports
        .recipes_query
        .expect_list()
        .withf(|_, filter| {
            filter.category == Some(Category::Dinner)
                && filter.difficulty == Some(Difficulty::Easy)
                && filter.query.as_ref().is_some_and(|q| q.matches("LASAGNE"))
        })
        .times(1)
        .returning(move |_, _| Ok(vec![recipe.clone()]));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, author.id()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/recipes?q=lasa&category=dinner&difficulty=easy")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value[0]["title"], "Lasagne");
    assert_eq!(value[0]["category"], "lunch");
}

#[rstest]
#[actix_web::test]
async fn unknown_filter_values_are_rejected() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let cookie = logged_in(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/recipes?difficulty=impossible")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn create_returns_201_with_pending_moderation() {
    let author = test_fixtures::user("Ada", UserRole::Member);
    let author_id = author.id().clone();
    let mut ports = MockPorts::default();
    ports
        .recipes
        .expect_create()
        .withf(|_, content| content.tags == vec!["pasta".to_owned()])
        .times(1)
        .returning(move |_, _| Ok(test_fixtures::recipe("Weeknight lasagne", &author, None)));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, &author_id).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .cookie(cookie)
            .set_json(lasagne_body())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["moderationStatus"], "pending");
    assert_eq!(value["author"], author_id.to_string());
    assert_eq!(value["revision"], 1);
}

#[rstest]
#[case("steps", json!([{"number": 2, "description": "Out of order"}]))]
#[case("ingredients", json!([]))]
#[case("prepTime", json!(3_000_000_000_u64))]
#[case("servings", json!(5_000))]
#[actix_web::test]
async fn invalid_content_is_rejected(#[case] field: &str, #[case] replacement: Value) {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let cookie = logged_in(&app, &UserId::random()).await;
    let mut body = lasagne_body();
    body[field] = replacement;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn hidden_recipes_are_forbidden() {
    let mut ports = MockPorts::default();
    ports
        .recipes_query
        .expect_get()
        .returning(|_, _| Err(Error::forbidden("recipe is not visible")));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/recipes/{}", crate::domain::RecipeId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn delete_returns_no_content() {
    let mut ports = MockPorts::default();
    ports
        .recipes
        .expect_delete()
        .times(1)
        .returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = logged_in(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/recipes/{}", crate::domain::RecipeId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
