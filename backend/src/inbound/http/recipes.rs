//! Recipe API handlers.
//!
//! ```text
//! GET    /api/v1/recipes?q=lasagne&category=dinner&difficulty=easy&group={id}
//! POST   /api/v1/recipes
//! GET    /api/v1/recipes/{id}
//! PUT    /api/v1/recipes/{id}
//! DELETE /api/v1/recipes/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{Error, RecipeContent, RecipeFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipes_dto::{RecipeListQuery, RecipeRequest, RecipeResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_recipe_id};

/// Recipes the caller may read, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Matching recipes", body = [RecipeResponse]),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Vec<RecipeResponse>>> {
    let actor = session.require_user()?;
    let filter = RecipeFilter::try_from(query.into_inner())?;
    let recipes = state.recipes_query.list(&actor, filter).await?;
    Ok(web::Json(recipes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a member of the target group", body = Error),
        (status = 404, description = "Target group not found", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let content = RecipeContent::try_from(payload.into_inner())?;
    let recipe = state.recipes.create(&actor, content).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from(recipe)))
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not visible to the caller", body = Error),
        (status = 404, description = "Recipe not found", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe"
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let actor = session.require_user()?;
    let recipe_id = parse_recipe_id(&path.into_inner(), FieldName::new("id"))?;
    let recipe = state.recipes_query.get(&actor, &recipe_id).await?;
    Ok(web::Json(recipe.into()))
}

/// Replace a recipe's content. Author and moderation state are kept.
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Author or platform admin only", body = Error),
        (status = 404, description = "Recipe not found", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[put("/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let actor = session.require_user()?;
    let recipe_id = parse_recipe_id(&path.into_inner(), FieldName::new("id"))?;
    let content = RecipeContent::try_from(payload.into_inner())?;
    let recipe = state.recipes.update(&actor, &recipe_id, content).await?;
    Ok(web::Json(recipe.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Author or platform admin only", body = Error),
        (status = 404, description = "Recipe not found", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let recipe_id = parse_recipe_id(&path.into_inner(), FieldName::new("id"))?;
    state.recipes.delete(&actor, &recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
