//! Tests for recipe content validation.

use super::*;
use crate::domain::{ModerationStatus, UserRole};
use rstest::{fixture, rstest};

#[fixture]
fn fields() -> RecipeFields {
    RecipeFields {
        title: "Pasta al pomodoro".to_owned(),
        description: "Weeknight pasta with a quick tomato sauce".to_owned(),
        ingredients: vec![Ingredient {
            name: " Spaghetti ".to_owned(),
            quantity: "200".to_owned(),
            unit: "g".to_owned(),
        }],
        steps: vec![
            Step {
                number: 1,
                description: "Boil the pasta".to_owned(),
            },
            Step {
                number: 2,
                description: "Toss with sauce".to_owned(),
            },
        ],
        prep_time: 10,
        cook_time: 0,
        servings: 2,
        category: Some(Category::Dinner),
        difficulty: Some(Difficulty::Easy),
        tags: vec!["Italian".to_owned(), " italian ".to_owned(), String::new()],
        image: None,
        group: None,
        is_private: false,
    }
}

#[rstest]
fn valid_fields_are_normalised(fields: RecipeFields) {
    let content = RecipeContent::try_from(fields).expect("valid recipe");
    assert_eq!(content.ingredients[0].name, "Spaghetti");
    assert_eq!(content.tags, vec!["italian".to_owned()]);
    assert_eq!(content.cook_time, 0);
}

#[rstest]
fn steps_must_be_contiguous(mut fields: RecipeFields) {
    fields.steps[1].number = 3;
    let err = RecipeContent::try_from(fields).expect_err("gap in steps");
    assert_eq!(err.field(), "steps.number");
}

#[rstest]
#[case::no_prep_time(|f: &mut RecipeFields| f.prep_time = 0, "prepTime")]
#[case::no_servings(|f: &mut RecipeFields| f.servings = 0, "servings")]
#[case::endless_prep(|f: &mut RecipeFields| f.prep_time = 3_000_000_000, "prepTime")]
#[case::endless_cook(|f: &mut RecipeFields| f.cook_time = MAX_MINUTES + 1, "cookTime")]
#[case::crowd_servings(|f: &mut RecipeFields| f.servings = u32::MAX, "servings")]
#[case::no_ingredients(|f: &mut RecipeFields| f.ingredients.clear(), "ingredients")]
#[case::no_steps(|f: &mut RecipeFields| f.steps.clear(), "steps")]
#[case::no_category(|f: &mut RecipeFields| f.category = None, "category")]
#[case::short_title(|f: &mut RecipeFields| f.title = "ab".to_owned(), "title")]
#[case::bad_image(|f: &mut RecipeFields| f.image = Some("nope".to_owned()), "image")]
fn invalid_fields_name_the_culprit(
    mut fields: RecipeFields,
    #[case] mutate: fn(&mut RecipeFields),
    #[case] field: &str,
) {
    mutate(&mut fields);
    let err = RecipeContent::try_from(fields).expect_err("invalid recipe");
    assert_eq!(err.field(), field);
}

#[rstest]
fn update_keeps_author_and_moderation(fields: RecipeFields) {
    let author = Actor::new(UserId::random(), UserRole::Member);
    let content = RecipeContent::try_from(fields.clone()).expect("valid");
    let mut recipe = Recipe::create(RecipeId::random(), content, &author, Utc::now());

    let mut changed = fields;
    changed.title = "Pasta alla norma".to_owned();
    recipe.update_content(RecipeContent::try_from(changed).expect("valid"));

    assert_eq!(recipe.title(), "Pasta alla norma");
    assert_eq!(recipe.author(), author.id());
    assert_eq!(recipe.moderation().status(), ModerationStatus::Pending);
}

#[rstest]
#[case("breakfast", Some(Category::Breakfast))]
#[case("drink", Some(Category::Drink))]
#[case("brunch", None)]
fn category_parses_known_values(#[case] raw: &str, #[case] expected: Option<Category>) {
    assert_eq!(Category::parse(raw), expected);
}
