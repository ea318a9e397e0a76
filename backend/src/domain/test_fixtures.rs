//! Builders shared by the domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    Actor, Category, Difficulty, Email, Group, GroupDetails, GroupId, Ingredient, InviteCode,
    Profile, Recipe, RecipeContent, RecipeFields, RecipeId, Step, User, UserId, UserRole,
};

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn user(name: &str, role: UserRole) -> User {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    User::new(
        UserId::random(),
        Email::new(&email).expect("fixture email"),
        role,
        Profile::try_from_parts(name, None, None).expect("fixture profile"),
        fixture_timestamp(),
    )
}

pub(crate) fn group(name: &str, owner: &User, is_private: bool) -> Group {
    let details = GroupDetails::try_from_parts(name, "A place to share favourite recipes", None, is_private)
        .expect("fixture details");
    Group::create(
        GroupId::random(),
        details,
        InviteCode::parse("FIXTURE1").expect("fixture code"),
        &Actor::from(owner),
        fixture_timestamp(),
    )
}

pub(crate) fn recipe_content(title: &str, group: Option<&GroupId>) -> RecipeContent {
    RecipeContent::try_from(RecipeFields {
        title: title.to_owned(),
        description: "A dependable recipe for any day".to_owned(),
        ingredients: vec![Ingredient {
            name: "Tomatoes".to_owned(),
            quantity: "4".to_owned(),
            unit: String::new(),
        }],
        steps: vec![Step {
            number: 1,
            description: "Chop and simmer".to_owned(),
        }],
        prep_time: 5,
        cook_time: 20,
        servings: 4,
        category: Some(Category::Lunch),
        difficulty: Some(Difficulty::Medium),
        group: group.cloned(),
        ..RecipeFields::default()
    })
    .expect("fixture recipe")
}

pub(crate) fn recipe(title: &str, author: &User, group: Option<&GroupId>) -> Recipe {
    Recipe::create(
        RecipeId::random(),
        recipe_content(title, group),
        &Actor::from(author),
        fixture_timestamp(),
    )
}
