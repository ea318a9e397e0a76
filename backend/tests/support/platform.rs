//! Domain services wired over the in-memory repositories.

// Each test binary uses a different subset of the helpers.
#![allow(dead_code)]

use std::sync::Arc;

use cookbook::domain::ports::{AccountCommand, GroupCommand};
use cookbook::domain::{
    AccountService, Category, Difficulty, Email, Group, GroupDetails, GroupId, GroupService,
    Ingredient, MembershipService, ModerationService, RecipeContent, RecipeFields, RecipeService,
    Registration, Step, User,
};
use cookbook::outbound::memory::{
    InMemoryGroupRepository, InMemoryRecipeRepository, InMemoryUserRepository,
};
use cookbook::outbound::security::{Argon2PasswordHasher, RandomInviteCodes};
use mockable::DefaultClock;

pub const ADMIN_EMAIL: &str = "admin@cookbook.test";
pub const PASSWORD: &str = "correct horse";

type Users = InMemoryUserRepository;
type Groups = InMemoryGroupRepository;
type Recipes = InMemoryRecipeRepository;

pub struct Platform {
    pub accounts: Arc<AccountService<Users>>,
    pub groups: Arc<GroupService<Users, Groups, Recipes>>,
    pub membership: Arc<MembershipService<Users, Groups>>,
    pub recipes: Arc<RecipeService<Users, Groups, Recipes>>,
    pub moderation: Arc<ModerationService<Users, Groups, Recipes>>,
}

impl Platform {
    pub fn new() -> Self {
        let users = Arc::new(Users::new());
        let groups = Arc::new(Groups::new());
        let recipes = Arc::new(Recipes::new());
        let clock = Arc::new(DefaultClock);
        let admin = Email::new(ADMIN_EMAIL).expect("valid admin e-mail");

        Self {
            accounts: Arc::new(
                AccountService::new(
                    users.clone(),
                    Arc::new(Argon2PasswordHasher::new()),
                    clock.clone(),
                )
                .with_bootstrap_admin(Some(admin)),
            ),
            groups: Arc::new(GroupService::new(
                users.clone(),
                groups.clone(),
                recipes.clone(),
                Arc::new(RandomInviteCodes),
                clock.clone(),
            )),
            membership: Arc::new(MembershipService::new(
                users.clone(),
                groups.clone(),
                clock.clone(),
            )),
            recipes: Arc::new(RecipeService::new(
                users.clone(),
                groups.clone(),
                recipes.clone(),
                clock.clone(),
            )),
            moderation: Arc::new(ModerationService::new(users, groups, recipes, clock)),
        }
    }

    pub async fn register(&self, name: &str, email: &str) -> User {
        let registration =
            Registration::try_from_parts(name, email, PASSWORD).expect("valid registration");
        self.accounts
            .register(registration)
            .await
            .expect("registration succeeds")
    }

    pub async fn admin(&self) -> User {
        self.register("Site Admin", ADMIN_EMAIL).await
    }

    pub async fn create_group(&self, owner: &User, name: &str, is_private: bool) -> Group {
        let details = GroupDetails::try_from_parts(
            name,
            "Recipes shared between friends",
            None,
            is_private,
        )
        .expect("valid group details");
        self.groups
            .create(owner.id(), details)
            .await
            .expect("group created")
    }
}

/// Minimal valid recipe content, optionally posted into `group`.
pub fn recipe_content(title: &str, group: Option<&GroupId>, is_private: bool) -> RecipeContent {
    RecipeContent::try_from(RecipeFields {
        title: title.to_owned(),
        description: "A dependable weeknight dish".to_owned(),
        ingredients: vec![Ingredient {
            name: "Tomatoes".to_owned(),
            quantity: "4".to_owned(),
            unit: String::new(),
        }],
        steps: vec![Step {
            number: 1,
            description: "Chop and simmer".to_owned(),
        }],
        prep_time: 10,
        cook_time: 20,
        servings: 2,
        category: Some(Category::Dinner),
        difficulty: Some(Difficulty::Easy),
        tags: vec!["weeknight".to_owned()],
        image: None,
        group: group.cloned(),
        is_private,
    })
    .expect("valid recipe content")
}
