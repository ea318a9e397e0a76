//! Tests for the group service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    MockGroupRepository, MockInviteCodeSource, MockRecipeRepository, MockUserRepository,
};
use crate::domain::test_fixtures::{fixture_clock, group, recipe, user};
use crate::domain::{ErrorCode, ModerationStatus, User, UserRole};
use mockall::Sequence;
use rstest::rstest;

type Service = GroupService<MockUserRepository, MockGroupRepository, MockRecipeRepository>;

fn make_service(
    users: MockUserRepository,
    groups: MockGroupRepository,
    recipes: MockRecipeRepository,
    codes: MockInviteCodeSource,
) -> Service {
    GroupService::new(
        Arc::new(users),
        Arc::new(groups),
        Arc::new(recipes),
        Arc::new(codes),
        fixture_clock(),
    )
}

fn users_knowing(actor: &User) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    let known = actor.clone();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(known.clone())));
    users
}

fn details(name: &str, is_private: bool) -> GroupDetails {
    GroupDetails::try_from_parts(name, "Shared recipes for the family", None, is_private)
        .expect("valid details")
}

fn code(raw: &str) -> InviteCode {
    InviteCode::parse(raw).expect("valid code")
}

#[rstest]
#[tokio::test]
async fn create_regenerates_code_after_lookup_collision() {
    let creator = user("Ada", UserRole::Member);
    let mut users = users_knowing(&creator);
    users.expect_add_group().times(1).return_once(|_, _| Ok(()));

    let mut seq = Sequence::new();
    let mut codes = MockInviteCodeSource::new();
    codes
        .expect_generate()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(code("TAKEN001"));
    codes
        .expect_generate()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(code("FRESH001"));

    let taken = group("Existing", &creator, false);
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_invite_code()
        .returning(move |candidate| {
            Ok((candidate.as_ref() == "TAKEN001").then(|| taken.clone()))
        });
    groups.expect_insert().times(1).return_once(|_| Ok(()));

    let service = make_service(users, groups, MockRecipeRepository::new(), codes);
    let created = service
        .create(creator.id(), details("Family", true))
        .await
        .expect("group created");

    assert_eq!(created.invite_code().as_ref(), "FRESH001");
    assert_eq!(created.moderation().status(), ModerationStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn create_retries_when_store_reports_duplicate_code() {
    let creator = user("Ada", UserRole::Member);
    let mut users = users_knowing(&creator);
    users.expect_add_group().times(1).return_once(|_, _| Ok(()));

    let mut codes = MockInviteCodeSource::new();
    codes.expect_generate().times(2).return_const(code("RACE0001"));

    let mut seq = Sequence::new();
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_invite_code().returning(|_| Ok(None));
    groups
        .expect_insert()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Err(GroupPersistenceError::duplicate_invite_code("RACE0001")));
    groups
        .expect_insert()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));

    let service = make_service(users, groups, MockRecipeRepository::new(), codes);
    service
        .create(creator.id(), details("Family", false))
        .await
        .expect("second attempt succeeds");
}

#[rstest]
#[tokio::test]
async fn create_gives_up_after_bounded_attempts() {
    let creator = user("Ada", UserRole::Member);
    let users = users_knowing(&creator);
    let taken = group("Existing", &creator, false);

    let mut codes = MockInviteCodeSource::new();
    codes
        .expect_generate()
        .times(MAX_INVITE_CODE_ATTEMPTS)
        .return_const(code("TAKEN001"));
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_invite_code()
        .returning(move |_| Ok(Some(taken.clone())));
    groups.expect_insert().times(0);

    let service = make_service(users, groups, MockRecipeRepository::new(), codes);
    let error = service
        .create(creator.id(), details("Family", false))
        .await
        .expect_err("codes exhausted");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn admin_created_group_is_approved_with_single_owner() {
    let admin = user("Root", UserRole::Admin);
    let mut users = users_knowing(&admin);
    users.expect_add_group().times(1).return_once(|_, _| Ok(()));
    let mut codes = MockInviteCodeSource::new();
    codes.expect_generate().return_const(code("FAMILY01"));
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_invite_code().returning(|_| Ok(None));
    groups.expect_insert().times(1).return_once(|_| Ok(()));

    let service = make_service(users, groups, MockRecipeRepository::new(), codes);
    let created = service
        .create(admin.id(), details("Family", true))
        .await
        .expect("group created");

    assert_eq!(created.moderation().status(), ModerationStatus::Approved);
    assert_eq!(created.moderation().moderated_by(), Some(admin.id()));
    assert_eq!(created.members().len(), 1);
    assert_eq!(created.member_role(admin.id()), Some(crate::domain::MemberRole::Owner));
}

#[rstest]
#[tokio::test]
async fn delete_by_non_creator_is_forbidden() {
    let owner = user("Ada", UserRole::Member);
    let intruder = user("Mallory", UserRole::Member);
    let target = group("Family", &owner, false);
    let target_id = target.id().clone();

    let users = users_knowing(&intruder);
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(target)));
    groups.expect_delete().times(0);

    let service = make_service(
        users,
        groups,
        MockRecipeRepository::new(),
        MockInviteCodeSource::new(),
    );
    let error = service
        .delete(intruder.id(), &target_id)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn delete_cascades_best_effort() {
    let owner = user("Ada", UserRole::Member);
    let target = group("Family", &owner, false);
    let target_id = target.id().clone();

    let mut users = users_knowing(&owner);
    users
        .expect_remove_group_from_all()
        .times(1)
        .return_once(|_| Ok(3));
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(target)));
    groups.expect_delete().times(1).return_once(|_| Ok(true));
    let mut recipes = MockRecipeRepository::new();
    recipes
        .expect_detach_group()
        .times(1)
        .return_once(|_| Err(crate::domain::ports::RecipePersistenceError::connection("down")));

    let service = make_service(users, groups, recipes, MockInviteCodeSource::new());
    service
        .delete(owner.id(), &target_id)
        .await
        .expect("delete succeeds despite cascade failure");
}

#[rstest]
#[tokio::test]
async fn search_returns_only_visible_matches() {
    let admin = user("Root", UserRole::Admin);
    let owner = user("Ada", UserRole::Member);
    let searcher = user("Grace", UserRole::Member);

    let mut lovers = group("Pasta Lovers", &owner, false);
    lovers
        .approve(&Actor::from(&admin), crate::domain::test_fixtures::fixture_timestamp())
        .expect("approve");
    let past_due = group("Past Due", &owner, false);
    let bakers = {
        let mut bakers = group("Bakers", &owner, false);
        bakers
            .approve(&Actor::from(&admin), crate::domain::test_fixtures::fixture_timestamp())
            .expect("approve");
        bakers
    };

    let users = users_knowing(&searcher);
    let mut groups = MockGroupRepository::new();
    groups
        .expect_list_all()
        .return_once(move || Ok(vec![bakers, past_due, lovers]));

    let service = make_service(
        users,
        groups,
        MockRecipeRepository::new(),
        MockInviteCodeSource::new(),
    );
    let results = service
        .search(searcher.id(), SearchQuery::new("past").expect("query"))
        .await
        .expect("search succeeds");

    let names: Vec<&str> = results.iter().map(|s| s.group.name()).collect();
    assert_eq!(names, vec!["Pasta Lovers"]);
    assert!(!results[0].is_member());
}

#[rstest]
#[tokio::test]
async fn get_hides_pending_requests_from_plain_members() {
    let owner = user("Ada", UserRole::Member);
    let member = user("Grace", UserRole::Member);
    let requester = user("Linus", UserRole::Member);

    let mut family = group("Family", &owner, true);
    let now = crate::domain::test_fixtures::fixture_timestamp();
    family.request_join(member.id(), now).expect("request");
    family.approve_request(member.id()).expect("approve");
    family.request_join(requester.id(), now).expect("request");
    let family_id = family.id().clone();
    let pending_recipe = recipe("Nonna's ragu", &owner, Some(&family_id));

    let roster = vec![owner.clone(), member.clone(), requester.clone()];
    let mut users = users_knowing(&member);
    users
        .expect_find_by_ids()
        .returning(move |_| Ok(roster.clone()));
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(family)));
    let mut recipes = MockRecipeRepository::new();
    recipes
        .expect_list_by_group()
        .return_once(move |_| Ok(vec![pending_recipe]));

    let service = make_service(users, groups, recipes, MockInviteCodeSource::new());
    let detail = service
        .get(member.id(), &family_id)
        .await
        .expect("member may view");

    assert!(detail.pending_requests.is_none());
    assert_eq!(detail.members.len(), 2);
    assert_eq!(detail.recipes.len(), 1, "members see pending group recipes");
}

fn groups_finding(found: Group) -> MockGroupRepository {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_invite_code()
        .return_once(move |_| Ok(Some(found)));
    groups
}

#[rstest]
#[tokio::test]
async fn preview_of_unapproved_group_is_forbidden_to_outsiders() {
    let owner = user("Ada", UserRole::Member);
    let outsider = user("Otto", UserRole::Member);
    let pending = group("Secret Pending", &owner, false);

    let service = make_service(
        users_knowing(&outsider),
        groups_finding(pending),
        MockRecipeRepository::new(),
        MockInviteCodeSource::new(),
    );
    let err = service
        .preview_invite(outsider.id(), &code("FIXTURE1"))
        .await
        .expect_err("pending group stays hidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn preview_of_approved_private_group_skips_the_roster() {
    let admin = user("Root", UserRole::Admin);
    let owner = user("Ada", UserRole::Member);
    let outsider = user("Otto", UserRole::Member);
    let mut family = group("Family", &owner, true);
    family
        .approve(&Actor::from(&admin), crate::domain::test_fixtures::fixture_timestamp())
        .expect("approve");

    let service = make_service(
        users_knowing(&outsider),
        groups_finding(family),
        MockRecipeRepository::new(),
        MockInviteCodeSource::new(),
    );
    let preview = service
        .preview_invite(outsider.id(), &code("FIXTURE1"))
        .await
        .expect("approved groups preview by code");

    assert_eq!(preview.name, "Family");
    assert!(preview.is_private);
    assert_eq!(preview.member_count, 1);
    assert!(!preview.is_member);
    assert!(!preview.has_pending_request);
}
