//! Group creation, listing and search through the real services.

#[path = "support/platform.rs"]
mod support;

use cookbook::domain::ports::{GroupQuery, ModerationCommand};
use cookbook::domain::{
    ErrorCode, INVITE_CODE_ALPHABET, INVITE_CODE_LEN, MemberRole, Moderated, ModerationStatus,
    SearchQuery,
};
use support::Platform;
use rstest::{fixture, rstest};

#[fixture]
fn platform() -> Platform {
    Platform::new()
}

#[rstest]
#[tokio::test]
async fn admin_created_groups_skip_the_queue(platform: Platform) {
    let admin = platform.admin().await;

    let group = platform.create_group(&admin, "Family", true).await;

    assert_eq!(group.moderation().status(), ModerationStatus::Approved);
    assert_eq!(group.moderation().moderated_by(), Some(admin.id()));
    let owners: Vec<_> = group
        .members()
        .iter()
        .filter(|membership| membership.role == MemberRole::Owner)
        .collect();
    assert_eq!(owners.len(), 1);
    let code = group.invite_code().as_ref();
    assert_eq!(code.len(), INVITE_CODE_LEN);
    assert!(code.bytes().all(|byte| INVITE_CODE_ALPHABET.contains(&byte)));
}

#[rstest]
#[tokio::test]
async fn search_hides_groups_awaiting_moderation(platform: Platform) {
    let admin = platform.admin().await;
    let owner = platform.register("Olive", "olive@cookbook.test").await;
    let reader = platform.register("Reg", "reg@cookbook.test").await;
    let pasta = platform.create_group(&owner, "Pasta Lovers", false).await;
    platform.create_group(&owner, "Past Due", false).await;
    platform
        .moderation
        .approve_group(admin.id(), pasta.id())
        .await
        .expect("approved");

    let found = platform
        .groups
        .search(reader.id(), SearchQuery::new("past").expect("query"))
        .await
        .expect("search");

    let names: Vec<_> = found.iter().map(|summary| summary.group.name()).collect();
    assert_eq!(names, vec!["Pasta Lovers"]);
    assert_eq!(found[0].user_role, None);
}

#[rstest]
#[tokio::test]
async fn members_keep_seeing_their_pending_groups(platform: Platform) {
    let owner = platform.register("Olive", "olive@cookbook.test").await;
    let reader = platform.register("Reg", "reg@cookbook.test").await;
    let group = platform.create_group(&owner, "Bread Bakers", false).await;

    let own = platform.groups.list(owner.id()).await.expect("list");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].user_role, Some(MemberRole::Owner));
    assert!(platform.groups.list(reader.id()).await.expect("list").is_empty());

    let denied = platform
        .groups
        .get(reader.id(), group.id())
        .await
        .expect_err("pending groups are hidden from outsiders");
    assert_eq!(denied.code(), ErrorCode::Forbidden);

    let preview = platform
        .groups
        .preview_invite(reader.id(), group.invite_code())
        .await
        .expect_err("invite previews wait for approval");
    assert_eq!(preview.code(), ErrorCode::Forbidden);
    platform
        .groups
        .preview_invite(owner.id(), group.invite_code())
        .await
        .expect("members preview their own group");
}

#[rstest]
#[tokio::test]
async fn pending_requests_are_shown_to_managers_only(platform: Platform) {
    let admin = platform.admin().await;
    let owner = platform.register("Olive", "olive@cookbook.test").await;
    let group = platform.create_group(&owner, "Secret Spices", false).await;
    platform
        .moderation
        .approve_group(admin.id(), group.id())
        .await
        .expect("approved");

    let detail = platform.groups.get(owner.id(), group.id()).await.expect("detail");

    assert!(detail.pending_requests.is_some());
    assert_eq!(detail.members.len(), 1);
    assert_eq!(detail.members[0].name, "Olive");
}
