use tenanthub_core::error::ErrorKind;
use tenanthub_database::TenancyStore;
use tenanthub_entity::TenantContext;
use tenanthub_entity::ambient;
use tenanthub_entity::membership::{Capability, MembershipStatus, Role};

use super::service::{CreateMembership, UpdateMembership};
use crate::testing::{Fixture, actor, principal, superuser};

fn create(
    who: &tenanthub_entity::principal::Principal,
    org: &tenanthub_entity::organization::Organization,
    role: Role,
) -> CreateMembership {
    CreateMembership {
        principal_id: who.id,
        organization_id: org.id,
        role,
        active_subunit_id: None,
        delegated_subunits: Vec::new(),
    }
}

#[tokio::test]
async fn test_create_derives_capabilities_and_keeps_alias() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let root = superuser("root");
    let newcomer = principal("nia");

    let created = fx
        .memberships
        .create(&actor(&root), create(&newcomer, &org, Role::LegacyFederationAdmin))
        .await
        .unwrap();

    assert_eq!(created.role, Role::LegacyFederationAdmin);
    assert_eq!(
        created.capabilities,
        fx.policies.derive_capabilities(&Role::OrganizationAdmin)
    );
    assert!(!created.capabilities.has(Capability::ManageFederation));
    assert_eq!(created.created_by, Some(root.id));
}

#[tokio::test]
async fn test_create_super_admin_requires_prior_record() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let root = superuser("root");
    let candidate = principal("sid");

    let err = fx
        .memberships
        .create(&actor(&root), create(&candidate, &org, Role::SuperAdmin))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(fx.store.memberships_of(candidate.id).await.unwrap().is_empty());

    fx.seed(&candidate, &org, Role::SuperAdmin).await;
    let resaved = fx
        .memberships
        .create(&actor(&root), create(&candidate, &org, Role::SuperAdmin))
        .await
        .unwrap();
    assert_eq!(resaved.role, Role::SuperAdmin);
}

#[tokio::test]
async fn test_create_rejects_foreign_active_subunit_without_writing() {
    let fx = Fixture::new();
    let a = fx.organization("A", None).await;
    let b = fx.organization("B", None).await;
    let foreign = fx.subunit(&b, "B main", true).await;
    let root = superuser("root");
    let newcomer = principal("nia");

    let mut req = create(&newcomer, &a, Role::Member);
    req.active_subunit_id = Some(foreign.id);
    let err = fx.memberships.create(&actor(&root), req).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(fx.store.memberships_of(newcomer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_duplicate_conflicts() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let root = superuser("root");
    let newcomer = principal("nia");
    fx.seed(&newcomer, &org, Role::Member).await;

    let err = fx
        .memberships
        .create(&actor(&root), create(&newcomer, &org, Role::Leader))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_create_requires_management_rights() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let other = fx.organization("Hope", None).await;
    let admin = principal("ada");
    let leader = principal("lee");
    fx.seed(&admin, &org, Role::OrganizationAdmin).await;
    fx.seed(&leader, &org, Role::Leader).await;

    let err = fx
        .memberships
        .create(&actor(&leader), create(&principal("x"), &org, Role::Member))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = fx
        .memberships
        .create(&actor(&admin), create(&principal("y"), &other, Role::Member))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    assert!(
        fx.memberships
            .create(&actor(&admin), create(&principal("z"), &org, Role::Pastor))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_federation_grant_allows_sibling_organization() {
    let fx = Fixture::new();
    let federation = fx.federation("North").await;
    let own = fx.organization("Own", Some(&federation)).await;
    let sibling = fx.organization("Sibling", Some(&federation)).await;
    let admin = principal("ada");
    let mut membership = fx.seed(&admin, &own, Role::OrganizationAdmin).await;

    let err = fx
        .memberships
        .create(&actor(&admin), create(&principal("x"), &sibling, Role::Member))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    membership.capabilities.set(Capability::ManageFederation, true);
    fx.store.update_membership(&membership).await.unwrap();

    assert!(
        fx.memberships
            .create(&actor(&admin), create(&principal("y"), &sibling, Role::Member))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_update_never_edits_own_record() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let admin = principal("ada");
    let own = fx.seed(&admin, &org, Role::OrganizationAdmin).await;

    let err = fx
        .memberships
        .update(
            &actor(&admin),
            own.id,
            UpdateMembership {
                role: Some(Role::SuperAdmin),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_update_respects_hierarchy() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let secretary = principal("sec");
    let pastor = principal("pas");
    let member = principal("mem");
    fx.seed(&secretary, &org, Role::Secretary).await;
    let pastor_m = fx.seed(&pastor, &org, Role::Pastor).await;
    let member_m = fx.seed(&member, &org, Role::Member).await;

    let err = fx
        .memberships
        .update(
            &actor(&secretary),
            pastor_m.id,
            UpdateMembership {
                role: Some(Role::Member),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = fx
        .memberships
        .update(
            &actor(&secretary),
            member_m.id,
            UpdateMembership {
                role: Some(Role::OrganizationAdmin),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let promoted = fx
        .memberships
        .update(
            &actor(&secretary),
            member_m.id,
            UpdateMembership {
                role: Some(Role::Leader),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Leader);
}

#[tokio::test]
async fn test_update_keeps_flags_unless_recompute_requested() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let root = superuser("root");
    let target = fx.seed(&principal("mem"), &org, Role::Member).await;

    let kept = fx
        .memberships
        .update(
            &actor(&root),
            target.id,
            UpdateMembership {
                role: Some(Role::Pastor),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.role, Role::Pastor);
    assert!(kept.capabilities.granted().is_empty());

    let recomputed = fx
        .memberships
        .update(
            &actor(&root),
            target.id,
            UpdateMembership {
                recompute_capabilities: true,
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        recomputed.capabilities,
        fx.policies.derive_capabilities(&Role::Pastor)
    );
}

#[tokio::test]
async fn test_promotion_to_super_admin_needs_top_level_actor() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let admin = principal("ada");
    let boss = principal("boss");
    fx.seed(&admin, &org, Role::OrganizationAdmin).await;
    fx.seed(&boss, &org, Role::SuperAdmin).await;
    let target = fx.seed(&principal("mem"), &org, Role::Member).await;
    let promote = UpdateMembership {
        role: Some(Role::SuperAdmin),
        ..UpdateMembership::default()
    };

    let err = fx
        .memberships
        .update(&actor(&admin), target.id, promote.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let promoted = fx
        .memberships
        .update(&actor(&boss), target.id, promote)
        .await
        .unwrap();
    assert!(promoted.role.is_top_level());
}

#[tokio::test]
async fn test_activate_switches_single_active_membership() {
    let fx = Fixture::new();
    let a = fx.organization("A", None).await;
    let b = fx.organization("B", None).await;
    let pat = principal("pat");
    let ma = fx.seed(&pat, &a, Role::Member).await;
    let mb = fx.seed(&pat, &b, Role::Member).await;
    let ctx = actor(&pat);

    fx.memberships.activate(&ctx, ma.id).await.unwrap();
    fx.memberships.activate(&ctx, mb.id).await.unwrap();

    let active: Vec<_> = fx
        .store
        .memberships_of(pat.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.is_active)
        .map(|m| m.id)
        .collect();
    assert_eq!(active, vec![mb.id]);

    let err = fx
        .memberships
        .activate(&actor(&principal("eve")), ma.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_set_active_subunit_validates_ownership() {
    let fx = Fixture::new();
    let a = fx.organization("A", None).await;
    let b = fx.organization("B", None).await;
    let own = fx.subunit(&a, "A north", false).await;
    let foreign = fx.subunit(&b, "B main", true).await;
    let pat = principal("pat");
    let m = fx.seed(&pat, &a, Role::Member).await;
    let ctx = actor(&pat);

    let err = fx
        .memberships
        .set_active_subunit(&ctx, m.id, Some(foreign.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let updated = fx
        .memberships
        .set_active_subunit(&ctx, m.id, Some(own.id))
        .await
        .unwrap();
    assert_eq!(updated.active_subunit_id, Some(own.id));
}

#[tokio::test]
async fn test_disable_is_soft_and_clears_active_flag() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let root = superuser("root");
    let pat = principal("pat");
    let m = fx.seed(&pat, &org, Role::Member).await;
    fx.store.activate_membership(m.id).await.unwrap();

    let disabled = fx.memberships.disable(&actor(&root), m.id).await.unwrap();
    assert_eq!(disabled.status, MembershipStatus::Disabled);
    assert!(!disabled.is_active);
    assert!(fx.store.find_membership(m.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_scoped_follows_ambient_context() {
    let fx = Fixture::new();
    let a = fx.organization("A", None).await;
    let b = fx.organization("B", None).await;
    fx.seed(&principal("one"), &a, Role::Member).await;
    fx.seed(&principal("two"), &b, Role::Member).await;

    let mut context = TenantContext::anonymous();
    context.organization = Some(a.clone());
    let scoped = ambient::scope(context, fx.memberships.list_scoped())
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].organization_id, a.id);

    let nothing = ambient::scope(TenantContext::anonymous(), fx.memberships.list_scoped())
        .await
        .unwrap();
    assert!(nothing.is_empty());

    assert_eq!(fx.memberships.list_scoped().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_manage_members_suffices_inside_own_organization() {
    let fx = Fixture::new();
    let federation = fx.federation("North").await;
    let own = fx.organization("Own", Some(&federation)).await;
    let sibling = fx.organization("Sibling", Some(&federation)).await;
    let secretary = principal("sec");
    fx.seed(&secretary, &own, Role::Secretary).await;

    let created = fx
        .memberships
        .create(&actor(&secretary), create(&principal("x"), &own, Role::Leader))
        .await
        .unwrap();
    assert_eq!(created.created_by, Some(secretary.id));

    let err = fx
        .memberships
        .create(&actor(&secretary), create(&principal("y"), &sibling, Role::Member))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_explicit_flags_cannot_exceed_actor_grants() {
    let fx = Fixture::new();
    let federation = fx.federation("North").await;
    let own = fx.organization("Own", Some(&federation)).await;
    let sibling = fx.organization("Sibling", Some(&federation)).await;
    let admin = principal("ada");
    let pastor = principal("pas");
    fx.seed(&admin, &own, Role::OrganizationAdmin).await;
    let target = fx.seed(&pastor, &own, Role::Pastor).await;

    let err = fx
        .memberships
        .update(
            &actor(&admin),
            target.id,
            UpdateMembership {
                role: Some(Role::OrganizationAdmin),
                capabilities: Some(vec![Capability::ManageMembers, Capability::ManageFederation]),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let stored = fx.store.find_membership(target.id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Pastor);
    assert!(!stored.capabilities.has(Capability::ManageFederation));

    let err = fx
        .memberships
        .create(&actor(&pastor), create(&principal("x"), &sibling, Role::Member))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let widened = fx
        .memberships
        .update(
            &actor(&admin),
            target.id,
            UpdateMembership {
                capabilities: Some(vec![Capability::ManageMembers, Capability::ManageBranches]),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap();
    assert!(widened.capabilities.has(Capability::ManageBranches));

    let federated = fx
        .memberships
        .update(
            &actor(&superuser("root")),
            target.id,
            UpdateMembership {
                capabilities: Some(vec![Capability::ManageMembers, Capability::ManageFederation]),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap();
    assert!(federated.capabilities.has(Capability::ManageFederation));
}

#[tokio::test]
async fn test_closed_cached_subunit_does_not_block_edits() {
    let fx = Fixture::new();
    let org = fx.organization("Grace", None).await;
    let branch = fx.subunit(&org, "Branch", false).await;
    let closed = fx.subunit(&org, "Closed", false).await;
    let root = superuser("root");
    let m = fx.seed(&principal("mem"), &org, Role::Member).await;
    fx.store.set_active_subunit(m.id, Some(branch.id)).await.unwrap();
    fx.store.delete_subunit(branch.id).await.unwrap();
    fx.store.delete_subunit(closed.id).await.unwrap();

    let promoted = fx
        .memberships
        .update(
            &actor(&root),
            m.id,
            UpdateMembership {
                role: Some(Role::Leader),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Leader);
    assert_eq!(promoted.active_subunit_id, Some(branch.id));

    let err = fx
        .memberships
        .update(
            &actor(&root),
            m.id,
            UpdateMembership {
                active_subunit_id: Some(closed.id),
                ..UpdateMembership::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
