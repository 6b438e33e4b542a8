use std::collections::HashMap;

use anyhow::{Context, anyhow};
use serde_json::{Value, json};
use tracing::instrument;

use seitech_core::PaginationParams;
use seitech_core::pagination::total_pages;
use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::middleware::auth::AuthUser;
use crate::modules::study_groups::model::{
    CreateStudyGroupRequest, GROUP_FIELDS, GROUP_MODEL, GroupState, MEMBER_FIELDS, MEMBER_MODEL,
    Membership, MembershipChange, StudyGroupPage, StudyGroupQuery, UpdateStudyGroupRequest,
    join_state,
};
use crate::utils::errors::AppError;
use crate::utils::odoo::{UserOrm, action_error};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

pub struct StudyGroupService;

impl StudyGroupService {
    #[instrument(skip(odoo))]
    pub async fn list(
        odoo: &OdooClient,
        viewer: Option<i64>,
        query: StudyGroupQuery,
    ) -> Result<StudyGroupPage, AppError> {
        let window = PaginationParams::new(query.page, query.per_page).window(DEFAULT_PER_PAGE, MAX_PER_PAGE);

        let domain = Domain::new()
            .eq("state", query.state.as_deref().unwrap_or("active"))
            .when_some(query.group_type, |d, kind| d.eq("group_type", kind))
            .when_some(query.course_id, |d, id| d.eq("course_id", id))
            .when(query.is_featured == Some(true), |d| d.eq("is_featured", true))
            .when_some(query.search, |d, term| {
                d.any_of([
                    ("name", "ilike", json!(term)),
                    ("description", "ilike", json!(term)),
                ])
            });
        let domain = match query.privacy {
            Some(privacy) => domain.eq("privacy", privacy),
            None => domain.in_("privacy", ["public", "private"]),
        };
        let domain = match (query.my_groups == Some(true), viewer) {
            (true, Some(uid)) => domain.eq("member_ids.user_id", uid),
            (true, None) => return Err(AppError::unauthorized("Unauthorized")),
            (false, _) => domain,
        };

        let (mut groups, total) = tokio::try_join!(
            odoo.search_read(
                GROUP_MODEL,
                SearchRead::new(domain.clone())
                    .fields(GROUP_FIELDS)
                    .offset(window.offset)
                    .limit(window.limit)
                    .order("is_featured desc, last_activity_date desc"),
            ),
            odoo.search_count(GROUP_MODEL, domain),
        )
        .context("Failed to fetch study groups")?;

        let group_ids: Vec<i64> = groups
            .iter()
            .filter_map(|g| g.get("id").and_then(Value::as_i64))
            .collect();
        let memberships = Self::memberships(odoo, viewer, &group_ids).await?;
        for group in &mut groups {
            let id = group.get("id").and_then(Value::as_i64).unwrap_or_default();
            Membership::from_member(memberships.get(&id)).apply(group);
        }

        Ok(StudyGroupPage {
            items: groups.into_iter().map(fields::nullify_false).collect(),
            total,
            page: window.page,
            per_page: window.limit,
            total_pages: total_pages(total, window.limit),
        })
    }

    #[instrument(skip(odoo, dto))]
    pub async fn create(odoo: &OdooClient, uid: i64, dto: CreateStudyGroupRequest) -> Result<Value, AppError> {
        let id = odoo
            .create(GROUP_MODEL, Value::Object(dto.values(uid)))
            .await
            .context("Failed to create study group")?;
        odoo.call_method(GROUP_MODEL, "action_activate", &[id], json!({}))
            .await
            .context("Failed to activate study group")?;

        let group = Self::read(odoo, id).await?;
        Ok(fields::nullify_false(group))
    }

    /// The group with its member roster and the caller's membership.
    #[instrument(skip(odoo))]
    pub async fn get(odoo: &OdooClient, viewer: Option<i64>, id: i64) -> Result<Value, AppError> {
        let mut group = Self::read(odoo, id).await?;

        let member_ids = fields::ids(&group, "member_ids");
        let group_ids = [id];
        let (members, memberships) = tokio::try_join!(
            async {
                odoo.read(MEMBER_MODEL, &member_ids, MEMBER_FIELDS)
                    .await
                    .context("Failed to fetch study group members")
                    .map_err(AppError::from)
            },
            Self::memberships(odoo, viewer, &group_ids),
        )?;

        if let Value::Object(map) = &mut group {
            map.insert(
                "members".into(),
                Value::Array(members.into_iter().map(fields::nullify_false).collect()),
            );
        }
        Membership::from_member(memberships.get(&id)).apply(&mut group);
        Ok(fields::nullify_false(group))
    }

    #[instrument(skip(odoo, dto))]
    pub async fn update(
        odoo: &OdooClient,
        uid: i64,
        id: i64,
        dto: UpdateStudyGroupRequest,
    ) -> Result<Value, AppError> {
        Self::ensure_owner(odoo, uid, id).await?;

        let values = dto.values();
        if !values.is_empty() {
            odoo.write(GROUP_MODEL, &[id], Value::Object(values))
                .await
                .context("Failed to update study group")?;
        }
        if let Some(state) = dto.state {
            let method = match state {
                GroupState::Active => "action_activate",
                GroupState::Archived => "action_archive",
            };
            odoo.call_method(GROUP_MODEL, method, &[id], json!({}))
                .await
                .context("Failed to update study group")?;
        }

        let group = Self::read(odoo, id).await?;
        Ok(fields::nullify_false(group))
    }

    /// Groups are archived, never deleted.
    #[instrument(skip(odoo))]
    pub async fn archive(odoo: &OdooClient, uid: i64, id: i64) -> Result<(), AppError> {
        Self::ensure_owner(odoo, uid, id).await?;
        odoo.call_method(GROUP_MODEL, "action_archive", &[id], json!({}))
            .await
            .context("Failed to delete study group")?;
        Ok(())
    }

    #[instrument(skip(odoo, auth_user))]
    pub async fn join(odoo: &OdooClient, auth_user: &AuthUser, id: i64) -> Result<MembershipChange, AppError> {
        let uid = auth_user.odoo_uid()?;
        let group = Self::read(odoo, id).await?;

        let orm = UserOrm::new(odoo, auth_user);
        if orm.acts_as_user() {
            orm.call_method(GROUP_MODEL, "action_join", &[id])
                .await
                .map_err(|e| action_error(e, "Failed to join study group"))?;
        } else {
            if Self::member_record(odoo, uid, id).await?.is_some() {
                return Err(AppError::bad_request(anyhow!("You are already a member of this group.")));
            }
            let max_members = fields::i64_field(&group, "max_members");
            if max_members > 0 && fields::i64_field(&group, "member_count") >= max_members {
                return Err(AppError::bad_request(anyhow!(
                    "This group has reached its maximum capacity."
                )));
            }
            let policy = fields::string_or_empty(&group, "join_policy");
            let state = join_state(&policy)
                .ok_or_else(|| AppError::bad_request(anyhow!("This group is invitation only.")))?;
            odoo.create(
                MEMBER_MODEL,
                json!({ "group_id": id, "user_id": uid, "role": "member", "state": state }),
            )
            .await
            .context("Failed to join study group")?;
        }

        let member = Self::member_record(odoo, uid, id).await?;
        let membership = Membership::from_member(member.as_ref());
        Ok(MembershipChange {
            member_count: Self::member_count(odoo, id).await?,
            is_member: membership.is_member,
            member_state: membership.member_state,
        })
    }

    #[instrument(skip(odoo, auth_user))]
    pub async fn leave(odoo: &OdooClient, auth_user: &AuthUser, id: i64) -> Result<MembershipChange, AppError> {
        let uid = auth_user.odoo_uid()?;
        let group = Self::read(odoo, id).await?;

        let orm = UserOrm::new(odoo, auth_user);
        if orm.acts_as_user() {
            orm.call_method(GROUP_MODEL, "action_leave", &[id])
                .await
                .map_err(|e| action_error(e, "Failed to leave study group"))?;
        } else {
            if fields::many2one_id(&group, "owner_id") == Some(uid) {
                return Err(AppError::bad_request(anyhow!(
                    "Group owner cannot leave. Transfer ownership first."
                )));
            }
            if let Some(member_id) = Self::member_record(odoo, uid, id)
                .await?
                .and_then(|m| m.get("id").and_then(Value::as_i64))
            {
                odoo.unlink(MEMBER_MODEL, &[member_id])
                    .await
                    .context("Failed to leave study group")?;
            }
        }

        Ok(MembershipChange {
            member_count: Self::member_count(odoo, id).await?,
            is_member: false,
            member_state: None,
        })
    }

    async fn read(odoo: &OdooClient, id: i64) -> Result<Value, AppError> {
        odoo.read_one(GROUP_MODEL, id, GROUP_FIELDS)
            .await
            .context("Failed to fetch study group")?
            .ok_or_else(|| AppError::not_found(anyhow!("Study group not found")))
    }

    async fn member_count(odoo: &OdooClient, id: i64) -> Result<i64, AppError> {
        let record = odoo
            .read_one(GROUP_MODEL, id, &["member_count"])
            .await
            .context("Failed to fetch study group")?
            .unwrap_or(Value::Null);
        Ok(fields::i64_field(&record, "member_count"))
    }

    async fn ensure_owner(odoo: &OdooClient, uid: i64, id: i64) -> Result<(), AppError> {
        let record = odoo
            .read_one(GROUP_MODEL, id, &["owner_id"])
            .await
            .context("Failed to fetch study group")?
            .ok_or_else(|| AppError::not_found(anyhow!("Study group not found")))?;
        if fields::many2one_id(&record, "owner_id") != Some(uid) {
            return Err(AppError::forbidden("Only the group owner can modify this group"));
        }
        Ok(())
    }

    async fn member_record(odoo: &OdooClient, uid: i64, group_id: i64) -> Result<Option<Value>, AppError> {
        let records = odoo
            .search_read(
                MEMBER_MODEL,
                SearchRead::new(Domain::new().eq("group_id", group_id).eq("user_id", uid))
                    .fields(&["id", "role", "state"])
                    .limit(1),
            )
            .await
            .context("Failed to fetch membership")?;
        Ok(records.into_iter().next())
    }

    /// The viewer's membership records keyed by group id.
    async fn memberships(
        odoo: &OdooClient,
        viewer: Option<i64>,
        group_ids: &[i64],
    ) -> Result<HashMap<i64, Value>, AppError> {
        let Some(uid) = viewer else {
            return Ok(HashMap::new());
        };
        if group_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let records = odoo
            .search_read(
                MEMBER_MODEL,
                SearchRead::new(
                    Domain::new()
                        .in_("group_id", group_ids.iter().copied())
                        .eq("user_id", uid),
                )
                .fields(&["group_id", "role", "state"]),
            )
            .await
            .context("Failed to fetch membership")?;

        Ok(records
            .into_iter()
            .filter_map(|m| Some((fields::many2one_id(&m, "group_id")?, m)))
            .collect())
    }
}
