use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::{WorkService, attach_feedback};
use crate::authz::{Actor, Role};
use crate::models::{
    ApiResponse, ErrorCode,
    works::{
        requests::{WorkFilter, WorkListQuery},
        responses::WorkListResponse,
    },
};
use crate::services::{internal_error, require_actor};

/// 按角色收敛查询范围，返回 `None` 表示结果必然为空
pub(crate) fn scope_filter(
    actor: &Actor,
    query: WorkListQuery,
    mentored_group_ids: &[Uuid],
) -> Option<WorkFilter> {
    let mut filter = WorkFilter {
        user_id: query.user_id,
        group_ids: query.group_id.map(|id| vec![id]),
        work_type: query.work_type,
        status: query.status,
    };

    match actor.role {
        Role::Admin => {}
        Role::Mentor => {
            if mentored_group_ids.is_empty() {
                return None;
            }
            // 只接受自己指导的小组作为筛选条件
            filter.group_ids = match query.group_id {
                Some(id) if mentored_group_ids.contains(&id) => Some(vec![id]),
                _ => Some(mentored_group_ids.to_vec()),
            };
        }
        Role::Student => filter.user_id = Some(actor.id),
        Role::School => return None,
    }

    Some(filter)
}

pub async fn list_works(
    service: &WorkService,
    request: &HttpRequest,
    query: WorkListQuery,
) -> ActixResult<HttpResponse> {
    let actor = match require_actor(request) {
        Ok(actor) => actor,
        Err(resp) => return Ok(resp),
    };

    if actor.role == Role::School {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::WorkPermissionDenied,
            "You do not have access to works",
        )));
    }

    let storage = service.get_storage(request);

    let mentored_group_ids = if actor.role == Role::Mentor {
        match storage.list_groups_by_mentor(actor.id).await {
            Ok(groups) => groups.into_iter().map(|g| g.id).collect(),
            Err(e) => return Ok(internal_error("Failed to get mentored groups", e)),
        }
    } else {
        Vec::new()
    };

    let Some(filter) = scope_filter(&actor, query, &mentored_group_ids) else {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            WorkListResponse { items: Vec::new() },
            "Works retrieved successfully",
        )));
    };

    let works = match storage.list_works(filter).await {
        Ok(works) => works,
        Err(e) => return Ok(internal_error("Failed to list works", e)),
    };

    match attach_feedback(&storage, works).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            WorkListResponse { items },
            "Works retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load feedback", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user_id: Option<Uuid>, group_id: Option<Uuid>) -> WorkListQuery {
        WorkListQuery {
            user_id,
            group_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_mentor_without_groups_sees_nothing() {
        let mentor = Actor::new(Uuid::new_v4(), Role::Mentor);
        assert!(scope_filter(&mentor, query(None, None), &[]).is_none());
    }

    #[test]
    fn test_mentor_group_filter_limited_to_mentored_groups() {
        let mentor = Actor::new(Uuid::new_v4(), Role::Mentor);
        let mine = [Uuid::new_v4(), Uuid::new_v4()];

        let own = scope_filter(&mentor, query(None, Some(mine[1])), &mine).unwrap();
        assert_eq!(own.group_ids, Some(vec![mine[1]]));

        let other = scope_filter(&mentor, query(None, Some(Uuid::new_v4())), &mine).unwrap();
        assert_eq!(other.group_ids, Some(mine.to_vec()));
    }

    #[test]
    fn test_student_always_scoped_to_self() {
        let student = Actor::new(Uuid::new_v4(), Role::Student);
        let filter = scope_filter(&student, query(Some(Uuid::new_v4()), None), &[]).unwrap();
        assert_eq!(filter.user_id, Some(student.id));
    }

    #[test]
    fn test_admin_filters_pass_through() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let user_id = Uuid::new_v4();
        let filter = scope_filter(&admin, query(Some(user_id), None), &[]).unwrap();
        assert_eq!(filter.user_id, Some(user_id));
        assert_eq!(filter.group_ids, None);
    }

    #[test]
    fn test_school_has_no_scope() {
        let school = Actor::new(Uuid::new_v4(), Role::School);
        assert!(scope_filter(&school, query(None, None), &[]).is_none());
    }
}
