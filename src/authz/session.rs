//! 会话上下文
//!
//! 每个请求在认证后得到一个 [`SessionContext`]，放在请求扩展中。
//! 资料缓存的刷新按代次处理：失效时代次加一，旧代次读到的资料不会写回缓存。

use dashmap::DashMap;
use once_cell::sync::Lazy;
use uuid::Uuid;

use super::Actor;
use crate::models::users::entities::User;

pub static SESSIONS: Lazy<SessionRegistry> = Lazy::new(SessionRegistry::new);

/// 请求级会话信息
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: User,
    pub actor: Actor,
    /// 读取资料时的代次
    pub generation: u64,
}

impl SessionContext {
    pub fn new(user: User, generation: u64) -> Self {
        let actor = Actor::from(&user);
        Self {
            user,
            actor,
            generation,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    generations: DashMap<Uuid, u64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前代次
    pub fn current(&self, user_id: Uuid) -> u64 {
        self.generations.get(&user_id).map(|g| *g).unwrap_or(0)
    }

    /// 使该用户的资料失效，返回新的代次
    pub fn invalidate(&self, user_id: Uuid) -> u64 {
        let mut entry = self.generations.entry(user_id).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 读取时的代次是否仍然有效
    pub fn is_current(&self, user_id: Uuid, generation: u64) -> bool {
        self.current(user_id) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_starts_at_zero() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();
        assert_eq!(registry.current(id), 0);
        assert!(registry.is_current(id, 0));
    }

    #[test]
    fn test_stale_fetch_is_rejected_after_invalidation() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        // 请求 A 在资料更新前开始读取
        let seen_by_a = registry.current(id);
        // 资料更新使缓存失效
        let after_update = registry.invalidate(id);
        // 请求 B 在更新后读取
        let seen_by_b = registry.current(id);

        assert!(!registry.is_current(id, seen_by_a));
        assert!(registry.is_current(id, seen_by_b));
        assert_eq!(after_update, seen_by_b);
    }

    #[test]
    fn test_generations_are_per_user() {
        let registry = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        registry.invalidate(a);
        assert_eq!(registry.current(a), 1);
        assert_eq!(registry.current(b), 0);
    }
}
