//! 权限判断
//!
//! 仅用于界面展示（按钮显隐、菜单过滤），服务端才是权限的最终裁决者。

use crate::session::Session;
use crate::types::{Role, UserProfile};

/// 当前角色；未登录时为 `None`
pub fn current_role(session: &Session) -> Option<Role> {
    if !session.is_logged_in {
        return None;
    }
    session.role()
}

/// 用户角色是否达到 `required` 中任一角色的权重
///
/// `required` 为空时视为无要求。
pub fn has_permission(profile: Option<&UserProfile>, required: &[Role]) -> bool {
    if required.is_empty() {
        return true;
    }
    match profile {
        Some(user) => required.iter().any(|role| user.role >= *role),
        None => false,
    }
}

/// 会话是否满足角色要求
pub fn session_has_permission(session: &Session, required: &[Role]) -> bool {
    if !session.is_logged_in {
        return required.is_empty();
    }
    has_permission(session.user.as_ref(), required)
}
