//! 数据类型定义

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 成功业务码
pub const SUCCESS_CODE: i32 = 200;

/// 统一 API 响应
///
/// `code == 200` 表示成功，其余值即便 HTTP 200 也视为业务失败。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// 用户角色（可比较：User < Vip < Admin）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RoleRepr", into = "i32")]
pub enum Role {
    #[default]
    User,
    Vip,
    Admin,
}

/// 角色在线上的两种表示：数字编码或字符串
#[derive(Deserialize)]
#[serde(untagged)]
enum RoleRepr {
    Code(i32),
    Name(String),
}

impl TryFrom<RoleRepr> for Role {
    type Error = String;

    fn try_from(repr: RoleRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            RoleRepr::Code(code) => Role::from_code(code).ok_or_else(|| format!("unknown role code {}", code)),
            RoleRepr::Name(name) => name.parse(),
        }
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_start_matches("role_") {
            "user" | "0" => Ok(Role::User),
            "vip" | "1" => Ok(Role::Vip),
            "admin" | "2" => Ok(Role::Admin),
            other => Err(format!("unknown role {}", other)),
        }
    }
}

impl Role {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Role::User),
            1 => Some(Role::Vip),
            2 => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Role::User => 0,
            Role::Vip => 1,
            Role::Admin => 2,
        }
    }

    /// 角色显示名称
    pub fn display_name(self) -> &'static str {
        match self {
            Role::User => "普通用户",
            Role::Vip => "VIP会员",
            Role::Admin => "管理员",
        }
    }
}

/// 用户信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_expire_time: Option<String>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 按当前本地时间判断 VIP
    pub fn is_vip(&self) -> bool {
        self.is_vip_at(Local::now().naive_local())
    }

    /// VIP = 角色 ≥ VIP 且（无到期时间 或 到期时间晚于 `now`）
    ///
    /// 到期时间无法解析时视为已过期。
    pub fn is_vip_at(&self, now: NaiveDateTime) -> bool {
        if self.role < Role::Vip {
            return false;
        }
        match self.vip_expire_time.as_deref() {
            None => true,
            Some(raw) if raw.trim().is_empty() => true,
            Some(raw) => parse_server_time(raw).map(|expire| expire > now).unwrap_or(false),
        }
    }

    /// 显示名称：昵称优先
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// 解析服务端时间（`LocalDateTime` 序列化格式或 RFC 3339）
pub fn parse_server_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// 通用分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    #[serde(alias = "records", alias = "list")]
    pub data: Vec<T>,
    pub total: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub pages: Option<i64>,
}

/// 分页查询参数
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }
}

/// 操作结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn profile(role: Role, expire: Option<&str>) -> UserProfile {
        UserProfile {
            id: 1,
            username: "alice".to_string(),
            nickname: None,
            email: None,
            phone: None,
            avatar: None,
            role,
            vip_level: Some(1),
            vip_expire_time: expire.map(str::to_string),
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::User < Role::Vip);
        assert!(Role::Vip < Role::Admin);
    }

    #[test]
    fn test_role_accepts_code_and_name() {
        let from_code: Role = serde_json::from_str("2").unwrap();
        let from_name: Role = serde_json::from_str("\"VIP\"").unwrap();
        let from_authority: Role = serde_json::from_str("\"ROLE_USER\"").unwrap();
        assert_eq!(from_code, Role::Admin);
        assert_eq!(from_name, Role::Vip);
        assert_eq!(from_authority, Role::User);
        assert!(serde_json::from_str::<Role>("7").is_err());
        assert_eq!(serde_json::to_string(&Role::Vip).unwrap(), "1");
    }

    #[test]
    fn test_vip_requires_role_and_unexpired() {
        let now = noon(2025, 6, 1);
        assert!(profile(Role::Vip, None).is_vip_at(now));
        assert!(profile(Role::Vip, Some("2025-12-31T00:00:00")).is_vip_at(now));
        assert!(!profile(Role::Vip, Some("2025-01-01 00:00:00")).is_vip_at(now));
        assert!(!profile(Role::Vip, Some("not a date")).is_vip_at(now));
        assert!(!profile(Role::User, None).is_vip_at(now));
        assert!(profile(Role::Admin, None).is_vip_at(now));
    }

    #[test]
    fn test_envelope_without_data() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"code":200,"message":"操作成功"}"#).unwrap();
        assert!(env.is_success());
        assert!(env.data.is_none());
        assert!(env.timestamp.is_none());
    }

    #[test]
    fn test_profile_camel_case() {
        let json = r#"{"id":7,"username":"bob","role":1,"vipLevel":2,"vipExpireTime":"2030-01-01T00:00:00"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Vip);
        assert_eq!(user.vip_level, Some(2));
        assert_eq!(user.display_name(), "bob");
    }
}
