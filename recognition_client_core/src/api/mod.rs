//! 业务接口
//!
//! 每个子模块是一组薄封装：拼接路径、序列化参数，然后交给 [`ApiClient::send`]。
//! 无返回数据的接口返回 `()`，服务端 `data` 的内容被忽略。

pub mod admin;
pub mod auth;
pub mod comments;
pub mod community;
pub mod file;
pub mod knowledge;
pub mod notification;
pub mod recognition;
pub mod user;
pub mod vip;

use crate::client::ApiClient;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use comments::CommentApi;
pub use community::CommunityApi;
pub use file::FileApi;
pub use knowledge::KnowledgeApi;
pub use notification::NotificationApi;
pub use recognition::RecognitionApi;
pub use user::UserApi;
pub use vip::VipApi;

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    pub fn community(&self) -> CommunityApi<'_> {
        CommunityApi::new(self)
    }

    pub fn comments(&self) -> CommentApi<'_> {
        CommentApi::new(self)
    }

    pub fn knowledge(&self) -> KnowledgeApi<'_> {
        KnowledgeApi::new(self)
    }

    pub fn recognition(&self) -> RecognitionApi<'_> {
        RecognitionApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    pub fn vip(&self) -> VipApi<'_> {
        VipApi::new(self)
    }

    pub fn file(&self) -> FileApi<'_> {
        FileApi::new(self)
    }

    pub fn notification(&self) -> NotificationApi<'_> {
        NotificationApi::new(self)
    }
}
