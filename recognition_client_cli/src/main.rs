//! 智能图像识别平台 CLI 工具

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use recognition_client_core::api::auth::LoginRequest;
use recognition_client_core::api::recognition::RecognitionType;
use recognition_client_core::{
    ApiClient, ClientConfig, Error, FilePart, FileTokenStore, FileUploadConfig, MemoryNavigator, PageQuery, RouteTable,
    Router, SessionContext, TracingNotifier, UserProfile,
};
use tracing_subscriber::EnvFilter;

/// 单张图片上传上限
const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "recognition-cli")]
#[command(about = "智能图像识别平台客户端工具", long_about = None)]
struct Cli {
    /// 服务器地址（默认读取 API_BASE_URL）
    #[arg(short, long)]
    server: Option<String>,

    /// 会话状态目录（默认读取 API_STATE_DIR）
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 用户登录
    Login {
        /// 用户名
        #[arg(short, long)]
        username: String,
        /// 密码
        #[arg(short, long)]
        password: String,
        /// 验证码
        #[arg(long)]
        captcha: Option<String>,
    },
    /// 用户登出
    Logout,
    /// 当前用户信息
    Whoami,
    /// 图像识别
    Recognize {
        /// 图片路径
        image: PathBuf,
        /// 使用高级识别
        #[arg(long)]
        advanced: bool,
    },
    /// 批量识别
    BatchRecognize {
        /// 图片路径
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// 使用高级识别
        #[arg(long)]
        advanced: bool,
    },
    /// 识别历史
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// 下载文件
    Download {
        /// 文件 ID 或完整 URL
        file: String,
        /// 保存的文件名
        #[arg(short, long)]
        output: Option<String>,
    },
    /// 按当前会话解析页面跳转
    Navigate {
        /// 目标路径，例如 /user/ai-training
        path: String,
    },
    /// 健康检查
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(server) = &cli.server {
        config = config.with_base_url(server);
    }
    if let Some(dir) = &cli.state_dir {
        config.state_dir = dir.clone();
    }

    tracing::debug!("Using server {} (state dir {:?})", config.base(), config.state_dir);

    let session = SessionContext::new(Arc::new(FileTokenStore::new(config.state_dir.clone())));
    let client = ApiClient::new(config, session)?;

    match cli.command {
        Commands::Login {
            username,
            password,
            captcha,
        } => {
            do_login(&client, &username, &password, captcha).await?;
        }
        Commands::Logout => {
            do_logout(&client).await?;
        }
        Commands::Whoami => {
            do_whoami(&client).await?;
        }
        Commands::Recognize { image, advanced } => {
            do_recognize(&client, &image, recognition_type(advanced)).await?;
        }
        Commands::BatchRecognize { images, advanced } => {
            do_batch_recognize(&client, &images, recognition_type(advanced)).await?;
        }
        Commands::History { page, size } => {
            do_history(&client, page, size).await?;
        }
        Commands::Download { file, output } => {
            do_download(&client, &file, output.as_deref()).await?;
        }
        Commands::Navigate { path } => {
            do_navigate(&client, &path).await?;
        }
        Commands::Health => {
            do_health(&client).await?;
        }
    }

    Ok(())
}

fn recognition_type(advanced: bool) -> RecognitionType {
    if advanced {
        RecognitionType::Advanced
    } else {
        RecognitionType::General
    }
}

/// 恢复已保存的会话，未登录时报错
async fn require_session(client: &ApiClient) -> anyhow::Result<UserProfile> {
    client.require_session().await.map_err(|e| match e {
        Error::NotAuthenticated => anyhow::anyhow!("请先登录（未找到有效会话）"),
        other => other.into(),
    })
}

async fn do_login(client: &ApiClient, username: &str, password: &str, captcha: Option<String>) -> anyhow::Result<()> {
    println!("正在登录用户: {}", username);

    let request = LoginRequest {
        captcha,
        remember_me: true,
        ..LoginRequest::new(username, password)
    };
    // 每次命令都是新进程，token 总是写入状态目录
    let response = client.auth().login(&request, true).await?;

    println!("登录成功!");
    if let Some(user) = &response.user {
        println!("用户: {} ({})", user.display_name(), user.role.display_name());
    }
    println!("会话已保存到 {:?}", client.config().state_dir);

    Ok(())
}

async fn do_logout(client: &ApiClient) -> anyhow::Result<()> {
    println!("正在登出...");

    client.session().rehydrate().await;
    client.auth().logout().await?;

    println!("登出成功!");

    Ok(())
}

async fn do_whoami(client: &ApiClient) -> anyhow::Result<()> {
    let user = require_session(client).await?;

    println!("ID: {}", user.id);
    println!("用户名: {}", user.username);
    println!("昵称: {}", user.display_name());
    println!("角色: {}", user.role.display_name());
    println!("VIP: {}", if user.is_vip() { "是" } else { "否" });
    if let Some(expire) = &user.vip_expire_time {
        println!("VIP 到期: {}", expire);
    }

    Ok(())
}

async fn do_recognize(client: &ApiClient, image: &PathBuf, kind: RecognitionType) -> anyhow::Result<()> {
    require_session(client).await?;

    let part = FilePart::from_path(image).await?;
    println!("正在识别: {:?} ({})", image, recognition_client_core::urls::format_file_size(part.size()));

    let result = client
        .recognition()
        .with_upload_config(FileUploadConfig::images(MAX_IMAGE_SIZE))
        .recognize(part, kind)
        .await?;

    println!("识别结果: {} (置信度 {:.2}%)", result.label(), result.confidence * 100.0);
    println!("图片地址: {}", client.image_url(&result.image_url));
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

async fn do_batch_recognize(client: &ApiClient, images: &[PathBuf], kind: RecognitionType) -> anyhow::Result<()> {
    require_session(client).await?;

    let mut parts = Vec::with_capacity(images.len());
    for image in images {
        parts.push(FilePart::from_path(image).await?);
    }

    println!("正在批量识别 {} 张图片...", parts.len());

    let results = client
        .recognition()
        .with_upload_config(FileUploadConfig::images(MAX_IMAGE_SIZE))
        .batch_recognize(parts, kind)
        .await?;

    for result in &results {
        println!("#{} {} ({:.2}%)", result.id, result.label(), result.confidence * 100.0);
    }

    Ok(())
}

async fn do_history(client: &ApiClient, page: u32, size: u32) -> anyhow::Result<()> {
    require_session(client).await?;

    let history = client.recognition().history(&PageQuery::new(page, size)).await?;

    println!("共 {} 条记录（第 {} 页）", history.total, page);
    for record in &history.data {
        println!(
            "#{} {} {:.2}% {}",
            record.id,
            record.label(),
            record.confidence * 100.0,
            record.created().unwrap_or("-")
        );
    }

    Ok(())
}

async fn do_download(client: &ApiClient, file: &str, output: Option<&str>) -> anyhow::Result<()> {
    require_session(client).await?;

    let path = client.file().download(file, output).await?;
    println!("文件已保存到: {:?}", path);

    Ok(())
}

async fn do_navigate(client: &ApiClient, path: &str) -> anyhow::Result<()> {
    client.bootstrap().await;

    let navigator = Arc::new(MemoryNavigator::new());
    let router = Router::new(
        RouteTable::standard(),
        client.session().clone(),
        Arc::new(TracingNotifier),
        navigator.clone(),
    );

    let outcome = router.navigate(path).await;

    println!("目标: {}", path);
    println!("结果: {}", outcome.path);
    if let Some(route) = outcome.route {
        println!("路由: {}", route);
    }
    if let Some(title) = navigator.title() {
        println!("标题: {}", title);
    }
    if outcome.redirected {
        println!("（已重定向）");
    }

    Ok(())
}

async fn do_health(client: &ApiClient) -> anyhow::Result<()> {
    let healthy = client.health_check().await?;

    if healthy {
        println!("服务状态: 正常");
    } else {
        println!("服务状态: 异常");
    }

    Ok(())
}
