//! 관리자 대시보드 인증 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 로그인 본문 서명 확인
//! admin sign --body '{"username":"ops","password":"pw"}' --canonical
//!
//! # 로그인 점검
//! admin login --field username=ops --field password=pw --field otp=123456
//!
//! # 접근 판단 시뮬레이션
//! admin gate --role viewer --path /users
//! admin gate --role none --path /dashboard
//!
//! # 라우트 정책 표
//! admin routes
//! ```

use admin_auth::AccessGate;
use admin_core::{init_logging, AppConfig, LogConfig, SharedSecret, DEFAULT_CONFIG_PATH};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use admin_cli::commands::gate::{format_decision, parse_role, route_table};
use admin_cli::commands::login::run_login;
use admin_cli::commands::sign::{sign_body, SignConfig};

#[derive(Parser)]
#[command(name = "admin")]
#[command(about = "Admin dashboard CLI - 로그인 서명 및 접근 판단 도구", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 요청 본문 서명 생성
    Sign {
        /// JSON 본문
        #[arg(short, long, conflicts_with = "file")]
        body: Option<String>,

        /// JSON 본문 파일 경로
        #[arg(short, long)]
        file: Option<String>,

        /// 정규 문자열도 출력 (시크릿은 가려짐)
        #[arg(long, default_value = "false")]
        canonical: bool,
    },

    /// API 서버 로그인 점검
    Login {
        /// 로그인 필드 (key=value, 반복 가능)
        #[arg(long = "field", required = true)]
        fields: Vec<String>,
    },

    /// 라우트 접근 판단
    Gate {
        /// 역할 (admin, operator, viewer, none)
        #[arg(short, long)]
        role: String,

        /// 요청 경로 (예: /bank-requests)
        #[arg(short, long)]
        path: String,
    },

    /// 라우트 정책 표 출력
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    init_logging(LogConfig::from(&config.logging))?;

    match cli.command {
        Commands::Sign {
            body,
            file,
            canonical,
        } => {
            let secret = SharedSecret::from_config(&config)?;
            if secret.is_placeholder() {
                warn!("Signing with development placeholder secret");
            }

            let sign_config = SignConfig {
                body,
                file,
                show_canonical: canonical,
            };

            let output = sign_body(&sign_config, &secret)?;
            if let Some(canonical) = output.canonical {
                println!("canonical: {}", canonical);
            }
            println!("{}", output.signature);
        }

        Commands::Login { fields } => {
            info!("Logging in to {}", config.api.base_url);

            match run_login(&config, &fields).await {
                Ok(summary) => {
                    println!("role: {}", summary.role);
                    println!("landing: {}", summary.landing);
                }
                Err(e) => {
                    error!("Login failed: {}", e);
                    return Err(e);
                }
            }
        }

        Commands::Gate { role, path } => {
            let role = parse_role(&role)?;
            let gate = AccessGate::from_config(&config.routes);

            println!("{}", format_decision(&gate.check_path(role, &path)));
        }

        Commands::Routes => {
            let gate = AccessGate::from_config(&config.routes);
            for row in route_table(&gate) {
                println!("{}", row);
            }
        }
    }

    Ok(())
}
