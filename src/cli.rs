//! 命令行前端：在终端中驱动车队浏览、登录、注册与预订

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};

use crate::models::auth::LoginRequest;
use crate::models::booking::{parse_datetime_local, PaymentMethod};
use crate::models::user::RecordId;
use crate::navigation::menu_items;
use crate::services::auth_service::LoginStatus;
use crate::services::catalog_service::recommend_categories;
use crate::services::review_service::carousel_window;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "cyrene", version, about = "Cyrene Cars booking client")]
pub struct Cli {
    /// 覆盖 API 根地址（等价于 CYRENE_API__BASE_URL）
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 浏览车队
    Fleet {
        #[arg(long, default_value = "All")]
        category: String,
        #[arg(long, default_value = "")]
        search: String,
        /// 以往预订过的车型分类（逗号分隔），用于推荐
        #[arg(long, value_delimiter = ',')]
        history: Vec<String>,
    },
    /// 查看客户评价
    Reviews {
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
    /// 登录（需要时提示输入 OTP）
    Login {
        #[arg(long)]
        email: String,
        /// 不提供时从标准输入读取
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        captcha_token: String,
        /// 预先提供的 OTP
        #[arg(long)]
        otp: Option<String>,
    },
    /// 注册账户
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
    },
    /// 预订车辆
    Book {
        /// 车辆 ID（来自 fleet 列表）
        #[arg(long)]
        vehicle: String,
        #[arg(long)]
        pickup_location: String,
        #[arg(long)]
        dropoff_location: String,
        /// 例如 2026-11-02T09:30
        #[arg(long)]
        pickup_at: String,
        #[arg(long)]
        dropoff_at: String,
        /// credit_card | paypal | cash
        #[arg(long)]
        payment: PaymentMethod,
    },
    /// 登出
    Logout,
    /// 显示当前登录用户
    Whoami,
}

/// 执行子命令
pub async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Fleet {
            category,
            search,
            history,
        } => fleet(state, &category, &search, &history).await,
        Command::Reviews { count } => {
            let reviews = state.reviews.load().await;
            for review in carousel_window(&reviews, 0, count) {
                println!("{} {}", review.stars().render(), review.name);
                println!("    {}", review.comment);
            }
            Ok(())
        }
        Command::Login {
            email,
            password,
            captcha_token,
            otp,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };
            login(state, email, password, captcha_token, otp).await
        }
        Command::Signup {
            name,
            email,
            password,
            phone,
            address,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };
            let mut workflow = state.auth.signup_workflow();
            workflow.edit(|form| {
                form.name = name;
                form.email = email;
                form.password = password;
                form.phone_number = phone;
                form.address = address;
            });
            let result = workflow.submit().await;
            if let Some(message) = workflow.message() {
                println!("{}", message);
            }
            if let Some(redirect) = workflow.redirect() {
                println!("Next: {}", redirect.route());
            }
            result.map_err(Into::into)
        }
        Command::Book {
            vehicle,
            pickup_location,
            dropoff_location,
            pickup_at,
            dropoff_at,
            payment,
        } => {
            let pickup = parse_datetime_local(&pickup_at)
                .with_context(|| format!("Invalid pickup time: {}", pickup_at))?;
            let dropoff = parse_datetime_local(&dropoff_at)
                .with_context(|| format!("Invalid dropoff time: {}", dropoff_at))?;

            state
                .catalog
                .fetch_all()
                .await
                .context("Failed to load the vehicle catalog")?;
            let vehicle_id = match vehicle.parse::<i64>() {
                Ok(n) => RecordId::Number(n),
                Err(_) => RecordId::Text(vehicle.clone()),
            };
            let selected = state
                .catalog
                .select(&vehicle_id)
                .with_context(|| format!("Vehicle {} is not in the catalog", vehicle))?;

            let mut workflow = state.booking_workflow(selected);
            workflow.edit(|form| {
                form.pickup_location = pickup_location;
                form.dropoff_location = dropoff_location;
                form.pickup_datetime = Some(pickup);
                form.dropoff_datetime = Some(dropoff);
                form.payment_method = Some(payment);
            });
            let result = workflow.submit().await;
            if let Some(message) = workflow.message() {
                println!("{}", message);
            }
            result.map_err(Into::into)
        }
        Command::Logout => {
            if !state.sessions.is_authenticated() {
                println!("Not logged in");
                return Ok(());
            }
            let notify = state.auth.logout();
            // 命令行进程即将退出，等待通知发出
            let _ = notify.await;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            let session = state.sessions.current_user();
            match &session {
                Some(session) => println!("{} (id {})", session.user.display_name(), session.user.id),
                None => println!("Not logged in"),
            }
            let labels: Vec<_> = menu_items(session.as_ref()).iter().map(|i| i.label).collect();
            println!("Menu: {}", labels.join(" | "));
            Ok(())
        }
    }
}

async fn fleet(state: &AppState, category: &str, search: &str, history: &[String]) -> Result<()> {
    state
        .catalog
        .fetch_all()
        .await
        .context("Failed to load the vehicle catalog")?;

    let vehicles = state.catalog.filter(category, search);
    if vehicles.is_empty() {
        println!("No vehicles match");
    }
    for vehicle in &vehicles {
        println!(
            "[{}] {} ({}) seats: {} fuel: {} transmission: {}",
            vehicle.id,
            vehicle.name,
            vehicle.category,
            vehicle.capacity.as_deref().unwrap_or("-"),
            vehicle.fuel_type.as_deref().unwrap_or("-"),
            vehicle.transmission.as_deref().unwrap_or("-"),
        );
        if !vehicle.features.is_empty() {
            println!("    {}", vehicle.features.join(", "));
        }
    }

    if !history.is_empty() {
        println!(
            "You may also like: {}",
            recommend_categories(history).join(", ")
        );
    }
    Ok(())
}

async fn login(
    state: &AppState,
    email: String,
    password: String,
    captcha_token: String,
    otp: Option<String>,
) -> Result<()> {
    let mut workflow = state.auth.login_workflow();
    let request = LoginRequest {
        email,
        password,
        captcha_token,
    };

    let result = workflow.submit_credentials(request).await;
    if let Some(message) = workflow.message() {
        println!("{}", message.text);
    }
    let status = result?;

    if status == LoginStatus::AwaitingOtp {
        let code = match otp {
            Some(code) => code,
            None => prompt("OTP code")?,
        };
        let result = workflow.submit_otp(&code).await;
        if let Some(message) = workflow.message() {
            println!("{}", message.text);
        }
        result?;
    }

    if let Some(redirect) = workflow.redirect() {
        println!("Next: {}", redirect.route());
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}
