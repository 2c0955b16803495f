//! # Sanbot CLI
//!
//! 命令行控制 Sanbot 头部 / 底盘控制板。
//!
//! ```bash
//! # 底盘前进 1000mm，速度 50
//! sanbot-cli wheel-distance forward 50 1000
//!
//! # 只打印线缆字节，不接触 USB
//! sanbot-cli --dry-run head-centre
//!
//! # 手臂演示序列
//! sanbot-cli arm-demo --pause-ms 300
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sanbot_sdk::protocol::to_hex;
use sanbot_sdk::tools::{CommandLog, SafetyValidator};
use sanbot_sdk::{Dispatcher, RobotCommand, UsbManager, prepare};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

mod commands;
mod config;

use commands::*;
use config::{CliConfig, ConfigCommand};

/// Sanbot CLI - 控制板命令行工具
#[derive(Parser, Debug)]
#[command(name = "sanbot-cli")]
#[command(about = "Command-line interface for Sanbot head and bottom control boards", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（默认 ~/.config/sanbot/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 打印每条发送的带标签缓冲区
    #[arg(long, global = true)]
    debug: bool,

    /// 只打印线缆字节，不打开 USB 设备
    #[arg(long, global = true)]
    dry_run: bool,

    /// 跳过安全限制检查
    #[arg(long = "unsafe", global = true)]
    no_safety: bool,

    /// 追加式命令日志文件（覆盖配置文件中的 [log] file）
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 轮子：无角度运动
    WheelNoAngle(WheelNoAngleArgs),
    /// 轮子：相对角度旋转
    WheelRelative(WheelRelativeArgs),
    /// 轮子：定时运动
    WheelTimed(WheelTimedArgs),
    /// 轮子：定距运动
    WheelDistance(WheelDistanceArgs),

    /// 手臂：无角度运动
    ArmNoAngle(ArmNoAngleArgs),
    /// 手臂：相对角度
    ArmRelative(ArmRelativeArgs),
    /// 手臂：绝对角度
    ArmAbsolute(ArmAbsoluteArgs),

    /// 头部：无角度运动
    HeadNoAngle(HeadNoAngleArgs),
    /// 头部：相对角度
    HeadRelative(HeadRelativeArgs),
    /// 头部：绝对角度
    HeadAbsolute(HeadAbsoluteArgs),
    /// 头部：回中并锁定
    #[command(alias = "head-center")]
    HeadCentre,
    /// 头部：绝对定位
    HeadLocateAbsolute(HeadLocateAbsoluteArgs),
    /// 头部：相对定位
    HeadLocateRelative(HeadLocateRelativeArgs),

    /// 发送原始十六进制字节（不做安全检查）
    Raw(RawArgs),

    /// 手臂演示序列
    ArmDemo(ArmDemoArgs),
}

/// 一次运行要执行的动作
enum Plan {
    Commands {
        commands: Vec<RobotCommand>,
        pause: Duration,
    },
    Raw(RawArgs),
}

impl Commands {
    fn into_plan(self) -> Option<Plan> {
        let single = |command: RobotCommand| {
            Some(Plan::Commands {
                commands: vec![command],
                pause: Duration::ZERO,
            })
        };
        match self {
            Commands::Config(_) => None,
            Commands::WheelNoAngle(a) => single(a.into()),
            Commands::WheelRelative(a) => single(a.into()),
            Commands::WheelTimed(a) => single(a.into()),
            Commands::WheelDistance(a) => single(a.into()),
            Commands::ArmNoAngle(a) => single(a.into()),
            Commands::ArmRelative(a) => single(a.into()),
            Commands::ArmAbsolute(a) => single(a.into()),
            Commands::HeadNoAngle(a) => single(a.into()),
            Commands::HeadRelative(a) => single(a.into()),
            Commands::HeadAbsolute(a) => single(a.into()),
            Commands::HeadCentre => single(RobotCommand::HeadCentre),
            Commands::HeadLocateAbsolute(a) => single(a.into()),
            Commands::HeadLocateRelative(a) => single(a.into()),
            Commands::Raw(a) => Some(Plan::Raw(a)),
            Commands::ArmDemo(a) => Some(Plan::Commands {
                commands: a.sequence(),
                pause: Duration::from_millis(a.pause_ms),
            }),
        }
    }
}

fn main() -> Result<()> {
    // 初始化日志（stderr，保持 stdout 只输出帧）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sanbot_cli=info".parse()?)
                .add_directive("sanbot_driver=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    if let Commands::Config(cmd) = &cli.command {
        return cmd.execute(&config);
    }

    let mut validator = SafetyValidator::new(config.safety.clone());
    validator.set_bypass(cli.no_safety);
    if cli.no_safety {
        tracing::warn!("Safety limits disabled (--unsafe)");
    }

    let Some(plan) = cli.command.into_plan() else {
        return Ok(());
    };

    if cli.dry_run {
        return dry_run(&validator, plan);
    }

    let manager = UsbManager::with_config(config.usb.to_manager_config())
        .context("初始化 USB 传输管理器失败")?;
    let mut dispatcher = Dispatcher::new(manager, validator);
    if let Some(path) = cli.log_file.or(config.log.file) {
        let log = CommandLog::open(&path)
            .with_context(|| format!("打开命令日志失败: {}", path.display()))?;
        dispatcher = dispatcher.with_log(log);
    }

    match plan {
        Plan::Commands { commands, pause } => {
            let count = commands.len();
            for (i, command) in commands.iter().enumerate() {
                let routed = dispatcher.execute(command)?;
                if cli.debug {
                    println!("{}: {}", command.name(), to_hex(&routed));
                }
                if !pause.is_zero() && i + 1 < count {
                    // 等待当前动作发出后再停顿
                    dispatcher.flush();
                    thread::sleep(pause);
                }
            }
        },
        Plan::Raw(args) => {
            let bytes = args.bytes()?;
            if cli.debug {
                println!("raw: {}", to_hex(&bytes));
            }
            let manager = dispatcher.manager();
            match args.target {
                RawTarget::Head => manager.send_to_head(bytes)?,
                RawTarget::Bottom => manager.send_to_bottom(bytes)?,
                RawTarget::Point => manager.send_to_point(bytes)?,
            }
        },
    }

    dispatcher.flush();
    report(&dispatcher.manager().metrics());
    Ok(())
}

/// 打印线缆字节，不接触 USB
fn dry_run(validator: &SafetyValidator, plan: Plan) -> Result<()> {
    match plan {
        Plan::Commands { commands, .. } => {
            for command in &commands {
                let routed = prepare(validator, command)?;
                println!("{}: {}", command.name(), to_hex(&routed));
            }
        },
        Plan::Raw(args) => {
            println!("raw: {}", to_hex(&args.bytes()?));
        },
    }
    Ok(())
}

fn report(snapshot: &sanbot_sdk::driver::TransportSnapshot) {
    tracing::debug!("Transport metrics: {:?}", snapshot);
    let dropped = snapshot.total_failures();
    if dropped > 0 || snapshot.malformed_tags > 0 {
        tracing::warn!(
            "{} send(s) dropped: {} unresolved device(s), {} failed transfer(s), {} malformed routing tag(s)",
            dropped,
            snapshot.head.resolution_failures + snapshot.bottom.resolution_failures,
            snapshot.head.transfer_failures + snapshot.bottom.transfer_failures,
            snapshot.malformed_tags
        );
    }
}
