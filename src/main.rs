use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

mod config;
mod error;
mod events;
mod scene;
mod services;
mod utils;

use config::Config;
use services::{create_shell, HoverTracker, SignalHub};

#[derive(Parser, Debug)]
#[command(name = "hover-select")]
#[command(about = "Активация последнего окна под курсором при закрытии обзора окон")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "hover-select.toml")]
    config: String,

    /// Режим сухого запуска (эмулированная оболочка вместо D-Bus)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Инициализация системы логирования
    init_tracing(&args.log_level)?;

    info!("Запуск hover-select v{}", env!("CARGO_PKG_VERSION"));

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальная оболочка не используется");
    }

    // Инициализация компонентов: хаб сигналов, бэкенд оболочки, трекер
    let hub = SignalHub::new();
    let (shell, event_source) = create_shell(config.clone(), hub.clone(), args.dry_run).await?;
    let tracker = HoverTracker::new(shell);

    info!("Все компоненты инициализированы");

    // Подписки трекера, затем поток событий оболочки
    tracker.start(&hub);

    let source_handle = tokio::spawn(async move {
        if let Err(e) = event_source.run().await {
            error!("Ошибка в источнике событий оболочки: {}", e);
        }
    });

    info!("Сервис запущен");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Сначала освобождаем подписки трекера, затем гасим источник событий
    tracker.stop();
    source_handle.abort();

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = source_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Источник событий завершил работу корректно"),
        Err(_) => warn!("Таймаут при завершении источника событий"),
    }

    info!("hover-select завершил работу");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
