use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub shell: ShellConfig,
    pub emulation: EmulationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellConfig {
    /// Бэкенд оболочки: "dbus" или "emulated"
    pub mode: String,
    /// Имя шины и путь объекта SceneProbe на сессионном D-Bus
    pub bus_name: String,
    pub object_path: String,
    /// Интервал опроса позиции курсора, пока обзор виден
    pub pointer_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmulationConfig {
    /// Период полного цикла обзора в эмулированном режиме
    pub cycle_interval_ms: u64,
    /// Пауза между точками маршрута курсора
    pub glide_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "hover_select=info".to_string(),
            },
            shell: ShellConfig {
                mode: "dbus".to_string(),
                bus_name: "org.gnome.Shell".to_string(),
                object_path: "/org/gnome/Shell/Extensions/SceneProbe".to_string(),
                pointer_poll_interval_ms: 16,
            },
            emulation: EmulationConfig {
                cycle_interval_ms: 8000,
                glide_interval_ms: 120,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(figment::providers::Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("HOVER_"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек оболочки
        match self.shell.mode.as_str() {
            "dbus" | "emulated" => {}
            _ => anyhow::bail!("Неверный режим оболочки: {}", self.shell.mode),
        }

        if self.shell.bus_name.is_empty() {
            anyhow::bail!("Имя шины SceneProbe не может быть пустым");
        }

        if !self.shell.object_path.starts_with('/') {
            anyhow::bail!(
                "Путь объекта SceneProbe должен начинаться с '/': {}",
                self.shell.object_path
            );
        }

        // Опрос курсора чаще 250 Гц не имеет смысла и только греет шину
        if self.shell.pointer_poll_interval_ms < 4 {
            anyhow::bail!("pointer_poll_interval_ms должно быть минимум 4");
        }

        // Валидация настроек эмуляции
        if self.emulation.cycle_interval_ms == 0 {
            anyhow::bail!("cycle_interval_ms должно быть больше 0");
        }

        if self.emulation.glide_interval_ms == 0 {
            anyhow::bail!("glide_interval_ms должно быть больше 0");
        }

        Ok(())
    }
}
