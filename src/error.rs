use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoverError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Канал событий закрыт: {0}")]
    Channel(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl HoverError {
    #[allow(dead_code)]
    pub fn service_unavailable<T>(msg: impl Into<String>) -> Result<T> {
        Err(HoverError::ServiceUnavailable(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, HoverError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! hover_error {
    (channel, $($arg:tt)*) => {
        $crate::error::HoverError::Channel(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::HoverError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::HoverError::Internal(format!($($arg)*))
    };
}
