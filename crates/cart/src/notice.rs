//! User-facing notices emitted by cart operations.
//!
//! Notices are fire-and-forget: they are not persisted, retried or
//! acknowledged. The vocabulary is fixed and localized through [`Locale`].

use std::fmt;
use std::str::FromStr;

use tokio::sync::mpsc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// The fixed set of notices the cart can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeMessage {
    /// Requested quantity exceeds available stock.
    OutOfStock,
    /// A product was added (or incremented).
    Added,
    /// Adding failed for a reason other than stock.
    AddFailed,
    /// Removing failed.
    RemoveFailed,
    /// Changing a quantity failed for a reason other than stock.
    UpdateFailed,
}

impl NoticeMessage {
    /// Severity of this message.
    #[must_use]
    pub const fn level(self) -> NoticeLevel {
        match self {
            Self::Added => NoticeLevel::Success,
            Self::OutOfStock | Self::AddFailed | Self::RemoveFailed | Self::UpdateFailed => {
                NoticeLevel::Error
            }
        }
    }

    /// Message text in the given locale.
    #[must_use]
    pub const fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::PtBr => match self {
                Self::OutOfStock => "Quantidade solicitada fora de estoque",
                Self::Added => "Produto adicionado ao Carrinho",
                Self::AddFailed => "Erro na adição do produto",
                Self::RemoveFailed => "Erro na remoção do produto",
                Self::UpdateFailed => "Erro na alteração de quantidade do produto",
            },
            Locale::En => match self {
                Self::OutOfStock => "Requested quantity out of stock",
                Self::Added => "Product added to cart",
                Self::AddFailed => "Error adding product",
                Self::RemoveFailed => "Error removing product",
                Self::UpdateFailed => "Error changing product quantity",
            },
        }
    }
}

/// Language of notice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

/// Error parsing a [`Locale`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported locale '{0}' (expected pt-BR or en)")]
pub struct UnknownLocale(String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PtBr => f.write_str("pt-BR"),
            Self::En => f.write_str("en"),
        }
    }
}

/// A rendered notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: NoticeMessage,
    pub text: &'static str,
}

impl Notice {
    /// Render `message` in `locale`.
    #[must_use]
    pub const fn new(message: NoticeMessage, locale: Locale) -> Self {
        Self {
            level: message.level(),
            message,
            text: message.text(locale),
        }
    }
}

/// Receives notices from the cart store.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the tracing subscriber.
///
/// Used by the CLI, where the log is the user interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(notice = ?notice.message, "{}", notice.text),
            NoticeLevel::Error => tracing::warn!(notice = ?notice.message, "{}", notice.text),
        }
    }
}

/// Forwards notices over an unbounded channel to a UI task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the UI drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice receiver dropped, discarding notice");
        }
    }
}
