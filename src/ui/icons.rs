//! Shared UI icons and emojis.
//!
//! Each icon has a plain-text fallback for terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "* ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

// Product indicators
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
pub static LIVE: Emoji<'_, '_> = Emoji("🟢 ", "[live] ");
pub static DRAFT: Emoji<'_, '_> = Emoji("📝 ", "[draft] ");
pub static FILE: Emoji<'_, '_> = Emoji("📄 ", "- ");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "-> ");

// Review tabs
pub static RESEARCH: Emoji<'_, '_> = Emoji("📊 ", "");
pub static CONTENT: Emoji<'_, '_> = Emoji("🧰 ", "");
pub static LISTING: Emoji<'_, '_> = Emoji("🏷️  ", "");
