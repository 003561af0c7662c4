/// Logging helpers
///
/// Subscriber setup plus the banner/summary lines the terminal client prints.
use crate::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `Config::log_filter`; calling it twice is harmless.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.verbose_logging)
        .try_init();
}

/// Startup banner
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 E-testi client starting");
    info!("🌐 API: {}", config.api_base_url);
    info!("💾 Storage: {}", config.storage_path);
    info!("{}", "=".repeat(60));
}

/// Summary after a submitted exam
///
/// # Arguments
/// - `title`: exam title
/// - `answered`: questions with a saved answer
/// - `total`: questions in the exam
/// - `percentage`: score, 0..=100
/// - `passed`: against the exam's threshold
pub fn log_session_summary(title: &str, answered: usize, total: usize, percentage: f64, passed: bool) {
    info!("\n{}", "─".repeat(60));
    info!("📊 {}", title);
    info!("✍️ Answered: {}/{}", answered, total);
    info!("🎯 Score: {:.2}%", percentage);
    info!("{}", if passed { "✅ Passed" } else { "❌ Not passed" });
    info!("{}", "─".repeat(60));
}

/// Shortens long text for log lines
///
/// # Arguments
/// - `text`: original text
/// - `max_len`: maximum number of characters kept
///
/// # Returns
/// The text, cut at `max_len` characters with `...` appended when cut
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_text("čćžšđ", 3), "čćž...");
        assert_eq!(truncate_text("kratko", 10), "kratko");
    }

    #[test]
    fn init_twice_does_not_panic() {
        let config = Config::default();
        init_logging(&config);
        init_logging(&config);
    }
}
