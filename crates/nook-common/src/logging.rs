use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` overrides the configured level.
pub fn init(log_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .with_target(false)
        .try_init();
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// A bare level also applies to tower-http request traces. Anything with
/// targets or commas is passed through untouched.
fn directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains(['=', ',']) {
        level.to_string()
    } else {
        format!("{level},tower_http={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_traces_follow_configured_level() {
        assert_eq!(directives(" debug "), "debug,tower_http=debug");
    }

    #[test]
    fn target_directives_pass_through() {
        assert_eq!(directives("nook_store=debug"), "nook_store=debug");
        assert_eq!(directives("warn,nook_web=trace"), "warn,nook_web=trace");
        assert!(EnvFilter::try_new(directives("nook_store=debug")).is_ok());
    }
}
