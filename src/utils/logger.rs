use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "order_checkout";

/// `RUST_LOG` 優先；否則依 `verbose` 決定本 crate 的層級
pub fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(format!("{}=debug,info", CRATE_TARGET))
        } else {
            EnvFilter::new(format!("{}=info", CRATE_TARGET))
        }
    })
}

/// 安裝全域 subscriber：同一個 filter，輸出為 compact 或 JSON
pub fn init_logger(verbose: bool, json: bool) {
    let compact_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });
    let json_layer = json.then(|| fmt::layer().with_target(false).json());

    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(compact_layer)
        .with(json_layer)
        .init();
}
