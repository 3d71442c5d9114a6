use clap::Parser;
use order_checkout::utils::error::ErrorSeverity;
use order_checkout::utils::{logger, validation::Validate};
use order_checkout::{
    CheckoutConfig, CheckoutError, CheckoutSession, CliConfig, FormState, SimulatedGateway,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("🚀 Starting order-check");
    if args.verbose {
        tracing::debug!("CLI config: {:?}", args);
    }

    if let Err(e) = args.validate() {
        exit_with(&e);
    }

    // 載入配置；未指定時使用內建目錄
    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            CheckoutConfig::from_file(path).unwrap_or_else(|e| exit_with(&e))
        }
        None => CheckoutConfig::default(),
    };

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let state = std::fs::read_to_string(&args.form)
        .map_err(CheckoutError::from)
        .and_then(|content| FormState::from_json(&content))
        .unwrap_or_else(|e| exit_with(&e));

    let mut session = CheckoutSession::from_config(&config);
    session.load(state);

    let preview = session.preview();
    tracing::info!(
        "💳 Card preview: [{}] {}  {}  {}",
        preview.network,
        preview.number,
        preview.expiry,
        preview.cvv
    );

    for input in session.quantity_inputs() {
        tracing::info!(
            "🛒 {} ({}): {}",
            input.name.unwrap_or("unknown product"),
            input.product_id,
            input.value.map(|v| v.to_string()).unwrap_or_default()
        );
    }

    println!("{}", serde_json::to_string_pretty(session.errors())?);

    if !session.errors().is_valid() {
        tracing::warn!("❌ Form has {} invalid field(s)", session.errors().len());
        std::process::exit(1);
    }

    tracing::info!("✅ Form is valid");

    if args.submit {
        let gateway = SimulatedGateway::new(config.submission.delay());
        match session.submit(&gateway).await {
            Ok(receipt) => {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            }
            Err(e) => exit_with(&e),
        }
    }

    Ok(())
}

fn exit_with(e: &CheckoutError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 1,
        ErrorSeverity::High => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
