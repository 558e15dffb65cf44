use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use spark::content::ContentClient;
use spark::core::config;
use spark::inference::GeminiProvider;
use spark::runtime::SessionRuntime;
use std::fs::File;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "spark", about = "Swipe, match and chat with AI personas")]
struct Args {
    /// Text model used for profiles and chat replies
    #[arg(short, long)]
    model: Option<String>,

    /// Where to write the debug log
    #[arg(long, default_value = "spark.log")]
    log_file: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger keeps the terminal free for the session itself
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            log::warn!("Falling back to default config: {}", e);
            config::SparkConfig::default()
        }
    };
    let resolved = config::resolve(&file_config, args.model.as_deref());

    let Some(api_key) = resolved.api_key.clone() else {
        eprintln!("No API key: set GEMINI_API_KEY (or API_KEY), or add api_key under [gemini] in ~/.spark/config.toml");
        std::process::exit(1);
    };

    log::info!(
        "Spark starting up: text_model={}, image_model={}, deck={:?}",
        resolved.text_model,
        resolved.image_model,
        resolved.deck
    );

    let provider = GeminiProvider::new(api_key, Some(resolved.base_url.clone()))
        .with_models(resolved.text_model.clone(), resolved.image_model.clone());
    let content = Arc::new(ContentClient::new(Arc::new(provider)));
    let runtime = SessionRuntime::new(content, resolved.deck);

    spark::repl::run(runtime).await
}
