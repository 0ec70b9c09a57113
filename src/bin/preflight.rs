use teacher_reviews::{Config, Store};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Optional env vars:\n\
           DATABASE_URL (default sqlite://teachers.db), PORT, HOST, STATIC_DIR\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let config = Config::from_env()?;

    println!("> Preflight:");
    println!("  DATABASE_URL={}", config.database_url);
    println!("  bind address={}", config.bind_addr());

    let index = config.static_dir.join("index.html");
    if index.is_file() {
        println!("  Static entry document: {}", index.display());
    } else {
        eprintln!("  Warning: {} not found; unknown paths will return 404.", index.display());
    }

    let store = Store::connect(&config.database_url).await?;

    // Running it twice must be a no-op the second time.
    store.init_schema().await?;
    store.init_schema().await?;
    println!("  Schema initialized (idempotent).");

    let teachers = store.count_teachers().await?;
    let reviews = store.count_reviews().await?;
    println!("  Teachers: {}  Reviews: {}", teachers, reviews);

    store.close().await;
    println!("> Preflight OK.");
    Ok(())
}
