fn main() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    stockpile::app::logging::init();
    if let Err(err) = stockpile::app::cli::run() {
        eprintln!("error: {}", err.message);
        std::process::exit(1);
    }
}
