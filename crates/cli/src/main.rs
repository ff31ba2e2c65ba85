fn main() {
    if let Err(e) = modelpeek_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
