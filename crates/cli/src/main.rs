fn main() {
    if let Err(e) = phpscope_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
