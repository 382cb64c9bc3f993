fn main() {
    if let Err(e) = backoffice_pos::run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
