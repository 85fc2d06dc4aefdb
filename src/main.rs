fn main() {
    if let Err(err) = archdraw::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
